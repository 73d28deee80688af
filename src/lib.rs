pub mod auth;
pub mod bus;
pub mod catalog;
pub mod config;
pub mod consts;
pub mod intent;
pub mod skill;
pub mod speech;
pub mod store;
