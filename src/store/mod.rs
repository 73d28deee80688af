pub mod mock;
pub mod ourgroceries;

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Identifier the store assigns to a list. Stable for the list's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListId(String);

/// Identifier the store assigns to an item within a list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

macro_rules! string_id {
    ($ty:ident) => {
        impl $ty {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $ty {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $ty {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(ListId);
string_id!(ItemId);

/// One entry on a shopping list. `name` is the raw stored value and may
/// carry a `" (N)"` quantity suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub id: ItemId,
    pub name: String,
    pub crossed_off: bool,
}

/// The remote list service. Failures are returned as-is; nothing here
/// retries or caches.
#[async_trait]
pub trait ListStore: Send + Sync {
    /// Every list on the account as `(name, id)`, in the store's order.
    async fn fetch_all_lists(&self) -> Result<Vec<(String, ListId)>>;

    /// Items on a list, including crossed-off ones.
    async fn fetch_list_items(&self, list: &ListId) -> Result<Vec<ListItem>>;

    /// Add an item and return the id the store gave it.
    async fn add_item(&self, list: &ListId, name: &str) -> Result<ItemId>;

    /// Remove an item. `Ok(false)` means the store refused the removal.
    async fn remove_item(&self, list: &ListId, item: &ItemId) -> Result<bool>;

    /// Drop every crossed-off item from a list.
    async fn delete_crossed_off(&self, list: &ListId) -> Result<()>;
}
