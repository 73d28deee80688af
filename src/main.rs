use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use groceries_skill::bus::{self, Dialogue};
use groceries_skill::config::Config;
use groceries_skill::intent::Command;
use groceries_skill::skill::{IntentHandler, Skill, SkillOptions};
use groceries_skill::speech::describe_list;
use groceries_skill::store::ourgroceries::OurGroceriesStore;

#[derive(Parser)]
#[command(
    name = "groceries-skill",
    version,
    about = "Voice assistant skill for Our Groceries shopping lists"
)]
struct Cli {
    #[command(subcommand)]
    action: Option<Action>,

    /// Path to config.yaml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Action {
    /// Listen for intents on the Hermes bus (default)
    Serve,
    /// Show the shopping lists on the account
    Lists,
    /// Add items to a list
    Add {
        /// List name (defaults to the configured default list)
        #[arg(short, long)]
        list: Option<String>,
        /// Quantity, applied when a single item is given
        #[arg(short, long)]
        quantity: Option<u32>,
        #[arg(required = true)]
        items: Vec<String>,
    },
    /// Remove items from a list
    Remove {
        #[arg(short, long)]
        list: Option<String>,
        #[arg(required = true)]
        items: Vec<String>,
    },
    /// Read out a list
    Read {
        #[arg(short, long)]
        list: Option<String>,
    },
    /// Check whether items are on a list
    Check {
        #[arg(short, long)]
        list: Option<String>,
        #[arg(required = true)]
        items: Vec<String>,
    },
    /// Delete crossed-off items from a list
    Clear {
        #[arg(short, long)]
        list: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug,rumqttc=info,reqwest=info")
        } else {
            EnvFilter::new("info,rumqttc=warn")
        }
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::load(cli.config.as_deref())?;
    let (username, password) = config.account.credentials()?;

    let store =
        OurGroceriesStore::connect(username, password, config.skill.http_timeout()).await?;
    let options = SkillOptions {
        min_match_score: config.skill.min_match_score,
    };
    let skill = Skill::new(Arc::new(store), options).await?;

    let default_list = config.skill.default_list.clone();
    let list_or_default = |list: Option<String>| list.unwrap_or_else(|| default_list.clone());

    let command = match cli.action.unwrap_or(Action::Serve) {
        Action::Serve => {
            let dialogue = Dialogue {
                default_list: config.skill.default_list.clone(),
                failure_phrase: config.skill.failure_phrase.clone(),
            };
            info!("groceries-skill ready");
            return bus::run(&config.mqtt, &dialogue, &skill).await;
        }
        Action::Lists => {
            for name in skill.catalog().await.names() {
                println!("{}", describe_list(name));
            }
            return Ok(());
        }
        Action::Clear { list } => {
            println!("{}", skill.clear_crossed_off(&list_or_default(list)).await?);
            return Ok(());
        }
        Action::Add {
            list,
            quantity,
            items,
        } => Command::Add {
            items,
            list: list_or_default(list),
            quantity,
        },
        Action::Remove { list, items } => Command::Remove {
            items,
            list: list_or_default(list),
        },
        Action::Read { list } => Command::Read {
            list: list_or_default(list),
        },
        Action::Check { list, items } => Command::Check {
            items,
            list: list_or_default(list),
        },
    };

    println!("{}", skill.handle(&command).await?);
    Ok(())
}
