//! Runs commands against the list store and phrases the spoken reply.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::catalog::ListCatalog;
use crate::intent::Command;
use crate::speech::{describe_item_set, describe_list, item_base_name, item_is_plural};
use crate::store::{ItemId, ListId, ListItem, ListStore};

pub const NO_ITEMS_REPLY: &str = "I didn't catch which items you meant.";

/// Whatever turns a command into a sentence. The bus only knows this trait.
#[async_trait]
pub trait IntentHandler: Send + Sync {
    async fn handle(&self, command: &Command) -> Result<String>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SkillOptions {
    /// Minimum list-name similarity (0–100). `None` accepts any match.
    pub min_match_score: Option<u8>,
}

/// The shopping list skill: a store, the list catalog loaded from it, and
/// the reply phrasing. The catalog sits behind a lock so it can be
/// refreshed while intents are being served.
pub struct Skill {
    store: Arc<dyn ListStore>,
    catalog: RwLock<ListCatalog>,
    options: SkillOptions,
}

/// A list the command resolved to.
struct Target {
    id: ListId,
    spoken: String,
}

impl Skill {
    /// Load the catalog from the store. Fails if the store is unreachable
    /// or has no lists.
    pub async fn new(store: Arc<dyn ListStore>, options: SkillOptions) -> Result<Self> {
        let catalog = ListCatalog::new(store.fetch_all_lists().await?)?;
        info!("loaded {} shopping list(s)", catalog.len());
        Ok(Self {
            store,
            catalog: RwLock::new(catalog),
            options,
        })
    }

    /// A snapshot of the current catalog.
    pub async fn catalog(&self) -> ListCatalog {
        self.catalog.read().await.clone()
    }

    /// Replace the catalog with a fresh copy from the store. On failure the
    /// old catalog stays in place.
    pub async fn reload_catalog(&self) -> Result<()> {
        let fresh = ListCatalog::new(self.store.fetch_all_lists().await?)?;
        info!("reloaded {} shopping list(s)", fresh.len());
        *self.catalog.write().await = fresh;
        Ok(())
    }

    /// Remove every crossed-off item from a list.
    pub async fn clear_crossed_off(&self, list: &str) -> Result<String> {
        let Some(target) = self.target(list).await? else {
            return Ok(unknown_list_reply(list));
        };
        self.store.delete_crossed_off(&target.id).await?;
        Ok(format!(
            "Cleared the crossed-off items from your {}.",
            target.spoken
        ))
    }

    /// Resolve a spoken list name, honoring the configured score floor.
    /// A name below the floor may belong to a list created since the
    /// catalog was loaded, so the catalog is reloaded once before giving up.
    async fn target(&self, spoken: &str) -> Result<Option<Target>> {
        if let Some(target) = self.lookup(spoken).await {
            return Ok(Some(target));
        }
        debug!("no list close to '{spoken}', reloading catalog");
        self.reload_catalog().await?;
        Ok(self.lookup(spoken).await)
    }

    async fn lookup(&self, spoken: &str) -> Option<Target> {
        let catalog = self.catalog.read().await;
        let best = catalog.best_match(spoken);
        debug!("list '{spoken}' matched '{}' (score {})", best.name, best.score);
        if self.options.min_match_score.is_some_and(|min| best.score < min) {
            return None;
        }
        Some(Target {
            id: best.id.clone(),
            spoken: describe_list(best.name),
        })
    }

    async fn add(&self, target: &Target, items: &[String], quantity: Option<u32>) -> Result<String> {
        let mut added = Vec::with_capacity(items.len());
        for item in items {
            let value = match quantity {
                Some(n) if items.len() == 1 => format!("{item} ({n})"),
                _ => item.clone(),
            };
            self.store.add_item(&target.id, &value).await?;
            added.push(value);
        }
        Ok(format!(
            "Added {} to your {}.",
            describe_item_set(&added),
            target.spoken
        ))
    }

    async fn remove(&self, target: &Target, items: &[String]) -> Result<String> {
        let stored = self.store.fetch_list_items(&target.id).await?;
        let mut taken: Vec<&ItemId> = Vec::new();
        let mut removed = Vec::new();
        let mut missing = Vec::new();

        for item in items {
            let found = stored
                .iter()
                .find(|s| same_item(&s.name, item) && !taken.contains(&&s.id));
            match found {
                Some(s) => {
                    taken.push(&s.id);
                    if self.store.remove_item(&target.id, &s.id).await? {
                        removed.push(s.name.clone());
                    } else {
                        missing.push(item.clone());
                    }
                }
                None => missing.push(item.clone()),
            }
        }

        let reply = match (removed.is_empty(), missing.is_empty()) {
            (false, true) => format!(
                "Removed {} from your {}.",
                describe_item_set(&removed),
                target.spoken
            ),
            (false, false) => format!(
                "Removed {} from your {}. I couldn't find {} on it.",
                describe_item_set(&removed),
                target.spoken,
                describe_item_set(&missing)
            ),
            (true, _) => format!(
                "I couldn't find {} on your {}.",
                describe_item_set(&missing),
                target.spoken
            ),
        };
        Ok(reply)
    }

    async fn read(&self, target: &Target) -> Result<String> {
        let open = open_items(self.store.fetch_list_items(&target.id).await?);
        if open.is_empty() {
            return Ok(format!("Your {} is empty.", target.spoken));
        }
        let names: Vec<String> = open.into_iter().map(|i| i.name).collect();
        Ok(format!(
            "Your {} has {}.",
            target.spoken,
            describe_item_set(&names)
        ))
    }

    async fn check(&self, target: &Target, items: &[String]) -> Result<String> {
        let open = open_items(self.store.fetch_list_items(&target.id).await?);
        let mut present = Vec::new();
        let mut absent = Vec::new();
        for item in items {
            match open.iter().find(|s| same_item(&s.name, item)) {
                Some(s) => present.push(s.name.clone()),
                None => absent.push(item.clone()),
            }
        }

        let reply = match (present.is_empty(), absent.is_empty()) {
            (false, true) => format!(
                "Yes, {} {} on your {}.",
                describe_item_set(&present),
                verb(&present),
                target.spoken
            ),
            (true, _) => format!(
                "No, {} {}n't on your {}.",
                describe_item_set(&absent),
                verb(&absent),
                target.spoken
            ),
            (false, false) => format!(
                "{} {} on your {}, but {} {}n't.",
                describe_item_set(&present),
                verb(&present),
                target.spoken,
                describe_item_set(&absent),
                verb(&absent)
            ),
        };
        Ok(reply)
    }
}

#[async_trait]
impl IntentHandler for Skill {
    async fn handle(&self, command: &Command) -> Result<String> {
        info!("handling {} on '{}'", command.kind(), command.list());
        let Some(target) = self.target(command.list()).await? else {
            return Ok(unknown_list_reply(command.list()));
        };

        match command {
            Command::Add {
                items, quantity, ..
            } if !items.is_empty() => self.add(&target, items, *quantity).await,
            Command::Remove { items, .. } if !items.is_empty() => {
                self.remove(&target, items).await
            }
            Command::Check { items, .. } if !items.is_empty() => self.check(&target, items).await,
            Command::Read { .. } => self.read(&target).await,
            _ => Ok(NO_ITEMS_REPLY.to_string()),
        }
    }
}

fn unknown_list_reply(spoken: &str) -> String {
    format!("I couldn't find a list called {spoken}.")
}

/// Compare a stored value with a spoken item, ignoring case and quantity.
fn same_item(stored: &str, spoken: &str) -> bool {
    item_base_name(stored).to_lowercase() == item_base_name(spoken).to_lowercase()
}

fn open_items(items: Vec<ListItem>) -> Vec<ListItem> {
    items.into_iter().filter(|i| !i.crossed_off).collect()
}

/// "is" for a lone item that reads as singular, "are" otherwise.
fn verb<S: AsRef<str>>(items: &[S]) -> &'static str {
    match items {
        [only] if !item_is_plural(only.as_ref()) => "is",
        _ => "are",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_item_ignores_case_and_quantity() {
        assert!(same_item("Apples (3)", "apples"));
        assert!(same_item("Milk", "MILK"));
        assert!(!same_item("Milk", "Oat Milk"));
    }

    #[test]
    fn verb_agrees_with_grammatical_number() {
        assert_eq!(verb(&["Milk"]), "is");
        assert_eq!(verb(&["Banana (1)"]), "is");
        assert_eq!(verb(&["Apples (3)"]), "are");
        assert_eq!(verb(&["Eggs"]), "are");
        assert_eq!(verb(&["Milk", "Bread"]), "are");
    }

    #[test]
    fn open_items_drop_crossed_off() {
        let items = vec![
            ListItem {
                id: ItemId::from("1"),
                name: "Milk".into(),
                crossed_off: true,
            },
            ListItem {
                id: ItemId::from("2"),
                name: "Eggs".into(),
                crossed_off: false,
            },
        ];
        let open = open_items(items);
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].name, "Eggs");
    }
}
