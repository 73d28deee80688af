use anyhow::{Result, bail};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;

use super::{ItemId, ListId, ListItem, ListStore};

struct MockList {
    name: String,
    id: ListId,
    items: Vec<ListItem>,
}

/// An in-memory store for tests. Lists keep insertion order; item ids are
/// handed out sequentially. Call [`MockStore::set_offline`] to make every
/// call fail the way an unreachable service would.
pub struct MockStore {
    lists: Mutex<Vec<MockList>>,
    next_item: AtomicUsize,
    offline: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStore {
    pub fn new() -> Self {
        Self {
            lists: Mutex::new(Vec::new()),
            next_item: AtomicUsize::new(1),
            offline: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Seed a list with the given items (none crossed off).
    pub async fn with_list(self, name: &str, id: &str, items: &[&str]) -> Self {
        self.push_list(name, id, items).await;
        self
    }

    /// Create a list behind the skill's back, as another device would.
    pub async fn push_list(&self, name: &str, id: &str, items: &[&str]) {
        let items = items
            .iter()
            .map(|value| ListItem {
                id: self.fresh_id(),
                name: value.to_string(),
                crossed_off: false,
            })
            .collect();
        self.lists.lock().await.push(MockList {
            name: name.to_string(),
            id: ListId::from(id),
            items,
        });
    }

    /// Mark the first item with this exact value as crossed off.
    pub async fn cross_off(&self, list: &str, value: &str) {
        let mut lists = self.lists.lock().await;
        if let Some(item) = lists
            .iter_mut()
            .filter(|l| l.id.as_str() == list)
            .flat_map(|l| l.items.iter_mut())
            .find(|i| i.name == value)
        {
            item.crossed_off = true;
        }
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Current item values on a list, crossed off or not.
    pub async fn values(&self, list: &str) -> Vec<String> {
        self.lists
            .lock()
            .await
            .iter()
            .filter(|l| l.id.as_str() == list)
            .flat_map(|l| l.items.iter().map(|i| i.name.clone()))
            .collect()
    }

    /// Names of the store operations invoked so far, in order.
    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    fn fresh_id(&self) -> ItemId {
        let n = self.next_item.fetch_add(1, Ordering::SeqCst);
        ItemId::from(format!("item-{n}"))
    }

    async fn record(&self, call: &str) -> Result<()> {
        self.calls.lock().await.push(call.to_string());
        if self.offline.load(Ordering::SeqCst) {
            bail!("MockStore: {call} failed, store is offline");
        }
        Ok(())
    }
}

#[async_trait]
impl ListStore for MockStore {
    async fn fetch_all_lists(&self) -> Result<Vec<(String, ListId)>> {
        self.record("fetch_all_lists").await?;
        Ok(self
            .lists
            .lock()
            .await
            .iter()
            .map(|l| (l.name.clone(), l.id.clone()))
            .collect())
    }

    async fn fetch_list_items(&self, list: &ListId) -> Result<Vec<ListItem>> {
        self.record("fetch_list_items").await?;
        let lists = self.lists.lock().await;
        match lists.iter().find(|l| &l.id == list) {
            Some(l) => Ok(l.items.clone()),
            None => bail!("MockStore: unknown list {list}"),
        }
    }

    async fn add_item(&self, list: &ListId, name: &str) -> Result<ItemId> {
        self.record("add_item").await?;
        let id = self.fresh_id();
        let mut lists = self.lists.lock().await;
        let Some(l) = lists.iter_mut().find(|l| &l.id == list) else {
            bail!("MockStore: unknown list {list}");
        };
        l.items.push(ListItem {
            id: id.clone(),
            name: name.to_string(),
            crossed_off: false,
        });
        Ok(id)
    }

    async fn remove_item(&self, list: &ListId, item: &ItemId) -> Result<bool> {
        self.record("remove_item").await?;
        let mut lists = self.lists.lock().await;
        let Some(l) = lists.iter_mut().find(|l| &l.id == list) else {
            return Ok(false);
        };
        let before = l.items.len();
        l.items.retain(|i| &i.id != item);
        Ok(l.items.len() < before)
    }

    async fn delete_crossed_off(&self, list: &ListId) -> Result<()> {
        self.record("delete_crossed_off").await?;
        let mut lists = self.lists.lock().await;
        if let Some(l) = lists.iter_mut().find(|l| &l.id == list) {
            l.items.retain(|i| !i.crossed_off);
        }
        Ok(())
    }
}
