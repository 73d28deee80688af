use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::debug;

use super::{ItemId, ListId, ListItem, ListStore};
use crate::auth::{self, Session};
use crate::consts::{LISTS_PATH, url};

/// [`ListStore`] backed by the Our Groceries web app.
pub struct OurGroceriesStore {
    http: Client,
    session: Session,
}

impl OurGroceriesStore {
    /// Sign in and return a ready client.
    pub async fn connect(username: &str, password: &str, timeout: Duration) -> Result<Self> {
        let http = auth::http_client(timeout)?;
        let session = auth::sign_in(&http, username, password).await?;
        Ok(Self { http, session })
    }

    /// Post a named command. `teamId` is always sent; `args` are merged in.
    async fn exec_command(&self, command: &str, args: Value) -> Result<Value> {
        let mut body = Map::new();
        body.insert("command".to_string(), json!(command));
        body.insert("teamId".to_string(), json!(self.session.team_id));
        if let Value::Object(extra) = args {
            body.extend(extra);
        }

        debug!("our groceries command: {command}");
        let resp = self
            .session
            .authorize(self.http.post(url(LISTS_PATH)), &url(LISTS_PATH))
            .json(&Value::Object(body))
            .send()
            .await
            .with_context(|| format!("{command} request failed"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            bail!("{command} failed with status {status}: {text}");
        }

        resp.json()
            .await
            .with_context(|| format!("{command} returned malformed JSON"))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Overview {
    shopping_lists: Vec<ListSummary>,
}

#[derive(Deserialize)]
struct ListSummary {
    id: String,
    name: String,
}

#[derive(Deserialize)]
struct ListResponse {
    list: ListBody,
}

#[derive(Deserialize)]
struct ListBody {
    #[serde(default)]
    items: Vec<RawItem>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawItem {
    id: String,
    value: String,
    #[serde(default)]
    crossed_off: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct InsertResponse {
    item_id: String,
}

/// Decode a `getOverview` response into `(name, id)` pairs.
pub fn parse_overview(value: Value) -> Result<Vec<(String, ListId)>> {
    let overview: Overview =
        serde_json::from_value(value).context("unexpected getOverview response")?;
    Ok(overview
        .shopping_lists
        .into_iter()
        .map(|l| (l.name, ListId::from(l.id)))
        .collect())
}

/// Decode a `getList` response.
pub fn parse_list(value: Value) -> Result<Vec<ListItem>> {
    let resp: ListResponse = serde_json::from_value(value).context("unexpected getList response")?;
    Ok(resp
        .list
        .items
        .into_iter()
        .map(|i| ListItem {
            id: ItemId::from(i.id),
            name: i.value,
            crossed_off: i.crossed_off,
        })
        .collect())
}

#[async_trait]
impl ListStore for OurGroceriesStore {
    async fn fetch_all_lists(&self) -> Result<Vec<(String, ListId)>> {
        parse_overview(self.exec_command("getOverview", Value::Null).await?)
    }

    async fn fetch_list_items(&self, list: &ListId) -> Result<Vec<ListItem>> {
        let value = self
            .exec_command("getList", json!({ "listId": list, "version": "" }))
            .await?;
        parse_list(value)
    }

    async fn add_item(&self, list: &ListId, name: &str) -> Result<ItemId> {
        let value = self
            .exec_command("insertItem", json!({ "listId": list, "value": name }))
            .await?;
        let resp: InsertResponse =
            serde_json::from_value(value).context("unexpected insertItem response")?;
        Ok(ItemId::from(resp.item_id))
    }

    async fn remove_item(&self, list: &ListId, item: &ItemId) -> Result<bool> {
        let value = self
            .exec_command("deleteItem", json!({ "listId": list, "itemId": item }))
            .await?;
        Ok(value.get("error").is_none())
    }

    async fn delete_crossed_off(&self, list: &ListId) -> Result<()> {
        self.exec_command(
            "deleteAllCrossedOffItems",
            json!({ "listId": list, "version": "" }),
        )
        .await?;
        Ok(())
    }
}
