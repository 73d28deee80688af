//! Project-wide constants.

pub const SKILL_ID: &str = "groceries-skill";
pub const REPO: &str = env!("CARGO_PKG_REPOSITORY");

/// Our Groceries endpoints.
pub const BASE_URL: &str = "https://www.ourgroceries.com";
pub const SIGN_IN_PATH: &str = "/sign-in";
pub const LISTS_PATH: &str = "/your-lists/";

/// Cookie that carries the signed-in session.
pub const AUTH_COOKIE: &str = "ourgroceries-auth";

/// The service rejects requests that don't look like they come from a browser.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 6.1) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/41.0.2228.0 Safari/537.36";

/// Hermes topics.
pub const INTENT_TOPIC: &str = "hermes/intent/#";
pub const END_SESSION_TOPIC: &str = "hermes/dialogueManager/endSession";

/// Intent names, without the `user:` namespace prefix.
pub const INTENT_ADD: &str = "addToList";
pub const INTENT_REMOVE: &str = "removeFromList";
pub const INTENT_READ: &str = "readList";
pub const INTENT_CHECK: &str = "checkList";

/// Slot names.
pub const SLOT_ITEM: &str = "itemType";
pub const SLOT_LIST: &str = "listName";
pub const SLOT_QUANTITY: &str = "quantity";

pub const DEFAULT_LIST: &str = "Shopping List";
pub const DEFAULT_FAILURE_PHRASE: &str = "Sorry, I couldn't reach Our Groceries right now.";

/// Join `BASE_URL` with a path.
pub fn url(path: &str) -> String {
    format!("{BASE_URL}{path}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consts_are_non_empty() {
        assert!(!SKILL_ID.is_empty());
        assert!(!REPO.is_empty());
        assert!(!DEFAULT_LIST.is_empty());
    }

    #[test]
    fn url_joins_base() {
        assert_eq!(url(SIGN_IN_PATH), "https://www.ourgroceries.com/sign-in");
        assert_eq!(url(LISTS_PATH), "https://www.ourgroceries.com/your-lists/");
    }

    #[test]
    fn intent_topic_is_wildcard() {
        assert!(INTENT_TOPIC.ends_with("/#"));
    }
}
