//! Hermes intent payloads and routing them to skill commands.

use serde::Deserialize;
use serde_json::Value;

use crate::consts::{
    INTENT_ADD, INTENT_CHECK, INTENT_READ, INTENT_REMOVE, SLOT_ITEM, SLOT_LIST, SLOT_QUANTITY,
};

/// Payload published on `hermes/intent/<intentName>`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntentMessage {
    pub session_id: String,
    #[serde(default)]
    pub site_id: Option<String>,
    #[serde(default)]
    pub input: String,
    pub intent: Classification,
    #[serde(default)]
    pub slots: Vec<Slot>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub intent_name: String,
    #[serde(default)]
    pub confidence_score: f32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub slot_name: String,
    #[serde(default)]
    pub raw_value: String,
    #[serde(default)]
    pub value: SlotValue,
}

/// `{"kind": "Custom", "value": "apples"}`, `{"kind": "Number", "value": 3.0}`, ...
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SlotValue {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub value: Value,
}

impl Slot {
    /// The resolved value as text, falling back to what was heard.
    pub fn text(&self) -> Option<String> {
        let text = match &self.value.value {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => match n.as_f64() {
                Some(f) if f.fract() == 0.0 => format!("{}", f as i64),
                _ => n.to_string(),
            },
            _ => self.raw_value.trim().to_string(),
        };
        (!text.is_empty()).then_some(text)
    }

    pub fn number(&self) -> Option<f64> {
        match &self.value.value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => self.raw_value.trim().parse().ok(),
        }
    }
}

impl IntentMessage {
    /// Intent name without the `user:` namespace.
    pub fn short_name(&self) -> &str {
        let name = &self.intent.intent_name;
        name.rsplit_once(':').map_or(name.as_str(), |(_, short)| short)
    }

    /// All values of a repeatable slot, in the order they were spoken.
    pub fn slot_values(&self, name: &str) -> Vec<String> {
        self.slots
            .iter()
            .filter(|s| s.slot_name == name)
            .filter_map(Slot::text)
            .collect()
    }

    /// First value of a slot, if it was filled.
    pub fn slot_value(&self, name: &str) -> Option<String> {
        self.slots
            .iter()
            .filter(|s| s.slot_name == name)
            .find_map(Slot::text)
    }

    /// A positive whole quantity, if the slot was filled with one.
    pub fn slot_count(&self, name: &str) -> Option<u32> {
        let n = self
            .slots
            .iter()
            .filter(|s| s.slot_name == name)
            .find_map(Slot::number)?;
        (n >= 1.0 && n <= u32::MAX as f64).then(|| n.round() as u32)
    }
}

/// What the user asked the skill to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add {
        items: Vec<String>,
        list: String,
        quantity: Option<u32>,
    },
    Remove {
        items: Vec<String>,
        list: String,
    },
    Read {
        list: String,
    },
    Check {
        items: Vec<String>,
        list: String,
    },
}

impl Command {
    /// Route an intent. `None` for intents this skill doesn't handle.
    pub fn from_intent(msg: &IntentMessage, default_list: &str) -> Option<Self> {
        let list = msg
            .slot_value(SLOT_LIST)
            .unwrap_or_else(|| default_list.to_string());
        let items = || msg.slot_values(SLOT_ITEM);

        let command = match msg.short_name() {
            INTENT_ADD => Self::Add {
                items: items(),
                list,
                quantity: msg.slot_count(SLOT_QUANTITY),
            },
            INTENT_REMOVE => Self::Remove {
                items: items(),
                list,
            },
            INTENT_READ => Self::Read { list },
            INTENT_CHECK => Self::Check {
                items: items(),
                list,
            },
            _ => return None,
        };
        Some(command)
    }

    pub fn list(&self) -> &str {
        match self {
            Self::Add { list, .. }
            | Self::Remove { list, .. }
            | Self::Read { list }
            | Self::Check { list, .. } => list,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Add { .. } => "add",
            Self::Remove { .. } => "remove",
            Self::Read { .. } => "read",
            Self::Check { .. } => "check",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_name_strips_namespace() {
        let msg: IntentMessage = serde_json::from_str(
            r#"{"sessionId":"s","intent":{"intentName":"jdoe:addToList"}}"#,
        )
        .unwrap();
        assert_eq!(msg.short_name(), "addToList");
    }

    #[test]
    fn short_name_without_namespace() {
        let msg: IntentMessage =
            serde_json::from_str(r#"{"sessionId":"s","intent":{"intentName":"readList"}}"#)
                .unwrap();
        assert_eq!(msg.short_name(), "readList");
    }

    #[test]
    fn number_slot_renders_as_integer() {
        let slot: Slot = serde_json::from_str(
            r#"{"slotName":"quantity","rawValue":"three","value":{"kind":"Number","value":3.0}}"#,
        )
        .unwrap();
        assert_eq!(slot.text().as_deref(), Some("3"));
        assert_eq!(slot.number(), Some(3.0));
    }

    #[test]
    fn missing_value_falls_back_to_raw() {
        let slot: Slot =
            serde_json::from_str(r#"{"slotName":"itemType","rawValue":" eggs "}"#).unwrap();
        assert_eq!(slot.text().as_deref(), Some("eggs"));
    }

    #[test]
    fn blank_slot_is_absent() {
        let slot: Slot = serde_json::from_str(
            r#"{"slotName":"listName","rawValue":"","value":{"kind":"Custom","value":"  "}}"#,
        )
        .unwrap();
        assert_eq!(slot.text(), None);
    }
}
