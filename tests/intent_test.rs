use groceries_skill::intent::{Command, IntentMessage};

fn parse(json: &str) -> IntentMessage {
    serde_json::from_str(json).unwrap()
}

#[test]
fn add_with_items_and_list() {
    let msg = parse(
        r#"{
            "sessionId": "s1",
            "input": "add apples and pears to my costco list",
            "intent": { "intentName": "jdoe:addToList", "confidenceScore": 0.87 },
            "slots": [
                { "slotName": "itemType", "rawValue": "apples", "value": { "kind": "Custom", "value": "apples" } },
                { "slotName": "itemType", "rawValue": "pears", "value": { "kind": "Custom", "value": "pears" } },
                { "slotName": "listName", "rawValue": "costco", "value": { "kind": "Custom", "value": "Costco" } }
            ]
        }"#,
    );

    assert_eq!(
        Command::from_intent(&msg, "Shopping List"),
        Some(Command::Add {
            items: vec!["apples".to_string(), "pears".to_string()],
            list: "Costco".to_string(),
            quantity: None,
        })
    );
}

#[test]
fn absent_list_slot_falls_back_to_default() {
    let msg = parse(
        r#"{
            "sessionId": "s1",
            "intent": { "intentName": "jdoe:checkList" },
            "slots": [
                { "slotName": "itemType", "rawValue": "milk", "value": { "kind": "Custom", "value": "milk" } }
            ]
        }"#,
    );

    let command = Command::from_intent(&msg, "Shopping List").unwrap();
    assert_eq!(command.list(), "Shopping List");
    assert_eq!(command.kind(), "check");
}

#[test]
fn remove_and_read_route() {
    let remove = parse(r#"{"sessionId":"s","intent":{"intentName":"removeFromList"}}"#);
    let read = parse(r#"{"sessionId":"s","intent":{"intentName":"user_x:readList"}}"#);

    assert!(matches!(
        Command::from_intent(&remove, "L"),
        Some(Command::Remove { items, .. }) if items.is_empty()
    ));
    assert_eq!(
        Command::from_intent(&read, "L"),
        Some(Command::Read {
            list: "L".to_string()
        })
    );
}

#[test]
fn unknown_intent_is_not_routed() {
    let msg = parse(r#"{"sessionId":"s","intent":{"intentName":"jdoe:setTimer"}}"#);
    assert_eq!(Command::from_intent(&msg, "L"), None);
}

#[test]
fn non_positive_quantity_is_dropped() {
    let msg = parse(
        r#"{
            "sessionId": "s",
            "intent": { "intentName": "addToList" },
            "slots": [
                { "slotName": "itemType", "rawValue": "eggs", "value": { "kind": "Custom", "value": "eggs" } },
                { "slotName": "quantity", "rawValue": "zero", "value": { "kind": "Number", "value": 0.0 } }
            ]
        }"#,
    );
    assert!(matches!(
        Command::from_intent(&msg, "L"),
        Some(Command::Add { quantity: None, .. })
    ));
}

#[test]
fn slot_lookups_are_explicit() {
    let msg = parse(
        r#"{
            "sessionId": "s",
            "intent": { "intentName": "addToList" },
            "slots": [
                { "slotName": "itemType", "rawValue": "eggs", "value": { "kind": "Custom", "value": "eggs" } }
            ]
        }"#,
    );
    assert_eq!(msg.slot_value("listName"), None);
    assert_eq!(msg.slot_value("itemType").as_deref(), Some("eggs"));
    assert_eq!(msg.slot_values("itemType"), ["eggs"]);
    assert_eq!(msg.slot_count("quantity"), None);
}
