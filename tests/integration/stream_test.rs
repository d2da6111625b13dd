//! Store behavior across an initial batch followed by live updates.

use super::{init_test_env, json_exchange, serialized};
use serde_json::json;
use txn_inspector::replay::ReplayRequest;
use txn_inspector::store::{EventOutcome, Inspector, InspectorEvent, StoreError, TransactionStore};

fn batch_json(ids: &[&str]) -> String {
    let txns: Vec<serde_json::Value> = ids
        .iter()
        .map(|id| {
            let record = json_exchange(200, "OK", r#"{"id":1}"#).to_record_with_id(*id);
            serde_json::to_value(record).unwrap()
        })
        .collect();
    json!({
        "Txns": txns,
        "UiState": {"Tunnels": [{"PublicUrl": "https://abc.example.io", "Proto": "https"}]}
    })
    .to_string()
}

#[test]
fn test_initial_batch_activates_only_the_first_record() {
    init_test_env();
    let mut store = TransactionStore::default();
    store
        .initialize_from_json(&batch_json(&["c", "b", "a"]))
        .unwrap();

    let ids: Vec<&str> = store.all().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["c", "b", "a"]);
    assert_eq!(store.get_active().unwrap().id, "c");
    assert!(store.get("c").unwrap().is_processed());
    assert!(!store.get("b").unwrap().is_processed());
    assert!(store
        .all()
        .iter()
        .all(|t| t.formatted_duration.as_deref() == Some("2.34ms")));
    assert_eq!(store.tunnels().len(), 1);
}

#[test]
fn test_streamed_records_wait_until_selected() {
    init_test_env();
    let mut store = TransactionStore::default();
    store.initialize_from_json(&batch_json(&["a"])).unwrap();

    let id = store
        .add_streamed(&serialized(&json_exchange(404, "Not Found", "{}"), "new"))
        .unwrap();
    assert_eq!(id, "new");
    assert_eq!(store.all()[0].id, "new");
    assert_eq!(store.get_active().unwrap().id, "a");
    assert!(!store.get("new").unwrap().is_processed());

    store.activate("new").unwrap();
    let first = store.get("new").unwrap().clone();
    assert!(first.is_processed());

    store.activate("a").unwrap();
    store.activate("new").unwrap();
    assert_eq!(store.get("new").unwrap(), &first);
}

#[test]
fn test_empty_batch_then_first_stream_is_activated() {
    init_test_env();
    let mut store = TransactionStore::default();
    store.initialize_from_json("[]").unwrap();
    assert!(store.get_active().is_none());
    assert!(store.replay_request().is_none());

    store
        .add_streamed(&serialized(&json_exchange(200, "OK", "[]"), "first"))
        .unwrap();
    assert_eq!(store.replay_request(), Some(ReplayRequest::new("first")));
}

#[test]
fn test_corrupt_record_stays_unprocessed() {
    init_test_env();
    let mut store = TransactionStore::default();
    let mut record = json_exchange(200, "OK", "{}").to_record_with_id("bad");
    record.response.raw_encoded = Some("not base64!".to_string());
    let json = serde_json::to_string(&record).unwrap();

    let err = store.add_streamed(&json).unwrap_err();
    assert!(matches!(err, StoreError::Decode { .. }));
    assert_eq!(err.transaction_id(), Some("bad"));

    let active = store.get_active().unwrap();
    assert_eq!(active.id, "bad");
    assert!(!active.is_processed());
    assert!(active.response.hex_dump.is_none());
}

#[test]
fn test_event_sequence() {
    init_test_env();
    let mut inspector = Inspector::default();
    let outcomes = inspector.run(vec![
        InspectorEvent::Connected,
        InspectorEvent::Message(serialized(&json_exchange(200, "OK", "{}"), "one")),
        InspectorEvent::Message(serialized(&json_exchange(500, "Oops", "{}"), "two")),
        InspectorEvent::Message(serialized(&json_exchange(500, "Oops", "{}"), "two")),
        InspectorEvent::Select("two".to_string()),
        InspectorEvent::Replay,
        InspectorEvent::Disconnected("closed".to_string()),
    ]);

    assert_eq!(outcomes.len(), 7);
    assert_eq!(outcomes[0], EventOutcome::Ignored);
    assert_eq!(
        outcomes[1],
        EventOutcome::Inserted {
            id: "one".to_string(),
            activated: true
        }
    );
    assert_eq!(
        outcomes[2],
        EventOutcome::Inserted {
            id: "two".to_string(),
            activated: false
        }
    );
    assert!(matches!(
        outcomes[3],
        EventOutcome::Rejected(StoreError::DuplicateTransaction(_))
    ));
    assert_eq!(outcomes[4], EventOutcome::Activated("two".to_string()));
    assert_eq!(outcomes[5], EventOutcome::Replay(ReplayRequest::new("two")));
    assert_eq!(outcomes[6], EventOutcome::Ignored);
    assert_eq!(inspector.store().len(), 2);
}
