use std::collections::HashMap;

use halte::realtime::{self, FeedError, PassFilter, StopFeed};
use serde_json::{Value, json};

/// In-memory feed keyed by stop code; missing codes fail like the network.
struct StaticFeed {
    payloads: HashMap<String, Value>,
}

impl StaticFeed {
    fn new(entries: Vec<(&str, Value)>) -> Self {
        Self {
            payloads: entries
                .into_iter()
                .map(|(code, payload)| (code.to_string(), payload))
                .collect(),
        }
    }
}

impl StopFeed for StaticFeed {
    async fn fetch_stop(&self, code: &str) -> Result<Value, FeedError> {
        self.payloads
            .get(code)
            .cloned()
            .ok_or_else(|| FeedError::Fetch {
                code: code.to_string(),
                message: "connection refused".to_string(),
            })
    }
}

fn single_pass_payload(code: &str, line: &str, expected: &str) -> Value {
    json!({
        code: {
            "Passes": {
                "0": {
                    "LinePublicNumber": line,
                    "DestinationName50": "Centraal Station",
                    "ExpectedArrivalTime": expected,
                    "TransportType": "BUS"
                }
            }
        }
    })
}

#[tokio::test]
async fn combined_list_is_globally_time_ordered() {
    let feed = StaticFeed::new(vec![
        ("A", single_pass_payload("A", "22", "2025-12-01T10:00:00")),
        ("B", single_pass_payload("B", "23", "2025-12-01T09:55:00")),
    ]);
    let codes = vec!["A".to_string(), "B".to_string()];
    let passes = realtime::fetch_and_combine(&feed, &codes, &PassFilter::default())
        .await
        .unwrap();
    assert_eq!(passes.len(), 2);
    // The "B" pass leaves first even though "A" was fetched first.
    assert_eq!(passes[0].origin_stop_code, "B");
    assert_eq!(passes[1].origin_stop_code, "A");
}

#[tokio::test]
async fn filters_apply_across_all_stops() {
    let feed = StaticFeed::new(vec![
        ("A", single_pass_payload("A", "22", "2025-12-01T10:00:00")),
        ("B", single_pass_payload("B", "23", "2025-12-01T09:55:00")),
    ]);
    let codes = vec!["A".to_string(), "B".to_string()];
    let filter = PassFilter::new(Some("22".into()), None);
    let passes = realtime::fetch_and_combine(&feed, &codes, &filter)
        .await
        .unwrap();
    assert_eq!(passes.len(), 1);
    assert_eq!(passes[0].origin_stop_code, "A");
}

#[tokio::test]
async fn one_failing_stop_fails_the_whole_call() {
    let feed = StaticFeed::new(vec![(
        "A",
        single_pass_payload("A", "22", "2025-12-01T10:00:00"),
    )]);
    let codes = vec!["A".to_string(), "offline".to_string()];
    let result = realtime::fetch_and_combine(&feed, &codes, &PassFilter::default()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn unrecognized_payload_shape_fails_the_whole_call() {
    let feed = StaticFeed::new(vec![
        ("A", single_pass_payload("A", "22", "2025-12-01T10:00:00")),
        ("B", json!({"B": "downtime"})),
    ]);
    let codes = vec!["A".to_string(), "B".to_string()];
    let result = realtime::fetch_and_combine(&feed, &codes, &PassFilter::default()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn probe_keeps_only_live_stops() {
    let feed = StaticFeed::new(vec![
        ("A", single_pass_payload("A", "22", "2025-12-01T10:00:00")),
        ("empty", json!({"empty": {"Passes": {}}})),
        ("junk", json!({"junk": 42})),
    ]);
    let codes = vec![
        "A".to_string(),
        "empty".to_string(),
        "junk".to_string(),
        "offline".to_string(),
    ];
    let live = realtime::probe_stops(&feed, &codes).await;
    assert_eq!(live, vec!["A".to_string()]);
}
