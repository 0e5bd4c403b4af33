use futures::StreamExt;
use iline_store_adapter_memory::{AdapterConfig, MemoryDocumentStore};
use iline_types::error::{Error, IlResult};
use iline_types::store_adapter::{DocumentStore, Snapshot, SnapshotStream, SubscriptionOptions};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn opts(key: &str) -> SubscriptionOptions {
	SubscriptionOptions::document("userChats", key).expect("valid key")
}

#[tokio::test]
async fn test_existing_document_delivered_first() {
	let store = MemoryDocumentStore::default();
	store.set("userChats", "u1", json!({ "chatA": {} })).await.expect("set");

	let mut stream = store.subscribe(opts("u1")).await.expect("subscribe");
	let snapshot = stream.next().await.expect("snapshot").expect("no error");

	assert_eq!(snapshot.key.as_ref(), "u1");
	assert_eq!(snapshot.data, Some(json!({ "chatA": {} })));
}

#[tokio::test]
async fn test_missing_document_yields_nothing_until_set() {
	let store = MemoryDocumentStore::default();
	let mut stream = store.subscribe(opts("user42")).await.expect("subscribe");

	let pending = tokio::time::timeout(Duration::from_millis(20), stream.next()).await;
	assert!(pending.is_err(), "nothing should be delivered for a missing document");

	let notified = store.set("userChats", "user42", json!({ "chatA": {} })).await.expect("set");
	assert_eq!(notified, 1);

	let snapshot = stream.next().await.expect("snapshot").expect("no error");
	assert_eq!(snapshot.data, Some(json!({ "chatA": {} })));
}

#[tokio::test]
async fn test_other_documents_are_filtered_out() {
	let store = MemoryDocumentStore::default();
	let mut stream = store.subscribe(opts("u1")).await.expect("subscribe");

	store.set("userChats", "u2", json!({ "x": 1 })).await.expect("set");
	store.set("userChats", "u1", json!({ "y": 2 })).await.expect("set");

	let snapshot = stream.next().await.expect("snapshot").expect("no error");
	assert_eq!(snapshot.key.as_ref(), "u1");
	assert_eq!(snapshot.data, Some(json!({ "y": 2 })));
}

#[tokio::test]
async fn test_delete_delivers_empty_snapshot() {
	let store = MemoryDocumentStore::default();
	store.set("userChats", "u1", json!({ "chatA": {} })).await.expect("set");
	let mut stream = store.subscribe(opts("u1")).await.expect("subscribe");
	let _initial = stream.next().await;

	assert_eq!(store.delete("userChats", "u1").await.expect("delete"), 1);
	let snapshot = stream.next().await.expect("snapshot").expect("no error");
	assert!(!snapshot.exists());

	// Deleting again is a no-op
	assert_eq!(store.delete("userChats", "u1").await.expect("delete"), 0);
}

#[tokio::test]
async fn test_dropping_stream_releases_subscriber() {
	let store = MemoryDocumentStore::default();
	let stream = store.subscribe(opts("u1")).await.expect("subscribe");
	assert_eq!(store.subscriber_count("userChats", "u1"), 1);

	drop(stream);
	assert_eq!(store.subscriber_count("userChats", "u1"), 0);
	assert_eq!(store.set("userChats", "u1", json!({})).await.expect("set"), 0);
}

#[tokio::test]
async fn test_fail_is_delivered_as_error() {
	let store = MemoryDocumentStore::default();
	let mut stream = store.subscribe(opts("u1")).await.expect("subscribe");

	store.fail("userChats", "u1", "connection reset").await.expect("fail");
	let item = stream.next().await.expect("item");
	assert!(matches!(item, Err(Error::Unavailable(msg)) if msg == "connection reset"));
}

#[tokio::test]
async fn test_denied_subscription() {
	let store = MemoryDocumentStore::default();
	store.deny("userChats", "u1").expect("deny");

	let result = store.subscribe(opts("u1")).await;
	assert!(matches!(result, Err(Error::PermissionDenied)));
	assert_eq!(store.subscriber_count("userChats", "u1"), 0);
}

/// Everything the stream delivers until it goes quiet
async fn drain(stream: &mut SnapshotStream) -> Vec<IlResult<Snapshot>> {
	let mut items = Vec::new();
	while let Ok(Some(item)) = tokio::time::timeout(Duration::from_millis(20), stream.next()).await {
		items.push(item);
	}
	items
}

fn counter(snapshot: &Snapshot) -> i64 {
	snapshot.data.as_ref().and_then(|data| data["n"].as_i64()).expect("counter document")
}

#[tokio::test]
async fn test_lagged_subscription_never_goes_backwards() {
	let store = MemoryDocumentStore::new(AdapterConfig { broadcast_capacity: 2 });
	let mut stream = store.subscribe(opts("u1")).await.expect("subscribe");

	for i in 0..5 {
		store.set("userChats", "u1", json!({ "n": i })).await.expect("set");
	}

	let delivered: Vec<i64> =
		drain(&mut stream).await.iter().map(|item| counter(item.as_ref().expect("no error"))).collect();

	assert_eq!(delivered.last(), Some(&4));
	assert!(delivered.windows(2).all(|w| w[0] < w[1]), "delivery went backwards: {:?}", delivered);

	store.set("userChats", "u1", json!({ "n": 5 })).await.expect("set");
	let after: Vec<i64> =
		drain(&mut stream).await.iter().map(|item| counter(item.as_ref().expect("no error"))).collect();
	assert_eq!(after, vec![5]);
}

#[tokio::test]
async fn test_lagged_subscription_keeps_missed_failure() {
	let store = MemoryDocumentStore::new(AdapterConfig { broadcast_capacity: 2 });
	let mut stream = store.subscribe(opts("u1")).await.expect("subscribe");

	store.fail("userChats", "u1", "permission revoked").await.expect("fail");
	for i in 0..4 {
		store.set("userChats", "u1", json!({ "n": i })).await.expect("set");
	}

	let items = drain(&mut stream).await;
	let errors: Vec<&Error> = items.iter().filter_map(|item| item.as_ref().err()).collect();
	assert_eq!(errors.len(), 1);
	assert!(matches!(errors[0], Error::Unavailable(msg) if msg == "permission revoked"));

	// The failure came first, so the latest value is the last item
	let last = items.last().expect("items").as_ref().expect("value after failure");
	assert_eq!(counter(last), 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writers_last_delivered_matches_stored() {
	let store = Arc::new(MemoryDocumentStore::default());

	for round in 0..50 {
		let mut stream = store.subscribe(opts("u1")).await.expect("subscribe");

		let writers: Vec<_> = (0..8)
			.map(|i| {
				let store = Arc::clone(&store);
				tokio::spawn(async move { store.set("userChats", "u1", json!({ "n": i })).await })
			})
			.collect();
		for writer in writers {
			writer.await.expect("writer task").expect("set");
		}

		let stored = store.get("userChats", "u1").await.expect("get");
		let last = drain(&mut stream).await.pop().expect("delivered").expect("no error");
		assert_eq!(last.data, stored, "round {}", round);
	}
}

#[tokio::test]
async fn test_invalid_paths() {
	let store = MemoryDocumentStore::default();
	assert!(matches!(store.set("userChats", "a/b", json!({})).await, Err(Error::InvalidKey(_))));
	assert!(matches!(store.get("", "u1").await, Err(Error::InvalidKey(_))));
}

// vim: ts=4
