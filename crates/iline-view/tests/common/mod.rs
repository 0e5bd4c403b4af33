//! Shared helpers for the view tests.
//!
//! [`RecordingStore`] is a document store double that records, in call order,
//! every subscription it opens (`subscribe:<key>`) and closes (`close:<key>`),
//! and lets a test push snapshots or errors to the open subscription of a key.

#![allow(dead_code)]

use async_trait::async_trait;
use iline_types::error::{Error, IlResult};
use iline_types::store_adapter::{DocumentStore, Snapshot, SnapshotStream, SubscriptionOptions};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

pub fn setup_test_logging() {
	let _ = tracing_subscriber::fmt()
		.with_test_writer()
		.with_max_level(tracing::Level::DEBUG)
		.try_init();
}

type Log = Arc<Mutex<Vec<String>>>;

#[derive(Debug, Default)]
pub struct RecordingStore {
	log: Log,
	senders: Mutex<HashMap<String, (SubscriptionOptions, mpsc::UnboundedSender<IlResult<Snapshot>>)>>,
	deny: Mutex<Vec<String>>,
}

impl RecordingStore {
	pub fn new() -> Arc<Self> {
		Arc::new(Self::default())
	}

	pub fn log(&self) -> Vec<String> {
		self.log.lock().expect("log lock").clone()
	}

	pub fn deny(&self, key: &str) {
		self.deny.lock().expect("deny lock").push(key.to_string());
	}

	/// Deliver a snapshot to the open subscription of `key`. False if none is open.
	pub fn emit(&self, key: &str, data: Option<Value>) -> bool {
		let senders = self.senders.lock().expect("senders lock");
		match senders.get(key) {
			Some((opts, tx)) => tx.send(Ok(Snapshot::new(opts, data))).is_ok(),
			None => false,
		}
	}

	pub fn emit_error(&self, key: &str, err: Error) -> bool {
		let senders = self.senders.lock().expect("senders lock");
		match senders.get(key) {
			Some((_, tx)) => tx.send(Err(err)).is_ok(),
			None => false,
		}
	}

	/// End the subscription of `key` from the store side.
	pub fn end(&self, key: &str) {
		self.senders.lock().expect("senders lock").remove(key);
	}
}

struct CloseRecorder {
	key: String,
	log: Log,
}

impl Drop for CloseRecorder {
	fn drop(&mut self) {
		self.log.lock().expect("log lock").push(format!("close:{}", self.key));
	}
}

#[async_trait]
impl DocumentStore for RecordingStore {
	async fn subscribe(&self, opts: SubscriptionOptions) -> IlResult<SnapshotStream> {
		let key = opts.key.to_string();
		if self.deny.lock().expect("deny lock").contains(&key) {
			return Err(Error::PermissionDenied);
		}

		self.log.lock().expect("log lock").push(format!("subscribe:{}", key));
		let (tx, mut rx) = mpsc::unbounded_channel();
		self.senders.lock().expect("senders lock").insert(key.clone(), (opts, tx));

		let recorder = CloseRecorder { key, log: Arc::clone(&self.log) };
		let stream = async_stream::stream! {
			let _recorder = recorder;
			while let Some(item) = rx.recv().await {
				yield item;
			}
		};

		Ok(Box::pin(stream))
	}
}

// vim: ts=4
