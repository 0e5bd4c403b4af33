#![forbid(unsafe_code)]

mod error;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, info, warn};

pub use error::Error;

use iline_types::error::Error as IlineError;
use iline_types::prelude::*;
use iline_types::store_adapter::*;

/// Adapter configuration options
#[derive(Debug, Clone)]
pub struct AdapterConfig {
	/// Broadcast channel capacity for change notifications
	pub broadcast_capacity: usize,
}

impl Default for AdapterConfig {
	fn default() -> Self {
		Self { broadcast_capacity: 128 }
	}
}

/// A change to one document, fanned out to every subscription.
///
/// `seq` is taken from a store-wide counter under the write lock, so it orders
/// changes exactly as they were applied.
#[derive(Debug, Clone)]
enum ChangeEvent {
	/// New full value; `None` when the document was deleted
	Set { seq: u64, path: Box<str>, data: Option<Value> },
	/// Backend-side failure reported to the document's subscribers
	Fail { seq: u64, path: Box<str>, message: Box<str> },
}

impl ChangeEvent {
	fn seq(&self) -> u64 {
		match self {
			ChangeEvent::Set { seq, .. } | ChangeEvent::Fail { seq, .. } => *seq,
		}
	}

	fn path(&self) -> &str {
		match self {
			ChangeEvent::Set { path, .. } | ChangeEvent::Fail { path, .. } => path,
		}
	}
}

#[derive(Debug, Default)]
struct State {
	/// Sequence number of the latest change, store-wide
	seq: u64,
	documents: HashMap<Box<str>, Value>,
	/// Sequence number of the latest set or delete per document
	versions: HashMap<Box<str>, u64>,
	/// Latest failure reported per document
	failures: HashMap<Box<str>, (u64, Box<str>)>,
}

impl State {
	fn next_seq(&mut self) -> u64 {
		self.seq += 1;
		self.seq
	}

	/// What a subscription that has seen everything up to `since` missed on
	/// `path`, oldest first. Intermediate values are collapsed into the current one.
	fn missed_since(&self, path: &str, since: u64) -> Vec<ChangeEvent> {
		let mut missed = Vec::with_capacity(2);
		if let Some(seq) = self.versions.get(path).copied().filter(|seq| *seq > since) {
			missed.push(ChangeEvent::Set { seq, path: path.into(), data: self.documents.get(path).cloned() });
		}
		if let Some((seq, message)) = self.failures.get(path).filter(|(seq, _)| *seq > since) {
			missed.push(ChangeEvent::Fail { seq: *seq, path: path.into(), message: message.clone() });
		}
		missed.sort_by_key(ChangeEvent::seq);
		missed
	}
}

type Subscribers = Arc<Mutex<HashMap<Box<str>, usize>>>;

/// In-process document store.
///
/// Holds documents in memory and notifies subscriptions through a broadcast
/// channel. It plays the external backend in tests and local runs: writes go
/// through [`MemoryDocumentStore::set`] and [`MemoryDocumentStore::delete`],
/// which are not part of the client-facing [`DocumentStore`] trait.
///
/// Every change is published while the write lock is held, so subscriptions see
/// changes in the order they were stored. A subscription that falls behind the
/// broadcast buffer catches up with the current value (and any failure it
/// missed) and then skips the stale events still buffered.
#[derive(Debug)]
pub struct MemoryDocumentStore {
	state: Arc<RwLock<State>>,
	change_tx: broadcast::Sender<ChangeEvent>,
	subscribers: Subscribers,
	denied: Mutex<HashSet<Box<str>>>,
}

impl MemoryDocumentStore {
	pub fn new(config: AdapterConfig) -> Self {
		let (change_tx, _) = broadcast::channel(config.broadcast_capacity.max(1));
		Self {
			state: Arc::new(RwLock::new(State::default())),
			change_tx,
			subscribers: Arc::new(Mutex::new(HashMap::new())),
			denied: Mutex::new(HashSet::new()),
		}
	}

	/// Replace a document. Returns the number of subscriptions notified.
	pub async fn set(&self, collection: &str, key: &str, data: Value) -> IlResult<usize> {
		let path: Box<str> = document_path(collection, key)?.into();
		let mut state = self.state.write().await;
		let seq = state.next_seq();
		state.documents.insert(path.clone(), data.clone());
		state.versions.insert(path.clone(), seq);
		Ok(self.publish(ChangeEvent::Set { seq, path, data: Some(data) }))
	}

	/// Delete a document. Returns the number of subscriptions notified.
	pub async fn delete(&self, collection: &str, key: &str) -> IlResult<usize> {
		let path: Box<str> = document_path(collection, key)?.into();
		let mut state = self.state.write().await;
		if state.documents.remove(&path).is_none() {
			return Ok(0);
		}
		let seq = state.next_seq();
		state.versions.insert(path.clone(), seq);
		Ok(self.publish(ChangeEvent::Set { seq, path, data: None }))
	}

	pub async fn get(&self, collection: &str, key: &str) -> IlResult<Option<Value>> {
		let path = document_path(collection, key)?;
		Ok(self.state.read().await.documents.get(path.as_str()).cloned())
	}

	/// Report a backend failure to every subscription of a document.
	pub async fn fail(&self, collection: &str, key: &str, message: &str) -> IlResult<usize> {
		let path: Box<str> = document_path(collection, key)?.into();
		let message: Box<str> = message.into();
		let mut state = self.state.write().await;
		let seq = state.next_seq();
		state.failures.insert(path.clone(), (seq, message.clone()));
		Ok(self.publish(ChangeEvent::Fail { seq, path, message }))
	}

	/// Refuse new subscriptions to a document, as a permission rule would.
	pub fn deny(&self, collection: &str, key: &str) -> IlResult<()> {
		let path = document_path(collection, key)?;
		self.denied.lock().insert(path.into());
		Ok(())
	}

	/// Number of open subscriptions to a document
	pub fn subscriber_count(&self, collection: &str, key: &str) -> usize {
		let path = format!("{}/{}", collection, key);
		self.subscribers.lock().get(path.as_str()).copied().unwrap_or(0)
	}

	/// Must be called with the state write lock held.
	fn publish(&self, event: ChangeEvent) -> usize {
		let count = self.subscribers.lock().get(event.path()).copied().unwrap_or(0);
		debug!("Publishing change: path={} seq={} subscribers={}", event.path(), event.seq(), count);
		// No receivers at all is not an error for a store
		let _ = self.change_tx.send(event);
		count
	}
}

impl Default for MemoryDocumentStore {
	fn default() -> Self {
		Self::new(AdapterConfig::default())
	}
}

fn document_path(collection: &str, key: &str) -> Result<String, Error> {
	if collection.is_empty() || collection.contains('/') {
		return Err(Error::InvalidPath(collection.to_string()));
	}
	if key.is_empty() || key.contains('/') {
		return Err(Error::InvalidPath(format!("{}/{}", collection, key)));
	}
	Ok(format!("{}/{}", collection, key))
}

/// Counts one open subscription for as long as it lives
struct SubscriberGuard {
	path: Box<str>,
	subscribers: Subscribers,
}

impl SubscriberGuard {
	fn new(path: Box<str>, subscribers: Subscribers) -> Self {
		*subscribers.lock().entry(path.clone()).or_insert(0) += 1;
		Self { path, subscribers }
	}
}

impl Drop for SubscriberGuard {
	fn drop(&mut self) {
		let mut subscribers = self.subscribers.lock();
		if let Some(count) = subscribers.get_mut(&self.path) {
			*count = count.saturating_sub(1);
			if *count == 0 {
				subscribers.remove(&self.path);
			}
		}
		debug!("Subscriber released: path={}", self.path);
	}
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
	async fn subscribe(&self, opts: SubscriptionOptions) -> IlResult<SnapshotStream> {
		let path = document_path(&opts.collection, &opts.key)?;
		if self.denied.lock().contains(path.as_str()) {
			warn!("Subscription denied: path={}", path);
			return Err(Error::AccessDenied(path).into());
		}

		// Subscribe to broadcast FIRST so no change is lost between read and subscribe
		let mut rx = self.change_tx.subscribe();
		let guard = SubscriberGuard::new(path.clone().into(), Arc::clone(&self.subscribers));
		let (initial, mut seen) = {
			let state = self.state.read().await;
			(state.documents.get(path.as_str()).cloned(), state.seq)
		};
		let shared = Arc::clone(&self.state);
		info!("Subscribed: path={}", path);

		let stream = async_stream::stream! {
			let _guard = guard;

			if initial.is_some() {
				yield Ok(Snapshot::new(&opts, initial));
			}

			loop {
				let missed = match rx.recv().await {
					// Events at or below `seen` are already reflected in what was delivered
					Ok(event) if event.path() == path && event.seq() > seen => vec![event],
					Ok(_) => continue,
					Err(broadcast::error::RecvError::Lagged(n)) => {
						warn!("Subscription lagged, missed {} events: path={}", n, path);
						let state = shared.read().await;
						let missed = state.missed_since(&path, seen);
						seen = state.seq;
						missed
					}
					Err(broadcast::error::RecvError::Closed) => break,
				};

				for event in missed {
					seen = seen.max(event.seq());
					match event {
						ChangeEvent::Set { data, .. } => {
							yield Ok(Snapshot::new(&opts, data));
						}
						ChangeEvent::Fail { message, .. } => {
							yield Err(IlineError::Unavailable(message.into()));
						}
					}
				}
			}
		};

		Ok(Box::pin(stream))
	}
}

// vim: ts=4
