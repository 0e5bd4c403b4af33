//! Live Document View
//!
//! Mirrors one store document into local view state. The view is either
//! inactive (no subscription, state at its initial value) or active (exactly one
//! open [`Subscription`], state equal to the latest snapshot).
//!
//! The view owns its subscription, so nothing can reach it after it is dropped.
//! Changing the key closes the old subscription before the new one is opened.

use futures::StreamExt;
use iline_types::store_adapter::{DocumentStore, Snapshot, SnapshotStream, SubscriptionOptions};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

use crate::prelude::*;

static NEXT_SUBSCRIPTION_ID: AtomicU64 = AtomicU64::new(1);

/// An open subscription to one store document. Dropping it closes the subscription.
pub struct Subscription {
	id: String,
	opts: SubscriptionOptions,
	stream: SnapshotStream,
	opened_at: Timestamp,
}

impl Subscription {
	pub async fn open(store: &dyn DocumentStore, opts: SubscriptionOptions) -> IlResult<Self> {
		let stream = store.subscribe(opts.clone()).await?;
		let id = format!("sub-{}", NEXT_SUBSCRIPTION_ID.fetch_add(1, Ordering::Relaxed));
		debug!("Subscription opened: path={} (id: {})", opts.path(), id);

		Ok(Self { id, opts, stream, opened_at: Timestamp::now() })
	}

	pub fn id(&self) -> &str {
		&self.id
	}

	pub fn key(&self) -> &str {
		&self.opts.key
	}

	pub fn opened_at(&self) -> Timestamp {
		self.opened_at
	}

	/// Wait for the next snapshot. `None` once the store has ended the subscription.
	pub async fn next(&mut self) -> Option<IlResult<Snapshot>> {
		self.stream.next().await
	}

	pub fn close(self) {
		drop(self);
	}
}

impl std::fmt::Debug for Subscription {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Subscription")
			.field("id", &self.id)
			.field("opts", &self.opts)
			.field("opened_at", &self.opened_at)
			.finish_non_exhaustive()
	}
}

impl Drop for Subscription {
	fn drop(&mut self) {
		debug!("Subscription closed: path={} (id: {})", self.opts.path(), self.id);
	}
}

/// Local state kept equal to the latest snapshot of one store document.
pub struct LiveDocumentView<T> {
	store: Arc<dyn DocumentStore>,
	collection: Box<str>,
	subscription: Option<Subscription>,
	state: watch::Sender<Arc<T>>,
}

impl<T> LiveDocumentView<T>
where
	T: DeserializeOwned + Default + Send + Sync + 'static,
{
	/// Create an inactive view over `collection`.
	pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<Box<str>>) -> Self {
		let (state, _) = watch::channel(Arc::new(T::default()));
		Self { store, collection: collection.into(), subscription: None, state }
	}

	/// Create a view and activate it for `key` (stays inactive when `key` is empty).
	pub async fn mount(
		store: Arc<dyn DocumentStore>,
		collection: impl Into<Box<str>>,
		key: &str,
	) -> IlResult<Self> {
		let mut view = Self::new(store, collection);
		view.set_key(key).await?;
		Ok(view)
	}

	pub fn collection(&self) -> &str {
		&self.collection
	}

	/// Key of the active subscription, empty when inactive.
	pub fn key(&self) -> &str {
		self.subscription.as_ref().map_or("", Subscription::key)
	}

	pub fn is_active(&self) -> bool {
		self.subscription.is_some()
	}

	pub fn subscription(&self) -> Option<&Subscription> {
		self.subscription.as_ref()
	}

	/// Latest view state.
	pub fn state(&self) -> Arc<T> {
		Arc::clone(&*self.state.borrow())
	}

	/// Receiver that is notified on every state replacement. It sees the
	/// channel closed once the view is dropped.
	pub fn watch(&self) -> watch::Receiver<Arc<T>> {
		self.state.subscribe()
	}

	/// Point the view at `key`.
	///
	/// - same key as the active subscription: nothing happens
	/// - empty key: the view becomes inactive
	/// - other key: the current subscription is closed, then a new one is opened
	///
	/// An invalid key is rejected before the current subscription is touched.
	/// If opening fails, the view is left inactive and the error is returned.
	pub async fn set_key(&mut self, key: &str) -> IlResult<()> {
		if self.is_active() && self.key() == key {
			return Ok(());
		}
		if key.is_empty() {
			self.deactivate();
			return Ok(());
		}

		let opts = SubscriptionOptions::document(self.collection.clone(), key)?;
		self.deactivate();

		let subscription = Subscription::open(self.store.as_ref(), opts).await?;
		info!("View active: path={}/{}", self.collection, key);
		self.subscription = Some(subscription);
		Ok(())
	}

	/// Close the subscription (if any) and reset the state to its initial value.
	pub fn deactivate(&mut self) {
		if self.release() {
			self.state.send_replace(Arc::new(T::default()));
		}
	}

	fn release(&mut self) -> bool {
		match self.subscription.take() {
			Some(subscription) => {
				info!("View inactive: path={}/{}", self.collection, subscription.key());
				subscription.close();
				true
			}
			None => false,
		}
	}

	/// Wait for the next notification and replace the state with it.
	///
	/// Returns `None` while the view is inactive. Store errors and undecodable
	/// documents are returned to the caller and leave the state unchanged. When
	/// the store ends the subscription the view becomes inactive and
	/// `Error::Unavailable` is returned.
	pub async fn next(&mut self) -> Option<IlResult<()>> {
		let subscription = self.subscription.as_mut()?;
		match subscription.next().await {
			Some(Ok(snapshot)) => Some(self.apply(&snapshot)),
			Some(Err(err)) => {
				warn!("Subscription error: path={}/{}: {}", self.collection, self.key(), err);
				Some(Err(err))
			}
			None => {
				let key = self.key().to_string();
				warn!("Subscription ended by store: path={}/{}", self.collection, key);
				self.deactivate();
				Some(Err(Error::Unavailable(format!(
					"subscription to {}/{} ended",
					self.collection, key
				))))
			}
		}
	}

	fn apply(&mut self, snapshot: &Snapshot) -> IlResult<()> {
		let value: T = snapshot.decode()?;
		debug!(
			"Snapshot applied: path={}/{} exists={} at={}",
			snapshot.collection,
			snapshot.key,
			snapshot.exists(),
			snapshot.at
		);
		self.state.send_replace(Arc::new(value));
		Ok(())
	}

	/// Tear the view down. No notification is delivered afterwards and
	/// watchers see the state channel closed.
	pub fn dispose(mut self) {
		self.release();
	}
}

impl<T> std::fmt::Debug for LiveDocumentView<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("LiveDocumentView")
			.field("collection", &self.collection)
			.field("subscription", &self.subscription)
			.finish_non_exhaustive()
	}
}

// vim: ts=4
