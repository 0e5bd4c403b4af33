//! Document Store Adapter
//!
//! Trait and types for the external real-time document store. The client only
//! observes documents: it opens a subscription for `collection/key` and receives
//! the full document value every time it changes.
//!
//! A subscription is the returned stream. Dropping the stream closes it, and an
//! implementation must not deliver anything through it afterwards.

use async_trait::async_trait;
use futures_core::Stream;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::skip_serializing_none;
use std::fmt::Debug;
use std::pin::Pin;

use crate::prelude::*;

/// Stream of snapshots for one subscribed document
pub type SnapshotStream = Pin<Box<dyn Stream<Item = IlResult<Snapshot>> + Send>>;

/// Addresses one document in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionOptions {
	/// Collection name (e.g. "userChats")
	pub collection: Box<str>,

	/// Document key inside the collection (e.g. the user's uid)
	pub key: Box<str>,
}

impl SubscriptionOptions {
	/// Subscribe to a single document. Fails on keys that are not a single path segment.
	pub fn document(collection: impl Into<Box<str>>, key: impl Into<Box<str>>) -> IlResult<Self> {
		let key = key.into();
		validate_key(&key)?;
		Ok(Self { collection: collection.into(), key })
	}

	/// Full document path, `collection/key`
	pub fn path(&self) -> String {
		format!("{}/{}", self.collection, self.key)
	}
}

/// A document key must be a non-empty single path segment.
pub fn validate_key(key: &str) -> IlResult<()> {
	if key.is_empty() || key.contains('/') {
		return Err(Error::InvalidKey(key.to_string()));
	}
	Ok(())
}

/// Full value of a document at one point in time.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
	pub collection: Box<str>,
	pub key: Box<str>,

	/// Document content; `None` when the document does not exist
	pub data: Option<Value>,

	/// When the store produced this snapshot
	pub at: Timestamp,
}

impl Snapshot {
	pub fn new(opts: &SubscriptionOptions, data: Option<Value>) -> Self {
		Self {
			collection: opts.collection.clone(),
			key: opts.key.clone(),
			data,
			at: Timestamp::now(),
		}
	}

	pub fn exists(&self) -> bool {
		self.data.is_some()
	}

	/// Decode the document content. A missing document decodes to `T::default()`.
	pub fn decode<T: DeserializeOwned + Default>(&self) -> IlResult<T> {
		match &self.data {
			Some(data) => Ok(T::deserialize(data)?),
			None => Ok(T::default()),
		}
	}
}

/// Document Store Adapter trait.
///
/// Implemented by clients of the external real-time backend.
#[async_trait]
pub trait DocumentStore: Debug + Send + Sync {
	/// Open a subscription to one document.
	///
	/// The stream yields the current value first (when the document exists) and
	/// then one snapshot per change, in the store's delivery order. Errors from
	/// the backend are yielded as `Err` items; no retry is attempted.
	async fn subscribe(&self, opts: SubscriptionOptions) -> IlResult<SnapshotStream>;
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::ChatSummaryMap;
	use serde_json::json;

	#[test]
	fn test_document_rejects_bad_keys() {
		assert!(matches!(
			SubscriptionOptions::document("userChats", ""),
			Err(Error::InvalidKey(_))
		));
		assert!(matches!(
			SubscriptionOptions::document("userChats", "a/b"),
			Err(Error::InvalidKey(_))
		));
	}

	#[test]
	fn test_path() {
		let opts = SubscriptionOptions::document("userChats", "user42").expect("valid key");
		assert_eq!(opts.path(), "userChats/user42");
	}

	#[test]
	fn test_decode_missing_document_is_default() {
		let opts = SubscriptionOptions::document("userChats", "u1").expect("valid key");
		let snapshot = Snapshot::new(&opts, None);
		let chats: ChatSummaryMap = snapshot.decode().expect("decode");
		assert!(chats.is_empty());
		assert!(!snapshot.exists());
	}

	#[test]
	fn test_decode_wrong_shape() {
		let opts = SubscriptionOptions::document("userChats", "u1").expect("valid key");
		let snapshot = Snapshot::new(&opts, Some(json!(["not", "a", "map"])));
		assert!(matches!(snapshot.decode::<ChatSummaryMap>(), Err(Error::Parse(_))));
	}
}

// vim: ts=4
