//! Domain types shared across the client crates.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::SystemTime;

// Timestamp //
//***********//
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
	pub fn now() -> Timestamp {
		let res = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default();
		Timestamp(i64::try_from(res.as_millis()).unwrap_or(i64::MAX))
	}
}

impl std::fmt::Display for Timestamp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

// Identity //
//**********//
/// Profile of the signed-in user, as published by the auth service.
///
/// Read-only for the client. It appears after sign-in and is cleared on sign-out.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
	/// Opaque user id, also the key of the user's chat list document
	pub uid: Box<str>,
	#[serde(rename = "displayName")]
	pub display_name: Box<str>,
	#[serde(rename = "photoURL")]
	pub photo_url: Box<str>,
}

impl Identity {
	pub fn new(
		uid: impl Into<Box<str>>,
		display_name: impl Into<Box<str>>,
		photo_url: impl Into<Box<str>>,
	) -> Self {
		Self { uid: uid.into(), display_name: display_name.into(), photo_url: photo_url.into() }
	}
}

// ChatSummaryMap //
//****************//
/// Chat id -> summary record. The record shape belongs to the backend and is kept opaque.
pub type ChatSummaryMap = BTreeMap<String, Value>;

/// Collection holding one chat list document per user
pub const USER_CHATS_COLLECTION: &str = "userChats";


// vim: ts=4
