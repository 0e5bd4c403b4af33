//! Error type shared by the iLine crates and adapters.

use std::fmt;

pub type IlResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	/// Identity fields were read while no user is signed in
	MissingIdentity,
	NotFound,
	PermissionDenied,
	InvalidKey(String),
	Parse(String),
	/// The external service could not be reached or closed the subscription
	Unavailable(String),
	Internal(String),
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Error::MissingIdentity => write!(f, "missing identity: no user is signed in"),
			Error::NotFound => write!(f, "not found"),
			Error::PermissionDenied => write!(f, "permission denied"),
			Error::InvalidKey(key) => write!(f, "invalid document key: {:?}", key),
			Error::Parse(msg) => write!(f, "parse error: {}", msg),
			Error::Unavailable(msg) => write!(f, "service unavailable: {}", msg),
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
		}
	}
}

impl std::error::Error for Error {}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Self::Parse(err.to_string())
	}
}


// vim: ts=4
