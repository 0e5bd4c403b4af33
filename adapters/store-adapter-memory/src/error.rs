use iline_types::error::Error as IlineError;
use std::fmt;

/// Internal error type for the memory store adapter
#[derive(Debug)]
pub enum Error {
	InvalidPath(String),
	AccessDenied(String),
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match self {
			Error::InvalidPath(path) => write!(f, "invalid path: {}", path),
			Error::AccessDenied(path) => write!(f, "access denied: {}", path),
		}
	}
}

impl std::error::Error for Error {}

impl From<Error> for IlineError {
	fn from(e: Error) -> Self {
		match e {
			Error::InvalidPath(path) => IlineError::InvalidKey(path),
			Error::AccessDenied(_) => IlineError::PermissionDenied,
		}
	}
}

// vim: ts=4
