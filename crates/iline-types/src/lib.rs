//! Shared types, adapter traits, and error types for the iLine chat client.
//!
//! The document store and the auth service are external collaborators. This
//! crate only defines the narrow interfaces the client needs from them, so view
//! code and adapter implementations can depend on it without depending on each
//! other.

pub mod auth_adapter;
pub mod error;
pub mod prelude;
pub mod store_adapter;
pub mod types;

// vim: ts=4
