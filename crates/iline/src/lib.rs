//! iLine is a chat client core.
//!
//! # Features
//!
//! - Chat list sidebar kept live from the `userChats/<uid>` document
//! - Navigation bar with the signed-in user and sign-out
//! - Store and auth backends behind adapter traits
//!     - the client only subscribes, renders and signs out
//!     - in-memory adapters for tests and local runs

// Re-export shared types and adapter traits from iline-types
pub use iline_types::auth_adapter;
pub use iline_types::error;
pub use iline_types::store_adapter;
pub use iline_types::types;

// Feature crate re-exports
pub use iline_view as view;

// Local modules
pub mod app;
pub mod prelude;

pub use crate::app::{App, AppBuilder, AppOpts};

// vim: ts=4
