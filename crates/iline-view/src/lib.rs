//! Views of the iLine client.
//!
//! - [`live_view`]: keeps local state mirrored from one store document
//! - [`chats`]: the chat list sidebar, built on a live view of `userChats/<uid>`
//! - [`navbar`]: the navigation bar with the signed-in user and the sign-out button
//! - [`render`]: the visual tree every component renders to

pub mod chats;
pub mod live_view;
pub mod navbar;
pub mod render;

mod prelude;

pub use chats::{ChatContext, ChatsSidebar};
pub use live_view::{LiveDocumentView, Subscription};
pub use navbar::{Navbar, SessionBar};
pub use render::{Element, Node};

// vim: ts=4
