//! Navigation bar with the signed-in user.

use iline_types::auth_adapter::{AuthService, IdentityContext};
use std::sync::Arc;
use tokio::task::JoinHandle;

use crate::prelude::*;
use crate::render::{Element, Node};

/// `data-action` of the sign-out button
pub const SIGN_OUT_ACTION: &str = "logout";

/// Shows who is signed in and offers sign-out.
///
/// Built from an [`Identity`] value, so it cannot exist without one. Use
/// [`SessionBar::from_context`] to build it from the shared identity context.
#[derive(Debug, Clone)]
pub struct SessionBar {
	identity: Identity,
	auth: Arc<dyn AuthService>,
}

impl SessionBar {
	pub fn new(identity: Identity, auth: Arc<dyn AuthService>) -> Self {
		Self { identity, auth }
	}

	/// Fails with `MissingIdentity` when nobody is signed in.
	pub fn from_context(ctx: &IdentityContext, auth: Arc<dyn AuthService>) -> IlResult<Self> {
		Ok(Self::new(ctx.require()?, auth))
	}

	pub fn identity(&self) -> &Identity {
		&self.identity
	}

	/// Avatar, display name and sign-out button, as given by the identity.
	pub fn render(&self) -> Node {
		Element::new("div")
			.class("user")
			.child(Element::new("img").attr("src", self.identity.photo_url.clone()).attr("alt", ""))
			.child(Element::new("span").text(self.identity.display_name.clone()))
			.child(Element::new("button").attr("data-action", SIGN_OUT_ACTION).text("logout"))
			.into()
	}

	/// Sign-out button click. Starts exactly one sign-out call on the auth
	/// service and returns without waiting for it. A failure is only logged.
	///
	/// # Panics
	///
	/// The call is spawned on the current tokio runtime, so this panics when
	/// called outside of one.
	pub fn sign_out(&self) -> JoinHandle<()> {
		let auth = Arc::clone(&self.auth);
		let uid = self.identity.uid.clone();
		info!("Sign-out requested: uid={}", uid);

		tokio::spawn(async move {
			if let Err(err) = auth.sign_out().await {
				warn!("Sign-out failed: uid={}: {}", uid, err);
			}
		})
	}
}

#[derive(Debug, Clone)]
pub struct Navbar {
	logo: Box<str>,
	session: SessionBar,
}

impl Navbar {
	pub fn new(logo: impl Into<Box<str>>, session: SessionBar) -> Self {
		Self { logo: logo.into(), session }
	}

	pub fn session(&self) -> &SessionBar {
		&self.session
	}

	pub fn render(&self) -> Node {
		Element::new("div")
			.class("navbar")
			.child(Element::new("span").class("logo").text(self.logo.clone()))
			.child(self.session.render())
			.into()
	}
}

// vim: ts=4
