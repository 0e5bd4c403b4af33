//! Auth service adapter and the shared identity context.
//!
//! The auth flow itself lives outside the client. It publishes the signed-in
//! identity through an [`IdentityProvider`]; components read it through cloned
//! [`IdentityContext`] handles and never write to it.

use async_trait::async_trait;
use std::fmt::Debug;
use tokio::sync::watch;

use crate::prelude::*;

/// Auth service adapter trait.
#[async_trait]
pub trait AuthService: Debug + Send + Sync {
	/// Read handle on the identity published by this service.
	fn identity_context(&self) -> IdentityContext;

	/// End the current session.
	async fn sign_out(&self) -> IlResult<()>;
}

/// Writer side of the identity context, held by the auth flow.
#[derive(Debug)]
pub struct IdentityProvider {
	tx: watch::Sender<Option<Identity>>,
}

impl IdentityProvider {
	pub fn new() -> Self {
		let (tx, _) = watch::channel(None);
		Self { tx }
	}

	pub fn context(&self) -> IdentityContext {
		IdentityContext { rx: self.tx.subscribe() }
	}

	/// Publish a new identity, or `None` on sign-out.
	pub fn set(&self, identity: Option<Identity>) {
		match &identity {
			Some(identity) => info!("Identity set: uid={}", identity.uid),
			None => info!("Identity cleared"),
		}
		self.tx.send_replace(identity);
	}

	pub fn current(&self) -> Option<Identity> {
		self.tx.borrow().clone()
	}
}

impl Default for IdentityProvider {
	fn default() -> Self {
		Self::new()
	}
}

/// Read-only view of the current identity.
#[derive(Debug, Clone)]
pub struct IdentityContext {
	rx: watch::Receiver<Option<Identity>>,
}

impl IdentityContext {
	/// A context fixed to one value, with no provider behind it.
	pub fn fixed(identity: Option<Identity>) -> Self {
		let (_tx, rx) = watch::channel(identity);
		Self { rx }
	}

	pub fn current(&self) -> Option<Identity> {
		self.rx.borrow().clone()
	}

	/// The current identity, or `MissingIdentity` when nobody is signed in.
	pub fn require(&self) -> IlResult<Identity> {
		self.current().ok_or(Error::MissingIdentity)
	}

	/// Uid of the signed-in user, empty when signed out.
	pub fn uid(&self) -> Box<str> {
		self.rx.borrow().as_ref().map(|identity| identity.uid.clone()).unwrap_or_default()
	}

	/// Wait until the identity changes.
	pub async fn changed(&mut self) -> IlResult<()> {
		self.rx
			.changed()
			.await
			.map_err(|_| Error::Unavailable("identity provider dropped".into()))
	}
}


// vim: ts=4
