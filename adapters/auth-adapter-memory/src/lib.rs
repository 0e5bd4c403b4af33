#![forbid(unsafe_code)]

//! In-process auth service.
//!
//! Stands in for the external auth backend: [`MemoryAuthService::sign_in`]
//! publishes an identity the way a finished login flow would, and sign-out
//! clears it.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{info, warn};

use iline_types::auth_adapter::{AuthService, IdentityContext, IdentityProvider};
use iline_types::prelude::*;

#[derive(Debug, Default)]
pub struct MemoryAuthService {
	provider: IdentityProvider,
	sign_out_count: AtomicUsize,
	/// When set, the next sign-out fails with this message
	fail_next_sign_out: Mutex<Option<String>>,
}

impl MemoryAuthService {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn sign_in(&self, identity: Identity) {
		info!("Signed in: uid={}", identity.uid);
		self.provider.set(Some(identity));
	}

	/// Number of sign-out calls received, failed ones included
	pub fn sign_out_count(&self) -> usize {
		self.sign_out_count.load(Ordering::Acquire)
	}

	pub fn fail_next_sign_out(&self, message: impl Into<String>) {
		*self.fail_next_sign_out.lock() = Some(message.into());
	}
}

#[async_trait]
impl AuthService for MemoryAuthService {
	fn identity_context(&self) -> IdentityContext {
		self.provider.context()
	}

	async fn sign_out(&self) -> IlResult<()> {
		self.sign_out_count.fetch_add(1, Ordering::AcqRel);

		let failure = self.fail_next_sign_out.lock().take();
		if let Some(message) = failure {
			warn!("Sign-out rejected: {}", message);
			return Err(Error::Unavailable(message));
		}

		if let Some(identity) = self.provider.current() {
			info!("Signed out: uid={}", identity.uid);
		}
		self.provider.set(None);
		Ok(())
	}
}

// vim: ts=4
