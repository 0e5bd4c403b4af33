//! App builder - wires the adapters and mounts the components

use serde::Deserialize;
use std::sync::Arc;

use crate::auth_adapter::{AuthService, IdentityContext};
use crate::prelude::*;
use crate::store_adapter::DocumentStore;
use crate::types::USER_CHATS_COLLECTION;
use iline_view::render::Node;
use iline_view::{ChatContext, ChatsSidebar, Navbar, SessionBar};

pub const DEFAULT_LOGO: &str = "iLine";

/// Client options
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct AppOpts {
	/// Collection holding the per-user chat list documents
	pub user_chats_collection: Box<str>,
	pub logo: Box<str>,
}

impl Default for AppOpts {
	fn default() -> Self {
		Self { user_chats_collection: USER_CHATS_COLLECTION.into(), logo: DEFAULT_LOGO.into() }
	}
}

impl AppOpts {
	pub fn from_json(json: &str) -> IlResult<Self> {
		Ok(serde_json::from_str(json)?)
	}
}

pub struct AppBuilder {
	opts: AppOpts,
	document_store: Option<Arc<dyn DocumentStore>>,
	auth_service: Option<Arc<dyn AuthService>>,
}

impl AppBuilder {
	pub fn new() -> Self {
		let _ = tracing_subscriber::fmt()
			.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
			.with_target(false)
			.try_init();
		AppBuilder { opts: AppOpts::default(), document_store: None, auth_service: None }
	}

	// Opts
	pub fn opts(&mut self, opts: AppOpts) -> &mut Self {
		self.opts = opts;
		self
	}
	pub fn user_chats_collection(&mut self, collection: impl Into<Box<str>>) -> &mut Self {
		self.opts.user_chats_collection = collection.into();
		self
	}
	pub fn logo(&mut self, logo: impl Into<Box<str>>) -> &mut Self {
		self.opts.logo = logo.into();
		self
	}

	// Adapters
	pub fn document_store(&mut self, document_store: Arc<dyn DocumentStore>) -> &mut Self {
		self.document_store = Some(document_store);
		self
	}
	pub fn auth_service(&mut self, auth_service: Arc<dyn AuthService>) -> &mut Self {
		self.auth_service = Some(auth_service);
		self
	}

	pub fn build(&mut self) -> IlResult<App> {
		let store = self
			.document_store
			.clone()
			.ok_or_else(|| Error::Internal("no document store adapter".into()))?;
		let auth = self
			.auth_service
			.clone()
			.ok_or_else(|| Error::Internal("no auth service adapter".into()))?;
		let identity = auth.identity_context();

		info!("iLine client ready: collection={}", self.opts.user_chats_collection);
		Ok(App { opts: self.opts.clone(), store, auth, identity, chat_ctx: ChatContext::new() })
	}
}

impl Default for AppBuilder {
	fn default() -> Self {
		Self::new()
	}
}

pub struct App {
	opts: AppOpts,
	store: Arc<dyn DocumentStore>,
	auth: Arc<dyn AuthService>,
	identity: IdentityContext,
	chat_ctx: ChatContext,
}

impl App {
	pub fn opts(&self) -> &AppOpts {
		&self.opts
	}

	pub fn identity(&self) -> &IdentityContext {
		&self.identity
	}

	pub fn chat_context(&self) -> &ChatContext {
		&self.chat_ctx
	}

	/// Mount the chat list for the current user (inactive when signed out).
	pub async fn mount_sidebar(&self) -> IlResult<ChatsSidebar> {
		ChatsSidebar::mount(
			Arc::clone(&self.store),
			self.opts.user_chats_collection.clone(),
			&self.identity,
			self.chat_ctx.clone(),
		)
		.await
	}

	/// Mount the navbar. Fails with `MissingIdentity` when nobody is signed in.
	pub fn mount_navbar(&self) -> IlResult<Navbar> {
		let session = SessionBar::from_context(&self.identity, Arc::clone(&self.auth))?;
		Ok(Navbar::new(self.opts.logo.clone(), session))
	}

	/// Point the sidebar at the current user.
	pub async fn sync_sidebar(&self, sidebar: &mut ChatsSidebar) -> IlResult<()> {
		let uid = self.identity.uid();
		debug!("Syncing sidebar: uid={:?}", uid);
		sidebar.set_uid(&uid).await
	}

	/// Drive the sidebar: follow identity changes and apply store notifications,
	/// calling `on_render` with the new tree after each one.
	///
	/// Store errors end the loop and are returned. The loop ends with `Ok` once
	/// the identity provider is gone.
	pub async fn run_sidebar<F>(&self, sidebar: &mut ChatsSidebar, mut on_render: F) -> IlResult<()>
	where
		F: FnMut(&Node),
	{
		let mut identity = self.identity.clone();
		self.sync_sidebar(sidebar).await?;
		on_render(&sidebar.render());

		loop {
			if sidebar.view().is_active() {
				tokio::select! {
					changed = identity.changed() => {
						if changed.is_err() {
							return Ok(());
						}
						self.sync_sidebar(sidebar).await?;
					}
					applied = sidebar.next() => {
						if let Some(result) = applied {
							result?;
						}
					}
				}
			} else {
				if identity.changed().await.is_err() {
					return Ok(());
				}
				self.sync_sidebar(sidebar).await?;
			}
			on_render(&sidebar.render());
		}
	}
}

impl std::fmt::Debug for App {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("App")
			.field("opts", &self.opts)
			.field("store", &self.store)
			.field("auth", &self.auth)
			.finish_non_exhaustive()
	}
}

// vim: ts=4
