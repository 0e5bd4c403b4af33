//! Chat list sidebar.
//!
//! Shows the signed-in user's chats from `userChats/<uid>` and keeps them
//! current through a [`LiveDocumentView`]. Summary records are opaque; a row
//! only shows the chat id and, when present, `lastMessage.text`.

use iline_types::auth_adapter::IdentityContext;
use iline_types::store_adapter::DocumentStore;
use iline_types::types::ChatSummaryMap;
use std::sync::Arc;
use tokio::sync::watch;

use crate::live_view::LiveDocumentView;
use crate::prelude::*;
use crate::render::{Element, Node};

/// Currently selected chat, shared between the sidebar and whatever shows the chat.
#[derive(Debug, Clone)]
pub struct ChatContext {
	tx: Arc<watch::Sender<Option<Box<str>>>>,
}

impl ChatContext {
	pub fn new() -> Self {
		let (tx, _) = watch::channel(None);
		Self { tx: Arc::new(tx) }
	}

	pub fn select(&self, chat_id: Option<&str>) {
		debug!("Chat selected: {:?}", chat_id);
		self.tx.send_replace(chat_id.map(Into::into));
	}

	pub fn selected(&self) -> Option<Box<str>> {
		self.tx.borrow().clone()
	}

	pub fn watch(&self) -> watch::Receiver<Option<Box<str>>> {
		self.tx.subscribe()
	}
}

impl Default for ChatContext {
	fn default() -> Self {
		Self::new()
	}
}

pub struct ChatsSidebar {
	view: LiveDocumentView<ChatSummaryMap>,
	chat_ctx: ChatContext,
}

impl ChatsSidebar {
	pub fn new(
		store: Arc<dyn DocumentStore>,
		collection: impl Into<Box<str>>,
		chat_ctx: ChatContext,
	) -> Self {
		Self { view: LiveDocumentView::new(store, collection), chat_ctx }
	}

	/// Mount the sidebar for whoever is signed in. Signed out means an inactive view.
	pub async fn mount(
		store: Arc<dyn DocumentStore>,
		collection: impl Into<Box<str>>,
		identity: &IdentityContext,
		chat_ctx: ChatContext,
	) -> IlResult<Self> {
		let mut sidebar = Self::new(store, collection, chat_ctx);
		sidebar.set_uid(&identity.uid()).await?;
		Ok(sidebar)
	}

	/// Follow another user. The selection is cleared whenever the view left the
	/// previous user's document, including when subscribing for the new one fails.
	pub async fn set_uid(&mut self, uid: &str) -> IlResult<()> {
		let previous = self.view.key().to_string();
		let res = self.view.set_key(uid).await;
		if self.view.key() != previous {
			self.chat_ctx.select(None);
		}
		res
	}

	/// Apply the next chat list notification. See [`LiveDocumentView::next`].
	pub async fn next(&mut self) -> Option<IlResult<()>> {
		self.view.next().await
	}

	pub fn chats(&self) -> Arc<ChatSummaryMap> {
		self.view.state()
	}

	pub fn view(&self) -> &LiveDocumentView<ChatSummaryMap> {
		&self.view
	}

	pub fn chat_context(&self) -> &ChatContext {
		&self.chat_ctx
	}

	/// Select a chat that is in the current list.
	pub fn select(&self, chat_id: &str) -> IlResult<()> {
		if !self.view.state().contains_key(chat_id) {
			return Err(Error::NotFound);
		}
		self.chat_ctx.select(Some(chat_id));
		Ok(())
	}

	pub fn render(&self) -> Node {
		render_chats(&self.view.state(), self.chat_ctx.selected().as_deref())
	}

	pub fn dispose(self) {
		self.view.dispose();
	}
}

impl std::fmt::Debug for ChatsSidebar {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ChatsSidebar")
			.field("view", &self.view)
			.field("chat_ctx", &self.chat_ctx)
			.finish()
	}
}

pub fn render_chats(chats: &ChatSummaryMap, selected: Option<&str>) -> Node {
	let rows = chats.iter().map(|(chat_id, summary)| {
		let class = if selected == Some(chat_id.as_str()) { "userChat selected" } else { "userChat" };
		let last_message =
			summary.pointer("/lastMessage/text").and_then(|v| v.as_str()).unwrap_or_default();

		Node::from(
			Element::new("div")
				.class(class)
				.attr("data-chat-id", chat_id.as_str())
				.child(Element::new("img").attr("src", "").attr("alt", ""))
				.child(
					Element::new("div")
						.class("userChatInfo")
						.child(Element::new("span").text(chat_id.as_str()))
						.child(Element::new("p").text(last_message)),
				),
		)
	});

	Element::new("div").class("chats").children(rows).into()
}


// vim: ts=4
