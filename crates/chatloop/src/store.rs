//! Chat persistence contract and the in-memory reference store.
//!
//! The orchestrator treats the store as durable and strongly consistent:
//! a message appended in a turn is visible to the next read in the same
//! turn. [`MemoryStore`] satisfies that trivially and doubles as the test
//! backend; production deployments implement [`ChatStore`] over their
//! database of choice.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use uuid::Uuid;

use crate::chat::{Chat, ChatRole, Message};

/// Errors raised by store operations.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum StoreError {
    /// No chat exists with the given id.
    #[error("chat {0} not found")]
    ChatNotFound(Uuid),
}

/// Persistence contract for chats and their messages.
///
/// Object-safe; methods return boxed futures so the trait can be stored
/// as `Arc<dyn ChatStore>` and mocked freely.
pub trait ChatStore: Send + Sync {
    /// Creates an empty chat and returns it.
    fn create_chat<'a>(
        &'a self,
        title: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Chat, StoreError>> + Send + 'a>>;

    /// Appends a message to the chat, bumping its `updated_at`.
    fn append_message<'a>(
        &'a self,
        chat_id: Uuid,
        role: ChatRole,
        content: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Message, StoreError>> + Send + 'a>>;

    /// Returns the chat's messages in creation order.
    fn history(
        &self,
        chat_id: Uuid,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Message>, StoreError>> + Send + '_>>;

    /// Returns the chat with its messages.
    fn get_chat(
        &self,
        chat_id: Uuid,
    ) -> Pin<Box<dyn Future<Output = Result<Chat, StoreError>> + Send + '_>>;

    /// Deletes the chat and every message it owns.
    fn delete_chat(
        &self,
        chat_id: Uuid,
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>>;
}

/// In-memory [`ChatStore`] backed by a mutex-guarded map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    chats: Mutex<HashMap<Uuid, Chat>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ChatStore for MemoryStore {
    fn create_chat<'a>(
        &'a self,
        title: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Chat, StoreError>> + Send + 'a>> {
        Box::pin(async move {
            let chat = Chat::new(title);
            self.chats
                .lock()
                .expect("store mutex poisoned")
                .insert(chat.id, chat.clone());
            Ok(chat)
        })
    }

    fn append_message<'a>(
        &'a self,
        chat_id: Uuid,
        role: ChatRole,
        content: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Message, StoreError>> + Send + 'a>> {
        Box::pin(async move {
            let mut chats = self.chats.lock().expect("store mutex poisoned");
            let chat = chats
                .get_mut(&chat_id)
                .ok_or(StoreError::ChatNotFound(chat_id))?;
            let message = Message::new(chat_id, role, content);
            chat.push(message.clone());
            Ok(message)
        })
    }

    fn history(
        &self,
        chat_id: Uuid,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Message>, StoreError>> + Send + '_>> {
        Box::pin(async move {
            let chats = self.chats.lock().expect("store mutex poisoned");
            chats
                .get(&chat_id)
                .map(|chat| chat.messages.clone())
                .ok_or(StoreError::ChatNotFound(chat_id))
        })
    }

    fn get_chat(
        &self,
        chat_id: Uuid,
    ) -> Pin<Box<dyn Future<Output = Result<Chat, StoreError>> + Send + '_>> {
        Box::pin(async move {
            let chats = self.chats.lock().expect("store mutex poisoned");
            chats
                .get(&chat_id)
                .cloned()
                .ok_or(StoreError::ChatNotFound(chat_id))
        })
    }

    fn delete_chat(
        &self,
        chat_id: Uuid,
    ) -> Pin<Box<dyn Future<Output = Result<(), StoreError>> + Send + '_>> {
        Box::pin(async move {
            let mut chats = self.chats.lock().expect("store mutex poisoned");
            chats
                .remove(&chat_id)
                .map(|_| ())
                .ok_or(StoreError::ChatNotFound(chat_id))
        })
    }
}
