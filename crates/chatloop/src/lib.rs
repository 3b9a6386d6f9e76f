//! # chatloop
//!
//! Chat-brokering core: mediates conversations between end users and an
//! LLM backend, optionally augmenting answers with calls against a
//! remote tool server.
//!
//! The heart of the crate is the tool-call orchestration loop: asking
//! the LLM whether a user message needs a tool, parsing its free-form
//! reply for embedded `TOOL_CALL:` invocations, executing them remotely,
//! feeding the results back for a final natural-language answer, and
//! self-correcting failed calls by re-prompting the LLM with its own
//! error, bounded by an explicit retry ceiling.
//!
//! This crate contains **zero** backend-specific code — concrete LLM
//! gateways and tool clients live in sibling crates and implement
//! [`Gateway`] (or its object-safe counterpart [`DynGateway`]) and
//! [`ToolClient`]:
//!
//! | Crate | Backend |
//! |-------|---------|
//! | `chatloop-gemini` | Gemini `generateContent` HTTP API |
//! | `chatloop-mcp` | JSON-RPC 2.0 tool server over HTTP |
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chatloop::{ChatStore, MemoryStore, Orchestrator, RetryPolicy, TurnConfig};
//! # use chatloop::{DynGateway, ToolClient};
//!
//! # async fn example(gateway: Arc<dyn DynGateway>, tools: Arc<dyn ToolClient>) {
//! let store = Arc::new(MemoryStore::new());
//! let orchestrator = Orchestrator::new(
//!     gateway,
//!     tools,
//!     store.clone(),
//!     RetryPolicy::default(),
//!     TurnConfig::default(),
//! );
//!
//! let chat = store.create_chat("demo").await.unwrap();
//! let answer = orchestrator
//!     .handle_user_turn(chat.id, "How many users are in the male segment?")
//!     .await;
//! # let _ = answer;
//! # }
//! ```
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`chat`] | Message and chat records |
//! | [`error`] | Unified [`GatewayError`] across LLM backends |
//! | [`gateway`] | The [`Gateway`] trait and the retrying wrapper |
//! | [`retry`] | Transient-failure detection and exponential backoff |
//! | [`store`] | The [`ChatStore`] contract and the in-memory store |
//! | [`tool`] | Tool client contract and the `TOOL_CALL:` extractor |
//! | [`turn`] | The recovery loop and the conversation orchestrator |

#![warn(missing_docs)]

pub mod chat;
pub mod error;
pub mod gateway;
pub mod retry;
pub mod store;
pub mod tool;
pub mod turn;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use chat::{Chat, ChatRole, Message};
pub use error::GatewayError;
pub use gateway::{DynGateway, Gateway, RetryingGateway};
pub use retry::RetryPolicy;
pub use store::{ChatStore, MemoryStore, StoreError};
pub use tool::{
    ToolClient, ToolDescriptor, ToolError, ToolInvocation, extract_tool_calls, render_catalog,
};
pub use turn::{Orchestrator, TurnConfig, TurnError, TurnFailure};
