//! # chatloop-gemini
//!
//! Gemini `generateContent` backend for the
//! [`chatloop::Gateway`] trait.
//!
//! The Gemini API models a conversation as alternating `user`/`model`
//! turns and has no system role in history, which is exactly the turn
//! contract the core's gateway enforces: system entries are filtered out
//! before transmission and the final entry must be a user turn.
//!
//! ```rust,no_run
//! use chatloop::{Gateway, Message, ChatRole};
//! use chatloop_gemini::{GeminiConfig, GeminiGateway};
//!
//! # async fn example() -> Result<(), chatloop::GatewayError> {
//! let gateway = GeminiGateway::new(GeminiConfig {
//!     api_key: std::env::var("GEMINI_API_KEY").unwrap(),
//!     ..Default::default()
//! });
//!
//! let history = vec![Message::transient(ChatRole::User, "Hello!")];
//! let text = gateway.send(&history).await?;
//! # let _ = text;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod config;
mod convert;
mod gateway;
mod types;

pub use config::GeminiConfig;
pub use gateway::GeminiGateway;
