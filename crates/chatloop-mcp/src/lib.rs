//! # chatloop-mcp
//!
//! JSON-RPC 2.0 tool-server backend for the
//! [`chatloop::ToolClient`] trait.
//!
//! Requests are JSON objects
//! `{"jsonrpc": "2.0", "id": N, "method": "tools/call" | "tools/list", "params": {...}}`
//! POSTed to a configured base URL. Each request gets a monotonically
//! increasing id scoped to the client instance, so responses can be
//! correlated even though the orchestration core only ever calls
//! sequentially. A sibling `GET {base_url}/actuator/health` endpoint
//! reports liveness via HTTP status alone.
//!
//! ```rust,no_run
//! use chatloop::ToolClient;
//! use chatloop_mcp::{McpConfig, McpHttpClient};
//!
//! # async fn example() -> Result<(), chatloop::ToolError> {
//! let client = McpHttpClient::new(McpConfig {
//!     base_url: "http://127.0.0.1:8080".into(),
//!     ..Default::default()
//! });
//!
//! let tools = client.list_tools().await?;
//! # let _ = tools;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod client;
mod config;
mod types;

pub use client::McpHttpClient;
pub use config::McpConfig;
