//! Top-level control flow for one user turn.
//!
//! [`Orchestrator`] owns the turn pipeline: augment the prompt with the
//! tool catalog, consult the LLM, extract tool invocations, and either
//! return the direct answer or drive the recovery loop. Collaborators
//! (gateway, tool client, store) are injected by constructor so every
//! piece can be substituted with a test double.
//!
//! [`handle_user_turn`](Orchestrator::handle_user_turn) is the boundary:
//! the user's message is durably appended before the response attempt
//! begins, and every internal error is converted into a [`TurnFailure`]
//! classification — an uncaught internal error must never reach the
//! transport layer undecorated.

use std::sync::Arc;

use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::chat::{ChatRole, Message};
use crate::gateway::{DynGateway, Gateway, RetryingGateway};
use crate::retry::RetryPolicy;
use crate::store::{ChatStore, StoreError};
use crate::tool::{ToolClient, extract_tool_calls, render_catalog};

use super::correction::execute_with_recovery;
use super::prompt::{TOOLS_UNAVAILABLE_PLACEHOLDER, augmented_prompt};
use super::{TurnConfig, TurnError, TurnFailure};

/// Drives one user turn from raw text to the final assistant message.
pub struct Orchestrator {
    gateway: RetryingGateway,
    tools: Arc<dyn ToolClient>,
    store: Arc<dyn ChatStore>,
    config: TurnConfig,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Builds an orchestrator from its collaborators.
    pub fn new(
        gateway: Arc<dyn DynGateway>,
        tools: Arc<dyn ToolClient>,
        store: Arc<dyn ChatStore>,
        policy: RetryPolicy,
        config: TurnConfig,
    ) -> Self {
        Self {
            gateway: RetryingGateway::new(gateway, policy),
            tools,
            store,
            config,
        }
    }

    /// Runs the turn pipeline over an explicit history, returning the
    /// assistant's answer text.
    ///
    /// When the tool catalog cannot be fetched the turn degrades to
    /// direct-answer mode: the catalog section is replaced with a
    /// placeholder and no tool augmentation is attempted, so a broken
    /// tool backend never fails the user's turn.
    pub async fn run_turn(
        &self,
        user_text: &str,
        history: &[Message],
    ) -> Result<String, TurnError> {
        // The catalog is fetched once and reused for every correction
        // attempt within this turn; it is read-only for the duration.
        let catalog = match self.tools.list_tools().await {
            Ok(tools) => Some(render_catalog(&tools)),
            Err(err) => {
                warn!(error = %err, "tool catalog unavailable, degrading to direct answers");
                None
            }
        };
        let degraded = catalog.is_none();
        let catalog_text =
            catalog.unwrap_or_else(|| TOOLS_UNAVAILABLE_PLACEHOLDER.to_string());

        let prompt = augmented_prompt(&self.config.instructions, &catalog_text, user_text);
        let mut outbound = history.to_vec();
        outbound.push(Message::transient(ChatRole::User, prompt));
        let reply = self.gateway.send(&outbound).await?;

        if degraded {
            return Ok(reply);
        }

        let invocations = extract_tool_calls(&reply);
        if invocations.is_empty() {
            debug!("no tool invocations requested, returning direct answer");
            return Ok(reply);
        }

        debug!(count = invocations.len(), "LLM requested tool invocations");
        execute_with_recovery(
            &self.gateway,
            self.tools.as_ref(),
            &catalog_text,
            user_text,
            history,
            invocations,
            &self.config,
        )
        .await
    }

    /// Handles one user turn against the store: persists the user
    /// message, runs the pipeline, persists and returns the assistant
    /// message.
    ///
    /// The user message is appended before the response attempt begins,
    /// so a crash mid-turn leaves the input persisted and the turn
    /// retryable without data loss. On failure the already-created
    /// records are preserved and a [`TurnFailure`] is returned.
    pub async fn handle_user_turn(
        &self,
        chat_id: Uuid,
        user_text: &str,
    ) -> Result<Message, TurnFailure> {
        let prior = self
            .store
            .history(chat_id)
            .await
            .map_err(Self::store_failure)?;
        self.store
            .append_message(chat_id, ChatRole::User, user_text)
            .await
            .map_err(Self::store_failure)?;

        match self.run_turn(user_text, &prior).await {
            Ok(answer) => self
                .store
                .append_message(chat_id, ChatRole::Assistant, &answer)
                .await
                .map_err(Self::store_failure),
            Err(err) => {
                error!(error = %err, %chat_id, "turn failed after exhausting recovery");
                Err(self.classify(err))
            }
        }
    }

    /// Translates an internal error kind into the stable user-facing
    /// classification.
    fn classify(&self, error: TurnError) -> TurnFailure {
        let retry_after = self.config.retry_after;
        match error {
            TurnError::Gateway(_) => TurnFailure::LlmUnavailable { retry_after },
            TurnError::CorrectionDeclined { .. }
            | TurnError::CorrectionMissing { .. }
            | TurnError::MaxRetriesExceeded { .. } => {
                TurnFailure::ToolRecoveryFailed { retry_after }
            }
        }
    }

    fn store_failure(error: StoreError) -> TurnFailure {
        match error {
            StoreError::ChatNotFound(chat_id) => TurnFailure::ChatNotFound { chat_id },
        }
    }
}
