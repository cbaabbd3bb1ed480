//! Turn runner: drives one model round-trip, tool calls included.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info, warn};

use resumeguide_provider::{ChatParams, Message, Provider, ToolCallDef, ToolChoice};
use resumeguide_session::SessionService;

use crate::tools::ToolRegistry;
use crate::{AgentError, Result};

/// Reply recorded when a turn produces no text.
pub const NO_RESPONSE: &str = "No response generated.";

/// Default cap on model round-trips within one turn.
pub const DEFAULT_MAX_ITERATIONS: u32 = 10;

const DEFAULT_MAX_HISTORY_MESSAGES: usize = 20;

/// What the runner reports while a turn is in flight.
#[derive(Debug, Clone)]
pub enum TurnEvent {
    /// The model asked for a tool, with the arguments it chose.
    ToolCall {
        name: String,
        arguments: serde_json::Value,
    },
    /// Text produced by the model. Later events supersede earlier ones.
    Text(String),
}

/// Executes turns against the provider and persists them to the session
/// registry.
pub struct TurnRunner {
    provider: Arc<dyn Provider>,
    sessions: Arc<SessionService>,
    app_name: String,
    instruction: String,
    model: String,
    tools: ToolRegistry,
    max_iterations: u32,
    max_history_messages: usize,
}

impl TurnRunner {
    pub fn new(
        provider: Arc<dyn Provider>,
        sessions: Arc<SessionService>,
        app_name: impl Into<String>,
        instruction: impl Into<String>,
        model: impl Into<String>,
        tools: ToolRegistry,
    ) -> Self {
        Self {
            provider,
            sessions,
            app_name: app_name.into(),
            instruction: instruction.into(),
            model: model.into(),
            tools,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_history_messages: DEFAULT_MAX_HISTORY_MESSAGES,
        }
    }

    pub fn set_max_iterations(&mut self, max: u32) {
        self.max_iterations = max;
    }

    pub fn set_max_history_messages(&mut self, max: usize) {
        self.max_history_messages = max;
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run one user turn to completion, streaming events to the caller.
    ///
    /// Session history is loaded before the turn; the user message and the
    /// final reply are appended after it. On a failed turn the user message
    /// and an `Error: …` entry are recorded instead, and the error
    /// propagates. The sender is dropped when the turn ends, closing the
    /// event stream.
    pub async fn run_turn(
        &self,
        user_id: &str,
        session_id: &str,
        message: &str,
        events: UnboundedSender<TurnEvent>,
    ) -> Result<String> {
        info!("running turn for {}:{}", user_id, session_id);
        let preview: String = message.chars().take(100).collect();
        debug!("message: {}", preview);

        let history = self
            .sessions
            .get_history(&self.app_name, user_id, session_id, self.max_history_messages)
            .await?;

        let mut messages = vec![Message::system(&self.instruction)];
        messages.extend(history);
        messages.push(Message::user(message));

        match self.drive(messages, &events).await {
            Ok(reply) => {
                self.record_exchange(user_id, session_id, message, &reply)
                    .await?;
                Ok(reply)
            }
            Err(e) => {
                error!("turn failed: {}", e);
                let note = format!("Error: {}", e);
                if let Err(record_err) = self
                    .record_exchange(user_id, session_id, message, &note)
                    .await
                {
                    warn!("failed to record failed turn: {}", record_err);
                }
                Err(e)
            }
        }
    }

    async fn record_exchange(
        &self,
        user_id: &str,
        session_id: &str,
        user_message: &str,
        reply: &str,
    ) -> Result<()> {
        self.sessions
            .append_message(&self.app_name, user_id, session_id, "user", user_message)
            .await?;
        self.sessions
            .append_message(&self.app_name, user_id, session_id, "assistant", reply)
            .await?;
        Ok(())
    }

    /// The tool-calling loop. Returns the last text the model produced, or
    /// the placeholder if the whole turn was silent.
    async fn drive(
        &self,
        mut messages: Vec<Message>,
        events: &UnboundedSender<TurnEvent>,
    ) -> Result<String> {
        let mut final_response = NO_RESPONSE.to_string();
        let mut iteration = 0;

        loop {
            iteration += 1;
            if iteration > self.max_iterations {
                return Err(AgentError::MaxIterations);
            }

            debug!("turn iteration {}", iteration);

            let params = ChatParams {
                model: self.model.clone(),
                messages: messages.clone(),
                tools: self.tools.definitions(),
                tool_choice: ToolChoice::Auto,
                ..Default::default()
            };

            let response = self
                .provider
                .chat(params)
                .await
                .map_err(|e| AgentError::Provider(e.to_string()))?;

            if let Some(text) = response.content.as_deref().filter(|t| !t.is_empty()) {
                let _ = events.send(TurnEvent::Text(text.to_string()));
                final_response = text.to_string();
            }

            if !response.has_tool_calls() {
                return Ok(final_response);
            }

            let calls: Vec<ToolCallDef> = response
                .tool_calls
                .iter()
                .map(|tc| ToolCallDef::new(&tc.id, &tc.name, tc.arguments.clone()))
                .collect();
            let mut assistant = Message::assistant(response.content.clone().unwrap_or_default());
            assistant.tool_calls = Some(calls);
            messages.push(assistant);

            for call in &response.tool_calls {
                let _ = events.send(TurnEvent::ToolCall {
                    name: call.name.clone(),
                    arguments: call.arguments.clone(),
                });

                debug!("executing tool: {}", call.name);
                // Tool problems feed back to the model as text, they never
                // abort the turn.
                let result = self
                    .tools
                    .execute(&call.name, call.arguments.clone())
                    .await
                    .unwrap_or_else(|e| format!("Error: {}", e));

                messages.push(Message::tool(&call.id, &call.name, &result));
            }
        }
    }
}
