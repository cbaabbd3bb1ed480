//! Synchronous facade over the async turn machinery.
//!
//! One adapter binds a name, a model, an instruction, and a tool list to
//! one turn runner, and addresses one session in the shared registry at a
//! time. `chat` blocks; `chat_turn` exposes the same turn to async callers.

use std::sync::{Arc, Mutex, OnceLock};

use tokio::runtime::{Handle, Runtime, RuntimeFlavor};
use tokio::sync::mpsc;
use tokio::task;
use tracing::{debug, info};
use uuid::Uuid;

use resumeguide_config::resolve_credentials;
use resumeguide_provider::{GeminiProvider, Provider};
use resumeguide_session::{SessionError, SessionService};

use crate::runner::{TurnEvent, TurnRunner, NO_RESPONSE};
use crate::tools::ToolRegistry;
use crate::Result;

/// Application namespace for every session this process creates.
pub const APP_NAME: &str = "resume_guide";

struct SessionState {
    id: String,
    created: bool,
}

pub struct AgentAdapter {
    name: String,
    token: String,
    user_id: String,
    session: Mutex<SessionState>,
    sessions: Arc<SessionService>,
    runner: TurnRunner,
}

impl AgentAdapter {
    /// Build an adapter backed by the Gemini credentials discovered in the
    /// working directory. Missing credentials are fatal here, not at the
    /// first call.
    pub fn new(
        name: impl Into<String>,
        model: Option<String>,
        instruction: impl Into<String>,
        tools: ToolRegistry,
        sessions: Arc<SessionService>,
    ) -> Result<Self> {
        let creds = resolve_credentials()?;
        info!(
            "connecting to Vertex AI (project {}, location {})",
            creds.project_id, creds.location
        );
        debug!("using credentials: {}", creds.credentials_path.display());

        let provider = Arc::new(GeminiProvider::from_env());
        Ok(Self::with_provider(
            name,
            model,
            instruction,
            tools,
            sessions,
            provider,
        ))
    }

    /// Build an adapter around an explicit provider, skipping credential
    /// resolution. Used by tests and alternative backends.
    pub fn with_provider(
        name: impl Into<String>,
        model: Option<String>,
        instruction: impl Into<String>,
        tools: ToolRegistry,
        sessions: Arc<SessionService>,
        provider: Arc<dyn Provider>,
    ) -> Self {
        let name = name.into();
        let model = model.unwrap_or_else(|| provider.default_model());
        let token = Uuid::new_v4().simple().to_string();
        let user_id = format!("user_{}", name);
        let session_id = format!("session_{}_{}", name, token);

        let runner = TurnRunner::new(
            provider,
            sessions.clone(),
            APP_NAME,
            instruction,
            model,
            tools,
        );

        Self {
            name,
            token,
            user_id,
            session: Mutex::new(SessionState {
                id: session_id,
                created: false,
            }),
            sessions,
            runner,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &str {
        self.runner.model()
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// The session identifier the next turn will address.
    pub fn session_id(&self) -> String {
        self.session.lock().unwrap().id.clone()
    }

    /// Abandon the current session identifier. The old session stays in
    /// the registry; the next chat addresses a fresh, empty one.
    pub fn clear_memory(&self) {
        let mut session = self.session.lock().unwrap();
        session.id = format!(
            "session_{}_{}_{}",
            self.name,
            self.token,
            Uuid::new_v4().simple()
        );
        session.created = false;
        debug!("memory cleared for {}", self.name);
    }

    /// Make sure the current session id exists in the registry.
    ///
    /// Only a typed `NotFound` triggers creation; any other lookup failure
    /// propagates.
    async fn ensure_session(&self) -> Result<()> {
        let (session_id, created) = {
            let session = self.session.lock().unwrap();
            (session.id.clone(), session.created)
        };
        if created {
            return Ok(());
        }

        match self
            .sessions
            .get_session(APP_NAME, &self.user_id, &session_id)
            .await
        {
            Ok(_) => {}
            Err(SessionError::NotFound(_)) => {
                match self
                    .sessions
                    .create_session(APP_NAME, &self.user_id, &session_id)
                    .await
                {
                    Ok(_) | Err(SessionError::AlreadyExists(_)) => {}
                    Err(e) => return Err(e.into()),
                }
            }
            Err(e) => return Err(e.into()),
        }

        self.session.lock().unwrap().created = true;
        Ok(())
    }

    /// One full conversational turn, for async callers.
    ///
    /// Consumes the runner's event stream to completion: tool calls become
    /// trace lines, and the last text seen wins as the reply. A silent turn
    /// replies with the fixed placeholder.
    pub async fn chat_turn(&self, message: &str) -> Result<String> {
        debug!("{} is thinking", self.name);
        self.ensure_session().await?;
        let session_id = self.session_id();

        let (tx, mut rx) = mpsc::unbounded_channel();
        let turn = self
            .runner
            .run_turn(&self.user_id, &session_id, message, tx);
        let consume = async {
            let mut final_response = NO_RESPONSE.to_string();
            while let Some(event) = rx.recv().await {
                match event {
                    TurnEvent::ToolCall { name, arguments } => {
                        info!("🛠️ [Tool Call]: {}({})", name, arguments);
                    }
                    TurnEvent::Text(text) => final_response = text,
                }
            }
            final_response
        };

        let (outcome, final_response) = tokio::join!(turn, consume);
        outcome?;
        Ok(final_response)
    }

    /// Blocking chat entry point.
    ///
    /// Re-enters the caller's runtime when the thread sits inside a
    /// multi-thread one. A current-thread runtime cannot be re-entered, so
    /// the turn is driven on the fallback runtime from a helper thread.
    /// With no runtime at all, the fallback is used directly.
    pub fn chat(&self, message: &str) -> Result<String> {
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                task::block_in_place(|| handle.block_on(self.chat_turn(message)))
            }
            Ok(_) => std::thread::scope(|scope| {
                scope
                    .spawn(|| fallback_runtime().block_on(self.chat_turn(message)))
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            }),
            Err(_) => fallback_runtime().block_on(self.chat_turn(message)),
        }
    }
}

/// Process-wide runtime for blocking callers. Created once, never torn
/// down; one scheduler persists for the life of the process.
fn fallback_runtime() -> &'static Runtime {
    static FALLBACK: OnceLock<Runtime> = OnceLock::new();
    FALLBACK.get_or_init(|| Runtime::new().expect("failed to build fallback runtime"))
}
