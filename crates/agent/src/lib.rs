//! Agent core: Gemini-backed advisors and the tools they call.

use thiserror::Error;

pub mod adapter;
pub mod profile;
pub mod runner;
pub mod tools;

pub use adapter::{AgentAdapter, APP_NAME};
pub use profile::{shared_profile, Project, SharedProfile, StudentProfile};
pub use runner::{TurnEvent, TurnRunner, NO_RESPONSE};
pub use tools::{ToolRegistry, ToolTrait};

/// Agent errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("configuration error: {0}")]
    Configuration(#[from] resumeguide_config::ConfigError),

    #[error("session error: {0}")]
    Session(#[from] resumeguide_session::SessionError),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("turn exceeded max iterations")]
    MaxIterations,
}

pub type Result<T> = std::result::Result<T, AgentError>;
