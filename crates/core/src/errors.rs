use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::session::{SessionId, SessionState};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },
    #[error("session {session_id:?} is closed in terminal state {state:?}")]
    SessionClosed { session_id: SessionId, state: SessionState },
    #[error("invalid session transition from {from:?} to {to:?}")]
    InvalidTransition { from: SessionState, to: SessionState },
    #[error(transparent)]
    Configuration(#[from] ConfigError),
}

impl EngineError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput { reason: reason.into() }
    }

    pub fn session_closed(session_id: SessionId, state: SessionState) -> Self {
        Self::SessionClosed { session_id, state }
    }
}
