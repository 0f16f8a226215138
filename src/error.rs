// Engine error taxonomy.
//
// The engine's contract is to return typed errors rather than arbitrary
// panics: callers decide between a fallback view and surfacing a message.
// Per-item failures inside a fan-out never reach this type; they degrade
// to safe defaults at the call site.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// No gameweek is flagged current (pre-season/off-season). Fatal for
    /// any live computation; never retried.
    #[error("no current gameweek: the season is not in play")]
    NoCurrentGameweek,

    /// A required upstream fetch failed (e.g. league standings). Per-item
    /// sub-fetches inside a fan-out degrade locally instead.
    #[error("provider unavailable: {context}")]
    Provider {
        context: String,
        #[source]
        source: anyhow::Error,
    },

    /// Structurally invalid input that cannot be degraded around, e.g. a
    /// pick response without 15 players.
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

impl EngineError {
    /// Wrap an upstream failure with a short description of what was
    /// being fetched.
    pub fn provider(context: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        EngineError::Provider {
            context: context.into(),
            source: source.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        EngineError::InvalidInput {
            message: message.into(),
        }
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
