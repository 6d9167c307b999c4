//! Retrieval errors

use oanet_core::{Retryable, StreamError};

use crate::state::Entity;

/// Error that terminates a retrieval session.
#[derive(Debug)]
pub enum FetchError {
    /// Server answered with a non-2xx status
    Retrieval {
        entity: Entity,
        status: u16,
        message: String,
    },
    /// Body is not JSON, reports an API error, or lacks `results`/`meta`
    Decode { entity: Entity, message: String },
    /// No response at all (connection refused, reset, ...)
    Transport { entity: Entity, source: StreamError },
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Retrieval {
                entity,
                status,
                message,
            } => write!(f, "{entity}: HTTP {status}: {message}"),
            Self::Decode { entity, message } => write!(f, "{entity}: decode error: {message}"),
            Self::Transport { entity, source } => write!(f, "{entity}: {source}"),
        }
    }
}

impl std::error::Error for FetchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl FetchError {
    pub fn entity(&self) -> Entity {
        match self {
            Self::Retrieval { entity, .. }
            | Self::Decode { entity, .. }
            | Self::Transport { entity, .. } => *entity,
        }
    }

    /// HTTP status for `Retrieval` errors
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Retrieval { status, .. } => Some(*status),
            Self::Transport { source, .. } => source.status(),
            Self::Decode { .. } => None,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }
}

impl Retryable for FetchError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Retrieval { status, .. } => oanet_core::stream::is_retryable_status(Some(*status)),
            Self::Transport { source, .. } => source.is_retryable(),
            Self::Decode { .. } => false,
        }
    }
}
