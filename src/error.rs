use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Role must be 'human' or 'assistant', got '{role}'")]
pub struct InvalidRoleError {
    pub role: String,
}

impl InvalidRoleError {
    pub fn new(role: impl Into<String>) -> Self {
        Self { role: role.into() }
    }
}

/// Why a search call produced no answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureKind {
    #[error("No response received from '{url}' within {:.1}s", .timeout.as_secs_f64())]
    Timeout { url: String, timeout: Duration },
    #[error("HTTP error {status} from '{url}': {detail}")]
    Http {
        url: String,
        status: u16,
        detail: String,
    },
    #[error("Request to '{url}' failed: {detail}")]
    Transport { url: String, detail: String },
}

impl FailureKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Http { .. } => "http",
            Self::Transport { .. } => "transport",
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}
