use serde::ser::{SerializeTuple, Serializer};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

use crate::error::InvalidRoleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Human,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Assistant => "assistant",
        }
    }

    /// Capitalized form used in transcript lines.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Human => "Human",
            Self::Assistant => "Assistant",
        }
    }
}

impl FromStr for Role {
    type Err = InvalidRoleError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "human" => Ok(Self::Human),
            "assistant" => Ok(Self::Assistant),
            other => Err(InvalidRoleError::new(other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub role: Role,
    pub text: String,
}

impl HistoryEntry {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }

    pub fn human(text: impl Into<String>) -> Self {
        Self::new(Role::Human, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, text)
    }
}

// The search API expects each turn as a `[role, text]` pair.
impl Serialize for HistoryEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut pair = serializer.serialize_tuple(2)?;
        pair.serialize_element(self.role.as_str())?;
        pair.serialize_element(&self.text)?;
        pair.end()
    }
}

/// Body of `POST /api/search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub chat_model: String,
    pub embedding_model: String,
    pub optimization_mode: String,
    pub focus_mode: String,
    pub query: String,
    pub history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResponse {
    pub message: String,
    pub sources: Vec<SourceRecord>,
    pub status: u16,
    pub elapsed: Duration,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponseBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub sources: Option<Vec<SourceBody>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SourceBody {
    pub metadata: SourceMetadata,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SourceMetadata {
    pub title: String,
    pub url: String,
}

impl SearchResponseBody {
    pub(crate) fn into_response(self, status: u16, elapsed: Duration) -> SearchResponse {
        let sources = self
            .sources
            .unwrap_or_default()
            .into_iter()
            .map(|source| SourceRecord {
                title: source.metadata.title,
                url: source.metadata.url,
            })
            .collect();

        SearchResponse {
            message: self.message,
            sources,
            status,
            elapsed,
        }
    }
}
