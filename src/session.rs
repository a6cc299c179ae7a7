use chrono::Local;
use std::collections::VecDeque;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::InvalidRoleError;
use crate::model::{HistoryEntry, Role, SearchRequest};
use crate::transcript::{FileTranscript, Transcript};

/// Rolling conversation history plus the settings every request carries.
///
/// History only ever holds completed exchanges; see
/// [`ResearchClient::ask`](crate::client::ResearchClient::ask).
pub struct Session<T = FileTranscript> {
    config: Config,
    history: VecDeque<HistoryEntry>,
    transcript: T,
}

impl<T: Transcript> Session<T> {
    pub fn new(config: Config, transcript: T) -> Self {
        Self {
            config,
            history: VecDeque::new(),
            transcript,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn history(&self) -> &VecDeque<HistoryEntry> {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }

    pub fn append(&mut self, role: Role, text: impl Into<String>) {
        let entry = HistoryEntry::new(role, text);

        while self.history.len() >= self.config.history_limit.max(1) {
            self.history.pop_front();
        }

        if let Err(err) = self.transcript.record(&entry, Local::now()) {
            warn!(role = role.as_str(), error = %err, "failed to write transcript entry");
        }
        info!(
            role = role.as_str(),
            text_len = entry.text.len(),
            history_len = self.history.len() + 1,
            "appended history entry"
        );
        debug!(role = role.as_str(), text = %entry.text, "history entry text");

        self.history.push_back(entry);
    }

    pub fn append_str(
        &mut self,
        role: &str,
        text: impl Into<String>,
    ) -> Result<(), InvalidRoleError> {
        let role = role.parse::<Role>()?;
        self.append(role, text);
        Ok(())
    }

    pub fn build_payload(&self, query: &str) -> SearchRequest {
        SearchRequest {
            chat_model: self.config.chat_model.clone(),
            embedding_model: self.config.embedding_model.clone(),
            optimization_mode: self.config.optimization_mode.clone(),
            focus_mode: self.config.focus_mode.clone(),
            query: query.to_string(),
            history: self.history.iter().cloned().collect(),
        }
    }

    pub(crate) fn record_exchange(&mut self, query: &str, reply: &str) {
        self.append(Role::Human, query);
        self.append(Role::Assistant, reply);
    }
}
