use tracing::{error, info, warn};

use crate::error::FailureKind;
use crate::model::SearchResponse;
use crate::session::Session;
use crate::transcript::{FileTranscript, Transcript};
use crate::transport::{SearchBackend, Transport};

/// Runs one query at a time against a [`SearchBackend`], keeping the
/// session history in step with what the service acknowledged.
pub struct ResearchClient<B = Transport, T = FileTranscript> {
    session: Session<T>,
    backend: B,
}

impl<B, T> ResearchClient<B, T>
where
    B: SearchBackend,
    T: Transcript,
{
    pub fn new(session: Session<T>, backend: B) -> Self {
        Self { session, backend }
    }

    pub fn session(&self) -> &Session<T> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session<T> {
        &mut self.session
    }

    /// Sends `query` with the current history. Only a successful reply
    /// appends the human and assistant turns.
    pub async fn ask(&mut self, query: &str) -> Result<SearchResponse, FailureKind> {
        let request = self.session.build_payload(query);

        let response = match self.backend.search(&request).await {
            Ok(response) => response,
            Err(failure) => {
                if failure.is_timeout() {
                    warn!(kind = failure.label(), error = %failure, "search produced no answer");
                } else {
                    error!(kind = failure.label(), error = %failure, "search produced no answer");
                }
                return Err(failure);
            }
        };

        if !response.sources.is_empty() {
            info!(source_count = response.sources.len(), "sources referenced");
            for source in &response.sources {
                info!(title = %source.title, url = %source.url, "source");
            }
        }

        self.session.record_exchange(query, &response.message);
        Ok(response)
    }
}
