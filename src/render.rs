use std::fmt::Write as _;

use crate::error::FailureKind;
use crate::model::{SearchResponse, SourceRecord};

pub const THINKING: &str = "Assistant: Thinking...";
pub const APOLOGY: &str = "Assistant: I'm sorry, I couldn't process your request.";

pub fn render_sources(sources: &[SourceRecord]) -> String {
    if sources.is_empty() {
        return String::new();
    }

    let mut out = String::from("Sources Referenced:\n");
    for (idx, source) in sources.iter().enumerate() {
        let _ = writeln!(out, "{}. {}: {}", idx + 1, source.title, source.url);
    }
    out
}

pub fn render_response(response: &SearchResponse) -> String {
    let mut out = format!(
        "Assistant: [Response took {} seconds]\n",
        response.elapsed.as_secs()
    );
    if !response.sources.is_empty() {
        let _ = writeln!(
            out,
            "Assistant: {} sources referenced.",
            response.sources.len()
        );
        out.push_str(&render_sources(&response.sources));
    }
    let _ = write!(out, "\nAssistant:\n{}\n", response.message.trim());
    out
}

pub fn render_failure(failure: &FailureKind) -> String {
    let reason = match failure {
        FailureKind::Timeout { .. } => {
            "Assistant: [No response received within the timeout period]".to_string()
        }
        FailureKind::Http { status, detail, .. } => {
            format!("Assistant: [HTTP error {status}: {detail}]")
        }
        FailureKind::Transport { detail, .. } => format!("Assistant: [Request error: {detail}]"),
    };
    format!("{reason}\n{APOLOGY}\n")
}
