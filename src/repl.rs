use anyhow::{Context, Result};
use std::io::{BufRead, Write};

use crate::client::ResearchClient;
use crate::model::{HistoryEntry, Role};
use crate::render::{THINKING, render_failure, render_response};
use crate::transcript::Transcript;
use crate::transport::SearchBackend;

const GREETING_QUERY: &str = "Hello!";
const GREETING_REPLY: &str = "Hi there! How can I assist you today?";

/// Sends one query and prints the outcome. Returns whether an answer arrived.
pub async fn handle_query<B, T>(
    client: &mut ResearchClient<B, T>,
    query: &str,
    out: &mut impl Write,
) -> Result<bool>
where
    B: SearchBackend,
    T: Transcript,
{
    writeln!(out, "{THINKING}").context("Failed to write to stdout")?;
    out.flush().context("Failed to flush stdout")?;

    let (text, answered) = match client.ask(query).await {
        Ok(response) => (render_response(&response), true),
        Err(failure) => (render_failure(&failure), false),
    };
    writeln!(out, "{text}").context("Failed to write to stdout")?;
    Ok(answered)
}

pub async fn run_repl<B, T>(
    client: &mut ResearchClient<B, T>,
    mut input: impl BufRead,
    out: &mut impl Write,
) -> Result<()>
where
    B: SearchBackend,
    T: Transcript,
{
    seed_greeting(client);

    writeln!(out, "askweb research chat")?;
    writeln!(out, "model: {}", client.session().config().chat_model)?;
    writeln!(
        out,
        "type a query, '/history' to inspect memory, '/reset' to clear memory, or 'exit' to quit\n"
    )?;
    writeln!(out, "Assistant: {GREETING_REPLY}\n")?;

    loop {
        write!(out, "You: ")?;
        out.flush().context("Failed to flush stdout")?;

        let mut line = String::new();
        let read = input
            .read_line(&mut line)
            .context("Failed to read stdin")?;
        if read == 0 {
            break;
        }

        let query = line.trim();
        if query.is_empty() {
            continue;
        }
        if query.eq_ignore_ascii_case("exit") || query.eq_ignore_ascii_case("quit") {
            break;
        }
        if query.eq_ignore_ascii_case("/reset") {
            client.session_mut().clear();
            seed_greeting(client);
            writeln!(out, "conversation reset\n")?;
            continue;
        }
        if query.eq_ignore_ascii_case("/history") {
            print_history(client.session().history().iter(), out)?;
            continue;
        }

        handle_query(client, query, out).await?;
    }

    writeln!(out, "Ending chat. Goodbye!")?;
    Ok(())
}

fn seed_greeting<B, T>(client: &mut ResearchClient<B, T>)
where
    B: SearchBackend,
    T: Transcript,
{
    let session = client.session_mut();
    session.append(Role::Human, GREETING_QUERY);
    session.append(Role::Assistant, GREETING_REPLY);
}

fn print_history<'a>(
    history: impl ExactSizeIterator<Item = &'a HistoryEntry>,
    out: &mut impl Write,
) -> Result<()> {
    if history.len() == 0 {
        writeln!(out, "(history is empty)\n")?;
        return Ok(());
    }

    for (idx, entry) in history.enumerate() {
        writeln!(out, "[{}] {}: {}", idx, entry.role.as_str(), entry.text)?;
    }
    writeln!(out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::time::Duration;

    use super::{GREETING_QUERY, GREETING_REPLY, handle_query, run_repl};
    use crate::client::ResearchClient;
    use crate::config::Config;
    use crate::error::FailureKind;
    use crate::model::{HistoryEntry, SearchRequest, SearchResponse};
    use crate::session::Session;
    use crate::transcript::NoTranscript;
    use crate::transport::{SearchBackend, SearchFuture};

    /// Echoes the query back, or fails every call.
    struct EchoBackend {
        fail: bool,
    }

    impl SearchBackend for EchoBackend {
        fn search<'a>(&'a self, request: &'a SearchRequest) -> SearchFuture<'a> {
            let result = if self.fail {
                Err(FailureKind::Transport {
                    url: "http://x/api/search".to_string(),
                    detail: "unreachable".to_string(),
                })
            } else {
                Ok(SearchResponse {
                    message: format!("echo: {}", request.query),
                    sources: Vec::new(),
                    status: 200,
                    elapsed: Duration::ZERO,
                })
            };
            Box::pin(async move { result })
        }
    }

    fn client(fail: bool) -> ResearchClient<EchoBackend, NoTranscript> {
        let cfg = Config {
            base_url: "http://x".to_string(),
            timeout: Duration::from_secs(5),
            chat_model: "m".to_string(),
            embedding_model: "e".to_string(),
            optimization_mode: "speed".to_string(),
            focus_mode: "web".to_string(),
            history_limit: 100,
        };
        ResearchClient::new(Session::new(cfg, NoTranscript), EchoBackend { fail })
    }

    async fn run_with_input(
        client: &mut ResearchClient<EchoBackend, NoTranscript>,
        input: &str,
    ) -> String {
        let mut out = Vec::new();
        run_repl(client, Cursor::new(input.to_string()), &mut out)
            .await
            .expect("repl should finish");
        String::from_utf8(out).expect("output should be utf-8")
    }

    fn history(client: &ResearchClient<EchoBackend, NoTranscript>) -> Vec<HistoryEntry> {
        client.session().history().iter().cloned().collect()
    }

    #[tokio::test]
    async fn repl_seeds_greeting_and_stops_on_quit() {
        let mut client = client(false);
        let output = run_with_input(&mut client, "QUIT\nnever sent\n").await;

        assert!(output.contains(GREETING_REPLY));
        assert!(output.contains("Goodbye"));
        assert!(!output.contains("echo: never sent"));
        assert_eq!(
            history(&client),
            vec![
                HistoryEntry::human(GREETING_QUERY),
                HistoryEntry::assistant(GREETING_REPLY),
            ]
        );
    }

    #[tokio::test]
    async fn repl_answers_queries_until_eof() {
        let mut client = client(false);
        let output = run_with_input(&mut client, "\n  what is rust?  \n").await;

        assert!(output.contains("echo: what is rust?"));
        assert_eq!(client.session().len(), 4);
        assert_eq!(
            client.session().history()[2],
            HistoryEntry::human("what is rust?")
        );
    }

    #[tokio::test]
    async fn repl_reset_reseeds_greeting() {
        let mut client = client(false);
        let output = run_with_input(&mut client, "one\n/reset\nExit\n").await;

        assert!(output.contains("conversation reset"));
        assert_eq!(client.session().len(), 2);
        assert_eq!(
            client.session().history()[0],
            HistoryEntry::human(GREETING_QUERY)
        );
    }

    #[tokio::test]
    async fn repl_history_lists_entries() {
        let mut client = client(false);
        let output = run_with_input(&mut client, "/history\nexit\n").await;

        assert!(output.contains("[0] human: Hello!"));
        assert!(output.contains("[1] assistant: Hi there!"));
    }

    #[tokio::test]
    async fn repl_failed_query_keeps_looping_without_recording() {
        let mut client = client(true);
        let output = run_with_input(&mut client, "lost\nexit\n").await;

        assert!(output.contains("Request error: unreachable"));
        assert!(output.contains("couldn't process your request"));
        assert!(output.contains("Goodbye"));
        assert_eq!(client.session().len(), 2);
    }

    #[tokio::test]
    async fn handle_query_reports_whether_answer_arrived() {
        let mut ok_client = client(false);
        let mut out = Vec::new();
        assert!(handle_query(&mut ok_client, "hi", &mut out).await.unwrap());

        let mut failing_client = client(true);
        let mut out = Vec::new();
        assert!(!handle_query(&mut failing_client, "hi", &mut out).await.unwrap());
        assert_eq!(failing_client.session().len(), 0);
    }
}
