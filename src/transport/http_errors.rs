use std::error::Error as StdError;
use std::io::ErrorKind;
use std::time::Duration;

use crate::error::FailureKind;

fn error_chain_has_connection_refused(err: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == ErrorKind::ConnectionRefused
        {
            return true;
        }

        if source
            .to_string()
            .to_ascii_lowercase()
            .contains("connection refused")
        {
            return true;
        }

        current = source.source();
    }

    false
}

fn error_chain_has_timeout(err: &(dyn StdError + 'static)) -> bool {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(source) = current {
        if let Some(io_err) = source.downcast_ref::<std::io::Error>()
            && io_err.kind() == ErrorKind::TimedOut
        {
            return true;
        }

        if source
            .to_string()
            .to_ascii_lowercase()
            .contains("timed out")
        {
            return true;
        }

        current = source.source();
    }

    false
}

/// Maps a reqwest failure onto timeout or transport.
pub(crate) fn classify_request_error(
    err: &reqwest::Error,
    api_url: &str,
    timeout: Duration,
) -> FailureKind {
    if err.is_timeout() || error_chain_has_timeout(err) {
        return FailureKind::Timeout {
            url: api_url.to_string(),
            timeout,
        };
    }

    let detail = if err.is_connect() {
        if error_chain_has_connection_refused(err) {
            "Connection refused by search API. \
             Ensure the service is running and base_url is correct."
                .to_string()
        } else {
            "Failed to connect to search API. Check base_url and network connectivity.".to_string()
        }
    } else {
        err.to_string()
    };

    FailureKind::Transport {
        url: api_url.to_string(),
        detail,
    }
}

/// Detail for a non-2xx reply: the body if there is one, else the reason phrase.
pub(crate) fn http_error_detail(status: reqwest::StatusCode, body: &str) -> String {
    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("unknown status")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::{classify_request_error, error_chain_has_timeout, http_error_detail};
    use crate::error::FailureKind;
    use reqwest::{Client, StatusCode};
    use std::net::TcpListener;
    use std::thread;
    use std::time::Duration;

    fn free_local_addr() -> std::net::SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
        let addr = listener.local_addr().expect("address should be available");
        drop(listener);
        addr
    }

    #[tokio::test]
    async fn maps_connection_refused_errors_to_transport_failure() {
        let addr = free_local_addr();
        let api_url = format!("http://{}/api/search", addr);
        let client = Client::builder()
            .timeout(Duration::from_millis(300))
            .build()
            .expect("client should build");

        let req_err = client
            .post(&api_url)
            .send()
            .await
            .expect_err("request should fail with connection-refused");
        let mapped = classify_request_error(&req_err, &api_url, Duration::from_secs(1));

        match mapped {
            FailureKind::Transport { url, detail } => {
                assert_eq!(url, api_url);
                assert!(detail.contains("Connection refused"), "unexpected detail: {detail}");
                assert!(detail.contains("base_url"), "unexpected detail: {detail}");
            }
            other => panic!("expected transport failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn maps_timeout_errors_to_timeout_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind should succeed");
        let addr = listener.local_addr().expect("address should be available");
        let server = thread::spawn(move || {
            let (_stream, _) = listener.accept().expect("accept should succeed");
            thread::sleep(Duration::from_secs(1));
        });

        let api_url = format!("http://{}/api/search", addr);
        let client = Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("client should build");

        let req_err = client
            .post(&api_url)
            .send()
            .await
            .expect_err("request should fail with timeout");
        let mapped = classify_request_error(&req_err, &api_url, Duration::from_secs(2));

        assert_eq!(
            mapped,
            FailureKind::Timeout {
                url: api_url,
                timeout: Duration::from_secs(2),
            }
        );

        server.join().expect("server thread should join");
    }

    #[test]
    fn detects_timeout_from_error_kind() {
        let err = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
        assert!(error_chain_has_timeout(&err));
    }

    #[test]
    fn http_error_detail_prefers_body_over_reason() {
        assert_eq!(
            http_error_detail(StatusCode::BAD_GATEWAY, "  upstream down \n"),
            "upstream down"
        );
        assert_eq!(
            http_error_detail(StatusCode::INTERNAL_SERVER_ERROR, ""),
            "Internal Server Error"
        );
    }
}
