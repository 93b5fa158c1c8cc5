// src/checker/http.rs
// =============================================================================
// This module decides whether a single URL is alive.
//
// Key functionality:
// - Makes an HTTP HEAD request first (lightweight, no body download)
// - Falls back to GET when the HEAD answer is not good enough, because some
//   servers reject HEAD but serve GET just fine
// - Treats 200 and 429 (Too Many Requests) as alive: a server that rate
//   limits us still proves the page exists
// - Reports transport failures (DNS, connect, timeout, TLS) with code -1
//
// Rust concepts:
// - async/await: For network I/O
// - Option<T>: Status codes and error texts that may not exist
// - Builder pattern: reqwest::Client::builder()
// =============================================================================

use reqwest::{redirect::Policy, Client, Response, StatusCode};
use std::error::Error as StdError;
use std::time::Duration;

/// Settings for the HTTP client shared by every worker
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// How long a single HEAD or GET may take
    pub timeout: Duration,
    /// Accept invalid TLS certificates
    pub skip_verify: bool,
    /// How many redirects to follow, 0 turns redirect following off
    pub max_redirects: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            skip_verify: false,
            max_redirects: 10,
        }
    }
}

impl HttpConfig {
    // Builds the client once; clones of it share the connection pool and
    // the cookie jar
    pub fn build_client(&self) -> Result<Client, reqwest::Error> {
        let redirect = if self.max_redirects == 0 {
            Policy::none()
        } else {
            Policy::limited(self.max_redirects)
        };

        Client::builder()
            .timeout(self.timeout)
            .cookie_store(true)
            .danger_accept_invalid_certs(self.skip_verify)
            .redirect(redirect)
            .build()
    }
}

/// Result of probing one URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub alive: bool,
    /// Status of the response the verdict is based on, None if nothing came back
    pub status: Option<u16>,
    /// Transport error text, only set when no response was obtained
    pub error: Option<String>,
}

impl ProbeOutcome {
    fn alive(status: StatusCode) -> Self {
        Self {
            alive: true,
            status: Some(status.as_u16()),
            error: None,
        }
    }

    fn dead(status: StatusCode) -> Self {
        Self {
            alive: false,
            status: Some(status.as_u16()),
            error: None,
        }
    }

    fn unreachable(error: reqwest::Error) -> Self {
        Self {
            alive: false,
            status: None,
            error: Some(describe_error(&error)),
        }
    }

    /// The status code, or -1 when the request never got a response
    pub fn http_code(&self) -> i32 {
        self.status.map_or(-1, i32::from)
    }
}

/// The HEAD-then-GET liveness check
#[derive(Debug, Clone)]
pub struct LivenessProbe {
    client: Client,
}

impl LivenessProbe {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn probe(&self, url: &str) -> ProbeOutcome {
        let head = match self.client.head(url).send().await {
            Ok(response) => response,
            Err(e) => return ProbeOutcome::unreachable(e),
        };

        let head_status = head.status();
        if !is_bad_status(head_status) {
            return ProbeOutcome::alive(head_status);
        }

        tracing::debug!(url, status = head_status.as_u16(), "HEAD inconclusive, trying GET");

        let get = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return ProbeOutcome::unreachable(e),
        };

        let get_status = get.status();
        drain(url, get).await;

        if is_bad_status(get_status) {
            ProbeOutcome::dead(get_status)
        } else {
            ProbeOutcome::alive(get_status)
        }
    }
}

// Anything but 200 OK and 429 Too Many Requests counts as bad
pub fn is_bad_status(status: StatusCode) -> bool {
    status != StatusCode::OK && status != StatusCode::TOO_MANY_REQUESTS
}

// Reads the whole body so the connection can go back to the pool
//
// The status is already known at this point, so a broken body only gets
// logged.
async fn drain(url: &str, mut response: Response) {
    loop {
        match response.chunk().await {
            Ok(Some(_)) => continue,
            Ok(None) => break,
            Err(e) => {
                tracing::debug!(url, error = %e, "Failed to drain response body");
                break;
            }
        }
    }
}

// Flattens an error and its causes into "outer: inner: root cause"
//
// Causes whose text already shows up in the message are skipped, since some
// errors print their source as part of their own message.
fn describe_error(error: &(dyn StdError + 'static)) -> String {
    let mut text = error.to_string();
    let mut source = error.source();

    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !text.contains(&cause_text) {
            text.push_str(": ");
            text.push_str(&cause_text);
        }
        source = cause.source();
    }

    text
}
