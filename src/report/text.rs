// src/report/text.rs
// =============================================================================
// The streaming reporter prints one line per result as soon as it arrives.
//
// Output:
//   [ERR] https://example.com/gone HTTP status: 404
//   [ERR] https://nope.invalid/ Other: failed to lookup address information
//   [OK] https://example.com/          (only with --verbose)
//
// Workers call this reporter concurrently. Each line is rendered in full
// first, then written with a single write_all while holding the sink lock,
// so lines from different workers never mix.
// =============================================================================

use super::{LookupFailure, Reporter};
use crate::bookmarks::Bookmark;
use anyhow::Result;
use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};

// ANSI color codes for the [OK]/[ERR] tags
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

/// Writes a line per event to one or more sinks
pub struct StreamingReporter {
    verbose: bool,
    colorize: bool,
    writers: Mutex<Vec<Box<dyn Write + Send>>>,
}

impl StreamingReporter {
    /// Creates the reporter; with no writers it prints to stdout
    pub fn new(verbose: bool, colorize: bool, mut writers: Vec<Box<dyn Write + Send>>) -> Self {
        if writers.is_empty() {
            writers.push(Box::new(io::stdout()));
        }

        Self {
            verbose,
            colorize,
            writers: Mutex::new(writers),
        }
    }

    fn prefix(&self, tag: &str, color: &str) -> String {
        if self.colorize {
            format!("{}{}{} ", color, tag, RESET)
        } else {
            format!("{} ", tag)
        }
    }

    // Sends one complete line to every sink
    //
    // The write blocks the calling worker's thread while the lock is held, so
    // a stalled stdout pipe holds up every worker until it drains.
    fn emit(&self, line: &str) {
        // A panic in another worker must not silence the rest of the report
        let mut writers = self.writers.lock().unwrap_or_else(PoisonError::into_inner);

        // One write_all per sink keeps the line in one piece
        for writer in writers.iter_mut() {
            let result = writer
                .write_all(line.as_bytes())
                .and_then(|()| writer.flush());
            // A broken sink loses its line, the check itself keeps going
            if let Err(e) = result {
                tracing::warn!(error = %e, "Failed to write report line");
            }
        }
    }
}

// Short description of why a lookup failed
//
// "HTTP status: 404" when the server answered, otherwise the last part of
// the error chain, which is usually the root cause.
fn error_message(failure: &LookupFailure) -> String {
    if let Some(code) = failure.status {
        return format!("HTTP status: {}", code);
    }

    // "error sending request: dns error: failed to lookup" -> "failed to lookup"
    let cause = failure
        .error
        .as_deref()
        .and_then(|text| text.rsplit(": ").next())
        .unwrap_or("unknown error");
    format!("Other: {}", cause)
}

impl Reporter for StreamingReporter {
    fn on_success(&self, bookmark: Bookmark) {
        // Alive links are noise unless the user asked for them
        if self.verbose {
            let line = format!("{}{}\n", self.prefix("[OK]", GREEN), bookmark.href);
            self.emit(&line);
        }
    }

    fn on_failure(&self, failure: LookupFailure) {
        // Build the whole line first, then write it in one go
        let line = format!(
            "{}{} {}\n",
            self.prefix("[ERR]", RED),
            failure.bookmark.href,
            error_message(&failure)
        );
        self.emit(&line);
    }

    fn on_end(&self) -> Result<()> {
        // Every line has already been written
        Ok(())
    }
}
