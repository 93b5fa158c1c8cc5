// src/report/json.rs
// =============================================================================
// The JSON reporter stays silent during the run and writes a single JSON
// array of bookmarks when the run ends.
//
// What ends up in the array:
// - every failed bookmark, with a "failure" object (httpCode, message,
//   checkedAt) describing what went wrong
// - followed by every successful bookmark, only in verbose mode
//
// The output uses the same format as the JSON input, so the failed subset
// can be fed straight back into another check.
//
// Workers don't touch shared vectors. Each callback sends an event into a
// channel, and on_end() is the only place that reads the channel, so the
// collecting happens on one thread.
// =============================================================================

use super::{LookupFailure, Reporter};
use crate::bookmarks::{Bookmark, FailureInfo};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::io::{self, Write};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Mutex, PoisonError};

// One callback, as it travels from a worker to on_end()
enum Event {
    Success(Bookmark),
    Failure(LookupFailure, DateTime<Utc>),
}

/// Collects results and writes them as JSON at the end of the run
pub struct JsonReporter {
    verbose: bool,
    events: Sender<Event>,
    inbox: Mutex<Receiver<Event>>,
    writers: Mutex<Vec<Box<dyn Write + Send>>>,
}

impl JsonReporter {
    /// Creates the reporter; with no writers it prints to stdout
    pub fn new(verbose: bool, mut writers: Vec<Box<dyn Write + Send>>) -> Self {
        if writers.is_empty() {
            writers.push(Box::new(io::stdout()));
        }

        let (events, inbox) = mpsc::channel();
        Self {
            verbose,
            events,
            inbox: Mutex::new(inbox),
            writers: Mutex::new(writers),
        }
    }

    fn send(&self, event: Event) {
        // Only fails if the receiver is gone, which can't happen while self lives
        if self.events.send(event).is_err() {
            tracing::warn!("JSON reporter inbox is closed, result dropped");
        }
    }

    // Empties the channel, which also leaves the reporter ready for the next run
    fn collect(&self) -> (Vec<Bookmark>, Vec<Bookmark>) {
        let inbox = self.inbox.lock().unwrap_or_else(PoisonError::into_inner);

        let mut failed = Vec::new();
        let mut succeeded = Vec::new();
        // try_iter() stops at the first empty read instead of waiting
        for event in inbox.try_iter() {
            match event {
                Event::Failure(failure, checked_at) => {
                    failed.push(annotate(failure, checked_at));
                }
                Event::Success(bookmark) => succeeded.push(bookmark),
            }
        }

        (failed, succeeded)
    }
}

// Copies what we know about the failure into the bookmark itself
fn annotate(failure: LookupFailure, checked_at: DateTime<Utc>) -> Bookmark {
    let mut bookmark = failure.bookmark;
    bookmark.failure_info = Some(FailureInfo {
        http_code: failure.status,
        message: failure.error,
        checked_at: Some(checked_at),
    });
    bookmark
}

impl Reporter for JsonReporter {
    fn on_success(&self, mut bookmark: Bookmark) {
        // A previous run may have marked it as failed
        bookmark.failure_info = None;
        self.send(Event::Success(bookmark));
    }

    fn on_failure(&self, failure: LookupFailure) {
        // Stamp the time now, not when on_end() gets around to it
        self.send(Event::Failure(failure, Utc::now()));
    }

    fn on_end(&self) -> Result<()> {
        let (mut report, succeeded) = self.collect();

        // Failures first, then successes in verbose mode
        if self.verbose {
            report.extend(succeeded);
        }

        let mut writers = self.writers.lock().unwrap_or_else(PoisonError::into_inner);
        for writer in writers.iter_mut() {
            // One array per sink, followed by a newline
            serde_json::to_writer(&mut *writer, &report).context("Failed to write JSON report")?;
            writer
                .write_all(b"\n")
                .and_then(|()| writer.flush())
                .context("Failed to write JSON report")?;
        }

        Ok(())
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is mpsc?
//    - "multiple producer, single consumer" channel from the standard library
//    - Many workers can send() at once; only one receiver reads
//    - try_iter() reads everything currently queued without waiting
//
// 2. Why is the Receiver inside a Mutex?
//    - A Receiver can move between threads (Send) but can't be shared (not Sync)
//    - Reporter must be Sync, and wrapping it in a Mutex makes it so
//
// 3. What does `&mut *writer` mean?
//    - writer is a &mut Box<dyn Write + Send>
//    - *writer is the Box, and &mut *writer reborrows it so to_writer can
//      use it without taking ownership
// -----------------------------------------------------------------------------
