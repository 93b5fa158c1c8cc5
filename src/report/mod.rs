// src/report/mod.rs
// =============================================================================
// This module defines how check results leave the checker.
//
// A Reporter receives one callback per checked bookmark, from whichever
// worker finished it, and a final on_end() once every worker is done.
//
// Submodules:
// - text: Streams one human-readable line per result
// - json: Collects results and writes one JSON array at the end
//
// Reporters are called from many workers at the same time, so every
// implementation is Send + Sync and synchronizes its own state.
// =============================================================================

mod json;
mod text;

pub use json::JsonReporter;
pub use text::StreamingReporter;

use crate::bookmarks::Bookmark;
use anyhow::Result;
use clap::ValueEnum;

/// A bookmark whose check failed, and why
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupFailure {
    pub bookmark: Bookmark,
    /// Status of the last response, None when no response was obtained
    pub status: Option<u16>,
    /// Transport error text when no response was obtained
    pub error: Option<String>,
}

impl LookupFailure {
    /// The status code, or -1 when the request never got a response
    pub fn http_code(&self) -> i32 {
        self.status.map_or(-1, i32::from)
    }
}

/// Receives the outcome of every check in a run
pub trait Reporter: Send + Sync {
    fn on_success(&self, bookmark: Bookmark);

    fn on_failure(&self, failure: LookupFailure);

    /// Called exactly once, after every success/failure callback of the run
    fn on_end(&self) -> Result<()>;
}

/// Which reporter to use for the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One line per result
    Txt,
    /// A JSON array of bookmarks, written when the run ends
    Json,
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why `&self` and not `&mut self` in the trait?
//    - All workers hold the same reporter through an Arc
//    - An Arc only hands out shared references (&), never &mut
//    - So reporters that keep state use a Mutex or a channel inside
//
// 2. What do Send + Sync mean?
//    - Send: the value may move to another thread
//    - Sync: a shared reference to it may be used from several threads
//    - tokio may run workers on different threads, so both are required
// -----------------------------------------------------------------------------
