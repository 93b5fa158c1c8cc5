// src/lib.rs
// =============================================================================
// bookmark-checker: find out which bookmarked links are still alive.
//
// The library holds the whole checking engine:
// - bookmarks: The Bookmark record and the JSON/text readers
// - checker:   Worker pool, rate limiter and the HEAD-then-GET probe
// - report:    The Reporter trait with streaming text and JSON output
// - logging:   Installs the tracing subscriber used by the CLI
//
// The binary (src/main.rs) only parses flags and wires these together.
// =============================================================================

pub mod bookmarks;
pub mod checker;
pub mod logging;
pub mod report;

#[cfg(test)]
mod test_support;
