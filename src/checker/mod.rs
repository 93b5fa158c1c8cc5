// src/checker/mod.rs
// =============================================================================
// This module contains the liveness checking engine.
//
// Submodules:
// - http: The HEAD-then-GET probe for a single URL, and the HTTP settings
// - rate_limit: Token bucket shared by all workers
// - pool: The Checker, which runs the worker pool over a bookmark list
//
// This file (mod.rs) is the module root - it re-exports the public API so
// callers can write `checker::Checker` instead of `checker::pool::Checker`.
// =============================================================================

mod http;
mod pool;
mod rate_limit;

pub use http::{HttpConfig, LivenessProbe, ProbeOutcome};
pub use pool::{Checker, CheckerConfig, ConfigError, RunSummary};
pub use rate_limit::{Clock, RateLimiter, TokioClock};
