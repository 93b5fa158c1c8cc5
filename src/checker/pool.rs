// src/checker/pool.rs
// =============================================================================
// This module runs a whole check: a fixed pool of workers drains a queue of
// bookmarks, every worker waits on one shared rate limiter, and every result
// goes to the reporter.
//
// How a run works:
// 1. Create a bounded queue with room for `workers` bookmarks
// 2. Start all workers (each is a tokio task)
// 3. Push every bookmark into the queue, in input order, then close it
// 4. Wait for every worker to finish
// 5. Call reporter.on_end() exactly once
//
// A failed check never stops the run. The only errors that stop anything are
// configuration errors, and those are caught in Checker::new before a single
// worker starts.
//
// Rust concepts:
// - Arc: Share the probe, limiter, queue and reporter between tasks
// - mpsc channel: The job queue
// - JoinHandle: Wait for spawned tasks to finish
// =============================================================================

use super::http::{HttpConfig, LivenessProbe};
use super::rate_limit::RateLimiter;
use crate::bookmarks::Bookmark;
use crate::report::{LookupFailure, Reporter};
use anyhow::{bail, Result};
use futures::future::join_all;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tracing::Instrument;

/// Settings for a Checker
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Requests per second across all workers (also the burst size)
    pub request_rate: f64,
    /// Number of concurrent workers
    pub workers: usize,
    pub http: HttpConfig,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            request_rate: 10.0,
            workers: 10,
            http: HttpConfig::default(),
        }
    }
}

/// Problems that make a run impossible
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("number of workers must be at least 1")]
    NoWorkers,

    #[error("request rate must be a positive number, got {0}")]
    InvalidRate(f64),

    #[error("could not build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Counts for a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub alive: usize,
    pub dead: usize,
}

// Tallies filled in by the workers
#[derive(Debug, Default)]
struct Tally {
    alive: AtomicUsize,
    dead: AtomicUsize,
}

/// Checks a list of bookmarks with a bounded number of workers
#[derive(Debug)]
pub struct Checker {
    request_rate: f64,
    workers: usize,
    probe: Arc<LivenessProbe>,
}

impl Checker {
    /// Validates the configuration and builds the shared HTTP client
    pub fn new(config: CheckerConfig) -> Result<Self, ConfigError> {
        if config.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if !config.request_rate.is_finite() || config.request_rate <= 0.0 {
            return Err(ConfigError::InvalidRate(config.request_rate));
        }

        let client = config.http.build_client().map_err(ConfigError::HttpClient)?;

        Ok(Self {
            request_rate: config.request_rate,
            workers: config.workers,
            probe: Arc::new(LivenessProbe::new(client)),
        })
    }

    /// Checks every bookmark and blocks until all of them are reported
    ///
    /// Results reach the reporter in completion order, not input order.
    pub async fn run(&self, bookmarks: Vec<Bookmark>, reporter: Arc<dyn Reporter>) -> Result<RunSummary> {
        let total = bookmarks.len();
        tracing::info!(total, workers = self.workers, rate = self.request_rate, "Starting check run");

        // A fresh bucket per run, so every run starts with a full burst
        let limiter = Arc::new(RateLimiter::new(self.request_rate));
        let (jobs_tx, jobs_rx) = mpsc::channel::<Bookmark>(self.workers);
        let jobs_rx = Arc::new(Mutex::new(jobs_rx));
        let tally = Arc::new(Tally::default());

        // Start every worker before the first job goes in
        let handles: Vec<_> = (1..=self.workers)
            .map(|id| {
                let worker = Worker {
                    jobs: Arc::clone(&jobs_rx),
                    limiter: Arc::clone(&limiter),
                    probe: Arc::clone(&self.probe),
                    reporter: Arc::clone(&reporter),
                    tally: Arc::clone(&tally),
                };
                tokio::spawn(worker.run().instrument(tracing::debug_span!("worker", id)))
            })
            .collect();

        // send() waits while the queue is full, which keeps at most
        // `workers` bookmarks buffered at a time
        for bookmark in bookmarks {
            // Sending only fails once every worker is gone
            if jobs_tx.send(bookmark).await.is_err() {
                tracing::error!("All workers stopped before the queue was drained");
                break;
            }
        }
        drop(jobs_tx);
        tracing::debug!("No more check jobs queued");

        // A JoinError here means the worker panicked
        let crashed = join_all(handles)
            .await
            .into_iter()
            .filter(|result| result.is_err())
            .count();

        reporter.on_end()?;

        if crashed > 0 {
            bail!("{} of {} workers crashed during the run", crashed, self.workers);
        }

        let summary = RunSummary {
            total,
            alive: tally.alive.load(Ordering::Relaxed),
            dead: tally.dead.load(Ordering::Relaxed),
        };
        tracing::info!(alive = summary.alive, dead = summary.dead, "Check run finished");
        Ok(summary)
    }
}

// Everything one worker task needs
struct Worker {
    jobs: Arc<Mutex<mpsc::Receiver<Bookmark>>>,
    limiter: Arc<RateLimiter>,
    probe: Arc<LivenessProbe>,
    reporter: Arc<dyn Reporter>,
    tally: Arc<Tally>,
}

impl Worker {
    async fn run(self) {
        // Keep pulling bookmarks until the queue is closed and empty
        while let Some(bookmark) = self.next_job().await {
            // Every worker draws from the same bucket, so this is the global rate
            self.limiter.acquire(1).await;
            tracing::debug!(url = %bookmark.href, "Processing job");

            // HEAD, then GET if needed. Never fails, a dead link is just an outcome
            let outcome = self.probe.probe(&bookmark.href).await;
            if outcome.alive {
                tracing::debug!(url = %bookmark.href, code = outcome.http_code(), "Success");
                self.tally.alive.fetch_add(1, Ordering::Relaxed);
                // The reporter takes ownership, so nothing is cloned
                self.reporter.on_success(bookmark);
            } else {
                tracing::debug!(
                    url = %bookmark.href,
                    code = outcome.http_code(),
                    error = outcome.error.as_deref().unwrap_or(""),
                    "Failure"
                );
                self.tally.dead.fetch_add(1, Ordering::Relaxed);
                self.reporter.on_failure(LookupFailure {
                    bookmark,
                    status: outcome.status,
                    error: outcome.error,
                });
            }
        }

        tracing::debug!("Queue closed, worker exiting");
    }

    // Returns None once the queue is closed and empty
    async fn next_job(&self) -> Option<Bookmark> {
        self.jobs.lock().await.recv().await
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why is the Receiver behind an Arc<Mutex<...>>?
//    - tokio's mpsc channel has exactly one receiver
//    - All workers need to pull from it, so they share it through an Arc
//    - The tokio Mutex lets one worker at a time wait for the next job
//
// 2. What does drop(jobs_tx) do?
//    - It closes the queue: once the last Sender is gone, recv() returns
//      None after the remaining items are taken
//    - That None is how workers know to exit
//
// 3. What is .instrument(span)?
//    - It attaches a tracing span to a future
//    - Every log line the worker writes carries its `id`
//
// 4. Why AtomicUsize for counting?
//    - Many workers increment the counters at the same time
//    - Atomics make each increment safe without a lock
// -----------------------------------------------------------------------------
