// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Every flag can also come from an environment variable with the
// BOOKMARK_CHECKER_ prefix, e.g. BOOKMARK_CHECKER_WORKERS=20. A flag given on
// the command line wins over the environment.
// =============================================================================

use bookmark_checker::bookmarks::InputFormat;
use bookmark_checker::report::OutputFormat;
use clap::{Args, Parser, Subcommand};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "bookmark-checker",
    version,
    about = "Find bookmarks whose links are no longer reachable",
    long_about = "bookmark-checker reads a list of bookmarks and checks every link with a \
                  HEAD request (falling back to GET), using a fixed number of workers and \
                  a global limit on requests per second."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check which bookmarks are still alive
    ///
    /// Example: bookmark-checker check -i bookmarks.json --output-format json > dead.json
    Check(CheckArgs),
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// File containing the bookmarks to check, '-' reads stdin
    #[arg(short = 'i', long, env = "BOOKMARK_CHECKER_INPUT_FILE", default_value = "-")]
    pub input_file: String,

    /// Format of the input file
    #[arg(long, value_enum, env = "BOOKMARK_CHECKER_INPUT_FORMAT", default_value_t = InputFormat::Json)]
    pub input_format: InputFormat,

    /// Where the report is written, '-' means stdout
    #[arg(short = 'o', long, env = "BOOKMARK_CHECKER_OUTPUT_FILE", default_value = "-")]
    pub output_file: String,

    /// Format of the report
    #[arg(long, value_enum, env = "BOOKMARK_CHECKER_OUTPUT_FORMAT", default_value_t = OutputFormat::Txt)]
    pub output_format: OutputFormat,

    /// Also report links that are alive
    #[arg(short, long, env = "BOOKMARK_CHECKER_VERBOSE")]
    pub verbose: bool,

    /// Never color the [OK]/[ERR] tags
    #[arg(long, env = "BOOKMARK_CHECKER_NO_COLOR")]
    pub no_color: bool,

    /// Timeout for each HTTP request, e.g. "10s" or "1m 30s"
    #[arg(long, env = "BOOKMARK_CHECKER_TIMEOUT", default_value = "10s", value_parser = humantime::parse_duration)]
    pub timeout: Duration,

    /// Maximum number of requests started per second, across all workers
    #[arg(long, env = "BOOKMARK_CHECKER_REQUEST_RATE", default_value_t = 10.0)]
    pub request_rate: f64,

    /// Number of concurrent workers
    #[arg(long, env = "BOOKMARK_CHECKER_WORKERS", default_value_t = 10)]
    pub workers: usize,

    /// Do not verify TLS certificates
    #[arg(long, env = "BOOKMARK_CHECKER_SKIP_VERIFY")]
    pub skip_verify: bool,

    /// How many redirects to follow per request, 0 disables following
    #[arg(long, env = "BOOKMARK_CHECKER_MAX_REDIRECTS", default_value_t = 10)]
    pub max_redirects: usize,

    /// Log every job to stderr
    #[arg(long, env = "BOOKMARK_CHECKER_DEBUG")]
    pub debug: bool,
}
