// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging
// 3. Read the bookmarks, build the reporter and the checker
// 4. Run the check
// 5. Exit with proper code (0 = all alive, 1 = dead links found, 2 = error)
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use bookmark_checker::bookmarks::read_bookmarks;
use bookmark_checker::checker::{Checker, CheckerConfig, HttpConfig};
use bookmark_checker::logging;
use bookmark_checker::report::{JsonReporter, OutputFormat, Reporter, StreamingReporter};
use clap::Parser;
use cli::{CheckArgs, Cli, Commands};
use std::fs::File;
use std::io::{self, BufWriter, IsTerminal, Write};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = every bookmark is alive
//   Ok(1) = at least one dead bookmark
//   Err   = bad configuration, unreadable input or unwritable output
async fn run() -> Result<i32> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check(args) => handle_check(args).await,
    }
}

// Handles the 'check' subcommand
async fn handle_check(args: CheckArgs) -> Result<i32> {
    logging::init(args.debug);

    // Validate everything before reading any input
    let checker = Checker::new(CheckerConfig {
        request_rate: args.request_rate,
        workers: args.workers,
        http: HttpConfig {
            timeout: args.timeout,
            skip_verify: args.skip_verify,
            max_redirects: args.max_redirects,
        },
    })?;

    let bookmarks = read_bookmarks(&args.input_file, args.input_format)?;
    tracing::info!(count = bookmarks.len(), source = %args.input_file, "Loaded bookmarks");

    let reporter = make_reporter(&args)?;
    let summary = checker.run(bookmarks, reporter).await?;

    if args.verbose {
        eprintln!(
            "📊 Checked {} bookmark(s): {} alive, {} dead",
            summary.total, summary.alive, summary.dead
        );
    }

    if summary.dead > 0 {
        Ok(1)
    } else {
        Ok(0)
    }
}

// Builds the reporter for the chosen output format
fn make_reporter(args: &CheckArgs) -> Result<Arc<dyn Reporter>> {
    let to_stdout = args.output_file == "-";
    let output = open_output(&args.output_file)?;

    let reporter: Arc<dyn Reporter> = match args.output_format {
        OutputFormat::Txt => {
            // Only color a terminal, never a file or a pipe
            let colorize = !args.no_color && to_stdout && io::stdout().is_terminal();
            Arc::new(StreamingReporter::new(args.verbose, colorize, vec![output]))
        }
        OutputFormat::Json => Arc::new(JsonReporter::new(args.verbose, vec![output])),
    };

    Ok(reporter)
}

fn open_output(path: &str) -> Result<Box<dyn Write + Send>> {
    if path == "-" {
        return Ok(Box::new(io::stdout()));
    }

    let file = File::create(path).with_context(|| format!("Could not create output file '{}'", path))?;
    Ok(Box::new(BufWriter::new(file)))
}
