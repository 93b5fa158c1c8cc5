// src/bookmarks/source.rs
// =============================================================================
// This module reads a list of bookmarks from a file or from stdin.
//
// Supported formats:
// - json: The bookmark export format (a JSON array of bookmark objects)
// - txt:  One URL per line, blank lines are skipped
//
// The order of the returned bookmarks matches the order in the input, which
// is also the order they are handed to the checker.
// =============================================================================

use super::Bookmark;
use anyhow::{Context, Result};
use clap::ValueEnum;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};

/// Which format the bookmark list is written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// JSON array of bookmark objects
    Json,
    /// Plain text, one URL per line
    Txt,
}

// Parses a JSON array of bookmarks
//
// Malformed input is an error, never an empty list.
pub fn parse_json<R: Read>(input: R) -> Result<Vec<Bookmark>> {
    let bookmarks = serde_json::from_reader(input).context("Invalid bookmark JSON")?;
    Ok(bookmarks)
}

// Parses a newline-delimited list of URLs
//
// Every non-blank line becomes one bookmark with only `href` set.
pub fn parse_text<R: BufRead>(input: R) -> Result<Vec<Bookmark>> {
    let mut bookmarks = Vec::new();

    for line in input.lines() {
        let line = line.context("Failed to read line of text input")?;
        let url = line.trim();
        if !url.is_empty() {
            bookmarks.push(Bookmark::from_href(url));
        }
    }

    Ok(bookmarks)
}

// Reads bookmarks from a path, or from stdin when the path is "-"
pub fn read_bookmarks(path: &str, format: InputFormat) -> Result<Vec<Bookmark>> {
    let reader: Box<dyn BufRead> = if path == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = File::open(path)
            .with_context(|| format!("Could not open bookmark file '{}'", path))?;
        Box::new(BufReader::new(file))
    };

    match format {
        InputFormat::Json => parse_json(reader),
        InputFormat::Txt => parse_text(reader),
    }
    .with_context(|| format!("Could not read bookmarks from '{}'", path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const FIXTURE: &str = include_str!("../../testdata/bookmarks.json");

    #[test]
    fn test_parse_json_fixture() {
        let bookmarks = parse_json(FIXTURE.as_bytes()).unwrap();
        assert_eq!(bookmarks.len(), 2);

        let first = &bookmarks[0];
        assert_eq!(first.href, "https://www.rust-lang.org/");
        assert_eq!(first.tags.len(), 4);
        assert!(first.shared);
        assert!(!first.to_read);
        assert!(first.time.is_some());
        assert!(first.failure_info.is_none());

        assert!(bookmarks[1].to_read);
    }

    #[test]
    fn test_json_round_trip_keeps_every_field() {
        let bookmarks = parse_json(FIXTURE.as_bytes()).unwrap();
        let written = serde_json::to_vec(&bookmarks).unwrap();
        let reread = parse_json(written.as_slice()).unwrap();
        assert_eq!(bookmarks, reread);
    }

    #[test]
    fn test_parse_json_rejects_garbage() {
        assert!(parse_json("[{\"href\": ".as_bytes()).is_err());
        assert!(parse_json("{\"href\": \"https://example.com\"}".as_bytes()).is_err());
    }

    #[test]
    fn test_parse_text_skips_blank_lines() {
        let input = Cursor::new(
            "\n    https://example.com/a\n\n\t https://example.com/b  \n   \n",
        );
        let bookmarks = parse_text(input).unwrap();

        let hrefs: Vec<_> = bookmarks.iter().map(|b| b.href.as_str()).collect();
        assert_eq!(hrefs, vec!["https://example.com/a", "https://example.com/b"]);
        assert!(bookmarks[0].description.is_empty());
        assert!(bookmarks[0].tags.is_empty());
    }

    #[test]
    fn test_read_bookmarks_missing_file() {
        let result = read_bookmarks("/definitely/not/here.json", InputFormat::Json);
        assert!(result.is_err());
    }
}
