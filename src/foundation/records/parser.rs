//! Turns line-delimited JSON into validated playlist records.
//!
//! A bad line never aborts a run: it is logged, counted and skipped. The only failure
//! is an input that yields no valid record at all.

use crate::foundation::error::{ParseIssue, ParseIssueKind, PipelineError};
use crate::foundation::records::models::RawPlaylistRecord;
use crate::foundation::records::PlaylistRecord;
use std::io::BufRead;

/// Result of parsing an input stream.
#[derive(Debug, Default)]
pub struct ParsedRecords {
    pub records: Vec<PlaylistRecord>,
    pub issues: Vec<ParseIssue>,
}

/// Parses every line readable from `reader`.
///
/// Read failures are fatal; decode failures are not.
///
/// # Example
///
/// ```
/// use radiolist::parse_records;
///
/// let input = r#"{"station":"KALX","name":"Morning Show","url":"https://example.com/1"}"#;
/// let parsed = parse_records(input.as_bytes()).unwrap();
/// assert_eq!(parsed.records.len(), 1);
/// ```
pub fn parse_records<R: BufRead>(reader: R) -> Result<ParsedRecords, PipelineError> {
    let mut parsed = ParsedRecords::default();

    for (index, bytes) in reader.split(b'\n').enumerate() {
        let line_number = index + 1;
        let line = match String::from_utf8(bytes?) {
            Ok(line) => line,
            Err(_) => {
                let issue = ParseIssue {
                    line: line_number,
                    kind: ParseIssueKind::Malformed("invalid UTF-8".to_string()),
                };
                log::warn!("Skipping {}", issue);
                parsed.issues.push(issue);
                continue;
            }
        };
        match parse_line(&line, line_number) {
            Ok(Some(record)) => parsed.records.push(record),
            Ok(None) => {}
            Err(issue) => {
                log::warn!("Skipping {}", issue);
                parsed.issues.push(issue);
            }
        }
    }

    if parsed.records.is_empty() {
        return Err(PipelineError::EmptyInput(format!(
            "no valid playlist records in input ({} lines skipped)",
            parsed.issues.len()
        )));
    }

    log::info!(
        "Parsed {} playlist records ({} skipped)",
        parsed.records.len(),
        parsed.issues.len()
    );
    Ok(parsed)
}

/// Validates a single line. Blank lines yield `Ok(None)`.
pub fn parse_line(line: &str, line_number: usize) -> Result<Option<PlaylistRecord>, ParseIssue> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let issue = |kind| ParseIssue {
        line: line_number,
        kind,
    };

    let raw: RawPlaylistRecord = serde_json::from_str(trimmed)
        .map_err(|e| issue(ParseIssueKind::Malformed(e.to_string())))?;

    let station = raw
        .station
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| issue(ParseIssueKind::MissingField("station")))?;
    let name = raw
        .name
        .ok_or_else(|| issue(ParseIssueKind::MissingField("name")))?;
    let url = raw
        .url
        .ok_or_else(|| issue(ParseIssueKind::MissingField("url")))?;

    Ok(Some(PlaylistRecord {
        station,
        name,
        url,
        track_count: raw.track_count.unwrap_or(0),
        last_updated: raw.last_updated.unwrap_or_default(),
        preview: raw.preview.unwrap_or_default(),
    }))
}
