//! Row tokenizer for broker export files.
//!
//! Splits raw delimited text into rows of trimmed string fields. Quoted spans
//! may contain the delimiter. The tokenizer never fails: records the reader
//! cannot make sense of are dropped with a warning and the normalizers decide
//! what a usable row looks like.

use csv::{ReaderBuilder, Terminator};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::constants::{CANDIDATE_DELIMITERS, DELIMITER_SNIFF_LINES};

/// Configuration for tokenizing an import payload.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImportConfig {
    /// Delimiter character: ",", ";", "\t", or "auto" (default: "auto")
    pub delimiter: Option<String>,
    /// Quote character (default: "\"")
    pub quote_char: Option<String>,
    /// Whether to drop rows whose fields are all empty (default: true)
    pub skip_empty_rows: Option<bool>,
}

impl ImportConfig {
    /// Returns the configured delimiter, defaulting to "auto"
    pub fn effective_delimiter(&self) -> &str {
        self.delimiter.as_deref().unwrap_or("auto")
    }

    /// Returns whether to skip empty rows
    pub fn skip_empty(&self) -> bool {
        self.skip_empty_rows.unwrap_or(true)
    }

    /// Returns the quote character as a byte
    pub fn quote_byte(&self) -> u8 {
        self.quote_char
            .as_ref()
            .and_then(|s| s.chars().next())
            .filter(|c| c.is_ascii())
            .map(|c| c as u8)
            .unwrap_or(b'"')
    }
}

/// Splits `content` into rows of trimmed fields.
///
/// Empty input produces zero rows. A UTF-8 BOM is ignored.
pub fn tokenize(content: &str, config: &ImportConfig) -> Vec<Vec<String>> {
    let content = content.trim_start_matches('\u{feff}');
    if content.trim().is_empty() {
        return Vec::new();
    }

    let delimiter = resolve_delimiter(content, config);
    debug!("Tokenizing import payload with delimiter {:?}", delimiter);

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .quote(config.quote_byte())
        .double_quote(false)
        .has_headers(false)
        .flexible(true)
        .terminator(Terminator::CRLF)
        .from_reader(content.as_bytes());

    let skip_empty = config.skip_empty();
    let mut rows = Vec::new();
    for (idx, result) in reader.byte_records().enumerate() {
        match result {
            Ok(record) => {
                let row: Vec<String> = record
                    .iter()
                    .map(|field| String::from_utf8_lossy(field).trim().to_string())
                    .collect();
                if skip_empty && row.iter().all(|cell| cell.is_empty()) {
                    continue;
                }
                rows.push(row);
            }
            Err(e) => {
                warn!("Dropping unreadable record {}: {}", idx + 1, e);
            }
        }
    }

    rows
}

/// Resolves the delimiter byte, auto-detecting when configured as "auto".
fn resolve_delimiter(content: &str, config: &ImportConfig) -> u8 {
    match config.effective_delimiter() {
        "auto" => detect_delimiter(content),
        "\\t" | "\t" => b'\t',
        other => other
            .chars()
            .next()
            .filter(|c| c.is_ascii())
            .map(|c| c as u8)
            .unwrap_or(b','),
    }
}

/// Picks the candidate delimiter with the most consistent column counts.
fn detect_delimiter(content: &str) -> u8 {
    let mut best = ',';
    let mut best_score = 0usize;

    for candidate in CANDIDATE_DELIMITERS {
        let score = score_delimiter(content, candidate);
        if score > best_score {
            best_score = score;
            best = candidate;
        }
    }

    best as u8
}

/// Scores a delimiter by its count on the first line that contains it, times
/// the number of sniffed lines sharing that count. Section marker lines with a
/// single cell do not reset the reference.
fn score_delimiter(content: &str, delimiter: char) -> usize {
    let counts: Vec<usize> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .take(DELIMITER_SNIFF_LINES)
        .map(|line| line.matches(delimiter).count())
        .collect();

    let Some(reference) = counts.iter().copied().find(|&c| c > 0) else {
        return 0;
    };

    let consistent = counts.iter().filter(|&&c| c == reference).count();
    reference * consistent
}
