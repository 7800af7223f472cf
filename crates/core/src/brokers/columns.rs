//! Header resolution shared by all normalizers.
//!
//! Brokers rename and reorder columns between export versions, so each logical
//! column is described by a list of lowercase synonyms. An exact header match
//! on any synonym wins; otherwise the first header containing a synonym (in
//! synonym order) is taken.

use super::Broker;
use crate::errors::{ImportError, Result};

/// A logical column and the header spellings that identify it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ColumnSpec {
    pub name: &'static str,
    pub synonyms: &'static [&'static str],
    /// Headers containing any of these terms never match.
    pub exclude: &'static [&'static str],
}

impl ColumnSpec {
    pub const fn new(name: &'static str, synonyms: &'static [&'static str]) -> Self {
        Self {
            name,
            synonyms,
            exclude: &[],
        }
    }

    pub const fn excluding(mut self, exclude: &'static [&'static str]) -> Self {
        self.exclude = exclude;
        self
    }
}

/// Lowercased header row with lookup helpers.
#[derive(Debug, Clone)]
pub(crate) struct HeaderIndex {
    headers: Vec<String>,
}

impl HeaderIndex {
    pub fn new(header_row: &[String]) -> Self {
        Self {
            headers: header_row
                .iter()
                .map(|h| h.trim().to_lowercase())
                .collect(),
        }
    }

    /// Locates an optional column.
    pub fn find(&self, spec: &ColumnSpec) -> Option<usize> {
        let allowed = |header: &str| !spec.exclude.iter().any(|term| header.contains(term));

        for synonym in spec.synonyms {
            if let Some(idx) = self
                .headers
                .iter()
                .position(|h| h == synonym && allowed(h))
            {
                return Some(idx);
            }
        }

        for synonym in spec.synonyms {
            if let Some(idx) = self
                .headers
                .iter()
                .position(|h| h.contains(synonym) && allowed(h))
            {
                return Some(idx);
            }
        }

        None
    }

    /// Locates a required column or fails naming the broker and column.
    pub fn require(&self, broker: Broker, spec: &ColumnSpec) -> Result<usize> {
        self.find(spec).ok_or_else(|| {
            ImportError::MissingColumn {
                broker,
                column: spec.name.to_string(),
            }
            .into()
        })
    }
}

/// Returns the trimmed cell at `idx`, or "" when the row is too short.
pub(crate) fn cell(row: &[String], idx: usize) -> &str {
    row.get(idx).map(|s| s.trim()).unwrap_or("")
}

/// Returns the cell for an optional column, treating blanks as absent.
pub(crate) fn optional_cell(row: &[String], idx: Option<usize>) -> Option<&str> {
    idx.map(|i| cell(row, i)).filter(|s| !s.is_empty())
}
