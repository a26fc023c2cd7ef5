//! Diagnostics for taxonomy loading.
//!
//! The loader is a best-effort harvester: unusable inputs never abort a run.
//! Conditions worth reporting are collected as [`LoadDiagnostic`]s and
//! tallied in a [`LoadSummary`], while the affected dependency, document, or
//! arc is dropped and traversal continues.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A recoverable condition observed during a load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadDiagnostic {
    /// A reference did not map to an existing file. The dependency (or arc)
    /// is dropped.
    ResolutionMiss {
        /// The reference as it appeared in the document.
        reference: String,
        /// Where resolution pointed; no file exists there.
        resolved: PathBuf,
    },

    /// A document is not well-formed XML. Its declarations and outbound
    /// references are not harvested.
    ParseFailure { path: PathBuf, message: String },
}

impl LoadDiagnostic {
    pub fn resolution_miss(reference: impl Into<String>, resolved: PathBuf) -> Self {
        Self::ResolutionMiss {
            reference: reference.into(),
            resolved,
        }
    }

    pub fn parse_failure(path: PathBuf, message: impl Into<String>) -> Self {
        Self::ParseFailure {
            path,
            message: message.into(),
        }
    }

    pub fn is_resolution_miss(&self) -> bool {
        matches!(self, Self::ResolutionMiss { .. })
    }

    pub fn is_parse_failure(&self) -> bool {
        matches!(self, Self::ParseFailure { .. })
    }
}

impl fmt::Display for LoadDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ResolutionMiss {
                reference,
                resolved,
            } => write!(
                f,
                "Referenced document not found: {reference} (resolved to {})",
                resolved.display()
            ),
            Self::ParseFailure { path, message } => {
                write!(f, "Error parsing {}: {message}", path.display())
            }
        }
    }
}

/// Counters for one load, reported at completion and available to callers
/// that want to gate on partial results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadSummary {
    /// Schemas successfully parsed (each canonical path counted once).
    pub schemas_parsed: usize,
    /// Linkbases successfully parsed (each canonical path counted once).
    pub linkbases_parsed: usize,
    pub parse_failures: usize,
    pub resolution_misses: usize,
}

impl LoadSummary {
    /// Bump the counter matching a diagnostic.
    pub fn record(&mut self, diagnostic: &LoadDiagnostic) {
        match diagnostic {
            LoadDiagnostic::ResolutionMiss { .. } => self.resolution_misses += 1,
            LoadDiagnostic::ParseFailure { .. } => self.parse_failures += 1,
        }
    }
}

impl fmt::Display for LoadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} schemas and {} linkbases parsed, {} parse failures, {} unresolved references",
            self.schemas_parsed, self.linkbases_parsed, self.parse_failures, self.resolution_misses
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_reference() {
        let diagnostic = LoadDiagnostic::resolution_miss(
            "http://example.com/missing.xsd",
            PathBuf::from("/mirror/missing.xsd"),
        );
        let message = diagnostic.to_string();
        assert!(message.contains("http://example.com/missing.xsd"));
        assert!(message.contains("/mirror/missing.xsd"));
    }

    #[test]
    fn test_summary_records_by_kind() {
        let mut summary = LoadSummary::default();
        summary.record(&LoadDiagnostic::resolution_miss("x", PathBuf::from("x")));
        summary.record(&LoadDiagnostic::parse_failure(
            PathBuf::from("bad.xml"),
            "unexpected end of stream",
        ));
        assert_eq!(summary.resolution_misses, 1);
        assert_eq!(summary.parse_failures, 1);
    }
}
