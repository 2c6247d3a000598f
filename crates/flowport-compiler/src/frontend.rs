// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Boundary to the external front-end (parser and type checker).
//!
//! Full grammar parsing and semantic analysis are not done in this crate.
//! The compiler drives a [`FrontEnd`] implementation both to analyze user
//! sources and to check that every generated artifact is accepted.

use flowport_ir::{Bundle, Dialect};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::imports::SourceResolver;

/// One structured error reported by the front-end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
        }
    }

    pub fn at(line: usize, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: Some(line),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {}: {}", line, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Parser and type checker for the workflow language.
pub trait FrontEnd {
    /// Analyze a document, resolving its imports through `resolver`.
    fn analyze(
        &self,
        source: &str,
        resolver: &dyn SourceResolver,
        dialect: Dialect,
    ) -> Result<Bundle, Vec<Diagnostic>>;

    /// Cheap check whether `source` is written in `dialect`.
    fn looks_parsable(&self, source: &str, dialect: Dialect) -> bool;
}

/// Detect the dialect of a document.
///
/// Probes [`Dialect::PROBE_ORDER`] in order and falls back to
/// [`Dialect::OLDEST`] when none matches.
pub fn detect_dialect(front_end: &dyn FrontEnd, source: &str) -> Dialect {
    let dialect = Dialect::PROBE_ORDER
        .into_iter()
        .find(|d| front_end.looks_parsable(source, *d))
        .unwrap_or(Dialect::OLDEST);
    debug!(%dialect, "Detected dialect");
    dialect
}


#[cfg(test)]
mod tests {
    use super::testing::LineFrontEnd;
    use super::*;

    #[test]
    fn test_detect_dialect_probes_in_order() {
        let fe = LineFrontEnd::default();
        assert_eq!(detect_dialect(&fe, "version 1.0\ntask a {\n}\n"), Dialect::V1_0);
        assert_eq!(
            detect_dialect(&fe, "# comment\nversion development\n"),
            Dialect::Development
        );
        assert_eq!(detect_dialect(&fe, "version draft-3\n"), Dialect::Draft3);
    }

    #[test]
    fn test_detect_dialect_falls_back_to_oldest() {
        let fe = LineFrontEnd::default();
        assert_eq!(detect_dialect(&fe, "task a {\n}\n"), Dialect::Draft2);
    }

    #[test]
    fn test_diagnostic_display() {
        assert_eq!(Diagnostic::at(3, "boom").to_string(), "line 3: boom");
        assert_eq!(Diagnostic::new("boom").to_string(), "boom");
    }
}
