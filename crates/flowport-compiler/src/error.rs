// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for flowport-compiler.
//!
//! Every error is fatal to the operation that raised it: nothing here is
//! degraded into a partial result.

use flowport_ir::{Dialect, IrError};
use thiserror::Error;

use crate::config::ConfigError;
use crate::frontend::Diagnostic;
use crate::imports::ResolveError;

/// Compiler errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The front-end rejected a source file or a generated artifact.
    #[error("{}", format_rejection(.context, .diagnostics, .generated.as_deref()))]
    FrontEndRejection {
        /// What was being analyzed.
        context: String,
        /// Structured errors, verbatim from the front-end.
        diagnostics: Vec<Diagnostic>,
        /// The generated text, when the rejected input was produced here.
        generated: Option<String>,
    },

    /// The same path resolved to different content within one resolution.
    #[error("Import consistency error: '{path}' was imported twice with different content")]
    ImportConsistency {
        /// Canonical path or URL.
        path: String,
    },

    /// No default-value policy exists for the type.
    #[error("Unsupported type: no default value can be synthesized for {0}")]
    UnsupportedType(String),

    /// The document is written in a dialect this compiler does not accept,
    /// or uses a construct the dialect cannot express.
    #[error("Unsupported dialect: {0}")]
    UnsupportedDialect(Dialect),

    /// An invariant of the compiler itself was broken.
    #[error("Internal consistency fault: {0}")]
    InternalConsistencyFault(String),

    /// A workflow or task was required but not found.
    #[error("Missing element: {0}")]
    MissingElement(String),

    /// Two variables of one callable map to the same safe name.
    #[error("Variables '{first}' and '{second}' of '{callable}' both map to '{safe_name}'")]
    SafeNameCollision {
        /// Callable being generated.
        callable: String,
        /// First colliding variable.
        first: String,
        /// Second colliding variable.
        second: String,
        /// The shared safe name.
        safe_name: String,
    },

    /// An import could not be resolved.
    #[error("Resolution error: {0}")]
    Resolve(#[from] ResolveError),

    /// Configuration loading failed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IR construction failed.
    #[error("IR error: {0}")]
    Ir(#[from] IrError),
}

/// Result type using the compiler [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

fn format_rejection(context: &str, diagnostics: &[Diagnostic], generated: Option<&str>) -> String {
    let mut msg = format!("Front-end rejected {}:", context);
    for d in diagnostics {
        msg.push_str("\n  ");
        msg.push_str(&d.to_string());
    }
    if let Some(text) = generated {
        msg.push_str("\n\nGenerated source:\n");
        for (i, line) in text.lines().enumerate() {
            msg.push_str(&format!("{:>4} | {}\n", i + 1, line));
        }
    }
    msg
}
