// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error types for IR construction.

use thiserror::Error;

/// Errors raised while constructing or extending IR entities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum IrError {
    /// A callable or variable was given an empty name.
    #[error("empty {0} name")]
    EmptyName(&'static str),

    /// Two variables in the same input or output set share a name.
    #[error("duplicate {section} variable '{name}' in callable '{callable}'")]
    DuplicateVariable {
        /// Callable being constructed.
        callable: String,
        /// `input` or `output`.
        section: &'static str,
        /// The repeated name.
        name: String,
    },

    /// A source path was recorded twice with different content.
    #[error("source '{path}' was already recorded with different content")]
    SourceConflict {
        /// Canonical path or URL of the source.
        path: String,
    },
}

/// Result type using [`IrError`].
pub type Result<T> = std::result::Result<T, IrError>;
