// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Language dialects understood by the front-end.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A grammar version of the workflow language.
///
/// Dialects are mutually incompatible: a document is written in exactly one
/// of them, announced by its `version` statement (draft-2 has none).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumString,
)]
pub enum Dialect {
    /// The original, unversioned grammar.
    #[strum(serialize = "draft-2")]
    #[serde(rename = "draft-2")]
    Draft2,
    /// Short-lived pre-release of 1.0. Recognized, never compiled.
    #[strum(serialize = "draft-3")]
    #[serde(rename = "draft-3")]
    Draft3,
    /// `version 1.0`
    #[strum(serialize = "1.0")]
    #[serde(rename = "1.0")]
    V1_0,
    /// `version development`
    #[strum(serialize = "development")]
    #[serde(rename = "development")]
    Development,
}

impl Dialect {
    /// Dialects probed, in order, when detecting the dialect of a document.
    pub const PROBE_ORDER: [Dialect; 3] = [Dialect::V1_0, Dialect::Development, Dialect::Draft3];

    /// Dialect assumed when no probe matches.
    pub const OLDEST: Dialect = Dialect::Draft2;

    /// The `version` statement that must open a document in this dialect.
    pub fn version_preamble(&self) -> Option<&'static str> {
        match self {
            Dialect::Draft2 => None,
            Dialect::Draft3 => Some("version draft-3"),
            Dialect::V1_0 => Some("version 1.0"),
            Dialect::Development => Some("version development"),
        }
    }

    /// Whether task and workflow inputs live in a dedicated `input {}` section.
    ///
    /// Draft-2 declares inputs directly in the body.
    pub fn has_input_section(&self) -> bool {
        !matches!(self, Dialect::Draft2)
    }

    /// Whether `struct` declarations are part of the grammar.
    pub fn supports_structs(&self) -> bool {
        !matches!(self, Dialect::Draft2)
    }

    /// Whether this compiler accepts documents in this dialect.
    pub fn is_supported(&self) -> bool {
        !matches!(self, Dialect::Draft3)
    }
}
