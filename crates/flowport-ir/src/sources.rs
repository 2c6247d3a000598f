// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Source text collections and generated artifacts.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{IrError, Result};

// ============================================================================
// Source map
// ============================================================================

/// Canonical path or URL → source text, for every file of one compilation.
///
/// A path is bound at most once; rebinding to different text is an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceMap {
    files: BTreeMap<String, String>,
}

impl SourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `content` under `path`.
    ///
    /// Returns `Ok(true)` if the path is new and `Ok(false)` if the same
    /// content was already recorded.
    pub fn record(&mut self, path: &str, content: &str) -> Result<bool> {
        match self.files.get(path) {
            Some(existing) if existing == content => Ok(false),
            Some(_) => Err(IrError::SourceConflict {
                path: path.to_string(),
            }),
            None => {
                self.files.insert(path.to_string(), content.to_string());
                Ok(true)
            }
        }
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Paths in sorted order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

// ============================================================================
// Adjuncts
// ============================================================================

/// The kind of side file carried next to a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AdjunctKind {
    /// `readme.<name>.md`
    Readme,
    /// `developer_notes.<name>.md`
    DeveloperNotes,
}

/// A side file. Carried through for packaging, never analyzed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjunctFile {
    pub kind: AdjunctKind,
    pub path: String,
    pub content: String,
}

/// Component name → side files documenting it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdjunctMap {
    entries: BTreeMap<String, Vec<AdjunctFile>>,
}

impl AdjunctMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a side file for `component`, ignoring a path already present.
    pub fn add(&mut self, component: impl Into<String>, file: AdjunctFile) {
        let files = self.entries.entry(component.into()).or_default();
        if !files.iter().any(|f| f.path == file.path) {
            files.push(file);
        }
    }

    /// Merge another map into this one.
    pub fn merge(&mut self, other: AdjunctMap) {
        for (component, files) in other.entries {
            for file in files {
                self.add(component.clone(), file);
            }
        }
    }

    pub fn get(&self, component: &str) -> &[AdjunctFile] {
        self.entries.get(component).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[AdjunctFile])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Generated text
// ============================================================================

/// Source text produced by the compiler. Identity is the content alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeneratedText(String);

impl GeneratedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Hex SHA-256 of the text; identical text always yields the same key.
    pub fn checksum(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        digest.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl fmt::Display for GeneratedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for GeneratedText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_same_content_twice() {
        let mut map = SourceMap::new();
        assert_eq!(map.record("/a.wdl", "task a {}"), Ok(true));
        assert_eq!(map.record("/a.wdl", "task a {}"), Ok(false));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_record_conflict() {
        let mut map = SourceMap::new();
        map.record("/a.wdl", "one").unwrap();
        let err = map.record("/a.wdl", "two").unwrap_err();
        assert_eq!(
            err,
            IrError::SourceConflict {
                path: "/a.wdl".to_string()
            }
        );
        assert_eq!(map.get("/a.wdl"), Some("one"));
    }

    #[test]
    fn test_adjunct_merge_deduplicates_by_path() {
        let readme = AdjunctFile {
            kind: AdjunctKind::Readme,
            path: "/w/readme.align.md".to_string(),
            content: "# align".to_string(),
        };
        let mut a = AdjunctMap::new();
        a.add("align", readme.clone());
        let mut b = AdjunctMap::new();
        b.add("align", readme);
        a.merge(b);
        assert_eq!(a.get("align").len(), 1);
        assert!(a.get("other").is_empty());
    }

    #[test]
    fn test_generated_text_identity_is_content() {
        let a = GeneratedText::new("version 1.0\n");
        let b = GeneratedText::new(String::from("version 1.0\n"));
        assert_eq!(a, b);
        assert_eq!(a.checksum(), b.checksum());
        assert_eq!(a.checksum().len(), 64);
        assert_ne!(a.checksum(), GeneratedText::new("version 1.1\n").checksum());
    }
}
