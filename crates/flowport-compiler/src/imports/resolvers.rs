// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Import resolution strategies.
//!
//! A resolver either answers a request, declines it (`Ok(None)`, try the
//! next strategy), or fails. Failures are not retried here.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// Errors from import resolution.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResolveError {
    /// No strategy could provide the import.
    #[error("Import '{path}' not found (tried: {})", .tried.join(", "))]
    NotFound {
        /// The requested import.
        path: String,
        /// Description of each strategy that declined.
        tried: Vec<String>,
    },

    /// Reading a local file failed.
    #[error("Failed to read '{path}': {source}")]
    Io {
        /// The file being read.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Fetching a remote file failed.
    #[error("Failed to fetch '{url}': {reason}")]
    Fetch {
        /// The URL being fetched.
        url: String,
        /// Why the fetch failed.
        reason: String,
    },

    /// The resolved path was already recorded with different content.
    #[error("'{path}' resolved to content that differs from an earlier import")]
    Inconsistent {
        /// Canonical path or URL.
        path: String,
    },
}

/// A successfully resolved import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSource {
    /// Canonical path or URL; the key used in the source map.
    pub canonical: String,
    /// Full text of the file.
    pub content: String,
}

/// One strategy for turning an import string into source text.
pub trait SourceResolver {
    /// Human-readable description, used in "not found" errors.
    fn describe(&self) -> String;

    /// Resolve `path`, or return `Ok(None)` if this strategy does not apply.
    fn resolve(&self, path: &str) -> Result<Option<ResolvedSource>, ResolveError>;
}

impl<T: SourceResolver + ?Sized> SourceResolver for &T {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn resolve(&self, path: &str) -> Result<Option<ResolvedSource>, ResolveError> {
        (**self).resolve(path)
    }
}

fn is_url(path: &str) -> bool {
    path.contains("://")
}

// ============================================================================
// Local directories
// ============================================================================

/// Looks up imports relative to a directory on the local file system.
#[derive(Debug, Clone)]
pub struct LocalDirResolver {
    dir: PathBuf,
}

impl LocalDirResolver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SourceResolver for LocalDirResolver {
    fn describe(&self) -> String {
        format!("directory {}", self.dir.display())
    }

    fn resolve(&self, path: &str) -> Result<Option<ResolvedSource>, ResolveError> {
        if is_url(path) {
            return Ok(None);
        }
        let candidate = self.dir.join(path);
        if !candidate.is_file() {
            return Ok(None);
        }
        let io_err = |source| ResolveError::Io {
            path: candidate.display().to_string(),
            source,
        };
        let canonical = fs::canonicalize(&candidate).map_err(io_err)?;
        let content = fs::read_to_string(&canonical).map_err(io_err)?;
        debug!(path, canonical = %canonical.display(), "Resolved local import");
        Ok(Some(ResolvedSource {
            canonical: canonical.to_string_lossy().into_owned(),
            content,
        }))
    }
}

// ============================================================================
// Network
// ============================================================================

/// Fetches `http://` and `https://` imports.
#[cfg(feature = "network")]
pub struct HttpResolver {
    client: reqwest::blocking::Client,
}

#[cfg(feature = "network")]
impl HttpResolver {
    /// Create a resolver whose fetches give up after `timeout`.
    pub fn new(timeout: std::time::Duration) -> Result<Self, ResolveError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ResolveError::Fetch {
                url: String::new(),
                reason: format!("cannot build HTTP client: {}", e),
            })?;
        Ok(Self { client })
    }
}

#[cfg(feature = "network")]
impl SourceResolver for HttpResolver {
    fn describe(&self) -> String {
        "network fetch".to_string()
    }

    fn resolve(&self, path: &str) -> Result<Option<ResolvedSource>, ResolveError> {
        if !(path.starts_with("http://") || path.starts_with("https://")) {
            return Ok(None);
        }
        let fetch_err = |e: reqwest::Error| ResolveError::Fetch {
            url: path.to_string(),
            reason: e.to_string(),
        };
        let content = self
            .client
            .get(path)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.text())
            .map_err(fetch_err)?;
        debug!(url = path, bytes = content.len(), "Fetched remote import");
        Ok(Some(ResolvedSource {
            canonical: path.to_string(),
            content,
        }))
    }
}

// ============================================================================
// Chain
// ============================================================================

/// Strategies tried in declared order; the first answer wins.
pub struct ResolverChain<'a> {
    resolvers: Vec<Box<dyn SourceResolver + 'a>>,
}

impl<'a> ResolverChain<'a> {
    pub fn new(resolvers: Vec<Box<dyn SourceResolver + 'a>>) -> Self {
        Self { resolvers }
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}

impl SourceResolver for ResolverChain<'_> {
    fn describe(&self) -> String {
        let parts: Vec<String> = self.resolvers.iter().map(|r| r.describe()).collect();
        parts.join(" -> ")
    }

    fn resolve(&self, path: &str) -> Result<Option<ResolvedSource>, ResolveError> {
        for resolver in &self.resolvers {
            if let Some(resolved) = resolver.resolve(path)? {
                return Ok(Some(resolved));
            }
        }
        Err(ResolveError::NotFound {
            path: path.to_string(),
            tried: self.resolvers.iter().map(|r| r.describe()).collect(),
        })
    }
}
