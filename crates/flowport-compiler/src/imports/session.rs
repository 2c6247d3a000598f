// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Per-run resolution state and the adapters that fill it.

use flowport_ir::{AdjunctMap, IrError, SourceMap};
use std::cell::RefCell;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::adjuncts::AdjunctFinder;
use super::resolvers::{ResolveError, ResolvedSource, SourceResolver};

/// Everything one resolution run has recorded.
///
/// Owned by a single run; a new run starts from an empty session.
#[derive(Debug, Default)]
pub struct ResolutionSession {
    pub(crate) sources: SourceMap,
    pub(crate) adjuncts: AdjunctMap,
    /// Import request → resolved file.
    cache: BTreeMap<String, ResolvedSource>,
    /// First path found rebound to different content.
    conflict: Option<String>,
}

impl ResolutionSession {
    pub fn sources(&self) -> &SourceMap {
        &self.sources
    }

    pub fn adjuncts(&self) -> &AdjunctMap {
        &self.adjuncts
    }

    /// Path of the first inconsistent re-import, if any.
    pub fn conflict(&self) -> Option<&str> {
        self.conflict.as_deref()
    }

    pub fn into_parts(self) -> (SourceMap, AdjunctMap) {
        (self.sources, self.adjuncts)
    }
}

/// Wraps a resolver so that every file it resolves is recorded in the
/// session, together with the side files found next to it.
pub struct Recorder<'s, R> {
    inner: R,
    session: &'s RefCell<ResolutionSession>,
    finder: &'s dyn AdjunctFinder,
}

impl<'s, R: SourceResolver> Recorder<'s, R> {
    pub fn new(
        inner: R,
        session: &'s RefCell<ResolutionSession>,
        finder: &'s dyn AdjunctFinder,
    ) -> Self {
        Self {
            inner,
            session,
            finder,
        }
    }
}

impl<R: SourceResolver> SourceResolver for Recorder<'_, R> {
    fn describe(&self) -> String {
        self.inner.describe()
    }

    fn resolve(&self, path: &str) -> Result<Option<ResolvedSource>, ResolveError> {
        let Some(resolved) = self.inner.resolve(path)? else {
            return Ok(None);
        };

        let recorded = self
            .session
            .borrow_mut()
            .sources
            .record(&resolved.canonical, &resolved.content);
        match recorded {
            Ok(true) => {
                debug!(canonical = %resolved.canonical, "Recorded source");
                let found = self.finder.find_adjuncts(&resolved.canonical)?;
                self.session.borrow_mut().adjuncts.merge(found);
            }
            Ok(false) => {}
            Err(e) => {
                let path = match e {
                    IrError::SourceConflict { path } => path,
                    _ => resolved.canonical.clone(),
                };
                warn!(path = %path, "Import resolved to conflicting content");
                self.session
                    .borrow_mut()
                    .conflict
                    .get_or_insert_with(|| path.clone());
                return Err(ResolveError::Inconsistent { path });
            }
        }
        Ok(Some(resolved))
    }
}

/// The resolver handed to the front-end: answers repeated requests from
/// the session cache so each file's resolvers run once per session.
pub struct SessionResolver<'s, R> {
    inner: R,
    session: &'s RefCell<ResolutionSession>,
}

impl<'s, R: SourceResolver> SessionResolver<'s, R> {
    pub fn new(inner: R, session: &'s RefCell<ResolutionSession>) -> Self {
        Self { inner, session }
    }
}

impl<R: SourceResolver> SourceResolver for SessionResolver<'_, R> {
    fn describe(&self) -> String {
        self.inner.describe()
    }

    fn resolve(&self, path: &str) -> Result<Option<ResolvedSource>, ResolveError> {
        if let Some(hit) = self.session.borrow().cache.get(path) {
            return Ok(Some(hit.clone()));
        }
        let resolved = self.inner.resolve(path)?;
        if let Some(resolved) = &resolved {
            self.session
                .borrow_mut()
                .cache
                .insert(path.to_string(), resolved.clone());
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imports::{DirectoryAdjunctFinder, LocalDirResolver};
    use std::fs;

    #[test]
    fn test_identical_reimport_is_recorded_once() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("lib.wdl"), "task t {\n}\n").unwrap();
        fs::write(dir.path().join("readme.t.md"), "About t").unwrap();

        let session = RefCell::new(ResolutionSession::default());
        let finder = DirectoryAdjunctFinder;
        let recorder = Recorder::new(LocalDirResolver::new(dir.path()), &session, &finder);

        recorder.resolve("lib.wdl").unwrap().unwrap();
        recorder.resolve("./lib.wdl").unwrap().unwrap();

        let session = session.into_inner();
        assert_eq!(session.sources().len(), 1);
        assert_eq!(session.adjuncts().get("t").len(), 1);
        assert!(session.conflict().is_none());
    }

    #[test]
    fn test_changed_content_poisons_session() {
        let dir = tempfile::tempdir().unwrap();
        let lib = dir.path().join("lib.wdl");
        fs::write(&lib, "task t {\n}\n").unwrap();

        let session = RefCell::new(ResolutionSession::default());
        let finder = DirectoryAdjunctFinder;
        let recorder = Recorder::new(LocalDirResolver::new(dir.path()), &session, &finder);
        recorder.resolve("lib.wdl").unwrap();

        fs::write(&lib, "task u {\n}\n").unwrap();
        let err = recorder.resolve("lib.wdl").unwrap_err();
        assert!(matches!(err, ResolveError::Inconsistent { .. }));
        assert!(session.borrow().conflict().unwrap().ends_with("lib.wdl"));
    }

    #[test]
    fn test_session_resolver_answers_repeats_from_cache() {
        let dir = tempfile::tempdir().unwrap();
        let lib = dir.path().join("lib.wdl");
        fs::write(&lib, "task t {\n}\n").unwrap();

        let session = RefCell::new(ResolutionSession::default());
        let resolver = SessionResolver::new(LocalDirResolver::new(dir.path()), &session);
        let first = resolver.resolve("lib.wdl").unwrap().unwrap();

        // A second lookup must not touch the file system again.
        fs::remove_file(&lib).unwrap();
        let second = resolver.resolve("lib.wdl").unwrap().unwrap();
        assert_eq!(first, second);
    }
}
