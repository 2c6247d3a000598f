// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Import resolution and caching.
//!
//! [`ImportEngine::resolve`] produces the transitive source closure of a
//! primary file by driving the front-end:
//!
//! 1. Resolver chain: the primary file's directory, then the auxiliary
//!    directories, then the network resolver (if enabled).
//! 2. Every resolver is wrapped in a [`Recorder`] that fills a fresh
//!    [`ResolutionSession`] with sources and side files.
//! 3. The dialect is detected once, from the primary file.
//! 4. The primary file is analyzed.
//! 5. Newly recorded files are analyzed until a pass finds nothing new.
//! 6. Unsupported dialects are rejected after resolution.

mod adjuncts;
mod resolvers;
mod session;

pub use adjuncts::{AdjunctFinder, DirectoryAdjunctFinder};
#[cfg(feature = "network")]
pub use resolvers::HttpResolver;
pub use resolvers::{LocalDirResolver, ResolveError, ResolvedSource, ResolverChain, SourceResolver};
pub use session::{Recorder, ResolutionSession, SessionResolver};

use flowport_ir::{AdjunctMap, Bundle, Dialect, SourceMap, unresolved_fragment_targets};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::ImportConfig;
use crate::error::{Error, Result};
use crate::frontend::{FrontEnd, detect_dialect};

/// Output of one resolution run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub dialect: Dialect,
    /// Canonical path of the primary file.
    pub primary_path: String,
    pub bundle: Bundle,
    /// Every file read, the primary included.
    pub sources: SourceMap,
    pub adjuncts: AdjunctMap,
    /// One bundle per imported file, in analysis order.
    pub sub_bundles: Vec<(String, Bundle)>,
}

impl Resolution {
    /// Fail if a workflow fragment calls something no bundle defines.
    pub fn check_fragment_targets(&self) -> Result<()> {
        let bundles: Vec<&Bundle> = std::iter::once(&self.bundle)
            .chain(self.sub_bundles.iter().map(|(_, b)| b))
            .collect();
        match unresolved_fragment_targets(&bundles).into_iter().next() {
            None => Ok(()),
            Some((fragment, target)) => Err(Error::MissingElement(format!(
                "fragment '{}' calls '{}', which no analyzed file defines",
                fragment, target
            ))),
        }
    }
}

/// Drives the front-end over a primary file and everything it imports.
pub struct ImportEngine<'a> {
    front_end: &'a dyn FrontEnd,
    finder: Box<dyn AdjunctFinder + 'a>,
    import_dirs: Vec<PathBuf>,
    network: Option<Box<dyn SourceResolver + 'a>>,
}

impl<'a> ImportEngine<'a> {
    /// Engine with local lookups only and directory side-file discovery.
    pub fn new(front_end: &'a dyn FrontEnd) -> Self {
        Self {
            front_end,
            finder: Box::new(DirectoryAdjunctFinder),
            import_dirs: Vec::new(),
            network: None,
        }
    }

    /// Build an engine from [`ImportConfig`].
    pub fn from_config(front_end: &'a dyn FrontEnd, config: &ImportConfig) -> Result<Self> {
        let engine = Self::new(front_end).with_import_dirs(config.import_dirs.clone());

        #[cfg(feature = "network")]
        if config.network_imports {
            let http = HttpResolver::new(config.fetch_timeout)?;
            return Ok(engine.with_network(http));
        }

        Ok(engine)
    }

    /// Directories searched after the primary file's directory.
    pub fn with_import_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.import_dirs = dirs;
        self
    }

    /// Resolver tried last, for remote imports.
    pub fn with_network(mut self, resolver: impl SourceResolver + 'a) -> Self {
        self.network = Some(Box::new(resolver));
        self
    }

    pub fn with_adjunct_finder(mut self, finder: impl AdjunctFinder + 'a) -> Self {
        self.finder = Box::new(finder);
        self
    }

    /// Resolve `primary` and its transitive imports.
    ///
    /// `aux_dirs` are searched before the engine's configured directories.
    pub fn resolve(&self, primary: &Path, aux_dirs: &[PathBuf]) -> Result<Resolution> {
        let primary = fs::canonicalize(primary).map_err(|source| ResolveError::Io {
            path: primary.display().to_string(),
            source,
        })?;
        let primary_dir = primary.parent().map(Path::to_path_buf).unwrap_or_default();
        let primary_key = primary.to_string_lossy().into_owned();
        info!(primary = %primary_key, "Resolving imports");

        let session = RefCell::new(ResolutionSession::default());
        let finder: &dyn AdjunctFinder = &*self.finder;

        let mut resolvers: Vec<Box<dyn SourceResolver + '_>> = vec![Box::new(Recorder::new(
            LocalDirResolver::new(primary_dir),
            &session,
            finder,
        ))];
        for dir in aux_dirs.iter().chain(&self.import_dirs) {
            resolvers.push(Box::new(Recorder::new(
                LocalDirResolver::new(dir.clone()),
                &session,
                finder,
            )));
        }
        if let Some(network) = &self.network {
            resolvers.push(Box::new(Recorder::new(&**network, &session, finder)));
        }
        let chain = SessionResolver::new(ResolverChain::new(resolvers), &session);
        debug!(strategies = %chain.describe(), "Built resolver chain");

        let root = chain
            .resolve(&primary_key)
            .map_err(|e| surface(&session, e.into()))?
            .ok_or_else(|| ResolveError::NotFound {
                path: primary_key.clone(),
                tried: vec![chain.describe()],
            })?;

        let dialect = detect_dialect(self.front_end, &root.content);
        let bundle = self.analyze(&root.canonical, &root.content, &chain, &session, dialect)?;

        let mut analyzed = BTreeSet::from([root.canonical.clone()]);
        let mut sub_bundles = Vec::new();
        loop {
            let pending: Vec<(String, String)> = session
                .borrow()
                .sources
                .iter()
                .filter(|(path, _)| !analyzed.contains(*path))
                .map(|(path, content)| (path.to_string(), content.to_string()))
                .collect();
            if pending.is_empty() {
                break;
            }
            for (path, content) in pending {
                debug!(path = %path, "Analyzing import");
                let sub = self.analyze(&path, &content, &chain, &session, dialect)?;
                analyzed.insert(path.clone());
                sub_bundles.push((path, sub));
            }
        }

        if !dialect.is_supported() {
            warn!(%dialect, "Rejecting unsupported dialect");
            return Err(Error::UnsupportedDialect(dialect));
        }

        drop(chain);
        let (sources, adjuncts) = session.into_inner().into_parts();
        info!(
            %dialect,
            files = sources.len(),
            adjuncts = adjuncts.len(),
            "Resolved imports"
        );
        Ok(Resolution {
            dialect,
            primary_path: root.canonical,
            bundle,
            sources,
            adjuncts,
            sub_bundles,
        })
    }

    fn analyze(
        &self,
        path: &str,
        content: &str,
        resolver: &dyn SourceResolver,
        session: &RefCell<ResolutionSession>,
        dialect: Dialect,
    ) -> Result<Bundle> {
        let outcome = self.front_end.analyze(content, resolver, dialect);
        if let Some(conflicted) = session.borrow().conflict() {
            return Err(Error::ImportConsistency {
                path: conflicted.to_string(),
            });
        }
        outcome.map_err(|diagnostics| Error::FrontEndRejection {
            context: path.to_string(),
            diagnostics,
            generated: None,
        })
    }
}

/// A poisoned session outranks whatever error reported it.
fn surface(session: &RefCell<ResolutionSession>, err: Error) -> Error {
    match session.borrow().conflict() {
        Some(path) => Error::ImportConsistency {
            path: path.to_string(),
        },
        None => err,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::testing::LineFrontEnd;

    /// Serves two URLs that share a canonical name but not their content.
    struct Flaky;

    impl SourceResolver for Flaky {
        fn describe(&self) -> String {
            "flaky".to_string()
        }

        fn resolve(&self, path: &str) -> std::result::Result<Option<ResolvedSource>, ResolveError> {
            let content = match path {
                "https://lib.test/a.wdl" => "version 1.0\ntask a {\n}\n",
                "https://lib.test/a.wdl?rev=2" => "version 1.0\ntask b {\n}\n",
                _ => return Ok(None),
            };
            Ok(Some(ResolvedSource {
                canonical: "https://lib.test/a.wdl".to_string(),
                content: content.to_string(),
            }))
        }
    }

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_chain_of_files_is_analyzed_once_each() {
        let dir = tempfile::tempdir().unwrap();
        let main = write(
            dir.path(),
            "main.wdl",
            "version 1.0\nimport \"f1.wdl\"\nworkflow main {\n}\n",
        );
        write(dir.path(), "f1.wdl", "version 1.0\nimport \"f2.wdl\"\ntask one {\n}\n");
        write(dir.path(), "f2.wdl", "version 1.0\nimport \"f3.wdl\"\ntask two {\n}\n");
        write(dir.path(), "f3.wdl", "version 1.0\ntask three {\n}\n");

        let fe = LineFrontEnd::default();
        let resolution = ImportEngine::new(&fe).resolve(&main, &[]).unwrap();

        assert_eq!(fe.analyze_calls.get(), 4);
        assert_eq!(resolution.dialect, Dialect::V1_0);
        assert_eq!(resolution.sources.len(), 4);
        assert_eq!(resolution.sub_bundles.len(), 3);
        assert!(resolution.sources.contains(&resolution.primary_path));
        assert_eq!(
            resolution.bundle.primary.as_ref().map(|c| c.name()),
            Some("main")
        );
    }

    #[test]
    fn test_shared_import_is_analyzed_once() {
        let dir = tempfile::tempdir().unwrap();
        let main = write(
            dir.path(),
            "main.wdl",
            "version 1.0\nimport \"a.wdl\"\nimport \"b.wdl\"\nworkflow main {\n}\n",
        );
        write(dir.path(), "a.wdl", "version 1.0\nimport \"common.wdl\"\ntask a {\n}\n");
        write(dir.path(), "b.wdl", "version 1.0\nimport \"common.wdl\"\ntask b {\n}\n");
        write(dir.path(), "common.wdl", "version 1.0\ntask common {\n}\n");

        let fe = LineFrontEnd::default();
        let resolution = ImportEngine::new(&fe).resolve(&main, &[]).unwrap();

        assert_eq!(fe.analyze_calls.get(), 4);
        assert_eq!(resolution.sub_bundles.len(), 3);
    }

    #[test]
    fn test_aux_dirs_are_searched_after_primary_dir() {
        let project = tempfile::tempdir().unwrap();
        let lib = tempfile::tempdir().unwrap();
        let main = write(
            project.path(),
            "main.wdl",
            "version 1.0\nimport \"shared.wdl\"\nworkflow main {\n}\n",
        );
        write(lib.path(), "shared.wdl", "version 1.0\ntask shared {\n}\n");
        write(lib.path(), "readme.shared.md", "# shared");

        let fe = LineFrontEnd::default();
        let resolution = ImportEngine::new(&fe)
            .resolve(&main, &[lib.path().to_path_buf()])
            .unwrap();

        assert_eq!(resolution.sources.len(), 2);
        assert_eq!(resolution.adjuncts.get("shared").len(), 1);
    }

    #[test]
    fn test_missing_import_is_a_front_end_rejection() {
        let dir = tempfile::tempdir().unwrap();
        let main = write(
            dir.path(),
            "main.wdl",
            "version 1.0\nimport \"nowhere.wdl\"\nworkflow main {\n}\n",
        );

        let fe = LineFrontEnd::default();
        let err = ImportEngine::new(&fe).resolve(&main, &[]).unwrap_err();
        match err {
            Error::FrontEndRejection { diagnostics, .. } => {
                assert_eq!(diagnostics.len(), 1);
                assert!(diagnostics[0].message.contains("nowhere.wdl"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_conflicting_reimport_wins_over_front_end_errors() {
        let dir = tempfile::tempdir().unwrap();
        let main = write(
            dir.path(),
            "main.wdl",
            "version 1.0\nimport \"https://lib.test/a.wdl\"\nimport \"https://lib.test/a.wdl?rev=2\"\nworkflow main {\n}\n",
        );

        let fe = LineFrontEnd::default();
        let err = ImportEngine::new(&fe)
            .with_network(Flaky)
            .resolve(&main, &[])
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ImportConsistency { ref path } if path == "https://lib.test/a.wdl"
        ));
    }

    #[test]
    fn test_draft3_is_rejected_after_resolution() {
        let dir = tempfile::tempdir().unwrap();
        let main = write(dir.path(), "main.wdl", "version draft-3\nworkflow main {\n}\n");

        let fe = LineFrontEnd::default();
        let err = ImportEngine::new(&fe).resolve(&main, &[]).unwrap_err();
        assert!(matches!(err, Error::UnsupportedDialect(Dialect::Draft3)));
        assert_eq!(fe.analyze_calls.get(), 1);
    }

    #[test]
    fn test_each_run_starts_with_a_fresh_session() {
        let dir = tempfile::tempdir().unwrap();
        let main = write(dir.path(), "main.wdl", "version 1.0\nworkflow main {\n}\n");

        let fe = LineFrontEnd::default();
        let engine = ImportEngine::new(&fe);
        engine.resolve(&main, &[]).unwrap();

        // Changing the file between runs is not an inconsistency.
        write(dir.path(), "main.wdl", "version 1.0\nworkflow renamed {\n}\n");
        let second = engine.resolve(&main, &[]).unwrap();
        assert_eq!(
            second.bundle.primary.as_ref().map(|c| c.name()),
            Some("renamed")
        );
    }

    #[test]
    fn test_unresolved_fragment_target_is_missing_element() {
        use flowport_ir::{Applet, AppletKind, Callable};
        use std::collections::BTreeMap;

        let calls = BTreeMap::from([("step".to_string(), "absent".to_string())]);
        let fragment = Applet::new("frag", vec![], vec![], AppletKind::WorkflowFragment { calls })
            .unwrap();
        let mut bundle = Bundle::default();
        bundle.primary = Some(Callable::Applet(fragment.clone()));
        bundle.insert(fragment);

        let resolution = Resolution {
            dialect: Dialect::V1_0,
            primary_path: "/w/main.wdl".to_string(),
            bundle,
            sources: SourceMap::new(),
            adjuncts: AdjunctMap::new(),
            sub_bundles: vec![],
        };
        assert!(matches!(
            resolution.check_fragment_targets(),
            Err(Error::MissingElement(_))
        ));
    }
}
