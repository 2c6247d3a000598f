// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Shared helpers for flowport-compiler integration tests.

#![allow(dead_code)]

use flowport_compiler::{Diagnostic, FrontEnd, SourceResolver, detect_dialect, scan_for_tasks};
use flowport_ir::{Applet, AppletKind, Bundle, Callable, Dialect, WorkflowSig};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

/// Install a test subscriber once; `RUST_LOG` selects the level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Write `content` to `dir/name`, creating parent directories.
pub fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Stand-in for the real parser.
///
/// Checks the `version` line and brace balance, resolves every
/// `import "..."` line, and reports each `task` (with its verbatim text)
/// and the `workflow` it sees. Every analyzed source is kept.
#[derive(Default)]
pub struct TextFrontEnd {
    pub analyzed: RefCell<Vec<String>>,
}

impl TextFrontEnd {
    pub fn analyze_count(&self) -> usize {
        self.analyzed.borrow().len()
    }
}

impl FrontEnd for TextFrontEnd {
    fn analyze(
        &self,
        source: &str,
        resolver: &dyn SourceResolver,
        dialect: Dialect,
    ) -> Result<Bundle, Vec<Diagnostic>> {
        self.analyzed.borrow_mut().push(source.to_string());
        let mut errors = Vec::new();
        if detect_dialect(self, source) != dialect {
            errors.push(Diagnostic::new(format!("expected a {} document", dialect)));
        }

        let tasks = scan_for_tasks(source).map_err(|e| vec![Diagnostic::new(e.to_string())])?;
        let mut bundle = Bundle::default();
        let mut depth = 0i64;
        for (i, line) in source.lines().enumerate() {
            let trimmed = line.trim();
            if let Some(rest) = trimmed.strip_prefix("import ") {
                let path = rest.split('"').nth(1).unwrap_or_default();
                if let Err(e) = resolver.resolve(path) {
                    errors.push(Diagnostic::at(i + 1, e.to_string()));
                }
            }
            match trimmed.split_whitespace().collect::<Vec<_>>().as_slice() {
                ["task", name, "{"] => {
                    let mut applet = Applet::new(*name, vec![], vec![], AppletKind::Task)
                        .map_err(|e| vec![Diagnostic::at(i + 1, e.to_string())])?;
                    if let Some(text) = tasks.get(*name) {
                        applet = applet.with_task_source(text.clone());
                    }
                    bundle.insert(applet);
                }
                ["workflow", name, "{"] => {
                    let sig = WorkflowSig::new(*name, vec![], vec![])
                        .map_err(|e| vec![Diagnostic::at(i + 1, e.to_string())])?;
                    bundle.primary = Some(Callable::Workflow(sig.clone()));
                    bundle.insert(sig);
                }
                _ => {}
            }
            depth += line.matches('{').count() as i64 - line.matches('}').count() as i64;
            if depth < 0 {
                errors.push(Diagnostic::at(i + 1, "unexpected '}'"));
                depth = 0;
            }
        }
        if depth > 0 {
            errors.push(Diagnostic::new("unclosed block at end of file"));
        }
        if errors.is_empty() { Ok(bundle) } else { Err(errors) }
    }

    fn looks_parsable(&self, source: &str, dialect: Dialect) -> bool {
        let first = source
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty() && !l.starts_with('#'));
        match dialect.version_preamble() {
            Some(preamble) => first == Some(preamble),
            None => !first.is_some_and(|l| l.starts_with("version ")),
        }
    }
}
