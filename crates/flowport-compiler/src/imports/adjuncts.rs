// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Side-file discovery next to resolved sources.

use flowport_ir::{AdjunctFile, AdjunctKind, AdjunctMap};
use std::fs;
use std::path::Path;
use tracing::debug;

use super::resolvers::ResolveError;

/// Finds side files that belong to a resolved source file.
pub trait AdjunctFinder {
    fn find_adjuncts(&self, path: &str) -> Result<AdjunctMap, ResolveError>;
}

/// Looks for `readme.<name>.md` and `developer_notes.<name>.md` in the
/// directory of a local source file. Names match case-insensitively and
/// `<name>` is the component the file documents. Remote sources have none.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryAdjunctFinder;

const PATTERNS: [(&str, AdjunctKind); 2] = [
    ("readme.", AdjunctKind::Readme),
    ("developer_notes.", AdjunctKind::DeveloperNotes),
];

/// Split `<prefix><component>.md` into the adjunct kind and the component.
fn classify(file_name: &str) -> Option<(AdjunctKind, &str)> {
    let stem_end = file_name.len().checked_sub(".md".len())?;
    let suffix = file_name.get(stem_end..)?;
    if !suffix.eq_ignore_ascii_case(".md") {
        return None;
    }
    PATTERNS.iter().find_map(|(prefix, kind)| {
        let head = file_name.get(..prefix.len())?;
        if !head.eq_ignore_ascii_case(prefix) {
            return None;
        }
        let component = file_name.get(prefix.len()..stem_end)?;
        (!component.is_empty()).then_some((*kind, component))
    })
}

impl AdjunctFinder for DirectoryAdjunctFinder {
    fn find_adjuncts(&self, path: &str) -> Result<AdjunctMap, ResolveError> {
        let mut found = AdjunctMap::new();
        if path.contains("://") {
            return Ok(found);
        }
        let Some(dir) = Path::new(path).parent() else {
            return Ok(found);
        };
        let io_err = |source| ResolveError::Io {
            path: dir.display().to_string(),
            source,
        };

        let mut entries: Vec<_> = fs::read_dir(dir)
            .map_err(io_err)?
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
            .collect();
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let name = entry.file_name();
            let Some((kind, component)) = name.to_str().and_then(classify) else {
                continue;
            };
            let file_path = entry.path();
            let content = fs::read_to_string(&file_path).map_err(|source| ResolveError::Io {
                path: file_path.display().to_string(),
                source,
            })?;
            debug!(component, file = %file_path.display(), "Found adjunct");
            found.add(
                component,
                AdjunctFile {
                    kind,
                    path: file_path.to_string_lossy().into_owned(),
                    content,
                },
            );
        }
        Ok(found)
    }
}
