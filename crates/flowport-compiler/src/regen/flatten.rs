// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Namespace stripping for call sites.

use regex::Regex;

use crate::error::{Error, Result};

/// `call ns.Callee [as alias] {`
const CALL_WITH_ARGS: &str = r"\bcall\s+((?:\w+\.)+)\w+(?:\s+as\s+\w+)?\s*\{";
/// `call ns.Callee [as alias]` ending the line, a trailing comment, or a
/// one-line block body
const CALL_NO_ARGS: &str = r"\bcall\s+((?:\w+\.)+)\w+(?:\s+as\s+\w+)?\s*(?:#.*|\}.*)?$";

/// Rewrites `call lib.X` into `call X`, one line at a time.
#[derive(Debug, Clone)]
pub struct CallFlattener {
    patterns: [Regex; 2],
}

impl CallFlattener {
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| {
                Error::InternalConsistencyFault(format!("bad pattern {}: {}", pattern, e))
            })
        };
        Ok(Self {
            patterns: [compile(CALL_WITH_ARGS)?, compile(CALL_NO_ARGS)?],
        })
    }

    /// Strip the namespace from the call on `line`, if there is one.
    ///
    /// More than one call site on a line is an internal fault.
    pub fn flatten_line(&self, line: &str) -> Result<String> {
        let mut namespaces = self
            .patterns
            .iter()
            .flat_map(|re| re.captures_iter(line))
            .filter_map(|caps| caps.get(1))
            .map(|m| m.range());

        let Some(namespace) = namespaces.next() else {
            return Ok(line.to_string());
        };
        if namespaces.next().is_some() {
            return Err(Error::InternalConsistencyFault(format!(
                "more than one call site on line: {}",
                line.trim()
            )));
        }
        let mut flat = line.to_string();
        flat.replace_range(namespace, "");
        Ok(flat)
    }

    pub fn flatten(&self, text: &str) -> Result<String> {
        let lines = text
            .split('\n')
            .map(|line| self.flatten_line(line))
            .collect::<Result<Vec<_>>>()?;
        Ok(lines.join("\n"))
    }
}

/// Remove namespace prefixes from every call site in `text`.
pub fn flatten_namespaced_calls(text: &str) -> Result<String> {
    CallFlattener::new()?.flatten(text)
}
