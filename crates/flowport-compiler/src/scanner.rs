// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Structural scanner.
//!
//! Recovers the verbatim text of top-level `task` and `workflow` blocks
//! without parsing. Only used on sources the front-end has already
//! accepted as a whole.
//!
//! A block ends at the first line holding nothing but `}` in column 0.
//! A nested block closed the same way ends the outer block early:
//!
//! ```text
//! task t {
//!   command <<<
//! }            <- taken as the end of `t`
//!   >>>
//! }
//! ```
//!
//! Callers rely on this behavior; keep it.

use flowport_ir::{GraphNode, WorkflowGraph};
use regex::Regex;
use std::collections::BTreeMap;
use strum::{Display, EnumString};

use crate::error::{Error, Result};

const BLOCK_START: &str = r"^\s*(task|workflow)\s+(\w+)\s*\{";
const BLOCK_END: &str = r"^\}\s*$";

/// Top-level block kinds the scanner recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum BlockKind {
    Task,
    Workflow,
}

/// A block found by [`BlockScanner::next_block`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedBlock<'a> {
    /// Lines after the closing brace.
    pub rest: &'a [&'a str],
    pub name: String,
    /// Opening line through closing brace, newline-terminated.
    pub text: String,
}

enum ScanState<'a> {
    Seeking,
    InBlock { name: String, body: Vec<&'a str> },
}

/// Compiled block patterns.
#[derive(Debug, Clone)]
pub struct BlockScanner {
    start: Regex,
    end: Regex,
}

impl BlockScanner {
    pub fn new() -> Result<Self> {
        Ok(Self {
            start: compile(BLOCK_START)?,
            end: compile(BLOCK_END)?,
        })
    }

    /// Find the next block of `kind` in `lines`.
    ///
    /// Returns `None` when no block starts, or when the last one never closes.
    pub fn next_block<'a>(&self, kind: BlockKind, lines: &'a [&'a str]) -> Option<ScannedBlock<'a>> {
        let keyword = kind.to_string();
        let mut state = ScanState::Seeking;
        for (i, line) in lines.iter().copied().enumerate() {
            state = match state {
                ScanState::Seeking => match self.start.captures(line) {
                    Some(caps) if caps[1] == keyword => ScanState::InBlock {
                        name: caps[2].to_string(),
                        body: vec![line],
                    },
                    _ => ScanState::Seeking,
                },
                ScanState::InBlock { name, mut body } => {
                    body.push(line);
                    if self.end.is_match(line) {
                        let mut text = body.join("\n");
                        text.push('\n');
                        return Some(ScannedBlock {
                            rest: &lines[i + 1..],
                            name,
                            text,
                        });
                    }
                    ScanState::InBlock { name, body }
                }
            };
        }
        None
    }

    /// Every top-level task, by name. The first of two same-named tasks wins.
    pub fn scan_for_tasks(&self, source: &str) -> BTreeMap<String, String> {
        let lines: Vec<&str> = source.lines().collect();
        let mut rest = lines.as_slice();
        let mut tasks = BTreeMap::new();
        while let Some(block) = self.next_block(BlockKind::Task, rest) {
            tasks.entry(block.name).or_insert(block.text);
            rest = block.rest;
        }
        tasks
    }

    /// The first workflow, as `(name, text)`.
    pub fn scan_for_workflow(&self, source: &str) -> Option<(String, String)> {
        let lines: Vec<&str> = source.lines().collect();
        self.next_block(BlockKind::Workflow, &lines)
            .map(|block| (block.name, block.text))
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| Error::InternalConsistencyFault(format!("bad pattern {}: {}", pattern, e)))
}

/// Every top-level task in `source`, by name.
pub fn scan_for_tasks(source: &str) -> Result<BTreeMap<String, String>> {
    Ok(BlockScanner::new()?.scan_for_tasks(source))
}

/// The first workflow in `source`, as `(name, text)`.
pub fn scan_for_workflow(source: &str) -> Result<Option<(String, String)>> {
    Ok(BlockScanner::new()?.scan_for_workflow(source))
}

/// Local names of the top-level calls in `graph`, in source-line order.
///
/// Calls inside scatters and conditionals are not included. Every call must
/// carry a line number that exists in `source`.
pub fn scan_for_calls(graph: &WorkflowGraph, source: &str) -> Result<Vec<String>> {
    let line_count = source.lines().count();
    let mut calls = Vec::new();
    for node in &graph.nodes {
        let GraphNode::Call(call) = node else {
            continue;
        };
        let line = call.line.ok_or_else(|| {
            Error::InternalConsistencyFault(format!("call '{}' has no source line", call.callee))
        })?;
        if line == 0 || line > line_count {
            return Err(Error::InternalConsistencyFault(format!(
                "call '{}' points at line {}, source has {} lines",
                call.callee, line, line_count
            )));
        }
        calls.push((line, call.local_name().to_string()));
    }
    calls.sort_by_key(|(line, _)| *line);
    Ok(calls.into_iter().map(|(_, name)| name).collect())
}
