// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Analyzed workflow graph, as handed over by the front-end.

use serde::{Deserialize, Serialize};

/// Body of a workflow after semantic analysis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowGraph {
    pub nodes: Vec<GraphNode>,
}

/// One element of a workflow body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "camelCase")]
pub enum GraphNode {
    Call(CallNode),
    /// `scatter (...) { ... }` with its own inner graph.
    Scatter { body: WorkflowGraph },
    /// `if (...) { ... }` with its own inner graph.
    Conditional { body: WorkflowGraph },
    /// A plain declaration.
    Declaration { name: String },
}

/// A call statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallNode {
    /// Callee as written, possibly namespace-qualified (`lib.Hello`).
    pub callee: String,
    /// `as` alias, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// 1-based source line of the `call` keyword.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl CallNode {
    pub fn new(callee: impl Into<String>, line: usize) -> Self {
        Self {
            callee: callee.into(),
            alias: None,
            line: Some(line),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Name the call is known by inside the workflow: the alias, or the
    /// callee without its namespace.
    pub fn local_name(&self) -> &str {
        match &self.alias {
            Some(alias) => alias,
            None => self
                .callee
                .rsplit_once('.')
                .map_or(self.callee.as_str(), |(_, name)| name),
        }
    }
}
