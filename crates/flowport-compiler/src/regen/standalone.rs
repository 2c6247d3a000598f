// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Standalone documents: one task, or one workflow with everything it calls.

use flowport_ir::{AppletKind, Callable, GeneratedText, WdlType};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

use super::Regenerator;
use super::aliases::{AliasOrdering, struct_declaration};
use crate::error::{Error, Result};

impl Regenerator<'_> {
    /// One `struct` declaration per alias, in the order `ordering` gives.
    ///
    /// Empty for an empty map. Draft-2 has no structs, so any alias there
    /// is `UnsupportedDialect`.
    pub fn emit_type_alias_block(
        &self,
        aliases: &BTreeMap<String, WdlType>,
        ordering: &dyn AliasOrdering,
    ) -> Result<String> {
        if aliases.is_empty() {
            return Ok(String::new());
        }
        if !self.dialect.supports_structs() {
            return Err(Error::UnsupportedDialect(self.dialect));
        }

        let order = ordering.order(aliases)?;
        let mut emitted = BTreeSet::new();
        let mut declarations = Vec::with_capacity(order.len());
        for name in &order {
            let ty = aliases.get(name).ok_or_else(|| {
                Error::InternalConsistencyFault(format!("alias ordering names unknown type '{}'", name))
            })?;
            if !emitted.insert(name.as_str()) {
                return Err(Error::InternalConsistencyFault(format!(
                    "alias ordering lists '{}' twice",
                    name
                )));
            }
            declarations.push(struct_declaration(name, ty)?);
        }
        if emitted.len() != aliases.len() {
            return Err(Error::InternalConsistencyFault(format!(
                "alias ordering covers {} of {} types",
                emitted.len(),
                aliases.len()
            )));
        }
        Ok(declarations.join("\n"))
    }

    /// The only task of `original`, with the struct declarations it needs.
    pub fn synthesize_standalone_task(
        &self,
        original: &str,
        aliases: &BTreeMap<String, WdlType>,
        ordering: &dyn AliasOrdering,
    ) -> Result<GeneratedText> {
        let mut tasks = self.scanner.scan_for_tasks(original);
        let found = tasks.len();
        let (name, task) = match tasks.pop_first() {
            Some(task) if found == 1 => task,
            _ => {
                return Err(Error::MissingElement(format!(
                    "expected exactly one task in source, found {}",
                    found
                )));
            }
        };

        let text = self.assemble([self.emit_type_alias_block(aliases, ordering)?, task]);
        info!(task = %name, "Synthesized standalone task");
        self.validate(&format!("standalone task '{}'", name), text)
    }

    /// The workflow of `original` as a document without imports.
    ///
    /// Every referenced callable is declared once, in name order: with its
    /// original text when it can be recovered, as a native stub when it is
    /// a native unit, and as an interface stub otherwise. Namespaced call
    /// sites in the workflow are flattened.
    pub fn synthesize_standalone_workflow(
        &self,
        original: &str,
        referenced: &[Callable],
        aliases: &BTreeMap<String, WdlType>,
        ordering: &dyn AliasOrdering,
    ) -> Result<GeneratedText> {
        let (workflow_name, workflow) = self
            .scanner
            .scan_for_workflow(original)
            .ok_or_else(|| Error::MissingElement("no workflow found in source".to_string()))?;
        let original_tasks = self.scanner.scan_for_tasks(original);

        let mut unique: BTreeMap<&str, &Callable> = BTreeMap::new();
        for callable in referenced {
            unique.entry(callable.name()).or_insert(callable);
        }

        let mut sections = Vec::with_capacity(unique.len() + 2);
        sections.push(self.emit_type_alias_block(aliases, ordering)?);
        for (name, callable) in &unique {
            sections.push(self.callable_body(name, callable, &original_tasks)?);
        }
        sections.push(self.flattener.flatten(&workflow)?);

        let text = self.assemble(sections);
        info!(
            workflow = %workflow_name,
            callables = unique.len(),
            "Synthesized standalone workflow"
        );
        self.validate(&format!("standalone workflow '{}'", workflow_name), text)
    }

    fn callable_body(
        &self,
        name: &str,
        callable: &Callable,
        original_tasks: &BTreeMap<String, String>,
    ) -> Result<String> {
        if let Some(text) = original_tasks.get(name) {
            return Ok(text.clone());
        }
        let applet = match callable {
            Callable::Applet(applet) => applet,
            Callable::Workflow(sig) => {
                return self.task_declaration(name, &sig.inputs, &sig.outputs, None);
            }
        };
        if let Some(source) = &applet.task {
            let recovered = self.scanner.scan_for_tasks(source).remove(name);
            return Ok(recovered.unwrap_or_else(|| source.clone()));
        }
        match &applet.kind {
            AppletKind::Native { id } => {
                self.task_declaration(name, &applet.inputs, &applet.outputs, Some(id.as_str()))
            }
            AppletKind::WorkflowFragment { .. } | AppletKind::Task => {
                self.task_declaration(name, &applet.inputs, &applet.outputs, None)
            }
        }
    }
}
