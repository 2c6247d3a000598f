// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Source regeneration.
//!
//! Produces minimal, self-contained source text from the IR: default
//! values, interface stubs, native stubs, flattened call sites, struct
//! blocks and standalone task/workflow documents. Every complete document
//! is fed back through the front-end before it is returned, and a rejected
//! document is an error carrying the generated text.

mod aliases;
mod defaults;
mod flatten;
mod standalone;
mod stubs;

pub use aliases::{AliasOrdering, DeclarationOrder};
pub use defaults::{PLACEHOLDER_FILE, synthesize_default_value};
pub use flatten::{CallFlattener, flatten_namespaced_calls};

use flowport_ir::{Dialect, GeneratedText};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::frontend::FrontEnd;
use crate::imports::ResolverChain;
use crate::scanner::BlockScanner;

/// Generates source text in one dialect and validates it with a front-end.
pub struct Regenerator<'a> {
    front_end: &'a dyn FrontEnd,
    dialect: Dialect,
    scanner: BlockScanner,
    flattener: CallFlattener,
}

impl<'a> Regenerator<'a> {
    /// Fails with `UnsupportedDialect` for dialects that are never compiled.
    pub fn new(front_end: &'a dyn FrontEnd, dialect: Dialect) -> Result<Self> {
        if !dialect.is_supported() {
            return Err(Error::UnsupportedDialect(dialect));
        }
        Ok(Self {
            front_end,
            dialect,
            scanner: BlockScanner::new()?,
            flattener: CallFlattener::new()?,
        })
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Join the preamble and non-empty `sections` with blank lines.
    fn assemble<I>(&self, sections: I) -> String
    where
        I: IntoIterator<Item = String>,
    {
        let mut parts: Vec<String> = self
            .dialect
            .version_preamble()
            .map(str::to_string)
            .into_iter()
            .collect();
        parts.extend(
            sections
                .into_iter()
                .map(|s| s.trim_end().to_string())
                .filter(|s| !s.is_empty()),
        );
        let mut text = parts.join("\n\n");
        text.push('\n');
        text
    }

    /// Round-trip `text` through the front-end.
    fn validate(&self, context: &str, text: String) -> Result<GeneratedText> {
        // Generated documents never import anything.
        let no_imports = ResolverChain::new(Vec::new());
        match self.front_end.analyze(&text, &no_imports, self.dialect) {
            Ok(_) => {
                debug!(context, bytes = text.len(), "Generated source accepted");
                Ok(GeneratedText::new(text))
            }
            Err(diagnostics) => {
                warn!(context, errors = diagnostics.len(), "Generated source rejected");
                Err(Error::FrontEndRejection {
                    context: context.to_string(),
                    diagnostics,
                    generated: Some(text),
                })
            }
        }
    }
}
