// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Flowport Compiler - Import Resolution and Source Regeneration
//!
//! This crate sits between an external workflow-language front-end and the
//! platform code generator. It gathers every source file a workflow needs
//! and regenerates minimal, self-contained source text from the IR.
//!
//! # Architecture
//!
//! ```text
//!     ┌─────────────┐      ┌─────────────┐      ┌─────────────┐
//!     │  Primary    │      │   Import    │      │  IR builder │
//!     │  source     │─────▶│   engine    │─────▶│ (external)  │
//!     └─────────────┘      └─────────────┘      └─────────────┘
//!                                 │                    │
//!                                 ▼                    ▼
//!                          ┌─────────────┐      ┌─────────────┐
//!                          │ Source map  │─────▶│ Regenerator │──▶ validated text
//!                          │ + adjuncts  │      │ (+ scanner) │
//!                          └─────────────┘      └─────────────┘
//! ```
//!
//! # Pipeline
//!
//! 1. **Resolve**: [`ImportEngine`] walks the imports of a primary file and
//!    returns a [`Resolution`] with one bundle per file
//! 2. **Build IR**: done by the caller, outside this crate
//! 3. **Regenerate**: [`Regenerator`] writes stubs and standalone documents
//!    and has the front-end accept each one before returning it
//!
//! # Usage
//!
//! ```ignore
//! use flowport_compiler::{ImportConfig, ImportEngine, Regenerator};
//!
//! let config = ImportConfig::from_env()?;
//! let engine = ImportEngine::from_config(&front_end, &config)?;
//! let resolution = engine.resolve(Path::new("main.wdl"), &[])?;
//!
//! let regen = Regenerator::new(&front_end, resolution.dialect)?;
//! let stub = regen.generate_native_stub("applet-xyz", "Sort", &inputs, &outputs)?;
//! ```
//!
//! # Modules
//!
//! - [`config`]: Environment-driven import settings
//! - [`frontend`]: The front-end seam and dialect detection
//! - [`imports`]: Resolver chain, resolution session and fixpoint engine
//! - [`regen`]: Default values, stubs, flattening and standalone documents
//! - [`scanner`]: Verbatim block recovery and call ordering

/// Environment-driven import settings.
pub mod config;

/// Error types.
pub mod error;

/// The front-end seam and dialect detection.
pub mod frontend;

/// Import resolution and caching.
pub mod imports;

/// Source regeneration.
pub mod regen;

/// Verbatim block recovery and call ordering.
pub mod scanner;

pub use config::{ConfigError, ImportConfig};
pub use error::{Error, Result};
pub use frontend::{Diagnostic, FrontEnd, detect_dialect};
#[cfg(feature = "network")]
pub use imports::HttpResolver;
pub use imports::{
    AdjunctFinder, DirectoryAdjunctFinder, ImportEngine, LocalDirResolver, Resolution,
    ResolveError, ResolvedSource, ResolverChain, SourceResolver,
};
pub use regen::{
    AliasOrdering, DeclarationOrder, PLACEHOLDER_FILE, Regenerator, flatten_namespaced_calls,
    synthesize_default_value,
};
pub use scanner::{BlockKind, BlockScanner, ScannedBlock, scan_for_calls, scan_for_tasks, scan_for_workflow};

// Re-export IR types for convenience
pub use flowport_ir::{Bundle, Callable, Dialect, GeneratedText};
