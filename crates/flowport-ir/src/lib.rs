// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Flowport IR - the contract between semantic analysis and code generation
//!
//! This crate defines the intermediate representation produced by the
//! upstream IR builder and consumed, read-only, by the regeneration engine
//! and the platform compiler:
//! - Variable descriptors and workflow types/values
//! - Instance-type and container-image strategies
//! - Unit kinds and callables
//! - Bundles, source maps, adjunct maps and generated text
//! - The analyzed workflow graph handed over by the front-end
//!
//! All closed variants are plain enums so that adding one breaks every
//! non-exhaustive consumer at compile time.

pub mod callable;
pub mod dialect;
pub mod error;
pub mod graph;
pub mod sources;
pub mod types;

pub use callable::{
    Applet, AppletKind, Bundle, CVar, Callable, DockerImage, InstanceType, ResourceRequirements,
    ResourceValue, RuntimeSetup, WorkflowSig, unresolved_fragment_targets,
};
pub use dialect::Dialect;
pub use error::{IrError, Result};
pub use graph::{CallNode, GraphNode, WorkflowGraph};
pub use sources::{AdjunctFile, AdjunctKind, AdjunctMap, GeneratedText, SourceMap};
pub use types::{WdlType, WdlValue};
