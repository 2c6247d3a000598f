// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Callables and the strategies attached to them.
//!
//! Every strategy is a closed enum. Consumers match exhaustively, so a new
//! variant has to be handled everywhere before the workspace compiles again.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::error::{IrError, Result};
use crate::types::WdlType;

// ============================================================================
// Variables
// ============================================================================

/// A typed input or output of a callable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CVar {
    /// Name as written by the user; may contain `.` for call-qualified outputs.
    pub name: String,
    /// Semantic type.
    #[serde(rename = "type")]
    pub wdl_type: WdlType,
    /// Platform-specific hints (help text, patterns, choices, ...).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, Value>,
}

impl CVar {
    /// Create a variable with no attributes.
    pub fn new(name: impl Into<String>, wdl_type: WdlType) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(IrError::EmptyName("variable"));
        }
        Ok(Self {
            name,
            wdl_type,
            attrs: BTreeMap::new(),
        })
    }

    /// Attach a platform hint.
    pub fn with_attr(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attrs.insert(key.into(), value);
        self
    }

    /// The name with structural separators replaced by `_`.
    ///
    /// `align.bam` and `align_bam` both map to `align_bam`; this accessor
    /// does not detect that.
    pub fn safe_name(&self) -> String {
        self.name.replace('.', "_")
    }
}

fn check_unique(callable: &str, section: &'static str, vars: &[CVar]) -> Result<()> {
    let mut seen = HashSet::new();
    for var in vars {
        if !seen.insert(var.name.as_str()) {
            return Err(IrError::DuplicateVariable {
                callable: callable.to_string(),
                section,
                name: var.name.clone(),
            });
        }
    }
    Ok(())
}

// ============================================================================
// Instance type strategy
// ============================================================================

/// How the machine a unit runs on is chosen.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "camelCase")]
pub enum InstanceType {
    /// No custom resources; the platform default applies.
    #[default]
    Default,
    /// Resources fully known at compile time.
    #[serde(rename_all = "camelCase")]
    Const {
        instance_class: Option<String>,
        memory_mb: Option<u64>,
        disk_gb: Option<u64>,
        cpu: Option<u32>,
    },
    /// Resources depend on an expression evaluated when the unit starts.
    Runtime,
}

/// A resource request as seen by the IR builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceValue<T> {
    /// Constant at compile time.
    Known(T),
    /// Computed from the unit's inputs at run time.
    Evaluated,
}

/// The runtime resources a task asks for. `None` means not requested.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceRequirements {
    pub instance_class: Option<ResourceValue<String>>,
    pub memory_mb: Option<ResourceValue<u64>>,
    pub disk_gb: Option<ResourceValue<u64>>,
    pub cpu: Option<ResourceValue<u32>>,
}

impl InstanceType {
    /// Select the strategy for a set of requirements.
    ///
    /// Nothing requested gives `Default`; any evaluated value gives
    /// `Runtime`; otherwise everything is known and the result is `Const`.
    pub fn from_requirements(req: &ResourceRequirements) -> Self {
        fn known<T: Clone>(v: &Option<ResourceValue<T>>) -> Option<Option<T>> {
            match v {
                None => Some(None),
                Some(ResourceValue::Known(x)) => Some(Some(x.clone())),
                Some(ResourceValue::Evaluated) => None,
            }
        }

        if req == &ResourceRequirements::default() {
            return InstanceType::Default;
        }
        match (
            known(&req.instance_class),
            known(&req.memory_mb),
            known(&req.disk_gb),
            known(&req.cpu),
        ) {
            (Some(instance_class), Some(memory_mb), Some(disk_gb), Some(cpu)) => {
                InstanceType::Const {
                    instance_class,
                    memory_mb,
                    disk_gb,
                    cpu,
                }
            }
            _ => InstanceType::Runtime,
        }
    }

    /// A `Runtime` unit evaluates its resource expression and then launches
    /// a second unit pinned to the resolved instance.
    pub fn requires_second_stage(&self) -> bool {
        match self {
            InstanceType::Default | InstanceType::Const { .. } => false,
            InstanceType::Runtime => true,
        }
    }
}

// ============================================================================
// Container image strategy
// ============================================================================

/// Where the container image of a unit comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "source", content = "reference", rename_all = "camelCase")]
pub enum DockerImage {
    /// No container.
    #[default]
    None,
    /// Pulled over the network when the unit starts.
    Network,
    /// A pre-staged platform asset.
    PlatformAsset(String),
}

/// What the generated unit has to do before running the command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeSetup<'a> {
    Nothing,
    FetchAndRun,
    AssetReference(&'a str),
}

impl DockerImage {
    /// Setup sequence implied by this image strategy.
    pub fn runtime_setup(&self) -> RuntimeSetup<'_> {
        match self {
            DockerImage::None => RuntimeSetup::Nothing,
            DockerImage::Network => RuntimeSetup::FetchAndRun,
            DockerImage::PlatformAsset(reference) => RuntimeSetup::AssetReference(reference),
        }
    }
}

// ============================================================================
// Unit kinds
// ============================================================================

/// What an applet is made of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum AppletKind {
    /// A pre-existing platform unit referenced by id.
    Native { id: String },
    /// A block of a workflow compiled into one unit; maps call name to callee.
    WorkflowFragment { calls: BTreeMap<String, String> },
    /// A task compiled from source.
    Task,
}

// ============================================================================
// Callables
// ============================================================================

/// A unit compiled to a platform applet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Applet {
    pub name: String,
    pub inputs: Vec<CVar>,
    pub outputs: Vec<CVar>,
    pub instance_type: InstanceType,
    pub docker: DockerImage,
    pub kind: AppletKind,
    /// Verbatim source of the underlying task definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
}

impl Applet {
    /// Create an applet with default instance type and no container.
    pub fn new(
        name: impl Into<String>,
        inputs: Vec<CVar>,
        outputs: Vec<CVar>,
        kind: AppletKind,
    ) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(IrError::EmptyName("applet"));
        }
        check_unique(&name, "input", &inputs)?;
        check_unique(&name, "output", &outputs)?;
        Ok(Self {
            name,
            inputs,
            outputs,
            instance_type: InstanceType::Default,
            docker: DockerImage::None,
            kind,
            task: None,
        })
    }

    pub fn with_instance_type(mut self, instance_type: InstanceType) -> Self {
        self.instance_type = instance_type;
        self
    }

    pub fn with_docker(mut self, docker: DockerImage) -> Self {
        self.docker = docker;
        self
    }

    pub fn with_task_source(mut self, source: impl Into<String>) -> Self {
        self.task = Some(source.into());
        self
    }
}

/// Interface of a workflow: name and typed inputs/outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSig {
    pub name: String,
    pub inputs: Vec<CVar>,
    pub outputs: Vec<CVar>,
}

impl WorkflowSig {
    pub fn new(name: impl Into<String>, inputs: Vec<CVar>, outputs: Vec<CVar>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(IrError::EmptyName("workflow"));
        }
        check_unique(&name, "input", &inputs)?;
        check_unique(&name, "output", &outputs)?;
        Ok(Self {
            name,
            inputs,
            outputs,
        })
    }
}

/// Anything that can be called: a named unit with typed inputs and outputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "callable", rename_all = "camelCase")]
pub enum Callable {
    Applet(Applet),
    Workflow(WorkflowSig),
}

impl Callable {
    pub fn name(&self) -> &str {
        match self {
            Callable::Applet(a) => &a.name,
            Callable::Workflow(w) => &w.name,
        }
    }

    pub fn inputs(&self) -> &[CVar] {
        match self {
            Callable::Applet(a) => &a.inputs,
            Callable::Workflow(w) => &w.inputs,
        }
    }

    pub fn outputs(&self) -> &[CVar] {
        match self {
            Callable::Applet(a) => &a.outputs,
            Callable::Workflow(w) => &w.outputs,
        }
    }

    pub fn as_applet(&self) -> Option<&Applet> {
        match self {
            Callable::Applet(a) => Some(a),
            Callable::Workflow(_) => None,
        }
    }
}

impl From<Applet> for Callable {
    fn from(a: Applet) -> Self {
        Callable::Applet(a)
    }
}

impl From<WorkflowSig> for Callable {
    fn from(w: WorkflowSig) -> Self {
        Callable::Workflow(w)
    }
}

// ============================================================================
// Bundles
// ============================================================================

/// Result of analyzing one source unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bundle {
    /// The workflow (or lone task) the unit is about, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary: Option<Callable>,
    /// Every callable defined in the unit, by name.
    #[serde(default)]
    pub callables: BTreeMap<String, Callable>,
    /// Named struct types defined or imported by the unit.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub type_aliases: BTreeMap<String, WdlType>,
}

impl Bundle {
    /// Add a callable under its own name.
    pub fn insert(&mut self, callable: impl Into<Callable>) {
        let callable = callable.into();
        self.callables.insert(callable.name().to_string(), callable);
    }
}

/// Call targets of workflow fragments that no bundle defines.
///
/// Returns `(fragment, target)` pairs, sorted.
pub fn unresolved_fragment_targets(bundles: &[&Bundle]) -> Vec<(String, String)> {
    let known: BTreeSet<&str> = bundles
        .iter()
        .flat_map(|b| b.callables.keys().map(String::as_str))
        .collect();

    let mut missing = BTreeSet::new();
    for bundle in bundles {
        let fragments = bundle.callables.values().chain(bundle.primary.iter());
        for callable in fragments {
            let Some(Applet {
                name,
                kind: AppletKind::WorkflowFragment { calls },
                ..
            }) = callable.as_applet()
            else {
                continue;
            };
            for target in calls.values() {
                if !known.contains(target.as_str()) {
                    missing.insert((name.clone(), target.clone()));
                }
            }
        }
    }
    missing.into_iter().collect()
}
