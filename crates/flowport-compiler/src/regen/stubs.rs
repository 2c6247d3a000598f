// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Interface and native stubs.

use flowport_ir::{CVar, Callable, GeneratedText, WdlValue};
use std::collections::BTreeMap;
use tracing::debug;

use super::Regenerator;
use super::defaults::synthesize_default_value;
use crate::error::{Error, Result};

impl Regenerator<'_> {
    /// A task with the callable's interface and an empty command.
    ///
    /// Not validated on its own: stubs are embedded in documents that are.
    pub fn generate_interface_stub(&self, callable: &Callable) -> Result<GeneratedText> {
        let text =
            self.task_declaration(callable.name(), callable.inputs(), callable.outputs(), None)?;
        Ok(GeneratedText::new(text))
    }

    /// A complete document declaring a reference to the native unit `id`.
    ///
    /// The document declares no structs, so a struct-typed variable only
    /// validates when the stub is embedded next to its declaration, as
    /// [`Regenerator::synthesize_standalone_workflow`] does.
    pub fn generate_native_stub(
        &self,
        id: &str,
        name: &str,
        inputs: &[CVar],
        outputs: &[CVar],
    ) -> Result<GeneratedText> {
        let body = self.task_declaration(name, inputs, outputs, Some(id))?;
        debug!(name, id, "Generated native stub");
        self.validate(&format!("native stub '{}'", name), self.assemble([body]))
    }

    /// Render a stub task. Inputs are sorted by name; outputs keep their
    /// order and are bound to synthesized defaults.
    pub(crate) fn task_declaration(
        &self,
        name: &str,
        inputs: &[CVar],
        outputs: &[CVar],
        native_id: Option<&str>,
    ) -> Result<String> {
        check_safe_names(name, inputs.iter().chain(outputs))?;

        let mut sorted: Vec<&CVar> = inputs.iter().collect();
        sorted.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| a.safe_name().cmp(&b.safe_name()))
        });

        let mut out = format!("task {} {{\n", name);
        if self.dialect.has_input_section() {
            if !sorted.is_empty() {
                out.push_str("  input {\n");
                for var in &sorted {
                    out.push_str(&format!("    {} {}\n", var.wdl_type, var.safe_name()));
                }
                out.push_str("  }\n");
            }
        } else {
            for var in &sorted {
                out.push_str(&format!("  {} {}\n", var.wdl_type, var.safe_name()));
            }
        }

        out.push_str("  command {}\n");

        if !outputs.is_empty() {
            out.push_str("  output {\n");
            for var in outputs {
                let value = synthesize_default_value(&var.wdl_type)?;
                out.push_str(&format!(
                    "    {} {} = {}\n",
                    var.wdl_type,
                    var.safe_name(),
                    value.to_source(self.dialect)
                ));
            }
            out.push_str("  }\n");
        }

        if let Some(id) = native_id {
            let quoted = |s: &str| WdlValue::String(s.to_string()).to_source(self.dialect);
            out.push_str("  meta {\n");
            out.push_str(&format!("    type: {}\n", quoted("native")));
            out.push_str(&format!("    id: {}\n", quoted(id)));
            out.push_str("  }\n");
        }

        out.push_str("}\n");
        Ok(out)
    }
}

/// Reject two distinct variables that map to the same safe name.
fn check_safe_names<'v>(callable: &str, vars: impl Iterator<Item = &'v CVar>) -> Result<()> {
    let mut seen: BTreeMap<String, &str> = BTreeMap::new();
    for var in vars {
        let safe_name = var.safe_name();
        match seen.get(&safe_name) {
            Some(first) if *first != var.name => {
                return Err(Error::SafeNameCollision {
                    callable: callable.to_string(),
                    first: first.to_string(),
                    second: var.name.clone(),
                    safe_name,
                });
            }
            Some(_) => {}
            None => {
                seen.insert(safe_name, &var.name);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::testing::LineFrontEnd;
    use flowport_ir::{Applet, AppletKind, Dialect, WdlType, WorkflowSig};

    fn var(name: &str, ty: WdlType) -> CVar {
        CVar::new(name, ty).unwrap()
    }

    fn align() -> Callable {
        Applet::new(
            "Align",
            vec![
                var("reference", WdlType::File),
                var("reads", WdlType::array(WdlType::File, true)),
                var("min.quality", WdlType::optional(WdlType::Int)),
            ],
            vec![
                var("bam", WdlType::File),
                var("stats", WdlType::map(WdlType::String, WdlType::Float)),
            ],
            AppletKind::Task,
        )
        .unwrap()
        .into()
    }

    #[test]
    fn test_interface_stub_v1() {
        let fe = LineFrontEnd::default();
        let regen = Regenerator::new(&fe, Dialect::V1_0).unwrap();
        let stub = regen.generate_interface_stub(&align()).unwrap();
        assert_eq!(
            stub.as_str(),
            "task Align {
  input {
    Int? min_quality
    Array[File]+ reads
    File reference
  }
  command {}
  output {
    File bam = \"dummy.txt\"
    Map[String,Float] stats = {\"\": 0.0}
  }
}
"
        );
    }

    #[test]
    fn test_interface_stub_draft2_has_no_input_section() {
        let fe = LineFrontEnd::default();
        let regen = Regenerator::new(&fe, Dialect::Draft2).unwrap();
        let sig = WorkflowSig::new("w", vec![var("n", WdlType::Int)], vec![]).unwrap();
        let stub = regen.generate_interface_stub(&sig.into()).unwrap();
        assert_eq!(stub.as_str(), "task w {\n  Int n\n  command {}\n}\n");
    }

    #[test]
    fn test_inputs_sort_by_declared_name() {
        let fe = LineFrontEnd::default();
        let regen = Regenerator::new(&fe, Dialect::V1_0).unwrap();
        let sig = WorkflowSig::new(
            "w",
            vec![var("aB", WdlType::Int), var("a.b", WdlType::Int)],
            vec![],
        )
        .unwrap();
        let stub = regen.generate_interface_stub(&sig.into()).unwrap();
        assert_eq!(
            stub.as_str(),
            "task w {\n  input {\n    Int a_b\n    Int aB\n  }\n  command {}\n}\n"
        );
    }

    #[test]
    fn test_interface_stub_is_deterministic() {
        let fe = LineFrontEnd::default();
        let regen = Regenerator::new(&fe, Dialect::V1_0).unwrap();
        let first = regen.generate_interface_stub(&align()).unwrap();
        let second = regen.generate_interface_stub(&align()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.checksum(), second.checksum());
    }

    #[test]
    fn test_interface_stub_round_trips_inside_a_document() {
        let fe = LineFrontEnd::default();
        let regen = Regenerator::new(&fe, Dialect::V1_0).unwrap();
        let stub = regen.generate_interface_stub(&align()).unwrap();
        let document = regen.assemble([stub.into_string()]);
        assert!(regen.validate("stub", document).is_ok());
    }

    #[test]
    fn test_native_stub() {
        let fe = LineFrontEnd::default();
        let regen = Regenerator::new(&fe, Dialect::V1_0).unwrap();
        let stub = regen
            .generate_native_stub(
                "applet-xyz",
                "Sort",
                &[var("bam", WdlType::File)],
                &[var("sorted", WdlType::File)],
            )
            .unwrap();
        assert!(stub.as_str().starts_with("version 1.0\n\ntask Sort {\n"));
        assert!(stub.as_str().contains("  meta {\n    type: \"native\"\n    id: \"applet-xyz\"\n  }\n"));
        assert_eq!(fe.analyze_calls.get(), 1);
    }

    #[test]
    fn test_safe_name_collision_is_reported() {
        let fe = LineFrontEnd::default();
        let regen = Regenerator::new(&fe, Dialect::V1_0).unwrap();
        let err = regen
            .generate_native_stub(
                "applet-xyz",
                "Sort",
                &[var("align.bam", WdlType::File), var("align_bam", WdlType::File)],
                &[],
            )
            .unwrap_err();
        match err {
            Error::SafeNameCollision {
                first, safe_name, ..
            } => {
                assert_eq!(first, "align.bam");
                assert_eq!(safe_name, "align_bam");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unsupported_output_type_fails_the_stub() {
        let fe = LineFrontEnd::default();
        let regen = Regenerator::new(&fe, Dialect::V1_0).unwrap();
        let err = regen
            .generate_native_stub("applet-xyz", "Tar", &[], &[var("out", WdlType::Directory)])
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedType(_)));
    }
}
