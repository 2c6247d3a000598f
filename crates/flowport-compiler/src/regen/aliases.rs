// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Struct declarations for type aliases.

use flowport_ir::WdlType;
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Error, Result};

/// Decides the order in which type aliases are declared.
///
/// A struct must come after every struct its fields mention.
pub trait AliasOrdering {
    fn order(&self, aliases: &BTreeMap<String, WdlType>) -> Result<Vec<String>>;
}

/// Dependency order, alphabetical among independent aliases.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeclarationOrder;

impl AliasOrdering for DeclarationOrder {
    fn order(&self, aliases: &BTreeMap<String, WdlType>) -> Result<Vec<String>> {
        let mut depends_on: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        let mut dependents: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (name, ty) in aliases {
            let deps: BTreeSet<&str> = field_types(ty)
                .flat_map(WdlType::referenced_structs)
                .filter(|dep| aliases.contains_key(*dep))
                .collect();
            for dep in &deps {
                dependents.entry(*dep).or_default().push(name);
            }
            depends_on.insert(name, deps);
        }

        let mut ready: BTreeSet<&str> = depends_on
            .iter()
            .filter(|(_, deps)| deps.is_empty())
            .map(|(name, _)| *name)
            .collect();
        let mut ordered = Vec::with_capacity(aliases.len());
        while let Some(name) = ready.pop_first() {
            ordered.push(name.to_string());
            for &dependent in dependents.get(name).into_iter().flatten() {
                if let Some(deps) = depends_on.get_mut(dependent) {
                    deps.remove(name);
                    if deps.is_empty() {
                        ready.insert(dependent);
                    }
                }
            }
        }

        if ordered.len() != aliases.len() {
            let stuck: Vec<&str> = depends_on
                .iter()
                .filter(|(_, deps)| !deps.is_empty())
                .map(|(name, _)| *name)
                .collect();
            return Err(Error::InternalConsistencyFault(format!(
                "type aliases reference each other in a cycle: {}",
                stuck.join(", ")
            )));
        }
        Ok(ordered)
    }
}

fn field_types(ty: &WdlType) -> impl Iterator<Item = &WdlType> {
    let fields = match ty {
        WdlType::Struct { fields, .. } => Some(fields.values()),
        _ => None,
    };
    fields.into_iter().flatten()
}

/// `struct Name { ... }` for one alias.
pub(crate) fn struct_declaration(alias: &str, ty: &WdlType) -> Result<String> {
    let WdlType::Struct { fields, .. } = ty else {
        return Err(Error::InternalConsistencyFault(format!(
            "type alias '{}' is not a struct: {}",
            alias, ty
        )));
    };
    let mut out = format!("struct {} {{\n", alias);
    for (field, field_ty) in fields {
        out.push_str(&format!("  {} {}\n", field_ty.to_source(), field));
    }
    out.push_str("}\n");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aliases(types: Vec<WdlType>) -> BTreeMap<String, WdlType> {
        types
            .into_iter()
            .map(|t| (t.to_source(), t))
            .collect()
    }

    #[test]
    fn test_dependencies_come_first() {
        let read = WdlType::record("Read", [("path", WdlType::File)]);
        let sample = WdlType::record(
            "Sample",
            [("reads", WdlType::array(read.clone(), true))],
        );
        let cohort = WdlType::record(
            "Cohort",
            [("samples", WdlType::map(WdlType::String, sample.clone()))],
        );
        let order = DeclarationOrder
            .order(&aliases(vec![cohort, sample, read]))
            .unwrap();
        assert_eq!(order, ["Read", "Sample", "Cohort"]);
    }

    #[test]
    fn test_independent_aliases_are_alphabetical() {
        let order = DeclarationOrder
            .order(&aliases(vec![
                WdlType::record("Zeta", [("x", WdlType::Int)]),
                WdlType::record("Alpha", [("y", WdlType::Int)]),
            ]))
            .unwrap();
        assert_eq!(order, ["Alpha", "Zeta"]);
    }

    #[test]
    fn test_cycle_is_a_fault() {
        let a = WdlType::record("A", [("b", WdlType::record("B", Vec::<(String, WdlType)>::new()))]);
        let b = WdlType::record("B", [("a", WdlType::record("A", Vec::<(String, WdlType)>::new()))]);
        let err = DeclarationOrder.order(&aliases(vec![a, b])).unwrap_err();
        assert!(matches!(err, Error::InternalConsistencyFault(_)));
    }

    #[test]
    fn test_struct_declaration() {
        let ty = WdlType::record(
            "Sample",
            [("id", WdlType::String), ("reads", WdlType::array(WdlType::File, true))],
        );
        assert_eq!(
            struct_declaration("Sample", &ty).unwrap(),
            "struct Sample {\n  String id\n  Array[File]+ reads\n}\n"
        );
        assert!(struct_declaration("N", &WdlType::Int).is_err());
    }
}
