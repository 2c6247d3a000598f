// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Default values for stub outputs.

use flowport_ir::{WdlType, WdlValue};

use crate::error::{Error, Result};

/// File name used wherever a `File` value has to be made up.
pub const PLACEHOLDER_FILE: &str = "dummy.txt";

/// A well-typed literal for `ty`.
///
/// Optional types get a value of the inner type, never `None`. Maps get one
/// entry because the grammar has no empty map literal. Non-empty arrays get
/// one element. `Directory` and `Object` have no default.
pub fn synthesize_default_value(ty: &WdlType) -> Result<WdlValue> {
    let value = match ty {
        WdlType::Boolean => WdlValue::Boolean(true),
        WdlType::Int => WdlValue::Int(0),
        WdlType::Float => WdlValue::Float(0.0),
        WdlType::String => WdlValue::String(String::new()),
        WdlType::File => WdlValue::File(PLACEHOLDER_FILE.to_string()),
        WdlType::Optional { inner } => synthesize_default_value(inner)?,
        WdlType::Map { key, value } => WdlValue::Map(vec![(
            synthesize_default_value(key)?,
            synthesize_default_value(value)?,
        )]),
        WdlType::Array { item, non_empty } => {
            // Synthesized even when unused so that `Array[Directory]` fails too.
            let element = synthesize_default_value(item)?;
            if *non_empty {
                WdlValue::Array(vec![element])
            } else {
                WdlValue::Array(Vec::new())
            }
        }
        WdlType::Pair { left, right } => WdlValue::Pair(
            Box::new(synthesize_default_value(left)?),
            Box::new(synthesize_default_value(right)?),
        ),
        WdlType::Struct { name, fields } => WdlValue::Struct {
            name: name.clone(),
            fields: fields
                .iter()
                .map(|(field, t)| Ok((field.clone(), synthesize_default_value(t)?)))
                .collect::<Result<_>>()?,
        },
        WdlType::Directory | WdlType::Object => {
            return Err(Error::UnsupportedType(ty.to_source()));
        }
    };
    Ok(value)
}
