// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Workflow-language types and literal values.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::Dialect;

// ============================================================================
// Types
// ============================================================================

/// Semantic type of a workflow variable, as produced by the front-end type checker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WdlType {
    Boolean,
    Int,
    Float,
    String,
    File,
    Directory,
    /// Untyped key/value object (draft-2 heritage).
    Object,
    Optional {
        inner: Box<WdlType>,
    },
    Array {
        item: Box<WdlType>,
        /// `Array[T]+`: guaranteed to hold at least one element.
        #[serde(default)]
        non_empty: bool,
    },
    Map {
        key: Box<WdlType>,
        value: Box<WdlType>,
    },
    Pair {
        left: Box<WdlType>,
        right: Box<WdlType>,
    },
    /// A named record type. Field order is declaration order.
    Struct {
        name: String,
        fields: IndexMap<String, WdlType>,
    },
}

impl WdlType {
    /// `T?`
    pub fn optional(inner: WdlType) -> Self {
        WdlType::Optional {
            inner: Box::new(inner),
        }
    }

    /// `Array[T]`, or `Array[T]+` when `non_empty`.
    pub fn array(item: WdlType, non_empty: bool) -> Self {
        WdlType::Array {
            item: Box::new(item),
            non_empty,
        }
    }

    /// `Map[K,V]`
    pub fn map(key: WdlType, value: WdlType) -> Self {
        WdlType::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// `Pair[L,R]`
    pub fn pair(left: WdlType, right: WdlType) -> Self {
        WdlType::Pair {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// A struct type with fields in the given order.
    pub fn record<I, S>(name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = (S, WdlType)>,
        S: Into<String>,
    {
        WdlType::Struct {
            name: name.into(),
            fields: fields.into_iter().map(|(k, t)| (k.into(), t)).collect(),
        }
    }

    /// Render the type as it is written in a declaration.
    pub fn to_source(&self) -> String {
        match self {
            WdlType::Boolean => "Boolean".to_string(),
            WdlType::Int => "Int".to_string(),
            WdlType::Float => "Float".to_string(),
            WdlType::String => "String".to_string(),
            WdlType::File => "File".to_string(),
            WdlType::Directory => "Directory".to_string(),
            WdlType::Object => "Object".to_string(),
            WdlType::Optional { inner } => format!("{}?", inner.to_source()),
            WdlType::Array { item, non_empty } => {
                let plus = if *non_empty { "+" } else { "" };
                format!("Array[{}]{}", item.to_source(), plus)
            }
            WdlType::Map { key, value } => {
                format!("Map[{},{}]", key.to_source(), value.to_source())
            }
            WdlType::Pair { left, right } => {
                format!("Pair[{},{}]", left.to_source(), right.to_source())
            }
            WdlType::Struct { name, .. } => name.clone(),
        }
    }

    /// Names of the struct types this type mentions directly or through
    /// its type parameters (not through struct fields).
    pub fn referenced_structs(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_structs(&mut out);
        out
    }

    fn collect_structs<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            WdlType::Optional { inner } => inner.collect_structs(out),
            WdlType::Array { item, .. } => item.collect_structs(out),
            WdlType::Map { key, value } => {
                key.collect_structs(out);
                value.collect_structs(out);
            }
            WdlType::Pair { left, right } => {
                left.collect_structs(out);
                right.collect_structs(out);
            }
            WdlType::Struct { name, .. } => out.push(name),
            _ => {}
        }
    }
}

impl fmt::Display for WdlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_source())
    }
}

// ============================================================================
// Values
// ============================================================================

/// A literal value that can be written back as source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum WdlValue {
    Boolean(bool),
    Int(i64),
    Float(f64),
    String(String),
    File(String),
    Array(Vec<WdlValue>),
    /// Entries in insertion order.
    Map(Vec<(WdlValue, WdlValue)>),
    Pair(Box<WdlValue>, Box<WdlValue>),
    Struct {
        name: String,
        fields: IndexMap<String, WdlValue>,
    },
}

impl WdlValue {
    /// Render the value as a literal expression in the given dialect.
    pub fn to_source(&self, dialect: Dialect) -> String {
        match self {
            WdlValue::Boolean(b) => b.to_string(),
            WdlValue::Int(i) => i.to_string(),
            WdlValue::Float(x) => format!("{:?}", x),
            WdlValue::String(s) | WdlValue::File(s) => quote(s),
            WdlValue::Array(items) => {
                let items: Vec<String> = items.iter().map(|v| v.to_source(dialect)).collect();
                format!("[{}]", items.join(", "))
            }
            WdlValue::Map(entries) => {
                let entries: Vec<String> = entries
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k.to_source(dialect), v.to_source(dialect)))
                    .collect();
                format!("{{{}}}", entries.join(", "))
            }
            WdlValue::Pair(l, r) => {
                format!("({}, {})", l.to_source(dialect), r.to_source(dialect))
            }
            WdlValue::Struct { name, fields } => {
                let fields: Vec<String> = fields
                    .iter()
                    .map(|(k, v)| format!("{}: {}", k, v.to_source(dialect)))
                    .collect();
                // Struct literals by name only exist in the development grammar;
                // 1.0 coerces an object literal to the declared struct type.
                let head = match dialect {
                    Dialect::Development => name.as_str(),
                    Dialect::Draft2 | Dialect::Draft3 | Dialect::V1_0 => "object",
                };
                format!("{} {{{}}}", head, fields.join(", "))
            }
        }
    }
}

/// Quote a string literal, escaping backslashes and double quotes.
fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
