use std::collections::{BTreeMap, BTreeSet};

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::types::Operation;

/// Key of the identifier field; its presence enables identifier path segments.
pub const ID_FIELD: &str = "id";

/// A single declared field of a resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Storage-facing name of the field (payload key, column name)
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub is_required: bool,
    /// Attributes the dispatcher does not interpret (type hints, labels, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    /// Declared type hint, if the document carries one.
    pub fn type_hint(&self) -> Option<&str> {
        self.extra.get("type").and_then(Value::as_str)
    }
}

/// Set of operations permitted on a resource.
///
/// Documents may spell it either as a list (`["C", "R"]`) or as a compact
/// string (`"CRUD"`); it always serializes as a list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationSet(BTreeSet<Operation>);

impl OperationSet {
    pub fn contains(&self, operation: Operation) -> bool {
        self.0.contains(&operation)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Operation> + '_ {
        self.0.iter().copied()
    }

    pub fn codes(&self) -> String {
        self.0.iter().map(Operation::code).collect()
    }
}

impl FromIterator<Operation> for OperationSet {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for OperationSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

impl<'de> Deserialize<'de> for OperationSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Compact(String),
            List(Vec<String>),
        }

        let codes: Vec<char> = match Raw::deserialize(deserializer)? {
            Raw::Compact(s) => s.chars().filter(|c| !c.is_whitespace()).collect(),
            Raw::List(items) => {
                let mut codes = Vec::with_capacity(items.len());
                for item in items {
                    let mut chars = item.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => codes.push(c),
                        _ => {
                            return Err(de::Error::custom(format!(
                                "invalid operation code {:?}",
                                item
                            )))
                        }
                    }
                }
                codes
            }
        };

        codes
            .into_iter()
            .map(|c| {
                Operation::from_code(c)
                    .ok_or_else(|| de::Error::custom(format!("invalid operation code {:?}", c)))
            })
            .collect()
    }
}

/// One node of a specification tree: an addressable resource type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceDefinition {
    #[serde(default)]
    pub fields: BTreeMap<String, FieldDescriptor>,
    #[serde(default)]
    pub operations: OperationSet,
    #[serde(
        default,
        deserialize_with = "deserialize_flag",
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub protected: bool,
    /// Nested resources keyed by path segment
    #[serde(default, rename = "paths", skip_serializing_if = "BTreeMap::is_empty")]
    pub children: BTreeMap<String, ResourceDefinition>,
    /// Attributes left for the data executor (e.g. `table`)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResourceDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_operations(mut self, operations: impl IntoIterator<Item = Operation>) -> Self {
        self.operations = operations.into_iter().collect();
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, field: FieldDescriptor) -> Self {
        self.fields.insert(key.into(), field);
        self
    }

    pub fn with_child(mut self, segment: impl Into<String>, child: ResourceDefinition) -> Self {
        self.children.insert(segment.into(), child);
        self
    }

    pub fn protected(mut self) -> Self {
        self.protected = true;
        self
    }

    pub fn child(&self, segment: &str) -> Option<&ResourceDefinition> {
        self.children.get(segment)
    }

    pub fn field(&self, key: &str) -> Option<&FieldDescriptor> {
        self.fields.get(key)
    }

    pub fn has_field(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// True when identifier path segments become `id` filters.
    pub fn has_identifier(&self) -> bool {
        self.has_field(ID_FIELD)
    }

    pub fn permits(&self, operation: Operation) -> bool {
        self.operations.contains(operation)
    }

    /// Storage name declared for a field key, falling back to the key itself.
    pub fn column_for<'a>(&'a self, key: &'a str) -> &'a str {
        match self.fields.get(key) {
            Some(field) if !field.name.is_empty() => &field.name,
            _ => key,
        }
    }

    /// Explicit `table` attribute, if the document declares one.
    pub fn table(&self) -> Option<&str> {
        self.extra.get("table").and_then(Value::as_str)
    }
}

/// Accepts `true`/`false`, `0`/`1` and `"true"`/`"1"`/`"yes"` for boolean flags.
fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Str(String),
        Null(()),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(i) => i != 0,
        Flag::Str(s) => matches!(s.to_ascii_lowercase().as_str(), "true" | "1" | "yes"),
        Flag::Null(()) => false,
    })
}
