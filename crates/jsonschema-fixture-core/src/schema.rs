//! Canonical schema model.
//!
//! A [`Schema`] is the fully-defaulted form of one JSON Schema node: every
//! constraint keyword the engine understands carries an explicit value, and
//! every nested schema is itself canonical. The tree is produced by
//! [`crate::normalize`] and never mutated afterwards.
//!
//! The model serializes back to JSON Schema keywords, so a canonical tree can
//! be printed, stored, and normalized again without change.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use serde_json::Value;

/// The seven JSON Schema primitive type names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    Array,
    Boolean,
    Integer,
    Number,
    Null,
    Object,
    String,
}

impl SchemaType {
    /// Every type, in the order used when a schema leaves `type` out.
    pub const ALL: [SchemaType; 7] = [
        SchemaType::Array,
        SchemaType::Boolean,
        SchemaType::Integer,
        SchemaType::Number,
        SchemaType::Null,
        SchemaType::Object,
        SchemaType::String,
    ];

    /// Parse a JSON Schema type name. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "array" => Some(SchemaType::Array),
            "boolean" => Some(SchemaType::Boolean),
            "integer" => Some(SchemaType::Integer),
            "number" => Some(SchemaType::Number),
            "null" => Some(SchemaType::Null),
            "object" => Some(SchemaType::Object),
            "string" => Some(SchemaType::String),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SchemaType::Array => "array",
            SchemaType::Boolean => "boolean",
            SchemaType::Integer => "integer",
            SchemaType::Number => "number",
            SchemaType::Null => "null",
            SchemaType::Object => "object",
            SchemaType::String => "string",
        }
    }

    /// Whether `value` is an instance of this type.
    pub fn matches(self, value: &Value) -> bool {
        match self {
            SchemaType::Array => value.is_array(),
            SchemaType::Boolean => value.is_boolean(),
            SchemaType::Integer => value
                .as_f64()
                .is_some_and(|n| n.is_finite() && n.fract() == 0.0),
            SchemaType::Number => value.is_number(),
            SchemaType::Null => value.is_null(),
            SchemaType::Object => value.is_object(),
            SchemaType::String => value.is_string(),
        }
    }
}

impl std::fmt::Display for SchemaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Array `items`: one schema per position, or one schema for every element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Items {
    Tuple(Vec<Schema>),
    List(Box<Schema>),
}

/// Array `additionalItems`: elements past the end of a tuple.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AdditionalItems {
    Allowed(bool),
    Schema(Box<Schema>),
}

impl AdditionalItems {
    pub fn as_schema(&self) -> Option<&Schema> {
        match self {
            AdditionalItems::Schema(schema) => Some(schema),
            AdditionalItems::Allowed(_) => None,
        }
    }
}

/// Object `additionalProperties`.
///
/// `true`, an absent keyword, and `{}` all mean the unconstrained schema and
/// normalize to [`AdditionalProperties::Unconstrained`], which serializes as
/// `{}`. Keeping it a variant instead of a nested default node keeps the
/// canonical tree finite.
#[derive(Debug, Clone, PartialEq)]
pub enum AdditionalProperties {
    Unconstrained,
    Forbidden,
    Schema(Box<Schema>),
}

impl AdditionalProperties {
    pub fn as_schema(&self) -> Option<&Schema> {
        match self {
            AdditionalProperties::Schema(schema) => Some(schema),
            AdditionalProperties::Unconstrained | AdditionalProperties::Forbidden => None,
        }
    }
}

impl Serialize for AdditionalProperties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AdditionalProperties::Unconstrained => {
                serializer.collect_map(std::iter::empty::<(&str, &Value)>())
            }
            AdditionalProperties::Forbidden => serializer.serialize_bool(false),
            AdditionalProperties::Schema(schema) => schema.serialize(serializer),
        }
    }
}

/// One canonical schema node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Schema {
    /// Acceptable types. Empty means no value satisfies the node.
    #[serde(rename = "type")]
    pub types: Vec<SchemaType>,

    // --- numeric ---
    pub multiple_of: f64,
    pub maximum: f64,
    pub minimum: f64,

    // --- string ---
    pub max_length: u64,
    pub min_length: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    // --- array ---
    pub items: Items,
    pub additional_items: AdditionalItems,
    pub max_items: u64,
    pub min_items: u64,
    pub unique_items: bool,

    // --- object ---
    pub properties: BTreeMap<String, Schema>,
    pub pattern_properties: BTreeMap<String, Schema>,
    pub additional_properties: AdditionalProperties,
    /// `u64::MAX` means unbounded.
    pub max_properties: u64,
    pub min_properties: u64,
    pub required: Vec<String>,

    // --- composition ---
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    pub one_of: Vec<Schema>,
}

impl Schema {
    /// The canonical form of `{}` under the given default upper bound.
    pub fn with_defaults(default_max: u32) -> Self {
        let default_max = u64::from(default_max);
        Self {
            types: SchemaType::ALL.to_vec(),
            multiple_of: 1.0,
            maximum: default_max as f64,
            minimum: 0.0,
            max_length: default_max,
            min_length: 0,
            pattern: None,
            format: None,
            items: Items::Tuple(Vec::new()),
            additional_items: AdditionalItems::Allowed(true),
            max_items: default_max,
            min_items: 0,
            unique_items: false,
            properties: BTreeMap::new(),
            pattern_properties: BTreeMap::new(),
            additional_properties: AdditionalProperties::Unconstrained,
            max_properties: u64::MAX,
            min_properties: 0,
            required: Vec::new(),
            enum_values: None,
            one_of: Vec::new(),
        }
    }

    /// The schema with no constraints at all, including no implicit bounds.
    ///
    /// It is the identity of [`crate::merge`]: `merge(s, &Schema::any())`
    /// constrains nothing that `s` does not. Used to pad tuples and to stand in
    /// for a forbidden `additionalProperties` during merging. Its infinite
    /// bounds do not survive serialization, so it never appears in a
    /// canonical tree on its own.
    pub fn any() -> Self {
        Self {
            types: SchemaType::ALL.to_vec(),
            multiple_of: 1.0,
            maximum: f64::INFINITY,
            minimum: f64::NEG_INFINITY,
            max_length: u64::MAX,
            min_length: 0,
            pattern: None,
            format: None,
            items: Items::Tuple(Vec::new()),
            additional_items: AdditionalItems::Allowed(true),
            max_items: u64::MAX,
            min_items: 0,
            unique_items: false,
            properties: BTreeMap::new(),
            pattern_properties: BTreeMap::new(),
            additional_properties: AdditionalProperties::Unconstrained,
            max_properties: u64::MAX,
            min_properties: 0,
            required: Vec::new(),
            enum_values: None,
            one_of: Vec::new(),
        }
    }

    /// Whether the node can have any instance at all, judged by `type` and
    /// `enum` only.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty() || self.enum_values.as_ref().is_some_and(Vec::is_empty)
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
