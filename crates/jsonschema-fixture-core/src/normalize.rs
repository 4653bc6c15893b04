//! Schema normalization.
//!
//! Rewrites a raw JSON Schema into a canonical [`Schema`] tree:
//!
//! 1. scalar `type` lifted to a sequence; `number` implies `integer`
//! 2. `exclusiveMaximum` / `exclusiveMinimum` folded into `maximum` / `minimum`
//! 3. `additionalProperties: true` becomes the unconstrained schema
//! 4. nested schemas normalized recursively
//! 5. remaining keywords defaulted
//! 6. `allOf` removed by left-folding [`merge`] over its branches
//!
//! Normalization is total: malformed keyword values are skipped and fall back
//! to their defaults instead of failing. `oneOf` is normalized but never
//! flattened; branches are resolved at generation time.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::config::GenerateOptions;
use crate::merge::merge;
use crate::schema::{AdditionalItems, AdditionalProperties, Items, Schema, SchemaType};
use crate::schema_utils::deep_equal;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Normalize a raw schema and everything nested inside it.
///
/// Boolean schemas are accepted: `true` is the unconstrained schema, `false`
/// is a node with no acceptable type. Any other non-object value is treated
/// like `{}`.
pub fn normalize(raw: &Value, options: &GenerateOptions) -> Schema {
    match raw {
        Value::Object(obj) => normalize_object(obj, options),
        Value::Bool(false) => {
            let mut schema = Schema::with_defaults(options.default_max);
            schema.types.clear();
            schema
        }
        _ => Schema::with_defaults(options.default_max),
    }
}

// ---------------------------------------------------------------------------
// Object schemas
// ---------------------------------------------------------------------------

fn normalize_object(obj: &Map<String, Value>, options: &GenerateOptions) -> Schema {
    let defaults = Schema::with_defaults(options.default_max);

    let schema = Schema {
        types: normalize_types(obj.get("type")),
        multiple_of: normalize_multiple_of(obj.get("multipleOf")),
        maximum: upper_bound(obj, defaults.maximum),
        minimum: lower_bound(obj, defaults.minimum),
        max_length: count_field(obj, "maxLength").unwrap_or(defaults.max_length),
        min_length: count_field(obj, "minLength").unwrap_or(defaults.min_length),
        pattern: string_field(obj, "pattern"),
        format: string_field(obj, "format"),
        items: normalize_items(obj.get("items"), options),
        additional_items: normalize_additional_items(obj.get("additionalItems"), options),
        max_items: count_field(obj, "maxItems").unwrap_or(defaults.max_items),
        min_items: count_field(obj, "minItems").unwrap_or(defaults.min_items),
        unique_items: obj
            .get("uniqueItems")
            .and_then(Value::as_bool)
            .unwrap_or(defaults.unique_items),
        properties: normalize_schema_map(obj.get("properties"), options),
        pattern_properties: normalize_schema_map(obj.get("patternProperties"), options),
        additional_properties: normalize_additional_properties(
            obj.get("additionalProperties"),
            options,
        ),
        max_properties: count_field(obj, "maxProperties").unwrap_or(defaults.max_properties),
        min_properties: count_field(obj, "minProperties").unwrap_or(defaults.min_properties),
        required: normalize_required(obj.get("required")),
        enum_values: normalize_enum(obj.get("enum"), obj.get("const")),
        one_of: match obj.get("oneOf") {
            Some(Value::Array(branches)) => {
                branches.iter().map(|b| normalize(b, options)).collect()
            }
            _ => Vec::new(),
        },
    };

    // allOf: fold every branch into the schema-so-far.
    match obj.get("allOf") {
        Some(Value::Array(branches)) => branches
            .iter()
            .map(|b| normalize(b, options))
            .fold(schema, |acc, branch| merge(&acc, &branch)),
        _ => schema,
    }
}

// ---------------------------------------------------------------------------
// Keyword helpers
// ---------------------------------------------------------------------------

/// Lift `type` to a duplicate-free sequence. Absent means every type.
fn normalize_types(value: Option<&Value>) -> Vec<SchemaType> {
    let names: Vec<&str> = match value {
        None => return SchemaType::ALL.to_vec(),
        Some(Value::String(name)) => vec![name.as_str()],
        Some(Value::Array(names)) => names.iter().filter_map(Value::as_str).collect(),
        Some(other) => {
            tracing::debug!(value = %other, "ignoring malformed `type`");
            return SchemaType::ALL.to_vec();
        }
    };

    let mut types = Vec::with_capacity(names.len() + 1);
    for name in names {
        match SchemaType::parse(name) {
            Some(ty) if !types.contains(&ty) => types.push(ty),
            Some(_) => {}
            None => tracing::debug!(name, "skipping unknown type name"),
        }
    }
    // Every integer is a number.
    if types.contains(&SchemaType::Number) && !types.contains(&SchemaType::Integer) {
        types.push(SchemaType::Integer);
    }
    types
}

fn normalize_multiple_of(value: Option<&Value>) -> f64 {
    match value.and_then(Value::as_f64) {
        Some(step) if step.is_finite() && step > 0.0 => step,
        Some(step) => {
            tracing::debug!(step, "ignoring non-positive `multipleOf`");
            1.0
        }
        None => 1.0,
    }
}

/// `maximum` with `exclusiveMaximum` folded in.
///
/// Draft-4 boolean form shifts the bound by one. Draft-6 numeric form is the
/// bound itself, shifted by one, and tightens any declared `maximum`.
fn upper_bound(obj: &Map<String, Value>, default: f64) -> f64 {
    let declared = obj.get("maximum").and_then(Value::as_f64);
    match obj.get("exclusiveMaximum") {
        Some(Value::Bool(true)) => declared.unwrap_or(default) - 1.0,
        Some(Value::Number(n)) => {
            let exclusive = n.as_f64().unwrap_or(default) - 1.0;
            declared.map_or(exclusive, |max| max.min(exclusive))
        }
        _ => declared.unwrap_or(default),
    }
}

/// `minimum` with `exclusiveMinimum` folded in.
fn lower_bound(obj: &Map<String, Value>, default: f64) -> f64 {
    let declared = obj.get("minimum").and_then(Value::as_f64);
    match obj.get("exclusiveMinimum") {
        Some(Value::Bool(true)) => declared.unwrap_or(default) + 1.0,
        Some(Value::Number(n)) => {
            let exclusive = n.as_f64().unwrap_or(default) + 1.0;
            declared.map_or(exclusive, |min| min.max(exclusive))
        }
        _ => declared.unwrap_or(default),
    }
}

/// Non-negative count keywords (`maxLength`, `minItems`, ...). Accepts `5.0`.
fn count_field(obj: &Map<String, Value>, key: &str) -> Option<u64> {
    let value = obj.get(key)?;
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|n| n.is_finite() && *n >= 0.0)
            .map(|n| n.floor() as u64)
    })
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(String::from)
}

/// Object `items` is list form, array `items` is tuple form.
fn normalize_items(value: Option<&Value>, options: &GenerateOptions) -> Items {
    match value {
        Some(Value::Array(tuple)) => {
            Items::Tuple(tuple.iter().map(|item| normalize(item, options)).collect())
        }
        Some(item @ (Value::Object(_) | Value::Bool(_))) => {
            Items::List(Box::new(normalize(item, options)))
        }
        _ => Items::Tuple(Vec::new()),
    }
}

fn normalize_additional_items(value: Option<&Value>, options: &GenerateOptions) -> AdditionalItems {
    match value {
        Some(Value::Bool(allowed)) => AdditionalItems::Allowed(*allowed),
        Some(schema @ Value::Object(_)) => {
            AdditionalItems::Schema(Box::new(normalize(schema, options)))
        }
        _ => AdditionalItems::Allowed(true),
    }
}

fn normalize_additional_properties(
    value: Option<&Value>,
    options: &GenerateOptions,
) -> AdditionalProperties {
    match value {
        Some(Value::Bool(false)) => AdditionalProperties::Forbidden,
        Some(Value::Object(obj)) if !obj.is_empty() => {
            AdditionalProperties::Schema(Box::new(normalize_object(obj, options)))
        }
        _ => AdditionalProperties::Unconstrained,
    }
}

fn normalize_schema_map(value: Option<&Value>, options: &GenerateOptions) -> BTreeMap<String, Schema> {
    match value {
        Some(Value::Object(map)) => map
            .iter()
            .map(|(name, child)| (name.clone(), normalize(child, options)))
            .collect(),
        _ => BTreeMap::new(),
    }
}

fn normalize_required(value: Option<&Value>) -> Vec<String> {
    let mut required: Vec<String> = Vec::new();
    if let Some(Value::Array(names)) = value {
        for name in names.iter().filter_map(Value::as_str) {
            if !required.iter().any(|r| r == name) {
                required.push(name.to_string());
            }
        }
    }
    required
}

/// `enum`, with `const` treated as a one-element enum intersected into it.
fn normalize_enum(values: Option<&Value>, constant: Option<&Value>) -> Option<Vec<Value>> {
    let values = match values {
        Some(Value::Array(values)) => Some(values.clone()),
        _ => None,
    };
    match (values, constant) {
        (Some(values), Some(c)) => Some(values.into_iter().filter(|v| deep_equal(v, c)).collect()),
        (None, Some(c)) => Some(vec![c.clone()]),
        (values, None) => values,
    }
}
