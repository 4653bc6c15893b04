//! Schema conjunction (`allOf` merge).
//!
//! [`merge`] combines two canonical schemas into one whose instances satisfy
//! both. Constraints tighten (never loosen), types narrow by intersection,
//! `required` grows by union, and disjunctions (`oneOf`) multiply out.
//!
//! Both inputs must already be normalized. The result is a fresh tree; neither
//! input is modified. A contradictory pair is not rejected: it produces a node
//! whose `type` (or `enum`) is empty, and the generator decides what to do
//! with it.

use std::collections::BTreeMap;

use crate::schema::{AdditionalItems, AdditionalProperties, Items, Schema, SchemaType};
use crate::schema_utils::deep_equal;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Merge `source` into `dest`, returning their conjunction.
pub fn merge(dest: &Schema, source: &Schema) -> Schema {
    let (items, additional_items) = merge_items(dest, source);

    Schema {
        types: intersect_types(&dest.types, &source.types),
        multiple_of: dest.multiple_of * source.multiple_of,
        maximum: dest.maximum.min(source.maximum),
        minimum: dest.minimum.max(source.minimum),
        max_length: dest.max_length.min(source.max_length),
        min_length: dest.min_length.max(source.min_length),
        pattern: merge_patterns(dest.pattern.as_deref(), source.pattern.as_deref()),
        format: merge_formats(dest.format.as_deref(), source.format.as_deref()),
        items,
        additional_items,
        max_items: dest.max_items.min(source.max_items),
        min_items: dest.min_items.max(source.min_items),
        unique_items: dest.unique_items || source.unique_items,
        properties: merge_properties(dest, source),
        pattern_properties: merge_schema_maps(&dest.pattern_properties, &source.pattern_properties),
        additional_properties: merge_additional_properties(
            &dest.additional_properties,
            &source.additional_properties,
        ),
        max_properties: dest.max_properties.min(source.max_properties),
        min_properties: dest.min_properties.max(source.min_properties),
        required: union_required(&dest.required, &source.required),
        enum_values: intersect_enums(dest.enum_values.as_deref(), source.enum_values.as_deref()),
        one_of: cross_one_of(&dest.one_of, &source.one_of),
    }
}

// ---------------------------------------------------------------------------
// Scalar keywords
// ---------------------------------------------------------------------------

/// Types present on both sides, in `dest` order.
fn intersect_types(dest: &[SchemaType], source: &[SchemaType]) -> Vec<SchemaType> {
    dest.iter()
        .copied()
        .filter(|ty| source.contains(ty))
        .collect()
}

/// Both patterns must match, approximated by matching them back to back.
///
/// Only the outer anchors survive: `dest`'s `^` and `source`'s `$`. Anchors
/// left in the middle would make the combined pattern unsatisfiable.
fn merge_patterns(dest: Option<&str>, source: Option<&str>) -> Option<String> {
    match (dest, source) {
        (Some(d), Some(s)) if d == s => Some(d.to_string()),
        (Some(d), Some(s)) => {
            let (start, d, _) = split_anchors(d);
            let (_, s, end) = split_anchors(s);
            Some(format!(
                "{}(?:{d})(?:{s}){}",
                if start { "^" } else { "" },
                if end { "$" } else { "" }
            ))
        }
        (Some(p), None) | (None, Some(p)) => Some(p.to_string()),
        (None, None) => None,
    }
}

/// Strip a leading `^` and an unescaped trailing `$`.
fn split_anchors(pattern: &str) -> (bool, &str, bool) {
    let (start, rest) = match pattern.strip_prefix('^') {
        Some(rest) => (true, rest),
        None => (false, pattern),
    };
    match rest.strip_suffix('$') {
        Some(body) if !body.ends_with('\\') => (start, body, true),
        _ => (start, rest, false),
    }
}

/// Conflicting formats cancel out.
fn merge_formats(dest: Option<&str>, source: Option<&str>) -> Option<String> {
    match (dest, source) {
        (Some(d), Some(s)) if d == s => Some(d.to_string()),
        (Some(d), Some(s)) => {
            tracing::debug!(dest = d, source = s, "dropping conflicting formats");
            None
        }
        (Some(f), None) | (None, Some(f)) => Some(f.to_string()),
        (None, None) => None,
    }
}

fn union_required(dest: &[String], source: &[String]) -> Vec<String> {
    let mut required = dest.to_vec();
    for name in source {
        if !required.contains(name) {
            required.push(name.clone());
        }
    }
    required
}

/// Keep the `dest` literals that also appear in `source`.
fn intersect_enums(
    dest: Option<&[serde_json::Value]>,
    source: Option<&[serde_json::Value]>,
) -> Option<Vec<serde_json::Value>> {
    match (dest, source) {
        (Some(d), Some(s)) => Some(
            d.iter()
                .filter(|v| s.iter().any(|w| deep_equal(v, w)))
                .cloned()
                .collect(),
        ),
        (Some(values), None) | (None, Some(values)) => Some(values.to_vec()),
        (None, None) => None,
    }
}

/// `(a | b) & (c | d)` = `(a & c) | (a & d) | (b & c) | (b & d)`.
fn cross_one_of(dest: &[Schema], source: &[Schema]) -> Vec<Schema> {
    match (dest.is_empty(), source.is_empty()) {
        (true, _) => source.to_vec(),
        (false, true) => dest.to_vec(),
        (false, false) => dest
            .iter()
            .flat_map(|d| source.iter().map(move |s| merge(d, s)))
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Arrays
// ---------------------------------------------------------------------------

/// Merge `items` and `additionalItems` together, since each side's list schema
/// also governs the positions past the other side's tuple.
fn merge_items(dest: &Schema, source: &Schema) -> (Items, AdditionalItems) {
    match (&dest.items, &source.items) {
        (Items::List(d), Items::List(s)) => (
            Items::List(Box::new(merge(d, s))),
            merge_additional_items(&dest.additional_items, &source.additional_items),
        ),
        (Items::Tuple(tuple), Items::List(list)) => {
            merge_tuple_with_list(tuple, &dest.additional_items, list, &source.additional_items)
        }
        (Items::List(list), Items::Tuple(tuple)) => {
            merge_tuple_with_list(tuple, &source.additional_items, list, &dest.additional_items)
        }
        (Items::Tuple(d), Items::Tuple(s)) => {
            let len = d.len().max(s.len());
            let d = pad_tuple(d, &dest.additional_items, len);
            let s = pad_tuple(s, &source.additional_items, len);
            let merged = d.iter().zip(&s).map(|(d, s)| merge(d, s)).collect();
            (
                Items::Tuple(merged),
                merge_additional_items(&dest.additional_items, &source.additional_items),
            )
        }
    }
}

fn merge_tuple_with_list(
    tuple: &[Schema],
    tuple_additional: &AdditionalItems,
    list: &Schema,
    list_additional: &AdditionalItems,
) -> (Items, AdditionalItems) {
    // An empty tuple that still admits elements only contributes its
    // additionalItems schema, so the list form survives.
    if tuple.is_empty() && *tuple_additional != AdditionalItems::Allowed(false) {
        let element = match tuple_additional.as_schema() {
            Some(extra) => merge(list, extra),
            None => list.clone(),
        };
        return (
            Items::List(Box::new(element)),
            merge_additional_items(tuple_additional, list_additional),
        );
    }

    let merged = tuple.iter().map(|item| merge(item, list)).collect();
    let list_as_additional = AdditionalItems::Schema(Box::new(list.clone()));
    (
        Items::Tuple(merged),
        merge_additional_items(tuple_additional, &list_as_additional),
    )
}

/// Extend a tuple to `len` with its own `additionalItems` schema, or the
/// unconstrained schema when `additionalItems` is a boolean.
fn pad_tuple(tuple: &[Schema], additional: &AdditionalItems, len: usize) -> Vec<Schema> {
    let mut padded = tuple.to_vec();
    if padded.len() < len {
        let filler = additional.as_schema().cloned().unwrap_or_else(Schema::any);
        padded.resize(len, filler);
    }
    padded
}

fn merge_additional_items(dest: &AdditionalItems, source: &AdditionalItems) -> AdditionalItems {
    match (dest, source) {
        (AdditionalItems::Schema(d), AdditionalItems::Schema(s)) => {
            AdditionalItems::Schema(Box::new(merge(d, s)))
        }
        (AdditionalItems::Schema(extra), AdditionalItems::Allowed(true))
        | (AdditionalItems::Allowed(true), AdditionalItems::Schema(extra)) => {
            AdditionalItems::Schema(extra.clone())
        }
        (AdditionalItems::Allowed(d), AdditionalItems::Allowed(s)) => {
            AdditionalItems::Allowed(*d && *s)
        }
        _ => AdditionalItems::Allowed(false),
    }
}

// ---------------------------------------------------------------------------
// Objects
// ---------------------------------------------------------------------------

/// Shared names merge directly. A name declared on one side only is still
/// constrained by the other side's `additionalProperties`.
fn merge_properties(dest: &Schema, source: &Schema) -> BTreeMap<String, Schema> {
    let mut merged = BTreeMap::new();

    for (name, d) in &dest.properties {
        let child = match source.properties.get(name) {
            Some(s) => merge(d, s),
            None => constrain_undeclared(d, &source.additional_properties),
        };
        merged.insert(name.clone(), child);
    }
    for (name, s) in &source.properties {
        if !dest.properties.contains_key(name) {
            merged.insert(
                name.clone(),
                constrain_undeclared(s, &dest.additional_properties),
            );
        }
    }
    merged
}

/// A forbidden catch-all contributes no constraint here; the property is kept
/// with its declared schema.
fn constrain_undeclared(child: &Schema, catch_all: &AdditionalProperties) -> Schema {
    match catch_all.as_schema() {
        Some(extra) => merge(child, extra),
        None => child.clone(),
    }
}

fn merge_schema_maps(
    dest: &BTreeMap<String, Schema>,
    source: &BTreeMap<String, Schema>,
) -> BTreeMap<String, Schema> {
    let mut merged = dest.clone();
    for (key, s) in source {
        let child = match dest.get(key) {
            Some(d) => merge(d, s),
            None => s.clone(),
        };
        merged.insert(key.clone(), child);
    }
    merged
}

fn merge_additional_properties(
    dest: &AdditionalProperties,
    source: &AdditionalProperties,
) -> AdditionalProperties {
    match (dest, source) {
        (AdditionalProperties::Forbidden, _) | (_, AdditionalProperties::Forbidden) => {
            AdditionalProperties::Forbidden
        }
        (AdditionalProperties::Schema(d), AdditionalProperties::Schema(s)) => {
            AdditionalProperties::Schema(Box::new(merge(d, s)))
        }
        (AdditionalProperties::Schema(extra), AdditionalProperties::Unconstrained)
        | (AdditionalProperties::Unconstrained, AdditionalProperties::Schema(extra)) => {
            AdditionalProperties::Schema(extra.clone())
        }
        (AdditionalProperties::Unconstrained, AdditionalProperties::Unconstrained) => {
            AdditionalProperties::Unconstrained
        }
    }
}
