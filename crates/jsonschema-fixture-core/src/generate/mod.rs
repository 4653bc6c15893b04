//! Random value generation from a canonical schema.
//!
//! For each node the generator:
//!
//! 1. resolves `oneOf` by picking a branch uniformly and merging it into the
//!    node (the merged node lives only for this call)
//! 2. returns `null` when no type is left
//! 3. returns a uniformly chosen `enum` literal if the node carries one; only
//!    literals whose JSON type is one of the node's types are eligible
//! 4. otherwise picks one of the node's types uniformly and dispatches to the
//!    rule for that type
//!
//! Contradictions degrade to `null` unless [`GenerateOptions::strict`] is set.
//! Inverted ranges (`lo > hi`) collapse to their lower bound.

pub mod formats;
pub mod pattern;

use std::borrow::Cow;

use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::{Map, Number, Value};

use crate::config::GenerateOptions;
use crate::error::GenerateError;
use crate::merge::merge;
use crate::schema::{Items, Schema, SchemaType};
use crate::schema_utils::{build_path, deep_equal};

use formats::Format;
use pattern::PatternSynthesizer;

/// Characters used for strings with no pattern or format.
const STRING_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_ ";

/// Draws per element before a `uniqueItems` array accepts a duplicate.
const UNIQUE_ATTEMPTS: usize = 16;

/// Largest magnitude at which every integer is exactly representable in `f64`.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Samples values from canonical schemas.
///
/// Holds the random source and a cache of compiled patterns; the schema tree
/// itself is only ever borrowed.
pub struct Generator<'a, R: Rng> {
    rng: &'a mut R,
    options: &'a GenerateOptions,
    patterns: PatternSynthesizer,
}

impl<'a, R: Rng> Generator<'a, R> {
    pub fn new(rng: &'a mut R, options: &'a GenerateOptions) -> Self {
        Self {
            rng,
            options,
            patterns: PatternSynthesizer::new(options.default_max),
        }
    }

    /// Generate one value conforming to `schema`.
    pub fn generate(&mut self, schema: &Schema) -> Result<Value, GenerateError> {
        self.generate_at(schema, "#")
    }

    fn generate_at(&mut self, schema: &Schema, path: &str) -> Result<Value, GenerateError> {
        let schema = self.resolve_one_of(schema, path);

        if schema.types.is_empty() {
            if self.options.strict {
                return Err(GenerateError::EmptyType {
                    path: path.to_string(),
                });
            }
            tracing::debug!(path, "no type satisfies schema, generating null");
            return Ok(Value::Null);
        }

        if let Some(values) = &schema.enum_values {
            let admitted: Vec<&Value> = values
                .iter()
                .filter(|value| schema.types.iter().any(|ty| ty.matches(value)))
                .collect();
            return match admitted.choose(self.rng) {
                Some(value) => Ok((*value).clone()),
                None if self.options.strict => Err(GenerateError::EmptyEnum {
                    path: path.to_string(),
                }),
                None => Ok(Value::Null),
            };
        }

        let Some(&ty) = schema.types.choose(self.rng) else {
            return Ok(Value::Null);
        };

        match ty {
            SchemaType::Null => Ok(Value::Null),
            SchemaType::Boolean => Ok(Value::Bool(self.rng.gen_bool(0.5))),
            SchemaType::Integer => Ok(number_value(self.gen_multiple(&schema))),
            SchemaType::Number => Ok(self.gen_number(&schema)),
            SchemaType::String => self.gen_string(&schema, path).map(Value::String),
            SchemaType::Array => self.gen_array(&schema, path),
            SchemaType::Object => self.gen_object(&schema, path),
        }
    }

    /// Replace `oneOf` by one uniformly chosen branch merged into the rest of
    /// the node. Repeats while the chosen branch has its own `oneOf`.
    fn resolve_one_of<'s>(&mut self, schema: &'s Schema, path: &str) -> Cow<'s, Schema> {
        if schema.one_of.is_empty() {
            return Cow::Borrowed(schema);
        }
        let mut resolved = schema.clone();
        while !resolved.one_of.is_empty() {
            let branches = std::mem::take(&mut resolved.one_of);
            let index = self.rng.gen_range(0..branches.len());
            tracing::debug!(path, branch = index, of = branches.len(), "resolved oneOf");
            resolved = merge(&resolved, &branches[index]);
        }
        Cow::Owned(resolved)
    }

    // -----------------------------------------------------------------------
    // Numbers
    // -----------------------------------------------------------------------

    /// A multiple of `multipleOf` inside `[minimum, maximum]`. When no multiple
    /// fits, the smallest multiple at or above `minimum`.
    fn gen_multiple(&mut self, schema: &Schema) -> f64 {
        let step = schema.multiple_of;
        let lo = (schema.minimum / step).ceil();
        let hi = (schema.maximum / step).floor();
        if !lo.is_finite() {
            return 0.0;
        }
        let lo = lo.clamp(-MAX_SAFE_INTEGER, MAX_SAFE_INTEGER) as i64;
        let hi = if hi.is_finite() {
            hi.clamp(-MAX_SAFE_INTEGER, MAX_SAFE_INTEGER) as i64
        } else {
            lo
        };
        self.random_int(lo, hi) as f64 * step
    }

    /// A multiple plus a random fraction of at most one, never past `maximum`.
    fn gen_number(&mut self, schema: &Schema) -> Value {
        let base = self.gen_multiple(schema);
        let span = (schema.maximum - base).min(1.0);
        let value = if span > 0.0 {
            base + self.rng.gen::<f64>() * span
        } else {
            base
        };
        Number::from_f64(value).map_or(Value::Null, Value::Number)
    }

    fn random_int(&mut self, lo: i64, hi: i64) -> i64 {
        if lo >= hi {
            lo
        } else {
            self.rng.gen_range(lo..=hi)
        }
    }

    fn random_count(&mut self, lo: u64, hi: u64) -> usize {
        let count = if lo >= hi {
            lo
        } else {
            self.rng.gen_range(lo..=hi)
        };
        usize::try_from(count).unwrap_or(usize::MAX)
    }

    // -----------------------------------------------------------------------
    // Strings
    // -----------------------------------------------------------------------

    fn gen_string(&mut self, schema: &Schema, path: &str) -> Result<String, GenerateError> {
        if let Some(pattern) = &schema.pattern {
            match self.patterns.synthesize(pattern, self.rng) {
                Ok(s) => return Ok(s),
                Err(e) if self.options.strict => {
                    return Err(GenerateError::InvalidPattern {
                        path: path.to_string(),
                        pattern: pattern.clone(),
                        message: e.to_string(),
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        path,
                        pattern = pattern.as_str(),
                        error = %e,
                        "cannot synthesize pattern, ignoring it"
                    );
                }
            }
        }

        if let Some(name) = &schema.format {
            if let Some(s) = Format::parse(name).synthesize(self.rng, self.options.default_max) {
                return Ok(s);
            }
            tracing::debug!(path, format = name.as_str(), "unknown format, generating plain string");
        }

        let lo = if schema.max_length >= 1 {
            schema.min_length.max(1)
        } else {
            schema.min_length
        };
        let len = self.random_count(lo, schema.max_length);
        Ok((0..len)
            .map(|_| STRING_CHARS[self.rng.gen_range(0..STRING_CHARS.len())] as char)
            .collect())
    }

    // -----------------------------------------------------------------------
    // Arrays
    // -----------------------------------------------------------------------

    fn gen_array(&mut self, schema: &Schema, path: &str) -> Result<Value, GenerateError> {
        let mut elements = Vec::new();

        match &schema.items {
            Items::Tuple(tuple) => {
                let upper = schema.max_items.min(tuple.len() as u64);
                let count = self.random_count(schema.min_items, upper).min(tuple.len());
                for (index, item) in tuple.iter().take(count).enumerate() {
                    let item_path = build_path(path, &["items", &index.to_string()]);
                    let value = self.gen_element(item, &item_path, &elements, schema.unique_items)?;
                    elements.push(value);
                }
                let min_items = usize::try_from(schema.min_items).unwrap_or(usize::MAX);
                while elements.len() < min_items {
                    let value = match schema.additional_items.as_schema() {
                        Some(extra) => {
                            let item_path = build_path(path, &["additionalItems"]);
                            self.gen_element(extra, &item_path, &elements, schema.unique_items)?
                        }
                        None => Value::Null,
                    };
                    elements.push(value);
                }
            }
            Items::List(item) => {
                let count = self.random_count(schema.min_items, schema.max_items);
                let item_path = build_path(path, &["items"]);
                for _ in 0..count {
                    let value = self.gen_element(item, &item_path, &elements, schema.unique_items)?;
                    elements.push(value);
                }
            }
        }

        Ok(Value::Array(elements))
    }

    /// Generate one element, redrawing a bounded number of times when the
    /// array must be unique. Keeps the last draw if every attempt collides.
    fn gen_element(
        &mut self,
        item: &Schema,
        path: &str,
        existing: &[Value],
        unique: bool,
    ) -> Result<Value, GenerateError> {
        let mut value = self.generate_at(item, path)?;
        if !unique {
            return Ok(value);
        }
        for _ in 1..UNIQUE_ATTEMPTS {
            if !existing.iter().any(|e| deep_equal(e, &value)) {
                return Ok(value);
            }
            value = self.generate_at(item, path)?;
        }
        if existing.iter().any(|e| deep_equal(e, &value)) {
            tracing::debug!(path, "could not draw a unique element, keeping duplicate");
        }
        Ok(value)
    }

    // -----------------------------------------------------------------------
    // Objects
    // -----------------------------------------------------------------------

    fn gen_object(&mut self, schema: &Schema, path: &str) -> Result<Value, GenerateError> {
        let mut object = Map::new();

        // Undeclared required names fall back to additionalProperties.
        let fallback = match schema.additional_properties.as_schema() {
            Some(extra) => Cow::Borrowed(extra),
            None => Cow::Owned(Schema::with_defaults(self.options.default_max)),
        };

        for name in &schema.required {
            let child = schema.properties.get(name).unwrap_or(&*fallback);
            let child_path = build_path(path, &["properties", name]);
            let value = self.generate_at(child, &child_path)?;
            object.insert(name.clone(), value);
        }

        let remaining: Vec<&String> = schema
            .properties
            .keys()
            .filter(|name| !object.contains_key(*name))
            .collect();
        let required = object.len() as u64;
        let lo = schema.min_properties.max(required);
        let hi = schema
            .max_properties
            .min(required.saturating_add(remaining.len() as u64));
        let extra = self
            .random_count(lo, hi)
            .saturating_sub(object.len());

        let chosen: Vec<&String> = remaining
            .choose_multiple(self.rng, extra)
            .copied()
            .collect();
        for name in chosen {
            let child_path = build_path(path, &["properties", name]);
            let value = self.generate_at(&schema.properties[name], &child_path)?;
            object.insert(name.clone(), value);
        }

        Ok(Value::Object(object))
    }
}

/// Integral values become JSON integers; everything else a float. Non-finite
/// values have no JSON representation and become `null`.
fn number_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() <= MAX_SAFE_INTEGER {
        Value::from(value as i64)
    } else {
        Number::from_f64(value).map_or(Value::Null, Value::Number)
    }
}
