//! Property-based tests for the merge operator and the normalizer.
//!
//! Invariants:
//! - every bound of `merge(a, b)` is at least as tight as the same bound on
//!   either side, and the merged `type`/`enum` are subsets of both sides;
//! - `normalize` is idempotent, including through serialization;
//! - values generated from a scalar schema with satisfiable bounds stay inside
//!   those bounds.

use jsonschema_fixture_core::{generate, merge, normalize, GenerateOptions};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::{json, Map, Value};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn arb_type_name() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("null"),
        Just("boolean"),
        Just("integer"),
        Just("number"),
        Just("string"),
        Just("array"),
        Just("object"),
    ]
}

/// A flat schema with a random subset of bound keywords.
fn arb_bounded_schema() -> impl Strategy<Value = Value> {
    (
        proptest::collection::vec(arb_type_name(), 0..4),
        proptest::option::of(-50i64..50),
        proptest::option::of(-50i64..50),
        proptest::option::of(0u64..20),
        proptest::option::of(0u64..20),
        proptest::option::of(0u64..8),
        proptest::option::of(0u64..8),
        proptest::option::of(proptest::collection::vec(0i64..6, 0..5)),
    )
        .prop_map(
            |(types, minimum, maximum, min_length, max_length, min_items, max_items, values)| {
                let mut obj = Map::new();
                if !types.is_empty() {
                    obj.insert("type".into(), json!(types));
                }
                let mut put = |key: &str, value: Option<Value>| {
                    if let Some(v) = value {
                        obj.insert(key.into(), v);
                    }
                };
                put("minimum", minimum.map(Value::from));
                put("maximum", maximum.map(Value::from));
                put("minLength", min_length.map(Value::from));
                put("maxLength", max_length.map(Value::from));
                put("minItems", min_items.map(Value::from));
                put("maxItems", max_items.map(Value::from));
                put("enum", values.map(|v| json!(v)));
                Value::Object(obj)
            },
        )
}

/// A small nested object schema built from bounded leaves.
fn arb_nested_schema() -> impl Strategy<Value = Value> {
    let leaf = arb_bounded_schema();
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            proptest::collection::btree_map("[a-z]{1,6}", inner.clone(), 0..4).prop_map(
                |props| {
                    let required: Vec<&String> = props.keys().take(1).collect();
                    json!({"type": "object", "properties": props, "required": required})
                }
            ),
            inner.clone().prop_map(|item| json!({"type": "array", "items": item})),
            proptest::collection::vec(inner.clone(), 1..3).prop_map(|all| json!({"allOf": all})),
            proptest::collection::vec(inner, 1..3).prop_map(|one| json!({"oneOf": one})),
        ]
    })
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn merge_bounds_are_sound(a in arb_bounded_schema(), b in arb_bounded_schema()) {
        let options = GenerateOptions::default();
        let a = normalize(&a, &options);
        let b = normalize(&b, &options);
        let m = merge(&a, &b);

        prop_assert!(m.maximum <= a.maximum && m.maximum <= b.maximum);
        prop_assert!(m.minimum >= a.minimum && m.minimum >= b.minimum);
        prop_assert!(m.max_length <= a.max_length && m.max_length <= b.max_length);
        prop_assert!(m.min_length >= a.min_length && m.min_length >= b.min_length);
        prop_assert!(m.max_items <= a.max_items && m.max_items <= b.max_items);
        prop_assert!(m.min_items >= a.min_items && m.min_items >= b.min_items);

        for ty in &m.types {
            prop_assert!(a.types.contains(ty) && b.types.contains(ty));
        }
        if let Some(values) = &m.enum_values {
            for v in values {
                let in_a = a.enum_values.as_ref().map_or(true, |e| e.contains(v));
                let in_b = b.enum_values.as_ref().map_or(true, |e| e.contains(v));
                prop_assert!(in_a && in_b);
            }
        }
    }

    #[test]
    fn merge_is_commutative_on_bounds(a in arb_bounded_schema(), b in arb_bounded_schema()) {
        let options = GenerateOptions::default();
        let a = normalize(&a, &options);
        let b = normalize(&b, &options);
        let ab = merge(&a, &b);
        let ba = merge(&b, &a);

        prop_assert_eq!(ab.maximum, ba.maximum);
        prop_assert_eq!(ab.minimum, ba.minimum);
        prop_assert_eq!(ab.max_length, ba.max_length);
        prop_assert_eq!(ab.min_items, ba.min_items);
    }

    #[test]
    fn normalize_is_idempotent(raw in arb_nested_schema()) {
        let options = GenerateOptions::default();
        let once = normalize(&raw, &options);
        let twice = normalize(&once.to_value(), &options);
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn generated_scalars_respect_bounds(
        lo in -100i64..100,
        width in 0i64..50,
        step in 1i64..5,
        seed in any::<u64>(),
    ) {
        let options = GenerateOptions::default();
        let hi = lo + width;
        let schema = normalize(
            &json!({"type": "integer", "minimum": lo, "maximum": hi, "multipleOf": step}),
            &options,
        );
        let first_multiple = lo + (step - lo.rem_euclid(step)) % step;
        let fits = first_multiple <= hi;
        let mut rng = StdRng::seed_from_u64(seed);
        let value = generate(&schema, &mut rng, &options).unwrap();
        let n = value.as_i64().unwrap();
        prop_assert_eq!(n.rem_euclid(step), 0);
        if fits {
            prop_assert!((lo..=hi).contains(&n), "{} outside [{}, {}]", n, lo, hi);
        }
    }

    #[test]
    fn generated_strings_respect_length(
        min in 0u64..10,
        extra in 0u64..10,
        seed in any::<u64>(),
    ) {
        let options = GenerateOptions::default();
        let max = min + extra;
        let schema = normalize(
            &json!({"type": "string", "minLength": min, "maxLength": max}),
            &options,
        );
        let mut rng = StdRng::seed_from_u64(seed);
        let value = generate(&schema, &mut rng, &options).unwrap();
        let len = value.as_str().unwrap().chars().count() as u64;
        prop_assert!(len >= min && len <= max);
    }

    #[test]
    fn generation_never_fails_leniently(raw in arb_nested_schema(), seed in any::<u64>()) {
        let options = GenerateOptions::default();
        let schema = normalize(&raw, &options);
        let mut rng = StdRng::seed_from_u64(seed);
        prop_assert!(generate(&schema, &mut rng, &options).is_ok());
    }
}
