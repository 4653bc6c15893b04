//! # jsonschema-fixture-core
//!
//! Generate synthetic values that conform to a JSON Schema.
//!
//! The engine works in three stages:
//!
//! 1. [`normalize`] rewrites a raw schema into a canonical [`Schema`] tree where
//!    every keyword carries an explicit value and `allOf` has been flattened.
//! 2. [`merge`] combines two canonical schemas into their conjunction. The
//!    normalizer uses it for `allOf`, the generator uses it to resolve `oneOf`.
//! 3. [`generate`] samples one random value from a canonical schema.
//!
//! ```
//! use jsonschema_fixture_core::{FixtureGenerator, GenerateOptions};
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "object",
//!     "properties": { "id": { "type": "integer", "minimum": 1 } },
//!     "required": ["id"]
//! });
//!
//! let fixtures = FixtureGenerator::new(&schema, GenerateOptions::default());
//! let value = fixtures.generate_seeded(7).unwrap();
//! assert!(value["id"].is_i64());
//! ```

pub mod config;
pub mod error;
pub mod generate;
pub mod merge;
pub mod normalize;
pub mod schema;
pub mod schema_utils;

pub use config::GenerateOptions;
pub use error::GenerateError;
pub use generate::Generator;
pub use merge::merge;
pub use normalize::normalize;
pub use schema::{AdditionalItems, AdditionalProperties, Items, Schema, SchemaType};
pub use schema_utils::build_path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;

/// Generate one value conforming to an already-normalized schema.
///
/// In the default mode this never fails; with [`GenerateOptions::strict`]
/// contradictory nodes are reported as [`GenerateError`]s.
pub fn generate<R: Rng>(
    schema: &Schema,
    rng: &mut R,
    options: &GenerateOptions,
) -> Result<Value, GenerateError> {
    Generator::new(rng, options).generate(schema)
}

/// A raw schema normalized once and reused for any number of generations.
#[derive(Debug, Clone)]
pub struct FixtureGenerator {
    schema: Schema,
    options: GenerateOptions,
}

impl FixtureGenerator {
    /// Normalize `schema` and keep the canonical tree for later generation.
    pub fn new(schema: &Value, options: GenerateOptions) -> Self {
        let schema = normalize(schema, &options);
        tracing::debug!(types = ?schema.types, "normalized fixture schema");
        Self { schema, options }
    }

    /// Parse a JSON document and normalize it.
    pub fn from_json_str(json: &str, options: GenerateOptions) -> Result<Self, GenerateError> {
        let raw: Value = serde_json::from_str(json)?;
        Ok(Self::new(&raw, options))
    }

    /// The canonical schema every generation reads from.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Generate one value using the caller's random source.
    pub fn generate<R: Rng>(&self, rng: &mut R) -> Result<Value, GenerateError> {
        generate(&self.schema, rng, &self.options)
    }

    /// Generate `count` independent values.
    pub fn generate_many<R: Rng>(
        &self,
        count: usize,
        rng: &mut R,
    ) -> Result<Vec<Value>, GenerateError> {
        (0..count).map(|_| self.generate(rng)).collect()
    }

    /// Generate one value from the thread-local RNG.
    pub fn generate_random(&self) -> Result<Value, GenerateError> {
        self.generate(&mut rand::thread_rng())
    }

    /// Generate one value from a seeded RNG, so the output is reproducible.
    pub fn generate_seeded(&self, seed: u64) -> Result<Value, GenerateError> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.generate(&mut rng)
    }
}
