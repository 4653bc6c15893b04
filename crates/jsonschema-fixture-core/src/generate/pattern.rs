//! Strings matching a regular expression.
//!
//! Wraps [`rand_regex`], which samples from the language of a regex directly
//! instead of generating and filtering. Unbounded repetition (`*`, `+`,
//! `{n,}`) is capped at `max_repeat`. Compiled patterns are cached per
//! synthesizer, since the same `pattern` keyword is usually sampled many times.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use rand::Rng;

#[derive(Debug)]
pub struct PatternSynthesizer {
    max_repeat: u32,
    compiled: HashMap<String, rand_regex::Regex>,
}

impl PatternSynthesizer {
    pub fn new(max_repeat: u32) -> Self {
        Self {
            max_repeat,
            compiled: HashMap::new(),
        }
    }

    /// Sample one string matching `pattern`.
    ///
    /// Fails when the pattern does not parse or uses a construct that cannot
    /// be sampled (e.g. an anchor in the middle of the expression).
    pub fn synthesize<R: Rng>(
        &mut self,
        pattern: &str,
        rng: &mut R,
    ) -> Result<String, rand_regex::Error> {
        let regex = match self.compiled.entry(pattern.to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let regex = rand_regex::Regex::compile(pattern, self.max_repeat)?;
                entry.insert(regex)
            }
        };
        let bytes: Vec<u8> = rng.sample(&*regex);
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
