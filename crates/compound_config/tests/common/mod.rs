//! Shared fixtures for `compound_config` integration tests.

#![allow(
    dead_code,
    missing_docs,
    reason = "each test binary uses a different subset of the fixtures"
)]

use compound_config::prelude::*;

/// An RGB color.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Parses `#RRGGBB` strings into [`Color`].
#[derive(Default)]
pub struct HexColor;

impl Resolver for HexColor {
    type Input = String;
    type Output = Color;

    fn apply(&self, input: String) -> Result<Color, ResolveError> {
        let hex = input
            .strip_prefix('#')
            .filter(|hex| hex.len() == 6 && hex.is_ascii())
            .ok_or_else(|| ResolveError::rejected(format!("'{input}' is not #RRGGBB")))?;
        let channel = |at: usize| {
            u8::from_str_radix(&hex[at..at + 2], 16)
                .map_err(|err| ResolveError::rejected(format!("'{input}': {err}")))
        };
        Ok(Color {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }
}

/// A resolver that always panics.
#[derive(Default)]
pub struct Exploding;

impl Resolver for Exploding {
    type Input = String;
    type Output = Color;

    fn apply(&self, _input: String) -> Result<Color, ResolveError> {
        panic!("boom");
    }
}

/// Returns a binder over a single document stored at `path`.
pub fn binder_with(path: &str, document: ConfigDocument) -> Binder {
    Binder::new(MemoryStore::new().with_document(path, document))
}
