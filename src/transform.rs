//! Byte transforms applied to each chunk before it is echoed.
//!
//! # Responsibilities
//! - Define the `Transform` capability used by every session
//! - Provide the built-in `identity` and `uppercase` transforms
//! - Resolve a transform for a port from a name or the port-parity convention
//!
//! # Design Decisions
//! - Transforms are stateless and shared through `Arc` across sessions
//! - `apply` returns `Cow` so identity never copies

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

/// A pure mapping from an input chunk to the bytes written back.
pub trait Transform: Send + Sync + fmt::Debug {
    /// Registry name of this transform.
    fn name(&self) -> &str;

    /// Map one chunk. Must not depend on previous calls.
    fn apply<'a>(&self, input: &'a [u8]) -> Cow<'a, [u8]>;
}

/// Returns its input unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Transform for Identity {
    fn name(&self) -> &str {
        "identity"
    }

    fn apply<'a>(&self, input: &'a [u8]) -> Cow<'a, [u8]> {
        Cow::Borrowed(input)
    }
}

/// ASCII upper-casing. Bytes outside `a..=z` pass through.
#[derive(Debug, Clone, Copy, Default)]
pub struct Uppercase;

impl Transform for Uppercase {
    fn name(&self) -> &str {
        "uppercase"
    }

    fn apply<'a>(&self, input: &'a [u8]) -> Cow<'a, [u8]> {
        if input.iter().any(u8::is_ascii_lowercase) {
            Cow::Owned(input.to_ascii_uppercase())
        } else {
            Cow::Borrowed(input)
        }
    }
}

/// Error type for transform lookups.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    /// No transform registered under this name.
    #[error("unknown transform '{0}'")]
    Unknown(String),
}

/// Named transforms available to port bindings.
#[derive(Debug, Clone, Default)]
pub struct TransformRegistry {
    transforms: HashMap<String, Arc<dyn Transform>>,
}

impl TransformRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding `identity` (alias `noop`) and `uppercase`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        let identity: Arc<dyn Transform> = Arc::new(Identity);
        registry.register(Arc::clone(&identity));
        registry.alias("noop", identity);
        registry.register(Arc::new(Uppercase));
        registry
    }

    /// Register a transform under its own name, replacing any previous entry.
    pub fn register(&mut self, transform: Arc<dyn Transform>) {
        let name = transform.name().to_ascii_lowercase();
        self.transforms.insert(name, transform);
    }

    /// Register a transform under an additional name.
    pub fn alias(&mut self, name: &str, transform: Arc<dyn Transform>) {
        self.transforms.insert(name.to_ascii_lowercase(), transform);
    }

    /// Look up a transform by name (case-insensitive).
    pub fn get(&self, name: &str) -> Result<Arc<dyn Transform>, TransformError> {
        self.transforms
            .get(&name.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| TransformError::Unknown(name.to_string()))
    }

    /// Resolve the transform for a binding.
    ///
    /// An explicit name wins. Without one, even ports echo as-is and odd
    /// ports shout.
    pub fn resolve(&self, name: Option<&str>, port: u16) -> Result<Arc<dyn Transform>, TransformError> {
        match name {
            Some(name) => self.get(name),
            None if port % 2 == 0 => self.get("identity"),
            None => self.get("uppercase"),
        }
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.transforms.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
