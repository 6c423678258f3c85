//! Pass identifiers and the pass catalog boundary.
//!
//! The core never looks inside a pass. It only needs a [`PassCatalog`]
//! that can list pass ids and apply one of them to an IR value. The
//! stock implementation, [`PassRegistry`], keys boxed [`Pass`] objects by
//! name so a catalog is a closed set of capabilities fixed at build time.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::PassError;

/// Opaque name of one catalog entry.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PassId(Arc<str>);

impl PassId {
    pub fn new(name: impl AsRef<str>) -> Self {
        PassId(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PassId({})", self.0)
    }
}

impl fmt::Display for PassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PassId {
    fn from(name: &str) -> Self {
        PassId::new(name)
    }
}

impl Serialize for PassId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for PassId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(PassId::new(name))
    }
}

/// A single transformation over `Ir`. Must not mutate its input.
pub trait Pass<Ir>: Send + Sync {
    fn name(&self) -> &str;

    fn apply(&self, ir: &Ir) -> Result<Ir, PassError>;
}

/// The set of passes a session can choose from.
pub trait PassCatalog: Send + Sync {
    type Ir;

    /// Every known pass id, sorted by name.
    fn list_available(&self) -> Vec<PassId>;

    fn apply(&self, pass: &PassId, ir: &Self::Ir) -> Result<Self::Ir, PassError>;

    fn contains(&self, pass: &PassId) -> bool {
        self.list_available().contains(pass)
    }
}

/// Name-keyed catalog of boxed passes.
pub struct PassRegistry<Ir> {
    passes: BTreeMap<PassId, Box<dyn Pass<Ir>>>,
}

impl<Ir> PassRegistry<Ir> {
    pub fn new() -> Self {
        PassRegistry {
            passes: BTreeMap::new(),
        }
    }

    /// Register `pass` under its own name, replacing any earlier entry.
    pub fn register<P: Pass<Ir> + 'static>(&mut self, pass: P) {
        let id = PassId::new(pass.name());
        if self.passes.insert(id.clone(), Box::new(pass)).is_some() {
            tracing::warn!(pass = %id, "replaced previously registered pass");
        }
    }

    pub fn with<P: Pass<Ir> + 'static>(mut self, pass: P) -> Self {
        self.register(pass);
        self
    }

    pub fn len(&self) -> usize {
        self.passes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }
}

impl<Ir> Default for PassRegistry<Ir> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Ir> PassCatalog for PassRegistry<Ir> {
    type Ir = Ir;

    fn list_available(&self) -> Vec<PassId> {
        self.passes.keys().cloned().collect()
    }

    fn apply(&self, pass: &PassId, ir: &Ir) -> Result<Ir, PassError> {
        match self.passes.get(pass) {
            Some(p) => p.apply(ir),
            None => Err(PassError::new(format!("unknown pass '{}'", pass))),
        }
    }

    fn contains(&self, pass: &PassId) -> bool {
        self.passes.contains_key(pass)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Append(&'static str);

    impl Pass<String> for Append {
        fn name(&self) -> &str {
            self.0
        }

        fn apply(&self, ir: &String) -> Result<String, PassError> {
            Ok(format!("{}{}", ir, self.0))
        }
    }

    #[test]
    fn registry_lists_passes_sorted_by_name() {
        let registry = PassRegistry::new()
            .with(Append("zeta"))
            .with(Append("alpha"))
            .with(Append("mid"));
        let names: Vec<String> = registry
            .list_available()
            .iter()
            .map(|p| p.to_string())
            .collect();
        assert_eq!(names, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn unknown_pass_is_a_pass_error() {
        let registry: PassRegistry<String> = PassRegistry::new().with(Append("a"));
        let err = registry
            .apply(&PassId::new("missing"), &String::new())
            .unwrap_err();
        assert_eq!(err.message, "unknown pass 'missing'");
        assert!(!registry.contains(&PassId::new("missing")));
        assert!(registry.contains(&PassId::new("a")));
    }

    #[test]
    fn pass_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&PassId::new("dce")).unwrap();
        assert_eq!(json, "\"dce\"");
        let back: PassId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, PassId::new("dce"));
    }
}
