//! store::fingerprint
//!
//! Content fingerprint over the canonical serialization.
//!
//! Because the codec is deterministic, the fingerprint is stable across
//! repeated saves, processes, and machines for identical logical
//! content. Downstream diffing and change detection depend on that.

use sha2::{Digest, Sha256};

use crate::codec::{serialize_model, serialize_shard, CodecError};
use crate::core::workspace::Workspace;

/// A SHA-256 digest of a workspace's canonical form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the fingerprint of a workspace.
    ///
    /// Hashes the canonical model document followed by each entity's
    /// canonical shard in entity (sorted) order. Fails when the
    /// workspace cannot be canonically serialized.
    pub fn compute(workspace: &Workspace) -> Result<Self, CodecError> {
        let mut hasher = Sha256::new();
        hasher.update(serialize_model(&workspace.model)?.as_bytes());
        for entity in &workspace.model.entities {
            let records = workspace.instance.records(&entity.name);
            hasher.update(serialize_shard(&workspace.model, &entity.name, records)?.as_bytes());
        }
        Ok(Self(hex::encode(hasher.finalize())))
    }

    /// The digest as lowercase hex.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Entity;

    #[test]
    fn stable_across_repeated_computation() {
        let mut ws = Workspace::new("Sales");
        ws.model.insert_entity(Entity::new("Cube"));
        let a = Fingerprint::compute(&ws).unwrap();
        let b = Fingerprint::compute(&ws).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn content_change_changes_the_fingerprint() {
        let mut ws = Workspace::new("Sales");
        ws.model.insert_entity(Entity::new("Cube"));
        let a = Fingerprint::compute(&ws).unwrap();
        ws.model.insert_entity(Entity::new("Measure"));
        let b = Fingerprint::compute(&ws).unwrap();
        assert_ne!(a, b);
    }
}
