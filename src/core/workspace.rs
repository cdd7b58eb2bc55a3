//! core::workspace
//!
//! The top-level in-memory unit: one model, one instance, the current
//! diagnostics, and a dirty flag.
//!
//! A workspace is created by [`crate::store`] load or by explicit
//! construction, mutated exclusively through operations under the
//! transaction coordinator, and persisted by `store::save`. It is
//! exclusively owned by one caller for the duration of a transaction.

use std::path::PathBuf;

use crate::core::diagnostics::Diagnostics;
use crate::core::instance::Instance;
use crate::core::model::Model;

/// A model + instance pair with its current diagnostics.
#[derive(Debug, Clone)]
pub struct Workspace {
    pub model: Model,
    pub instance: Instance,
    /// Diagnostics from the most recent validation pass.
    pub diagnostics: Diagnostics,
    /// Whether in-memory state has diverged from disk.
    pub dirty: bool,
    /// Directory this workspace is bound to, when loaded from disk.
    pub root: Option<PathBuf>,
}

impl Workspace {
    /// Create a fresh, unbound workspace with an empty instance.
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model: Model::new(model_name),
            instance: Instance::new(),
            diagnostics: Diagnostics::new(),
            dirty: false,
            root: None,
        }
    }

    /// The rollback point for a transaction: a deep copy of model and
    /// instance. Diagnostics are not part of the snapshot.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            model: self.model.clone(),
            instance: self.instance.clone(),
        }
    }

    /// Restore a snapshot, discarding all mutations since it was taken.
    pub fn restore(&mut self, snapshot: Snapshot) {
        self.model = snapshot.model;
        self.instance = snapshot.instance;
    }
}

/// An immutable rollback point. Holding one never aliases live workspace
/// state; restore moves the copies back in.
#[derive(Debug)]
pub struct Snapshot {
    model: Model,
    instance: Instance,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::instance::Record;
    use crate::core::model::Entity;

    #[test]
    fn restore_discards_mutations() {
        let mut ws = Workspace::new("Sales");
        ws.model.insert_entity(Entity::new("Cube"));
        ws.instance.bucket_entry("Cube").records.push(Record::new("1"));

        let snapshot = ws.snapshot();
        ws.model.remove_entity("Cube");
        ws.instance.remove_bucket("Cube");
        assert!(ws.model.entity("Cube").is_none());

        ws.restore(snapshot);
        assert!(ws.model.entity("Cube").is_some());
        assert_eq!(ws.instance.records("Cube").len(), 1);
    }

    #[test]
    fn snapshot_does_not_alias_live_state() {
        let mut ws = Workspace::new("Sales");
        ws.model.insert_entity(Entity::new("Cube"));
        let snapshot = ws.snapshot();
        ws.model.entity_mut("Cube").unwrap().name = "DataCube".to_string();
        ws.restore(snapshot);
        assert_eq!(ws.model.entities[0].name, "Cube");
    }
}
