//! core::instance
//!
//! Data half of a workspace: records grouped by entity.
//!
//! # Invariants
//!
//! - Record Ids are non-empty and unique within their entity's record
//!   set (case-insensitive), with original casing preserved.
//! - Buckets keep insertion order; canonical ordering is applied by the
//!   codec at serialization time, not here.
//! - A property or relationship key absent from a record means null.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::naming::eq_ignore_case;

/// A single data row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Record key, unique within the entity (case-insensitive).
    pub id: String,
    /// Property name -> scalar value. Absent key = null.
    pub values: BTreeMap<String, String>,
    /// Relationship column name -> target record Id. Absent key = null.
    pub links: BTreeMap<String, String>,
}

impl Record {
    /// Create an empty record with the given Id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            values: BTreeMap::new(),
            links: BTreeMap::new(),
        }
    }

    /// Property value lookup (case-insensitive key match; stored casing
    /// is preserved and canonicalized by the codec on save).
    pub fn value(&self, property: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(k, _)| eq_ignore_case(k, property))
            .map(|(_, v)| v.as_str())
    }

    /// Relationship value lookup by column name (case-insensitive).
    pub fn link(&self, column: &str) -> Option<&str> {
        self.links
            .iter()
            .find(|(k, _)| eq_ignore_case(k, column))
            .map(|(_, v)| v.as_str())
    }

    /// Whether the record carries a non-empty value for the column.
    pub fn has_link(&self, column: &str) -> bool {
        self.link(column).is_some_and(|v| !v.is_empty())
    }
}

/// Records for one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
    /// Owning entity name (matches the model's casing).
    pub entity: String,
    /// Records in insertion order.
    pub records: Vec<Record>,
}

impl Bucket {
    /// Look up a record by Id (case-insensitive).
    pub fn record(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| eq_ignore_case(&r.id, id))
    }

    /// Mutable record lookup.
    pub fn record_mut(&mut self, id: &str) -> Option<&mut Record> {
        self.records.iter_mut().find(|r| eq_ignore_case(&r.id, id))
    }
}

/// The data half of a workspace: an insertion-ordered mapping from
/// entity name to that entity's records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    buckets: Vec<Bucket>,
}

impl Instance {
    /// Create an empty instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bucket lookup by entity name (case-insensitive).
    pub fn bucket(&self, entity: &str) -> Option<&Bucket> {
        self.buckets
            .iter()
            .find(|b| eq_ignore_case(&b.entity, entity))
    }

    /// Mutable bucket lookup.
    pub fn bucket_mut(&mut self, entity: &str) -> Option<&mut Bucket> {
        self.buckets
            .iter_mut()
            .find(|b| eq_ignore_case(&b.entity, entity))
    }

    /// Records for an entity; empty slice when no bucket exists.
    pub fn records(&self, entity: &str) -> &[Record] {
        self.bucket(entity).map_or(&[], |b| b.records.as_slice())
    }

    /// Get or create the bucket for an entity.
    pub fn bucket_entry(&mut self, entity: &str) -> &mut Bucket {
        if let Some(at) = self
            .buckets
            .iter()
            .position(|b| eq_ignore_case(&b.entity, entity))
        {
            return &mut self.buckets[at];
        }
        self.buckets.push(Bucket {
            entity: entity.to_string(),
            records: Vec::new(),
        });
        self.buckets.last_mut().unwrap()
    }

    /// Remove an entity's bucket, returning it.
    pub fn remove_bucket(&mut self, entity: &str) -> Option<Bucket> {
        let at = self
            .buckets
            .iter()
            .position(|b| eq_ignore_case(&b.entity, entity))?;
        Some(self.buckets.remove(at))
    }

    /// Rename a bucket's entity key, preserving its position and records.
    pub fn rename_bucket(&mut self, entity: &str, new_name: &str) {
        if let Some(bucket) = self.bucket_mut(entity) {
            bucket.entity = new_name.to_string();
        }
    }

    /// Iterate all buckets in insertion order.
    pub fn buckets(&self) -> impl Iterator<Item = &Bucket> {
        self.buckets.iter()
    }

    /// Iterate all buckets mutably.
    pub fn buckets_mut(&mut self) -> impl Iterator<Item = &mut Bucket> {
        self.buckets.iter_mut()
    }
}
