//! core::model
//!
//! Schema half of a workspace: a named model containing entity
//! definitions with properties and relationships.
//!
//! # Invariants
//!
//! - Entity names are unique case-insensitively, and none may equal the
//!   model name.
//! - Within an entity, property names, relationship usage names, and
//!   relationship column names share one namespace together with the
//!   implicit `Id` property.
//! - Entities are kept sorted by name (ordinal) so iteration order is
//!   canonical regardless of insertion history.
//!
//! Relationships store the *name* of their target entity, never a
//! reference to it. Back-references are resolved by lookup at validation
//! and apply time, which keeps the model free of pointer cycles and makes
//! the deep-copy transaction snapshot a plain `clone()`.

use serde::{Deserialize, Serialize};

use crate::core::naming::eq_ignore_case;

/// The implicit key property present on every entity.
///
/// `Id` is string-typed, required, and can never be added, removed, or
/// renamed through any operation.
pub const ID_PROPERTY: &str = "Id";

/// Default scalar data type for properties.
pub const DEFAULT_DATA_TYPE: &str = "string";

/// A scalar property definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    /// Property name, unique within its entity (case-insensitive).
    pub name: String,
    /// Free-form scalar type tag. `"string"` when unspecified.
    pub data_type: String,
    /// Whether records may omit a value for this property.
    pub nullable: bool,
}

impl Property {
    /// Create a required string property.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: DEFAULT_DATA_TYPE.to_string(),
            nullable: false,
        }
    }

    /// Whether the data type is the omit-if-default `"string"`.
    pub fn has_default_type(&self) -> bool {
        self.data_type == DEFAULT_DATA_TYPE
    }
}

/// A relationship definition: an edge from the owning entity to a target
/// entity, materialized on records as a column holding a target Id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// Name of the target entity.
    pub target: String,
    /// Optional role override for the usage name.
    pub role: Option<String>,
    /// Optional column-name override.
    pub column: Option<String>,
}

impl Relationship {
    /// Create a relationship with derived usage and column names.
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            role: None,
            column: None,
        }
    }

    /// The usage name: the role override if present, else the target
    /// entity name.
    pub fn usage_name(&self) -> &str {
        self.role.as_deref().unwrap_or(&self.target)
    }

    /// The column name: the explicit override if present, else
    /// usage name + `"Id"`.
    pub fn column_name(&self) -> String {
        match &self.column {
            Some(column) => column.clone(),
            None => format!("{}{}", self.usage_name(), ID_PROPERTY),
        }
    }

    /// Whether the role attribute is the omit-if-default value.
    pub fn has_default_role(&self) -> bool {
        match &self.role {
            None => true,
            Some(role) => role == &self.target,
        }
    }

    /// Whether the column attribute is the omit-if-default value.
    pub fn has_default_column(&self) -> bool {
        match &self.column {
            None => true,
            Some(column) => *column == format!("{}{}", self.usage_name(), ID_PROPERTY),
        }
    }
}

/// An entity definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Entity name, unique within the model (case-insensitive).
    pub name: String,
    /// Optional explicit plural label.
    pub plural: Option<String>,
    /// Scalar properties, excluding the implicit `Id`.
    pub properties: Vec<Property>,
    /// Outbound relationships.
    pub relationships: Vec<Relationship>,
}

impl Entity {
    /// Create an empty entity.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            plural: None,
            properties: Vec::new(),
            relationships: Vec::new(),
        }
    }

    /// The display plural: the explicit label if present, else name + "s".
    pub fn plural_label(&self) -> String {
        match &self.plural {
            Some(plural) => plural.clone(),
            None => format!("{}s", self.name),
        }
    }

    /// Whether the plural attribute is the omit-if-default value.
    pub fn has_default_plural(&self) -> bool {
        match &self.plural {
            None => true,
            Some(plural) => *plural == format!("{}s", self.name),
        }
    }

    /// Look up a property by name (case-insensitive). The implicit `Id`
    /// is not part of the property list and never resolves here.
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties
            .iter()
            .find(|p| eq_ignore_case(&p.name, name))
    }

    /// Mutable property lookup.
    pub fn property_mut(&mut self, name: &str) -> Option<&mut Property> {
        self.properties
            .iter_mut()
            .find(|p| eq_ignore_case(&p.name, name))
    }

    /// All relationships whose usage name matches (case-insensitive).
    pub fn relationships_by_usage<'a>(
        &'a self,
        usage: &'a str,
    ) -> impl Iterator<Item = &'a Relationship> {
        self.relationships
            .iter()
            .filter(move |r| eq_ignore_case(r.usage_name(), usage))
    }

    /// All relationships targeting the given entity (case-insensitive).
    pub fn relationships_to<'a>(
        &'a self,
        target: &'a str,
    ) -> impl Iterator<Item = &'a Relationship> {
        self.relationships
            .iter()
            .filter(move |r| eq_ignore_case(&r.target, target))
    }

    /// Whether `name` collides with any member of this entity: the
    /// implicit `Id`, a property, a relationship usage name, or a
    /// relationship column name.
    pub fn member_name_taken(&self, name: &str) -> bool {
        if eq_ignore_case(name, ID_PROPERTY) {
            return true;
        }
        if self.property(name).is_some() {
            return true;
        }
        self.relationships.iter().any(|r| {
            eq_ignore_case(r.usage_name(), name) || eq_ignore_case(&r.column_name(), name)
        })
    }

    /// Relationships in canonical order: column name, then target name
    /// (ordinal). This is the order the codec serializes in.
    pub fn sorted_relationships(&self) -> Vec<&Relationship> {
        let mut sorted: Vec<&Relationship> = self.relationships.iter().collect();
        sorted.sort_by(|a, b| {
            a.column_name()
                .cmp(&b.column_name())
                .then_with(|| a.target.cmp(&b.target))
        });
        sorted
    }

    /// Properties in canonical (ordinal name) order.
    pub fn sorted_properties(&self) -> Vec<&Property> {
        let mut sorted: Vec<&Property> = self.properties.iter().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name));
        sorted
    }
}

/// The schema half of a workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    /// Model name.
    pub name: String,
    /// Entity definitions, sorted by name (ordinal).
    pub entities: Vec<Entity>,
}

impl Model {
    /// Create an empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entities: Vec::new(),
        }
    }

    /// Look up an entity by name (case-insensitive).
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| eq_ignore_case(&e.name, name))
    }

    /// Mutable entity lookup.
    pub fn entity_mut(&mut self, name: &str) -> Option<&mut Entity> {
        self.entities
            .iter_mut()
            .find(|e| eq_ignore_case(&e.name, name))
    }

    /// Insert an entity, keeping the ordinal sort order.
    ///
    /// The caller is responsible for uniqueness; this only places the
    /// entity at its canonical position.
    pub fn insert_entity(&mut self, entity: Entity) {
        let at = self
            .entities
            .partition_point(|e| e.name.as_str() < entity.name.as_str());
        self.entities.insert(at, entity);
    }

    /// Remove an entity by name (case-insensitive), returning it.
    pub fn remove_entity(&mut self, name: &str) -> Option<Entity> {
        let at = self
            .entities
            .iter()
            .position(|e| eq_ignore_case(&e.name, name))?;
        Some(self.entities.remove(at))
    }

    /// Re-sort entities after a rename.
    pub fn resort(&mut self) {
        self.entities.sort_by(|a, b| a.name.cmp(&b.name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_and_column_derivation() {
        let rel = Relationship::new("Server");
        assert_eq!(rel.usage_name(), "Server");
        assert_eq!(rel.column_name(), "ServerId");
        assert!(rel.has_default_role());
        assert!(rel.has_default_column());

        let mut rel = Relationship::new("Server");
        rel.role = Some("Host".to_string());
        assert_eq!(rel.usage_name(), "Host");
        assert_eq!(rel.column_name(), "HostId");
        assert!(!rel.has_default_role());
        assert!(rel.has_default_column());

        rel.column = Some("MachineId".to_string());
        assert_eq!(rel.column_name(), "MachineId");
        assert!(!rel.has_default_column());
    }

    #[test]
    fn plural_defaults_to_name_plus_s() {
        let entity = Entity::new("Cube");
        assert_eq!(entity.plural_label(), "Cubes");
        assert!(entity.has_default_plural());

        let mut entity = Entity::new("Axis");
        entity.plural = Some("Axes".to_string());
        assert_eq!(entity.plural_label(), "Axes");
        assert!(!entity.has_default_plural());
    }

    #[test]
    fn member_namespace_covers_id_properties_and_relationships() {
        let mut entity = Entity::new("Measure");
        entity.properties.push(Property::new("Unit"));
        entity.relationships.push(Relationship::new("Cube"));

        assert!(entity.member_name_taken("Id"));
        assert!(entity.member_name_taken("id"));
        assert!(entity.member_name_taken("unit"));
        assert!(entity.member_name_taken("Cube"));
        assert!(entity.member_name_taken("CubeId"));
        assert!(!entity.member_name_taken("Label"));
    }

    #[test]
    fn entity_lookup_is_case_insensitive() {
        let mut model = Model::new("Sales");
        model.insert_entity(Entity::new("Cube"));
        assert!(model.entity("cube").is_some());
        assert!(model.entity("CUBE").is_some());
        assert!(model.entity("Measure").is_none());
    }

    #[test]
    fn insert_keeps_ordinal_order() {
        let mut model = Model::new("Sales");
        model.insert_entity(Entity::new("Measure"));
        model.insert_entity(Entity::new("Cube"));
        model.insert_entity(Entity::new("Axis"));
        let names: Vec<&str> = model.entities.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Axis", "Cube", "Measure"]);
    }

    #[test]
    fn sorted_relationships_order_by_column_then_target() {
        let mut entity = Entity::new("Measure");
        let mut a = Relationship::new("Server");
        a.column = Some("Alpha".to_string());
        let b = Relationship::new("Cube");
        entity.relationships.push(b);
        entity.relationships.push(a);

        let order: Vec<String> = entity
            .sorted_relationships()
            .iter()
            .map(|r| r.column_name())
            .collect();
        assert_eq!(order, vec!["Alpha".to_string(), "CubeId".to_string()]);
    }
}
