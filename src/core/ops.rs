//! core::ops
//!
//! The closed set of workspace mutations and the applier that executes
//! them.
//!
//! # Contract
//!
//! [`apply`] is synchronous and mutates the workspace in place. Each
//! operation enforces its *local* guards and fails with an
//! [`OperationError`] naming the offending entity or member. Apply
//! offers no atomicity across operations: on failure the workspace may
//! be partially mutated, and the transaction coordinator
//! ([`crate::engine::transaction`]) owns snapshot and rollback. No
//! handler may assume a transactional wrapper exists.
//!
//! # Selector resolution
//!
//! Relationship selectors resolve by exact usage-name match first, else
//! by exact target-entity match. Zero matches is `NotFound`; more than
//! one match at either step is `Ambiguous` and fails closed.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::core::instance::Record;
use crate::core::model::{Entity, Property, Relationship, ID_PROPERTY};
use crate::core::naming::eq_ignore_case;
use crate::core::workspace::Workspace;

/// Errors from operation guards.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OperationError {
    /// The named entity/property/relationship does not exist.
    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    /// The target name is already taken.
    #[error("{kind} already exists: {name}")]
    AlreadyExists { kind: &'static str, name: String },

    /// A selector matched more than one relationship.
    #[error("ambiguous relationship selector '{selector}' on entity {entity}")]
    Ambiguous { entity: String, selector: String },

    /// The target is still referenced and cannot be removed.
    #[error("{kind} {name} is in use: {reason}")]
    InUse {
        kind: &'static str,
        name: String,
        reason: String,
    },

    /// A field value is not acceptable.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// One row patch for [`Operation::BulkUpsertRows`].
///
/// A present key with `None` (or an empty string) clears that field; a
/// present key with a value sets it. With `replace` set, all existing
/// values and links on the record are cleared before the patch applies,
/// which lets schema-normalization passes drop now-unknown fields
/// deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowPatch {
    pub id: String,
    pub replace: bool,
    pub values: BTreeMap<String, Option<String>>,
    pub links: BTreeMap<String, Option<String>>,
}

/// The closed set of workspace mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    AddEntity {
        name: String,
    },
    DeleteEntity {
        name: String,
    },
    RenameEntity {
        name: String,
        new_name: String,
    },
    AddProperty {
        entity: String,
        property: Property,
    },
    DeleteProperty {
        entity: String,
        property: String,
    },
    RenameProperty {
        entity: String,
        property: String,
        new_name: String,
    },
    ChangeNullability {
        entity: String,
        property: String,
        nullable: bool,
    },
    AddRelationship {
        entity: String,
        target: String,
        role: Option<String>,
        column: Option<String>,
    },
    DeleteRelationship {
        entity: String,
        selector: String,
    },
    /// Re-point an existing relationship at a new target entity.
    RenameRelationship {
        entity: String,
        selector: String,
        new_target: String,
    },
    BulkUpsertRows {
        entity: String,
        rows: Vec<RowPatch>,
    },
    DeleteRows {
        entity: String,
        ids: Vec<String>,
    },
}

/// Apply one operation to the workspace, enforcing its local guards.
pub fn apply(workspace: &mut Workspace, op: &Operation) -> Result<(), OperationError> {
    match op {
        Operation::AddEntity { name } => add_entity(workspace, name),
        Operation::DeleteEntity { name } => delete_entity(workspace, name),
        Operation::RenameEntity { name, new_name } => rename_entity(workspace, name, new_name),
        Operation::AddProperty { entity, property } => add_property(workspace, entity, property),
        Operation::DeleteProperty { entity, property } => {
            delete_property(workspace, entity, property)
        }
        Operation::RenameProperty {
            entity,
            property,
            new_name,
        } => rename_property(workspace, entity, property, new_name),
        Operation::ChangeNullability {
            entity,
            property,
            nullable,
        } => change_nullability(workspace, entity, property, *nullable),
        Operation::AddRelationship {
            entity,
            target,
            role,
            column,
        } => add_relationship(workspace, entity, target, role.clone(), column.clone()),
        Operation::DeleteRelationship { entity, selector } => {
            delete_relationship(workspace, entity, selector)
        }
        Operation::RenameRelationship {
            entity,
            selector,
            new_target,
        } => rename_relationship(workspace, entity, selector, new_target),
        Operation::BulkUpsertRows { entity, rows } => bulk_upsert(workspace, entity, rows),
        Operation::DeleteRows { entity, ids } => delete_rows(workspace, entity, ids),
    }
}

fn require_nonempty(field: &str, value: &str) -> Result<(), OperationError> {
    if value.is_empty() {
        return Err(OperationError::InvalidValue {
            field: field.to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    Ok(())
}

fn not_id(field: &str, name: &str) -> Result<(), OperationError> {
    if eq_ignore_case(name, ID_PROPERTY) {
        return Err(OperationError::InvalidValue {
            field: field.to_string(),
            reason: "the implicit Id property cannot be targeted".to_string(),
        });
    }
    Ok(())
}

fn entity_mut<'a>(
    workspace: &'a mut Workspace,
    name: &str,
) -> Result<&'a mut Entity, OperationError> {
    workspace
        .model
        .entity_mut(name)
        .ok_or_else(|| OperationError::NotFound {
            kind: "entity",
            name: name.to_string(),
        })
}

fn add_entity(workspace: &mut Workspace, name: &str) -> Result<(), OperationError> {
    require_nonempty("entity", name)?;
    if workspace.model.entity(name).is_some() {
        return Err(OperationError::AlreadyExists {
            kind: "entity",
            name: name.to_string(),
        });
    }
    workspace.model.insert_entity(Entity::new(name));
    Ok(())
}

fn delete_entity(workspace: &mut Workspace, name: &str) -> Result<(), OperationError> {
    let entity_name = entity_mut(workspace, name)?.name.clone();

    if !workspace.instance.records(&entity_name).is_empty() {
        return Err(OperationError::InUse {
            kind: "entity",
            name: entity_name,
            reason: "it still has records".to_string(),
        });
    }

    // An inbound relationship definition blocks deletion; a record still
    // holding a non-empty value for one is only reachable through such a
    // definition, so this check covers both.
    let inbound = workspace.model.entities.iter().find(|other| {
        !eq_ignore_case(&other.name, &entity_name)
            && other.relationships_to(&entity_name).next().is_some()
    });
    if let Some(other) = inbound {
        return Err(OperationError::InUse {
            kind: "entity",
            name: entity_name,
            reason: format!("entity '{}' has a relationship targeting it", other.name),
        });
    }

    workspace.model.remove_entity(&entity_name);
    workspace.instance.remove_bucket(&entity_name);
    Ok(())
}

fn rename_entity(
    workspace: &mut Workspace,
    name: &str,
    new_name: &str,
) -> Result<(), OperationError> {
    require_nonempty("entity", new_name)?;
    let old_name = entity_mut(workspace, name)?.name.clone();

    let same_entity = eq_ignore_case(&old_name, new_name);
    if !same_entity && workspace.model.entity(new_name).is_some() {
        return Err(OperationError::AlreadyExists {
            kind: "entity",
            name: new_name.to_string(),
        });
    }

    workspace.model.entity_mut(&old_name).unwrap().name = new_name.to_string();
    workspace.model.resort();
    workspace.instance.rename_bucket(&old_name, new_name);

    // Re-point every relationship that targeted the old name, keeping
    // the usage/column derivation consistent and moving record link keys
    // whenever the derived column name changes.
    let entity_names: Vec<String> = workspace
        .model
        .entities
        .iter()
        .map(|e| e.name.clone())
        .collect();
    for entity_name in entity_names {
        let mut renames: Vec<(String, String)> = Vec::new();
        {
            let entity = workspace.model.entity_mut(&entity_name).unwrap();
            for rel in &mut entity.relationships {
                if !eq_ignore_case(&rel.target, &old_name) {
                    continue;
                }
                let old_column = rel.column_name();
                rel.target = new_name.to_string();
                let new_column = rel.column_name();
                if old_column != new_column {
                    renames.push((old_column, new_column));
                }
            }
        }
        if renames.is_empty() {
            continue;
        }
        if let Some(bucket) = workspace.instance.bucket_mut(&entity_name) {
            for record in &mut bucket.records {
                for (old_column, new_column) in &renames {
                    if let Some(value) = record.links.remove(old_column) {
                        record.links.insert(new_column.clone(), value);
                    }
                }
            }
        }
    }
    Ok(())
}

fn add_property(
    workspace: &mut Workspace,
    entity: &str,
    property: &Property,
) -> Result<(), OperationError> {
    require_nonempty("property", &property.name)?;
    let entity = entity_mut(workspace, entity)?;
    if entity.member_name_taken(&property.name) {
        return Err(OperationError::AlreadyExists {
            kind: "member",
            name: format!("{}.{}", entity.name, property.name),
        });
    }
    entity.properties.push(property.clone());
    Ok(())
}

fn delete_property(
    workspace: &mut Workspace,
    entity: &str,
    property: &str,
) -> Result<(), OperationError> {
    not_id("property", property)?;
    let entity = entity_mut(workspace, entity)?;
    let at = entity
        .properties
        .iter()
        .position(|p| eq_ignore_case(&p.name, property))
        .ok_or_else(|| OperationError::NotFound {
            kind: "property",
            name: property.to_string(),
        })?;
    let removed = entity.properties.remove(at);
    let entity_name = entity.name.clone();

    if let Some(bucket) = workspace.instance.bucket_mut(&entity_name) {
        for record in &mut bucket.records {
            record.values.remove(&removed.name);
        }
    }
    Ok(())
}

fn rename_property(
    workspace: &mut Workspace,
    entity: &str,
    property: &str,
    new_name: &str,
) -> Result<(), OperationError> {
    not_id("property", property)?;
    require_nonempty("property", new_name)?;
    let entity = entity_mut(workspace, entity)?;

    if entity.property(property).is_none() {
        return Err(OperationError::NotFound {
            kind: "property",
            name: property.to_string(),
        });
    }
    let same_property = eq_ignore_case(property, new_name);
    if !same_property && entity.member_name_taken(new_name) {
        return Err(OperationError::AlreadyExists {
            kind: "member",
            name: format!("{}.{}", entity.name, new_name),
        });
    }

    let prop = entity.property_mut(property).unwrap();
    let old_name = std::mem::replace(&mut prop.name, new_name.to_string());
    let entity_name = entity.name.clone();

    if let Some(bucket) = workspace.instance.bucket_mut(&entity_name) {
        for record in &mut bucket.records {
            if let Some(value) = record.values.remove(&old_name) {
                record.values.insert(new_name.to_string(), value);
            }
        }
    }
    Ok(())
}

fn change_nullability(
    workspace: &mut Workspace,
    entity: &str,
    property: &str,
    nullable: bool,
) -> Result<(), OperationError> {
    not_id("property", property)?;
    let entity = entity_mut(workspace, entity)?;
    let prop = entity
        .property_mut(property)
        .ok_or_else(|| OperationError::NotFound {
            kind: "property",
            name: property.to_string(),
        })?;
    prop.nullable = nullable;
    Ok(())
}

fn add_relationship(
    workspace: &mut Workspace,
    entity: &str,
    target: &str,
    role: Option<String>,
    column: Option<String>,
) -> Result<(), OperationError> {
    if workspace.model.entity(target).is_none() {
        return Err(OperationError::NotFound {
            kind: "entity",
            name: target.to_string(),
        });
    }
    let target = workspace.model.entity(target).unwrap().name.clone();
    let entity = entity_mut(workspace, entity)?;

    let rel = Relationship {
        target,
        role,
        column,
    };
    let usage = rel.usage_name().to_string();
    let column = rel.column_name();
    for name in [usage.as_str(), column.as_str()] {
        if entity.member_name_taken(name) {
            return Err(OperationError::AlreadyExists {
                kind: "member",
                name: format!("{}.{}", entity.name, name),
            });
        }
    }
    entity.relationships.push(rel);
    Ok(())
}

/// Resolve a relationship selector: exact usage-name match first, else
/// exact target-entity match; ambiguity fails closed.
fn resolve_relationship(
    entity: &Entity,
    selector: &str,
) -> Result<usize, OperationError> {
    let by_usage: Vec<usize> = entity
        .relationships
        .iter()
        .enumerate()
        .filter(|(_, r)| eq_ignore_case(r.usage_name(), selector))
        .map(|(i, _)| i)
        .collect();
    match by_usage.len() {
        1 => return Ok(by_usage[0]),
        0 => {}
        _ => {
            return Err(OperationError::Ambiguous {
                entity: entity.name.clone(),
                selector: selector.to_string(),
            })
        }
    }

    let by_target: Vec<usize> = entity
        .relationships
        .iter()
        .enumerate()
        .filter(|(_, r)| eq_ignore_case(&r.target, selector))
        .map(|(i, _)| i)
        .collect();
    match by_target.len() {
        1 => Ok(by_target[0]),
        0 => Err(OperationError::NotFound {
            kind: "relationship",
            name: selector.to_string(),
        }),
        _ => Err(OperationError::Ambiguous {
            entity: entity.name.clone(),
            selector: selector.to_string(),
        }),
    }
}

fn delete_relationship(
    workspace: &mut Workspace,
    entity: &str,
    selector: &str,
) -> Result<(), OperationError> {
    let entity = entity_mut(workspace, entity)?;
    let at = resolve_relationship(entity, selector)?;
    let column = entity.relationships[at].column_name();
    let entity_name = entity.name.clone();

    let in_use = workspace
        .instance
        .records(&entity_name)
        .iter()
        .any(|r| r.has_link(&column));
    if in_use {
        return Err(OperationError::InUse {
            kind: "relationship",
            name: column,
            reason: format!("records of '{}' still carry values for it", entity_name),
        });
    }

    let entity = workspace.model.entity_mut(&entity_name).unwrap();
    entity.relationships.remove(at);
    if let Some(bucket) = workspace.instance.bucket_mut(&entity_name) {
        for record in &mut bucket.records {
            record.links.remove(&column);
        }
    }
    Ok(())
}

fn rename_relationship(
    workspace: &mut Workspace,
    entity: &str,
    selector: &str,
    new_target: &str,
) -> Result<(), OperationError> {
    let new_target = workspace
        .model
        .entity(new_target)
        .ok_or_else(|| OperationError::NotFound {
            kind: "entity",
            name: new_target.to_string(),
        })?
        .name
        .clone();

    let entity = entity_mut(workspace, entity)?;
    let at = resolve_relationship(entity, selector)?;

    let mut repointed = entity.relationships[at].clone();
    let old_column = repointed.column_name();
    repointed.target = new_target.clone();
    let new_usage = repointed.usage_name().to_string();
    let new_column = repointed.column_name();

    for (i, other) in entity.relationships.iter().enumerate() {
        if i == at {
            continue;
        }
        if eq_ignore_case(other.usage_name(), &new_usage)
            && eq_ignore_case(&other.target, &new_target)
        {
            return Err(OperationError::AlreadyExists {
                kind: "relationship",
                name: format!("{}.{}", entity.name, new_usage),
            });
        }
        if eq_ignore_case(&other.column_name(), &new_column) {
            return Err(OperationError::AlreadyExists {
                kind: "member",
                name: format!("{}.{}", entity.name, new_column),
            });
        }
    }
    if entity.property(&new_usage).is_some() || entity.property(&new_column).is_some() {
        return Err(OperationError::AlreadyExists {
            kind: "member",
            name: format!("{}.{}", entity.name, new_column),
        });
    }

    entity.relationships[at] = repointed;
    let entity_name = entity.name.clone();

    if old_column != new_column {
        if let Some(bucket) = workspace.instance.bucket_mut(&entity_name) {
            for record in &mut bucket.records {
                if let Some(value) = record.links.remove(&old_column) {
                    record.links.insert(new_column.clone(), value);
                }
            }
        }
    }
    Ok(())
}

fn bulk_upsert(
    workspace: &mut Workspace,
    entity: &str,
    rows: &[RowPatch],
) -> Result<(), OperationError> {
    let entity = entity_mut(workspace, entity)?;
    let entity_name = entity.name.clone();

    // Resolve patch keys against the schema up front so a failing patch
    // never leaves a half-written record behind it in the same call.
    let mut resolved: Vec<(String, bool, Vec<(String, Option<String>)>, Vec<(String, Option<String>)>)> =
        Vec::with_capacity(rows.len());
    for patch in rows {
        require_nonempty("record id", &patch.id)?;

        let mut values = Vec::new();
        for (key, value) in &patch.values {
            not_id("property", key)?;
            let prop = entity
                .property(key)
                .ok_or_else(|| OperationError::NotFound {
                    kind: "property",
                    name: format!("{}.{}", entity_name, key),
                })?;
            values.push((prop.name.clone(), value.clone()));
        }

        let mut links = Vec::new();
        for (key, value) in &patch.links {
            let rel = entity
                .relationships
                .iter()
                .find(|r| eq_ignore_case(&r.column_name(), key))
                .ok_or_else(|| OperationError::NotFound {
                    kind: "relationship",
                    name: format!("{}.{}", entity_name, key),
                })?;
            links.push((rel.column_name(), value.clone()));
        }

        resolved.push((patch.id.clone(), patch.replace, values, links));
    }

    let bucket = workspace.instance.bucket_entry(&entity_name);
    for (id, replace, values, links) in resolved {
        if bucket.record(&id).is_none() {
            bucket.records.push(Record::new(id.clone()));
        }
        let record = bucket.record_mut(&id).unwrap();
        if replace {
            record.values.clear();
            record.links.clear();
        }
        for (key, value) in values {
            match value.filter(|v| !v.is_empty()) {
                Some(v) => {
                    record.values.insert(key, v);
                }
                None => {
                    record.values.remove(&key);
                }
            }
        }
        for (key, value) in links {
            match value.filter(|v| !v.is_empty()) {
                Some(v) => {
                    record.links.insert(key, v);
                }
                None => {
                    record.links.remove(&key);
                }
            }
        }
    }
    Ok(())
}

fn delete_rows(
    workspace: &mut Workspace,
    entity: &str,
    ids: &[String],
) -> Result<(), OperationError> {
    let entity_name = entity_mut(workspace, entity)?.name.clone();
    let doomed: Vec<String> = ids.iter().map(|id| crate::core::naming::fold(id)).collect();
    if let Some(bucket) = workspace.instance.bucket_mut(&entity_name) {
        bucket
            .records
            .retain(|r| !doomed.contains(&crate::core::naming::fold(&r.id)));
    }
    Ok(())
}
