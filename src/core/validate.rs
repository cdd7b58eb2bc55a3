//! core::validate
//!
//! Whole-workspace consistency checking.
//!
//! # Modes
//!
//! There is one mode: everything is checked, all issues are collected,
//! and the caller decides what blocks via
//! [`Diagnostics::blocks`](crate::core::diagnostics::Diagnostics::blocks).
//!
//! # Scans
//!
//! 1. Name collisions (model vs entity, entity vs entity, entity members)
//! 2. Reserved keywords (C# and SQL tables, case-insensitive)
//! 3. Relationship-graph cycles (DFS back-edge detection, any length)
//! 4. Referential integrity over every record (required relationship
//!    present, link target exists, required property present, duplicate
//!    record Ids, buckets for unknown entities)
//!
//! # Invariants
//!
//! - Never mutates the workspace
//! - Total: collects issues, never fails
//! - Deterministic: issue order depends only on canonical content order

use std::collections::HashSet;

use crate::core::diagnostics::{codes, Diagnostics, Issue};
use crate::core::graph::RelationshipGraph;
use crate::core::keywords::{is_csharp_keyword, is_sql_keyword};
use crate::core::model::{Entity, Model, ID_PROPERTY};
use crate::core::naming::{eq_ignore_case, fold};
use crate::core::workspace::Workspace;

/// Validate the whole workspace, collecting every issue.
pub fn validate(workspace: &Workspace) -> Diagnostics {
    let mut diags = Diagnostics::new();

    scan_name_collisions(&workspace.model, &mut diags);
    scan_reserved_keywords(&workspace.model, &mut diags);
    scan_cycles(&workspace.model, &mut diags);
    scan_referential_integrity(workspace, &mut diags);

    diags
}

fn scan_name_collisions(model: &Model, diags: &mut Diagnostics) {
    let mut seen: HashSet<String> = HashSet::new();
    for entity in &model.entities {
        if eq_ignore_case(&entity.name, &model.name) {
            diags.push(Issue::error(
                codes::MODEL_NAME_COLLISION,
                format!("model/{}", entity.name),
                format!("entity '{}' collides with model name", entity.name),
            ));
        }
        if !seen.insert(fold(&entity.name)) {
            diags.push(Issue::error(
                codes::ENTITY_NAME_COLLISION,
                format!("model/{}", entity.name),
                format!("duplicate entity name '{}'", entity.name),
            ));
        }
        scan_member_collisions(entity, diags);
    }
}

/// Within one entity, properties, relationship usage names, and
/// relationship column names share a namespace with the implicit Id.
fn scan_member_collisions(entity: &Entity, diags: &mut Diagnostics) {
    let mut seen: HashSet<String> = HashSet::new();
    seen.insert(fold(ID_PROPERTY));

    let mut collide = |name: &str, diags: &mut Diagnostics| {
        if !seen.insert(fold(name)) {
            diags.push(Issue::error(
                codes::ENTITY_MEMBER_COLLISION,
                format!("model/{}/{}", entity.name, name),
                format!("member name '{}' used more than once on '{}'", name, entity.name),
            ));
        }
    };

    for prop in entity.sorted_properties() {
        collide(&prop.name, diags);
    }
    for rel in entity.sorted_relationships() {
        collide(rel.usage_name(), diags);
        collide(&rel.column_name(), diags);
    }
}

fn scan_reserved_keywords(model: &Model, diags: &mut Diagnostics) {
    let mut check = |name: &str, location: String, diags: &mut Diagnostics| {
        if is_csharp_keyword(name) {
            diags.push(Issue::error(
                codes::RESERVED_CSHARP,
                location.clone(),
                format!("identifier '{}' is a reserved C# keyword", name),
            ));
        }
        if is_sql_keyword(name) {
            diags.push(Issue::error(
                codes::RESERVED_SQL,
                location,
                format!("identifier '{}' is a reserved SQL keyword", name),
            ));
        }
    };

    check(&model.name, "model".to_string(), diags);
    for entity in &model.entities {
        check(&entity.name, format!("model/{}", entity.name), diags);
        for prop in entity.sorted_properties() {
            check(
                &prop.name,
                format!("model/{}/{}", entity.name, prop.name),
                diags,
            );
        }
        for rel in entity.sorted_relationships() {
            check(
                rel.usage_name(),
                format!("model/{}/{}", entity.name, rel.usage_name()),
                diags,
            );
            check(
                &rel.column_name(),
                format!("model/{}/{}", entity.name, rel.column_name()),
                diags,
            );
        }
    }
}

fn scan_cycles(model: &Model, diags: &mut Diagnostics) {
    let graph = RelationshipGraph::from_model(model);
    for edge in graph.find_cycles() {
        diags.push(Issue::error(
            codes::RELATIONSHIP_CYCLE,
            format!("model/{}/{}", edge.source, edge.target),
            format!(
                "relationship cycle through '{}' -> '{}'",
                edge.source, edge.target
            ),
        ));
    }

    for entity in &model.entities {
        for rel in entity.sorted_relationships() {
            if model.entity(&rel.target).is_none() {
                diags.push(Issue::error(
                    codes::RELATIONSHIP_UNKNOWN_TARGET,
                    format!("model/{}/{}", entity.name, rel.column_name()),
                    format!(
                        "relationship '{}' on '{}' targets unknown entity '{}'",
                        rel.usage_name(),
                        entity.name,
                        rel.target
                    ),
                ));
            }
        }
    }
}

fn scan_referential_integrity(workspace: &Workspace, diags: &mut Diagnostics) {
    for bucket in workspace.instance.buckets() {
        let Some(entity) = workspace.model.entity(&bucket.entity) else {
            diags.push(Issue::error(
                codes::RECORD_UNKNOWN_ENTITY,
                format!("instance/{}", bucket.entity),
                format!("records exist for unknown entity '{}'", bucket.entity),
            ));
            continue;
        };

        let mut seen_ids: HashSet<String> = HashSet::new();
        for record in &bucket.records {
            if record.id.is_empty() || !seen_ids.insert(fold(&record.id)) {
                diags.push(Issue::error(
                    codes::RECORD_ID_DUPLICATE,
                    format!("instance/{}/{}", entity.name, record.id),
                    format!(
                        "record id '{}' in '{}' is empty or duplicated",
                        record.id, entity.name
                    ),
                ));
            }

            for prop in entity.sorted_properties() {
                if prop.nullable {
                    continue;
                }
                let missing = record.value(&prop.name).map_or(true, str::is_empty);
                if missing {
                    diags.push(Issue::error(
                        codes::PROPERTY_REQUIRED_MISSING,
                        format!("instance/{}/{}/property/{}", entity.name, record.id, prop.name),
                        format!(
                            "record '{}' of '{}' is missing required property '{}'",
                            record.id, entity.name, prop.name
                        ),
                    ));
                }
            }

            for rel in entity.sorted_relationships() {
                let column = rel.column_name();
                match record.link(&column).filter(|v| !v.is_empty()) {
                    None => {
                        diags.push(Issue::error(
                            codes::RELATIONSHIP_MISSING,
                            format!(
                                "instance/{}/{}/relationship/{}",
                                entity.name, record.id, column
                            ),
                            format!(
                                "record '{}' of '{}' is missing required relationship '{}'",
                                record.id, entity.name, column
                            ),
                        ));
                    }
                    Some(target_id) => {
                        let resolves = workspace
                            .instance
                            .bucket(&rel.target)
                            .and_then(|b| b.record(target_id))
                            .is_some();
                        if !resolves {
                            diags.push(Issue::error(
                                codes::RELATIONSHIP_ORPHAN,
                                format!(
                                    "instance/{}/{}/relationship/{}/{}",
                                    entity.name, record.id, column, target_id
                                ),
                                format!(
                                    "record '{}' of '{}' references missing '{}' record '{}'",
                                    record.id, entity.name, rel.target, target_id
                                ),
                            ));
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::instance::Record;
    use crate::core::model::{Property, Relationship};

    fn workspace() -> Workspace {
        let mut ws = Workspace::new("Sales");
        ws.model.insert_entity(Entity::new("Cube"));
        ws.model.insert_entity(Entity::new("Measure"));
        ws.model
            .entity_mut("Measure")
            .unwrap()
            .relationships
            .push(Relationship::new("Cube"));
        ws
    }

    #[test]
    fn clean_workspace_validates() {
        let ws = workspace();
        let diags = validate(&ws);
        assert!(diags.is_empty(), "{:?}", diags);
    }

    #[test]
    fn entity_colliding_with_model_name_is_an_error() {
        let mut ws = workspace();
        ws.model.insert_entity(Entity::new("sales"));
        let diags = validate(&ws);
        assert!(diags
            .issues()
            .iter()
            .any(|i| i.code == codes::MODEL_NAME_COLLISION));
    }

    #[test]
    fn member_collision_is_an_error() {
        let mut ws = workspace();
        // "Cube" already taken by the relationship usage name.
        ws.model
            .entity_mut("Measure")
            .unwrap()
            .properties
            .push(Property::new("Cube"));
        let diags = validate(&ws);
        assert!(diags
            .issues()
            .iter()
            .any(|i| i.code == codes::ENTITY_MEMBER_COLLISION));
    }

    #[test]
    fn reserved_keywords_are_flagged() {
        let mut ws = workspace();
        ws.model
            .entity_mut("Cube")
            .unwrap()
            .properties
            .push(Property::new("Select"));
        let diags = validate(&ws);
        assert!(diags.issues().iter().any(|i| i.code == codes::RESERVED_SQL));
    }

    #[test]
    fn cycle_is_flagged_and_clears_when_edge_removed() {
        let mut ws = workspace();
        ws.model
            .entity_mut("Cube")
            .unwrap()
            .relationships
            .push(Relationship::new("Measure"));
        let diags = validate(&ws);
        assert!(diags
            .issues()
            .iter()
            .any(|i| i.code == codes::RELATIONSHIP_CYCLE));

        ws.model.entity_mut("Cube").unwrap().relationships.clear();
        let diags = validate(&ws);
        assert!(!diags
            .issues()
            .iter()
            .any(|i| i.code == codes::RELATIONSHIP_CYCLE));
    }

    #[test]
    fn orphan_link_reports_structured_location() {
        let mut ws = workspace();
        let mut record = Record::new("7");
        record.links.insert("CubeId".to_string(), "99".to_string());
        ws.instance.bucket_entry("Measure").records.push(record);

        let diags = validate(&ws);
        let orphan = diags
            .issues()
            .iter()
            .find(|i| i.code == codes::RELATIONSHIP_ORPHAN)
            .expect("orphan issue");
        assert_eq!(orphan.location, "instance/Measure/7/relationship/CubeId/99");
    }

    #[test]
    fn off_case_keys_satisfy_required_members() {
        // Hand-edited shards may carry keys in a different case; lookup
        // matches the writer's case-insensitive resolution.
        let mut ws = workspace();
        ws.model
            .entity_mut("Measure")
            .unwrap()
            .properties
            .push(Property::new("Unit"));
        ws.instance.bucket_entry("Cube").records.push(Record::new("1"));

        let mut record = Record::new("7");
        record.links.insert("cubeid".to_string(), "1".to_string());
        record.values.insert("unit".to_string(), "count".to_string());
        ws.instance.bucket_entry("Measure").records.push(record);

        let diags = validate(&ws);
        assert!(diags.is_empty(), "{:?}", diags);
    }

    #[test]
    fn missing_required_relationship_is_an_error() {
        let mut ws = workspace();
        ws.instance
            .bucket_entry("Measure")
            .records
            .push(Record::new("7"));
        let diags = validate(&ws);
        assert!(diags
            .issues()
            .iter()
            .any(|i| i.code == codes::RELATIONSHIP_MISSING));
    }

    #[test]
    fn missing_required_property_is_an_error() {
        let mut ws = workspace();
        ws.model
            .entity_mut("Cube")
            .unwrap()
            .properties
            .push(Property::new("Purpose"));
        ws.instance.bucket_entry("Cube").records.push(Record::new("1"));
        let diags = validate(&ws);
        assert!(diags
            .issues()
            .iter()
            .any(|i| i.code == codes::PROPERTY_REQUIRED_MISSING
                && i.location == "instance/Cube/1/property/Purpose"));
    }

    #[test]
    fn nullable_property_may_be_absent() {
        let mut ws = workspace();
        let mut prop = Property::new("Purpose");
        prop.nullable = true;
        ws.model.entity_mut("Cube").unwrap().properties.push(prop);
        ws.instance.bucket_entry("Cube").records.push(Record::new("1"));
        let diags = validate(&ws);
        assert!(diags.is_empty(), "{:?}", diags);
    }

    #[test]
    fn bucket_for_unknown_entity_is_an_error() {
        let mut ws = workspace();
        ws.instance.bucket_entry("Ghost").records.push(Record::new("1"));
        let diags = validate(&ws);
        assert!(diags
            .issues()
            .iter()
            .any(|i| i.code == codes::RECORD_UNKNOWN_ENTITY));
    }
}
