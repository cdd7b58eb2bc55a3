//! codec::writer
//!
//! Canonical serialization of models and instance shards.
//!
//! Every emit path validates before writing; see the module docs on
//! [`crate::codec`] for the canonicalization rules.

use std::fmt::Write as _;

use super::escape::{escape_attribute, escape_text};
use super::CodecError;
use crate::core::instance::Record;
use crate::core::model::{Entity, Model};
use crate::core::naming::{eq_ignore_case, is_valid_identifier};

fn check_identifier(name: &str) -> Result<(), CodecError> {
    if !is_valid_identifier(name) {
        return Err(CodecError::InvalidIdentifier {
            name: name.to_string(),
        });
    }
    Ok(())
}

fn check_model_identifiers(model: &Model) -> Result<(), CodecError> {
    check_identifier(&model.name)?;
    for entity in &model.entities {
        check_identifier(&entity.name)?;
        for prop in &entity.properties {
            check_identifier(&prop.name)?;
        }
        for rel in &entity.relationships {
            check_identifier(&rel.target)?;
            check_identifier(rel.usage_name())?;
            check_identifier(&rel.column_name())?;
        }
    }
    Ok(())
}

/// Serialize a model to its canonical schema document.
pub fn serialize_model(model: &Model) -> Result<String, CodecError> {
    check_model_identifiers(model)?;

    let mut entities: Vec<&Entity> = model.entities.iter().collect();
    entities.sort_by(|a, b| a.name.cmp(&b.name));

    let mut out = String::new();
    if entities.is_empty() {
        let _ = writeln!(out, "<Model Name=\"{}\"/>", escape_attribute(&model.name));
        return Ok(out);
    }

    let _ = writeln!(out, "<Model Name=\"{}\">", escape_attribute(&model.name));
    for entity in entities {
        write_entity(&mut out, entity);
    }
    out.push_str("</Model>\n");
    Ok(out)
}

fn write_entity(out: &mut String, entity: &Entity) {
    let mut open = format!("  <Entity Name=\"{}\"", escape_attribute(&entity.name));
    if !entity.has_default_plural() {
        let _ = write!(
            open,
            " Plural=\"{}\"",
            escape_attribute(&entity.plural_label())
        );
    }

    if entity.properties.is_empty() && entity.relationships.is_empty() {
        let _ = writeln!(out, "{}/>", open);
        return;
    }

    let _ = writeln!(out, "{}>", open);
    for prop in entity.sorted_properties() {
        let mut line = format!("    <Property Name=\"{}\"", escape_attribute(&prop.name));
        if !prop.has_default_type() {
            let _ = write!(line, " Type=\"{}\"", escape_attribute(&prop.data_type));
        }
        if prop.nullable {
            line.push_str(" Nullable=\"true\"");
        }
        let _ = writeln!(out, "{}/>", line);
    }
    for rel in entity.sorted_relationships() {
        let mut line = format!(
            "    <Relationship Target=\"{}\"",
            escape_attribute(&rel.target)
        );
        if !rel.has_default_role() {
            let _ = write!(line, " Role=\"{}\"", escape_attribute(rel.usage_name()));
        }
        if !rel.has_default_column() {
            let _ = write!(line, " Column=\"{}\"", escape_attribute(&rel.column_name()));
        }
        let _ = writeln!(out, "{}/>", line);
    }
    out.push_str("  </Entity>\n");
}

/// Serialize one entity's records to its canonical shard document.
///
/// The model provides canonical member ordering and is the authority the
/// records are re-validated against.
pub fn serialize_shard(
    model: &Model,
    entity_name: &str,
    records: &[Record],
) -> Result<String, CodecError> {
    check_model_identifiers(model)?;
    let entity = model
        .entity(entity_name)
        .ok_or_else(|| CodecError::UnknownEntity {
            entity: entity_name.to_string(),
        })?;

    let columns: Vec<String> = entity
        .sorted_relationships()
        .iter()
        .map(|r| r.column_name())
        .collect();

    let mut sorted: Vec<&Record> = records.iter().collect();
    sorted.sort_by(|a, b| a.id.cmp(&b.id));

    let mut out = String::new();
    if sorted.is_empty() {
        let _ = writeln!(
            out,
            "<Records Entity=\"{}\"/>",
            escape_attribute(&entity.name)
        );
        return Ok(out);
    }

    let _ = writeln!(out, "<Records Entity=\"{}\">", escape_attribute(&entity.name));
    for record in sorted {
        write_record(&mut out, entity, &columns, record)?;
    }
    out.push_str("</Records>\n");
    Ok(out)
}

fn write_record(
    out: &mut String,
    entity: &Entity,
    columns: &[String],
    record: &Record,
) -> Result<(), CodecError> {
    if record.id.is_empty() {
        return Err(CodecError::EmptyRecordId {
            entity: entity.name.clone(),
        });
    }
    for key in record.values.keys() {
        if entity.property(key).is_none() {
            return Err(CodecError::UnknownProperty {
                entity: entity.name.clone(),
                id: record.id.clone(),
                property: key.clone(),
            });
        }
    }
    for key in record.links.keys() {
        if !columns.iter().any(|c| eq_ignore_case(c, key)) {
            return Err(CodecError::UnknownRelationship {
                entity: entity.name.clone(),
                id: record.id.clone(),
                column: key.clone(),
            });
        }
    }

    // Lookups are case-insensitive; emitted names always use the
    // schema's casing so the output stays canonical.
    let mut open = format!("  <Record Id=\"{}\"", escape_attribute(&record.id));
    for column in columns {
        let value = record
            .links
            .iter()
            .find(|(k, _)| eq_ignore_case(k, column))
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty());
        match value {
            Some(value) => {
                let _ = write!(open, " {}=\"{}\"", column, escape_attribute(value));
            }
            None => {
                return Err(CodecError::MissingRelationship {
                    entity: entity.name.clone(),
                    id: record.id.clone(),
                    column: column.clone(),
                });
            }
        }
    }

    // Property values present but empty are treated as absent: the
    // canonical form never emits an empty element.
    let values: Vec<(&str, &str)> = entity
        .sorted_properties()
        .iter()
        .filter_map(|p| {
            record
                .values
                .iter()
                .find(|(k, _)| eq_ignore_case(k, &p.name))
                .map(|(_, v)| (p.name.as_str(), v.as_str()))
        })
        .filter(|(_, v)| !v.is_empty())
        .collect();

    if values.is_empty() {
        let _ = writeln!(out, "{}/>", open);
        return Ok(());
    }

    let _ = writeln!(out, "{}>", open);
    for (name, value) in values {
        let _ = writeln!(out, "    <{}>{}</{}>", name, escape_text(value), name);
    }
    out.push_str("  </Record>\n");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{Property, Relationship};

    fn model() -> Model {
        let mut model = Model::new("Sales");
        let mut cube = Entity::new("Cube");
        cube.properties.push(Property {
            name: "Purpose".into(),
            data_type: "string".into(),
            nullable: true,
        });
        model.insert_entity(cube);
        let mut measure = Entity::new("Measure");
        measure.relationships.push(Relationship::new("Cube"));
        model.insert_entity(measure);
        model
    }

    #[test]
    fn empty_model_is_self_closing() {
        let out = serialize_model(&Model::new("Sales")).unwrap();
        assert_eq!(out, "<Model Name=\"Sales\"/>\n");
    }

    #[test]
    fn model_omits_defaults() {
        let out = serialize_model(&model()).unwrap();
        assert_eq!(
            out,
            "<Model Name=\"Sales\">\n  <Entity Name=\"Cube\">\n    <Property Name=\"Purpose\" Nullable=\"true\"/>\n  </Entity>\n  <Entity Name=\"Measure\">\n    <Relationship Target=\"Cube\"/>\n  </Entity>\n</Model>\n"
        );
    }

    #[test]
    fn invalid_identifier_refuses_to_serialize() {
        let mut bad = model();
        bad.entity_mut("Cube").unwrap().name = "Data Cube".into();
        assert!(matches!(
            serialize_model(&bad),
            Err(CodecError::InvalidIdentifier { .. })
        ));
    }

    #[test]
    fn shard_rows_sort_by_id_with_links_as_attributes() {
        let m = model();
        let mut r2 = Record::new("2");
        r2.links.insert("CubeId".into(), "1".into());
        let mut r1 = Record::new("1");
        r1.links.insert("CubeId".into(), "1".into());
        let out = serialize_shard(&m, "Measure", &[r2, r1]).unwrap();
        assert_eq!(
            out,
            "<Records Entity=\"Measure\">\n  <Record Id=\"1\" CubeId=\"1\"/>\n  <Record Id=\"2\" CubeId=\"1\"/>\n</Records>\n"
        );
    }

    #[test]
    fn property_values_are_sorted_child_elements() {
        let mut m = model();
        m.entity_mut("Cube")
            .unwrap()
            .properties
            .push(Property {
                name: "Label".into(),
                data_type: "string".into(),
                nullable: true,
            });
        let mut r = Record::new("1");
        r.values.insert("Purpose".into(), "analytics & more".into());
        r.values.insert("Label".into(), "main".into());
        let out = serialize_shard(&m, "Cube", &[r]).unwrap();
        assert_eq!(
            out,
            "<Records Entity=\"Cube\">\n  <Record Id=\"1\">\n    <Label>main</Label>\n    <Purpose>analytics &amp; more</Purpose>\n  </Record>\n</Records>\n"
        );
    }

    #[test]
    fn missing_required_link_refuses_to_serialize() {
        let m = model();
        let r = Record::new("1");
        assert!(matches!(
            serialize_shard(&m, "Measure", &[r]),
            Err(CodecError::MissingRelationship { .. })
        ));
    }

    #[test]
    fn unknown_value_key_refuses_to_serialize() {
        let m = model();
        let mut r = Record::new("1");
        r.values.insert("Ghost".into(), "x".into());
        assert!(matches!(
            serialize_shard(&m, "Cube", &[r]),
            Err(CodecError::UnknownProperty { .. })
        ));
    }

    #[test]
    fn unknown_shard_entity_refuses_to_serialize() {
        assert!(matches!(
            serialize_shard(&model(), "Ghost", &[]),
            Err(CodecError::UnknownEntity { .. })
        ));
    }

    #[test]
    fn serialization_is_deterministic() {
        let m = model();
        assert_eq!(serialize_model(&m).unwrap(), serialize_model(&m).unwrap());
    }
}
