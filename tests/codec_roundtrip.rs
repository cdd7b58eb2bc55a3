//! Integration tests for the canonical codec: round-trip, determinism,
//! and snapshot coverage of the canonical output shape.

use std::collections::BTreeMap;

use trellis::codec::{parse_model, parse_shard, serialize_model, serialize_shard};
use trellis::core::instance::Record;
use trellis::core::model::{Entity, Model, Property, Relationship};
use trellis::core::ops::{apply, Operation, RowPatch};
use trellis::core::workspace::Workspace;

fn sample_model() -> Model {
    let mut model = Model::new("Warehouse");

    let mut server = Entity::new("Server");
    server.properties.push(Property {
        name: "Host".into(),
        data_type: "string".into(),
        nullable: false,
    });
    model.insert_entity(server);

    let mut cube = Entity::new("Cube");
    cube.plural = Some("Cubage".into());
    cube.properties.push(Property {
        name: "Purpose".into(),
        data_type: "text".into(),
        nullable: true,
    });
    cube.relationships.push(Relationship {
        target: "Server".into(),
        role: Some("Host".into()),
        column: None,
    });
    model.insert_entity(cube);

    let mut measure = Entity::new("Measure");
    measure.relationships.push(Relationship::new("Cube"));
    model.insert_entity(measure);

    model
}

#[test]
fn model_round_trips_structurally() {
    let model = sample_model();
    let doc = serialize_model(&model).unwrap();
    let parsed = parse_model(&doc).unwrap();
    assert_eq!(parsed, model);
}

#[test]
fn shard_round_trips_structurally() {
    let model = sample_model();
    let mut record = Record::new("m1");
    record.links.insert("CubeId".into(), "c1".into());
    let records = vec![record];

    let doc = serialize_shard(&model, "Measure", &records).unwrap();
    let bucket = parse_shard(&doc).unwrap();
    assert_eq!(bucket.entity, "Measure");
    assert_eq!(bucket.records, records);
}

#[test]
fn serialization_is_byte_deterministic() {
    let model = sample_model();
    let first = serialize_model(&model).unwrap();
    let second = serialize_model(&model).unwrap();
    assert_eq!(first, second);

    // Insertion order must not leak into the output.
    let mut reordered = Model::new("Warehouse");
    for entity in model.entities.iter().rev() {
        reordered.insert_entity(entity.clone());
    }
    assert_eq!(serialize_model(&reordered).unwrap(), first);
}

#[test]
fn shard_output_is_independent_of_insertion_history() {
    let model = sample_model();
    let mut a = Record::new("1");
    a.links.insert("CubeId".into(), "c1".into());
    let mut b = Record::new("2");
    b.links.insert("CubeId".into(), "c1".into());

    let forward = serialize_shard(&model, "Measure", &[a.clone(), b.clone()]).unwrap();
    let reversed = serialize_shard(&model, "Measure", &[b, a]).unwrap();
    assert_eq!(forward, reversed);
}

#[test]
fn values_with_special_characters_round_trip() {
    let model = sample_model();
    let mut ws = Workspace::new("Warehouse");
    ws.model = model;
    apply(
        &mut ws,
        &Operation::BulkUpsertRows {
            entity: "Server".into(),
            rows: vec![RowPatch {
                id: "s<1>".into(),
                values: BTreeMap::from([(
                    "Host".to_string(),
                    Some("db & \"analytics\" <prod>".to_string()),
                )]),
                ..Default::default()
            }],
        },
    )
    .unwrap();

    let doc = serialize_shard(&ws.model, "Server", ws.instance.records("Server")).unwrap();
    let bucket = parse_shard(&doc).unwrap();
    assert_eq!(bucket.records[0].id, "s<1>");
    assert_eq!(
        bucket.records[0].value("Host"),
        Some("db & \"analytics\" <prod>")
    );
}

#[test]
fn whitespace_only_values_round_trip() {
    let model = sample_model();
    let mut record = Record::new("s1");
    record.values.insert("Host".into(), " ".into());

    let doc = serialize_shard(&model, "Server", &[record.clone()]).unwrap();
    let bucket = parse_shard(&doc).unwrap();
    assert_eq!(bucket.records[0].value("Host"), Some(" "));
    assert_eq!(bucket.records, vec![record]);
    assert_eq!(
        serialize_shard(&model, "Server", &bucket.records).unwrap(),
        doc
    );
}

#[test]
fn canonical_model_document_snapshot() {
    insta::assert_snapshot!(serialize_model(&sample_model()).unwrap());
}

#[test]
fn canonical_shard_document_snapshot() {
    let model = sample_model();
    let mut r1 = Record::new("c1");
    r1.links.insert("HostId".into(), "s1".into());
    r1.values.insert("Purpose".into(), "analytics".into());
    let mut r2 = Record::new("c2");
    r2.links.insert("HostId".into(), "s1".into());

    let doc = serialize_shard(&model, "Cube", &[r2, r1]).unwrap();
    insta::assert_snapshot!(doc);
}

#[test]
fn parse_then_serialize_is_identity_on_canonical_documents() {
    let model = sample_model();
    let doc = serialize_model(&model).unwrap();
    let reparsed = parse_model(&doc).unwrap();
    assert_eq!(serialize_model(&reparsed).unwrap(), doc);
}
