use egoline::{Error, Interaction, LayoutInput, Minimize, Scope, layout};
use serde_json::json;
use std::collections::BTreeMap;

fn it(s: &str, t: &str, ts: &str, w: f64) -> Interaction {
    Interaction::new(s, t, ts, w)
}

fn input(interactions: Vec<Interaction>) -> LayoutInput {
    LayoutInput {
        ego: "E".to_string(),
        interactions,
        ..LayoutInput::default()
    }
}

#[test]
fn tables_cover_every_actor_and_timestamp() {
    let out = layout(&input(vec![
        it("A", "E", "t1", 1.0),
        it("E", "B", "t1", 1.0),
        it("E", "B", "t2", 1.0),
        it("B", "C", "t2", 1.0),
    ]))
    .unwrap();

    assert_eq!(out.timestamps, vec!["t1", "t2"]);
    assert_eq!(out.actors, vec!["A", "E", "B", "C"]);
    assert_eq!(out.ranks.rows().len(), 4);
    assert!(out.ranks.rows().iter().all(|r| r.len() == 2));
    assert_eq!(out.column_names(1), vec!["E", "B", "C"]);
    assert_eq!(out.rank_of("C", 1), Some(3));
    assert_eq!(out.rank_of("C", 0), None);
    assert_eq!(out.height_of("E", 0), out.height_of("E", 1));
    assert_eq!(out.session_alignment.len(), 1);
}

#[test]
fn missing_ego_is_an_error() {
    let err = layout(&input(vec![it("A", "B", "t1", 1.0)])).unwrap_err();
    assert!(matches!(err, Error::EgoNotFound { ref ego } if ego == "E"));
}

#[test]
fn negative_weight_is_an_error() {
    let err = layout(&input(vec![it("A", "E", "t1", -1.0)])).unwrap_err();
    assert!(matches!(err, Error::InvalidWeight { weight, .. } if weight == -1.0));
}

#[test]
fn empty_input_gives_empty_tables() {
    let out = layout(&input(Vec::new())).unwrap();
    assert!(out.timestamps.is_empty());
    assert!(out.columns.is_empty());
    assert_eq!(out.metrics.span, 0.0);
    assert_eq!(out.metrics.crossings, 0);
}

#[test]
fn context_is_passed_through_per_cell() {
    let mut data = input(vec![it("A", "E", "t1", 1.0), it("A", "E", "t2", 1.0)]);
    data.context = BTreeMap::from([(
        "A".to_string(),
        BTreeMap::from([("t2".to_string(), 3.5)]),
    )]);

    let out = layout(&data).unwrap();
    let a = out.actor_id("A").unwrap().0;
    let e = out.actor_id("E").unwrap().0;
    assert_eq!(out.context[a], vec![None, Some(3.5)]);
    assert_eq!(out.context[e], vec![None, None]);
}

#[test]
fn absent_cells_serialise_as_sentinels() {
    let out = layout(&input(vec![
        it("A", "E", "t1", 1.0),
        it("E", "B", "t1", 1.0),
        it("E", "B", "t2", 1.0),
    ]))
    .unwrap();
    let value = serde_json::to_value(&out).unwrap();

    assert_eq!(value["actors"], json!(["A", "E", "B"]));
    assert_eq!(value["heights"][0][1], json!(-1.0));
    assert_eq!(value["ranks"][0][1], json!(0));
    assert_eq!(value["alignment"][0][0], json!(-1));
    assert_eq!(value["alignment"][1][0], json!(1));
    assert!(value["sessionAlignment"].is_array());
    assert!(value["metrics"]["bends"].is_number());
}

#[test]
fn json_input_with_partial_config() {
    let raw = r#"{
        "ego": "E",
        "interactions": [
            {"sourceId": "A", "targetId": "E", "timestampLabel": "t1", "weight": 1},
            {"sourceId": "A", "targetId": "E", "timestampLabel": "t2", "weight": 1}
        ],
        "config": {"minimize": "line", "minSpacing": 10}
    }"#;
    let data: LayoutInput = serde_json::from_str(raw).unwrap();
    assert_eq!(data.config.iterations, 10);

    let out = layout(&data).unwrap();
    assert_eq!(out.height_of("A", 0), Some(0.0));
    assert_eq!(out.height_of("E", 0), Some(10.0));
    assert_eq!(out.height_of("E", 1), Some(10.0));
}

#[test]
fn timestamp_scope_keeps_disconnected_sessions() {
    let data = vec![it("A", "E", "t1", 1.0), it("C", "D", "t1", 1.0)];

    let two_hop = layout(&input(data.clone())).unwrap();
    assert_eq!(two_hop.actors, vec!["A", "E"]);

    let mut wide = input(data);
    wide.config.scope = Scope::Timestamps;
    let out = layout(&wide).unwrap();
    assert_eq!(out.actors, vec!["A", "E", "C", "D"]);
    assert_eq!(out.column_names(0), vec!["A", "E", "C", "D"]);

    // The outer session sits one block gap below ego's session.
    assert_eq!(out.height_of("A", 0), Some(0.0));
    assert_eq!(out.height_of("E", 0), Some(5.0));
    assert_eq!(out.height_of("C", 0), Some(15.0));
    assert_eq!(out.height_of("D", 0), Some(20.0));

    let c = out.actor_id("C").unwrap();
    let outer = out.sessions.iter().find(|s| s.members.contains(&c)).unwrap().id;
    assert_eq!(out.slots.order, vec![0, 1]);
    assert_eq!(out.slots.slot_of(outer), Some(1));
}

#[test]
fn freed_slots_are_reused_before_allocating() {
    let mut data = input(vec![
        it("A", "E", "t1", 1.0),
        it("C", "D", "t1", 1.0),
        it("F", "G", "t1", 1.0),
        it("A", "E", "t2", 1.0),
        it("A", "E", "t3", 1.0),
        it("H", "I", "t3", 1.0),
    ]);
    data.config.scope = Scope::Timestamps;
    let out = layout(&data).unwrap();

    assert_eq!(out.column_names(0), vec!["C", "D", "F", "G", "A", "E"]);
    assert_eq!(out.column_names(2), vec!["H", "I", "A", "E"]);

    let session_with = |name: &str| {
        let a = out.actor_id(name).unwrap();
        out.sessions.iter().find(|s| s.members.contains(&a)).unwrap().id
    };
    // Both outer sessions at t1 need a slot of their own; the inner one gets the inner slot.
    assert_eq!(out.slots.slot_of(session_with("F")), Some(1));
    assert_eq!(out.slots.slot_of(session_with("C")), Some(2));
    // H/I has no predecessor and takes the nearest free slot instead of a new one.
    assert_eq!(out.slots.slot_of(session_with("H")), Some(1));
    assert_eq!(out.slots.order, vec![2, 1, 0]);
}

#[test]
fn zero_min_spacing_is_rejected() {
    let mut data = input(vec![it("A", "E", "t1", 1.0), it("A", "E", "t2", 1.0)]);
    data.config.min_spacing = 0.0;
    data.config.minimize = Minimize::Line;
    let err = layout(&data).unwrap_err();
    assert!(matches!(err, Error::InvalidConfig { .. }));
}

#[test]
fn identical_input_gives_identical_output() {
    let data = input(vec![
        it("A", "E", "t1", 2.0),
        it("B", "E", "t1", 2.0),
        it("E", "C", "t2", 1.0),
        it("C", "D", "t2", 1.0),
        it("A", "E", "t3", 1.0),
    ]);
    let first = serde_json::to_string(&layout(&data).unwrap()).unwrap();
    let second = serde_json::to_string(&layout(&data).unwrap()).unwrap();
    assert_eq!(first, second);
}
