use egoline::constraints::{Skeleton, WeightBucket, Zone};
use egoline::model::Interaction;
use egoline::network::Network;
use std::collections::BTreeMap;

fn it(s: &str, t: &str, w: f64) -> Interaction {
    Interaction::new(s, t, "t1", w)
}

fn skeleton(net: &Network) -> &Skeleton {
    let sid = net.ego_session(0).unwrap();
    net.session(sid).skeleton.as_ref().unwrap()
}

fn names(net: &Network, ids: &[egoline::ActorId]) -> Vec<String> {
    ids.iter().map(|&a| net.actor(a).name.clone()).collect()
}

fn bucket_names(net: &Network, buckets: &[WeightBucket]) -> Vec<(f64, Vec<String>)> {
    buckets
        .iter()
        .map(|b| (b.weight, names(net, &b.actors)))
        .collect()
}

#[test]
fn zones_follow_direction_weight_and_hop() {
    let data = vec![
        it("A", "E", 1.0),
        it("C", "E", 1.0),
        it("D", "E", 2.0),
        it("I", "E", 2.0),
        it("E", "F", 3.0),
        it("E", "G", 3.0),
        it("E", "H", 1.0),
        it("B", "A", 4.0),
        it("F", "X", 2.0),
    ];
    let net = Network::build("E", &data, &BTreeMap::new()).unwrap();
    let sk = skeleton(&net);

    assert_eq!(names(&net, &sk.above), vec!["B"]);
    assert_eq!(
        bucket_names(&net, &sk.sources),
        vec![
            (1.0, vec!["A".to_string(), "C".to_string()]),
            // every other bucket is reversed
            (2.0, vec!["I".to_string(), "D".to_string()]),
        ]
    );
    assert_eq!(
        bucket_names(&net, &sk.targets),
        vec![
            (3.0, vec!["F".to_string(), "G".to_string()]),
            (1.0, vec!["H".to_string()]),
        ]
    );
    assert_eq!(names(&net, &sk.below), vec!["X"]);

    let sid = net.ego_session(0).unwrap();
    assert_eq!(
        names(&net, &net.session(sid).members),
        vec!["B", "A", "C", "I", "D", "E", "F", "G", "H", "X"]
    );
}

#[test]
fn zones_partition_the_session() {
    let data = vec![
        it("A", "E", 1.0),
        it("E", "B", 2.0),
        it("A", "B", 5.0),
        it("B", "C", 1.0),
        it("A", "D", 1.0),
    ];
    let net = Network::build("E", &data, &BTreeMap::new()).unwrap();
    let sk = skeleton(&net);
    let sid = net.ego_session(0).unwrap();
    let mut flat = sk.flatten();
    assert_eq!(flat.len(), net.session(sid).members.len());
    flat.sort();
    flat.dedup();
    assert_eq!(flat.len(), net.session(sid).members.len());
    assert_eq!(sk.zone_of(net.ego), Some(Zone::Ego));
    assert_eq!(sk.zone_of(net.actor_id("C").unwrap()), Some(Zone::Below));
    assert_eq!(sk.zone_of(net.actor_id("D").unwrap()), Some(Zone::Above));
}

#[test]
fn reciprocal_edges_keep_the_heavier_direction() {
    let data = vec![it("E", "A", 3.0), it("A", "E", 1.0)];
    let net = Network::build("E", &data, &BTreeMap::new()).unwrap();
    let sk = skeleton(&net);
    assert!(sk.sources.is_empty());
    assert_eq!(bucket_names(&net, &sk.targets), vec![(3.0, vec!["A".to_string()])]);
}

#[test]
fn tied_reciprocal_edges_leave_the_actor_unconstrained() {
    let data = vec![it("E", "A", 2.0), it("A", "E", 2.0), it("E", "B", 1.0)];
    let net = Network::build("E", &data, &BTreeMap::new()).unwrap();
    let sk = skeleton(&net);
    assert!(sk.sources.is_empty());
    assert_eq!(bucket_names(&net, &sk.targets), vec![(1.0, vec!["B".to_string()])]);
    assert_eq!(names(&net, &sk.below), vec!["A"]);
    assert_eq!(names(&net, &sk.flatten()), vec!["E", "B", "A"]);
    assert_eq!(names(&net, &sk.tied), vec!["A"]);
}

#[test]
fn tied_neighbours_are_not_pulled_into_the_two_hop_zones() {
    let data = vec![it("E", "B", 1.0), it("B", "E", 1.0), it("B", "C", 1.0)];
    let net = Network::build("E", &data, &BTreeMap::new()).unwrap();
    let sk = skeleton(&net);
    let (b, c) = (net.actor_id("B").unwrap(), net.actor_id("C").unwrap());

    assert!(sk.sources.is_empty() && sk.targets.is_empty());
    assert_eq!(names(&net, &sk.below), vec!["C", "B"]);
    assert_eq!(names(&net, &sk.tied), vec!["B"]);
    assert_eq!(sk.hops_of(b), Some(1));
    assert_eq!(sk.hops_of(c), Some(2));
    assert_eq!(sk.hops_of(net.ego), Some(0));
}

#[test]
fn buckets_sort_by_category_before_name() {
    let data = vec![it("A", "E", 1.0), it("C", "E", 1.0), it("B", "E", 1.0)];
    let categories: BTreeMap<String, String> = [("A", "z"), ("B", "z"), ("C", "a")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    let net = Network::build("E", &data, &categories).unwrap();
    let sk = skeleton(&net);
    assert_eq!(
        bucket_names(&net, &sk.sources),
        vec![(1.0, vec!["C".to_string(), "A".to_string(), "B".to_string()])]
    );
}

#[test]
fn lone_ego_gets_a_singleton_skeleton() {
    let data = vec![it("E", "E", 1.0)];
    let net = Network::build("E", &data, &BTreeMap::new()).unwrap();
    let sk = skeleton(&net);
    assert_eq!(sk.flatten(), vec![net.ego]);
    assert_eq!(sk.len(), 1);
}
