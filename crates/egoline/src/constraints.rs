//! Constraint skeleton: the five ordered zones of the session that contains ego.
//!
//! Zones, top to bottom: two-hop actors anchored above, actors pointing to ego (bucketed by
//! weight), ego, actors ego points to (bucketed by weight), two-hop actors anchored below.

use crate::model::{ActorId, Edge, SessionKind};
use crate::network::Network;
use indexmap::IndexMap;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Zone {
    Above,
    Sources,
    Ego,
    Targets,
    Below,
}

impl Zone {
    /// Hop distance from ego.
    pub fn hops(self) -> usize {
        match self {
            Zone::Ego => 0,
            Zone::Sources | Zone::Targets => 1,
            Zone::Above | Zone::Below => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeightBucket {
    pub weight: f64,
    pub actors: Vec<ActorId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Skeleton {
    pub above: Vec<ActorId>,
    pub sources: Vec<WeightBucket>,
    pub ego: ActorId,
    pub targets: Vec<WeightBucket>,
    pub below: Vec<ActorId>,
    /// Ego neighbours whose reciprocal edges tied. They sit at the bottom of `below` but stay
    /// one hop from ego.
    pub tied: Vec<ActorId>,
}

impl Skeleton {
    pub fn flatten(&self) -> Vec<ActorId> {
        let mut out = Vec::with_capacity(self.len());
        out.extend(&self.above);
        out.extend(self.sources.iter().flat_map(|b| b.actors.iter()));
        out.push(self.ego);
        out.extend(self.targets.iter().flat_map(|b| b.actors.iter()));
        out.extend(&self.below);
        out
    }

    pub fn len(&self) -> usize {
        self.above.len()
            + self.sources.iter().map(|b| b.actors.len()).sum::<usize>()
            + 1
            + self.targets.iter().map(|b| b.actors.len()).sum::<usize>()
            + self.below.len()
    }

    /// Never true: ego always occupies its own zone.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn zone_of(&self, actor: ActorId) -> Option<Zone> {
        if actor == self.ego {
            Some(Zone::Ego)
        } else if self.above.contains(&actor) {
            Some(Zone::Above)
        } else if self.sources.iter().any(|b| b.actors.contains(&actor)) {
            Some(Zone::Sources)
        } else if self.targets.iter().any(|b| b.actors.contains(&actor)) {
            Some(Zone::Targets)
        } else if self.below.contains(&actor) {
            Some(Zone::Below)
        } else {
            None
        }
    }

    pub fn hops_of(&self, actor: ActorId) -> Option<usize> {
        if self.tied.contains(&actor) {
            return Some(1);
        }
        self.zone_of(actor).map(Zone::hops)
    }

    /// The reorderable groups in top-to-bottom order. Ego's singleton zone is never included.
    pub fn groups_mut(&mut self) -> Vec<&mut Vec<ActorId>> {
        let mut out: Vec<&mut Vec<ActorId>> = Vec::new();
        out.push(&mut self.above);
        out.extend(self.sources.iter_mut().map(|b| &mut b.actors));
        out.extend(self.targets.iter_mut().map(|b| &mut b.actors));
        out.push(&mut self.below);
        out
    }
}

/// Derives skeletons for every contact session containing ego and reorders its members to match.
pub fn attach(network: &mut Network) {
    for t in 0..network.timestamp_count() {
        let Some(sid) = network.ego_session(t) else {
            continue;
        };
        if network.session(sid).kind != SessionKind::Contact {
            continue;
        }
        let skeleton = derive(network, t);
        let session = network.session_mut(sid);
        session.members = skeleton.flatten();
        session.skeleton = Some(skeleton);
    }
}

/// Classifies every member of ego's session at `t` into one of the five zones.
pub fn derive(network: &Network, t: usize) -> Skeleton {
    let ego = network.ego;
    let members: Vec<ActorId> = network
        .ego_session(t)
        .map(|s| network.session(s).members.clone())
        .unwrap_or_else(|| vec![ego]);

    let edges: Vec<Edge> = dominant_edges(
        network.edges[t]
            .iter()
            .filter(|e| e.source != e.target && members.contains(&e.source)),
    );

    let mut sources: Vec<WeightBucket> = Vec::new();
    let mut targets: Vec<WeightBucket> = Vec::new();
    for e in &edges {
        if e.target == ego {
            push_bucket(&mut sources, e.weight, e.source);
        } else if e.source == ego {
            push_bucket(&mut targets, e.weight, e.target);
        }
    }
    sources.sort_by(|a, b| a.weight.total_cmp(&b.weight));
    targets.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    for buckets in [&mut sources, &mut targets] {
        for (k, bucket) in buckets.iter_mut().enumerate() {
            bucket.actors.sort_by(|&a, &b| {
                let (x, y) = (network.actor(a), network.actor(b));
                x.category.cmp(&y.category).then_with(|| x.name.cmp(&y.name))
            });
            if k % 2 == 1 {
                bucket.actors.reverse();
            }
        }
    }

    let mut zones: IndexMap<ActorId, Zone> = IndexMap::new();
    zones.insert(ego, Zone::Ego);
    for b in &sources {
        for &a in &b.actors {
            zones.insert(a, Zone::Sources);
        }
    }
    for b in &targets {
        for &a in &b.actors {
            zones.insert(a, Zone::Targets);
        }
    }

    let tied: Vec<ActorId> = members
        .iter()
        .copied()
        .filter(|a| !zones.contains_key(a))
        .filter(|&a| {
            network.edges[t].iter().any(|e| {
                (e.source == a && e.target == ego) || (e.source == ego && e.target == a)
            })
        })
        .collect();

    let mut two_hop: Vec<&Edge> = edges
        .iter()
        .filter(|e| e.source != ego && e.target != ego)
        .collect();
    two_hop.sort_by(|a, b| b.weight.total_cmp(&a.weight));

    let mut above: Vec<ActorId> = Vec::new();
    let mut below: Vec<ActorId> = Vec::new();
    for e in two_hop {
        let one_hop = |a: ActorId| matches!(zones.get(&a), Some(Zone::Sources | Zone::Targets));
        if one_hop(e.source) && one_hop(e.target) {
            continue;
        }
        for (x, anchor) in [(e.source, e.target), (e.target, e.source)] {
            if zones.contains_key(&x) || tied.contains(&x) {
                continue;
            }
            let zone = match zones.get(&anchor) {
                Some(Zone::Sources | Zone::Above) => Zone::Above,
                _ => Zone::Below,
            };
            zones.insert(x, zone);
            if zone == Zone::Above {
                above.push(x);
            } else {
                below.push(x);
            }
        }
    }

    // Tied neighbours and anything left unreached go to the bottom.
    for &a in &members {
        if !zones.contains_key(&a) {
            zones.insert(a, Zone::Below);
            below.push(a);
        }
    }

    Skeleton {
        above,
        sources,
        ego,
        targets,
        below,
        tied,
    }
}

/// Keeps the heavier direction of every reciprocated pair; exact ties drop both directions.
fn dominant_edges<'a>(edges: impl Iterator<Item = &'a Edge>) -> Vec<Edge> {
    let by_pair: IndexMap<(ActorId, ActorId), f64> =
        edges.map(|e| ((e.source, e.target), e.weight)).collect();
    by_pair
        .iter()
        .filter(|&(&(s, w), &weight)| match by_pair.get(&(w, s)) {
            Some(&reverse) => weight > reverse,
            None => true,
        })
        .map(|(&(source, target), &weight)| Edge {
            source,
            target,
            weight,
        })
        .collect()
}

fn push_bucket(buckets: &mut Vec<WeightBucket>, weight: f64, actor: ActorId) {
    match buckets.iter_mut().find(|b| b.weight == weight) {
        Some(b) => b.actors.push(actor),
        None => buckets.push(WeightBucket {
            weight,
            actors: vec![actor],
        }),
    }
}
