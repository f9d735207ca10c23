//! Session registry: actors, timestamps and per-timestamp sessions built from interactions.

use crate::constraints;
use crate::error::{Error, Result};
use crate::model::{Actor, ActorId, Edge, Interaction, Session, SessionId, SessionKind};
use indexmap::{IndexMap, IndexSet};
use rustc_hash::FxHashMap as HashMap;
use std::collections::{BTreeMap, VecDeque};

#[derive(Debug, Clone)]
pub struct Network {
    pub ego: ActorId,
    /// Timestamp labels in first-appearance order.
    pub timestamps: Vec<String>,
    pub actors: Vec<Actor>,
    /// Arena indexed by `SessionId.0`.
    pub sessions: Vec<Session>,
    /// Sessions of each timestamp: contact sessions in discovery order, then the idle session.
    pub columns: Vec<Vec<SessionId>>,
    /// Aggregated directed edges per timestamp, in first-appearance order.
    pub edges: Vec<Vec<Edge>>,
    index: HashMap<String, ActorId>,
}

impl Network {
    /// Builds the registry and attaches a constraint skeleton to every session containing ego.
    pub fn build(
        ego: &str,
        interactions: &[Interaction],
        categories: &BTreeMap<String, String>,
    ) -> Result<Self> {
        for it in interactions {
            if !(it.weight.is_finite() && it.weight >= 0.0) {
                return Err(Error::InvalidWeight {
                    source_id: it.source_id.clone(),
                    target_id: it.target_id.clone(),
                    timestamp: it.timestamp_label.clone(),
                    weight: it.weight,
                });
            }
        }

        let mut timestamps: IndexSet<&str> = IndexSet::new();
        let mut names: IndexSet<&str> = IndexSet::new();
        if interactions.is_empty() {
            names.insert(ego);
        }
        for it in interactions {
            timestamps.insert(it.timestamp_label.as_str());
            names.insert(it.source_id.as_str());
            names.insert(it.target_id.as_str());
        }

        let Some(ego_ix) = names.get_index_of(ego) else {
            return Err(Error::EgoNotFound {
                ego: ego.to_string(),
            });
        };

        let n_ts = timestamps.len();
        let mut actors: Vec<Actor> = names
            .iter()
            .map(|name| Actor {
                name: name.to_string(),
                category: categories.get(*name).cloned(),
                timeline: vec![None; n_ts],
            })
            .collect();
        let index: HashMap<String, ActorId> = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.to_string(), ActorId(i)))
            .collect();

        let mut edges: Vec<IndexMap<(ActorId, ActorId), f64>> = vec![IndexMap::new(); n_ts];
        for it in interactions {
            let Some(t) = timestamps.get_index_of(it.timestamp_label.as_str()) else {
                continue;
            };
            let s = index[it.source_id.as_str()];
            let w = index[it.target_id.as_str()];
            *edges[t].entry((s, w)).or_insert(0.0) += it.weight;
        }
        let edges: Vec<Vec<Edge>> = edges
            .into_iter()
            .map(|m| {
                m.into_iter()
                    .map(|((source, target), weight)| Edge {
                        source,
                        target,
                        weight,
                    })
                    .collect()
            })
            .collect();

        let mut sessions: Vec<Session> = Vec::new();
        let mut columns: Vec<Vec<SessionId>> = vec![Vec::new(); n_ts];
        for (t, column_edges) in edges.iter().enumerate() {
            for mut members in contact_components(column_edges) {
                members.sort();
                let id = SessionId(sessions.len());
                for &a in &members {
                    actors[a.0].timeline[t] = Some(id);
                }
                sessions.push(Session {
                    id,
                    timestamp: t,
                    kind: SessionKind::Contact,
                    members,
                    skeleton: None,
                });
                columns[t].push(id);
            }
        }

        synthesize_idle_sessions(&mut actors, &mut sessions, &mut columns);

        let mut network = Self {
            ego: ActorId(ego_ix),
            timestamps: timestamps.iter().map(|t| t.to_string()).collect(),
            actors,
            sessions,
            columns,
            edges,
            index,
        };
        constraints::attach(&mut network);

        tracing::debug!(
            actors = network.actors.len(),
            timestamps = network.timestamps.len(),
            sessions = network.sessions.len(),
            "built session registry"
        );
        Ok(network)
    }

    pub fn actor_id(&self, name: &str) -> Option<ActorId> {
        self.index.get(name).copied()
    }

    pub fn actor(&self, id: ActorId) -> &Actor {
        &self.actors[id.0]
    }

    pub fn session(&self, id: SessionId) -> &Session {
        &self.sessions[id.0]
    }

    pub fn session_mut(&mut self, id: SessionId) -> &mut Session {
        &mut self.sessions[id.0]
    }

    pub fn session_of(&self, actor: ActorId, t: usize) -> Option<SessionId> {
        self.actors[actor.0].timeline.get(t).copied().flatten()
    }

    pub fn ego_session(&self, t: usize) -> Option<SessionId> {
        self.session_of(self.ego, t)
    }

    pub fn is_idle(&self, actor: ActorId, t: usize) -> bool {
        self.session_of(actor, t)
            .is_some_and(|s| self.session(s).kind == SessionKind::Idle)
    }

    pub fn same_category(&self, a: ActorId, b: ActorId) -> bool {
        match (&self.actors[a.0].category, &self.actors[b.0].category) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    pub fn timestamp_count(&self) -> usize {
        self.timestamps.len()
    }
}

/// Connected components of one timestamp's edges, treated as undirected, in discovery order.
fn contact_components(edges: &[Edge]) -> Vec<Vec<ActorId>> {
    let mut adjacency: IndexMap<ActorId, Vec<ActorId>> = IndexMap::new();
    for e in edges {
        adjacency.entry(e.source).or_default().push(e.target);
        adjacency.entry(e.target).or_default().push(e.source);
    }

    let mut seen: IndexSet<ActorId> = IndexSet::new();
    let mut out: Vec<Vec<ActorId>> = Vec::new();
    for &start in adjacency.keys() {
        if !seen.insert(start) {
            continue;
        }
        let mut comp = Vec::new();
        let mut q: VecDeque<ActorId> = VecDeque::new();
        q.push_back(start);
        while let Some(v) = q.pop_front() {
            comp.push(v);
            for &n in &adjacency[&v] {
                if seen.insert(n) {
                    q.push_back(n);
                }
            }
        }
        out.push(comp);
    }
    out
}

/// An actor is idle at `t` when it has no contact there but has contacts both before and after.
/// All idle actors of a timestamp share one idle session, ordered by actor index.
fn synthesize_idle_sessions(
    actors: &mut [Actor],
    sessions: &mut Vec<Session>,
    columns: &mut [Vec<SessionId>],
) {
    let n_ts = columns.len();
    let mut idle_marks: Vec<Vec<ActorId>> = vec![Vec::new(); n_ts];
    for (ix, actor) in actors.iter().enumerate() {
        let first = actor.timeline.iter().position(|s| s.is_some());
        let last = actor.timeline.iter().rposition(|s| s.is_some());
        let (Some(first), Some(last)) = (first, last) else {
            continue;
        };
        for (t, marks) in idle_marks.iter_mut().enumerate().take(last).skip(first + 1) {
            if actor.timeline[t].is_none() {
                marks.push(ActorId(ix));
            }
        }
    }

    for (t, members) in idle_marks.into_iter().enumerate() {
        if members.is_empty() {
            continue;
        }
        let id = SessionId(sessions.len());
        for &a in &members {
            actors[a.0].timeline[t] = Some(id);
        }
        sessions.push(Session {
            id,
            timestamp: t,
            kind: SessionKind::Idle,
            members,
            skeleton: None,
        });
        columns[t].push(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn it(s: &str, t: &str, ts: &str, w: f64) -> Interaction {
        Interaction::new(s, t, ts, w)
    }

    #[test]
    fn gaps_between_contacts_become_idle_sessions() {
        let data = vec![
            it("E", "A", "t1", 1.0),
            it("E", "B", "t2", 1.0),
            it("E", "A", "t3", 1.0),
        ];
        let net = Network::build("E", &data, &BTreeMap::new()).unwrap();
        let a = net.actor_id("A").unwrap();
        assert!(net.is_idle(a, 1));
        assert!(!net.is_idle(a, 0));
        let b = net.actor_id("B").unwrap();
        assert!(!net.actor(b).is_present(0));
        assert!(!net.actor(b).is_present(2));
        assert_eq!(net.columns[1].len(), 2);
    }

    #[test]
    fn duplicate_contacts_are_summed() {
        let data = vec![it("E", "A", "t1", 1.0), it("E", "A", "t1", 2.5)];
        let net = Network::build("E", &data, &BTreeMap::new()).unwrap();
        assert_eq!(net.edges[0].len(), 1);
        assert_eq!(net.edges[0][0].weight, 3.5);
    }

    #[test]
    fn negative_weights_are_rejected() {
        let data = vec![it("E", "A", "t1", -1.0)];
        let err = Network::build("E", &data, &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidWeight { .. }));
    }
}
