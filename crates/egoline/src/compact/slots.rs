//! Slot assignment: horizontal tracks that carry a session lineage across timestamps.

use crate::align::Alignment;
use crate::model::{SessionId, SessionKind};
use crate::network::Network;
use crate::order::Ordering;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Above,
    Below,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotTable {
    /// Slot ids from top to bottom.
    pub order: Vec<usize>,
    pub ego_slot: usize,
    /// Slot of every contact session, indexed by session id.
    pub assignment: Vec<Option<usize>>,
}

impl SlotTable {
    pub fn slot_of(&self, session: SessionId) -> Option<usize> {
        self.assignment.get(session.0).copied().flatten()
    }

    /// Vertical position of `slot` in `order`.
    pub fn position(&self, slot: usize) -> usize {
        self.order.iter().position(|&s| s == slot).unwrap_or(0)
    }

    pub fn side(&self, slot: usize) -> Side {
        if self.position(slot) < self.position(self.ego_slot) {
            Side::Above
        } else {
            Side::Below
        }
    }

    /// Distance from ego's slot, counted in slots.
    pub fn distance(&self, slot: usize) -> usize {
        self.position(slot).abs_diff(self.position(self.ego_slot))
    }
}

struct Builder {
    table: SlotTable,
    /// `occupied[slot][t]`
    occupied: Vec<Vec<bool>>,
    timestamps: usize,
}

impl Builder {
    fn is_free(&self, slot: usize, t: usize) -> bool {
        !self.occupied[slot][t]
    }

    fn take(&mut self, slot: usize, t: usize, session: SessionId) {
        self.occupied[slot][t] = true;
        self.table.assignment[session.0] = Some(slot);
    }

    fn allocate(&mut self, side: Side) -> usize {
        let slot = self.occupied.len();
        self.occupied.push(vec![false; self.timestamps]);
        match side {
            Side::Above => self.table.order.insert(0, slot),
            Side::Below => self.table.order.push(slot),
        }
        slot
    }

    /// Nearest free slot on `side`, walking outward from ego.
    fn nearest_free(&self, side: Side, t: usize) -> Option<usize> {
        let ego_pos = self.table.position(self.table.ego_slot);
        let candidates: Vec<usize> = match side {
            Side::Above => self.table.order[..ego_pos].iter().rev().copied().collect(),
            Side::Below => self.table.order[ego_pos + 1..].to_vec(),
        };
        candidates.into_iter().find(|&s| self.is_free(s, t))
    }
}

/// Places every contact session into a slot. Ego's session always sits in the ego slot; other
/// sessions inherit their predecessor's slot when it is free and on the right side of ego.
pub fn assign_slots(network: &Network, ordering: &Ordering, alignment: &Alignment) -> SlotTable {
    let n_ts = network.timestamp_count();
    let mut b = Builder {
        table: SlotTable {
            order: vec![0],
            ego_slot: 0,
            assignment: vec![None; network.sessions.len()],
        },
        occupied: vec![vec![false; n_ts]],
        timestamps: n_ts,
    };

    for t in 0..n_ts {
        let sessions: Vec<SessionId> = ordering
            .column(t)
            .sessions
            .iter()
            .copied()
            .filter(|&s| network.session(s).kind == SessionKind::Contact)
            .collect();
        let ego_session = network.ego_session(t);
        let ego_pos = ego_session.and_then(|e| sessions.iter().position(|&s| s == e));

        if let (Some(e), Some(_)) = (ego_session, ego_pos) {
            b.take(0, t, e);
        }

        // Nearest to ego first on both sides, so inner sessions claim inner slots.
        let (above, below): (Vec<SessionId>, Vec<SessionId>) = match ego_pos {
            Some(p) => (
                sessions[..p].iter().rev().copied().collect(),
                sessions[p + 1..].to_vec(),
            ),
            None => (Vec::new(), sessions.clone()),
        };

        for (side, group) in [(Side::Above, above), (Side::Below, below)] {
            for sid in group {
                let inherited = (t > 0)
                    .then(|| alignment.session_predecessor(t - 1, sid))
                    .flatten()
                    .and_then(|prev| b.table.slot_of(prev))
                    .filter(|&slot| {
                        slot != b.table.ego_slot && b.table.side(slot) == side && b.is_free(slot, t)
                    });
                let slot = match inherited.or_else(|| b.nearest_free(side, t)) {
                    Some(slot) => slot,
                    None => b.allocate(side),
                };
                b.take(slot, t, sid);
            }
        }
    }

    tracing::debug!(slots = b.table.order.len(), "assigned slots");
    b.table
}
