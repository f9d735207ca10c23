//! Derived per-(actor, timestamp) tables handed to the renderer.
//!
//! Absent cells are tagged values in memory; the `-1` sentinels the rendering side expects only
//! appear when a table is serialised.

use crate::model::{ActorId, SessionId};
use serde::ser::{Serialize, SerializeSeq, Serializer};

/// Horizontal ranks, 1-based; 0 marks an actor absent at that timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankTable {
    rows: Vec<Vec<usize>>,
}

impl RankTable {
    pub fn new(actors: usize, timestamps: usize) -> Self {
        Self {
            rows: vec![vec![0; timestamps]; actors],
        }
    }

    pub fn get(&self, actor: ActorId, t: usize) -> Option<usize> {
        match self.rows[actor.0][t] {
            0 => None,
            r => Some(r),
        }
    }

    pub fn raw(&self, actor: ActorId, t: usize) -> usize {
        self.rows[actor.0][t]
    }

    pub fn set(&mut self, actor: ActorId, t: usize, rank: usize) {
        self.rows[actor.0][t] = rank;
    }

    pub fn rows(&self) -> &[Vec<usize>] {
        &self.rows
    }
}

impl Serialize for RankTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.rows.serialize(serializer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Height {
    Present(f64),
    Absent,
}

impl Height {
    pub const SENTINEL: f64 = -1.0;

    pub fn value(self) -> Option<f64> {
        match self {
            Height::Present(h) => Some(h),
            Height::Absent => None,
        }
    }

    pub fn to_sentinel(self) -> f64 {
        self.value().unwrap_or(Self::SENTINEL)
    }
}

impl Serialize for Height {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_sentinel())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeightTable {
    rows: Vec<Vec<Height>>,
}

impl HeightTable {
    pub fn new(actors: usize, timestamps: usize) -> Self {
        Self {
            rows: vec![vec![Height::Absent; timestamps]; actors],
        }
    }

    pub fn get(&self, actor: ActorId, t: usize) -> Option<f64> {
        self.rows[actor.0][t].value()
    }

    pub fn cell(&self, actor: ActorId, t: usize) -> Height {
        self.rows[actor.0][t]
    }

    pub fn set(&mut self, actor: ActorId, t: usize, h: Height) {
        self.rows[actor.0][t] = h;
    }

    pub fn row(&self, actor: ActorId) -> &[Height] {
        &self.rows[actor.0]
    }

    pub fn rows(&self) -> &[Vec<Height>] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Vec<Height>] {
        &mut self.rows
    }

    pub fn min(&self) -> Option<f64> {
        self.present().reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.present().reduce(f64::max)
    }

    fn present(&self) -> impl Iterator<Item = f64> + '_ {
        self.rows.iter().flatten().filter_map(|h| h.value())
    }
}

impl Serialize for HeightTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.rows.serialize(serializer)
    }
}

/// For every (actor, t), the actor it is aligned with at `t + 1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentTable {
    rows: Vec<Vec<Option<ActorId>>>,
}

impl AlignmentTable {
    pub fn new(actors: usize, timestamps: usize) -> Self {
        Self {
            rows: vec![vec![None; timestamps]; actors],
        }
    }

    pub fn get(&self, actor: ActorId, t: usize) -> Option<ActorId> {
        self.rows[actor.0][t]
    }

    pub fn set(&mut self, actor: ActorId, t: usize, next: Option<ActorId>) {
        self.rows[actor.0][t] = next;
    }

    /// True when `actor` continues as itself from `t` to `t + 1`.
    pub fn is_straight(&self, actor: ActorId, t: usize) -> bool {
        self.get(actor, t) == Some(actor)
    }
}

impl Serialize for AlignmentTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            let row: Vec<i64> = row
                .iter()
                .map(|c| c.map(|a| a.0 as i64).unwrap_or(-1))
                .collect();
            seq.serialize_element(&row)?;
        }
        seq.end()
    }
}

/// One timestamp's ordering, top to bottom.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct Column {
    pub actors: Vec<ActorId>,
    pub idle: Vec<ActorId>,
    /// Distinct sessions in first-seen order along `actors`.
    pub sessions: Vec<SessionId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_cells_serialise_as_sentinels() {
        let mut heights = HeightTable::new(2, 2);
        heights.set(ActorId(0), 0, Height::Present(2.5));
        let json = serde_json::to_string(&heights).unwrap();
        assert_eq!(json, "[[2.5,-1.0],[-1.0,-1.0]]");

        let mut alignment = AlignmentTable::new(1, 2);
        alignment.set(ActorId(0), 0, Some(ActorId(0)));
        assert_eq!(serde_json::to_string(&alignment).unwrap(), "[[0,-1]]");
    }

    #[test]
    fn rank_zero_reads_as_absent() {
        let mut ranks = RankTable::new(1, 2);
        ranks.set(ActorId(0), 1, 3);
        assert_eq!(ranks.get(ActorId(0), 0), None);
        assert_eq!(ranks.get(ActorId(0), 1), Some(3));
    }
}
