//! Core data model: interactions, actors, sessions.
//!
//! Actors and sessions live in arenas owned by [`crate::network::Network`]; everything else
//! refers to them through the plain index newtypes below.

use crate::constraints::Skeleton;
use serde::{Deserialize, Serialize};

/// One weighted, directed contact between two actors at a (bucketed) timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub source_id: String,
    pub target_id: String,
    pub timestamp_label: String,
    pub weight: f64,
}

impl Interaction {
    pub fn new(
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        timestamp_label: impl Into<String>,
        weight: f64,
    ) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            timestamp_label: timestamp_label.into(),
            weight,
        }
    }

    pub fn touches(&self, actor: &str) -> bool {
        self.source_id == actor || self.target_id == actor
    }

    /// The endpoint that is not `actor` (or `actor` itself for a self-contact).
    pub fn other(&self, actor: &str) -> &str {
        if self.source_id == actor {
            &self.target_id
        } else {
            &self.source_id
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct Actor {
    pub name: String,
    pub category: Option<String>,
    /// One slot per timestamp: the session the actor belongs to, or `None` when absent.
    pub timeline: Vec<Option<SessionId>>,
}

impl Actor {
    pub fn is_present(&self, t: usize) -> bool {
        self.timeline.get(t).is_some_and(|s| s.is_some())
    }

    pub fn active_timestamps(&self) -> usize {
        self.timeline.iter().filter(|s| s.is_some()).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionKind {
    /// Actors linked by at least one interaction at this timestamp.
    Contact,
    /// Actors whose storyline continues through this timestamp without an interaction.
    Idle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: SessionId,
    pub timestamp: usize,
    pub kind: SessionKind,
    /// Members in their current top-to-bottom order. Only the orderer rearranges them.
    pub members: Vec<ActorId>,
    /// Present on the session that contains ego.
    pub skeleton: Option<Skeleton>,
}

impl Session {
    /// Position of `actor` within the session, scaled to `[0, 1)`.
    pub fn relative_rank(&self, actor: ActorId) -> Option<f64> {
        let idx = self.members.iter().position(|&m| m == actor)?;
        Some((idx as f64 + 0.5) / self.members.len() as f64)
    }
}

/// An aggregated directed edge within one timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub source: ActorId,
    pub target: ActorId,
    pub weight: f64,
}
