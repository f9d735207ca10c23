//! The full layout pipeline: extraction, ordering, alignment, compaction.

use crate::align::align;
use crate::compact::{SlotTable, compact};
use crate::config::{LayoutConfig, Scope};
use crate::error::Result;
use crate::extract::{extract_egocentric_network, filter_by_ego};
use crate::metrics::{Metrics, measure};
use crate::model::{ActorId, Interaction, SessionId, SessionKind};
use crate::network::Network;
use crate::order::order;
use crate::tables::{AlignmentTable, Column, HeightTable, RankTable};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutInput {
    pub ego: String,
    pub interactions: Vec<Interaction>,
    /// Actor → display category; only used to break ties.
    pub categories: BTreeMap<String, String>,
    /// Actor → timestamp label → value; passed through for the renderer.
    pub context: BTreeMap<String, BTreeMap<String, f64>>,
    pub config: LayoutConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub id: SessionId,
    pub timestamp: usize,
    pub kind: SessionKind,
    pub members: Vec<ActorId>,
}

/// Everything the renderer needs. Tables are indexed by actor, then timestamp.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub ego: String,
    pub timestamps: Vec<String>,
    pub actors: Vec<String>,
    pub categories: Vec<Option<String>>,
    pub ranks: RankTable,
    pub heights: HeightTable,
    pub sides: Vec<bool>,
    pub alignment: AlignmentTable,
    pub session_alignment: Vec<BTreeMap<SessionId, SessionId>>,
    pub sessions: Vec<SessionSummary>,
    pub columns: Vec<Column>,
    pub slots: SlotTable,
    pub context: Vec<Vec<Option<f64>>>,
    pub metrics: Metrics,
}

impl Layout {
    pub fn actor_id(&self, name: &str) -> Option<ActorId> {
        self.actors.iter().position(|a| a == name).map(ActorId)
    }

    /// Height of `name` at timestamp index `t`, if present there.
    pub fn height_of(&self, name: &str, t: usize) -> Option<f64> {
        self.heights.get(self.actor_id(name)?, t)
    }

    pub fn rank_of(&self, name: &str, t: usize) -> Option<usize> {
        self.ranks.get(self.actor_id(name)?, t)
    }

    pub fn column_names(&self, t: usize) -> Vec<&str> {
        self.columns[t]
            .actors
            .iter()
            .map(|a| self.actors[a.0].as_str())
            .collect()
    }
}

/// Restricts `interactions` according to `scope`.
pub fn extract(ego: &str, interactions: &[Interaction], scope: Scope) -> Result<Vec<Interaction>> {
    match scope {
        Scope::TwoHop => extract_egocentric_network(ego, interactions),
        Scope::Timestamps => Ok(filter_by_ego(ego, interactions)),
    }
}

pub fn layout(input: &LayoutInput) -> Result<Layout> {
    let config = &input.config;

    let kept = {
        let _span = tracing::debug_span!("extract").entered();
        extract(&input.ego, &input.interactions, config.scope)?
    };
    let mut network = Network::build(&input.ego, &kept, &input.categories)?;

    let ordering = {
        let _span = tracing::debug_span!("order").entered();
        order(&mut network, config.iterations)
    };
    let alignment = {
        let _span = tracing::debug_span!("align").entered();
        align(&network, &ordering)
    };
    let compaction = {
        let _span = tracing::debug_span!("compact").entered();
        compact(&network, &ordering, &alignment, config)?
    };
    let metrics = measure(
        &ordering.ranks,
        &compaction.heights,
        network.timestamp_count(),
    );

    let context = network
        .actors
        .iter()
        .map(|actor| {
            let series = input.context.get(&actor.name);
            network
                .timestamps
                .iter()
                .map(|ts| series.and_then(|s| s.get(ts)).copied())
                .collect()
        })
        .collect();

    Ok(Layout {
        ego: input.ego.clone(),
        timestamps: network.timestamps.clone(),
        actors: network.actors.iter().map(|a| a.name.clone()).collect(),
        categories: network.actors.iter().map(|a| a.category.clone()).collect(),
        ranks: ordering.ranks,
        heights: compaction.heights,
        sides: compaction.sides,
        alignment: alignment.table,
        session_alignment: alignment.sessions,
        sessions: network
            .sessions
            .iter()
            .map(|s| SessionSummary {
                id: s.id,
                timestamp: s.timestamp,
                kind: s.kind,
                members: s.members.clone(),
            })
            .collect(),
        columns: ordering.columns,
        slots: compaction.slots,
        context,
        metrics,
    })
}
