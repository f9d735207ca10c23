use super::{session_barycenter, sort_zones};
use crate::model::{ActorId, SessionId};
use crate::network::Network;
use crate::tables::{Column, RankTable};

/// Result of the orderer.
#[derive(Debug, Clone, PartialEq)]
pub struct Ordering {
    pub ranks: RankTable,
    /// Per timestamp: actors in rank order, the idle sublist, and sessions in first-seen order.
    pub columns: Vec<Column>,
}

impl Ordering {
    pub fn column(&self, t: usize) -> &Column {
        &self.columns[t]
    }
}

/// Runs `iterations` rounds of a forward then a backward sweep.
///
/// Rearranges the members of skeleton sessions in `network` in place.
pub fn order(network: &mut Network, iterations: usize) -> Ordering {
    let n_ts = network.timestamp_count();
    let mut session_order: Vec<Vec<SessionId>> = network.columns.clone();
    let mut ranks = RankTable::new(network.actors.len(), n_ts);
    for t in 0..n_ts {
        assign_ranks(network, &mut ranks, &session_order[t], t);
    }

    for _ in 0..iterations {
        for t in 0..n_ts.saturating_sub(1) {
            sweep_step(network, &mut ranks, &mut session_order, t, t + 1);
        }
        for t in (1..n_ts).rev() {
            sweep_step(network, &mut ranks, &mut session_order, t, t - 1);
        }
    }
    tracing::debug!(iterations, timestamps = n_ts, "ordered sessions");

    let columns = (0..n_ts)
        .map(|t| build_column(network, &ranks, &session_order[t], t))
        .collect();
    Ordering { ranks, columns }
}

fn sweep_step(
    network: &mut Network,
    ranks: &mut RankTable,
    session_order: &mut [Vec<SessionId>],
    source: usize,
    target: usize,
) {
    for &sid in &session_order[target] {
        sort_zones(network.session_mut(sid), ranks, source, target);
    }

    let mut keyed: Vec<(f64, SessionId)> = session_order[target]
        .iter()
        .map(|&sid| (session_barycenter(network.session(sid), ranks, source), sid))
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0));
    session_order[target] = keyed.into_iter().map(|(_, sid)| sid).collect();

    assign_ranks(network, ranks, &session_order[target], target);
}

fn assign_ranks(network: &Network, ranks: &mut RankTable, sessions: &[SessionId], t: usize) {
    let mut rank = 1;
    for &sid in sessions {
        for &a in &network.session(sid).members {
            ranks.set(a, t, rank);
            rank += 1;
        }
    }
}

fn build_column(network: &Network, ranks: &RankTable, sessions: &[SessionId], t: usize) -> Column {
    let mut actors: Vec<ActorId> = sessions
        .iter()
        .flat_map(|&sid| network.session(sid).members.iter().copied())
        .filter(|&a| ranks.get(a, t).is_some())
        .collect();
    actors.sort_by_key(|&a| ranks.raw(a, t));

    let idle = actors
        .iter()
        .copied()
        .filter(|&a| network.is_idle(a, t))
        .collect();

    let mut seen: Vec<SessionId> = Vec::new();
    for &a in &actors {
        if let Some(sid) = network.session_of(a, t) {
            if !seen.contains(&sid) {
                seen.push(sid);
            }
        }
    }
    Column {
        actors,
        idle,
        sessions: seen,
    }
}
