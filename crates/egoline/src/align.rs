//! Alignment of consecutive columns.
//!
//! A longest-common-substring style dynamic program over the ordered actors of two neighbouring
//! timestamps. Matching two actors is rewarded by how many storylines their sessions share,
//! idle sessions included; a small bonus favours pairs at similar relative positions within
//! their sessions. Ego is always matched with ego.

use crate::model::{ActorId, SessionId};
use crate::network::Network;
use crate::order::Ordering;
use crate::tables::AlignmentTable;
use std::cmp::Ordering as CmpOrdering;
use std::collections::BTreeMap;

/// Weight of the relative-position bonus.
pub const POSITION_BONUS: f64 = 0.1;

/// Alignment score. `pinned` counts forced matches and dominates `value`, acting as an
/// infinite reward without swallowing the finite part.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Reward {
    pub pinned: u32,
    pub value: f64,
}

impl Reward {
    pub const ZERO: Reward = Reward {
        pinned: 0,
        value: 0.0,
    };

    pub fn finite(value: f64) -> Self {
        Self { pinned: 0, value }
    }

    pub fn pinned() -> Self {
        Self {
            pinned: 1,
            value: 0.0,
        }
    }

    pub fn is_infinite(self) -> bool {
        self.pinned > 0
    }
}

impl std::ops::Add for Reward {
    type Output = Reward;

    fn add(self, rhs: Reward) -> Reward {
        Reward {
            pinned: self.pinned + rhs.pinned,
            value: self.value + rhs.value,
        }
    }
}

impl PartialOrd for Reward {
    fn partial_cmp(&self, other: &Self) -> Option<CmpOrdering> {
        Some(
            self.pinned
                .cmp(&other.pinned)
                .then_with(|| self.value.total_cmp(&other.value)),
        )
    }
}

#[derive(Debug, Clone)]
pub struct Alignment {
    pub table: AlignmentTable,
    /// One map per transition `t -> t + 1`, from a session at `t` to its successor.
    pub sessions: Vec<BTreeMap<SessionId, SessionId>>,
    /// Total reward of the chosen alignment per transition.
    pub rewards: Vec<Reward>,
}

impl Alignment {
    pub fn session_successor(&self, t: usize, session: SessionId) -> Option<SessionId> {
        self.sessions.get(t).and_then(|m| m.get(&session)).copied()
    }

    /// Inverse lookup: the session at `t` that continues into `session` at `t + 1`.
    pub fn session_predecessor(&self, t: usize, session: SessionId) -> Option<SessionId> {
        self.sessions
            .get(t)?
            .iter()
            .find(|&(_, &to)| to == session)
            .map(|(&from, _)| from)
    }
}

/// Reward for placing `a` (at `t`) and `b` (at `t + 1`) on the same track: the number of
/// storylines shared by their sessions, plus the position bonus.
pub fn pair_reward(network: &Network, a: ActorId, b: ActorId, t: usize) -> Reward {
    if a == network.ego && b == network.ego {
        return Reward::pinned();
    }
    let here = session_members(network, a, t);
    let next = session_members(network, b, t + 1);
    let overlap = here.iter().filter(|m| next.contains(m)).count();
    let rel = |actor: ActorId, t: usize| {
        network
            .session_of(actor, t)
            .and_then(|s| network.session(s).relative_rank(actor))
            .unwrap_or(0.5)
    };
    let bonus = POSITION_BONUS * (1.0 - (rel(a, t) - rel(b, t + 1)).abs());
    Reward::finite(overlap as f64 + bonus)
}

fn session_members(network: &Network, actor: ActorId, t: usize) -> &[ActorId] {
    match network.session_of(actor, t) {
        Some(s) => &network.session(s).members,
        None => &[],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Align,
    SkipNext,
    SkipCurrent,
}

/// Best matching between `left` (at `t`) and `right` (at `t + 1`), as index pairs in order.
pub fn align_columns(
    network: &Network,
    left: &[ActorId],
    right: &[ActorId],
    t: usize,
) -> (Vec<(usize, usize)>, Reward) {
    let (m, n) = (left.len(), right.len());
    let mut score = vec![vec![Reward::ZERO; n + 1]; m + 1];
    let mut step = vec![vec![Step::Align; n + 1]; m + 1];
    for i in 1..=m {
        step[i][0] = Step::SkipCurrent;
    }
    for j in 1..=n {
        step[0][j] = Step::SkipNext;
    }

    for i in 1..=m {
        for j in 1..=n {
            let mut best = score[i - 1][j - 1] + pair_reward(network, left[i - 1], right[j - 1], t);
            let mut choice = Step::Align;
            if score[i][j - 1] > best {
                best = score[i][j - 1];
                choice = Step::SkipNext;
            }
            if score[i - 1][j] > best {
                best = score[i - 1][j];
                choice = Step::SkipCurrent;
            }
            score[i][j] = best;
            step[i][j] = choice;
        }
    }

    let mut pairs = Vec::new();
    let (mut i, mut j) = (m, n);
    while i > 0 && j > 0 {
        match step[i][j] {
            Step::Align => {
                pairs.push((i - 1, j - 1));
                i -= 1;
                j -= 1;
            }
            Step::SkipNext => j -= 1,
            Step::SkipCurrent => i -= 1,
        }
    }
    pairs.reverse();
    (pairs, score[m][n])
}

pub fn align(network: &Network, ordering: &Ordering) -> Alignment {
    let n_ts = network.timestamp_count();
    let mut table = AlignmentTable::new(network.actors.len(), n_ts);
    let mut sessions = Vec::with_capacity(n_ts.saturating_sub(1));
    let mut rewards = Vec::with_capacity(n_ts.saturating_sub(1));

    for t in 0..n_ts.saturating_sub(1) {
        let left = &ordering.column(t).actors;
        let right = &ordering.column(t + 1).actors;
        let (pairs, total) = align_columns(network, left, right, t);
        for (i, j) in pairs {
            table.set(left[i], t, Some(right[j]));
        }
        sessions.push(align_sessions(network, &table, left, t));
        rewards.push(total);
    }

    tracing::debug!(transitions = rewards.len(), "aligned columns");
    Alignment {
        table,
        sessions,
        rewards,
    }
}

/// Ego's session maps to ego's session; every other session follows its first aligned member
/// whose counterpart session is still unclaimed.
fn align_sessions(
    network: &Network,
    table: &AlignmentTable,
    column: &[ActorId],
    t: usize,
) -> BTreeMap<SessionId, SessionId> {
    let mut map: BTreeMap<SessionId, SessionId> = BTreeMap::new();
    if let (Some(from), Some(to)) = (network.ego_session(t), network.ego_session(t + 1)) {
        map.insert(from, to);
    }

    for &a in column {
        if a == network.ego {
            continue;
        }
        let Some(b) = table.get(a, t) else {
            continue;
        };
        let (Some(from), Some(to)) = (network.session_of(a, t), network.session_of(b, t + 1))
        else {
            continue;
        };
        if map.contains_key(&from) || map.values().any(|&v| v == to) {
            continue;
        }
        map.insert(from, to);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pinned_rewards_dominate_finite_ones() {
        assert!(Reward::pinned() > Reward::finite(1e12));
        assert!(Reward::pinned() + Reward::finite(1.0) > Reward::pinned());
        assert!(Reward::pinned().is_infinite());
    }

    #[test]
    fn first_aligned_member_claims_the_successor_session() {
        use crate::model::Interaction;
        let interactions = [
            Interaction::new("A", "E", "t1", 1.0),
            Interaction::new("C", "D", "t1", 1.0),
            Interaction::new("F", "G", "t1", 1.0),
            Interaction::new("A", "E", "t2", 1.0),
            Interaction::new("C", "F", "t2", 1.0),
        ];
        let net = Network::build("E", &interactions, &BTreeMap::new()).unwrap();
        let id = |name: &str| net.actor_id(name).unwrap();
        let (c, d, f, g) = (id("C"), id("D"), id("F"), id("G"));

        let mut table = AlignmentTable::new(net.actors.len(), net.timestamp_count());
        table.set(c, 0, Some(c));
        table.set(f, 0, Some(f));
        let merged = net.session_of(c, 1).unwrap();
        let (cd, fg) = (net.session_of(c, 0).unwrap(), net.session_of(f, 0).unwrap());

        let map = align_sessions(&net, &table, &[c, d, f, g], 0);
        assert_eq!(map.get(&cd), Some(&merged));
        assert_eq!(map.get(&fg), None);
        assert_eq!(map.len(), 2);

        let map = align_sessions(&net, &table, &[f, g, c, d], 0);
        assert_eq!(map.get(&fg), Some(&merged));
        assert_eq!(map.get(&cd), None);
        assert_eq!(
            map.get(&net.ego_session(0).unwrap()),
            net.ego_session(1).as_ref()
        );
    }
}
