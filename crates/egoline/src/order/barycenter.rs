use crate::model::{ActorId, Session};
use crate::tables::RankTable;

/// Sorts every multi-member zone of `session` by the members' rank at `source`, keeping the
/// current rank (at `target`) for members absent from `source`. Returns `false` for sessions
/// without a skeleton, which are left untouched.
pub fn sort_zones(session: &mut Session, ranks: &RankTable, source: usize, target: usize) -> bool {
    let Some(skeleton) = session.skeleton.as_mut() else {
        return false;
    };

    let key = |a: ActorId| -> f64 {
        ranks
            .get(a, source)
            .unwrap_or_else(|| ranks.raw(a, target)) as f64
    };
    for group in skeleton.groups_mut() {
        if group.len() <= 1 {
            continue;
        }
        group.sort_by(|&a, &b| key(a).total_cmp(&key(b)));
    }
    session.members = skeleton.flatten();
    true
}

/// Mean rank at `source` of the members present there, divided by the full member count.
///
/// Members absent from `source` still count in the divisor.
pub fn session_barycenter(session: &Session, ranks: &RankTable, source: usize) -> f64 {
    if session.members.is_empty() {
        return 0.0;
    }
    let sum: usize = session
        .members
        .iter()
        .filter_map(|&m| ranks.get(m, source))
        .sum();
    sum as f64 / session.members.len() as f64
}
