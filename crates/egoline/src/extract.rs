//! Network extraction: restrict raw interactions to ego's temporal footprint and neighbourhood.

use crate::error::{Error, Result};
use crate::model::Interaction;
use indexmap::{IndexMap, IndexSet};

/// Number of breadth-first hops expanded around ego per timestamp.
pub const HOPS: usize = 2;

/// Drops every timestamp ego takes no part in; rows of the remaining timestamps are kept as-is.
pub fn filter_by_ego(ego: &str, interactions: &[Interaction]) -> Vec<Interaction> {
    let ego_timestamps: IndexSet<&str> = interactions
        .iter()
        .filter(|it| it.touches(ego))
        .map(|it| it.timestamp_label.as_str())
        .collect();

    interactions
        .iter()
        .filter(|it| ego_timestamps.contains(it.timestamp_label.as_str()))
        .cloned()
        .collect()
}

/// Keeps, per timestamp, the interactions reached by a two-hop undirected expansion from ego.
///
/// Returns [`Error::EgoNotFound`] when there are interactions but ego is part of none of them.
pub fn extract_egocentric_network(
    ego: &str,
    interactions: &[Interaction],
) -> Result<Vec<Interaction>> {
    if !interactions.is_empty() && !interactions.iter().any(|it| it.touches(ego)) {
        return Err(Error::EgoNotFound {
            ego: ego.to_string(),
        });
    }

    let mut by_timestamp: IndexMap<&str, Vec<usize>> = IndexMap::new();
    for (ix, it) in interactions.iter().enumerate() {
        by_timestamp
            .entry(it.timestamp_label.as_str())
            .or_default()
            .push(ix);
    }

    let mut keep = vec![false; interactions.len()];
    for rows in by_timestamp.values() {
        let mut visited: IndexSet<&str> = IndexSet::new();
        visited.insert(ego);
        let mut frontier: Vec<&str> = vec![ego];

        for _ in 0..HOPS {
            if frontier.is_empty() {
                break;
            }
            let mut next: Vec<&str> = Vec::new();
            for &ix in rows {
                let it = &interactions[ix];
                if !frontier.iter().any(|a| it.touches(a)) {
                    continue;
                }
                keep[ix] = true;
                for endpoint in [it.source_id.as_str(), it.target_id.as_str()] {
                    if visited.insert(endpoint) {
                        next.push(endpoint);
                    }
                }
            }
            frontier = next;
        }
    }

    let kept: Vec<Interaction> = interactions
        .iter()
        .zip(keep)
        .filter_map(|(it, k)| k.then(|| it.clone()))
        .collect();
    tracing::debug!(
        ego,
        input = interactions.len(),
        kept = kept.len(),
        "extracted egocentric network"
    );
    Ok(kept)
}
