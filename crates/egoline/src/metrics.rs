//! Layout quality measures.

use crate::model::ActorId;
use crate::tables::{HeightTable, RankTable};
use serde::Serialize;

const EPS: f64 = 1e-9;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    /// Pairwise storyline crossings summed over all transitions.
    pub crossings: usize,
    /// Transitions where a storyline present on both sides changes height.
    pub bends: usize,
    /// Largest height in the layout.
    pub span: f64,
}

pub fn measure(ranks: &RankTable, heights: &HeightTable, timestamps: usize) -> Metrics {
    let actors = heights.rows().len();
    let mut crossings = 0;
    let mut bends = 0;
    for t in 1..timestamps {
        let both: Vec<(f64, f64, usize)> = (0..actors)
            .map(ActorId)
            .filter_map(|a| {
                let before = heights.get(a, t - 1)?;
                let after = heights.get(a, t)?;
                Some((before, after, ranks.raw(a, t - 1)))
            })
            .collect();
        bends += both.iter().filter(|(b, a, _)| (b - a).abs() > EPS).count();
        crossings += transition_crossings(&both);
    }
    Metrics {
        crossings,
        bends,
        span: heights.max().unwrap_or(0.0),
    }
}

/// Inversions between the order before and after one transition, counted with an accumulator
/// tree over the positions after the transition.
fn transition_crossings(storylines: &[(f64, f64, usize)]) -> usize {
    if storylines.len() < 2 {
        return 0;
    }

    let mut south: Vec<usize> = (0..storylines.len()).collect();
    south.sort_by(|&x, &y| storylines[x].1.total_cmp(&storylines[y].1));
    let mut south_pos = vec![0; storylines.len()];
    for (pos, &ix) in south.iter().enumerate() {
        south_pos[ix] = pos;
    }

    let mut north: Vec<usize> = (0..storylines.len()).collect();
    north.sort_by(|&x, &y| {
        storylines[x]
            .0
            .total_cmp(&storylines[y].0)
            .then(storylines[x].2.cmp(&storylines[y].2))
    });

    let mut first_index: usize = 1;
    while first_index < storylines.len() {
        first_index <<= 1;
    }
    let tree_size = 2 * first_index - 1;
    first_index -= 1;
    let mut tree: Vec<usize> = vec![0; tree_size];

    let mut cc = 0;
    for ix in north {
        let mut index = south_pos[ix] + first_index;
        tree[index] += 1;
        let mut sum = 0;
        while index > 0 {
            if index % 2 == 1 {
                sum += tree[index + 1];
            }
            index = (index - 1) >> 1;
            tree[index] += 1;
        }
        cc += sum;
    }
    cc
}
