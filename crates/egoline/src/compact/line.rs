//! Line-minimising placement.
//!
//! Every column starts tightly packed around ego. Then, for each run of timestamps over which an
//! actor stays aligned with itself, the actor is moved to one common height in every column of
//! the run using the first placement strategy that applies.

use super::spacing::Spacing;
use crate::align::Alignment;
use crate::config::LayoutConfig;
use crate::model::ActorId;
use crate::network::Network;
use crate::order::Ordering;
use crate::tables::{Height, HeightTable};
use std::collections::BTreeMap;

const EPS: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Strategy {
    /// Fits between its neighbours without moving anybody else.
    Insert,
    /// Nothing resolved further out: cascade-push the outer actors.
    PushUnobstructed,
    /// Large move: shift the unresolved outer block rigidly up to the nearest resolved actor.
    PushBlock,
    /// Cascade-push the unresolved outer actors up to the nearest resolved actor.
    PushPartial,
    /// Nearest height on the minimum-spacing grid around the target that fits as-is.
    Search,
}

/// One column as seen by the strategies. Indices refer to positions in `column`.
#[derive(Debug, Clone)]
pub struct PlacementContext<'a> {
    pub column: &'a [ActorId],
    pub heights: &'a [f64],
    pub resolved: &'a [bool],
    /// `gaps[i]` separates `column[i]` and `column[i + 1]`.
    pub gaps: &'a [f64],
    pub index: usize,
    /// `-1.0` when the actor sits above ego, `1.0` below.
    pub direction: f64,
    pub target: f64,
    pub min_spacing: f64,
    pub push_threshold: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub strategy: Strategy,
    /// `(column index, new height)`
    pub moves: Vec<(usize, f64)>,
}

pub type StrategyFn = fn(&PlacementContext<'_>) -> Option<Placement>;

/// Tried in order; the first that returns a placement wins.
pub const STRATEGIES: [StrategyFn; 5] = [
    insert,
    push_unobstructed,
    push_block,
    push_partial,
    search,
];

impl PlacementContext<'_> {
    /// Heights measured away from ego.
    fn outward(&self, i: usize) -> f64 {
        self.direction * self.heights[i]
    }

    fn gap_between(&self, i: usize, j: usize) -> f64 {
        self.gaps[i.min(j)]
    }

    fn inner(&self) -> Option<usize> {
        if self.direction > 0.0 {
            self.index.checked_sub(1)
        } else {
            Some(self.index + 1).filter(|&i| i < self.column.len())
        }
    }

    /// Column indices beyond the actor, nearest first.
    fn outer(&self) -> Vec<usize> {
        if self.direction > 0.0 {
            (self.index + 1..self.column.len()).collect()
        } else {
            (0..self.index).rev().collect()
        }
    }

    fn fits_inner(&self, u: f64) -> bool {
        match self.inner() {
            Some(i) => u >= self.outward(i) + self.gap_between(i, self.index) - EPS,
            None => true,
        }
    }

    fn fits_outer(&self, u: f64) -> bool {
        match self.outer().first() {
            Some(&o) => self.outward(o) - u >= self.gap_between(self.index, o) - EPS,
            None => true,
        }
    }

    fn target_outward(&self) -> f64 {
        self.direction * self.target
    }

    /// Cascade from the actor at `u` through `outer`; `None` once a resolved actor would move.
    fn cascade(&self, u: f64, stop_at_resolved: bool) -> Option<Vec<(usize, f64)>> {
        let mut moves = vec![(self.index, self.direction * u)];
        let (mut prev, mut prev_u) = (self.index, u);
        for o in self.outer() {
            let need = prev_u + self.gap_between(prev, o);
            let cur = self.outward(o);
            if cur >= need - EPS {
                break;
            }
            if self.resolved[o] {
                return if stop_at_resolved { None } else { Some(moves) };
            }
            moves.push((o, self.direction * need));
            prev = o;
            prev_u = need;
        }
        Some(moves)
    }

    fn first_resolved_outer(&self) -> Option<usize> {
        self.outer().into_iter().find(|&o| self.resolved[o])
    }
}

fn insert(ctx: &PlacementContext<'_>) -> Option<Placement> {
    let u = ctx.target_outward();
    (ctx.fits_inner(u) && ctx.fits_outer(u)).then(|| Placement {
        strategy: Strategy::Insert,
        moves: vec![(ctx.index, ctx.target)],
    })
}

fn push_unobstructed(ctx: &PlacementContext<'_>) -> Option<Placement> {
    let u = ctx.target_outward();
    if !ctx.fits_inner(u) || u < ctx.outward(ctx.index) || ctx.first_resolved_outer().is_some() {
        return None;
    }
    Some(Placement {
        strategy: Strategy::PushUnobstructed,
        moves: ctx.cascade(u, true)?,
    })
}

fn push_block(ctx: &PlacementContext<'_>) -> Option<Placement> {
    let u = ctx.target_outward();
    let delta = u - ctx.outward(ctx.index);
    if !ctx.fits_inner(u) || delta <= ctx.push_threshold {
        return None;
    }
    let blocker = ctx.first_resolved_outer();
    let block: Vec<usize> = std::iter::once(ctx.index)
        .chain(ctx.outer().into_iter().take_while(|&o| Some(o) != blocker))
        .collect();
    if let (Some(b), Some(&last)) = (blocker, block.last()) {
        if ctx.outward(b) - (ctx.outward(last) + delta) < ctx.gap_between(last, b) - EPS {
            return None;
        }
    }
    Some(Placement {
        strategy: Strategy::PushBlock,
        moves: block
            .into_iter()
            .map(|i| (i, ctx.heights[i] + ctx.direction * delta))
            .collect(),
    })
}

fn push_partial(ctx: &PlacementContext<'_>) -> Option<Placement> {
    let u = ctx.target_outward();
    if !ctx.fits_inner(u) || u < ctx.outward(ctx.index) {
        return None;
    }
    Some(Placement {
        strategy: Strategy::PushPartial,
        moves: ctx.cascade(u, true)?,
    })
}

fn search(ctx: &PlacementContext<'_>) -> Option<Placement> {
    let span = ctx
        .heights
        .iter()
        .fold(0.0_f64, |acc, h| acc.max((h - ctx.target).abs()));
    let limit = (span / ctx.min_spacing).ceil() as usize + ctx.column.len() + 1;
    for k in 1..=limit {
        let step = k as f64 * ctx.min_spacing;
        for h in [ctx.target + step, ctx.target - step] {
            let u = ctx.direction * h;
            if u > 0.0 && ctx.fits_inner(u) && ctx.fits_outer(u) {
                return Some(Placement {
                    strategy: Strategy::Search,
                    moves: vec![(ctx.index, h)],
                });
            }
        }
    }
    Some(Placement {
        strategy: Strategy::Search,
        moves: vec![(ctx.index, ctx.heights[ctx.index])],
    })
}

/// A run of consecutive timestamps `start..=end` over which `actor` stays on one side of ego.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    actor: ActorId,
    start: usize,
    end: usize,
    direction: i8,
    /// Smallest rank distance to ego over the run.
    proximity: usize,
}

impl Span {
    fn len(&self) -> usize {
        self.end - self.start + 1
    }
}

struct Columns {
    actors: Vec<Vec<ActorId>>,
    heights: Vec<Vec<f64>>,
    resolved: Vec<Vec<bool>>,
    gaps: Vec<Vec<f64>>,
    ego_index: Vec<Option<usize>>,
}

pub fn place(
    network: &Network,
    ordering: &Ordering,
    alignment: &Alignment,
    spacing: &Spacing<'_>,
    config: &LayoutConfig,
) -> HeightTable {
    let n_ts = network.timestamp_count();
    let mut cols = pack(network, ordering, spacing);
    let spans = spans(network, alignment, &cols);

    let mut used: BTreeMap<Strategy, usize> = BTreeMap::new();
    for span in spans {
        let d = f64::from(span.direction);
        let target = (span.start..=span.end)
            .filter_map(|t| {
                let i = cols.actors[t].iter().position(|&a| a == span.actor)?;
                Some(cols.heights[t][i])
            })
            .fold(0.0_f64, |best, h| if d * h > d * best { h } else { best });

        for t in span.start..=span.end {
            let Some(index) = cols.actors[t].iter().position(|&a| a == span.actor) else {
                continue;
            };
            let ctx = PlacementContext {
                column: &cols.actors[t],
                heights: &cols.heights[t],
                resolved: &cols.resolved[t],
                gaps: &cols.gaps[t],
                index,
                direction: d,
                target,
                min_spacing: spacing.min,
                push_threshold: config.push_threshold(),
            };
            let Some(placement) = STRATEGIES.iter().find_map(|strategy| strategy(&ctx)) else {
                continue;
            };
            tracing::trace!(actor = span.actor.0, t, strategy = ?placement.strategy, "placed");
            *used.entry(placement.strategy).or_default() += 1;
            for (i, h) in placement.moves {
                cols.heights[t][i] = h;
            }
            cols.resolved[t][index] = true;
        }
    }
    tracing::debug!(strategies = ?used, "line compaction");

    let mut heights = HeightTable::new(network.actors.len(), n_ts);
    for t in 0..n_ts {
        for (&a, &h) in cols.actors[t].iter().zip(&cols.heights[t]) {
            heights.set(a, t, Height::Present(h));
        }
    }
    heights
}

/// Packs every column as tightly as possible around ego (or from 0 when ego is absent).
fn pack(network: &Network, ordering: &Ordering, spacing: &Spacing<'_>) -> Columns {
    let n_ts = network.timestamp_count();
    let mut cols = Columns {
        actors: Vec::with_capacity(n_ts),
        heights: Vec::with_capacity(n_ts),
        resolved: Vec::with_capacity(n_ts),
        gaps: Vec::with_capacity(n_ts),
        ego_index: Vec::with_capacity(n_ts),
    };
    for t in 0..n_ts {
        let column = ordering.column(t).actors.clone();
        let gaps = spacing.gaps(t, &column);
        let ego_index = column.iter().position(|&a| a == network.ego);
        let center = ego_index.unwrap_or(0);

        let mut heights = vec![0.0; column.len()];
        for i in center + 1..column.len() {
            heights[i] = heights[i - 1] + gaps[i - 1];
        }
        for i in (0..center).rev() {
            heights[i] = heights[i + 1] - gaps[i];
        }

        let mut resolved = vec![false; column.len()];
        if let Some(e) = ego_index {
            resolved[e] = true;
        }
        cols.actors.push(column);
        cols.heights.push(heights);
        cols.resolved.push(resolved);
        cols.gaps.push(gaps);
        cols.ego_index.push(ego_index);
    }
    cols
}

/// Self-aligned runs of two or more timestamps, split where the actor changes side, most
/// valuable first: longer runs, then runs closer to ego.
fn spans(network: &Network, alignment: &Alignment, cols: &Columns) -> Vec<Span> {
    let n_ts = network.timestamp_count();
    let mut out: Vec<Span> = Vec::new();
    for (ix, actor) in network.actors.iter().enumerate() {
        let a = ActorId(ix);
        if a == network.ego || actor.active_timestamps() < 2 {
            continue;
        }

        let placement = |t: usize| -> Option<(i8, usize)> {
            let pos = cols.actors[t].iter().position(|&x| x == a)?;
            let ego = cols.ego_index[t].unwrap_or(0);
            let direction = if pos < ego { -1 } else { 1 };
            Some((direction, pos.abs_diff(ego)))
        };

        let mut current: Option<Span> = None;
        for t in 0..n_ts {
            let Some((direction, distance)) = placement(t) else {
                out.extend(current.take().filter(|s| s.len() > 1));
                continue;
            };
            let continues = t > 0 && alignment.table.is_straight(a, t - 1);
            match current.as_mut() {
                Some(span) if continues && span.direction == direction => {
                    span.end = t;
                    span.proximity = span.proximity.min(distance);
                }
                _ => {
                    out.extend(current.take().filter(|s| s.len() > 1));
                    current = Some(Span {
                        actor: a,
                        start: t,
                        end: t,
                        direction,
                        proximity: distance,
                    });
                }
            }
        }
        out.extend(current.filter(|s| s.len() > 1));
    }

    out.sort_by(|x, y| {
        y.len()
            .cmp(&x.len())
            .then(x.proximity.cmp(&y.proximity))
            .then(x.actor.cmp(&y.actor))
            .then(x.start.cmp(&y.start))
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(
        column: &'a [ActorId],
        heights: &'a [f64],
        resolved: &'a [bool],
        gaps: &'a [f64],
        index: usize,
        target: f64,
    ) -> PlacementContext<'a> {
        PlacementContext {
            column,
            heights,
            resolved,
            gaps,
            index,
            direction: 1.0,
            target,
            min_spacing: 5.0,
            push_threshold: 15.0,
        }
    }

    const COLUMN: [ActorId; 4] = [ActorId(0), ActorId(1), ActorId(2), ActorId(3)];
    const GAPS: [f64; 3] = [5.0, 5.0, 5.0];

    #[test]
    fn insert_needs_room_on_both_sides() {
        let heights = [0.0, 5.0, 20.0, 25.0];
        let resolved = [true, false, false, false];
        let c = ctx(&COLUMN, &heights, &resolved, &GAPS, 1, 12.0);
        assert_eq!(insert(&c).map(|p| p.moves), Some(vec![(1, 12.0)]));
        let c = ctx(&COLUMN, &heights, &resolved, &GAPS, 1, 18.0);
        assert_eq!(insert(&c), None);
    }

    #[test]
    fn unobstructed_push_cascades_outward() {
        let heights = [0.0, 5.0, 10.0, 15.0];
        let resolved = [true, false, false, false];
        let c = ctx(&COLUMN, &heights, &resolved, &GAPS, 1, 10.0);
        let p = push_unobstructed(&c).unwrap();
        assert_eq!(p.moves, vec![(1, 10.0), (2, 15.0), (3, 20.0)]);
    }

    #[test]
    fn resolved_blocker_limits_the_push() {
        let heights = [0.0, 5.0, 10.0, 15.0];
        let resolved = [true, false, false, true];
        let c = ctx(&COLUMN, &heights, &resolved, &GAPS, 1, 10.0);
        assert_eq!(push_unobstructed(&c), None);
        assert_eq!(push_block(&c), None);
        assert_eq!(push_partial(&c), None);
        let p = search(&c).unwrap();
        assert_eq!(p.strategy, Strategy::Search);
        assert_eq!(p.moves, vec![(1, 5.0)]);
    }

    #[test]
    fn large_moves_shift_the_block_rigidly() {
        let heights = [0.0, 5.0, 12.0, 60.0];
        let resolved = [true, false, false, true];
        let c = ctx(&COLUMN, &heights, &resolved, &GAPS, 1, 25.0);
        let p = push_block(&c).unwrap();
        assert_eq!(p.moves, vec![(1, 25.0), (2, 32.0)]);
    }

    #[test]
    fn partial_push_stops_before_the_blocker() {
        let heights = [0.0, 5.0, 10.0, 30.0];
        let resolved = [true, false, false, true];
        let c = ctx(&COLUMN, &heights, &resolved, &GAPS, 1, 12.0);
        assert_eq!(insert(&c), None);
        assert_eq!(push_block(&c), None);
        let p = push_partial(&c).unwrap();
        assert_eq!(p.moves, vec![(1, 12.0), (2, 17.0)]);
    }
}
