//! Space-minimising placement: sessions packed as tight blocks around ego, idle storylines
//! slotted into the nearest free band outside the blocks.

use super::slots::{Side, SlotTable};
use super::spacing::Spacing;
use crate::model::{ActorId, SessionId, SessionKind};
use crate::network::Network;
use crate::order::Ordering;
use crate::tables::{Height, HeightTable};

const EPS: f64 = 1e-9;

/// Vertical extent covered by session blocks at one timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Band {
    top: f64,
    bottom: f64,
}

pub fn place(
    network: &Network,
    ordering: &Ordering,
    slots: &SlotTable,
    spacing: &Spacing<'_>,
) -> HeightTable {
    let n_ts = network.timestamp_count();
    let mut heights = HeightTable::new(network.actors.len(), n_ts);
    let mut bands: Vec<Band> = Vec::with_capacity(n_ts);

    for t in 0..n_ts {
        bands.push(place_blocks(network, ordering, slots, spacing, &mut heights, t));
    }
    for (t, band) in bands.iter().enumerate() {
        place_idle(network, ordering, spacing, &mut heights, *band, t);
    }
    heights
}

/// Sequential heights for `members`, starting at 0.
fn stack(spacing: &Spacing<'_>, t: usize, members: &[ActorId]) -> Vec<f64> {
    let mut out = Vec::with_capacity(members.len());
    let mut h = 0.0;
    for (i, &m) in members.iter().enumerate() {
        if i > 0 {
            h += spacing.gap(t, members[i - 1], m);
        }
        out.push(h);
    }
    out
}

fn place_blocks(
    network: &Network,
    ordering: &Ordering,
    slots: &SlotTable,
    spacing: &Spacing<'_>,
    heights: &mut HeightTable,
    t: usize,
) -> Band {
    let ego = network.ego;
    let mut band = Band {
        top: 0.0,
        bottom: 0.0,
    };

    match network.ego_session(t) {
        Some(sid) if network.session(sid).kind == SessionKind::Contact => {
            let members = &network.session(sid).members;
            let stacked = stack(spacing, t, members);
            let ego_h = members
                .iter()
                .position(|&m| m == ego)
                .map(|i| stacked[i])
                .unwrap_or(0.0);
            for (&m, &h) in members.iter().zip(&stacked) {
                heights.set(m, t, Height::Present(h - ego_h));
            }
            band.top = stacked.first().map_or(0.0, |h| h - ego_h);
            band.bottom = stacked.last().map_or(0.0, |h| h - ego_h);
        }
        Some(_) => heights.set(ego, t, Height::Present(0.0)),
        None => {}
    }

    let mut others: Vec<(usize, Side, SessionId)> = ordering
        .column(t)
        .sessions
        .iter()
        .copied()
        .filter(|&s| Some(s) != network.ego_session(t))
        .filter(|&s| network.session(s).kind == SessionKind::Contact)
        .filter_map(|s| {
            let slot = slots.slot_of(s)?;
            Some((slots.distance(slot), slots.side(slot), s))
        })
        .collect();
    others.sort_by_key(|&(distance, _, s)| (distance, s));

    for (_, side, sid) in others {
        let members = &network.session(sid).members;
        let stacked = stack(spacing, t, members);
        let extent = stacked.last().copied().unwrap_or(0.0);
        let start = match side {
            Side::Above => band.top - spacing.block_gap() - extent,
            Side::Below => band.bottom + spacing.block_gap(),
        };
        for (&m, &h) in members.iter().zip(&stacked) {
            heights.set(m, t, Height::Present(start + h));
        }
        match side {
            Side::Above => band.top = start,
            Side::Below => band.bottom = start + extent,
        }
    }
    band
}

fn place_idle(
    network: &Network,
    ordering: &Ordering,
    spacing: &Spacing<'_>,
    heights: &mut HeightTable,
    band: Band,
    t: usize,
) {
    let column = ordering.column(t);
    let n_ts = network.timestamp_count();
    for &a in &column.idle {
        if a == network.ego {
            heights.set(a, t, Height::Present(0.0));
            continue;
        }

        let placed: Vec<f64> = column
            .idle
            .iter()
            .filter(|&&o| o != a)
            .filter_map(|&o| heights.get(o, t))
            .collect();
        let is_free = |h: f64| {
            let outside = h <= band.top - spacing.min + EPS || h >= band.bottom + spacing.min - EPS;
            outside && placed.iter().all(|p| (p - h).abs() >= spacing.min - EPS)
        };

        let continued = [t.checked_sub(1), (t + 1 < n_ts).then_some(t + 1)]
            .into_iter()
            .flatten()
            .filter_map(|u| heights.get(a, u))
            .find(|&h| is_free(h));
        if let Some(h) = continued {
            heights.set(a, t, Height::Present(h));
            continue;
        }

        let side = preferred_side(network, column.actors.as_slice(), heights, a, t);
        let (mut h, step) = match side {
            Side::Above => (band.top - spacing.min, -spacing.min),
            Side::Below => (band.bottom + spacing.min, spacing.min),
        };
        while !is_free(h) {
            h += step;
        }
        heights.set(a, t, Height::Present(h));
    }
}

/// Side of whichever resolved rank-neighbour sits closer to ego.
fn preferred_side(
    network: &Network,
    column: &[ActorId],
    heights: &HeightTable,
    actor: ActorId,
    t: usize,
) -> Side {
    let pos = column.iter().position(|&a| a == actor).unwrap_or(0);
    let before = column[..pos].iter().rev().find_map(|&o| heights.get(o, t));
    let after = column[pos + 1..].iter().find_map(|&o| heights.get(o, t));
    let nearest = match (before, after) {
        (Some(b), Some(a)) if a.abs() < b.abs() => Some(a),
        (Some(b), _) => Some(b),
        (None, a) => a,
    };
    match nearest {
        Some(h) if h < 0.0 => Side::Above,
        Some(h) if h > 0.0 => Side::Below,
        _ => {
            let ego_pos = column.iter().position(|&a| a == network.ego);
            match ego_pos {
                Some(e) if pos < e => Side::Above,
                _ => Side::Below,
            }
        }
    }
}
