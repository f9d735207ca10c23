//! Vertical placement.
//!
//! Sessions are first given slots (tracks that follow a session lineage through time), then
//! heights are computed in the configured minimisation mode. Both modes finish the same way:
//! ego's height is checked for consistency, absent cells are cleared, heights are shifted so the
//! smallest is zero, and side flags are derived.

pub mod line;
pub mod slots;
pub mod space;
mod spacing;

pub use slots::{Side, SlotTable, assign_slots};
pub use spacing::Spacing;

use crate::align::Alignment;
use crate::config::{LayoutConfig, Minimize};
use crate::error::{Error, Result};
use crate::model::ActorId;
use crate::network::Network;
use crate::order::Ordering;
use crate::tables::{Height, HeightTable};

const EPS: f64 = 1e-9;

#[derive(Debug, Clone)]
pub struct Compaction {
    pub heights: HeightTable,
    /// Per actor: whether its storyline is found both above and below ego.
    pub sides: Vec<bool>,
    pub slots: SlotTable,
}

pub fn compact(
    network: &Network,
    ordering: &Ordering,
    alignment: &Alignment,
    config: &LayoutConfig,
) -> Result<Compaction> {
    config.validate()?;
    let slots = assign_slots(network, ordering, alignment);
    let spacing = Spacing::new(network, config);
    let mut heights = match config.minimize {
        Minimize::Space => space::place(network, ordering, &slots, &spacing),
        Minimize::Line => line::place(network, ordering, alignment, &spacing, config),
        Minimize::Wiggles => {
            return Err(Error::UnsupportedMinimize {
                mode: config.minimize.as_str().to_string(),
            });
        }
    };

    let ego_height = enforce_ego_height(network, &mut heights);
    clear_absent(network, &mut heights);
    let shift = normalize(&mut heights);
    let sides = side_flags(&heights, ego_height.map(|h| h - shift));

    Ok(Compaction {
        heights,
        sides,
        slots,
    })
}

/// Ego's storyline must be straight. Drift is reported and overwritten with the first height.
pub fn enforce_ego_height(network: &Network, heights: &mut HeightTable) -> Option<f64> {
    let ego = network.ego;
    let first = (0..network.timestamp_count()).find_map(|t| heights.get(ego, t))?;
    for t in 0..network.timestamp_count() {
        let Some(h) = heights.get(ego, t) else {
            continue;
        };
        if (h - first).abs() > EPS {
            tracing::warn!(
                ego = %network.actor(ego).name,
                timestamp = %network.timestamps[t],
                expected = first,
                found = h,
                "ego height is not constant"
            );
            heights.set(ego, t, Height::Present(first));
        }
    }
    Some(first)
}

fn clear_absent(network: &Network, heights: &mut HeightTable) {
    for (ix, actor) in network.actors.iter().enumerate() {
        for t in 0..network.timestamp_count() {
            if !actor.is_present(t) {
                heights.set(ActorId(ix), t, Height::Absent);
            }
        }
    }
}

/// Shifts every present height so the minimum is zero. Returns the amount subtracted.
pub fn normalize(heights: &mut HeightTable) -> f64 {
    let Some(min) = heights.min() else {
        return 0.0;
    };
    for row in heights.rows_mut() {
        for cell in row.iter_mut() {
            if let Height::Present(h) = cell {
                *h -= min;
            }
        }
    }
    min
}

pub fn side_flags(heights: &HeightTable, ego_height: Option<f64>) -> Vec<bool> {
    let reference = ego_height.unwrap_or(0.0);
    heights
        .rows()
        .iter()
        .map(|row| {
            let above = row
                .iter()
                .filter_map(|h| h.value())
                .any(|h| h < reference - EPS);
            let below = row
                .iter()
                .filter_map(|h| h.value())
                .any(|h| h > reference + EPS);
            above && below
        })
        .collect()
}
