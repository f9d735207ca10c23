use crate::config::LayoutConfig;
use crate::model::ActorId;
use crate::network::Network;

/// Minimum vertical distance between two neighbouring storylines.
#[derive(Debug, Clone, Copy)]
pub struct Spacing<'a> {
    network: &'a Network,
    pub min: f64,
    squeeze: Option<f64>,
    zone_factor: f64,
}

impl<'a> Spacing<'a> {
    pub fn new(network: &'a Network, config: &LayoutConfig) -> Self {
        Self {
            network,
            min: config.min_spacing,
            squeeze: config
                .squeeze_same_category
                .then_some(config.same_category_factor),
            zone_factor: config.zone_gap_factor,
        }
    }

    /// Distance between session blocks stacked on top of each other.
    pub fn block_gap(&self) -> f64 {
        self.min * self.zone_factor
    }

    /// Required distance between `upper` and the actor right below it, `lower`, at `t`.
    pub fn gap(&self, t: usize, upper: ActorId, lower: ActorId) -> f64 {
        let mut gap = self.min;
        if let Some(factor) = self.squeeze {
            if self.network.same_category(upper, lower) {
                gap *= factor;
            }
        }
        if self.crosses_boundary(t, upper, lower) {
            gap *= self.zone_factor;
        }
        gap
    }

    /// Gaps between consecutive entries of `column`.
    pub fn gaps(&self, t: usize, column: &[ActorId]) -> Vec<f64> {
        column.windows(2).map(|w| self.gap(t, w[0], w[1])).collect()
    }

    fn crosses_boundary(&self, t: usize, a: ActorId, b: ActorId) -> bool {
        let (sa, sb) = (self.network.session_of(a, t), self.network.session_of(b, t));
        if sa != sb {
            return true;
        }
        let Some(skeleton) = sa.and_then(|s| self.network.session(s).skeleton.as_ref()) else {
            return false;
        };
        match (skeleton.hops_of(a), skeleton.hops_of(b)) {
            (Some(ha), Some(hb)) => ha > 0 && hb > 0 && ha != hb,
            _ => false,
        }
    }
}
