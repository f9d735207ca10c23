//! Layout configuration.
//!
//! Every field has a default so partial JSON fragments (as produced by the host application) are
//! valid configurations.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Minimize {
    /// Pack storylines tightly around ego.
    #[default]
    Space,
    /// Keep storylines straight across time wherever the column allows it.
    Line,
    /// Reserved; rejected by [`crate::layout`].
    Wiggles,
}

impl Minimize {
    pub fn as_str(self) -> &'static str {
        match self {
            Minimize::Space => "space",
            Minimize::Line => "line",
            Minimize::Wiggles => "wiggles",
        }
    }
}

impl std::str::FromStr for Minimize {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "space" => Ok(Self::Space),
            "line" => Ok(Self::Line),
            "wiggles" => Ok(Self::Wiggles),
            _ => Err(()),
        }
    }
}

/// Which interactions survive extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Scope {
    /// Two-hop neighbourhood of ego per timestamp.
    #[default]
    TwoHop,
    /// Every interaction of every timestamp ego takes part in.
    Timestamps,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    pub squeeze_same_category: bool,
    pub minimize: Minimize,
    pub scope: Scope,
    pub iterations: usize,
    pub min_spacing: f64,
    pub same_category_factor: f64,
    pub zone_gap_factor: f64,
    pub push_threshold: Option<f64>,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            squeeze_same_category: false,
            minimize: Minimize::Space,
            scope: Scope::TwoHop,
            iterations: 10,
            min_spacing: 5.0,
            same_category_factor: 0.5,
            zone_gap_factor: 2.0,
            push_threshold: None,
        }
    }
}

impl LayoutConfig {
    pub fn push_threshold(&self) -> f64 {
        self.push_threshold.unwrap_or(self.min_spacing * 3.0)
    }

    /// Rejects spacings that cannot separate storylines.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("minSpacing", self.min_spacing),
            ("sameCategoryFactor", self.same_category_factor),
            ("zoneGapFactor", self.zone_gap_factor),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::InvalidConfig {
                    message: format!("{name} must be finite and positive, got {value}"),
                });
            }
        }
        if let Some(threshold) = self.push_threshold {
            if !(threshold.is_finite() && threshold >= 0.0) {
                return Err(Error::InvalidConfig {
                    message: format!("pushThreshold must be finite and non-negative, got {threshold}"),
                });
            }
        }
        Ok(())
    }
}

/// Caller-side timestamp bucketing, see [`crate::timeline`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BucketConfig {
    /// Bucket width in seconds.
    pub delta: i64,
    /// `chrono` strftime pattern applied to the bucket start (UTC).
    pub format: String,
}

impl Default for BucketConfig {
    fn default() -> Self {
        Self {
            delta: 86_400,
            format: "%Y-%m-%d".to_string(),
        }
    }
}
