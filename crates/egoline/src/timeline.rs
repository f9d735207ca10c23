//! Caller-side timestamp bucketing.
//!
//! Raw interactions carry epoch seconds; the engine works on bucket labels. Buckets are floored
//! to a multiple of `delta` and labelled with the bucket start formatted in UTC.

use crate::config::BucketConfig;
use crate::error::{Error, Result};
use crate::model::Interaction;
use chrono::DateTime;
use chrono::format::{Item, StrftimeItems};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInteraction {
    pub source_id: String,
    pub target_id: String,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
    pub weight: f64,
}

/// Labels every interaction with its bucket. Output is ordered by bucket start, keeping input
/// order within a bucket, so labels appear chronologically.
pub fn bucket_interactions(raw: &[RawInteraction], config: &BucketConfig) -> Result<Vec<Interaction>> {
    if config.delta <= 0 {
        return Err(Error::InvalidBucket {
            message: format!("delta must be positive, got {}", config.delta),
        });
    }

    if StrftimeItems::new(&config.format).any(|item| matches!(item, Item::Error)) {
        return Err(Error::InvalidBucket {
            message: format!("invalid format string `{}`", config.format),
        });
    }

    let mut keyed: Vec<(i64, &RawInteraction)> = raw
        .iter()
        .map(|it| {
            it.timestamp
                .div_euclid(config.delta)
                .checked_mul(config.delta)
                .map(|start| (start, it))
                .ok_or_else(|| Error::InvalidBucket {
                    message: format!(
                        "timestamp {} cannot be bucketed with delta {}",
                        it.timestamp, config.delta
                    ),
                })
        })
        .collect::<Result<_>>()?;
    keyed.sort_by_key(|&(start, _)| start);

    keyed
        .into_iter()
        .map(|(start, it)| {
            let Some(at) = DateTime::from_timestamp(start, 0) else {
                return Err(Error::InvalidBucket {
                    message: format!("timestamp {} is out of range", it.timestamp),
                });
            };
            Ok(Interaction {
                source_id: it.source_id.clone(),
                target_id: it.target_id.clone(),
                timestamp_label: at.format(&config.format).to_string(),
                weight: it.weight,
            })
        })
        .collect()
}
