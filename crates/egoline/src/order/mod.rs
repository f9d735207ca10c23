//! Crossing reduction.
//!
//! An alternating forward/backward barycenter sweep over the timestamps: constrained zones are
//! sorted by the rank their members had at the neighbouring timestamp, then whole sessions are
//! sorted by their barycenter.

mod barycenter;
pub use barycenter::{session_barycenter, sort_zones};

mod ordering;
pub use ordering::{Ordering, order};
