#![forbid(unsafe_code)]

//! Storyline layout for egocentric temporal networks.
//!
//! Given an ego actor and weighted, directed interactions observed at discrete timestamps,
//! `egoline` assigns every actor a rank and a height per timestamp so that ego's storyline is
//! straight, related actors stay close to ego, and crossings and bends are kept low.
//!
//! The pipeline runs in strict order: [`extract`] → [`network`] / [`constraints`] → [`order`]
//! → [`align`] → [`compact`]. [`layout`] runs all of it.

pub mod align;
pub mod compact;
pub mod config;
pub mod constraints;
pub mod error;
pub mod extract;
pub mod metrics;
pub mod model;
pub mod network;
pub mod order;
pub mod pipeline;
pub mod tables;
pub mod timeline;

pub use config::{BucketConfig, LayoutConfig, Minimize, Scope};
pub use error::{Error, Result};
pub use model::{ActorId, Interaction, SessionId, SessionKind};
pub use network::Network;
pub use pipeline::{Layout, LayoutInput, SessionSummary, layout};
pub use tables::{AlignmentTable, Column, Height, HeightTable, RankTable};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
