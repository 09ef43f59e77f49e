//! Graph store and the queries the reduction stages run against it.
//!
//! # Overview
//!
//! ```text
//! Snapshot records
//!        ↓  reduce::filter::build_working_graph()
//! DepGraph (StableDiGraph, ids → indices)
//!        ↓  relevance / orphans / collapse mutate in place
//! DepGraph (reduced)
//!        ↓  stats::GraphStats::from_graph()
//! GraphStats
//! ```
//!
//! [`reach`] answers the connectivity questions the chain collapser asks
//! while the store is being rewritten.

pub mod reach;
pub mod stats;
pub mod store;

pub use reach::{connected, mutually_connected};
pub use stats::GraphStats;
pub use store::{DepGraph, Edge, label_weight};
