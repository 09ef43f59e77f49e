//! Reduction stages over the working graph.
//!
//! | stage       | module        | runs when              |
//! |-------------|---------------|------------------------|
//! | filter      | [`filter`]    | always                 |
//! | relevance   | [`relevance`] | unless `show_all_issues` |
//! | orphans     | [`orphans`]   | `hide_orphans`         |
//! | collapse    | [`collapse`]  | always                 |
//!
//! [`pipeline::reduce`] runs them in that order. [`reveal`] works on the
//! result afterwards.

pub mod collapse;
pub mod filter;
pub mod orphans;
pub mod pipeline;
pub mod relevance;
pub mod reveal;

pub use filter::{Exclusion, IncidenceIndex};
pub use pipeline::{
    ReduceSettings, Reduction, ReductionReport, Stage, StageSummary, reduce, reduce_with_flags,
};
pub use reveal::{Expansion, Toggle};
