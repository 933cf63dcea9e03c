//! # tnp-select
//!
//! Tag-and-probe candidate selection for electron identification
//! efficiency measurements.
//!
//! Per event: geometric association between object collections (jet
//! cleaning, trigger matching, generator-truth matching), resolution of
//! the tag/probe ambiguity under one of two policies, and composition of
//! the selected pair's kinematics into a reduced record.
//!
//! ```
//! use tnp_select::{Policy, SelectionConfig, Skimmer};
//!
//! let config = SelectionConfig { seed: Some(42), ..Default::default() };
//! let skimmer = Skimmer::new(config, Policy::PoleNearest).unwrap();
//! // skimmer.skim_events(&events) yields one record per resolved event.
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod association;
pub mod combinatorics;
pub mod config;
pub mod geometry;
pub mod kinematics;
pub mod output;
pub mod resolver;
pub mod skim;

pub use association::{GenMatchCuts, NO_MATCH, clean_from_jets, gen_match, trigger_match};
pub use combinatorics::index_pairs;
pub use config::{SelectionConfig, WorkingPoint};
pub use geometry::{delta_phi, delta_r};
pub use kinematics::{FourMomentum, pair_kinematics, pair_mass};
pub use output::{records_to_batch, write_parquet};
pub use resolver::{
    CandidatePair, Electrons, Outcome, resolve_pole_nearest, resolve_random_pair,
};
pub use skim::{Policy, Skimmer};
