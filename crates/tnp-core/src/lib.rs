//! # tnp-core
//!
//! Shared types for the tag-and-probe skim: the crate-wide error type and
//! the reduced per-event output record.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::{Kinematics, PairRecord};
