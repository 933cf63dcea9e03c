//! # tnp-event
//!
//! Per-event column tables for the tag-and-probe skim.
//!
//! An event is a set of named, typed attribute arrays, co-indexed within
//! each object collection (`Electron_*`, `Jet_*`, `TrigObj_*`,
//! `GenPart_*`). This crate provides the table itself, JSON ingestion,
//! and a small expression engine for threshold selections and event
//! weights.
//!
//! ```
//! use tnp_event::{Column, CompiledExpr, EventTable};
//!
//! let mut event = EventTable::new();
//! event.define("Electron_pt", Column::F64(vec![40.0, 4.0])).unwrap();
//! event.define("Electron_eta", Column::F64(vec![1.2, -2.7])).unwrap();
//!
//! let good = CompiledExpr::compile("abs(Electron_eta) < 2.5 && Electron_pt > 5").unwrap();
//! assert_eq!(good.eval_mask(&event).unwrap(), vec![true, false]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod expr;
pub mod reader;
pub mod table;

pub use expr::CompiledExpr;
pub use reader::{events_from_str, read_events};
pub use table::{Column, EventTable};
