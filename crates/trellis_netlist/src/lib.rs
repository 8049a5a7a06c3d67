//! Component model and netlist structure for the Trellis logic simulator.
//!
//! A circuit is a flat list of [`Component`]s joined by directed [`Wire`]s
//! from output terminals to input terminals. This crate owns everything that
//! is purely structural:
//!
//! - `component` — the closed set of component kinds and their validated configuration
//! - `terminal` — the geometry-free terminal resolver (`terminals_of`)
//! - `splitter` — chunk layout shared by the bit splitter/merger
//! - `wire` — wire endpoints
//! - `circuit` — the editable circuit document with JSON persistence
//! - `error` — structural error types
//!
//! Nothing here evaluates values; see `trellis_sim` for the engine.

#![warn(missing_docs)]

pub mod circuit;
pub mod component;
pub mod error;
pub mod splitter;
pub mod terminal;
pub mod wire;

pub use circuit::{Circuit, NetlistIssue};
pub use component::{Component, ComponentKind, GateType, MemoryType};
pub use error::NetlistError;
pub use splitter::Chunk;
pub use terminal::{terminals_of, Direction, Terminal};
pub use wire::{Endpoint, Wire};
