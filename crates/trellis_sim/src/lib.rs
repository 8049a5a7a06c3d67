//! Simulation engine for Trellis logic circuits.
//!
//! The engine computes steady-state terminal values for a netlist that may
//! contain feedback, and advances registers and memories on clock edges.
//!
//! # Architecture
//!
//! Evaluation is split into pure per-kind evaluators and a relaxation loop.
//! [`Propagator::stabilize`] repeatedly sweeps all components in a freshly
//! shuffled order, pushing changed outputs through the wire graph, until a
//! pass changes nothing or the pass cap is hit. Sequential state lives in a
//! separate [`SequentialState`] that only the clock driver writes.
//!
//! # Usage
//!
//! ```ignore
//! use trellis_sim::{PropagatorConfig, Simulation};
//!
//! let mut sim = Simulation::from_circuit(&circuit, &PropagatorConfig::default());
//! sim.start()?;
//! sim.run(10)?;
//! println!("{:?}", sim.result());
//! ```
//!
//! # Modules
//!
//! - `eval` — per-kind evaluators
//! - `state` — register and memory storage
//! - `result` — terminal value maps
//! - `propagate` — the fixed-point engine
//! - `clock` — two-phase clock edges
//! - `session` — start/stop/step orchestration and free-running mode
//! - `interactive` — REPL debugger
//! - `error` — simulation error types

#![warn(missing_docs)]

pub mod clock;
pub mod error;
pub mod eval;
pub mod interactive;
pub mod propagate;
pub mod result;
pub mod session;
pub mod state;

pub use clock::EdgeUpdate;
pub use error::SimError;
pub use eval::{evaluate, InputValues, OutputValues, SequentialSlot};
pub use interactive::InteractiveSim;
pub use propagate::{Propagator, PropagatorConfig, Stabilized, DEFAULT_MAX_ITERATIONS};
pub use result::{SimResult, TerminalValues};
pub use session::{FreeRunner, Simulation};
pub use state::SequentialState;
