//! Simulation error types.
//!
//! Oscillating and multi-stable circuits are normal inputs. Only the former
//! surfaces here, as [`SimError::NonConvergence`], carrying the last snapshot
//! so a caller can keep displaying it.

use std::io;

use trellis_common::{ComponentId, InternalError};
use trellis_config::ConfigError;
use trellis_netlist::NetlistError;

use crate::result::SimResult;

/// Errors that can occur during simulation setup or execution.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// Propagation hit the pass cap while outputs were still changing.
    #[error("netlist did not stabilize within {iterations} passes")]
    NonConvergence {
        /// The pass cap that was reached.
        iterations: u32,
        /// Terminal values after the final pass.
        last: Box<SimResult>,
    },

    /// A clock edge was requested while the netlist is not at a fixed point.
    #[error("cannot apply a clock edge: the netlist did not stabilize within {passes} passes")]
    Unsettled {
        /// Passes run by the failed stabilization.
        passes: u32,
    },

    /// The operation needs a started simulation.
    #[error("simulation is not running")]
    NotRunning,

    /// No component with this ID exists.
    #[error("unknown component '{0}'")]
    UnknownComponent(ComponentId),

    /// The component is not a switch or input and cannot be driven by the user.
    #[error("component '{id}' is a {kind} and cannot be set interactively")]
    NotASource {
        /// The component that was targeted.
        id: ComponentId,
        /// Its kind name.
        kind: &'static str,
    },

    /// An I/O error occurred in the interactive session.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The circuit could not be loaded or edited.
    #[error(transparent)]
    Netlist(#[from] NetlistError),

    /// The configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An internal invariant was violated.
    #[error(transparent)]
    Internal(#[from] InternalError),
}
