//! Error types for circuit construction and editing.

use trellis_common::{ComponentId, WireId};

/// Errors produced while building or editing a circuit.
#[derive(Debug, thiserror::Error)]
pub enum NetlistError {
    /// A component's configuration is outside the supported range.
    #[error("invalid {kind} configuration: {reason}")]
    InvalidConfig {
        /// The component kind name (e.g., "gate").
        kind: &'static str,
        /// What is wrong with the configuration.
        reason: String,
    },

    /// A component with this ID already exists in the circuit.
    #[error("duplicate component id '{0}'")]
    DuplicateComponent(ComponentId),

    /// No component with this ID exists in the circuit.
    #[error("unknown component '{0}'")]
    UnknownComponent(ComponentId),

    /// The component has no terminal with this name.
    #[error("component '{component}' has no terminal '{terminal}'")]
    UnknownTerminal {
        /// The component that was searched.
        component: ComponentId,
        /// The terminal name that was not found.
        terminal: String,
    },

    /// A wire must run from an output terminal to an input terminal.
    #[error("wire must connect an output to an input ({from} -> {to})")]
    DirectionMismatch {
        /// The source endpoint, formatted as `component.terminal`.
        from: String,
        /// The target endpoint, formatted as `component.terminal`.
        to: String,
    },

    /// The target input terminal is already driven by another wire.
    #[error("input '{component}.{terminal}' is already driven by wire '{existing}'")]
    InputAlreadyDriven {
        /// The component owning the input.
        component: ComponentId,
        /// The input terminal name.
        terminal: String,
        /// The wire that already drives it.
        existing: WireId,
    },

    /// No wire with this ID exists in the circuit.
    #[error("unknown wire '{0}'")]
    UnknownWire(WireId),

    /// The circuit document could not be parsed or serialized.
    #[error("circuit JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An I/O error occurred while reading or writing a circuit file.
    #[error("circuit I/O error: {0}")]
    Io(#[from] std::io::Error),
}
