//! The closed set of component kinds and their configuration.
//!
//! [`ComponentKind`] is a tagged union: each variant carries exactly the
//! configuration its evaluator and terminal resolver need. Adding a kind means
//! adding a variant here, after which every exhaustive `match` in the
//! resolver and the simulator points at the code that still has to handle it.
//!
//! Configuration is validated once, when a [`Component`] is constructed or
//! edited. The simulator assumes every component it sees is valid.

use serde::{Deserialize, Serialize};
use std::fmt;
use trellis_common::{ComponentId, DisplayFormat, Value, MAX_BIT_WIDTH};

use crate::error::NetlistError;

/// Fewest inputs a gate may have.
pub const MIN_GATE_INPUTS: u32 = 2;
/// Most inputs a gate may have.
pub const MAX_GATE_INPUTS: u32 = 8;
/// Widest multiplexer select input.
pub const MAX_SELECT_BITS: u32 = 8;
/// Widest decoder input.
pub const MAX_DECODER_BITS: u32 = 8;
/// Widest memory address.
pub const MAX_ADDRESS_SIZE: u32 = 20;
/// Largest memory word, in bytes. A word must fit in one terminal value.
pub const MAX_WORD_SIZE: u32 = MAX_BIT_WIDTH / 8;

/// The Boolean operator of a multi-input gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GateType {
    /// Bitwise AND.
    And,
    /// Bitwise OR.
    Or,
    /// Inverted AND.
    Nand,
    /// Inverted OR.
    Nor,
    /// Bitwise exclusive OR.
    Xor,
    /// Inverted exclusive OR.
    Xnor,
}

impl GateType {
    /// Returns `true` for the gate types whose result is inverted.
    pub fn is_inverted(self) -> bool {
        matches!(self, GateType::Nand | GateType::Nor | GateType::Xnor)
    }
}

impl fmt::Display for GateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GateType::And => "AND",
            GateType::Or => "OR",
            GateType::Nand => "NAND",
            GateType::Nor => "NOR",
            GateType::Xor => "XOR",
            GateType::Xnor => "XNOR",
        };
        f.write_str(s)
    }
}

/// Whether a memory can be written on a clock edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MemoryType {
    /// Read-only memory. Contents never change during simulation.
    Rom,
    /// Read/write memory with `data` and `we` inputs.
    Ram,
}

/// A component kind together with its kind-specific configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ComponentKind {
    /// N-input bitwise gate.
    Gate {
        /// The Boolean operator.
        gate_type: GateType,
        /// Number of data inputs.
        inputs: u32,
        /// Width of every input and of the output.
        bit_width: u32,
    },
    /// Bitwise inverter.
    Not {
        /// Width of input and output.
        bit_width: u32,
    },
    /// Multiplexer with `2^select_bits` data inputs.
    Mux {
        /// Width of the `sel` input.
        select_bits: u32,
        /// Width of the data inputs and the output.
        bit_width: u32,
    },
    /// One-hot decoder with `2^input_bits` single-bit outputs.
    Decoder {
        /// Width of the `in` input.
        input_bits: u32,
    },
    /// Ripple adder with carry in and carry out.
    Adder {
        /// Width of `a`, `b` and `sum`.
        bit_width: u32,
    },
    /// Edge-triggered register.
    Register {
        /// Width of `d` and `q`.
        bit_width: u32,
    },
    /// Byte-addressed memory read as little-endian words.
    Memory {
        /// ROM or RAM.
        memory_type: MemoryType,
        /// Width of the `addr` input; the memory holds `2^address_size` words.
        address_size: u32,
        /// Bytes per word.
        word_size: u32,
        /// Initial contents loaded when simulation state is allocated.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        init: Vec<u8>,
    },
    /// Fixed value source.
    Constant {
        /// Output width.
        bit_width: u32,
        /// The value, masked to `bit_width` on output.
        value: Value,
        /// How the value is shown to the user.
        #[serde(default)]
        display_format: DisplayFormat,
    },
    /// Single-bit toggle source.
    Switch {
        /// Current switch position.
        #[serde(default)]
        is_on: bool,
    },
    /// Multi-bit user-set source.
    Input {
        /// Output width.
        bit_width: u32,
        /// Current value set by the user.
        #[serde(default)]
        value: Value,
        /// How the value is shown and entered.
        #[serde(default)]
        display_format: DisplayFormat,
    },
    /// Bit splitter (wide to narrow) or merger (narrow to wide).
    Splitter {
        /// Width of the input side.
        input_bit_width: u32,
        /// Width of the output side.
        output_bit_width: u32,
    },
    /// Single-bit indicator. Sink only.
    Led,
    /// Multi-bit value display. Sink only.
    Output {
        /// Input width.
        bit_width: u32,
        /// How the value is shown.
        #[serde(default)]
        display_format: DisplayFormat,
    },
}

impl ComponentKind {
    /// Returns the lower-case kind name used in circuit documents.
    pub fn name(&self) -> &'static str {
        match self {
            ComponentKind::Gate { .. } => "gate",
            ComponentKind::Not { .. } => "not",
            ComponentKind::Mux { .. } => "mux",
            ComponentKind::Decoder { .. } => "decoder",
            ComponentKind::Adder { .. } => "adder",
            ComponentKind::Register { .. } => "register",
            ComponentKind::Memory { .. } => "memory",
            ComponentKind::Constant { .. } => "constant",
            ComponentKind::Switch { .. } => "switch",
            ComponentKind::Input { .. } => "input",
            ComponentKind::Splitter { .. } => "splitter",
            ComponentKind::Led => "led",
            ComponentKind::Output { .. } => "output",
        }
    }

    /// Returns `true` for kinds that hold state across clock edges.
    pub fn is_sequential(&self) -> bool {
        matches!(
            self,
            ComponentKind::Register { .. } | ComponentKind::Memory { .. }
        )
    }

    /// Returns `true` for kinds with no outputs, whose inputs are only displayed.
    pub fn is_sink(&self) -> bool {
        matches!(self, ComponentKind::Led | ComponentKind::Output { .. })
    }

    /// Returns `true` for kinds the user can drive interactively.
    pub fn is_source(&self) -> bool {
        matches!(
            self,
            ComponentKind::Switch { .. } | ComponentKind::Input { .. }
        )
    }

    /// Returns the memory size in bytes, or `None` for non-memory kinds.
    pub fn memory_capacity(&self) -> Option<usize> {
        match self {
            ComponentKind::Memory {
                address_size,
                word_size,
                ..
            } => Some((*word_size as usize) << *address_size),
            _ => None,
        }
    }

    /// Checks that every configured width and count is in its supported range.
    pub fn validate(&self) -> Result<(), NetlistError> {
        let kind = self.name();
        match self {
            ComponentKind::Gate {
                inputs, bit_width, ..
            } => {
                check_range(kind, "inputs", *inputs, MIN_GATE_INPUTS, MAX_GATE_INPUTS)?;
                check_width(kind, "bit_width", *bit_width)
            }
            ComponentKind::Not { bit_width }
            | ComponentKind::Adder { bit_width }
            | ComponentKind::Register { bit_width }
            | ComponentKind::Constant { bit_width, .. }
            | ComponentKind::Input { bit_width, .. }
            | ComponentKind::Output { bit_width, .. } => check_width(kind, "bit_width", *bit_width),
            ComponentKind::Mux {
                select_bits,
                bit_width,
            } => {
                check_range(kind, "select_bits", *select_bits, 1, MAX_SELECT_BITS)?;
                check_width(kind, "bit_width", *bit_width)
            }
            ComponentKind::Decoder { input_bits } => {
                check_range(kind, "input_bits", *input_bits, 1, MAX_DECODER_BITS)
            }
            ComponentKind::Memory {
                address_size,
                word_size,
                init,
                ..
            } => {
                check_range(kind, "address_size", *address_size, 1, MAX_ADDRESS_SIZE)?;
                check_range(kind, "word_size", *word_size, 1, MAX_WORD_SIZE)?;
                let capacity = (*word_size as usize) << *address_size;
                if init.len() > capacity {
                    return Err(NetlistError::InvalidConfig {
                        kind,
                        reason: format!(
                            "init holds {} bytes but memory capacity is {capacity}",
                            init.len()
                        ),
                    });
                }
                Ok(())
            }
            ComponentKind::Splitter {
                input_bit_width,
                output_bit_width,
            } => {
                check_width(kind, "input_bit_width", *input_bit_width)?;
                check_width(kind, "output_bit_width", *output_bit_width)
            }
            ComponentKind::Switch { .. } | ComponentKind::Led => Ok(()),
        }
    }
}

fn check_width(kind: &'static str, field: &str, width: u32) -> Result<(), NetlistError> {
    check_range(kind, field, width, 1, MAX_BIT_WIDTH)
}

fn check_range(
    kind: &'static str,
    field: &str,
    value: u32,
    min: u32,
    max: u32,
) -> Result<(), NetlistError> {
    if value < min || value > max {
        return Err(NetlistError::InvalidConfig {
            kind,
            reason: format!("{field} must be between {min} and {max}, got {value}"),
        });
    }
    Ok(())
}

/// A component instance: a unique ID plus its kind and configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// Unique, editor-assigned identity.
    pub id: ComponentId,
    /// Kind and configuration.
    #[serde(flatten)]
    pub kind: ComponentKind,
}

impl Component {
    /// Creates a component after validating its configuration.
    pub fn new(id: impl Into<ComponentId>, kind: ComponentKind) -> Result<Self, NetlistError> {
        kind.validate()?;
        Ok(Self {
            id: id.into(),
            kind,
        })
    }
}
