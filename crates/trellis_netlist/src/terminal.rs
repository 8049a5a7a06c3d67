//! Terminal/topology resolver.
//!
//! A component's terminal set is a pure function of its kind and
//! configuration. Nothing here is cached: callers recompute after every
//! configuration edit.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::component::{ComponentKind, MemoryType};
use crate::splitter;

/// Logical direction of a terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Receives a value through at most one wire.
    In,
    /// Produces a value that may drive any number of wires.
    Out,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::In => f.write_str("in"),
            Direction::Out => f.write_str("out"),
        }
    }
}

/// A named, directional connection point with a bit width.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Terminal {
    /// Name, unique within the component (e.g., `in0`, `sel`, `q`).
    pub name: String,
    /// Input or output.
    pub direction: Direction,
    /// Bit width every value on this terminal is masked to.
    pub width: u32,
}

impl Terminal {
    fn input(name: impl Into<String>, width: u32) -> Self {
        Self {
            name: name.into(),
            direction: Direction::In,
            width,
        }
    }

    fn output(name: impl Into<String>, width: u32) -> Self {
        Self {
            name: name.into(),
            direction: Direction::Out,
            width,
        }
    }
}

/// Enumerates the terminals of a component kind, inputs before outputs.
pub fn terminals_of(kind: &ComponentKind) -> Vec<Terminal> {
    match kind {
        ComponentKind::Gate {
            inputs, bit_width, ..
        } => {
            let mut t: Vec<_> = (0..*inputs)
                .map(|i| Terminal::input(format!("in{i}"), *bit_width))
                .collect();
            t.push(Terminal::output("out", *bit_width));
            t
        }
        ComponentKind::Not { bit_width } => vec![
            Terminal::input("in", *bit_width),
            Terminal::output("out", *bit_width),
        ],
        ComponentKind::Mux {
            select_bits,
            bit_width,
        } => {
            let mut t: Vec<_> = (0..1u32 << *select_bits)
                .map(|i| Terminal::input(format!("in{i}"), *bit_width))
                .collect();
            t.push(Terminal::input("sel", *select_bits));
            t.push(Terminal::output("out", *bit_width));
            t
        }
        ComponentKind::Decoder { input_bits } => {
            let mut t = vec![Terminal::input("in", *input_bits)];
            t.extend((0..1u32 << *input_bits).map(|i| Terminal::output(format!("out{i}"), 1)));
            t
        }
        ComponentKind::Adder { bit_width } => vec![
            Terminal::input("a", *bit_width),
            Terminal::input("b", *bit_width),
            Terminal::input("cin", 1),
            Terminal::output("sum", *bit_width),
            Terminal::output("cout", 1),
        ],
        ComponentKind::Register { bit_width } => vec![
            Terminal::input("d", *bit_width),
            Terminal::output("q", *bit_width),
        ],
        ComponentKind::Memory {
            memory_type,
            address_size,
            word_size,
            ..
        } => {
            let word_bits = word_size * 8;
            let mut t = vec![Terminal::input("addr", *address_size)];
            if *memory_type == MemoryType::Ram {
                t.push(Terminal::input("data", word_bits));
                t.push(Terminal::input("we", 1));
            }
            t.push(Terminal::output("out", word_bits));
            t
        }
        ComponentKind::Constant { bit_width, .. } | ComponentKind::Input { bit_width, .. } => {
            vec![Terminal::output("out", *bit_width)]
        }
        ComponentKind::Switch { .. } => vec![Terminal::output("out", 1)],
        ComponentKind::Splitter {
            input_bit_width,
            output_bit_width,
        } => splitter_terminals(*input_bit_width, *output_bit_width),
        ComponentKind::Led => vec![Terminal::input("in", 1)],
        ComponentKind::Output { bit_width, .. } => vec![Terminal::input("in", *bit_width)],
    }
}

fn splitter_terminals(input_bit_width: u32, output_bit_width: u32) -> Vec<Terminal> {
    let is_splitter = splitter::is_splitter(input_bit_width, output_bit_width);
    let wide_name = splitter::wide_terminal_name(input_bit_width, output_bit_width);
    let chunk_terminals = splitter::chunks(input_bit_width, output_bit_width)
        .into_iter()
        .map(|chunk| {
            let name = splitter::chunk_terminal_name(input_bit_width, output_bit_width, chunk);
            if is_splitter {
                Terminal::output(name, chunk.width())
            } else {
                Terminal::input(name, chunk.width())
            }
        });

    if is_splitter {
        let mut t = vec![Terminal::input(wide_name, input_bit_width)];
        t.extend(chunk_terminals);
        t
    } else {
        let mut t: Vec<_> = chunk_terminals.collect();
        t.push(Terminal::output(wide_name, output_bit_width));
        t
    }
}

/// Looks up one terminal of a component kind by name.
pub fn find_terminal(kind: &ComponentKind, name: &str) -> Option<Terminal> {
    terminals_of(kind).into_iter().find(|t| t.name == name)
}

/// Returns only the input terminals.
pub fn inputs_of(kind: &ComponentKind) -> Vec<Terminal> {
    terminals_of(kind)
        .into_iter()
        .filter(|t| t.direction == Direction::In)
        .collect()
}

/// Returns only the output terminals.
pub fn outputs_of(kind: &ComponentKind) -> Vec<Terminal> {
    terminals_of(kind)
        .into_iter()
        .filter(|t| t.direction == Direction::Out)
        .collect()
}

impl ComponentKind {
    /// Shorthand for [`terminals_of`].
    pub fn terminals(&self) -> Vec<Terminal> {
        terminals_of(self)
    }
}
