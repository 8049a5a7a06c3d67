//! Per-kind component evaluators.
//!
//! [`evaluate`] maps a component's configuration, its current input values
//! and (for registers and memories) its stored state to output values. It is
//! pure: sequential kinds only read their state here; the clock driver is the
//! only writer.
//!
//! Every input is masked to its terminal width when read, and every output is
//! masked to its terminal width when produced. Missing inputs read as 0.

use std::collections::BTreeMap;

use trellis_common::{mask, mask_value, Value};
use trellis_netlist::component::{ComponentKind, GateType};
use trellis_netlist::splitter;

/// Input terminal values keyed by terminal name.
pub type InputValues = BTreeMap<String, Value>;

/// Output terminal values keyed by terminal name.
pub type OutputValues = BTreeMap<String, Value>;

/// Borrowed view of one sequential component's stored state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequentialSlot<'a> {
    /// The current register contents.
    Register(Value),
    /// The current memory buffer.
    Memory(&'a [u8]),
}

/// Evaluates one component.
///
/// `slot` is ignored by combinational kinds. A register or memory evaluated
/// without a slot behaves as if its state were all zeros.
pub fn evaluate(
    kind: &ComponentKind,
    inputs: &InputValues,
    slot: Option<SequentialSlot<'_>>,
) -> OutputValues {
    let mut out = OutputValues::new();
    match kind {
        ComponentKind::Gate {
            gate_type,
            inputs: count,
            bit_width,
        } => {
            let w = *bit_width;
            let values = (0..*count).map(|i| read(inputs, &format!("in{i}"), w));
            out.insert("out".into(), gate(*gate_type, values, w));
        }
        ComponentKind::Not { bit_width } => {
            let w = *bit_width;
            out.insert("out".into(), !read(inputs, "in", w) & mask(w));
        }
        ComponentKind::Adder { bit_width } => {
            let w = *bit_width;
            let total = u128::from(read(inputs, "a", w))
                + u128::from(read(inputs, "b", w))
                + u128::from(read(inputs, "cin", 1));
            // Truncation is the masking step; widths never exceed 64 bits.
            out.insert("sum".into(), (total as Value) & mask(w));
            out.insert("cout".into(), ((total >> w) & 1) as Value);
        }
        ComponentKind::Mux {
            select_bits,
            bit_width,
        } => {
            let sel = read(inputs, "sel", *select_bits);
            out.insert("out".into(), read(inputs, &format!("in{sel}"), *bit_width));
        }
        ComponentKind::Decoder { input_bits } => {
            let active = read(inputs, "in", *input_bits);
            for i in 0..(1u64 << *input_bits) {
                out.insert(format!("out{i}"), Value::from(i == active));
            }
        }
        ComponentKind::Constant {
            bit_width, value, ..
        }
        | ComponentKind::Input {
            bit_width, value, ..
        } => {
            out.insert("out".into(), mask_value(*value, *bit_width));
        }
        ComponentKind::Switch { is_on } => {
            out.insert("out".into(), Value::from(*is_on));
        }
        ComponentKind::Splitter {
            input_bit_width,
            output_bit_width,
        } => split_or_merge(*input_bit_width, *output_bit_width, inputs, &mut out),
        ComponentKind::Register { bit_width } => {
            let stored = match slot {
                Some(SequentialSlot::Register(v)) => v,
                _ => 0,
            };
            out.insert("q".into(), mask_value(stored, *bit_width));
        }
        ComponentKind::Memory {
            address_size,
            word_size,
            ..
        } => {
            let buffer = match slot {
                Some(SequentialSlot::Memory(b)) => b,
                _ => &[],
            };
            let addr = read(inputs, "addr", *address_size);
            out.insert("out".into(), read_word(buffer, addr, *word_size));
        }
        ComponentKind::Led | ComponentKind::Output { .. } => {}
    }
    out
}

fn read(inputs: &InputValues, name: &str, width: u32) -> Value {
    mask_value(inputs.get(name).copied().unwrap_or(0), width)
}

fn gate(gate_type: GateType, values: impl Iterator<Item = Value>, width: u32) -> Value {
    let m = mask(width);
    let folded = match gate_type {
        GateType::And | GateType::Nand => values.fold(m, |acc, v| acc & v),
        GateType::Or | GateType::Nor => values.fold(0, |acc, v| acc | v),
        GateType::Xor | GateType::Xnor => values.fold(0, |acc, v| acc ^ v),
    };
    if gate_type.is_inverted() {
        !folded & m
    } else {
        folded & m
    }
}

fn split_or_merge(
    input_bit_width: u32,
    output_bit_width: u32,
    inputs: &InputValues,
    out: &mut OutputValues,
) {
    let wide = splitter::wide_terminal_name(input_bit_width, output_bit_width);
    let chunks = splitter::chunks(input_bit_width, output_bit_width);

    if splitter::is_splitter(input_bit_width, output_bit_width) {
        let value = read(inputs, &wide, input_bit_width);
        for chunk in chunks {
            let name = splitter::chunk_terminal_name(input_bit_width, output_bit_width, chunk);
            out.insert(name, chunk.extract(value));
        }
    } else {
        let merged = chunks.into_iter().fold(0, |acc, chunk| {
            let name = splitter::chunk_terminal_name(input_bit_width, output_bit_width, chunk);
            acc | chunk.place(read(inputs, &name, chunk.width()))
        });
        out.insert(wide, mask_value(merged, output_bit_width));
    }
}

/// Assembles `word_size` bytes starting at `addr * word_size`, little-endian.
///
/// Bytes past the end of the buffer read as absent (zero).
pub(crate) fn read_word(buffer: &[u8], addr: Value, word_size: u32) -> Value {
    let start = word_offset(addr, word_size);
    (0..word_size as usize)
        .filter_map(|i| start.checked_add(i).and_then(|at| buffer.get(at)))
        .enumerate()
        .fold(0, |acc, (i, byte)| acc | (Value::from(*byte) << (8 * i)))
}

/// Byte offset of word `addr`, saturating instead of overflowing.
pub(crate) fn word_offset(addr: Value, word_size: u32) -> usize {
    usize::try_from(addr)
        .unwrap_or(usize::MAX)
        .saturating_mul(word_size as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_netlist::component::MemoryType;

    fn inputs(pairs: &[(&str, Value)]) -> InputValues {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn gate_kind(gate_type: GateType, n: u32, w: u32) -> ComponentKind {
        ComponentKind::Gate {
            gate_type,
            inputs: n,
            bit_width: w,
        }
    }

    #[test]
    fn and_gate_masks_to_width() {
        let out = evaluate(
            &gate_kind(GateType::And, 2, 8),
            &inputs(&[("in0", 0xFF), ("in1", 0x0F)]),
            None,
        );
        assert_eq!(out["out"], 0x0F);
    }

    #[test]
    fn gate_truth_tables() {
        let cases = [
            (GateType::And, 0b0001),
            (GateType::Or, 0b0111),
            (GateType::Nand, 0b1110),
            (GateType::Nor, 0b1000),
            (GateType::Xor, 0b0110),
            (GateType::Xnor, 0b1001),
        ];
        for (gate_type, expected) in cases {
            let kind = gate_kind(gate_type, 2, 4);
            let out = evaluate(&kind, &inputs(&[("in0", 0b0011), ("in1", 0b0101)]), None);
            assert_eq!(out["out"], expected, "{gate_type}");
        }
    }

    #[test]
    fn wide_gate_uses_all_inputs() {
        let kind = gate_kind(GateType::Xor, 3, 1);
        let out = evaluate(&kind, &inputs(&[("in0", 1), ("in1", 1), ("in2", 1)]), None);
        assert_eq!(out["out"], 1);
    }

    #[test]
    fn inverter_and_64_bit_width() {
        let out = evaluate(&ComponentKind::Not { bit_width: 3 }, &inputs(&[("in", 0b101)]), None);
        assert_eq!(out["out"], 0b010);
        let out = evaluate(&ComponentKind::Not { bit_width: 64 }, &InputValues::new(), None);
        assert_eq!(out["out"], u64::MAX);
    }

    #[test]
    fn adder_overflow_sets_carry() {
        let kind = ComponentKind::Adder { bit_width: 8 };
        let out = evaluate(&kind, &inputs(&[("a", 255), ("b", 1), ("cin", 0)]), None);
        assert_eq!(out["sum"], 0);
        assert_eq!(out["cout"], 1);
    }

    #[test]
    fn adder_64_bit_carry() {
        let kind = ComponentKind::Adder { bit_width: 64 };
        let out = evaluate(
            &kind,
            &inputs(&[("a", u64::MAX), ("b", u64::MAX), ("cin", 1)]),
            None,
        );
        assert_eq!(out["sum"], u64::MAX);
        assert_eq!(out["cout"], 1);
    }

    #[test]
    fn adder_uses_low_bit_of_carry_in() {
        let kind = ComponentKind::Adder { bit_width: 4 };
        let out = evaluate(&kind, &inputs(&[("a", 1), ("b", 2), ("cin", 2)]), None);
        assert_eq!(out["sum"], 3);
        assert_eq!(out["cout"], 0);
    }

    #[test]
    fn mux_selects_input() {
        let kind = ComponentKind::Mux {
            select_bits: 2,
            bit_width: 8,
        };
        let out = evaluate(
            &kind,
            &inputs(&[("in0", 10), ("in1", 11), ("in2", 12), ("in3", 13), ("sel", 2)]),
            None,
        );
        assert_eq!(out["out"], 12);
    }

    #[test]
    fn decoder_one_hot() {
        let kind = ComponentKind::Decoder { input_bits: 2 };
        let out = evaluate(&kind, &inputs(&[("in", 2)]), None);
        assert_eq!(out.len(), 4);
        assert_eq!(out["out2"], 1);
        assert_eq!(out["out0"] + out["out1"] + out["out3"], 0);
    }

    #[test]
    fn decoder_wraps_out_of_range_input() {
        let kind = ComponentKind::Decoder { input_bits: 2 };
        let out = evaluate(&kind, &inputs(&[("in", 6)]), None);
        assert_eq!(out["out2"], 1);
    }

    #[test]
    fn sources_mask_their_value() {
        let kind = ComponentKind::Constant {
            bit_width: 4,
            value: 0x1F,
            display_format: Default::default(),
        };
        assert_eq!(evaluate(&kind, &InputValues::new(), None)["out"], 0xF);
        let sw = ComponentKind::Switch { is_on: true };
        assert_eq!(evaluate(&sw, &InputValues::new(), None)["out"], 1);
    }

    #[test]
    fn splitter_extracts_chunks() {
        let kind = ComponentKind::Splitter {
            input_bit_width: 20,
            output_bit_width: 16,
        };
        let out = evaluate(&kind, &inputs(&[("in19:0", 0xABCDE)]), None);
        assert_eq!(out["out19:16"], 0xA);
        assert_eq!(out["out15:0"], 0xBCDE);
    }

    #[test]
    fn merger_combines_chunks() {
        let kind = ComponentKind::Splitter {
            input_bit_width: 4,
            output_bit_width: 8,
        };
        let out = evaluate(&kind, &inputs(&[("in7:4", 0xA), ("in3:0", 0x5)]), None);
        assert_eq!(out["out7:0"], 0xA5);
    }

    #[test]
    fn register_reads_stored_value() {
        let kind = ComponentKind::Register { bit_width: 8 };
        let out = evaluate(&kind, &inputs(&[("d", 7)]), Some(SequentialSlot::Register(42)));
        assert_eq!(out["q"], 42);
        assert_eq!(evaluate(&kind, &InputValues::new(), None)["q"], 0);
    }

    #[test]
    fn memory_reads_little_endian_words() {
        let kind = ComponentKind::Memory {
            memory_type: MemoryType::Rom,
            address_size: 2,
            word_size: 2,
            init: vec![],
        };
        let buffer = [0x01, 0x02, 0x34, 0x12, 0, 0, 0, 0];
        let out = evaluate(
            &kind,
            &inputs(&[("addr", 1)]),
            Some(SequentialSlot::Memory(&buffer)),
        );
        assert_eq!(out["out"], 0x1234);
    }

    #[test]
    fn memory_read_clips_to_buffer() {
        assert_eq!(read_word(&[0xAA, 0xBB, 0xCC], 1, 2), 0xCC);
        assert_eq!(read_word(&[], 0, 4), 0);
        assert_eq!(read_word(&[1], u64::MAX, 8), 0);
    }

    #[test]
    fn sinks_produce_nothing() {
        assert!(evaluate(&ComponentKind::Led, &inputs(&[("in", 1)]), None).is_empty());
    }

    #[test]
    fn evaluation_is_deterministic() {
        let kind = gate_kind(GateType::Nor, 4, 16);
        let ins = inputs(&[("in0", 0x1234), ("in1", 0x00F0), ("in3", 0xFFFF0000)]);
        assert_eq!(evaluate(&kind, &ins, None), evaluate(&kind, &ins, None));
    }
}
