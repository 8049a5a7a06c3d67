//! Chunk layout for the bit splitter/merger.
//!
//! The wider side of a splitter is cut into `floor(large / small)` chunks of
//! `small` bits, aligned from bit 0 upward. Leftover high-order bits form one
//! narrower chunk at the top. Chunks are listed from high to low, which is
//! also the order of the multi-terminal side.

use trellis_common::{mask, Value};

/// A contiguous, inclusive bit range `high..=low` of the wide side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Chunk {
    /// Most significant bit of the range.
    pub high: u32,
    /// Least significant bit of the range.
    pub low: u32,
}

impl Chunk {
    /// Number of bits covered by the chunk.
    pub fn width(self) -> u32 {
        self.high - self.low + 1
    }

    /// Extracts this chunk from a wide value.
    pub fn extract(self, value: Value) -> Value {
        (value >> self.low) & mask(self.width())
    }

    /// Places a narrow value at this chunk's position, dropping excess bits.
    pub fn place(self, value: Value) -> Value {
        (value & mask(self.width())) << self.low
    }

    /// Renders the range as `high:low`, or a single index for 1-bit chunks.
    pub fn label(self) -> String {
        if self.high == self.low {
            self.high.to_string()
        } else {
            format!("{}:{}", self.high, self.low)
        }
    }
}

/// Returns `true` when the component splits (one wide input, many outputs).
///
/// Equal widths count as a splitter with a single pass-through chunk.
pub fn is_splitter(input_bit_width: u32, output_bit_width: u32) -> bool {
    input_bit_width >= output_bit_width
}

/// Computes the chunks of the wide side, ordered high to low.
pub fn chunks(input_bit_width: u32, output_bit_width: u32) -> Vec<Chunk> {
    let large = input_bit_width.max(output_bit_width);
    let small = input_bit_width.min(output_bit_width);

    if small == 0 {
        return vec![Chunk {
            high: large.saturating_sub(1),
            low: 0,
        }];
    }

    let full_chunks = large / small;
    let remainder = large % small;

    let mut result = Vec::with_capacity(full_chunks as usize + 1);
    if remainder > 0 {
        result.push(Chunk {
            high: large - 1,
            low: large - remainder,
        });
    }
    for i in (0..full_chunks).rev() {
        result.push(Chunk {
            high: (i + 1) * small - 1,
            low: i * small,
        });
    }
    result
}

/// Name of the single wide terminal: `in{w-1}:0` for a splitter, `out{w-1}:0` for a merger.
pub fn wide_terminal_name(input_bit_width: u32, output_bit_width: u32) -> String {
    if is_splitter(input_bit_width, output_bit_width) {
        terminal_name("in", whole(input_bit_width))
    } else {
        terminal_name("out", whole(output_bit_width))
    }
}

/// Name of a chunk terminal on the narrow, multi-terminal side.
pub fn chunk_terminal_name(input_bit_width: u32, output_bit_width: u32, chunk: Chunk) -> String {
    let prefix = if is_splitter(input_bit_width, output_bit_width) {
        "out"
    } else {
        "in"
    };
    terminal_name(prefix, chunk)
}

fn whole(width: u32) -> Chunk {
    Chunk {
        high: width.saturating_sub(1),
        low: 0,
    }
}

fn terminal_name(prefix: &str, chunk: Chunk) -> String {
    format!("{prefix}{}", chunk.label())
}
