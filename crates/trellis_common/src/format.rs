//! Display formats for terminal values, with formatting and parsing.

use crate::bits::{mask, mask_value, Value};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a value is rendered for the user (constants, inputs, outputs, CLI dumps).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayFormat {
    /// Binary, zero-padded to the full bit width.
    Bin,
    /// Plain decimal.
    Dec,
    /// Upper-case hexadecimal with a `0x` prefix, zero-padded to whole nibbles.
    #[default]
    Hex,
}

impl fmt::Display for DisplayFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DisplayFormat::Bin => "bin",
            DisplayFormat::Dec => "dec",
            DisplayFormat::Hex => "hex",
        };
        f.write_str(s)
    }
}

/// Error type for parsing a display format name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDisplayFormatError {
    /// The input string that failed to parse.
    pub input: String,
}

impl fmt::Display for ParseDisplayFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid display format '{}' (expected bin, dec or hex)",
            self.input
        )
    }
}

impl std::error::Error for ParseDisplayFormatError {}

impl FromStr for DisplayFormat {
    type Err = ParseDisplayFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bin" => Ok(DisplayFormat::Bin),
            "dec" => Ok(DisplayFormat::Dec),
            "hex" => Ok(DisplayFormat::Hex),
            _ => Err(ParseDisplayFormatError {
                input: s.to_string(),
            }),
        }
    }
}

/// Formats `value` after masking it to `width` bits.
pub fn format_value(value: Value, width: u32, format: DisplayFormat) -> String {
    let v = mask_value(value, width);
    match format {
        DisplayFormat::Bin => format!("{v:0w$b}", w = width as usize),
        DisplayFormat::Dec => v.to_string(),
        DisplayFormat::Hex => {
            let digits = width.div_ceil(4) as usize;
            format!("0x{v:0digits$X}")
        }
    }
}

/// Parses user-entered text in the given format.
///
/// Returns `None` for empty input, malformed digits, or values that do not
/// fit in `width` bits.
pub fn parse_value(input: &str, format: DisplayFormat, width: u32) -> Option<Value> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    let parsed = match format {
        DisplayFormat::Bin => Value::from_str_radix(trimmed, 2).ok()?,
        DisplayFormat::Dec => trimmed.parse::<Value>().ok()?,
        DisplayFormat::Hex => {
            let digits = trimmed
                .strip_prefix("0x")
                .or_else(|| trimmed.strip_prefix("0X"))
                .unwrap_or(trimmed);
            Value::from_str_radix(digits, 16).ok()?
        }
    };

    if parsed > mask(width) {
        return None;
    }
    Some(parsed)
}
