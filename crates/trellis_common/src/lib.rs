//! Shared foundational types used across the Trellis circuit simulator.
//!
//! This crate provides bit-width masking helpers, opaque component identifiers,
//! value display formats, and common result types.

#![warn(missing_docs)]

pub mod bits;
pub mod format;
pub mod id;
pub mod result;

pub use bits::{mask, mask_value, Value, MAX_BIT_WIDTH};
pub use format::{format_value, parse_value, DisplayFormat};
pub use id::{ComponentId, WireId};
pub use result::{InternalError, TrellisResult};
