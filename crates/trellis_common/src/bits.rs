//! Fixed-width terminal values and masking helpers.
//!
//! Every terminal value in the simulator is a [`Value`] (`u64`) masked to the
//! bit width of the terminal it sits on. Widths above [`MAX_BIT_WIDTH`] are
//! rejected when a component is configured, so masking never needs more than
//! 64 bits.

/// The integer type carried on every terminal.
pub type Value = u64;

/// Largest bit width any terminal may be configured with.
pub const MAX_BIT_WIDTH: u32 = 64;

/// Returns the all-ones mask `2^width - 1` for the given width.
///
/// Widths of 64 or more saturate to `u64::MAX`; a width of zero yields `0`.
pub fn mask(width: u32) -> Value {
    if width >= MAX_BIT_WIDTH {
        Value::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// Masks `value` to its low `width` bits.
pub fn mask_value(value: Value, width: u32) -> Value {
    value & mask(width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_small_widths() {
        assert_eq!(mask(0), 0);
        assert_eq!(mask(1), 0b1);
        assert_eq!(mask(4), 0xF);
        assert_eq!(mask(8), 0xFF);
    }

    #[test]
    fn mask_full_width() {
        assert_eq!(mask(63), u64::MAX >> 1);
        assert_eq!(mask(64), u64::MAX);
        assert_eq!(mask(200), u64::MAX);
    }

    #[test]
    fn mask_value_truncates() {
        assert_eq!(mask_value(0xFFFF, 8), 0xFF);
        assert_eq!(mask_value(u64::MAX, 4), 0xF);
        assert_eq!(mask_value(0x1234, 64), 0x1234);
    }
}
