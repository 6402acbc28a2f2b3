use crate::core::db_type::{ColumnKind, SlotWidth};

use super::{logical::ordered_compare, operation::CompareOp};

/// Comparison semantics of one value kind. Implemented by zero-sized markers
/// so the block scanner monomorphises per (kind, width).
pub trait ValueKind: Send + Sync + 'static {
    const KIND: ColumnKind;

    fn compare(lhs: u64, rhs: u64, width: SlotWidth, operation: CompareOp, tie_break: u8) -> bool;

    /// Key under which a value takes part in membership tests; `None` when the
    /// value can never compare equal to anything.
    fn membership_key(bits: u64, width: SlotWidth) -> Option<u64>;

    fn less_than(lhs: u64, rhs: u64, width: SlotWidth) -> bool;

    /// Value as published in the min/max fields of the result header.
    fn widen(bits: u64, width: SlotWidth) -> i64;

    /// Min/max reported for a block without live values.
    fn empty_range() -> (i64, i64);
}

pub struct SignedKind;
pub struct UnsignedKind;
pub struct FloatKind;
pub struct TextKind;

#[inline(always)]
pub fn sign_extend(bits: u64, width: SlotWidth) -> i64 {
    let shift = 64 - (width.bytes() as u32) * 8;
    ((bits << shift) as i64) >> shift
}

#[inline(always)]
fn is_text_pad(byte: u8) -> bool {
    byte == 0 || byte.is_ascii_whitespace()
}

/// Slot bytes in storage order with leading and trailing whitespace/NUL padding removed.
#[inline(always)]
pub fn trim_text(bytes: &[u8]) -> &[u8] {
    let start = bytes.iter().position(|b| !is_text_pad(*b)).unwrap_or(bytes.len());
    let end = bytes.iter().rposition(|b| !is_text_pad(*b)).map_or(start, |i| i + 1);
    &bytes[start..end]
}

/// Ordering key of a text slot: the trimmed string left-aligned and read
/// big-endian, so integer order is byte-wise string order.
#[inline(always)]
pub fn text_key(bits: u64, width: SlotWidth) -> u64 {
    let raw = bits.to_le_bytes();
    let trimmed = trim_text(&raw[..width.bytes()]);
    let mut key = [0u8; 8];
    key[..trimmed.len()].copy_from_slice(trimmed);
    u64::from_be_bytes(key)
}

/// Membership key for a kind only known at run time.
pub fn membership_key(kind: ColumnKind, bits: u64, width: SlotWidth) -> Option<u64> {
    match kind {
        ColumnKind::Signed => SignedKind::membership_key(bits, width),
        ColumnKind::Unsigned => UnsignedKind::membership_key(bits, width),
        ColumnKind::Float => FloatKind::membership_key(bits, width),
        ColumnKind::Text => TextKind::membership_key(bits, width),
    }
}

impl ValueKind for SignedKind {
    const KIND: ColumnKind = ColumnKind::Signed;

    #[inline(always)]
    fn compare(lhs: u64, rhs: u64, width: SlotWidth, operation: CompareOp, tie_break: u8) -> bool {
        ordered_compare(sign_extend(lhs, width), sign_extend(rhs, width), operation, tie_break)
    }

    #[inline(always)]
    fn membership_key(bits: u64, width: SlotWidth) -> Option<u64> {
        Some(bits & width.mask())
    }

    #[inline(always)]
    fn less_than(lhs: u64, rhs: u64, width: SlotWidth) -> bool {
        sign_extend(lhs, width) < sign_extend(rhs, width)
    }

    #[inline(always)]
    fn widen(bits: u64, width: SlotWidth) -> i64 {
        sign_extend(bits, width)
    }

    fn empty_range() -> (i64, i64) {
        (i64::MAX, i64::MIN)
    }
}

impl ValueKind for UnsignedKind {
    const KIND: ColumnKind = ColumnKind::Unsigned;

    #[inline(always)]
    fn compare(lhs: u64, rhs: u64, width: SlotWidth, operation: CompareOp, tie_break: u8) -> bool {
        ordered_compare(lhs & width.mask(), rhs & width.mask(), operation, tie_break)
    }

    #[inline(always)]
    fn membership_key(bits: u64, width: SlotWidth) -> Option<u64> {
        Some(bits & width.mask())
    }

    #[inline(always)]
    fn less_than(lhs: u64, rhs: u64, width: SlotWidth) -> bool {
        (lhs & width.mask()) < (rhs & width.mask())
    }

    #[inline(always)]
    fn widen(bits: u64, width: SlotWidth) -> i64 {
        (bits & width.mask()) as i64
    }

    fn empty_range() -> (i64, i64) {
        (u64::MAX as i64, 0)
    }
}

impl ValueKind for FloatKind {
    const KIND: ColumnKind = ColumnKind::Float;

    // IEEE semantics; tie-break bytes do not apply to floating-point columns.
    #[inline(always)]
    fn compare(lhs: u64, rhs: u64, width: SlotWidth, operation: CompareOp, _tie_break: u8) -> bool {
        match width {
            SlotWidth::Four => ordered_compare(f32::from_bits(lhs as u32), f32::from_bits(rhs as u32), operation, 0),
            _ => ordered_compare(f64::from_bits(lhs), f64::from_bits(rhs), operation, 0),
        }
    }

    #[inline(always)]
    fn membership_key(bits: u64, width: SlotWidth) -> Option<u64> {
        match width {
            SlotWidth::Four => {
                let value = f32::from_bits(bits as u32);
                if value.is_nan() {
                    None
                } else if value == 0.0 {
                    Some(0)
                } else {
                    Some(value.to_bits() as u64)
                }
            }
            _ => {
                let value = f64::from_bits(bits);
                if value.is_nan() {
                    None
                } else if value == 0.0 {
                    Some(0)
                } else {
                    Some(value.to_bits())
                }
            }
        }
    }

    #[inline(always)]
    fn less_than(lhs: u64, rhs: u64, width: SlotWidth) -> bool {
        Self::compare(lhs, rhs, width, CompareOp::Less, 0)
    }

    #[inline(always)]
    fn widen(bits: u64, width: SlotWidth) -> i64 {
        (bits & width.mask()) as i64
    }

    fn empty_range() -> (i64, i64) {
        (i64::MAX, i64::MIN)
    }
}

impl ValueKind for TextKind {
    const KIND: ColumnKind = ColumnKind::Text;

    #[inline(always)]
    fn compare(lhs: u64, rhs: u64, width: SlotWidth, operation: CompareOp, tie_break: u8) -> bool {
        ordered_compare(text_key(lhs, width), text_key(rhs, width), operation, tie_break)
    }

    #[inline(always)]
    fn membership_key(bits: u64, width: SlotWidth) -> Option<u64> {
        Some(text_key(bits, width))
    }

    #[inline(always)]
    fn less_than(lhs: u64, rhs: u64, width: SlotWidth) -> bool {
        text_key(lhs, width) < text_key(rhs, width)
    }

    #[inline(always)]
    fn widen(bits: u64, width: SlotWidth) -> i64 {
        sign_extend(bits, width)
    }

    fn empty_range() -> (i64, i64) {
        (i64::MAX, i64::MIN)
    }
}
