use crate::core::db_type::SlotWidth;

use super::{kinds::ValueKind, operation::CompareOp};

/// Range/boundary tie-break bits: bit 0 resolves equality towards LT/GE,
/// bit 7 towards GT/LE.
pub const TIE_BREAK_LOW: u8 = 0x01;
pub const TIE_BREAK_HIGH: u8 = 0x80;

/// Six relational operators plus NIL, with tie-break resolution of equal
/// operands. `tie_break == 0` yields the plain operators.
#[inline(always)]
pub fn ordered_compare<T: PartialOrd>(lhs: T, rhs: T, operation: CompareOp, tie_break: u8) -> bool {
    match operation {
        CompareOp::Nil => false,
        CompareOp::Less => lhs < rhs || (lhs == rhs && tie_break & TIE_BREAK_LOW != 0),
        CompareOp::LessOrEquals => lhs < rhs || (lhs == rhs && tie_break != TIE_BREAK_HIGH),
        CompareOp::Equals => lhs == rhs && tie_break == 0,
        CompareOp::NotEquals => lhs != rhs || tie_break != 0,
        CompareOp::GreaterOrEquals => lhs > rhs || (lhs == rhs && tie_break != TIE_BREAK_LOW),
        CompareOp::Greater => lhs > rhs || (lhs == rhs && tie_break & TIE_BREAK_HIGH != 0),
        CompareOp::Like | CompareOp::NotLike => {
            panic!("Unsupported operation for ordered comparison: {:?}", operation)
        }
    }
}

/// Compares two live values of kind `K`.
#[inline(always)]
pub fn compare<K: ValueKind>(lhs: u64, rhs: u64, width: SlotWidth, operation: CompareOp) -> bool {
    K::compare(lhs, rhs, width, operation, 0)
}

/// Tie-break-aware variant used for operands pushed down from range predicates.
#[inline(always)]
pub fn compare_with_tie_break<K: ValueKind>(
    lhs: u64,
    rhs: u64,
    width: SlotWidth,
    operation: CompareOp,
    tie_break: u8,
) -> bool {
    K::compare(lhs, rhs, width, operation, tie_break)
}

/// Comparison where at least one side is the NULL pattern. Only `= NULL` with
/// both sides NULL and `<> NULL` with a non-NULL value can hold.
#[inline(always)]
pub fn compare_with_null(
    lhs: u64,
    lhs_is_null: bool,
    rhs: u64,
    rhs_is_null: bool,
    operation: CompareOp,
    tie_break: u8,
) -> bool {
    if operation.is_like() {
        return false;
    }

    match (lhs_is_null, rhs_is_null) {
        // Every NULL pattern (legacy tokens included) is the same NULL.
        (true, true) => ordered_compare(0u8, 0u8, operation, tie_break),
        (false, true) if operation == CompareOp::NotEquals => ordered_compare(lhs, rhs, operation, tie_break),
        (false, false) => ordered_compare(lhs, rhs, operation, tie_break),
        _ => false,
    }
}
