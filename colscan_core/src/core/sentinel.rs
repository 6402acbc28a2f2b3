use crate::core::db_type::{ColumnKind, ColumnType, SlotWidth};

pub const TINYINT_NULL: u64 = 0x80;
pub const TINYINT_EMPTY: u64 = 0x81;
pub const SMALLINT_NULL: u64 = 0x8000;
pub const SMALLINT_EMPTY: u64 = 0x8001;
pub const INT_NULL: u64 = 0x8000_0000;
pub const INT_EMPTY: u64 = 0x8000_0001;
pub const BIGINT_NULL: u64 = 0x8000_0000_0000_0000;
pub const BIGINT_EMPTY: u64 = 0x8000_0000_0000_0001;

pub const UTINYINT_NULL: u64 = 0xFE;
pub const UTINYINT_EMPTY: u64 = 0xFF;
pub const USMALLINT_NULL: u64 = 0xFFFE;
pub const USMALLINT_EMPTY: u64 = 0xFFFF;
pub const UINT_NULL: u64 = 0xFFFF_FFFE;
pub const UINT_EMPTY: u64 = 0xFFFF_FFFF;
pub const UBIGINT_NULL: u64 = 0xFFFF_FFFF_FFFF_FFFE;
pub const UBIGINT_EMPTY: u64 = 0xFFFF_FFFF_FFFF_FFFF;

pub const FLOAT_NULL: u64 = 0xFFAA_AAAA;
pub const FLOAT_EMPTY: u64 = 0xFFAA_AAAB;
pub const DOUBLE_NULL: u64 = 0xFFFA_AAAA_AAAA_AAAA;
pub const DOUBLE_EMPTY: u64 = 0xFFFA_AAAA_AAAA_AAAB;

pub const CHAR1_NULL: u64 = 0xFE;
pub const CHAR1_EMPTY: u64 = 0xFF;
pub const CHAR2_NULL: u64 = 0xFEFF;
pub const CHAR2_EMPTY: u64 = 0xFFFF;
pub const CHAR4_NULL: u64 = 0xFEFF_FFFF;
pub const CHAR4_EMPTY: u64 = 0xFFFF_FFFF;
pub const CHAR8_NULL: u64 = 0xFEFF_FFFF_FFFF_FFFF;
pub const CHAR8_EMPTY: u64 = 0xFFFF_FFFF_FFFF_FFFF;

pub const DATE_NULL: u64 = 0xFFFF_FFFE;

/// Legacy NULL token still found in 8-byte text columns.
pub const CHAR8_ALT_NULL: u64 = 0xFFFF_FFFF_FFFF_FFFE;

#[inline]
fn is_char_like(column_type: &ColumnType) -> bool {
    matches!(
        column_type,
        ColumnType::CHAR
            | ColumnType::VARCHAR
            | ColumnType::BLOB
            | ColumnType::TEXT
            | ColumnType::DATE
            | ColumnType::DATETIME
            | ColumnType::TIMESTAMP
            | ColumnType::TIME
    )
}

#[inline]
fn is_date_like(column_type: &ColumnType) -> bool {
    matches!(
        column_type,
        ColumnType::DATE | ColumnType::DATETIME | ColumnType::TIMESTAMP | ColumnType::TIME
    )
}

/// Bit pattern of a never-written slot.
pub fn empty_value(column_type: &ColumnType, width: SlotWidth) -> u64 {
    match width {
        SlotWidth::Eight => match column_type {
            ColumnType::DOUBLE | ColumnType::UDOUBLE => DOUBLE_EMPTY,
            ColumnType::VARBINARY => CHAR8_EMPTY,
            t if is_char_like(t) => CHAR8_EMPTY,
            ColumnType::UBIGINT => UBIGINT_EMPTY,
            _ => BIGINT_EMPTY,
        },
        SlotWidth::Four => match column_type {
            ColumnType::FLOAT | ColumnType::UFLOAT => FLOAT_EMPTY,
            t if is_char_like(t) => CHAR4_EMPTY,
            ColumnType::UINT | ColumnType::UMEDINT => UINT_EMPTY,
            _ => INT_EMPTY,
        },
        SlotWidth::Two => match column_type {
            t if is_char_like(t) => CHAR2_EMPTY,
            ColumnType::USMALLINT => USMALLINT_EMPTY,
            _ => SMALLINT_EMPTY,
        },
        SlotWidth::One => match column_type {
            t if is_char_like(t) => CHAR1_EMPTY,
            ColumnType::UTINYINT => UTINYINT_EMPTY,
            _ => TINYINT_EMPTY,
        },
    }
}

/// Bit pattern of an SQL NULL slot.
pub fn null_value(column_type: &ColumnType, width: SlotWidth) -> u64 {
    match width {
        SlotWidth::Eight => match column_type {
            ColumnType::DOUBLE | ColumnType::UDOUBLE => DOUBLE_NULL,
            ColumnType::VARBINARY => CHAR8_NULL,
            t if is_char_like(t) => CHAR8_NULL,
            ColumnType::UBIGINT => UBIGINT_NULL,
            _ => BIGINT_NULL,
        },
        SlotWidth::Four => match column_type {
            ColumnType::FLOAT | ColumnType::UFLOAT => FLOAT_NULL,
            t if is_date_like(t) => DATE_NULL,
            t if is_char_like(t) => CHAR4_NULL,
            ColumnType::UINT | ColumnType::UMEDINT => UINT_NULL,
            _ => INT_NULL,
        },
        SlotWidth::Two => match column_type {
            t if is_char_like(t) => CHAR2_NULL,
            ColumnType::USMALLINT => USMALLINT_NULL,
            _ => SMALLINT_NULL,
        },
        SlotWidth::One => match column_type {
            t if is_char_like(t) => CHAR1_NULL,
            ColumnType::UTINYINT => UTINYINT_NULL,
            _ => TINYINT_NULL,
        },
    }
}

/// `candidate` is compared after truncation to the slot width; 8-byte text
/// columns also accept the legacy NULL token.
#[inline(always)]
pub fn is_null_value(candidate: u64, null_value: u64, kind: ColumnKind, width: SlotWidth) -> bool {
    let mask = width.mask();
    (candidate & mask) == (null_value & mask)
        || (kind == ColumnKind::Text && width == SlotWidth::Eight && candidate == CHAR8_ALT_NULL)
}

/// EMPTY/NULL patterns resolved once per (type, width) and consulted per slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sentinels {
    pub empty: u64,
    pub null: u64,
    pub kind: ColumnKind,
    pub width: SlotWidth,
}

impl Sentinels {
    pub fn resolve(column_type: &ColumnType, width: SlotWidth, kind: ColumnKind) -> Self {
        Self {
            empty: empty_value(column_type, width) & width.mask(),
            null: null_value(column_type, width) & width.mask(),
            kind,
            width,
        }
    }

    #[inline(always)]
    pub fn is_empty(&self, bits: u64) -> bool {
        bits == self.empty
    }

    #[inline(always)]
    pub fn is_null(&self, bits: u64) -> bool {
        is_null_value(bits, self.null, self.kind, self.width)
    }
}
