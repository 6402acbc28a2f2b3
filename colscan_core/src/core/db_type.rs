use std::fmt::Display;

use crate::core::error::ScanError;

/// SQL datatype code of a column, as carried in the request header.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum ColumnType {
    BIT,
    TINYINT,
    CHAR,
    SMALLINT,
    DECIMAL,
    MEDINT,
    INT,
    FLOAT,
    DATE,
    BIGINT,
    DOUBLE,
    DATETIME,
    VARCHAR,
    VARBINARY,
    CLOB,
    BLOB,
    UTINYINT,
    USMALLINT,
    UDECIMAL,
    UMEDINT,
    UINT,
    UFLOAT,
    UBIGINT,
    UDOUBLE,
    TEXT,
    TIME,
    TIMESTAMP,
    UNKNOWN(u8)
}

impl Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format!("{:?}", self))
    }
}

/// Comparison semantics family a column type is filtered with.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum ColumnKind {
    Signed,
    Unsigned,
    Float,
    Text
}

impl ColumnType {
    pub fn to_byte(&self) -> u8 {
        match self {
            ColumnType::BIT => 0,
            ColumnType::TINYINT => 1,
            ColumnType::CHAR => 2,
            ColumnType::SMALLINT => 3,
            ColumnType::DECIMAL => 4,
            ColumnType::MEDINT => 5,
            ColumnType::INT => 6,
            ColumnType::FLOAT => 7,
            ColumnType::DATE => 8,
            ColumnType::BIGINT => 9,
            ColumnType::DOUBLE => 10,
            ColumnType::DATETIME => 11,
            ColumnType::VARCHAR => 12,
            ColumnType::VARBINARY => 13,
            ColumnType::CLOB => 14,
            ColumnType::BLOB => 15,
            ColumnType::UTINYINT => 16,
            ColumnType::USMALLINT => 17,
            ColumnType::UDECIMAL => 18,
            ColumnType::UMEDINT => 19,
            ColumnType::UINT => 20,
            ColumnType::UFLOAT => 21,
            ColumnType::UBIGINT => 22,
            ColumnType::UDOUBLE => 23,
            ColumnType::TEXT => 24,
            ColumnType::TIME => 25,
            ColumnType::TIMESTAMP => 26,
            ColumnType::UNKNOWN(byte) => *byte
        }
    }

    /// Unrecognised codes are kept as `UNKNOWN` and filtered as signed integers.
    pub fn from_byte(byte: u8) -> ColumnType {
        match byte {
            0 => ColumnType::BIT,
            1 => ColumnType::TINYINT,
            2 => ColumnType::CHAR,
            3 => ColumnType::SMALLINT,
            4 => ColumnType::DECIMAL,
            5 => ColumnType::MEDINT,
            6 => ColumnType::INT,
            7 => ColumnType::FLOAT,
            8 => ColumnType::DATE,
            9 => ColumnType::BIGINT,
            10 => ColumnType::DOUBLE,
            11 => ColumnType::DATETIME,
            12 => ColumnType::VARCHAR,
            13 => ColumnType::VARBINARY,
            14 => ColumnType::CLOB,
            15 => ColumnType::BLOB,
            16 => ColumnType::UTINYINT,
            17 => ColumnType::USMALLINT,
            18 => ColumnType::UDECIMAL,
            19 => ColumnType::UMEDINT,
            20 => ColumnType::UINT,
            21 => ColumnType::UFLOAT,
            22 => ColumnType::UBIGINT,
            23 => ColumnType::UDOUBLE,
            24 => ColumnType::TEXT,
            25 => ColumnType::TIME,
            26 => ColumnType::TIMESTAMP,
            other => ColumnType::UNKNOWN(other)
        }
    }

    pub fn is_unsigned(&self) -> bool {
        matches!(
            self,
            ColumnType::UTINYINT
                | ColumnType::USMALLINT
                | ColumnType::UMEDINT
                | ColumnType::UINT
                | ColumnType::UBIGINT
        )
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnType::FLOAT | ColumnType::UFLOAT | ColumnType::DOUBLE | ColumnType::UDOUBLE => ColumnKind::Float,
            ColumnType::CHAR | ColumnType::VARCHAR | ColumnType::TEXT => ColumnKind::Text,
            t if t.is_unsigned() => ColumnKind::Unsigned,
            _ => ColumnKind::Signed
        }
    }

    /// Floating-point columns only exist at their IEEE width.
    pub fn supports_width(&self, width: SlotWidth) -> bool {
        match self {
            ColumnType::FLOAT | ColumnType::UFLOAT => width == SlotWidth::Four,
            ColumnType::DOUBLE | ColumnType::UDOUBLE => width == SlotWidth::Eight,
            _ => true
        }
    }

    /// Whether a block of this type and width can publish a min/max range usable
    /// for block pruning. Wider character columns hold dictionary tokens, not values.
    pub fn min_max_capable(&self, width: SlotWidth) -> bool {
        let bytes = width.bytes();
        match self {
            ColumnType::CHAR => bytes < 9,
            ColumnType::VARCHAR | ColumnType::BLOB | ColumnType::TEXT => bytes < 8,
            ColumnType::TINYINT
            | ColumnType::SMALLINT
            | ColumnType::MEDINT
            | ColumnType::INT
            | ColumnType::DATE
            | ColumnType::BIGINT
            | ColumnType::DATETIME
            | ColumnType::TIME
            | ColumnType::TIMESTAMP
            | ColumnType::UTINYINT
            | ColumnType::USMALLINT
            | ColumnType::UMEDINT
            | ColumnType::UINT
            | ColumnType::UBIGINT => true,
            ColumnType::DECIMAL | ColumnType::UDECIMAL => bytes <= 8,
            _ => false
        }
    }
}

/// Byte width of one column slot.
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Copy, Hash)]
pub enum SlotWidth {
    One,
    Two,
    Four,
    Eight
}

impl SlotWidth {
    #[inline(always)]
    pub fn bytes(&self) -> usize {
        match self {
            SlotWidth::One => 1,
            SlotWidth::Two => 2,
            SlotWidth::Four => 4,
            SlotWidth::Eight => 8
        }
    }

    /// All-ones mask covering the low `bytes()` bytes of a u64.
    #[inline(always)]
    pub fn mask(&self) -> u64 {
        match self {
            SlotWidth::One => 0xFF,
            SlotWidth::Two => 0xFFFF,
            SlotWidth::Four => 0xFFFF_FFFF,
            SlotWidth::Eight => u64::MAX
        }
    }
}

impl TryFrom<u8> for SlotWidth {
    type Error = ScanError;

    fn try_from(bytes: u8) -> Result<Self, Self::Error> {
        match bytes {
            1 => Ok(SlotWidth::One),
            2 => Ok(SlotWidth::Two),
            4 => Ok(SlotWidth::Four),
            8 => Ok(SlotWidth::Eight),
            other => Err(ScanError::UnsupportedWidth(other))
        }
    }
}

impl Display for SlotWidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.bytes())
    }
}
