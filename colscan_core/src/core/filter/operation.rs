use crate::core::error::{Result, ScanError};

pub const COMPARE_NIL: u8 = 0x00;
pub const COMPARE_LT: u8 = 0x01;
pub const COMPARE_EQ: u8 = 0x02;
pub const COMPARE_LE: u8 = 0x03;
pub const COMPARE_GT: u8 = 0x04;
pub const COMPARE_NE: u8 = 0x05;
pub const COMPARE_GE: u8 = 0x06;
pub const COMPARE_NOT: u8 = 0x08;
pub const COMPARE_LIKE: u8 = 0x10;
pub const COMPARE_NLIKE: u8 = COMPARE_LIKE | COMPARE_NOT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Nil,
    Less,
    LessOrEquals,
    Equals,
    NotEquals,
    GreaterOrEquals,
    Greater,
    Like,
    NotLike
}

impl CompareOp {
    pub fn from_byte(byte: u8) -> Result<Self> {
        if byte & COMPARE_LIKE != 0 {
            return match byte {
                COMPARE_LIKE => Ok(CompareOp::Like),
                COMPARE_NLIKE => Ok(CompareOp::NotLike),
                other => Err(ScanError::UnknownOperator(other))
            };
        }

        match byte {
            COMPARE_NIL => Ok(CompareOp::Nil),
            COMPARE_LT => Ok(CompareOp::Less),
            COMPARE_EQ => Ok(CompareOp::Equals),
            COMPARE_LE => Ok(CompareOp::LessOrEquals),
            COMPARE_GT => Ok(CompareOp::Greater),
            COMPARE_NE => Ok(CompareOp::NotEquals),
            COMPARE_GE => Ok(CompareOp::GreaterOrEquals),
            other => Err(ScanError::UnknownOperator(other))
        }
    }

    pub fn to_byte(&self) -> u8 {
        match self {
            CompareOp::Nil => COMPARE_NIL,
            CompareOp::Less => COMPARE_LT,
            CompareOp::LessOrEquals => COMPARE_LE,
            CompareOp::Equals => COMPARE_EQ,
            CompareOp::NotEquals => COMPARE_NE,
            CompareOp::GreaterOrEquals => COMPARE_GE,
            CompareOp::Greater => COMPARE_GT,
            CompareOp::Like => COMPARE_LIKE,
            CompareOp::NotLike => COMPARE_NLIKE
        }
    }

    #[inline(always)]
    pub fn is_like(&self) -> bool {
        matches!(self, CompareOp::Like | CompareOp::NotLike)
    }
}

/// How the results of several filter elements are folded together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CombineOp {
    None,
    And,
    Or,
    Xor
}

impl CombineOp {
    pub fn from_byte(byte: u8) -> Result<Self> {
        match byte {
            0 => Ok(CombineOp::None),
            1 => Ok(CombineOp::And),
            2 => Ok(CombineOp::Or),
            3 => Ok(CombineOp::Xor),
            other => Err(ScanError::UnknownCombiningOperator(other))
        }
    }

    pub fn to_byte(&self) -> u8 {
        match self {
            CombineOp::None => 0,
            CombineOp::And => 1,
            CombineOp::Or => 2,
            CombineOp::Xor => 3
        }
    }
}

/// Output-mode bitset echoed in the result header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OutputType(u8);

impl OutputType {
    pub const RID: u8 = 0x01;
    pub const TOKEN: u8 = 0x02;
    pub const DATA_VALUE: u8 = 0x04;

    pub const RID_ONLY: OutputType = OutputType(Self::RID);
    pub const VALUE_ONLY: OutputType = OutputType(Self::DATA_VALUE);
    pub const RID_AND_VALUE: OutputType = OutputType(Self::RID | Self::DATA_VALUE);

    pub fn from_byte(byte: u8) -> Self {
        Self(byte)
    }

    pub fn to_byte(&self) -> u8 {
        self.0
    }

    #[inline(always)]
    pub fn includes_rid(&self) -> bool {
        self.0 & Self::RID != 0
    }

    #[inline(always)]
    pub fn includes_value(&self) -> bool {
        self.0 & (Self::TOKEN | Self::DATA_VALUE) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_bytes() {
        for byte in [COMPARE_NIL, COMPARE_LT, COMPARE_EQ, COMPARE_LE, COMPARE_GT, COMPARE_NE, COMPARE_GE, COMPARE_LIKE, COMPARE_NLIKE] {
            assert_eq!(CompareOp::from_byte(byte).unwrap().to_byte(), byte);
        }

        assert!(matches!(CompareOp::from_byte(0x07), Err(ScanError::UnknownOperator(0x07))));
        assert!(matches!(CompareOp::from_byte(0x12), Err(ScanError::UnknownOperator(0x12))));
        assert!(CompareOp::NotLike.is_like());
        assert!(!CompareOp::NotEquals.is_like());
    }

    #[test]
    fn test_combine_bytes() {
        assert_eq!(CombineOp::from_byte(2).unwrap(), CombineOp::Or);
        assert!(matches!(CombineOp::from_byte(9), Err(ScanError::UnknownCombiningOperator(9))));
    }

    #[test]
    fn test_output_type_flags() {
        assert!(OutputType::RID_ONLY.includes_rid());
        assert!(!OutputType::RID_ONLY.includes_value());
        assert!(OutputType::from_byte(OutputType::TOKEN).includes_value());
        assert!(OutputType::RID_AND_VALUE.includes_rid() && OutputType::RID_AND_VALUE.includes_value());
    }
}
