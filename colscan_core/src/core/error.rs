use thiserror::Error;

use crate::core::db_type::ColumnType;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Unsupported column width: {0} bytes")]
    UnsupportedWidth(u8),

    #[error("Unknown comparison operator: {0:#04x}")]
    UnknownOperator(u8),

    #[error("Unknown combining operator: {0}")]
    UnknownCombiningOperator(u8),

    #[error("Combining operator NONE cannot join {0} filter elements")]
    InvalidCombination(usize),

    #[error("Could not create regular expression for LIKE pattern {pattern:?}: {source}")]
    InvalidLikePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("LIKE requires a text column, got {0}")]
    LikeOnNonText(ColumnType),

    #[error("Malformed predicate: {0}")]
    MalformedPredicate(String),

    #[error("Malformed request: {0}")]
    MalformedRequest(String),

    #[error("Malformed result: {0}")]
    MalformedResult(String),

    #[error("Block of {len} bytes is not a multiple of the {width}-byte slot width")]
    MisalignedBlock { len: usize, width: usize },

    #[error("Block holds {rows} rows ({len} bytes), limit is {max_rows} rows / {max_len} bytes")]
    BlockTooLarge {
        rows: usize,
        len: usize,
        max_rows: usize,
        max_len: usize,
    },

    #[error("Row id {rid} is out of range for a block of {rows} rows")]
    RowIdOutOfRange { rid: u16, rows: usize },

    #[error("Prepared filter was compiled for {filter_type}/{filter_width}B, request is {request_type}/{request_width}B")]
    FilterMismatch {
        filter_type: ColumnType,
        filter_width: usize,
        request_type: ColumnType,
        request_width: usize,
    },

    #[error("Output buffer too small: need {needed} bytes, capacity is {capacity}")]
    BufferTooSmall { needed: usize, capacity: usize },
}

pub type Result<T> = std::result::Result<T, ScanError>;
