/// Largest column block accepted by default, in bytes.
pub const BLOCK_SIZE: usize = 8192;

/// Row ids are u16 and presence flags are one byte, so no block may hold more rows.
pub const MAX_ROWS_PER_BLOCK: usize = 8192;

/// Rows covered by one bit of the result presence flags.
pub const RID_CHUNK_ROWS: usize = 1024;

/// Membership filters with up to this many literals scan an array instead of hashing.
pub const DEFAULT_MEMBERSHIP_ARRAY_THRESHOLD: usize = 8;

pub mod configuration;
pub mod core;
