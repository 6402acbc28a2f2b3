use byteorder::{ByteOrder, LittleEndian};

use crate::{
    MAX_ROWS_PER_BLOCK,
    core::{
        db_type::SlotWidth,
        error::{Result, ScanError},
    },
};

/// Storage type of one fixed-width slot. Values leave the block as raw bits,
/// zero-extended to 64; the comparison kind decides how they are read.
pub trait SlotValue: Copy + Eq + Send + Sync + 'static {
    const WIDTH: SlotWidth;

    fn read_le(bytes: &[u8]) -> Self;

    fn to_bits(self) -> u64;
}

macro_rules! impl_slot_value {
    ($($type:ty => $width:expr, $read:expr);* $(;)?) => {
        $(
            impl SlotValue for $type {
                const WIDTH: SlotWidth = $width;

                #[inline(always)]
                fn read_le(bytes: &[u8]) -> Self {
                    $read(bytes)
                }

                #[inline(always)]
                fn to_bits(self) -> u64 {
                    self as u64
                }
            }
        )*
    };
}

impl_slot_value!(
    u8 => SlotWidth::One, |bytes: &[u8]| bytes[0];
    u16 => SlotWidth::Two, LittleEndian::read_u16;
    u32 => SlotWidth::Four, LittleEndian::read_u32;
    u64 => SlotWidth::Eight, LittleEndian::read_u64;
);

/// Raw bits of one stored value of the given width.
#[inline(always)]
pub fn read_slot_bits(bytes: &[u8], width: SlotWidth) -> u64 {
    match width {
        SlotWidth::One => u8::read_le(bytes).to_bits(),
        SlotWidth::Two => u16::read_le(bytes).to_bits(),
        SlotWidth::Four => u32::read_le(bytes).to_bits(),
        SlotWidth::Eight => u64::read_le(bytes).to_bits(),
    }
}

/// Borrowed view of one column block: `rows()` consecutive little-endian slots.
#[derive(Debug, Clone, Copy)]
pub struct ColumnBlock<'a> {
    bytes: &'a [u8],
    width: SlotWidth,
}

impl<'a> ColumnBlock<'a> {
    pub fn new(bytes: &'a [u8], width: SlotWidth) -> Result<Self> {
        let w = width.bytes();

        if bytes.len() % w != 0 {
            return Err(ScanError::MisalignedBlock { len: bytes.len(), width: w });
        }

        let rows = bytes.len() / w;
        if rows > MAX_ROWS_PER_BLOCK {
            return Err(ScanError::BlockTooLarge {
                rows,
                len: bytes.len(),
                max_rows: MAX_ROWS_PER_BLOCK,
                max_len: MAX_ROWS_PER_BLOCK * w,
            });
        }

        Ok(Self { bytes, width })
    }

    #[inline(always)]
    pub fn rows(&self) -> usize {
        self.bytes.len() / self.width.bytes()
    }

    #[inline(always)]
    pub fn width(&self) -> SlotWidth {
        self.width
    }

    /// Stored bytes of slot `row`.
    #[inline(always)]
    pub fn slot_bytes(&self, row: usize) -> &'a [u8] {
        let w = self.width.bytes();
        &self.bytes[row * w..(row + 1) * w]
    }

    #[inline(always)]
    pub fn value<T: SlotValue>(&self, row: usize) -> T {
        debug_assert_eq!(T::WIDTH, self.width);
        T::read_le(self.slot_bytes(row))
    }

    /// Rejects row identifiers that point past the end of the block.
    pub fn check_row_order(&self, row_order: &[u16]) -> Result<()> {
        let rows = self.rows();
        match row_order.iter().find(|rid| **rid as usize >= rows) {
            Some(rid) => Err(ScanError::RowIdOutOfRange { rid: *rid, rows }),
            None => Ok(()),
        }
    }
}
