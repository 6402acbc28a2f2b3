use byteorder::{ByteOrder, LittleEndian};

use crate::{
    RID_CHUNK_ROWS,
    core::{
        db_type::SlotWidth,
        error::{Result, ScanError},
        filter::operation::OutputType,
        protocol::{RESULT_HEADER_LEN, entry_len},
    },
};

/// Counters of a finished encoding pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodedMatches {
    pub match_count: u16,
    pub rid_flags: u8,
    /// Total bytes used in the buffer, header included.
    pub written: usize,
}

/// Appends matches after the result header of a caller-owned buffer. Every
/// write is checked against the buffer length first; an entry that does not
/// fit is rejected whole.
pub struct ResultEncoder<'a> {
    out: &'a mut [u8],
    output_type: OutputType,
    width: SlotWidth,
    entry_len: usize,
    written: usize,
    match_count: u16,
    rid_flags: u8,
}

impl<'a> ResultEncoder<'a> {
    pub fn new(out: &'a mut [u8], output_type: OutputType, width: SlotWidth) -> Result<Self> {
        if out.len() < RESULT_HEADER_LEN {
            return Err(ScanError::BufferTooSmall {
                needed: RESULT_HEADER_LEN,
                capacity: out.len(),
            });
        }

        Ok(Self {
            out,
            output_type,
            width,
            entry_len: entry_len(output_type, width),
            written: RESULT_HEADER_LEN,
            match_count: 0,
            rid_flags: 0,
        })
    }

    pub fn output_type(&self) -> OutputType {
        self.output_type
    }

    pub fn match_count(&self) -> u16 {
        self.match_count
    }

    pub fn written(&self) -> usize {
        self.written
    }

    /// Writes one match: the row id if requested, then the value's low
    /// `width` bytes if requested.
    #[inline(always)]
    pub fn emit(&mut self, rid: u16, bits: u64) -> Result<()> {
        let needed = self.written + self.entry_len;
        if needed > self.out.len() {
            return Err(ScanError::BufferTooSmall {
                needed,
                capacity: self.out.len(),
            });
        }

        let mut cursor = self.written;

        if self.output_type.includes_rid() {
            LittleEndian::write_u16(&mut self.out[cursor..cursor + 2], rid);
            self.rid_flags |= 1u8 << (rid as usize / RID_CHUNK_ROWS);
            cursor += 2;
        }

        if self.output_type.includes_value() {
            let w = self.width.bytes();
            LittleEndian::write_uint(&mut self.out[cursor..cursor + w], bits & self.width.mask(), w);
        }

        self.written = needed;
        self.match_count += 1;
        Ok(())
    }

    pub fn finish(self) -> EncodedMatches {
        EncodedMatches {
            match_count: self.match_count,
            rid_flags: self.rid_flags,
            written: self.written,
        }
    }
}
