use byteorder::{ByteOrder, LittleEndian};

use crate::core::{
    db_type::{ColumnType, SlotWidth},
    error::{Result, ScanError},
    filter::operation::{CombineOp, CompareOp, OutputType},
};

pub const REQUEST_HEADER_LEN: usize = 24;
pub const RESULT_HEADER_LEN: usize = 48;

/// One column-filter request as received on the wire: a fixed header, `nops`
/// packed predicate elements, then `nvals` u16 row identifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRequest<'a> {
    pub lbid: u64,
    pub session_id: u32,
    pub column_type: ColumnType,
    pub width: SlotWidth,
    pub output_type: OutputType,
    pub combine: CombineOp,
    pub element_count: usize,
    pub sort_row_ids: bool,
    pub predicate: &'a [u8],
    pub row_ids: Vec<u16>,
}

impl<'a> ColumnRequest<'a> {
    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() < REQUEST_HEADER_LEN {
            return Err(ScanError::MalformedRequest(format!(
                "header needs {} bytes, got {}",
                REQUEST_HEADER_LEN,
                bytes.len()
            )));
        }

        let lbid = LittleEndian::read_u64(&bytes[0..8]);
        let session_id = LittleEndian::read_u32(&bytes[8..12]);
        let column_type = ColumnType::from_byte(bytes[12]);
        let width = SlotWidth::try_from(bytes[13])?;
        let output_type = OutputType::from_byte(bytes[14]);
        let combine = CombineOp::from_byte(bytes[15])?;
        let element_count = LittleEndian::read_u16(&bytes[16..18]) as usize;
        let row_count = LittleEndian::read_u16(&bytes[18..20]) as usize;
        let sort_row_ids = bytes[20] != 0;

        let predicate_start = REQUEST_HEADER_LEN;
        let predicate_end = predicate_start + element_count * (2 + width.bytes());
        let rids_end = predicate_end + row_count * 2;

        if bytes.len() < rids_end {
            return Err(ScanError::MalformedRequest(format!(
                "{} elements and {} row ids need {} bytes, got {}",
                element_count,
                row_count,
                rids_end,
                bytes.len()
            )));
        }

        let row_ids = bytes[predicate_end..rids_end]
            .chunks_exact(2)
            .map(LittleEndian::read_u16)
            .collect();

        Ok(Self {
            lbid,
            session_id,
            column_type,
            width,
            output_type,
            combine,
            element_count,
            sort_row_ids,
            predicate: &bytes[predicate_start..predicate_end],
            row_ids,
        })
    }

    pub fn row_order(&self) -> Option<&[u16]> {
        if self.row_ids.is_empty() {
            None
        } else {
            Some(&self.row_ids)
        }
    }
}

/// Encodes requests in wire form.
#[derive(Debug, Clone)]
pub struct ColumnRequestBuilder {
    lbid: u64,
    session_id: u32,
    column_type: ColumnType,
    width: SlotWidth,
    output_type: OutputType,
    combine: CombineOp,
    sort_row_ids: bool,
    element_count: usize,
    elements: Vec<u8>,
    row_ids: Vec<u16>,
}

impl ColumnRequestBuilder {
    pub fn new(column_type: ColumnType, width: SlotWidth) -> Self {
        Self {
            lbid: 0,
            session_id: 0,
            column_type,
            width,
            output_type: OutputType::RID_AND_VALUE,
            combine: CombineOp::None,
            sort_row_ids: false,
            element_count: 0,
            elements: Vec::new(),
            row_ids: Vec::new(),
        }
    }

    pub fn lbid(mut self, lbid: u64) -> Self {
        self.lbid = lbid;
        self
    }

    pub fn session_id(mut self, session_id: u32) -> Self {
        self.session_id = session_id;
        self
    }

    pub fn output_type(mut self, output_type: OutputType) -> Self {
        self.output_type = output_type;
        self
    }

    pub fn combine(mut self, combine: CombineOp) -> Self {
        self.combine = combine;
        self
    }

    pub fn sort_row_ids(mut self, sort: bool) -> Self {
        self.sort_row_ids = sort;
        self
    }

    /// Appends an element whose operand is given as raw bits; the low
    /// `width` bytes are stored.
    pub fn element(mut self, operation: CompareOp, tie_break: u8, bits: u64) -> Self {
        let w = self.width.bytes();
        self.elements.push(operation.to_byte());
        self.elements.push(tie_break);
        let start = self.elements.len();
        self.elements.resize(start + w, 0);
        LittleEndian::write_uint(&mut self.elements[start..], bits & self.width.mask(), w);
        self.element_count += 1;
        self
    }

    /// Appends an element whose operand is a string, NUL padded or cut to the slot width.
    pub fn text_element(mut self, operation: CompareOp, tie_break: u8, text: &[u8]) -> Self {
        let w = self.width.bytes();
        self.elements.push(operation.to_byte());
        self.elements.push(tie_break);
        let take = text.len().min(w);
        self.elements.extend_from_slice(&text[..take]);
        self.elements.resize(self.elements.len() + (w - take), 0);
        self.element_count += 1;
        self
    }

    pub fn row_ids(mut self, row_ids: &[u16]) -> Self {
        self.row_ids = row_ids.to_vec();
        self
    }

    /// Serializes the request. Element and row id counts must fit the u16 header fields.
    pub fn build(&self) -> Result<Vec<u8>> {
        let element_count = u16::try_from(self.element_count).map_err(|_| {
            ScanError::MalformedRequest(format!("{} elements exceed the header limit", self.element_count))
        })?;
        let row_id_count = u16::try_from(self.row_ids.len()).map_err(|_| {
            ScanError::MalformedRequest(format!("{} row ids exceed the header limit", self.row_ids.len()))
        })?;

        let mut bytes = vec![0u8; REQUEST_HEADER_LEN];
        LittleEndian::write_u64(&mut bytes[0..8], self.lbid);
        LittleEndian::write_u32(&mut bytes[8..12], self.session_id);
        bytes[12] = self.column_type.to_byte();
        bytes[13] = self.width.bytes() as u8;
        bytes[14] = self.output_type.to_byte();
        bytes[15] = self.combine.to_byte();
        LittleEndian::write_u16(&mut bytes[16..18], element_count);
        LittleEndian::write_u16(&mut bytes[18..20], row_id_count);
        bytes[20] = self.sort_row_ids as u8;

        bytes.extend_from_slice(&self.elements);
        for rid in &self.row_ids {
            bytes.extend_from_slice(&rid.to_le_bytes());
        }

        Ok(bytes)
    }
}

/// Fixed header at the start of every result buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnResultHeader {
    pub lbid: u64,
    pub session_id: u32,
    pub output_type: OutputType,
    pub rid_flags: u8,
    pub match_count: u16,
    pub valid_min_max: bool,
    pub cache_io: u32,
    pub physical_io: u32,
    pub min: i64,
    pub max: i64,
}

impl ColumnResultHeader {
    pub fn encode(&self, out: &mut [u8]) -> Result<()> {
        if out.len() < RESULT_HEADER_LEN {
            return Err(ScanError::BufferTooSmall { needed: RESULT_HEADER_LEN, capacity: out.len() });
        }

        let header = &mut out[..RESULT_HEADER_LEN];
        header.fill(0);
        LittleEndian::write_u64(&mut header[0..8], self.lbid);
        LittleEndian::write_u32(&mut header[8..12], self.session_id);
        header[12] = self.output_type.to_byte();
        header[13] = self.rid_flags;
        LittleEndian::write_u16(&mut header[14..16], self.match_count);
        header[16] = self.valid_min_max as u8;
        LittleEndian::write_u32(&mut header[20..24], self.cache_io);
        LittleEndian::write_u32(&mut header[24..28], self.physical_io);
        LittleEndian::write_i64(&mut header[32..40], self.min);
        LittleEndian::write_i64(&mut header[40..48], self.max);
        Ok(())
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < RESULT_HEADER_LEN {
            return Err(ScanError::MalformedResult(format!(
                "header needs {} bytes, got {}",
                RESULT_HEADER_LEN,
                bytes.len()
            )));
        }

        Ok(Self {
            lbid: LittleEndian::read_u64(&bytes[0..8]),
            session_id: LittleEndian::read_u32(&bytes[8..12]),
            output_type: OutputType::from_byte(bytes[12]),
            rid_flags: bytes[13],
            match_count: LittleEndian::read_u16(&bytes[14..16]),
            valid_min_max: bytes[16] != 0,
            cache_io: LittleEndian::read_u32(&bytes[20..24]),
            physical_io: LittleEndian::read_u32(&bytes[24..28]),
            min: LittleEndian::read_i64(&bytes[32..40]),
            max: LittleEndian::read_i64(&bytes[40..48]),
        })
    }
}

/// Walks the matches of a result buffer in the order they were written.
pub struct ResultReader<'a> {
    header: ColumnResultHeader,
    payload: &'a [u8],
    width: usize,
    entry_len: usize,
    position: usize,
}

impl<'a> ResultReader<'a> {
    /// The value width is not part of the result; the caller knows it from its request.
    pub fn new(bytes: &'a [u8], width: SlotWidth) -> Result<Self> {
        let header = ColumnResultHeader::decode(bytes)?;
        let entry_len = entry_len(header.output_type, width);
        let payload_len = header.match_count as usize * entry_len;
        let payload = &bytes[RESULT_HEADER_LEN..];

        if payload.len() < payload_len {
            return Err(ScanError::MalformedResult(format!(
                "{} matches need {} payload bytes, got {}",
                header.match_count,
                payload_len,
                payload.len()
            )));
        }

        Ok(Self {
            header,
            payload: &payload[..payload_len],
            width: width.bytes(),
            entry_len,
            position: 0,
        })
    }

    pub fn header(&self) -> &ColumnResultHeader {
        &self.header
    }
}

impl<'a> Iterator for ResultReader<'a> {
    type Item = (Option<u16>, Option<&'a [u8]>);

    fn next(&mut self) -> Option<Self::Item> {
        if self.entry_len == 0 || self.position + self.entry_len > self.payload.len() {
            return None;
        }

        let mut cursor = self.position;
        self.position += self.entry_len;

        let rid = if self.header.output_type.includes_rid() {
            let rid = LittleEndian::read_u16(&self.payload[cursor..cursor + 2]);
            cursor += 2;
            Some(rid)
        } else {
            None
        };

        let value = if self.header.output_type.includes_value() {
            Some(&self.payload[cursor..cursor + self.width])
        } else {
            None
        };

        Some((rid, value))
    }
}

/// Bytes one match occupies in the payload.
#[inline(always)]
pub fn entry_len(output_type: OutputType, width: SlotWidth) -> usize {
    let mut len = 0;
    if output_type.includes_rid() {
        len += 2;
    }
    if output_type.includes_value() {
        len += width.bytes();
    }
    len
}
