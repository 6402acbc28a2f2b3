use std::sync::{Arc, Mutex};
use std::thread::ThreadId;

use colscan_core::{
    configuration::Configuration,
    core::{
        db_type::{ColumnType, SlotWidth},
        error::ScanError,
        events::{ScanEvent, ScanEventSink},
        filter::{
            compiler::{FilterMode, compile},
            operation::{CombineOp, CompareOp, OutputType},
        },
        processor::primitive_processor::PrimitiveProcessor,
        protocol::{ColumnRequestBuilder, REQUEST_HEADER_LEN, RESULT_HEADER_LEN, ResultReader},
        sentinel::{CHAR4_NULL, INT_EMPTY, INT_NULL},
    },
};

#[derive(Default)]
struct RecordingSink {
    events: Mutex<Vec<(u64, u32, ScanEvent)>>,
}

impl ScanEventSink for RecordingSink {
    fn mark_event(&self, lbid: u64, _thread: ThreadId, session_id: u32, event: ScanEvent) {
        self.events.lock().unwrap().push((lbid, session_id, event));
    }
}

fn int_bits(value: i32) -> u64 {
    value as u32 as u64
}

fn int_block(values: &[u64]) -> Vec<u8> {
    values.iter().flat_map(|v| (*v as u32).to_le_bytes()).collect()
}

fn mixed_block() -> Vec<u8> {
    int_block(&[
        int_bits(5),
        INT_EMPTY,
        int_bits(-3),
        INT_NULL,
        int_bits(5),
        int_bits(100),
        INT_EMPTY,
        int_bits(0),
    ])
}

fn entries(out: &[u8], width: SlotWidth) -> Vec<(Option<u16>, Option<Vec<u8>>)> {
    ResultReader::new(out, width)
        .unwrap()
        .map(|(rid, value)| (rid, value.map(|v| v.to_vec())))
        .collect()
}

#[test]
fn range_and_inequality_skip_sentinels() {
    let request = ColumnRequestBuilder::new(ColumnType::INT, SlotWidth::Four)
        .lbid(1)
        .combine(CombineOp::And)
        .element(CompareOp::GreaterOrEquals, 0, 0)
        .element(CompareOp::NotEquals, 0, 5)
        .output_type(OutputType::RID_AND_VALUE)
        .build()
        .unwrap();

    let mut out = vec![0u8; 512];
    let summary = PrimitiveProcessor::new(Configuration::default())
        .p_col(&request, &mixed_block(), &mut out, None)
        .unwrap();

    assert_eq!(summary.header.match_count, 2);
    assert_eq!(summary.header.rid_flags, 0b1);
    assert_eq!(
        entries(&out, SlotWidth::Four),
        vec![
            (Some(5), Some(100i32.to_le_bytes().to_vec())),
            (Some(7), Some(0i32.to_le_bytes().to_vec())),
        ]
    );

    // The block range covers every live value, not only the matches.
    assert!(summary.header.valid_min_max);
    assert_eq!((summary.header.min, summary.header.max), (-3, 100));
}

#[test]
fn xor_cancels_when_both_elements_hold() {
    let request = ColumnRequestBuilder::new(ColumnType::INT, SlotWidth::Four)
        .combine(CombineOp::Xor)
        .element(CompareOp::Equals, 0, 5)
        .element(CompareOp::Greater, 0, 0)
        .output_type(OutputType::RID_AND_VALUE)
        .build()
        .unwrap();

    let mut out = vec![0u8; 512];
    let summary = PrimitiveProcessor::new(Configuration::default())
        .p_col(&request, &mixed_block(), &mut out, None)
        .unwrap();

    assert_eq!(summary.header.match_count, 1);
    assert_eq!(
        entries(&out, SlotWidth::Four),
        vec![(Some(5), Some(100i32.to_le_bytes().to_vec()))]
    );
}

#[test]
fn like_contains_on_text_slots() {
    let request = ColumnRequestBuilder::new(ColumnType::VARCHAR, SlotWidth::Four)
        .text_element(CompareOp::Like, 0, b"%ab%")
        .output_type(OutputType::RID_ONLY)
        .build()
        .unwrap();
    let block: Vec<u8> = [b"xaby", b"abcd", b"zzzz"].iter().flat_map(|s| s.iter().copied()).collect();

    let mut out = vec![0u8; 256];
    PrimitiveProcessor::new(Configuration::default())
        .p_col(&request, &block, &mut out, None)
        .unwrap();

    assert_eq!(entries(&out, SlotWidth::Four), vec![(Some(0), None), (Some(1), None)]);
}

#[test]
fn text_equality_trims_padding_and_skips_null() {
    let request = ColumnRequestBuilder::new(ColumnType::CHAR, SlotWidth::Four)
        .text_element(CompareOp::Equals, 0, b"ab")
        .output_type(OutputType::RID_ONLY)
        .build()
        .unwrap();
    let mut block = Vec::new();
    block.extend_from_slice(b"ab  ");
    block.extend_from_slice(&(CHAR4_NULL as u32).to_le_bytes());
    block.extend_from_slice(b"abc\0");
    block.extend_from_slice(b" ab\0");

    let mut out = vec![0u8; 256];
    let summary = PrimitiveProcessor::new(Configuration::default())
        .p_col(&request, &block, &mut out, None)
        .unwrap();

    assert_eq!(entries(&out, SlotWidth::Four), vec![(Some(0), None), (Some(3), None)]);
    assert!(summary.header.valid_min_max);
}

#[test]
fn equality_never_matches_sentinels() {
    for target in [int_bits(5), INT_NULL, INT_EMPTY] {
        let filter = compile(
            &[&[0x02u8, 0][..], &(target as u32).to_le_bytes()[..]].concat(),
            ColumnType::INT,
            SlotWidth::Four,
            1,
            CombineOp::None,
        )
        .unwrap()
        .unwrap();

        let request = ColumnRequestBuilder::new(ColumnType::INT, SlotWidth::Four)
            .output_type(OutputType::RID_ONLY)
            .build()
            .unwrap();
        let mut out = vec![0u8; 256];
        PrimitiveProcessor::new(Configuration::default())
            .p_col(&request, &mixed_block(), &mut out, Some(filter))
            .unwrap();

        let rids: Vec<_> = entries(&out, SlotWidth::Four).into_iter().map(|(rid, _)| rid).collect();
        match target {
            t if t == int_bits(5) => assert_eq!(rids, vec![Some(0), Some(4)]),
            // `= NULL` selects NULL slots only; EMPTY slots are never row-id output.
            t if t == INT_NULL => assert_eq!(rids, vec![Some(3)]),
            _ => assert!(rids.is_empty()),
        }
    }
}

#[test]
fn absent_filter_matches_every_value() {
    let request = ColumnRequestBuilder::new(ColumnType::INT, SlotWidth::Four)
        .output_type(OutputType::VALUE_ONLY)
        .build()
        .unwrap();

    let mut out = vec![0u8; 256];
    let summary = PrimitiveProcessor::new(Configuration::default())
        .p_col(&request, &mixed_block(), &mut out, None)
        .unwrap();

    assert_eq!(summary.header.match_count, 8);
    assert_eq!(summary.written, RESULT_HEADER_LEN + 8 * 4);
    assert_eq!(&out[RESULT_HEADER_LEN..summary.written], &mixed_block()[..]);
}

#[test]
fn one_byte_short_output_is_rejected() {
    let request = ColumnRequestBuilder::new(ColumnType::INT, SlotWidth::Four)
        .combine(CombineOp::And)
        .element(CompareOp::GreaterOrEquals, 0, 0)
        .element(CompareOp::NotEquals, 0, 5)
        .build()
        .unwrap();

    let needed = RESULT_HEADER_LEN + 2 * 6;
    let mut backing = vec![0xCCu8; needed + 16];
    let (out, tail) = backing.split_at_mut(needed - 1);

    let result = PrimitiveProcessor::new(Configuration::default()).p_col(&request, &mixed_block(), out, None);
    assert!(matches!(
        result,
        Err(ScanError::BufferTooSmall { needed: n, capacity: c }) if n == needed && c == needed - 1
    ));
    assert!(tail.iter().all(|b| *b == 0xCC));

    let mut exact = vec![0u8; needed];
    let summary = PrimitiveProcessor::new(Configuration::default())
        .p_col(&request, &mixed_block(), &mut exact, None)
        .unwrap();
    assert_eq!(summary.written, needed);
}

#[test]
fn min_max_is_not_published_for_wide_text() {
    let request = ColumnRequestBuilder::new(ColumnType::VARCHAR, SlotWidth::Eight)
        .output_type(OutputType::RID_ONLY)
        .build()
        .unwrap();
    let block: Vec<u8> = [b"abcdefgh", b"zz\0\0\0\0\0\0"].iter().flat_map(|s| s.iter().copied()).collect();

    let mut out = vec![0u8; 256];
    let summary = PrimitiveProcessor::new(Configuration::default())
        .p_col(&request, &block, &mut out, None)
        .unwrap();
    assert!(!summary.header.valid_min_max);
    assert_eq!(summary.header.match_count, 2);
}

#[test]
fn min_max_bounds_every_live_value() {
    let values: Vec<i16> = vec![-700, 12, 31000, -32766, 0, 5];
    let mut block: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    block.extend_from_slice(&0x8000u16.to_le_bytes());
    block.extend_from_slice(&0x8001u16.to_le_bytes());

    let request = ColumnRequestBuilder::new(ColumnType::SMALLINT, SlotWidth::Two)
        .element(CompareOp::Greater, 0, 20000)
        .build()
        .unwrap();

    let mut out = vec![0u8; 256];
    let summary = PrimitiveProcessor::new(Configuration::default())
        .p_col(&request, &block, &mut out, None)
        .unwrap();

    let header = summary.header;
    assert!(header.valid_min_max);
    assert_eq!((header.min, header.max), (-32766, 31000));
    assert!(values.iter().all(|v| header.min <= *v as i64 && (*v as i64) <= header.max));
    assert_eq!(header.match_count, 1);
}

#[test]
fn unsigned_and_float_columns() {
    let request = ColumnRequestBuilder::new(ColumnType::UINT, SlotWidth::Four)
        .element(CompareOp::Greater, 0, 0x7FFF_FFFF)
        .output_type(OutputType::RID_ONLY)
        .build()
        .unwrap();
    let block = int_block(&[1, 0x8000_0000, 0xFFFF_FFFE, 0xFFFF_FFFD]);

    let mut out = vec![0u8; 256];
    PrimitiveProcessor::new(Configuration::default())
        .p_col(&request, &block, &mut out, None)
        .unwrap();
    // 0xFFFF_FFFE is the unsigned NULL.
    assert_eq!(entries(&out, SlotWidth::Four), vec![(Some(1), None), (Some(3), None)]);

    let request = ColumnRequestBuilder::new(ColumnType::DOUBLE, SlotWidth::Eight)
        .element(CompareOp::Less, 0, 0.5f64.to_bits())
        .output_type(OutputType::RID_ONLY)
        .build()
        .unwrap();
    let block: Vec<u8> = [-1.25f64, 0.75, 0.25, f64::NAN].iter().flat_map(|v| v.to_le_bytes()).collect();

    let mut out = vec![0u8; 256];
    let summary = PrimitiveProcessor::new(Configuration::default())
        .p_col(&request, &block, &mut out, None)
        .unwrap();
    assert_eq!(entries(&out, SlotWidth::Eight), vec![(Some(0), None), (Some(2), None)]);
    assert!(!summary.header.valid_min_max);
}

#[test]
fn membership_request_on_wire() {
    let mut builder = ColumnRequestBuilder::new(ColumnType::BIGINT, SlotWidth::Eight)
        .combine(CombineOp::Or)
        .output_type(OutputType::RID_ONLY);
    for v in (0..20u64).map(|v| v * 3) {
        builder = builder.element(CompareOp::Equals, 0, v);
    }
    let request = builder.build().unwrap();
    let block: Vec<u8> = (0..30u64).flat_map(|v| v.to_le_bytes()).collect();

    let mut out = vec![0u8; 512];
    let summary = PrimitiveProcessor::new(Configuration::default())
        .p_col(&request, &block, &mut out, None)
        .unwrap();

    let rids: Vec<_> = entries(&out, SlotWidth::Eight).into_iter().filter_map(|(rid, _)| rid).collect();
    assert_eq!(rids, (0..30u16).filter(|r| r % 3 == 0).collect::<Vec<_>>());
    assert_eq!(summary.header.match_count, 10);
}

#[test]
fn prepared_filter_is_shared_across_threads() {
    let filter = compile(&[0x04, 0, 10], ColumnType::TINYINT, SlotWidth::One, 1, CombineOp::None)
        .unwrap()
        .unwrap();
    assert_eq!(filter.mode(), FilterMode::SingleComparison);

    let processor = Arc::new(PrimitiveProcessor::new(Configuration::default()));
    let request = ColumnRequestBuilder::new(ColumnType::TINYINT, SlotWidth::One)
        .output_type(OutputType::RID_ONLY)
        .build()
        .unwrap();

    let handles: Vec<_> = (0..4u8)
        .map(|t| {
            let filter = Arc::clone(&filter);
            let processor = Arc::clone(&processor);
            let request = request.clone();
            std::thread::spawn(move || {
                let block: Vec<u8> = (0..64u8).map(|v| v.wrapping_add(t)).collect();
                let mut out = vec![0u8; 512];
                processor.p_col(&request, &block, &mut out, Some(filter)).unwrap().header.match_count
            })
        })
        .collect();

    for (t, handle) in handles.into_iter().enumerate() {
        let expected = (0..64u8).map(|v| v.wrapping_add(t as u8) as i8).filter(|v| *v > 10).count();
        assert_eq!(handle.join().unwrap() as usize, expected);
    }
}

#[test]
fn lifecycle_events_are_reported() {
    let sink = Arc::new(RecordingSink::default());
    let processor = PrimitiveProcessor::new(Configuration::default()).with_event_sink(sink.clone());

    let request = ColumnRequestBuilder::new(ColumnType::INT, SlotWidth::Four)
        .lbid(11)
        .session_id(3)
        .row_ids(&[1, 0])
        .sort_row_ids(true)
        .build()
        .unwrap();
    let mut out = vec![0u8; 256];
    processor.p_col(&request, &mixed_block(), &mut out, None).unwrap();

    let unsorted = ColumnRequestBuilder::new(ColumnType::INT, SlotWidth::Four).lbid(12).build().unwrap();
    processor.p_col(&unsorted, &mixed_block(), &mut out, None).unwrap();

    let events = sink.events.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            (11, 3, ScanEvent::Begin),
            (11, 3, ScanEvent::Sorted),
            (11, 3, ScanEvent::Complete),
            (12, 0, ScanEvent::Begin),
            (12, 0, ScanEvent::Complete),
        ]
    );
}

#[test]
fn malformed_requests_are_errors() {
    let processor = PrimitiveProcessor::new(Configuration::default());
    let mut out = vec![0u8; 256];

    let mut request = ColumnRequestBuilder::new(ColumnType::INT, SlotWidth::Four)
        .element(CompareOp::Equals, 0, 1)
        .build()
        .unwrap();
    request[REQUEST_HEADER_LEN] = 0x07;
    assert!(matches!(
        processor.p_col(&request, &mixed_block(), &mut out, None),
        Err(ScanError::UnknownOperator(0x07))
    ));

    let request = ColumnRequestBuilder::new(ColumnType::INT, SlotWidth::Four)
        .element(CompareOp::Equals, 0, 1)
        .element(CompareOp::Equals, 0, 2)
        .build()
        .unwrap();
    assert!(matches!(
        processor.p_col(&request, &mixed_block(), &mut out, None),
        Err(ScanError::InvalidCombination(2))
    ));

    let request = ColumnRequestBuilder::new(ColumnType::INT, SlotWidth::Four)
        .row_ids(&[9])
        .build()
        .unwrap();
    assert!(matches!(
        processor.p_col(&request, &mixed_block(), &mut out, None),
        Err(ScanError::RowIdOutOfRange { rid: 9, rows: 8 })
    ));
}
