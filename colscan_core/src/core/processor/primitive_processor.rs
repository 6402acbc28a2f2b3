use std::sync::Arc;

use log::{debug, warn};

use crate::{
    configuration::Configuration,
    core::{
        block::ColumnBlock,
        db_type::{ColumnKind, SlotWidth},
        error::{Result, ScanError},
        events::{ScanEvent, ScanEventSink},
        filter::{
            compiler::{CompiledFilter, compile_with_threshold},
            encoder::ResultEncoder,
            kinds::{FloatKind, SignedKind, TextKind, UnsignedKind},
            scanner::scan_block,
        },
        protocol::{ColumnRequest, ColumnResultHeader},
        sentinel::Sentinels,
    },
};

/// Header written for one scan plus the total number of result bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    pub header: ColumnResultHeader,
    pub written: usize,
}

/// Entry point for column filter requests. Holds no per-scan state, so one
/// instance can serve any number of threads.
pub struct PrimitiveProcessor {
    configuration: Configuration,
    event_sink: Option<Arc<dyn ScanEventSink>>,
}

impl PrimitiveProcessor {
    pub fn new(configuration: Configuration) -> Self {
        Self {
            configuration,
            event_sink: None,
        }
    }

    pub fn with_event_sink(mut self, event_sink: Arc<dyn ScanEventSink>) -> Self {
        self.event_sink = Some(event_sink);
        self
    }

    pub fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    /// Parses a wire request and filters `block` with it, writing the result
    /// header and matches into `out`. A `prepared` filter replaces the
    /// request's own predicate elements.
    pub fn p_col(
        &self,
        request_bytes: &[u8],
        block: &[u8],
        out: &mut [u8],
        prepared: Option<Arc<CompiledFilter>>,
    ) -> Result<ScanSummary> {
        let request = ColumnRequest::parse(request_bytes).inspect_err(|e| warn!("Rejected column request: {}", e))?;
        self.filter_column(request, block, out, prepared)
    }

    pub fn filter_column(
        &self,
        mut request: ColumnRequest<'_>,
        block: &[u8],
        out: &mut [u8],
        prepared: Option<Arc<CompiledFilter>>,
    ) -> Result<ScanSummary> {
        self.mark(&request, ScanEvent::Begin);

        if self.configuration.sort_row_ids(request.sort_row_ids) && !request.row_ids.is_empty() {
            request.row_ids.sort_unstable();
            self.mark(&request, ScanEvent::Sorted);
        }

        let column_type = request.column_type;
        let width = request.width;

        if !column_type.supports_width(width) {
            return Err(ScanError::UnsupportedWidth(width.bytes() as u8));
        }

        let block_size = self.configuration.block_size();
        if block.len() > block_size {
            return Err(ScanError::BlockTooLarge {
                rows: block.len() / width.bytes(),
                len: block.len(),
                max_rows: block_size / width.bytes(),
                max_len: block_size,
            });
        }

        let block = ColumnBlock::new(block, width)?;

        let filter = match prepared {
            Some(filter) => {
                if filter.column_type() != column_type || filter.width() != width {
                    return Err(ScanError::FilterMismatch {
                        filter_type: filter.column_type(),
                        filter_width: filter.width().bytes(),
                        request_type: column_type,
                        request_width: width.bytes(),
                    });
                }
                Some(filter)
            }
            None => compile_with_threshold(
                request.predicate,
                column_type,
                width,
                request.element_count,
                request.combine,
                self.configuration.membership_array_threshold(),
            )?,
        };

        let kind = column_type.kind();
        let sentinels = Sentinels::resolve(&column_type, width, kind);
        let row_order = request.row_order();
        let track_min_max = row_order.is_none() && column_type.min_max_capable(width);

        let mut encoder = ResultEncoder::new(out, request.output_type, width)?;
        let range = dispatch(
            kind,
            width,
            &block,
            &sentinels,
            filter.as_deref(),
            row_order,
            track_min_max,
            &mut encoder,
        )?;
        let encoded = encoder.finish();

        let (min, max) = range.unwrap_or((0, 0));
        let header = ColumnResultHeader {
            lbid: request.lbid,
            session_id: request.session_id,
            output_type: request.output_type,
            rid_flags: encoded.rid_flags,
            match_count: encoded.match_count,
            valid_min_max: range.is_some(),
            cache_io: 0,
            physical_io: 0,
            min,
            max,
        };
        header.encode(out)?;

        debug!(
            "Scanned lbid {} ({}/{}B, {} rows): {} match(es), {} bytes",
            request.lbid,
            column_type,
            width,
            block.rows(),
            encoded.match_count,
            encoded.written
        );

        self.mark(&request, ScanEvent::Complete);

        Ok(ScanSummary {
            header,
            written: encoded.written,
        })
    }

    fn mark(&self, request: &ColumnRequest<'_>, event: ScanEvent) {
        if let Some(sink) = &self.event_sink {
            sink.mark_event(request.lbid, std::thread::current().id(), request.session_id, event);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn dispatch(
    kind: ColumnKind,
    width: SlotWidth,
    block: &ColumnBlock<'_>,
    sentinels: &Sentinels,
    filter: Option<&CompiledFilter>,
    row_order: Option<&[u16]>,
    track_min_max: bool,
    encoder: &mut ResultEncoder<'_>,
) -> Result<Option<(i64, i64)>> {
    match (kind, width) {
        (ColumnKind::Signed, SlotWidth::One) => scan_block::<u8, SignedKind>(block, sentinels, filter, row_order, track_min_max, encoder),
        (ColumnKind::Signed, SlotWidth::Two) => scan_block::<u16, SignedKind>(block, sentinels, filter, row_order, track_min_max, encoder),
        (ColumnKind::Signed, SlotWidth::Four) => scan_block::<u32, SignedKind>(block, sentinels, filter, row_order, track_min_max, encoder),
        (ColumnKind::Signed, SlotWidth::Eight) => scan_block::<u64, SignedKind>(block, sentinels, filter, row_order, track_min_max, encoder),
        (ColumnKind::Unsigned, SlotWidth::One) => scan_block::<u8, UnsignedKind>(block, sentinels, filter, row_order, track_min_max, encoder),
        (ColumnKind::Unsigned, SlotWidth::Two) => scan_block::<u16, UnsignedKind>(block, sentinels, filter, row_order, track_min_max, encoder),
        (ColumnKind::Unsigned, SlotWidth::Four) => scan_block::<u32, UnsignedKind>(block, sentinels, filter, row_order, track_min_max, encoder),
        (ColumnKind::Unsigned, SlotWidth::Eight) => scan_block::<u64, UnsignedKind>(block, sentinels, filter, row_order, track_min_max, encoder),
        (ColumnKind::Float, SlotWidth::Four) => scan_block::<u32, FloatKind>(block, sentinels, filter, row_order, track_min_max, encoder),
        (ColumnKind::Float, SlotWidth::Eight) => scan_block::<u64, FloatKind>(block, sentinels, filter, row_order, track_min_max, encoder),
        (ColumnKind::Float, SlotWidth::One | SlotWidth::Two) => Err(ScanError::UnsupportedWidth(width.bytes() as u8)),
        (ColumnKind::Text, SlotWidth::One) => scan_block::<u8, TextKind>(block, sentinels, filter, row_order, track_min_max, encoder),
        (ColumnKind::Text, SlotWidth::Two) => scan_block::<u16, TextKind>(block, sentinels, filter, row_order, track_min_max, encoder),
        (ColumnKind::Text, SlotWidth::Four) => scan_block::<u32, TextKind>(block, sentinels, filter, row_order, track_min_max, encoder),
        (ColumnKind::Text, SlotWidth::Eight) => scan_block::<u64, TextKind>(block, sentinels, filter, row_order, track_min_max, encoder),
    }
}
