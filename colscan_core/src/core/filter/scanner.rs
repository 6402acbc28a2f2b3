use std::marker::PhantomData;

use crate::core::{
    block::{ColumnBlock, SlotValue},
    db_type::SlotWidth,
    error::Result,
    sentinel::Sentinels,
};

use super::{compiler::CompiledFilter, encoder::ResultEncoder, kinds::ValueKind};

/// Running block range over live values, ordered by kind `K`.
pub struct MinMaxTracker<K: ValueKind> {
    width: SlotWidth,
    min: Option<u64>,
    max: Option<u64>,
    _kind: PhantomData<K>,
}

impl<K: ValueKind> MinMaxTracker<K> {
    pub fn new(width: SlotWidth) -> Self {
        Self {
            width,
            min: None,
            max: None,
            _kind: PhantomData,
        }
    }

    #[inline(always)]
    pub fn update(&mut self, bits: u64) {
        match self.min {
            Some(min) if !K::less_than(bits, min, self.width) => {}
            _ => self.min = Some(bits),
        }

        match self.max {
            Some(max) if !K::less_than(max, bits, self.width) => {}
            _ => self.max = Some(bits),
        }
    }

    /// `(min, max)` in header form; the kind's empty range when nothing was seen.
    pub fn finish(&self) -> (i64, i64) {
        match (self.min, self.max) {
            (Some(min), Some(max)) => (K::widen(min, self.width), K::widen(max, self.width)),
            _ => K::empty_range(),
        }
    }
}

/// Applies `filter` to every visited slot of `block` and hands matches to
/// `encoder`. Returns the block range when `track_min_max` is set.
///
/// Without a row order, slots are visited in natural order; EMPTY slots are
/// emitted only for value-only output whose filter accepts the EMPTY pattern.
/// A supplied row order always skips EMPTY slots.
pub fn scan_block<T: SlotValue, K: ValueKind>(
    block: &ColumnBlock<'_>,
    sentinels: &Sentinels,
    filter: Option<&CompiledFilter>,
    row_order: Option<&[u16]>,
    track_min_max: bool,
    encoder: &mut ResultEncoder<'_>,
) -> Result<Option<(i64, i64)>> {
    debug_assert_eq!(T::WIDTH, block.width());

    if let Some(order) = row_order {
        block.check_row_order(order)?;
    }

    // EMPTY and NULL outcomes depend on the filter alone.
    let empty_matches = filter.is_none_or(|f| f.matches::<K>(sentinels.empty, false));
    let null_matches = filter.is_none_or(|f| f.matches::<K>(sentinels.null, true));
    let skip_empty = row_order.is_some() || encoder.output_type().includes_rid() || !empty_matches;

    let mut tracker = MinMaxTracker::<K>::new(block.width());

    let mut visit = |rid: u16| -> Result<()> {
        let bits = block.value::<T>(rid as usize).to_bits();

        if sentinels.is_empty(bits) {
            if !skip_empty {
                encoder.emit(rid, bits)?;
            }
            return Ok(());
        }

        if sentinels.is_null(bits) {
            if null_matches {
                encoder.emit(rid, bits)?;
            }
            return Ok(());
        }

        if track_min_max {
            tracker.update(bits);
        }

        if filter.is_none_or(|f| f.matches::<K>(bits, false)) {
            encoder.emit(rid, bits)?;
        }

        Ok(())
    };

    match row_order {
        Some(order) => {
            for rid in order {
                visit(*rid)?;
            }
        }
        None => {
            for rid in 0..block.rows() {
                visit(rid as u16)?;
            }
        }
    }

    Ok(track_min_max.then(|| tracker.finish()))
}
