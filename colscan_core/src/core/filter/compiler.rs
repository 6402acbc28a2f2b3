use std::{collections::HashSet, sync::Arc};

use ahash::RandomState;
use log::debug;
use smallvec::SmallVec;

use crate::{
    DEFAULT_MEMBERSHIP_ARRAY_THRESHOLD,
    core::{
        block::read_slot_bits,
        db_type::{ColumnKind, ColumnType, SlotWidth},
        error::{Result, ScanError},
        sentinel::Sentinels,
    },
};

use super::{
    kinds::{self, FloatKind, SignedKind, TextKind, UnsignedKind, ValueKind},
    like::LikePattern,
    logical::compare_with_null,
    operation::{CombineOp, CompareOp},
};

/// How a compiled filter folds its elements for one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    SingleComparison,
    AnyTrue,
    AllTrue,
    XorAll,
    /// `x = a OR x = b ...` over a short literal array.
    OneOfArray,
    /// `x <> a AND x <> b ...` over a short literal array.
    NoneOfArray,
    OneOfSet,
    NoneOfSet
}

impl FilterMode {
    pub fn is_membership(&self) -> bool {
        matches!(
            self,
            FilterMode::OneOfArray | FilterMode::NoneOfArray | FilterMode::OneOfSet | FilterMode::NoneOfSet
        )
    }
}

/// Predicate compiled for repeated evaluation against blocks of one
/// (type, width). Immutable once built and shared through `Arc`.
#[derive(Debug)]
pub struct CompiledFilter {
    mode: FilterMode,
    column_type: ColumnType,
    width: SlotWidth,
    sentinels: Sentinels,
    operations: SmallVec<[CompareOp; 8]>,
    tie_breaks: SmallVec<[u8; 8]>,
    values: SmallVec<[u64; 8]>,
    value_is_null: SmallVec<[bool; 8]>,
    patterns: Vec<Option<LikePattern>>,
    members: SmallVec<[u64; 8]>,
    member_set: Option<HashSet<u64, RandomState>>,
    null_is_member: bool,
    null_outcome: bool
}

/// Compiles `element_count` packed `{op, tie-break, value}` elements.
/// `Ok(None)` means there is nothing to filter: every slot matches.
pub fn compile(
    raw: &[u8],
    column_type: ColumnType,
    width: SlotWidth,
    element_count: usize,
    combine: CombineOp,
) -> Result<Option<Arc<CompiledFilter>>> {
    compile_with_threshold(raw, column_type, width, element_count, combine, DEFAULT_MEMBERSHIP_ARRAY_THRESHOLD)
}

/// Same as [`compile`] with an explicit limit on how many literals a
/// membership filter keeps as a plain array before switching to a hash set.
pub fn compile_with_threshold(
    raw: &[u8],
    column_type: ColumnType,
    width: SlotWidth,
    element_count: usize,
    combine: CombineOp,
    array_threshold: usize,
) -> Result<Option<Arc<CompiledFilter>>> {
    if element_count == 0 {
        return Ok(None);
    }

    if !column_type.supports_width(width) {
        return Err(ScanError::UnsupportedWidth(width.bytes() as u8));
    }

    let element_len = 2 + width.bytes();
    let needed = element_count * element_len;
    if raw.len() < needed {
        return Err(ScanError::MalformedPredicate(format!(
            "{} elements of {} bytes need {} bytes, got {}",
            element_count,
            element_len,
            needed,
            raw.len()
        )));
    }

    let kind = column_type.kind();
    let sentinels = Sentinels::resolve(&column_type, width, kind);

    let mut operations = SmallVec::<[CompareOp; 8]>::with_capacity(element_count);
    let mut tie_breaks = SmallVec::<[u8; 8]>::with_capacity(element_count);
    let mut values = SmallVec::<[u64; 8]>::with_capacity(element_count);
    let mut value_is_null = SmallVec::<[bool; 8]>::with_capacity(element_count);
    let mut patterns = Vec::with_capacity(element_count);

    for element in raw[..needed].chunks_exact(element_len) {
        let operation = CompareOp::from_byte(element[0])?;
        let value = read_slot_bits(&element[2..], width);

        let pattern = if operation.is_like() {
            if kind != ColumnKind::Text {
                return Err(ScanError::LikeOnNonText(column_type));
            }
            Some(LikePattern::from_slot(value, width)?)
        } else {
            None
        };

        operations.push(operation);
        tie_breaks.push(element[1]);
        values.push(value);
        value_is_null.push(sentinels.is_null(value));
        patterns.push(pattern);
    }

    let initial_mode = if element_count == 1 {
        FilterMode::SingleComparison
    } else {
        match combine {
            CombineOp::Or => FilterMode::AnyTrue,
            CombineOp::And => FilterMode::AllTrue,
            CombineOp::Xor => FilterMode::XorAll,
            CombineOp::None => return Err(ScanError::InvalidCombination(element_count)),
        }
    };

    let mut filter = CompiledFilter {
        mode: initial_mode,
        column_type,
        width,
        sentinels,
        operations,
        tie_breaks,
        values,
        value_is_null,
        patterns,
        members: SmallVec::new(),
        member_set: None,
        null_is_member: false,
        null_outcome: false
    };

    // Outcome for NULL slots is fixed by the elements alone; membership
    // modes reuse it instead of consulting the literal set.
    filter.null_outcome = filter.evaluate(sentinels.null, true);

    if let Some(mode) = membership_mode(&filter, combine, array_threshold) {
        filter.reclassify(mode);
    }

    debug!(
        "Compiled {} filter element(s) for {}/{}B as {:?} ({} member(s))",
        element_count,
        column_type,
        width,
        filter.mode,
        filter.member_count()
    );

    Ok(Some(Arc::new(filter)))
}

fn membership_mode(filter: &CompiledFilter, combine: CombineOp, array_threshold: usize) -> Option<FilterMode> {
    if filter.operations.len() < 2 {
        return None;
    }

    let all = |operation: CompareOp| filter.operations.iter().all(|op| *op == operation);
    let small = filter.operations.len() <= array_threshold;

    match combine {
        CombineOp::Or if all(CompareOp::Equals) => Some(if small { FilterMode::OneOfArray } else { FilterMode::OneOfSet }),
        CombineOp::And if all(CompareOp::NotEquals) => Some(if small { FilterMode::NoneOfArray } else { FilterMode::NoneOfSet }),
        _ => None,
    }
}

impl CompiledFilter {
    fn reclassify(&mut self, mode: FilterMode) {
        let kind = self.sentinels.kind;

        for i in 0..self.operations.len() {
            // A tie-break turns `=` into never and `<>` into always, so those
            // elements never decide membership. Float comparisons ignore it.
            if self.tie_breaks[i] != 0 && kind != ColumnKind::Float {
                continue;
            }

            if self.value_is_null[i] {
                self.null_is_member = true;
                continue;
            }

            if let Some(key) = kinds::membership_key(kind, self.values[i], self.width) {
                if !self.members.contains(&key) {
                    self.members.push(key);
                }
            }
        }

        if matches!(mode, FilterMode::OneOfSet | FilterMode::NoneOfSet) {
            let mut set = HashSet::with_capacity_and_hasher(self.members.len(), RandomState::new());
            set.extend(self.members.iter().copied());
            self.member_set = Some(set);
        }

        self.mode = mode;
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }

    pub fn column_type(&self) -> ColumnType {
        self.column_type
    }

    pub fn width(&self) -> SlotWidth {
        self.width
    }

    pub fn kind(&self) -> ColumnKind {
        self.sentinels.kind
    }

    pub fn sentinels(&self) -> &Sentinels {
        &self.sentinels
    }

    pub fn element_count(&self) -> usize {
        self.operations.len()
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    /// Whether a NULL operand took part in a membership filter.
    pub fn null_is_member(&self) -> bool {
        self.null_is_member
    }

    /// Evaluates the filter for one value of kind `K`. `is_null` must come from
    /// the sentinel resolver of the same (type, width).
    #[inline(always)]
    pub fn matches<K: ValueKind>(&self, bits: u64, is_null: bool) -> bool {
        match self.mode {
            FilterMode::SingleComparison => self.element_matches::<K>(0, bits, is_null),
            FilterMode::AnyTrue => (0..self.operations.len()).any(|i| self.element_matches::<K>(i, bits, is_null)),
            FilterMode::AllTrue => (0..self.operations.len()).all(|i| self.element_matches::<K>(i, bits, is_null)),
            FilterMode::XorAll => {
                (0..self.operations.len()).fold(false, |acc, i| acc ^ self.element_matches::<K>(i, bits, is_null))
            }
            FilterMode::OneOfArray | FilterMode::OneOfSet => {
                if is_null {
                    self.null_outcome
                } else {
                    K::membership_key(bits, self.width).is_some_and(|key| self.contains(key))
                }
            }
            FilterMode::NoneOfArray | FilterMode::NoneOfSet => {
                if is_null {
                    self.null_outcome
                } else {
                    K::membership_key(bits, self.width).is_none_or(|key| !self.contains(key))
                }
            }
        }
    }

    /// Evaluation when the kind is only known at run time.
    pub fn evaluate(&self, bits: u64, is_null: bool) -> bool {
        match self.sentinels.kind {
            ColumnKind::Signed => self.matches::<SignedKind>(bits, is_null),
            ColumnKind::Unsigned => self.matches::<UnsignedKind>(bits, is_null),
            ColumnKind::Float => self.matches::<FloatKind>(bits, is_null),
            ColumnKind::Text => self.matches::<TextKind>(bits, is_null),
        }
    }

    #[inline(always)]
    fn contains(&self, key: u64) -> bool {
        match &self.member_set {
            Some(set) => set.contains(&key),
            None => self.members.contains(&key),
        }
    }

    #[inline(always)]
    fn element_matches<K: ValueKind>(&self, index: usize, bits: u64, is_null: bool) -> bool {
        let operation = self.operations[index];
        let operand = self.values[index];
        let operand_is_null = self.value_is_null[index];

        if operation.is_like() {
            if is_null || operand_is_null {
                return false;
            }

            let pattern = match &self.patterns[index] {
                Some(pattern) => pattern,
                None => panic!("LIKE element {} was compiled without its pattern", index),
            };

            let matched = pattern.matches_slot(bits, self.width);
            return if operation == CompareOp::Like { matched } else { !matched };
        }

        if is_null || operand_is_null {
            return compare_with_null(bits, is_null, operand, operand_is_null, operation, self.tie_breaks[index]);
        }

        K::compare(bits, operand, self.width, operation, self.tie_breaks[index])
    }
}
