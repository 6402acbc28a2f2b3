use std::sync::Arc;

use rand::{Rng, SeedableRng, rngs::StdRng};

use colscan_core::{
    configuration::Configuration,
    core::{
        db_type::{ColumnType, SlotWidth},
        filter::{
            compiler::{CompiledFilter, FilterMode, compile},
            logical::{TIE_BREAK_HIGH, TIE_BREAK_LOW},
            operation::{COMPARE_EQ, COMPARE_NE, CombineOp, CompareOp, OutputType},
        },
        processor::primitive_processor::PrimitiveProcessor,
        protocol::{ColumnRequestBuilder, ResultReader},
        sentinel::{DOUBLE_EMPTY, DOUBLE_NULL, INT_EMPTY, INT_NULL, Sentinels},
    },
};

const ROUNDS: usize = 200;

/// Draws slot or literal bits from a small domain so that duplicates,
/// sentinels and kind-specific equalities (trimmed text, signed zero) occur often.
fn random_bits(rng: &mut StdRng, column_type: ColumnType) -> u64 {
    match column_type {
        ColumnType::INT => match rng.random_range(0..10) {
            0 => INT_NULL,
            1 => INT_EMPTY,
            _ => rng.random_range(-6i32..6) as u32 as u64,
        },
        ColumnType::UTINYINT => rng.random_range(240u64..256),
        ColumnType::CHAR => {
            const ALPHABET: [u8; 4] = [b'a', b'b', b' ', 0];
            let lo = ALPHABET[rng.random_range(0..ALPHABET.len())];
            let hi = ALPHABET[rng.random_range(0..ALPHABET.len())];
            match rng.random_range(0..12) {
                0 => 0xFEFF,
                1 => 0xFFFF,
                _ => u16::from_le_bytes([lo, hi]) as u64,
            }
        }
        ColumnType::DOUBLE => {
            const POOL: [f64; 5] = [0.0, -0.0, 1.5, -2.0, f64::NAN];
            match rng.random_range(0..12) {
                0 => DOUBLE_NULL,
                1 => DOUBLE_EMPTY,
                _ => POOL[rng.random_range(0..POOL.len())].to_bits(),
            }
        }
        other => panic!("no generator for {}", other),
    }
}

fn width_of(column_type: ColumnType) -> SlotWidth {
    match column_type {
        ColumnType::INT => SlotWidth::Four,
        ColumnType::UTINYINT => SlotWidth::One,
        ColumnType::CHAR => SlotWidth::Two,
        _ => SlotWidth::Eight,
    }
}

fn encode_element(raw: &mut Vec<u8>, op: u8, tie_break: u8, bits: u64, width: SlotWidth) {
    raw.push(op);
    raw.push(tie_break);
    raw.extend_from_slice(&bits.to_le_bytes()[..width.bytes()]);
}

struct Case {
    membership: Arc<CompiledFilter>,
    singles: Vec<Arc<CompiledFilter>>,
    combine: CombineOp,
    literals: Vec<(u8, u8, u64)>,
}

fn random_case(rng: &mut StdRng, column_type: ColumnType, one_of: bool) -> Case {
    let width = width_of(column_type);
    let (op, combine) = if one_of { (COMPARE_EQ, CombineOp::Or) } else { (COMPARE_NE, CombineOp::And) };
    let count = rng.random_range(2..20);

    let mut raw = Vec::new();
    let mut singles = Vec::new();
    let mut literals = Vec::new();

    for _ in 0..count {
        let tie_break = match rng.random_range(0..8) {
            0 => TIE_BREAK_LOW,
            1 => TIE_BREAK_HIGH,
            _ => 0,
        };
        let bits = random_bits(rng, column_type);
        encode_element(&mut raw, op, tie_break, bits, width);
        literals.push((op, tie_break, bits));

        let mut single = Vec::new();
        encode_element(&mut single, op, tie_break, bits, width);
        singles.push(compile(&single, column_type, width, 1, CombineOp::None).unwrap().unwrap());
    }

    let membership = compile(&raw, column_type, width, count, combine).unwrap().unwrap();

    Case {
        membership,
        singles,
        combine,
        literals,
    }
}

/// The literal OR/AND fold over one-element filters.
fn reference_matches(case: &Case, bits: u64, is_null: bool) -> bool {
    match case.combine {
        CombineOp::Or => case.singles.iter().any(|f| f.evaluate(bits, is_null)),
        _ => case.singles.iter().all(|f| f.evaluate(bits, is_null)),
    }
}

#[test]
fn membership_agrees_with_generic_evaluation() {
    let mut rng = StdRng::seed_from_u64(0x5EED_C0DE);

    for column_type in [ColumnType::INT, ColumnType::UTINYINT, ColumnType::CHAR, ColumnType::DOUBLE] {
        let width = width_of(column_type);
        let sentinels = Sentinels::resolve(&column_type, width, column_type.kind());

        for round in 0..ROUNDS {
            let case = random_case(&mut rng, column_type, round % 2 == 0);
            assert!(case.membership.mode().is_membership(), "{:?}", case.membership.mode());

            for _ in 0..64 {
                let bits = random_bits(&mut rng, column_type);
                let is_null = sentinels.is_null(bits);
                assert_eq!(
                    case.membership.evaluate(bits, is_null),
                    reference_matches(&case, bits, is_null),
                    "{} {:?} literals={:x?} value={:#x}",
                    column_type,
                    case.membership.mode(),
                    case.literals,
                    bits
                );
            }
        }
    }
}

#[test]
fn array_and_set_modes_are_both_exercised() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut seen = Vec::new();

    for round in 0..ROUNDS {
        let case = random_case(&mut rng, ColumnType::INT, round % 2 == 0);
        let mode = case.membership.mode();
        if !seen.contains(&mode) {
            seen.push(mode);
        }
    }

    for mode in [FilterMode::OneOfArray, FilterMode::NoneOfArray, FilterMode::OneOfSet, FilterMode::NoneOfSet] {
        assert!(seen.contains(&mode), "{:?} never chosen", mode);
    }
}

#[test]
fn block_scans_agree_with_reference() {
    let mut rng = StdRng::seed_from_u64(0xB10C);
    let processor = PrimitiveProcessor::new(Configuration::default());

    for column_type in [ColumnType::INT, ColumnType::UTINYINT, ColumnType::CHAR, ColumnType::DOUBLE] {
        let width = width_of(column_type);
        let sentinels = Sentinels::resolve(&column_type, width, column_type.kind());

        for round in 0..ROUNDS / 4 {
            let case = random_case(&mut rng, column_type, round % 2 == 1);
            let rows = rng.random_range(1..200);
            let slots: Vec<u64> = (0..rows).map(|_| random_bits(&mut rng, column_type)).collect();
            let block: Vec<u8> = slots.iter().flat_map(|b| b.to_le_bytes()[..width.bytes()].to_vec()).collect();

            let mut builder = ColumnRequestBuilder::new(column_type, width)
                .combine(case.combine)
                .output_type(OutputType::RID_ONLY);
            for (op, tie_break, bits) in &case.literals {
                builder = builder.element(CompareOp::from_byte(*op).unwrap(), *tie_break, *bits);
            }
            let request = builder.build().unwrap();

            let mut out = vec![0u8; 4096];
            let summary = processor.p_col(&request, &block, &mut out, None).unwrap();

            let scanned: Vec<u16> = ResultReader::new(&out[..summary.written], width)
                .unwrap()
                .filter_map(|(rid, _)| rid)
                .collect();

            let expected: Vec<u16> = slots
                .iter()
                .enumerate()
                .filter(|(_, bits)| !sentinels.is_empty(**bits))
                .filter(|(_, bits)| reference_matches(&case, **bits, sentinels.is_null(**bits)))
                .map(|(rid, _)| rid as u16)
                .collect();

            assert_eq!(scanned, expected, "{} literals={:x?}", column_type, case.literals);
        }
    }
}
