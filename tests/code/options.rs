//! Decode options.

use srecode::code::{
    DecodeErrorKind, DecodeOptions, Decoder, Instruction, MAXREPEAT, Opcode, Until, encode,
};

use crate::support::{decode_err_with, decode_with_logging, op};

#[test]
fn defaults() {
    let options = DecodeOptions::default();
    assert_eq!(options.max_repeat, MAXREPEAT);
    assert_eq!(options.max_depth, 64);
    assert_eq!(options.group_count, None);
    assert!(options.validate_block_indices);
}

#[test]
fn group_references_are_unchecked_by_default() {
    let words = [op::MARK, 40, op::GROUPREF, 99, op::GROUPREF_IGNORE, 7];
    assert!(decode_with_logging(&words, DecodeOptions::default()).is_ok());
}

#[test]
fn mark_allows_two_slots_per_group() {
    let options = DecodeOptions::default().with_group_count(1);
    assert!(decode_with_logging(&[op::MARK, 0, op::MARK, 1], options).is_ok());

    let err = decode_err_with(&[op::MARK, 0, op::MARK, 2], options);
    assert_eq!(err.kind, DecodeErrorKind::InvalidGroup);
    assert_eq!(err.position, 3);
}

#[test]
fn backreferences_must_name_a_group() {
    let options = DecodeOptions::default().with_group_count(2);
    assert!(decode_with_logging(&[op::GROUPREF, 1, op::GROUPREF_IGNORE, 0], options).is_ok());
    for opcode in [op::GROUPREF, op::GROUPREF_IGNORE] {
        let err = decode_err_with(&[opcode, 2], options);
        assert_eq!(err.kind, DecodeErrorKind::InvalidGroup);
    }
    let err = decode_err_with(&[op::MARK, 0], DecodeOptions::default().with_group_count(0));
    assert_eq!(err.kind, DecodeErrorKind::InvalidGroup);
}

fn nested_lookaheads(levels: usize) -> Vec<Instruction> {
    let mut body = vec![Instruction::literal('a')];
    for _ in 0..levels {
        body = vec![Instruction::assert(Opcode::Assert, 0, body)];
    }
    body
}

#[test]
fn nesting_limit() {
    let words = encode(&nested_lookaheads(3));
    assert!(decode_with_logging(&words, DecodeOptions::default().with_max_depth(3)).is_ok());

    let err = decode_err_with(&words, DecodeOptions::default().with_max_depth(2));
    assert_eq!(err.kind, DecodeErrorKind::NestingTooDeep);
}

fn nested_repeats(levels: usize) -> Vec<Instruction> {
    let mut body = vec![Instruction::literal('a')];
    for _ in 0..levels {
        body = vec![Instruction::branch(vec![
            vec![Instruction::repeat(0, MAXREPEAT, body, Until::Max)],
            vec![Instruction::literal('b')],
        ])];
    }
    body
}

#[test]
fn default_depth_fits_a_test_thread() {
    let limit = DecodeOptions::default().max_depth;
    let words = encode(&nested_lookaheads(limit));
    assert!(decode_with_logging(&words, DecodeOptions::default()).is_ok());

    let words = encode(&nested_lookaheads(limit + 1));
    let err = decode_err_with(&words, DecodeOptions::default());
    assert_eq!(err.kind, DecodeErrorKind::NestingTooDeep);
}

#[test]
fn default_depth_fits_with_mixed_blocks() {
    // Each level here is a branch wrapping a repeat, two blocks deep.
    let limit = DecodeOptions::default().max_depth;
    let words = encode(&nested_repeats(limit / 2));
    assert!(decode_with_logging(&words, DecodeOptions::default()).is_ok());

    let words = encode(&nested_repeats(limit / 2 + 1));
    let err = decode_err_with(&words, DecodeOptions::default());
    assert_eq!(err.kind, DecodeErrorKind::NestingTooDeep);
}

#[test]
fn decoder_keeps_its_options() {
    let options = DecodeOptions::default().with_group_count(3).with_max_depth(8);
    let words = [op::MARK, 5];
    let decoder = Decoder::new(&words, options);
    assert_eq!(decoder.options(), &options);
    assert_eq!(decoder.options().group_count, Some(3));
}
