//! INFO search-acceleration headers.

use pretty_assertions::assert_eq;
use srecode::code::{
    CharsetItem, DecodeErrorKind, InfoFlags, Instruction, MAXREPEAT, Opcode, Operand, Prefix,
};

use crate::support::{assert_round_trip, decode_err, decode_ok, op};

#[test]
fn bare_header() {
    let program = decode_ok(&[op::INFO, 4, 0, 1, 1, op::LITERAL, 97, op::SUCCESS]);
    assert_eq!(
        program,
        vec![
            Instruction::info(InfoFlags::empty(), 1, 1, None, None),
            Instruction::literal('a'),
            Instruction::bare(Opcode::Success),
        ]
    );
}

#[test]
fn literal_prefix() {
    let words = [
        op::INFO, 12, 3, 3, 3, // skip, PREFIX | LITERAL, min, max
        3, 3, // prefix length, prefix skip
        97, 98, 99, // prefix
        0, 0, 0, // overlap table
    ];
    let program = decode_ok(&words);
    let expected = Instruction::info(
        InfoFlags::PREFIX | InfoFlags::LITERAL,
        3,
        3,
        Some(Prefix {
            prefix_skip: 3,
            chars: vec!['a'.into(), 'b'.into(), 'c'.into()],
            overlap: vec![0, 0, 0],
        }),
        None,
    );
    assert_eq!(program, vec![expected]);

    let Operand::Info(info) = &program[0].operand else {
        panic!("expected INFO operand");
    };
    assert_eq!(info.skip, 12);
    assert!(info.charset.is_none());
}

#[test]
fn first_character_set() {
    assert_round_trip(&[
        Instruction::info(
            InfoFlags::CHARSET,
            1,
            MAXREPEAT,
            None,
            Some(vec![
                CharsetItem::Literal('x'.into()),
                CharsetItem::Literal('y'.into()),
            ]),
        ),
        Instruction::bare(Opcode::Success),
    ]);
}

#[test]
fn prefix_and_charset_are_exclusive() {
    let err = decode_err(&[op::INFO, 4, 5, 0, 0]);
    assert_eq!(err.kind, DecodeErrorKind::InvalidFlags);
    assert_eq!(err.position, 2);
}

#[test]
fn literal_requires_prefix() {
    assert_eq!(
        decode_err(&[op::INFO, 4, 2, 0, 0]).kind,
        DecodeErrorKind::InvalidFlags
    );
}

#[test]
fn unknown_flag_bits() {
    assert_eq!(
        decode_err(&[op::INFO, 4, 8, 0, 0]).kind,
        DecodeErrorKind::InvalidFlags
    );
}

#[test]
fn skip_must_cover_the_header_exactly() {
    let err = decode_err(&[op::INFO, 5, 0, 1, 1, op::ANY]);
    assert_eq!(err.kind, DecodeErrorKind::SkipMismatch);
    assert_eq!(err.position, 5);
}

#[test]
fn charset_without_failure() {
    let err = decode_err(&[op::INFO, 7, 4, 1, 1, op::LITERAL, 97, op::SUCCESS]);
    assert_eq!(err.kind, DecodeErrorKind::ExpectedTerminator);
    assert_eq!(err.position, 7);
}
