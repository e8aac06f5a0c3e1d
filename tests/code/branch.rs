//! BRANCH alternation blocks.

use pretty_assertions::assert_eq;
use srecode::code::{DecodeErrorKind, Instruction, Opcode, Operand};

use crate::support::{assert_round_trip, decode_err, decode_ok, op};

const A_OR_B: [u32; 12] = [
    op::BRANCH,
    5,
    op::LITERAL,
    97,
    op::JUMP,
    7,
    5,
    op::LITERAL,
    98,
    op::JUMP,
    2,
    0,
];

#[test]
fn two_alternatives() {
    let program = decode_ok(&A_OR_B);
    assert_eq!(
        program,
        vec![Instruction::branch(vec![
            vec![Instruction::literal('a')],
            vec![Instruction::literal('b')],
        ])]
    );

    let Operand::Branch(branch) = &program[0].operand else {
        panic!("expected BRANCH operand");
    };
    let skips: Vec<(u32, u32)> = branch
        .alternatives
        .iter()
        .map(|alt| (alt.skip, alt.jump_skip))
        .collect();
    assert_eq!(skips, vec![(5, 7), (5, 2)]);
}

#[test]
fn empty_alternative_is_accepted() {
    let words = [op::BRANCH, 5, op::LITERAL, 97, op::JUMP, 5, 3, op::JUMP, 2, 0];
    assert_eq!(
        decode_ok(&words),
        vec![Instruction::branch(vec![
            vec![Instruction::literal('a')],
            Vec::new()
        ])]
    );
}

#[test]
fn nested_alternation_round_trips() {
    assert_round_trip(&[
        Instruction::with_int(Opcode::Mark, 0),
        Instruction::branch(vec![
            vec![
                Instruction::literal('x'),
                Instruction::branch(vec![
                    vec![Instruction::literal('y')],
                    vec![Instruction::literal('z')],
                ]),
            ],
            vec![Instruction::bare(Opcode::Any)],
            vec![Instruction::literal('w')],
        ]),
        Instruction::with_int(Opcode::Mark, 1),
        Instruction::bare(Opcode::Success),
    ]);
}

#[test]
fn alternative_must_end_in_jump() {
    let err = decode_err(&[op::BRANCH, 5, op::LITERAL, 97, op::SUCCESS, 2, 0]);
    assert_eq!(err.kind, DecodeErrorKind::ExpectedJump);
    assert_eq!(err.position, 4);
}

#[test]
fn alternatives_must_share_a_target() {
    let mut words = A_OR_B;
    words[5] = 6;
    let err = decode_err(&words);
    assert_eq!(err.kind, DecodeErrorKind::InconsistentBranchTargets);
    assert_eq!(err.position, 12);
}

#[test]
fn branch_without_alternatives() {
    let err = decode_err(&[op::BRANCH, 0]);
    assert_eq!(err.kind, DecodeErrorKind::InconsistentBranchTargets);
}

#[test]
fn alternative_skip_one_short() {
    let mut words = A_OR_B;
    words[1] = 4;
    assert_eq!(decode_err(&words).kind, DecodeErrorKind::SkipMismatch);
}

#[test]
fn truncated_alternative_body() {
    let err = decode_err(&[op::BRANCH, 9, op::LITERAL, 97]);
    assert_eq!(err.kind, DecodeErrorKind::TruncatedBlock);
    assert_eq!(err.position, 4);
}

#[test]
fn missing_terminating_zero() {
    let err = decode_err(&A_OR_B[..11]);
    assert_eq!(err.kind, DecodeErrorKind::ExhaustedInput);
    assert_eq!(err.position, 11);
}
