//! Error payloads and their rendering.

use std::error::Error;

use srecode::code::{DecodeError, DecodeErrorKind};

use crate::support::{decode_err, op};

#[test]
fn display_includes_the_position() {
    let err = decode_err(&[op::ANY, 99]);
    assert_eq!(err.kind, DecodeErrorKind::UnknownOpcode);
    assert_eq!(err.to_string(), "unknown opcode (at word 1)");
    assert_eq!(err.detail.as_deref(), Some("word 99 at index 1"));
}

#[test]
fn kinds_render_as_short_phrases() {
    assert_eq!(DecodeErrorKind::SkipMismatch.to_string(), "skip mismatch");
    assert_eq!(DecodeErrorKind::TruncatedBlock.to_string(), "truncated block");
    assert_eq!(
        DecodeErrorKind::ExpectedUntil.to_string(),
        "expected MAX_UNTIL or MIN_UNTIL"
    );
}

#[test]
fn errors_are_std_errors() {
    let err: Box<dyn Error + Send + Sync> = Box::new(DecodeError::exhausted_input(3));
    assert_eq!(err.to_string(), "unexpected end of program (at word 3)");
}

#[test]
fn exhaustion_inside_a_block_becomes_truncation() {
    let top_level = DecodeError::exhausted_input(4);
    let nested = top_level.clone().within_block(9);
    assert_eq!(nested.kind, DecodeErrorKind::TruncatedBlock);
    assert_eq!(nested.position, 4);
    assert_eq!(
        nested.detail.as_deref(),
        Some("block should end at 9, input ended at 4")
    );

    let other = DecodeError::width_too_large(2, u32::MAX);
    assert_eq!(other.clone().within_block(9), other);
}

#[test]
fn skip_mismatch_names_the_block() {
    let err = decode_err(&[op::ASSERT, 4, 0, op::LITERAL, 97, op::SUCCESS]);
    assert_eq!(err.kind, DecodeErrorKind::SkipMismatch);
    assert_eq!(err.message, "incorrect skip in block");
    assert_eq!(err.detail.as_deref(), Some("expected position 4, got 5"));
}
