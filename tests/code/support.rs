//! Shared helpers for the bytecode decoder tests.

#![allow(dead_code)]

use srecode::code::{
    DecodeError, DecodeErrorKind, DecodeOptions, Instruction, decode_with, encode,
};

/// Opcode words, spelled out so tests read like the bytecode they build.
pub mod op {
    pub const FAILURE: u32 = 0;
    pub const SUCCESS: u32 = 1;
    pub const ANY: u32 = 2;
    pub const ANY_ALL: u32 = 3;
    pub const ASSERT: u32 = 4;
    pub const ASSERT_NOT: u32 = 5;
    pub const AT: u32 = 6;
    pub const BRANCH: u32 = 7;
    pub const CALL: u32 = 8;
    pub const CATEGORY: u32 = 9;
    pub const CHARSET: u32 = 10;
    pub const BIGCHARSET: u32 = 11;
    pub const GROUPREF: u32 = 12;
    pub const GROUPREF_EXISTS: u32 = 13;
    pub const GROUPREF_IGNORE: u32 = 14;
    pub const IN: u32 = 15;
    pub const IN_IGNORE: u32 = 16;
    pub const INFO: u32 = 17;
    pub const JUMP: u32 = 18;
    pub const LITERAL: u32 = 19;
    pub const LITERAL_IGNORE: u32 = 20;
    pub const MARK: u32 = 21;
    pub const MAX_UNTIL: u32 = 22;
    pub const MIN_UNTIL: u32 = 23;
    pub const NOT_LITERAL: u32 = 24;
    pub const NOT_LITERAL_IGNORE: u32 = 25;
    pub const NEGATE: u32 = 26;
    pub const RANGE: u32 = 27;
    pub const REPEAT: u32 = 28;
    pub const REPEAT_ONE: u32 = 29;
    pub const SUBPATTERN: u32 = 30;
    pub const MIN_REPEAT_ONE: u32 = 31;
    pub const RANGE_IGNORE: u32 = 32;
}

/// Routes decoder tracing to the test harness. Set `RUST_LOG` to see it.
pub fn init_test_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let _ = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_test_writer()
        .try_init();
}

pub fn decode_with_logging(words: &[u32], options: DecodeOptions) -> Result<Vec<Instruction>, DecodeError> {
    init_test_logging();
    decode_with(words, options)
}

/// Decodes with default options, panicking with the error on failure.
pub fn decode_ok(words: &[u32]) -> Vec<Instruction> {
    decode_with_logging(words, DecodeOptions::default())
        .unwrap_or_else(|err| panic!("decode of {words:?} failed: {err} ({:?})", err.detail))
}

/// Decodes with default options, expecting failure.
pub fn decode_err(words: &[u32]) -> DecodeError {
    decode_err_with(words, DecodeOptions::default())
}

pub fn decode_err_with(words: &[u32], options: DecodeOptions) -> DecodeError {
    match decode_with_logging(words, options) {
        Ok(program) => panic!("decode of {words:?} should fail, got {program:?}"),
        Err(err) => err,
    }
}

pub fn decode_kind(words: &[u32]) -> DecodeErrorKind {
    decode_err(words).kind
}

/// Encodes `program`, decodes the words back and checks both directions agree.
pub fn assert_round_trip(program: &[Instruction]) -> Vec<u32> {
    let words = encode(program);
    let decoded = decode_ok(&words);
    pretty_assertions::assert_eq!(decoded.as_slice(), program);
    pretty_assertions::assert_eq!(encode(&decoded), words);
    words
}
