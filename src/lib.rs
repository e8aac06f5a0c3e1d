//! Library entrypoint for `srecode`.
//!
//! The crate decodes, validates, re-encodes and disassembles compiled regular
//! expression programs.

pub mod code;

pub use code::{
    DecodeError, DecodeErrorKind, DecodeOptions, DecodeResult, Decoder, Instruction, Opcode,
    decode, decode_with, disassemble, encode,
};
