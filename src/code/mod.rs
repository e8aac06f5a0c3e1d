//! Compiled regular-expression bytecode.
//!
//! A program is a flat sequence of 32-bit words produced by the pattern
//! compiler. [`decode`] turns it into a tree of [`Instruction`]s, validating
//! every skip field, terminator and operand along the way; [`encode`] writes
//! a tree back out word for word; [`disassemble`] renders it for people.

mod charset;
pub mod cursor;
pub mod decode;
pub mod display;
pub mod encode;
pub mod error;
pub mod instruction;
pub mod opcode;
pub mod options;

pub use cursor::WordCursor;
pub use decode::{Decoder, Instructions, decode, decode_with};
pub use display::{Listing, disassemble};
pub use encode::encode;
pub use error::{DecodeError, DecodeErrorKind, DecodeResult};
pub use instruction::{
    Alternative, Assert, BigCharset, Bitmap, Branch, Charset, CharsetItem, CodePoint, ElseBranch,
    GroupRefExists, Info, Instruction, Operand, Prefix, Repeat, Until,
};
pub use opcode::{
    AtCode, BITMAP_WORDS, BLOCK_INDEX_WORDS, CODE_BITS, CODE_SIZE, Category, InfoFlags, MAXREPEAT,
    Opcode, OperandKind,
};
pub use options::DecodeOptions;
