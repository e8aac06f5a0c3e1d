//! Decode error contracts.

use thiserror::Error;

/// Result alias used throughout the decoder.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Stable decode error categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum DecodeErrorKind {
    /// A word was requested past the end of the program.
    #[error("exhausted input")]
    ExhaustedInput,
    /// A word at an instruction position is not a decodable opcode.
    #[error("unknown opcode")]
    UnknownOpcode,
    /// A word at a charset position is not a charset opcode.
    #[error("unknown charset opcode")]
    UnknownCharsetOp,
    /// An AT operand is not a known assertion code.
    #[error("unknown AT code")]
    UnknownAtCode,
    /// A CATEGORY operand is not a known character category.
    #[error("unknown category code")]
    UnknownCategory,
    /// A bounded block ran out of words before reaching its end.
    #[error("truncated block")]
    TruncatedBlock,
    /// A block finished somewhere other than where its skip field said.
    #[error("skip mismatch")]
    SkipMismatch,
    /// INFO flags carry unknown bits or a disallowed combination.
    #[error("invalid INFO flags")]
    InvalidFlags,
    /// Repeat bounds are inverted or exceed the repeat sentinel.
    #[error("invalid repeat bounds")]
    InvalidRepeatBounds,
    /// A JUMP was required at a fixed structural position.
    #[error("expected JUMP")]
    ExpectedJump,
    /// MAX_UNTIL or MIN_UNTIL was required after a REPEAT body.
    #[error("expected MAX_UNTIL or MIN_UNTIL")]
    ExpectedUntil,
    /// A SUCCESS or FAILURE terminator was required after a body.
    #[error("expected terminator")]
    ExpectedTerminator,
    /// BRANCH alternatives do not rejoin at one target.
    #[error("inconsistent branch targets")]
    InconsistentBranchTargets,
    /// A lookaround width has its sign bit set.
    #[error("width too large")]
    WidthTooLarge,
    /// A character operand lies beyond the Unicode range.
    #[error("invalid character")]
    InvalidCharacter,
    /// A BIGCHARSET index table points past its block list.
    #[error("invalid block index")]
    InvalidBlockIndex,
    /// A group reference exceeds the configured group count.
    #[error("invalid group reference")]
    InvalidGroup,
    /// Blocks are nested deeper than the configured limit.
    #[error("nesting too deep")]
    NestingTooDeep,
}

/// Decode error payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (at word {position})")]
pub struct DecodeError {
    /// Error category.
    pub kind: DecodeErrorKind,
    /// Cursor position when the failure was detected.
    pub position: usize,
    /// Human-readable error summary.
    pub message: String,
    /// Optional additional detail, usually expected vs. actual values.
    pub detail: Option<String>,
}

impl DecodeError {
    /// Creates a decode error.
    pub fn new(
        kind: DecodeErrorKind,
        position: usize,
        message: impl Into<String>,
        detail: Option<String>,
    ) -> Self {
        Self {
            kind,
            position,
            message: message.into(),
            detail,
        }
    }

    /// Reports running out of input inside a block ending at `end` as
    /// `TruncatedBlock`; other errors pass through unchanged.
    pub fn within_block(self, end: usize) -> Self {
        match self.kind {
            DecodeErrorKind::ExhaustedInput => Self::truncated_block(self.position, end),
            _ => self,
        }
    }

    /// Creates an `ExhaustedInput` error.
    pub fn exhausted_input(position: usize) -> Self {
        Self::new(
            DecodeErrorKind::ExhaustedInput,
            position,
            "unexpected end of program",
            None,
        )
    }

    /// Creates an `UnknownOpcode` error for a word that maps to no opcode.
    pub fn unknown_opcode(position: usize, word: u32) -> Self {
        Self::new(
            DecodeErrorKind::UnknownOpcode,
            position,
            "unknown opcode",
            Some(format!("word {word} at index {position}")),
        )
    }

    /// Creates an `UnknownOpcode` error for an opcode that cannot start an instruction.
    pub fn misplaced_opcode(position: usize, mnemonic: &str) -> Self {
        Self::new(
            DecodeErrorKind::UnknownOpcode,
            position,
            "opcode not valid at instruction position",
            Some(format!("{mnemonic} at index {position}")),
        )
    }

    /// Creates an `UnknownCharsetOp` error.
    pub fn unknown_charset_op(position: usize, word: u32) -> Self {
        Self::new(
            DecodeErrorKind::UnknownCharsetOp,
            position,
            "unknown charset opcode",
            Some(format!("word {word} at index {position}")),
        )
    }

    /// Creates an `UnknownAtCode` error.
    pub fn unknown_at_code(position: usize, word: u32) -> Self {
        Self::new(
            DecodeErrorKind::UnknownAtCode,
            position,
            "unknown AT code",
            Some(format!("code {word}")),
        )
    }

    /// Creates an `UnknownCategory` error.
    pub fn unknown_category(position: usize, word: u32) -> Self {
        Self::new(
            DecodeErrorKind::UnknownCategory,
            position,
            "unknown category code",
            Some(format!("code {word}")),
        )
    }

    /// Creates a `TruncatedBlock` error.
    pub fn truncated_block(position: usize, end: usize) -> Self {
        Self::new(
            DecodeErrorKind::TruncatedBlock,
            position,
            "program ended inside a block",
            Some(format!("block should end at {end}, input ended at {position}")),
        )
    }

    /// Creates a `SkipMismatch` error.
    pub fn skip_mismatch(position: usize, expected: usize, context: &str) -> Self {
        Self::new(
            DecodeErrorKind::SkipMismatch,
            position,
            format!("incorrect skip in {context}"),
            Some(format!("expected position {expected}, got {position}")),
        )
    }

    /// Creates an `InvalidFlags` error.
    pub fn invalid_flags(position: usize, flags: u32, reason: &str) -> Self {
        Self::new(
            DecodeErrorKind::InvalidFlags,
            position,
            format!("invalid INFO flags: {reason}"),
            Some(format!("flags {flags:#x}")),
        )
    }

    /// Creates an `InvalidRepeatBounds` error.
    pub fn invalid_repeat_bounds(position: usize, min: u32, max: u32, limit: u32) -> Self {
        Self::new(
            DecodeErrorKind::InvalidRepeatBounds,
            position,
            "invalid min or max value",
            Some(format!("min={min} max={max} limit={limit}")),
        )
    }

    /// Creates an `ExpectedJump` error.
    pub fn expected_jump(position: usize, word: u32) -> Self {
        Self::new(
            DecodeErrorKind::ExpectedJump,
            position,
            "alternative must be followed by JUMP",
            Some(format!("got word {word}")),
        )
    }

    /// Creates an `ExpectedUntil` error.
    pub fn expected_until(position: usize, word: u32) -> Self {
        Self::new(
            DecodeErrorKind::ExpectedUntil,
            position,
            "expected MAX_UNTIL or MIN_UNTIL to follow REPEAT",
            Some(format!("got word {word}")),
        )
    }

    /// Creates an `ExpectedTerminator` error.
    pub fn expected_terminator(position: usize, expected: &str, word: u32) -> Self {
        Self::new(
            DecodeErrorKind::ExpectedTerminator,
            position,
            format!("expected {expected} terminator"),
            Some(format!("got word {word}")),
        )
    }

    /// Creates an `InconsistentBranchTargets` error.
    pub fn inconsistent_branch_targets(position: usize, targets: &[usize]) -> Self {
        Self::new(
            DecodeErrorKind::InconsistentBranchTargets,
            position,
            "not all branch targets are the same",
            Some(format!("targets {targets:?}")),
        )
    }

    /// Creates an `InconsistentBranchTargets` error for a BRANCH with no alternatives.
    pub fn empty_branch(position: usize) -> Self {
        Self::new(
            DecodeErrorKind::InconsistentBranchTargets,
            position,
            "branch has no alternatives",
            None,
        )
    }

    /// Creates a `WidthTooLarge` error.
    pub fn width_too_large(position: usize, width: u32) -> Self {
        Self::new(
            DecodeErrorKind::WidthTooLarge,
            position,
            "lookaround width too large",
            Some(format!("width {width:#x}")),
        )
    }

    /// Creates an `InvalidCharacter` error.
    pub fn invalid_character(position: usize, word: u32) -> Self {
        Self::new(
            DecodeErrorKind::InvalidCharacter,
            position,
            "character operand out of range",
            Some(format!("code point {word:#x}")),
        )
    }

    /// Creates an `InvalidBlockIndex` error.
    pub fn invalid_block_index(position: usize, byte: usize, index: u8, blocks: u32) -> Self {
        Self::new(
            DecodeErrorKind::InvalidBlockIndex,
            position,
            "BIGCHARSET block index out of range",
            Some(format!("byte {byte} maps to block {index}, only {blocks} blocks")),
        )
    }

    /// Creates an `InvalidGroup` error.
    pub fn invalid_group(position: usize, group: u32, limit: u32) -> Self {
        Self::new(
            DecodeErrorKind::InvalidGroup,
            position,
            "group reference out of range",
            Some(format!("group {group}, limit {limit}")),
        )
    }

    /// Creates a `NestingTooDeep` error.
    pub fn nesting_too_deep(position: usize, limit: usize) -> Self {
        Self::new(
            DecodeErrorKind::NestingTooDeep,
            position,
            "blocks nested too deeply",
            Some(format!("limit {limit}")),
        )
    }
}
