//! Decoded instruction tree.
//!
//! Every block record keeps the skip fields it was decoded from, so a tree can
//! be re-encoded word for word. The constructors on [`Instruction`] compute
//! those fields from the nested content for callers that build trees by hand.

use std::fmt;

use crate::code::opcode::{AtCode, BITMAP_WORDS, Category, InfoFlags, Opcode};

/// One CHARSET bitmap: 256 bits, least significant bit first.
pub type Bitmap = [u32; BITMAP_WORDS];

/// Character operand.
///
/// Any value up to U+10FFFF is representable, including surrogates, which
/// compiled programs may legitimately contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CodePoint(u32);

impl CodePoint {
    /// Largest representable code point.
    pub const MAX: u32 = 0x10_FFFF;

    /// Creates a code point, or `None` beyond U+10FFFF.
    pub const fn new(value: u32) -> Option<Self> {
        if value <= Self::MAX {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Returns the raw code point value.
    pub const fn value(self) -> u32 {
        self.0
    }

    /// Returns the `char`, or `None` for surrogates.
    pub fn as_char(self) -> Option<char> {
        char::from_u32(self.0)
    }
}

impl From<char> for CodePoint {
    fn from(ch: char) -> Self {
        Self(ch as u32)
    }
}

impl fmt::Display for CodePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_char() {
            Some(ch) => write!(f, "{:?}", ch),
            None => write!(f, "'\\u{{{:x}}}'", self.0),
        }
    }
}

/// One decoded instruction: an opcode and its operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// Instruction opcode.
    pub opcode: Opcode,
    /// Operand, shaped by the opcode.
    pub operand: Operand,
}

/// Instruction operand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// No operand.
    None,
    /// Integer operand (`MARK`, `GROUPREF`, `GROUPREF_IGNORE`).
    Int(u32),
    /// Character operand (`LITERAL` family).
    Char(CodePoint),
    /// Position assertion (`AT`).
    At(AtCode),
    /// Character class (`IN`, `IN_IGNORE`).
    Charset(Charset),
    /// Search-acceleration header (`INFO`).
    Info(Info),
    /// Alternation (`BRANCH`).
    Branch(Branch),
    /// Repetition (`REPEAT`, `REPEAT_ONE`, `MIN_REPEAT_ONE`).
    Repeat(Repeat),
    /// Group-exists conditional (`GROUPREF_EXISTS`).
    GroupRefExists(GroupRefExists),
    /// Lookaround (`ASSERT`, `ASSERT_NOT`).
    Assert(Assert),
}

/// Skip-bounded character class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charset {
    /// Skip field, counting itself and the trailing `FAILURE`.
    pub skip: u32,
    /// Class members in program order.
    pub items: Vec<CharsetItem>,
}

/// One member of a character class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CharsetItem {
    /// Inverts the class.
    Negate,
    /// Single character.
    Literal(CodePoint),
    /// Inclusive character range.
    Range {
        /// Lowest member.
        low: CodePoint,
        /// Highest member.
        high: CodePoint,
    },
    /// Inclusive character range, matched case-insensitively.
    RangeIgnore {
        /// Lowest member.
        low: CodePoint,
        /// Highest member.
        high: CodePoint,
    },
    /// Bitmap over the first 256 characters.
    Bitmap(Bitmap),
    /// Two-level bitmap over the 16-bit range.
    BigCharset(BigCharset),
    /// Predefined character category.
    Category(Category),
}

impl CharsetItem {
    /// Returns the charset opcode that introduces this member.
    pub fn opcode(&self) -> Opcode {
        match self {
            Self::Negate => Opcode::Negate,
            Self::Literal(_) => Opcode::Literal,
            Self::Range { .. } => Opcode::Range,
            Self::RangeIgnore { .. } => Opcode::RangeIgnore,
            Self::Bitmap(_) => Opcode::Charset,
            Self::BigCharset(_) => Opcode::BigCharset,
            Self::Category(_) => Opcode::Category,
        }
    }
}

/// BIGCHARSET payload.
///
/// The index table maps the high byte of a 16-bit character to one of
/// `blocks`; the selected block is a bitmap over the low byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BigCharset {
    /// Index table as stored: 256 one-byte block numbers packed four per word.
    pub index_table: Vec<u32>,
    /// Bitmap blocks.
    pub blocks: Vec<Bitmap>,
}

impl BigCharset {
    /// Returns the number of bitmap blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Returns the block number for `high_byte`, reading the table little-endian.
    pub fn block_for(&self, high_byte: u8) -> Option<u8> {
        let word = self.index_table.get(usize::from(high_byte) / 4)?;
        Some(word.to_le_bytes()[usize::from(high_byte) % 4])
    }
}

/// INFO block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Info {
    /// Skip field.
    pub skip: u32,
    /// Flags word.
    pub flags: InfoFlags,
    /// Minimum match width.
    pub min: u32,
    /// Maximum match width.
    pub max: u32,
    /// Literal prefix, present when `flags` has `PREFIX`.
    pub prefix: Option<Prefix>,
    /// First-character set, present when `flags` has `CHARSET`.
    pub charset: Option<Vec<CharsetItem>>,
}

/// Literal prefix of an INFO block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prefix {
    /// Word stored after the prefix length; kept verbatim, not interpreted.
    pub prefix_skip: u32,
    /// Prefix characters.
    pub chars: Vec<CodePoint>,
    /// Overlap table for prefix search, one entry per character, kept verbatim.
    pub overlap: Vec<u32>,
}

/// BRANCH block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    /// Alternatives in program order.
    pub alternatives: Vec<Alternative>,
}

/// One BRANCH alternative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alternative {
    /// Skip field, counting itself, the body and the trailing jump.
    pub skip: u32,
    /// Alternative body.
    pub body: Vec<Instruction>,
    /// Skip of the trailing JUMP, relative to the word holding it.
    pub jump_skip: u32,
}

/// Terminator of a `REPEAT` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Until {
    /// Greedy: `MAX_UNTIL`.
    Max,
    /// Lazy: `MIN_UNTIL`.
    Min,
}

impl Until {
    /// Returns the opcode that encodes this terminator.
    pub fn opcode(self) -> Opcode {
        match self {
            Self::Max => Opcode::MaxUntil,
            Self::Min => Opcode::MinUntil,
        }
    }
}

/// Repeat block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repeat {
    /// Skip field.
    pub skip: u32,
    /// Minimum repetitions.
    pub min: u32,
    /// Maximum repetitions; `MAXREPEAT` means unbounded.
    pub max: u32,
    /// Repeated body.
    pub body: Vec<Instruction>,
    /// Body terminator for `REPEAT`; `None` for the single-item forms.
    pub until: Option<Until>,
}

/// GROUPREF_EXISTS block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRefExists {
    /// Referenced group.
    pub group: u32,
    /// Skip field, relative to the group word.
    pub skip: u32,
    /// Taken when the group matched.
    pub then: Vec<Instruction>,
    /// Taken when the group did not match.
    pub otherwise: Option<ElseBranch>,
}

/// Else arm of a GROUPREF_EXISTS block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElseBranch {
    /// Skip of the JUMP separating the arms.
    pub jump_skip: u32,
    /// Else body.
    pub body: Vec<Instruction>,
}

/// Lookaround block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assert {
    /// Skip field.
    pub skip: u32,
    /// Lookbehind width; zero for lookahead.
    pub width: u32,
    /// Assertion body.
    pub body: Vec<Instruction>,
}

fn skip_of(words: usize) -> u32 {
    u32::try_from(words).unwrap_or(u32::MAX)
}

fn body_len(body: &[Instruction]) -> usize {
    body.iter().map(Instruction::word_len).sum()
}

impl Instruction {
    /// Creates an instruction from its parts.
    pub fn new(opcode: Opcode, operand: Operand) -> Self {
        Self { opcode, operand }
    }

    /// Creates an operand-less instruction.
    pub fn bare(opcode: Opcode) -> Self {
        Self::new(opcode, Operand::None)
    }

    /// Creates an integer-operand instruction.
    pub fn with_int(opcode: Opcode, value: u32) -> Self {
        Self::new(opcode, Operand::Int(value))
    }

    /// Creates a character-operand instruction.
    pub fn with_char(opcode: Opcode, ch: impl Into<CodePoint>) -> Self {
        Self::new(opcode, Operand::Char(ch.into()))
    }

    /// Creates a `LITERAL`.
    pub fn literal(ch: char) -> Self {
        Self::with_char(Opcode::Literal, ch)
    }

    /// Creates an `AT`.
    pub fn at(code: AtCode) -> Self {
        Self::new(Opcode::At, Operand::At(code))
    }

    /// Creates an `IN` / `IN_IGNORE` with a computed skip.
    pub fn charset(opcode: Opcode, items: Vec<CharsetItem>) -> Self {
        let skip = skip_of(1 + charset_len(&items) + 1);
        Self::new(opcode, Operand::Charset(Charset { skip, items }))
    }

    /// Creates an `INFO` with a computed skip.
    pub fn info(
        flags: InfoFlags,
        min: u32,
        max: u32,
        prefix: Option<Prefix>,
        charset: Option<Vec<CharsetItem>>,
    ) -> Self {
        let prefix_words = prefix.as_ref().map_or(0, |p| 2 + p.chars.len() + p.overlap.len());
        let charset_words = charset.as_ref().map_or(0, |items| charset_len(items) + 1);
        let skip = skip_of(4 + prefix_words + charset_words);
        Self::new(
            Opcode::Info,
            Operand::Info(Info {
                skip,
                flags,
                min,
                max,
                prefix,
                charset,
            }),
        )
    }

    /// Creates a `BRANCH` with computed alternative and jump skips.
    pub fn branch(bodies: Vec<Vec<Instruction>>) -> Self {
        let lens: Vec<usize> = bodies.iter().map(|body| 1 + body_len(body) + 2).collect();
        let mut after: usize = lens.iter().sum();
        let alternatives = bodies
            .into_iter()
            .zip(&lens)
            .map(|(body, len)| {
                after -= len;
                Alternative {
                    skip: skip_of(*len),
                    body,
                    // Words after the jump skip, plus the terminating zero, plus one.
                    jump_skip: skip_of(after + 2),
                }
            })
            .collect();
        Self::new(Opcode::Branch, Operand::Branch(Branch { alternatives }))
    }

    /// Creates a `REPEAT` with a computed skip.
    pub fn repeat(min: u32, max: u32, body: Vec<Instruction>, until: Until) -> Self {
        let skip = skip_of(3 + body_len(&body));
        Self::new(
            Opcode::Repeat,
            Operand::Repeat(Repeat {
                skip,
                min,
                max,
                body,
                until: Some(until),
            }),
        )
    }

    /// Creates a `REPEAT_ONE` / `MIN_REPEAT_ONE` with a computed skip.
    pub fn repeat_one(opcode: Opcode, min: u32, max: u32, body: Vec<Instruction>) -> Self {
        let skip = skip_of(3 + body_len(&body) + 1);
        Self::new(
            opcode,
            Operand::Repeat(Repeat {
                skip,
                min,
                max,
                body,
                until: None,
            }),
        )
    }

    /// Creates a `GROUPREF_EXISTS` with computed skips.
    pub fn groupref_exists(
        group: u32,
        then: Vec<Instruction>,
        otherwise: Option<Vec<Instruction>>,
    ) -> Self {
        let then_len = body_len(&then);
        let (skip, otherwise) = match otherwise {
            Some(body) => (
                skip_of(then_len + 4),
                Some(ElseBranch {
                    jump_skip: skip_of(body_len(&body) + 1),
                    body,
                }),
            ),
            None => (skip_of(then_len + 2), None),
        };
        Self::new(
            Opcode::GroupRefExists,
            Operand::GroupRefExists(GroupRefExists {
                group,
                skip,
                then,
                otherwise,
            }),
        )
    }

    /// Creates an `ASSERT` / `ASSERT_NOT` with a computed skip.
    pub fn assert(opcode: Opcode, width: u32, body: Vec<Instruction>) -> Self {
        let skip = skip_of(1 + 1 + body_len(&body) + 1);
        Self::new(opcode, Operand::Assert(Assert { skip, width, body }))
    }
}

fn charset_len(items: &[CharsetItem]) -> usize {
    items.iter().map(CharsetItem::word_len).sum()
}
