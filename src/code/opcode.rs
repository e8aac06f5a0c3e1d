//! Opcode, assertion-code, and category-code tables for the bytecode format.

use bitflags::bitflags;

/// Size of one program word in bytes.
pub const CODE_SIZE: usize = 4;

/// Number of bits in one program word.
pub const CODE_BITS: usize = 8 * CODE_SIZE;

/// Largest repeat count the format can express; also means "unbounded".
pub const MAXREPEAT: u32 = u32::MAX;

/// Words in a CHARSET bitmap (256 bits).
pub const BITMAP_WORDS: usize = 256 / CODE_BITS;

/// Words in a BIGCHARSET block-index table (256 one-byte entries).
pub const BLOCK_INDEX_WORDS: usize = 256 / CODE_SIZE;

const _: () = assert!(256 % CODE_BITS == 0);
const _: () = assert!(256 % CODE_SIZE == 0);

macro_rules! code_table {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($variant:ident = $value:literal => $mnemonic:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum $name {
            $(
                #[doc = concat!("`", $mnemonic, "`")]
                $variant,
            )+
        }

        impl $name {
            /// Every member, in code order.
            pub const ALL: &'static [Self] = &[$(Self::$variant,)+];

            /// Maps a raw word to a member.
            pub const fn from_word(word: u32) -> Option<Self> {
                match word {
                    $($value => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// Returns the raw word for this member.
            pub const fn word(self) -> u32 {
                match self {
                    $(Self::$variant => $value,)+
                }
            }

            /// Returns the lowercase mnemonic.
            pub const fn mnemonic(self) -> &'static str {
                match self {
                    $(Self::$variant => $mnemonic,)+
                }
            }
        }
    };
}

code_table! {
    /// Instruction opcodes.
    Opcode {
        Failure = 0 => "failure",
        Success = 1 => "success",
        Any = 2 => "any",
        AnyAll = 3 => "any_all",
        Assert = 4 => "assert",
        AssertNot = 5 => "assert_not",
        At = 6 => "at",
        Branch = 7 => "branch",
        Call = 8 => "call",
        Category = 9 => "category",
        Charset = 10 => "charset",
        BigCharset = 11 => "bigcharset",
        GroupRef = 12 => "groupref",
        GroupRefExists = 13 => "groupref_exists",
        GroupRefIgnore = 14 => "groupref_ignore",
        In = 15 => "in",
        InIgnore = 16 => "in_ignore",
        Info = 17 => "info",
        Jump = 18 => "jump",
        Literal = 19 => "literal",
        LiteralIgnore = 20 => "literal_ignore",
        Mark = 21 => "mark",
        MaxUntil = 22 => "max_until",
        MinUntil = 23 => "min_until",
        NotLiteral = 24 => "not_literal",
        NotLiteralIgnore = 25 => "not_literal_ignore",
        Negate = 26 => "negate",
        Range = 27 => "range",
        Repeat = 28 => "repeat",
        RepeatOne = 29 => "repeat_one",
        Subpattern = 30 => "subpattern",
        MinRepeatOne = 31 => "min_repeat_one",
        RangeIgnore = 32 => "range_ignore",
    }
}

code_table! {
    /// Zero-width position assertions carried by `AT`.
    AtCode {
        Beginning = 0 => "at_beginning",
        BeginningLine = 1 => "at_beginning_line",
        BeginningString = 2 => "at_beginning_string",
        Boundary = 3 => "at_boundary",
        NonBoundary = 4 => "at_non_boundary",
        End = 5 => "at_end",
        EndLine = 6 => "at_end_line",
        EndString = 7 => "at_end_string",
        LocBoundary = 8 => "at_loc_boundary",
        LocNonBoundary = 9 => "at_loc_non_boundary",
        UniBoundary = 10 => "at_uni_boundary",
        UniNonBoundary = 11 => "at_uni_non_boundary",
    }
}

code_table! {
    /// Character classes carried by `CATEGORY` inside a charset.
    Category {
        Digit = 0 => "category_digit",
        NotDigit = 1 => "category_not_digit",
        Space = 2 => "category_space",
        NotSpace = 3 => "category_not_space",
        Word = 4 => "category_word",
        NotWord = 5 => "category_not_word",
        Linebreak = 6 => "category_linebreak",
        NotLinebreak = 7 => "category_not_linebreak",
        LocWord = 8 => "category_loc_word",
        LocNotWord = 9 => "category_loc_not_word",
        UniDigit = 10 => "category_uni_digit",
        UniNotDigit = 11 => "category_uni_not_digit",
        UniSpace = 12 => "category_uni_space",
        UniNotSpace = 13 => "category_uni_not_space",
        UniWord = 14 => "category_uni_word",
        UniNotWord = 15 => "category_uni_not_word",
        UniLinebreak = 16 => "category_uni_linebreak",
        UniNotLinebreak = 17 => "category_uni_not_linebreak",
    }
}

/// Operand shape an opcode takes at an instruction position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperandKind {
    /// No operand.
    None,
    /// One integer word.
    Int,
    /// One character word.
    Char,
    /// One AT code word.
    At,
    /// Skip-bounded charset.
    Charset,
    /// INFO block.
    Info,
    /// Alternation block.
    Branch,
    /// Repeat block.
    Repeat,
    /// Group-exists conditional block.
    Conditional,
    /// Lookaround block.
    Lookaround,
    /// Only valid inside another structure; rejected at instruction position.
    Structural,
}

impl Opcode {
    /// Returns the operand shape this opcode has at an instruction position.
    pub const fn operand_kind(self) -> OperandKind {
        match self {
            Self::Failure | Self::Success | Self::Any | Self::AnyAll => OperandKind::None,
            Self::Mark | Self::GroupRef | Self::GroupRefIgnore => OperandKind::Int,
            Self::Literal | Self::NotLiteral | Self::LiteralIgnore | Self::NotLiteralIgnore => {
                OperandKind::Char
            }
            Self::At => OperandKind::At,
            Self::In | Self::InIgnore => OperandKind::Charset,
            Self::Info => OperandKind::Info,
            Self::Branch => OperandKind::Branch,
            Self::Repeat | Self::RepeatOne | Self::MinRepeatOne => OperandKind::Repeat,
            Self::GroupRefExists => OperandKind::Conditional,
            Self::Assert | Self::AssertNot => OperandKind::Lookaround,
            Self::Call
            | Self::Category
            | Self::Charset
            | Self::BigCharset
            | Self::Jump
            | Self::MaxUntil
            | Self::MinUntil
            | Self::Negate
            | Self::Range
            | Self::RangeIgnore
            | Self::Subpattern => OperandKind::Structural,
        }
    }
}

bitflags! {
    /// Flags word of an INFO block.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct InfoFlags: u32 {
        /// A literal prefix table follows.
        const PREFIX = 1;
        /// The whole pattern is the literal prefix.
        const LITERAL = 2;
        /// A charset of possible first characters follows.
        const CHARSET = 4;
    }
}
