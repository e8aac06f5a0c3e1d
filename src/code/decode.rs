//! Recursive instruction decoder.
//!
//! Every variable-length block carries a skip field; the decoder turns it into
//! an absolute end position before reading the block's contents and then
//! requires the cursor to land on that position exactly. Nested blocks are
//! decoded by resuming the same cursor with a tighter bound, never by slicing
//! the input.

use std::iter::FusedIterator;

use tracing::{debug, trace};

use crate::code::charset::{decode_charset, read_code_point};
use crate::code::cursor::WordCursor;
use crate::code::error::{DecodeError, DecodeResult};
use crate::code::instruction::{
    Alternative, Assert, Branch, Charset, ElseBranch, GroupRefExists, Info, Instruction, Operand,
    Prefix, Repeat, Until,
};
use crate::code::opcode::{AtCode, InfoFlags, Opcode, OperandKind};
use crate::code::options::DecodeOptions;

/// Sign bit of a lookaround width word.
const WIDTH_SIGN_BIT: u32 = 0x8000_0000;

// ===========================================================================
// Public API
// ===========================================================================

/// Decodes a whole program with default options.
pub fn decode(words: &[u32]) -> DecodeResult<Vec<Instruction>> {
    decode_with(words, DecodeOptions::default())
}

/// Decodes a whole program.
///
/// Returns the first error found; no partial tree is returned on failure.
pub fn decode_with(words: &[u32], options: DecodeOptions) -> DecodeResult<Vec<Instruction>> {
    debug!(words = words.len(), "decoding program");
    let mut decoder = Decoder::new(words, options);
    let result: DecodeResult<Vec<Instruction>> = decoder.instructions().collect();
    match &result {
        Ok(instructions) => debug!(
            instructions = instructions.len(),
            position = decoder.position(),
            "decoded program"
        ),
        Err(err) => debug!(kind = %err.kind, position = err.position, "decode failed"),
    }
    result
}

/// Stateful decoder over one program.
#[derive(Debug, Clone)]
pub struct Decoder<'w> {
    cursor: WordCursor<'w>,
    options: DecodeOptions,
}

impl<'w> Decoder<'w> {
    /// Creates a decoder positioned at the first word.
    pub fn new(words: &'w [u32], options: DecodeOptions) -> Self {
        Self {
            cursor: WordCursor::new(words),
            options,
        }
    }

    /// Returns the number of words consumed so far.
    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// Returns the underlying cursor.
    pub fn cursor(&self) -> &WordCursor<'w> {
        &self.cursor
    }

    /// Returns the options this decoder validates with.
    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Lazily decodes instructions until the program is exhausted.
    pub fn instructions(&mut self) -> Instructions<'_, 'w> {
        Instructions::new(self, None, 0)
    }

    /// Lazily decodes instructions until the cursor reaches `end`.
    ///
    /// Running out of words first fails with `TruncatedBlock`; overshooting
    /// `end` fails with `SkipMismatch`.
    pub fn instructions_until(&mut self, end: usize) -> Instructions<'_, 'w> {
        Instructions::new(self, Some(end), 0)
    }
}

/// Lazy instruction sequence over a [`Decoder`].
///
/// The sequence borrows the decoder's cursor and is consumed exactly once.
/// Dropping it part way and asking the decoder for another sequence resumes
/// from wherever the cursor stopped. After the first error the sequence is
/// finished.
#[derive(Debug)]
pub struct Instructions<'d, 'w> {
    decoder: &'d mut Decoder<'w>,
    end: Option<usize>,
    depth: usize,
    finished: bool,
}

impl<'d, 'w> Instructions<'d, 'w> {
    fn new(decoder: &'d mut Decoder<'w>, end: Option<usize>, depth: usize) -> Self {
        Self {
            decoder,
            end,
            depth,
            finished: false,
        }
    }

    fn step(&mut self) -> Option<DecodeResult<Instruction>> {
        let position = self.decoder.position();
        match self.end {
            None if self.decoder.cursor.is_exhausted() => return None,
            Some(end) if position == end => return None,
            Some(end) if position > end => {
                return Some(Err(DecodeError::skip_mismatch(position, end, "block")));
            }
            _ => {}
        }

        let result = self.decoder.decode_instruction(self.depth);
        Some(match self.end {
            None => result,
            Some(end) => result
                .map_err(|err| err.within_block(end))
                .and_then(|instr| {
                    let position = self.decoder.position();
                    if position > end {
                        Err(DecodeError::skip_mismatch(position, end, "block"))
                    } else {
                        Ok(instr)
                    }
                }),
        })
    }
}

impl Iterator for Instructions<'_, '_> {
    type Item = DecodeResult<Instruction>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let item = self.step();
        if !matches!(item, Some(Ok(_))) {
            self.finished = true;
        }
        item
    }
}

impl FusedIterator for Instructions<'_, '_> {}

// ===========================================================================
// Decoder internals
// ===========================================================================

/// Returns `position + skip - 1`, the end a skip field read at `position` implies.
fn block_end(position: usize, skip: u32) -> usize {
    position
        .saturating_add(usize::try_from(skip).unwrap_or(usize::MAX))
        .saturating_sub(1)
}

impl<'w> Decoder<'w> {
    fn decode_instruction(&mut self, depth: usize) -> DecodeResult<Instruction> {
        let at = self.position();
        let word = self.cursor.next_word()?;
        let opcode = Opcode::from_word(word).ok_or_else(|| DecodeError::unknown_opcode(at, word))?;
        trace!(position = at, opcode = opcode.mnemonic(), depth, "instruction");

        let nested = depth + 1;
        let operand = match opcode.operand_kind() {
            OperandKind::None => Operand::None,
            OperandKind::Int => {
                let value_at = self.position();
                let value = self.cursor.next_word()?;
                self.check_group(opcode, value_at, value)?;
                Operand::Int(value)
            }
            OperandKind::Char => Operand::Char(read_code_point(&mut self.cursor)?),
            OperandKind::At => {
                let code_at = self.position();
                let code = self.cursor.next_word()?;
                let at_code =
                    AtCode::from_word(code).ok_or_else(|| DecodeError::unknown_at_code(code_at, code))?;
                Operand::At(at_code)
            }
            OperandKind::Charset => Operand::Charset(self.decode_in()?),
            OperandKind::Info => Operand::Info(self.decode_info()?),
            OperandKind::Branch => Operand::Branch(self.decode_branch(nested)?),
            OperandKind::Repeat => Operand::Repeat(self.decode_repeat(opcode, nested)?),
            OperandKind::Conditional => {
                Operand::GroupRefExists(self.decode_groupref_exists(nested)?)
            }
            OperandKind::Lookaround => Operand::Assert(self.decode_assert(nested)?),
            OperandKind::Structural => {
                return Err(DecodeError::misplaced_opcode(at, opcode.mnemonic()));
            }
        };
        Ok(Instruction::new(opcode, operand))
    }

    // -----------------------------------------------------------------------
    // Shared helpers
    // -----------------------------------------------------------------------

    /// Reads a skip field and returns it with the end position it implies.
    fn read_skip(&mut self) -> DecodeResult<(u32, usize)> {
        let skip = self.cursor.next_word()?;
        Ok((skip, block_end(self.position(), skip)))
    }

    fn expect_position(&self, expected: usize, context: &str) -> DecodeResult<()> {
        let position = self.position();
        if position == expected {
            Ok(())
        } else {
            Err(DecodeError::skip_mismatch(position, expected, context))
        }
    }

    fn expect_terminator(&mut self, terminator: Opcode) -> DecodeResult<()> {
        let at = self.position();
        let word = self.cursor.next_word()?;
        if word == terminator.word() {
            Ok(())
        } else {
            Err(DecodeError::expected_terminator(at, terminator.mnemonic(), word))
        }
    }

    /// Decodes a nested sequence that must end exactly at `end`.
    fn block(&mut self, end: usize, depth: usize) -> DecodeResult<Vec<Instruction>> {
        if depth > self.options.max_depth {
            return Err(DecodeError::nesting_too_deep(
                self.position(),
                self.options.max_depth,
            ));
        }
        trace!(position = self.position(), end, depth, "block");
        Instructions::new(self, Some(end), depth).collect()
    }

    /// Decodes a body ending one word before `end`, whose last word is `terminator`.
    fn terminated_block(
        &mut self,
        end: usize,
        terminator: Opcode,
        depth: usize,
        context: &str,
    ) -> DecodeResult<Vec<Instruction>> {
        let body = self.block(end.saturating_sub(1), depth)?;
        self.expect_terminator(terminator)?;
        self.expect_position(end, context)?;
        Ok(body)
    }

    fn check_group(&self, opcode: Opcode, at: usize, group: u32) -> DecodeResult<()> {
        let Some(groups) = self.options.group_count else {
            return Ok(());
        };
        // MARK numbers group boundaries, two per group.
        let limit = match opcode {
            Opcode::Mark => groups.saturating_mul(2),
            _ => groups,
        };
        if group < limit {
            Ok(())
        } else {
            Err(DecodeError::invalid_group(at, group, limit))
        }
    }

    // -----------------------------------------------------------------------
    // Blocks
    // -----------------------------------------------------------------------

    fn decode_in(&mut self) -> DecodeResult<Charset> {
        let (skip, end) = self.read_skip()?;
        trace!(skip, end, "charset block");
        let items = decode_charset(&mut self.cursor, end.saturating_sub(1), &self.options)?;
        self.expect_terminator(Opcode::Failure)?;
        self.expect_position(end, "IN")?;
        Ok(Charset { skip, items })
    }

    fn decode_info(&mut self) -> DecodeResult<Info> {
        let (skip, end) = self.read_skip()?;
        let flags_at = self.position();
        let raw_flags = self.cursor.next_word()?;
        let min = self.cursor.next_word()?;
        let max = self.cursor.next_word()?;
        trace!(skip, end, flags = raw_flags, "info block");

        let flags = InfoFlags::from_bits(raw_flags)
            .ok_or_else(|| DecodeError::invalid_flags(flags_at, raw_flags, "unknown bits set"))?;
        if flags.contains(InfoFlags::PREFIX | InfoFlags::CHARSET) {
            return Err(DecodeError::invalid_flags(
                flags_at,
                raw_flags,
                "PREFIX and CHARSET are mutually exclusive",
            ));
        }
        if flags.contains(InfoFlags::LITERAL) && !flags.contains(InfoFlags::PREFIX) {
            return Err(DecodeError::invalid_flags(
                flags_at,
                raw_flags,
                "LITERAL requires PREFIX",
            ));
        }

        let prefix = if flags.contains(InfoFlags::PREFIX) {
            let len = self.cursor.next_word()?;
            let prefix_skip = self.cursor.next_word()?;
            let chars = (0..len)
                .map(|_| read_code_point(&mut self.cursor))
                .collect::<DecodeResult<Vec<_>>>()?;
            let overlap = self.cursor.next_words(chars.len())?;
            Some(Prefix {
                prefix_skip,
                chars,
                overlap,
            })
        } else {
            None
        };

        let charset = if flags.contains(InfoFlags::CHARSET) {
            let items = decode_charset(&mut self.cursor, end.saturating_sub(1), &self.options)?;
            self.expect_terminator(Opcode::Failure)?;
            Some(items)
        } else {
            None
        };

        self.expect_position(end, "INFO")?;
        Ok(Info {
            skip,
            flags,
            min,
            max,
            prefix,
            charset,
        })
    }

    fn decode_branch(&mut self, depth: usize) -> DecodeResult<Branch> {
        let mut alternatives = Vec::new();
        let mut targets = Vec::new();
        loop {
            let (skip, end) = self.read_skip()?;
            if skip == 0 {
                break;
            }
            // The body stops two words short, before the trailing JUMP and its skip.
            let body = self.block(end.saturating_sub(2), depth)?;
            let jump_at = self.position();
            let word = self.cursor.next_word()?;
            if word != Opcode::Jump.word() {
                return Err(DecodeError::expected_jump(jump_at, word));
            }
            let jump_skip = self.cursor.next_word()?;
            targets.push(block_end(self.position(), jump_skip));
            self.expect_position(end, "BRANCH")?;
            alternatives.push(Alternative {
                skip,
                body,
                jump_skip,
            });
        }

        let Some((first, rest)) = targets.split_first() else {
            return Err(DecodeError::empty_branch(self.position()));
        };
        if rest.iter().any(|target| target != first) {
            return Err(DecodeError::inconsistent_branch_targets(
                self.position(),
                &targets,
            ));
        }
        trace!(alternatives = alternatives.len(), target = first, "branch");
        Ok(Branch { alternatives })
    }

    fn decode_repeat(&mut self, opcode: Opcode, depth: usize) -> DecodeResult<Repeat> {
        let (skip, end) = self.read_skip()?;
        let bounds_at = self.position();
        let min = self.cursor.next_word()?;
        let max = self.cursor.next_word()?;
        if min > max || max > self.options.max_repeat {
            return Err(DecodeError::invalid_repeat_bounds(
                bounds_at,
                min,
                max,
                self.options.max_repeat,
            ));
        }
        trace!(skip, end, min, max, "repeat block");

        if opcode != Opcode::Repeat {
            let body = self.terminated_block(end, Opcode::Success, depth, opcode.mnemonic())?;
            return Ok(Repeat {
                skip,
                min,
                max,
                body,
                until: None,
            });
        }

        let body = self.block(end, depth)?;
        self.expect_position(end, "REPEAT")?;
        let until_at = self.position();
        let word = self.cursor.next_word()?;
        let until = match Opcode::from_word(word) {
            Some(Opcode::MaxUntil) => Until::Max,
            Some(Opcode::MinUntil) => Until::Min,
            _ => return Err(DecodeError::expected_until(until_at, word)),
        };
        Ok(Repeat {
            skip,
            min,
            max,
            body,
            until: Some(until),
        })
    }

    fn decode_groupref_exists(&mut self, depth: usize) -> DecodeResult<GroupRefExists> {
        let group_at = self.position();
        let group = self.cursor.next_word()?;
        self.check_group(Opcode::GroupRefExists, group_at, group)?;
        let skip = self.cursor.next_word()?;
        // This skip is relative to the group word rather than to itself.
        let end = block_end(group_at, skip).saturating_add(1);
        let body_start = self.position();

        // A JUMP two words before the end separates a then arm from an else arm.
        let jump_index = end.saturating_sub(2);
        let has_else = skip >= 3
            && jump_index >= body_start
            && self.cursor.peek_at(jump_index) == Some(Opcode::Jump.word());
        trace!(group, skip, end, has_else, "groupref_exists block");

        if !has_else {
            let then = self.block(end, depth)?;
            self.expect_position(end, "GROUPREF_EXISTS")?;
            return Ok(GroupRefExists {
                group,
                skip,
                then,
                otherwise: None,
            });
        }

        let then = self.block(jump_index, depth)?;
        let jump_at = self.position();
        let word = self.cursor.next_word()?;
        if word != Opcode::Jump.word() {
            return Err(DecodeError::expected_jump(jump_at, word));
        }
        let (jump_skip, else_end) = self.read_skip()?;
        let body = self.block(else_end, depth)?;
        self.expect_position(else_end, "GROUPREF_EXISTS else")?;
        Ok(GroupRefExists {
            group,
            skip,
            then,
            otherwise: Some(ElseBranch { jump_skip, body }),
        })
    }

    fn decode_assert(&mut self, depth: usize) -> DecodeResult<Assert> {
        let (skip, end) = self.read_skip()?;
        let width_at = self.position();
        let width = self.cursor.next_word()?;
        if width & WIDTH_SIGN_BIT != 0 {
            return Err(DecodeError::width_too_large(width_at, width));
        }
        trace!(skip, end, width, "assert block");
        let body = self.terminated_block(end, Opcode::Success, depth, "ASSERT")?;
        Ok(Assert { skip, width, body })
    }
}
