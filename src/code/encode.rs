//! Instruction tree to packed word encoding.
//!
//! The encoder writes back exactly the skip fields stored in the tree and
//! re-emits the implicit terminators, so `encode(&decode(words)?) == words`
//! for every program the decoder accepts. It does not validate.

use crate::code::instruction::{CharsetItem, Instruction, Operand};
use crate::code::opcode::{BITMAP_WORDS, Opcode};

// ---------------------------------------------------------------------------
// Lengths
// ---------------------------------------------------------------------------

impl Instruction {
    /// Returns the number of words this instruction occupies, opcode included.
    pub fn word_len(&self) -> usize {
        1 + match &self.operand {
            Operand::None => 0,
            Operand::Int(_) | Operand::Char(_) | Operand::At(_) => 1,
            Operand::Charset(charset) => 1 + items_len(&charset.items) + 1,
            Operand::Info(info) => {
                let prefix = info
                    .prefix
                    .as_ref()
                    .map_or(0, |p| 2 + p.chars.len() + p.overlap.len());
                let charset = info.charset.as_ref().map_or(0, |items| items_len(items) + 1);
                4 + prefix + charset
            }
            Operand::Branch(branch) => {
                branch
                    .alternatives
                    .iter()
                    .map(|alt| 1 + body_len(&alt.body) + 2)
                    .sum::<usize>()
                    + 1
            }
            Operand::Repeat(repeat) => 3 + body_len(&repeat.body) + 1,
            Operand::GroupRefExists(cond) => {
                2 + body_len(&cond.then)
                    + cond
                        .otherwise
                        .as_ref()
                        .map_or(0, |arm| 2 + body_len(&arm.body))
            }
            Operand::Assert(assert) => 2 + body_len(&assert.body) + 1,
        }
    }
}

impl CharsetItem {
    /// Returns the number of words this member occupies, opcode included.
    pub fn word_len(&self) -> usize {
        1 + match self {
            Self::Negate => 0,
            Self::Literal(_) | Self::Category(_) => 1,
            Self::Range { .. } | Self::RangeIgnore { .. } => 2,
            Self::Bitmap(_) => BITMAP_WORDS,
            Self::BigCharset(big) => 1 + big.index_table.len() + big.blocks.len() * BITMAP_WORDS,
        }
    }
}

fn body_len(body: &[Instruction]) -> usize {
    body.iter().map(Instruction::word_len).sum()
}

fn items_len(items: &[CharsetItem]) -> usize {
    items.iter().map(CharsetItem::word_len).sum()
}

// ---------------------------------------------------------------------------
// Encoding (public entry point)
// ---------------------------------------------------------------------------

/// Encodes an instruction sequence into program words.
pub fn encode(instructions: &[Instruction]) -> Vec<u32> {
    let mut words = Vec::with_capacity(body_len(instructions));
    encode_body(&mut words, instructions);
    words
}

fn encode_body(buf: &mut Vec<u32>, body: &[Instruction]) {
    for instr in body {
        encode_instruction(buf, instr);
    }
}

fn encode_instruction(buf: &mut Vec<u32>, instr: &Instruction) {
    buf.push(instr.opcode.word());
    match &instr.operand {
        Operand::None => {}
        Operand::Int(value) => buf.push(*value),
        Operand::Char(ch) => buf.push(ch.value()),
        Operand::At(code) => buf.push(code.word()),
        Operand::Charset(charset) => {
            buf.push(charset.skip);
            encode_charset(buf, &charset.items);
        }
        Operand::Info(info) => {
            buf.push(info.skip);
            buf.push(info.flags.bits());
            buf.push(info.min);
            buf.push(info.max);
            if let Some(prefix) = &info.prefix {
                buf.push(u32::try_from(prefix.chars.len()).unwrap_or(u32::MAX));
                buf.push(prefix.prefix_skip);
                buf.extend(prefix.chars.iter().map(|ch| ch.value()));
                buf.extend_from_slice(&prefix.overlap);
            }
            if let Some(items) = &info.charset {
                encode_charset(buf, items);
            }
        }
        Operand::Branch(branch) => {
            for alt in &branch.alternatives {
                buf.push(alt.skip);
                encode_body(buf, &alt.body);
                buf.push(Opcode::Jump.word());
                buf.push(alt.jump_skip);
            }
            buf.push(0);
        }
        Operand::Repeat(repeat) => {
            buf.push(repeat.skip);
            buf.push(repeat.min);
            buf.push(repeat.max);
            encode_body(buf, &repeat.body);
            match repeat.until {
                Some(until) => buf.push(until.opcode().word()),
                None => buf.push(Opcode::Success.word()),
            }
        }
        Operand::GroupRefExists(cond) => {
            buf.push(cond.group);
            buf.push(cond.skip);
            encode_body(buf, &cond.then);
            if let Some(arm) = &cond.otherwise {
                buf.push(Opcode::Jump.word());
                buf.push(arm.jump_skip);
                encode_body(buf, &arm.body);
            }
        }
        Operand::Assert(assert) => {
            buf.push(assert.skip);
            buf.push(assert.width);
            encode_body(buf, &assert.body);
            buf.push(Opcode::Success.word());
        }
    }
}

/// Encodes charset members followed by the terminating `FAILURE`.
fn encode_charset(buf: &mut Vec<u32>, items: &[CharsetItem]) {
    for item in items {
        buf.push(item.opcode().word());
        match item {
            CharsetItem::Negate => {}
            CharsetItem::Literal(ch) => buf.push(ch.value()),
            CharsetItem::Range { low, high } | CharsetItem::RangeIgnore { low, high } => {
                buf.push(low.value());
                buf.push(high.value());
            }
            CharsetItem::Bitmap(bits) => buf.extend_from_slice(bits),
            CharsetItem::BigCharset(big) => {
                buf.push(u32::try_from(big.blocks.len()).unwrap_or(u32::MAX));
                buf.extend_from_slice(&big.index_table);
                for block in &big.blocks {
                    buf.extend_from_slice(block);
                }
            }
            CharsetItem::Category(category) => buf.push(category.word()),
        }
    }
    buf.push(Opcode::Failure.word());
}
