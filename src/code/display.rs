//! Human-readable rendering of decoded programs.
//!
//! `Display` on an instruction prints its header line only; [`disassemble`]
//! renders the whole tree, nested sequences indented two spaces per level.

use std::fmt;

use crate::code::instruction::{CharsetItem, CodePoint, Instruction, Operand};
use crate::code::opcode::{MAXREPEAT, Opcode};

const INDENT: &str = "  ";

/// Renders an instruction sequence as an indented listing, one line per instruction.
pub fn disassemble(instructions: &[Instruction]) -> String {
    Listing(instructions).to_string()
}

/// Displayable listing of an instruction sequence.
#[derive(Debug, Clone, Copy)]
pub struct Listing<'a>(pub &'a [Instruction]);

impl fmt::Display for Listing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_body(f, self.0, 0)
    }
}

struct Count(u32);

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == MAXREPEAT {
            f.write_str("MAXREPEAT")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

fn line(f: &mut fmt::Formatter<'_>, depth: usize, text: impl fmt::Display) -> fmt::Result {
    for _ in 0..depth {
        f.write_str(INDENT)?;
    }
    writeln!(f, "{text}")
}

fn write_body(f: &mut fmt::Formatter<'_>, body: &[Instruction], depth: usize) -> fmt::Result {
    body.iter()
        .try_for_each(|instr| write_instruction(f, instr, depth))
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[CharsetItem], depth: usize) -> fmt::Result {
    items.iter().try_for_each(|item| line(f, depth, item))
}

fn write_instruction(f: &mut fmt::Formatter<'_>, instr: &Instruction, depth: usize) -> fmt::Result {
    line(f, depth, instr)?;
    let inner = depth + 1;
    match &instr.operand {
        Operand::None | Operand::Int(_) | Operand::Char(_) | Operand::At(_) => Ok(()),
        Operand::Charset(charset) => write_items(f, &charset.items, inner),
        Operand::Info(info) => {
            if let Some(prefix) = &info.prefix {
                let chars: Vec<String> = prefix.chars.iter().map(CodePoint::to_string).collect();
                line(
                    f,
                    inner,
                    format_args!(
                        "prefix prefix_skip={} chars=[{}] overlap={:?}",
                        prefix.prefix_skip,
                        chars.join(", "),
                        prefix.overlap
                    ),
                )?;
            }
            match &info.charset {
                Some(items) => write_items(f, items, inner),
                None => Ok(()),
            }
        }
        Operand::Branch(branch) => branch.alternatives.iter().try_for_each(|alt| {
            line(
                f,
                inner,
                format_args!("alternative skip={} jump_skip={}", alt.skip, alt.jump_skip),
            )?;
            write_body(f, &alt.body, inner + 1)
        }),
        Operand::Repeat(repeat) => {
            write_body(f, &repeat.body, inner)?;
            match repeat.until {
                Some(until) => line(f, depth, until.opcode().mnemonic()),
                None => Ok(()),
            }
        }
        Operand::GroupRefExists(cond) => {
            write_body(f, &cond.then, inner)?;
            match &cond.otherwise {
                Some(arm) => {
                    line(f, depth, format_args!("else jump_skip={}", arm.jump_skip))?;
                    write_body(f, &arm.body, inner)
                }
                None => Ok(()),
            }
        }
        Operand::Assert(assert) => write_body(f, &assert.body, inner),
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.opcode.mnemonic();
        match &self.operand {
            Operand::None => f.write_str(name),
            Operand::Int(value) => write!(f, "{name} {value}"),
            Operand::Char(ch) => write!(f, "{name} {ch}"),
            Operand::At(code) => write!(f, "{name} {}", code.mnemonic()),
            Operand::Charset(charset) => write!(f, "{name} skip={}", charset.skip),
            Operand::Info(info) => write!(
                f,
                "{name} skip={} flags={:#x} min={} max={}",
                info.skip,
                info.flags.bits(),
                info.min,
                Count(info.max)
            ),
            Operand::Branch(branch) => {
                write!(f, "{name} alternatives={}", branch.alternatives.len())
            }
            Operand::Repeat(repeat) => write!(
                f,
                "{name} skip={} min={} max={}",
                repeat.skip,
                repeat.min,
                Count(repeat.max)
            ),
            Operand::GroupRefExists(cond) => {
                write!(f, "{name} group={} skip={}", cond.group, cond.skip)
            }
            Operand::Assert(assert) => {
                write!(f, "{name} skip={} width={}", assert.skip, assert.width)
            }
        }
    }
}

impl fmt::Display for CharsetItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.opcode().mnemonic();
        match self {
            Self::Negate => f.write_str(name),
            Self::Literal(ch) => write!(f, "{name} {ch}"),
            Self::Range { low, high } | Self::RangeIgnore { low, high } => {
                write!(f, "{name} {low}..{high}")
            }
            Self::Bitmap(bits) => {
                f.write_str(name)?;
                bits.iter().try_for_each(|word| write!(f, " {word:08x}"))
            }
            Self::BigCharset(big) => write!(f, "{name} blocks={}", big.block_count()),
            Self::Category(category) => write!(f, "{name} {}", category.mnemonic()),
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
