//! Character-class sub-program decoder.

use tracing::trace;

use crate::code::cursor::WordCursor;
use crate::code::error::{DecodeError, DecodeResult};
use crate::code::instruction::{BigCharset, Bitmap, CharsetItem, CodePoint};
use crate::code::opcode::{BITMAP_WORDS, BLOCK_INDEX_WORDS, Category, Opcode};
use crate::code::options::DecodeOptions;

/// Reads one word as a character operand.
pub(crate) fn read_code_point(cursor: &mut WordCursor<'_>) -> DecodeResult<CodePoint> {
    let at = cursor.position();
    let word = cursor.next_word()?;
    CodePoint::new(word).ok_or_else(|| DecodeError::invalid_character(at, word))
}

/// Decodes charset members until the cursor reaches `end` exactly.
///
/// The caller owns the terminator that follows `end`.
pub(crate) fn decode_charset(
    cursor: &mut WordCursor<'_>,
    end: usize,
    options: &DecodeOptions,
) -> DecodeResult<Vec<CharsetItem>> {
    let mut items = Vec::new();
    while cursor.position() < end {
        let item = decode_item(cursor, options).map_err(|err| err.within_block(end))?;
        items.push(item);
        if cursor.position() > end {
            return Err(DecodeError::skip_mismatch(cursor.position(), end, "charset"));
        }
    }
    if cursor.position() != end {
        return Err(DecodeError::skip_mismatch(cursor.position(), end, "charset"));
    }
    Ok(items)
}

fn decode_item(cursor: &mut WordCursor<'_>, options: &DecodeOptions) -> DecodeResult<CharsetItem> {
    let at = cursor.position();
    let word = cursor.next_word()?;
    let opcode =
        Opcode::from_word(word).ok_or_else(|| DecodeError::unknown_charset_op(at, word))?;
    trace!(position = at, opcode = opcode.mnemonic(), "charset member");

    let item = match opcode {
        Opcode::Negate => CharsetItem::Negate,
        Opcode::Literal => CharsetItem::Literal(read_code_point(cursor)?),
        Opcode::Range => {
            let low = read_code_point(cursor)?;
            let high = read_code_point(cursor)?;
            CharsetItem::Range { low, high }
        }
        Opcode::RangeIgnore => {
            let low = read_code_point(cursor)?;
            let high = read_code_point(cursor)?;
            CharsetItem::RangeIgnore { low, high }
        }
        Opcode::Charset => CharsetItem::Bitmap(cursor.next_array::<BITMAP_WORDS>()?),
        Opcode::BigCharset => CharsetItem::BigCharset(decode_big_charset(cursor, options)?),
        Opcode::Category => {
            let at = cursor.position();
            let code = cursor.next_word()?;
            let category =
                Category::from_word(code).ok_or_else(|| DecodeError::unknown_category(at, code))?;
            CharsetItem::Category(category)
        }
        _ => return Err(DecodeError::unknown_charset_op(at, word)),
    };
    Ok(item)
}

fn decode_big_charset(
    cursor: &mut WordCursor<'_>,
    options: &DecodeOptions,
) -> DecodeResult<BigCharset> {
    let block_count = cursor.next_word()?;
    let table_at = cursor.position();
    let index_table = cursor.next_words(BLOCK_INDEX_WORDS)?;

    if options.validate_block_indices {
        let bytes = index_table.iter().flat_map(|word| word.to_le_bytes());
        for (byte, index) in bytes.enumerate() {
            if u32::from(index) >= block_count {
                return Err(DecodeError::invalid_block_index(
                    table_at,
                    byte,
                    index,
                    block_count,
                ));
            }
        }
    }

    let block_count = usize::try_from(block_count).unwrap_or(usize::MAX);
    let mut blocks: Vec<Bitmap> =
        Vec::with_capacity(block_count.min(cursor.remaining() / BITMAP_WORDS));
    for _ in 0..block_count {
        blocks.push(cursor.next_array::<BITMAP_WORDS>()?);
    }
    Ok(BigCharset {
        index_table,
        blocks,
    })
}
