use crate::bitstream::BitStream;
use crate::decode_blocks::decode_huffman_block;
use crate::decompress_utils::DecompressTempData;
use crate::deflate_constants::*;
use crate::{DeflateDecodeTables, DeflateError, DeflateInput, DeflateOutput};
use nightly_quirks::branch_pred::unlikely;

#[macro_export]
macro_rules! safety_check {
    ($cond:expr) => {
        if !$cond {
            return Err($crate::DeflateError::InvalidDeflate);
        }
    };
}

/*
 * Decompress one raw DEFLATE stream, block by block, until a block with
 * BFINAL set completes.  The decode tables are owned by the caller so their
 * allocations can be reused across streams; all other state lives for one
 * invocation only.
 */
#[inline(never)]
pub fn deflate_decompress<I: DeflateInput, O: DeflateOutput>(
    tables: &mut DeflateDecodeTables,
    in_stream: &mut I,
    out_stream: &mut O,
) -> Result<(), DeflateError> {
    let mut tmp_data = DecompressTempData {
        input_bitstream: BitStream::new(in_stream),
        block_type: 0,
        is_final_block: false,
        num_litlen_syms: 0,
        num_offset_syms: 0,
    };

    loop {
        /* Read the next block; stored blocks are consumed whole.  */
        if !decode_huffman_block(tables, &mut tmp_data, out_stream)? {
            decode_huffman_symbols(tables, &mut tmp_data, out_stream)?;
        }

        if tmp_data.is_final_block {
            break;
        }
    }

    Ok(())
}

/*
 * The symbol loop: decode literal/length symbols until end-of-block,
 * expanding matches against the output lookback window.
 */
fn decode_huffman_symbols<I: DeflateInput, O: DeflateOutput>(
    tables: &DeflateDecodeTables,
    tmp_data: &mut DecompressTempData<I>,
    out_stream: &mut O,
) -> Result<(), DeflateError> {
    loop {
        let sym = tables
            .litlen_decode_table
            .decode_symbol(&mut tmp_data.input_bitstream)? as usize;

        if sym < DEFLATE_NUM_LITERALS {
            /* Literal  */
            out_stream.write_byte(sym as u8)?;
            continue;
        }

        if unlikely(sym == DEFLATE_END_OF_BLOCK) {
            return Ok(());
        }

        /* Match length: symbols 286 and 287 never occur in block data even
         * though they participate in code construction.  */
        safety_check!(sym <= DEFLATE_MAX_LEN_SYM);
        let len_slot = sym - DEFLATE_FIRST_LEN_SYM;
        let len_extra = DEFLATE_LENGTH_EXTRA_BITS[len_slot] as u32;
        tmp_data.input_bitstream.ensure_bits(len_extra)?;
        let length = DEFLATE_LENGTH_BASE[len_slot] as usize
            + tmp_data.input_bitstream.pop_bits(len_extra) as usize;

        /* Match offset  */
        let offset_sym = tables
            .offset_decode_table
            .decode_symbol(&mut tmp_data.input_bitstream)? as usize;
        safety_check!(offset_sym <= DEFLATE_MAX_OFFSET_SYM);
        let offset_extra = DEFLATE_OFFSET_EXTRA_BITS[offset_sym] as u32;
        tmp_data.input_bitstream.ensure_bits(offset_extra)?;
        let offset = DEFLATE_OFFSET_BASE[offset_sym] as usize
            + tmp_data.input_bitstream.pop_bits(offset_extra) as usize;

        /* The sink validates the offset against the bytes emitted so far
         * and performs the possibly self-overlapping copy.  */
        out_stream.copy_backwards(offset, length)?;
    }
}
