use crate::{
    bitstream::can_ensure,
    decompress_utils::{
        build_litlen_decode_table, build_offset_decode_table, build_precode_decode_table,
        DecompressTempData, LenType,
    },
    deflate_constants::{
        static_litlen_lens, static_offset_lens, DEFLATE_BLOCKTYPE_DYNAMIC_HUFFMAN,
        DEFLATE_BLOCKTYPE_STATIC_HUFFMAN, DEFLATE_BLOCKTYPE_UNCOMPRESSED,
        DEFLATE_NUM_LITLEN_SYMS, DEFLATE_NUM_OFFSET_SYMS, DEFLATE_NUM_PRECODE_SYMS,
        DEFLATE_PRECODE_LENS_PERMUTATION,
    },
    safety_check, DeflateDecodeTables, DeflateError, DeflateInput, DeflateOutput,
};

#[inline(always)]
pub fn decode_block_header<I: DeflateInput>(
    tmp_data: &mut DecompressTempData<I>,
) -> Result<(), DeflateError> {
    const_assert!(can_ensure(1 + 2));
    tmp_data.input_bitstream.ensure_bits(1 + 2)?;

    /* BFINAL: 1 bit  */
    tmp_data.is_final_block = tmp_data.input_bitstream.pop_bits(1) != 0;

    /* BTYPE: 2 bits  */
    tmp_data.block_type = tmp_data.input_bitstream.pop_bits(2);

    Ok(())
}

/*
 * Read the next block header and prepare the decode tables for its body.
 * Returns true if the block was a stored block, which is consumed entirely
 * here; Huffman blocks leave the body for the symbol loop.
 */
pub fn decode_huffman_block<I: DeflateInput, O: DeflateOutput>(
    tables: &mut DeflateDecodeTables,
    tmp_data: &mut DecompressTempData<I>,
    out_stream: &mut O,
) -> Result<bool, DeflateError> {
    /* Starting to read the next block.  */
    decode_block_header(tmp_data)?;

    if tmp_data.block_type == DEFLATE_BLOCKTYPE_DYNAMIC_HUFFMAN {
        /* Dynamic Huffman block.  */
        tables.static_codes_loaded = false;
        decode_dynamic_huffman_block(tables, tmp_data)?;
    } else if tmp_data.block_type == DEFLATE_BLOCKTYPE_UNCOMPRESSED {
        /* Uncompressed block: copy 'len' bytes literally from the input
         * to the output.  */
        decode_uncompressed_block(tmp_data, out_stream)?;
        return Ok(true);
    } else {
        safety_check!(tmp_data.block_type == DEFLATE_BLOCKTYPE_STATIC_HUFFMAN);

        /*
         * Static Huffman block: build the decode tables for the static
         * codes.  Skip doing so if the tables are already set up from
         * an earlier static block; this speeds up decompression of
         * degenerate input of many empty or very short static blocks.
         */
        tmp_data.num_litlen_syms = DEFLATE_NUM_LITLEN_SYMS;
        tmp_data.num_offset_syms = DEFLATE_NUM_OFFSET_SYMS;
        if !tables.static_codes_loaded {
            tables.static_codes_loaded = true;
            load_static_huffman_block(tables);
        }
    }

    Ok(false)
}

pub fn decode_dynamic_huffman_block<I: DeflateInput>(
    tables: &mut DeflateDecodeTables,
    tmp_data: &mut DecompressTempData<I>,
) -> Result<(), DeflateError> {
    /* Read the codeword length counts.  */
    const_assert!(can_ensure(5 + 5 + 4));
    tmp_data.input_bitstream.ensure_bits(5 + 5 + 4)?;

    const_assert!(DEFLATE_NUM_LITLEN_SYMS == ((1 << 5) - 1) + 257);
    tmp_data.num_litlen_syms = (tmp_data.input_bitstream.pop_bits(5) + 257) as usize;

    const_assert!(DEFLATE_NUM_OFFSET_SYMS == ((1 << 5) - 1) + 1);
    tmp_data.num_offset_syms = (tmp_data.input_bitstream.pop_bits(5) + 1) as usize;

    const_assert!(DEFLATE_NUM_PRECODE_SYMS == ((1 << 4) - 1) + 4);
    let num_explicit_precode_lens = (tmp_data.input_bitstream.pop_bits(4) + 4) as usize;

    /* Read the precode codeword lengths.  */
    for i in 0..num_explicit_precode_lens {
        tmp_data.input_bitstream.ensure_bits(3)?;
        tables.precode_lens[DEFLATE_PRECODE_LENS_PERMUTATION[i] as usize] =
            tmp_data.input_bitstream.pop_bits(3) as LenType;
    }
    for i in num_explicit_precode_lens..DEFLATE_NUM_PRECODE_SYMS {
        tables.precode_lens[DEFLATE_PRECODE_LENS_PERMUTATION[i] as usize] = 0;
    }

    /* Build the decode table for the precode.  */
    safety_check!(build_precode_decode_table(tables));

    /* Expand the literal/length and offset codeword lengths.  */
    let num_syms = tmp_data.num_litlen_syms + tmp_data.num_offset_syms;
    let mut i = 0;
    while i < num_syms {
        /* Read the next precode symbol.  */
        let presym = tables
            .precode_decode_table
            .decode_symbol(&mut tmp_data.input_bitstream)?;

        if presym < 16 {
            /* Explicit codeword length  */
            tables.lens[i] = presym as LenType;
            i += 1;
            continue;
        }

        /* Run-length encoded codeword lengths.  A run may cross the
         * boundary between the literal/length and offset lengths, but
         * must not overflow their combined count.  */
        let (rep_val, rep_count) = if presym == 16 {
            /* Repeat the previous length 3 - 6 times  */
            safety_check!(i != 0);
            tmp_data.input_bitstream.ensure_bits(2)?;
            (
                tables.lens[i - 1],
                (3 + tmp_data.input_bitstream.pop_bits(2)) as usize,
            )
        } else if presym == 17 {
            /* Repeat zero 3 - 10 times  */
            tmp_data.input_bitstream.ensure_bits(3)?;
            (0, (3 + tmp_data.input_bitstream.pop_bits(3)) as usize)
        } else {
            /* Repeat zero 11 - 138 times  */
            tmp_data.input_bitstream.ensure_bits(7)?;
            (0, (11 + tmp_data.input_bitstream.pop_bits(7)) as usize)
        };

        safety_check!(i + rep_count <= num_syms);
        tables.lens[i..i + rep_count].fill(rep_val);
        i += rep_count;
    }

    /* 'lens' is laid out literal/length first, then offsets; the offset
     * table is built from the tail.  */
    safety_check!(build_offset_decode_table(
        tables,
        tmp_data.num_litlen_syms,
        tmp_data.num_offset_syms,
    ));
    safety_check!(build_litlen_decode_table(tables, tmp_data.num_litlen_syms));

    Ok(())
}

pub fn decode_uncompressed_block<I: DeflateInput, O: DeflateOutput>(
    tmp_data: &mut DecompressTempData<I>,
    out_stream: &mut O,
) -> Result<(), DeflateError> {
    tmp_data.input_bitstream.align_input();

    let len = tmp_data.input_bitstream.read_aligned_u16()?;
    let nlen = tmp_data.input_bitstream.read_aligned_u16()?;

    safety_check!(len == !nlen);

    tmp_data
        .input_bitstream
        .copy_aligned_into(out_stream, len as usize)
}

pub fn load_static_huffman_block(tables: &mut DeflateDecodeTables) {
    tables.lens[..DEFLATE_NUM_LITLEN_SYMS].copy_from_slice(&static_litlen_lens());
    tables.lens[DEFLATE_NUM_LITLEN_SYMS..DEFLATE_NUM_LITLEN_SYMS + DEFLATE_NUM_OFFSET_SYMS]
        .copy_from_slice(&static_offset_lens());

    // Cannot fail
    let res1 =
        build_offset_decode_table(tables, DEFLATE_NUM_LITLEN_SYMS, DEFLATE_NUM_OFFSET_SYMS);
    debug_assert!(res1);
    let res2 = build_litlen_decode_table(tables, DEFLATE_NUM_LITLEN_SYMS);
    debug_assert!(res2);
}
