/*
 * Constants from the DEFLATE specification (RFC 1951).
 */

/* Valid block types  */
pub const DEFLATE_BLOCKTYPE_UNCOMPRESSED: u32 = 0;
pub const DEFLATE_BLOCKTYPE_STATIC_HUFFMAN: u32 = 1;
pub const DEFLATE_BLOCKTYPE_DYNAMIC_HUFFMAN: u32 = 2;

/* Minimum and maximum supported match lengths (in bytes)  */
pub const DEFLATE_MIN_MATCH_LEN: usize = 3;
pub const DEFLATE_MAX_MATCH_LEN: usize = 258;

/* Maximum supported match offset (in bytes)  */
pub const DEFLATE_MAX_MATCH_OFFSET: usize = 32768;

/* The window size of DEFLATE, equal to the maximum match offset  */
pub const DEFLATE_WINDOW_SIZE: usize = 32768;

/* Number of symbols in each Huffman code.  Note: for the literal/length
 * and offset codes, these are actually the maximum values; a given block
 * might use fewer symbols.  */
pub const DEFLATE_NUM_PRECODE_SYMS: usize = 19;
pub const DEFLATE_NUM_LITLEN_SYMS: usize = 288;
pub const DEFLATE_NUM_OFFSET_SYMS: usize = 32;

/* Division of symbols in the literal/length code  */
pub const DEFLATE_NUM_LITERALS: usize = 256;
pub const DEFLATE_END_OF_BLOCK: usize = 256;
pub const DEFLATE_FIRST_LEN_SYM: usize = 257;

/* The last literal/length and offset symbols that can actually appear in
 * block data.  286, 287, 30 and 31 may participate in code construction
 * but are invalid when decoded.  */
pub const DEFLATE_MAX_LEN_SYM: usize = 285;
pub const DEFLATE_MAX_OFFSET_SYM: usize = 29;

/* Maximum codeword length, in bits, within each Huffman code  */
pub const DEFLATE_MAX_PRE_CODEWORD_LEN: usize = 7;
pub const DEFLATE_MAX_LITLEN_CODEWORD_LEN: usize = 15;
pub const DEFLATE_MAX_OFFSET_CODEWORD_LEN: usize = 15;
pub const DEFLATE_MAX_CODEWORD_LEN: usize = 15;

/* The order in which precode codeword lengths are stored  */
pub const DEFLATE_PRECODE_LENS_PERMUTATION: [u8; DEFLATE_NUM_PRECODE_SYMS] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/* Base match length for each length symbol (257..285), and the number of
 * extra bits that follow the symbol in the bit stream.  */
pub const DEFLATE_LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115, 131,
    163, 195, 227, 258,
];

pub const DEFLATE_LENGTH_EXTRA_BITS: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];

/* Base match offset for each offset symbol (0..29), and the number of
 * extra bits that follow the symbol in the bit stream.  */
pub const DEFLATE_OFFSET_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537,
    2049, 3073, 4097, 6145, 8193, 12289, 16385, 24577,
];

pub const DEFLATE_OFFSET_EXTRA_BITS: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13,
    13,
];

/* Codeword lengths of the static literal/length and offset codes  */
pub fn static_litlen_lens() -> [u8; DEFLATE_NUM_LITLEN_SYMS] {
    let mut lens = [0u8; DEFLATE_NUM_LITLEN_SYMS];
    let mut i = 0;
    while i < 144 {
        lens[i] = 8;
        i += 1;
    }
    while i < 256 {
        lens[i] = 9;
        i += 1;
    }
    while i < 280 {
        lens[i] = 7;
        i += 1;
    }
    while i < 288 {
        lens[i] = 8;
        i += 1;
    }
    lens
}

pub fn static_offset_lens() -> [u8; DEFLATE_NUM_OFFSET_SYMS] {
    [5u8; DEFLATE_NUM_OFFSET_SYMS]
}

const_assert!(DEFLATE_LENGTH_BASE[28] as usize == DEFLATE_MAX_MATCH_LEN);
const_assert!(
    DEFLATE_OFFSET_BASE[29] as usize + ((1 << DEFLATE_OFFSET_EXTRA_BITS[29]) - 1)
        == DEFLATE_MAX_MATCH_OFFSET
);
