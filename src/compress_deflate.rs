use crate::bitstream::BitWriter;
use crate::compress_utils::{
    canonical_codes, huffman_code_lengths, length_to_slot, offset_to_slot, rle_encode_code_lens,
    MatchFinder,
};
use crate::deflate_constants::*;
use crate::{DeflateError, DeflateInput, DeflateOutput};

/* Fresh input consumed per block.  Together with the retained window this
 * caps the compressor's buffer at 64 KiB.  */
const COMPRESS_CHUNK_SIZE: usize = 32768;

/* The number of litlen symbols the encoder can actually produce; 286 and
 * 287 exist only on the decode side.  */
const NUM_ENCODED_LITLEN_SYMS: usize = 286;
const NUM_ENCODED_OFFSET_SYMS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Literal(u8),
    Match { length: u16, offset: u16 },
}

/*
 * Compress the whole input as one raw DEFLATE stream.  Input is consumed in
 * 32 KiB chunks; each chunk becomes one block, and the trailing 32 KiB of
 * consumed input is kept in the buffer so matches can reach into the
 * previous chunk but never beyond the window.
 */
#[inline(never)]
pub fn deflate_compress<I: DeflateInput, O: DeflateOutput>(
    in_stream: &mut I,
    out_stream: &mut O,
) -> Result<(), DeflateError> {
    let mut writer = BitWriter::new(out_stream);
    let mut window: Vec<u8> = Vec::with_capacity(DEFLATE_WINDOW_SIZE + COMPRESS_CHUNK_SIZE);
    let mut finder = MatchFinder::new();
    let mut match_len: Vec<u16> = Vec::new();
    let mut match_offset: Vec<u16> = Vec::new();
    let mut tokens: Vec<Token> = Vec::new();

    loop {
        let chunk_start = window.len();
        window.resize(chunk_start + COMPRESS_CHUNK_SIZE, 0);
        let mut filled = chunk_start;
        loop {
            let got = in_stream.read(&mut window[filled..]);
            if got == 0 {
                break;
            }
            filled += got;
            if filled == window.len() {
                break;
            }
        }
        let is_final = filled < chunk_start + COMPRESS_CHUNK_SIZE;
        window.truncate(filled);

        if filled == chunk_start {
            /* No input left (or none at all): a stream must still end with
             * a final block, so emit an empty one.  */
            write_block(&mut writer, &[], true)?;
            break;
        }

        finder.find_matches(&window, chunk_start, &mut match_len, &mut match_offset);

        tokens.clear();
        let mut pos = chunk_start;
        while pos < window.len() {
            let len = match_len[pos] as usize;
            if len >= DEFLATE_MIN_MATCH_LEN {
                tokens.push(Token::Match {
                    length: len as u16,
                    offset: match_offset[pos],
                });
                pos += len;
            } else {
                tokens.push(Token::Literal(window[pos]));
                pos += 1;
            }
        }

        write_block(&mut writer, &tokens, is_final)?;

        if is_final {
            break;
        }

        /* Keep the trailing window addressable for the next chunk.  */
        if window.len() > DEFLATE_WINDOW_SIZE {
            let cut = window.len() - DEFLATE_WINDOW_SIZE;
            window.drain(..cut);
        }
    }

    writer.flush_bits()
}

/*
 * One Huffman code on the encode side: canonical codewords plus their
 * lengths, derived from a codeword length vector.
 */
struct HuffmanCode {
    codes: Vec<u16>,
    lens: Vec<u8>,
}

impl HuffmanCode {
    fn from_lens(lens: Vec<u8>) -> Self {
        Self {
            codes: canonical_codes(&lens),
            lens,
        }
    }

    #[inline(always)]
    fn encode<O: DeflateOutput>(
        &self,
        writer: &mut BitWriter<O>,
        sym: usize,
    ) -> Result<(), DeflateError> {
        debug_assert!(self.lens[sym] > 0);
        writer.write_huffman_code(self.codes[sym], self.lens[sym])
    }
}

fn static_codes() -> (HuffmanCode, HuffmanCode) {
    (
        HuffmanCode::from_lens(static_litlen_lens().to_vec()),
        HuffmanCode::from_lens(static_offset_lens().to_vec()),
    )
}

/*
 * Everything needed to emit a dynamic block header: the two body codes, the
 * RLE-compressed length vector, and the precode that compresses it.
 */
struct DynamicCodes {
    litlen: HuffmanCode,
    offset: HuffmanCode,
    num_litlen_syms: usize,
    num_offset_syms: usize,
    code_lens_rle: Vec<(u8, u8)>,
    precode: HuffmanCode,
    num_explicit_precode_lens: usize,
}

impl DynamicCodes {
    fn from_freqs(
        litlen_freqs: &[u32; NUM_ENCODED_LITLEN_SYMS],
        offset_freqs: &[u32; NUM_ENCODED_OFFSET_SYMS],
    ) -> Self {
        let litlen_lens = huffman_code_lengths(litlen_freqs, DEFLATE_MAX_LITLEN_CODEWORD_LEN);

        let mut offset_freqs = *offset_freqs;
        if offset_freqs.iter().all(|&freq| freq == 0) {
            /* A block without matches still transmits one offset code, so
             * decoders get a well-formed (single-leaf) offset table.  */
            offset_freqs[0] = 1;
        }
        let offset_lens = huffman_code_lengths(&offset_freqs, DEFLATE_MAX_OFFSET_CODEWORD_LEN);

        /* HLIT and HDIST: trailing zero lengths are not transmitted.  */
        let num_litlen_syms = litlen_lens
            .iter()
            .rposition(|&len| len != 0)
            .map_or(0, |last| last + 1)
            .max(DEFLATE_FIRST_LEN_SYM);
        let num_offset_syms = offset_lens
            .iter()
            .rposition(|&len| len != 0)
            .map_or(0, |last| last + 1)
            .max(1);

        let mut transmitted = Vec::with_capacity(num_litlen_syms + num_offset_syms);
        transmitted.extend_from_slice(&litlen_lens[..num_litlen_syms]);
        transmitted.extend_from_slice(&offset_lens[..num_offset_syms]);
        let code_lens_rle = rle_encode_code_lens(&transmitted);

        let mut precode_freqs = [0u32; DEFLATE_NUM_PRECODE_SYMS];
        for &(sym, _) in &code_lens_rle {
            precode_freqs[sym as usize] += 1;
        }
        let precode_lens = huffman_code_lengths(&precode_freqs, DEFLATE_MAX_PRE_CODEWORD_LEN);

        let num_explicit_precode_lens = DEFLATE_PRECODE_LENS_PERMUTATION
            .iter()
            .rposition(|&sym| precode_lens[sym as usize] != 0)
            .map_or(0, |last| last + 1)
            .max(4);

        Self {
            litlen: HuffmanCode::from_lens(litlen_lens),
            offset: HuffmanCode::from_lens(offset_lens),
            num_litlen_syms,
            num_offset_syms,
            code_lens_rle,
            precode: HuffmanCode::from_lens(precode_lens),
            num_explicit_precode_lens,
        }
    }

    fn header_cost_bits(&self) -> usize {
        let mut cost = 5 + 5 + 4 + 3 * self.num_explicit_precode_lens;
        for &(sym, _) in &self.code_lens_rle {
            cost += self.precode.lens[sym as usize] as usize;
            cost += match sym {
                16 => 2,
                17 => 3,
                18 => 7,
                _ => 0,
            };
        }
        cost
    }

    fn write_header<O: DeflateOutput>(&self, writer: &mut BitWriter<O>) -> Result<(), DeflateError> {
        writer.write_bits((self.num_litlen_syms - DEFLATE_FIRST_LEN_SYM) as u32, 5)?;
        writer.write_bits((self.num_offset_syms - 1) as u32, 5)?;
        writer.write_bits((self.num_explicit_precode_lens - 4) as u32, 4)?;

        for &sym in DEFLATE_PRECODE_LENS_PERMUTATION
            .iter()
            .take(self.num_explicit_precode_lens)
        {
            writer.write_bits(self.precode.lens[sym as usize] as u32, 3)?;
        }

        for &(sym, extra) in &self.code_lens_rle {
            self.precode.encode(writer, sym as usize)?;
            match sym {
                16 => writer.write_bits(extra as u32, 2)?,
                17 => writer.write_bits(extra as u32, 3)?,
                18 => writer.write_bits(extra as u32, 7)?,
                _ => {}
            }
        }
        Ok(())
    }
}

/*
 * The body cost under a given pair of length vectors, in bits, including
 * the extra bits carried by length and offset symbols.
 */
fn body_cost_bits(
    litlen_freqs: &[u32; NUM_ENCODED_LITLEN_SYMS],
    offset_freqs: &[u32; NUM_ENCODED_OFFSET_SYMS],
    litlen_lens: &[u8],
    offset_lens: &[u8],
) -> usize {
    let mut cost = 0;
    for (sym, &freq) in litlen_freqs.iter().enumerate() {
        if freq == 0 {
            continue;
        }
        let mut bits = litlen_lens[sym] as usize;
        if sym >= DEFLATE_FIRST_LEN_SYM {
            bits += DEFLATE_LENGTH_EXTRA_BITS[sym - DEFLATE_FIRST_LEN_SYM] as usize;
        }
        cost += freq as usize * bits;
    }
    for (sym, &freq) in offset_freqs.iter().enumerate() {
        if freq == 0 {
            continue;
        }
        cost +=
            freq as usize * (offset_lens[sym] as usize + DEFLATE_OFFSET_EXTRA_BITS[sym] as usize);
    }
    cost
}

fn write_block_body<O: DeflateOutput>(
    writer: &mut BitWriter<O>,
    tokens: &[Token],
    litlen: &HuffmanCode,
    offset_code: &HuffmanCode,
) -> Result<(), DeflateError> {
    for token in tokens {
        match *token {
            Token::Literal(byte) => litlen.encode(writer, byte as usize)?,
            Token::Match { length, offset } => {
                let (slot, extra_bits, extra) = length_to_slot(length as usize);
                litlen.encode(writer, DEFLATE_FIRST_LEN_SYM + slot)?;
                if extra_bits > 0 {
                    writer.write_bits(extra as u32, extra_bits as u32)?;
                }

                let (slot, extra_bits, extra) = offset_to_slot(offset as usize);
                offset_code.encode(writer, slot)?;
                if extra_bits > 0 {
                    writer.write_bits(extra as u32, extra_bits as u32)?;
                }
            }
        }
    }
    litlen.encode(writer, DEFLATE_END_OF_BLOCK)
}

fn write_block<O: DeflateOutput>(
    writer: &mut BitWriter<O>,
    tokens: &[Token],
    is_final: bool,
) -> Result<(), DeflateError> {
    writer.write_bits(is_final as u32, 1)?;

    if tokens.is_empty() {
        /* Nothing to model frequencies on; the static code has the
         * shortest possible header.  */
        writer.write_bits(DEFLATE_BLOCKTYPE_STATIC_HUFFMAN, 2)?;
        let (litlen, offset_code) = static_codes();
        return write_block_body(writer, tokens, &litlen, &offset_code);
    }

    /* Symbol frequencies, including the end-of-block symbol.  */
    let mut litlen_freqs = [0u32; NUM_ENCODED_LITLEN_SYMS];
    let mut offset_freqs = [0u32; NUM_ENCODED_OFFSET_SYMS];
    litlen_freqs[DEFLATE_END_OF_BLOCK] = 1;
    for token in tokens {
        match *token {
            Token::Literal(byte) => litlen_freqs[byte as usize] += 1,
            Token::Match { length, offset } => {
                litlen_freqs[DEFLATE_FIRST_LEN_SYM + length_to_slot(length as usize).0] += 1;
                offset_freqs[offset_to_slot(offset as usize).0] += 1;
            }
        }
    }

    let dynamic = DynamicCodes::from_freqs(&litlen_freqs, &offset_freqs);
    let dynamic_cost = dynamic.header_cost_bits()
        + body_cost_bits(
            &litlen_freqs,
            &offset_freqs,
            &dynamic.litlen.lens,
            &dynamic.offset.lens,
        );

    let (static_litlen, static_offset) = static_codes();
    let static_cost = body_cost_bits(
        &litlen_freqs,
        &offset_freqs,
        &static_litlen.lens,
        &static_offset.lens,
    );

    if dynamic_cost < static_cost {
        writer.write_bits(DEFLATE_BLOCKTYPE_DYNAMIC_HUFFMAN, 2)?;
        dynamic.write_header(writer)?;
        write_block_body(writer, tokens, &dynamic.litlen, &dynamic.offset)
    } else {
        writer.write_bits(DEFLATE_BLOCKTYPE_STATIC_HUFFMAN, 2)?;
        write_block_body(writer, tokens, &static_litlen, &static_offset)
    }
}
