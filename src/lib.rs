pub mod bitstream;
pub mod compress_deflate;
pub(crate) mod compress_utils;
pub(crate) mod decode_blocks;
pub mod decompress_deflate;
pub(crate) mod decompress_utils;
mod deflate_constants;
pub mod streams;

#[macro_use]
extern crate static_assertions;

use crate::compress_deflate::deflate_compress;
use crate::decompress_deflate::deflate_decompress;
use crate::decompress_utils::{DecodeTable, LenType};
use crate::deflate_constants::{
    DEFLATE_NUM_LITLEN_SYMS, DEFLATE_NUM_OFFSET_SYMS, DEFLATE_NUM_PRECODE_SYMS,
};
use crate::streams::deflate_chunked_buffer_input::DeflateChunkedBufferInput;
use crate::streams::deflate_chunked_buffer_output::DeflateChunkedBufferOutput;
use crate::streams::deflate_filebuffer_input::DeflateFileBufferInput;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/*
 * The main decompressor state.  Since decompression runs through the whole
 * stream in one call, this holds only the decode tables and the scratch
 * length vectors they are built from, so their allocations can be reused
 * across streams.
 */
pub struct DeflateDecodeTables {
    pub(crate) precode_lens: [LenType; DEFLATE_NUM_PRECODE_SYMS],
    pub(crate) lens: [LenType; DEFLATE_NUM_LITLEN_SYMS + DEFLATE_NUM_OFFSET_SYMS],
    pub(crate) precode_decode_table: DecodeTable,
    pub(crate) litlen_decode_table: DecodeTable,
    pub(crate) offset_decode_table: DecodeTable,
    pub(crate) static_codes_loaded: bool,
}

/*
 * Result of a failed call to deflate_decompress() or deflate_compress().
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeflateError {
    /* The compressed data was invalid, corrupt, or truncated.  */
    InvalidDeflate = 1,

    /* The byte sink reported a failure.  */
    IoError = 2,
}

/*
 * What a sink has seen once a stream is finished: the number of bytes that
 * went through it and their CRC32.
 */
pub struct OutStreamResult {
    pub written: usize,
    pub crc32: u32,
}

pub trait DeflateInput {
    /*
     * Read up to out_data.len() bytes into 'out_data', returning how many
     * were read.  Returning 0 means the source is exhausted.
     */
    fn read(&mut self, out_data: &mut [u8]) -> usize;

    #[inline(always)]
    fn read_byte(&mut self) -> Option<u8> {
        let mut byte = [0];
        if self.read(&mut byte) == 1 {
            Some(byte[0])
        } else {
            None
        }
    }
}

pub trait DeflateOutput {
    const MAX_LOOK_BACK: usize = 32768;

    fn write_byte(&mut self, byte: u8) -> Result<(), DeflateError>;
    fn write_slice(&mut self, data: &[u8]) -> Result<(), DeflateError>;

    /*
     * Emit 'length' bytes copied from 'offset' bytes back in the already
     * emitted output, advancing byte by byte so an overlapping source
     * replicates the bytes written along the way.  Fails with
     * InvalidDeflate when 'offset' is zero or exceeds the emitted byte
     * count.
     */
    fn copy_backwards(&mut self, offset: usize, length: usize) -> Result<(), DeflateError>;

    fn total_written(&self) -> usize;

    fn final_flush(&mut self) -> Result<OutStreamResult, DeflateError>;
}

pub fn alloc_decode_tables() -> DeflateDecodeTables {
    DeflateDecodeTables {
        precode_lens: [0; DEFLATE_NUM_PRECODE_SYMS],
        lens: [0; DEFLATE_NUM_LITLEN_SYMS + DEFLATE_NUM_OFFSET_SYMS],
        precode_decode_table: DecodeTable::new(),
        litlen_decode_table: DecodeTable::new(),
        offset_decode_table: DecodeTable::new(),
        static_codes_loaded: false,
    }
}

/*
 * Decompress a raw DEFLATE file, handing decompressed chunks to 'func'.
 */
pub fn decompress_file_buffered(
    file: impl AsRef<Path>,
    func: impl FnMut(&[u8]) -> Result<(), ()>,
    buf_size: usize,
) -> Result<OutStreamResult, DeflateError> {
    let mut read_file = File::open(file).unwrap();
    let mut input_stream =
        DeflateChunkedBufferInput::new(|buf| read_file.read(buf).unwrap_or(0), buf_size);

    let mut output_stream = DeflateChunkedBufferOutput::new(func, buf_size);

    let mut tables = alloc_decode_tables();

    deflate_decompress(&mut tables, &mut input_stream, &mut output_stream)?;
    output_stream.final_flush()
}

/*
 * Compress a file into a raw DEFLATE stream, handing compressed chunks to
 * 'func'.  The file is memory-mapped, so the match finder reads it without
 * extra copies.
 */
pub fn compress_file_buffered(
    file: impl AsRef<Path>,
    func: impl FnMut(&[u8]) -> Result<(), ()>,
    buf_size: usize,
) -> Result<OutStreamResult, DeflateError> {
    let mut input_stream = DeflateFileBufferInput::new(file);
    let mut output_stream = DeflateChunkedBufferOutput::new(func, buf_size);

    deflate_compress(&mut input_stream, &mut output_stream)?;
    output_stream.final_flush()
}

const SLICE_BUF_SIZE: usize = 1024 * 64;

/*
 * One-shot decompression of an in-memory stream.
 */
pub fn decompress_slice(data: &[u8]) -> Result<Vec<u8>, DeflateError> {
    let mut out = Vec::new();
    let mut position = 0;
    {
        let mut input_stream = DeflateChunkedBufferInput::new(
            |buf| {
                let avail = (data.len() - position).min(buf.len());
                buf[..avail].copy_from_slice(&data[position..position + avail]);
                position += avail;
                avail
            },
            SLICE_BUF_SIZE,
        );
        let mut output_stream = DeflateChunkedBufferOutput::new(
            |chunk| {
                out.extend_from_slice(chunk);
                Ok(())
            },
            SLICE_BUF_SIZE,
        );

        let mut tables = alloc_decode_tables();
        deflate_decompress(&mut tables, &mut input_stream, &mut output_stream)?;
        output_stream.final_flush()?;
    }
    Ok(out)
}

/*
 * One-shot compression of an in-memory buffer.  Compression of in-memory
 * data cannot fail: every input is encodable and the sink is a Vec.
 */
pub fn compress_slice(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut position = 0;
    {
        let mut input_stream = DeflateChunkedBufferInput::new(
            |buf| {
                let avail = (data.len() - position).min(buf.len());
                buf[..avail].copy_from_slice(&data[position..position + avail]);
                position += avail;
                avail
            },
            SLICE_BUF_SIZE,
        );
        let mut output_stream = DeflateChunkedBufferOutput::new(
            |chunk| {
                out.extend_from_slice(chunk);
                Ok(())
            },
            SLICE_BUF_SIZE,
        );

        deflate_compress(&mut input_stream, &mut output_stream).unwrap();
        output_stream.final_flush().unwrap();
    }
    out
}
