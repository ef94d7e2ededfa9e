use crate::{DeflateError, DeflateOutput, OutStreamResult};
use crc32fast::Hasher;
use std::cmp::min;

/*
 * A buffered byte sink fed to a closure, keeping the last 32 KiB of output
 * resident so that back-references can always be resolved in place.  Flushed
 * data is folded into a CRC32 that final_flush() reports alongside the byte
 * count.
 */
pub struct DeflateChunkedBufferOutput<'a> {
    buffer: Box<[u8]>,
    position: usize,
    written: usize,
    crc32: Hasher,
    func: Box<dyn FnMut(&[u8]) -> Result<(), ()> + 'a>,
}

impl<'a> DeflateChunkedBufferOutput<'a> {
    pub fn new<F: FnMut(&[u8]) -> Result<(), ()> + 'a>(write_func: F, buf_size: usize) -> Self {
        Self {
            buffer: vec![0; Self::MAX_LOOK_BACK + buf_size.max(1)].into_boxed_slice(),
            position: Self::MAX_LOOK_BACK,
            written: 0,
            crc32: Hasher::new(),
            func: Box::new(write_func),
        }
    }

    #[cold]
    #[inline(never)]
    fn flush_buffer(&mut self) -> Result<(), DeflateError> {
        if self.position == Self::MAX_LOOK_BACK {
            return Ok(());
        }
        let data = &self.buffer[Self::MAX_LOOK_BACK..self.position];
        self.crc32.update(data);
        (self.func)(data).map_err(|_| DeflateError::IoError)?;
        self.written += data.len();

        /* Keep the last MAX_LOOK_BACK bytes addressable at the front.  */
        self.buffer
            .copy_within(self.position - Self::MAX_LOOK_BACK..self.position, 0);
        self.position = Self::MAX_LOOK_BACK;
        Ok(())
    }
}

impl<'a> DeflateOutput for DeflateChunkedBufferOutput<'a> {
    #[inline(always)]
    fn write_byte(&mut self, byte: u8) -> Result<(), DeflateError> {
        if self.position == self.buffer.len() {
            self.flush_buffer()?;
        }
        self.buffer[self.position] = byte;
        self.position += 1;
        Ok(())
    }

    fn write_slice(&mut self, mut data: &[u8]) -> Result<(), DeflateError> {
        while !data.is_empty() {
            if self.position == self.buffer.len() {
                self.flush_buffer()?;
            }
            let avail = min(self.buffer.len() - self.position, data.len());
            self.buffer[self.position..self.position + avail].copy_from_slice(&data[..avail]);
            self.position += avail;
            data = &data[avail..];
        }
        Ok(())
    }

    fn copy_backwards(&mut self, offset: usize, length: usize) -> Result<(), DeflateError> {
        if offset == 0 || offset > Self::MAX_LOOK_BACK || offset > self.total_written() {
            return Err(DeflateError::InvalidDeflate);
        }

        /* Byte-at-a-time through the advancing write position, so a source
         * overlapping the destination replicates the just-written bytes
         * (offset 1 repeats the last byte).  */
        for _ in 0..length {
            if self.position == self.buffer.len() {
                self.flush_buffer()?;
            }
            self.buffer[self.position] = self.buffer[self.position - offset];
            self.position += 1;
        }
        Ok(())
    }

    #[inline(always)]
    fn total_written(&self) -> usize {
        self.written + (self.position - Self::MAX_LOOK_BACK)
    }

    fn final_flush(&mut self) -> Result<OutStreamResult, DeflateError> {
        self.flush_buffer()?;

        let result = OutStreamResult {
            written: self.written,
            crc32: std::mem::replace(&mut self.crc32, Hasher::new()).finalize(),
        };

        self.written = 0;
        self.position = Self::MAX_LOOK_BACK;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_copy_replicates_last_byte() {
        let mut out = Vec::new();
        {
            let mut output = DeflateChunkedBufferOutput::new(
                |data| {
                    out.extend_from_slice(data);
                    Ok(())
                },
                64,
            );
            output.write_byte(b'x').unwrap();
            output.copy_backwards(1, 258).unwrap();
            output.final_flush().unwrap();
        }
        assert_eq!(out, vec![b'x'; 259]);
    }

    #[test]
    fn rejects_offsets_beyond_written_output() {
        let mut output = DeflateChunkedBufferOutput::new(|_| Ok(()), 64);
        output.write_byte(b'a').unwrap();
        assert_eq!(
            output.copy_backwards(2, 1),
            Err(DeflateError::InvalidDeflate)
        );
        assert_eq!(
            output.copy_backwards(0, 1),
            Err(DeflateError::InvalidDeflate)
        );
        assert!(output.copy_backwards(1, 4).is_ok());
    }

    #[test]
    fn lookback_survives_flushes() {
        let mut out = Vec::new();
        {
            // A tiny spill area forces a flush on nearly every write.
            let mut output = DeflateChunkedBufferOutput::new(
                |data| {
                    out.extend_from_slice(data);
                    Ok(())
                },
                4,
            );
            output.write_slice(b"abcd").unwrap();
            for _ in 0..8 {
                output.copy_backwards(4, 4).unwrap();
            }
            let result = output.final_flush().unwrap();
            assert_eq!(result.written, 4 + 8 * 4);
        }
        assert_eq!(out, b"abcd".repeat(9));
    }

    #[test]
    fn reports_crc_of_flushed_bytes() {
        let mut output = DeflateChunkedBufferOutput::new(|_| Ok(()), 64);
        output.write_slice(b"123456789").unwrap();
        let result = output.final_flush().unwrap();
        // The standard CRC-32 check value.
        assert_eq!(result.crc32, 0xCBF43926);
        assert_eq!(result.written, 9);
    }
}
