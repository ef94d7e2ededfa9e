use crate::DeflateInput;
use std::cmp::min;

/*
 * A buffered byte source fed by a closure.  The closure fills as much of the
 * passed slice as it can and returns the byte count; returning 0 means the
 * source is exhausted.
 */
pub struct DeflateChunkedBufferInput<'a> {
    buffer: Box<[u8]>,
    position: usize,
    end_position: usize,
    func: Box<dyn FnMut(&mut [u8]) -> usize + 'a>,
}

impl<'a> DeflateChunkedBufferInput<'a> {
    pub fn new<F: FnMut(&mut [u8]) -> usize + 'a>(read_func: F, buf_size: usize) -> Self {
        Self {
            buffer: vec![0; buf_size.max(1)].into_boxed_slice(),
            position: 0,
            end_position: 0,
            func: Box::new(read_func),
        }
    }

    #[cold]
    #[inline(never)]
    fn refill_buffer(&mut self) -> bool {
        self.position = 0;
        self.end_position = (self.func)(&mut self.buffer);
        self.end_position > 0
    }
}

impl<'a> DeflateInput for DeflateChunkedBufferInput<'a> {
    fn read(&mut self, out_data: &mut [u8]) -> usize {
        let mut copied = 0;
        while copied < out_data.len() {
            if self.position == self.end_position && !self.refill_buffer() {
                break;
            }
            let avail = min(self.end_position - self.position, out_data.len() - copied);
            out_data[copied..copied + avail]
                .copy_from_slice(&self.buffer[self.position..self.position + avail]);
            self.position += avail;
            copied += avail;
        }
        copied
    }

    #[inline(always)]
    fn read_byte(&mut self) -> Option<u8> {
        if self.position == self.end_position && !self.refill_buffer() {
            return None;
        }
        let byte = self.buffer[self.position];
        self.position += 1;
        Some(byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_across_refills() {
        let data: Vec<u8> = (0..100u8).collect();
        let mut offset = 0;
        let mut input = DeflateChunkedBufferInput::new(
            |buf| {
                // Feed at most 7 bytes per call to force frequent refills.
                let avail = min(7, min(buf.len(), data.len() - offset));
                buf[..avail].copy_from_slice(&data[offset..offset + avail]);
                offset += avail;
                avail
            },
            16,
        );

        let mut collected = Vec::new();
        let mut chunk = [0u8; 13];
        loop {
            let got = input.read(&mut chunk);
            collected.extend_from_slice(&chunk[..got]);
            if got == 0 {
                break;
            }
        }
        assert_eq!(collected, data);
    }

    #[test]
    fn read_byte_hits_eof() {
        let mut served = false;
        let mut input = DeflateChunkedBufferInput::new(
            |buf| {
                if served {
                    0
                } else {
                    served = true;
                    buf[0] = 42;
                    1
                }
            },
            8,
        );
        assert_eq!(input.read_byte(), Some(42));
        assert_eq!(input.read_byte(), None);
    }
}
