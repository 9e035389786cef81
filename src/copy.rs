//! Stream-to-stream copying through a fixed-size buffer.
//!
//! [`copy_exact`] moves an exact number of bytes and fails fast when the input
//! runs dry. [`copy_stream`] drains the input completely. Neither function
//! flushes or closes its streams; their lifetime stays with the caller.

use std::io::{self, Read, Write};

use tracing::debug;

use crate::error::CopyError;

/// Buffer size used when the caller does not pick one.
pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

/// Copy exactly `length` bytes from `input` to `output`.
///
/// One buffer of at most `buffer_size` bytes is allocated and reused. Each
/// chunk of `min(buffer_size, remaining)` bytes is read completely before it
/// is written with a single `write_all`, so the output sees exactly
/// `ceil(length / buffer_size)` writes. Returns the number of bytes copied,
/// which always equals `length`.
///
/// # Errors
///
/// - [`CopyError::ShortRead`] if `input` ends before `length` bytes arrive.
///   The incomplete chunk is not written.
/// - [`CopyError::Read`] / [`CopyError::Write`] for I/O failures on either side.
/// - [`CopyError::InvalidBufferSize`] if `buffer_size` is zero and there is
///   something to copy.
///
/// Every variant carries the number of bytes already written to `output`.
pub fn copy_exact<R, W>(
    input: &mut R,
    output: &mut W,
    length: u64,
    buffer_size: usize,
) -> Result<u64, CopyError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    if length == 0 {
        return Ok(0);
    }
    if buffer_size == 0 {
        return Err(CopyError::InvalidBufferSize);
    }

    let capacity = usize::try_from(length).map_or(buffer_size, |len| len.min(buffer_size));
    let mut buffer = vec![0u8; capacity];
    let mut copied = 0u64;

    while copied < length {
        // Fits in usize: bounded by `capacity`.
        let chunk = (length - copied).min(capacity as u64) as usize;
        let slice = &mut buffer[..chunk];

        fill_chunk(input, slice, copied, length)?;
        output
            .write_all(slice)
            .map_err(|source| CopyError::Write { copied, source })?;
        copied += chunk as u64;
    }

    debug!(copied, buffer_size, "bounded copy finished");
    Ok(copied)
}

/// Copy everything from `input` to `output` until end of input.
pub fn copy_stream<R, W>(input: &mut R, output: &mut W) -> Result<u64, CopyError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buffer = vec![0u8; DEFAULT_BUFFER_SIZE];
    let mut copied = 0u64;

    loop {
        let bytes_read = match input.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(source) => return Err(CopyError::Read { copied, source }),
        };
        output
            .write_all(&buffer[..bytes_read])
            .map_err(|source| CopyError::Write { copied, source })?;
        copied += bytes_read as u64;
    }

    debug!(copied, "stream copy finished");
    Ok(copied)
}

/// Read until `chunk` is full. Partial reads are continued, `Interrupted` is retried.
fn fill_chunk<R>(input: &mut R, chunk: &mut [u8], copied: u64, expected: u64) -> Result<(), CopyError>
where
    R: Read + ?Sized,
{
    let mut filled = 0;
    while filled < chunk.len() {
        match input.read(&mut chunk[filled..]) {
            Ok(0) => return Err(CopyError::ShortRead { copied, expected }),
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(source) => return Err(CopyError::Read { copied, source }),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Hands out one byte per call and fails with `Interrupted` every other call.
    struct Trickle {
        data: Vec<u8>,
        pos: usize,
        interrupt: bool,
    }

    impl Read for Trickle {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.interrupt = !self.interrupt;
            if self.interrupt {
                return Err(io::ErrorKind::Interrupted.into());
            }
            if self.pos == self.data.len() || buf.is_empty() {
                return Ok(0);
            }
            buf[0] = self.data[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    #[test]
    fn zero_length_skips_buffer_validation() {
        let mut input = Cursor::new(vec![1u8, 2, 3]);
        let mut output = Vec::new();
        assert_eq!(copy_exact(&mut input, &mut output, 0, 0).unwrap(), 0);
        assert_eq!(input.position(), 0);
    }

    #[test]
    fn zero_buffer_is_rejected() {
        let mut input = Cursor::new(vec![1u8, 2, 3]);
        let mut output = Vec::new();
        let err = copy_exact(&mut input, &mut output, 3, 0).unwrap_err();
        assert!(matches!(err, CopyError::InvalidBufferSize));
    }

    #[test]
    fn trickling_reader_is_drained_per_chunk() {
        let data: Vec<u8> = (0..9).collect();
        let mut input = Trickle {
            data: data.clone(),
            pos: 0,
            interrupt: false,
        };
        let mut output = Vec::new();

        assert_eq!(copy_exact(&mut input, &mut output, 9, 4).unwrap(), 9);
        assert_eq!(output, data);
    }

    #[test]
    fn leaves_unrequested_input_in_place() {
        let mut input = Cursor::new(b"headerbody".to_vec());
        let mut output = Vec::new();
        copy_exact(&mut input, &mut output, 6, 4).unwrap();
        assert_eq!(output, b"header");
        assert_eq!(input.position(), 6);
    }

    #[test]
    fn copy_stream_drains_input() {
        let data = vec![7u8; DEFAULT_BUFFER_SIZE * 2 + 5];
        let mut input = Cursor::new(data.clone());
        let mut output = Vec::new();
        assert_eq!(
            copy_stream(&mut input, &mut output).unwrap(),
            data.len() as u64
        );
        assert_eq!(output, data);
    }
}
