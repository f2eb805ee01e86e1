use std::io::{self, ErrorKind, Read};

/// Bytes reads a log stream forward-only and keeps track of how many bytes have been
/// consumed.
///
/// Running out of data is not an error here. Methods report a short read with `None` or
/// `false` so the caller can end its pass cleanly; any other I/O failure is passed on.
pub struct Bytes<R>
where
    R: Read,
{
    reader: R,
    num_read: usize,
    buf: [u8; 1],
}

impl<R> Bytes<R>
where
    R: Read,
{
    pub fn new(reader: R) -> Self {
        Bytes {
            reader,
            num_read: 0,
            buf: [0u8; 1],
        }
    }

    /// Next byte in the stream, or `None` at end-of-stream.
    pub fn next(&mut self) -> Result<Option<u8>, io::Error> {
        loop {
            match self.reader.read(&mut self.buf) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.num_read += 1;
                    return Ok(Some(self.buf[0]));
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
    }

    /// Fill `buf` completely. Returns `false` if the stream ended first, in which case the
    /// contents of `buf` are unspecified.
    pub fn fill(&mut self, buf: &mut [u8]) -> Result<bool, io::Error> {
        if let Err(err) = self.reader.read_exact(buf) {
            if err.kind() == ErrorKind::UnexpectedEof {
                return Ok(false);
            }
            return Err(err);
        }
        self.num_read += buf.len();
        Ok(true)
    }

    /// Read up to `len` bytes. The returned vec is shorter than `len` only if the stream
    /// ended.
    pub fn take(&mut self, len: usize) -> Result<Vec<u8>, io::Error> {
        let mut buf = Vec::with_capacity(len);
        let n = self.reader.by_ref().take(len as u64).read_to_end(&mut buf)?;
        self.num_read += n;
        Ok(buf)
    }

    /// Advance past `len` bytes without inspecting them. Returns `false` if the stream
    /// ended first.
    pub fn skip(&mut self, len: usize) -> Result<bool, io::Error> {
        let n = io::copy(&mut self.reader.by_ref().take(len as u64), &mut io::sink())?;
        self.num_read += usize::try_from(n).unwrap_or(len);
        Ok(n == len as u64)
    }

    /// Number of bytes consumed so far.
    pub fn offset(&self) -> usize {
        self.num_read
    }
}
