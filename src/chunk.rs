use std::io::{self, Write};
use std::str;

use crate::util::find_crlf;
use crate::Error;

/// Largest chunk written when chunk encoding a response body.
const DEFAULT_CHUNK_SIZE: usize = 10 * 1024;

/// Decoder of a chunked request body.
///
/// Fed with whatever input is at hand, it decodes as far as it can and
/// reports how much input it consumed and how much output it produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Dechunker {
    /// Expecting a chunk size line, optionally with extensions.
    Size,
    /// Inside chunk data, the value is the number of bytes left.
    Data(usize),
    /// Expecting the CRLF closing chunk data.
    DataEnd,
    /// After the zero sized chunk, skipping trailer lines until an empty one.
    Trailers,
    Ended,
}

/// Longest chunk size line accepted, extensions excluded.
const MAX_SIZE_LINE: usize = 20;

impl Dechunker {
    pub fn new() -> Self {
        Dechunker::Size
    }

    pub fn is_ended(&self) -> bool {
        *self == Dechunker::Ended
    }

    /// Decode from `src` into `dst`. Returns `(input_used, output_used)`.
    pub fn parse_input(&mut self, src: &[u8], dst: &mut [u8]) -> Result<(usize, usize), Error> {
        let mut used_in = 0;
        let mut used_out = 0;

        while let Some((n_in, n_out)) = self.step(&src[used_in..], &mut dst[used_out..])? {
            used_in += n_in;
            used_out += n_out;
        }

        Ok((used_in, used_out))
    }

    /// One state transition. `None` when more input (or output room) is
    /// needed to proceed.
    fn step(&mut self, src: &[u8], dst: &mut [u8]) -> Result<Option<(usize, usize)>, Error> {
        match *self {
            Dechunker::Size => {
                let Some(line_end) = find_crlf(src) else {
                    return Ok(None);
                };
                let size = parse_size(&src[..line_end])?;
                *self = if size == 0 {
                    Dechunker::Trailers
                } else {
                    Dechunker::Data(size)
                };
                Ok(Some((line_end + 2, 0)))
            }

            Dechunker::Data(left) => {
                let n = left.min(src.len()).min(dst.len());
                if n == 0 {
                    return Ok(None);
                }
                dst[..n].copy_from_slice(&src[..n]);
                *self = if n == left {
                    Dechunker::DataEnd
                } else {
                    Dechunker::Data(left - n)
                };
                Ok(Some((n, n)))
            }

            Dechunker::DataEnd => match find_crlf(src) {
                None => Ok(None),
                Some(0) => {
                    *self = Dechunker::Size;
                    Ok(Some((2, 0)))
                }
                Some(_) => Err(Error::ChunkExpectedCrLf),
            },

            Dechunker::Trailers => {
                let Some(line_end) = find_crlf(src) else {
                    return Ok(None);
                };
                if line_end == 0 {
                    *self = Dechunker::Ended;
                } else {
                    trace!("Skip trailer: {}", String::from_utf8_lossy(&src[..line_end]));
                }
                Ok(Some((line_end + 2, 0)))
            }

            Dechunker::Ended => Ok(None),
        }
    }

    #[cfg(test)]
    fn left(&self) -> usize {
        match self {
            Dechunker::Data(left) => *left,
            _ => 0,
        }
    }
}

/// Parse the hex size of a chunk size line, ignoring `;` extensions.
fn parse_size(line: &[u8]) -> Result<usize, Error> {
    let size_part = match line.iter().position(|c| *c == b';') {
        Some(i) => &line[..i],
        None => line,
    };

    if size_part.len() > MAX_SIZE_LINE {
        return Err(Error::ChunkExpectedCrLf);
    }

    let text = str::from_utf8(size_part).map_err(|_| Error::ChunkLenNotAscii)?;

    usize::from_str_radix(text.trim(), 16).map_err(|e| {
        debug!("Chunk size {:?}: {}", text, e);
        Error::ChunkLenNotANumber
    })
}

/// Write an entire body with chunked transfer encoding, including the
/// terminating zero sized chunk.
pub(crate) fn write_chunked(body: &[u8], w: &mut dyn Write) -> io::Result<()> {
    for chunk in body.chunks(DEFAULT_CHUNK_SIZE) {
        // chunk length
        write!(w, "{:x}\r\n", chunk.len())?;

        // chunk
        w.write_all(chunk)?;

        // chunk end
        w.write_all(b"\r\n")?;
    }

    w.write_all(b"0\r\n\r\n")
}
