use std::fmt;
use std::io::{self, Write};

use http::header::CONTENT_LENGTH;
use http::HeaderMap;

use crate::chunk::{write_chunked, Dechunker};
use crate::ext::HeaderIterExt;
use crate::Error;

/// How the request body is delimited.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum BodyReader {
    /// No framing header, or a zero content-length.
    NoBody,
    /// Delimited by content-length.
    /// The value is what's left to receive.
    LengthDelimited(u64),
    /// Chunked transfer encoding
    Chunked(Dechunker),
}

impl BodyReader {
    pub fn for_request(http10: bool, headers: &HeaderMap) -> Result<Self, Error> {
        let mut content_length: Option<u64> = None;

        for value in headers.get_all(CONTENT_LENGTH) {
            if content_length.is_some() {
                return Err(Error::TooManyContentLengthHeaders);
            }
            let v = value
                .to_str()
                .ok()
                .and_then(|s| s.trim().parse::<u64>().ok())
                .ok_or(Error::BadContentLengthHeader)?;
            content_length = Some(v);
        }

        if !http10 && headers.iter().has_chunked() {
            // https://datatracker.ietf.org/doc/html/rfc2616#section-4.4
            // Messages MUST NOT include both a Content-Length header field and a
            // non-identity transfer-coding. If the message does include a non-
            // identity transfer-coding, the Content-Length MUST be ignored.
            return Ok(Self::Chunked(Dechunker::new()));
        }

        // Request bodies cannot be close delimited (even under http10).
        let reader = match content_length {
            None | Some(0) => Self::NoBody,
            Some(len) => Self::LengthDelimited(len),
        };

        Ok(reader)
    }

    pub fn read(&mut self, src: &[u8], dst: &mut [u8]) -> Result<(usize, usize), Error> {
        trace!("Read body");

        let part = match self {
            BodyReader::LengthDelimited(_) => self.read_limit(src, dst),
            BodyReader::Chunked(_) => self.read_chunked(src, dst),
            BodyReader::NoBody => return Ok((0, 0)),
        }?;

        Ok(part)
    }

    fn read_limit(&mut self, src: &[u8], dst: &mut [u8]) -> Result<(usize, usize), Error> {
        let Self::LengthDelimited(left) = self else {
            unreachable!()
        };
        let left_usize = (*left).min(usize::MAX as u64) as usize;

        let to_read = src.len().min(dst.len()).min(left_usize);

        dst[..to_read].copy_from_slice(&src[..to_read]);

        *left -= to_read as u64;

        Ok((to_read, to_read))
    }

    fn read_chunked(&mut self, src: &[u8], dst: &mut [u8]) -> Result<(usize, usize), Error> {
        let BodyReader::Chunked(dechunker) = self else {
            unreachable!();
        };

        let (input_used, output_used) = dechunker.parse_input(src, dst)?;

        trace!("Read chunked: {}", input_used);

        Ok((input_used, output_used))
    }

    pub fn is_ended(&self) -> bool {
        match self {
            BodyReader::NoBody => true,
            BodyReader::LengthDelimited(v) => *v == 0,
            BodyReader::Chunked(v) => v.is_ended(),
        }
    }

    /// The error to report when input ends before the body.
    pub fn ended_early(&self) -> Error {
        match self {
            BodyReader::LengthDelimited(_) => Error::BodyShorterThanContentLength,
            _ => Error::IncompleteRequest,
        }
    }
}

impl fmt::Debug for BodyReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoBody => write!(f, "NoBody"),
            Self::LengthDelimited(arg0) => f.debug_tuple("LengthDelimited").field(arg0).finish(),
            Self::Chunked(_) => write!(f, "Chunked"),
        }
    }
}

/// How the response body is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BodyWriter {
    /// HEAD requests, 1xx, 204 and 304.
    NoBody,
    /// Body follows a content-length header.
    Sized,
    /// Chunked transfer encoding.
    Chunked,
}

impl BodyWriter {
    pub fn write(&self, body: &[u8], w: &mut dyn Write) -> io::Result<()> {
        match self {
            BodyWriter::NoBody => Ok(()),
            BodyWriter::Sized => w.write_all(body),
            BodyWriter::Chunked => write_chunked(body, w),
        }
    }
}
