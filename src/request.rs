use std::io;

use http::{HeaderMap, HeaderName, HeaderValue, Method, Uri, Version};

use crate::body::BodyReader;
use crate::fill::FillMoreBuffer;
use crate::Error;

const MAX_HEADERS: usize = 100;

/// Size of the scratch buffer body bytes are decoded into.
const BODY_BUFFER_SIZE: usize = 8 * 1024;

/// Reads one request, head then body, off a reader.
pub(crate) struct RequestReader<R> {
    buffer: FillMoreBuffer<R>,
}

impl<R: io::Read> RequestReader<R> {
    pub fn new(reader: R) -> Self {
        RequestReader {
            buffer: FillMoreBuffer::new(reader),
        }
    }

    /// Read the request line and headers.
    ///
    /// `None` if the input ended without a single byte.
    pub fn read_head(&mut self) -> Result<Option<http::Request<()>>, Error> {
        loop {
            self.buffer.fill_more()?;
            let ended = self.buffer.is_ended();
            let input = self.buffer.input();

            if input.is_empty() {
                if ended {
                    return Ok(None);
                }
                continue;
            }

            let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
            let mut r = httparse::Request::new(&mut headers);

            let input_used = match r.parse(input)? {
                httparse::Status::Complete(v) => v,
                httparse::Status::Partial => {
                    if ended {
                        // Input stream stopped before we got the entire head.
                        return Err(Error::IncompleteRequest);
                    }
                    continue;
                }
            };

            let head = to_head(&r)?;

            self.buffer.consume(input_used);

            return Ok(Some(head));
        }
    }

    /// Read the body following the head.
    pub fn read_body(&mut self, head: &http::Request<()>) -> Result<Vec<u8>, Error> {
        let http10 = head.version() == Version::HTTP_10;
        let mut reader = BodyReader::for_request(http10, head.headers())?;

        debug!("Request body: {:?}", reader);

        let mut body = Vec::new();
        let mut tmp = vec![0_u8; BODY_BUFFER_SIZE];

        while !reader.is_ended() {
            self.buffer.fill_more()?;
            let ended = self.buffer.is_ended();

            let (input_used, output_used) = reader.read(self.buffer.input(), &mut tmp)?;

            body.extend_from_slice(&tmp[..output_used]);
            self.buffer.consume(input_used);

            let no_progress = input_used == 0 && output_used == 0;

            if no_progress && ended && !reader.is_ended() {
                return Err(reader.ended_early());
            }
        }

        Ok(body)
    }
}

fn to_head(r: &httparse::Request<'_, '_>) -> Result<http::Request<()>, Error> {
    let (Some(method), Some(path), Some(version)) = (r.method, r.path, r.version) else {
        return Err(Error::HttpParseFail("incomplete request line".into()));
    };

    let method = Method::from_bytes(method.as_bytes())
        .map_err(|_| Error::HttpParseFail(format!("bad method: {}", method)))?;

    let uri: Uri = path
        .parse()
        .map_err(|_| Error::BadTarget(path.to_string()))?;

    let version = match version {
        0 => Version::HTTP_10,
        1 => Version::HTTP_11,
        _ => return Err(Error::UnsupportedVersion),
    };

    let mut headers = HeaderMap::with_capacity(r.headers.len());

    for h in r.headers.iter() {
        let name = HeaderName::from_bytes(h.name.as_bytes())
            .map_err(|_| Error::BadHeader(h.name.to_string()))?;
        let value = HeaderValue::from_bytes(h.value)
            .map_err(|_| Error::BadHeader(format!("value of {}", h.name)))?;
        headers.append(name, value);
    }

    let mut head = http::Request::new(());
    *head.method_mut() = method;
    *head.uri_mut() = uri;
    *head.version_mut() = version;
    *head.headers_mut() = headers;

    Ok(head)
}

#[cfg(test)]
mod test {
    use super::*;

    fn read(input: &[u8]) -> Result<Option<(http::Request<()>, Vec<u8>)>, Error> {
        let mut r = RequestReader::new(input);
        let Some(head) = r.read_head()? else {
            return Ok(None);
        };
        let body = r.read_body(&head)?;
        Ok(Some((head, body)))
    }

    #[test]
    fn get_without_body() -> Result<(), Error> {
        let (head, body) = read(b"GET /path?q=1 HTTP/1.1\r\nHost: foo\r\n\r\n")?.unwrap();
        assert_eq!(head.method(), Method::GET);
        assert_eq!(head.uri().path(), "/path");
        assert_eq!(head.uri().query(), Some("q=1"));
        assert_eq!(head.version(), Version::HTTP_11);
        assert_eq!(head.headers()["host"], "foo");
        assert!(body.is_empty());
        Ok(())
    }

    #[test]
    fn post_with_length() -> Result<(), Error> {
        let input = b"POST /login HTTP/1.1\r\nHost: example\r\nContent-Length: 27\r\n\
            Content-Type: application/x-www-form-urlencoded\r\n\r\n\
            userid=joe&password=guessme";
        let (head, body) = read(input)?.unwrap();
        assert_eq!(head.method(), Method::POST);
        assert_eq!(body, b"userid=joe&password=guessme");
        Ok(())
    }

    #[test]
    fn bare_newlines() -> Result<(), Error> {
        let input = b"POST /login HTTP/1.1\nHost: example\nContent-Length: 3\n\nabc";
        let (head, body) = read(input)?.unwrap();
        assert_eq!(head.headers()["content-length"], "3");
        assert_eq!(body, b"abc");
        Ok(())
    }

    #[test]
    fn chunked_body() -> Result<(), Error> {
        let input = b"PUT /x HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n\
            5\r\nhello\r\n6\r\n world\r\n0\r\n\r\n";
        let (_, body) = read(input)?.unwrap();
        assert_eq!(body, b"hello world");
        Ok(())
    }

    #[test]
    fn large_body() -> Result<(), Error> {
        let payload = vec![b'z'; BODY_BUFFER_SIZE * 3 + 11];
        let mut input = format!(
            "POST /big HTTP/1.0\r\nContent-Length: {}\r\n\r\n",
            payload.len()
        )
        .into_bytes();
        input.extend_from_slice(&payload);

        let (head, body) = read(&input)?.unwrap();
        assert_eq!(head.version(), Version::HTTP_10);
        assert_eq!(body, payload);
        Ok(())
    }

    #[test]
    fn empty_input() -> Result<(), Error> {
        assert!(read(b"")?.is_none());
        Ok(())
    }

    #[test]
    fn incomplete_head() {
        let r = read(b"GET /path HTTP/1.1\r\nHost: fo");
        assert!(matches!(r, Err(Error::IncompleteRequest)));
    }

    #[test]
    fn short_body() {
        let r = read(b"POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc");
        assert!(matches!(r, Err(Error::BodyShorterThanContentLength)));
    }

    #[test]
    fn unfinished_chunks() {
        let r = read(b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhel");
        assert!(matches!(r, Err(Error::IncompleteRequest)));
    }

    #[test]
    fn garbage() {
        let r = read(b"\x01\x02 nonsense\r\n\r\n");
        assert!(matches!(r, Err(Error::HttpParseFail(_))));
    }

    #[test]
    fn http2_version() {
        let r = read(b"GET / HTTP/2.0\r\n\r\n");
        assert!(matches!(r, Err(Error::UnsupportedVersion)));
    }
}
