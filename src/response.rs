use std::io::Write;

use http::header::{CONTENT_LENGTH, CONTENT_TYPE, DATE, SERVER, TRANSFER_ENCODING};
use http::{HeaderMap, HeaderValue, Method, StatusCode};

use crate::body::BodyWriter;
use crate::config::ServerConfig;
use crate::ext::{HeaderIterExt, MethodExt, StatusExt, VersionExt};
use crate::Error;

/// Write status line, headers and body of a response.
///
/// Headers are written in the order the application gave them, followed by
/// `content-length`, `server` and `date` when those are missing.
pub(crate) fn write_response(
    w: &mut dyn Write,
    config: &ServerConfig,
    method: &Method,
    status: StatusCode,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<(), Error> {
    let has_body = !status.forbids_body() && method.allows_response_body();
    let chunked =
        has_body && config.version == http::Version::HTTP_11 && headers.iter().has_chunked();

    let writer = if !has_body {
        BodyWriter::NoBody
    } else if chunked {
        BodyWriter::Chunked
    } else {
        BodyWriter::Sized
    };

    trace!("Response {} with body {:?}", status, writer);

    write!(
        w,
        "{} {} {}\r\n",
        config.version.as_protocol(),
        status.as_u16(),
        status.canonical_reason().unwrap_or("")
    )?;

    for (name, value) in headers {
        if *name == TRANSFER_ENCODING && !chunked {
            // Unless chunked, the body goes out with a content-length.
            continue;
        }
        if *name == CONTENT_LENGTH && chunked {
            // Never both framings at once.
            continue;
        }
        write_header(w, name.as_str(), value)?;
    }

    // HEAD still announces the length of the body it would have had.
    let wants_length = !status.forbids_body() && !chunked;

    if wants_length && !headers.contains_key(CONTENT_LENGTH) {
        write!(w, "content-length: {}\r\n", body.len())?;
    }

    if let Some(server) = &config.server_header {
        if !headers.contains_key(SERVER) {
            write!(w, "server: {}\r\n", server)?;
        }
    }

    if config.date_header && !headers.contains_key(DATE) {
        write!(w, "date: {}\r\n", http_date())?;
    }

    w.write_all(b"\r\n")?;

    writer.write(body, w)?;

    Ok(())
}

fn write_header(w: &mut dyn Write, name: &str, value: &HeaderValue) -> Result<(), Error> {
    w.write_all(name.as_bytes())?;
    w.write_all(b": ")?;
    w.write_all(value.as_bytes())?;
    w.write_all(b"\r\n")?;
    Ok(())
}

/// Error page for requests that could not be handled.
pub(crate) fn write_error(
    w: &mut dyn Write,
    config: &ServerConfig,
    status: StatusCode,
    message: &str,
) -> Result<(), Error> {
    let body = format!(
        "<html><head><title>Error response</title></head>\
        <body><h1>Error response</h1>\
        <p>Error code {}.</p><p>Message: {}.</p></body></html>\n",
        status.as_u16(),
        escape_html(message),
    );

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/html"));
    headers.insert("connection", HeaderValue::from_static("close"));

    write_response(w, config, &Method::GET, status, &headers, body.as_bytes())
}

/// Interim response before reading a body announced with `expect: 100-continue`.
pub(crate) fn write_continue(w: &mut dyn Write) -> Result<(), Error> {
    w.write_all(b"HTTP/1.1 100 Continue\r\n\r\n")?;
    Ok(())
}

/// Current time as an RFC 1123 date.
fn http_date() -> String {
    chrono::Utc::now()
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
