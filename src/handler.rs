//! Handling of one request over a [`Connection`].

use std::any::Any;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};

use http::header::CONTENT_LENGTH;
use http::{HeaderMap, StatusCode, Version};

use crate::app::{Application, Request, StartResponse};
use crate::config::ServerConfig;
use crate::conn::{Buffering, ChannelMode, CloseChannel, Connection, SocketOption};
use crate::environ::{Environ, PeerAddr};
use crate::ext::HeaderIterExt;
use crate::request::RequestReader;
use crate::response::{write_continue, write_error, write_response};
use crate::Error;

/// An application together with the settings it is served with.
#[derive(Debug)]
pub struct Server<A> {
    app: A,
    config: ServerConfig,
}

impl<A: Application> Server<A> {
    pub fn new(app: A, config: ServerConfig) -> Self {
        Server { app, config }
    }

    pub fn app(&self) -> &A {
        &self.app
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Serve exactly one request on the connection.
///
/// Reads the request from the readable channel, runs the application and
/// writes the response to the writable channel, which is closed afterwards.
/// Malformed requests are answered with an error response. Failures of the
/// application are returned as errors when the server passes errors through,
/// otherwise answered with `500 Internal Server Error`.
pub fn handle_connection<C, A>(
    conn: &mut C,
    peer: &PeerAddr,
    server: &Server<A>,
) -> Result<(), Error>
where
    C: Connection,
    A: Application,
{
    let config = &server.config;

    if let Some(timeout) = config.timeout {
        conn.set_timeout(Some(timeout))?;
    }

    if config.tcp_nodelay {
        conn.set_socket_option(SocketOption::NoDelay(true))?;
    }

    let reader = conn.readable_channel(ChannelMode::Read, Buffering::Default)?;
    let mut writer = conn.writable_channel(ChannelMode::Write, Buffering::Unbuffered)?;

    let result = handle_one_request(reader, &mut writer, peer, server);

    // Close also when handling failed, the first error wins.
    let closed = writer.flush().and_then(|_| writer.close_channel());

    result?;
    closed?;

    Ok(())
}

fn handle_one_request<R, A>(
    reader: R,
    w: &mut dyn Write,
    peer: &PeerAddr,
    server: &Server<A>,
) -> Result<(), Error>
where
    R: io::Read,
    A: Application,
{
    let config = &server.config;
    let mut req = RequestReader::new(reader);

    let head = match req.read_head() {
        Ok(Some(v)) => v,
        Ok(None) => {
            debug!("No request in input");
            return Ok(());
        }
        Err(e) => return reject(w, config, e),
    };

    debug!("{} {} {:?}", head.method(), head.uri(), head.version());

    let headers = head.headers();
    let has_body = headers.contains_key(CONTENT_LENGTH) || headers.iter().has_chunked();
    let expect_100 = has_body && headers.iter().has_expect_100();

    if expect_100 && head.version() == Version::HTTP_11 && config.version == Version::HTTP_11 {
        trace!("Send 100 Continue");
        write_continue(w)?;
    }

    let body = match req.read_body(&head) {
        Ok(v) => v,
        Err(e) => return reject(w, config, e),
    };

    let method = head.method().clone();
    let environ = Environ::new(&head, config, peer);

    let (parts, _) = head.into_parts();
    let mut request = Request::from_parts(parts, body);
    request.extensions_mut().insert(environ);

    match run_application(&server.app, request) {
        Ok((status, headers, body)) => {
            debug!("Response {} ({} bytes body)", status, body.len());
            write_response(w, config, &method, status, &headers, &body)
        }
        Err(e) if config.passthrough_errors => Err(e),
        Err(e) => {
            error!("Application failed: {}", e.report());
            write_error(
                w,
                config,
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
            )
        }
    }
}

/// Answer a malformed request. Anything else is returned as is.
fn reject(w: &mut dyn Write, config: &ServerConfig, e: Error) -> Result<(), Error> {
    if !e.is_bad_request() {
        return Err(e);
    }

    let status = match e {
        Error::UnsupportedVersion => StatusCode::HTTP_VERSION_NOT_SUPPORTED,
        _ => StatusCode::BAD_REQUEST,
    };

    info!("Bad request ({}): {}", status.as_u16(), e);

    write_error(w, config, status, &e.to_string())
}

fn run_application<A: Application>(
    app: &A,
    request: Request,
) -> Result<(StatusCode, HeaderMap, Vec<u8>), Error> {
    let mut start = StartResponse::new();

    let result = panic::catch_unwind(AssertUnwindSafe(|| app.handle(request, &mut start)));

    let body = match result {
        Ok(Ok(v)) => v,
        Ok(Err(e)) => return Err(Error::Application(e)),
        Err(p) => return Err(Error::ApplicationPanic(panic_message(&*p))),
    };

    let (status, headers) = start.take().ok_or(Error::ResponseNotStarted)?;

    Ok((status, headers, body))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
