use std::sync::OnceLock;

use crate::app::Application;
use crate::config::ServerConfig;
use crate::conn::PseudoConnection;
use crate::environ::PeerAddr;
use crate::handler::{handle_connection, Server};
use crate::stream::DuplexStream;
use crate::util::preview;
use crate::Error;

/// Returned in place of a response when a transaction fails.
///
/// Deliberately bare: no headers, no blank line, no body.
pub const FALLBACK_RESPONSE: &[u8] = b"HTTP/1.0 500 ERROR";

/// Runs whole HTTP transactions against an application, in-process.
///
/// ```
/// use selfhost::{AppError, Request, Runner, StartResponse};
///
/// fn hello(_req: Request, start: &mut StartResponse) -> Result<Vec<u8>, AppError> {
///     start.start(200, [("content-type", "text/plain")])?;
///     Ok(b"hello".to_vec())
/// }
///
/// let runner = Runner::new(hello);
/// let response = runner.run_transaction(b"GET / HTTP/1.0\r\n\r\n");
///
/// assert!(response.starts_with(b"HTTP/1.0 200 OK\r\n"));
/// assert!(response.ends_with(b"\r\n\r\nhello"));
/// ```
#[derive(Debug)]
pub struct Runner<A> {
    server: Server<A>,
    peer: PeerAddr,
}

impl<A: Application> Runner<A> {
    pub fn new(app: A) -> Self {
        Self::with_config(app, ServerConfig::default())
    }

    pub fn with_config(app: A, config: ServerConfig) -> Self {
        Runner {
            server: Server::new(app, config),
            peer: PeerAddr::placeholder(),
        }
    }

    pub fn config(&self) -> &ServerConfig {
        self.server.config()
    }

    pub fn server(&self) -> &Server<A> {
        &self.server
    }

    /// Feed the raw request to the application and return the raw response.
    ///
    /// Never fails. Any error is logged and [`FALLBACK_RESPONSE`] returned.
    pub fn run_transaction(&self, request: &[u8]) -> Vec<u8> {
        match self.try_run_transaction(request) {
            Ok(v) => v,
            Err(e) => {
                error!("Transaction failed: {}", e.report());
                FALLBACK_RESPONSE.to_vec()
            }
        }
    }

    /// Like [`Runner::run_transaction`] but hands back the error.
    pub fn try_run_transaction(&self, request: &[u8]) -> Result<Vec<u8>, Error> {
        let config = self.server.config();

        debug!("Request: {}", preview(request, config.preview_len));

        let stream = DuplexStream::new(request);

        let mut conn = if config.is_strict_socket() {
            PseudoConnection::strict(&stream)
        } else {
            PseudoConnection::new(&stream)
        };

        handle_connection(&mut conn, &self.peer, &self.server)?;

        let response = stream.into_written();

        debug!("Response: {}", preview(&response, config.preview_len));

        Ok(response)
    }
}

/// A [`Runner`] created on first use, for keeping in a `static`.
///
/// Initialization happens at most once, also when many threads race for it.
/// A failed initialization is remembered and every later transaction answers
/// with [`FALLBACK_RESPONSE`].
///
/// Transactions themselves share nothing but the runner, so they can run
/// concurrently when the application allows it.
///
/// ```
/// use selfhost::{AppError, HandlerFn, LazyRunner, Request, Runner, StartResponse};
///
/// fn hello(_req: Request, start: &mut StartResponse) -> Result<Vec<u8>, AppError> {
///     start.start(200, Vec::<(&str, &str)>::new())?;
///     Ok(vec![])
/// }
///
/// static RUNNER: LazyRunner<HandlerFn> = LazyRunner::new(|| Ok(Runner::new(hello as HandlerFn)));
///
/// let response = RUNNER.run_transaction(b"GET / HTTP/1.0\r\n\r\n");
/// assert!(response.starts_with(b"HTTP/1.0 200 OK\r\n"));
/// assert!(RUNNER.is_initialized());
/// ```
pub struct LazyRunner<A> {
    init: fn() -> Result<Runner<A>, Error>,
    cell: OnceLock<Result<Runner<A>, String>>,
}

impl<A: Application> LazyRunner<A> {
    pub const fn new(init: fn() -> Result<Runner<A>, Error>) -> Self {
        LazyRunner {
            init,
            cell: OnceLock::new(),
        }
    }

    /// The runner, creating it if this is the first call.
    pub fn get(&self) -> Result<&Runner<A>, Error> {
        let result = self.cell.get_or_init(|| {
            info!("Initializing server");
            (self.init)().map_err(|e| {
                error!("Server init failed: {}", e.report());
                e.to_string()
            })
        });

        result.as_ref().map_err(|e| Error::Init(e.clone()))
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Same as [`Runner::run_transaction`] on the lazily created runner.
    pub fn run_transaction(&self, request: &[u8]) -> Vec<u8> {
        match self.get() {
            Ok(runner) => runner.run_transaction(request),
            Err(e) => {
                error!("Transaction failed: {}", e);
                FALLBACK_RESPONSE.to_vec()
            }
        }
    }
}
