//! In-process HTTP/1.x transport.
//!
//! Drives a server application with a raw request held in memory and hands
//! back the raw response, without opening any socket.
//!
//! ```
//! use selfhost::{AppError, Environ, Request, Runner, StartResponse};
//!
//! fn login(req: Request, start: &mut StartResponse) -> Result<Vec<u8>, AppError> {
//!     let env = req.extensions().get::<Environ>().unwrap();
//!     assert_eq!(env.get("PATH_INFO"), Some("/login"));
//!
//!     start.start(200, [("content-type", "text/plain")])?;
//!     Ok(b"welcome".to_vec())
//! }
//!
//! let runner = Runner::new(login);
//! let response = runner.run_transaction(b"GET /login HTTP/1.1\r\nHost: example\r\n\r\n");
//!
//! assert!(response.starts_with(b"HTTP/1.0 200 OK\r\n"));
//! assert!(response.ends_with(b"\r\n\r\nwelcome"));
//! ```
//!
//! Whatever goes wrong, [`Runner::run_transaction`] answers with
//! [`FALLBACK_RESPONSE`] and logs the cause through the [`log`] crate.
//! [`diagnostics`] has a file logger for processes lacking one.
//!
//! The pieces underneath are usable on their own: [`stream::DuplexStream`]
//! is the pair of memory buffers, [`conn::PseudoConnection`] presents it as
//! a connection, and [`handler::handle_connection`] serves one request over
//! any [`conn::Connection`].

#[macro_use]
extern crate log;

// Re-export the basis for this library.
pub use http;

mod error;
pub use error::{AppError, Error};

mod body;
mod chunk;
mod ext;
mod fill;
mod util;

pub mod stream;
pub use stream::DuplexStream;

pub mod conn;
pub use conn::{Connection, PseudoConnection};

mod app;
pub use app::{Application, HandlerFn, Request, StartResponse};

mod environ;
pub use environ::{Environ, PeerAddr};

mod config;
pub use config::ServerConfig;

mod request;
mod response;

pub mod handler;
pub use handler::Server;

mod runner;
pub use runner::{LazyRunner, Runner, FALLBACK_RESPONSE};

pub mod diagnostics;
