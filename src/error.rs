use std::error::Error as StdError;
use std::io;

use thiserror::Error;

/// Error type returned by an [`Application`][crate::Application].
pub type AppError = Box<dyn StdError + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("http parse fail: {0}")]
    HttpParseFail(String),

    #[error("unsupported http version")]
    UnsupportedVersion,

    #[error("input ended before full request")]
    IncompleteRequest,

    #[error("bad request target: {0}")]
    BadTarget(String),

    #[error("bad header: {0}")]
    BadHeader(String),

    #[error("bad status code: {0}")]
    BadStatus(u16),

    #[error("content-length header not a number")]
    BadContentLengthHeader,

    #[error("more than one content-length header")]
    TooManyContentLengthHeaders,

    #[error("chunk length is not ascii")]
    ChunkLenNotAscii,

    #[error("chunk length cannot be read as a number")]
    ChunkLenNotANumber,

    #[error("chunk expected crlf as next character")]
    ChunkExpectedCrLf,

    #[error("input ended before content-length bytes of body")]
    BodyShorterThanContentLength,

    #[error("{0} not applicable in this transport")]
    NotApplicable(&'static str),

    #[error("application did not start a response")]
    ResponseNotStarted,

    #[error("application started the response twice")]
    ResponseAlreadyStarted,

    #[error("application: {0}")]
    Application(AppError),

    #[error("application panicked: {0}")]
    ApplicationPanic(String),

    #[error("server init: {0}")]
    Init(String),
}

impl From<httparse::Error> for Error {
    fn from(value: httparse::Error) -> Self {
        match value {
            httparse::Error::Version => Error::UnsupportedVersion,
            _ => Error::HttpParseFail(value.to_string()),
        }
    }
}

impl Error {
    /// Errors caused by the request bytes. These are answered by an
    /// error response rather than failing the transaction.
    pub(crate) fn is_bad_request(&self) -> bool {
        matches!(
            self,
            Error::HttpParseFail(_)
                | Error::UnsupportedVersion
                | Error::IncompleteRequest
                | Error::BadTarget(_)
                | Error::BadHeader(_)
                | Error::BadContentLengthHeader
                | Error::TooManyContentLengthHeaders
                | Error::ChunkLenNotAscii
                | Error::ChunkLenNotANumber
                | Error::ChunkExpectedCrLf
                | Error::BodyShorterThanContentLength
        )
    }

    /// The error with its entire chain of sources.
    pub(crate) fn report(&self) -> String {
        let mut out = self.to_string();
        // The display of these already includes the wrapped error.
        let mut source = match self {
            Error::Io(e) => e.source(),
            Error::Application(e) => e.source(),
            _ => self.source(),
        };

        while let Some(e) = source {
            out.push_str(": ");
            out.push_str(&e.to_string());
            source = e.source();
        }

        out
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Debug, Error)]
    #[error("outer")]
    struct Outer(#[source] io::Error);

    #[test]
    fn report_includes_sources() {
        let inner = io::Error::new(io::ErrorKind::Other, "inner");
        let e = Error::Application(Box::new(Outer(inner)));
        assert_eq!(e.report(), "application: outer: inner");
    }

    #[test]
    fn httparse_version_is_unsupported() {
        let e: Error = httparse::Error::Version.into();
        assert!(matches!(e, Error::UnsupportedVersion));
        assert!(e.is_bad_request());

        let e: Error = httparse::Error::Token.into();
        assert!(matches!(e, Error::HttpParseFail(_)));
    }

    #[test]
    fn application_errors_are_not_bad_requests() {
        let e = Error::Application("boom".into());
        assert!(!e.is_bad_request());
        assert!(!Error::NotApplicable("set_timeout").is_bad_request());
    }
}
