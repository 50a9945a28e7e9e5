use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};

use crate::{AppError, Error};

/// A parsed request as handed to the application.
///
/// The [`Environ`][crate::Environ] is available in the extensions.
pub type Request = http::Request<Vec<u8>>;

/// Plain function usable as [`Application`], handy for `static` holders.
pub type HandlerFn = fn(Request, &mut StartResponse) -> Result<Vec<u8>, AppError>;

/// The application driven by a transaction.
///
/// The application must call [`StartResponse::start`] exactly once with the
/// status and headers, and return the response body.
pub trait Application {
    fn handle(&self, request: Request, start: &mut StartResponse) -> Result<Vec<u8>, AppError>;
}

impl<F> Application for F
where
    F: Fn(Request, &mut StartResponse) -> Result<Vec<u8>, AppError>,
{
    fn handle(&self, request: Request, start: &mut StartResponse) -> Result<Vec<u8>, AppError> {
        (self)(request, start)
    }
}

/// Response-start callback given to the application.
#[derive(Debug, Default)]
pub struct StartResponse {
    head: Option<(StatusCode, HeaderMap)>,
}

impl StartResponse {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Set status and headers of the response.
    ///
    /// Fails for an invalid status code or header, and if called twice.
    pub fn start<I, K, V>(&mut self, status: u16, headers: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<[u8]>,
    {
        if self.head.is_some() {
            return Err(Error::ResponseAlreadyStarted);
        }

        let status = StatusCode::from_u16(status).map_err(|_| Error::BadStatus(status))?;

        let mut map = HeaderMap::new();

        for (name, value) in headers {
            let name = name.as_ref();
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| Error::BadHeader(name.to_string()))?;
            // HeaderValue refuses CR and LF, which keeps the head intact.
            let header_value = HeaderValue::from_bytes(value.as_ref())
                .map_err(|_| Error::BadHeader(format!("value of {}", name)))?;
            map.append(header_name, header_value);
        }

        self.head = Some((status, map));

        Ok(())
    }

    pub fn is_started(&self) -> bool {
        self.head.is_some()
    }

    pub(crate) fn take(&mut self) -> Option<(StatusCode, HeaderMap)> {
        self.head.take()
    }
}
