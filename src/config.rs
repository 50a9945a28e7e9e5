use std::time::Duration;

use http::Version;

/// Settings of the in-process server.
///
/// ```
/// use selfhost::ServerConfig;
///
/// let config = ServerConfig::default()
///     .http_11()
///     .server_header(None)
///     .date_header(false);
///
/// assert_eq!(config.version(), selfhost::http::Version::HTTP_11);
/// ```
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub(crate) server_name: String,
    pub(crate) port: u16,
    pub(crate) version: Version,
    pub(crate) server_header: Option<String>,
    pub(crate) date_header: bool,
    pub(crate) timeout: Option<Duration>,
    pub(crate) tcp_nodelay: bool,
    pub(crate) strict_socket: bool,
    pub(crate) passthrough_errors: bool,
    pub(crate) preview_len: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            server_name: "selfhost".to_string(),
            port: 0,
            version: Version::HTTP_10,
            server_header: Some(concat!("selfhost/", env!("CARGO_PKG_VERSION")).to_string()),
            date_header: true,
            timeout: None,
            tcp_nodelay: false,
            strict_socket: false,
            passthrough_errors: true,
            preview_len: 200,
        }
    }
}

impl ServerConfig {
    /// Respond with `HTTP/1.0` status lines. This is the default.
    pub fn http_10(mut self) -> Self {
        self.version = Version::HTTP_10;
        self
    }

    /// Respond with `HTTP/1.1` status lines.
    ///
    /// Enables chunked response bodies and `100 Continue`.
    pub fn http_11(mut self) -> Self {
        self.version = Version::HTTP_11;
        self
    }

    /// `SERVER_NAME` given to the application.
    pub fn server_name(mut self, name: impl Into<String>) -> Self {
        self.server_name = name.into();
        self
    }

    /// `SERVER_PORT` given to the application.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// `server` header added to responses that lack one. `None` to not add any.
    pub fn server_header(mut self, value: Option<&str>) -> Self {
        self.server_header = value.map(|v| v.to_string());
        self
    }

    /// Whether to add a `date` header to responses that lack one.
    pub fn date_header(mut self, enabled: bool) -> Self {
        self.date_header = enabled;
        self
    }

    /// Timeout set on the connection before reading.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Ask the connection to disable Nagle's algorithm before reading.
    pub fn tcp_nodelay(mut self, enabled: bool) -> Self {
        self.tcp_nodelay = enabled;
        self
    }

    /// Fail, rather than ignore, timeouts and socket options on the memory
    /// connection.
    pub fn strict_socket(mut self, enabled: bool) -> Self {
        self.strict_socket = enabled;
        self
    }

    /// When `true`, application failures abort the transaction. When `false`
    /// they are answered with a `500 Internal Server Error` response.
    pub fn passthrough_errors(mut self, enabled: bool) -> Self {
        self.passthrough_errors = enabled;
        self
    }

    /// How many bytes of request and response go into the log preview.
    pub fn preview_len(mut self, len: usize) -> Self {
        self.preview_len = len;
        self
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn is_strict_socket(&self) -> bool {
        self.strict_socket
    }

    pub fn is_passthrough_errors(&self) -> bool {
        self.passthrough_errors
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let c = ServerConfig::default();
        assert_eq!(c.version(), Version::HTTP_10);
        assert_eq!(c.server_name, "selfhost");
        assert_eq!(c.port, 0);
        assert!(c.server_header.as_deref().unwrap().starts_with("selfhost/"));
        assert!(c.date_header);
        assert!(c.timeout.is_none());
        assert!(!c.tcp_nodelay);
        assert!(!c.is_strict_socket());
        assert!(c.is_passthrough_errors());
        assert_eq!(c.preview_len, 200);
    }

    #[test]
    fn chained() {
        let c = ServerConfig::default()
            .http_11()
            .server_name("app.test")
            .port(8080)
            .timeout(Duration::from_secs(1))
            .tcp_nodelay(true)
            .strict_socket(true)
            .passthrough_errors(false)
            .preview_len(10)
            .http_10();
        assert_eq!(c.version(), Version::HTTP_10);
        assert_eq!(c.server_name, "app.test");
        assert_eq!(c.port, 8080);
        assert_eq!(c.timeout, Some(Duration::from_secs(1)));
        assert!(c.tcp_nodelay);
        assert!(c.is_strict_socket());
        assert!(!c.is_passthrough_errors());
        assert_eq!(c.preview_len, 10);
    }
}
