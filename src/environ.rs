use std::collections::BTreeMap;
use std::fmt;

use http::header::{CONTENT_LENGTH, CONTENT_TYPE};
use http::HeaderMap;

use crate::config::ServerConfig;
use crate::ext::VersionExt;

/// Address of the remote end.
///
/// There is no real peer in-process, [`PeerAddr::placeholder`] is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerAddr {
    host: String,
    port: u16,
}

impl PeerAddr {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        PeerAddr {
            host: host.into(),
            port,
        }
    }

    /// `selfhost:0`
    pub fn placeholder() -> Self {
        Self::new("selfhost", 0)
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for PeerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Minimal environment of a request, in the CGI naming tradition.
///
/// Attached to every [`Request`][crate::Request] as an extension.
///
/// | key | value |
/// |-----|-------|
/// | `REQUEST_METHOD` | `GET`, `POST`, ... |
/// | `SCRIPT_NAME` | always empty |
/// | `PATH_INFO` | percent-decoded path of the request target |
/// | `QUERY_STRING` | raw query of the request target, or empty |
/// | `SERVER_NAME`, `SERVER_PORT` | from [`ServerConfig`] |
/// | `SERVER_PROTOCOL` | version of the request |
/// | `REMOTE_ADDR`, `REMOTE_PORT` | the peer |
/// | `CONTENT_TYPE`, `CONTENT_LENGTH` | from headers, or empty |
/// | `HTTP_*` | every other header, repeats joined by `,` |
#[derive(Debug, Clone)]
pub struct Environ {
    vars: BTreeMap<String, String>,
    peer: PeerAddr,
}

impl Environ {
    pub(crate) fn new(head: &http::Request<()>, config: &ServerConfig, peer: &PeerAddr) -> Self {
        let mut vars = BTreeMap::new();
        let uri = head.uri();

        let mut set = |k: &str, v: &str| {
            vars.insert(k.to_string(), v.to_string());
        };

        set("REQUEST_METHOD", head.method().as_str());
        set("SCRIPT_NAME", "");
        set("PATH_INFO", &decode_path(uri.path()));
        set("QUERY_STRING", uri.query().unwrap_or(""));
        set("SERVER_NAME", &config.server_name);
        set("SERVER_PORT", &config.port.to_string());
        set("SERVER_PROTOCOL", head.version().as_protocol());
        set("REMOTE_ADDR", peer.host());
        set("REMOTE_PORT", &peer.port().to_string());
        set("CONTENT_TYPE", &header_value(head.headers(), CONTENT_TYPE.as_str()));
        set(
            "CONTENT_LENGTH",
            &header_value(head.headers(), CONTENT_LENGTH.as_str()),
        );

        for name in head.headers().keys() {
            if *name == CONTENT_TYPE || *name == CONTENT_LENGTH {
                continue;
            }
            let key = format!("HTTP_{}", name.as_str().to_ascii_uppercase().replace('-', "_"));
            set(&key, &header_value(head.headers(), name.as_str()));
        }

        Environ {
            vars,
            peer: peer.clone(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(|v| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn peer(&self) -> &PeerAddr {
        &self.peer
    }

    /// Always false. This is the flag the transport advertises to the
    /// application, not a promise that transactions never overlap.
    pub fn multithread(&self) -> bool {
        false
    }

    /// Never true, everything runs within the calling process.
    pub fn multiprocess(&self) -> bool {
        false
    }

    /// Never true, the application is reused between transactions.
    pub fn run_once(&self) -> bool {
        false
    }
}

/// Percent-decode a path. Bytes that don't form UTF-8 are replaced.
fn decode_path(path: &str) -> String {
    let bytes = urlencoding::decode_binary(path.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}

fn header_value(headers: &HeaderMap, name: &str) -> String {
    let values: Vec<_> = headers
        .get_all(name)
        .iter()
        .map(|v| String::from_utf8_lossy(v.as_bytes()))
        .collect();
    values.join(",")
}
