use http::{HeaderName, HeaderValue, Method, StatusCode, Version};

use crate::util::compare_lowercase_ascii;

pub(crate) trait MethodExt {
    fn allows_response_body(&self) -> bool;
}

impl MethodExt for Method {
    fn allows_response_body(&self) -> bool {
        // https://datatracker.ietf.org/doc/html/rfc2616#section-4.3
        // All responses to the HEAD request method MUST NOT include a message-body.
        self != Method::HEAD
    }
}

pub(crate) trait HeaderIterExt {
    fn has(self, key: &str, value: &str) -> bool;
    fn has_expect_100(self) -> bool;
    fn has_chunked(self) -> bool;
}

impl<'a, I: Iterator<Item = (&'a HeaderName, &'a HeaderValue)>> HeaderIterExt for I {
    fn has(self, key: &str, value: &str) -> bool {
        self.filter(|i| i.0 == key)
            .filter_map(|i| i.1.to_str().ok())
            .any(|v| compare_lowercase_ascii(v, value))
    }

    fn has_expect_100(self) -> bool {
        self.has("expect", "100-continue")
    }

    fn has_chunked(self) -> bool {
        // Header can repeat and be a comma separated list.
        self.filter(|i| i.0 == "transfer-encoding")
            .filter_map(|i| i.1.to_str().ok())
            .flat_map(|v| v.split(','))
            .any(|v| compare_lowercase_ascii(v.trim(), "chunked"))
    }
}

pub(crate) trait StatusExt {
    /// 1xx, 204 and 304 never carry a body.
    fn forbids_body(&self) -> bool;
}

impl StatusExt for StatusCode {
    fn forbids_body(&self) -> bool {
        self.is_informational()
            || *self == StatusCode::NO_CONTENT
            || *self == StatusCode::NOT_MODIFIED
    }
}

pub(crate) trait VersionExt {
    fn as_protocol(&self) -> &'static str;
}

impl VersionExt for Version {
    fn as_protocol(&self) -> &'static str {
        if *self == Version::HTTP_09 {
            "HTTP/0.9"
        } else if *self == Version::HTTP_10 {
            "HTTP/1.0"
        } else if *self == Version::HTTP_2 {
            "HTTP/2.0"
        } else if *self == Version::HTTP_3 {
            "HTTP/3.0"
        } else {
            "HTTP/1.1"
        }
    }
}
