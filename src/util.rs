use std::borrow::Cow;

pub(crate) fn find_crlf(b: &[u8]) -> Option<usize> {
    let cr = b.iter().position(|c| *c == b'\r')?;
    let maybe_lf = b.get(cr + 1)?;
    (*maybe_lf == b'\n').then_some(cr)
}

pub(crate) fn compare_lowercase_ascii(a: &str, lowercased: &str) -> bool {
    if a.len() != lowercased.len() {
        return false;
    }

    for (a, b) in a.chars().zip(lowercased.chars()) {
        if !a.is_ascii() {
            return false;
        }
        let norm = a.to_ascii_lowercase();
        if norm != b {
            return false;
        }
    }

    true
}

/// The first `max` bytes as text, for log lines.
pub(crate) fn preview(bytes: &[u8], max: usize) -> Cow<'_, str> {
    let end = bytes.len().min(max);
    String::from_utf8_lossy(&bytes[..end])
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_find_crlf() {
        assert_eq!(find_crlf(b"\r"), None);
        assert_eq!(find_crlf(b"\r\n"), Some(0));
        assert_eq!(find_crlf(b" \r"), None);
        assert_eq!(find_crlf(b" \r\n"), Some(1));
    }

    #[test]
    fn test_compare_lowercase() {
        assert!(compare_lowercase_ascii("Chunked", "chunked"));
        assert!(compare_lowercase_ascii("100-Continue", "100-continue"));
        assert!(!compare_lowercase_ascii("chunk", "chunked"));
    }

    #[test]
    fn test_preview() {
        assert_eq!(preview(b"GET / HTTP/1.1", 3), "GET");
        assert_eq!(preview(b"short", 200), "short");
        assert_eq!(preview(&[0xff, b'a'], 200), "\u{fffd}a");
    }
}
