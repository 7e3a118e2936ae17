//! Request-target parsing: path / query split and percent-decoding.
//!
//! Only what the router needs: no allocation, values capped at
//! [`MAX_VALUE_LEN`] bytes after decoding.

use heapless::{String, Vec};

/// Longest decoded query value accepted ("1,2,3,4,5,6,7,8" is 15).
pub const MAX_VALUE_LEN: usize = 64;

pub type QueryValue = String<MAX_VALUE_LEN>;

/// Split a request target into `(path, query)`.  The query excludes the `?`
/// and is empty when absent.  A fragment, if any, is dropped.
pub fn split_target(uri: &str) -> (&str, &str) {
    let uri = uri.split_once('#').map_or(uri, |(before, _)| before);
    uri.split_once('?').unwrap_or((uri, ""))
}

/// Raw (still encoded) value of the first `key` parameter in `query`.
///
/// `key` without `=` yields an empty value.
pub fn raw_param<'a>(query: &'a str, key: &str) -> Option<&'a str> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

/// Decoded value of the first `key` parameter.
///
/// `Some(Err(()))` when the parameter is present but does not decode
/// (too long, bad UTF-8).
pub fn param(query: &str, key: &str) -> Option<Result<QueryValue, ()>> {
    raw_param(query, key).map(percent_decode)
}

/// Decode `%XX` escapes and `+` (space).  A `%` not followed by two hex
/// digits is kept verbatim.
pub fn percent_decode(raw: &str) -> Result<QueryValue, ()> {
    let bytes = raw.as_bytes();
    let mut out: Vec<u8, MAX_VALUE_LEN> = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let b = match bytes[i] {
            b'+' => b' ',
            b'%' => {
                match (hex(bytes.get(i + 1)), hex(bytes.get(i + 2))) {
                    (Some(hi), Some(lo)) => {
                        i += 2;
                        (hi << 4) | lo
                    }
                    _ => b'%',
                }
            }
            other => other,
        };
        out.push(b).map_err(|_| ())?;
        i += 1;
    }

    let text = core::str::from_utf8(&out).map_err(|_| ())?;
    let mut value = QueryValue::new();
    value.push_str(text).map_err(|_| ())?;
    Ok(value)
}

fn hex(b: Option<&u8>) -> Option<u8> {
    match *b? {
        c @ b'0'..=b'9' => Some(c - b'0'),
        c @ b'a'..=b'f' => Some(c - b'a' + 10),
        c @ b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}
