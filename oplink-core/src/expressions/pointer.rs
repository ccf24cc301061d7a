//! RFC 6901 JSON-pointer token escaping.
//!
//! Used in two places: decoding the path segment of an `operationRef`
//! fragment, and escaping values substituted into path segments so a literal
//! `/` or `~` cannot break the generated path.

/// Escape a token: `~` -> `~0`, `/` -> `~1`. `~` must be replaced first.
pub fn escape_token(raw: &str) -> String {
    raw.replace('~', "~0").replace('/', "~1")
}

/// Decode an escaped token: `~1` -> `/`, then `~0` -> `~`.
pub fn unescape_token(escaped: &str) -> String {
    escaped.replace("~1", "/").replace("~0", "~")
}
