use std::fmt;

/// A response status used for link matching and scenario ordering.
///
/// `Default` models the OpenAPI `"default"` response key. It is declared last
/// so the derived ordering places it after every concrete code, which is what
/// the scenario comparator relies on for its tie-break.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum StatusCode {
    Code(u16),
    Default,
}

impl StatusCode {
    /// Parse a response key: `"default"` (any case) or a numeric code.
    pub fn parse(raw: &str) -> Option<StatusCode> {
        if raw.eq_ignore_ascii_case("default") {
            return Some(StatusCode::Default);
        }
        raw.parse::<u16>().ok().map(StatusCode::Code)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusCode::Code(code) => write!(f, "{code}"),
            StatusCode::Default => write!(f, "default"),
        }
    }
}
