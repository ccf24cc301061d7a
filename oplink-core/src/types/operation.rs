use std::fmt;

use crate::types::StatusCode;

/// Identity of one (operation, response status) pair.
///
/// Used both as a dependency-graph node and as a matching key, so equality is
/// structural over all fields. The method is stored upper-cased.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct OperationRef {
    pub path: String,
    pub method: String,
    pub status: StatusCode,
    pub operation_id: Option<String>,
}

impl OperationRef {
    pub fn new(path: impl Into<String>, method: impl Into<String>, status: StatusCode) -> Self {
        Self {
            path: path.into(),
            method: method.into().to_uppercase(),
            status,
            operation_id: None,
        }
    }

    pub fn with_operation_id(mut self, operation_id: Option<String>) -> Self {
        self.operation_id = operation_id;
        self
    }

    /// Path compares exactly, method case-insensitively, status exactly.
    pub fn matches(&self, path: &str, method: &str, status: StatusCode) -> bool {
        self.path == path && self.method.eq_ignore_ascii_case(method) && self.status == status
    }

    /// Operation-granularity key: `operationId` when known, else `"<path> <method>"`.
    pub fn operation_key(&self) -> String {
        match &self.operation_id {
            Some(id) => id.clone(),
            None => format!("{} {}", self.path, self.method),
        }
    }
}

impl fmt::Display for OperationRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(id) = &self.operation_id {
            write!(f, "Operation: {id} ")?;
        }
        write!(f, "{} {} -> [{}]", self.method, self.path, self.status)
    }
}
