use std::collections::BTreeMap;

use crate::types::{AnyValue, StatusCode};

/// Interface to the contract-test scenario collaborator.
///
/// A scenario exposes its identity (path pattern, method, response status,
/// optional operation id), its request pattern (which names are declared
/// headers / query parameters, and which path parameters exist), and a
/// value-generation context able to render the path pattern into a concrete
/// path once named values have been added under a namespace.
///
/// Declared header and query names may carry an optional-parameter suffix
/// marker in the underlying pattern; `declares_header` and
/// `declares_query_param` must answer marker-insensitively.
pub trait Scenario {
    fn path(&self) -> &str;
    fn method(&self) -> &str;
    fn status(&self) -> StatusCode;
    fn operation_id(&self) -> Option<&str>;

    fn declares_header(&self, name: &str) -> bool;
    fn declares_query_param(&self, name: &str) -> bool;
    fn path_parameters(&self) -> Vec<PathParameter>;

    /// Add `values` under `namespace` in the value-generation context, then
    /// render the scenario's path pattern into a concrete path.
    fn generate_path(
        &self,
        namespace: &str,
        values: &BTreeMap<String, AnyValue>,
    ) -> Result<String, PathGenerationError>;

    /// Human-readable identification for diagnostics.
    fn description(&self) -> String;

    /// Operation-granularity key: `operationId` when known, else `"<path> <method>"`.
    fn operation_key(&self) -> String {
        match self.operation_id() {
            Some(id) => id.to_string(),
            None => format!("{} {}", self.path(), self.method()),
        }
    }
}

/// A named path parameter declared on a scenario's path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParameter {
    pub name: String,
    pub mandatory: bool,
}

impl PathParameter {
    pub fn mandatory(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mandatory: true,
        }
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mandatory: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to generate path from pattern '{pattern}': {message}")]
pub struct PathGenerationError {
    pub pattern: String,
    pub message: String,
}

impl PathGenerationError {
    pub fn new(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            message: message.into(),
        }
    }
}
