use crate::error::LinkError;
use crate::types::{AnyValue, OperationRef, StatusCode};

pub(crate) const METHOD_KEYS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
    Auto,
}

/// Read-only accessor over a raw OpenAPI document value.
///
/// This crate does not own an OpenAPI object model; it navigates the parsed
/// document directly and exposes only what link processing needs: the link
/// nodes themselves, operation lookup by id or by (path, method), the first
/// declared response status, and the reusable-links registry.
#[derive(Debug, Clone)]
pub struct Document {
    name: Option<String>,
    root: AnyValue,
}

/// One raw link node together with the operation + status it was declared under.
#[derive(Debug, Clone)]
pub struct DocumentLink<'a> {
    pub owner: OperationRef,
    pub name: String,
    pub node: &'a AnyValue,
}

/// A resolved operation: where it lives and its first declared response status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationInfo {
    pub path: String,
    pub method: String,
    pub operation_id: Option<String>,
    pub first_status: StatusCode,
}

impl Document {
    pub fn new(root: AnyValue) -> Self {
        Self { name: None, root }
    }

    pub fn with_name(name: impl Into<String>, root: AnyValue) -> Self {
        Self {
            name: Some(name.into()),
            root,
        }
    }

    pub fn from_str(input: &str, format: DocumentFormat) -> Result<Self, LinkError> {
        let root = parse_value(input, format)?;
        Ok(Self::new(root))
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Every link node in the document, with its owning operation reference.
    pub fn links(&self) -> Vec<DocumentLink<'_>> {
        let mut out = Vec::new();
        let Some(paths) = self.root.get("paths").and_then(|v| v.as_object()) else {
            return out;
        };
        for (path, item) in paths {
            let Some(item_obj) = item.as_object() else {
                continue;
            };
            for method in METHOD_KEYS {
                let Some(op) = item_obj.get(method) else {
                    continue;
                };
                let operation_id = op
                    .get("operationId")
                    .and_then(|v| v.as_str())
                    .map(str::to_string);
                let Some(responses) = op.get("responses").and_then(|v| v.as_object()) else {
                    continue;
                };
                for (status_key, response) in responses {
                    let Some(status) = StatusCode::parse(status_key) else {
                        continue;
                    };
                    let Some(links) = response.get("links").and_then(|v| v.as_object()) else {
                        continue;
                    };
                    for (name, node) in links {
                        out.push(DocumentLink {
                            owner: OperationRef::new(path.clone(), method, status)
                                .with_operation_id(operation_id.clone()),
                            name: name.clone(),
                            node,
                        });
                    }
                }
            }
        }
        out
    }

    pub fn find_by_operation_id(&self, operation_id: &str) -> Option<OperationInfo> {
        let paths = self.root.get("paths")?.as_object()?;
        for (path, item) in paths {
            let Some(item_obj) = item.as_object() else {
                continue;
            };
            for method in METHOD_KEYS {
                let Some(op) = item_obj.get(method) else {
                    continue;
                };
                let Some(id) = op.get("operationId").and_then(|v| v.as_str()) else {
                    continue;
                };
                if id == operation_id {
                    return Some(operation_info(path, method, op));
                }
            }
        }
        None
    }

    pub fn find_by_path_method(&self, path: &str, method: &str) -> Option<OperationInfo> {
        let paths = self.root.get("paths")?.as_object()?;
        let item = paths.get(path)?;
        let op = item.get(method.to_lowercase().as_str())?;
        if !op.is_object() {
            return None;
        }
        Some(operation_info(path, &method.to_lowercase(), op))
    }

    /// Reusable link from the `components.links` registry.
    pub fn component_link(&self, name: &str) -> Option<&AnyValue> {
        self.root
            .get("components")?
            .get("links")?
            .as_object()?
            .get(name)
    }
}

fn operation_info(path: &str, method: &str, op: &AnyValue) -> OperationInfo {
    OperationInfo {
        path: path.to_string(),
        method: method.to_uppercase(),
        operation_id: op
            .get("operationId")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        first_status: first_response_status(op),
    }
}

/// First declared response status of an operation, or the `default` sentinel.
fn first_response_status(op: &AnyValue) -> StatusCode {
    op.get("responses")
        .and_then(|v| v.as_object())
        .and_then(|responses| responses.keys().find_map(|key| StatusCode::parse(key)))
        .unwrap_or(StatusCode::Default)
}

fn parse_value(input: &str, format: DocumentFormat) -> Result<AnyValue, LinkError> {
    match format {
        DocumentFormat::Json => serde_json::from_str(input)
            .map_err(|e| LinkError::validation(format!("failed to parse as JSON: {e}"))),
        DocumentFormat::Yaml => serde_yaml::from_str(input)
            .map_err(|e| LinkError::validation(format!("failed to parse as YAML: {e}"))),
        DocumentFormat::Auto => parse_value_auto(input),
    }
}

fn parse_value_auto(input: &str) -> Result<AnyValue, LinkError> {
    // Heuristic: JSON always starts with `{` or `[` after trimming.
    let trimmed = input.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        if let Ok(value) = serde_json::from_str(input) {
            return Ok(value);
        }
    }
    serde_yaml::from_str(input)
        .map_err(|e| LinkError::validation(format!("failed to parse document: {e}")))
}
