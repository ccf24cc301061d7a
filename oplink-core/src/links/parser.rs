use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::document::{Document, OperationInfo};
use crate::expressions::{resolve_value, unescape_token, ExpressionLookup};
use crate::outcome::Outcome;
use crate::types::{AnyValue, Link, OperationRef, Server, ServerVariable, StatusCode};

/// `#/paths/<escaped-path>/<method>`; the path token is RFC 6901 escaped, so
/// it contains no literal `/`.
static OPERATION_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#/paths/([^/]+)/([A-Za-z]+)$").expect("valid regex"));

const KNOWN_METHODS: [&str; 8] = [
    "GET", "PUT", "POST", "DELETE", "OPTIONS", "HEAD", "PATCH", "TRACE",
];

const STATUS_CODE_EXTENSION: &str = "x-StatusCode";
const PARTIAL_EXTENSION: &str = "x-Partial";

/// Validate one document link node into an immutable [`Link`].
pub fn parse_link(
    document: &Document,
    owner: &OperationRef,
    name: &str,
    node: &AnyValue,
    lookup: &dyn ExpressionLookup,
) -> Outcome<Link> {
    let node = match dereference(document, node) {
        Ok(n) => n,
        Err(message) => return Outcome::Invalid(message),
    };
    let Some(fields) = node.as_object() else {
        return Outcome::invalid(format!("link '{name}' is not an object"));
    };

    let (target, via_ref) = match resolve_target(document, name, fields) {
        Ok(t) => t,
        Err(message) => return Outcome::Invalid(message),
    };

    let for_status_code = match resolve_status(name, fields, &target) {
        Ok(s) => s,
        Err(message) => return Outcome::Invalid(message),
    };

    let partial = match resolve_partial(name, fields) {
        Ok(p) => p,
        Err(message) => return Outcome::Invalid(message),
    };

    let mut parameters = BTreeMap::new();
    if let Some(raw_params) = fields.get("parameters") {
        let Some(entries) = raw_params.as_object() else {
            return Outcome::invalid(format!("link '{name}': parameters must be an object"));
        };
        for (param_name, raw) in entries {
            match resolve_value(raw, name, lookup).context(format!("parameter '{param_name}'")) {
                Outcome::Ok(value) => {
                    parameters.insert(param_name.clone(), value);
                }
                Outcome::Invalid(m) => return Outcome::Invalid(m),
                Outcome::Faulted(e) => return Outcome::Faulted(e),
            }
        }
    }

    let request_body = match fields.get("requestBody") {
        Some(raw) => match resolve_value(raw, name, lookup).context("requestBody") {
            Outcome::Ok(value) => Some(value),
            Outcome::Invalid(m) => return Outcome::Invalid(m),
            Outcome::Faulted(e) => return Outcome::Faulted(e),
        },
        None => None,
    };

    let server = match fields.get("server") {
        Some(raw) => match resolve_server(name, raw, lookup) {
            Outcome::Ok(server) => Some(server),
            Outcome::Invalid(m) => return Outcome::Invalid(m),
            Outcome::Faulted(e) => return Outcome::Faulted(e),
        },
        None => None,
    };

    let for_operation = via_ref.then(|| {
        OperationRef::new(target.path.clone(), target.method.clone(), for_status_code)
            .with_operation_id(target.operation_id.clone())
    });
    let operation_id = if via_ref {
        None
    } else {
        target.operation_id.clone()
    };

    Outcome::Ok(Link {
        name: name.to_string(),
        for_status_code,
        partial,
        operation_id,
        by_operation: owner.clone(),
        for_operation,
        description: fields
            .get("description")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        server,
        request_body,
        parameters,
        source: document.name().map(str::to_string),
    })
}

/// Follow a `$ref` into the reusable `components.links` registry by name suffix.
fn dereference<'a>(document: &'a Document, node: &'a AnyValue) -> Result<&'a AnyValue, String> {
    let Some(reference) = node.get("$ref").and_then(|v| v.as_str()) else {
        return Ok(node);
    };
    let suffix = reference.rsplit('/').next().unwrap_or(reference);
    document
        .component_link(suffix)
        .ok_or_else(|| format!("unresolvable link reference '{reference}'"))
}

fn resolve_target(
    document: &Document,
    name: &str,
    fields: &serde_json::Map<String, AnyValue>,
) -> Result<(OperationInfo, bool), String> {
    if let Some(reference) = fields.get("operationRef").and_then(|v| v.as_str()) {
        let (path, method) = parse_operation_ref(name, reference)?;
        let info = document.find_by_path_method(&path, &method).ok_or_else(|| {
            format!("link '{name}': operationRef '{reference}' does not resolve to a known operation")
        })?;
        return Ok((info, true));
    }
    if let Some(id) = fields.get("operationId").and_then(|v| v.as_str()) {
        let info = document.find_by_operation_id(id).ok_or_else(|| {
            format!("link '{name}': operationId '{id}' not found in the document")
        })?;
        return Ok((info, false));
    }
    Err(format!(
        "link '{name}' must define operationRef or operationId"
    ))
}

fn parse_operation_ref(name: &str, reference: &str) -> Result<(String, String), String> {
    let captures = OPERATION_REF_RE.captures(reference).ok_or_else(|| {
        format!("link '{name}': operationRef '{reference}' must have the form #/paths/<path>/<method>")
    })?;
    let path = unescape_token(&captures[1]);
    let method = captures[2].to_uppercase();
    if !KNOWN_METHODS.contains(&method.as_str()) {
        return Err(format!(
            "link '{name}': operationRef '{reference}' names unknown HTTP method '{method}'"
        ));
    }
    Ok((path, method))
}

/// Status priority: `x-StatusCode` extension, then the target operation's
/// first declared response status, then the `default` sentinel.
fn resolve_status(
    name: &str,
    fields: &serde_json::Map<String, AnyValue>,
    target: &OperationInfo,
) -> Result<StatusCode, String> {
    let Some(raw) = fields.get(STATUS_CODE_EXTENSION) else {
        return Ok(target.first_status);
    };
    let parsed = match raw {
        AnyValue::String(s) => StatusCode::parse(s),
        AnyValue::Number(n) => n
            .as_u64()
            .and_then(|v| u16::try_from(v).ok())
            .map(StatusCode::Code),
        _ => None,
    };
    parsed.ok_or_else(|| {
        format!("link '{name}': invalid {STATUS_CODE_EXTENSION} value {raw}")
    })
}

fn resolve_partial(
    name: &str,
    fields: &serde_json::Map<String, AnyValue>,
) -> Result<bool, String> {
    let Some(raw) = fields.get(PARTIAL_EXTENSION) else {
        return Ok(false);
    };
    let parsed = match raw {
        AnyValue::Bool(b) => Some(*b),
        AnyValue::String(s) => s.trim().to_lowercase().parse::<bool>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| format!("link '{name}': invalid {PARTIAL_EXTENSION} value {raw}"))
}

fn resolve_server(name: &str, raw: &AnyValue, lookup: &dyn ExpressionLookup) -> Outcome<Server> {
    let Some(fields) = raw.as_object() else {
        return Outcome::invalid(format!("link '{name}': server must be an object"));
    };
    let Some(url_raw) = fields.get("url") else {
        return Outcome::invalid(format!("link '{name}': server requires a url"));
    };
    let url = match resolve_value(url_raw, name, lookup).context("server url") {
        Outcome::Ok(value) => stringify(&value),
        Outcome::Invalid(m) => return Outcome::Invalid(m),
        Outcome::Faulted(e) => return Outcome::Faulted(e),
    };

    let mut variables = BTreeMap::new();
    if let Some(vars) = fields.get("variables").and_then(|v| v.as_object()) {
        for (var_name, var) in vars {
            let Some(var_fields) = var.as_object() else {
                return Outcome::invalid(format!(
                    "link '{name}': server variable '{var_name}' must be an object"
                ));
            };
            let Some(default) = var_fields.get("default").and_then(|v| v.as_str()) else {
                return Outcome::invalid(format!(
                    "link '{name}': server variable '{var_name}' requires a default"
                ));
            };
            let enumeration: BTreeSet<String> = var_fields
                .get("enum")
                .and_then(|v| v.as_array())
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|v| v.as_str().map(str::to_string))
                        .collect()
                })
                .unwrap_or_default();
            variables.insert(
                var_name.clone(),
                ServerVariable {
                    default: default.to_string(),
                    enumeration,
                    description: var_fields
                        .get("description")
                        .and_then(|v| v.as_str())
                        .map(str::to_string),
                },
            );
        }
    }

    Outcome::Ok(Server {
        url,
        description: fields
            .get("description")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        variables,
    })
}

fn stringify(value: &AnyValue) -> String {
    match value {
        AnyValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
