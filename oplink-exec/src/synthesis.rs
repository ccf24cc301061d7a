use std::collections::BTreeMap;

use oplink_core::expressions::escape_token;
use oplink_core::{AnyValue, Link, Outcome, Scenario};

const PATH_PREFIX: &str = "path.";
const HEADER_PREFIX: &str = "header.";
const QUERY_PREFIX: &str = "query.";

/// Namespace under which deferred path values are handed to the scenario's
/// value-generation context.
const PATH_NAMESPACE: &str = "PATH";

/// A concrete HTTP request synthesized from a link and a target scenario.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SynthesizedRequest {
    pub method: String,
    pub path: String,
    pub headers: BTreeMap<String, String>,
    pub query: BTreeMap<String, String>,
    pub body: Option<AnyValue>,
}

/// One generated example row, consumed by the test-generation collaborator.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct ExampleRow {
    pub link_name: String,
    pub partial: bool,
    pub source: Option<String>,
    pub request: SynthesizedRequest,
}

impl ExampleRow {
    /// Column names of the example table: headers, query parameters, and a
    /// request-body column when the link supplies a body.
    pub fn column_names(&self) -> Vec<String> {
        let mut columns: Vec<String> = self.request.headers.keys().cloned().collect();
        columns.extend(self.request.query.keys().cloned());
        if self.request.body.is_some() {
            columns.push("(REQUEST-BODY)".to_string());
        }
        columns
    }
}

/// Convert a matched link + target scenario into a concrete request.
///
/// Parameter keys are classified into path / header / query slots; unprefixed
/// keys fall back to the scenario's declared headers, then its declared query
/// parameters, and finally become path-parameter candidates whose values are
/// JSON-pointer escaped so they can safely occupy a path segment.
pub fn synthesize(link: &Link, scenario: &dyn Scenario) -> Outcome<SynthesizedRequest> {
    if !link.defined_for(scenario) {
        return Outcome::invalid(format!(
            "link '{}' does not apply to {}",
            link.name,
            scenario.description()
        ));
    }

    let mut headers = BTreeMap::new();
    let mut query = BTreeMap::new();
    let mut path_values: BTreeMap<String, AnyValue> = BTreeMap::new();

    for (key, value) in &link.parameters {
        if let Some(name) = key.strip_prefix(PATH_PREFIX) {
            path_values.insert(name.to_string(), value.clone());
        } else if let Some(name) = key.strip_prefix(HEADER_PREFIX) {
            headers.insert(name.to_string(), stringify(value));
        } else if let Some(name) = key.strip_prefix(QUERY_PREFIX) {
            query.insert(name.to_string(), stringify(value));
        } else if scenario.declares_header(key) {
            headers.insert(key.clone(), stringify(value));
        } else if scenario.declares_query_param(key) {
            query.insert(key.clone(), stringify(value));
        } else {
            path_values.insert(key.clone(), escape_path_value(value));
        }
    }

    for parameter in scenario.path_parameters() {
        if parameter.mandatory && !path_values.contains_key(&parameter.name) {
            return Outcome::invalid(format!(
                "link '{}': missing mandatory path parameter '{}' for {}",
                link.name,
                parameter.name,
                scenario.description()
            ));
        }
    }

    let path = match scenario.generate_path(PATH_NAMESPACE, &path_values) {
        Ok(path) => path,
        Err(error) => return Outcome::faulted(error),
    };

    Outcome::Ok(SynthesizedRequest {
        method: scenario.method().to_uppercase(),
        path,
        headers,
        query,
        body: link.request_body.clone(),
    })
}

fn stringify(value: &AnyValue) -> String {
    match value {
        AnyValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Pointer-escape a value destined for a path segment; non-string values
/// cannot contain `/` or `~` and pass through unchanged.
fn escape_path_value(value: &AnyValue) -> AnyValue {
    match value {
        AnyValue::String(s) => AnyValue::String(escape_token(s)),
        other => other.clone(),
    }
}
