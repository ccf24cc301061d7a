use std::collections::BTreeMap;

use crate::scenario::Scenario;
use crate::types::{AnyValue, OperationRef, Server, StatusCode};

/// One fully resolved link from the document.
///
/// Exactly one identification route is populated: a link resolved through an
/// `operationRef` carries `for_operation` (and matches by path/method/status);
/// a link resolved through an `operationId` carries `operation_id` (and
/// matches by id/status only, contributing no graph edge).
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Link {
    pub name: String,
    pub for_status_code: StatusCode,
    pub partial: bool,
    pub operation_id: Option<String>,
    pub by_operation: OperationRef,
    pub for_operation: Option<OperationRef>,
    pub description: Option<String>,
    pub server: Option<Server>,
    pub request_body: Option<AnyValue>,
    pub parameters: BTreeMap<String, AnyValue>,
    /// Name of the originating document, carried into example rows.
    pub source: Option<String>,
}

impl Link {
    /// Does this link target the given scenario (consumer side)?
    pub fn defined_for(&self, scenario: &dyn Scenario) -> bool {
        if let Some(id) = &self.operation_id {
            return scenario.operation_id() == Some(id.as_str())
                && self.for_status_code == scenario.status();
        }
        match &self.for_operation {
            Some(target) => target.matches(scenario.path(), scenario.method(), scenario.status()),
            None => false,
        }
    }

    /// Was this link declared under the given operation + status (producer side)?
    pub fn defined_by(&self, operation: &OperationRef) -> bool {
        self.by_operation
            .matches(&operation.path, &operation.method, operation.status)
    }
}
