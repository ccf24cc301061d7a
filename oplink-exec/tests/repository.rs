use std::collections::BTreeMap;

use oplink_core::{
    AnyValue, Document, ExpressionLookup, OperationRef, Outcome, PathGenerationError,
    PathParameter, Scenario, StatusCode,
};
use oplink_exec::{FailureMode, LinkOptions, LinkRepository};
use serde_json::json;

struct MapLookup(BTreeMap<String, AnyValue>);

impl MapLookup {
    fn empty() -> Self {
        Self(BTreeMap::new())
    }

    fn new(entries: &[(&str, AnyValue)]) -> Self {
        Self(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }
}

impl ExpressionLookup for MapLookup {
    fn resolve(&self, key: &str) -> Outcome<AnyValue> {
        match self.0.get(key) {
            Some(value) => Outcome::Ok(value.clone()),
            None => Outcome::invalid(format!("no value for expression '{key}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct StubScenario {
    path: String,
    method: String,
    status: StatusCode,
    operation_id: Option<String>,
    path_params: Vec<(String, bool)>,
}

impl StubScenario {
    fn new(path: &str, method: &str, status: u16, operation_id: Option<&str>) -> Self {
        Self {
            path: path.to_string(),
            method: method.to_string(),
            status: StatusCode::Code(status),
            operation_id: operation_id.map(str::to_string),
            path_params: Vec::new(),
        }
    }

    fn with_path_param(mut self, name: &str) -> Self {
        self.path_params.push((name.to_string(), true));
        self
    }
}

impl Scenario for StubScenario {
    fn path(&self) -> &str {
        &self.path
    }

    fn method(&self) -> &str {
        &self.method
    }

    fn status(&self) -> StatusCode {
        self.status
    }

    fn operation_id(&self) -> Option<&str> {
        self.operation_id.as_deref()
    }

    fn declares_header(&self, _name: &str) -> bool {
        false
    }

    fn declares_query_param(&self, _name: &str) -> bool {
        false
    }

    fn path_parameters(&self) -> Vec<PathParameter> {
        self.path_params
            .iter()
            .map(|(name, mandatory)| PathParameter {
                name: name.clone(),
                mandatory: *mandatory,
            })
            .collect()
    }

    fn generate_path(
        &self,
        _namespace: &str,
        values: &BTreeMap<String, AnyValue>,
    ) -> Result<String, PathGenerationError> {
        let mut segments = Vec::new();
        for segment in self.path.split('/') {
            if let Some(inner) = segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
                let Some(value) = values.get(inner) else {
                    return Err(PathGenerationError::new(
                        &self.path,
                        format!("no value for path parameter '{inner}'"),
                    ));
                };
                match value {
                    AnyValue::String(s) => segments.push(s.clone()),
                    other => segments.push(other.to_string()),
                }
            } else {
                segments.push(segment.to_string());
            }
        }
        Ok(segments.join("/"))
    }

    fn description(&self) -> String {
        format!("{} {} [{}]", self.method, self.path, self.status)
    }
}

fn store_document() -> Document {
    Document::with_name(
        "store.yaml",
        json!({
            "paths": {
                "/orders": {
                    "post": {
                        "operationId": "createOrder",
                        "responses": {
                            "201": {
                                "links": {
                                    "GetOrderLink": {
                                        "operationRef": "#/paths/~1orders~1{id}/get",
                                        "parameters": { "id": "$response.body#/id" }
                                    },
                                    "NotifyLink": {
                                        "operationId": "notifyOrder"
                                    }
                                }
                            }
                        }
                    }
                },
                "/orders/{id}": {
                    "get": {
                        "operationId": "getOrder",
                        "responses": { "200": {} }
                    }
                },
                "/notifications": {
                    "post": {
                        "operationId": "notifyOrder",
                        "responses": { "202": {} }
                    }
                }
            }
        }),
    )
}

fn cyclic_document() -> Document {
    Document::new(json!({
        "paths": {
            "/a": {
                "get": {
                    "responses": {
                        "200": { "links": { "AtoB": { "operationRef": "#/paths/~1b/get" } } }
                    }
                }
            },
            "/b": {
                "get": {
                    "responses": {
                        "200": { "links": { "BtoA": { "operationRef": "#/paths/~1a/get" } } }
                    }
                }
            }
        }
    }))
}

fn store_lookup() -> MapLookup {
    MapLookup::new(&[("GetOrderLink.response.body#/id", json!(10))])
}

fn load(options: LinkOptions, mode: FailureMode) -> LinkRepository {
    LinkRepository::from_document(&store_document(), &store_lookup(), options, mode)
        .expect("document loads")
}

#[test]
fn repository_aggregates_all_document_links() {
    let repository = load(LinkOptions::default(), FailureMode::Strict);
    assert_eq!(repository.len(), 2);
}

#[test]
fn strict_mode_aborts_on_the_first_unparsable_link() {
    // The expression lookup is empty, so GetOrderLink's parameter fails.
    let result = LinkRepository::from_document(
        &store_document(),
        &MapLookup::empty(),
        LinkOptions::default(),
        FailureMode::Strict,
    );
    let error = result.expect_err("strict parse must fail");
    assert!(error.to_string().contains("parameter 'id'"), "{error}");
}

#[test]
fn lenient_mode_drops_the_unparsable_link_and_keeps_the_rest() {
    let repository = LinkRepository::from_document(
        &store_document(),
        &MapLookup::empty(),
        LinkOptions::default(),
        FailureMode::Lenient,
    )
    .expect("lenient load succeeds");
    assert_eq!(repository.len(), 1);
}

#[test]
fn disabled_link_processing_yields_an_empty_repository() {
    let options = LinkOptions {
        process_links: false,
        ..LinkOptions::default()
    };
    let repository = load(options, FailureMode::Strict);
    assert!(repository.is_empty());

    let scenario = StubScenario::new("/orders/{id}", "GET", 200, Some("getOrder"));
    assert!(repository.links_for(&scenario).is_empty());

    let scenarios = vec![
        StubScenario::new("/orders/{id}", "GET", 200, Some("getOrder")),
        StubScenario::new("/orders", "POST", 201, Some("createOrder")),
    ];
    let unchanged = repository
        .reorder(scenarios.clone(), FailureMode::Strict)
        .expect("reorder");
    assert_eq!(unchanged, scenarios);
}

#[test]
fn disabled_reordering_skips_cycle_detection_and_keeps_input_order() {
    let options = LinkOptions {
        reorder: false,
        ..LinkOptions::default()
    };
    let repository = LinkRepository::from_document(
        &cyclic_document(),
        &MapLookup::empty(),
        options,
        FailureMode::Strict,
    )
    .expect("cyclic input is accepted when reordering is off");
    assert!(repository.graph().is_empty());

    let scenarios = vec![
        StubScenario::new("/b", "GET", 200, None),
        StubScenario::new("/a", "GET", 200, None),
    ];
    let unchanged = repository
        .reorder(scenarios.clone(), FailureMode::Strict)
        .expect("reorder");
    assert_eq!(unchanged, scenarios);
}

#[test]
fn strict_mode_rejects_cyclic_link_definitions() {
    let error = LinkRepository::from_document(
        &cyclic_document(),
        &MapLookup::empty(),
        LinkOptions::default(),
        FailureMode::Strict,
    )
    .expect_err("cycles must fail strict construction");
    assert!(error.to_string().contains("dependency cycle"), "{error}");
}

#[test]
fn lenient_mode_degrades_cycles_to_an_empty_graph() {
    let repository = LinkRepository::from_document(
        &cyclic_document(),
        &MapLookup::empty(),
        LinkOptions::default(),
        FailureMode::Lenient,
    )
    .expect("lenient load succeeds");
    // Links still parse and match; only reordering is disabled.
    assert_eq!(repository.len(), 2);
    assert!(repository.graph().is_empty());

    let scenarios = vec![
        StubScenario::new("/b", "GET", 200, None),
        StubScenario::new("/a", "GET", 200, None),
    ];
    let unchanged = repository
        .reorder(scenarios.clone(), FailureMode::Lenient)
        .expect("reorder");
    assert_eq!(unchanged, scenarios);
}

#[test]
fn ref_identified_link_matches_by_path_method_and_status() {
    let repository = load(LinkOptions::default(), FailureMode::Strict);
    let scenario = StubScenario::new("/orders/{id}", "GET", 200, None);
    let matched = repository.links_for(&scenario);
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].name, "GetOrderLink");

    let wrong_status = StubScenario::new("/orders/{id}", "GET", 404, None);
    assert!(repository.links_for(&wrong_status).is_empty());
}

#[test]
fn id_identified_link_matches_by_operation_id_and_status() {
    let repository = load(LinkOptions::default(), FailureMode::Strict);
    let scenario = StubScenario::new("/notifications", "POST", 202, Some("notifyOrder"));
    let matched = repository.links_for(&scenario);
    assert_eq!(matched.len(), 1);
    assert_eq!(matched[0].name, "NotifyLink");

    // Same path/method/status, but no operationId: an id-identified link
    // never matches by shape.
    let anonymous = StubScenario::new("/notifications", "POST", 202, None);
    assert!(repository.links_for(&anonymous).is_empty());
}

#[test]
fn producer_side_lookup_finds_links_defined_by_an_operation() {
    let repository = load(LinkOptions::default(), FailureMode::Strict);
    let producer = OperationRef::new("/orders", "post", StatusCode::Code(201));
    let defined = repository.links_by(&producer);
    assert_eq!(defined.len(), 2);

    let other = OperationRef::new("/orders", "POST", StatusCode::Code(200));
    assert!(repository.links_by(&other).is_empty());
}

#[test]
fn reorder_places_producers_before_consumers() {
    let repository = load(LinkOptions::default(), FailureMode::Strict);
    let scenarios = vec![
        StubScenario::new("/orders/{id}", "GET", 200, Some("getOrder")),
        StubScenario::new("/orders", "POST", 201, Some("createOrder")),
    ];
    let ordered = repository
        .reorder(scenarios, FailureMode::Strict)
        .expect("orderable");
    assert_eq!(ordered[0].operation_id(), Some("createOrder"));
    assert_eq!(ordered[1].operation_id(), Some("getOrder"));
}

#[test]
fn blocked_ordering_propagates_strictly_and_degrades_leniently() {
    // A same-operation, different-status link passes the fine-grained cycle
    // check but collapses to a self-edge at ordering time.
    let document = Document::new(json!({
        "paths": {
            "/orders": {
                "post": {
                    "operationId": "createOrder",
                    "responses": {
                        "200": {},
                        "201": {
                            "links": {
                                "SelfLink": {
                                    "operationRef": "#/paths/~1orders/post",
                                    "x-StatusCode": "200"
                                }
                            }
                        }
                    }
                }
            }
        }
    }));
    let repository = LinkRepository::from_document(
        &document,
        &MapLookup::empty(),
        LinkOptions::default(),
        FailureMode::Strict,
    )
    .expect("fine-grained check passes");
    assert!(!repository.graph().is_empty());

    let scenarios = vec![StubScenario::new("/orders", "POST", 201, Some("createOrder"))];

    let error = repository
        .reorder(scenarios.clone(), FailureMode::Strict)
        .expect_err("self-edge blocks ordering");
    assert!(error.to_string().contains("blocked"), "{error}");

    let unchanged = repository
        .reorder(scenarios.clone(), FailureMode::Lenient)
        .expect("lenient reorder succeeds");
    assert_eq!(unchanged, scenarios);
}

#[test]
fn examples_for_synthesizes_one_row_per_link() {
    let repository = load(LinkOptions::default(), FailureMode::Strict);
    let scenario =
        StubScenario::new("/orders/{id}", "GET", 200, Some("getOrder")).with_path_param("id");
    let matched = repository.links_for(&scenario);
    let rows = repository
        .examples_for(&matched, &scenario, FailureMode::Strict)
        .expect("synthesis succeeds");
    assert_eq!(rows.len(), 1);
    let row = &rows[0];
    assert_eq!(row.link_name, "GetOrderLink");
    assert!(!row.partial);
    assert_eq!(row.source.as_deref(), Some("store.yaml"));
    assert_eq!(row.request.path, "/orders/10");
    assert_eq!(row.request.method, "GET");
}

#[test]
fn failed_synthesis_is_dropped_leniently_or_propagated_strictly() {
    let document = Document::new(json!({
        "paths": {
            "/orders": {
                "post": {
                    "operationId": "createOrder",
                    "responses": {
                        "201": {
                            "links": {
                                "BareLink": { "operationRef": "#/paths/~1orders~1{id}/get" }
                            }
                        }
                    }
                }
            },
            "/orders/{id}": {
                "get": { "operationId": "getOrder", "responses": { "200": {} } }
            }
        }
    }));
    let repository = LinkRepository::from_document(
        &document,
        &MapLookup::empty(),
        LinkOptions::default(),
        FailureMode::Strict,
    )
    .expect("document loads");

    // BareLink carries no parameters, so the mandatory "id" is missing.
    let scenario =
        StubScenario::new("/orders/{id}", "GET", 200, Some("getOrder")).with_path_param("id");
    let matched = repository.links_for(&scenario);
    assert_eq!(matched.len(), 1);

    let error = repository
        .examples_for(&matched, &scenario, FailureMode::Strict)
        .expect_err("strict synthesis must fail");
    assert!(error.to_string().contains("'id'"), "{error}");

    let rows = repository
        .examples_for(&matched, &scenario, FailureMode::Lenient)
        .expect("lenient synthesis succeeds");
    assert!(rows.is_empty());
}
