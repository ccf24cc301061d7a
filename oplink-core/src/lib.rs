#![forbid(unsafe_code)]

pub mod document;
pub mod error;
pub mod expressions;
pub mod graph;
pub mod links;
pub mod outcome;
pub mod scenario;
pub mod types;

pub use crate::document::{Document, DocumentFormat, DocumentLink, OperationInfo};
pub use crate::error::LinkError;
pub use crate::expressions::{resolve_value, ExpressionLookup};
pub use crate::graph::{find_cycles, CycleError, DependencyGraph, OrderError};
pub use crate::links::parse_link;
pub use crate::outcome::{Fault, Outcome};
pub use crate::scenario::{PathGenerationError, PathParameter, Scenario};
pub use crate::types::{AnyValue, Link, OperationRef, Server, ServerVariable, StatusCode};
