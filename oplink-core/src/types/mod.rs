mod link;
mod operation;
mod server;
mod status;

pub use link::Link;
pub use operation::OperationRef;
pub use server::{Server, ServerVariable};
pub use status::StatusCode;

pub type AnyValue = serde_json::Value;
