mod pointer;
mod resolver;
mod template;

pub use pointer::{escape_token, unescape_token};
pub use resolver::{resolve_value, ExpressionLookup};
pub use template::{parse_template, Segment, Template, TemplateError};
