mod parser;

pub use parser::parse_link;
