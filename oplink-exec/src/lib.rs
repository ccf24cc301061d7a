#![forbid(unsafe_code)]

pub mod config;
pub mod mode;
pub mod repository;
pub mod synthesis;

pub use crate::config::LinkOptions;
pub use crate::mode::FailureMode;
pub use crate::repository::LinkRepository;
pub use crate::synthesis::{synthesize, ExampleRow, SynthesizedRequest};
