mod cycles;
mod dependency;

pub use cycles::find_cycles;
pub use dependency::{CycleError, DependencyGraph, OrderError};
