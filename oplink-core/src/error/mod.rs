use thiserror::Error;

use crate::graph::{CycleError, OrderError};
use crate::outcome::Fault;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("{0}")]
    Validation(String),

    #[error("{source}")]
    Fault {
        #[source]
        source: Fault,
    },

    #[error(transparent)]
    Cycles(#[from] CycleError),

    #[error(transparent)]
    Order(#[from] OrderError),
}

impl LinkError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}
