//! Error-latching operation chain.

use crate::error::{PipelineError, PipelineResult};

use super::{Operation, WorkingImage};

/// Either the current working image or the first error a chain hit.
///
/// Once an error is latched, further `then` calls are no-ops, so the first
/// failure is the one reported.
#[derive(Debug)]
pub struct Chain {
    state: PipelineResult<WorkingImage>,
}

impl Chain {
    pub fn new(image: WorkingImage) -> Self {
        Self { state: Ok(image) }
    }

    /// Apply `operation` unless an error is already latched.
    pub fn then(self, operation: &dyn Operation) -> Self {
        match self.state {
            Ok(image) => Self {
                state: operation.apply(image),
            },
            Err(e) => Self { state: Err(e) },
        }
    }

    /// Apply `operation` only when `condition` holds.
    pub fn then_if(self, condition: bool, operation: &dyn Operation) -> Self {
        if condition {
            self.then(operation)
        } else {
            self
        }
    }

    /// The latched error, if any.
    pub fn last_error(&self) -> Option<&PipelineError> {
        self.state.as_ref().err()
    }

    pub fn finish(self) -> PipelineResult<WorkingImage> {
        self.state
    }
}
