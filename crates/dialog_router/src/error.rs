//! Router error types

use thiserror::Error;

use dialog_core::{FlowKind, FlowStep};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RouterError {
    /// A (flow, step) pair that no step graph declares. Indicates a caller
    /// bug, never an implicit "anything goes".
    #[error("no step graph entry for flow {flow:?} at step {step:?}")]
    Config { flow: FlowKind, step: FlowStep },
}
