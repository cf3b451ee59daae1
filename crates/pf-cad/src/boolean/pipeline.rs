//! Sequential boolean combination over an ordered tool list

use thiserror::Error;

use crate::classify::extract_solid;
use crate::kernel::{BooleanKind, CadKernel, Shape};

use super::step::{self, StepError};

/// Error from a pipeline run
#[derive(Debug, Clone, Error)]
pub enum BooleanError {
    /// The seed shape was null
    #[error("cannot run a boolean pipeline from a null base shape")]
    InvalidBase,

    /// A null shape reached the step for the tool at `index`
    #[error("null shape at tool {index}")]
    NullShape { index: usize },

    /// The step for the tool at `index` did not complete
    #[error("{op} with tool {index} failed: {reason}")]
    OperationFailed {
        op: BooleanKind,
        index: usize,
        reason: String,
    },
}

/// Successful pipeline outcome
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineOutcome {
    /// The combined result shape
    Combined(Shape),
    /// The tool list was empty; there is nothing to recompute
    NothingToDo,
}

/// Fold `base` against `tools` in order under `op`.
///
/// The fold is strict left-to-right in the caller's order (difference and
/// section are not commutative) and aborts on the first failing step,
/// reporting the index of the tool it failed on. An empty tool list is a
/// legitimate authoring state and yields [`PipelineOutcome::NothingToDo`]
/// rather than an error.
///
/// On success the accumulated result passes through solid extraction once
/// more, whatever the operation kind, so the returned shape is a single
/// solid whenever one exists.
pub fn run(
    kernel: &dyn CadKernel,
    op: BooleanKind,
    base: &Shape,
    tools: &[Shape],
) -> Result<PipelineOutcome, BooleanError> {
    if base.is_null() {
        return Err(BooleanError::InvalidBase);
    }
    if tools.is_empty() {
        return Ok(PipelineOutcome::NothingToDo);
    }

    let mut result = base.clone();
    for (index, tool) in tools.iter().enumerate() {
        tracing::debug!(%op, index, "applying boolean step");
        result = step::apply(kernel, op, &result, tool).map_err(|e| match e {
            StepError::NullBase | StepError::NullTool => BooleanError::NullShape { index },
            StepError::Failed { op, reason } => BooleanError::OperationFailed { op, index, reason },
        })?;
    }

    // Normalize the stored output: collapse to the solid content one final
    // time, whatever the operation kind produced along the way.
    let solid = extract_solid(kernel, &result).map_err(|e| BooleanError::OperationFailed {
        op,
        index: tools.len() - 1,
        reason: e.to_string(),
    })?;
    Ok(PipelineOutcome::Combined(solid))
}
