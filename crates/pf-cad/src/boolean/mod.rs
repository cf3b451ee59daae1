//! Boolean combination of shapes
//!
//! One step combines a pair of shapes under a set operation; the pipeline
//! folds an ordered tool list into a base shape, one step per tool.

pub mod pipeline;
pub mod step;

pub use pipeline::{BooleanError, PipelineOutcome, run};
pub use step::{StepError, apply};
