//! CAD Kernel Abstraction and Boolean Pipeline
//!
//! This crate provides:
//! - Abstract CAD kernel traits for geometry operations
//! - An analytic CSG kernel backend (pure Rust, implicit solids)
//! - Solid extraction from composite kernel results
//! - The sequential boolean combination pipeline (union, difference,
//!   intersection, section) over an ordered tool list

pub mod boolean;
pub mod classify;
pub mod kernel;

// Re-exports for convenience
pub use boolean::{BooleanError, PipelineOutcome, StepError};
pub use classify::extract_solid;
pub use kernel::{
    BooleanKind, CadError, CadKernel, CadResult, NullKernel, Shape, ShapeKind, default_kernel,
};
#[cfg(feature = "analytic")]
pub use kernel::{AnalyticKernel, CsgNode, ShapeData};
