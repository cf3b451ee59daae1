//! CAD kernel backends and the shape model

#[cfg(feature = "analytic")]
mod analytic;
mod traits;

#[cfg(feature = "analytic")]
pub use analytic::{AnalyticKernel, CsgNode, ShapeData};
pub use traits::{
    BooleanKind, CadError, CadKernel, CadResult, NullKernel, Shape, ShapeKind, default_kernel,
};
