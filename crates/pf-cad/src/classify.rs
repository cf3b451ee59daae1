//! Solid extraction from composite shapes
//!
//! Boolean kernels hand back heterogeneous results: a fuse of non-touching
//! operands is a compound of several bodies, a section is a curve network.
//! Downstream consumers expect a single solid, so results are collapsed here.

use crate::kernel::{CadKernel, CadResult, Shape, ShapeKind};

/// Extract the solid content of `shape`.
///
/// A shape that already is a solid is returned unchanged. A composite shape
/// yields its first solid sub-shape in the kernel's deterministic sub-shape
/// order. When no solid exists (curve networks, empty compounds, null input)
/// the null sentinel is returned.
pub fn extract_solid(kernel: &dyn CadKernel, shape: &Shape) -> CadResult<Shape> {
    if shape.is_null() {
        return Ok(Shape::null());
    }
    if kernel.shape_kind(shape)? == ShapeKind::Solid {
        return Ok(shape.clone());
    }
    let solids = kernel.solids_of(shape)?;
    Ok(solids.into_iter().next().unwrap_or_else(Shape::null))
}
