//! CAD kernel trait definitions
//!
//! These traits define the interface that all CAD kernels must implement.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// An opaque handle to kernel-owned geometry.
///
/// A shape is either null (the explicit empty sentinel) or refers to valid
/// geometry held by the kernel that produced it. Handles are cheap to clone
/// and never mutated in place; every operation yields a new shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    id: Uuid,
}

impl Shape {
    /// Create a handle for kernel geometry with the given id
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }

    /// The explicit empty/invalid sentinel
    pub fn null() -> Self {
        Self { id: Uuid::nil() }
    }

    /// Whether this handle is the null sentinel
    pub fn is_null(&self) -> bool {
        self.id.is_nil()
    }

    /// Kernel-side identity of this shape
    pub fn id(&self) -> Uuid {
        self.id
    }
}

impl Default for Shape {
    fn default() -> Self {
        Self::null()
    }
}

/// Topological category of a shape as reported by the kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeKind {
    /// A single closed, volume-bounding body
    Solid,
    /// A composite of sub-shapes: several bodies, or a curve network
    Compound,
}

/// Boolean set operation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BooleanKind {
    /// Union (fuse)
    #[default]
    Union,
    /// Difference (cut): base minus tool
    Difference,
    /// Intersection (common)
    Intersection,
    /// Intersection curve network between the operands
    Section,
}

impl std::fmt::Display for BooleanKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BooleanKind::Union => "union",
            BooleanKind::Difference => "difference",
            BooleanKind::Intersection => "intersection",
            BooleanKind::Section => "section",
        };
        f.write_str(name)
    }
}

/// Error type for CAD kernel operations
#[derive(Debug, Clone, Error)]
pub enum CadError {
    #[error("Invalid primitive: {0}")]
    InvalidPrimitive(String),

    #[error("Boolean operation failed: {0}")]
    BooleanFailed(String),

    #[error("Unknown shape: {0}")]
    UnknownShape(Uuid),

    #[error("Kernel not available: {0}")]
    KernelNotAvailable(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

/// Result type for CAD operations
pub type CadResult<T> = Result<T, CadError>;

/// The main CAD kernel trait
///
/// Implementations of this trait provide the actual geometry operations
/// using different backends. A boolean primitive that returns an error did
/// not complete; the operands are left untouched.
pub trait CadKernel: Send + Sync {
    /// Get the name of this kernel
    fn name(&self) -> &str;

    /// Check if the kernel is available
    fn is_available(&self) -> bool;

    // ========== Primitives ==========

    /// Create an axis-aligned box primitive
    ///
    /// # Arguments
    /// * `center` - Center of the box
    /// * `size` - Full edge lengths along x/y/z
    fn create_box(&self, center: Vec3, size: Vec3) -> CadResult<Shape>;

    /// Create a sphere primitive
    fn create_sphere(&self, center: Vec3, radius: f32) -> CadResult<Shape>;

    /// Create a cylinder primitive
    ///
    /// # Arguments
    /// * `center` - Midpoint of the cylinder axis
    /// * `radius` - Cylinder radius
    /// * `height` - Full height along the axis
    /// * `axis` - Axis direction (normalized by the kernel)
    fn create_cylinder(&self, center: Vec3, radius: f32, height: f32, axis: Vec3)
    -> CadResult<Shape>;

    // ========== Boolean primitives ==========

    /// Fuse (union) of two shapes
    fn fuse(&self, a: &Shape, b: &Shape) -> CadResult<Shape>;

    /// Cut (difference): `a` minus `b`. Argument order is significant.
    fn cut(&self, a: &Shape, b: &Shape) -> CadResult<Shape>;

    /// Common (intersection) of two shapes
    fn common(&self, a: &Shape, b: &Shape) -> CadResult<Shape>;

    /// Intersection curve network between two shapes
    fn section(&self, a: &Shape, b: &Shape) -> CadResult<Shape>;

    // ========== Structure queries ==========

    /// Topological category of a shape
    fn shape_kind(&self, shape: &Shape) -> CadResult<ShapeKind>;

    /// All solid sub-shapes of a shape, in deterministic index order.
    ///
    /// A solid contains itself; a compound yields its solid members with
    /// nested compounds flattened in place.
    fn solids_of(&self, shape: &Shape) -> CadResult<Vec<Shape>>;

    /// Build a compound from the given shapes
    fn make_compound(&self, shapes: &[Shape]) -> CadResult<Shape>;
}

/// A null kernel that always returns errors (used when no kernel is available)
#[derive(Debug, Default)]
pub struct NullKernel;

impl NullKernel {
    fn unavailable<T>() -> CadResult<T> {
        Err(CadError::KernelNotAvailable(
            "No CAD kernel available".into(),
        ))
    }
}

impl CadKernel for NullKernel {
    fn name(&self) -> &str {
        "null"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn create_box(&self, _center: Vec3, _size: Vec3) -> CadResult<Shape> {
        Self::unavailable()
    }

    fn create_sphere(&self, _center: Vec3, _radius: f32) -> CadResult<Shape> {
        Self::unavailable()
    }

    fn create_cylinder(
        &self,
        _center: Vec3,
        _radius: f32,
        _height: f32,
        _axis: Vec3,
    ) -> CadResult<Shape> {
        Self::unavailable()
    }

    fn fuse(&self, _a: &Shape, _b: &Shape) -> CadResult<Shape> {
        Self::unavailable()
    }

    fn cut(&self, _a: &Shape, _b: &Shape) -> CadResult<Shape> {
        Self::unavailable()
    }

    fn common(&self, _a: &Shape, _b: &Shape) -> CadResult<Shape> {
        Self::unavailable()
    }

    fn section(&self, _a: &Shape, _b: &Shape) -> CadResult<Shape> {
        Self::unavailable()
    }

    fn shape_kind(&self, _shape: &Shape) -> CadResult<ShapeKind> {
        Self::unavailable()
    }

    fn solids_of(&self, _shape: &Shape) -> CadResult<Vec<Shape>> {
        Self::unavailable()
    }

    fn make_compound(&self, _shapes: &[Shape]) -> CadResult<Shape> {
        Self::unavailable()
    }
}

/// Get the default CAD kernel based on available features
pub fn default_kernel() -> Box<dyn CadKernel> {
    #[cfg(feature = "analytic")]
    {
        Box::new(super::AnalyticKernel::new())
    }

    #[cfg(not(feature = "analytic"))]
    {
        Box::new(NullKernel)
    }
}
