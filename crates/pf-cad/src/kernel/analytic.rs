//! Analytic CSG kernel backend
//!
//! Pure Rust backend without C++ bindings. Solids are CSG expression trees
//! over implicit primitives; point membership is exact and composes through
//! the set operations, so boolean results stay cheap to build, deterministic,
//! and structurally comparable.

use glam::Vec3;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use super::{CadError, CadKernel, CadResult, Shape, ShapeKind};

/// CSG expression tree over implicit primitives
#[derive(Debug, Clone, PartialEq)]
pub enum CsgNode {
    /// Axis-aligned box given by center and half extents
    Box { center: Vec3, half: Vec3 },
    /// Sphere given by center and radius
    Sphere { center: Vec3, radius: f32 },
    /// Cylinder given by axis midpoint, radius, half height and unit axis
    Cylinder {
        center: Vec3,
        radius: f32,
        half_height: f32,
        axis: Vec3,
    },
    /// Set union of two subtrees
    Union(Box<CsgNode>, Box<CsgNode>),
    /// Set difference: left minus right
    Difference(Box<CsgNode>, Box<CsgNode>),
    /// Set intersection of two subtrees
    Intersection(Box<CsgNode>, Box<CsgNode>),
}

impl CsgNode {
    /// Exact point membership test
    pub fn contains(&self, p: Vec3) -> bool {
        match self {
            CsgNode::Box { center, half } => {
                let d = (p - *center).abs();
                d.x <= half.x && d.y <= half.y && d.z <= half.z
            }
            CsgNode::Sphere { center, radius } => p.distance_squared(*center) <= radius * radius,
            CsgNode::Cylinder {
                center,
                radius,
                half_height,
                axis,
            } => {
                let rel = p - *center;
                let along = rel.dot(*axis);
                let radial = rel - *axis * along;
                along.abs() <= *half_height && radial.length_squared() <= radius * radius
            }
            CsgNode::Union(a, b) => a.contains(p) || b.contains(p),
            CsgNode::Difference(a, b) => a.contains(p) && !b.contains(p),
            CsgNode::Intersection(a, b) => a.contains(p) && b.contains(p),
        }
    }

    /// Conservative bounding sphere as (center, radius)
    fn bounds(&self) -> (Vec3, f32) {
        match self {
            CsgNode::Box { center, half } => (*center, half.length()),
            CsgNode::Sphere { center, radius } => (*center, *radius),
            CsgNode::Cylinder {
                center,
                radius,
                half_height,
                ..
            } => (*center, (radius * radius + half_height * half_height).sqrt()),
            CsgNode::Union(a, b) => merge_bounds(a.bounds(), b.bounds()),
            // A difference is contained in its left operand
            CsgNode::Difference(a, _) => a.bounds(),
            // An intersection is contained in either operand
            CsgNode::Intersection(a, b) => {
                let (ca, ra) = a.bounds();
                let (cb, rb) = b.bounds();
                if ra <= rb { (ca, ra) } else { (cb, rb) }
            }
        }
    }

    /// Whether the bounding spheres of two trees cannot overlap
    fn bounds_disjoint(&self, other: &CsgNode) -> bool {
        let (ca, ra) = self.bounds();
        let (cb, rb) = other.bounds();
        ca.distance(cb) > ra + rb
    }
}

/// Smallest sphere enclosing two bounding spheres
fn merge_bounds((c1, r1): (Vec3, f32), (c2, r2): (Vec3, f32)) -> (Vec3, f32) {
    let d = c1.distance(c2);
    if d + r2 <= r1 {
        return (c1, r1);
    }
    if d + r1 <= r2 {
        return (c2, r2);
    }
    let r = (d + r1 + r2) * 0.5;
    let dir = if d > f32::EPSILON {
        (c2 - c1) / d
    } else {
        Vec3::ZERO
    };
    (c1 + dir * (r - r1), r)
}

/// Stored geometry for one shape handle
#[derive(Debug, Clone)]
enum Entry {
    /// A single solid
    Solid(CsgNode),
    /// A compound referencing member shape handles, in insertion order
    Compound(Vec<Uuid>),
    /// The intersection curve network between two solids
    Curves { lhs: CsgNode, rhs: CsgNode },
}

/// Resolved, structurally comparable view of a shape
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeData {
    /// A single solid, as a CSG expression tree
    Solid(CsgNode),
    /// A compound of member shapes
    Compound(Vec<ShapeData>),
    /// The intersection curve network between two solids
    Curves { lhs: CsgNode, rhs: CsgNode },
}

/// Analytic CSG kernel
pub struct AnalyticKernel {
    /// Storage for shape data (keyed by handle id)
    shapes: Mutex<HashMap<Uuid, Entry>>,
}

impl AnalyticKernel {
    /// Create a new analytic kernel
    pub fn new() -> Self {
        Self {
            shapes: Mutex::new(HashMap::new()),
        }
    }

    /// Store an entry and return a handle to it
    fn store(&self, entry: Entry) -> Shape {
        let id = Uuid::new_v4();
        let mut shapes = self.shapes.lock().unwrap();
        shapes.insert(id, entry);
        Shape::new(id)
    }

    /// Get a stored entry by handle
    fn entry(&self, shape: &Shape) -> CadResult<Entry> {
        let shapes = self.shapes.lock().unwrap();
        shapes
            .get(&shape.id())
            .cloned()
            .ok_or(CadError::UnknownShape(shape.id()))
    }

    /// Get the CSG tree of a shape that must be a single solid
    fn solid_node(&self, shape: &Shape) -> CadResult<CsgNode> {
        match self.entry(shape)? {
            Entry::Solid(node) => Ok(node),
            Entry::Compound(_) | Entry::Curves { .. } => Err(CadError::BooleanFailed(
                "operand is not a single solid".into(),
            )),
        }
    }

    /// Exact point membership for a shape. Compounds contain a point when
    /// any solid member does; curve networks contain nothing.
    pub fn contains(&self, shape: &Shape, point: Vec3) -> CadResult<bool> {
        match self.entry(shape)? {
            Entry::Solid(node) => Ok(node.contains(point)),
            Entry::Compound(members) => {
                for id in members {
                    if self.contains(&Shape::new(id), point)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Entry::Curves { .. } => Ok(false),
        }
    }

    /// Resolve a shape to its structurally comparable data
    pub fn structure(&self, shape: &Shape) -> CadResult<ShapeData> {
        match self.entry(shape)? {
            Entry::Solid(node) => Ok(ShapeData::Solid(node)),
            Entry::Compound(members) => {
                let mut resolved = Vec::with_capacity(members.len());
                for id in members {
                    resolved.push(self.structure(&Shape::new(id))?);
                }
                Ok(ShapeData::Compound(resolved))
            }
            Entry::Curves { lhs, rhs } => Ok(ShapeData::Curves { lhs, rhs }),
        }
    }

    /// Append the solid members of `id` to `out`, nested compounds flattened
    fn collect_solids(&self, id: Uuid, out: &mut Vec<Shape>) -> CadResult<()> {
        match self.entry(&Shape::new(id))? {
            Entry::Solid(_) => out.push(Shape::new(id)),
            Entry::Compound(members) => {
                for member in members {
                    self.collect_solids(member, out)?;
                }
            }
            Entry::Curves { .. } => {}
        }
        Ok(())
    }
}

impl Default for AnalyticKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl CadKernel for AnalyticKernel {
    fn name(&self) -> &str {
        "analytic"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn create_box(&self, center: Vec3, size: Vec3) -> CadResult<Shape> {
        if size.min_element() <= 0.0 {
            return Err(CadError::InvalidPrimitive(
                "box size must be positive".into(),
            ));
        }
        Ok(self.store(Entry::Solid(CsgNode::Box {
            center,
            half: size * 0.5,
        })))
    }

    fn create_sphere(&self, center: Vec3, radius: f32) -> CadResult<Shape> {
        if radius <= 0.0 {
            return Err(CadError::InvalidPrimitive(
                "sphere radius must be positive".into(),
            ));
        }
        Ok(self.store(Entry::Solid(CsgNode::Sphere { center, radius })))
    }

    fn create_cylinder(
        &self,
        center: Vec3,
        radius: f32,
        height: f32,
        axis: Vec3,
    ) -> CadResult<Shape> {
        if radius <= 0.0 || height <= 0.0 {
            return Err(CadError::InvalidPrimitive(
                "cylinder radius and height must be positive".into(),
            ));
        }
        let axis = axis.try_normalize().ok_or(CadError::InvalidPrimitive(
            "cylinder axis must be non-zero".into(),
        ))?;
        Ok(self.store(Entry::Solid(CsgNode::Cylinder {
            center,
            radius,
            half_height: height * 0.5,
            axis,
        })))
    }

    fn fuse(&self, a: &Shape, b: &Shape) -> CadResult<Shape> {
        let lhs = self.solid_node(a)?;
        let rhs = self.solid_node(b)?;

        // Disjoint operands keep their own bodies; the result is a compound
        // holding both, as B-rep kernels produce for non-touching fuses.
        if lhs.bounds_disjoint(&rhs) {
            return Ok(self.store(Entry::Compound(vec![a.id(), b.id()])));
        }

        Ok(self.store(Entry::Solid(CsgNode::Union(
            Box::new(lhs),
            Box::new(rhs),
        ))))
    }

    fn cut(&self, a: &Shape, b: &Shape) -> CadResult<Shape> {
        let lhs = self.solid_node(a)?;
        let rhs = self.solid_node(b)?;
        Ok(self.store(Entry::Solid(CsgNode::Difference(
            Box::new(lhs),
            Box::new(rhs),
        ))))
    }

    fn common(&self, a: &Shape, b: &Shape) -> CadResult<Shape> {
        let lhs = self.solid_node(a)?;
        let rhs = self.solid_node(b)?;
        Ok(self.store(Entry::Solid(CsgNode::Intersection(
            Box::new(lhs),
            Box::new(rhs),
        ))))
    }

    fn section(&self, a: &Shape, b: &Shape) -> CadResult<Shape> {
        let lhs = self.solid_node(a)?;
        let rhs = self.solid_node(b)?;
        Ok(self.store(Entry::Curves { lhs, rhs }))
    }

    fn shape_kind(&self, shape: &Shape) -> CadResult<ShapeKind> {
        match self.entry(shape)? {
            Entry::Solid(_) => Ok(ShapeKind::Solid),
            Entry::Compound(_) | Entry::Curves { .. } => Ok(ShapeKind::Compound),
        }
    }

    fn solids_of(&self, shape: &Shape) -> CadResult<Vec<Shape>> {
        let mut out = Vec::new();
        self.collect_solids(shape.id(), &mut out)?;
        Ok(out)
    }

    fn make_compound(&self, shapes: &[Shape]) -> CadResult<Shape> {
        let mut members = Vec::with_capacity(shapes.len());
        for shape in shapes {
            // Validates that every member is known, non-null geometry
            self.entry(shape)?;
            members.push(shape.id());
        }
        Ok(self.store(Entry::Compound(members)))
    }
}
