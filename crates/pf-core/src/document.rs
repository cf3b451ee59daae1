//! Document object model
//!
//! A document holds geometry-bearing parts, reference geometry, and boolean
//! features, plus the bodies grouping them into modeling contexts. The
//! document also drives feature recomputation and owns the single write of a
//! feature's stored output.

use std::collections::HashMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use pf_cad::kernel::{CadKernel, Shape};

use crate::feature::{BooleanFeature, ExecutionError, Recompute};

/// A geometry-bearing source object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    pub id: Uuid,
    pub name: String,
    /// The part's shape as placed in the document. Consumers combining
    /// parts must use this value so relative positioning stays correct.
    pub shape: Shape,
}

impl Part {
    /// Create a part holding `shape`
    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            shape,
        }
    }
}

/// Reference geometry carrying no solid content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatumPlane {
    pub id: Uuid,
    pub name: String,
    pub origin: Vec3,
    pub normal: Vec3,
}

impl DatumPlane {
    /// Create a datum plane; the normal is normalized
    pub fn new(name: impl Into<String>, origin: Vec3, normal: Vec3) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            origin,
            normal: normal.normalize(),
        }
    }
}

/// Any object a document can hold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DocObject {
    /// Geometry-bearing part
    Part(Part),
    /// Reference geometry
    Datum(DatumPlane),
    /// Boolean combination feature
    Boolean(BooleanFeature),
}

impl DocObject {
    /// Unique id of the contained object
    pub fn id(&self) -> Uuid {
        match self {
            DocObject::Part(p) => p.id,
            DocObject::Datum(d) => d.id,
            DocObject::Boolean(f) => f.id(),
        }
    }

    /// Display name of the contained object
    pub fn name(&self) -> &str {
        match self {
            DocObject::Part(p) => &p.name,
            DocObject::Datum(d) => &d.name,
            DocObject::Boolean(f) => f.name(),
        }
    }

    /// The shape this object contributes to downstream geometry, if it is a
    /// geometry-bearing kind.
    ///
    /// A part yields its placed shape; a boolean feature yields its last
    /// computed output (the null sentinel before the first recompute); datum
    /// geometry yields nothing.
    pub fn shape(&self) -> Option<Shape> {
        match self {
            DocObject::Part(p) => Some(p.shape.clone()),
            DocObject::Datum(_) => None,
            DocObject::Boolean(f) => Some(f.shape().clone()),
        }
    }
}

/// Ordered container grouping objects into one modeling context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub id: Uuid,
    pub name: String,
    /// Member object ids, in modeling order
    members: Vec<Uuid>,
}

impl Body {
    /// Create an empty body
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Member object ids in modeling order
    pub fn members(&self) -> &[Uuid] {
        &self.members
    }

    /// Whether `id` is a member of this body
    pub fn contains(&self, id: Uuid) -> bool {
        self.members.contains(&id)
    }
}

/// A document: all objects plus the bodies grouping them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    objects: HashMap<Uuid, DocObject>,
    bodies: HashMap<Uuid, Body>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new("Document")
    }
}

impl Document {
    /// Create a new empty document
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            objects: HashMap::new(),
            bodies: HashMap::new(),
        }
    }

    /// Insert an object, returning its id
    pub fn add(&mut self, object: DocObject) -> Uuid {
        let id = object.id();
        self.objects.insert(id, object);
        id
    }

    /// Insert a part
    pub fn add_part(&mut self, part: Part) -> Uuid {
        self.add(DocObject::Part(part))
    }

    /// Insert a datum plane
    pub fn add_datum(&mut self, datum: DatumPlane) -> Uuid {
        self.add(DocObject::Datum(datum))
    }

    /// Insert a boolean feature
    pub fn add_boolean(&mut self, feature: BooleanFeature) -> Uuid {
        self.add(DocObject::Boolean(feature))
    }

    /// Get an object by id
    pub fn get(&self, id: Uuid) -> Option<&DocObject> {
        self.objects.get(&id)
    }

    /// Iterate over all objects (no particular order)
    pub fn objects(&self) -> impl Iterator<Item = &DocObject> {
        self.objects.values()
    }

    /// Get a mutable object by id
    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut DocObject> {
        self.objects.get_mut(&id)
    }

    /// Get a boolean feature by id
    pub fn boolean_feature(&self, id: Uuid) -> Option<&BooleanFeature> {
        match self.objects.get(&id) {
            Some(DocObject::Boolean(f)) => Some(f),
            _ => None,
        }
    }

    /// Get a mutable boolean feature by id
    pub fn boolean_feature_mut(&mut self, id: Uuid) -> Option<&mut BooleanFeature> {
        match self.objects.get_mut(&id) {
            Some(DocObject::Boolean(f)) => Some(f),
            _ => None,
        }
    }

    /// Create a new empty body, returning its id
    pub fn add_body(&mut self, name: impl Into<String>) -> Uuid {
        let body = Body::new(name);
        let id = body.id;
        self.bodies.insert(id, body);
        id
    }

    /// Get a body by id
    pub fn body(&self, id: Uuid) -> Option<&Body> {
        self.bodies.get(&id)
    }

    /// Append an object to a body. Returns false when the body is unknown.
    pub fn add_to_body(&mut self, body_id: Uuid, object_id: Uuid) -> bool {
        match self.bodies.get_mut(&body_id) {
            Some(body) => {
                if !body.members.contains(&object_id) {
                    body.members.push(object_id);
                }
                true
            }
            None => false,
        }
    }

    /// The body an object belongs to, if any
    pub fn body_of(&self, id: Uuid) -> Option<&Body> {
        self.bodies.values().find(|body| body.contains(id))
    }

    /// Recompute the boolean feature `id` and store its result.
    ///
    /// The stored output is written at most once, only on success; any
    /// failure leaves the last good shape in place.
    pub fn recompute_boolean(
        &mut self,
        id: Uuid,
        kernel: &dyn CadKernel,
    ) -> Result<Recompute, ExecutionError> {
        let feature = self
            .boolean_feature(id)
            .cloned()
            .ok_or(ExecutionError::FeatureNotFound(id))?;

        match feature.recompute(self, kernel) {
            Ok(Recompute::Updated(shape)) => {
                if let Some(f) = self.boolean_feature_mut(id) {
                    f.store_result(shape.clone());
                }
                Ok(Recompute::Updated(shape))
            }
            Ok(Recompute::Unchanged) => {
                if let Some(f) = self.boolean_feature_mut(id) {
                    f.clear_touched();
                }
                Ok(Recompute::Unchanged)
            }
            Err(e) => {
                tracing::warn!(feature = %feature.name(), error = %e, "boolean recompute failed");
                Err(e)
            }
        }
    }
}
