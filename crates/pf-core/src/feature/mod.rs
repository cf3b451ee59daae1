//! Boolean combination feature
//!
//! Combines a base object with an ordered list of tool objects under one
//! boolean set operation and stores the folded result. This is the
//! document-side adapter around the pipeline in [`pf_cad::boolean`]: it
//! resolves configuration to shapes, delegates, and maps every failure into
//! a typed execution result without ever leaving a partial result behind.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use pf_cad::boolean::{self, BooleanError, PipelineOutcome};
use pf_cad::kernel::{BooleanKind, CadKernel, Shape};

use crate::document::Document;

/// Feature-level execution errors
#[derive(Debug, Clone, Error)]
pub enum ExecutionError {
    /// The base object is missing or its shape is null
    #[error("invalid base: {0}")]
    InvalidBase(String),

    /// The feature is not a member of any body
    #[error("boolean feature '{0}' is not inside a body")]
    NotInContainer(String),

    /// A referenced tool is not a geometry-bearing object
    #[error("unsupported tool: {0}")]
    UnsupportedSource(String),

    /// No boolean feature with the given id exists
    #[error("feature not found: {0}")]
    FeatureNotFound(Uuid),

    /// The pipeline itself failed
    #[error(transparent)]
    Pipeline(#[from] BooleanError),
}

/// Outcome of a successful recompute
#[derive(Debug, Clone, PartialEq)]
pub enum Recompute {
    /// A new result shape was produced
    Updated(Shape),
    /// The tool list was empty; prior output stays as it is
    Unchanged,
}

/// Serialization format for backward compatibility.
///
/// The tool list was persisted under `bodies` before it became a generic
/// linked-object list; old documents are routed into `tools` on restore and
/// the legacy name is never written back.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BooleanFeatureData {
    id: Uuid,
    name: String,
    operation: BooleanKind,
    #[serde(default)]
    base: Option<Uuid>,
    #[serde(default)]
    tools: Vec<Uuid>,
    #[serde(default, rename = "bodies", skip_serializing)]
    legacy_bodies: Vec<Uuid>,
    #[serde(default)]
    shape: Shape,
}

impl From<BooleanFeature> for BooleanFeatureData {
    fn from(feature: BooleanFeature) -> Self {
        Self {
            id: feature.id,
            name: feature.name,
            operation: feature.operation,
            base: feature.base,
            tools: feature.tools,
            legacy_bodies: Vec::new(),
            shape: feature.shape,
        }
    }
}

impl From<BooleanFeatureData> for BooleanFeature {
    fn from(data: BooleanFeatureData) -> Self {
        // Adopt the legacy list only when the current field is absent so a
        // document carrying both can never lose the newer data.
        let tools = if data.tools.is_empty() {
            data.legacy_bodies
        } else {
            data.tools
        };
        Self {
            id: data.id,
            name: data.name,
            operation: data.operation,
            base: data.base,
            tools,
            shape: data.shape,
            touched: false,
        }
    }
}

/// A boolean combination feature
#[derive(Debug, Clone, Serialize)]
#[serde(into = "BooleanFeatureData")]
pub struct BooleanFeature {
    id: Uuid,
    name: String,
    operation: BooleanKind,
    base: Option<Uuid>,
    tools: Vec<Uuid>,
    /// Last successfully computed output (null until the first recompute)
    shape: Shape,
    /// Whether the tool list changed since the last recompute
    touched: bool,
}

impl<'de> Deserialize<'de> for BooleanFeature {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let data = BooleanFeatureData::deserialize(deserializer)?;
        Ok(BooleanFeature::from(data))
    }
}

impl BooleanFeature {
    /// Create a feature with no base or tools linked yet
    pub fn new(name: impl Into<String>, operation: BooleanKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            operation,
            base: None,
            tools: Vec::new(),
            shape: Shape::null(),
            touched: false,
        }
    }

    /// Unique id of this feature
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Display name of this feature
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The configured set operation
    pub fn operation(&self) -> BooleanKind {
        self.operation
    }

    /// Select the set operation applied at every step of the fold
    pub fn set_operation(&mut self, operation: BooleanKind) {
        self.operation = operation;
    }

    /// The linked base object
    pub fn base(&self) -> Option<Uuid> {
        self.base
    }

    /// Link the base object the fold starts from
    pub fn set_base(&mut self, base: Option<Uuid>) {
        self.base = base;
    }

    /// The ordered tool list
    pub fn tools(&self) -> &[Uuid] {
        &self.tools
    }

    /// Replace the ordered tool list.
    ///
    /// Tool-list edits mark the feature as needing recomputation; edits to
    /// the other properties do not.
    pub fn set_tools(&mut self, tools: Vec<Uuid>) {
        self.tools = tools;
        self.touched = true;
    }

    /// Last computed output shape (the null sentinel before the first
    /// successful recompute)
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Whether a recompute is pending
    pub fn must_recompute(&self) -> bool {
        self.touched
    }

    pub(crate) fn store_result(&mut self, shape: Shape) {
        self.shape = shape;
        self.touched = false;
    }

    pub(crate) fn clear_touched(&mut self) {
        self.touched = false;
    }

    /// Resolve this feature's configuration against `doc` and run the
    /// boolean pipeline.
    ///
    /// Pure with respect to the document: the caller stores the returned
    /// shape ([`Document::recompute_boolean`]), so no failure can leave a
    /// partial result behind. An empty tool list is a legitimate authoring
    /// state and reports [`Recompute::Unchanged`].
    pub fn recompute(
        &self,
        doc: &Document,
        kernel: &dyn CadKernel,
    ) -> Result<Recompute, ExecutionError> {
        let base_id = self
            .base
            .ok_or_else(|| ExecutionError::InvalidBase("no base object is linked".into()))?;
        let base_obj = doc.get(base_id).ok_or_else(|| {
            ExecutionError::InvalidBase(format!("linked base object {base_id} does not exist"))
        })?;

        if self.tools.is_empty() {
            return Ok(Recompute::Unchanged);
        }

        let base_shape = base_obj.shape().ok_or_else(|| {
            ExecutionError::InvalidBase(format!(
                "base object '{}' carries no shape",
                base_obj.name()
            ))
        })?;
        if base_shape.is_null() {
            return Err(ExecutionError::InvalidBase("base shape is null".into()));
        }

        // The feature must live inside a body for the result to have a home
        doc.body_of(self.id)
            .ok_or_else(|| ExecutionError::NotInContainer(self.name.clone()))?;

        let mut tool_shapes = Vec::with_capacity(self.tools.len());
        for &tool_id in &self.tools {
            tool_shapes.push(tool_shape(doc, tool_id)?);
        }

        match boolean::run(kernel, self.operation, &base_shape, &tool_shapes)? {
            PipelineOutcome::Combined(shape) => Ok(Recompute::Updated(shape)),
            PipelineOutcome::NothingToDo => Ok(Recompute::Unchanged),
        }
    }
}

/// Resolve one tool reference to its shape.
///
/// The referenced object's own placed shape is used, so tools keep their
/// position relative to the base.
fn tool_shape(doc: &Document, id: Uuid) -> Result<Shape, ExecutionError> {
    let object = doc.get(id).ok_or_else(|| {
        ExecutionError::UnsupportedSource(format!("referenced object {id} does not exist"))
    })?;
    object.shape().ok_or_else(|| {
        ExecutionError::UnsupportedSource(format!(
            "'{}' is not a geometry-bearing object",
            object.name()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DatumPlane, Part};
    use glam::Vec3;
    use pf_cad::kernel::{AnalyticKernel, NullKernel};

    /// Document with a cube part, a sphere part overlapping it, and a
    /// boolean feature inside a body
    fn setup(k: &AnalyticKernel, op: BooleanKind) -> (Document, Uuid, Uuid, Uuid) {
        let mut doc = Document::new("test");
        let cube = k.create_box(Vec3::ZERO, Vec3::splat(2.0)).unwrap();
        let sphere = k.create_sphere(Vec3::new(1.0, 0.0, 0.0), 0.8).unwrap();
        let cube_id = doc.add_part(Part::new("Cube", cube));
        let sphere_id = doc.add_part(Part::new("Sphere", sphere));

        let mut feature = BooleanFeature::new("Boolean", op);
        feature.set_base(Some(cube_id));
        feature.set_tools(vec![sphere_id]);
        let feature_id = doc.add_boolean(feature);

        let body_id = doc.add_body("Body");
        doc.add_to_body(body_id, feature_id);

        (doc, feature_id, cube_id, sphere_id)
    }

    #[test]
    fn union_recompute_updates_stored_output() {
        let k = AnalyticKernel::new();
        let (mut doc, feature_id, _, _) = setup(&k, BooleanKind::Union);

        assert!(doc.boolean_feature(feature_id).unwrap().shape().is_null());
        let outcome = doc.recompute_boolean(feature_id, &k).unwrap();

        let stored = doc.boolean_feature(feature_id).unwrap().shape().clone();
        assert_eq!(outcome, Recompute::Updated(stored.clone()));
        assert!(!stored.is_null());
        // The sphere-only region belongs to the union
        assert!(k.contains(&stored, Vec3::new(1.6, 0.0, 0.0)).unwrap());
    }

    #[test]
    fn empty_tool_list_skips_and_preserves_output() {
        let k = AnalyticKernel::new();
        let (mut doc, feature_id, _, _) = setup(&k, BooleanKind::Union);

        doc.recompute_boolean(feature_id, &k).unwrap();
        let before = doc.boolean_feature(feature_id).unwrap().shape().clone();

        doc.boolean_feature_mut(feature_id)
            .unwrap()
            .set_tools(Vec::new());
        let outcome = doc.recompute_boolean(feature_id, &k).unwrap();

        assert_eq!(outcome, Recompute::Unchanged);
        assert_eq!(doc.boolean_feature(feature_id).unwrap().shape(), &before);
    }

    #[test]
    fn missing_base_is_invalid() {
        let k = AnalyticKernel::new();
        let (mut doc, feature_id, _, _) = setup(&k, BooleanKind::Union);
        doc.boolean_feature_mut(feature_id).unwrap().set_base(None);

        let err = doc.recompute_boolean(feature_id, &k).unwrap_err();
        assert!(matches!(err, ExecutionError::InvalidBase(_)));

        // A dangling base reference is just as invalid
        doc.boolean_feature_mut(feature_id)
            .unwrap()
            .set_base(Some(Uuid::new_v4()));
        let err = doc.recompute_boolean(feature_id, &k).unwrap_err();
        assert!(matches!(err, ExecutionError::InvalidBase(_)));
    }

    #[test]
    fn null_base_shape_is_invalid() {
        let k = AnalyticKernel::new();
        let (mut doc, feature_id, cube_id, _) = setup(&k, BooleanKind::Union);

        if let Some(crate::document::DocObject::Part(p)) = doc.get_mut(cube_id) {
            p.shape = Shape::null();
        }
        let err = doc.recompute_boolean(feature_id, &k).unwrap_err();
        assert!(matches!(err, ExecutionError::InvalidBase(_)));
    }

    #[test]
    fn feature_outside_any_body_is_rejected() {
        let k = AnalyticKernel::new();
        let mut doc = Document::new("test");
        let cube = k.create_box(Vec3::ZERO, Vec3::ONE).unwrap();
        let sphere = k.create_sphere(Vec3::ZERO, 0.4).unwrap();
        let cube_id = doc.add_part(Part::new("Cube", cube));
        let sphere_id = doc.add_part(Part::new("Sphere", sphere));

        let mut feature = BooleanFeature::new("Boolean", BooleanKind::Union);
        feature.set_base(Some(cube_id));
        feature.set_tools(vec![sphere_id]);
        let feature_id = doc.add_boolean(feature);

        let err = doc.recompute_boolean(feature_id, &k).unwrap_err();
        assert!(matches!(err, ExecutionError::NotInContainer(_)));
    }

    #[test]
    fn datum_tool_is_unsupported() {
        let k = AnalyticKernel::new();
        let (mut doc, feature_id, _, _) = setup(&k, BooleanKind::Union);
        let datum_id = doc.add_datum(DatumPlane::new("Plane", Vec3::ZERO, Vec3::Z));

        doc.boolean_feature_mut(feature_id)
            .unwrap()
            .set_tools(vec![datum_id]);
        let err = doc.recompute_boolean(feature_id, &k).unwrap_err();
        assert!(matches!(err, ExecutionError::UnsupportedSource(_)));
    }

    #[test]
    fn pipeline_failure_leaves_stored_output_untouched() {
        let k = AnalyticKernel::new();
        let (mut doc, feature_id, _, _) = setup(&k, BooleanKind::Union);

        doc.recompute_boolean(feature_id, &k).unwrap();
        let before = doc.boolean_feature(feature_id).unwrap().shape().clone();

        // Recomputing against a dead kernel fails the pipeline itself
        let err = doc.recompute_boolean(feature_id, &NullKernel).unwrap_err();
        assert!(matches!(
            err,
            ExecutionError::Pipeline(BooleanError::OperationFailed { index: 0, .. })
        ));
        assert_eq!(doc.boolean_feature(feature_id).unwrap().shape(), &before);
    }

    #[test]
    fn null_tool_reports_its_index() {
        let k = AnalyticKernel::new();
        let (mut doc, feature_id, _, sphere_id) = setup(&k, BooleanKind::Union);

        // A boolean feature that was never computed contributes a null shape
        let pending = doc.add_boolean(BooleanFeature::new("Pending", BooleanKind::Union));
        doc.boolean_feature_mut(feature_id)
            .unwrap()
            .set_tools(vec![sphere_id, pending]);

        let err = doc.recompute_boolean(feature_id, &k).unwrap_err();
        assert!(matches!(
            err,
            ExecutionError::Pipeline(BooleanError::NullShape { index: 1 })
        ));
    }

    #[test]
    fn computed_feature_can_be_a_tool() {
        let k = AnalyticKernel::new();
        let (mut doc, feature_id, cube_id, _) = setup(&k, BooleanKind::Union);
        doc.recompute_boolean(feature_id, &k).unwrap();

        let mut second = BooleanFeature::new("Cut", BooleanKind::Difference);
        second.set_base(Some(cube_id));
        second.set_tools(vec![feature_id]);
        let second_id = doc.add_boolean(second);
        let body_id = doc.add_body("Body2");
        doc.add_to_body(body_id, second_id);

        let outcome = doc.recompute_boolean(second_id, &k).unwrap();
        assert!(matches!(outcome, Recompute::Updated(_)));
    }

    #[test]
    fn tool_list_edits_mark_the_feature_touched() {
        let k = AnalyticKernel::new();
        let (mut doc, feature_id, _, sphere_id) = setup(&k, BooleanKind::Union);

        // set_tools in setup marked it
        assert!(doc.boolean_feature(feature_id).unwrap().must_recompute());
        doc.recompute_boolean(feature_id, &k).unwrap();
        assert!(!doc.boolean_feature(feature_id).unwrap().must_recompute());

        let feature = doc.boolean_feature_mut(feature_id).unwrap();
        feature.set_operation(BooleanKind::Difference);
        feature.set_base(Some(sphere_id));
        assert!(
            !feature.must_recompute(),
            "only tool-list edits mark the feature"
        );

        feature.set_tools(vec![sphere_id]);
        assert!(feature.must_recompute());
    }

    #[test]
    fn legacy_bodies_field_restores_into_tools() {
        let tool_a = Uuid::new_v4();
        let tool_b = Uuid::new_v4();
        let base = Uuid::new_v4();
        let src = format!(
            "(id: \"{}\", name: \"Boolean\", operation: Difference, base: Some(\"{base}\"), bodies: [\"{tool_a}\", \"{tool_b}\"])",
            Uuid::new_v4()
        );

        let feature: BooleanFeature = ron::from_str(&src).unwrap();
        assert_eq!(feature.tools(), &[tool_a, tool_b]);
        assert_eq!(feature.base(), Some(base));
        assert_eq!(feature.operation(), BooleanKind::Difference);
        assert!(feature.shape().is_null());

        // The legacy name is gone after the next save
        let out = ron::to_string(&feature).unwrap();
        assert!(out.contains("tools"));
        assert!(!out.contains("bodies"));
    }

    #[test]
    fn current_tools_field_wins_over_legacy() {
        let tool_new = Uuid::new_v4();
        let tool_old = Uuid::new_v4();
        let src = format!(
            "(id: \"{}\", name: \"Boolean\", operation: Union, tools: [\"{tool_new}\"], bodies: [\"{tool_old}\"])",
            Uuid::new_v4()
        );

        let feature: BooleanFeature = ron::from_str(&src).unwrap();
        assert_eq!(feature.tools(), &[tool_new]);
    }
}
