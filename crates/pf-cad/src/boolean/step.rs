//! A single boolean combination step

use thiserror::Error;

use crate::classify::extract_solid;
use crate::kernel::{BooleanKind, CadKernel, Shape};

/// Error from one boolean step
#[derive(Debug, Clone, Error)]
pub enum StepError {
    /// The base shape was null going into the step
    #[error("base shape is null")]
    NullBase,

    /// The tool shape was null going into the step
    #[error("tool shape is null")]
    NullTool,

    /// The kernel did not complete the operation, or its result held no
    /// solid where one was required
    #[error("{op} failed: {reason}")]
    Failed { op: BooleanKind, reason: String },
}

/// Combine `base` with `tool` under `op`.
///
/// Both operands must be non-null; this is checked before the kernel is
/// invoked, since null operands put kernels into undefined territory. For
/// difference, argument order is `base` minus `tool`.
///
/// Union and section results are collapsed to their solid content and
/// rejected when none exists. Difference and intersection results are passed
/// through raw, without a solid-extraction step.
pub fn apply(
    kernel: &dyn CadKernel,
    op: BooleanKind,
    base: &Shape,
    tool: &Shape,
) -> Result<Shape, StepError> {
    if base.is_null() {
        return Err(StepError::NullBase);
    }
    if tool.is_null() {
        return Err(StepError::NullTool);
    }

    match op {
        BooleanKind::Union => {
            let raw = kernel
                .fuse(base, tool)
                .map_err(|e| StepError::Failed { op, reason: e.to_string() })?;
            // A fuse can hand back a compound of several bodies
            let solid = extract_solid(kernel, &raw)
                .map_err(|e| StepError::Failed { op, reason: e.to_string() })?;
            if solid.is_null() {
                return Err(StepError::Failed {
                    op,
                    reason: "resulting shape is not a solid".into(),
                });
            }
            Ok(solid)
        }
        BooleanKind::Difference => kernel
            .cut(base, tool)
            .map_err(|e| StepError::Failed { op, reason: e.to_string() }),
        BooleanKind::Intersection => kernel
            .common(base, tool)
            .map_err(|e| StepError::Failed { op, reason: e.to_string() }),
        BooleanKind::Section => {
            let raw = kernel
                .section(base, tool)
                .map_err(|e| StepError::Failed { op, reason: e.to_string() })?;
            let solid = extract_solid(kernel, &raw)
                .map_err(|e| StepError::Failed { op, reason: e.to_string() })?;
            if solid.is_null() {
                return Err(StepError::Failed {
                    op,
                    reason: "resulting shape is not a solid".into(),
                });
            }
            Ok(solid)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{AnalyticKernel, CsgNode, NullKernel, ShapeData, ShapeKind};
    use glam::Vec3;

    fn cube(k: &AnalyticKernel) -> Shape {
        k.create_box(Vec3::ZERO, Vec3::splat(2.0)).unwrap()
    }

    fn ball(k: &AnalyticKernel, center: Vec3) -> Shape {
        k.create_sphere(center, 1.0).unwrap()
    }

    #[test]
    fn null_operands_are_rejected_before_the_kernel_runs() {
        let k = AnalyticKernel::new();
        let cube = cube(&k);

        // NullKernel would error on any call; reaching it would change the
        // error kind, so these assertions also prove the kernel is not hit.
        let err = apply(&NullKernel, BooleanKind::Union, &Shape::null(), &cube).unwrap_err();
        assert!(matches!(err, StepError::NullBase));

        let err = apply(&NullKernel, BooleanKind::Union, &cube, &Shape::null()).unwrap_err();
        assert!(matches!(err, StepError::NullTool));
    }

    #[test]
    fn kernel_failure_maps_to_failed() {
        let k = AnalyticKernel::new();
        let a = cube(&k);
        let b = ball(&k, Vec3::ZERO);
        for op in [
            BooleanKind::Union,
            BooleanKind::Difference,
            BooleanKind::Intersection,
            BooleanKind::Section,
        ] {
            let err = apply(&NullKernel, op, &a, &b).unwrap_err();
            assert!(matches!(err, StepError::Failed { op: failed, .. } if failed == op));
        }
    }

    #[test]
    fn union_collapses_disjoint_compound_to_first_solid() {
        let k = AnalyticKernel::new();
        let a = cube(&k);
        let b = ball(&k, Vec3::new(10.0, 0.0, 0.0));

        let result = apply(&k, BooleanKind::Union, &a, &b).unwrap();
        assert_eq!(k.shape_kind(&result).unwrap(), ShapeKind::Solid);
        assert_eq!(result, a);
    }

    #[test]
    fn difference_result_is_raw_and_ordered() {
        let k = AnalyticKernel::new();
        let a = cube(&k);
        let b = ball(&k, Vec3::new(1.0, 0.0, 0.0));

        let result = apply(&k, BooleanKind::Difference, &a, &b).unwrap();
        match k.structure(&result).unwrap() {
            ShapeData::Solid(CsgNode::Difference(lhs, rhs)) => {
                assert!(matches!(*lhs, CsgNode::Box { .. }));
                assert!(matches!(*rhs, CsgNode::Sphere { .. }));
            }
            other => panic!("expected a raw difference node, got {other:?}"),
        }
    }

    #[test]
    fn intersection_result_is_raw() {
        let k = AnalyticKernel::new();
        let a = cube(&k);
        let b = ball(&k, Vec3::ZERO);

        let result = apply(&k, BooleanKind::Intersection, &a, &b).unwrap();
        assert!(matches!(
            k.structure(&result).unwrap(),
            ShapeData::Solid(CsgNode::Intersection(_, _))
        ));
    }

    #[test]
    fn section_without_solid_content_fails() {
        let k = AnalyticKernel::new();
        let a = cube(&k);
        let b = ball(&k, Vec3::ZERO);

        let err = apply(&k, BooleanKind::Section, &a, &b).unwrap_err();
        assert!(
            matches!(err, StepError::Failed { op: BooleanKind::Section, ref reason }
                if reason.contains("not a solid"))
        );
    }
}
