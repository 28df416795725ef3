//! Result types for a force-method analysis
//!
//! The result object is self-contained and serializable: bar fields keep
//! their piecewise-polynomial breakpoints and coefficients so consumers
//! can sample exactly without calling back into the engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analysis::Redundant;
use crate::math::PiecewisePoly;

/// Reaction at a supported joint
///
/// Forces exerted by the support on the structure, global axes (Y+ down,
/// Mz clockwise positive).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Reaction {
    /// Reaction force along global X (kN)
    pub rx: f64,
    /// Reaction force along global Y (kN)
    pub ry: f64,
    /// Reaction moment about Z (kNm)
    pub mz: f64,
}

impl Reaction {
    /// Create from components
    pub fn new(rx: f64, ry: f64, mz: f64) -> Self {
        Self { rx, ry, mz }
    }

    /// Magnitude of the force part
    pub fn force_magnitude(&self) -> f64 {
        self.rx.hypot(self.ry)
    }
}

/// Displacement of a joint
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct JointDisplacement {
    /// Translation along global X (m)
    pub ux: f64,
    /// Translation along global Y (m), positive downward
    pub uy: f64,
    /// Rotation about Z (rad), positive clockwise
    pub rz: f64,
}

impl JointDisplacement {
    /// Create from components
    pub fn new(ux: f64, uy: f64, rz: f64) -> Self {
        Self { ux, uy, rz }
    }

    /// Magnitude of the translation part
    pub fn translation_magnitude(&self) -> f64 {
        self.ux.hypot(self.uy)
    }
}

/// Internal-force fields and deflection curve of one bar
///
/// All fields are piecewise polynomials in the local abscissa x measured
/// from the i-end, 0 ≤ x ≤ L. N is positive in tension; V and M follow
/// the TERNA convention (M positive tensions the −y' fiber, dM/dx = −V).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BarField {
    /// Bar length (m)
    pub length: f64,
    /// Axial force field N(x) (kN)
    pub normal: PiecewisePoly,
    /// Shear force field V(x) (kN)
    pub shear: PiecewisePoly,
    /// Bending moment field M(x) (kNm)
    pub moment: PiecewisePoly,
    /// Axial displacement u(x) along local x' (m)
    pub axial_disp: PiecewisePoly,
    /// Transverse deflection v(x) along local y' (m)
    pub deflection: PiecewisePoly,
    /// Cross-section rotation θ(x) (rad, clockwise)
    pub rotation: PiecewisePoly,
}

impl BarField {
    /// Axial force at x (right-continuous at jumps)
    pub fn n(&self, x: f64) -> f64 {
        self.normal.value(x)
    }

    /// Shear force at x (right-continuous at jumps)
    pub fn v(&self, x: f64) -> f64 {
        self.shear.value(x)
    }

    /// Bending moment at x
    pub fn m(&self, x: f64) -> f64 {
        self.moment.value(x)
    }

    /// Left limits at x, for sampling across a jump
    pub fn before(&self, x: f64) -> (f64, f64, f64) {
        (
            self.normal.value_before(x),
            self.shear.value_before(x),
            self.moment.value_before(x),
        )
    }

    /// Local displacements (u, v) and rotation θ at x
    pub fn displacement(&self, x: f64) -> (f64, f64, f64) {
        (
            self.axial_disp.value(x),
            self.deflection.value(x),
            self.rotation.value(x),
        )
    }

    /// The union of the three force fields' breakpoints
    pub fn breakpoints(&self) -> Vec<f64> {
        let b = self.normal.merged_breaks(&self.shear.breaks);
        self.moment.merged_breaks(&b)
    }
}

/// Numerical quality record of one analysis
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Diagnostics {
    /// 2-norm condition number of the flexibility matrix (1.0 when gh = 0)
    pub condition_number: f64,
    /// Relative residual of the compatibility solve
    pub residual_norm: f64,
    /// Global equilibrium residuals (ΣFx, ΣFy, ΣMz about the origin)
    pub equilibrium: [f64; 3],
    /// Non-fatal findings, e.g. the ill-conditioning warning band
    pub warnings: Vec<String>,
}

/// Complete output of one `analyze` call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Degree of static indeterminacy
    pub gh: usize,
    /// Redundants actually used, in solution order
    pub redundants: Vec<Redundant>,
    /// Redundant values, one-to-one with `redundants`
    pub x: Vec<f64>,
    /// Reactions per supported joint
    pub reactions: BTreeMap<u32, Reaction>,
    /// Internal-force fields per bar
    pub bar_fields: BTreeMap<u32, BarField>,
    /// Displacements per joint
    pub joint_displacements: BTreeMap<u32, JointDisplacement>,
    /// Numerical quality record
    pub diagnostics: Diagnostics,
}

impl AnalysisResult {
    /// Reaction at a joint, if it is supported
    pub fn reaction(&self, joint: u32) -> Option<Reaction> {
        self.reactions.get(&joint).copied()
    }

    /// Field of a bar
    pub fn bar_field(&self, bar: u32) -> Option<&BarField> {
        self.bar_fields.get(&bar)
    }

    /// Displacement of a joint
    pub fn joint_displacement(&self, joint: u32) -> Option<JointDisplacement> {
        self.joint_displacements.get(&joint).copied()
    }

    /// Largest absolute bending moment over all bars
    pub fn max_moment(&self) -> f64 {
        let mut max = 0.0_f64;
        for field in self.bar_fields.values() {
            for &x in &field.moment.breaks {
                max = max.max(field.m(x).abs());
                max = max.max(field.moment.value_before(x).abs());
            }
        }
        max
    }
}
