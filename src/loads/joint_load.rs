//! Concentrated loads at joints

use serde::{Deserialize, Serialize};

/// Concentrated forces and moment applied at a joint
///
/// Global axes: Fy positive downward, Mz positive clockwise.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct JointLoad {
    /// Joint the load acts on
    pub joint: u32,
    /// Force along global X (kN)
    pub fx: f64,
    /// Force along global Y (kN), positive downward
    pub fy: f64,
    /// Moment about Z (kNm), positive clockwise
    pub mz: f64,
}

impl JointLoad {
    /// Create a new joint load
    pub fn new(joint: u32, fx: f64, fy: f64, mz: f64) -> Self {
        Self { joint, fx, fy, mz }
    }

    /// Downward force of the given magnitude
    pub fn downward(joint: u32, p: f64) -> Self {
        Self::new(joint, 0.0, p.abs(), 0.0)
    }

    /// Horizontal force along +X
    pub fn horizontal(joint: u32, p: f64) -> Self {
        Self::new(joint, p, 0.0, 0.0)
    }

    /// Pure moment, clockwise positive
    pub fn moment(joint: u32, mz: f64) -> Self {
        Self::new(joint, 0.0, 0.0, mz)
    }
}
