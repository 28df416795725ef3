//! Bar - prismatic straight frame element
//!
//! The local x' axis runs from the i-joint to the j-joint; y' is x'
//! rotated 90° clockwise, so for a horizontal bar y' points downward
//! (toward the tensioned fiber under positive bending).

use serde::{Deserialize, Serialize};

use crate::elements::Joint;

/// Minimum admissible bar length (m)
pub(crate) const MIN_LENGTH: f64 = 1e-9;

/// A prismatic straight bar of the planar frame
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Bar {
    /// Id of the start joint
    pub i_joint: u32,
    /// Id of the end joint
    pub j_joint: u32,
    /// Id of the material
    pub material: u32,
    /// Id of the section
    pub section: u32,
    /// Moment release at the i-end (internal hinge)
    pub hinge_i: bool,
    /// Moment release at the j-end (internal hinge)
    pub hinge_j: bool,
}

impl Bar {
    /// Create a new bar between two joints
    pub fn new(i_joint: u32, j_joint: u32, material: u32, section: u32) -> Self {
        Self {
            i_joint,
            j_joint,
            material,
            section,
            hinge_i: false,
            hinge_j: false,
        }
    }

    /// Release the bending moment at the i-end
    pub fn with_hinge_i(mut self) -> Self {
        self.hinge_i = true;
        self
    }

    /// Release the bending moment at the j-end
    pub fn with_hinge_j(mut self) -> Self {
        self.hinge_j = true;
        self
    }

    /// Number of end hinges on this bar
    pub fn hinge_count(&self) -> usize {
        usize::from(self.hinge_i) + usize::from(self.hinge_j)
    }
}

/// Resolved geometry of a bar: length, orientation and local frame
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BarGeometry {
    /// Start joint position
    pub xi: f64,
    pub yi: f64,
    /// Bar length (m)
    pub length: f64,
    /// Orientation angle θ = atan2(Δy, Δx), clockwise positive
    pub theta: f64,
    /// Local x' unit vector (cos θ, sin θ)
    pub ux: [f64; 2],
    /// Local y' unit vector (−sin θ, cos θ)
    pub uy: [f64; 2],
}

impl BarGeometry {
    /// Resolve geometry from the two end joints
    pub fn from_joints(i: &Joint, j: &Joint) -> Self {
        let dx = j.x - i.x;
        let dy = j.y - i.y;
        let length = dx.hypot(dy);
        let theta = dy.atan2(dx);
        let (s, c) = theta.sin_cos();
        Self {
            xi: i.x,
            yi: i.y,
            length,
            theta,
            ux: [c, s],
            uy: [-s, c],
        }
    }

    /// Global position of the point at local abscissa x
    pub fn point_at(&self, x: f64) -> [f64; 2] {
        [self.xi + x * self.ux[0], self.yi + x * self.ux[1]]
    }

    /// Global unit direction of a load angle α measured from local x'
    pub fn load_direction(&self, angle: f64) -> [f64; 2] {
        let (s, c) = (self.theta + angle).sin_cos();
        [c, s]
    }
}
