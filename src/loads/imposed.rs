//! Prescribed support displacements

use serde::{Deserialize, Serialize};

use crate::elements::Dof;

/// A prescribed displacement at a supported joint
///
/// Only restrained directions may be prescribed; settlements are positive
/// in the global axes (dy > 0 moves the support downward).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ImposedDisplacement {
    /// Joint the displacement is prescribed at
    pub joint: u32,
    /// Displacement along global X (m)
    pub dx: f64,
    /// Displacement along global Y (m), positive downward
    pub dy: f64,
    /// Rotation about Z (rad), positive clockwise
    pub dtheta: f64,
}

impl ImposedDisplacement {
    /// Create a new imposed displacement
    pub fn new(joint: u32, dx: f64, dy: f64, dtheta: f64) -> Self {
        Self {
            joint,
            dx,
            dy,
            dtheta,
        }
    }

    /// Vertical settlement (positive downward)
    pub fn settlement(joint: u32, dy: f64) -> Self {
        Self::new(joint, 0.0, dy, 0.0)
    }

    /// Component along the given DOF
    pub fn component(&self, dof: Dof) -> f64 {
        match dof {
            Dof::X => self.dx,
            Dof::Y => self.dy,
            Dof::Rz => self.dtheta,
        }
    }
}
