//! Concentrated forces on bar interiors

use serde::{Deserialize, Serialize};

/// A concentrated force on a bar
///
/// The direction angle is measured from the bar's local x' axis,
/// clockwise positive; the global direction is θ + angle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BarPointLoad {
    /// Bar the load acts on
    pub bar: u32,
    /// Magnitude (kN)
    pub p: f64,
    /// Distance from the i-end (m), 0 ≤ a ≤ L
    pub a: f64,
    /// Direction angle from local x' (rad, clockwise)
    pub angle: f64,
}

impl BarPointLoad {
    /// Create a new bar point load
    pub fn new(bar: u32, p: f64, a: f64, angle: f64) -> Self {
        Self { bar, p, a, angle }
    }

    /// Transverse load toward local +y' (downward on a horizontal bar)
    pub fn transverse(bar: u32, p: f64, a: f64) -> Self {
        Self::new(bar, p, a, std::f64::consts::FRAC_PI_2)
    }

    /// Axial load along local +x'
    pub fn axial(bar: u32, p: f64, a: f64) -> Self {
        Self::new(bar, p, a, 0.0)
    }
}
