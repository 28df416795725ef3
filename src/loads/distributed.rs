//! Distributed line loads on bars

use serde::{Deserialize, Serialize};

/// A linearly varying line load over a bar segment
///
/// Intensity varies linearly from `q1` at `x1` to `q2` at `x2`; uniform,
/// triangular and trapezoidal shapes are the three degenerate cases. An
/// `x2` of `f64::INFINITY` is clamped to the bar length during analysis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DistributedLoad {
    /// Bar the load acts on
    pub bar: u32,
    /// Intensity at the segment start (kN/m)
    pub q1: f64,
    /// Intensity at the segment end (kN/m)
    pub q2: f64,
    /// Segment start, distance from the i-end (m)
    pub x1: f64,
    /// Segment end, distance from the i-end (m)
    pub x2: f64,
    /// Direction angle from local x' (rad, clockwise)
    pub angle: f64,
}

impl DistributedLoad {
    /// Create a new distributed load
    pub fn new(bar: u32, q1: f64, q2: f64, x1: f64, x2: f64, angle: f64) -> Self {
        Self {
            bar,
            q1,
            q2,
            x1,
            x2,
            angle,
        }
    }

    /// Uniform load over the full bar length, toward local +y'
    pub fn uniform(bar: u32, q: f64) -> Self {
        Self::new(bar, q, q, 0.0, f64::INFINITY, std::f64::consts::FRAC_PI_2)
    }

    /// Triangular load over the full length: zero at i, `q_max` at j
    pub fn triangular(bar: u32, q_max: f64) -> Self {
        Self::new(
            bar,
            0.0,
            q_max,
            0.0,
            f64::INFINITY,
            std::f64::consts::FRAC_PI_2,
        )
    }

    /// Trapezoidal load over the full length
    pub fn trapezoidal(bar: u32, q1: f64, q2: f64) -> Self {
        Self::new(bar, q1, q2, 0.0, f64::INFINITY, std::f64::consts::FRAC_PI_2)
    }

    /// Whether the intensity is constant
    pub fn is_uniform(&self) -> bool {
        (self.q1 - self.q2).abs() < 1e-12
    }

    /// Intensity at distance `x` from the i-end, zero outside the segment
    pub fn intensity_at(&self, x: f64) -> f64 {
        if x < self.x1 || x > self.x2 || self.x2 <= self.x1 {
            return 0.0;
        }
        let t = (x - self.x1) / (self.x2 - self.x1);
        self.q1 + t * (self.q2 - self.q1)
    }

    /// Total force carried by the segment
    pub fn total_force(&self) -> f64 {
        (self.q1 + self.q2) / 2.0 * (self.x2 - self.x1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intensity_interpolation() {
        let q = DistributedLoad::new(1, 2.0, 6.0, 1.0, 5.0, 0.0);
        assert!((q.intensity_at(1.0) - 2.0).abs() < 1e-12);
        assert!((q.intensity_at(3.0) - 4.0).abs() < 1e-12);
        assert!((q.intensity_at(5.0) - 6.0).abs() < 1e-12);
        assert_eq!(q.intensity_at(0.5), 0.0);
    }

    #[test]
    fn test_total_force() {
        let q = DistributedLoad::new(1, 2.0, 6.0, 1.0, 5.0, 0.0);
        assert!((q.total_force() - 16.0).abs() < 1e-12);
    }
}
