//! Cross-section properties for frame bars

use serde::{Deserialize, Serialize};

/// Cross-section properties of a prismatic bar
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Section {
    /// Cross-sectional area (m²)
    pub a: f64,
    /// Moment of inertia about the bending axis (m⁴)
    pub i_z: f64,
    /// Section depth (m); required only by thermal-gradient loads
    pub h: Option<f64>,
    /// Shear correction factor κ; only read in Timoshenko mode
    pub kappa: Option<f64>,
}

impl Section {
    /// Create a new section with area and inertia
    pub fn new(a: f64, i_z: f64) -> Self {
        Self {
            a,
            i_z,
            h: None,
            kappa: None,
        }
    }

    /// Set the section depth
    pub fn with_depth(mut self, h: f64) -> Self {
        self.h = Some(h);
        self
    }

    /// Set the shear correction factor
    pub fn with_shear_factor(mut self, kappa: f64) -> Self {
        self.kappa = Some(kappa);
        self
    }

    /// Shear correction factor, defaulting to 5/6 (solid rectangle)
    pub fn shear_factor(&self) -> f64 {
        self.kappa.unwrap_or(5.0 / 6.0)
    }

    /// Create a solid rectangular section from width and depth
    pub fn rectangular(width: f64, depth: f64) -> Self {
        Self {
            a: width * depth,
            i_z: width * depth.powi(3) / 12.0,
            h: Some(depth),
            kappa: Some(5.0 / 6.0),
        }
    }

    /// Radius of gyration about the bending axis
    pub fn radius_of_gyration(&self) -> f64 {
        (self.i_z / self.a).sqrt()
    }
}

impl Default for Section {
    fn default() -> Self {
        // 200mm x 200mm solid rectangle
        Self::rectangular(0.2, 0.2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rectangular_section() {
        let section = Section::rectangular(0.3, 0.5);
        assert!((section.a - 0.15).abs() < 1e-12);
        assert!((section.i_z - 0.3 * 0.125 / 12.0).abs() < 1e-12);
        assert_eq!(section.h, Some(0.5));
    }
}
