//! Joint - a point of the planar frame
//!
//! Coordinates follow the TERNA convention: X positive to the right,
//! Y positive downward.

use serde::{Deserialize, Serialize};

/// A joint of the planar frame model
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Joint {
    /// X coordinate (m)
    pub x: f64,
    /// Y coordinate (m), positive downward
    pub y: f64,
}

impl Joint {
    /// Create a new joint at the given coordinates
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Get the coordinates as an array
    pub fn coords(&self) -> [f64; 2] {
        [self.x, self.y]
    }

    /// Calculate distance to another joint
    pub fn distance_to(&self, other: &Joint) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joint_distance() {
        let a = Joint::new(0.0, 0.0);
        let b = Joint::new(3.0, 4.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
    }
}
