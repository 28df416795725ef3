//! Thermal actions on bars

use serde::{Deserialize, Serialize};

/// Temperature change on a bar
///
/// `dt_uniform` stretches the axis; `dt_gradient` is the temperature of
/// the +y' fiber minus that of the −y' fiber and curves the bar. The
/// gradient needs the section depth `h` to be set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ThermalLoad {
    /// Bar the load acts on
    pub bar: u32,
    /// Uniform temperature change ΔT_u (°C)
    pub dt_uniform: f64,
    /// Through-depth temperature difference ΔT_g (°C)
    pub dt_gradient: f64,
}

impl ThermalLoad {
    /// Create a new thermal load
    pub fn new(bar: u32, dt_uniform: f64, dt_gradient: f64) -> Self {
        Self {
            bar,
            dt_uniform,
            dt_gradient,
        }
    }

    /// Uniform heating or cooling only
    pub fn uniform(bar: u32, dt: f64) -> Self {
        Self::new(bar, dt, 0.0)
    }
}
