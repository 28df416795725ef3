//! Load case types
//!
//! Loads are tagged variants over joints and bars. Magnitudes are kN and
//! kNm, angles are measured from the bar's local x' axis, clockwise
//! positive, so `angle = π/2` on a horizontal bar points straight down.

mod distributed;
mod imposed;
mod joint_load;
mod point;
mod thermal;

pub use distributed::DistributedLoad;
pub use imposed::ImposedDisplacement;
pub use joint_load::JointLoad;
pub use point::BarPointLoad;
pub use thermal::ThermalLoad;

use serde::{Deserialize, Serialize};

/// A load of the analysis load case
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Load {
    /// Concentrated forces and moment at a joint
    JointPoint(JointLoad),
    /// Concentrated force on a bar interior
    BarPoint(BarPointLoad),
    /// Linearly varying line load on a bar
    BarDistributed(DistributedLoad),
    /// Uniform temperature change and through-depth gradient on a bar
    BarThermal(ThermalLoad),
    /// Prescribed support displacement at a joint
    Imposed(ImposedDisplacement),
}

impl Load {
    /// Bar id the load acts on, if it is a bar load
    pub fn bar(&self) -> Option<u32> {
        match self {
            Load::BarPoint(l) => Some(l.bar),
            Load::BarDistributed(l) => Some(l.bar),
            Load::BarThermal(l) => Some(l.bar),
            Load::JointPoint(_) | Load::Imposed(_) => None,
        }
    }

    /// Joint id the load acts on, if it is a joint load
    pub fn joint(&self) -> Option<u32> {
        match self {
            Load::JointPoint(l) => Some(l.joint),
            Load::Imposed(l) => Some(l.joint),
            _ => None,
        }
    }

    /// Same load with every magnitude multiplied by `factor`
    ///
    /// Imposed displacements and temperatures scale too; this backs the
    /// superposition-linearity checks.
    pub fn scaled(&self, factor: f64) -> Self {
        match *self {
            Load::JointPoint(l) => Load::JointPoint(JointLoad {
                fx: l.fx * factor,
                fy: l.fy * factor,
                mz: l.mz * factor,
                ..l
            }),
            Load::BarPoint(l) => Load::BarPoint(BarPointLoad {
                p: l.p * factor,
                ..l
            }),
            Load::BarDistributed(l) => Load::BarDistributed(DistributedLoad {
                q1: l.q1 * factor,
                q2: l.q2 * factor,
                ..l
            }),
            Load::BarThermal(l) => Load::BarThermal(ThermalLoad {
                dt_uniform: l.dt_uniform * factor,
                dt_gradient: l.dt_gradient * factor,
                ..l
            }),
            Load::Imposed(l) => Load::Imposed(ImposedDisplacement {
                dx: l.dx * factor,
                dy: l.dy * factor,
                dtheta: l.dtheta * factor,
                ..l
            }),
        }
    }
}

impl From<JointLoad> for Load {
    fn from(l: JointLoad) -> Self {
        Load::JointPoint(l)
    }
}

impl From<BarPointLoad> for Load {
    fn from(l: BarPointLoad) -> Self {
        Load::BarPoint(l)
    }
}

impl From<DistributedLoad> for Load {
    fn from(l: DistributedLoad) -> Self {
        Load::BarDistributed(l)
    }
}

impl From<ThermalLoad> for Load {
    fn from(l: ThermalLoad) -> Self {
        Load::BarThermal(l)
    }
}

impl From<ImposedDisplacement> for Load {
    fn from(l: ImposedDisplacement) -> Self {
        Load::Imposed(l)
    }
}
