//! External supports
//!
//! Supports are tagged variants; the engine dispatches on the tag. An
//! elastic constant of exactly zero leaves that direction free.

use serde::{Deserialize, Serialize};

/// A planar degree of freedom at a joint
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Dof {
    /// Translation along global X
    X,
    /// Translation along global Y
    Y,
    /// Rotation about Z (clockwise positive)
    Rz,
}

impl Dof {
    /// All planar DOFs in canonical order
    pub const ALL: [Dof; 3] = [Dof::X, Dof::Y, Dof::Rz];
}

/// Restrained translation axis for rollers and guides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    fn dof(self) -> Dof {
        match self {
            Axis::X => Dof::X,
            Axis::Y => Dof::Y,
        }
    }
}

/// External support at a joint
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Support {
    /// Both translations and the rotation restrained
    Fixed,
    /// Both translations restrained, rotation free
    Pinned,
    /// One translation restrained
    Roller { axis: Axis },
    /// Rotation plus one translation restrained (sliding clamp)
    Guide { axis: Axis },
    /// Spring constants per direction (kN/m, kN/m, kNm/rad); 0 = free
    Elastic { kx: f64, ky: f64, kt: f64 },
}

impl Support {
    /// Fully fixed support
    pub fn fixed() -> Self {
        Support::Fixed
    }

    /// Pinned support
    pub fn pinned() -> Self {
        Support::Pinned
    }

    /// Roller restraining vertical translation
    pub fn roller_y() -> Self {
        Support::Roller { axis: Axis::Y }
    }

    /// Roller restraining horizontal translation
    pub fn roller_x() -> Self {
        Support::Roller { axis: Axis::X }
    }

    /// Guide sliding along X (restrains Y and rotation)
    pub fn guide_y() -> Self {
        Support::Guide { axis: Axis::Y }
    }

    /// Guide sliding along Y (restrains X and rotation)
    pub fn guide_x() -> Self {
        Support::Guide { axis: Axis::X }
    }

    /// Elastic support with the given spring constants
    pub fn elastic(kx: f64, ky: f64, kt: f64) -> Self {
        Support::Elastic { kx, ky, kt }
    }

    /// Vertical spring only
    pub fn spring_y(ky: f64) -> Self {
        Support::Elastic {
            kx: 0.0,
            ky,
            kt: 0.0,
        }
    }

    /// Whether the given direction is restrained (rigidly or elastically)
    pub fn restrains(&self, dof: Dof) -> bool {
        match self {
            Support::Fixed => true,
            Support::Pinned => matches!(dof, Dof::X | Dof::Y),
            Support::Roller { axis } => dof == axis.dof(),
            Support::Guide { axis } => dof == axis.dof() || dof == Dof::Rz,
            Support::Elastic { kx, ky, kt } => match dof {
                Dof::X => *kx > 0.0,
                Dof::Y => *ky > 0.0,
                Dof::Rz => *kt > 0.0,
            },
        }
    }

    /// Spring constant of an elastically restrained direction
    pub fn spring(&self, dof: Dof) -> Option<f64> {
        match self {
            Support::Elastic { kx, ky, kt } => {
                let k = match dof {
                    Dof::X => *kx,
                    Dof::Y => *ky,
                    Dof::Rz => *kt,
                };
                (k > 0.0).then_some(k)
            }
            _ => None,
        }
    }

    /// List of restrained DOFs in canonical order
    pub fn restrained_dofs(&self) -> Vec<Dof> {
        Dof::ALL.into_iter().filter(|&d| self.restrains(d)).collect()
    }

    /// Count of restrained DOFs
    pub fn num_restrained(&self) -> usize {
        self.restrained_dofs().len()
    }

    /// Whether all three DOFs are rigidly restrained
    pub fn is_fully_fixed(&self) -> bool {
        matches!(self, Support::Fixed)
    }
}
