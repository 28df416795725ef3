//! Structural model entities

mod bar;
mod joint;
mod material;
mod section;
mod support;

pub use bar::{Bar, BarGeometry};
pub use joint::Joint;
pub use material::Material;
pub use section::Section;
pub use support::{Axis, Dof, Support};

pub(crate) use bar::MIN_LENGTH;
