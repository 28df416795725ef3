//! flex-solver - a native Rust 2D frame analysis engine
//!
//! Statically indeterminate planar frames are solved by the force
//! (flexibility) method: the degree of static indeterminacy is counted,
//! redundant constraints are released to obtain a stable isostatic
//! primary structure, unit-load substructures are resolved by global
//! equilibrium and the method of sections, flexibility coefficients are
//! integrated by virtual work, and the compatibility system F·X = eh − e0
//! recovers the redundants. Final fields, reactions and displacements
//! come from superposition and are verified against global equilibrium.
//!
//! Sign convention (TERNA): X+ right, Y+ **down**, rotations and moments
//! positive **clockwise**; a bar's local y' axis is x' rotated 90°
//! clockwise. Units are SI with forces in kN.
//!
//! ## Example
//! ```rust
//! use flex_solver::prelude::*;
//!
//! let mut model = Model::new();
//!
//! // Geometry: a 6 m beam
//! model.add_joint(1, Joint::new(0.0, 0.0)).unwrap();
//! model.add_joint(2, Joint::new(6.0, 0.0)).unwrap();
//!
//! // Properties
//! model.add_material(1, Material::steel()).unwrap();
//! model.add_section(1, Section::new(0.01, 2.772e-5)).unwrap();
//!
//! // One bar, fixed at both ends
//! model.add_bar(1, Bar::new(1, 2, 1, 1)).unwrap();
//! model.add_support(1, Support::fixed()).unwrap();
//! model.add_support(2, Support::fixed()).unwrap();
//!
//! // 10 kN downward at midspan
//! model.add_load(BarPointLoad::transverse(1, 10.0, 3.0)).unwrap();
//!
//! let result = model.analyze(&AnalysisOptions::default()).unwrap();
//! assert_eq!(result.gh, 3);
//!
//! // Midspan moment of the fixed-fixed beam: -PL/8
//! let m_mid = result.bar_fields[&1].m(3.0);
//! assert!((m_mid + 7.5).abs() < 1e-6);
//! ```

pub mod analysis;
pub mod elements;
pub mod error;
pub mod loads;
pub mod math;
pub mod model;
pub mod results;

// Re-export common types
pub mod prelude {
    pub use crate::analysis::{
        degree, AnalysisControl, AnalysisOptions, Determinacy, Redundant, SolverKind,
    };
    pub use crate::elements::{Axis, Bar, BarGeometry, Dof, Joint, Material, Section, Support};
    pub use crate::error::{EngineError, EngineResult};
    pub use crate::loads::{
        BarPointLoad, DistributedLoad, ImposedDisplacement, JointLoad, Load, ThermalLoad,
    };
    pub use crate::model::Model;
    pub use crate::results::{
        AnalysisResult, BarField, Diagnostics, JointDisplacement, Reaction,
    };
}
