//! Degree of static indeterminacy and geometric stability
//!
//! gh = r + v − 3n, with r the externally restrained DOFs (elastic
//! directions with k > 0 count as restrained), v the internal connection
//! count 3·bars − hinges (each internal hinge contributes −1), and n the
//! joint count. A non-negative count is necessary but not sufficient:
//! the equilibrium matrix of the unreduced structure must also have full
//! row rank.

use std::collections::BTreeMap;

use log::info;

use crate::analysis::statics;
use crate::analysis::substructure;
use crate::elements::BarGeometry;
use crate::error::{EngineError, EngineResult};
use crate::model::Model;

/// Determinacy count of a model
#[derive(Debug, Clone, Copy)]
pub struct Determinacy {
    /// Externally restrained DOFs
    pub r: usize,
    /// Internal connection count (3·bars − hinges)
    pub v: i64,
    /// Joint count
    pub n: usize,
    /// Degree of static indeterminacy
    pub gh: i64,
}

/// Count the degree of static indeterminacy
pub fn degree(model: &Model) -> Determinacy {
    let r = model.restrained_dof_count();
    let v = 3 * model.bars.len() as i64 - model.hinge_count() as i64;
    let n = model.joints.len();
    Determinacy {
        r,
        v,
        n,
        gh: r as i64 + v - 3 * n as i64,
    }
}

/// Full determinacy check: count plus the geometric-stability rank test
///
/// Returns gh on success.
pub(crate) fn check(model: &Model, geo: &BTreeMap<u32, BarGeometry>) -> EngineResult<usize> {
    let d = degree(model);
    info!(
        "determinacy: r = {}, v = {}, n = {} -> gh = {}",
        d.r, d.v, d.n, d.gh
    );

    if d.gh < 0 {
        return Err(EngineError::Hypostatic {
            gh: d.gh,
            deficit: -d.gh,
        });
    }

    let constraints = substructure::base_constraints(model, geo, &[]);
    if !statics::is_stable(model, geo, &[], &constraints) {
        return Err(EngineError::Unstable(
            "equilibrium matrix is rank-deficient despite the count".into(),
        ));
    }

    Ok(d.gh as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Bar, Joint, Material, Section, Support};

    fn beam(supports: &[(u32, Support)]) -> Model {
        let mut model = Model::new();
        model.add_joint(1, Joint::new(0.0, 0.0)).unwrap();
        model.add_joint(2, Joint::new(6.0, 0.0)).unwrap();
        model.add_material(1, Material::steel()).unwrap();
        model.add_section(1, Section::new(0.01, 2.772e-5)).unwrap();
        model.add_bar(1, Bar::new(1, 2, 1, 1)).unwrap();
        for &(joint, support) in supports {
            model.add_support(joint, support).unwrap();
        }
        model
    }

    #[test]
    fn test_fixed_fixed_beam_is_triply_redundant() {
        let model = beam(&[(1, Support::fixed()), (2, Support::fixed())]);
        assert_eq!(degree(&model).gh, 3);
    }

    #[test]
    fn test_cantilever_is_isostatic() {
        let model = beam(&[(1, Support::fixed())]);
        assert_eq!(degree(&model).gh, 0);
    }

    #[test]
    fn test_simply_supported_is_isostatic() {
        let model = beam(&[(1, Support::pinned()), (2, Support::roller_y())]);
        assert_eq!(degree(&model).gh, 0);
    }

    #[test]
    fn test_hinge_lowers_the_count() {
        let mut model = beam(&[(1, Support::fixed()), (2, Support::fixed())]);
        model.bars.get_mut(&1).unwrap().hinge_j = true;
        assert_eq!(degree(&model).gh, 2);
    }

    #[test]
    fn test_elastic_direction_counts_as_restrained() {
        let model = beam(&[(1, Support::fixed()), (2, Support::spring_y(5000.0))]);
        assert_eq!(degree(&model).gh, 1);
    }
}
