//! Redundant selection
//!
//! Candidates are generated in a deterministic priority order and chosen
//! by backtracking: a pick survives only if the structure released so
//! far keeps full equilibrium rank. Manual selections are validated
//! through the same admissibility test.

use std::collections::BTreeMap;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::analysis::statics;
use crate::analysis::substructure::{self, ActionComponent};
use crate::elements::{BarGeometry, Dof};
use crate::error::{EngineError, EngineResult};
use crate::model::Model;

/// A constraint chosen for release; its value is solved from compatibility
///
/// Reaction variants cover rigid and elastic directions alike: when the
/// released direction is a spring, its compliance joins the flexibility
/// diagonal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Redundant {
    /// Horizontal support reaction at a joint
    ReactionX { joint: u32 },
    /// Vertical support reaction at a joint
    ReactionY { joint: u32 },
    /// Support moment at a joint
    ReactionMz { joint: u32 },
    /// Bending moment transmitted at a bar section
    MomentRelease { bar: u32, x: f64 },
    /// Shear force transmitted at a bar section
    ShearRelease { bar: u32, x: f64 },
    /// Axial force transmitted at a bar section
    AxialRelease { bar: u32, x: f64 },
}

impl Redundant {
    /// Released support direction, for reaction redundants
    pub fn support_dir(&self) -> Option<(u32, Dof)> {
        match *self {
            Redundant::ReactionX { joint } => Some((joint, Dof::X)),
            Redundant::ReactionY { joint } => Some((joint, Dof::Y)),
            Redundant::ReactionMz { joint } => Some((joint, Dof::Rz)),
            _ => None,
        }
    }

    /// Released bar section, for internal-release redundants
    pub fn section_release(&self) -> Option<(u32, f64, ActionComponent)> {
        match *self {
            Redundant::MomentRelease { bar, x } => Some((bar, x, ActionComponent::Moment)),
            Redundant::ShearRelease { bar, x } => Some((bar, x, ActionComponent::Shear)),
            Redundant::AxialRelease { bar, x } => Some((bar, x, ActionComponent::Normal)),
            _ => None,
        }
    }
}

/// Candidate list in deterministic priority order
///
/// 1. support moments at fully-fixed joints, 2. vertical reactions,
/// 3. horizontal reactions, 4. support moments at guides and rotational
/// springs, 5. internal moment releases at midspan of the longest bars.
/// Ties break by ascending joint id (bars: descending length, then id).
fn candidates(model: &Model, geo: &BTreeMap<u32, BarGeometry>) -> Vec<Redundant> {
    let mut out = Vec::new();

    for (&joint, support) in &model.supports {
        if support.is_fully_fixed() {
            out.push(Redundant::ReactionMz { joint });
        }
    }
    for (&joint, support) in &model.supports {
        if support.restrains(Dof::Y) {
            out.push(Redundant::ReactionY { joint });
        }
    }
    for (&joint, support) in &model.supports {
        if support.restrains(Dof::X) {
            out.push(Redundant::ReactionX { joint });
        }
    }
    for (&joint, support) in &model.supports {
        if support.restrains(Dof::Rz) && !support.is_fully_fixed() {
            out.push(Redundant::ReactionMz { joint });
        }
    }

    // Last resort: hinge the longest bars at midspan
    let mut bars: Vec<u32> = model.bars.keys().copied().collect();
    bars.sort_by(|a, b| {
        geo[b]
            .length
            .partial_cmp(&geo[a].length)
            .unwrap()
            .then(a.cmp(b))
    });
    for bar in bars {
        out.push(Redundant::MomentRelease {
            bar,
            x: geo[&bar].length / 2.0,
        });
    }

    out
}

fn admissible(
    model: &Model,
    geo: &BTreeMap<u32, BarGeometry>,
    chosen: &[Redundant],
) -> bool {
    let released = substructure::released_dirs(chosen);
    let constraints = substructure::base_constraints(model, geo, chosen);
    statics::is_stable(model, geo, &released, &constraints)
}

fn search(
    model: &Model,
    geo: &BTreeMap<u32, BarGeometry>,
    cands: &[Redundant],
    start: usize,
    need: usize,
    chosen: &mut Vec<Redundant>,
) -> bool {
    if need == 0 {
        return true;
    }
    for i in start..cands.len() {
        chosen.push(cands[i]);
        if admissible(model, geo, chosen) && search(model, geo, cands, i + 1, need - 1, chosen) {
            return true;
        }
        let dropped = chosen.pop();
        debug!("redundant candidate {dropped:?} rejected, backtracking");
    }
    false
}

/// Choose gh admissible redundants automatically
pub(crate) fn select(
    model: &Model,
    geo: &BTreeMap<u32, BarGeometry>,
    gh: usize,
) -> EngineResult<Vec<Redundant>> {
    let cands = candidates(model, geo);
    let mut chosen = Vec::with_capacity(gh);
    if !search(model, geo, &cands, 0, gh, &mut chosen) {
        return Err(EngineError::RedundantChoiceUnstable);
    }
    info!("selected redundants: {chosen:?}");
    Ok(chosen)
}

/// Validate a user-provided redundant set
pub(crate) fn validate_manual(
    model: &Model,
    geo: &BTreeMap<u32, BarGeometry>,
    gh: usize,
    manual: &[Redundant],
) -> EngineResult<Vec<Redundant>> {
    if manual.len() != gh {
        return Err(EngineError::ModelInvalid(format!(
            "manual redundant list has {} entries, the structure needs {gh}",
            manual.len()
        )));
    }
    for (k, r) in manual.iter().enumerate() {
        if manual[..k].contains(r) {
            return Err(EngineError::ModelInvalid(format!(
                "manual redundant {r:?} listed twice"
            )));
        }
        match *r {
            Redundant::ReactionX { joint }
            | Redundant::ReactionY { joint }
            | Redundant::ReactionMz { joint } => {
                let (joint_id, dof) = r.support_dir().unwrap();
                let support = model.supports.get(&joint).ok_or_else(|| {
                    EngineError::ModelInvalid(format!("redundant at unsupported joint {joint_id}"))
                })?;
                if !support.restrains(dof) {
                    return Err(EngineError::ModelInvalid(format!(
                        "redundant releases free direction {dof:?} at joint {joint_id}"
                    )));
                }
            }
            Redundant::MomentRelease { bar, x }
            | Redundant::ShearRelease { bar, x }
            | Redundant::AxialRelease { bar, x } => {
                let g = geo.get(&bar).ok_or(EngineError::BarNotFound(bar))?;
                if !(0.0..=g.length).contains(&x) {
                    return Err(EngineError::ModelInvalid(format!(
                        "internal release at {x} m lies outside bar {bar}"
                    )));
                }
            }
        }
    }
    if !admissible(model, geo, manual) {
        return Err(EngineError::RedundantChoiceUnstable);
    }
    Ok(manual.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Bar, Joint, Material, Section, Support};

    fn fixed_fixed_beam() -> Model {
        let mut model = Model::new();
        model.add_joint(1, Joint::new(0.0, 0.0)).unwrap();
        model.add_joint(2, Joint::new(6.0, 0.0)).unwrap();
        model.add_material(1, Material::steel()).unwrap();
        model.add_section(1, Section::new(0.01, 2.772e-5)).unwrap();
        model.add_bar(1, Bar::new(1, 2, 1, 1)).unwrap();
        model.add_support(1, Support::fixed()).unwrap();
        model.add_support(2, Support::fixed()).unwrap();
        model
    }

    fn geometry(model: &Model) -> BTreeMap<u32, BarGeometry> {
        model
            .bars
            .keys()
            .map(|&id| (id, model.geometry(id).unwrap()))
            .collect()
    }

    #[test]
    fn test_selection_is_deterministic_and_prefers_moments() {
        let model = fixed_fixed_beam();
        let geo = geometry(&model);
        let a = select(&model, &geo, 3).unwrap();
        let b = select(&model, &geo, 3).unwrap();
        assert_eq!(a, b);
        // Fixed-joint moments come first
        assert_eq!(a[0], Redundant::ReactionMz { joint: 1 });
        assert_eq!(a[1], Redundant::ReactionMz { joint: 2 });
    }

    #[test]
    fn test_manual_wrong_count_rejected() {
        let model = fixed_fixed_beam();
        let geo = geometry(&model);
        let manual = vec![Redundant::ReactionMz { joint: 1 }];
        assert!(validate_manual(&model, &geo, 3, &manual).is_err());
    }

    #[test]
    fn test_manual_inadmissible_rejected() {
        // Releasing both vertical reactions of the beam leaves a mechanism
        let model = fixed_fixed_beam();
        let geo = geometry(&model);
        let manual = vec![
            Redundant::ReactionY { joint: 1 },
            Redundant::ReactionY { joint: 2 },
            Redundant::ReactionMz { joint: 1 },
        ];
        assert!(matches!(
            validate_manual(&model, &geo, 3, &manual),
            Err(EngineError::RedundantChoiceUnstable)
        ));
    }

    #[test]
    fn test_manual_valid_set_accepted() {
        let model = fixed_fixed_beam();
        let geo = geometry(&model);
        let manual = vec![
            Redundant::ReactionMz { joint: 2 },
            Redundant::ReactionY { joint: 2 },
            Redundant::ReactionX { joint: 2 },
        ];
        assert_eq!(validate_manual(&model, &geo, 3, &manual).unwrap().len(), 3);
    }
}
