//! Substructure construction
//!
//! The primary structure is the model with the chosen redundant
//! restraints removed, carrying the real load case; each unit
//! substructure carries a single unit generalized force in the direction
//! of one redundant. Internal releases never change the geometry: they
//! become per-section constraint rows whose right-hand side is the
//! transmitted action (0 everywhere, 1 in the release's own unit case —
//! the pair of equal and opposite unit moments).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::analysis::redundants::Redundant;
use crate::elements::{BarGeometry, Dof};
use crate::loads::{BarPointLoad, DistributedLoad, JointLoad, Load};
use crate::model::Model;

/// Internal-action component at a bar section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionComponent {
    Normal,
    Shear,
    Moment,
}

/// A prescribed internal action at a bar section
///
/// One row of the isostatic equilibrium system: the action `component`
/// at local abscissa `x` of `bar` equals `rhs`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SectionConstraint {
    pub bar: u32,
    pub x: f64,
    pub component: ActionComponent,
    pub rhs: f64,
}

/// One released structure with its own load set
#[derive(Debug, Clone)]
pub(crate) struct Substructure {
    pub label: String,
    /// Support directions removed from the model
    pub released: std::vec::Vec<(u32, Dof)>,
    /// Section constraint rows (model hinges + internal releases)
    pub constraints: std::vec::Vec<SectionConstraint>,
    pub joint_loads: std::vec::Vec<JointLoad>,
    pub bar_points: std::vec::Vec<BarPointLoad>,
    pub bar_dists: std::vec::Vec<DistributedLoad>,
}

impl Substructure {
    fn bare(label: String, released: std::vec::Vec<(u32, Dof)>, constraints: std::vec::Vec<SectionConstraint>) -> Self {
        Self {
            label,
            released,
            constraints,
            joint_loads: std::vec::Vec::new(),
            bar_points: std::vec::Vec::new(),
            bar_dists: std::vec::Vec::new(),
        }
    }
}

/// Support directions released by a redundant set
pub(crate) fn released_dirs(redundants: &[Redundant]) -> std::vec::Vec<(u32, Dof)> {
    redundants.iter().filter_map(Redundant::support_dir).collect()
}

/// Constraint rows common to every substructure: model end hinges plus
/// one row per internal-release redundant, all with zero right-hand side
pub(crate) fn base_constraints(
    model: &Model,
    geo: &BTreeMap<u32, BarGeometry>,
    redundants: &[Redundant],
) -> std::vec::Vec<SectionConstraint> {
    let mut rows = std::vec::Vec::new();
    for (&bar_id, bar) in &model.bars {
        if bar.hinge_i {
            rows.push(SectionConstraint {
                bar: bar_id,
                x: 0.0,
                component: ActionComponent::Moment,
                rhs: 0.0,
            });
        }
        if bar.hinge_j {
            rows.push(SectionConstraint {
                bar: bar_id,
                x: geo[&bar_id].length,
                component: ActionComponent::Moment,
                rhs: 0.0,
            });
        }
    }
    for r in redundants {
        if let Some((bar, x, component)) = r.section_release() {
            rows.push(SectionConstraint {
                bar,
                x,
                component,
                rhs: 0.0,
            });
        }
    }
    rows
}

/// Build the primary structure and one unit substructure per redundant
pub(crate) fn build(
    model: &Model,
    geo: &BTreeMap<u32, BarGeometry>,
    redundants: &[Redundant],
) -> std::vec::Vec<Substructure> {
    let released = released_dirs(redundants);
    let constraints = base_constraints(model, geo, redundants);

    let mut subs = std::vec::Vec::with_capacity(redundants.len() + 1);

    // Primary: real loads; thermal and imposed displacements have no
    // isostatic static effect and act only through e0/eh
    let mut primary = Substructure::bare("primary".into(), released.clone(), constraints.clone());
    for load in &model.loads {
        match *load {
            Load::JointPoint(l) => primary.joint_loads.push(l),
            Load::BarPoint(l) => primary.bar_points.push(l),
            Load::BarDistributed(l) => {
                let mut l = l;
                l.x2 = l.x2.min(geo[&l.bar].length);
                primary.bar_dists.push(l);
            }
            Load::BarThermal(_) | Load::Imposed(_) => {}
        }
    }
    subs.push(primary);

    // Unit cases: one generalized unit force each
    for (i, r) in redundants.iter().enumerate() {
        let mut sub = Substructure::bare(format!("X{}", i + 1), released.clone(), constraints.clone());
        match *r {
            Redundant::ReactionX { joint } => {
                sub.joint_loads.push(JointLoad::new(joint, 1.0, 0.0, 0.0));
            }
            Redundant::ReactionY { joint } => {
                sub.joint_loads.push(JointLoad::new(joint, 0.0, 1.0, 0.0));
            }
            Redundant::ReactionMz { joint } => {
                sub.joint_loads.push(JointLoad::new(joint, 0.0, 0.0, 1.0));
            }
            Redundant::MomentRelease { .. }
            | Redundant::ShearRelease { .. }
            | Redundant::AxialRelease { .. } => {
                let (bar, x, component) = r.section_release().unwrap();
                let row = sub
                    .constraints
                    .iter_mut()
                    .find(|c| c.bar == bar && c.component == component && (c.x - x).abs() < 1e-9)
                    .expect("release constraint present in every substructure");
                row.rhs = 1.0;
            }
        }
        subs.push(sub);
    }

    subs
}
