//! Flexibility matrix and independent-term assembly by virtual work
//!
//! F[i][j] integrates the unit-case field products over every bar, with
//! elastic-support compliance added algebraically. e0 collects the
//! primary-load term, thermal strains and support settlements outside
//! the redundant directions; eh holds settlements prescribed on the
//! redundant directions themselves.

use std::collections::BTreeMap;

use log::info;

use crate::analysis::redundants::Redundant;
use crate::analysis::statics::SubSolution;
use crate::analysis::AnalysisOptions;
use crate::elements::{BarGeometry, Dof, Support};
use crate::error::{EngineError, EngineResult};
use crate::loads::Load;
use crate::math::{self, simpson_product, Mat, PiecewisePoly, Poly, Vec as DVec};
use crate::model::Model;

/// Maxwell-Betti symmetry tolerance
const SYMMETRY_TOL: f64 = 1e-8;

/// The assembled compatibility system F·X = eh − e0
pub(crate) struct Compat {
    pub f: Mat,
    pub e0: DVec,
    pub eh: DVec,
}

/// Per-bar elastic constants used by the virtual-work integrals
struct BarStiffness {
    ei: f64,
    ea: f64,
    /// κ·G·A, read only in Timoshenko mode
    gas: f64,
}

fn bar_stiffness(model: &Model, bar_id: u32) -> BarStiffness {
    let mat = model.material_of(bar_id).expect("validated");
    let sec = model.section_of(bar_id).expect("validated");
    BarStiffness {
        ei: mat.e * sec.i_z,
        ea: mat.e * sec.a,
        gas: mat.shear_modulus() * sec.shear_factor() * sec.a,
    }
}

/// Virtual-work integral of two substructures' fields over every bar
fn field_work(
    model: &Model,
    a: &SubSolution,
    b: &SubSolution,
    options: &AnalysisOptions,
) -> EngineResult<f64> {
    let mut total = 0.0;
    for &bar_id in model.bars.keys() {
        let k = bar_stiffness(model, bar_id);
        let fa = &a.fields[&bar_id];
        let fb = &b.fields[&bar_id];
        let n = options.simpson_points;
        let fail = || EngineError::IntegrationFailure { bar: bar_id };
        total += simpson_product(&fa.m, &fb.m, n).ok_or_else(fail)? / k.ei;
        if options.include_axial {
            total += simpson_product(&fa.n, &fb.n, n).ok_or_else(fail)? / k.ea;
        }
        if options.include_shear {
            total += simpson_product(&fa.v, &fb.v, n).ok_or_else(fail)? / k.gas;
        }
    }
    Ok(total)
}

/// Thermal virtual work of one substructure's fields against the real
/// thermal strains
fn thermal_work(
    model: &Model,
    geo: &BTreeMap<u32, BarGeometry>,
    sub: &SubSolution,
    options: &AnalysisOptions,
) -> EngineResult<f64> {
    let mut total = 0.0;
    for load in &model.loads {
        let Load::BarThermal(t) = load else { continue };
        let mat = model.material_of(t.bar).expect("validated");
        let field = &sub.fields[&t.bar];
        let one = PiecewisePoly::new(
            vec![0.0, geo[&t.bar].length],
            vec![Poly::constant(1.0)],
        );
        let fail = || EngineError::IntegrationFailure { bar: t.bar };
        if t.dt_uniform != 0.0 {
            let n_int = simpson_product(&field.n, &one, options.simpson_points).ok_or_else(fail)?;
            total += mat.alpha * t.dt_uniform * n_int;
        }
        if t.dt_gradient != 0.0 {
            let h = model
                .section_of(t.bar)
                .expect("validated")
                .h
                .expect("validated: gradient needs depth");
            let m_int = simpson_product(&field.m, &one, options.simpson_points).ok_or_else(fail)?;
            // ΔT_g is the +y' fiber minus the −y' fiber; in this sign
            // convention the free curvature is −α·ΔT_g/h
            total -= mat.alpha * t.dt_gradient / h * m_int;
        }
    }
    Ok(total)
}

/// Elastic support directions retained in the primary structure
fn retained_springs(model: &Model, released: &[(u32, Dof)]) -> Vec<(u32, Dof, f64)> {
    let mut out = Vec::new();
    for (&joint, support) in &model.supports {
        if let Support::Elastic { .. } = support {
            for dof in Dof::ALL {
                if let Some(k) = support.spring(dof) {
                    if !released.contains(&(joint, dof)) {
                        out.push((joint, dof, k));
                    }
                }
            }
        }
    }
    out
}

/// Assemble F, e0 and eh for the chosen redundants
pub(crate) fn assemble(
    model: &Model,
    geo: &BTreeMap<u32, BarGeometry>,
    redundants: &[Redundant],
    subs: &[SubSolution],
    options: &AnalysisOptions,
) -> EngineResult<Compat> {
    let gh = redundants.len();
    let mut f = Mat::zeros(gh, gh);
    let mut e0 = DVec::zeros(gh);
    let mut eh = DVec::zeros(gh);

    let released: Vec<(u32, Dof)> = redundants.iter().filter_map(Redundant::support_dir).collect();
    let springs = retained_springs(model, &released);

    // Field products; both triangles are assembled independently so the
    // Maxwell-Betti check below can actually catch sign faults
    for i in 0..gh {
        for j in 0..gh {
            f[(i, j)] = field_work(model, &subs[i + 1], &subs[j + 1], options)?;
        }
        e0[i] = field_work(model, &subs[i + 1], &subs[0], options)?;
        e0[i] += thermal_work(model, geo, &subs[i + 1], options)?;
    }

    // Compliance of an elastic direction chosen as redundant
    for (i, r) in redundants.iter().enumerate() {
        if let Some((joint, dof)) = r.support_dir() {
            if let Some(support) = model.supports.get(&joint) {
                if let Some(k) = support.spring(dof) {
                    f[(i, i)] += 1.0 / k;
                }
            }
        }
    }

    // Springs retained in the primary deform under every case
    for &(joint, dof, k) in &springs {
        let key = (joint, dof);
        for i in 0..gh {
            let ri = subs[i + 1].reactions[&key];
            for j in 0..gh {
                f[(i, j)] += ri * subs[j + 1].reactions[&key] / k;
            }
            e0[i] += ri * subs[0].reactions[&key] / k;
        }
    }

    // Prescribed support displacements
    for d in model.imposed_displacements() {
        for dof in Dof::ALL {
            let delta = d.component(dof);
            if delta == 0.0 {
                continue;
            }
            let key = (d.joint, dof);
            if let Some(p) = redundants
                .iter()
                .position(|r| r.support_dir() == Some(key))
            {
                eh[p] += delta;
            } else {
                for i in 0..gh {
                    e0[i] -= subs[i + 1].reactions[&key] * delta;
                }
            }
        }
    }

    let defect = math::symmetry_defect(&f);
    if defect >= SYMMETRY_TOL {
        return Err(EngineError::SymmetryViolation { defect });
    }
    info!("flexibility matrix assembled: gh = {gh}, symmetry defect = {defect:.3e}");

    Ok(Compat { f, e0, eh })
}
