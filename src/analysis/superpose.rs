//! Superposition, equilibrium verification, displacements and deflections
//!
//! Final fields are exact linear combinations of the substructure fields
//! on merged breakpoints. Reactions superpose the same way, with each
//! released support direction taking its redundant's value. Joint
//! displacements come from the unit-load method on the primary
//! structure, worked against the final fields, thermal strains, spring
//! deformations and prescribed settlements.

use std::collections::BTreeMap;

use log::info;

use crate::analysis::redundants::Redundant;
use crate::analysis::statics::{self, RawField, SubSolution};
use crate::analysis::substructure::Substructure;
use crate::analysis::AnalysisOptions;
use crate::elements::{BarGeometry, Dof};
use crate::error::{EngineError, EngineResult};
use crate::loads::{JointLoad, Load};
use crate::math::{moment_about, simpson_product, PiecewisePoly, Poly};
use crate::model::Model;
use crate::results::{AnalysisResult, BarField, Diagnostics, JointDisplacement, Reaction};

/// Absolute base tolerance of the global equilibrium check
const EQUILIBRIUM_TOL: f64 = 1e-6;

/// Real deformation state of one bar: generalized strains as fields
struct BarStrains {
    curvature: PiecewisePoly,
    axial: PiecewisePoly,
}

/// Combine the substructure fields with the redundant values
fn superpose_fields(
    model: &Model,
    subs: &[SubSolution],
    x: &[f64],
) -> BTreeMap<u32, RawField> {
    let mut out = BTreeMap::new();
    for &bar_id in model.bars.keys() {
        let combine = |pick: fn(&RawField) -> &PiecewisePoly| {
            let mut terms: Vec<(f64, &PiecewisePoly)> = vec![(1.0, pick(&subs[0].fields[&bar_id]))];
            for (i, &xi) in x.iter().enumerate() {
                terms.push((xi, pick(&subs[i + 1].fields[&bar_id])));
            }
            PiecewisePoly::linear_combination(&terms)
        };
        out.insert(
            bar_id,
            RawField {
                n: combine(|f| &f.n),
                v: combine(|f| &f.v),
                m: combine(|f| &f.m),
            },
        );
    }
    out
}

/// Superpose reactions; released directions take their redundant's value
fn superpose_reactions(
    redundants: &[Redundant],
    subs: &[SubSolution],
    x: &[f64],
) -> BTreeMap<(u32, Dof), f64> {
    let mut out = BTreeMap::new();
    for (&key, &r0) in &subs[0].reactions {
        let mut r = r0;
        for (i, &xi) in x.iter().enumerate() {
            r += xi * subs[i + 1].reactions[&key];
        }
        out.insert(key, r);
    }
    for (i, r) in redundants.iter().enumerate() {
        if let Some(key) = r.support_dir() {
            out.insert(key, x[i]);
        }
    }
    out
}

/// Resultant of the real external loads: (ΣFx, ΣFy, ΣM about the origin)
fn external_resultant(model: &Model, geo: &BTreeMap<u32, BarGeometry>) -> (f64, f64, f64) {
    let origin = [0.0, 0.0];
    let (mut fx, mut fy, mut mz) = (0.0, 0.0, 0.0);
    for load in &model.loads {
        match *load {
            Load::JointPoint(l) => {
                let p = model.joints[&l.joint];
                fx += l.fx;
                fy += l.fy;
                mz += l.mz + moment_about(origin, [p.x, p.y], l.fx, l.fy);
            }
            Load::BarPoint(l) => {
                let g = &geo[&l.bar];
                let u = g.load_direction(l.angle);
                let (px, py) = (l.p * u[0], l.p * u[1]);
                fx += px;
                fy += py;
                mz += moment_about(origin, g.point_at(l.a), px, py);
            }
            Load::BarDistributed(l) => {
                let g = &geo[&l.bar];
                let (dfx, dfy, dm) = statics::distributed_resultant(&l, g, 0.0, g.length, origin);
                fx += dfx;
                fy += dfy;
                mz += dm;
            }
            Load::BarThermal(_) | Load::Imposed(_) => {}
        }
    }
    (fx, fy, mz)
}

/// Global verification: external loads plus reactions must vanish
fn verify_equilibrium(
    model: &Model,
    geo: &BTreeMap<u32, BarGeometry>,
    reactions: &BTreeMap<(u32, Dof), f64>,
) -> EngineResult<[f64; 3]> {
    let (ext_fx, ext_fy, ext_mz) = external_resultant(model, geo);
    let (mut fx, mut fy, mut mz) = (ext_fx, ext_fy, ext_mz);
    for (&(joint, dof), &r) in reactions {
        let p = model.joints[&joint];
        match dof {
            Dof::X => {
                fx += r;
                mz += moment_about([0.0, 0.0], [p.x, p.y], r, 0.0);
            }
            Dof::Y => {
                fy += r;
                mz += moment_about([0.0, 0.0], [p.x, p.y], 0.0, r);
            }
            Dof::Rz => mz += r,
        }
    }
    let scale = ext_fx
        .abs()
        .max(ext_fy.abs())
        .max(ext_mz.abs())
        .max(reactions.values().fold(0.0_f64, |m, r| m.max(r.abs())))
        .max(1.0);
    let tol = EQUILIBRIUM_TOL * scale;
    if fx.abs() > tol || fy.abs() > tol || mz.abs() > tol {
        return Err(EngineError::EquilibriumViolation { fx, fy, mz });
    }
    Ok([fx, fy, mz])
}

/// Generalized strain fields of the real (final) state
fn real_strains(
    model: &Model,
    geo: &BTreeMap<u32, BarGeometry>,
    fields: &BTreeMap<u32, RawField>,
) -> BTreeMap<u32, BarStrains> {
    // Per-bar thermal constants
    let mut kappa_th: BTreeMap<u32, f64> = BTreeMap::new();
    let mut eps_th: BTreeMap<u32, f64> = BTreeMap::new();
    for load in &model.loads {
        if let Load::BarThermal(t) = load {
            let mat = model.material_of(t.bar).expect("validated");
            if t.dt_uniform != 0.0 {
                *eps_th.entry(t.bar).or_default() += mat.alpha * t.dt_uniform;
            }
            if t.dt_gradient != 0.0 {
                let h = model
                    .section_of(t.bar)
                    .expect("validated")
                    .h
                    .expect("validated: gradient needs depth");
                *kappa_th.entry(t.bar).or_default() -= mat.alpha * t.dt_gradient / h;
            }
        }
    }

    let mut out = BTreeMap::new();
    for &bar_id in model.bars.keys() {
        let mat = model.material_of(bar_id).expect("validated");
        let sec = model.section_of(bar_id).expect("validated");
        let length = geo[&bar_id].length;
        let field = &fields[&bar_id];

        let constant = |c: f64| {
            PiecewisePoly::new(vec![0.0, length], vec![Poly::constant(c)])
        };
        let kappa = constant(kappa_th.get(&bar_id).copied().unwrap_or(0.0));
        let eps = constant(eps_th.get(&bar_id).copied().unwrap_or(0.0));
        let curvature = PiecewisePoly::linear_combination(&[
            (1.0 / (mat.e * sec.i_z), &field.m),
            (1.0, &kappa),
        ]);
        let axial = PiecewisePoly::linear_combination(&[
            (1.0 / (mat.e * sec.a), &field.n),
            (1.0, &eps),
        ]);
        out.insert(bar_id, BarStrains { curvature, axial });
    }
    out
}

/// Real displacements of the retained support directions: prescribed
/// settlements plus elastic deformation
fn support_movements(
    model: &Model,
    released: &[(u32, Dof)],
    reactions: &BTreeMap<(u32, Dof), f64>,
) -> BTreeMap<(u32, Dof), f64> {
    let mut out = BTreeMap::new();
    for (&joint, support) in &model.supports {
        for dof in support.restrained_dofs() {
            if released.contains(&(joint, dof)) {
                continue;
            }
            let mut u = 0.0;
            if let Some(k) = support.spring(dof) {
                u -= reactions.get(&(joint, dof)).copied().unwrap_or(0.0) / k;
            }
            out.insert((joint, dof), u);
        }
    }
    for d in model.imposed_displacements() {
        for dof in Dof::ALL {
            let delta = d.component(dof);
            if delta != 0.0 {
                if let Some(u) = out.get_mut(&(d.joint, dof)) {
                    *u += delta;
                }
            }
        }
    }
    out
}

/// Displacement at one free joint DOF by the unit-load method
fn unit_load_displacement(
    model: &Model,
    geo: &BTreeMap<u32, BarGeometry>,
    primary: &Substructure,
    strains: &BTreeMap<u32, BarStrains>,
    movements: &BTreeMap<(u32, Dof), f64>,
    joint: u32,
    dof: Dof,
    options: &AnalysisOptions,
) -> EngineResult<f64> {
    let mut virt = Substructure {
        label: format!("u({joint},{dof:?})"),
        released: primary.released.clone(),
        constraints: primary.constraints.clone(),
        joint_loads: Vec::new(),
        bar_points: Vec::new(),
        bar_dists: Vec::new(),
    };
    virt.joint_loads.push(match dof {
        Dof::X => JointLoad::new(joint, 1.0, 0.0, 0.0),
        Dof::Y => JointLoad::new(joint, 0.0, 1.0, 0.0),
        Dof::Rz => JointLoad::new(joint, 0.0, 0.0, 1.0),
    });
    let sol = statics::solve_substructure(model, geo, &virt)?;

    let mut delta = 0.0;
    for &bar_id in model.bars.keys() {
        let s = &strains[&bar_id];
        let f = &sol.fields[&bar_id];
        let fail = || EngineError::IntegrationFailure { bar: bar_id };
        delta += simpson_product(&f.m, &s.curvature, options.simpson_points).ok_or_else(fail)?;
        delta += simpson_product(&f.n, &s.axial, options.simpson_points).ok_or_else(fail)?;
    }
    for (key, &r_bar) in &sol.reactions {
        if let Some(&u) = movements.get(key) {
            delta -= r_bar * u;
        }
    }
    Ok(delta)
}

/// Displacements of every joint
fn joint_displacements(
    model: &Model,
    geo: &BTreeMap<u32, BarGeometry>,
    primary: &Substructure,
    strains: &BTreeMap<u32, BarStrains>,
    reactions: &BTreeMap<(u32, Dof), f64>,
    options: &AnalysisOptions,
) -> EngineResult<BTreeMap<u32, JointDisplacement>> {
    let movements = support_movements(model, &primary.released, reactions);

    // Prescribed settlements, looked up per direction
    let mut prescribed: BTreeMap<(u32, Dof), f64> = BTreeMap::new();
    for d in model.imposed_displacements() {
        for dof in Dof::ALL {
            if d.component(dof) != 0.0 {
                prescribed.insert((d.joint, dof), d.component(dof));
            }
        }
    }

    let mut out = BTreeMap::new();
    for &joint in model.joints.keys() {
        let support = model.supports.get(&joint);
        let mut comps = [0.0; 3];
        for (k, dof) in Dof::ALL.into_iter().enumerate() {
            let restrained = support.map(|s| s.restrains(dof)).unwrap_or(false);
            comps[k] = if restrained {
                let mut u = prescribed.get(&(joint, dof)).copied().unwrap_or(0.0);
                if let Some(spring) = support.and_then(|s| s.spring(dof)) {
                    u -= reactions.get(&(joint, dof)).copied().unwrap_or(0.0) / spring;
                }
                u
            } else {
                unit_load_displacement(
                    model, geo, primary, strains, &movements, joint, dof, options,
                )?
            };
        }
        out.insert(joint, JointDisplacement::new(comps[0], comps[1], comps[2]));
    }
    Ok(out)
}

/// Deflection curve of every bar by integrating the generalized strains
fn deflection_fields(
    model: &Model,
    geo: &BTreeMap<u32, BarGeometry>,
    strains: &BTreeMap<u32, BarStrains>,
    displacements: &BTreeMap<u32, JointDisplacement>,
) -> BTreeMap<u32, (PiecewisePoly, PiecewisePoly, PiecewisePoly)> {
    let mut out = BTreeMap::new();
    for (&bar_id, bar) in &model.bars {
        let g = &geo[&bar_id];
        let s = &strains[&bar_id];
        let di = &displacements[&bar.i_joint];

        let u0 = di.ux * g.ux[0] + di.uy * g.ux[1];
        let v0 = di.ux * g.uy[0] + di.uy * g.uy[1];

        // A hinged i-end detaches the bar's section rotation from the
        // joint; recover it by matching the far-end deflection instead
        let theta0 = if bar.hinge_i {
            let dj = &displacements[&bar.j_joint];
            let v_far = dj.ux * g.uy[0] + dj.uy * g.uy[1];
            let double_int = s.curvature.cumulative(0.0).cumulative(0.0).value(g.length);
            (v_far - v0 - double_int) / g.length
        } else {
            di.rz
        };

        let rotation = s.curvature.cumulative(theta0);
        let deflection = rotation.cumulative(v0);
        let axial_disp = s.axial.cumulative(u0);
        out.insert(bar_id, (axial_disp, deflection, rotation));
    }
    out
}

/// Assemble the final result object
#[allow(clippy::too_many_arguments)]
pub(crate) fn finalize(
    model: &Model,
    geo: &BTreeMap<u32, BarGeometry>,
    redundants: &[Redundant],
    primary: &Substructure,
    subs: &[SubSolution],
    x: &[f64],
    condition_number: f64,
    residual: f64,
    warnings: Vec<String>,
    options: &AnalysisOptions,
) -> EngineResult<AnalysisResult> {
    let fields = superpose_fields(model, subs, x);
    let raw_reactions = superpose_reactions(redundants, subs, x);
    let equilibrium = verify_equilibrium(model, geo, &raw_reactions)?;

    let strains = real_strains(model, geo, &fields);
    let displacements =
        joint_displacements(model, geo, primary, &strains, &raw_reactions, options)?;
    let mut deflections = deflection_fields(model, geo, &strains, &displacements);

    let mut reactions: BTreeMap<u32, Reaction> = BTreeMap::new();
    for (&(joint, dof), &r) in &raw_reactions {
        let entry = reactions.entry(joint).or_default();
        match dof {
            Dof::X => entry.rx = r,
            Dof::Y => entry.ry = r,
            Dof::Rz => entry.mz = r,
        }
    }

    let mut bar_fields = BTreeMap::new();
    for (&bar_id, raw) in &fields {
        let (axial_disp, deflection, rotation) = deflections.remove(&bar_id).expect("built above");
        bar_fields.insert(
            bar_id,
            BarField {
                length: geo[&bar_id].length,
                normal: raw.n.clone(),
                shear: raw.v.clone(),
                moment: raw.m.clone(),
                axial_disp,
                deflection,
                rotation,
            },
        );
    }

    info!(
        "analysis complete: gh = {}, equilibrium residuals = {:?}",
        redundants.len(),
        equilibrium
    );

    Ok(AnalysisResult {
        gh: redundants.len(),
        redundants: redundants.to_vec(),
        x: x.to_vec(),
        reactions,
        bar_fields,
        joint_displacements: displacements,
        diagnostics: Diagnostics {
            condition_number,
            residual_norm: residual,
            equilibrium,
            warnings,
        },
    })
}
