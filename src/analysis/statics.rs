//! Isostatic resolution by global equilibrium and the method of sections
//!
//! Unknowns are the six global end actions of every bar (the forces the
//! rest of the structure applies to the bar at its ends) plus the
//! retained reaction components. Rows are three equilibrium equations
//! per bar, three per joint, and one per prescribed section action.
//! With the end actions known, internal fields integrate from the i-end
//! regardless of where the supports sit, so cantilevers need no special
//! treatment.

use std::collections::BTreeMap;

use log::debug;

use crate::analysis::substructure::{ActionComponent, SectionConstraint, Substructure};
use crate::elements::{BarGeometry, Dof};
use crate::error::{EngineError, EngineResult};
use crate::loads::DistributedLoad;
use crate::math::{self, moment_about, Mat, PiecewisePoly, Poly, Vec as DVec};
use crate::model::Model;

/// Conditioning limit for the equilibrium system
const EQUILIBRIUM_COND_LIMIT: f64 = 1e12;

/// Absolute tolerance of the x = L boundary invariant
const BOUNDARY_TOL: f64 = 1e-6;

/// Breakpoint coincidence tolerance along a bar
const EVENT_TOL: f64 = 1e-9;

/// Column/row bookkeeping of the equilibrium system
pub(crate) struct Layout {
    pub bar_ids: std::vec::Vec<u32>,
    pub joint_ids: std::vec::Vec<u32>,
    /// Retained reaction components in (joint, dof) order
    pub reactions: std::vec::Vec<(u32, Dof)>,
    pub n_unknowns: usize,
    pub n_equations: usize,
}

impl Layout {
    fn bar_offset(&self, bar: u32) -> usize {
        6 * self.bar_ids.binary_search(&bar).unwrap()
    }
}

/// Solved state of one substructure
#[derive(Debug, Clone)]
pub(crate) struct SubSolution {
    /// Global end actions per bar: [Fxi, Fyi, Mi, Fxj, Fyj, Mj]
    pub end_actions: BTreeMap<u32, [f64; 6]>,
    /// Reactions on the structure at retained support directions
    pub reactions: BTreeMap<(u32, Dof), f64>,
    /// Internal-force fields per bar
    pub fields: BTreeMap<u32, RawField>,
}

/// Internal-force fields of one bar
#[derive(Debug, Clone)]
pub(crate) struct RawField {
    pub n: PiecewisePoly,
    pub v: PiecewisePoly,
    pub m: PiecewisePoly,
}

impl RawField {
    #[cfg(test)]
    pub(crate) fn n(&self, x: f64) -> f64 {
        self.n.value(x)
    }

    #[cfg(test)]
    pub(crate) fn v(&self, x: f64) -> f64 {
        self.v.value(x)
    }

    #[cfg(test)]
    pub(crate) fn m(&self, x: f64) -> f64 {
        self.m.value(x)
    }
}

/// Assemble the coefficient matrix of the equilibrium system
///
/// Rows: 3 per bar, 3 per joint, one per section constraint. Columns:
/// 6 end actions per bar, then the retained reaction components. Load
/// terms go to the right-hand side, assembled separately.
pub(crate) fn equilibrium_matrix(
    model: &Model,
    geo: &BTreeMap<u32, BarGeometry>,
    released: &[(u32, Dof)],
    constraints: &[SectionConstraint],
) -> (Mat, Layout) {
    let bar_ids: std::vec::Vec<u32> = model.bars.keys().copied().collect();
    let joint_ids: std::vec::Vec<u32> = model.joints.keys().copied().collect();

    let mut reactions = std::vec::Vec::new();
    for (&joint, support) in &model.supports {
        for dof in support.restrained_dofs() {
            if !released.contains(&(joint, dof)) {
                reactions.push((joint, dof));
            }
        }
    }

    let n_unknowns = 6 * bar_ids.len() + reactions.len();
    let n_equations = 3 * bar_ids.len() + 3 * joint_ids.len() + constraints.len();
    let layout = Layout {
        bar_ids,
        joint_ids,
        reactions,
        n_unknowns,
        n_equations,
    };

    let mut a = Mat::zeros(layout.n_equations, layout.n_unknowns);

    // Bar equilibrium: ΣFx, ΣFy, ΣM about the i-end
    for (bi, &bar_id) in layout.bar_ids.iter().enumerate() {
        let g = &geo[&bar_id];
        let row = 3 * bi;
        let off = 6 * bi;
        a[(row, off)] = 1.0;
        a[(row, off + 3)] = 1.0;
        a[(row + 1, off + 1)] = 1.0;
        a[(row + 1, off + 4)] = 1.0;
        a[(row + 2, off + 2)] = 1.0;
        a[(row + 2, off + 5)] = 1.0;
        // Moment of the j-end force about the i-end
        let jp = g.point_at(g.length);
        a[(row + 2, off + 3)] = -(jp[1] - g.yi);
        a[(row + 2, off + 4)] = jp[0] - g.xi;
    }

    // Joint equilibrium: end actions pull on the joint, reactions push
    let joint_base = 3 * layout.bar_ids.len();
    for (bi, &bar_id) in layout.bar_ids.iter().enumerate() {
        let bar = &model.bars[&bar_id];
        let off = 6 * bi;
        for (joint, end_off) in [(bar.i_joint, 0), (bar.j_joint, 3)] {
            let ji = layout.joint_ids.binary_search(&joint).unwrap();
            let row = joint_base + 3 * ji;
            a[(row, off + end_off)] += 1.0;
            a[(row + 1, off + end_off + 1)] += 1.0;
            a[(row + 2, off + end_off + 2)] += 1.0;
        }
    }
    for (p, &(joint, dof)) in layout.reactions.iter().enumerate() {
        let ji = layout.joint_ids.binary_search(&joint).unwrap();
        let dof_row = match dof {
            Dof::X => 0,
            Dof::Y => 1,
            Dof::Rz => 2,
        };
        let col = 6 * layout.bar_ids.len() + p;
        a[(joint_base + 3 * ji + dof_row, col)] = -1.0;
    }

    // Section constraints: the action at the cut, linear in the i-end actions
    let constraint_base = joint_base + 3 * layout.joint_ids.len();
    for (ci, c) in constraints.iter().enumerate() {
        let g = &geo[&c.bar];
        let off = layout.bar_offset(c.bar);
        let row = constraint_base + ci;
        match c.component {
            ActionComponent::Normal => {
                a[(row, off)] = -g.ux[0];
                a[(row, off + 1)] = -g.ux[1];
            }
            ActionComponent::Shear => {
                a[(row, off)] = -g.uy[0];
                a[(row, off + 1)] = -g.uy[1];
            }
            ActionComponent::Moment => {
                let cut = g.point_at(c.x);
                a[(row, off)] = g.yi - cut[1];
                a[(row, off + 1)] = -(g.xi - cut[0]);
                a[(row, off + 2)] = -1.0;
            }
        }
    }

    (a, layout)
}

/// Whether the (possibly still hyperstatic) structure can carry any load:
/// the equilibrium system must have full row rank
pub(crate) fn is_stable(
    model: &Model,
    geo: &BTreeMap<u32, BarGeometry>,
    released: &[(u32, Dof)],
    constraints: &[SectionConstraint],
) -> bool {
    let (a, layout) = equilibrium_matrix(model, geo, released, constraints);
    if layout.n_equations > layout.n_unknowns {
        return false;
    }
    math::rank(&a) == layout.n_equations
}

/// Resultant force and moment-about-`p` of a distributed load clipped to
/// local [from, to], in global axes
pub(crate) fn distributed_resultant(
    q: &DistributedLoad,
    g: &BarGeometry,
    from: f64,
    to: f64,
    p: [f64; 2],
) -> (f64, f64, f64) {
    let a = q.x1.max(from);
    let b = q.x2.min(to);
    if b - a <= 0.0 {
        return (0.0, 0.0, 0.0);
    }
    let qa = q.intensity_at(a);
    let qb = q.intensity_at(b);
    let u = g.load_direction(q.angle);
    let len = b - a;
    let total = (qa + qb) / 2.0 * len;
    // ∫ s·q(s) ds over [a, b] with s the local abscissa from the i-end
    let sq = a * total + len * len * (qa / 6.0 + qb / 3.0);
    let fx = total * u[0];
    let fy = total * u[1];
    // Moment about p: anchor at the i-end, then the axial first moment
    let m_anchor = moment_about(p, [g.xi, g.yi], fx, fy);
    let m_axial = sq * (g.ux[0] * u[1] - g.ux[1] * u[0]);
    (fx, fy, m_anchor + m_axial)
}

/// Assemble the right-hand side for a substructure's load set
fn load_rhs(
    model: &Model,
    geo: &BTreeMap<u32, BarGeometry>,
    sub: &Substructure,
    layout: &Layout,
) -> DVec {
    let mut b = DVec::zeros(layout.n_equations);

    // Bar rows: move applied bar loads to the right-hand side
    for (bi, &bar_id) in layout.bar_ids.iter().enumerate() {
        let g = &geo[&bar_id];
        let row = 3 * bi;
        let ip = [g.xi, g.yi];
        for l in sub.bar_points.iter().filter(|l| l.bar == bar_id) {
            let u = g.load_direction(l.angle);
            let (fx, fy) = (l.p * u[0], l.p * u[1]);
            b[row] -= fx;
            b[row + 1] -= fy;
            b[row + 2] -= moment_about(ip, g.point_at(l.a), fx, fy);
        }
        for q in sub.bar_dists.iter().filter(|q| q.bar == bar_id) {
            let (fx, fy, m) = distributed_resultant(q, g, 0.0, g.length, ip);
            b[row] -= fx;
            b[row + 1] -= fy;
            b[row + 2] -= m;
        }
    }

    // Joint rows: applied joint loads
    let joint_base = 3 * layout.bar_ids.len();
    for l in &sub.joint_loads {
        let ji = layout.joint_ids.binary_search(&l.joint).unwrap();
        let row = joint_base + 3 * ji;
        b[row] += l.fx;
        b[row + 1] += l.fy;
        b[row + 2] += l.mz;
    }

    // Constraint rows: prescribed action plus the load terms left of the cut
    let constraint_base = joint_base + 3 * layout.joint_ids.len();
    for (ci, c) in sub.constraints.iter().enumerate() {
        let g = &geo[&c.bar];
        let cut = g.point_at(c.x);
        let (mut lfx, mut lfy, mut lm) = (0.0, 0.0, 0.0);
        for l in sub.bar_points.iter().filter(|l| l.bar == c.bar) {
            if l.a <= c.x + EVENT_TOL {
                let u = g.load_direction(l.angle);
                lfx += l.p * u[0];
                lfy += l.p * u[1];
                lm += moment_about(cut, g.point_at(l.a), l.p * u[0], l.p * u[1]);
            }
        }
        for q in sub.bar_dists.iter().filter(|q| q.bar == c.bar) {
            let (fx, fy, m) = distributed_resultant(q, g, 0.0, c.x, cut);
            lfx += fx;
            lfy += fy;
            lm += m;
        }
        let row = constraint_base + ci;
        b[row] = c.rhs
            + match c.component {
                ActionComponent::Normal => lfx * g.ux[0] + lfy * g.ux[1],
                ActionComponent::Shear => lfx * g.uy[0] + lfy * g.uy[1],
                ActionComponent::Moment => lm,
            };
    }

    b
}

/// Solve one substructure: reactions, end actions and internal fields
pub(crate) fn solve_substructure(
    model: &Model,
    geo: &BTreeMap<u32, BarGeometry>,
    sub: &Substructure,
) -> EngineResult<SubSolution> {
    let (a, layout) = equilibrium_matrix(model, geo, &sub.released, &sub.constraints);
    if layout.n_equations != layout.n_unknowns {
        return Err(EngineError::Unstable(format!(
            "substructure {} is not isostatic ({} equations, {} unknowns)",
            sub.label, layout.n_equations, layout.n_unknowns
        )));
    }

    let cond = math::condition_number(&a);
    if cond > EQUILIBRIUM_COND_LIMIT {
        return Err(EngineError::Unstable(format!(
            "equilibrium system of substructure {} is near-singular (cond = {cond:.3e})",
            sub.label
        )));
    }

    let b = load_rhs(model, geo, sub, &layout);
    let solution = math::solve_lu(&a, &b).ok_or_else(|| {
        EngineError::Unstable(format!(
            "equilibrium system of substructure {} is singular",
            sub.label
        ))
    })?;
    debug!(
        "substructure {}: solved {} equilibrium unknowns (cond = {:.3e})",
        sub.label, layout.n_unknowns, cond
    );

    let mut end_actions = BTreeMap::new();
    for (bi, &bar_id) in layout.bar_ids.iter().enumerate() {
        let mut ea = [0.0; 6];
        for (k, e) in ea.iter_mut().enumerate() {
            *e = solution[6 * bi + k];
        }
        end_actions.insert(bar_id, ea);
    }

    let mut reactions = BTreeMap::new();
    for (p, &(joint, dof)) in layout.reactions.iter().enumerate() {
        reactions.insert((joint, dof), solution[6 * layout.bar_ids.len() + p]);
    }

    let mut fields = BTreeMap::new();
    for (&bar_id, ea) in &end_actions {
        fields.insert(bar_id, build_field(geo, sub, bar_id, ea)?);
    }

    Ok(SubSolution {
        end_actions,
        reactions,
        fields,
    })
}

/// Sorted unique event abscissae of a bar's load set
fn events(geo: &BarGeometry, sub: &Substructure, bar_id: u32) -> std::vec::Vec<f64> {
    let mut ev = vec![0.0, geo.length];
    for l in sub.bar_points.iter().filter(|l| l.bar == bar_id) {
        ev.push(l.a.clamp(0.0, geo.length));
    }
    for q in sub.bar_dists.iter().filter(|q| q.bar == bar_id) {
        ev.push(q.x1.clamp(0.0, geo.length));
        ev.push(q.x2.clamp(0.0, geo.length));
    }
    ev.sort_by(|a, b| a.partial_cmp(b).unwrap());
    ev.dedup_by(|a, b| (*a - *b).abs() <= EVENT_TOL);
    ev
}

/// Build N, V, M piecewise fields of one bar by the method of sections
///
/// The left-portion resultant starts from the i-end actions and picks up
/// applied loads event by event; between events the fields are closed
/// forms of degree at most three.
fn build_field(
    geo: &BTreeMap<u32, BarGeometry>,
    sub: &Substructure,
    bar_id: u32,
    ea: &[f64; 6],
) -> EngineResult<RawField> {
    let g = &geo[&bar_id];
    let breaks = events(g, sub, bar_id);
    let n_seg = breaks.len() - 1;

    // Left-portion resultant at the current segment start: global force
    // sum and moment about the running cut point
    let mut sx = ea[0];
    let mut sy = ea[1];
    let mut macc = ea[2];

    let mut n_polys = std::vec::Vec::with_capacity(n_seg);
    let mut v_polys = std::vec::Vec::with_capacity(n_seg);
    let mut m_polys = std::vec::Vec::with_capacity(n_seg);

    for k in 0..n_seg {
        let xa = breaks[k];
        let xb = breaks[k + 1];
        let h = xb - xa;

        // Point loads sitting exactly on this segment start
        for l in sub.bar_points.iter().filter(|l| l.bar == bar_id) {
            if (l.a - xa).abs() <= EVENT_TOL {
                let u = g.load_direction(l.angle);
                sx += l.p * u[0];
                sy += l.p * u[1];
            }
        }

        // Distributed loads covering this whole segment
        struct Active {
            qa: f64,
            qb: f64,
            u: [f64; 2],
        }
        let mut active = std::vec::Vec::new();
        for q in sub.bar_dists.iter().filter(|q| q.bar == bar_id) {
            if q.x1 <= xa + EVENT_TOL && q.x2 >= xb - EVENT_TOL {
                active.push(Active {
                    qa: q.intensity_at(xa.max(q.x1)),
                    qb: q.intensity_at(xb.min(q.x2)),
                    u: g.load_direction(q.angle),
                });
            }
        }

        // S(t) = S_acc + Σ u·(qa·t + Δq·t²/2h); N = −S·x̂', V = −S·ŷ'
        let mut n_c = [-(sx * g.ux[0] + sy * g.ux[1]), 0.0, 0.0, 0.0];
        let mut v_c = [-(sx * g.uy[0] + sy * g.uy[1]), 0.0, 0.0, 0.0];
        // M(t) = −[Macc − t·x̂'x·Sy + t·x̂'y·Sx + Σ e·(−qa·t²/2 − Δq·t³/6h)]
        let mut m_c = [
            -macc,
            g.ux[0] * sy - g.ux[1] * sx,
            0.0,
            0.0,
        ];
        for d in &active {
            let dq = d.qb - d.qa;
            let ax = d.u[0] * g.ux[0] + d.u[1] * g.ux[1];
            let tr = d.u[0] * g.uy[0] + d.u[1] * g.uy[1];
            let e = g.ux[0] * d.u[1] - g.ux[1] * d.u[0];
            n_c[1] -= ax * d.qa;
            n_c[2] -= ax * dq / (2.0 * h);
            v_c[1] -= tr * d.qa;
            v_c[2] -= tr * dq / (2.0 * h);
            m_c[2] += e * d.qa / 2.0;
            m_c[3] += e * dq / (6.0 * h);
        }
        let n_poly = Poly::new(n_c.to_vec());
        let v_poly = Poly::new(v_c.to_vec());
        let m_poly = Poly::new(m_c.to_vec());

        // Advance the running state to the segment end
        let n_end = n_poly.eval(h);
        let v_end = v_poly.eval(h);
        sx = -(n_end * g.ux[0] + v_end * g.uy[0]);
        sy = -(n_end * g.ux[1] + v_end * g.uy[1]);
        macc = -m_poly.eval(h);

        n_polys.push(n_poly);
        v_polys.push(v_poly);
        m_polys.push(m_poly);
    }

    // Boundary invariant: the fields at x = L must match the j-end
    // actions; a point load sitting exactly on the j-end jumps the field
    // at the domain edge and joins the expected side
    let n_end = n_polys[n_seg - 1].eval(breaks[n_seg] - breaks[n_seg - 1]);
    let v_end = v_polys[n_seg - 1].eval(breaks[n_seg] - breaks[n_seg - 1]);
    let m_end = m_polys[n_seg - 1].eval(breaks[n_seg] - breaks[n_seg - 1]);
    let (mut fx_j, mut fy_j) = (ea[3], ea[4]);
    for l in sub.bar_points.iter().filter(|l| l.bar == bar_id) {
        if (l.a - g.length).abs() <= EVENT_TOL {
            let u = g.load_direction(l.angle);
            fx_j += l.p * u[0];
            fy_j += l.p * u[1];
        }
    }
    let n_j = fx_j * g.ux[0] + fy_j * g.ux[1];
    let v_j = fx_j * g.uy[0] + fy_j * g.uy[1];
    let m_j = ea[5];
    for (got, want) in [(n_end, n_j), (v_end, v_j), (m_end, m_j)] {
        if (got - want).abs() > BOUNDARY_TOL * want.abs().max(1.0) {
            return Err(EngineError::AnalysisFailed(format!(
                "internal field of bar {bar_id} does not close at x = L \
                 (got {got:.6e}, expected {want:.6e})"
            )));
        }
    }

    Ok(RawField {
        n: PiecewisePoly::new(breaks.clone(), n_polys),
        v: PiecewisePoly::new(breaks.clone(), v_polys),
        m: PiecewisePoly::new(breaks, m_polys),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::substructure;
    use crate::elements::{Bar, Joint, Material, Section, Support};
    use crate::loads::{BarPointLoad, DistributedLoad, Load};
    use crate::model::Model;
    use approx::assert_relative_eq;

    fn cantilever(load: Load) -> (Model, BTreeMap<u32, BarGeometry>) {
        let mut model = Model::new();
        model.add_joint(1, Joint::new(0.0, 0.0)).unwrap();
        model.add_joint(2, Joint::new(6.0, 0.0)).unwrap();
        model.add_material(1, Material::steel()).unwrap();
        model.add_section(1, Section::new(0.01, 2.772e-5)).unwrap();
        model.add_bar(1, Bar::new(1, 2, 1, 1)).unwrap();
        model.add_support(1, Support::fixed()).unwrap();
        model.add_load(load).unwrap();
        let geo = model
            .bars
            .keys()
            .map(|&id| (id, model.geometry(id).unwrap()))
            .collect();
        (model, geo)
    }

    #[test]
    fn test_cantilever_tip_load() {
        // Solved from the root end alone; no reactions are presumed at the tip
        let (model, geo) = cantilever(Load::BarPoint(BarPointLoad::transverse(1, 10.0, 6.0)));
        let subs = substructure::build(&model, &geo, &[]);
        let sol = solve_substructure(&model, &geo, &subs[0]).unwrap();

        let f = &sol.fields[&1];
        assert_relative_eq!(f.m(0.0), 60.0, epsilon = 1e-9);
        assert_relative_eq!(f.m(6.0), 0.0, epsilon = 1e-9);
        assert_relative_eq!(f.v(3.0), 10.0, epsilon = 1e-9);

        // Root reactions push up and twist counterclockwise
        assert_relative_eq!(sol.reactions[&(1, Dof::Y)], -10.0, epsilon = 1e-9);
        assert_relative_eq!(sol.reactions[&(1, Dof::Rz)], -60.0, epsilon = 1e-9);
    }

    #[test]
    fn test_simply_supported_uniform_load() {
        let mut model = Model::new();
        model.add_joint(1, Joint::new(0.0, 0.0)).unwrap();
        model.add_joint(2, Joint::new(6.0, 0.0)).unwrap();
        model.add_material(1, Material::steel()).unwrap();
        model.add_section(1, Section::new(0.01, 2.772e-5)).unwrap();
        model.add_bar(1, Bar::new(1, 2, 1, 1)).unwrap();
        model.add_support(1, Support::pinned()).unwrap();
        model.add_support(2, Support::roller_y()).unwrap();
        model.add_load(DistributedLoad::uniform(1, 4.0)).unwrap();
        let geo = model
            .bars
            .keys()
            .map(|&id| (id, model.geometry(id).unwrap()))
            .collect();

        let subs = substructure::build(&model, &geo, &[]);
        let sol = solve_substructure(&model, &geo, &subs[0]).unwrap();

        let f = &sol.fields[&1];
        // Sagging midspan moment -qL²/8, shear ±qL/2 at the ends
        assert_relative_eq!(f.m(3.0), -4.0 * 36.0 / 8.0, epsilon = 1e-9);
        assert_relative_eq!(f.v(0.0), 12.0, epsilon = 1e-9);
        assert_relative_eq!(f.v(6.0), -12.0, epsilon = 1e-9);
        assert_relative_eq!(sol.reactions[&(1, Dof::Y)], -12.0, epsilon = 1e-9);
        assert_relative_eq!(sol.reactions[&(2, Dof::Y)], -12.0, epsilon = 1e-9);
    }

    #[test]
    fn test_point_load_shear_jump() {
        let mut model = Model::new();
        model.add_joint(1, Joint::new(0.0, 0.0)).unwrap();
        model.add_joint(2, Joint::new(6.0, 0.0)).unwrap();
        model.add_material(1, Material::steel()).unwrap();
        model.add_section(1, Section::new(0.01, 2.772e-5)).unwrap();
        model.add_bar(1, Bar::new(1, 2, 1, 1)).unwrap();
        model.add_support(1, Support::pinned()).unwrap();
        model.add_support(2, Support::roller_y()).unwrap();
        model
            .add_load(BarPointLoad::transverse(1, 10.0, 2.0))
            .unwrap();
        let geo = model
            .bars
            .keys()
            .map(|&id| (id, model.geometry(id).unwrap()))
            .collect();

        let subs = substructure::build(&model, &geo, &[]);
        let sol = solve_substructure(&model, &geo, &subs[0]).unwrap();

        let f = &sol.fields[&1];
        // V jumps by the applied load across the event
        let jump = f.v.value_before(2.0) - f.v.value(2.0);
        assert_relative_eq!(jump, 10.0, epsilon = 1e-9);
        // M is continuous there
        assert_relative_eq!(f.m.value_before(2.0), f.m.value(2.0), epsilon = 1e-9);
    }

    #[test]
    fn test_stability_rank_detects_mechanism() {
        // Two rollers cannot restrain the horizontal rigid-body motion
        let mut model = Model::new();
        model.add_joint(1, Joint::new(0.0, 0.0)).unwrap();
        model.add_joint(2, Joint::new(6.0, 0.0)).unwrap();
        model.add_material(1, Material::steel()).unwrap();
        model.add_section(1, Section::new(0.01, 2.772e-5)).unwrap();
        model.add_bar(1, Bar::new(1, 2, 1, 1)).unwrap();
        model.add_support(1, Support::roller_y()).unwrap();
        model.add_support(2, Support::roller_y()).unwrap();
        let geo: BTreeMap<u32, BarGeometry> = model
            .bars
            .keys()
            .map(|&id| (id, model.geometry(id).unwrap()))
            .collect();
        assert!(!is_stable(&model, &geo, &[], &[]));
    }
}
