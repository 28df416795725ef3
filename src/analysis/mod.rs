//! Analysis pipeline, options and cooperative control
//!
//! One `analyze` call runs the force-method stages strictly in order:
//! geometry, determinacy, redundant selection, substructures, isostatic
//! solves, flexibility integration, compatibility solution,
//! superposition and verification. The model snapshot is read-only; all
//! results transfer to the returned object.

pub mod compatibility;
pub mod determinacy;
pub mod flexibility;
pub mod redundants;
pub mod statics;
pub mod substructure;
pub mod superpose;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use log::info;
use serde::{Deserialize, Serialize};

use crate::elements::BarGeometry;
use crate::error::{EngineError, EngineResult};
use crate::model::Model;
use crate::results::AnalysisResult;

pub use determinacy::{degree, Determinacy};
pub use redundants::Redundant;

/// Factorization used for the compatibility system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolverKind {
    /// Cholesky, with LU fallback
    Cholesky,
    /// LU with partial pivoting
    Lu,
}

impl Default for SolverKind {
    fn default() -> Self {
        Self::Cholesky
    }
}

/// Options of one analysis call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Include the N·N/(EA) flexibility term
    pub include_axial: bool,
    /// Include the V·V/(κGA) term (Timoshenko)
    pub include_shear: bool,
    /// Override the automatic redundant selection
    pub manual_redundants: Option<Vec<Redundant>>,
    /// Base Simpson sample count per bar segment (odd, ≥ 5)
    pub simpson_points: usize,
    /// Compatibility factorization
    pub solver: SolverKind,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            include_axial: true,
            include_shear: false,
            manual_redundants: None,
            simpson_points: 21,
            solver: SolverKind::Cholesky,
        }
    }
}

impl AnalysisOptions {
    /// Euler-Bernoulli flexure + axial (the default)
    pub fn euler_bernoulli() -> Self {
        Self::default()
    }

    /// Include shear flexibility
    pub fn timoshenko() -> Self {
        Self {
            include_shear: true,
            ..Self::default()
        }
    }

    /// Flexure-only virtual work
    pub fn without_axial(mut self) -> Self {
        self.include_axial = false;
        self
    }

    /// Override the automatic redundant selection
    pub fn with_redundants(mut self, redundants: Vec<Redundant>) -> Self {
        self.manual_redundants = Some(redundants);
        self
    }

    /// Set the base Simpson sample count
    pub fn with_simpson_points(mut self, n: usize) -> Self {
        self.simpson_points = n;
        self
    }

    /// Set the compatibility factorization
    pub fn with_solver(mut self, solver: SolverKind) -> Self {
        self.solver = solver;
        self
    }
}

/// Cooperative cancellation flag and monotonic progress counter
///
/// Progress runs 0..1 and is updated after each pipeline stage; the
/// cancellation flag is polled at the same boundaries.
#[derive(Debug, Clone, Default)]
pub struct AnalysisControl {
    cancel: Arc<AtomicBool>,
    /// Progress in thousandths
    progress: Arc<AtomicU32>,
}

impl AnalysisControl {
    /// Create a fresh control handle
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation; honored at the next stage boundary
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested
    pub fn is_canceled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    /// Current progress, 0..1
    pub fn progress(&self) -> f64 {
        f64::from(self.progress.load(Ordering::Relaxed)) / 1000.0
    }

    fn checkpoint(&self, progress: f64) -> EngineResult<()> {
        if self.is_canceled() {
            return Err(EngineError::Canceled);
        }
        let mille = (progress * 1000.0).round() as u32;
        self.progress.fetch_max(mille, Ordering::Relaxed);
        Ok(())
    }
}

/// Run the analysis with default control
pub fn analyze(model: &Model, options: &AnalysisOptions) -> EngineResult<AnalysisResult> {
    analyze_with_control(model, options, &AnalysisControl::new())
}

/// Run the analysis with cooperative cancellation and progress reporting
pub fn analyze_with_control(
    model: &Model,
    options: &AnalysisOptions,
    control: &AnalysisControl,
) -> EngineResult<AnalysisResult> {
    if options.simpson_points < 5 || options.simpson_points % 2 == 0 {
        return Err(EngineError::AnalysisFailed(format!(
            "simpson_points must be odd and at least 5, got {}",
            options.simpson_points
        )));
    }

    // Stage 1: validation and geometry
    model.validate()?;
    let mut geo: BTreeMap<u32, BarGeometry> = BTreeMap::new();
    for &bar_id in model.bars.keys() {
        geo.insert(bar_id, model.geometry(bar_id)?);
    }
    control.checkpoint(0.1)?;

    // Stage 2: determinacy
    let gh = determinacy::check(model, &geo)?;
    control.checkpoint(0.2)?;

    // Stage 3: redundant selection
    let redundants = match &options.manual_redundants {
        Some(manual) => redundants::validate_manual(model, &geo, gh, manual)?,
        None => redundants::select(model, &geo, gh)?,
    };
    control.checkpoint(0.3)?;

    // Stage 4: substructures
    let sub_defs = substructure::build(model, &geo, &redundants);
    control.checkpoint(0.4)?;

    // Stage 5: isostatic solves (primary + one per redundant)
    let mut subs = Vec::with_capacity(sub_defs.len());
    for sub in &sub_defs {
        subs.push(statics::solve_substructure(model, &geo, sub)?);
    }
    control.checkpoint(0.55)?;

    // Stage 6: flexibility integration
    let compat = flexibility::assemble(model, &geo, &redundants, &subs, options)?;
    control.checkpoint(0.7)?;

    // Stage 7: compatibility solution
    let sol = compatibility::solve(&compat.f, &compat.e0, &compat.eh, options)?;
    control.checkpoint(0.8)?;

    // Stage 8: superposition, verification, displacements
    let x: Vec<f64> = sol.x.iter().copied().collect();
    let result = superpose::finalize(
        model,
        &geo,
        &redundants,
        &sub_defs[0],
        &subs,
        &x,
        sol.condition_number,
        sol.residual,
        sol.warnings,
        options,
    )?;
    control.progress.fetch_max(1000, Ordering::Relaxed);

    info!("analysis finished: gh = {gh}");
    Ok(result)
}
