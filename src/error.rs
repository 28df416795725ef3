//! Error types for the force-method engine

use thiserror::Error;

/// Main error type for engine operations
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Joint {0} not found in model")]
    JointNotFound(u32),

    #[error("Bar {0} not found in model")]
    BarNotFound(u32),

    #[error("Material {0} not found in model")]
    MaterialNotFound(u32),

    #[error("Section {0} not found in model")]
    SectionNotFound(u32),

    #[error("Duplicate id {0} already exists")]
    DuplicateId(u32),

    #[error("Invalid model: {0}")]
    ModelInvalid(String),

    #[error("Hypostatic structure: {deficit} missing restraint(s) (gh = {gh})")]
    Hypostatic { gh: i64, deficit: i64 },

    #[error("Geometrically unstable structure: {0}")]
    Unstable(String),

    #[error("No admissible redundant set leaves a stable primary structure")]
    RedundantChoiceUnstable,

    #[error("Flexibility matrix is ill-conditioned (cond = {cond:.3e})")]
    IllConditioned { cond: f64 },

    #[error("Adaptive Simpson integration did not converge on bar {bar}")]
    IntegrationFailure { bar: u32 },

    #[error("Flexibility matrix symmetry violated (relative defect {defect:.3e})")]
    SymmetryViolation { defect: f64 },

    #[error(
        "Global equilibrium violated: residuals Fx = {fx:.3e}, Fy = {fy:.3e}, Mz = {mz:.3e}"
    )]
    EquilibriumViolation { fx: f64, fy: f64, mz: f64 },

    #[error("Compatibility residual {residual:.3e} exceeds tolerance")]
    ResidualTooLarge { residual: f64 },

    #[error("Analysis canceled")]
    Canceled,

    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

/// Result type for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
