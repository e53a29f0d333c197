use thiserror::Error;

/// The result of a synthesis operation.
pub type Result<T> = std::result::Result<T, SynthError>;

/// Error returned when a synthesis run failed.
///
/// Note that an unsatisfiable problem is *not* an error: it is reported through
/// [`Outcome::Unsat`].
///
/// [`Outcome::Unsat`]: crate::solve::Outcome::Unsat
#[derive(Debug, Error)]
pub enum SynthError {
    /// The run configuration was rejected before any encoding started.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// The encoding has reached an invalid state. This should never happen.
    /// For example, the oracle returned a model where a LUT input has two wiring sources.
    #[error("encoding invariant violated - this should not happen - error: {0}")]
    EncodingInvariant(String),

    /// Just forwarding an [`OracleError`].
    #[error("{0}")]
    Oracle(#[from] OracleError),
}

/// Error returned when the run configuration is invalid.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A topology field must be strictly positive.
    #[error("topology field `{0}` must be positive")]
    ZeroField(&'static str),

    /// A LUT cannot have more inputs than there are global inputs.
    #[error("number of global inputs ({global_inputs}) is lower than the LUT size ({lut_inputs})")]
    LutLargerThanInputs {
        global_inputs: usize,
        lut_inputs: usize,
    },

    /// The problem does not fit in memory (too many cases or truth table rows).
    #[error("topology too large: {0}")]
    TooLarge(String),

    /// Unknown strategy or encoding selector.
    #[error("invalid {kind}: '{value}' (expected one of {expected})")]
    InvalidSelector {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },

    /// At least one worker is needed by the parallel strategy.
    #[error("the parallel strategy needs at least one worker")]
    NoWorkers,

    /// `2^depth` patterns cannot be shared between more than `2^depth` workers.
    #[error("depth {depth} is too small for {workers} workers (2^depth must be at least the worker count)")]
    DepthTooSmall { depth: u32, workers: usize },

    /// More pinned bits requested than there are partition atoms.
    #[error("depth {depth} exceeds the {available} available partition atoms")]
    DepthTooLarge { depth: u32, available: usize },
}

/// Error returned by the satisfiability oracle. Always fatal.
#[derive(Debug, Error)]
pub enum OracleError {
    /// The underlying solver failed.
    #[error("solver error: {0}")]
    Solver(String),

    /// The solver could not decide the problem.
    #[error("solver returned unknown")]
    Unknown,

    /// A model was requested while the last check was not SAT.
    #[error("no model available (last result was not SAT)")]
    NoModel,
}
