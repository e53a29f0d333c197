//! Solve strategies: how and when the formulas are handed to the oracle.
//!
//! - [`Strategy::Monolithic`] asserts every case, then checks once.
//! - [`Strategy::Incremental`] checks after every case and stops at the first UNSAT.
//! - [`Strategy::Parallel`] splits the search space between several workers, each running the
//!   incremental loop on its own oracle, and stops as soon as one of them finds a network.
//!
//! Every strategy decodes the model of a SAT answer and simulates the resulting network on
//! all the cases before reporting it.

use std::{
    fmt::Display,
    str::FromStr,
    time::{Duration, Instant},
};

use log::{error, info};

use crate::{
    Result, SynthError,
    config::RunConfig,
    constraints::topology_constraints,
    decode::LutNetwork,
    error::{ConfigError, OracleError},
    oracle::{Oracle, SatResult, VarisatOracle},
    signal::SignalIndex,
    target::{HintGenerator, TargetFunction},
};

pub mod incremental;
pub mod monolithic;
pub mod parallel;
pub mod partition;

/// How the per-case formulas are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    #[default]
    Monolithic,
    Incremental,
    Parallel,
}

impl FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "basic" | "monolithic" => Ok(Strategy::Monolithic),
            "inc" | "incremental" => Ok(Strategy::Incremental),
            "parallel" => Ok(Strategy::Parallel),
            _ => Err(ConfigError::InvalidSelector {
                kind: "strategy",
                value: s.to_string(),
                expected: "'basic', 'inc' or 'parallel'",
            }),
        }
    }
}

impl Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Monolithic => write!(f, "basic"),
            Strategy::Incremental => write!(f, "inc"),
            Strategy::Parallel => write!(f, "parallel"),
        }
    }
}

/// Answer of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A network realizing the target exists.
    Sat {
        network: LutNetwork,
        /// Worker which found it, for the parallel strategy.
        worker: Option<usize>,
    },
    /// No network of this topology realizes the target.
    Unsat {
        /// First case which made the problem unsatisfiable, for the incremental strategy.
        failed_case: Option<usize>,
    },
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Sat {
                worker: Some(w), ..
            } => write!(f, "SAT (worker {})", w),
            Outcome::Sat { .. } => write!(f, "SAT"),
            Outcome::Unsat {
                failed_case: Some(case),
            } => write!(f, "UNSAT (from case {})", case),
            Outcome::Unsat { .. } => write!(f, "UNSAT"),
        }
    }
}

/// Wall-clock timings of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timings {
    /// Building and asserting formulas.
    pub encoding: Duration,
    /// Time spent in `check_sat`.
    pub solving: Duration,
    /// Whole run, validation and decoding included.
    pub total: Duration,
}

impl Timings {
    /// Field-wise maximum.
    fn max(self, other: Timings) -> Timings {
        Timings {
            encoding: self.encoding.max(other.encoding),
            solving: self.solving.max(other.solving),
            total: self.total.max(other.total),
        }
    }
}

impl Display for Timings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "encoding: {:.3}s, solving: {:.3}s, total: {:.3}s",
            self.encoding.as_secs_f64(),
            self.solving.as_secs_f64(),
            self.total.as_secs_f64()
        )
    }
}

/// Result of a run: the answer and where the time went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthReport {
    pub outcome: Outcome,
    pub timings: Timings,
}

impl SynthReport {
    pub fn is_sat(&self) -> bool {
        matches!(self.outcome, Outcome::Sat { .. })
    }

    pub fn network(&self) -> Option<&LutNetwork> {
        match &self.outcome {
            Outcome::Sat { network, .. } => Some(network),
            Outcome::Unsat { .. } => None,
        }
    }
}

/// Runs the configured strategy with the varisat oracle.
pub fn synthesize<T, H>(config: &RunConfig, target: &T, hints: &H) -> Result<SynthReport>
where
    T: TargetFunction + Sync + ?Sized,
    H: HintGenerator + Sync + ?Sized,
{
    synthesize_with(config, target, hints, VarisatOracle::new)
}

/// Runs the configured strategy. `new_oracle` creates one oracle per worker.
///
/// The configuration is validated before any encoding work.
pub fn synthesize_with<O, F, T, H>(
    config: &RunConfig,
    target: &T,
    hints: &H,
    new_oracle: F,
) -> Result<SynthReport>
where
    O: Oracle,
    F: Fn() -> O + Sync,
    T: TargetFunction + Sync + ?Sized,
    H: HintGenerator + Sync + ?Sized,
{
    let start = Instant::now();
    if let Err(e) = config.validate() {
        error!("Rejected configuration: {}", e);
        return Err(e.into());
    }
    config.log_parameters();

    let mut report = match config.strategy() {
        Strategy::Monolithic => monolithic::run(config, target, hints, new_oracle())?,
        Strategy::Incremental => incremental::run(config, target, hints, new_oracle())?,
        Strategy::Parallel => parallel::run(config, target, hints, &new_oracle)?,
    };
    report.timings.total = start.elapsed();

    info!("{}", report.outcome);
    info!("{}", report.timings);
    Ok(report)
}

/// Declares the atoms, then asserts the structural constraints and the hints.
fn prepare<O, H>(oracle: &mut O, index: &SignalIndex, hints: &H) -> Result<()>
where
    O: Oracle,
    H: HintGenerator + ?Sized,
{
    index.declare_all(oracle)?;
    for c in topology_constraints(index) {
        oracle.assert(&c)?;
    }
    for hint in hints.hints(index) {
        oracle.assert(&hint)?;
    }
    Ok(())
}

/// Checks the assertions so far. `Unknown` is fatal.
fn check<O: Oracle>(oracle: &mut O) -> Result<bool> {
    match oracle.check_sat()? {
        SatResult::Sat => Ok(true),
        SatResult::Unsat => Ok(false),
        SatResult::Unknown => Err(OracleError::Unknown.into()),
    }
}

/// Decodes the current model and simulates the network against the target.
fn extract<O, T>(oracle: &O, index: &SignalIndex, target: &T) -> Result<LutNetwork>
where
    O: Oracle,
    T: TargetFunction + ?Sized,
{
    let network = LutNetwork::decode(index, &oracle.model()?)?;
    network.verify(target).map_err(|case| {
        SynthError::EncodingInvariant(format!(
            "decoded network disagrees with the target on case {}",
            case
        ))
    })?;
    Ok(network)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn strategy_selector_test() {
        assert_eq!("basic".parse(), Ok(Strategy::Monolithic));
        assert_eq!("inc".parse(), Ok(Strategy::Incremental));
        assert_eq!("parallel".parse(), Ok(Strategy::Parallel));
        assert!(matches!(
            "fast".parse::<Strategy>(),
            Err(ConfigError::InvalidSelector {
                kind: "strategy",
                ..
            })
        ));
        assert_eq!(Strategy::Incremental.to_string(), "inc");
    }

    #[test]
    fn outcome_display_test() {
        assert_eq!(
            Outcome::Unsat {
                failed_case: Some(3)
            }
            .to_string(),
            "UNSAT (from case 3)"
        );
        assert_eq!(Outcome::Unsat { failed_case: None }.to_string(), "UNSAT");
    }

    #[test]
    fn timings_max_test() {
        let a = Timings {
            encoding: Duration::from_millis(3),
            solving: Duration::from_millis(1),
            total: Duration::ZERO,
        };
        let b = Timings {
            encoding: Duration::from_millis(2),
            solving: Duration::from_millis(5),
            total: Duration::ZERO,
        };
        assert_eq!(
            a.max(b),
            Timings {
                encoding: Duration::from_millis(3),
                solving: Duration::from_millis(5),
                total: Duration::ZERO,
            }
        );
    }
}
