//! Incremental strategy: check after every case, stop at the first UNSAT.
//!
//! The case loop is shared with the parallel workers, which additionally poll a stop flag
//! before every case.

use std::time::Instant;

use log::{debug, info};

use super::{Outcome, SynthReport, Timings, check, extract, prepare};
use crate::{
    Result,
    config::RunConfig,
    encoding::CaseEncoder,
    formula::Formula,
    oracle::Oracle,
    target::{HintGenerator, TargetFunction},
};

/// Cases between two progress messages.
const PROGRESS_STEP: usize = 1 << 8;

/// How the case loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CaseLoop {
    /// Every case asserted, the last check was SAT.
    Sat,
    /// The check after this case was UNSAT.
    Unsat { case: usize },
    /// `before_case` asked to stop.
    Stopped,
}

/// Asserts the cases in order, checking after each one.
///
/// `before_case` is called with the index of the next case; returning `false` stops the loop.
pub(crate) fn solve_cases<O, T>(
    oracle: &mut O,
    encoder: &CaseEncoder,
    cases: usize,
    target: &T,
    timings: &mut Timings,
    mut before_case: impl FnMut(usize) -> bool,
) -> Result<CaseLoop>
where
    O: Oracle,
    T: TargetFunction + ?Sized,
{
    for case in 0..cases {
        if !before_case(case) {
            return Ok(CaseLoop::Stopped);
        }

        let start = Instant::now();
        oracle.assert(&Formula::and(encoder.encode_case(case, target)))?;
        timings.encoding += start.elapsed();

        let start = Instant::now();
        let sat = check(oracle)?;
        timings.solving += start.elapsed();
        if !sat {
            return Ok(CaseLoop::Unsat { case });
        }
    }
    Ok(CaseLoop::Sat)
}

pub(crate) fn run<O, T, H>(
    config: &RunConfig,
    target: &T,
    hints: &H,
    mut oracle: O,
) -> Result<SynthReport>
where
    O: Oracle,
    T: TargetFunction + ?Sized,
    H: HintGenerator + ?Sized,
{
    let index = config.signal_index();
    let encoder = CaseEncoder::new(&index, config.encoding());
    let cases = index.topology().cases();
    let mut timings = Timings::default();

    let start = Instant::now();
    prepare(&mut oracle, &index, hints)?;
    timings.encoding = start.elapsed();

    let res = solve_cases(
        &mut oracle,
        &encoder,
        cases,
        target,
        &mut timings,
        |case| {
            if case % PROGRESS_STEP == 0 {
                debug!("Case {}/{}", case, cases);
            }
            true
        },
    )?;

    let outcome = match res {
        CaseLoop::Sat => Outcome::Sat {
            network: extract(&oracle, &index, target)?,
            worker: None,
        },
        CaseLoop::Unsat { case } => {
            info!("Unsatisfiable after case {}", case);
            Outcome::Unsat {
                failed_case: Some(case),
            }
        }
        // Never asked to stop
        CaseLoop::Stopped => Outcome::Unsat { failed_case: None },
    };
    Ok(SynthReport { outcome, timings })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        oracle::VarisatOracle,
        target::{NoHints, Parity},
        topology::Topology,
    };

    #[test]
    fn xor_test() {
        let xor = |inputs: &[bool], _: usize| inputs[0] != inputs[1];
        let config = RunConfig::new(Topology::new(1, 2, 1, 2, 1));
        let report = run(&config, &xor, &NoHints, VarisatOracle::new()).unwrap();
        let network = report.network().unwrap();
        assert_eq!(network.verify(&xor), Ok(()));
    }

    #[test]
    fn failed_case_test() {
        // Parity of 3 inputs with one 2-input LUT: cases 0 to 3 force `B xor C`,
        // case 4 = (1, 0, 0) breaks it.
        let config = RunConfig::new(Topology::new(1, 2, 1, 3, 1));
        let report = run(&config, &Parity, &NoHints, VarisatOracle::new()).unwrap();
        assert_eq!(
            report.outcome,
            Outcome::Unsat {
                failed_case: Some(4)
            }
        );
    }

    #[test]
    fn stop_request_test() {
        let xor = |inputs: &[bool], _: usize| inputs[0] != inputs[1];
        let config = RunConfig::new(Topology::new(1, 2, 1, 2, 1));
        let index = config.signal_index();
        let encoder = CaseEncoder::new(&index, config.encoding());
        let mut oracle = VarisatOracle::new();
        prepare(&mut oracle, &index, &NoHints).unwrap();
        let mut timings = Timings::default();
        let res = solve_cases(&mut oracle, &encoder, 4, &xor, &mut timings, |case| case < 2)
            .unwrap();
        assert_eq!(res, CaseLoop::Stopped);
    }
}
