//! Monolithic strategy: assert everything, check once.

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
const PROGRESS_STEP: usize = 1 << 10;

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
    for case in 0..cases {
        oracle.assert(&Formula::and(encoder.encode_case(case, target)))?;
        if (case + 1) % PROGRESS_STEP == 0 {
            debug!("Asserted {}/{} cases", case + 1, cases);
        }
    }
    timings.encoding = start.elapsed();
    info!(
        "Asserted all {} cases in {:.3}s",
        cases,
        timings.encoding.as_secs_f64()
    );

    let start = Instant::now();
    let sat = check(&mut oracle)?;
    timings.solving = start.elapsed();

    let outcome = if sat {
        Outcome::Sat {
            network: extract(&oracle, &index, target)?,
            worker: None,
        }
    } else {
        Outcome::Unsat { failed_case: None }
    };
    Ok(SynthReport { outcome, timings })
}
