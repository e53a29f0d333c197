//! Parallel strategy: one incremental loop per worker, each on its own slice of the search space.
//!
//! Every worker owns its oracle and pins a few partition atoms (see [`super::partition`]).
//! Workers publish their status and progress through atomics; the supervisor (the calling
//! thread) polls them, raises the stop flag as soon as one worker found a network, and joins
//! every worker before returning. Workers poll the stop flag before every case.
//!
//! A check in progress is never interrupted: a losing worker busy in
//! [`Oracle::check_sat`] only notices the stop flag once that check returns, so the join
//! after a win can take up to one case's solving time.

use std::{
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicBool, AtomicI8, AtomicUsize, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use log::{debug, info, warn};

use super::{
    Outcome, SynthReport, Timings, extract,
    incremental::{CaseLoop, solve_cases},
    partition::{WorkerPartition, partition_atoms},
    prepare,
};
use crate::{
    Result, SynthError,
    config::RunConfig,
    decode::LutNetwork,
    encoding::CaseEncoder,
    oracle::Oracle,
    target::{HintGenerator, TargetFunction},
};

/// Delay between two polls of the supervisor.
const POLL_INTERVAL: Duration = Duration::from_millis(2);
/// Delay between two progress reports.
const REPORT_INTERVAL: Duration = Duration::from_secs(5);

/// Status of a worker, as published to the supervisor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i8)]
enum WorkerStatus {
    Running = 0,
    Sat = 1,
    Unsat = -1,
    /// Stopped by the supervisor before the end of its cases.
    Stopped = 2,
    /// The oracle or the decoder failed.
    Failed = -2,
}

impl WorkerStatus {
    fn from_i8(value: i8) -> Self {
        match value {
            1 => WorkerStatus::Sat,
            -1 => WorkerStatus::Unsat,
            2 => WorkerStatus::Stopped,
            -2 => WorkerStatus::Failed,
            _ => WorkerStatus::Running,
        }
    }

    fn is_done(self) -> bool {
        self != WorkerStatus::Running
    }
}

/// State shared between the workers and the supervisor.
struct Shared {
    stop: AtomicBool,
    status: Vec<AtomicI8>,
    progress: Vec<AtomicUsize>,
    /// First network found, with its worker and timings.
    winner: Mutex<Option<(usize, LutNetwork, Timings)>>,
}

impl Shared {
    fn new(workers: usize) -> Self {
        Shared {
            stop: AtomicBool::new(false),
            status: (0..workers)
                .map(|_| AtomicI8::new(WorkerStatus::Running as i8))
                .collect(),
            progress: (0..workers).map(|_| AtomicUsize::new(0)).collect(),
            winner: Mutex::new(None),
        }
    }

    fn status(&self, worker: usize) -> WorkerStatus {
        WorkerStatus::from_i8(self.status[worker].load(Ordering::SeqCst))
    }

    fn set_status(&self, worker: usize, status: WorkerStatus) {
        self.status[worker].store(status as i8, Ordering::SeqCst);
    }

    /// Keeps the first published network only.
    fn publish(&self, worker: usize, network: LutNetwork, timings: Timings) {
        let mut winner = self.winner.lock().unwrap_or_else(PoisonError::into_inner);
        if winner.is_none() {
            *winner = Some((worker, network, timings));
        }
    }
}

/// Runs one worker to completion (or until stopped), publishing its status.
fn worker<O, T, H>(
    id: usize,
    config: &RunConfig,
    target: &T,
    hints: &H,
    mut oracle: O,
    shared: &Shared,
) -> Result<Timings>
where
    O: Oracle,
    T: TargetFunction + ?Sized,
    H: HintGenerator + ?Sized,
{
    let p = config.parallel();
    let partition = WorkerPartition::new(id, p.workers, p.depth);
    debug!("Starting {}", partition);

    let index = config.signal_index();
    let encoder = CaseEncoder::new(&index, config.encoding());
    let cases = index.topology().cases();
    let mut timings = Timings::default();
    let start = Instant::now();

    prepare(&mut oracle, &index, hints)?;
    for pin in partition.assertions(&partition_atoms(&index, p.target)) {
        oracle.assert(&pin)?;
    }
    timings.encoding = start.elapsed();

    let res = solve_cases(
        &mut oracle,
        &encoder,
        cases,
        target,
        &mut timings,
        |case| {
            shared.progress[id].store(case, Ordering::Relaxed);
            !shared.stop.load(Ordering::SeqCst)
        },
    )?;
    timings.total = start.elapsed();

    match res {
        CaseLoop::Sat => {
            let network = extract(&oracle, &index, target)?;
            info!("Worker {} found a network", id);
            shared.publish(id, network, timings);
            shared.set_status(id, WorkerStatus::Sat);
        }
        CaseLoop::Unsat { case } => {
            debug!("Worker {}: unsatisfiable after case {}", id, case);
            shared.set_status(id, WorkerStatus::Unsat);
        }
        CaseLoop::Stopped => {
            debug!("Worker {} stopped", id);
            shared.set_status(id, WorkerStatus::Stopped);
        }
    }
    Ok(timings)
}

/// Polls the workers until one is SAT, one failed, or all are done.
///
/// `finished` tells whether every worker thread has exited, which also covers panics.
fn supervise(shared: &Shared, workers: usize, cases: usize, finished: impl Fn() -> bool) {
    let mut last_report = Instant::now();
    loop {
        let statuses: Vec<WorkerStatus> = (0..workers).map(|w| shared.status(w)).collect();
        if statuses.contains(&WorkerStatus::Sat) || statuses.contains(&WorkerStatus::Failed) {
            shared.stop.store(true, Ordering::SeqCst);
            return;
        }
        if statuses.iter().all(|s| s.is_done()) || finished() {
            return;
        }
        if last_report.elapsed() >= REPORT_INTERVAL {
            let progress: Vec<String> = (0..workers)
                .map(|w| match statuses[w] {
                    WorkerStatus::Running => format!(
                        "{}/{}",
                        shared.progress[w].load(Ordering::Relaxed),
                        cases
                    ),
                    _ => "done".to_string(),
                })
                .collect();
            info!("Progress: [{}]", progress.join(", "));
            last_report = Instant::now();
        }
        thread::sleep(POLL_INTERVAL);
    }
}

pub(crate) fn run<O, F, T, H>(
    config: &RunConfig,
    target: &T,
    hints: &H,
    new_oracle: &F,
) -> Result<SynthReport>
where
    O: Oracle,
    F: Fn() -> O + Sync,
    T: TargetFunction + Sync + ?Sized,
    H: HintGenerator + Sync + ?Sized,
{
    let workers = config.parallel().workers;
    let cases = config.topology().cases();
    let shared = Shared::new(workers);

    let results: Vec<Result<Timings>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|id| {
                let shared = &shared;
                scope.spawn(move || {
                    let res = worker(id, config, target, hints, new_oracle(), shared);
                    if res.is_err() {
                        shared.set_status(id, WorkerStatus::Failed);
                    }
                    res
                })
            })
            .collect();

        supervise(&shared, workers, cases, || {
            handles.iter().all(|h| h.is_finished())
        });

        handles
            .into_iter()
            .enumerate()
            .map(|(id, handle)| {
                handle.join().unwrap_or_else(|_| {
                    Err(SynthError::EncodingInvariant(format!(
                        "worker {} panicked",
                        id
                    )))
                })
            })
            .collect()
    });

    let winner = shared
        .winner
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner);
    let mut errors = Vec::new();
    let mut timings = Timings::default();
    for res in results {
        match res {
            Ok(t) => timings = timings.max(t),
            Err(e) => errors.push(e),
        }
    }

    if let Some((worker, network, worker_timings)) = winner {
        for e in &errors {
            warn!("Ignoring worker failure after a network was found: {}", e);
        }
        return Ok(SynthReport {
            outcome: Outcome::Sat {
                network,
                worker: Some(worker),
            },
            timings: worker_timings,
        });
    }
    if let Some(e) = errors.into_iter().next() {
        return Err(e);
    }
    Ok(SynthReport {
        outcome: Outcome::Unsat { failed_case: None },
        timings,
    })
}

#[cfg(test)]
mod test {
    use test_case::test_case;

    use super::*;
    use crate::{
        config::ParallelConfig,
        oracle::VarisatOracle,
        solve::{Strategy, partition::PartitionTarget},
        target::{NoHints, Parity},
        topology::Topology,
    };

    fn parallel_config(topology: Topology, workers: usize, depth: u32) -> RunConfig {
        RunConfig::new(topology)
            .with_strategy(Strategy::Parallel)
            .with_parallel(ParallelConfig {
                workers,
                depth,
                target: PartitionTarget::OutputSelection,
            })
    }

    #[test_case(1, 0)]
    #[test_case(2, 1)]
    #[test_case(3, 2)]
    #[test_case(4, 2)]
    fn xor3_test(workers: usize, depth: u32) {
        // Two 2-input LUTs, 4 output selection atoms: (A xor B) xor C
        let config = parallel_config(Topology::new(2, 2, 1, 3, 1), workers, depth);
        let report = run(&config, &Parity, &NoHints, &VarisatOracle::new).unwrap();
        let network = report.network().unwrap();
        assert_eq!(network.verify(&Parity), Ok(()));
        match report.outcome {
            Outcome::Sat {
                worker: Some(w), ..
            } => assert!(w < workers),
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    #[test]
    fn all_workers_unsat_test() {
        let config = parallel_config(Topology::new(1, 2, 1, 3, 1), 1, 1);
        let report = run(&config, &Parity, &NoHints, &VarisatOracle::new).unwrap();
        assert_eq!(report.outcome, Outcome::Unsat { failed_case: None });
    }

    #[test]
    fn truth_table_partition_test() {
        let config = RunConfig::new(Topology::new(2, 2, 1, 3, 1))
            .with_strategy(Strategy::Parallel)
            .with_parallel(ParallelConfig {
                workers: 4,
                depth: 2,
                target: PartitionTarget::TruthTable,
            });
        let report = run(&config, &Parity, &NoHints, &VarisatOracle::new).unwrap();
        assert!(report.is_sat());
    }

    #[test]
    fn status_roundtrip_test() {
        for s in [
            WorkerStatus::Running,
            WorkerStatus::Sat,
            WorkerStatus::Unsat,
            WorkerStatus::Stopped,
            WorkerStatus::Failed,
        ] {
            assert_eq!(WorkerStatus::from_i8(s as i8), s);
        }
    }
}
