//! Splitting of the search space between the workers of the parallel strategy.
//!
//! The first `depth` partition atoms form a binary prefix. With `n` workers and
//! `short = 2^depth - n`, the first `short` workers pin only `depth - 1` bits (each of them
//! covers two full prefixes) and the others pin all `depth` bits. Every one of the `2^depth`
//! prefixes is covered by exactly one worker, so the union of the sub-problems is the whole
//! problem and no two workers explore the same assignment.

use std::{fmt::Display, str::FromStr};

use crate::{
    error::ConfigError,
    formula::{Atom, Formula},
    signal::SignalIndex,
    topology::bits_msb_first,
};

/// Which atoms are pinned to split the search space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PartitionTarget {
    /// Output selection atoms: workers disagree on which LUT output drives which global output.
    #[default]
    OutputSelection,
    /// Truth table atoms: workers disagree on the first rows of the first LUT.
    TruthTable,
}

impl FromStr for PartitionTarget {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "selection" | "output-selection" => Ok(PartitionTarget::OutputSelection),
            "truth" | "truth-table" => Ok(PartitionTarget::TruthTable),
            _ => Err(ConfigError::InvalidSelector {
                kind: "partition target",
                value: s.to_string(),
                expected: "'selection' or 'truth'",
            }),
        }
    }
}

impl Display for PartitionTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartitionTarget::OutputSelection => write!(f, "selection"),
            PartitionTarget::TruthTable => write!(f, "truth"),
        }
    }
}

/// Candidate atoms for pinning, in index order.
pub fn partition_atoms(index: &SignalIndex, target: PartitionTarget) -> Vec<Atom> {
    match target {
        PartitionTarget::OutputSelection => index.all_selection_atoms(),
        PartitionTarget::TruthTable => index.all_truth_table_atoms(),
    }
}

/// Smallest `d <= depth` such that `2^d >= workers`.
///
/// Pinning more bits than this would leave whole prefixes to nobody.
pub fn effective_depth(workers: usize, depth: u32) -> u32 {
    let needed = workers.max(1).next_power_of_two().trailing_zeros();
    needed.min(depth)
}

/// The prefix assigned to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerPartition {
    pub worker: usize,
    /// Number of pinned atoms.
    pub bits: u32,
    /// Values of the pinned atoms, most significant (first atom) first.
    pub pattern: usize,
}

impl WorkerPartition {
    /// Partition of worker `worker` among `workers`, pinning at most `depth` atoms.
    ///
    /// `workers` must be in `1..=2^depth`.
    pub fn new(worker: usize, workers: usize, depth: u32) -> Self {
        debug_assert!(worker < workers);
        let depth = effective_depth(workers, depth);
        let full = 1usize << depth;
        let short = full.saturating_sub(workers);
        if worker < short {
            // `short > 0` implies `depth >= 1`
            WorkerPartition {
                worker,
                bits: depth - 1,
                pattern: workers - full / 2 + worker,
            }
        } else {
            WorkerPartition {
                worker,
                bits: depth,
                pattern: worker - short,
            }
        }
    }

    /// Values of the pinned atoms, in atom order.
    pub fn pinned(&self) -> Vec<bool> {
        bits_msb_first(self.pattern, self.bits as usize)
    }

    /// Assertions fixing the first `bits` partition atoms.
    pub fn assertions(&self, atoms: &[Atom]) -> Vec<Formula> {
        atoms
            .iter()
            .zip(self.pinned())
            .map(|(&atom, value)| {
                if value {
                    Formula::atom(atom)
                } else {
                    !Formula::atom(atom)
                }
            })
            .collect()
    }

    /// Whether the full `depth`-bit prefix `prefix` belongs to this worker.
    pub fn covers(&self, prefix: usize, depth: u32) -> bool {
        debug_assert!(self.bits <= depth);
        prefix >> (depth - self.bits) == self.pattern
    }
}

impl Display for WorkerPartition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "worker {}: ", self.worker)?;
        if self.bits == 0 {
            return write!(f, "unconstrained");
        }
        for b in self.pinned() {
            write!(f, "{}", if b { '1' } else { '0' })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use test_case::test_case;

    use super::*;
    use crate::topology::Topology;

    #[test]
    fn exact_cover_test() {
        for depth in 0..8u32 {
            for workers in 1..=1usize << depth {
                let partitions: Vec<WorkerPartition> = (0..workers)
                    .map(|w| WorkerPartition::new(w, workers, depth))
                    .collect();
                let d = effective_depth(workers, depth);
                for prefix in 0..1usize << d {
                    let owners = partitions.iter().filter(|p| p.covers(prefix, d)).count();
                    assert_eq!(
                        owners, 1,
                        "prefix {:b} of {} workers at depth {}",
                        prefix, workers, depth
                    );
                }
            }
        }
    }

    #[test_case(3, 2, 2)]
    #[test_case(4, 5, 2)]
    #[test_case(1, 3, 0)]
    #[test_case(5, 3, 3)]
    fn effective_depth_test(workers: usize, depth: u32, expected: u32) {
        assert_eq!(effective_depth(workers, depth), expected);
    }

    #[test]
    fn three_workers_test() {
        let p: Vec<String> = (0..3)
            .map(|w| WorkerPartition::new(w, 3, 2).to_string())
            .collect();
        assert_eq!(p, vec!["worker 0: 1", "worker 1: 00", "worker 2: 01"]);
    }

    #[test]
    fn single_worker_is_unconstrained_test() {
        let p = WorkerPartition::new(0, 1, 2);
        assert_eq!(p.bits, 0);
        assert!(p.assertions(&[Atom(0), Atom(1)]).is_empty());
    }

    #[test]
    fn assertions_test() {
        let p = WorkerPartition::new(2, 4, 2);
        assert_eq!(
            p.assertions(&[Atom(7), Atom(8), Atom(9)]),
            vec![Formula::atom(Atom(7)), !Formula::atom(Atom(8))]
        );
    }

    #[test]
    fn partition_atoms_test() {
        let t = Topology::new(2, 2, 1, 3, 1);
        let index = SignalIndex::new(t, false);
        assert_eq!(
            partition_atoms(&index, PartitionTarget::OutputSelection),
            vec![index.selection(0, 0), index.selection(0, 1)]
        );
        assert_eq!(
            partition_atoms(&index, PartitionTarget::TruthTable)[0],
            index.truth_table(0, 0, 0)
        );
        assert_eq!("truth".parse(), Ok(PartitionTarget::TruthTable));
        assert!("rows".parse::<PartitionTarget>().is_err());
    }
}
