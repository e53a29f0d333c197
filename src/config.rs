//! Run configuration.
//!
//! A [`RunConfig`] is built once per run and passed by reference to every component.
//! It cannot be modified afterwards, so derived quantities (such as
//! [`Topology::signal_slots`]) never go stale.

use std::fmt::Display;

use log::info;

use crate::{
    encoding::Encoding,
    error::ConfigError,
    signal::SignalIndex,
    solve::{
        Strategy,
        partition::{PartitionTarget, partition_atoms},
    },
    topology::Topology,
};

/// Settings of the parallel strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParallelConfig {
    /// Number of workers, each with its own oracle.
    pub workers: usize,
    /// Number of leading partition atoms pinned to split the search space.
    pub depth: u32,
    /// Which atoms are pinned.
    pub target: PartitionTarget,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        ParallelConfig {
            workers: 4,
            depth: 2,
            target: PartitionTarget::default(),
        }
    }
}

/// Immutable configuration of a synthesis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    topology: Topology,
    encoding: Encoding,
    strategy: Strategy,
    parallel: ParallelConfig,
}

impl RunConfig {
    /// Monolithic run with the formula-composition encoding.
    pub fn new(topology: Topology) -> Self {
        RunConfig {
            topology,
            encoding: Encoding::default(),
            strategy: Strategy::default(),
            parallel: ParallelConfig::default(),
        }
    }

    pub fn with_encoding(self, encoding: Encoding) -> Self {
        RunConfig { encoding, ..self }
    }

    pub fn with_strategy(self, strategy: Strategy) -> Self {
        RunConfig { strategy, ..self }
    }

    pub fn with_parallel(self, parallel: ParallelConfig) -> Self {
        RunConfig { parallel, ..self }
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn parallel(&self) -> &ParallelConfig {
        &self.parallel
    }

    /// Signal index matching this configuration.
    pub fn signal_index(&self) -> SignalIndex {
        SignalIndex::new(self.topology, self.encoding.explicit_signals())
    }

    /// Checks the configuration before any encoding work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.topology.validate()?;
        if self.strategy == Strategy::Parallel {
            let p = &self.parallel;
            if p.workers == 0 {
                return Err(ConfigError::NoWorkers);
            }
            if p.depth >= usize::BITS || (1usize << p.depth) < p.workers {
                return Err(ConfigError::DepthTooSmall {
                    depth: p.depth,
                    workers: p.workers,
                });
            }
            let available = partition_atoms(&self.signal_index(), p.target).len();
            if p.depth as usize > available {
                return Err(ConfigError::DepthTooLarge {
                    depth: p.depth,
                    available,
                });
            }
        }
        Ok(())
    }

    /// Logs every parameter of the run.
    pub fn log_parameters(&self) {
        info!("Current configuration of the synthesis");
        for line in self.to_string().lines() {
            info!("{}", line);
        }
    }
}

impl Display for RunConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let t = &self.topology;
        writeln!(f, "strategy: {}", self.strategy)?;
        writeln!(f, "encoding: {}", self.encoding)?;
        if self.strategy == Strategy::Parallel {
            writeln!(f, "workers: {}", self.parallel.workers)?;
            writeln!(f, "depth: {}", self.parallel.depth)?;
            writeln!(f, "partition target: {}", self.parallel.target)?;
        }
        writeln!(f, "lut_count: {}", t.lut_count)?;
        writeln!(f, "lut_inputs: {}", t.lut_inputs)?;
        writeln!(f, "lut_outputs: {}", t.lut_outputs)?;
        writeln!(f, "global_inputs: {}", t.global_inputs)?;
        writeln!(f, "global_outputs: {}", t.global_outputs)?;
        write!(f, "signal_slots: {}", t.signal_slots())
    }
}
