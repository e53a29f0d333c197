//! SAT-based synthesis of small LUT networks.
//!
//! Given a [`Topology`] (number of LUTs, their size, the number of global inputs and outputs)
//! and a target boolean function, the synthesizer searches for a wiring of the LUTs, their
//! truth tables, and an assignment of the global outputs such that the network computes the
//! target on every input combination.
//!
//! ```rust
//! use lutsynth::{RunConfig, Strategy, Topology, synthesize};
//! use lutsynth::target::{IdentityWiring, Mux};
//!
//! // A 4:1 multiplexer out of two 4-input LUTs
//! let mux = Mux::new(2);
//! let topology = Topology::new(2, 4, 1, mux.global_inputs(), 1);
//! let config = RunConfig::new(topology).with_strategy(Strategy::Incremental);
//! let report = synthesize(&config, &mux, &IdentityWiring).unwrap();
//! println!("{}", report.network().unwrap());
//! ```

pub mod cnf;
pub mod config;
pub mod constraints;
pub mod decode;
pub mod dot;
pub mod encoding;
pub mod error;
pub mod formula;
pub mod oracle;
pub mod signal;
pub mod solve;
pub mod target;
pub mod topology;

// Re-exporting symbols and modules.
pub use config::{ParallelConfig, RunConfig};
pub use decode::{LutConfig, LutNetwork, Source};
pub use encoding::{CaseEncoder, Encoding};
pub use error::{ConfigError, OracleError, Result, SynthError};
pub use formula::{Atom, Formula};
pub use oracle::{Model, Oracle, SatResult, VarisatOracle};
pub use signal::SignalIndex;
pub use solve::{
    Outcome, Strategy, SynthReport, Timings, partition::PartitionTarget, synthesize,
    synthesize_with,
};
pub use target::{HintGenerator, TargetFunction};
pub use topology::Topology;
