use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, ValueEnum};
use log::{error, info};

use lutsynth::{
    Encoding, HintGenerator, ParallelConfig, PartitionTarget, RunConfig, Strategy,
    TargetFunction, Topology,
    dot::GraphvizStyle,
    synthesize,
    target::{Conway, IdentityWiring, LeadingOnes, Mux, NoHints, Parity, PopCount},
};

/// Built-in target functions, each with a topology known to be a reasonable first try.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Benchmark {
    /// 4:1 multiplexer (2 select bits, 4 data bits).
    Mux,
    /// Multiplexer with 3 select bits and 5 data bits.
    Mux8,
    /// Binary count of the set inputs.
    Adder,
    /// Game of Life rule on compressed column counts.
    Conway,
    /// Binary count of the leading ones.
    Leading,
    /// Parity of the inputs.
    Parity,
}

impl Benchmark {
    fn target(self) -> Box<dyn TargetFunction + Sync> {
        match self {
            Benchmark::Mux => Box::new(Mux::new(2)),
            Benchmark::Mux8 => Box::new(Mux::new(3)),
            Benchmark::Adder => Box::new(PopCount),
            Benchmark::Conway => Box::new(Conway),
            Benchmark::Leading => Box::new(LeadingOnes),
            Benchmark::Parity => Box::new(Parity),
        }
    }

    fn topology(self) -> Topology {
        match self {
            Benchmark::Mux => Topology::new(2, 4, 1, 6, 1),
            Benchmark::Mux8 => Topology::new(2, 5, 2, 8, 1),
            Benchmark::Adder => Topology::new(3, 5, 2, 5, 3),
            Benchmark::Conway => Topology::new(2, 5, 2, Conway::GLOBAL_INPUTS, 1),
            Benchmark::Leading => Topology::new(2, 5, 2, 6, 3),
            Benchmark::Parity => Topology::new(2, 2, 1, 3, 1),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "lutsynth")]
#[command(about = "Searches a LUT network realizing a boolean function with a SAT solver")]
struct Args {
    /// Target function.
    #[arg(long, value_enum, default_value_t = Benchmark::Mux)]
    benchmark: Benchmark,

    /// Number of LUTs (defaults to the benchmark topology).
    #[arg(long)]
    luts: Option<usize>,

    /// Inputs per LUT.
    #[arg(long)]
    lut_inputs: Option<usize>,

    /// Outputs per LUT.
    #[arg(long)]
    lut_outputs: Option<usize>,

    /// Number of global inputs.
    #[arg(long)]
    inputs: Option<usize>,

    /// Number of global outputs.
    #[arg(long)]
    outputs: Option<usize>,

    /// Solve strategy: basic, inc or parallel.
    #[arg(long, default_value_t = Strategy::Monolithic)]
    strategy: Strategy,

    /// Encoding: F (formula composition) or ZV (explicit signals).
    #[arg(long, default_value_t = Encoding::FormulaComposition)]
    mode: Encoding,

    /// Number of workers of the parallel strategy.
    #[arg(long, default_value_t = 4)]
    workers: usize,

    /// Number of pinned partition atoms of the parallel strategy.
    #[arg(long, default_value_t = 2)]
    depth: u32,

    /// Atoms pinned by the parallel strategy: selection or truth.
    #[arg(long, default_value_t = PartitionTarget::OutputSelection)]
    partition: PartitionTarget,

    /// Do not wire the first LUT to the first global inputs as a starting guess.
    #[arg(long, default_value_t = false)]
    no_hints: bool,

    /// Writes the network found to this file in the Graphviz dot format.
    #[arg(long)]
    dot: Option<PathBuf>,

    /// Do not print the network found.
    #[arg(long, default_value_t = false)]
    no_print: bool,
}

impl Args {
    fn config(&self) -> RunConfig {
        let default = self.benchmark.topology();
        let topology = Topology::new(
            self.luts.unwrap_or(default.lut_count),
            self.lut_inputs.unwrap_or(default.lut_inputs),
            self.lut_outputs.unwrap_or(default.lut_outputs),
            self.inputs.unwrap_or(default.global_inputs),
            self.outputs.unwrap_or(default.global_outputs),
        );
        RunConfig::new(topology)
            .with_encoding(self.mode)
            .with_strategy(self.strategy)
            .with_parallel(ParallelConfig {
                workers: self.workers,
                depth: self.depth,
                target: self.partition,
            })
    }
}

fn main() -> ExitCode {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
    let args = Args::parse();

    let config = args.config();
    let target = args.benchmark.target();
    let hints: Box<dyn HintGenerator + Sync> = if args.no_hints {
        Box::new(NoHints)
    } else {
        Box::new(IdentityWiring)
    };

    let report = match synthesize(&config, &*target, &*hints) {
        Ok(report) => report,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("{}", report.outcome);
    println!("{}", report.timings);
    if let Some(network) = report.network() {
        if !args.no_print {
            println!("{}", config.topology());
            print!("{}", network);
        }
        if let Some(path) = &args.dot {
            if let Err(e) = std::fs::write(path, network.to_dot(GraphvizStyle::default())) {
                error!("Cannot write {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
            info!("Network written to {}", path.display());
        }
    }
    ExitCode::SUCCESS
}
