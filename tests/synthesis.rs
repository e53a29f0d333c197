use lutsynth::{
    ConfigError, Encoding, Outcome, ParallelConfig, PartitionTarget, RunConfig, Strategy,
    SynthError, Topology, synthesize,
    target::{IdentityWiring, Mux, NoHints, Parity, PopCount},
};
use pretty_assertions::assert_eq;
use test_case::test_case;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn mux_topology() -> Topology {
    Topology::new(2, 4, 1, 6, 1)
}

#[test_case(Encoding::FormulaComposition, Strategy::Monolithic)]
#[test_case(Encoding::ExplicitSignal, Strategy::Monolithic)]
#[test_case(Encoding::FormulaComposition, Strategy::Incremental)]
#[test_case(Encoding::ExplicitSignal, Strategy::Incremental)]
fn mux4_is_sat(encoding: Encoding, strategy: Strategy) {
    init_logger();
    let mux = Mux::new(2);
    let config = RunConfig::new(mux_topology())
        .with_encoding(encoding)
        .with_strategy(strategy);
    let report = synthesize(&config, &mux, &IdentityWiring).unwrap();

    let network = report.network().expect("a 4:1 mux fits in two 4-LUTs");
    assert_eq!(network.verify(&mux), Ok(()));
    // The hint is honoured
    let first = &network.luts()[0];
    for (i, source) in first.inputs.iter().enumerate() {
        assert_eq!(*source, lutsynth::Source::GlobalInput(i));
    }
}

#[test]
fn mux4_parallel_is_sat() {
    init_logger();
    let mux = Mux::new(2);
    let config = RunConfig::new(mux_topology())
        .with_strategy(Strategy::Parallel)
        .with_parallel(ParallelConfig {
            workers: 2,
            depth: 1,
            target: PartitionTarget::OutputSelection,
        });
    let report = synthesize(&config, &mux, &NoHints).unwrap();
    match &report.outcome {
        Outcome::Sat {
            network,
            worker: Some(w),
        } => {
            assert!(*w < 2);
            assert_eq!(network.verify(&mux), Ok(()));
        }
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[test_case(Strategy::Monolithic)]
#[test_case(Strategy::Incremental)]
#[test_case(Strategy::Parallel)]
fn encodings_agree(strategy: Strategy) {
    init_logger();
    let xor_and = |inputs: &[bool], output: usize| match output {
        0 => inputs[0] ^ inputs[1] ^ inputs[2],
        _ => inputs[0] && inputs[1],
    };
    let topologies = [
        Topology::new(2, 2, 1, 3, 2),
        Topology::new(1, 3, 2, 3, 2),
        Topology::new(3, 2, 1, 3, 2),
    ];
    for topology in topologies {
        let answers: Vec<bool> = [Encoding::FormulaComposition, Encoding::ExplicitSignal]
            .into_iter()
            .map(|encoding| {
                let config = RunConfig::new(topology)
                    .with_encoding(encoding)
                    .with_strategy(strategy)
                    .with_parallel(ParallelConfig {
                        workers: 2,
                        depth: 1,
                        target: PartitionTarget::OutputSelection,
                    });
                synthesize(&config, &xor_and, &NoHints).unwrap().is_sat()
            })
            .collect();
        assert_eq!(answers[0], answers[1], "{}", topology);
    }
}

#[test]
fn strategies_agree_on_unsat() {
    init_logger();
    // 8-input parity does not fit in a single 2-input LUT.
    let topology = Topology::new(1, 2, 1, 8, 1);
    for strategy in [Strategy::Monolithic, Strategy::Incremental] {
        let config = RunConfig::new(topology).with_strategy(strategy);
        let report = synthesize(&config, &Parity, &NoHints).unwrap();
        assert!(!report.is_sat());
    }
}

#[test]
fn incremental_stops_early() {
    init_logger();
    let topology = Topology::new(1, 2, 1, 8, 1);
    let config = RunConfig::new(topology).with_strategy(Strategy::Incremental);
    let report = synthesize(&config, &Parity, &NoHints).unwrap();
    match report.outcome {
        Outcome::Unsat {
            failed_case: Some(case),
        } => assert!(case < topology.cases()),
        other => panic!("unexpected outcome {:?}", other),
    }
}

#[test]
fn adder_is_sat() {
    init_logger();
    // 3 inputs, 2 output bits: a full adder out of two 3-LUTs
    let config = RunConfig::new(Topology::new(2, 3, 1, 3, 2)).with_strategy(Strategy::Incremental);
    let report = synthesize(&config, &PopCount, &IdentityWiring).unwrap();
    let network = report.network().unwrap();
    assert_eq!(network.verify(&PopCount), Ok(()));
    assert_eq!(network.evaluate(&[true, true, false]), vec![false, true]);
}

#[test]
fn repeated_runs_agree() {
    init_logger();
    let mux = Mux::new(1);
    let config = RunConfig::new(Topology::new(2, 2, 1, 3, 1));
    let first = synthesize(&config, &mux, &NoHints).unwrap().is_sat();
    let second = synthesize(&config, &mux, &NoHints).unwrap().is_sat();
    assert_eq!(first, second);
}

#[test]
fn lut_larger_than_inputs_is_rejected() {
    init_logger();
    let config = RunConfig::new(Topology::new(2, 4, 1, 3, 1));
    let err = synthesize(&config, &Parity, &NoHints).unwrap_err();
    assert!(matches!(
        err,
        SynthError::Config(ConfigError::LutLargerThanInputs {
            global_inputs: 3,
            lut_inputs: 4
        })
    ));
}

#[test]
fn invalid_parallel_settings_are_rejected() {
    init_logger();
    let config = RunConfig::new(mux_topology())
        .with_strategy(Strategy::Parallel)
        .with_parallel(ParallelConfig {
            workers: 3,
            depth: 1,
            target: PartitionTarget::OutputSelection,
        });
    assert!(matches!(
        synthesize(&config, &Mux::new(2), &NoHints),
        Err(SynthError::Config(ConfigError::DepthTooSmall { .. }))
    ));
}

#[test]
fn closure_hints_are_asserted() {
    init_logger();
    // Forcing the output on LUT 0 makes a 2:1 mux impossible with 2-input LUTs.
    let mux = Mux::new(1);
    let config = RunConfig::new(Topology::new(2, 2, 1, 3, 1));
    let force_first = |index: &lutsynth::SignalIndex| {
        vec![lutsynth::Formula::atom(index.selection(0, 0))]
    };
    let report = synthesize(&config, &mux, &force_first).unwrap();
    assert_eq!(report.outcome, Outcome::Unsat { failed_case: None });
}
