//! Capabilities supplied by the caller: the target function and the starting guesses.
//!
//! Both are traits with blanket implementations for closures, so a quick experiment can
//! simply pass `|inputs: &[bool], output: usize| ...`.
//!
//! A few target functions used to benchmark the synthesis are provided:
//! [`Mux`], [`PopCount`], [`LeadingOnes`], [`Parity`] and [`Conway`].

use crate::{
    formula::Formula,
    signal::SignalIndex,
    topology::Topology,
};

/// The boolean function the synthesized network must realize.
///
/// `evaluate` must be total over all `2^global_inputs` input combinations and every output
/// index, and pure: it may be called many times, in any order, from several threads.
pub trait TargetFunction {
    /// Expected value of global output `output` when the global inputs are `inputs`.
    fn evaluate(&self, inputs: &[bool], output: usize) -> bool;
}

impl<F> TargetFunction for F
where
    F: Fn(&[bool], usize) -> bool,
{
    fn evaluate(&self, inputs: &[bool], output: usize) -> bool {
        self(inputs, output)
    }
}

/// Generates additional assertions ("starting guesses") injected before the search.
pub trait HintGenerator {
    fn hints(&self, index: &SignalIndex) -> Vec<Formula>;
}

impl<F> HintGenerator for F
where
    F: Fn(&SignalIndex) -> Vec<Formula>,
{
    fn hints(&self, index: &SignalIndex) -> Vec<Formula> {
        self(index)
    }
}

/// No starting guess.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHints;

impl HintGenerator for NoHints {
    fn hints(&self, _index: &SignalIndex) -> Vec<Formula> {
        Vec::new()
    }
}

/// Wires input `i` of the first LUT to global input `i`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityWiring;

impl HintGenerator for IdentityWiring {
    fn hints(&self, index: &SignalIndex) -> Vec<Formula> {
        (0..index.topology().lut_inputs)
            .map(|i| Formula::atom(index.wiring(0, i, i)))
            .collect()
    }
}

/// Multiplexer: the first `select` inputs (least significant first) pick one of the
/// following data inputs. Selecting a data input that does not exist reads false.
#[derive(Debug, Clone, Copy)]
pub struct Mux {
    pub select: usize,
}

impl Mux {
    /// Multiplexer with `select` select bits and `2^select` data inputs.
    pub fn new(select: usize) -> Self {
        Mux { select }
    }

    /// Topology with enough global inputs for a full multiplexer.
    pub fn global_inputs(&self) -> usize {
        self.select + (1 << self.select)
    }
}

impl TargetFunction for Mux {
    fn evaluate(&self, inputs: &[bool], _output: usize) -> bool {
        let s = inputs
            .iter()
            .take(self.select)
            .enumerate()
            .map(|(i, &b)| (b as usize) << i)
            .sum::<usize>();
        inputs.get(self.select + s).copied().unwrap_or(false)
    }
}

/// Bit `output` of the number of inputs set, ie an adder of all the input bits.
#[derive(Debug, Clone, Copy, Default)]
pub struct PopCount;

impl TargetFunction for PopCount {
    fn evaluate(&self, inputs: &[bool], output: usize) -> bool {
        let count = inputs.iter().filter(|&&b| b).count();
        bit(count, output)
    }
}

/// Bit `output` of the number of leading ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct LeadingOnes;

impl TargetFunction for LeadingOnes {
    fn evaluate(&self, inputs: &[bool], output: usize) -> bool {
        let count = inputs.iter().take_while(|&&b| b).count();
        bit(count, output)
    }
}

/// Parity of all the inputs, on every output.
#[derive(Debug, Clone, Copy, Default)]
pub struct Parity;

impl TargetFunction for Parity {
    fn evaluate(&self, inputs: &[bool], _output: usize) -> bool {
        inputs.iter().filter(|&&b| b).count() % 2 == 1
    }
}

/// Game of Life rule on a compressed neighbourhood.
///
/// Inputs are `[centre, c0_lsb, c0_msb, c1_lsb, c1_msb, c2_lsb, c2_msb]`, where `c0`, `c1` and `c2`
/// are the number of live cells in each of the three columns around the centre (centre
/// included in the middle column).
#[derive(Debug, Clone, Copy, Default)]
pub struct Conway;

impl Conway {
    pub const GLOBAL_INPUTS: usize = 7;
}

impl TargetFunction for Conway {
    fn evaluate(&self, inputs: &[bool], _output: usize) -> bool {
        let centre = inputs.first().copied().unwrap_or(false);
        let count: usize = inputs
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, b)| **b)
            .map(|(i, _)| if i % 2 == 1 { 1 } else { 2 })
            .sum();
        if centre {
            (3..=4).contains(&count)
        } else {
            count == 3
        }
    }
}

fn bit(value: usize, index: usize) -> bool {
    index < usize::BITS as usize && (value >> index) & 1 == 1
}

/// Truth table of a target function: `table[case][output]`.
pub fn truth_table(target: &(impl TargetFunction + ?Sized), topology: &Topology) -> Vec<Vec<bool>> {
    (0..topology.cases())
        .map(|case| {
            let inputs = topology.case_inputs(case);
            (0..topology.global_outputs)
                .map(|g| target.evaluate(&inputs, g))
                .collect()
        })
        .collect()
}
