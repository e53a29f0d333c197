//! Reading a LUT network back from a satisfying model.

use std::fmt::Display;

use crate::{
    Result, SynthError,
    formula::Atom,
    oracle::Model,
    signal::SignalIndex,
    target::{TargetFunction, truth_table},
    topology::{Topology, bits_msb_first},
};

/// Where a LUT input reads its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// Global input `i`.
    GlobalInput(usize),
    /// LUT output slot `s`, ie output `s % lut_outputs` of LUT `s / lut_outputs`.
    LutOutput(usize),
}

/// Global inputs are letters (`A`, `B`, ...), LUT output slots are numbers.
impl Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::GlobalInput(i) if *i < 26 => write!(f, "{}", (b'A' + *i as u8) as char),
            Source::GlobalInput(i) => write!(f, "I{}", i),
            Source::LutOutput(slot) => write!(f, "{}", slot),
        }
    }
}

/// One synthesized LUT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LutConfig {
    /// Source of every input, in input order. Input 0 is the most significant bit of a row.
    pub inputs: Vec<Source>,
    /// `truth_table[output][row]`.
    pub truth_table: Vec<Vec<bool>>,
    /// `drives[output]` lists the global outputs produced by that output.
    pub drives: Vec<Vec<usize>>,
}

/// A synthesized network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LutNetwork {
    topology: Topology,
    luts: Vec<LutConfig>,
    /// LUT output slot producing each global output.
    producers: Vec<usize>,
}

impl LutNetwork {
    /// Reads the network out of a model of the structural constraints.
    ///
    /// Fails if the model breaks a one-hot constraint, which means the encoding is broken.
    pub fn decode(index: &SignalIndex, model: &Model) -> Result<Self> {
        let t = *index.topology();

        let mut producers = Vec::with_capacity(t.global_outputs);
        for output in 0..t.global_outputs {
            let slot = one_hot(model, &index.selection_atoms(output)).ok_or_else(|| {
                SynthError::EncodingInvariant(format!(
                    "global output {} is not produced by exactly one LUT output",
                    output
                ))
            })?;
            producers.push(slot);
        }

        let mut luts = Vec::with_capacity(t.lut_count);
        for lut in 0..t.lut_count {
            let mut inputs = Vec::with_capacity(t.lut_inputs);
            for input in 0..t.lut_inputs {
                let slot = one_hot(model, &index.wiring_atoms(lut, input))
                    .filter(|&slot| slot < t.available_slots(lut))
                    .ok_or_else(|| {
                        SynthError::EncodingInvariant(format!(
                            "input {} of LUT {} is not wired to exactly one available source",
                            input, lut
                        ))
                    })?;
                inputs.push(source(&t, slot));
            }

            let truth_table = (0..t.lut_outputs)
                .map(|output| {
                    (0..t.rows())
                        .map(|row| model.value(index.truth_table(lut, output, row)))
                        .collect()
                })
                .collect();

            let drives = (0..t.lut_outputs)
                .map(|output| {
                    let slot = lut * t.lut_outputs + output;
                    (0..t.global_outputs)
                        .filter(|&g| producers[g] == slot)
                        .collect()
                })
                .collect();

            luts.push(LutConfig {
                inputs,
                truth_table,
                drives,
            });
        }

        Ok(LutNetwork {
            topology: t,
            luts,
            producers,
        })
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn luts(&self) -> &[LutConfig] {
        &self.luts
    }

    /// LUT output slot producing each global output.
    pub fn producers(&self) -> &[usize] {
        &self.producers
    }

    /// Simulates the network on one assignment of the global inputs.
    pub fn evaluate(&self, inputs: &[bool]) -> Vec<bool> {
        let t = &self.topology;
        let mut values: Vec<bool> = inputs.to_vec();
        values.resize(t.global_inputs, false);
        for lut in &self.luts {
            let row = lut.inputs.iter().fold(0usize, |row, source| {
                let bit = match source {
                    Source::GlobalInput(i) => values[*i],
                    Source::LutOutput(slot) => values[t.global_inputs + slot],
                };
                (row << 1) | bit as usize
            });
            values.extend(lut.truth_table.iter().map(|table| table[row]));
        }
        self.producers
            .iter()
            .map(|slot| values[t.global_inputs + slot])
            .collect()
    }

    /// Checks the network against the target on every case.
    /// Returns the first case where an output differs.
    pub fn verify<T>(&self, target: &T) -> std::result::Result<(), usize>
    where
        T: TargetFunction + ?Sized,
    {
        let t = &self.topology;
        let expected = truth_table(target, t);
        match (0..t.cases()).find(|&case| self.evaluate(&t.case_inputs(case)) != expected[case]) {
            Some(case) => Err(case),
            None => Ok(()),
        }
    }
}

fn source(t: &Topology, slot: usize) -> Source {
    if slot < t.global_inputs {
        Source::GlobalInput(slot)
    } else {
        Source::LutOutput(slot - t.global_inputs)
    }
}

/// Position of the only true atom, if exactly one is true.
fn one_hot(model: &Model, atoms: &[Atom]) -> Option<usize> {
    let mut set = atoms
        .iter()
        .enumerate()
        .filter(|(_, a)| model.value(**a))
        .map(|(i, _)| i);
    match (set.next(), set.next()) {
        (Some(i), None) => Some(i),
        _ => None,
    }
}

/// Textual dump of the network, one block per LUT:
///
/// ```text
/// LUT 0: A, B
///   00 | 0
///   01 | 0
///   10 | 0
///   11 | 1
///   [f: 0]
/// ```
///
/// The last line tells which global outputs each LUT output drives (`---` for none).
impl Display for LutNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let t = &self.topology;
        for (i, lut) in self.luts.iter().enumerate() {
            let inputs: Vec<String> = lut.inputs.iter().map(Source::to_string).collect();
            writeln!(f, "LUT {}: {}", i, inputs.join(", "))?;
            for row in 0..t.rows() {
                write!(f, "  ")?;
                for b in bits_msb_first(row, t.lut_inputs) {
                    write!(f, "{}", b as u8)?;
                }
                write!(f, " |")?;
                for table in &lut.truth_table {
                    write!(f, " {}", table[row] as u8)?;
                }
                writeln!(f)?;
            }
            write!(f, " ")?;
            for drives in &lut.drives {
                if drives.is_empty() {
                    write!(f, " [---]")?;
                } else {
                    let outs: Vec<String> = drives.iter().map(usize::to_string).collect();
                    write!(f, " [f: {}]", outs.join(", "))?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
