//! Per-case formulas: what the network computes for one assignment of the global inputs.
//!
//! Two encodings are available, see [`Encoding`]. Both build the same three kinds of
//! multiplexers:
//! - a LUT input is `OR_s (value(s) AND W[lut][input][s])` over the sources available to the LUT;
//! - a LUT output is `OR_r (row r matches the inputs AND T[lut][output][r])`;
//! - a global output is `OR_s (lut_output(s) AND O[output][s])`.
//!
//! The formulas of one case only depend on that case, so cases can be encoded and asserted in
//! any order, all at once or one after the other.

use std::{fmt::Display, rc::Rc, str::FromStr};

use crate::{
    error::ConfigError,
    formula::Formula,
    signal::SignalIndex,
    target::TargetFunction,
};

/// How the internal signals of a case are represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    /// "F": internal signals are substituted inline as expressions. No new atom per case,
    /// but expressions grow with the depth of the network.
    #[default]
    FormulaComposition,
    /// "ZV": every LUT port of every case is a fresh atom asserted equal to its expression.
    /// More atoms, flatter formulas.
    ExplicitSignal,
}

impl Encoding {
    /// Whether the encoding needs the per-case signal atoms.
    pub fn explicit_signals(self) -> bool {
        self == Encoding::ExplicitSignal
    }
}

impl FromStr for Encoding {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "F" | "formula-composition" => Ok(Encoding::FormulaComposition),
            "ZV" | "explicit-signal" => Ok(Encoding::ExplicitSignal),
            _ => Err(ConfigError::InvalidSelector {
                kind: "execution mode",
                value: s.to_string(),
                expected: "'F' (formula-composition) or 'ZV' (explicit-signal)",
            }),
        }
    }
}

impl Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Encoding::FormulaComposition => write!(f, "F"),
            Encoding::ExplicitSignal => write!(f, "ZV"),
        }
    }
}

/// Builds the formulas of a case.
pub struct CaseEncoder<'a> {
    index: &'a SignalIndex,
    encoding: Encoding,
}

impl<'a> CaseEncoder<'a> {
    /// The index must reserve explicit signal atoms if the encoding needs them.
    pub fn new(index: &'a SignalIndex, encoding: Encoding) -> Self {
        debug_assert!(!encoding.explicit_signals() || index.has_explicit_signals());
        CaseEncoder { index, encoding }
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// All the assertions of a case.
    pub fn encode_case<T>(&self, case: usize, target: &T) -> Vec<Formula>
    where
        T: TargetFunction + ?Sized,
    {
        let inputs = self.index.topology().case_inputs(case);
        match self.encoding {
            Encoding::FormulaComposition => self.encode_composed(&inputs, target),
            Encoding::ExplicitSignal => self.encode_explicit(case, &inputs, target),
        }
    }

    fn encode_composed<T>(&self, inputs: &[bool], target: &T) -> Vec<Formula>
    where
        T: TargetFunction + ?Sized,
    {
        let t = self.index.topology();

        // Sources in slot order: global inputs, then LUT outputs as soon as they are built.
        let mut values: Vec<Rc<Formula>> = constants(inputs);
        for lut in 0..t.lut_count {
            let lut_ins: Vec<Rc<Formula>> = (0..t.lut_inputs)
                .map(|input| Rc::new(self.lut_input(lut, input, &values)))
                .collect();
            for output in 0..t.lut_outputs {
                values.push(Rc::new(self.lut_output(lut, output, &lut_ins)));
            }
        }

        let lut_outs = &values[t.global_inputs..];
        (0..t.global_outputs)
            .map(|g| {
                Formula::eq(
                    Formula::constant(target.evaluate(inputs, g)),
                    self.global_output(g, lut_outs),
                )
            })
            .collect()
    }

    fn encode_explicit<T>(&self, case: usize, inputs: &[bool], target: &T) -> Vec<Formula>
    where
        T: TargetFunction + ?Sized,
    {
        let t = self.index.topology();
        let k = t.lut_inputs;
        let signal = |lut, port| -> Rc<Formula> { self.index.signal(case, lut, port).into() };

        let mut values: Vec<Rc<Formula>> = constants(inputs);
        for lut in 0..t.lut_count {
            for output in 0..t.lut_outputs {
                values.push(signal(lut, k + output));
            }
        }

        let mut c = Vec::with_capacity(t.lut_count * (k + t.lut_outputs) + t.global_outputs);
        for lut in 0..t.lut_count {
            let lut_ins: Vec<Rc<Formula>> = (0..k).map(|input| signal(lut, input)).collect();
            let available = &values[..t.available_slots(lut)];
            for (input, lut_in) in lut_ins.iter().enumerate() {
                c.push(Formula::eq(
                    lut_in.clone(),
                    self.lut_input(lut, input, available),
                ));
            }
            for output in 0..t.lut_outputs {
                c.push(Formula::eq(
                    signal(lut, k + output),
                    self.lut_output(lut, output, &lut_ins),
                ));
            }
        }

        let lut_outs = &values[t.global_inputs..];
        for g in 0..t.global_outputs {
            c.push(Formula::eq(
                Formula::constant(target.evaluate(inputs, g)),
                self.global_output(g, lut_outs),
            ));
        }
        c
    }

    /// `OR_s (values[s] AND W[lut][input][s])`.
    ///
    /// `values` holds the sources available to `lut` in slot order.
    fn lut_input(&self, lut: usize, input: usize, values: &[Rc<Formula>]) -> Formula {
        let available = self.index.topology().available_slots(lut);
        Formula::or(values[..available].iter().enumerate().map(|(slot, value)| {
            Formula::and([value.clone(), self.index.wiring(lut, input, slot).into()])
        }))
    }

    /// `OR_r (AND_k (ins[k] or not ins[k], per bit k of r) AND T[lut][output][r])`.
    fn lut_output(&self, lut: usize, output: usize, ins: &[Rc<Formula>]) -> Formula {
        let t = self.index.topology();
        let k = t.lut_inputs;
        Formula::or((0..t.rows()).map(|row| {
            let mut c: Vec<Rc<Formula>> = ins
                .iter()
                .enumerate()
                .map(|(i, input)| {
                    if (row >> (k - 1 - i)) & 1 == 1 {
                        input.clone()
                    } else {
                        Rc::new(Formula::negate(input.clone()))
                    }
                })
                .collect();
            c.push(self.index.truth_table(lut, output, row).into());
            Formula::and(c)
        }))
    }

    /// `OR_s (lut_outs[s] AND O[output][s])`.
    fn global_output(&self, output: usize, lut_outs: &[Rc<Formula>]) -> Formula {
        Formula::or(lut_outs.iter().enumerate().map(|(slot, value)| {
            Formula::and([value.clone(), self.index.selection(output, slot).into()])
        }))
    }
}

fn constants(inputs: &[bool]) -> Vec<Rc<Formula>> {
    inputs.iter().map(|&b| Rc::new(Formula::constant(b))).collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{formula::Atom, topology::Topology};

    /// A single 2-input LUT computing `A and B`, wired A -> 0, B -> 1, driving output 0.
    fn and_network(index: &SignalIndex, rows: [bool; 4]) -> Vec<Atom> {
        let mut atoms = vec![
            index.wiring(0, 0, 0),
            index.wiring(0, 1, 1),
            index.selection(0, 0),
        ];
        for (row, value) in rows.iter().enumerate() {
            if *value {
                atoms.push(index.truth_table(0, 0, row));
            }
        }
        atoms
    }

    fn and(inputs: &[bool], _: usize) -> bool {
        inputs.iter().all(|&b| b)
    }

    #[test]
    fn selector_parsing_test() {
        assert_eq!("F".parse(), Ok(Encoding::FormulaComposition));
        assert_eq!("explicit-signal".parse(), Ok(Encoding::ExplicitSignal));
        assert!("G".parse::<Encoding>().is_err());
        assert_eq!(Encoding::ExplicitSignal.to_string(), "ZV");
    }

    #[test]
    fn composed_formulas_match_network_test() {
        let t = Topology::new(1, 2, 1, 2, 1);
        let index = SignalIndex::new(t, false);
        let encoder = CaseEncoder::new(&index, Encoding::FormulaComposition);

        let good = and_network(&index, [false, false, false, true]);
        let bad = and_network(&index, [false, false, true, true]);
        for case in 0..t.cases() {
            let formulas = encoder.encode_case(case, &and);
            assert_eq!(formulas.len(), 1);
            assert!(formulas[0].evaluate(&|a| good.contains(&a)));
            // Row 2 is (A, B) = (1, 0)
            assert_eq!(formulas[0].evaluate(&|a| bad.contains(&a)), case != 2);
        }
    }

    #[test]
    fn composed_uses_no_signal_atoms_test() {
        let t = Topology::new(2, 2, 1, 3, 1);
        let index = SignalIndex::new(t, false);
        let encoder = CaseEncoder::new(&index, Encoding::FormulaComposition);
        let formulas = encoder.encode_case(5, &and);
        // Would panic in the valuation if an atom outside the index was used.
        let count = index.atom_count();
        formulas.iter().for_each(|f| {
            f.evaluate(&|a: Atom| {
                assert!(a.index() < count);
                false
            });
        });
    }

    #[test]
    fn target_value_folds_into_output_test() {
        let t = Topology::new(1, 2, 1, 2, 1);
        let always = |_: &[bool], _: usize| true;
        for (explicit, encoding) in [
            (false, Encoding::FormulaComposition),
            (true, Encoding::ExplicitSignal),
        ] {
            let index = SignalIndex::new(t, explicit);
            let encoder = CaseEncoder::new(&index, encoding);
            let network = and_network(&index, [false, false, false, true]);
            let formulas = encoder.encode_case(0, &always);
            let output = formulas.last().unwrap();
            // The target value is a constant, no equality is left.
            assert!(!matches!(output, Formula::Eq(..)));
            if !explicit {
                assert!(!output.evaluate(&|a| network.contains(&a)));
            }
        }
    }

    #[test]
    fn explicit_formulas_match_network_test() {
        let t = Topology::new(1, 2, 1, 2, 1);
        let index = SignalIndex::new(t, true);
        let encoder = CaseEncoder::new(&index, Encoding::ExplicitSignal);
        let network = and_network(&index, [false, false, false, true]);

        for case in 0..t.cases() {
            let inputs = t.case_inputs(case);
            let formulas = encoder.encode_case(case, &and);
            // 2 inputs, 1 output, 1 global output
            assert_eq!(formulas.len(), 4);

            // Signals simulated from the network
            let mut atoms = network.clone();
            if inputs[0] {
                atoms.push(index.signal(case, 0, 0));
            }
            if inputs[1] {
                atoms.push(index.signal(case, 0, 1));
            }
            if and(&inputs, 0) {
                atoms.push(index.signal(case, 0, 2));
            }
            assert!(formulas.iter().all(|f| f.evaluate(&|a| atoms.contains(&a))));

            // A wrong output signal breaks the output equation.
            let mut wrong = atoms.clone();
            let out = index.signal(case, 0, 2);
            if let Some(pos) = wrong.iter().position(|&a| a == out) {
                wrong.remove(pos);
            } else {
                wrong.push(out);
            }
            assert!(!formulas.iter().all(|f| f.evaluate(&|a| wrong.contains(&a))));
        }
    }

    #[test]
    fn second_lut_reads_first_lut_test() {
        // LUT 1 copies LUT 0 output (slot 2) on its first input: out = A and B.
        let t = Topology::new(2, 2, 1, 2, 1);
        let index = SignalIndex::new(t, false);
        let encoder = CaseEncoder::new(&index, Encoding::FormulaComposition);

        let mut atoms = vec![
            index.wiring(0, 0, 0),
            index.wiring(0, 1, 1),
            index.truth_table(0, 0, 3),
            index.wiring(1, 0, 2),
            index.wiring(1, 1, 0),
            // Rows 2 and 3: first input set
            index.truth_table(1, 0, 2),
            index.truth_table(1, 0, 3),
            index.selection(0, 1),
        ];
        for case in 0..t.cases() {
            let formulas = encoder.encode_case(case, &and);
            assert!(formulas[0].evaluate(&|a| atoms.contains(&a)));
        }

        // Selecting LUT 0 directly also works, selecting nothing does not.
        atoms.retain(|&a| a != index.selection(0, 1));
        let formulas = encoder.encode_case(3, &and);
        assert!(!formulas[0].evaluate(&|a| atoms.contains(&a)));
        atoms.push(index.selection(0, 0));
        assert!(formulas[0].evaluate(&|a| atoms.contains(&a)));
    }
}
