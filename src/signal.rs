//! Dense indexing of every atom used by the encoding.
//!
//! Atoms are laid out family after family, so no two families ever alias:
//!
//! | family | coordinates | count |
//! |---|---|---|
//! | wiring selectors `W` | `[lut][input][slot]` | `lut_count * lut_inputs * signal_slots` |
//! | truth tables `T` | `[lut][output][row]` | `lut_count * lut_outputs * 2^lut_inputs` |
//! | output selection `O` | `[global_output][lut_output_slot]` | `global_outputs * lut_count * lut_outputs` |
//! | explicit signals `S` | `[case][lut][port]` | `2^global_inputs * lut_count * (lut_inputs + lut_outputs)` |
//!
//! The explicit signal family only exists with the explicit-signal encoding.

use crate::{Result, SynthError, formula::Atom, oracle::Oracle, topology::Topology};

/// Which family an atom belongs to, together with its structural coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtomKind {
    Wiring { lut: usize, input: usize, slot: usize },
    TruthTable { lut: usize, output: usize, row: usize },
    Selection { output: usize, slot: usize },
    Signal { case: usize, lut: usize, port: usize },
}

/// Maps structural coordinates to atoms and back.
#[derive(Debug, Clone)]
pub struct SignalIndex {
    topology: Topology,
    explicit_signals: bool,
    truth_base: usize,
    selection_base: usize,
    signal_base: usize,
    atom_count: usize,
}

impl SignalIndex {
    /// Index for the given topology.
    /// Explicit per-case signal atoms are only reserved if `explicit_signals` is set.
    pub fn new(topology: Topology, explicit_signals: bool) -> Self {
        let t = &topology;
        let truth_base = t.lut_count * t.lut_inputs * t.signal_slots();
        let selection_base = truth_base + t.lut_count * t.lut_outputs * t.rows();
        let signal_base = selection_base + t.global_outputs * t.lut_output_slots();
        let atom_count = if explicit_signals {
            signal_base + t.cases() * t.lut_count * Self::ports(t)
        } else {
            signal_base
        };
        SignalIndex {
            topology,
            explicit_signals,
            truth_base,
            selection_base,
            signal_base,
            atom_count,
        }
    }

    fn ports(t: &Topology) -> usize {
        t.lut_inputs + t.lut_outputs
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn has_explicit_signals(&self) -> bool {
        self.explicit_signals
    }

    /// Total number of atoms.
    pub fn atom_count(&self) -> usize {
        self.atom_count
    }

    /// Selector telling that input `input` of LUT `lut` is wired to source `slot`.
    pub fn wiring(&self, lut: usize, input: usize, slot: usize) -> Atom {
        let t = &self.topology;
        debug_assert!(lut < t.lut_count && input < t.lut_inputs && slot < t.signal_slots());
        Atom((lut * t.lut_inputs + input) * t.signal_slots() + slot)
    }

    /// Value of row `row` of the truth table of output `output` of LUT `lut`.
    pub fn truth_table(&self, lut: usize, output: usize, row: usize) -> Atom {
        let t = &self.topology;
        debug_assert!(lut < t.lut_count && output < t.lut_outputs && row < t.rows());
        Atom(self.truth_base + (lut * t.lut_outputs + output) * t.rows() + row)
    }

    /// Selector telling that global output `output` is produced by LUT output slot `slot`.
    pub fn selection(&self, output: usize, slot: usize) -> Atom {
        let t = &self.topology;
        debug_assert!(output < t.global_outputs && slot < t.lut_output_slots());
        Atom(self.selection_base + output * t.lut_output_slots() + slot)
    }

    /// Value of port `port` of LUT `lut` for case `case`.
    /// Ports `0..lut_inputs` are the LUT inputs, the following ones are its outputs.
    pub fn signal(&self, case: usize, lut: usize, port: usize) -> Atom {
        let t = &self.topology;
        debug_assert!(self.explicit_signals);
        debug_assert!(case < t.cases() && lut < t.lut_count && port < Self::ports(t));
        Atom(self.signal_base + (case * t.lut_count + lut) * Self::ports(t) + port)
    }

    /// All wiring selectors of one LUT input, in slot order.
    pub fn wiring_atoms(&self, lut: usize, input: usize) -> Vec<Atom> {
        (0..self.topology.signal_slots())
            .map(|slot| self.wiring(lut, input, slot))
            .collect()
    }

    /// All selection atoms of one global output, in slot order.
    pub fn selection_atoms(&self, output: usize) -> Vec<Atom> {
        (0..self.topology.lut_output_slots())
            .map(|slot| self.selection(output, slot))
            .collect()
    }

    /// Selection atoms of every global output, in index order.
    pub fn all_selection_atoms(&self) -> Vec<Atom> {
        (self.selection_base..self.signal_base).map(Atom).collect()
    }

    /// Truth table atoms of every LUT, in index order.
    pub fn all_truth_table_atoms(&self) -> Vec<Atom> {
        (self.truth_base..self.selection_base).map(Atom).collect()
    }

    /// Recovers the family and coordinates of an atom.
    pub fn kind(&self, atom: Atom) -> Option<AtomKind> {
        let t = &self.topology;
        let i = atom.index();
        if i < self.truth_base {
            let slot = i % t.signal_slots();
            let rest = i / t.signal_slots();
            Some(AtomKind::Wiring {
                lut: rest / t.lut_inputs,
                input: rest % t.lut_inputs,
                slot,
            })
        } else if i < self.selection_base {
            let i = i - self.truth_base;
            let row = i % t.rows();
            let rest = i / t.rows();
            Some(AtomKind::TruthTable {
                lut: rest / t.lut_outputs,
                output: rest % t.lut_outputs,
                row,
            })
        } else if i < self.signal_base {
            let i = i - self.selection_base;
            Some(AtomKind::Selection {
                output: i / t.lut_output_slots(),
                slot: i % t.lut_output_slots(),
            })
        } else if i < self.atom_count {
            let i = i - self.signal_base;
            let port = i % Self::ports(t);
            let rest = i / Self::ports(t);
            Some(AtomKind::Signal {
                case: rest / t.lut_count,
                lut: rest % t.lut_count,
                port,
            })
        } else {
            None
        }
    }

    /// Human readable name of an atom.
    pub fn name(&self, atom: Atom) -> String {
        match self.kind(atom) {
            Some(AtomKind::Wiring { lut, input, slot }) => format!("w{}_{}_{}", lut, input, slot),
            Some(AtomKind::TruthTable { lut, output, row }) => {
                format!("t{}_{}_{}", lut, output, row)
            }
            Some(AtomKind::Selection { output, slot }) => format!("o{}_{}", output, slot),
            Some(AtomKind::Signal { case, lut, port }) => format!("s{}_{}_{}", case, lut, port),
            None => format!("unknown{}", atom.index()),
        }
    }

    /// Declares every atom with the oracle, in index order.
    pub fn declare_all(&self, oracle: &mut impl Oracle) -> Result<()> {
        for i in 0..self.atom_count {
            let atom = oracle.declare_atom(&self.name(Atom(i)));
            if atom != Atom(i) {
                return Err(SynthError::EncodingInvariant(format!(
                    "oracle declared {} as {} (expected dense index {})",
                    self.name(Atom(i)),
                    atom,
                    i
                )));
            }
        }
        Ok(())
    }
}
