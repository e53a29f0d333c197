//! Structural constraints of the LUT network, independent of the target function.
//!
//! - every global output is produced by exactly one LUT output slot;
//! - every LUT input is wired to exactly one source;
//! - within one LUT, a source feeds at most one input;
//! - a LUT never reads its own outputs or the outputs of later LUTs.
//!
//! "Exactly one" is expressed as one at-least-one clause plus pairwise at-most-one clauses
//! over every unordered pair.

use log::warn;

use crate::{
    formula::{Atom, Formula},
    signal::SignalIndex,
};

/// At least one of the atoms is true, and no two of them are true at the same time.
pub fn exactly_one(atoms: &[Atom]) -> Vec<Formula> {
    let mut c = Vec::with_capacity(1 + atoms.len() * atoms.len().saturating_sub(1) / 2);
    c.push(Formula::or(atoms.iter().copied().map(Formula::atom)));
    c.extend(at_most_one(atoms));
    c
}

/// Pairwise at-most-one over every unordered pair of atoms.
pub fn at_most_one(atoms: &[Atom]) -> Vec<Formula> {
    let mut c = Vec::new();
    for (i, &a) in atoms.iter().enumerate() {
        for &b in &atoms[i + 1..] {
            c.push(Formula::at_most_one_of(a, b));
        }
    }
    c
}

/// Exactly one producer for the given global output.
pub fn output_selection(index: &SignalIndex, output: usize) -> Formula {
    let atoms = index.selection_atoms(output);
    if atoms.is_empty() {
        // Cannot happen with a validated topology (at least one LUT with one output).
        warn!(
            "no selection atom for global output {}, forcing the first one",
            output
        );
        return Formula::atom(index.selection(0, 0));
    }
    Formula::and(exactly_one(&atoms))
}

/// Wiring constraints of one LUT.
pub fn lut_inputs(index: &SignalIndex, lut: usize) -> Formula {
    let t = index.topology();
    let mut c = Vec::new();

    // Exactly one source per input
    for input in 0..t.lut_inputs {
        c.extend(exactly_one(&index.wiring_atoms(lut, input)));
    }

    // Each source feeds at most one input of this LUT
    for slot in 0..t.signal_slots() {
        let atoms: Vec<Atom> = (0..t.lut_inputs)
            .map(|input| index.wiring(lut, input, slot))
            .collect();
        c.extend(at_most_one(&atoms));
    }

    // Sources that do not exist yet for this LUT
    for input in 0..t.lut_inputs {
        for slot in t.available_slots(lut)..t.signal_slots() {
            c.push(!Formula::atom(index.wiring(lut, input, slot)));
        }
    }

    Formula::and(c)
}

/// All structural constraints of the network.
pub fn topology_constraints(index: &SignalIndex) -> Vec<Formula> {
    let t = index.topology();
    let mut c = Vec::with_capacity(t.global_outputs + t.lut_count);
    for output in 0..t.global_outputs {
        c.push(output_selection(index, output));
    }
    for lut in 0..t.lut_count {
        c.push(lut_inputs(index, lut));
    }
    c
}
