//! The satisfiability oracle.
//!
//! The synthesis engine only builds formulas and decides when to call the oracle: solving
//! itself is delegated to an implementation of [`Oracle`]. The default one, [`VarisatOracle`],
//! lowers formulas to clauses with [`crate::cnf`] and feeds them to [varisat](https://docs.rs/varisat),
//! which supports adding clauses between two calls to `solve`.

use std::fmt::Display;

use log::trace;
use varisat::ExtendFormula;

use crate::{
    Result,
    cnf::{Cnf, Lit},
    error::OracleError,
    formula::{Atom, Formula},
};

/// Answer of a satisfiability check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SatResult {
    Sat,
    Unsat,
    Unknown,
}

impl Display for SatResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SatResult::Sat => write!(f, "sat"),
            SatResult::Unsat => write!(f, "unsat"),
            SatResult::Unknown => write!(f, "unknown"),
        }
    }
}

/// A satisfying assignment of the declared atoms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Model {
    values: Vec<bool>,
}

impl Model {
    /// `values[i]` is the value of atom `i`.
    pub fn new(values: Vec<bool>) -> Self {
        Model { values }
    }

    /// Value of the atom. Atoms unknown to the model are false.
    pub fn value(&self, atom: Atom) -> bool {
        self.values.get(atom.index()).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Incremental satisfiability oracle over named boolean atoms.
///
/// Assertions accumulate: once a check answered [`SatResult::Unsat`], every later check
/// answers it too.
pub trait Oracle {
    /// Declares a new atom. Atoms must be numbered densely in declaration order.
    fn declare_atom(&mut self, name: &str) -> Atom;

    /// Adds an assertion.
    fn assert(&mut self, formula: &Formula) -> Result<()>;

    /// Checks the satisfiability of all assertions so far.
    fn check_sat(&mut self) -> Result<SatResult>;

    /// Satisfying assignment, only valid right after [`check_sat`] answered [`SatResult::Sat`].
    ///
    /// [`check_sat`]: Oracle::check_sat
    fn model(&self) -> Result<Model>;
}

/// Oracle backed by the varisat CDCL solver.
pub struct VarisatOracle<'a> {
    solver: varisat::Solver<'a>,
    cnf: Cnf,
    atom_lits: Vec<Lit>,
    names: Vec<String>,
    last_result: Option<SatResult>,
}

impl Default for VarisatOracle<'_> {
    fn default() -> Self {
        VarisatOracle::new()
    }
}

impl VarisatOracle<'_> {
    pub fn new() -> Self {
        VarisatOracle {
            solver: varisat::Solver::new(),
            cnf: Cnf::new(),
            atom_lits: Vec::new(),
            names: Vec::new(),
            last_result: None,
        }
    }

    /// Name given to the atom when it was declared.
    pub fn name(&self, atom: Atom) -> Option<&str> {
        self.names.get(atom.index()).map(String::as_str)
    }

    /// Number of solver variables, atoms and Tseitin variables included.
    pub fn var_count(&self) -> usize {
        self.cnf.var_count()
    }

    /// Number of clauses handed to the solver.
    pub fn clause_count(&self) -> usize {
        self.cnf.clause_count()
    }

    fn flush(&mut self) {
        for clause in self.cnf.drain() {
            let lits: Vec<varisat::Lit> = clause.lits().iter().map(|&l| l.into()).collect();
            self.solver.add_clause(&lits);
        }
    }
}

impl Oracle for VarisatOracle<'_> {
    fn declare_atom(&mut self, name: &str) -> Atom {
        let lit = self.cnf.fresh_lit();
        self.atom_lits.push(lit);
        self.names.push(name.to_string());
        Atom(self.atom_lits.len() - 1)
    }

    fn assert(&mut self, formula: &Formula) -> Result<()> {
        self.cnf.add_formula(formula, &self.atom_lits)?;
        self.last_result = None;
        self.flush();
        Ok(())
    }

    fn check_sat(&mut self) -> Result<SatResult> {
        let solved = self
            .solver
            .solve()
            .map_err(|e| OracleError::Solver(e.to_string()))?;
        let res = match solved {
            true => SatResult::Sat,
            false => SatResult::Unsat,
        };
        trace!(
            "check_sat: {} ({} vars, {} clauses)",
            res,
            self.cnf.var_count(),
            self.cnf.clause_count()
        );
        self.last_result = Some(res);
        Ok(res)
    }

    fn model(&self) -> Result<Model> {
        if self.last_result != Some(SatResult::Sat) {
            return Err(OracleError::NoModel.into());
        }
        let lits = self.solver.model().ok_or(OracleError::NoModel)?;
        let mut var_values = vec![false; self.cnf.var_count()];
        for lit in lits {
            if let Some(v) = var_values.get_mut(lit.var().index()) {
                *v = lit.is_positive();
            }
        }
        let values = self
            .atom_lits
            .iter()
            .map(|lit| var_values[lit.var_index()] == lit.is_positive())
            .collect();
        Ok(Model::new(values))
    }
}
