//! Lowering of [`Formula`]s to a CNF that can be passed to a SAT solver.
//!
//! Every non-trivial sub-formula gets a fresh literal constrained by Tseitin clauses.
//! Top-level conjunctions are split and top-level disjunctions become plain clauses,
//! so the structural constraints (at-least-one, pairwise at-most-one) do not create
//! any auxiliary variable.
//!
//! Literals follow the DIMACS convention: variable `v` (starting at 1) is the literal `v`,
//! its negation is `-v`.

use std::{collections::HashMap, fmt::Display, ops::Not, rc::Rc};

use crate::{
    Result, SynthError,
    formula::{Atom, Formula},
};

/// A SAT literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Lit(i64);

impl Lit {
    /// Index of the variable, starting at 0.
    pub fn var_index(self) -> usize {
        (self.0.unsigned_abs() - 1) as usize
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }
}

impl Not for Lit {
    type Output = Self;

    fn not(self) -> Self::Output {
        Lit(-self.0)
    }
}

impl From<Lit> for varisat::Lit {
    fn from(value: Lit) -> Self {
        varisat::Lit::from_dimacs(value.0 as isize)
    }
}

/// A lowered sub-formula: either a constant or a literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LitRes {
    False,
    True,
    Lit(Lit),
}

impl Not for LitRes {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            LitRes::False => LitRes::True,
            LitRes::True => LitRes::False,
            LitRes::Lit(lit) => LitRes::Lit(!lit),
        }
    }
}

impl From<Lit> for LitRes {
    fn from(value: Lit) -> Self {
        LitRes::Lit(value)
    }
}

/// A SAT clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause(Vec<Lit>);

impl Clause {
    /// Returns the true SAT clause once we got rid of `True` and `False` literals.
    /// If there is a `True`, then the clause is obviously satisfied, so we return None.
    /// `False` literals are omitted. Note that the clause might end up empty (unsatisfiable).
    fn from_lit_res(lits: impl IntoIterator<Item = LitRes>) -> Option<Clause> {
        let mut literals = Vec::new();

        for lit_res in lits {
            match lit_res {
                LitRes::True => return None,
                LitRes::False => (),
                LitRes::Lit(lit) => literals.push(lit),
            }
        }

        Some(Clause(literals))
    }

    pub fn lits(&self) -> &[Lit] {
        &self.0
    }
}

impl From<Vec<Lit>> for Clause {
    fn from(value: Vec<Lit>) -> Self {
        Clause(value)
    }
}

/// A SAT CNF being built from formulas.
///
/// Clauses are buffered until [`drain`] hands them over to a solver, which lets an
/// incremental solver receive only the clauses added since the last call.
///
/// [`drain`]: Cnf::drain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cnf {
    clauses: Vec<Clause>,
    /// The index of the next variable, DIMACS style.
    next_var: i64,
    /// Total number of clauses ever added, drained or not.
    clause_count: usize,
}

impl Default for Cnf {
    fn default() -> Self {
        Cnf::new()
    }
}

impl Cnf {
    /// A new empty CNF.
    pub fn new() -> Self {
        Cnf {
            clauses: Vec::new(),
            next_var: 1,
            clause_count: 0,
        }
    }

    /// Allocates a new variable and returns its positive literal.
    pub fn fresh_lit(&mut self) -> Lit {
        let lit = Lit(self.next_var);
        self.next_var += 1;
        lit
    }

    /// Number of variables allocated so far.
    pub fn var_count(&self) -> usize {
        (self.next_var - 1) as usize
    }

    /// Number of clauses added so far.
    pub fn clause_count(&self) -> usize {
        self.clause_count
    }

    /// Pending clauses.
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Removes and returns the pending clauses.
    pub fn drain(&mut self) -> Vec<Clause> {
        std::mem::take(&mut self.clauses)
    }

    /// Add the given clause to the CNF.
    /// An empty clause is turned into an explicit contradiction on a fresh variable.
    pub fn add_clause(&mut self, clause: Clause) {
        if clause.0.is_empty() {
            let x = self.fresh_lit();
            self.push(Clause(vec![x]));
            self.push(Clause(vec![!x]));
        } else {
            self.push(clause);
        }
    }

    fn push(&mut self, clause: Clause) {
        self.clause_count += 1;
        self.clauses.push(clause);
    }

    /// Add the given clause to the CNF, else does nothing.
    fn add_clause_if(&mut self, clause: Option<Clause>) {
        if let Some(c) = clause {
            self.add_clause(c);
        }
    }

    /// Add clauses that encode `z = AND(inputs)`.
    fn add_and(&mut self, inputs: &[Lit], z: Lit) {
        for &a in inputs {
            self.push(Clause(vec![a, !z]));
        }
        let mut big: Vec<Lit> = inputs.iter().map(|&a| !a).collect();
        big.push(z);
        self.push(Clause(big));
    }

    /// Add clauses that encode `z = OR(inputs)`.
    fn add_or(&mut self, inputs: &[Lit], z: Lit) {
        for &a in inputs {
            self.push(Clause(vec![!a, z]));
        }
        let mut big: Vec<Lit> = inputs.to_vec();
        big.push(!z);
        self.push(Clause(big));
    }

    /// Add clauses that encode `z = XNOR(a, b)`, ie `z = (a == b)`.
    fn add_xnor(&mut self, a: Lit, b: Lit, z: Lit) {
        self.push(Clause(vec![!a, !b, z]));
        self.push(Clause(vec![a, b, z]));
        self.push(Clause(vec![a, !b, !z]));
        self.push(Clause(vec![!a, b, !z]));
    }

    /// Add clauses asserting that `formula` holds.
    ///
    /// `atom_lits[i]` is the literal of atom `i`. Referencing an atom without literal is an
    /// encoding defect.
    pub fn add_formula(&mut self, formula: &Formula, atom_lits: &[Lit]) -> Result<()> {
        let mut lowering = Lowering {
            cnf: self,
            atom_lits,
            memo: HashMap::new(),
        };
        lowering.assert(formula)
    }
}

/// Tseitin lowering state for one asserted formula.
///
/// Shared sub-formulas are lowered once: the memo is keyed by the address of the shared node,
/// which stays valid as long as the asserted formula is borrowed.
struct Lowering<'a> {
    cnf: &'a mut Cnf,
    atom_lits: &'a [Lit],
    memo: HashMap<*const Formula, LitRes>,
}

impl Lowering<'_> {
    fn atom(&self, atom: Atom) -> Result<Lit> {
        self.atom_lits.get(atom.index()).copied().ok_or_else(|| {
            SynthError::EncodingInvariant(format!("atom {} is not mapped to any literal", atom))
        })
    }

    fn assert(&mut self, formula: &Formula) -> Result<()> {
        match formula {
            Formula::And(fs) => {
                for f in fs {
                    self.assert(f)?;
                }
            }
            Formula::Or(fs) => {
                let lits = fs
                    .iter()
                    .map(|f| self.lower_shared(f))
                    .collect::<Result<Vec<_>>>()?;
                self.cnf.add_clause_if(Clause::from_lit_res(lits));
            }
            Formula::Eq(a, b) => {
                let a = self.lower_shared(a)?;
                let b = self.lower_shared(b)?;
                self.cnf.add_clause_if(Clause::from_lit_res([!a, b]));
                self.cnf.add_clause_if(Clause::from_lit_res([a, !b]));
            }
            _ => {
                let lit = self.lower(formula)?;
                self.cnf.add_clause_if(Clause::from_lit_res([lit]));
            }
        }
        Ok(())
    }

    fn lower_shared(&mut self, formula: &Rc<Formula>) -> Result<LitRes> {
        let key = Rc::as_ptr(formula);
        if let Some(res) = self.memo.get(&key) {
            return Ok(*res);
        }
        let res = self.lower(formula)?;
        self.memo.insert(key, res);
        Ok(res)
    }

    fn lower(&mut self, formula: &Formula) -> Result<LitRes> {
        Ok(match formula {
            Formula::Const(true) => LitRes::True,
            Formula::Const(false) => LitRes::False,
            Formula::Atom(atom) => LitRes::from(self.atom(*atom)?),
            Formula::Not(f) => !self.lower_shared(f)?,
            Formula::And(fs) => {
                let mut lits = Vec::with_capacity(fs.len());
                for f in fs {
                    match self.lower_shared(f)? {
                        LitRes::False => return Ok(LitRes::False),
                        LitRes::True => (),
                        LitRes::Lit(lit) => lits.push(lit),
                    }
                }
                self.gate(lits, LitRes::True, Cnf::add_and)
            }
            Formula::Or(fs) => {
                let mut lits = Vec::with_capacity(fs.len());
                for f in fs {
                    match self.lower_shared(f)? {
                        LitRes::True => return Ok(LitRes::True),
                        LitRes::False => (),
                        LitRes::Lit(lit) => lits.push(lit),
                    }
                }
                self.gate(lits, LitRes::False, Cnf::add_or)
            }
            Formula::Eq(a, b) => {
                let a = self.lower_shared(a)?;
                let b = self.lower_shared(b)?;
                match (a, b) {
                    (LitRes::True, x) | (x, LitRes::True) => x,
                    (LitRes::False, x) | (x, LitRes::False) => !x,
                    (LitRes::Lit(a), LitRes::Lit(b)) => {
                        let z = self.cnf.fresh_lit();
                        self.cnf.add_xnor(a, b, z);
                        LitRes::from(z)
                    }
                }
            }
        })
    }

    /// Introduces the output literal of an n-ary gate, unless the gate is trivial.
    fn gate(
        &mut self,
        lits: Vec<Lit>,
        neutral: LitRes,
        encode: fn(&mut Cnf, &[Lit], Lit),
    ) -> LitRes {
        match lits.as_slice() {
            [] => neutral,
            [single] => LitRes::from(*single),
            _ => {
                let z = self.cnf.fresh_lit();
                encode(self.cnf, &lits, z);
                LitRes::from(z)
            }
        }
    }
}

/// DIMACS rendering of the pending clauses.
impl Display for Cnf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "p cnf {} {}", self.var_count(), self.clauses.len())?;
        for clause in &self.clauses {
            for lit in &clause.0 {
                write!(f, "{} ", lit.0)?;
            }
            writeln!(f, "0")?;
        }
        Ok(())
    }
}
