//! Boolean formulas handed to the satisfiability oracle.
//!
//! Formulas are built with smart constructors ([`Formula::and`], [`Formula::or`], ...)
//! which fold constants away as early as possible. This matters a lot for the
//! formula-composition encoding, where global inputs are constants for a given case:
//! `value AND selector` becomes either `selector` or `false` right away.
//!
//! Sub-formulas are reference counted, so an expression built once (for example the output
//! of a LUT) can be shared by every formula reading it without being copied.

use std::{fmt::Display, ops::Not, rc::Rc};

/// A boolean decision variable declared with the oracle.
///
/// Atoms are dense: the `n`-th declared atom has index `n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Atom(pub usize);

impl Atom {
    pub fn index(self) -> usize {
        self.0
    }
}

impl Display for Atom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "x{}", self.0)
    }
}

/// A boolean formula over atoms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Formula {
    Const(bool),
    Atom(Atom),
    Not(Rc<Formula>),
    And(Vec<Rc<Formula>>),
    Or(Vec<Rc<Formula>>),
    Eq(Rc<Formula>, Rc<Formula>),
}

pub const TRUE: Formula = Formula::Const(true);
pub const FALSE: Formula = Formula::Const(false);

impl Formula {
    pub fn atom(atom: Atom) -> Self {
        Formula::Atom(atom)
    }

    pub fn constant(value: bool) -> Self {
        Formula::Const(value)
    }

    /// Returns the constant value of the formula, if it is one.
    pub fn as_const(&self) -> Option<bool> {
        match self {
            Formula::Const(b) => Some(*b),
            _ => None,
        }
    }

    /// Conjunction of the given formulas.
    /// `True` operands are dropped, a `False` operand makes the whole conjunction `False`.
    pub fn and<I, F>(operands: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<Rc<Formula>>,
    {
        let mut kept = Vec::new();
        for op in operands {
            let op = op.into();
            match op.as_const() {
                Some(true) => (),
                Some(false) => return FALSE,
                None => kept.push(op),
            }
        }
        match kept.as_slice() {
            [] => TRUE,
            [single] => unwrap_rc(single.clone()),
            _ => Formula::And(kept),
        }
    }

    /// Disjunction of the given formulas.
    /// `False` operands are dropped, a `True` operand makes the whole disjunction `True`.
    pub fn or<I, F>(operands: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<Rc<Formula>>,
    {
        let mut kept = Vec::new();
        for op in operands {
            let op = op.into();
            match op.as_const() {
                Some(false) => (),
                Some(true) => return TRUE,
                None => kept.push(op),
            }
        }
        match kept.as_slice() {
            [] => FALSE,
            [single] => unwrap_rc(single.clone()),
            _ => Formula::Or(kept),
        }
    }

    /// Equality (XNOR) of two formulas.
    pub fn eq(lhs: impl Into<Rc<Formula>>, rhs: impl Into<Rc<Formula>>) -> Self {
        let lhs = lhs.into();
        let rhs = rhs.into();
        match (lhs.as_const(), rhs.as_const()) {
            (Some(a), Some(b)) => Formula::Const(a == b),
            (Some(true), None) => unwrap_rc(rhs),
            (Some(false), None) => Formula::negate(rhs),
            (None, Some(true)) => unwrap_rc(lhs),
            (None, Some(false)) => Formula::negate(lhs),
            (None, None) => Formula::Eq(lhs, rhs),
        }
    }

    /// `!a || !b`, ie at most one of two formulas is true.
    pub fn at_most_one_of(a: impl Into<Rc<Formula>>, b: impl Into<Rc<Formula>>) -> Self {
        Formula::or([Formula::negate(a.into()), Formula::negate(b.into())])
    }

    /// Negation of a shared formula, folding constants and double negations.
    pub fn negate(f: Rc<Formula>) -> Self {
        match &*f {
            Formula::Const(b) => Formula::Const(!b),
            Formula::Not(inner) => (**inner).clone(),
            _ => Formula::Not(f),
        }
    }

    /// Evaluates the formula under the given valuation of atoms.
    pub fn evaluate(&self, valuation: &impl Fn(Atom) -> bool) -> bool {
        match self {
            Formula::Const(b) => *b,
            Formula::Atom(a) => valuation(*a),
            Formula::Not(f) => !f.evaluate(valuation),
            Formula::And(fs) => fs.iter().all(|f| f.evaluate(valuation)),
            Formula::Or(fs) => fs.iter().any(|f| f.evaluate(valuation)),
            Formula::Eq(a, b) => a.evaluate(valuation) == b.evaluate(valuation),
        }
    }
}

fn unwrap_rc(f: Rc<Formula>) -> Formula {
    Rc::try_unwrap(f).unwrap_or_else(|shared| (*shared).clone())
}

impl From<Atom> for Formula {
    fn from(value: Atom) -> Self {
        Formula::Atom(value)
    }
}

impl From<bool> for Formula {
    fn from(value: bool) -> Self {
        Formula::Const(value)
    }
}

impl From<Atom> for Rc<Formula> {
    fn from(value: Atom) -> Self {
        Rc::new(Formula::Atom(value))
    }
}

impl Not for Formula {
    type Output = Self;

    fn not(self) -> Self::Output {
        Formula::negate(Rc::new(self))
    }
}

impl Display for Formula {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn join(
            f: &mut std::fmt::Formatter<'_>,
            op: &str,
            operands: &[Rc<Formula>],
        ) -> std::fmt::Result {
            write!(f, "({}", op)?;
            for operand in operands {
                write!(f, " {}", operand)?;
            }
            write!(f, ")")
        }

        match self {
            Formula::Const(b) => write!(f, "{}", b),
            Formula::Atom(a) => write!(f, "{}", a),
            Formula::Not(inner) => write!(f, "(not {})", inner),
            Formula::And(fs) => join(f, "and", fs),
            Formula::Or(fs) => join(f, "or", fs),
            Formula::Eq(a, b) => write!(f, "(= {} {})", a, b),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn x(i: usize) -> Formula {
        Formula::atom(Atom(i))
    }

    #[test]
    fn and_folding_test() {
        assert_eq!(Formula::and([TRUE, TRUE]), TRUE);
        assert_eq!(Formula::and([x(1), FALSE]), FALSE);
        assert_eq!(Formula::and([TRUE, x(1)]), x(1));
        assert_eq!(Formula::and(Vec::<Formula>::new()), TRUE);
        assert_eq!(
            Formula::and([x(1), TRUE, x(2)]),
            Formula::And(vec![Rc::new(x(1)), Rc::new(x(2))])
        );
    }

    #[test]
    fn or_folding_test() {
        assert_eq!(Formula::or([FALSE, FALSE]), FALSE);
        assert_eq!(Formula::or([x(1), TRUE]), TRUE);
        assert_eq!(Formula::or([FALSE, x(3)]), x(3));
        assert_eq!(Formula::or(Vec::<Formula>::new()), FALSE);
    }

    #[test]
    fn eq_folding_test() {
        assert_eq!(Formula::eq(TRUE, x(1)), x(1));
        assert_eq!(Formula::eq(x(1), FALSE), !x(1));
        assert_eq!(Formula::eq(FALSE, FALSE), TRUE);
        assert_eq!(Formula::eq(TRUE, FALSE), FALSE);
    }

    #[test]
    fn not_test() {
        assert_eq!(!TRUE, FALSE);
        assert_eq!(!!x(4), x(4));
    }

    #[test]
    fn evaluate_test() {
        // (x0 and not x1) = x2
        let f = Formula::eq(Formula::and([x(0), !x(1)]), x(2));
        let valuation = |values: [bool; 3]| move |a: Atom| values[a.index()];
        assert!(f.evaluate(&valuation([true, false, true])));
        assert!(!f.evaluate(&valuation([true, false, false])));
        assert!(f.evaluate(&valuation([false, false, false])));
    }

    #[test]
    fn display_test() {
        let f = Formula::or([x(0), Formula::and([x(1), !x(2)])]);
        assert_eq!(f.to_string(), "(or x0 (and x1 (not x2)))");
    }
}
