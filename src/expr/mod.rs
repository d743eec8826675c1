//! This module contains the symbolic expression language used to describe
//! unknown cell values and the conditions placed upon them.
//!
//! # The Expression Interface
//!
//! The rest of the library only ever relies on a small set of operations from
//! this module:
//!
//! - [`Term::constant`] and [`Term::variable`] to build leaves.
//! - [`Term::add`] and [`Term::sub`] for wrapping 8-bit arithmetic.
//! - [`Term::is_zero`] to build the branch condition of a loop.
//! - [`Term::simplify`] to canonicalise a term, folding it to a constant when
//!   possible.
//!
//! Keeping to that set means the terms could be backed by an external
//! bit-vector or SMT library without the engine changing.

pub mod constraint;
pub mod feasibility;
pub mod linear;
pub mod smt;

use std::{
    collections::BTreeSet,
    fmt::{Display, Formatter},
    rc::Rc,
};

pub use constraint::PathConstraint;

use crate::expr::linear::LinearForm;

/// An 8-bit bit-vector term.
///
/// Terms are immutable and reference counted, so they can be shared freely
/// between the cells of forked execution states.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Term {
    data: Rc<TermData>,
}

/// The structure of a [`Term`].
///
/// All arithmetic wraps modulo 256.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum TermData {
    /// A known byte.
    Constant(u8),

    /// A named unknown byte.
    Variable(Rc<str>),

    /// Addition of terms.
    Add { left: Term, right: Term },

    /// Subtraction of terms.
    Sub { left: Term, right: Term },
}

impl Term {
    /// Constructs a term for the known byte `value`.
    #[must_use]
    pub fn constant(value: u8) -> Self {
        Self::from(TermData::Constant(value))
    }

    /// Constructs a term for the unknown byte called `name`.
    #[must_use]
    pub fn variable(name: impl Into<Rc<str>>) -> Self {
        Self::from(TermData::Variable(name.into()))
    }

    /// Constructs the term `self + other`.
    ///
    /// No folding is performed here. Call [`Self::simplify`] to canonicalise
    /// the result.
    #[must_use]
    pub fn add(&self, other: &Term) -> Self {
        Self::from(TermData::Add {
            left:  self.clone(),
            right: other.clone(),
        })
    }

    /// Constructs the term `self - other`.
    ///
    /// No folding is performed here. Call [`Self::simplify`] to canonicalise
    /// the result.
    #[must_use]
    pub fn sub(&self, other: &Term) -> Self {
        Self::from(TermData::Sub {
            left:  self.clone(),
            right: other.clone(),
        })
    }

    /// Builds the predicate that holds exactly when this term is zero.
    #[must_use]
    pub fn is_zero(&self) -> Predicate {
        Predicate::IsZero(self.clone())
    }

    /// Canonicalises the term.
    ///
    /// Two terms that denote the same linear function of their variables
    /// simplify to structurally equal terms, and a term whose variables all
    /// cancel out simplifies to a [`TermData::Constant`].
    #[must_use]
    pub fn simplify(&self) -> Self {
        LinearForm::of(self).to_term()
    }

    /// Gets the structure of the term.
    #[must_use]
    pub fn data(&self) -> &TermData {
        &self.data
    }

    /// Gets the value of the term if it is syntactically a constant.
    ///
    /// This does not simplify the term, so `x - x` is not a constant here.
    #[must_use]
    pub fn as_constant(&self) -> Option<u8> {
        match self.data() {
            TermData::Constant(value) => Some(*value),
            _ => None,
        }
    }

    /// Gets the names of all the variables that occur in the term.
    #[must_use]
    pub fn variables(&self) -> BTreeSet<Rc<str>> {
        let mut names = BTreeSet::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables(&self, names: &mut BTreeSet<Rc<str>>) {
        match self.data() {
            TermData::Constant(_) => (),
            TermData::Variable(name) => {
                names.insert(name.clone());
            }
            TermData::Add { left, right } | TermData::Sub { left, right } => {
                left.collect_variables(names);
                right.collect_variables(names);
            }
        }
    }

    fn fmt_nested(&self, f: &mut Formatter<'_>, nested: bool) -> std::fmt::Result {
        let (left, op, right) = match self.data() {
            TermData::Constant(value) => return write!(f, "{value}"),
            TermData::Variable(name) => return write!(f, "{name}"),
            TermData::Add { left, right } => (left, "+", right),
            TermData::Sub { left, right } => (left, "-", right),
        };

        if nested {
            write!(f, "(")?;
        }
        left.fmt_nested(f, true)?;
        write!(f, " {op} ")?;
        right.fmt_nested(f, true)?;
        if nested {
            write!(f, ")")?;
        }

        Ok(())
    }
}

impl From<TermData> for Term {
    fn from(value: TermData) -> Self {
        let data = Rc::new(value);
        Self { data }
    }
}

impl Display for Term {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.fmt_nested(f, false)
    }
}

/// A boolean condition on a [`Term`], as produced by the zero test of a loop
/// instruction.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Predicate {
    /// Holds when the term is zero.
    IsZero(Term),

    /// Holds when the term is not zero.
    IsNonZero(Term),
}

impl Predicate {
    /// Gets the logical negation of the predicate.
    #[must_use]
    pub fn negate(&self) -> Self {
        match self {
            Self::IsZero(term) => Self::IsNonZero(term.clone()),
            Self::IsNonZero(term) => Self::IsZero(term.clone()),
        }
    }

    /// Gets the term that the predicate tests.
    #[must_use]
    pub fn term(&self) -> &Term {
        match self {
            Self::IsZero(term) | Self::IsNonZero(term) => term,
        }
    }

    /// Gets the truth of the predicate if it does not depend on any variable.
    #[must_use]
    pub fn truth(&self) -> Option<bool> {
        let value = self.term().simplify().as_constant()?;
        match self {
            Self::IsZero(_) => Some(value == 0),
            Self::IsNonZero(_) => Some(value != 0),
        }
    }
}

impl Display for Predicate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IsZero(term) => write!(f, "{term} == 0"),
            Self::IsNonZero(term) => write!(f, "{term} != 0"),
        }
    }
}

#[cfg(test)]
mod test {
    use crate::expr::{Predicate, Term, TermData};

    #[test]
    fn builds_terms_without_folding() {
        let term = Term::constant(1).add(&Term::constant(2));
        assert_eq!(term.as_constant(), None);
        assert!(matches!(term.data(), TermData::Add { .. }));
    }

    #[test]
    fn simplifies_constant_terms_to_constants() {
        let term = Term::constant(250).add(&Term::constant(10));
        assert_eq!(term.simplify().as_constant(), Some(4));
    }

    #[test]
    fn simplifies_cancelled_variables_to_constants() {
        let x = Term::variable("input_0");
        let term = x.add(&Term::constant(3)).sub(&x);
        assert_eq!(term.simplify(), Term::constant(3));
    }

    #[test]
    fn simplification_is_canonical() {
        let x = Term::variable("input_0");
        let up_then_down = x.add(&Term::constant(2)).sub(&Term::constant(1));
        let just_up = x.add(&Term::constant(1));
        assert_eq!(up_then_down.simplify(), just_up.simplify());
    }

    #[test]
    fn displays_terms_readably() {
        let x = Term::variable("input_0");
        assert_eq!(x.add(&Term::constant(1)).to_string(), "input_0 + 1");
        assert_eq!(x.sub(&Term::constant(1)).simplify().to_string(), "input_0 - 1");
        assert_eq!(
            x.add(&Term::constant(1)).sub(&Term::variable("input_1")).to_string(),
            "(input_0 + 1) - input_1"
        );
    }

    #[test]
    fn collects_variables() {
        let term = Term::variable("b").add(&Term::variable("a")).sub(&Term::variable("b"));
        let names: Vec<String> = term.variables().iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn predicates_negate_and_evaluate() {
        let x = Term::variable("input_0");
        let zero = x.is_zero();
        assert_eq!(zero.negate(), Predicate::IsNonZero(x.clone()));
        assert_eq!(zero.negate().negate(), zero);
        assert_eq!(zero.truth(), None);
        assert_eq!(zero.to_string(), "input_0 == 0");
        assert_eq!(zero.negate().to_string(), "input_0 != 0");

        let folded = x.sub(&x).is_zero();
        assert_eq!(folded.truth(), Some(true));
        assert_eq!(folded.negate().truth(), Some(false));
    }
}
