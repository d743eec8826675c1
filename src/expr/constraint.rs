//! This module contains the [`PathConstraint`], the accumulated condition that
//! the inputs must satisfy for execution to follow a given path.

use std::{
    collections::BTreeSet,
    fmt::{Display, Formatter},
    rc::Rc,
};

use itertools::Itertools;

use crate::expr::{feasibility, feasibility::Feasibility, smt, Predicate};

/// A conjunction of [`Predicate`]s.
///
/// # Growth Only
///
/// A path constraint is never rewritten. The only way to derive a new
/// constraint is [`Self::with_clause`], which yields a strictly more specific
/// conjunction. This is what makes the constraints of forked states strictly
/// more specific than the constraint of the state they were forked from.
///
/// # Sharing
///
/// The clauses form a persistent list from the newest clause back to the
/// oldest. Deriving a constraint adds a single node that points at the clauses
/// of its parent, so every state forked from a common ancestor shares the
/// clauses of that ancestor instead of holding its own copy.
#[derive(Clone, Default)]
pub struct PathConstraint {
    /// The most recently added clause, if any.
    newest: Option<Rc<Clause>>,

    /// The number of clauses in the conjunction.
    len: usize,
}

/// A node in the persistent list of clauses.
struct Clause {
    predicate: Predicate,
    older:     Option<Rc<Clause>>,
}

/// Unlinks the chain of older clauses one node at a time, as dropping a long
/// chain recursively would exhaust the stack.
impl Drop for Clause {
    fn drop(&mut self) {
        let mut older = self.older.take();
        while let Some(node) = older {
            match Rc::try_unwrap(node) {
                Ok(mut node) => older = node.older.take(),
                Err(_) => break,
            }
        }
    }
}

impl PathConstraint {
    /// Constructs the trivially true constraint with no clauses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs the conjunction of this constraint and `clause`.
    ///
    /// The clauses of `self` are shared with the result rather than copied.
    #[must_use]
    pub fn with_clause(&self, clause: Predicate) -> Self {
        let newest = Some(Rc::new(Clause {
            predicate: clause,
            older:     self.newest.clone(),
        }));
        let len = self.len + 1;
        Self { newest, len }
    }

    /// Gets the clauses of the conjunction, in the order they were added.
    #[must_use]
    pub fn clauses(&self) -> Vec<&Predicate> {
        let mut clauses: Vec<&Predicate> = self.iter_newest_first().collect();
        clauses.reverse();
        clauses
    }

    /// Gets the clause that was added most recently, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Predicate> {
        self.newest.as_deref().map(|node| &node.predicate)
    }

    /// Gets the number of clauses in the conjunction.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Checks if the constraint has no clauses, and hence is trivially true.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Checks whether every clause of `self` is also a clause of `other`, in
    /// the same order, so that `other` extends `self`.
    #[must_use]
    pub fn is_prefix_of(&self, other: &PathConstraint) -> bool {
        if other.len < self.len {
            return false;
        }
        let mut older = other.newest.as_ref();
        for _ in self.len..other.len {
            older = older.and_then(|node| node.older.as_ref());
        }
        same_clauses(self.newest.as_ref(), older)
    }

    /// Checks whether `self` and `other` hold the very same clause nodes, as is
    /// the case for the constraints of a state and its unforked clones.
    #[must_use]
    pub fn shares_clauses_with(&self, other: &PathConstraint) -> bool {
        match (&self.newest, &other.newest) {
            (Some(this), Some(that)) => Rc::ptr_eq(this, that),
            (None, None) => true,
            _ => false,
        }
    }

    /// Gets the names of all the variables mentioned by the constraint.
    #[must_use]
    pub fn variables(&self) -> BTreeSet<Rc<str>> {
        self.iter_newest_first().flat_map(|clause| clause.term().variables()).collect()
    }

    /// Checks whether the constraint can be shown to have no solution.
    ///
    /// See [`feasibility::check`] for the guarantees of this check.
    #[must_use]
    pub fn feasibility(&self) -> Feasibility {
        feasibility::check(self)
    }

    /// Renders the constraint as an SMT-LIB2 script for an external solver.
    #[must_use]
    pub fn to_smtlib(&self) -> String {
        smt::render(self)
    }

    fn iter_newest_first(&self) -> impl Iterator<Item = &Predicate> + '_ {
        std::iter::successors(self.newest.as_deref(), |node| node.older.as_deref())
            .map(|node| &node.predicate)
    }
}

/// Compares two clause lists of equal length node by node, stopping early once
/// they reach a shared node.
fn same_clauses(mut left: Option<&Rc<Clause>>, mut right: Option<&Rc<Clause>>) -> bool {
    loop {
        match (left, right) {
            (None, None) => return true,
            (Some(l), Some(r)) => {
                if Rc::ptr_eq(l, r) {
                    return true;
                }
                if l.predicate != r.predicate {
                    return false;
                }
                left = l.older.as_ref();
                right = r.older.as_ref();
            }
            _ => return false,
        }
    }
}

impl PartialEq for PathConstraint {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && same_clauses(self.newest.as_ref(), other.newest.as_ref())
    }
}

impl Eq for PathConstraint {}

impl std::fmt::Debug for PathConstraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.clauses()).finish()
    }
}

/// Displays the conjunction with `&&`, or as `true` if there are no clauses.
impl Display for PathConstraint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "true")
        } else {
            write!(f, "{}", self.clauses().into_iter().join(" && "))
        }
    }
}

#[cfg(test)]
mod test {
    use crate::expr::{PathConstraint, Term};

    #[test]
    fn starts_out_trivially_true() {
        let constraint = PathConstraint::new();
        assert!(constraint.is_empty());
        assert_eq!(constraint.to_string(), "true");
    }

    #[test]
    fn only_grows() {
        let x = Term::variable("input_0");
        let parent = PathConstraint::new().with_clause(x.is_zero().negate());
        let child = parent.with_clause(x.sub(&Term::constant(1)).simplify().is_zero());

        assert_eq!(parent.len(), 1);
        assert_eq!(child.len(), 2);
        assert!(parent.is_prefix_of(&child));
        assert!(!child.is_prefix_of(&parent));
        assert_eq!(child.to_string(), "input_0 != 0 && input_0 - 1 == 0");
    }

    #[test]
    fn gathers_variables_across_clauses() {
        let constraint = PathConstraint::new()
            .with_clause(Term::variable("input_1").is_zero())
            .with_clause(Term::variable("input_0").is_zero().negate());
        let names: Vec<String> = constraint.variables().iter().map(ToString::to_string).collect();

        assert_eq!(names, vec!["input_0", "input_1"]);
    }

    #[test]
    fn siblings_share_the_clauses_of_their_parent() {
        let x = Term::variable("input_0");
        let parent = PathConstraint::new().with_clause(x.is_zero().negate());
        let zero = parent.with_clause(x.is_zero());
        let non_zero = parent.with_clause(x.is_zero().negate());

        assert!(parent.is_prefix_of(&zero));
        assert!(parent.is_prefix_of(&non_zero));
        assert!(!zero.is_prefix_of(&non_zero));
        assert_eq!(zero.clauses()[0], parent.clauses()[0]);
        assert!(parent.clone().shares_clauses_with(&parent));
        assert!(!zero.shares_clauses_with(&non_zero));
        assert_eq!(zero.last(), Some(&x.is_zero()));
    }

    #[test]
    fn compares_by_clauses_rather_than_by_identity() {
        let x = Term::variable("input_0");
        let built_once = PathConstraint::new().with_clause(x.is_zero());
        let built_twice = PathConstraint::new().with_clause(x.is_zero());

        assert_eq!(built_once, built_twice);
        assert!(!built_once.shares_clauses_with(&built_twice));
        assert!(built_once.is_prefix_of(&built_twice));
    }

    #[test]
    fn holds_and_drops_very_long_chains() {
        let x = Term::variable("input_0");
        let mut constraint = PathConstraint::new();
        let mut snapshots = Vec::new();
        for round in 0..200_000 {
            constraint = constraint.with_clause(x.is_zero().negate());
            if round % 50_000 == 0 {
                snapshots.push(constraint.clone());
            }
        }

        assert_eq!(constraint.len(), 200_000);
        assert!(snapshots.iter().all(|snapshot| snapshot.is_prefix_of(&constraint)));
        drop(snapshots);
        drop(constraint);
    }
}
