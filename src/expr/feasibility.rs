//! This module contains a cheap, solver-free check for path constraints that
//! cannot be satisfied by any input.
//!
//! # Soundness
//!
//! The check is sound but incomplete. It only ever reports
//! [`Feasibility::Infeasible`] when no assignment of the inputs satisfies the
//! constraint, so discarding such paths never loses a real execution. Clauses
//! it does not understand are assumed to be satisfiable.
//!
//! # What Is Decided
//!
//! - Clauses without variables are evaluated directly.
//! - Clauses over a single variable `x` with an odd coefficient `a` are solved
//!   exactly, as `a` is invertible modulo 256 and so `a·x + k = 0` has the
//!   single solution `x = -k·a⁻¹`. `IsZero` pins `x` to that value, and
//!   `IsNonZero` excludes it.
//!
//! A variable that is pinned to two different values, pinned to an excluded
//! value, or that has all 256 values excluded makes the constraint infeasible.

use std::{collections::BTreeMap, rc::Rc};

use crate::{
    constant::CELL_VALUE_COUNT,
    expr::{linear::LinearForm, PathConstraint, Predicate},
};

/// The result of checking a constraint for feasibility.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Feasibility {
    /// No input satisfies the constraint.
    Infeasible,

    /// The constraint may be satisfiable.
    Unknown,
}

impl Feasibility {
    /// Checks if the constraint was proven infeasible.
    #[must_use]
    pub fn is_infeasible(&self) -> bool {
        matches!(self, Self::Infeasible)
    }
}

/// The values still available to a single variable.
#[derive(Clone, Debug)]
struct Domain {
    pinned:   Option<u8>,
    excluded: [bool; CELL_VALUE_COUNT],
}

impl Default for Domain {
    fn default() -> Self {
        let pinned = None;
        let excluded = [false; CELL_VALUE_COUNT];
        Self { pinned, excluded }
    }
}

impl Domain {
    /// Pins the variable to `value`, returning `false` on contradiction.
    fn pin(&mut self, value: u8) -> bool {
        match self.pinned {
            Some(existing) => existing == value,
            None => {
                self.pinned = Some(value);
                true
            }
        }
    }

    /// Excludes `value` from the variable.
    fn exclude(&mut self, value: u8) {
        self.excluded[value as usize] = true;
    }

    /// Checks whether any value remains available.
    fn is_empty(&self) -> bool {
        match self.pinned {
            Some(value) => self.excluded[value as usize],
            None => self.excluded.iter().all(|excluded| *excluded),
        }
    }
}

/// Checks whether `constraint` can be shown to have no solution.
#[must_use]
pub fn check(constraint: &PathConstraint) -> Feasibility {
    let mut domains: BTreeMap<Rc<str>, Domain> = BTreeMap::new();

    for clause in constraint.clauses() {
        let form = LinearForm::of(clause.term());

        if form.is_constant() {
            if clause.truth() == Some(false) {
                return Feasibility::Infeasible;
            }
            continue;
        }

        let Some((name, coefficient)) = form.single_variable() else {
            continue;
        };
        let Some(inverse) = inverse(coefficient) else {
            continue;
        };
        let root = form.constant().wrapping_neg().wrapping_mul(inverse);

        let domain = domains.entry(name.clone()).or_default();
        match clause {
            Predicate::IsZero(_) => {
                if !domain.pin(root) {
                    return Feasibility::Infeasible;
                }
            }
            Predicate::IsNonZero(_) => domain.exclude(root),
        }
    }

    if domains.values().any(Domain::is_empty) {
        Feasibility::Infeasible
    } else {
        Feasibility::Unknown
    }
}

/// Computes the multiplicative inverse of `value` modulo 256, which exists
/// exactly when `value` is odd.
fn inverse(value: u8) -> Option<u8> {
    (1..=u8::MAX).step_by(2).find(|candidate| value.wrapping_mul(*candidate) == 1)
}

#[cfg(test)]
mod test {
    use crate::expr::{
        feasibility::{check, inverse, Feasibility},
        PathConstraint,
        Term,
    };

    fn x() -> Term {
        Term::variable("input_0")
    }

    #[test]
    fn computes_inverses_of_odd_values_only() {
        assert_eq!(inverse(1), Some(1));
        assert_eq!(inverse(3).map(|i| 3u8.wrapping_mul(i)), Some(1));
        assert_eq!(inverse(255), Some(255));
        assert_eq!(inverse(2), None);
    }

    #[test]
    fn the_empty_constraint_is_not_infeasible() {
        assert_eq!(check(&PathConstraint::new()), Feasibility::Unknown);
    }

    #[test]
    fn complementary_clauses_are_infeasible() {
        let constraint = PathConstraint::new()
            .with_clause(x().is_zero())
            .with_clause(x().is_zero().negate());
        assert!(check(&constraint).is_infeasible());
    }

    #[test]
    fn offset_clauses_are_solved() {
        // x - 1 == 0 pins x to 1, which x != 1 then excludes.
        let pinned = x().sub(&Term::constant(1)).simplify().is_zero();
        let excluded = x().add(&Term::constant(255)).is_zero().negate();
        let constraint = PathConstraint::new().with_clause(pinned.clone()).with_clause(excluded);
        assert!(check(&constraint).is_infeasible());

        // While x != 0 is perfectly compatible with it.
        let compatible = PathConstraint::new()
            .with_clause(pinned)
            .with_clause(x().is_zero().negate());
        assert_eq!(check(&compatible), Feasibility::Unknown);
    }

    #[test]
    fn excluding_every_value_is_infeasible() {
        let mut constraint = PathConstraint::new();
        for offset in 0..=u8::MAX {
            assert_eq!(check(&constraint), Feasibility::Unknown);
            let excluded = x().sub(&Term::constant(offset)).is_zero().negate();
            constraint = constraint.with_clause(excluded);
        }
        assert!(check(&constraint).is_infeasible());
    }

    #[test]
    fn constant_clauses_are_evaluated() {
        let always_false = x().sub(&x()).is_zero().negate();
        assert!(check(&PathConstraint::new().with_clause(always_false)).is_infeasible());

        let always_true = x().sub(&x()).is_zero();
        assert_eq!(check(&PathConstraint::new().with_clause(always_true)), Feasibility::Unknown);
    }

    #[test]
    fn multi_variable_clauses_are_assumed_satisfiable() {
        let y = Term::variable("input_1");
        let constraint = PathConstraint::new()
            .with_clause(x().sub(&y).is_zero())
            .with_clause(x().sub(&y).is_zero().negate());
        assert_eq!(check(&constraint), Feasibility::Unknown);
    }
}
