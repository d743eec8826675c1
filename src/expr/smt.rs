//! This module renders [`PathConstraint`]s as
//! [SMT-LIB2](https://smtlib.cs.uiowa.edu/) scripts.
//!
//! The library never solves constraints itself. The rendered script declares
//! one 8-bit bit-vector constant per input variable and asserts each clause,
//! so any `QF_BV` solver can decide whether the path is feasible and, if it
//! is, produce concrete inputs that drive execution down it.

use itertools::Itertools;

use crate::expr::{PathConstraint, Predicate, Term, TermData};

/// Renders `constraint` as a complete SMT-LIB2 script ending in
/// `(check-sat)`.
#[must_use]
pub fn render(constraint: &PathConstraint) -> String {
    let declarations = constraint
        .variables()
        .iter()
        .map(|name| format!("(declare-const {name} (_ BitVec 8))"))
        .join("\n");
    let assertions = constraint
        .clauses()
        .into_iter()
        .map(|clause| format!("(assert {})", render_predicate(clause)))
        .join("\n");

    [
        "(set-logic QF_BV)".to_string(),
        declarations,
        assertions,
        "(check-sat)".to_string(),
    ]
    .into_iter()
    .filter(|section| !section.is_empty())
    .join("\n")
}

/// Renders a single predicate as an SMT-LIB2 boolean term.
#[must_use]
pub fn render_predicate(predicate: &Predicate) -> String {
    match predicate {
        Predicate::IsZero(term) => format!("(= {} #x00)", render_term(term)),
        Predicate::IsNonZero(term) => format!("(distinct {} #x00)", render_term(term)),
    }
}

/// Renders a single term as an SMT-LIB2 bit-vector term.
#[must_use]
pub fn render_term(term: &Term) -> String {
    match term.data() {
        TermData::Constant(value) => format!("#x{value:02x}"),
        TermData::Variable(name) => name.to_string(),
        TermData::Add { left, right } => {
            format!("(bvadd {} {})", render_term(left), render_term(right))
        }
        TermData::Sub { left, right } => {
            format!("(bvsub {} {})", render_term(left), render_term(right))
        }
    }
}
