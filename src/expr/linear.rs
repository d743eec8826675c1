//! This module contains the linear normal form used to simplify [`Term`]s.
//!
//! Every term in the expression language is a linear function of its
//! variables modulo 256, so it can be written uniquely as
//! `c₁·x₁ + … + cₙ·xₙ + k` with all coefficients non-zero.

use std::{collections::BTreeMap, rc::Rc};

use crate::expr::{Term, TermData};

/// A term in linear normal form.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LinearForm {
    /// The non-zero coefficient of each variable, ordered by variable name.
    coefficients: BTreeMap<Rc<str>, u8>,

    /// The constant offset.
    constant: u8,
}

impl LinearForm {
    /// Computes the linear normal form of `term`.
    #[must_use]
    pub fn of(term: &Term) -> Self {
        let mut form = Self::default();
        form.accumulate(term, 1);
        form
    }

    /// Adds `scale · term` into the form.
    fn accumulate(&mut self, term: &Term, scale: u8) {
        match term.data() {
            TermData::Constant(value) => {
                self.constant = self.constant.wrapping_add(value.wrapping_mul(scale));
            }
            TermData::Variable(name) => {
                let coefficient = self.coefficients.entry(name.clone()).or_insert(0);
                *coefficient = coefficient.wrapping_add(scale);
                if *coefficient == 0 {
                    self.coefficients.remove(name);
                }
            }
            TermData::Add { left, right } => {
                self.accumulate(left, scale);
                self.accumulate(right, scale);
            }
            TermData::Sub { left, right } => {
                self.accumulate(left, scale);
                self.accumulate(right, scale.wrapping_neg());
            }
        }
    }

    /// Gets the constant offset of the form.
    #[must_use]
    pub fn constant(&self) -> u8 {
        self.constant
    }

    /// Gets the coefficients of the form, ordered by variable name.
    #[must_use]
    pub fn coefficients(&self) -> &BTreeMap<Rc<str>, u8> {
        &self.coefficients
    }

    /// Checks whether the form has no variables.
    #[must_use]
    pub fn is_constant(&self) -> bool {
        self.coefficients.is_empty()
    }

    /// Gets the only variable of the form and its coefficient, if the form has
    /// exactly one variable.
    #[must_use]
    pub fn single_variable(&self) -> Option<(&Rc<str>, u8)> {
        let mut iter = self.coefficients.iter();
        let (name, coefficient) = iter.next()?;
        iter.next().is_none().then_some((name, *coefficient))
    }

    /// Rebuilds a canonical [`Term`] from the form.
    ///
    /// Coefficients above 128 are written as repeated subtraction, so that
    /// `x + 255` is rendered as `x - 1`.
    #[must_use]
    pub fn to_term(&self) -> Term {
        let mut result: Option<Term> = None;

        for (name, coefficient) in &self.coefficients {
            let variable = Term::variable(name.clone());
            if *coefficient <= 128 {
                for _ in 0..*coefficient {
                    result = Some(match result {
                        Some(acc) => acc.add(&variable),
                        None => variable.clone(),
                    });
                }
            } else {
                for _ in 0..coefficient.wrapping_neg() {
                    let acc = result.unwrap_or_else(|| Term::constant(0));
                    result = Some(acc.sub(&variable));
                }
            }
        }

        match result {
            None => Term::constant(self.constant),
            Some(acc) if self.constant == 0 => acc,
            Some(acc) if self.constant <= 128 => acc.add(&Term::constant(self.constant)),
            Some(acc) => acc.sub(&Term::constant(self.constant.wrapping_neg())),
        }
    }
}
