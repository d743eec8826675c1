//! This module contains the [`Value`] stored in each tape cell during symbolic
//! execution.

use std::{
    fmt::{Display, Formatter},
    rc::Rc,
};

use crate::expr::{Predicate, Term};

/// The contents of a tape cell: either a definite byte or a symbolic term over
/// the program's inputs.
///
/// # Concreteness
///
/// Arithmetic on a [`Value::Concrete`] always yields a [`Value::Concrete`],
/// and arithmetic on a [`Value::Symbolic`] always yields a
/// [`Value::Symbolic`]. The only way for a symbolic value to become concrete is
/// through [`Value::canonicalize`], which the tape applies on every write.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Value {
    /// A known byte.
    Concrete(u8),

    /// An unknown byte, described by a term over the inputs.
    Symbolic(Term),
}

/// The result of testing a [`Value`] for zero.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ZeroTest {
    /// The value is definitely zero.
    Zero,

    /// The value is definitely not zero.
    NonZero,

    /// The value depends on the inputs. The predicate holds exactly when the
    /// value is zero.
    Undetermined(Predicate),
}

impl Value {
    /// Constructs the concrete zero value that every cell starts out with.
    #[must_use]
    pub fn zero() -> Self {
        Self::Concrete(0)
    }

    /// Constructs a fresh symbolic value for the input called `name`.
    #[must_use]
    pub fn input(name: impl Into<Rc<str>>) -> Self {
        Self::Symbolic(Term::variable(name))
    }

    /// Adds `delta` to the value, wrapping modulo 256.
    #[must_use]
    pub fn add(&self, delta: u8) -> Self {
        match self {
            Self::Concrete(value) => Self::Concrete(value.wrapping_add(delta)),
            Self::Symbolic(term) => Self::Symbolic(term.add(&Term::constant(delta))),
        }
    }

    /// Subtracts `delta` from the value, wrapping modulo 256.
    #[must_use]
    pub fn sub(&self, delta: u8) -> Self {
        match self {
            Self::Concrete(value) => Self::Concrete(value.wrapping_sub(delta)),
            Self::Symbolic(term) => Self::Symbolic(term.sub(&Term::constant(delta))),
        }
    }

    /// Tests the value for zero.
    ///
    /// A symbolic value whose term simplifies to a constant is decided
    /// directly, so only genuinely input-dependent values are undetermined.
    #[must_use]
    pub fn is_zero(&self) -> ZeroTest {
        let value = match self {
            Self::Concrete(value) => *value,
            Self::Symbolic(term) => {
                let simplified = term.simplify();
                match simplified.as_constant() {
                    Some(value) => value,
                    None => return ZeroTest::Undetermined(simplified.is_zero()),
                }
            }
        };

        if value == 0 {
            ZeroTest::Zero
        } else {
            ZeroTest::NonZero
        }
    }

    /// Simplifies the value, turning a symbolic value whose term folds to a
    /// literal into a concrete value.
    #[must_use]
    pub fn canonicalize(self) -> Self {
        match self {
            Self::Concrete(_) => self,
            Self::Symbolic(term) => {
                let simplified = term.simplify();
                match simplified.as_constant() {
                    Some(value) => Self::Concrete(value),
                    None => Self::Symbolic(simplified),
                }
            }
        }
    }

    /// Gets the byte if the value is concrete.
    #[must_use]
    pub fn as_concrete(&self) -> Option<u8> {
        match self {
            Self::Concrete(value) => Some(*value),
            Self::Symbolic(_) => None,
        }
    }

    /// Checks if the value depends on the inputs.
    #[must_use]
    pub fn is_symbolic(&self) -> bool {
        matches!(self, Self::Symbolic(_))
    }

    /// Gets the value as a term, lifting concrete bytes to constants.
    #[must_use]
    pub fn to_term(&self) -> Term {
        match self {
            Self::Concrete(value) => Term::constant(*value),
            Self::Symbolic(term) => term.clone(),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<u8> for Value {
    fn from(value: u8) -> Self {
        Self::Concrete(value)
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Concrete(value) => write!(f, "{value}"),
            Self::Symbolic(term) => write!(f, "{{{term}}}"),
        }
    }
}

#[cfg(test)]
mod test {
    use crate::{
        engine::value::{Value, ZeroTest},
        expr::Term,
    };

    #[test]
    fn concrete_arithmetic_wraps() {
        assert_eq!(Value::Concrete(255).add(1), Value::Concrete(0));
        assert_eq!(Value::zero().sub(1), Value::Concrete(255));
    }

    #[test]
    fn symbolic_arithmetic_stays_symbolic() {
        let value = Value::input("input_0").add(1).sub(1);
        assert!(value.is_symbolic());
        assert_eq!(value.as_concrete(), None);
    }

    #[test]
    fn canonicalization_folds_to_concrete() {
        let x = Term::variable("input_0");
        let folded = Value::Symbolic(x.sub(&x).add(&Term::constant(9))).canonicalize();
        assert_eq!(folded, Value::Concrete(9));

        let kept = Value::input("input_0").add(2).sub(1).canonicalize();
        assert_eq!(kept, Value::Symbolic(x.add(&Term::constant(1))));
    }

    #[test]
    fn zero_tests_are_definite_for_concrete_values() {
        assert_eq!(Value::zero().is_zero(), ZeroTest::Zero);
        assert_eq!(Value::Concrete(3).is_zero(), ZeroTest::NonZero);
    }

    #[test]
    fn zero_tests_yield_predicates_for_symbolic_values() {
        let test = Value::input("input_0").sub(1).is_zero();
        let ZeroTest::Undetermined(predicate) = test else {
            panic!("Symbolic value had a definite zero test");
        };
        assert_eq!(predicate.to_string(), "input_0 - 1 == 0");
    }

    #[test]
    fn displays_symbolic_values_in_braces() {
        assert_eq!(Value::Concrete(7).to_string(), "7");
        assert_eq!(Value::input("input_3").to_string(), "{input_3}");
    }
}
