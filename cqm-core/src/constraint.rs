//! Constraints: an expression related to a right-hand side.

use std::ops::{Deref, DerefMut};

use crate::{Expression, Vartype};

/// Relation between a constraint's expression and its right-hand side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    /// Equality.
    Eq,
    /// Less than or equal.
    Le,
    /// Greater than or equal.
    Ge,
}

/// A constraint: a quadratic expression, a sense, and a right-hand side,
/// plus the soft and discrete markers.
///
/// Dereferences to its [`Expression`] for bias access.
#[derive(Debug, Clone)]
pub struct Constraint {
    expression: Expression,
    sense: Sense,
    rhs: f64,
    soft: bool,
    discrete: bool,
}

impl Default for Constraint {
    fn default() -> Self {
        Self {
            expression: Expression::new(),
            sense: Sense::Eq,
            rhs: 0.0,
            soft: false,
            discrete: false,
        }
    }
}

impl Constraint {
    /// An empty equality constraint with zero right-hand side.
    pub fn new() -> Self {
        Self::default()
    }

    /// The constraint's sense.
    pub fn sense(&self) -> Sense {
        self.sense
    }

    /// Set the constraint's sense.
    pub fn set_sense(&mut self, sense: Sense) {
        self.sense = sense;
    }

    /// The right-hand side.
    pub fn rhs(&self) -> f64 {
        self.rhs
    }

    /// Set the right-hand side.
    pub fn set_rhs(&mut self, rhs: f64) {
        self.rhs = rhs;
    }

    /// Whether violations of this constraint are allowed.
    pub fn is_soft(&self) -> bool {
        self.soft
    }

    /// Mark or unmark the constraint as soft.
    pub fn set_soft(&mut self, soft: bool) {
        self.soft = soft;
    }

    /// Whether the constraint carries the discrete (one-hot group) marker.
    pub fn marked_discrete(&self) -> bool {
        self.discrete
    }

    /// Set or clear the discrete marker.
    pub fn mark_discrete(&mut self, discrete: bool) {
        self.discrete = discrete;
    }

    /// Multiply every bias, the offset, and the right-hand side by `factor`.
    ///
    /// Scaling by a negative factor does not touch the sense; the caller
    /// decides whether the relation flips.
    pub fn scale(&mut self, factor: f64) {
        self.expression.scale(factor);
        self.rhs *= factor;
    }

    /// Whether the constraint is a one-hot group: `sum x_i = 1` over one or
    /// more binary variables, all with unit biases.
    pub fn is_onehot(&self, vartypes: &[Vartype]) -> bool {
        if self.sense != Sense::Eq || !self.expression.is_linear() {
            return false;
        }
        if self.expression.num_variables() == 0 {
            return false;
        }
        if self.rhs - self.expression.offset() != 1.0 {
            return false;
        }
        self.expression.variables().all(|v| {
            vartypes.get(v) == Some(&Vartype::Binary) && self.expression.linear(v) == 1.0
        })
    }

    /// Whether any variable appears in both constraints.
    pub fn shares_variables(&self, other: &Constraint) -> bool {
        self.expression.variables().any(|v| other.contains(v))
    }
}

impl Deref for Constraint {
    type Target = Expression;

    fn deref(&self) -> &Expression {
        &self.expression
    }
}

impl DerefMut for Constraint {
    fn deref_mut(&mut self) -> &mut Expression {
        &mut self.expression
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn onehot_over(n: usize) -> Constraint {
        let mut c = Constraint::new();
        for v in 0..n {
            c.set_linear(v, 1.0);
        }
        c.set_sense(Sense::Eq);
        c.set_rhs(1.0);
        c
    }

    #[test]
    fn test_scale_covers_rhs() {
        let mut c = Constraint::new();
        c.set_linear(0, 1.0);
        c.set_linear(1, 1.0);
        c.set_sense(Sense::Ge);
        c.set_rhs(1.0);

        c.scale(-1.0);

        assert_eq!(c.linear(0), -1.0);
        assert_eq!(c.linear(1), -1.0);
        assert_eq!(c.rhs(), -1.0);
        // sense is the caller's business
        assert_eq!(c.sense(), Sense::Ge);
    }

    #[test]
    fn test_is_onehot() {
        let vartypes = vec![Vartype::Binary; 3];
        assert!(onehot_over(3).is_onehot(&vartypes));

        // wrong rhs
        let mut c = onehot_over(3);
        c.set_rhs(2.0);
        assert!(!c.is_onehot(&vartypes));

        // wrong sense
        let mut c = onehot_over(3);
        c.set_sense(Sense::Le);
        assert!(!c.is_onehot(&vartypes));

        // non-unit bias
        let mut c = onehot_over(3);
        c.set_linear(1, 2.0);
        assert!(!c.is_onehot(&vartypes));

        // quadratic term
        let mut c = onehot_over(3);
        c.add_quadratic(0, 1, 1.0);
        assert!(!c.is_onehot(&vartypes));

        // non-binary participant
        let mixed = vec![Vartype::Binary, Vartype::Integer, Vartype::Binary];
        assert!(!onehot_over(3).is_onehot(&mixed));

        // empty
        let mut c = Constraint::new();
        c.set_rhs(1.0);
        assert!(!c.is_onehot(&vartypes));
    }

    #[test]
    fn test_shares_variables() {
        let a = onehot_over(2);
        let mut b = Constraint::new();
        b.set_linear(1, 1.0);
        let mut d = Constraint::new();
        d.set_linear(5, 1.0);

        assert!(a.shares_variables(&b));
        assert!(!a.shares_variables(&d));
    }
}
