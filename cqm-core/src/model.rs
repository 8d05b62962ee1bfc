//! The constrained quadratic model.

use crate::{Constraint, Expression, Sense, Vartype};

/// A quadratic objective plus an ordered list of quadratic constraints over
/// a shared table of mixed-type variables.
///
/// Variables are dense nonnegative indices into the table; removing one
/// renumbers everything above it down by one, in the objective and in every
/// constraint.
#[derive(Debug, Clone, Default)]
pub struct ConstrainedQuadraticModel {
    vartypes: Vec<Vartype>,
    lower: Vec<f64>,
    upper: Vec<f64>,
    /// The objective expression.
    pub objective: Expression,
    constraints: Vec<Constraint>,
}

impl ConstrainedQuadraticModel {
    /// An empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of variables.
    pub fn num_variables(&self) -> usize {
        self.vartypes.len()
    }

    /// Append a variable with the vartype's default bounds.
    pub fn add_variable(&mut self, vartype: Vartype) -> usize {
        let (lb, ub) = vartype.default_bounds();
        self.add_variable_with_bounds(vartype, lb, ub)
    }

    /// Append a variable with explicit bounds.
    ///
    /// Spin and binary variables must carry their canonical bounds.
    pub fn add_variable_with_bounds(&mut self, vartype: Vartype, lb: f64, ub: f64) -> usize {
        assert!(lb <= ub, "lower bound must not exceed upper bound");
        match vartype {
            Vartype::Spin => assert!(
                lb == -1.0 && ub == 1.0,
                "spin variables have bounds (-1, 1)"
            ),
            Vartype::Binary => assert!(
                lb == 0.0 && ub == 1.0,
                "binary variables have bounds (0, 1)"
            ),
            Vartype::Integer | Vartype::Real => {}
        }
        self.vartypes.push(vartype);
        self.lower.push(lb);
        self.upper.push(ub);
        self.vartypes.len() - 1
    }

    /// The vartype of `v`.
    pub fn vartype(&self, v: usize) -> Vartype {
        self.vartypes[v]
    }

    /// The full vartype table, indexed by variable.
    pub fn vartypes(&self) -> &[Vartype] {
        &self.vartypes
    }

    /// The lower bound of `v`.
    pub fn lower_bound(&self, v: usize) -> f64 {
        self.lower[v]
    }

    /// The upper bound of `v`.
    pub fn upper_bound(&self, v: usize) -> f64 {
        self.upper[v]
    }

    /// Set the lower bound of `v`.
    pub fn set_lower_bound(&mut self, v: usize, lb: f64) {
        self.lower[v] = lb;
    }

    /// Set the upper bound of `v`.
    pub fn set_upper_bound(&mut self, v: usize, ub: f64) {
        self.upper[v] = ub;
    }

    /// Change the vartype of `v`, rewriting biases so that every assignment
    /// keeps its meaning under the new encoding.
    ///
    /// Only the spin-to-binary rewrite (`s = 2x - 1`) is supported; a
    /// same-type change is a no-op.
    pub fn change_vartype(&mut self, vartype: Vartype, v: usize) {
        let from = self.vartypes[v];
        if from == vartype {
            return;
        }
        assert!(
            from == Vartype::Spin && vartype == Vartype::Binary,
            "unsupported vartype change"
        );
        self.objective.substitute_spin(v);
        for constraint in &mut self.constraints {
            constraint.substitute_spin(v);
        }
        self.vartypes[v] = Vartype::Binary;
        self.lower[v] = 0.0;
        self.upper[v] = 1.0;
    }

    /// Pin `v` to `value`: fold the value into every expression, remove the
    /// variable, and renumber the tail down by one.
    ///
    /// For constraints the folded constant lands on the right-hand side, so
    /// a zero-offset constraint stays zero-offset.
    pub fn fix_variable(&mut self, v: usize, value: f64) {
        assert!(v < self.num_variables(), "no such variable");

        self.objective.substitute_fixed(v, value);
        self.objective.shift_indices_above(v);

        for constraint in &mut self.constraints {
            constraint.substitute_fixed(v, value);
            let folded = constraint.offset();
            if folded != 0.0 {
                let rhs = constraint.rhs() - folded;
                constraint.set_rhs(rhs);
                constraint.set_offset(0.0);
            }
            constraint.shift_indices_above(v);
        }

        self.vartypes.remove(v);
        self.lower.remove(v);
        self.upper.remove(v);
    }

    /// Number of constraints.
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// The constraints, in index order.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Mutable access to the constraints.
    pub fn constraints_mut(&mut self) -> &mut [Constraint] {
        &mut self.constraints
    }

    /// The constraint at index `c`.
    pub fn constraint_ref(&self, c: usize) -> &Constraint {
        &self.constraints[c]
    }

    /// Mutable access to the constraint at index `c`.
    pub fn constraint_mut(&mut self, c: usize) -> &mut Constraint {
        &mut self.constraints[c]
    }

    /// An empty constraint, ready to be filled and added.
    pub fn new_constraint(&self) -> Constraint {
        Constraint::new()
    }

    /// Append a constraint, returning its index.
    pub fn add_constraint(&mut self, constraint: Constraint) -> usize {
        self.constraints.push(constraint);
        self.constraints.len() - 1
    }

    /// Append the linear constraint `sum biases[i] * variables[i] ◯ rhs`.
    pub fn add_linear_constraint(
        &mut self,
        variables: &[usize],
        biases: &[f64],
        sense: Sense,
        rhs: f64,
    ) -> usize {
        assert_eq!(variables.len(), biases.len());
        let mut constraint = self.new_constraint();
        for (&v, &bias) in variables.iter().zip(biases) {
            assert!(v < self.num_variables(), "no such variable");
            constraint.add_linear(v, bias);
        }
        constraint.set_sense(sense);
        constraint.set_rhs(rhs);
        self.add_constraint(constraint)
    }

    /// Remove the constraint at index `c`; later constraints shift down.
    pub fn remove_constraint(&mut self, c: usize) {
        self.constraints.remove(c);
    }
}
