//! Constrained quadratic model (CQM) data structures.
//!
//! A CQM is a quadratic objective together with a list of quadratic
//! constraints over a shared table of mixed-type variables:
//!
//! ```text
//! minimize    E_0(x)
//! subject to  E_c(x) ◯_c rhs_c    for each constraint c, ◯ ∈ {=, ≤, ≥}
//! ```
//!
//! where each `E` is a polynomial with linear biases, quadratic biases and a
//! scalar offset, and each variable is `Spin`, `Binary`, `Integer`, or
//! `Real` with a pair of bounds.
//!
//! # Example
//!
//! ```
//! use cqm_core::{ConstrainedQuadraticModel, Sense, Vartype};
//!
//! // max-flow toy: x + y >= 1 over binaries, minimize x + 2y
//! let mut cqm = ConstrainedQuadraticModel::new();
//! let x = cqm.add_variable(Vartype::Binary);
//! let y = cqm.add_variable(Vartype::Binary);
//! cqm.objective.set_linear(x, 1.0);
//! cqm.objective.set_linear(y, 2.0);
//! cqm.add_linear_constraint(&[x, y], &[1.0, 1.0], Sense::Ge, 1.0);
//!
//! assert_eq!(cqm.num_variables(), 2);
//! assert_eq!(cqm.num_constraints(), 1);
//! ```

#![warn(clippy::all)]

mod constraint;
mod expression;
mod model;
mod vartype;

pub use constraint::{Constraint, Sense};
pub use expression::Expression;
pub use model::ConstrainedQuadraticModel;
pub use vartype::{Vartype, MAX_BOUND};
