//! Small-bias removal on linear constraints.

use crate::view::ModelView;
use crate::FEASIBILITY_TOLERANCE;

const CONDITIONAL_REMOVAL_BIAS_LIMIT: f64 = 1.0e-3;
const CONDITIONAL_REMOVAL_LIMIT: f64 = 1.0e-2;
const UNCONDITIONAL_REMOVAL_BIAS_LIMIT: f64 = 1.0e-10;
const SUM_REDUCTION_LIMIT: f64 = 1.0e-1;

/// Drop negligibly small linear biases from every linear constraint.
///
/// Truly tiny biases go unconditionally. Small-but-not-tiny biases are only
/// dropped as a batch when their combined reach stays well inside the
/// feasibility tolerance; the batch's contribution at the lower bounds is
/// folded into the right-hand side. Quadratic constraints are skipped.
pub(crate) fn remove_small_biases(model: &mut ModelView) -> bool {
    let mut changes = false;
    for c in 0..model.num_constraints() {
        changes |= scrub_constraint(model, c);
    }
    changes
}

fn scrub_constraint(model: &mut ModelView, c: usize) -> bool {
    let mut removals: Vec<usize> = Vec::new();
    let mut conditional: Vec<usize> = Vec::new();
    let mut reduction = 0.0;
    let mut reduction_magnitude = 0.0;

    {
        let constraint = model.constraint_ref(c);
        if !constraint.is_linear() {
            return false;
        }
        let n = constraint.num_variables() as f64;
        for v in constraint.variables() {
            let a = constraint.linear(v);
            let lb = model.lower_bound(v);
            let ub = model.upper_bound(v);
            let range = ub - lb;
            if a.abs() < CONDITIONAL_REMOVAL_BIAS_LIMIT
                && a.abs() * range * n < CONDITIONAL_REMOVAL_LIMIT * FEASIBILITY_TOLERANCE
            {
                conditional.push(v);
                reduction += a * lb;
                reduction_magnitude += a.abs() * range;
            }
            if a.abs() < UNCONDITIONAL_REMOVAL_BIAS_LIMIT {
                removals.push(v);
            }
        }
    }

    if reduction_magnitude < SUM_REDUCTION_LIMIT * FEASIBILITY_TOLERANCE {
        let constraint = model.constraint_mut(c);
        let rhs = constraint.rhs() - reduction;
        constraint.set_rhs(rhs);
        removals.extend(conditional);
    }

    let changed = !removals.is_empty();
    let constraint = model.constraint_mut(c);
    for v in removals {
        constraint.remove_variable(v);
    }
    changed
}
