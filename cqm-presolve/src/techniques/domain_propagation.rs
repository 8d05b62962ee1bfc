//! Activity-based domain propagation on linear constraints.

use cqm_core::{Sense, Vartype};

use crate::error::{PresolveError, PresolveResult};
use crate::view::ModelView;
use crate::FEASIBILITY_TOLERANCE;

const INF: f64 = cqm_core::MAX_BOUND;
const NEW_BOUND_MAX: f64 = 1.0e8;
const MIN_CHANGE_FOR_BOUND_UPDATE: f64 = 1.0e-3;

/// Tighten variable bounds from the achievable activity of each linear,
/// non-soft constraint.
///
/// For each non-binary variable, the constraint's min/max activity over the
/// other variables bounds what the variable itself may contribute. A
/// candidate bound far outside the current box in the shrinking direction
/// proves infeasibility; a candidate strictly inside tightens the box.
pub(crate) fn domain_propagation(model: &mut ModelView) -> PresolveResult<bool> {
    let mut changes = false;
    for c in 0..model.num_constraints() {
        changes |= propagate_constraint(model, c)?;
    }
    Ok(changes)
}

fn propagate_constraint(model: &mut ModelView, c: usize) -> PresolveResult<bool> {
    {
        let constraint = model.constraint_ref(c);
        if !constraint.is_linear() || constraint.is_soft() {
            return Ok(false);
        }
    }

    let variables: Vec<usize> = model.constraint_ref(c).variables().collect();
    // equality rows propagate in both directions
    let equality = model.constraint_ref(c).sense() == Sense::Eq;
    let mut changed = false;

    for &v in &variables {
        if model.vartype(v) == Vartype::Binary {
            continue;
        }

        let (minac, maxac) = activity_bounds(model, c, v);
        let constraint = model.constraint_ref(c);
        let a = constraint.linear(v);
        let rhs = constraint.rhs();
        let lb = model.lower_bound(v);
        let ub = model.upper_bound(v);

        // candidate bounds; pnb2 only matters for equality rows
        let pnb1 = (rhs - minac) / a;
        let pnb2 = (rhs - maxac) / a;
        if pnb1.abs() > NEW_BOUND_MAX {
            continue;
        }
        if equality && pnb2.abs() > NEW_BOUND_MAX {
            continue;
        }

        let min_change = MIN_CHANGE_FOR_BOUND_UPDATE * FEASIBILITY_TOLERANCE;

        if a > 0.0 {
            if minac > -INF && rhs < INF && ub - pnb1 > min_change {
                if pnb1 > lb && pnb1 < ub {
                    model.set_upper_bound(v, pnb1);
                    changed = true;
                } else if pnb1 < lb {
                    return Err(PresolveError::Infeasible);
                }
            }
            if equality && maxac < INF && rhs > -INF && pnb2 - lb > min_change {
                if pnb2 > lb && pnb2 < ub {
                    model.set_lower_bound(v, pnb2);
                    changed = true;
                } else if pnb2 > ub {
                    return Err(PresolveError::Infeasible);
                }
            }
        }
        if a < 0.0 {
            if minac > -INF && rhs < INF && pnb1 - lb > min_change {
                if pnb1 > lb && pnb1 < ub {
                    model.set_lower_bound(v, pnb1);
                    changed = true;
                } else if pnb1 > ub {
                    return Err(PresolveError::Infeasible);
                }
            }
            if equality && maxac < INF && rhs > -INF && ub - pnb2 > min_change {
                if pnb2 > lb && pnb2 < ub {
                    model.set_upper_bound(v, pnb2);
                    changed = true;
                } else if pnb2 < lb {
                    return Err(PresolveError::Infeasible);
                }
            }
        }
    }

    Ok(changed)
}

/// Min and max achievable activity of constraint `c`, excluding `exclude`,
/// clamped to the sentinel when any contributing bound is unbounded.
fn activity_bounds(model: &ModelView, c: usize, exclude: usize) -> (f64, f64) {
    let constraint = model.constraint_ref(c);
    let mut minac = 0.0;
    let mut maxac = 0.0;
    for v in constraint.variables() {
        if v == exclude {
            continue;
        }
        let a = constraint.linear(v);
        let lb = model.lower_bound(v);
        let ub = model.upper_bound(v);

        if a > 0.0 {
            if lb > -INF {
                minac += a * lb;
            } else {
                minac = -INF;
            }
            if ub < INF {
                maxac += a * ub;
            } else {
                maxac = INF;
            }
        } else {
            if ub < INF {
                minac += a * ub;
            } else {
                minac = -INF;
            }
            if lb > -INF {
                maxac += a * lb;
            } else {
                maxac = INF;
            }
        }
    }
    (minac, maxac)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cqm_core::ConstrainedQuadraticModel;

    #[test]
    fn test_le_row_tightens_upper_bound() {
        // x + y <= 10, y in [2, 5]  =>  x <= 8
        let mut cqm = ConstrainedQuadraticModel::new();
        let x = cqm.add_variable_with_bounds(Vartype::Integer, 0.0, 100.0);
        let y = cqm.add_variable_with_bounds(Vartype::Integer, 2.0, 5.0);
        cqm.add_linear_constraint(&[x, y], &[1.0, 1.0], Sense::Le, 10.0);

        let mut view = ModelView::new(cqm);
        assert!(domain_propagation(&mut view).unwrap());

        assert_eq!(view.upper_bound(x), 8.0);
        assert_eq!(view.lower_bound(x), 0.0);
        // y also tightens: y <= 10 - 0 = 10 is weaker than 5, so untouched
        assert_eq!(view.upper_bound(y), 5.0);
    }

    #[test]
    fn test_equality_row_tightens_both_sides() {
        // x + y = 10, y in [2, 5]  =>  x in [5, 8]
        let mut cqm = ConstrainedQuadraticModel::new();
        let x = cqm.add_variable_with_bounds(Vartype::Integer, 0.0, 100.0);
        let _y = cqm.add_variable_with_bounds(Vartype::Integer, 2.0, 5.0);
        cqm.add_linear_constraint(&[0, 1], &[1.0, 1.0], Sense::Eq, 10.0);

        let mut view = ModelView::new(cqm);
        assert!(domain_propagation(&mut view).unwrap());

        assert_eq!(view.upper_bound(x), 8.0);
        assert_eq!(view.lower_bound(x), 5.0);
    }

    #[test]
    fn test_negative_coefficient_tightens_lower_bound() {
        // -x + y <= 0, y in [2, 5]  =>  x >= 2
        let mut cqm = ConstrainedQuadraticModel::new();
        let x = cqm.add_variable_with_bounds(Vartype::Integer, 0.0, 100.0);
        let y = cqm.add_variable_with_bounds(Vartype::Integer, 2.0, 5.0);
        cqm.add_linear_constraint(&[x, y], &[-1.0, 1.0], Sense::Le, 0.0);

        let mut view = ModelView::new(cqm);
        assert!(domain_propagation(&mut view).unwrap());

        assert_eq!(view.lower_bound(x), 2.0);
        assert_eq!(view.upper_bound(x), 100.0);
    }

    #[test]
    fn test_binary_variables_skipped() {
        let mut cqm = ConstrainedQuadraticModel::new();
        let x = cqm.add_variable(Vartype::Binary);
        let y = cqm.add_variable(Vartype::Binary);
        cqm.add_linear_constraint(&[x, y], &[1.0, 1.0], Sense::Le, 1.0);

        let mut view = ModelView::new(cqm);
        assert!(!domain_propagation(&mut view).unwrap());
    }

    #[test]
    fn test_soft_and_quadratic_rows_skipped() {
        let mut cqm = ConstrainedQuadraticModel::new();
        let x = cqm.add_variable_with_bounds(Vartype::Integer, 0.0, 100.0);
        let y = cqm.add_variable_with_bounds(Vartype::Integer, 2.0, 5.0);
        cqm.add_linear_constraint(&[x, y], &[1.0, 1.0], Sense::Le, 10.0);
        cqm.constraint_mut(0).set_soft(true);

        let mut c = cqm.new_constraint();
        c.set_linear(x, 1.0);
        c.add_quadratic(x, y, 1.0);
        c.set_sense(Sense::Le);
        c.set_rhs(10.0);
        cqm.add_constraint(c);

        let mut view = ModelView::new(cqm);
        assert!(!domain_propagation(&mut view).unwrap());
        assert_eq!(view.upper_bound(x), 100.0);
    }

    #[test]
    fn test_huge_candidate_skipped() {
        // y's enormous range makes the candidate bound meaningless
        let mut cqm = ConstrainedQuadraticModel::new();
        let x = cqm.add_variable_with_bounds(Vartype::Integer, 0.0, 100.0);
        let y = cqm.add_variable_with_bounds(Vartype::Integer, -1.0e9, 0.0);
        cqm.add_linear_constraint(&[x, y], &[1.0, 1.0], Sense::Le, 10.0);

        let mut view = ModelView::new(cqm);
        assert!(!domain_propagation(&mut view).unwrap());
        assert_eq!(view.upper_bound(x), 100.0);
    }

    #[test]
    fn test_detects_infeasibility() {
        // x + y <= 3 with y >= 10 forces x <= -7, far below lb = 0
        let mut cqm = ConstrainedQuadraticModel::new();
        let _x = cqm.add_variable_with_bounds(Vartype::Integer, 0.0, 100.0);
        let _y = cqm.add_variable_with_bounds(Vartype::Integer, 10.0, 20.0);
        cqm.add_linear_constraint(&[0, 1], &[1.0, 1.0], Sense::Le, 3.0);

        let mut view = ModelView::new(cqm);
        let err = domain_propagation(&mut view).unwrap_err();
        assert_eq!(err.to_string(), "infeasible");
    }
}
