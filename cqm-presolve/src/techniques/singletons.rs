//! Empty and single-variable constraint elimination.

use cqm_core::Sense;

use crate::error::{PresolveError, PresolveResult};
use crate::view::ModelView;

/// Remove every non-soft constraint with zero or one variable, folding
/// single-variable rows into the variable's bounds.
///
/// An empty constraint that cannot hold is infeasible. Empty constraints
/// are removed whether soft or not; soft single-variable constraints are
/// left in place.
pub(crate) fn remove_single_variable_constraints(model: &mut ModelView) -> PresolveResult<bool> {
    let mut changes = false;
    let mut c = 0;
    while c < model.num_constraints() {
        let num_variables = model.constraint_ref(c).num_variables();

        if num_variables == 0 {
            {
                let constraint = model.constraint_ref(c);
                if !constraint.is_soft() {
                    let offset = constraint.offset();
                    let rhs = constraint.rhs();
                    let holds = match constraint.sense() {
                        Sense::Eq => offset == rhs,
                        Sense::Le => offset <= rhs,
                        Sense::Ge => offset >= rhs,
                    };
                    if !holds {
                        return Err(PresolveError::Infeasible);
                    }
                }
            }
            model.remove_constraint(c);
            changes = true;
            continue;
        }

        if num_variables == 1 && !model.constraint_ref(c).is_soft() {
            let constraint = model.constraint_ref(c);
            let v = constraint
                .variables()
                .next()
                .expect("constraint has exactly one variable");
            let a = constraint.linear(v);
            debug_assert!(a != 0.0, "zero biases are removed before this point");

            // a * v ◯ rhs, so the bound moves to (rhs - offset) / a
            let target = (constraint.rhs() - constraint.offset()) / a;
            let sense = constraint.sense();

            if sense == Sense::Eq {
                let lb = model.lower_bound(v).max(target);
                let ub = model.upper_bound(v).min(target);
                model.set_lower_bound(v, lb);
                model.set_upper_bound(v, ub);
            } else if (sense == Sense::Le) != (a < 0.0) {
                let ub = model.upper_bound(v).min(target);
                model.set_upper_bound(v, ub);
            } else {
                let lb = model.lower_bound(v).max(target);
                model.set_lower_bound(v, lb);
            }

            model.remove_constraint(c);
            changes = true;
            continue;
        }

        c += 1;
    }
    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cqm_core::{ConstrainedQuadraticModel, Constraint, Vartype};

    fn empty_constraint(offset: f64, sense: Sense, rhs: f64) -> Constraint {
        let mut c = Constraint::new();
        c.set_offset(offset);
        c.set_sense(sense);
        c.set_rhs(rhs);
        c
    }

    #[test]
    fn test_empty_feasible_removed() {
        let mut cqm = ConstrainedQuadraticModel::new();
        cqm.add_constraint(empty_constraint(1.0, Sense::Eq, 1.0));
        cqm.add_constraint(empty_constraint(0.0, Sense::Le, 1.0));
        cqm.add_constraint(empty_constraint(2.0, Sense::Ge, 1.0));

        let mut view = ModelView::new(cqm);
        assert!(remove_single_variable_constraints(&mut view).unwrap());
        assert_eq!(view.num_constraints(), 0);
    }

    #[test]
    fn test_empty_infeasible() {
        let mut cqm = ConstrainedQuadraticModel::new();
        cqm.add_constraint(empty_constraint(2.0, Sense::Le, 1.0));

        let mut view = ModelView::new(cqm);
        let err = remove_single_variable_constraints(&mut view).unwrap_err();
        assert_eq!(err.to_string(), "infeasible");
    }

    #[test]
    fn test_empty_soft_violation_removed_silently() {
        let mut cqm = ConstrainedQuadraticModel::new();
        let mut c = empty_constraint(2.0, Sense::Le, 1.0);
        c.set_soft(true);
        cqm.add_constraint(c);

        let mut view = ModelView::new(cqm);
        assert!(remove_single_variable_constraints(&mut view).unwrap());
        assert_eq!(view.num_constraints(), 0);
    }

    #[test]
    fn test_equality_pins_bounds() {
        // 2x = 6 with x integer in [0, 10]
        let mut cqm = ConstrainedQuadraticModel::new();
        let x = cqm.add_variable_with_bounds(Vartype::Integer, 0.0, 10.0);
        cqm.add_linear_constraint(&[x], &[2.0], Sense::Eq, 6.0);

        let mut view = ModelView::new(cqm);
        assert!(remove_single_variable_constraints(&mut view).unwrap());

        assert_eq!(view.num_constraints(), 0);
        assert_eq!(view.lower_bound(x), 3.0);
        assert_eq!(view.upper_bound(x), 3.0);
    }

    #[test]
    fn test_le_sign_dispatch() {
        // 2x <= 6 tightens the upper bound; -2y <= -6 tightens the lower
        let mut cqm = ConstrainedQuadraticModel::new();
        let x = cqm.add_variable_with_bounds(Vartype::Real, 0.0, 10.0);
        let y = cqm.add_variable_with_bounds(Vartype::Real, 0.0, 10.0);
        cqm.add_linear_constraint(&[x], &[2.0], Sense::Le, 6.0);
        cqm.add_linear_constraint(&[y], &[-2.0], Sense::Le, -6.0);

        let mut view = ModelView::new(cqm);
        assert!(remove_single_variable_constraints(&mut view).unwrap());

        assert_eq!(view.upper_bound(x), 3.0);
        assert_eq!(view.lower_bound(x), 0.0);
        assert_eq!(view.lower_bound(y), 3.0);
        assert_eq!(view.upper_bound(y), 10.0);
    }

    #[test]
    fn test_ge_sign_dispatch() {
        // un-normalized senses still dispatch on the sign of a
        let mut cqm = ConstrainedQuadraticModel::new();
        let x = cqm.add_variable_with_bounds(Vartype::Real, 0.0, 10.0);
        let y = cqm.add_variable_with_bounds(Vartype::Real, 0.0, 10.0);
        cqm.add_linear_constraint(&[x], &[2.0], Sense::Ge, 6.0);
        cqm.add_linear_constraint(&[y], &[-2.0], Sense::Ge, -6.0);

        let mut view = ModelView::new(cqm);
        assert!(remove_single_variable_constraints(&mut view).unwrap());

        assert_eq!(view.lower_bound(x), 3.0);
        assert_eq!(view.upper_bound(y), 3.0);
    }

    #[test]
    fn test_soft_single_variable_kept() {
        let mut cqm = ConstrainedQuadraticModel::new();
        let x = cqm.add_variable_with_bounds(Vartype::Real, 0.0, 10.0);
        cqm.add_linear_constraint(&[x], &[2.0], Sense::Le, 6.0);
        cqm.constraint_mut(0).set_soft(true);

        let mut view = ModelView::new(cqm);
        assert!(!remove_single_variable_constraints(&mut view).unwrap());
        assert_eq!(view.num_constraints(), 1);
        assert_eq!(view.upper_bound(x), 10.0);
    }
}
