//! Vartype-driven bound tightening.

use crate::error::{PresolveError, PresolveResult};
use crate::view::ModelView;

/// Snap the bounds of integral variables to integers: the upper bound
/// floors, the lower bound ceils. Real variables are untouched.
///
/// Snapping can invert a box (e.g. bounds pinned to 3.5 become (4, 3));
/// that makes the variable, and so the model, infeasible.
pub(crate) fn tighten_bounds(model: &mut ModelView) -> PresolveResult<bool> {
    let mut changes = false;
    for v in 0..model.num_variables() {
        if !model.vartype(v).is_integral() {
            continue;
        }

        let ub = model.upper_bound(v);
        if ub != ub.floor() {
            model.set_upper_bound(v, ub.floor());
            changes = true;
        }
        let lb = model.lower_bound(v);
        if lb != lb.ceil() {
            model.set_lower_bound(v, lb.ceil());
            changes = true;
        }

        if model.lower_bound(v) > model.upper_bound(v) {
            return Err(PresolveError::Infeasible);
        }
    }
    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cqm_core::{ConstrainedQuadraticModel, Vartype};

    #[test]
    fn test_snaps_integer_bounds() {
        let mut cqm = ConstrainedQuadraticModel::new();
        let x = cqm.add_variable_with_bounds(Vartype::Integer, 0.5, 9.5);
        let r = cqm.add_variable_with_bounds(Vartype::Real, 0.5, 9.5);

        let mut view = ModelView::new(cqm);
        assert!(tighten_bounds(&mut view).unwrap());

        assert_eq!(view.lower_bound(x), 1.0);
        assert_eq!(view.upper_bound(x), 9.0);
        assert_eq!(view.lower_bound(r), 0.5);
        assert_eq!(view.upper_bound(r), 9.5);

        assert!(!tighten_bounds(&mut view).unwrap());
    }

    #[test]
    fn test_inverted_box_is_infeasible() {
        // bounds pinned to 3.5 snap to (4, 3)
        let mut cqm = ConstrainedQuadraticModel::new();
        let x = cqm.add_variable_with_bounds(Vartype::Integer, 0.0, 10.0);
        cqm.set_lower_bound(x, 3.5);
        cqm.set_upper_bound(x, 3.5);

        let mut view = ModelView::new(cqm);
        let err = tighten_bounds(&mut view).unwrap_err();
        assert_eq!(err.to_string(), "infeasible");
    }

    #[test]
    fn test_integral_bounds_untouched() {
        let mut cqm = ConstrainedQuadraticModel::new();
        cqm.add_variable(Vartype::Binary);
        cqm.add_variable_with_bounds(Vartype::Integer, -3.0, 7.0);

        let mut view = ModelView::new(cqm);
        assert!(!tighten_bounds(&mut view).unwrap());
    }
}
