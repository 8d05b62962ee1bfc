//! Tracked access to the model under presolve.

use cqm_core::{Constraint, ConstrainedQuadraticModel, Expression, Sense, Vartype};

use crate::error::{PresolveError, PresolveResult};
use crate::journal::{Transform, TransformLog};

/// Wraps the model so that every mutation which changes the mapping between
/// reduced and original assignments is journaled.
///
/// The wrapped model is a private field: normalization and reduction code
/// can only reach it through these methods, so the journal cannot fall out
/// of sync with the model. Bound edits, constraint add/remove, and in-place
/// expression edits pass through unjournaled; they do not move variables
/// between numberings.
#[derive(Debug, Default)]
pub(crate) struct ModelView {
    model: ConstrainedQuadraticModel,
    log: TransformLog,
}

impl ModelView {
    pub(crate) fn new(model: ConstrainedQuadraticModel) -> Self {
        Self {
            model,
            log: TransformLog::new(),
        }
    }

    // ----- read access, forwarded verbatim -----

    pub(crate) fn num_variables(&self) -> usize {
        self.model.num_variables()
    }

    pub(crate) fn num_constraints(&self) -> usize {
        self.model.num_constraints()
    }

    pub(crate) fn vartype(&self, v: usize) -> Vartype {
        self.model.vartype(v)
    }

    pub(crate) fn vartypes(&self) -> &[Vartype] {
        self.model.vartypes()
    }

    pub(crate) fn lower_bound(&self, v: usize) -> f64 {
        self.model.lower_bound(v)
    }

    pub(crate) fn upper_bound(&self, v: usize) -> f64 {
        self.model.upper_bound(v)
    }

    pub(crate) fn model(&self) -> &ConstrainedQuadraticModel {
        &self.model
    }

    // ----- untracked mutation, forwarded verbatim -----

    pub(crate) fn set_lower_bound(&mut self, v: usize, lb: f64) {
        self.model.set_lower_bound(v, lb);
    }

    pub(crate) fn set_upper_bound(&mut self, v: usize, ub: f64) {
        self.model.set_upper_bound(v, ub);
    }

    pub(crate) fn objective(&self) -> &Expression {
        &self.model.objective
    }

    pub(crate) fn objective_mut(&mut self) -> &mut Expression {
        &mut self.model.objective
    }

    pub(crate) fn constraints(&self) -> &[Constraint] {
        self.model.constraints()
    }

    pub(crate) fn constraints_mut(&mut self) -> &mut [Constraint] {
        self.model.constraints_mut()
    }

    pub(crate) fn constraint_ref(&self, c: usize) -> &Constraint {
        self.model.constraint_ref(c)
    }

    pub(crate) fn constraint_mut(&mut self, c: usize) -> &mut Constraint {
        self.model.constraint_mut(c)
    }

    pub(crate) fn add_linear_constraint(
        &mut self,
        variables: &[usize],
        biases: &[f64],
        sense: Sense,
        rhs: f64,
    ) -> usize {
        self.model.add_linear_constraint(variables, biases, sense, rhs)
    }

    pub(crate) fn remove_constraint(&mut self, c: usize) {
        self.model.remove_constraint(c);
    }

    // ----- journaled mutation -----

    /// Append a variable, journaling the addition.
    pub(crate) fn add_variable(&mut self, vartype: Vartype, lb: f64, ub: f64) -> usize {
        let v = self.model.add_variable_with_bounds(vartype, lb, ub);
        self.log.record(Transform::Add { v });
        v
    }

    /// Re-encode a variable, journaling the substitution.
    ///
    /// Only the spin-to-binary change is supported.
    pub(crate) fn change_vartype(&mut self, vartype: Vartype, v: usize) -> PresolveResult<()> {
        if self.model.vartype(v) == Vartype::Spin && vartype == Vartype::Binary {
            self.log.record(Transform::Substitute {
                v,
                multiplier: 2.0,
                offset: -1.0,
            });
            self.model.change_vartype(vartype, v);
            Ok(())
        } else {
            Err(PresolveError::Logic("unsupported vartype change".into()))
        }
    }

    /// Pin a variable and remove it, journaling the fix.
    pub(crate) fn fix_variable(&mut self, v: usize, value: f64) {
        self.model.fix_variable(v, value);
        self.log.record(Transform::Fix { v, value });
    }

    // ----- journal access -----

    /// Map a reduced-model assignment back to the original model.
    pub(crate) fn restore(&self, sample: Vec<f64>) -> Vec<f64> {
        self.log.restore(sample)
    }

    /// Take the model out, keeping the journal.
    pub(crate) fn detach_model(&mut self) -> ConstrainedQuadraticModel {
        std::mem::take(&mut self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_variable_is_journaled() {
        let mut view = ModelView::new(ConstrainedQuadraticModel::new());
        let v = view.add_variable(Vartype::Binary, 0.0, 1.0);
        assert_eq!(v, 0);

        // undoing the add drops the appended position
        assert_eq!(view.restore(vec![1.0]), Vec::<f64>::new());
    }

    #[test]
    fn test_change_vartype_guards() {
        let mut cqm = ConstrainedQuadraticModel::new();
        let s = cqm.add_variable(Vartype::Spin);
        let x = cqm.add_variable(Vartype::Binary);
        let mut view = ModelView::new(cqm);

        assert!(view.change_vartype(Vartype::Binary, s).is_ok());
        assert_eq!(view.vartype(s), Vartype::Binary);

        // binary -> binary is not a spin conversion
        let err = view.change_vartype(Vartype::Binary, x).unwrap_err();
        assert!(matches!(err, PresolveError::Logic(_)));

        // only the successful change was journaled
        assert_eq!(view.restore(vec![0.0, 5.0]), vec![-1.0, 5.0]);
    }

    #[test]
    fn test_fix_variable_is_journaled() {
        let mut cqm = ConstrainedQuadraticModel::new();
        let x = cqm.add_variable(Vartype::Binary);
        let _y = cqm.add_variable(Vartype::Binary);
        let mut view = ModelView::new(cqm);

        view.fix_variable(x, 1.0);
        assert_eq!(view.num_variables(), 1);
        assert_eq!(view.restore(vec![0.0]), vec![1.0, 0.0]);
    }

    #[test]
    fn test_detach_keeps_journal() {
        let mut cqm = ConstrainedQuadraticModel::new();
        let x = cqm.add_variable(Vartype::Binary);
        let mut view = ModelView::new(cqm);
        view.fix_variable(x, 0.0);

        let detached = view.detach_model();
        assert_eq!(detached.num_variables(), 0);
        assert_eq!(view.model().num_variables(), 0);
        assert_eq!(view.restore(vec![]), vec![0.0]);
    }
}
