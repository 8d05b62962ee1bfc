//! Normalization rewrites that put a model into canonical form.
//!
//! After the full suite runs: no bias is NaN, no spin variables remain, no
//! constraint carries an offset, no expression carries a self-interaction,
//! no constraint has sense `>=`, and the discrete markers form pairwise
//! disjoint one-hot groups.

use cqm_core::{Expression, Sense, Vartype};
use indexmap::IndexSet;

use crate::error::{PresolveError, PresolveResult};
use crate::view::ModelView;

/// Fail if any bias anywhere in the model is NaN.
pub(crate) fn check_nan(model: &ModelView) -> PresolveResult<()> {
    check_nan_expression(model.objective())?;
    for constraint in model.constraints() {
        check_nan_expression(constraint)?;
    }
    Ok(())
}

/// Fail if any linear, quadratic, or offset bias of `expression` is NaN.
pub fn check_nan_expression(expression: &Expression) -> PresolveResult<()> {
    for (_, _, bias) in expression.iter_quadratic() {
        if bias.is_nan() {
            return Err(nan_error());
        }
    }
    for v in expression.variables() {
        if expression.linear(v).is_nan() {
            return Err(nan_error());
        }
    }
    if expression.offset().is_nan() {
        return Err(nan_error());
    }
    Ok(())
}

fn nan_error() -> PresolveError {
    PresolveError::InvalidModel("biases cannot be NAN".into())
}

/// Re-encode every spin variable as binary.
pub(crate) fn spin_to_binary(model: &mut ModelView) -> PresolveResult<bool> {
    let mut changes = false;
    for v in 0..model.num_variables() {
        if model.vartype(v) == Vartype::Spin {
            model.change_vartype(Vartype::Binary, v)?;
            changes = true;
        }
    }
    Ok(changes)
}

/// Fold every constraint offset into its right-hand side.
///
/// The objective offset stays; it shifts energy, not feasibility.
pub(crate) fn remove_offsets(model: &mut ModelView) -> bool {
    let mut changes = false;
    for constraint in model.constraints_mut() {
        if constraint.offset() != 0.0 {
            let rhs = constraint.rhs() - constraint.offset();
            constraint.set_rhs(rhs);
            constraint.set_offset(0.0);
            changes = true;
        }
    }
    changes
}

/// Replace every self-interaction `b * v * v` with a cross term against a
/// fresh companion variable, tied back by an equality constraint.
///
/// Companions are allocated at most once per variable, before any equality
/// row is appended, so constraint iteration is never invalidated.
pub(crate) fn remove_self_loops(model: &mut ModelView) -> bool {
    let mut offenders: IndexSet<usize> = IndexSet::new();
    collect_self_loops(model.objective(), &mut offenders);
    for constraint in model.constraints() {
        collect_self_loops(constraint, &mut offenders);
    }
    if offenders.is_empty() {
        return false;
    }

    let mut pairs: Vec<(usize, usize)> = Vec::with_capacity(offenders.len());
    for &v in &offenders {
        let vartype = model.vartype(v);
        let (lb, ub) = (model.lower_bound(v), model.upper_bound(v));
        let companion = model.add_variable(vartype, lb, ub);
        pairs.push((v, companion));
    }

    rewrite_self_loops(model.objective_mut(), &pairs);
    for constraint in model.constraints_mut() {
        rewrite_self_loops(constraint, &pairs);
    }

    for &(v, companion) in &pairs {
        model.add_linear_constraint(&[v, companion], &[1.0, -1.0], Sense::Eq, 0.0);
    }

    true
}

fn collect_self_loops(expression: &Expression, offenders: &mut IndexSet<usize>) {
    for v in expression.variables() {
        if expression.has_interaction(v, v) {
            offenders.insert(v);
        }
    }
}

fn rewrite_self_loops(expression: &mut Expression, pairs: &[(usize, usize)]) {
    for &(v, companion) in pairs {
        if expression.has_interaction(v, v) {
            let bias = expression.quadratic(v, v);
            expression.add_quadratic(v, companion, bias);
            expression.remove_interaction(v, v);
        }
    }
}

/// Rewrite every `>=` constraint as `<=` by scaling through by -1.
pub(crate) fn flip_constraints(model: &mut ModelView) -> bool {
    let mut changes = false;
    for constraint in model.constraints_mut() {
        if constraint.sense() == Sense::Ge {
            constraint.scale(-1.0);
            constraint.set_sense(Sense::Le);
            changes = true;
        }
    }
    changes
}

/// Clear discrete markers that are not valid one-hot groups, then break
/// overlaps so the surviving groups are pairwise disjoint.
///
/// On overlap the earlier constraint keeps its marker and the later one
/// loses it.
pub(crate) fn remove_invalid_markers(model: &mut ModelView) -> bool {
    let mut changes = false;

    let mut discrete: Vec<usize> = Vec::new();
    for c in 0..model.num_constraints() {
        if !model.constraint_ref(c).marked_discrete() {
            continue;
        }
        if model.constraint_ref(c).is_onehot(model.vartypes()) {
            discrete.push(c);
        } else {
            model.constraint_mut(c).mark_discrete(false);
            changes = true;
        }
    }

    let mut i = 0;
    while i < discrete.len() {
        let mut j = i + 1;
        while j < discrete.len() {
            let shares = model
                .constraint_ref(discrete[i])
                .shares_variables(model.constraint_ref(discrete[j]));
            if shares {
                model.constraint_mut(discrete[j]).mark_discrete(false);
                discrete.remove(j);
                changes = true;
            } else {
                j += 1;
            }
        }
        i += 1;
    }

    changes
}
