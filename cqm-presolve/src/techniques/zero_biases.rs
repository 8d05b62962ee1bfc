//! Zero-bias cleanup.

use cqm_core::Expression;

use crate::view::ModelView;

/// Drop zero-bias interactions everywhere, then drop every variable whose
/// linear bias is zero and which participates in no remaining interaction.
pub(crate) fn remove_zero_biases(model: &mut ModelView) -> bool {
    let mut changes = scrub(model.objective_mut());
    for constraint in model.constraints_mut() {
        changes |= scrub(constraint);
    }
    changes
}

fn scrub(expression: &mut Expression) -> bool {
    let empty_interactions: Vec<(usize, usize)> = expression
        .iter_quadratic()
        .filter(|&(_, _, bias)| bias == 0.0)
        .map(|(u, v, _)| (u, v))
        .collect();
    for &(u, v) in &empty_interactions {
        expression.remove_interaction(u, v);
    }

    let empty_variables: Vec<usize> = expression
        .variables()
        .filter(|&v| expression.linear(v) == 0.0 && expression.degree(v) == 0)
        .collect();
    for &v in &empty_variables {
        expression.remove_variable(v);
    }

    !empty_interactions.is_empty() || !empty_variables.is_empty()
}
