//! Fixed-variable elimination.

use crate::view::ModelView;

/// Fix every variable whose bounds have collapsed to a point.
///
/// The cursor advances past a just-fixed index, so the variable that slides
/// into its place is revisited on the next round.
pub(crate) fn remove_fixed_variables(model: &mut ModelView) -> bool {
    let mut changes = false;
    let mut v = 0;
    while v < model.num_variables() {
        if model.lower_bound(v) == model.upper_bound(v) {
            let value = model.lower_bound(v);
            model.fix_variable(v, value);
            changes = true;
        }
        v += 1;
    }
    changes
}
