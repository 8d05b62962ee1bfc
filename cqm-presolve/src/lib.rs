//! Presolve engine for constrained quadratic models.
//!
//! Rewrites a CQM into a simpler, equivalent model before it is handed to a
//! solver: a normalization pass establishes a canonical form, then a set of
//! reduction techniques iterates to a fixed point. Every change that moves
//! variables between numberings or re-encodes them is journaled, so a
//! solution of the reduced model maps back to the original variables.
//!
//! Presolve does not preserve the objective value; constant terms may shift
//! or disappear. It preserves the feasible set up to the recorded journal.
//!
//! # Example
//!
//! ```
//! use cqm_core::{ConstrainedQuadraticModel, Vartype};
//! use cqm_presolve::Presolver;
//!
//! let mut cqm = ConstrainedQuadraticModel::new();
//! let s = cqm.add_variable(Vartype::Spin);
//! cqm.objective.set_linear(s, 1.5);
//!
//! let mut presolver = Presolver::new(cqm);
//! presolver.load_default_presolvers();
//! presolver.apply()?;
//!
//! // the spin variable is now binary; restore maps s = 2x - 1 back
//! assert_eq!(presolver.model().vartype(0), Vartype::Binary);
//! assert_eq!(presolver.restore(vec![0.0]), vec![-1.0]);
//! # Ok::<(), cqm_presolve::PresolveError>(())
//! ```

#![warn(clippy::all)]

mod error;
mod flags;
mod journal;
mod normalize;
mod settings;
mod techniques;
mod view;

pub use error::{PresolveError, PresolveResult};
pub use flags::TechniqueFlags;
pub use journal::{Transform, TransformLog};
pub use normalize::check_nan_expression;
pub use settings::PresolveSettings;

use cqm_core::ConstrainedQuadraticModel;

use crate::view::ModelView;

/// Numeric slack used in all small-bias and bound-tightening decisions.
pub const FEASIBILITY_TOLERANCE: f64 = 1.0e-6;

/// Verdict about the model reached during presolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Feasibility {
    /// Nothing conclusive yet.
    #[default]
    Unknown,
    /// The model is known to be satisfiable.
    Feasible,
    /// The model can never be satisfied.
    Infeasible,
}

/// Presolver for a constrained quadratic model.
///
/// Owns the model from construction until [`detach_model`]; all mutation
/// goes through an internal journaled view, so [`restore`] can map any
/// reduced-model assignment back to the original variables.
///
/// After an error from [`normalize`], [`presolve`], or [`apply`], the model
/// may be in an intermediate state; the only sensible next action is to
/// discard the presolver. The journal is never rolled back.
///
/// [`detach_model`]: Presolver::detach_model
/// [`restore`]: Presolver::restore
/// [`normalize`]: Presolver::normalize
/// [`presolve`]: Presolver::presolve
/// [`apply`]: Presolver::apply
#[derive(Debug)]
pub struct Presolver {
    model: ModelView,
    settings: PresolveSettings,
    /// Techniques that the reduction phase runs.
    pub techniques: TechniqueFlags,
    detached: bool,
    normalized: bool,
    feasibility: Feasibility,
}

impl Default for Presolver {
    fn default() -> Self {
        Self::new(ConstrainedQuadraticModel::new())
    }
}

impl Presolver {
    /// Take ownership of a model, with no techniques enabled.
    pub fn new(model: ConstrainedQuadraticModel) -> Self {
        Self::with_settings(model, PresolveSettings::default())
    }

    /// Take ownership of a model with explicit driver settings.
    pub fn with_settings(model: ConstrainedQuadraticModel, settings: PresolveSettings) -> Self {
        Self {
            model: ModelView::new(model),
            settings,
            techniques: TechniqueFlags::NONE,
            detached: false,
            normalized: false,
            feasibility: Feasibility::Unknown,
        }
    }

    /// Enable the default technique bundle.
    pub fn load_default_presolvers(&mut self) {
        self.techniques = TechniqueFlags::ALL;
    }

    /// The current (possibly reduced) model.
    ///
    /// After [`detach_model`](Presolver::detach_model) this is an empty
    /// model.
    pub fn model(&self) -> &ConstrainedQuadraticModel {
        self.model.model()
    }

    /// Take the model out; the presolver becomes inert.
    ///
    /// The journal is kept, so [`restore`](Presolver::restore) keeps
    /// working; normalization and reduction refuse to run.
    pub fn detach_model(&mut self) -> ConstrainedQuadraticModel {
        self.detached = true;
        self.model.detach_model()
    }

    /// The verdict reached so far.
    pub fn feasibility(&self) -> Feasibility {
        self.feasibility
    }

    /// Map an assignment of the reduced model back to the original model.
    pub fn restore(&self, reduced: Vec<f64>) -> Vec<f64> {
        self.model.restore(reduced)
    }

    /// Run the normalization suite, returning whether anything changed.
    ///
    /// Fails with [`PresolveError::InvalidModel`] if any bias is NaN; in
    /// that case the model is untouched and stays un-normalized.
    pub fn normalize(&mut self) -> PresolveResult<bool> {
        self.ensure_attached()?;

        normalize::check_nan(&self.model)?;

        let mut changes = false;
        changes |= normalize::spin_to_binary(&mut self.model)?;
        changes |= normalize::remove_offsets(&mut self.model);
        changes |= normalize::remove_self_loops(&mut self.model);
        changes |= normalize::flip_constraints(&mut self.model);
        changes |= normalize::remove_invalid_markers(&mut self.model);

        self.normalized = true;
        Ok(changes)
    }

    /// Run the enabled reduction techniques to a fixed point, returning
    /// whether anything changed.
    ///
    /// Requires a prior [`normalize`](Presolver::normalize). Returns
    /// immediately if no techniques are enabled. An infeasible constraint
    /// surfaces as [`PresolveError::Infeasible`] and also records the
    /// verdict.
    pub fn presolve(&mut self) -> PresolveResult<bool> {
        self.ensure_attached()?;
        if !self.normalized {
            return Err(PresolveError::Logic(
                "model must be normalized before presolve() is applied".into(),
            ));
        }
        if self.techniques.is_empty() {
            return Ok(false);
        }

        match self.reduce() {
            Err(PresolveError::Infeasible) => {
                self.feasibility = Feasibility::Infeasible;
                Err(PresolveError::Infeasible)
            }
            other => other,
        }
    }

    /// Normalize, then reduce. Returns whether any change was made.
    pub fn apply(&mut self) -> PresolveResult<bool> {
        let normalized = self.normalize()?;
        let reduced = self.presolve()?;
        Ok(normalized || reduced)
    }

    fn reduce(&mut self) -> PresolveResult<bool> {
        let mut any_changes = false;
        let mut changes = true;
        let mut round = 0;
        while changes && round < self.settings.max_rounds {
            changes = false;

            changes |= techniques::zero_biases::remove_zero_biases(&mut self.model);
            changes |= techniques::small_biases::remove_small_biases(&mut self.model);
            changes |= techniques::singletons::remove_single_variable_constraints(&mut self.model)?;
            changes |= techniques::tighten_bounds::tighten_bounds(&mut self.model)?;
            changes |= techniques::domain_propagation::domain_propagation(&mut self.model)?;
            changes |= techniques::fixed_variables::remove_fixed_variables(&mut self.model);

            any_changes |= changes;
            round += 1;
            log::debug!(
                "presolve round {round}: {} variables, {} constraints remain",
                self.model.num_variables(),
                self.model.num_constraints()
            );
        }

        // reductions can orphan discrete markers (e.g. by fixing one of the
        // group's variables), so revalidate
        any_changes |= normalize::remove_invalid_markers(&mut self.model);

        #[cfg(debug_assertions)]
        {
            let renormalized = self.normalize()?;
            debug_assert!(!renormalized, "reduction left the model denormalized");
        }

        Ok(any_changes)
    }

    fn ensure_attached(&self) -> PresolveResult<()> {
        if self.detached {
            return Err(PresolveError::Logic(
                "model has been detached, so there is no model to apply presolve() to".into(),
            ));
        }
        Ok(())
    }
}
