//! Quadratic expressions over a shared variable table.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

/// A quadratic polynomial: linear biases, quadratic biases over unordered
/// variable pairs (self-pairs allowed), and a scalar offset.
///
/// Variables are model indices. The linear map doubles as the expression's
/// variable set; registering an interaction registers both endpoints with a
/// zero linear bias. Iteration over variables and interactions follows
/// insertion order, and removals preserve the relative order of survivors.
#[derive(Debug, Clone, Default)]
pub struct Expression {
    linear: IndexMap<usize, f64>,
    quadratic: IndexMap<(usize, usize), f64>,
    degree: FxHashMap<usize, usize>,
    offset: f64,
}

/// Interactions are keyed by the unordered pair (lo, hi).
fn pair(u: usize, v: usize) -> (usize, usize) {
    if u <= v {
        (u, v)
    } else {
        (v, u)
    }
}

impl Expression {
    /// An empty expression.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of variables in the expression.
    pub fn num_variables(&self) -> usize {
        self.linear.len()
    }

    /// The expression's variables, in insertion order.
    pub fn variables(&self) -> impl Iterator<Item = usize> + '_ {
        self.linear.keys().copied()
    }

    /// Whether `v` participates in the expression.
    pub fn contains(&self, v: usize) -> bool {
        self.linear.contains_key(&v)
    }

    /// The linear bias on `v`, zero if absent.
    pub fn linear(&self, v: usize) -> f64 {
        self.linear.get(&v).copied().unwrap_or(0.0)
    }

    /// Set the linear bias on `v`, registering it if needed.
    pub fn set_linear(&mut self, v: usize, bias: f64) {
        self.linear.insert(v, bias);
    }

    /// Add to the linear bias on `v`, registering it if needed.
    pub fn add_linear(&mut self, v: usize, bias: f64) {
        *self.linear.entry(v).or_insert(0.0) += bias;
    }

    /// The scalar offset.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Set the scalar offset.
    pub fn set_offset(&mut self, offset: f64) {
        self.offset = offset;
    }

    /// The quadratic bias on the unordered pair `(u, v)`, zero if absent.
    pub fn quadratic(&self, u: usize, v: usize) -> f64 {
        self.quadratic.get(&pair(u, v)).copied().unwrap_or(0.0)
    }

    /// Set the quadratic bias on `(u, v)`, registering variables and the
    /// interaction (even for a zero bias).
    pub fn set_quadratic(&mut self, u: usize, v: usize, bias: f64) {
        self.register_interaction(u, v);
        self.quadratic.insert(pair(u, v), bias);
    }

    /// Add to the quadratic bias on `(u, v)`, registering variables and the
    /// interaction if needed.
    pub fn add_quadratic(&mut self, u: usize, v: usize, bias: f64) {
        self.register_interaction(u, v);
        *self.quadratic.entry(pair(u, v)).or_insert(0.0) += bias;
    }

    /// Whether the pair `(u, v)` has an interaction.
    pub fn has_interaction(&self, u: usize, v: usize) -> bool {
        self.quadratic.contains_key(&pair(u, v))
    }

    /// Remove the interaction on `(u, v)`, if present.
    pub fn remove_interaction(&mut self, u: usize, v: usize) -> bool {
        let key = pair(u, v);
        if self.quadratic.shift_remove(&key).is_some() {
            self.drop_degree(key.0);
            if key.0 != key.1 {
                self.drop_degree(key.1);
            }
            true
        } else {
            false
        }
    }

    /// Total number of interactions.
    pub fn num_interactions(&self) -> usize {
        self.quadratic.len()
    }

    /// Number of interactions that involve `v` (a self-pair counts once).
    pub fn degree(&self, v: usize) -> usize {
        self.degree.get(&v).copied().unwrap_or(0)
    }

    /// Iterate interactions as `(u, v, bias)` in insertion order, `u <= v`.
    pub fn iter_quadratic(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.quadratic.iter().map(|(&(u, v), &bias)| (u, v, bias))
    }

    /// Remove `v` and every interaction involving it.
    pub fn remove_variable(&mut self, v: usize) {
        if self.linear.shift_remove(&v).is_none() {
            return;
        }
        let touching: Vec<(usize, usize)> = self
            .quadratic
            .keys()
            .filter(|&&(p, q)| p == v || q == v)
            .copied()
            .collect();
        for (p, q) in touching {
            self.remove_interaction(p, q);
        }
        self.degree.remove(&v);
    }

    /// Multiply every bias and the offset by `factor`.
    pub fn scale(&mut self, factor: f64) {
        for bias in self.linear.values_mut() {
            *bias *= factor;
        }
        for bias in self.quadratic.values_mut() {
            *bias *= factor;
        }
        self.offset *= factor;
    }

    /// Whether the expression has no quadratic part.
    pub fn is_linear(&self) -> bool {
        self.quadratic.is_empty()
    }

    /// Evaluate the expression at `sample`, indexed by variable.
    pub fn energy(&self, sample: &[f64]) -> f64 {
        let mut total = self.offset;
        for (&v, &bias) in &self.linear {
            total += bias * sample[v];
        }
        for (&(u, v), &bias) in &self.quadratic {
            total += bias * sample[u] * sample[v];
        }
        total
    }

    /// Fold `v = value` into the remaining biases and drop `v`.
    ///
    /// Indices are not renumbered; the model layer does that.
    pub(crate) fn substitute_fixed(&mut self, v: usize, value: f64) {
        let Some(a) = self.linear.shift_remove(&v) else {
            return;
        };
        self.offset += a * value;

        let touching: Vec<((usize, usize), f64)> = self
            .quadratic
            .iter()
            .filter(|(&(p, q), _)| p == v || q == v)
            .map(|(&key, &bias)| (key, bias))
            .collect();
        for ((p, q), bias) in touching {
            if p == q {
                self.offset += bias * value * value;
            } else {
                let other = if p == v { q } else { p };
                *self.linear.entry(other).or_insert(0.0) += bias * value;
            }
            self.quadratic.shift_remove(&(p, q));
            let counterpart = if p == v { q } else { p };
            if counterpart != v {
                self.drop_degree(counterpart);
            }
        }
        self.degree.remove(&v);
    }

    /// Rewrite `v` from spin to binary encoding via `s = 2x - 1`.
    ///
    /// Other spin variables in the expression are untouched; conversion is
    /// one variable at a time.
    pub(crate) fn substitute_spin(&mut self, v: usize) {
        if !self.contains(v) {
            return;
        }
        let a = self.linear(v);
        let self_bias = self.quadratic(v, v);

        let cross: Vec<(usize, f64)> = self
            .quadratic
            .iter()
            .filter_map(|(&(p, q), &bias)| {
                if p == v && q != v {
                    Some((q, bias))
                } else if q == v && p != v {
                    Some((p, bias))
                } else {
                    None
                }
            })
            .collect();
        for (u, bias) in cross {
            self.quadratic.insert(pair(v, u), 2.0 * bias);
            *self.linear.entry(u).or_insert(0.0) -= bias;
        }

        self.linear.insert(v, 2.0 * a - 4.0 * self_bias);
        self.offset += self_bias - a;
        if self.has_interaction(v, v) {
            self.quadratic.insert((v, v), 4.0 * self_bias);
        }
    }

    /// Renumber every index greater than `removed` down by one.
    pub(crate) fn shift_indices_above(&mut self, removed: usize) {
        fn shift(w: usize, removed: usize) -> usize {
            if w > removed {
                w - 1
            } else {
                w
            }
        }

        let linear = std::mem::take(&mut self.linear);
        self.linear = linear
            .into_iter()
            .map(|(w, bias)| (shift(w, removed), bias))
            .collect();

        let quadratic = std::mem::take(&mut self.quadratic);
        self.quadratic = quadratic
            .into_iter()
            .map(|((p, q), bias)| (pair(shift(p, removed), shift(q, removed)), bias))
            .collect();

        let degree = std::mem::take(&mut self.degree);
        self.degree = degree
            .into_iter()
            .map(|(w, d)| (shift(w, removed), d))
            .collect();
    }

    fn register_interaction(&mut self, u: usize, v: usize) {
        self.linear.entry(u).or_insert(0.0);
        self.linear.entry(v).or_insert(0.0);
        if !self.quadratic.contains_key(&pair(u, v)) {
            *self.degree.entry(u).or_insert(0) += 1;
            if u != v {
                *self.degree.entry(v).or_insert(0) += 1;
            }
        }
    }

    fn drop_degree(&mut self, v: usize) {
        if let Some(d) = self.degree.get_mut(&v) {
            *d -= 1;
            if *d == 0 {
                self.degree.remove(&v);
            }
        }
    }
}
