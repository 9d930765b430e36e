//! State-action value tables
use crate::error::RLError;
use crate::state::State;
use ndarray::{Array1, Array2, Axis, Zip};
use ndarray_stats::QuantileExt;
use std::collections::BTreeSet;

/// Value changes at or below this magnitude are not reported as changed states.
pub const CHANGE_THRESHOLD: f64 = 1e-4;

/// A `[num_states, num_actions]` table of action values.
///
/// An indexed state reads a single row.
/// A feature state reads the sum of the rows of its active features
/// and updates apply to each of those rows.
/// The terminal state has value 0 and is never stored.
///
/// Rows whose values change by more than [`CHANGE_THRESHOLD`] are recorded until taken with
/// [`ActionValueTable::take_changed_states`].
#[derive(Debug, Clone, PartialEq)]
pub struct ActionValueTable {
    values: Array2<f64>,
    changed: BTreeSet<usize>,
}

impl ActionValueTable {
    pub fn new(num_states: usize, num_actions: usize, initial_value: f64) -> Self {
        Self {
            values: Array2::from_elem((num_states, num_actions), initial_value),
            changed: BTreeSet::new(),
        }
    }

    /// Set every value to `initial_value` and forget all changes.
    pub fn reset(&mut self, initial_value: f64) {
        self.values.fill(initial_value);
        self.changed.clear();
    }

    pub fn num_states(&self) -> usize {
        self.values.nrows()
    }

    pub fn num_actions(&self) -> usize {
        self.values.ncols()
    }

    /// The raw table.
    pub const fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Replace the raw table. Every row counts as changed.
    pub fn set_values(&mut self, values: Array2<f64>) -> Result<(), RLError> {
        if values.dim() != self.values.dim() {
            return Err(RLError::OutOfRange {
                what: "table row",
                index: values.nrows(),
                bound: self.num_states(),
            });
        }
        self.values = values;
        self.mark_all_changed();
        Ok(())
    }

    pub fn check_state(&self, state: &State) -> Result<(), RLError> {
        state.check(self.num_states())
    }

    /// Values of each action in a state. All zero for the terminal state.
    pub fn action_values(&self, state: &State) -> Array1<f64> {
        match state {
            State::Index(i) => self.values.row(*i).to_owned(),
            _ => {
                let mut sum = Array1::zeros(self.num_actions());
                for &row in state.rows() {
                    sum += &self.values.row(row);
                }
                sum
            }
        }
    }

    /// Value of taking `action` in `state`.
    pub fn value(&self, state: &State, action: usize) -> f64 {
        state.rows().iter().map(|&row| self.values[(row, action)]).sum()
    }

    /// Maximum action value in `state`. Zero for the terminal state.
    pub fn state_value(&self, state: &State) -> f64 {
        if state.is_terminal() {
            return 0.0;
        }
        let values = self.action_values(state);
        values.max().map_or(f64::NAN, |&v| v)
    }

    /// Add `delta` to the value of `action` in each row of `state`.
    pub fn add(&mut self, state: &State, action: usize, delta: f64) {
        for &row in state.rows() {
            self.values[(row, action)] += delta;
            if delta.abs() > CHANGE_THRESHOLD {
                self.changed.insert(row);
            }
        }
    }

    /// Add `scale * traces` to the whole table.
    pub fn add_traces(&mut self, scale: f64, traces: &Array2<f64>) {
        Zip::from(&mut self.values)
            .and(traces)
            .for_each(|value, &trace| *value += scale * trace);
        for (row, trace_row) in traces.axis_iter(Axis(0)).enumerate() {
            if trace_row.iter().any(|&z| (scale * z).abs() > CHANGE_THRESHOLD) {
                self.changed.insert(row);
            }
        }
    }

    pub fn mark_all_changed(&mut self) {
        self.changed.extend(0..self.num_states());
    }

    /// Rows changed since the last call, in increasing order.
    pub fn take_changed_states(&mut self) -> BTreeSet<usize> {
        std::mem::take(&mut self.changed)
    }
}
