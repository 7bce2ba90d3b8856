//! Table view controller
//!
//! Toolkit-agnostic model of the two-column watch table: one row per
//! expression, a selection model, and the user-facing edit operations. The
//! last-rendered value text lives on the row and doubles as the result
//! cache: a reorder carries the cached text with the row, so `changed` only
//! reflects an actual value change.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::expr::EvaluationResult;
use crate::store::ExpressionStore;

/// Display tone of a value cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    #[default]
    Default,
    /// Syntax errors stand out.
    Error,
    /// Other evaluation failures are toned down.
    Dimmed,
}

/// One rendered table row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub expression: String,
    pub value: String,
    pub tooltip: String,
    pub tone: Tone,
    pub changed: bool,
}

/// Per-row display state; `value` is the cached last-rendered text.
#[derive(Debug, Clone, Default, PartialEq)]
struct RowState {
    value: String,
    tooltip: String,
    tone: Tone,
    changed: bool,
}

/// Controller for the watch table.
#[derive(Debug, Default)]
pub struct TableController {
    store: ExpressionStore,
    states: Vec<RowState>,
    selection: BTreeSet<usize>,
    current: Option<usize>,
}

impl TableController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn selection(&self) -> Vec<usize> {
        self.selection.iter().copied().collect()
    }

    pub fn select(&mut self, rows: &[usize]) {
        let len = self.len();
        self.selection = rows.iter().copied().filter(|&r| r < len).collect();
        self.current = self.selection.iter().next_back().copied();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.current = None;
    }

    /// Expression texts in document order, skipping blank rows (a blank row
    /// only exists while an add is being edited).
    pub fn expressions(&self) -> Vec<String> {
        self.store
            .iter()
            .filter(|text| !text.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Insert a blank row at the current row (or append when there is no
    /// current row) and return its index for in-place editing.
    pub fn begin_add(&mut self) -> usize {
        let at = self.current.unwrap_or_else(|| self.len());
        let at = self.store.insert_at(at, "");
        self.states.insert(at, RowState::default());
        self.select(&[at]);
        at
    }

    /// Finish editing a row. Whitespace-only text removes the row; anything
    /// else is stored trimmed with its cached value cleared, so the next
    /// refresh re-renders (and re-bolds) it. Returns whether the row was
    /// kept.
    pub fn commit_edit(&mut self, row: usize, text: &str) -> bool {
        if row >= self.len() {
            return false;
        }
        let trimmed = text.trim();
        if trimmed.is_empty() {
            self.remove_row(row);
            return false;
        }
        self.store.replace_at(row, trimmed);
        self.states[row] = RowState::default();
        true
    }

    fn remove_row(&mut self, row: usize) {
        self.store.remove_at(row);
        self.states.remove(row);
        self.clear_selection();
    }

    /// Remove every selected row; selection moves to the entry following
    /// the removed block (or the new last entry).
    pub fn remove_selected(&mut self) {
        let selected: Vec<usize> = self.selection.iter().copied().collect();
        if selected.is_empty() {
            return;
        }
        let follow = self.store.remove_indices(&selected);
        for &row in selected.iter().rev() {
            if row < self.states.len() {
                self.states.remove(row);
            }
        }
        match follow {
            Some(row) => self.select(&[row]),
            None => self.clear_selection(),
        }
    }

    pub fn remove_all(&mut self) {
        self.store = ExpressionStore::new();
        self.states.clear();
        self.clear_selection();
    }

    /// Value cell text for the clipboard.
    pub fn copy_value(&self, row: usize) -> Option<&str> {
        self.states.get(row).map(|state| state.value.as_str())
    }

    /// Insert one expression per non-empty trimmed line of `payload`,
    /// starting at the drop row (append when past the end). Returns the
    /// number of rows inserted; a blank-only payload inserts nothing.
    pub fn drop_text(&mut self, at: usize, payload: &str) -> usize {
        let mut inserted = 0;
        let mut at = at.min(self.len());
        for line in payload.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            self.store.insert_at(at, line);
            self.states.insert(at, RowState::default());
            at += 1;
            inserted += 1;
        }
        inserted
    }

    /// Drag reorder of an existing row; the cached value travels with it.
    pub fn move_row(&mut self, from: usize, to: usize) -> bool {
        if !self.store.move_range(from, to) {
            return false;
        }
        let state = self.states.remove(from);
        let landed = if from < to { to - 1 } else { to };
        self.states.insert(landed, state);
        self.select(&[landed]);
        true
    }

    /// Bulk replace, dropping blank entries; all cached values reset.
    pub fn set_expressions(&mut self, expressions: Vec<String>) {
        let entries: Vec<String> = expressions
            .into_iter()
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())
            .collect();
        self.states = vec![RowState::default(); entries.len()];
        self.store.replace_all(entries);
        self.clear_selection();
    }

    /// Apply one refresh pass worth of results, in row order. Recomputes
    /// text, tooltip, tone and the changed flag against the cached text.
    pub fn apply_results(&mut self, outcomes: &[EvaluationResult]) {
        if outcomes.len() != self.states.len() {
            log::warn!(
                "refresh returned {} results for {} rows",
                outcomes.len(),
                self.states.len()
            );
        }
        for (state, outcome) in self.states.iter_mut().zip(outcomes) {
            let (text, tooltip, tone) = match outcome {
                EvaluationResult::Value { text } => (text.clone(), String::new(), Tone::Default),
                EvaluationResult::Error { kind, message } => {
                    let tone = if kind == "SyntaxError" {
                        Tone::Error
                    } else {
                        Tone::Dimmed
                    };
                    (kind.clone(), message.clone(), tone)
                }
            };
            state.changed = state.value != text;
            state.value = text;
            state.tooltip = tooltip;
            state.tone = tone;
        }
    }

    /// Blank every value cell (no namespace available to evaluate against).
    pub fn clear_values(&mut self) {
        for state in &mut self.states {
            *state = RowState::default();
        }
    }

    /// Snapshot of the rendered rows, in store order.
    pub fn rows(&self) -> Vec<Row> {
        self.store
            .iter()
            .zip(&self.states)
            .map(|(expression, state)| Row {
                expression: expression.to_string(),
                value: state.value.clone(),
                tooltip: state.tooltip.clone(),
                tone: state.tone,
                changed: state.changed,
            })
            .collect()
    }
}
