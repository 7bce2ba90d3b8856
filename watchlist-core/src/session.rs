//! Watchlist session
//!
//! The explicitly constructed plugin object: owns the table controller, the
//! evaluation strategy and the refresh trigger, and carries the
//! init/shutdown lifecycle around the host's settings store. All entry
//! points run synchronously on the caller's thread.

use std::path::PathBuf;

use crate::expr::{Evaluate, EvaluationResult, Namespace};
use crate::refresh::RefreshTrigger;
use crate::settings::Settings;
use crate::table::{Row, TableController};

#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Location of the persisted expression list; `None` disables
    /// persistence (e.g. for embedded use).
    pub settings_path: Option<PathBuf>,
}

pub struct WatchlistSession {
    table: TableController,
    evaluator: Box<dyn Evaluate>,
    trigger: RefreshTrigger,
    settings_path: Option<PathBuf>,
    /// Latest namespace snapshot; `None` means there is nothing to evaluate
    /// against (not currently debugging) and value cells stay blank.
    namespace: Option<Namespace>,
}

impl WatchlistSession {
    /// Construct the session and restore the persisted expression list.
    /// Persistence read errors degrade to an empty list.
    pub fn init(config: SessionConfig, evaluator: Box<dyn Evaluate>) -> Self {
        let mut table = TableController::new();
        if let Some(path) = &config.settings_path {
            let settings = Settings::load(path);
            log::debug!(
                "restored {} expressions from {}",
                settings.expressions.len(),
                path.display()
            );
            table.set_expressions(settings.expressions);
        }

        Self {
            table,
            evaluator,
            trigger: RefreshTrigger::new(),
            settings_path: config.settings_path,
            namespace: None,
        }
    }

    /// Persist the current expression list. Write errors are logged; they
    /// do not abort shutdown.
    pub fn shutdown(&mut self) {
        let Some(path) = &self.settings_path else {
            return;
        };
        let settings = Settings::new(self.table.expressions());
        if let Err(e) = settings.save(path) {
            log::warn!("failed to save settings to {}: {}", path.display(), e);
        }
    }

    // --- host events ---

    /// A command finished in the console; re-evaluate against the new
    /// namespace snapshot.
    pub fn command_executed(&mut self, namespace: Option<Namespace>) {
        self.namespace = namespace;
        self.refresh();
    }

    /// The debugger completed a step.
    pub fn debugger_step(&mut self, namespace: Option<Namespace>) {
        self.namespace = namespace;
        self.refresh();
    }

    // --- user edits (each one is a list mutation, so each refreshes) ---

    pub fn set_expressions(&mut self, expressions: Vec<String>) {
        self.table.set_expressions(expressions);
        self.refresh();
    }

    /// Add an expression at the current row (or append) with its text
    /// already committed. Blank text adds nothing.
    pub fn add_expression(&mut self, text: &str) {
        let row = self.table.begin_add();
        self.table.commit_edit(row, text);
        self.refresh();
    }

    pub fn edit_expression(&mut self, row: usize, text: &str) {
        self.table.commit_edit(row, text);
        self.refresh();
    }

    pub fn remove_rows(&mut self, rows: &[usize]) {
        self.table.select(rows);
        self.table.remove_selected();
        self.refresh();
    }

    pub fn remove_all(&mut self) {
        self.table.remove_all();
        self.refresh();
    }

    pub fn move_row(&mut self, from: usize, to: usize) -> bool {
        let moved = self.table.move_row(from, to);
        if moved {
            self.refresh();
        }
        moved
    }

    pub fn drop_text(&mut self, at: usize, payload: &str) -> usize {
        let inserted = self.table.drop_text(at, payload);
        if inserted > 0 {
            self.refresh();
        }
        inserted
    }

    pub fn copy_value(&self, row: usize) -> Option<String> {
        self.table.copy_value(row).map(str::to_string)
    }

    // --- state ---

    pub fn rows(&self) -> Vec<Row> {
        self.table.rows()
    }

    pub fn expressions(&self) -> Vec<String> {
        self.table.expressions()
    }

    /// Run the refresh pass, collapsing re-entrant triggers into a single
    /// trailing re-run.
    fn refresh(&mut self) {
        if !self.trigger.request() {
            return;
        }
        loop {
            self.run_pass();
            if !self.trigger.finish() {
                break;
            }
            let _ = self.trigger.request();
        }
    }

    /// Evaluate every row in document order against the latest snapshot.
    fn run_pass(&mut self) {
        let Some(ns) = &self.namespace else {
            self.table.clear_values();
            return;
        };
        let outcomes: Vec<EvaluationResult> = self
            .table
            .rows()
            .iter()
            .map(|row| self.evaluator.evaluate(&row.expression, ns))
            .collect();
        self.table.apply_results(&outcomes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::LocalEvaluator;

    fn session() -> WatchlistSession {
        WatchlistSession::init(SessionConfig::default(), Box::new(LocalEvaluator::new()))
    }

    fn namespace(json: serde_json::Value) -> Option<Namespace> {
        Some(Namespace::from_json(&json))
    }

    #[test]
    fn test_step_scenario() {
        let mut s = session();
        s.set_expressions(vec!["a".to_string(), "a+1".to_string()]);

        s.debugger_step(namespace(serde_json::json!({"a": 1})));
        let rows = s.rows();
        assert_eq!(rows[0].value, "1");
        assert_eq!(rows[1].value, "2");

        s.debugger_step(namespace(serde_json::json!({"a": 2})));
        let rows = s.rows();
        assert_eq!(rows[0].value, "2");
        assert_eq!(rows[1].value, "3");
        assert!(rows[0].changed && rows[1].changed);
    }

    #[test]
    fn test_undefined_expression_never_crashes_the_pass() {
        let mut s = session();
        s.set_expressions(vec!["missing".to_string(), "1+1".to_string()]);
        s.command_executed(namespace(serde_json::json!({})));

        let rows = s.rows();
        assert_eq!(rows[0].value, "NameError");
        assert_eq!(rows[0].tooltip, "name 'missing' is not defined");
        assert_eq!(rows[1].value, "2");
    }

    #[test]
    fn test_division_by_zero_cell_text() {
        let mut s = session();
        s.set_expressions(vec!["1/0".to_string()]);
        s.debugger_step(namespace(serde_json::json!({})));

        let rows = s.rows();
        assert_eq!(rows[0].value, "ZeroDivisionError");
        assert_eq!(rows[0].tooltip, "division by zero");
    }

    #[test]
    fn test_no_namespace_clears_values() {
        let mut s = session();
        s.set_expressions(vec!["a".to_string()]);
        s.debugger_step(namespace(serde_json::json!({"a": 1})));
        assert_eq!(s.rows()[0].value, "1");

        // Stepping outside a debug frame blanks the column.
        s.debugger_step(None);
        assert_eq!(s.rows()[0].value, "");
    }

    #[test]
    fn test_mutations_refresh_against_latest_snapshot() {
        let mut s = session();
        s.command_executed(namespace(serde_json::json!({"a": 5})));

        s.add_expression("a * 2");
        assert_eq!(s.rows()[0].value, "10");

        s.drop_text(0, "a\na + 1\n");
        let rows = s.rows();
        assert_eq!(rows[0].value, "5");
        assert_eq!(rows[1].value, "6");
        assert_eq!(rows[2].value, "10");

        s.remove_rows(&[0, 1]);
        assert_eq!(s.expressions(), vec!["a * 2"]);
    }

    #[test]
    fn test_persistence_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("watchlist.toml");
        let config = SessionConfig {
            settings_path: Some(path.clone()),
        };

        let mut s =
            WatchlistSession::init(config.clone(), Box::new(LocalEvaluator::new()));
        s.set_expressions(vec!["a".to_string(), "a+1".to_string()]);
        s.shutdown();

        let restored = WatchlistSession::init(config, Box::new(LocalEvaluator::new()));
        assert_eq!(restored.expressions(), vec!["a", "a+1"]);
    }

    #[test]
    fn test_init_with_missing_settings_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let config = SessionConfig {
            settings_path: Some(dir.path().join("nope.toml")),
        };
        let s = WatchlistSession::init(config, Box::new(LocalEvaluator::new()));
        assert!(s.rows().is_empty());
    }
}
