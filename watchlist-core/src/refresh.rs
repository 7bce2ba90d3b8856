//! Refresh trigger
//!
//! Collapses overlapping refresh requests (console command, debugger step,
//! list mutation) into at most one trailing re-run. Single-threaded; the
//! session drives begin/finish around each evaluation pass.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RefreshState {
    #[default]
    Idle,
    Refreshing,
}

#[derive(Debug, Default)]
pub struct RefreshTrigger {
    state: RefreshState,
    pending: bool,
}

impl RefreshTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RefreshState {
        self.state
    }

    /// Request a refresh. Returns true when the caller should run a pass
    /// now; while a pass is running, the request is folded into a single
    /// pending re-run.
    pub fn request(&mut self) -> bool {
        match self.state {
            RefreshState::Idle => {
                self.state = RefreshState::Refreshing;
                true
            }
            RefreshState::Refreshing => {
                self.pending = true;
                false
            }
        }
    }

    /// Finish the current pass. Returns true when a trailing re-run is owed.
    pub fn finish(&mut self) -> bool {
        self.state = RefreshState::Idle;
        std::mem::take(&mut self.pending)
    }
}
