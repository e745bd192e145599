//! View switching, replacing the original tool's DOM-class dispatch

use serde::{Deserialize, Serialize};

/// The tabs of the studio UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Graph,
    Branches,
    Files,
    Stats,
    History,
}

impl View {
    pub fn as_str(&self) -> &'static str {
        match self {
            View::Graph => "graph",
            View::Branches => "branches",
            View::Files => "files",
            View::Stats => "stats",
            View::History => "history",
        }
    }
}

/// Which tab is active and whether the diff overlay sits on top of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewState {
    current: View,
    diff_open: bool,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> View {
        self.current
    }

    pub fn diff_open(&self) -> bool {
        self.diff_open
    }

    /// Activate a tab. Any open diff overlay is dismissed.
    pub fn switch(&mut self, view: View) {
        self.current = view;
        self.diff_open = false;
    }

    pub fn open_diff(&mut self) {
        self.diff_open = true;
    }

    pub fn close_diff(&mut self) {
        self.diff_open = false;
    }
}
