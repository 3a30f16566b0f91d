//! `[history]` section configuration.

use serde::{Deserialize, Serialize};

use crate::history::DEFAULT_CAPACITY;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of undo entries kept.
    pub capacity: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl HistoryConfig {
    pub fn validate(&self, problems: &mut Vec<(&'static str, String)>) {
        if self.capacity == 0 {
            problems.push(("history.capacity", "must be greater than 0".into()));
        }
    }
}
