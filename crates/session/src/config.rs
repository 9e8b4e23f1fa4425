use script_tree::FormatVersion;
use std::time::Duration;

/// Quiet period after the last keystroke before a burst is reconciled.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Session knobs. Deterministic: nothing here reads the environment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// How long the text must stay untouched before pending edits are
    /// written back into the script.
    pub debounce: Duration,
    /// Oldest document format the session will open.
    pub required_version: FormatVersion,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            required_version: FormatVersion::CURRENT,
        }
    }
}

impl SessionConfig {
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }
}
