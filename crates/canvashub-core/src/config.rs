//! User configuration.

use serde::{Deserialize, Serialize};

/// Default spacing between batch-opened links, in milliseconds.
pub const DEFAULT_LINK_DELAY_MS: u64 = 300;

/// User-tunable settings, persisted separately from the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Spacing between sequentially opened team links (ms).
    pub delay: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            delay: DEFAULT_LINK_DELAY_MS,
        }
    }
}

impl Config {
    /// Parse a delay typed by the user.
    ///
    /// Anything that is not a positive integer falls back to the default.
    pub fn delay_from_input(input: &str) -> u64 {
        match input.trim().parse::<u64>() {
            Ok(delay) if delay > 0 => delay,
            _ => DEFAULT_LINK_DELAY_MS,
        }
    }

    /// Spacing as a duration.
    pub fn delay(&self) -> crate::Duration {
        crate::Duration::from_millis(self.delay)
    }
}
