//! Runtime configuration.
//!
//! [`RuntimeConfig`] is carried by the [`Document`](crate::dom::Document) and
//! handed to every host it upgrades.

/// Reset rules prepended to every component's compiled styles.
pub const DEFAULT_STYLE_RESET: &str =
    ":host { display: block; box-sizing: border-box; } :host([hidden]) { display: none; }";

/// Upper bound on consecutive re-entrant update flushes.
pub const DEFAULT_MAX_UPDATE_RECURSION: usize = 100;

// ---------------------------------------------------------------------------
// RuntimeConfig
// ---------------------------------------------------------------------------

/// Configuration for the component runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Consecutive re-entrant flushes allowed before the scheduler gives up
    /// and resolves `update_complete` with `false`.
    pub max_update_recursion: usize,
    /// CSS prepended to every component's styles.
    pub style_reset: String,
    /// Whether slot validation problems are dispatched as `slot-validation`
    /// events (they are always logged).
    pub report_slot_warnings: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_update_recursion: DEFAULT_MAX_UPDATE_RECURSION,
            style_reset: DEFAULT_STYLE_RESET.to_owned(),
            report_slot_warnings: true,
        }
    }
}

impl RuntimeConfig {
    /// Create a new default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the re-entrant flush ceiling (builder).
    pub fn with_max_update_recursion(mut self, max: usize) -> Self {
        self.max_update_recursion = max;
        self
    }

    /// Set the style reset block (builder).
    pub fn with_style_reset(mut self, css: impl Into<String>) -> Self {
        self.style_reset = css.into();
        self
    }

    /// Enable or disable `slot-validation` events (builder).
    pub fn with_slot_warnings(mut self, enabled: bool) -> Self {
        self.report_slot_warnings = enabled;
        self
    }
}
