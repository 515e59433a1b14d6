//! Terminal configuration loaded from app launch parameters.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{history::DEFAULT_HISTORY_KEY, pane::DEFAULT_STICK_THRESHOLD};

/// Themes shipped with the terminal, in listing order.
pub const DEFAULT_THEMES: [&str; 5] = ["default", "matrix", "amber", "ice", "mono"];

/// Terminal settings. Every field falls back to its default when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Output pane line cap.
    pub max_lines: usize,
    /// Number of history entries kept on persistence.
    pub history_limit: usize,
    /// Preference key for persisted history.
    pub history_key: String,
    /// Preference key for the selected theme.
    pub theme_key: String,
    /// Preference key for the default weather location.
    pub weather_key: String,
    /// Weather location used when none is persisted.
    pub default_location: String,
    /// Near-bottom threshold for sticky auto-scroll.
    pub stick_threshold: f64,
    /// Prompt text echoed before each command.
    pub prompt: String,
    /// GitHub account whose deployed repositories `projects` lists.
    pub project_owner: String,
    /// Freshness window of the projects cache.
    pub projects_ttl_ms: u64,
    /// Selectable theme names.
    pub themes: Vec<String>,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            max_lines: 900,
            history_limit: crate::history::DEFAULT_HISTORY_LIMIT,
            history_key: DEFAULT_HISTORY_KEY.to_string(),
            theme_key: "portfolio.terminal.theme".to_string(),
            weather_key: "portfolio.terminal.weather.location".to_string(),
            default_location: "Asia".to_string(),
            stick_threshold: DEFAULT_STICK_THRESHOLD,
            prompt: "user@site:~$".to_string(),
            project_owner: "nemesis".to_string(),
            projects_ttl_ms: 10 * 60 * 1000,
            themes: DEFAULT_THEMES.iter().map(|name| name.to_string()).collect(),
        }
    }
}

impl TerminalConfig {
    /// Reads configuration from JSON launch parameters.
    ///
    /// Anything that is not an object, or an object that fails to decode, yields the defaults.
    pub fn from_launch_params(launch_params: &Value) -> Self {
        if !launch_params.is_object() {
            return Self::default();
        }
        match serde_json::from_value::<Self>(launch_params.clone()) {
            Ok(config) => config.normalized(),
            Err(err) => {
                log::warn!("invalid terminal launch params, using defaults: {err}");
                Self::default()
            }
        }
    }

    /// Returns whether `name` is a selectable theme.
    pub fn is_theme(&self, name: &str) -> bool {
        self.themes.iter().any(|theme| theme == name)
    }

    fn normalized(mut self) -> Self {
        self.max_lines = self.max_lines.max(1);
        self.history_limit = self.history_limit.max(1);
        if self.themes.is_empty() {
            self.themes = Self::default().themes;
        }
        self
    }
}
