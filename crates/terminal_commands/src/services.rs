//! Shared state and host capabilities handed to every command handler.

use std::{cell::RefCell, rc::Rc};

use platform_host::HostServices;
use terminal_core::TerminalConfig;

/// Listener invoked with the applied theme name.
pub type ThemeListener = Rc<dyn Fn(&str)>;

/// One deployed repository as listed by `projects`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSummary {
    /// Repository name.
    pub name: String,
    /// Description, or `No description`.
    pub description: String,
    /// Primary language, empty when unknown.
    pub language: String,
    /// Star count.
    pub stars: u64,
    /// Repository page.
    pub url: String,
    /// Deployed site, empty when none.
    pub live: String,
}

/// Host services plus terminal-wide state shared by command handlers.
///
/// Clones share the theme listeners and the last project listing.
#[derive(Clone)]
pub struct TerminalServices {
    /// Host capabilities.
    pub host: HostServices,
    /// Terminal configuration.
    pub config: TerminalConfig,
    theme_listeners: Rc<RefCell<Vec<ThemeListener>>>,
    projects: Rc<RefCell<Vec<ProjectSummary>>>,
}

impl TerminalServices {
    /// Creates the bundle.
    pub fn new(host: HostServices, config: TerminalConfig) -> Self {
        Self {
            host,
            config,
            theme_listeners: Rc::new(RefCell::new(Vec::new())),
            projects: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Registers a listener called whenever a theme is applied.
    pub fn on_theme_change(&self, listener: ThemeListener) {
        self.theme_listeners.borrow_mut().push(listener);
    }

    /// Returns the persisted theme, or the fallback theme when none or an unknown one is stored.
    pub async fn current_theme(&self) -> String {
        match self.host.prefs.load_pref(&self.config.theme_key).await {
            Ok(Some(name)) if self.config.is_theme(&name) => name,
            Ok(_) => self.fallback_theme(),
            Err(err) => {
                log::warn!("theme load failed: {err}");
                self.fallback_theme()
            }
        }
    }

    /// Applies and persists `name`, substituting the fallback theme for unknown names.
    ///
    /// Returns the applied name.
    pub async fn apply_theme(&self, name: &str) -> String {
        let theme = if self.config.is_theme(name) {
            name.to_string()
        } else {
            self.fallback_theme()
        };
        let listeners = self.theme_listeners.borrow().clone();
        for listener in listeners {
            listener(&theme);
        }
        if let Err(err) = self
            .host
            .prefs
            .save_pref(&self.config.theme_key, &theme)
            .await
        {
            log::warn!("theme persist failed: {err}");
        }
        theme
    }

    /// Re-applies the persisted theme.
    pub async fn restore_theme(&self) -> String {
        let theme = self.current_theme().await;
        self.apply_theme(&theme).await
    }

    /// Returns the persisted default weather location.
    pub async fn default_location(&self) -> String {
        match self.host.prefs.load_pref(&self.config.weather_key).await {
            Ok(Some(location)) if !location.is_empty() => location,
            Ok(_) => self.config.default_location.clone(),
            Err(err) => {
                log::warn!("weather location load failed: {err}");
                self.config.default_location.clone()
            }
        }
    }

    /// Persists the default weather location.
    pub async fn set_default_location(&self, location: &str) -> Result<(), String> {
        self.host
            .prefs
            .save_pref(&self.config.weather_key, location)
            .await
    }

    /// Returns the projects printed by the last successful `projects` listing.
    pub fn last_projects(&self) -> Vec<ProjectSummary> {
        self.projects.borrow().clone()
    }

    pub(crate) fn remember_projects(&self, projects: Vec<ProjectSummary>) {
        *self.projects.borrow_mut() = projects;
    }

    fn fallback_theme(&self) -> String {
        if self.config.is_theme("default") {
            "default".to_string()
        } else {
            self.config.themes.first().cloned().unwrap_or_default()
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use platform_host::MemoryPrefsStore;
    use pretty_assertions::assert_eq;

    use super::*;

    fn services_with(prefs: &MemoryPrefsStore) -> TerminalServices {
        TerminalServices::new(
            HostServices {
                prefs: Rc::new(prefs.clone()),
                ..HostServices::noop()
            },
            TerminalConfig::default(),
        )
    }

    #[test]
    fn unknown_persisted_theme_falls_back_to_default() {
        let prefs = MemoryPrefsStore::default();
        prefs.insert_raw("portfolio.terminal.theme", "neon");
        let services = services_with(&prefs);
        let applied = Rc::new(RefCell::new(Vec::new()));
        let sink = applied.clone();
        services.on_theme_change(Rc::new(move |name: &str| {
            sink.borrow_mut().push(name.to_string());
        }));

        assert_eq!(block_on(services.restore_theme()), "default");
        assert_eq!(*applied.borrow(), vec!["default".to_string()]);
        assert_eq!(
            prefs.raw("portfolio.terminal.theme").as_deref(),
            Some("default")
        );
    }

    #[test]
    fn weather_location_is_stored_as_raw_text() {
        let prefs = MemoryPrefsStore::default();
        let services = services_with(&prefs);
        assert_eq!(block_on(services.default_location()), "Asia");

        block_on(services.set_default_location("New York")).expect("save location");
        assert_eq!(
            prefs.raw("portfolio.terminal.weather.location").as_deref(),
            Some("New York")
        );
        assert_eq!(block_on(services.default_location()), "New York");
    }
}
