use terminal_contract::CommandResult;
use terminal_core::CommandContext;

use super::{bound, registration};
use crate::{CommandRegistration, TerminalServices};

pub(super) fn registrations(services: &TerminalServices) -> Vec<CommandRegistration> {
    vec![registration(
        "theme",
        "Set or list terminal themes",
        "theme [name] | theme list | theme current",
        bound(services, theme),
    )]
}

async fn theme(context: CommandContext, services: TerminalServices) -> CommandResult {
    let requested = context.arg(0).unwrap_or_default().to_lowercase();
    let available = services.config.themes.join(", ");
    match requested.as_str() {
        "" | "list" => {
            context.muted(format!("Themes: {available}"));
            context.muted(format!("Current: {}", services.current_theme().await));
        }
        "current" => context.muted(format!("Current: {}", services.current_theme().await)),
        name if !services.config.is_theme(name) => {
            context.bad(format!("Unknown theme: {name}"));
            context.muted(format!("Available: {available}"));
        }
        name => {
            let applied = services.apply_theme(name).await;
            context.good(format!("Theme set: {applied}"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use pretty_assertions::assert_eq;

    use crate::commands::fixture::Fixture;

    #[test]
    fn lists_and_sets_themes() {
        let fixture = Fixture::new();
        let applied = Rc::new(RefCell::new(Vec::new()));
        let sink = applied.clone();
        fixture.services.on_theme_change(Rc::new(move |name: &str| {
            sink.borrow_mut().push(name.to_string());
        }));

        assert_eq!(
            fixture.run("theme"),
            vec![
                "$ theme",
                "Themes: default, matrix, amber, ice, mono",
                "Current: default",
            ]
        );
        assert_eq!(fixture.run("theme AMBER"), vec!["$ theme AMBER", "Theme set: amber"]);
        assert_eq!(fixture.run("theme current"), vec!["$ theme current", "Current: amber"]);
        assert_eq!(
            fixture.prefs.raw("portfolio.terminal.theme").as_deref(),
            Some("amber")
        );
        assert_eq!(*applied.borrow(), vec!["amber".to_string()]);
    }

    #[test]
    fn unknown_theme_lists_alternatives() {
        let fixture = Fixture::new();
        assert_eq!(
            fixture.run("theme neon"),
            vec![
                "$ theme neon",
                "Unknown theme: neon",
                "Available: default, matrix, amber, ice, mono",
            ]
        );
    }
}
