//! User key-value commands over the host preference store.
//!
//! Keys are stored verbatim, alongside the terminal's own preference keys.

use terminal_contract::CommandResult;
use terminal_core::CommandContext;

use super::{bound, registration, usage_error};
use crate::{CommandRegistration, TerminalServices};

pub(super) fn registrations(services: &TerminalServices) -> Vec<CommandRegistration> {
    vec![
        registration(
            "kset",
            "Key-value set (localStorage)",
            "kset <key> <value>",
            bound(services, kset),
        ),
        registration(
            "kget",
            "Key-value get (localStorage)",
            "kget <key>",
            bound(services, kget),
        ),
        registration(
            "kdel",
            "Key-value delete (localStorage)",
            "kdel <key>",
            bound(services, kdel),
        ),
        registration(
            "kls",
            "List keys (localStorage)",
            "kls [prefix]",
            bound(services, kls),
        ),
    ]
}

async fn kset(context: CommandContext, services: TerminalServices) -> CommandResult {
    let key = context.arg(0).unwrap_or_default();
    let value = context.args.get(1..).unwrap_or_default().join(" ");
    if key.is_empty() || value.is_empty() {
        return Err(usage_error("kset <key> <value>"));
    }
    match services.host.prefs.save_pref(key, &value).await {
        Ok(()) => context.good("OK"),
        Err(err) => {
            log::warn!("kset {key} failed: {err}");
            context.bad("localStorage blocked/full.");
        }
    }
    Ok(())
}

async fn kget(context: CommandContext, services: TerminalServices) -> CommandResult {
    let key = context.arg(0).ok_or_else(|| usage_error("kget <key>"))?;
    match services.host.prefs.load_pref(key).await {
        Ok(value) => context.muted(value.unwrap_or_default()),
        Err(err) => {
            log::warn!("kget {key} failed: {err}");
            context.bad("localStorage blocked.");
        }
    }
    Ok(())
}

async fn kdel(context: CommandContext, services: TerminalServices) -> CommandResult {
    let key = context.arg(0).ok_or_else(|| usage_error("kdel <key>"))?;
    match services.host.prefs.delete_pref(key).await {
        Ok(()) => context.good("OK"),
        Err(err) => {
            log::warn!("kdel {key} failed: {err}");
            context.bad("localStorage blocked.");
        }
    }
    Ok(())
}

async fn kls(context: CommandContext, services: TerminalServices) -> CommandResult {
    let prefix = context.arg(0).unwrap_or_default();
    let keys = services
        .host
        .prefs
        .list_pref_keys(prefix)
        .await
        .unwrap_or_else(|err| {
            log::warn!("kls failed: {err}");
            Vec::new()
        });
    if keys.is_empty() {
        context.muted("No keys.");
        return Ok(());
    }
    for key in keys {
        context.muted(key);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::commands::fixture::Fixture;

    #[test]
    fn set_get_list_and_delete() {
        let fixture = Fixture::new();
        assert_eq!(
            fixture.run("kset note.todo buy milk"),
            vec!["$ kset note.todo buy milk", "OK"]
        );
        fixture.run("kset note.idea ship it");
        assert_eq!(fixture.prefs.raw("note.todo").as_deref(), Some("buy milk"));
        assert_eq!(fixture.run("kget note.todo"), vec!["$ kget note.todo", "buy milk"]);
        assert_eq!(
            fixture.run("kls note."),
            vec!["$ kls note.", "note.idea", "note.todo"]
        );
        assert_eq!(fixture.run("kdel note.todo"), vec!["$ kdel note.todo", "OK"]);
        assert_eq!(fixture.run("kget note.todo"), vec!["$ kget note.todo", ""]);
        assert_eq!(fixture.run("kls zzz"), vec!["$ kls zzz", "No keys."]);
    }

    #[test]
    fn missing_arguments_print_usage() {
        let fixture = Fixture::new();
        assert_eq!(
            fixture.run("kset lonely"),
            vec!["$ kset lonely", "Usage: kset <key> <value>"]
        );
        assert_eq!(fixture.run("kget"), vec!["$ kget", "Usage: kget <key>"]);
        assert_eq!(fixture.run("kdel"), vec!["$ kdel", "Usage: kdel <key>"]);
    }
}
