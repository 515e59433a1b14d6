use platform_host::is_safe_link;
use terminal_contract::{CommandError, CommandResult};
use terminal_core::CommandContext;

use super::{bound, registration, usage_error};
use crate::{CommandRegistration, TerminalServices};

pub(super) fn registrations(services: &TerminalServices) -> Vec<CommandRegistration> {
    vec![
        registration(
            "open",
            "Open a link in a new tab",
            "open <url>",
            bound(services, open),
        ),
        registration(
            "clip",
            "Clipboard read/write",
            "clip read | clip write <text>",
            bound(services, clip),
        ),
    ]
}

async fn open(context: CommandContext, services: TerminalServices) -> CommandResult {
    let url = context.arg(0).ok_or_else(|| usage_error("open <url>"))?;
    if !is_safe_link(url) {
        context.bad("Blocked: only http/https/mailto allowed.");
        return Ok(());
    }
    services
        .host
        .external_urls
        .open_url(url)
        .await
        .map_err(CommandError::unavailable)?;
    context.good(format!("Opened: {url}"));
    Ok(())
}

async fn clip(context: CommandContext, services: TerminalServices) -> CommandResult {
    let clipboard = services.host.clipboard.clone();
    match context.arg(0).map(str::to_lowercase).as_deref() {
        Some("read") => match context.cancel.guard(clipboard.read_text()).await? {
            Ok(text) => context.muted(text),
            Err(err) => {
                log::debug!("clipboard read failed: {err}");
                context.bad("Clipboard read blocked by browser.");
            }
        },
        Some("write") => {
            let text = context.args[1..].join(" ");
            if text.is_empty() {
                return Err(usage_error("clip write <text>"));
            }
            match context.cancel.guard(clipboard.write_text(&text)).await? {
                Ok(()) => context.good("Copied."),
                Err(err) => {
                    log::debug!("clipboard write failed: {err}");
                    context.bad("Clipboard write blocked by browser.");
                }
            }
        }
        _ => return Err(usage_error("clip read | clip write <text>")),
    }
    Ok(())
}
