use terminal_contract::CommandResult;
use terminal_core::{handler, CommandContext};

use super::{bound, count_arg, registration, usage_error};
use crate::{CommandRegistration, TerminalServices};

const TIPS: &str =
    "Tips: ↑/↓ history, Tab autocomplete, Ctrl+L clear, Ctrl+C abort, use ';' to chain";

pub(super) fn registrations(services: &TerminalServices) -> Vec<CommandRegistration> {
    vec![
        registration(
            "help",
            "Show available commands",
            "help [command]",
            handler(help),
        ),
        registration(
            "man",
            "Alias for help",
            "man [command]",
            handler(|context| async move { context.dispatch("help", context.args.clone()).await }),
        ),
        registration(
            "clear",
            "Clear terminal output",
            "clear",
            handler(|context| async move {
                context.clear_output();
                Ok(())
            }),
        ),
        registration(
            "history",
            "Show command history",
            "history [n]",
            handler(history),
        ),
        registration(
            "echo",
            "Print text",
            "echo <text>",
            handler(|context| async move {
                context.plain(context.args.join(" "));
                Ok(())
            }),
        ),
        registration(
            "sleep",
            "Wait (useful for chaining)",
            "sleep <ms>",
            bound(services, sleep),
        ),
    ]
}

async fn help(context: CommandContext) -> CommandResult {
    if let Some(query) = context.arg(0) {
        let Some(command) = context.registry().lookup(query) else {
            context.bad(format!("No help for: {query}"));
            return Ok(());
        };
        let descriptor = command.descriptor;
        context.muted(format!("{query} — {}", descriptor.description));
        if !descriptor.usage.is_empty() {
            context.muted(format!("Usage: {}", descriptor.usage));
        }
        return Ok(());
    }

    context.muted("Commands:");
    for descriptor in context.registry().descriptors() {
        if descriptor.description.is_empty() {
            context.muted(format!("- {}", descriptor.name));
        } else {
            context.muted(format!("- {}: {}", descriptor.name, descriptor.description));
        }
    }
    context.muted(TIPS);
    Ok(())
}

async fn history(context: CommandContext) -> CommandResult {
    let count = count_arg(context.arg(0), 40, 1, 400) as usize;
    let entries = context.history_entries();
    let tail = &entries[entries.len().saturating_sub(count)..];
    if tail.is_empty() {
        context.muted("No history.");
        return Ok(());
    }
    for (index, entry) in tail.iter().enumerate() {
        context.muted(format!("{:>3}  {entry}", index + 1));
    }
    Ok(())
}

async fn sleep(context: CommandContext, services: TerminalServices) -> CommandResult {
    let ms = context
        .arg(0)
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|ms| ms.is_finite() && *ms >= 0.0)
        .ok_or_else(|| usage_error("sleep <ms>"))?
        .round() as u64;
    context
        .cancel
        .sleep(services.host.timer.as_ref(), ms)
        .await?;
    context.muted(format!("Slept {ms}ms"));
    Ok(())
}
