use std::future::Future;

use platform_host::{is_safe_link, HttpRequest, HttpResponse};
use serde::de::DeserializeOwned;
use terminal_contract::{CommandDescriptor, CommandError, CommandResult, LinePart};
use terminal_core::{handler, CommandContext, CommandHandler};

use crate::{CommandRegistration, TerminalServices};

mod crypto;
mod info;
mod kv;
mod media;
mod net;
mod projects;
mod shell;
mod system;
mod theme;
mod weather;

pub(crate) fn registrations(services: &TerminalServices) -> Vec<CommandRegistration> {
    let mut registrations = Vec::new();
    registrations.extend(shell::registrations(services));
    registrations.extend(info::registrations(services));
    registrations.extend(system::registrations(services));
    registrations.extend(theme::registrations(services));
    registrations.extend(weather::registrations(services));
    registrations.extend(projects::registrations(services));
    registrations.extend(media::registrations(services));
    registrations.extend(net::registrations(services));
    registrations.extend(crypto::registrations(services));
    registrations.extend(kv::registrations(services));
    registrations
}

fn registration(
    name: &str,
    description: &str,
    usage: &str,
    handler: CommandHandler,
) -> CommandRegistration {
    CommandRegistration {
        descriptor: CommandDescriptor::new(name, description, usage),
        handler,
    }
}

/// Binds an async command function to a clone of the shared services.
fn bound<F, Fut>(services: &TerminalServices, run: F) -> CommandHandler
where
    F: Fn(CommandContext, TerminalServices) -> Fut + 'static,
    Fut: Future<Output = CommandResult> + 'static,
{
    let services = services.clone();
    handler(move |context| run(context, services.clone()))
}

fn usage_error(usage: &str) -> CommandError {
    CommandError::usage(format!("Usage: {usage}"))
}

/// Prints `message` for a handled failure; aborts keep propagating.
fn report_failure(context: &CommandContext, error: CommandError, message: &str) -> CommandResult {
    if error.is_aborted() {
        return Err(error);
    }
    log::debug!("`{}` failed: {error}", context.name);
    context.bad(message);
    Ok(())
}

/// Parses a numeric argument. Missing, non-numeric, and zero values take `default`.
fn count_arg(raw: Option<&str>, default: u64, min: u64, max: u64) -> u64 {
    let value = raw
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite() && *value != 0.0)
        .unwrap_or(default as f64);
    value.clamp(min as f64, max as f64) as u64
}

/// Returns the value following `flag`, if both are present.
fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    let index = args.iter().position(|arg| arg == flag)?;
    args.get(index + 1).map(String::as_str)
}

/// Parses a millisecond flag; invalid values take `default`.
fn ms_flag(args: &[String], flag: &str, default: u64) -> u64 {
    flag_value(args, flag)
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite() && *value >= 0.0)
        .map_or(default, |value| value.round() as u64)
}

/// Parses a `--timeout` value. Zero, negative, and non-numeric values disable the deadline.
fn parse_timeout(raw: Option<&str>) -> Option<u64> {
    raw.and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|ms| ms.is_finite() && *ms > 0.0)
        .map(|ms| ms.round().max(1.0) as u64)
}

/// Reads `--timeout`: `default` when the flag is absent, otherwise [`parse_timeout`].
fn timeout_flag(args: &[String], default: u64) -> Option<u64> {
    if has_flag(args, "--timeout") {
        parse_timeout(flag_value(args, "--timeout"))
    } else {
        Some(default)
    }
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|arg| arg == flag)
}

/// Returns a link part when `href` uses an allowed scheme.
fn link(href: &str, label: &str) -> Option<LinePart> {
    is_safe_link(href).then(|| LinePart::Link {
        href: href.to_string(),
        label: label.to_string(),
    })
}

fn text(text: impl Into<String>) -> LinePart {
    LinePart::Text { text: text.into() }
}

/// Sends `request`, racing cancellation and an optional deadline.
///
/// Transport errors and timeouts surface as [`CommandError::Transport`].
async fn send(
    context: &CommandContext,
    services: &TerminalServices,
    request: HttpRequest,
    timeout_ms: Option<u64>,
) -> CommandResult<HttpResponse> {
    let http = services.host.http.clone();
    let response = match timeout_ms {
        Some(timeout_ms) => {
            context
                .cancel
                .with_timeout(services.host.timer.as_ref(), timeout_ms, http.send(request))
                .await?
        }
        None => context.cancel.guard(http.send(request)).await?,
    };
    response.map_err(CommandError::transport)
}

/// Sends `request` and decodes a successful JSON body.
async fn fetch_json<T: DeserializeOwned>(
    context: &CommandContext,
    services: &TerminalServices,
    request: HttpRequest,
    timeout_ms: Option<u64>,
) -> CommandResult<T> {
    let response = send(context, services, request, timeout_ms).await?;
    if !response.is_success() {
        return Err(CommandError::transport(format!("HTTP {}", response.status)));
    }
    decode_json(&response)
}

fn decode_json<T: DeserializeOwned>(response: &HttpResponse) -> CommandResult<T> {
    serde_json::from_slice(&response.body).map_err(|err| CommandError::transport(err.to_string()))
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn count_arg_defaults_and_clamps() {
        assert_eq!(count_arg(None, 40, 1, 400), 40);
        assert_eq!(count_arg(Some("abc"), 40, 1, 400), 40);
        assert_eq!(count_arg(Some("0"), 40, 1, 400), 40);
        assert_eq!(count_arg(Some("-3"), 40, 1, 400), 1);
        assert_eq!(count_arg(Some("9000"), 40, 1, 400), 400);
        assert_eq!(count_arg(Some("12"), 40, 1, 400), 12);
    }

    #[test]
    fn flags_read_their_following_value() {
        let args = args(&["https://a.test", "3", "--interval", "250", "--timeout"]);
        assert_eq!(ms_flag(&args, "--interval", 500), 250);
        assert_eq!(ms_flag(&args, "--timeout", 8000), 8000);
        assert_eq!(timeout_flag(&args, 8000), None);
        assert_eq!(timeout_flag(&args[..2], 8000), Some(8000));
        assert!(has_flag(&args, "--interval"));
        assert!(!has_flag(&args, "--cors"));
    }

    #[test]
    fn non_positive_timeouts_disable_the_deadline() {
        assert_eq!(parse_timeout(Some("250")), Some(250));
        assert_eq!(parse_timeout(Some("0")), None);
        assert_eq!(parse_timeout(Some("-5")), None);
        assert_eq!(parse_timeout(Some("abc")), None);
        assert_eq!(parse_timeout(None), None);
    }

    #[test]
    fn links_are_limited_to_safe_schemes() {
        assert!(link("https://example.com", "site").is_some());
        assert!(link("mailto:a@b.test", "mail").is_some());
        assert_eq!(link("javascript:alert(1)", "x"), None);
    }
}
