use chrono::DateTime;
use terminal_contract::CommandResult;
use terminal_core::{handler, CommandContext};

use super::{bound, has_flag, link, registration, text};
use crate::{CommandRegistration, TerminalServices};

const CONTACTS: [(&str, &str); 3] = [
    ("https://t.me/Nemesis", "Telegram: @Nemesis"),
    ("mailto:zknisme@gmail.com", "Email: nemesis@gmail.com"),
    (
        "https://discord.com/users/1116977479840706601",
        "Discord: @nemesisxo6969",
    ),
];

pub(super) fn registrations(services: &TerminalServices) -> Vec<CommandRegistration> {
    vec![
        registration(
            "about",
            "Show about info",
            "about",
            handler(|context| async move {
                context.muted("@nemesis — web terminal.");
                context.muted(
                    "Try: curl | ping | dig | rdap | sha256 | base64 | jwt | passgen | projects | \
                     contact",
                );
                Ok(())
            }),
        ),
        registration("now", "Show current time", "now", bound(services, now)),
        registration(
            "date",
            "Alias for now",
            "date",
            handler(|context| async move { context.dispatch("now", context.args.clone()).await }),
        ),
        registration(
            "whoami",
            "Show browser identity",
            "whoami",
            bound(services, whoami),
        ),
        registration(
            "uname",
            "Show system info (browser)",
            "uname [-a]",
            bound(services, uname),
        ),
        registration(
            "contact",
            "Show contact info",
            "contact",
            handler(contact),
        ),
    ]
}

/// Formats a unix timestamp the way `now` prints it.
fn format_timestamp(ms: u64) -> String {
    match i64::try_from(ms).ok().and_then(DateTime::from_timestamp_millis) {
        Some(time) => time.format("%a %b %d %Y %H:%M:%S UTC").to_string(),
        None => format!("{ms} ms since epoch"),
    }
}

async fn now(context: CommandContext, services: TerminalServices) -> CommandResult {
    context.muted(format_timestamp(services.host.timer.now_ms()));
    Ok(())
}

async fn whoami(context: CommandContext, services: TerminalServices) -> CommandResult {
    let info = &services.host.info;
    context.muted(format!("UA: {}", info.user_agent));
    context.muted(format!(
        "Lang: {} • Platform: {}",
        info.language,
        platform_label(&info.platform)
    ));
    Ok(())
}

async fn uname(context: CommandContext, services: TerminalServices) -> CommandResult {
    if !has_flag(&context.args, "-a") {
        context.muted("WebOS");
        return Ok(());
    }
    let info = &services.host.info;
    context.muted(format!(
        "WebOS • {} • {}",
        platform_label(&info.platform),
        info.user_agent
    ));
    Ok(())
}

async fn contact(context: CommandContext) -> CommandResult {
    context.muted("Contact:");
    for (href, label) in CONTACTS {
        let part = link(href, label).unwrap_or_else(|| text(label));
        context.muted(vec![part]);
    }
    Ok(())
}

fn platform_label(platform: &str) -> &str {
    if platform.is_empty() {
        "?"
    } else {
        platform
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use terminal_contract::{LineContent, LinePart};

    use super::*;
    use crate::commands::fixture::Fixture;

    #[test]
    fn timestamps_format_in_utc() {
        assert_eq!(format_timestamp(0), "Thu Jan 01 1970 00:00:00 UTC");
        assert_eq!(
            format_timestamp(1_700_000_000_000),
            "Tue Nov 14 2023 22:13:20 UTC"
        );
    }

    #[test]
    fn date_delegates_to_now() {
        let fixture = Fixture::new();
        fixture.timer.advance(86_400_000);
        assert_eq!(
            fixture.run("date"),
            vec!["$ date", "Fri Jan 02 1970 00:00:00 UTC"]
        );
    }

    #[test]
    fn identity_commands_read_host_info() {
        let fixture = Fixture::new();
        assert_eq!(
            fixture.run("whoami"),
            vec![
                "$ whoami",
                "UA: TestAgent/1.0",
                "Lang: en-US • Platform: Linux x86_64",
            ]
        );
        assert_eq!(fixture.run("uname"), vec!["$ uname", "WebOS"]);
        assert_eq!(
            fixture.run("uname -a"),
            vec!["$ uname -a", "WebOS • Linux x86_64 • TestAgent/1.0"]
        );
    }

    #[test]
    fn contact_renders_links() {
        let fixture = Fixture::new();
        fixture.run("contact");
        let lines = fixture.engine.pane().lines();
        assert_eq!(lines[1].text(), "Contact:");
        assert_eq!(
            lines[3].content,
            LineContent::Parts {
                parts: vec![LinePart::Link {
                    href: "mailto:zknisme@gmail.com".to_string(),
                    label: "Email: nemesis@gmail.com".to_string(),
                }],
            }
        );
    }
}
