use std::cmp::Reverse;

use chrono::DateTime;
use platform_host::{cache_get_timed_with, cache_put_timed_with, CacheLookup, HttpRequest};
use serde::{Deserialize, Serialize};
use terminal_contract::{CommandError, CommandResult, LinePart};
use terminal_core::CommandContext;

use super::{bound, fetch_json, link, registration, report_failure, text};
use crate::{CommandRegistration, ProjectSummary, TerminalServices};

const CACHE_NAME: &str = "terminal.projects";
const LISTED_PROJECTS: usize = 10;

pub(super) fn registrations(services: &TerminalServices) -> Vec<CommandRegistration> {
    vec![registration(
        "projects",
        "List deployed GitHub projects",
        "projects | projects refresh | projects open <n> | projects live <n>",
        bound(services, projects),
    )]
}

/// Repository fields read from the GitHub REST listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct GithubRepo {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    html_url: String,
    #[serde(default)]
    homepage: Option<String>,
    #[serde(default)]
    has_pages: bool,
    #[serde(default)]
    fork: bool,
    #[serde(default)]
    archived: bool,
    #[serde(default)]
    pushed_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
}

impl GithubRepo {
    fn homepage(&self) -> &str {
        self.homepage.as_deref().map(str::trim).unwrap_or_default()
    }

    fn is_deployed(&self) -> bool {
        !self.homepage().is_empty() || self.has_pages
    }

    fn live_url(&self, owner: &str) -> String {
        if !self.homepage().is_empty() {
            self.homepage().to_string()
        } else if self.has_pages {
            format!("https://{}.github.io/{}/", owner.to_lowercase(), self.name)
        } else {
            String::new()
        }
    }

    fn last_activity_ms(&self) -> i64 {
        self.pushed_at
            .as_deref()
            .or(self.updated_at.as_deref())
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map_or(0, |time| time.timestamp_millis())
    }
}

fn cache_key(owner: &str) -> String {
    format!("gh_deployed_{owner}_v1")
}

/// Keeps live, non-fork, non-archived repositories, most recently pushed first.
fn deployed_projects(mut repos: Vec<GithubRepo>, owner: &str) -> Vec<ProjectSummary> {
    repos.retain(|repo| !repo.fork && !repo.archived && repo.is_deployed());
    repos.sort_by_key(|repo| Reverse(repo.last_activity_ms()));
    repos
        .into_iter()
        .take(LISTED_PROJECTS)
        .map(|repo| ProjectSummary {
            live: repo.live_url(owner),
            description: repo
                .description
                .filter(|description| !description.is_empty())
                .unwrap_or_else(|| "No description".to_string()),
            language: repo.language.unwrap_or_default(),
            stars: repo.stargazers_count,
            url: repo.html_url,
            name: repo.name,
        })
        .collect()
}

/// Formats a count with a `K`/`M` suffix, keeping one decimal unless exact.
fn format_count(count: u64) -> String {
    let scaled = |unit: u64, suffix: &str| {
        if count % unit == 0 {
            format!("{}{suffix}", count / unit)
        } else {
            format!("{:.1}{suffix}", count as f64 / unit as f64)
        }
    };
    if count >= 1_000_000 {
        scaled(1_000_000, "M")
    } else if count >= 1_000 {
        scaled(1_000, "K")
    } else {
        count.to_string()
    }
}

fn project_parts(index: usize, project: &ProjectSummary) -> Vec<LinePart> {
    let language = if project.language.is_empty() {
        String::new()
    } else {
        format!(" • {}", project.language)
    };
    let mut parts = vec![
        text(format!("{:>2}. {}", index + 1, project.name)),
        text(format!(
            "   ★{}{language} — {}  ",
            format_count(project.stars),
            project.description
        )),
    ];
    parts.extend(link(&project.url, "GitHub"));
    if let Some(live) = link(&project.live, "Live") {
        parts.push(text("  "));
        parts.push(live);
    }
    parts
}

/// Loads the owner's repositories, serving a fresh cache entry unless `force` is set.
///
/// A failed fetch falls back to an expired entry when one exists.
async fn load_repos(
    context: &CommandContext,
    services: &TerminalServices,
    force: bool,
) -> CommandResult<Vec<GithubRepo>> {
    let owner = &services.config.project_owner;
    let key = cache_key(owner);
    let cache = services.host.cache.as_ref();
    let lookup = cache_get_timed_with(
        cache,
        CACHE_NAME,
        &key,
        services.host.timer.now_ms(),
        services.config.projects_ttl_ms,
    )
    .await
    .unwrap_or_else(|err| {
        log::warn!("projects cache read failed: {err}");
        CacheLookup::Missing
    });
    let stale = match lookup {
        CacheLookup::Fresh(repos) if !force => return Ok(repos),
        other => other.into_any(),
    };

    let request = HttpRequest::get(format!(
        "https://api.github.com/users/{owner}/repos?per_page=100&sort=updated"
    ))
    .with_header("Accept", "application/vnd.github+json")
    .no_store();
    match fetch_json::<Vec<GithubRepo>>(context, services, request, None).await {
        Ok(repos) => {
            let now = services.host.timer.now_ms();
            if let Err(err) = cache_put_timed_with(cache, CACHE_NAME, &key, now, &repos).await {
                log::warn!("projects cache write failed: {err}");
            }
            Ok(repos)
        }
        Err(err) if err.is_aborted() => Err(err),
        Err(err) => match stale {
            Some(repos) => {
                log::warn!("serving cached projects after fetch failure: {err}");
                Ok(repos)
            }
            None => Err(err),
        },
    }
}

async fn projects(context: CommandContext, services: TerminalServices) -> CommandResult {
    let subcommand = context.arg(0).unwrap_or_default().to_lowercase();
    if subcommand == "open" || subcommand == "live" {
        return open_project(&context, &services, subcommand == "live").await;
    }

    let owner = &services.config.project_owner;
    context.muted(format!("Fetching projects ({owner}) ... (Ctrl+C to abort)"));
    let repos = match load_repos(&context, &services, subcommand == "refresh").await {
        Ok(repos) => repos,
        Err(err) => {
            return report_failure(
                &context,
                err,
                "Failed to load projects (rate limit or network).",
            )
        }
    };

    let listed = deployed_projects(repos, owner);
    services.remember_projects(listed.clone());
    if listed.is_empty() {
        context.muted("No deployed projects found.");
        return Ok(());
    }
    context.muted("Deployed Projects:");
    for (index, project) in listed.iter().enumerate() {
        context.muted(project_parts(index, project));
    }
    context.muted("Use: projects open 1 | projects live 1 | projects refresh");
    Ok(())
}

async fn open_project(
    context: &CommandContext,
    services: &TerminalServices,
    live: bool,
) -> CommandResult {
    let listed = services.last_projects();
    let Some(project) = context
        .arg(1)
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .and_then(|number| number.checked_sub(1))
        .and_then(|index| listed.get(index))
    else {
        context.bad("Invalid index. Run: projects");
        return Ok(());
    };
    let href = if live { &project.live } else { &project.url };
    if link(href, href).is_none() {
        context.bad("No link available.");
        return Ok(());
    }
    services
        .host
        .external_urls
        .open_url(href)
        .await
        .map_err(CommandError::unavailable)?;
    context.good(format!("Opened: {href}"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use platform_host::HttpResponse;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::commands::fixture::Fixture;

    const REPOS_URL: &str = "https://api.github.com/users/nemesis/repos";

    fn repos_body() -> String {
        json!([
            {
                "name": "site", "description": "Portfolio", "language": "Rust",
                "stargazers_count": 1500, "html_url": "https://github.com/nemesis/site",
                "homepage": "https://nemesis.dev", "has_pages": false,
                "fork": false, "archived": false, "pushed_at": "2024-03-01T00:00:00Z"
            },
            {
                "name": "blog", "description": null, "language": null,
                "stargazers_count": 3, "html_url": "https://github.com/nemesis/blog",
                "homepage": "", "has_pages": true,
                "fork": false, "archived": false, "pushed_at": "2024-05-01T00:00:00Z"
            },
            {
                "name": "fork", "html_url": "https://github.com/nemesis/fork",
                "homepage": "https://fork.dev", "fork": true,
                "pushed_at": "2024-06-01T00:00:00Z"
            },
            {
                "name": "tool", "html_url": "https://github.com/nemesis/tool",
                "homepage": null, "has_pages": false,
                "pushed_at": "2024-07-01T00:00:00Z"
            }
        ])
        .to_string()
    }

    #[test]
    fn counts_use_compact_suffixes() {
        assert_eq!(format_count(999), "999");
        assert_eq!(format_count(1_000), "1K");
        assert_eq!(format_count(1_500), "1.5K");
        assert_eq!(format_count(2_000_000), "2M");
        assert_eq!(format_count(2_340_000), "2.3M");
    }

    #[test]
    fn lists_deployed_projects_newest_first_and_caches_them() {
        let fixture = Fixture::new();
        fixture
            .http
            .respond(REPOS_URL, HttpResponse::ok_text(repos_body()));

        assert_eq!(
            fixture.run("projects"),
            vec![
                "$ projects",
                "Fetching projects (nemesis) ... (Ctrl+C to abort)",
                "Deployed Projects:",
                " 1. blog   ★3 — No description  GitHub  Live",
                " 2. site   ★1.5K • Rust — Portfolio  GitHub  Live",
                "Use: projects open 1 | projects live 1 | projects refresh",
            ]
        );
        let request = &fixture.http.requests()[0];
        assert_eq!(
            request.headers,
            vec![(
                "Accept".to_string(),
                "application/vnd.github+json".to_string()
            )]
        );
        assert_eq!(
            fixture.services.last_projects()[0].live,
            "https://nemesis.github.io/blog/"
        );

        fixture.run("projects");
        assert_eq!(fixture.http.requests().len(), 1);
    }

    #[test]
    fn open_and_live_use_the_last_listing() {
        let fixture = Fixture::new();
        assert_eq!(
            fixture.run("projects open 1"),
            vec!["$ projects open 1", "Invalid index. Run: projects"]
        );

        fixture
            .http
            .respond(REPOS_URL, HttpResponse::ok_text(repos_body()));
        fixture.run("projects");
        assert_eq!(
            fixture.run("projects live 2"),
            vec!["$ projects live 2", "Opened: https://nemesis.dev"]
        );
        fixture.run("projects open 1");
        assert_eq!(
            fixture.urls.opened(),
            vec![
                "https://nemesis.dev".to_string(),
                "https://github.com/nemesis/blog".to_string(),
            ]
        );
    }

    #[test]
    fn failed_fetch_falls_back_to_expired_cache() {
        let fixture = Fixture::new();
        let repos: Vec<GithubRepo> = serde_json::from_str(&repos_body()).expect("repos");
        futures::executor::block_on(cache_put_timed_with(
            &fixture.cache,
            CACHE_NAME,
            "gh_deployed_nemesis_v1",
            0,
            &repos,
        ))
        .expect("seed cache");
        fixture.timer.advance(11 * 60 * 1000);
        fixture.http.fail(REPOS_URL, "rate limited");

        let out = fixture.run("projects refresh");
        assert_eq!(out[2], "Deployed Projects:");
        assert_eq!(fixture.http.requests().len(), 1);
    }

    #[test]
    fn failed_fetch_without_cache_reports_failure() {
        let fixture = Fixture::new();
        fixture
            .http
            .respond(REPOS_URL, HttpResponse::with_status(403, "{}"));
        assert_eq!(
            fixture.run("projects"),
            vec![
                "$ projects",
                "Fetching projects (nemesis) ... (Ctrl+C to abort)",
                "Failed to load projects (rate limit or network).",
            ]
        );
    }
}
