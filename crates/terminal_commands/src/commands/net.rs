//! Network probes: `ping`, `curl`, `download`, `dig`, `ip`, and `rdap`.
//!
//! Every request races the execution's cancellation signal and a per-request deadline. An
//! elapsed deadline is a transport failure and prints the command's diagnostic; only the
//! cancellation signal aborts the command.

use platform_host::{DownloadFile, FetchMode, HttpRequest};
use serde::Deserialize;
use serde_json::Value;
use terminal_contract::{CommandError, CommandResult};
use terminal_core::CommandContext;

use super::{
    bound, count_arg, decode_json, has_flag, ms_flag, parse_timeout, registration, report_failure,
    send, timeout_flag, usage_error,
};
use crate::{CommandRegistration, TerminalServices};

const PING_TIMEOUT_MS: u64 = 8_000;
const PING_INTERVAL_MS: u64 = 500;
const CURL_TIMEOUT_MS: u64 = 15_000;
const CURL_MAX_CHARS: f64 = 3_000.0;
const DOWNLOAD_TIMEOUT_MS: u64 = 20_000;
const LOOKUP_TIMEOUT_MS: u64 = 12_000;
const RDAP_TIMEOUT_MS: u64 = 15_000;

pub(super) fn registrations(services: &TerminalServices) -> Vec<CommandRegistration> {
    vec![
        registration(
            "ping",
            "HTTP latency check (fetch)",
            "ping <url> [count] [--interval ms] [--timeout ms] [--cors|--no-cors]",
            bound(services, ping),
        ),
        registration(
            "curl",
            "HTTP request (fetch)",
            "curl <url> [-I] [-X METHOD] [-H \"K: V\"]... [-d data] [--json] [--max n] \
             [--timeout ms] [--cors|--no-cors]",
            bound(services, curl),
        ),
        registration(
            "download",
            "Download a file via fetch (needs CORS)",
            "download <url> [filename] [--timeout ms]",
            bound(services, download),
        ),
        registration(
            "dig",
            "DNS lookup via DoH (Cloudflare)",
            "dig <name> [TYPE]",
            bound(services, dig),
        ),
        registration("ip", "Show public IP", "ip", bound(services, ip)),
        registration(
            "rdap",
            "Domain/IP RDAP lookup",
            "rdap <domain|ip>",
            bound(services, rdap),
        ),
    ]
}

fn mode_label(mode: FetchMode) -> &'static str {
    match mode {
        FetchMode::Cors => "cors",
        FetchMode::NoCors => "no-cors",
    }
}

async fn ping(context: CommandContext, services: TerminalServices) -> CommandResult {
    let url = context
        .arg(0)
        .ok_or_else(|| usage_error("ping <url> [count] ..."))?
        .to_string();
    let count = count_arg(context.arg(1), 4, 1, 50);
    let interval_ms = ms_flag(&context.args, "--interval", PING_INTERVAL_MS);
    let timeout_ms = timeout_flag(&context.args, PING_TIMEOUT_MS);
    let mode = if has_flag(&context.args, "--cors") && !has_flag(&context.args, "--no-cors") {
        FetchMode::Cors
    } else {
        FetchMode::NoCors
    };
    let timer = services.host.timer.clone();

    context.muted(format!("PING {url} x{count} ({})", mode_label(mode)));
    let mut received = 0;
    for seq in 1..=count {
        let started = timer.now_ms();
        let request = HttpRequest::get(url.as_str()).with_mode(mode).no_store();
        match send(&context, &services, request, timeout_ms).await {
            Ok(response) => {
                received += 1;
                let elapsed = timer.now_ms().saturating_sub(started);
                let info = if response.opaque {
                    "opaque".to_string()
                } else {
                    format!("{} {}", response.status, response.status_text)
                        .trim()
                        .to_string()
                };
                context.good(format!("seq={seq} time={elapsed}ms {info}"));
            }
            Err(err) if err.is_aborted() => return Err(err),
            Err(err) => {
                log::debug!("ping {url} seq={seq} failed: {err}");
                let elapsed = timer.now_ms().saturating_sub(started);
                context.bad(format!("seq={seq} time={elapsed}ms failed"));
            }
        }
        if seq < count {
            context.cancel.sleep(timer.as_ref(), interval_ms).await?;
        }
    }

    let loss = ((count - received) as f64 / count as f64 * 100.0).round();
    context.muted(format!("--- {url} ---"));
    context.muted(format!("sent={count} received={received} loss={loss}%"));
    Ok(())
}

/// Request options parsed from `curl` arguments.
#[derive(Debug, PartialEq)]
struct CurlOptions {
    method: String,
    head_only: bool,
    headers: Vec<(String, String)>,
    body: Option<String>,
    max_chars: usize,
    timeout_ms: Option<u64>,
    mode: FetchMode,
}

impl CurlOptions {
    fn parse(args: &[String]) -> Self {
        let mut method = "GET".to_string();
        let mut head_only = false;
        let mut headers: Vec<(String, String)> = Vec::new();
        let mut data = None;
        let mut as_json = false;
        let mut max = CURL_MAX_CHARS;
        let mut timeout_ms = Some(CURL_TIMEOUT_MS);
        let mut mode = FetchMode::Cors;

        let mut index = 1;
        while index < args.len() {
            let next = args.get(index + 1);
            match (args[index].as_str(), next) {
                ("-I", _) => head_only = true,
                ("-X", Some(value)) => {
                    method = value.to_ascii_uppercase();
                    index += 1;
                }
                ("-H", Some(value)) => {
                    if let Some((name, header)) = value.split_once(':') {
                        if !name.is_empty() {
                            set_header(&mut headers, name.trim(), header.trim());
                        }
                    }
                    index += 1;
                }
                ("-d", Some(value)) => {
                    data = Some(value.clone());
                    index += 1;
                }
                ("--json", _) => as_json = true,
                ("--max", Some(value)) => {
                    max = value.trim().parse().unwrap_or(f64::NAN);
                    index += 1;
                }
                ("--timeout", Some(value)) => {
                    timeout_ms = parse_timeout(Some(value.as_str()));
                    index += 1;
                }
                ("--no-cors", _) => mode = FetchMode::NoCors,
                ("--cors", _) => mode = FetchMode::Cors,
                _ => {}
            }
            index += 1;
        }

        if head_only {
            method = "HEAD".to_string();
        }
        if data.is_some() && !has_flag(args, "-X") {
            method = "POST".to_string();
        }
        if let Some(data) = &data {
            let is_json = serde_json::from_str::<Value>(data).is_ok();
            if as_json && is_json && !has_header(&headers, "content-type") {
                set_header(&mut headers, "content-type", "application/json");
            }
            if !as_json && !has_header(&headers, "content-type") {
                set_header(&mut headers, "content-type", "text/plain;charset=UTF-8");
            }
        }
        if mode == FetchMode::NoCors && method == "HEAD" {
            method = "GET".to_string();
        }

        let max_chars = if max.is_finite() && max != 0.0 {
            max.clamp(0.0, 5_000_000.0) as usize
        } else {
            4_096
        };
        Self {
            method,
            head_only,
            headers,
            body: data,
            max_chars,
            timeout_ms,
            mode,
        }
    }

    fn request(&self, url: &str) -> HttpRequest {
        let mut request = HttpRequest::get(url)
            .with_method(self.method.as_str())
            .with_mode(self.mode)
            .no_store();
        for (name, value) in &self.headers {
            request = request.with_header(name.as_str(), value.as_str());
        }
        if let Some(body) = &self.body {
            request = request.with_body(body.as_str());
        }
        request
    }
}

fn has_header(headers: &[(String, String)], name: &str) -> bool {
    headers
        .iter()
        .any(|(existing, _)| existing.eq_ignore_ascii_case(name))
}

fn set_header(headers: &mut Vec<(String, String)>, name: &str, value: &str) {
    headers.retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
    headers.push((name.to_string(), value.to_string()));
}

/// Cuts `body` to `max_chars` characters, noting the original length.
fn truncate_body(body: &str, max_chars: usize) -> String {
    let total = body.chars().count();
    if total <= max_chars {
        return body.to_string();
    }
    let kept: String = body.chars().take(max_chars).collect();
    format!("{kept}\n… truncated ({total} chars)")
}

async fn curl(context: CommandContext, services: TerminalServices) -> CommandResult {
    let url = context
        .arg(0)
        .ok_or_else(|| usage_error("curl <url> ..."))?
        .to_string();
    let options = CurlOptions::parse(&context.args);
    context.muted(format!(
        "curl {url} ({}, {}) ... (Ctrl+C to abort)",
        options.method,
        mode_label(options.mode)
    ));

    let timer = services.host.timer.clone();
    let started = timer.now_ms();
    let response = match send(
        &context,
        &services,
        options.request(&url),
        options.timeout_ms,
    )
    .await
    {
        Ok(response) => response,
        Err(err) => return report_failure(&context, err, "curl failed (network/CORS/blocked)."),
    };
    let elapsed = timer.now_ms().saturating_sub(started);

    if response.opaque {
        context.muted(format!("Response: opaque • time={elapsed}ms"));
        context.muted("Tip: try --cors (if server allows CORS) to see status/headers/body.");
        return Ok(());
    }
    context.good(format!(
        "Status: {} {} • time={elapsed}ms",
        response.status, response.status_text
    ));
    if !response.headers.is_empty() {
        context.muted("Headers:");
        for (name, value) in &response.headers {
            context.muted(format!("{name}: {value}"));
        }
    }
    if options.method == "HEAD" || options.head_only {
        return Ok(());
    }

    let body = truncate_body(&response.text(), options.max_chars);
    if body.is_empty() {
        context.muted("Body: <empty>");
    } else {
        context.muted("Body:");
        context.muted(body);
    }
    Ok(())
}

async fn download(context: CommandContext, services: TerminalServices) -> CommandResult {
    let url = context
        .arg(0)
        .ok_or_else(|| usage_error("download <url> [filename]"))?
        .to_string();
    let timeout_ms = timeout_flag(&context.args, DOWNLOAD_TIMEOUT_MS);
    let file_name = context
        .arg(1)
        .filter(|name| !name.starts_with("--"))
        .unwrap_or("download")
        .to_string();

    context.muted(format!("Downloading: {url} ... (Ctrl+C to abort)"));
    let request = HttpRequest::get(url.as_str()).no_store();
    let response = match send(&context, &services, request, timeout_ms).await {
        Ok(response) => response,
        Err(err) => return report_failure(&context, err, "Download failed (CORS/network)."),
    };
    if !response.is_success() {
        context.bad(format!("HTTP {}", response.status));
        return Ok(());
    }

    let file = DownloadFile {
        file_name: file_name.clone(),
        mime_type: response
            .header("content-type")
            .unwrap_or("application/octet-stream")
            .to_string(),
        bytes: response.body,
    };
    if let Err(err) = services.host.downloads.save(file).await {
        return report_failure(
            &context,
            CommandError::unavailable(err),
            "Download failed (CORS/network).",
        );
    }
    context.good(format!("Saved: {file_name}"));
    Ok(())
}

#[derive(Debug, Deserialize)]
struct DohResponse {
    #[serde(rename = "Answer", default)]
    answer: Option<Vec<DohAnswer>>,
}

#[derive(Debug, Deserialize)]
struct DohAnswer {
    #[serde(rename = "TTL", default)]
    ttl: Option<u64>,
    #[serde(default)]
    data: String,
}

async fn dig(context: CommandContext, services: TerminalServices) -> CommandResult {
    let name = context
        .arg(0)
        .ok_or_else(|| usage_error("dig <name> [TYPE]"))?
        .to_string();
    let record_type = context.arg(1).unwrap_or("A").to_ascii_uppercase();
    let url = format!(
        "https://cloudflare-dns.com/dns-query?name={}&type={}",
        urlencoding::encode(&name),
        urlencoding::encode(&record_type)
    );
    context.muted(format!("dig {name} {record_type} ... (Ctrl+C to abort)"));

    let request = HttpRequest::get(url).with_header("accept", "application/dns-json");
    let response = match send(&context, &services, request, Some(LOOKUP_TIMEOUT_MS)).await {
        Ok(response) => response,
        Err(err) => return report_failure(&context, err, "dig failed (network)."),
    };
    if !response.is_success() {
        context.bad(format!("DoH error: HTTP {}", response.status));
        return Ok(());
    }
    let answers = match decode_json::<DohResponse>(&response) {
        Ok(decoded) => decoded.answer.unwrap_or_default(),
        Err(err) => return report_failure(&context, err, "dig failed (network)."),
    };
    if answers.is_empty() {
        context.muted("No answer.");
        return Ok(());
    }
    for answer in answers {
        let ttl = answer
            .ttl
            .map(|ttl| format!(" TTL={ttl}"))
            .unwrap_or_default();
        context.good(format!("{name} {record_type}{ttl} -> {}", answer.data));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct PublicIp {
    #[serde(default)]
    ip: Option<String>,
}

async fn ip(context: CommandContext, services: TerminalServices) -> CommandResult {
    context.muted("Fetching public IP ...");
    let request = HttpRequest::get("https://api.ipify.org?format=json");
    let response = match send(&context, &services, request, Some(LOOKUP_TIMEOUT_MS)).await {
        Ok(response) => response,
        Err(err) => return report_failure(&context, err, "ip failed (network/CORS)."),
    };
    if !response.is_success() {
        context.bad(format!("HTTP {}", response.status));
        return Ok(());
    }
    match decode_json::<PublicIp>(&response) {
        Ok(decoded) => {
            let address = decoded.ip.filter(|ip| !ip.is_empty());
            context.good(address.unwrap_or_else(|| "?".to_string()));
            Ok(())
        }
        Err(err) => report_failure(&context, err, "ip failed (network/CORS)."),
    }
}

/// Returns whether `query` looks like an IPv4 or IPv6 address.
fn looks_like_ip(query: &str) -> bool {
    !query.is_empty()
        && query
            .chars()
            .all(|ch| ch.is_ascii_hexdigit() || ch == ':' || ch == '.')
        && (query.contains('.') || query.contains(':'))
}

/// Returns the first non-empty string among `keys` of `value`.
fn first_text<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| value.get(*key).and_then(Value::as_str))
        .find(|text| !text.is_empty())
}

fn array<'a>(value: &'a Value, key: &str) -> &'a [Value] {
    value
        .get(key)
        .and_then(Value::as_array)
        .map_or(&[], Vec::as_slice)
}

async fn rdap(context: CommandContext, services: TerminalServices) -> CommandResult {
    let query = context
        .arg(0)
        .ok_or_else(|| usage_error("rdap <domain|ip>"))?
        .to_string();
    let kind = if looks_like_ip(&query) { "ip" } else { "domain" };
    let url = format!("https://rdap.org/{kind}/{}", urlencoding::encode(&query));
    context.muted(format!("rdap {query} ... (Ctrl+C to abort)"));

    let request = HttpRequest::get(url);
    let response = match send(&context, &services, request, Some(RDAP_TIMEOUT_MS)).await {
        Ok(response) => response,
        Err(err) => return report_failure(&context, err, "rdap failed (network/CORS)."),
    };
    if !response.is_success() {
        context.bad(format!("HTTP {}", response.status));
        return Ok(());
    }
    let record = match decode_json::<Value>(&response) {
        Ok(record) => record,
        Err(err) => return report_failure(&context, err, "rdap failed (network/CORS)."),
    };

    let handle = first_text(&record, &["handle", "ldhName", "name"]).unwrap_or("?");
    context.good(format!("Handle: {handle}"));
    let status = array(&record, "status")
        .iter()
        .filter_map(Value::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    if !status.is_empty() {
        context.muted(format!("Status: {status}"));
    }

    let events = array(&record, "events");
    if !events.is_empty() {
        context.muted("Events:");
        for event in events.iter().take(8) {
            context.muted(format!(
                "- {} @ {}",
                first_text(event, &["eventAction"]).unwrap_or("event"),
                first_text(event, &["eventDate"]).unwrap_or("?")
            ));
        }
    }

    let nameservers = array(&record, "nameservers");
    if !nameservers.is_empty() {
        context.muted("Nameservers:");
        for nameserver in nameservers.iter().take(12) {
            context.muted(format!(
                "- {}",
                first_text(nameserver, &["ldhName", "name"]).unwrap_or("?")
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use futures::{executor::LocalPool, task::LocalSpawnExt};
    use platform_host::HttpResponse;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use terminal_contract::EngineState;

    use super::*;
    use crate::commands::fixture::Fixture;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn curl_data_implies_post_with_text_body() {
        let options = CurlOptions::parse(&args(&["https://a.test", "-d", "hi"]));
        assert_eq!(options.method, "POST");
        assert_eq!(
            options.headers,
            vec![(
                "content-type".to_string(),
                "text/plain;charset=UTF-8".to_string()
            )]
        );

        let json = CurlOptions::parse(&args(&["https://a.test", "-X", "put", "-d", "{}", "--json"]));
        assert_eq!(json.method, "PUT");
        assert_eq!(
            json.headers,
            vec![("content-type".to_string(), "application/json".to_string())]
        );
    }

    #[test]
    fn curl_head_falls_back_to_get_without_cors() {
        let options = CurlOptions::parse(&args(&["https://a.test", "-I", "--no-cors"]));
        assert_eq!(options.method, "GET");
        assert!(options.head_only);
        assert_eq!(options.mode, FetchMode::NoCors);
        assert_eq!(options.max_chars, 3_000);
    }

    #[test]
    fn curl_prints_status_headers_and_truncated_body() {
        let fixture = Fixture::new();
        fixture.http.respond(
            "https://a.test",
            HttpResponse::ok_text("abcdefghij").with_header("Content-Type", "text/plain"),
        );
        assert_eq!(
            fixture.run("curl https://a.test --max 4"),
            vec![
                "$ curl https://a.test --max 4",
                "curl https://a.test (GET, cors) ... (Ctrl+C to abort)",
                "Status: 200 OK • time=0ms",
                "Headers:",
                "content-type: text/plain",
                "Body:",
                "abcd\n… truncated (10 chars)",
            ]
        );
    }

    #[test]
    fn curl_reports_opaque_and_failed_requests() {
        let fixture = Fixture::new();
        fixture.http.respond("https://opaque.test", HttpResponse::opaque());
        fixture.http.fail("https://down.test", "connection refused");
        let opaque = fixture.run("curl https://opaque.test --no-cors");
        assert_eq!(opaque[2], "Response: opaque • time=0ms");
        let failed = fixture.run("curl https://down.test");
        assert_eq!(failed[2], "curl failed (network/CORS/blocked).");
    }

    #[test]
    fn ping_summarizes_probes() {
        let fixture = Fixture::new();
        fixture.http.respond("https://a.test", HttpResponse::opaque());
        assert_eq!(
            fixture.run("ping https://a.test 2 --interval 0"),
            vec![
                "$ ping https://a.test 2 --interval 0",
                "PING https://a.test x2 (no-cors)",
                "seq=1 time=0ms opaque",
                "seq=2 time=0ms opaque",
                "--- https://a.test ---",
                "sent=2 received=2 loss=0%",
            ]
        );
    }

    #[test]
    fn ping_timeout_is_a_failed_probe_not_an_abort() {
        let fixture = Fixture::new();
        fixture.http.hang("https://slow.test");
        let mut pool = LocalPool::new();
        let engine = fixture.engine.clone();
        pool.spawner()
            .spawn_local(async move {
                engine
                    .submit("ping https://slow.test 1 --timeout 100 --cors")
                    .await;
            })
            .expect("spawn");

        pool.run_until_stalled();
        fixture.timer.advance(100);
        pool.run_until_stalled();
        assert_eq!(
            fixture.engine.pane().texts(),
            vec![
                "$ ping https://slow.test 1 --timeout 100 --cors",
                "PING https://slow.test x1 (cors)",
                "seq=1 time=100ms failed",
                "--- https://slow.test ---",
                "sent=1 received=0 loss=100%",
            ]
        );
        assert_eq!(fixture.engine.state(), EngineState::Idle);
    }

    #[test]
    fn zero_timeout_waits_until_cancelled() {
        let fixture = Fixture::new();
        fixture.http.hang("https://slow.test");
        let mut pool = LocalPool::new();
        let engine = fixture.engine.clone();
        pool.spawner()
            .spawn_local(async move {
                engine.submit("curl https://slow.test --timeout 0").await;
            })
            .expect("spawn");

        pool.run_until_stalled();
        fixture.timer.advance(60_000);
        pool.run_until_stalled();
        assert!(fixture.engine.is_running());
        assert_eq!(fixture.engine.pane().len(), 2);

        assert!(fixture.engine.cancel_current());
        pool.run_until_stalled();
        assert_eq!(fixture.engine.pane().texts()[2..].to_vec(), vec!["^C", "Aborted."]);
        assert_eq!(fixture.engine.state(), EngineState::Idle);
    }

    #[test]
    fn cancelling_a_lookup_aborts_it() {
        let fixture = Fixture::new();
        fixture.http.hang("https://cloudflare-dns.com/");
        let mut pool = LocalPool::new();
        let engine = fixture.engine.clone();
        pool.spawner()
            .spawn_local(async move { engine.submit("dig example.com").await })
            .expect("spawn");

        pool.run_until_stalled();
        assert!(fixture.engine.cancel_current());
        pool.run_until_stalled();
        assert_eq!(
            fixture.engine.pane().texts()[1..].to_vec(),
            vec!["dig example.com A ... (Ctrl+C to abort)", "^C", "Aborted."]
        );
        assert_eq!(fixture.engine.state(), EngineState::Idle);
    }

    #[test]
    fn dig_prints_answers() {
        let fixture = Fixture::new();
        fixture.http.respond(
            "https://cloudflare-dns.com/dns-query?name=example.com&type=MX",
            HttpResponse::ok_text(
                json!({ "Answer": [{ "TTL": 300, "data": "10 mail.example.com." }] }).to_string(),
            ),
        );
        assert_eq!(
            fixture.run("dig example.com mx"),
            vec![
                "$ dig example.com mx",
                "dig example.com MX ... (Ctrl+C to abort)",
                "example.com MX TTL=300 -> 10 mail.example.com.",
            ]
        );
        assert_eq!(
            fixture.http.requests()[0].headers,
            vec![("accept".to_string(), "application/dns-json".to_string())]
        );
    }

    #[test]
    fn ip_prints_address_or_status() {
        let fixture = Fixture::new();
        fixture.http.respond(
            "https://api.ipify.org",
            HttpResponse::ok_text(r#"{"ip":"203.0.113.7"}"#),
        );
        assert_eq!(
            fixture.run("ip"),
            vec!["$ ip", "Fetching public IP ...", "203.0.113.7"]
        );
    }

    #[test]
    fn rdap_summarizes_the_record() {
        let fixture = Fixture::new();
        fixture.http.respond(
            "https://rdap.org/domain/example.com",
            HttpResponse::ok_text(
                json!({
                    "ldhName": "EXAMPLE.COM",
                    "status": ["active", "client transfer prohibited"],
                    "events": [{ "eventAction": "registration", "eventDate": "1995-08-14" }],
                    "nameservers": [{ "ldhName": "A.IANA-SERVERS.NET" }, {}]
                })
                .to_string(),
            ),
        );
        assert_eq!(
            fixture.run("rdap example.com"),
            vec![
                "$ rdap example.com",
                "rdap example.com ... (Ctrl+C to abort)",
                "Handle: EXAMPLE.COM",
                "Status: active, client transfer prohibited",
                "Events:",
                "- registration @ 1995-08-14",
                "Nameservers:",
                "- A.IANA-SERVERS.NET",
                "- ?",
            ]
        );
        assert!(looks_like_ip("2001:db8::1"));
        assert!(looks_like_ip("192.0.2.1"));
        assert!(!looks_like_ip("example.com"));
    }

    #[test]
    fn download_saves_the_body() {
        let fixture = Fixture::new();
        fixture.http.respond(
            "https://files.test/report.csv",
            HttpResponse::ok_text("a,b\n1,2").with_header("Content-Type", "text/csv"),
        );
        fixture.http.respond(
            "https://files.test/missing",
            HttpResponse::with_status(404, ""),
        );
        assert_eq!(
            fixture.run("download https://files.test/report.csv report.csv"),
            vec![
                "$ download https://files.test/report.csv report.csv",
                "Downloading: https://files.test/report.csv ... (Ctrl+C to abort)",
                "Saved: report.csv",
            ]
        );
        let saved = fixture.downloads.saved();
        assert_eq!(saved[0].mime_type, "text/csv");
        assert_eq!(saved[0].bytes, b"a,b\n1,2".to_vec());

        let missing = fixture.run("download https://files.test/missing --timeout 500");
        assert_eq!(missing[2], "HTTP 404");
    }

    #[test]
    fn settled_state_is_shared_with_observers() {
        let fixture = Fixture::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        fixture
            .engine
            .subscribe_state(Rc::new(move |state| sink.borrow_mut().push(state)));
        fixture.http.respond("https://api.ipify.org", HttpResponse::with_status(500, ""));
        assert_eq!(fixture.run("ip")[2], "HTTP 500");
        assert_eq!(seen.borrow().last(), Some(&EngineState::Idle));
    }
}
