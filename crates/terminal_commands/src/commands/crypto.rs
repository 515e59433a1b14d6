use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};
use platform_host::random_index;
use serde_json::Value;
use sha2::{Digest, Sha256};
use terminal_contract::{CommandError, CommandResult};
use terminal_core::CommandContext;

use super::{bound, count_arg, has_flag, registration, usage_error};
use crate::{CommandRegistration, TerminalServices};

/// Standard alphabet that accepts input with or without trailing padding.
const LENIENT_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// URL-safe alphabet used by JWT segments, padding optional.
const LENIENT_URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

const ALPHA: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &str = "0123456789";
const SYMBOLS: &str = "!@#$%^&*()-_=+[]{};:,.?/";
const AMBIGUOUS: &[char] = &['O', '0', 'I', 'l'];

pub(super) fn registrations(services: &TerminalServices) -> Vec<CommandRegistration> {
    vec![
        registration(
            "sha256",
            "SHA-256 hash (WebCrypto)",
            "sha256 <text>",
            bound(services, sha256),
        ),
        registration(
            "base64",
            "Base64 encode/decode (UTF-8)",
            "base64 enc <text> | base64 dec <b64>",
            bound(services, base64_codec),
        ),
        registration(
            "jwt",
            "Decode JWT header/payload (no verify)",
            "jwt <token>",
            bound(services, jwt),
        ),
        registration(
            "passgen",
            "Password generator (crypto)",
            "passgen [len] [--symbols] [--no-ambiguous]",
            bound(services, passgen),
        ),
    ]
}

async fn sha256(context: CommandContext, _services: TerminalServices) -> CommandResult {
    let text = context.args.join(" ");
    if text.is_empty() {
        return Err(usage_error("sha256 <text>"));
    }
    context.good(format!("{:x}", Sha256::digest(text.as_bytes())));
    Ok(())
}

async fn base64_codec(context: CommandContext, _services: TerminalServices) -> CommandResult {
    let subcommand = context.arg(0).unwrap_or_default().to_lowercase();
    if subcommand != "enc" && subcommand != "dec" {
        return Err(usage_error("base64 enc <text> | base64 dec <b64>"));
    }
    let input = context.args[1..].join(" ");
    if input.is_empty() {
        context.bad("Missing input.");
        return Ok(());
    }
    if subcommand == "enc" {
        context.good(LENIENT_STANDARD.encode(input.as_bytes()));
        return Ok(());
    }
    match LENIENT_STANDARD.decode(input.trim()) {
        Ok(bytes) => context.good(String::from_utf8_lossy(&bytes).into_owned()),
        Err(err) => {
            log::debug!("base64 decode failed: {err}");
            context.bad("Invalid base64.");
        }
    }
    Ok(())
}

/// Decodes one JWT segment, pretty-printing it when it holds JSON.
fn decode_segment(segment: &str) -> Result<String, base64::DecodeError> {
    let bytes = LENIENT_URL_SAFE.decode(segment)?;
    let text = String::from_utf8_lossy(&bytes).into_owned();
    Ok(serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|json| serde_json::to_string_pretty(&json).ok())
        .unwrap_or(text))
}

async fn jwt(context: CommandContext, _services: TerminalServices) -> CommandResult {
    let token = context.arg(0).ok_or_else(|| usage_error("jwt <token>"))?;
    let parts: Vec<&str> = token.split('.').collect();
    if parts.len() < 2 {
        context.bad("Invalid JWT.");
        return Ok(());
    }
    let decoded = decode_segment(parts[0]).and_then(|header| {
        let payload = decode_segment(parts[1])?;
        Ok((header, payload))
    });
    match decoded {
        Ok((header, payload)) => {
            context.muted("Header:");
            context.muted(header);
            context.muted("Payload:");
            context.muted(payload);
        }
        Err(err) => {
            log::debug!("jwt decode failed: {err}");
            context.bad("JWT decode failed.");
        }
    }
    Ok(())
}

/// Builds the character pool for `passgen`.
fn password_pool(symbols: bool, no_ambiguous: bool) -> Vec<char> {
    let mut pool: Vec<char> = ALPHA.chars().chain(DIGITS.chars()).collect();
    if symbols {
        pool.extend(SYMBOLS.chars());
    }
    if no_ambiguous {
        pool.retain(|ch| !AMBIGUOUS.contains(ch));
    }
    pool
}

async fn passgen(context: CommandContext, services: TerminalServices) -> CommandResult {
    let length = count_arg(context.arg(0), 24, 6, 128) as usize;
    let pool = password_pool(
        has_flag(&context.args, "--symbols"),
        has_flag(&context.args, "--no-ambiguous"),
    );
    let random = services.host.random.clone();
    let mut password = String::with_capacity(length);
    for _ in 0..length {
        let index =
            random_index(random.as_ref(), pool.len()).map_err(CommandError::unavailable)?;
        password.push(pool[index]);
    }
    context.good(password);
    Ok(())
}
