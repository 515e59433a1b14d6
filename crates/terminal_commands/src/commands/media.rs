use terminal_contract::CommandResult;
use terminal_core::CommandContext;

use super::{bound, registration};
use crate::{CommandRegistration, TerminalServices};

const PLAYER_MISSING: &str = "Music player not found.";

pub(super) fn registrations(services: &TerminalServices) -> Vec<CommandRegistration> {
    vec![
        registration("music", "List tracks", "music", bound(services, music)),
        registration(
            "play",
            "Play track by index (or resume current)",
            "play [n]",
            bound(services, play),
        ),
        registration("pause", "Pause audio", "pause", bound(services, pause)),
    ]
}

async fn music(context: CommandContext, services: TerminalServices) -> CommandResult {
    let tracks = services.host.media.tracks();
    if tracks.is_empty() {
        context.muted("No tracks.");
        return Ok(());
    }
    context.muted("Tracks:");
    for (index, track) in tracks.iter().enumerate() {
        context.muted(format!("{}. {} — {}", index + 1, track.title, track.artist));
    }
    context.muted("Use: play 1 | pause");
    Ok(())
}

// A player without a playlist is treated as absent.
async fn play(context: CommandContext, services: TerminalServices) -> CommandResult {
    let player = services.host.media.clone();
    if player.tracks().is_empty() {
        context.bad(PLAYER_MISSING);
        return Ok(());
    }
    let index = context
        .arg(0)
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .and_then(|number| number.checked_sub(1));
    if let Err(err) = context.cancel.guard(player.play(index)).await? {
        log::debug!("playback refused: {err}");
        context.bad("Cannot autoplay. Click play on the player once.");
        return Ok(());
    }
    let current = player.current_index();
    let (title, artist) = player
        .tracks()
        .get(current)
        .map(|track| (track.title.clone(), track.artist.clone()))
        .unwrap_or_else(|| ("Unknown".to_string(), "Unknown".to_string()));
    context.good(format!("Playing #{}: {title} — {artist}", current + 1));
    Ok(())
}

async fn pause(context: CommandContext, services: TerminalServices) -> CommandResult {
    let player = services.host.media.clone();
    if player.tracks().is_empty() {
        context.bad(PLAYER_MISSING);
        return Ok(());
    }
    player.pause();
    context.good("Paused.");
    Ok(())
}
