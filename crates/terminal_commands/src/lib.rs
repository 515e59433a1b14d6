//! Built-in command surface of the embedded web terminal.
//!
//! This crate owns every command a visitor can type (`help`, `weather`, `curl`, `kset`, ...)
//! and the [`TerminalServices`] bundle those commands share. Commands only reach the host through
//! the capability traits in `platform_host`, so the whole surface runs headless under the
//! in-memory adapters.
//!
//! The composition root builds a [`TerminalServices`], calls [`build_engine`], and then
//! [`boot`] once the terminal is mounted.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

mod commands;
mod services;

pub use services::{ProjectSummary, TerminalServices, ThemeListener};

use terminal_contract::{CommandDescriptor, LineStyle};
use terminal_core::{CommandHandler, CommandRegistry, TerminalEngine};

/// Notice printed once when the terminal mounts.
pub const WELCOME_NOTICE: &str = "Type 'help' to see commands.";

/// One built-in command ready to be registered.
#[derive(Clone)]
pub struct CommandRegistration {
    /// Help metadata.
    pub descriptor: CommandDescriptor,
    /// Async handler.
    pub handler: CommandHandler,
}

/// Returns every built-in command bound to `services`.
pub fn builtin_registrations(services: &TerminalServices) -> Vec<CommandRegistration> {
    commands::registrations(services)
}

/// Registers every built-in command and returns how many were registered.
pub fn register_all(registry: &CommandRegistry, services: &TerminalServices) -> usize {
    let registrations = builtin_registrations(services);
    let count = registrations.len();
    for registration in registrations {
        registry.register(registration.descriptor, registration.handler);
    }
    log::debug!("registered {count} built-in terminal commands");
    count
}

/// Builds an engine whose registry holds every built-in command.
pub fn build_engine(services: &TerminalServices) -> TerminalEngine {
    let registry = CommandRegistry::default();
    register_all(&registry, services);
    TerminalEngine::new(
        services.config.clone(),
        registry,
        services.host.prefs.clone(),
    )
}

/// Startup sequence run after mount: restores history and theme, then greets.
pub async fn boot(engine: &TerminalEngine, services: &TerminalServices) {
    engine.load_history().await;
    services.restore_theme().await;
    engine.print(WELCOME_NOTICE, LineStyle::Muted);
}
