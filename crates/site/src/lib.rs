//! Browser composition root: wires host services and mounts the terminal.

mod web_app;

pub use web_app::{launch_params, playlist, SiteApp};

#[cfg(all(feature = "csr", target_arch = "wasm32"))]
pub fn mount() {
    console_error_panic_hook::set_once();
    if let Err(err) = platform_host_web::ConsoleLogger::install(log::LevelFilter::Info) {
        leptos::logging::warn!("console logger unavailable: {err}");
    }
    leptos::mount_to_body(|| leptos::view! { <SiteApp /> })
}
