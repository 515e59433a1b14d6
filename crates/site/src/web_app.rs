use leptos::*;
use leptos_meta::*;
use platform_host::MediaTrack;
use serde_json::{json, Value};
use terminal_app::TerminalApp;

/// Tracks exposed to the `music` command.
pub fn playlist() -> Vec<MediaTrack> {
    vec![MediaTrack::new(
        "No Hands",
        "Waka Flocka Flame",
        "assets/bloody_moon.mp3",
    )]
}

/// Terminal launch parameters for this site.
pub fn launch_params() -> Value {
    json!({
        "prompt": "user@site:~$",
        "project_owner": "nemesis",
        "default_location": "Asia",
    })
}

#[component]
pub fn SiteApp() -> impl IntoView {
    provide_meta_context();
    let services = platform_host_web::build_host_services(playlist());

    view! {
        <Title text="Terminal" />
        <Meta name="description" content="A browser terminal with network, crypto, and media commands." />

        <main class="site-root">
            <TerminalApp launch_params=launch_params() services=services />
        </main>
    }
}
