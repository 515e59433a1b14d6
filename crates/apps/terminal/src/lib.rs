//! Browser terminal component.
//!
//! [`TerminalApp`] is the composition boundary between DOM input events and the headless
//! [`TerminalEngine`]: key presses map through [`KeyAction`], wheel events route through the
//! output pane, and pane/engine/theme listeners drive Leptos signals.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use std::rc::Rc;

use leptos::{
    ev::{KeyboardEvent, MouseEvent, WheelEvent},
    *,
};
use platform_host::HostServices;
use serde_json::Value;
use terminal_commands::{boot, build_engine, TerminalServices};
use terminal_contract::{EngineState, LineContent, LinePart, LineStyle, OutputLine};
use terminal_core::{
    KeyAction, KeyModifiers, PaneEntry, PaneViewport, ScrollMetrics, TerminalConfig,
    TerminalEngine, WheelOutcome,
};

/// Scrollable output element backing the pane's sticky auto-scroll.
#[derive(Clone, Copy)]
struct DomViewport {
    node: NodeRef<html::Div>,
}

impl PaneViewport for DomViewport {
    fn metrics(&self, _line_count: usize) -> ScrollMetrics {
        self.node
            .get_untracked()
            .map(|el| ScrollMetrics {
                scroll_top: f64::from(el.scroll_top()),
                scroll_height: f64::from(el.scroll_height()),
                client_height: f64::from(el.client_height()),
            })
            .unwrap_or_default()
    }

    fn scroll_to_bottom(&self, _line_count: usize) {
        let node = self.node;
        // The new line is not laid out until the next frame.
        request_animation_frame(move || {
            if let Some(el) = node.get_untracked() {
                el.scroll_to_with_x_and_y(0.0, f64::from(el.scroll_height()));
            }
        });
    }

    fn scroll_by(&self, delta_y: f64, _line_count: usize) {
        if let Some(el) = self.node.get_untracked() {
            el.scroll_by_with_x_and_y(0.0, delta_y);
        }
    }
}

fn line_class(style: LineStyle) -> String {
    match style.css_class() {
        Some(class) => format!("term-line {class}"),
        None => "term-line".to_string(),
    }
}

fn theme_class(theme: &str) -> String {
    format!("app-shell app-terminal-shell term-theme-{theme}")
}

fn status_label(state: EngineState) -> String {
    match state {
        EngineState::Idle => "Ready".to_string(),
        EngineState::Running { execution_id } => format!("Running #{}", execution_id.0),
    }
}

fn has_selection(start: Option<u32>, end: Option<u32>) -> bool {
    matches!((start, end), (Some(start), Some(end)) if start != end)
}

fn render_part(part: LinePart) -> View {
    match part {
        LinePart::Text { text } => view! { <span>{text}</span> }.into_view(),
        LinePart::Link { href, label } => view! {
            <a class="term-link" href=href target="_blank" rel="noopener noreferrer">{label}</a>
        }
        .into_view(),
    }
}

fn render_line(line: OutputLine) -> impl IntoView {
    let class = line_class(line.style);
    let content = match line.content {
        LineContent::Text { text } => text.into_view(),
        LineContent::Parts { parts } => parts.into_iter().map(render_part).collect_view(),
    };
    view! { <div class=class>{content}</div> }
}

/// What a mapped key press does to the input field.
#[derive(Debug, Default, PartialEq, Eq)]
struct KeyEffect {
    /// Replacement input text.
    input: Option<String>,
    /// Line to hand to the engine.
    submit: Option<String>,
    /// Whether the browser default must be suppressed.
    prevent_default: bool,
}

fn apply_key(action: KeyAction, engine: &TerminalEngine, current: &str) -> KeyEffect {
    let handled = KeyEffect {
        prevent_default: true,
        ..KeyEffect::default()
    };
    match action {
        KeyAction::Submit => KeyEffect {
            input: Some(String::new()),
            submit: Some(current.to_string()),
            prevent_default: true,
        },
        // Nothing to recall; keep whatever is typed.
        KeyAction::HistoryUp | KeyAction::HistoryDown if engine.history().is_empty() => handled,
        KeyAction::HistoryUp => KeyEffect {
            input: Some(engine.history_up()),
            ..handled
        },
        KeyAction::HistoryDown => KeyEffect {
            input: Some(engine.history_down()),
            ..handled
        },
        KeyAction::Autocomplete => KeyEffect {
            input: engine.autocomplete(current),
            ..handled
        },
        KeyAction::ClearScreen => {
            engine.clear();
            handled
        }
        KeyAction::CancelCurrent => KeyEffect {
            prevent_default: engine.cancel_current(),
            ..KeyEffect::default()
        },
    }
}

fn dispatch_key(
    ev: &KeyboardEvent,
    engine: &TerminalEngine,
    input: RwSignal<String>,
    has_selection: bool,
) {
    let modifiers = KeyModifiers {
        ctrl: ev.ctrl_key(),
        meta: ev.meta_key(),
        has_selection,
    };
    let Some(action) = KeyAction::from_key(&ev.key(), modifiers) else {
        return;
    };
    let effect = apply_key(action, engine, &input.get_untracked());
    if effect.prevent_default {
        ev.prevent_default();
    }
    if let Some(text) = effect.input {
        input.set(text);
    }
    if let Some(line) = effect.submit {
        let engine = engine.clone();
        spawn_local(async move { engine.submit(&line).await });
    }
}

#[component]
/// Terminal app contents.
///
/// Builds the command engine over `services`, restores history and theme after mount, and
/// cancels any in-flight command when unmounted.
pub fn TerminalApp(
    /// App launch parameters, decoded into a [`TerminalConfig`].
    launch_params: Value,
    /// Host capabilities shared by every command.
    services: HostServices,
) -> impl IntoView {
    let config = TerminalConfig::from_launch_params(&launch_params);
    let services = TerminalServices::new(services, config);
    let engine = build_engine(&services);
    let prompt = engine.config().prompt.clone();

    let input = create_rw_signal(String::new());
    let entries = create_rw_signal(Vec::<PaneEntry>::new());
    let state = create_rw_signal(EngineState::Idle);
    let theme = create_rw_signal(
        services
            .config
            .themes
            .first()
            .cloned()
            .unwrap_or_else(|| "default".to_string()),
    );
    let screen_ref = create_node_ref::<html::Div>();
    let input_ref = create_node_ref::<html::Input>();

    engine.pane().attach_viewport(Rc::new(DomViewport { node: screen_ref }));
    engine.pane().subscribe(Rc::new({
        let pane = engine.pane().clone();
        move || {
            entries.try_set(pane.entries());
        }
    }));
    engine.subscribe_state(Rc::new(move |next| {
        state.try_set(next);
    }));
    services.on_theme_change(Rc::new(move |name: &str| {
        theme.try_set(name.to_string());
    }));

    spawn_local({
        let engine = engine.clone();
        let services = services.clone();
        async move {
            boot(&engine, &services).await;
            logging::log!("terminal ready ({} commands)", engine.registry().len());
        }
    });

    on_cleanup({
        let engine = engine.clone();
        move || {
            engine.cancel_current();
        }
    });

    create_effect(move |_| {
        if let Some(el) = input_ref.get() {
            if let Err(err) = el.focus() {
                logging::warn!("terminal focus failed: {err:?}");
            }
        }
    });

    let on_keydown = {
        let engine = engine.clone();
        move |ev: KeyboardEvent| {
            let selected = input_ref.get_untracked().is_some_and(|el| {
                has_selection(
                    el.selection_start().ok().flatten(),
                    el.selection_end().ok().flatten(),
                )
            });
            dispatch_key(&ev, &engine, input, selected);
        }
    };

    let on_wheel = {
        let pane = engine.pane().clone();
        move |ev: WheelEvent| {
            if pane.wheel(ev.delta_y()) == WheelOutcome::Consumed {
                ev.prevent_default();
                ev.stop_propagation();
            }
        }
    };

    let focus_input = move |_: MouseEvent| {
        if let Some(el) = input_ref.get_untracked() {
            let _ = el.focus();
        }
    };

    view! {
        <div class=move || theme.with(|theme| theme_class(theme))>
            <div
                class="terminal-screen"
                role="log"
                aria-live="polite"
                node_ref=screen_ref
                on:wheel=on_wheel
                on:click=focus_input
            >
                <For each=move || entries.get() key=|entry| entry.id let:entry>
                    {render_line(entry.line)}
                </For>
            </div>

            <div class="terminal-input-row">
                <label class="terminal-prompt" for="terminal-input">{prompt}</label>
                <input
                    id="terminal-input"
                    class="terminal-input app-field"
                    type="text"
                    node_ref=input_ref
                    prop:value=move || input.get()
                    on:input=move |ev| input.set(event_target_value(&ev))
                    on:keydown=on_keydown
                    autocomplete="off"
                    spellcheck="false"
                />
            </div>

            <div class="app-statusbar">
                <span>{move || status_label(state.get())}</span>
                <span>{move || format!("{} line(s)", entries.with(Vec::len))}</span>
            </div>
        </div>
    }
}
