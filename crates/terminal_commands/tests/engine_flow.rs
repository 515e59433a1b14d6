use std::{cell::RefCell, rc::Rc};

use futures::{
    executor::{block_on, LocalPool},
    task::LocalSpawnExt,
};
use platform_host::{
    HostInfo, HostServices, ManualTimer, MemoryHttpTransport, MemoryPrefsStore,
    NoopClipboardService, NoopContentCache, NoopDownloadService, NoopExternalUrlService,
    NoopMediaPlayer, SequenceRandomSource,
};
use pretty_assertions::assert_eq;
use terminal_commands::{boot, build_engine, TerminalServices, WELCOME_NOTICE};
use terminal_contract::EngineState;
use terminal_core::{TerminalConfig, TerminalEngine};

struct Harness {
    prefs: MemoryPrefsStore,
    timer: ManualTimer,
    services: TerminalServices,
    engine: TerminalEngine,
}

fn harness_with_prefs(prefs: MemoryPrefsStore) -> Harness {
    let timer = ManualTimer::default();
    let host = HostServices {
        prefs: Rc::new(prefs.clone()),
        cache: Rc::new(NoopContentCache),
        external_urls: Rc::new(NoopExternalUrlService),
        timer: Rc::new(timer.clone()),
        http: Rc::new(MemoryHttpTransport::default()),
        clipboard: Rc::new(NoopClipboardService),
        downloads: Rc::new(NoopDownloadService),
        media: Rc::new(NoopMediaPlayer),
        random: Rc::new(SequenceRandomSource::default()),
        info: HostInfo::default(),
    };
    let config = TerminalConfig {
        prompt: "$".to_string(),
        ..TerminalConfig::default()
    };
    let services = TerminalServices::new(host, config);
    let engine = build_engine(&services);
    Harness {
        prefs,
        timer,
        services,
        engine,
    }
}

fn harness() -> Harness {
    harness_with_prefs(MemoryPrefsStore::default())
}

#[test]
fn chained_segments_run_in_order_across_timer_waits() {
    let harness = harness();
    let mut pool = LocalPool::new();
    let engine = harness.engine.clone();
    pool.spawner()
        .spawn_local(async move { engine.submit("echo hi; sleep 10; echo bye").await })
        .expect("spawn");

    pool.run_until_stalled();
    assert_eq!(harness.engine.pane().texts(), vec!["$ echo hi", "hi", "$ sleep 10"]);
    assert!(harness.engine.is_running());

    harness.timer.advance(10);
    pool.run_until_stalled();
    assert_eq!(
        harness.engine.pane().texts(),
        vec!["$ echo hi", "hi", "$ sleep 10", "Slept 10ms", "$ echo bye", "bye"]
    );
    assert_eq!(harness.engine.state(), EngineState::Idle);
    assert_eq!(
        harness.engine.history().entries(),
        vec!["echo hi", "sleep 10", "echo bye"]
    );
}

#[test]
fn interrupt_aborts_a_long_sleep() {
    let harness = harness();
    let mut pool = LocalPool::new();
    let engine = harness.engine.clone();
    pool.spawner()
        .spawn_local(async move { engine.submit("sleep 5000").await })
        .expect("spawn");

    pool.run_until_stalled();
    harness.timer.advance(100);
    pool.run_until_stalled();
    assert!(harness.engine.cancel_current());
    pool.run_until_stalled();

    assert_eq!(
        harness.engine.pane().texts(),
        vec!["$ sleep 5000", "^C", "Aborted."]
    );
    assert_eq!(harness.engine.state(), EngineState::Idle);
    assert!(!harness.engine.cancel_current());
}

#[test]
fn boot_restores_history_and_theme_then_greets() {
    let prefs = MemoryPrefsStore::default();
    let first = harness_with_prefs(prefs.clone());
    block_on(first.engine.submit("theme ice"));
    block_on(first.engine.submit("echo persisted"));

    let applied = Rc::new(RefCell::new(Vec::new()));
    let second = harness_with_prefs(prefs);
    let sink = applied.clone();
    second.services.on_theme_change(Rc::new(move |name: &str| {
        sink.borrow_mut().push(name.to_string());
    }));
    block_on(boot(&second.engine, &second.services));

    assert_eq!(second.engine.pane().texts(), vec![WELCOME_NOTICE]);
    assert_eq!(
        second.engine.history().entries(),
        vec!["theme ice", "echo persisted"]
    );
    assert_eq!(*applied.borrow(), vec!["ice".to_string()]);
    assert_eq!(second.engine.history_up(), "echo persisted");
}

#[test]
fn key_value_entries_survive_a_new_engine() {
    let harness = harness();
    block_on(harness.engine.submit("kset greeting hello there"));
    assert_eq!(
        harness.prefs.raw("greeting").as_deref(),
        Some("hello there")
    );

    let reopened = harness_with_prefs(harness.prefs.clone());
    block_on(reopened.engine.submit("kget greeting"));
    assert_eq!(
        reopened.engine.pane().texts(),
        vec!["$ kget greeting", "hello there"]
    );
}

#[test]
fn unknown_commands_and_blank_lines() {
    let harness = harness();
    block_on(harness.engine.submit("   "));
    assert!(harness.engine.pane().is_empty());
    block_on(harness.engine.submit("frobnicate now"));
    assert_eq!(
        harness.engine.pane().texts(),
        vec!["$ frobnicate now", "Command not found. Type 'help'."]
    );
}
