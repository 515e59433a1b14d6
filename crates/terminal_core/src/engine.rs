//! Terminal controller: sequences chained segments and owns the active cancellation signal.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use platform_host::PrefsStore;
use terminal_contract::{
    CommandError, EngineState, ExecutionId, LineStyle, OutputLine, ABORTED_NOTICE,
    INTERRUPT_NOTICE, NOT_FOUND_NOTICE,
};
use terminal_parser::{split_commands, Segment};

use crate::{
    AutocompleteState, CancellationToken, CommandContext, CommandRegistry, HistoryStore,
    OutputPane, TerminalConfig,
};

/// Listener notified on every [`EngineState`] transition.
pub type EngineStateListener = Rc<dyn Fn(EngineState)>;

struct ActiveExecution {
    execution_id: ExecutionId,
    token: CancellationToken,
}

struct EngineInner {
    config: TerminalConfig,
    registry: CommandRegistry,
    history: HistoryStore,
    pane: OutputPane,
    autocomplete: RefCell<AutocompleteState>,
    state: Cell<EngineState>,
    active: RefCell<Option<ActiveExecution>>,
    next_execution_id: Cell<u64>,
    state_listeners: RefCell<Vec<EngineStateListener>>,
}

/// Handle to one terminal instance.
///
/// The engine is single-threaded: handlers run on the caller's local executor, and only one
/// segment is tracked as active at a time. Cancelling a segment never stops the remaining
/// segments of its chain; `a; b` still runs `b` after `a` is aborted.
#[derive(Clone)]
pub struct TerminalEngine {
    inner: Rc<EngineInner>,
}

impl TerminalEngine {
    /// Creates an idle engine with an empty pane and unloaded history.
    pub fn new(
        config: TerminalConfig,
        registry: CommandRegistry,
        prefs: Rc<dyn PrefsStore>,
    ) -> Self {
        let history = HistoryStore::new(prefs, config.history_key.clone(), config.history_limit);
        let pane = OutputPane::new(config.max_lines);
        pane.set_stick_threshold(config.stick_threshold);
        Self {
            inner: Rc::new(EngineInner {
                config,
                registry,
                history,
                pane,
                autocomplete: RefCell::new(AutocompleteState::default()),
                state: Cell::new(EngineState::Idle),
                active: RefCell::new(None),
                next_execution_id: Cell::new(0),
                state_listeners: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Loads persisted history.
    pub async fn load_history(&self) {
        self.inner.history.load().await;
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &TerminalConfig {
        &self.inner.config
    }

    /// Returns the command registry.
    pub fn registry(&self) -> &CommandRegistry {
        &self.inner.registry
    }

    /// Returns the history store.
    pub fn history(&self) -> &HistoryStore {
        &self.inner.history
    }

    /// Returns the output pane.
    pub fn pane(&self) -> &OutputPane {
        &self.inner.pane
    }

    /// Returns the current state.
    pub fn state(&self) -> EngineState {
        self.inner.state.get()
    }

    /// Returns whether a segment is in flight.
    pub fn is_running(&self) -> bool {
        matches!(self.state(), EngineState::Running { .. })
    }

    /// Registers a state-transition listener.
    pub fn subscribe_state(&self, listener: EngineStateListener) {
        self.inner.state_listeners.borrow_mut().push(listener);
    }

    /// Prints one line to the pane.
    pub fn print(&self, text: impl Into<terminal_contract::LineContent>, style: LineStyle) {
        self.inner.pane.print(OutputLine::new(text, style));
    }

    /// Runs every segment of `line`, strictly left to right.
    ///
    /// Each segment settles (success, failure, or abort) before the next starts. Blank lines are
    /// ignored.
    pub async fn submit(&self, line: &str) {
        for segment in split_commands(line) {
            self.run_segment(&segment).await;
        }
    }

    async fn run_segment(&self, segment: &str) {
        let inner = &self.inner;
        self.print(format!("{} {segment}", inner.config.prompt), LineStyle::Plain);
        inner.history.append(segment);
        if let Err(err) = inner.history.persist().await {
            log::warn!("history persist failed: {err}");
        }

        let (execution_id, token) = self.begin();
        let parsed = Segment::parse(segment);
        let name = parsed.head().map(str::to_lowercase).unwrap_or_default();

        match inner.registry.lookup(&name) {
            None => self.print(NOT_FOUND_NOTICE, LineStyle::Bad),
            Some(command) => {
                log::debug!("dispatch #{} `{name}`", execution_id.0);
                let context = CommandContext::new(
                    execution_id,
                    command.descriptor.name.clone(),
                    parsed.args().to_vec(),
                    token,
                    inner.pane.clone(),
                    inner.history.clone(),
                    inner.registry.clone(),
                );
                match command.invoke(context).await {
                    Ok(()) => {}
                    Err(err) if err.is_aborted() => self.print(ABORTED_NOTICE, LineStyle::Bad),
                    Err(CommandError::Usage(usage)) => self.print(usage, LineStyle::Bad),
                    Err(err) => {
                        log::debug!("command `{name}` failed ({:?}): {err}", err.code());
                        self.print(format!("Error: {err}"), LineStyle::Bad);
                    }
                }
            }
        }

        self.finish(execution_id);
    }

    fn begin(&self) -> (ExecutionId, CancellationToken) {
        let inner = &self.inner;
        let next = inner.next_execution_id.get().wrapping_add(1);
        inner.next_execution_id.set(next);
        let execution_id = ExecutionId(next);
        let token = CancellationToken::new();

        let previous = inner.active.borrow_mut().replace(ActiveExecution {
            execution_id,
            token: token.clone(),
        });
        if let Some(previous) = previous {
            previous.token.cancel();
        }
        self.set_state(EngineState::Running { execution_id });
        (execution_id, token)
    }

    fn finish(&self, execution_id: ExecutionId) {
        let still_active = {
            let mut active = self.inner.active.borrow_mut();
            let matches = active
                .as_ref()
                .is_some_and(|active| active.execution_id == execution_id);
            if matches {
                *active = None;
            }
            matches
        };
        if still_active {
            self.set_state(EngineState::Idle);
        }
    }

    /// Aborts the active segment and prints the interrupt notice.
    ///
    /// Returns `false` (and does nothing) while idle.
    pub fn cancel_current(&self) -> bool {
        let token = match &*self.inner.active.borrow() {
            Some(active) if self.is_running() => active.token.clone(),
            _ => return false,
        };
        token.cancel();
        self.print(INTERRUPT_NOTICE, LineStyle::Bad);
        true
    }

    /// Returns the previous history entry for the input field.
    pub fn history_up(&self) -> String {
        self.inner.history.navigate_up()
    }

    /// Returns the next history entry for the input field.
    pub fn history_down(&self) -> String {
        self.inner.history.navigate_down()
    }

    /// Completes the first token of `input` against the registry names.
    pub fn autocomplete(&self, input: &str) -> Option<String> {
        let names = self.inner.registry.names();
        self.inner
            .autocomplete
            .borrow_mut()
            .complete_input(input, &names)
    }

    /// Empties the output pane.
    pub fn clear(&self) {
        self.inner.pane.clear();
    }

    fn set_state(&self, state: EngineState) {
        self.inner.state.set(state);
        let listeners = self.inner.state_listeners.borrow().clone();
        for listener in listeners {
            listener(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use futures::{
        executor::{block_on, LocalPool},
        task::LocalSpawnExt,
    };
    use platform_host::{ManualTimer, MemoryPrefsStore, TimerService};
    use pretty_assertions::assert_eq;
    use terminal_contract::CommandDescriptor;

    use super::*;
    use crate::handler;

    fn engine_with(registry: CommandRegistry) -> TerminalEngine {
        TerminalEngine::new(
            TerminalConfig {
                prompt: "$".to_string(),
                ..TerminalConfig::default()
            },
            registry,
            Rc::new(MemoryPrefsStore::default()),
        )
    }

    fn register_echo(registry: &CommandRegistry) {
        registry.register(
            CommandDescriptor::new("echo", "Print text", "echo <text>"),
            handler(|ctx| async move {
                ctx.plain(ctx.args.join(" "));
                Ok(())
            }),
        );
    }

    fn register_wait(registry: &CommandRegistry, timer: &ManualTimer) {
        let timer = timer.clone();
        registry.register(
            CommandDescriptor::new("wait", "Wait", "wait <ms>"),
            handler(move |ctx| {
                let timer = timer.clone();
                async move {
                    let ms = ctx.arg(0).and_then(|v| v.parse().ok()).unwrap_or(0);
                    ctx.cancel.sleep(&timer, ms).await?;
                    ctx.muted(format!("waited {ms}"));
                    Ok(())
                }
            }),
        );
    }

    #[test]
    fn unknown_head_prints_not_found_and_returns_idle() {
        let engine = engine_with(CommandRegistry::default());
        block_on(engine.submit("nope arg"));
        assert_eq!(
            engine.pane().texts(),
            vec!["$ nope arg".to_string(), NOT_FOUND_NOTICE.to_string()]
        );
        assert_eq!(engine.state(), EngineState::Idle);
        assert_eq!(engine.history().entries(), vec!["nope arg"]);
    }

    #[test]
    fn head_token_is_lowered_before_lookup() {
        let registry = CommandRegistry::default();
        register_echo(&registry);
        let engine = engine_with(registry);
        block_on(engine.submit("ECHO Hi"));
        assert_eq!(engine.pane().texts(), vec!["$ ECHO Hi", "Hi"]);
    }

    #[test]
    fn handler_failure_is_rendered_and_chain_continues() {
        let registry = CommandRegistry::default();
        register_echo(&registry);
        registry.register(
            CommandDescriptor::new("boom", "Fail", "boom"),
            handler(|_| async { Err(CommandError::failed("kaput")) }),
        );
        let engine = engine_with(registry);
        block_on(engine.submit("boom; echo after"));
        let lines = engine.pane().lines();
        assert_eq!(lines[1].text(), "Error: kaput");
        assert_eq!(lines[1].style, LineStyle::Bad);
        assert_eq!(lines[3].text(), "after");
    }

    #[test]
    fn usage_errors_print_without_error_prefix() {
        let registry = CommandRegistry::default();
        registry.register(
            CommandDescriptor::new("need", "Needs an arg", "need <x>"),
            handler(|_| async { Err(CommandError::usage("Usage: need <x>")) }),
        );
        let engine = engine_with(registry);
        block_on(engine.submit("need"));
        let lines = engine.pane().lines();
        assert_eq!(lines[1].text(), "Usage: need <x>");
        assert_eq!(lines[1].style, LineStyle::Bad);
    }

    #[test]
    fn cancel_while_idle_is_a_no_op() {
        let engine = engine_with(CommandRegistry::default());
        assert!(!engine.cancel_current());
        assert!(engine.pane().is_empty());
    }

    #[test]
    fn cancel_aborts_active_segment_but_not_the_rest_of_the_chain() {
        let timer = ManualTimer::default();
        let registry = CommandRegistry::default();
        register_echo(&registry);
        register_wait(&registry, &timer);
        let engine = engine_with(registry);
        let states = Rc::new(RefCell::new(Vec::new()));
        let seen = states.clone();
        engine.subscribe_state(Rc::new(move |state| seen.borrow_mut().push(state)));

        let mut pool = LocalPool::new();
        let task_engine = engine.clone();
        pool.spawner()
            .spawn_local(async move { task_engine.submit("wait 5000; echo next").await })
            .expect("spawn");

        pool.run_until_stalled();
        assert!(engine.is_running());
        timer.advance(100);
        pool.run_until_stalled();

        assert!(engine.cancel_current());
        pool.run_until_stalled();

        assert_eq!(
            engine.pane().texts(),
            vec!["$ wait 5000", "^C", "Aborted.", "$ echo next", "next"]
        );
        assert_eq!(engine.state(), EngineState::Idle);
        assert!(timer.now_ms() < 5_000);
        assert_eq!(
            *states.borrow(),
            vec![
                EngineState::Running {
                    execution_id: ExecutionId(1)
                },
                EngineState::Idle,
                EngineState::Running {
                    execution_id: ExecutionId(2)
                },
                EngineState::Idle,
            ]
        );
    }

    #[test]
    fn resubmitting_supersedes_the_in_flight_segment() {
        let timer = ManualTimer::default();
        let registry = CommandRegistry::default();
        register_wait(&registry, &timer);
        let engine = engine_with(registry);

        let mut pool = LocalPool::new();
        let first = engine.clone();
        pool.spawner()
            .spawn_local(async move { first.submit("wait 1000").await })
            .expect("spawn");
        pool.run_until_stalled();

        let second = engine.clone();
        pool.spawner()
            .spawn_local(async move { second.submit("wait 50").await })
            .expect("spawn");
        pool.run_until_stalled();

        assert_eq!(
            engine.state(),
            EngineState::Running {
                execution_id: ExecutionId(2)
            }
        );
        assert!(engine.pane().texts().contains(&"Aborted.".to_string()));

        timer.advance(50);
        pool.run_until_stalled();
        assert_eq!(engine.state(), EngineState::Idle);
        assert_eq!(engine.pane().texts().last().map(String::as_str), Some("waited 50"));
    }

    #[test]
    fn autocomplete_and_history_navigation_use_engine_state() {
        let registry = CommandRegistry::default();
        register_echo(&registry);
        registry.register(
            CommandDescriptor::new("help", "Help", "help"),
            handler(|_| async { Ok(()) }),
        );
        registry.register(
            CommandDescriptor::new("history", "History", "history"),
            handler(|_| async { Ok(()) }),
        );
        let engine = engine_with(registry);

        assert_eq!(engine.autocomplete("h").as_deref(), Some("help"));
        assert_eq!(engine.autocomplete("h").as_deref(), Some("history"));
        assert_eq!(engine.autocomplete("h").as_deref(), Some("help"));

        block_on(engine.submit("echo a; echo b"));
        assert_eq!(engine.history_up(), "echo b");
        assert_eq!(engine.history_up(), "echo a");
        assert_eq!(engine.history_down(), "echo b");
        assert_eq!(engine.history_down(), "");
    }
}
