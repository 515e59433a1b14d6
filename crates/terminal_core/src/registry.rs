//! Command registry and the per-invocation execution context.

use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

use futures::future::LocalBoxFuture;
use terminal_contract::{
    CommandDescriptor, CommandError, CommandResult, ExecutionId, LineContent, LineStyle,
    OutputLine,
};

use crate::{CancellationToken, HistoryStore, OutputPane};

/// Async command handler.
pub type CommandHandler = Rc<dyn Fn(CommandContext) -> LocalBoxFuture<'static, CommandResult>>;

/// Registered command: help metadata plus handler.
#[derive(Clone)]
pub struct RegisteredCommand {
    /// Help metadata.
    pub descriptor: CommandDescriptor,
    handler: CommandHandler,
}

impl RegisteredCommand {
    /// Invokes the handler.
    pub fn invoke(&self, context: CommandContext) -> LocalBoxFuture<'static, CommandResult> {
        (self.handler)(context)
    }
}

/// Shared command registry keyed by command name.
///
/// Names are stored as given; callers lower the head token before [`CommandRegistry::lookup`].
#[derive(Clone, Default)]
pub struct CommandRegistry {
    commands: Rc<RefCell<BTreeMap<String, RegisteredCommand>>>,
}

impl CommandRegistry {
    /// Registers a command, replacing any previous registration with the same name.
    pub fn register(&self, descriptor: CommandDescriptor, handler: CommandHandler) {
        let name = descriptor.name.clone();
        let previous = self.commands.borrow_mut().insert(
            name.clone(),
            RegisteredCommand {
                descriptor,
                handler,
            },
        );
        if previous.is_some() {
            log::debug!("command `{name}` re-registered");
        }
    }

    /// Looks up a command by exact name.
    pub fn lookup(&self, name: &str) -> Option<RegisteredCommand> {
        self.commands.borrow().get(name).cloned()
    }

    /// Returns all registered names in lexicographic order.
    pub fn names(&self) -> Vec<String> {
        self.commands.borrow().keys().cloned().collect()
    }

    /// Returns all descriptors ordered by name.
    pub fn descriptors(&self) -> Vec<CommandDescriptor> {
        self.commands
            .borrow()
            .values()
            .map(|registered| registered.descriptor.clone())
            .collect()
    }

    /// Returns the number of registered commands.
    pub fn len(&self) -> usize {
        self.commands.borrow().len()
    }

    /// Returns whether no command is registered.
    pub fn is_empty(&self) -> bool {
        self.commands.borrow().is_empty()
    }
}

/// Execution context handed to one handler invocation.
#[derive(Clone)]
pub struct CommandContext {
    /// Execution identifier of the segment being run.
    pub execution_id: ExecutionId,
    /// Name the command was resolved under.
    pub name: String,
    /// Argument tokens after the head token.
    pub args: Vec<String>,
    /// Cancellation signal for this segment.
    pub cancel: CancellationToken,
    output: OutputPane,
    history: HistoryStore,
    registry: CommandRegistry,
}

impl CommandContext {
    pub(crate) fn new(
        execution_id: ExecutionId,
        name: String,
        args: Vec<String>,
        cancel: CancellationToken,
        output: OutputPane,
        history: HistoryStore,
        registry: CommandRegistry,
    ) -> Self {
        Self {
            execution_id,
            name,
            args,
            cancel,
            output,
            history,
            registry,
        }
    }

    /// Returns argument `index`, if present.
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }

    /// Prints one line to the output pane.
    pub fn print(&self, content: impl Into<LineContent>, style: LineStyle) {
        self.output.print(OutputLine::new(content, style));
    }

    /// Prints an unstyled line.
    pub fn plain(&self, text: impl Into<LineContent>) {
        self.print(text, LineStyle::Plain);
    }

    /// Prints a muted line.
    pub fn muted(&self, text: impl Into<LineContent>) {
        self.print(text, LineStyle::Muted);
    }

    /// Prints a success line.
    pub fn good(&self, text: impl Into<LineContent>) {
        self.print(text, LineStyle::Good);
    }

    /// Prints a failure line.
    pub fn bad(&self, text: impl Into<LineContent>) {
        self.print(text, LineStyle::Bad);
    }

    /// Empties the output pane.
    pub fn clear_output(&self) {
        self.output.clear();
    }

    /// Returns the in-memory history entries, oldest first.
    pub fn history_entries(&self) -> Vec<String> {
        self.history.entries()
    }

    /// Returns the registry this command was dispatched from.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Runs another registered command with the same execution id and cancellation signal.
    pub fn dispatch(&self, name: &str, args: Vec<String>) -> LocalBoxFuture<'static, CommandResult> {
        let Some(registered) = self.registry.lookup(name) else {
            let message = format!("unknown command: {name}");
            return Box::pin(async move { Err(CommandError::failed(message)) });
        };
        let context = Self {
            name: registered.descriptor.name.clone(),
            args,
            ..self.clone()
        };
        registered.invoke(context)
    }
}

/// Wraps an async closure as a [`CommandHandler`].
pub fn handler<F, Fut>(run: F) -> CommandHandler
where
    F: Fn(CommandContext) -> Fut + 'static,
    Fut: std::future::Future<Output = CommandResult> + 'static,
{
    Rc::new(move |context| Box::pin(run(context)))
}
