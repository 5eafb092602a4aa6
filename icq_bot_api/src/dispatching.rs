use std::{collections::HashMap, future::Future, sync::Arc, time::Duration};

use futures::future::BoxFuture;
use tokio::sync::watch;

use crate::{
    transport::{HttpTransport, Transport},
    Bot, Event, HandlerResult, Result,
};

/// Event type that registers a handler for every event.
pub const WILDCARD: &str = "*";

/// Something that reacts to an event.
///
/// Implemented for every `Fn(Bot<T>, Event) -> impl Future<Output = HandlerResult>`.
pub trait Handler<T: Transport>: Send + Sync + 'static {
    fn handle(&self, bot: Bot<T>, event: Event) -> BoxFuture<'static, HandlerResult>;
}

impl<T, F, Fut> Handler<T> for F
where
    T: Transport,
    F: Fn(Bot<T>, Event) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn handle(&self, bot: Bot<T>, event: Event) -> BoxFuture<'static, HandlerResult> {
        Box::pin(self(bot, event))
    }
}

/// Ends a handler. Makes the return type of an `async move` block
/// obvious to the compiler, so `?` can be used inside it.
pub fn respond(value: ()) -> HandlerResult {
    Ok(value)
}

/// Tells a running [`Dispatcher`] to stop. Cloning gives another handle
/// to the same signal.
#[derive(Debug, Clone)]
pub struct ShutdownToken {
    sender: Arc<watch::Sender<bool>>,
}

impl ShutdownToken {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn shutdown(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_shutdown(&self) -> bool {
        *self.sender.borrow()
    }

    /// Clear a previous shutdown so the token can stop the next run.
    pub(crate) fn reset(&self) {
        self.sender.send_replace(false);
    }

    /// Resolves once [`ShutdownToken::shutdown`] was called on any clone.
    pub async fn wait(&self) {
        let mut receiver = self.sender.subscribe();
        // The sender lives in `self`, so this can't fail.
        let _ = receiver.wait_for(|stopped| *stopped).await;
    }
}

impl Default for ShutdownToken {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    Running,
    Stopped,
}

/// Long-polls for events and hands them to the handlers registered
/// for their type, one at a time.
pub struct Dispatcher<T: Transport = HttpTransport> {
    bot: Bot<T>,
    handlers: HashMap<String, Box<dyn Handler<T>>>,
    wildcard: Option<Box<dyn Handler<T>>>,
    /// Highest event ID that was dispatched.
    cursor: i64,
    state: DispatcherState,
    shutdown: ShutdownToken,
    ctrlc_handler: bool,
    malformed_retry_delay: Duration,
    transport_retries: u32,
    transport_retry_delay: Duration,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(bot: Bot<T>) -> Self {
        Self {
            bot,
            handlers: HashMap::new(),
            wildcard: None,
            cursor: 0,
            state: DispatcherState::Stopped,
            shutdown: ShutdownToken::new(),
            ctrlc_handler: false,
            malformed_retry_delay: Duration::from_secs(1),
            transport_retries: 3,
            transport_retry_delay: Duration::from_secs(1),
        }
    }

    /// Call `handler` for every event of type `event_type`, replacing whatever
    /// was registered for it before.
    ///
    /// [`WILDCARD`] registers a handler that runs for every event, after the
    /// type-specific one if there is one.
    pub fn register<F, Fut>(self, event_type: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Bot<T>, Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.register_handler(event_type, handler)
    }

    /// Same as [`Dispatcher::register`], but for any [`Handler`].
    pub fn register_handler(mut self, event_type: impl Into<String>, handler: impl Handler<T>) -> Self {
        let event_type = event_type.into();

        if event_type.is_empty() {
            log::warn!("Ignoring a handler registered for an empty event type");
        } else if event_type == WILDCARD {
            self.wildcard = Some(Box::new(handler));
        } else {
            self.handlers.insert(event_type, Box::new(handler));
        }

        self
    }

    /// How long to wait before polling again after a response without an
    /// `events` array. [`Duration::ZERO`] retries right away.
    pub fn malformed_retry_delay(mut self, delay: Duration) -> Self {
        self.malformed_retry_delay = delay;
        self
    }

    /// How many failed polls in a row are retried before [`Dispatcher::run`]
    /// gives up and returns the error. `0` gives up on the first failure.
    pub fn transport_retries(mut self, retries: u32) -> Self {
        self.transport_retries = retries;
        self
    }

    pub fn transport_retry_delay(mut self, delay: Duration) -> Self {
        self.transport_retry_delay = delay;
        self
    }

    /// Stop dispatching on Ctrl-C.
    pub fn enable_ctrlc_handler(mut self) -> Self {
        self.ctrlc_handler = true;
        self
    }

    pub fn shutdown_token(&self) -> ShutdownToken {
        self.shutdown.clone()
    }

    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    pub fn state(&self) -> DispatcherState {
        self.state
    }

    pub fn bot(&self) -> &Bot<T> {
        &self.bot
    }

    /// Poll and dispatch events, starting after `initial_cursor`, until
    /// shut down through the [`ShutdownToken`].
    ///
    /// Returns the final cursor, which can be passed to the next `run`
    /// to pick up where this one left off. A shutdown requested before
    /// `run` is honored right away; once `run` returns, the token is
    /// cleared so the same dispatcher can be run again.
    ///
    /// # Errors
    ///
    /// Returns the transport error once polling has failed more than
    /// [`Dispatcher::transport_retries`] times in a row.
    pub async fn run(&mut self, initial_cursor: i64) -> Result<i64> {
        self.cursor = initial_cursor;
        self.state = DispatcherState::Running;
        log::info!("Dispatching events after event ID {initial_cursor}");

        let ctrlc_task = self.ctrlc_handler.then(|| {
            let shutdown = self.shutdown.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::info!("Got Ctrl-C, shutting down...");
                    shutdown.shutdown();
                }
            })
        });

        let result = self.run_loop().await;

        if let Some(task) = ctrlc_task {
            task.abort();
        }
        self.shutdown.reset();
        self.state = DispatcherState::Stopped;

        match &result {
            Ok(cursor) => log::info!("Dispatcher stopped at event ID {cursor}"),
            Err(e) => log::error!("Dispatcher stopped, polling failed: {e}"),
        }

        result
    }

    async fn run_loop(&mut self) -> Result<i64> {
        let shutdown = self.shutdown.clone();
        let mut failures: u32 = 0;

        loop {
            if shutdown.is_shutdown() {
                return Ok(self.cursor);
            }

            log::trace!("Polling for events after event ID {}", self.cursor);
            let polled = tokio::select! {
                _ = shutdown.wait() => None,
                result = self.bot.poll(self.cursor) => Some(result),
            };
            let Some(result) = polled else {
                return Ok(self.cursor);
            };

            let events = match result {
                Ok(events) => {
                    failures = 0;
                    events
                }
                Err(e) => {
                    if failures >= self.transport_retries {
                        return Err(e);
                    }
                    failures += 1;
                    log::warn!(
                        "Polling failed ({failures}/{}), retrying: {e}",
                        self.transport_retries
                    );
                    self.pause(self.transport_retry_delay).await;
                    continue;
                }
            };

            let Some(events) = events else {
                log::warn!("Got a response without an events array, polling again");
                self.pause(self.malformed_retry_delay).await;
                continue;
            };

            self.dispatch_batch(events).await;
        }
    }

    /// Sleep, unless shut down first.
    async fn pause(&self, delay: Duration) {
        if delay.is_zero() {
            return;
        }

        tokio::select! {
            _ = self.shutdown.wait() => (),
            _ = tokio::time::sleep(delay) => (),
        }
    }

    /// Dispatch one batch of polled events in the order they came in.
    ///
    /// Events with an ID below the cursor were already seen and are dropped.
    /// Every other event moves the cursor to its ID, then goes to the handler
    /// for its type, if any, then to the wildcard handler, if any.
    async fn dispatch_batch(&mut self, events: Vec<Event>) {
        for event in events {
            if event.event_id < self.cursor {
                log::debug!(
                    "Dropping stale event {} (cursor is at {})",
                    event.event_id,
                    self.cursor
                );
                continue;
            }

            self.cursor = event.event_id;

            if let Some(handler) = self.handlers.get(&event.kind) {
                invoke(handler.as_ref(), &self.bot, event.clone(), &event.kind).await;
            }

            if let Some(wildcard) = &self.wildcard {
                let kind = event.kind.clone();
                invoke(wildcard.as_ref(), &self.bot, event, &kind).await;
            }
        }
    }
}

async fn invoke<T: Transport>(handler: &dyn Handler<T>, bot: &Bot<T>, event: Event, kind: &str) {
    let event_id = event.event_id;
    if let Err(e) = handler.handle(bot.clone(), event).await {
        log::warn!("Handler failed on {kind} event {event_id}: {e}");
    }
}
