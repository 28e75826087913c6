//! Channel-driven driver for [`Shell`].
//!
//! Events are reduced strictly in arrival order. Platform requests go to
//! the host synchronously; service calls run as tokio tasks and post their
//! completion event back onto the same queue.

use crate::effect::{Effect, PlatformRequest, ServiceCall, ServiceRunner};
use crate::events::{OpenRequest, ShellEvent};
use crate::session::SessionSnapshot;
use crate::shell::Shell;
use tokio::sync::mpsc;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct EventQueue {
    sender: mpsc::UnboundedSender<ShellEvent>,
}

impl EventQueue {
    /// Returns `false` once the dispatcher has stopped.
    pub fn send(&self, event: ShellEvent) -> bool {
        match self.sender.send(event) {
            Ok(()) => true,
            Err(mpsc::error::SendError(event)) => {
                debug!(?event, "Event queue closed; dropping event");
                false
            }
        }
    }
}

/// The host side of the queue.
pub trait Platform: Send {
    fn apply(&mut self, request: PlatformRequest);
}

pub struct Dispatcher<P> {
    shell: Shell,
    runner: ServiceRunner,
    platform: P,
    events: mpsc::UnboundedReceiver<ShellEvent>,
    completions: mpsc::WeakUnboundedSender<ShellEvent>,
}

impl<P: Platform> Dispatcher<P> {
    /// The returned queue is the only strong sender; the dispatcher stops
    /// once it and every clone are dropped and nothing is in flight.
    pub fn new(shell: Shell, runner: ServiceRunner, platform: P) -> (Self, EventQueue) {
        let (sender, events) = mpsc::unbounded_channel();
        let dispatcher = Self {
            shell,
            runner,
            platform,
            events,
            completions: sender.downgrade(),
        };
        (dispatcher, EventQueue { sender })
    }

    pub fn shell(&self) -> &Shell {
        &self.shell
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Runs [`Shell::start`] and dispatches what it asks for.
    pub fn start(&mut self, snapshot: Option<SessionSnapshot>, opens: Vec<OpenRequest>) -> bool {
        let effects = self.shell.start(snapshot, opens);
        self.dispatch(effects)
    }

    pub async fn run(mut self) -> (Shell, P) {
        while let Some(event) = self.events.recv().await {
            debug!(?event, "Reducing event");
            let effects = self.shell.reduce(event);
            if self.dispatch(effects) {
                info!("Exit requested; dispatcher stopping");
                break;
            }
        }
        (self.shell, self.platform)
    }

    /// Returns whether exit was requested.
    fn dispatch(&mut self, effects: Vec<Effect>) -> bool {
        let mut exit = false;
        for effect in effects {
            match effect {
                Effect::Platform(PlatformRequest::Exit) => {
                    self.platform.apply(PlatformRequest::Exit);
                    exit = true;
                }
                Effect::Platform(request) => self.platform.apply(request),
                Effect::Service(call) => self.spawn(call),
            }
        }
        exit
    }

    fn spawn(&self, call: ServiceCall) {
        let Some(sender) = self.completions.upgrade() else {
            debug!(?call, "Queue has no senders; dropping service call");
            return;
        };
        let queue = EventQueue { sender };
        let runner = self.runner.clone();
        tokio::spawn(async move {
            let event = runner.perform(call).await;
            queue.send(event);
        });
    }
}
