//! Asynchronous single-flight scheduler around a [`SessionController`].
//!
//! The driver is an actor task: it alone owns the controller, receives
//! [`Command`]s over an mpsc channel, and publishes a fresh
//! [`SessionSnapshot`] on a watch channel after every event. Edits arm a
//! debounce deadline so a burst of keystrokes yields one run. Runs execute
//! on the blocking pool and report back through a `JoinSet`; the
//! controller's generation check drops anything that was superseded.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::Instant;

use crate::catalog::{PassCatalog, PassId};
use crate::codec::Codec;
use crate::config::SessionConfig;
use crate::engine::{panic_message, ExecutionEngine};
use crate::error::{Cancelled, SessionClosed};
use crate::result::{ExecutionResult, Failure, Step};
use crate::session::{SessionController, SessionSnapshot, SessionState};

const COMMAND_BUFFER: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    EditInput(String),
    ClearInput,
    AppendPass(PassId),
    RemoveLastPass,
    ClearPasses,
    ToggleDisplayMode,
    RequestRecompute,
}

struct Envelope {
    command: Command,
    ack: oneshot::Sender<u64>,
}

/// Front-end side of a running session. Cheap to clone.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Envelope>,
    snapshots: watch::Receiver<SessionSnapshot>,
}

impl SessionHandle {
    /// Send a command and wait until the session has applied it. Returns
    /// the session revision after the command.
    pub async fn send(&self, command: Command) -> Result<u64, SessionClosed> {
        let (ack, applied) = oneshot::channel();
        self.commands
            .send(Envelope { command, ack })
            .await
            .map_err(|_| SessionClosed)?;
        applied.await.map_err(|_| SessionClosed)
    }

    pub async fn edit_input(&self, text: impl Into<String>) -> Result<u64, SessionClosed> {
        self.send(Command::EditInput(text.into())).await
    }

    pub async fn clear_input(&self) -> Result<u64, SessionClosed> {
        self.send(Command::ClearInput).await
    }

    pub async fn append_pass(&self, pass: PassId) -> Result<u64, SessionClosed> {
        self.send(Command::AppendPass(pass)).await
    }

    pub async fn remove_last_pass(&self) -> Result<u64, SessionClosed> {
        self.send(Command::RemoveLastPass).await
    }

    pub async fn clear_passes(&self) -> Result<u64, SessionClosed> {
        self.send(Command::ClearPasses).await
    }

    pub async fn toggle_display_mode(&self) -> Result<u64, SessionClosed> {
        self.send(Command::ToggleDisplayMode).await
    }

    pub async fn request_recompute(&self) -> Result<u64, SessionClosed> {
        self.send(Command::RequestRecompute).await
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    /// Wait for an `Idle` snapshot at least as new as `revision`.
    ///
    /// With `auto_recompute` off this only resolves after an explicit
    /// recompute request.
    pub async fn settled(&self, revision: u64) -> Result<SessionSnapshot, SessionClosed> {
        self.wait_for(|s| s.state == SessionState::Idle && s.revision >= revision)
            .await
    }

    /// Wait for the first snapshot matching `predicate`.
    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&SessionSnapshot) -> bool,
    ) -> Result<SessionSnapshot, SessionClosed> {
        let mut rx = self.snapshots.clone();
        let snapshot = rx.wait_for(predicate).await.map_err(|_| SessionClosed)?;
        Ok(snapshot.clone())
    }
}

type RunOutcome = (u64, Result<ExecutionResult, Cancelled>);

pub struct SessionDriver<C, P> {
    engine: Arc<ExecutionEngine<C, P>>,
    config: SessionConfig,
    controller: SessionController,
    commands: mpsc::Receiver<Envelope>,
    snapshots: watch::Sender<SessionSnapshot>,
    runs: JoinSet<RunOutcome>,
    deadline: Option<Instant>,
}

impl<C, P> SessionDriver<C, P>
where
    C: Codec + 'static,
    P: PassCatalog<Ir = C::Ir> + 'static,
{
    /// Spawn a session actor on the current tokio runtime.
    pub fn spawn(
        engine: Arc<ExecutionEngine<C, P>>,
        config: SessionConfig,
    ) -> (SessionHandle, JoinHandle<()>) {
        let controller = SessionController::new().with_display_mode(config.display_mode);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (snapshot_tx, snapshot_rx) = watch::channel(controller.snapshot());
        let driver = SessionDriver {
            engine,
            config,
            controller,
            commands: command_rx,
            snapshots: snapshot_tx,
            runs: JoinSet::new(),
            deadline: None,
        };
        let task = tokio::spawn(driver.run());
        let handle = SessionHandle {
            commands: command_tx,
            snapshots: snapshot_rx,
        };
        (handle, task)
    }

    async fn run(mut self) {
        loop {
            let deadline = self.deadline;
            tokio::select! {
                envelope = self.commands.recv() => {
                    let Some(envelope) = envelope else {
                        break;
                    };
                    self.handle(envelope.command);
                    self.publish();
                    // The caller may have stopped waiting.
                    let _ = envelope.ack.send(self.controller.revision());
                    continue;
                }
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.deadline = None;
                    self.start_run();
                }
                Some(joined) = self.runs.join_next(), if !self.runs.is_empty() => {
                    match joined {
                        Ok((generation, outcome)) => {
                            self.controller.complete(generation, outcome);
                        }
                        Err(e) => tracing::error!(error = %e, "run task failed"),
                    }
                }
            }
            self.publish();
        }
        tracing::debug!("session closed");
    }

    fn handle(&mut self, command: Command) {
        let before = self.controller.revision();
        let was_running = self.controller.state() == SessionState::Running;
        match command {
            Command::EditInput(text) => self.controller.edit_input(text),
            Command::ClearInput => self.controller.clear_input(),
            Command::AppendPass(pass) => self.controller.append_pass(pass),
            Command::RemoveLastPass => {
                self.controller.remove_last_pass();
            }
            Command::ClearPasses => self.controller.clear_passes(),
            Command::ToggleDisplayMode => {
                self.controller.toggle_display_mode();
            }
            Command::RequestRecompute => {
                self.deadline = Some(Instant::now());
                return;
            }
        }
        if self.controller.revision() == before {
            return;
        }
        if self.config.auto_recompute {
            let deadline = Instant::now() + self.config.debounce();
            tracing::trace!(debounce_ms = self.config.debounce_ms, "recompute scheduled");
            self.deadline = Some(deadline);
        } else if was_running {
            // The edit cancelled a requested run; that request still stands.
            tracing::trace!("cancelled run rescheduled");
            self.deadline.get_or_insert_with(Instant::now);
        }
    }

    fn start_run(&mut self) {
        let Some(ticket) = self.controller.request_recompute() else {
            return;
        };
        let engine = Arc::clone(&self.engine);
        self.runs.spawn_blocking(move || {
            let generation = ticket.generation;
            match panic::catch_unwind(AssertUnwindSafe(|| ticket.execute(&*engine))) {
                Ok(outcome) => (generation, outcome),
                Err(payload) => {
                    // Pass panics are caught by the engine; this is the codec.
                    let message = format!("run panicked: {}", panic_message(&*payload));
                    tracing::error!(generation, %message, "run panicked");
                    let failure = Failure {
                        step: Step::Parse,
                        pass: None,
                        message,
                        partial_output: String::new(),
                        position: None,
                    };
                    (generation, Ok(ExecutionResult::Failure(failure)))
                }
            }
        });
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.controller.snapshot());
    }
}
