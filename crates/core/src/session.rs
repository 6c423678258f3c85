//! Session state machine.
//!
//! A [`SessionController`] owns the input text, the selected passes, the
//! display mode and the last result. Runs are handed out as
//! [`RunTicket`]s stamped with a generation number; a completed run is only
//! accepted if its generation is still the one in flight, so a superseded
//! result can never become visible.

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::catalog::{PassCatalog, PassId};
use crate::codec::Codec;
use crate::engine::ExecutionEngine;
use crate::error::Cancelled;
use crate::result::ExecutionResult;
use crate::sequence::{DisplayMode, PipelineSequence, ProjectedPass};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    /// The stored result matches the current input and passes.
    #[default]
    Idle,
    /// Input or passes changed since the last completed run.
    Stale,
    /// A run for the current input and passes is in flight.
    Running,
    /// A run was superseded before completing. Reported for that run's
    /// ticket, never as the session's own state.
    Cancelled,
}

/// Everything a run needs, captured when it was requested.
#[derive(Debug, Clone)]
pub struct RunTicket {
    pub generation: u64,
    pub input: String,
    pub passes: Vec<PassId>,
    pub token: CancellationToken,
}

impl RunTicket {
    pub fn status(&self) -> SessionState {
        if self.token.is_cancelled() {
            SessionState::Cancelled
        } else {
            SessionState::Running
        }
    }

    pub fn execute<C, P>(&self, engine: &ExecutionEngine<C, P>) -> Result<ExecutionResult, Cancelled>
    where
        C: Codec,
        P: PassCatalog<Ir = C::Ir>,
    {
        engine.run_cancellable(&self.input, &self.passes, &self.token)
    }
}

/// What `complete` did with a finished run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Discarded,
}

#[derive(Debug)]
struct InFlight {
    generation: u64,
    token: CancellationToken,
}

/// Immutable copy of a session's observable state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub input: String,
    pub passes: Vec<PassId>,
    pub display_mode: DisplayMode,
    pub projected: Vec<ProjectedPass>,
    pub result: Option<ExecutionResult>,
    pub state: SessionState,
    /// Bumped by every change to input or passes.
    pub revision: u64,
    /// Revision the stored result was computed for.
    pub result_revision: Option<u64>,
    /// Finished runs whose results were discarded.
    pub superseded: u64,
}

#[derive(Debug, Default)]
pub struct SessionController {
    input: String,
    sequence: PipelineSequence,
    display_mode: DisplayMode,
    result: Option<ExecutionResult>,
    result_revision: Option<u64>,
    state: SessionState,
    revision: u64,
    generation: u64,
    in_flight: Option<InFlight>,
    in_flight_revision: u64,
    superseded: u64,
}

impl SessionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_display_mode(mut self, mode: DisplayMode) -> Self {
        self.display_mode = mode;
        self
    }

    // ── Front-end operations ──────────────────────────────────────────

    pub fn edit_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
        self.invalidate();
    }

    pub fn clear_input(&mut self) {
        self.edit_input(String::new());
    }

    pub fn append_pass(&mut self, pass: PassId) {
        self.sequence.append(pass);
        self.invalidate();
    }

    /// Drop the last selected pass. Returns `None`, and leaves the
    /// session untouched, when nothing is selected.
    pub fn remove_last_pass(&mut self) -> Option<PassId> {
        let removed = self.sequence.remove_last();
        if removed.is_some() {
            self.invalidate();
        }
        removed
    }

    pub fn clear_passes(&mut self) {
        if !self.sequence.is_empty() {
            self.sequence.clear();
            self.invalidate();
        }
    }

    pub fn toggle_display_mode(&mut self) -> DisplayMode {
        self.display_mode = self.display_mode.toggled();
        self.display_mode
    }

    /// Start a run if the stored result is out of date. Returns `None`
    /// when the session is `Idle` or the current run is already in flight.
    pub fn request_recompute(&mut self) -> Option<RunTicket> {
        if self.state != SessionState::Stale {
            return None;
        }
        self.generation += 1;
        let token = CancellationToken::new();
        self.in_flight = Some(InFlight {
            generation: self.generation,
            token: token.clone(),
        });
        self.in_flight_revision = self.revision;
        self.state = SessionState::Running;
        tracing::debug!(generation = self.generation, revision = self.revision, "run started");
        Some(RunTicket {
            generation: self.generation,
            input: self.input.clone(),
            passes: self.sequence.as_slice().to_vec(),
            token,
        })
    }

    /// Accept or discard the outcome of a finished run.
    pub fn complete(
        &mut self,
        generation: u64,
        outcome: Result<ExecutionResult, Cancelled>,
    ) -> Completion {
        let current = matches!(&self.in_flight, Some(f) if f.generation == generation);
        match outcome {
            Ok(result) if current => {
                self.in_flight = None;
                self.result = Some(result);
                self.result_revision = Some(self.in_flight_revision);
                self.state = SessionState::Idle;
                tracing::debug!(generation, "run applied");
                Completion::Applied
            }
            _ => {
                if current {
                    // Cancelled without being superseded; the inputs are
                    // still unserved.
                    self.in_flight = None;
                    self.state = SessionState::Stale;
                }
                self.superseded += 1;
                tracing::debug!(generation, "superseded run discarded");
                Completion::Discarded
            }
        }
    }

    /// Request, execute and complete a run on the calling thread.
    pub fn recompute_with<C, P>(&mut self, engine: &ExecutionEngine<C, P>) -> Option<&ExecutionResult>
    where
        C: Codec,
        P: PassCatalog<Ir = C::Ir>,
    {
        if let Some(ticket) = self.request_recompute() {
            let outcome = ticket.execute(engine);
            self.complete(ticket.generation, outcome);
        }
        self.result.as_ref()
    }

    // ── Observations ──────────────────────────────────────────────────

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn sequence(&self) -> &PipelineSequence {
        &self.sequence
    }

    pub fn passes(&self) -> &[PassId] {
        self.sequence.as_slice()
    }

    pub fn project(&self, mode: DisplayMode) -> Vec<ProjectedPass> {
        self.sequence.project(mode)
    }

    pub fn projected(&self) -> Vec<ProjectedPass> {
        self.sequence.project(self.display_mode)
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    pub fn result(&self) -> Option<&ExecutionResult> {
        self.result.as_ref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            input: self.input.clone(),
            passes: self.sequence.as_slice().to_vec(),
            display_mode: self.display_mode,
            projected: self.projected(),
            result: self.result.clone(),
            state: self.state,
            revision: self.revision,
            result_revision: self.result_revision,
            superseded: self.superseded,
        }
    }

    fn invalidate(&mut self) {
        self.revision += 1;
        if let Some(run) = self.in_flight.take() {
            run.token.cancel();
            tracing::debug!(generation = run.generation, "in-flight run superseded");
        }
        self.state = SessionState::Stale;
    }
}
