//! Runs the codec and a pass sequence over one input text.
//!
//! Execution is fail-fast: the first pass that rejects its input ends the
//! run, and the failure reports the printed IR as it stood before that
//! pass. Nothing is cached between runs. A pass that panics is reported
//! as a failure at its index, like one that returned an error.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use tokio_util::sync::CancellationToken;

use crate::catalog::{PassCatalog, PassId};
use crate::codec::Codec;
use crate::error::Cancelled;
use crate::result::{ExecutionResult, Failure, Step};

pub struct ExecutionEngine<C, P> {
    codec: C,
    catalog: P,
}

impl<C, P> ExecutionEngine<C, P>
where
    C: Codec,
    P: PassCatalog<Ir = C::Ir>,
{
    pub fn new(codec: C, catalog: P) -> Self {
        ExecutionEngine { codec, catalog }
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn catalog(&self) -> &P {
        &self.catalog
    }

    /// Run to completion. Cannot be cancelled.
    pub fn run(&self, input: &str, passes: &[PassId]) -> ExecutionResult {
        match self.run_cancellable(input, passes, &CancellationToken::new()) {
            Ok(result) => result,
            Err(Cancelled) => unreachable!("fresh token is never cancelled"),
        }
    }

    /// Run, polling `token` before the parse, between passes, and before
    /// the final print. A pass that has started always finishes.
    pub fn run_cancellable(
        &self,
        input: &str,
        passes: &[PassId],
        token: &CancellationToken,
    ) -> Result<ExecutionResult, Cancelled> {
        check(token)?;

        let mut ir = match self.codec.parse(input) {
            Ok(ir) => ir,
            Err(e) => {
                tracing::debug!(error = %e, "input rejected by codec");
                return Ok(ExecutionResult::Failure(Failure {
                    step: Step::Parse,
                    pass: None,
                    message: e.message,
                    partial_output: String::new(),
                    position: e.position,
                }));
            }
        };

        for (index, pass) in passes.iter().enumerate() {
            check(token)?;
            let started = Instant::now();
            let applied = panic::catch_unwind(AssertUnwindSafe(|| self.catalog.apply(pass, &ir)));
            let applied = match applied {
                Ok(applied) => applied,
                Err(payload) => {
                    let message = format!("pass panicked: {}", panic_message(&*payload));
                    tracing::error!(index, pass = %pass, %message, "pass panicked");
                    return Ok(ExecutionResult::Failure(Failure {
                        step: Step::Pass(index),
                        pass: Some(pass.clone()),
                        message,
                        partial_output: self.codec.print(&ir),
                        position: None,
                    }));
                }
            };
            match applied {
                Ok(next) => {
                    tracing::debug!(
                        index,
                        pass = %pass,
                        elapsed_us = started.elapsed().as_micros() as u64,
                        "pass applied"
                    );
                    ir = next;
                }
                Err(e) => {
                    tracing::debug!(index, pass = %pass, error = %e, "pass rejected input");
                    return Ok(ExecutionResult::Failure(Failure {
                        step: Step::Pass(index),
                        pass: Some(pass.clone()),
                        message: e.message,
                        partial_output: self.codec.print(&ir),
                        position: None,
                    }));
                }
            }
        }

        check(token)?;
        Ok(ExecutionResult::Success {
            output: self.codec.print(&ir),
        })
    }
}

fn check(token: &CancellationToken) -> Result<(), Cancelled> {
    if token.is_cancelled() {
        Err(Cancelled)
    } else {
        Ok(())
    }
}

/// Text carried by a panic payload, for `panic!("...")` and
/// `panic!("{}", ..)` alike.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}
