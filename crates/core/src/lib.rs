//! irlab-core: the pipeline session engine behind irlab.
//!
//! A session pairs an input text with an ordered list of selected passes
//! and keeps the result of running one over the other up to date.
//!
//! # Public API
//!
//! - [`PipelineSequence`] -- the selected passes, with display projections
//! - [`ExecutionEngine`] -- parse, apply passes in order, print; fail fast
//! - [`SessionController`] -- synchronous session state machine
//! - [`SessionDriver`] / [`SessionHandle`] -- debounced, cancellable
//!   sessions on a tokio runtime
//! - [`Codec`] and [`PassCatalog`] -- the boundary to a concrete IR
//!
//! The codec and the catalog are supplied by the caller; this crate never
//! inspects IR values.

pub mod catalog;
pub mod codec;
pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod result;
pub mod sequence;
pub mod session;

// ── Convenience re-exports ───────────────────────────────────────────

pub use catalog::{Pass, PassCatalog, PassId, PassRegistry};
pub use codec::Codec;
pub use config::{Config, QueryConfig, SessionConfig};
pub use driver::{Command, SessionDriver, SessionHandle};
pub use engine::ExecutionEngine;
pub use error::{Cancelled, ConfigError, ParseError, PassError, Position, SessionClosed};
pub use result::{ExecutionResult, Failure, Step};
pub use sequence::{parse_pass_list, DisplayMode, PipelineSequence, ProjectedPass};
pub use session::{Completion, RunTicket, SessionController, SessionSnapshot, SessionState};
