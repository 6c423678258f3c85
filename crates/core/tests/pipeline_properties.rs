//! Engine and controller behaviour over a plain-text IR.
//!
//! The codec treats the input text itself as the IR and rejects any text
//! containing '#'. The catalog records every pass it is asked to apply so
//! tests can check which passes actually ran.

use std::sync::{Arc, Mutex};

use irlab_core::{
    Codec, DisplayMode, ExecutionEngine, ExecutionResult, ParseError, PassCatalog, PassError,
    PassId, SessionController, SessionState, Step,
};

struct PlainText;

impl Codec for PlainText {
    type Ir = String;

    fn parse(&self, text: &str) -> Result<String, ParseError> {
        match text.find('#') {
            Some(i) => Err(ParseError::at(1, i as u32 + 1, "'#' is not allowed")),
            None => Ok(text.to_owned()),
        }
    }

    fn print(&self, ir: &String) -> String {
        ir.clone()
    }
}

#[derive(Default, Clone)]
struct RecordingCatalog {
    calls: Arc<Mutex<Vec<PassId>>>,
}

impl RecordingCatalog {
    fn calls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|p| p.to_string())
            .collect()
    }
}

impl PassCatalog for RecordingCatalog {
    type Ir = String;

    fn list_available(&self) -> Vec<PassId> {
        ["Append", "Fail", "Reverse", "Upper"]
            .iter()
            .map(|n| PassId::new(n))
            .collect()
    }

    fn apply(&self, pass: &PassId, ir: &String) -> Result<String, PassError> {
        self.calls.lock().unwrap().push(pass.clone());
        match pass.as_str() {
            "Upper" => Ok(ir.to_uppercase()),
            "Reverse" => Ok(ir.chars().rev().collect()),
            "Append" => Ok(format!("{}x", ir)),
            "Fail" => Err(PassError::new("Fail always rejects its input")),
            other => Err(PassError::new(format!("unknown pass '{}'", other))),
        }
    }
}

fn engine() -> (ExecutionEngine<PlainText, RecordingCatalog>, RecordingCatalog) {
    let catalog = RecordingCatalog::default();
    (ExecutionEngine::new(PlainText, catalog.clone()), catalog)
}

fn ids(names: &[&str]) -> Vec<PassId> {
    names.iter().map(|n| PassId::new(n)).collect()
}

fn success(output: &str) -> ExecutionResult {
    ExecutionResult::Success {
        output: output.to_owned(),
    }
}

// ──────────────────────────────────────────────
// Concrete scenario
// ──────────────────────────────────────────────

#[test]
fn upper_then_reverse() {
    let (engine, _) = engine();
    assert_eq!(engine.run("abc", &ids(&["Upper", "Reverse"])), success("CBA"));
}

#[test]
fn reverse_then_upper() {
    let (engine, _) = engine();
    assert_eq!(engine.run("abc", &ids(&["Reverse", "Upper"])), success("CBA"));
}

#[test]
fn upper_then_fail_reports_index_pass_and_partial_output() {
    let (engine, _) = engine();
    let result = engine.run("abc", &ids(&["Upper", "Fail"]));
    let failure = result.failure().expect("expected failure");
    assert_eq!(failure.step, Step::Pass(1));
    assert_eq!(failure.step.index(), 1);
    assert_eq!(failure.pass, Some(PassId::new("Fail")));
    assert_eq!(failure.partial_output, "ABC");
    assert_eq!(failure.message, "Fail always rejects its input");
}

// ──────────────────────────────────────────────
// Ordering and fail-fast
// ──────────────────────────────────────────────

#[test]
fn permutations_run_in_exactly_the_given_order() {
    let (engine, catalog) = engine();
    // Append then Upper gives "ABCX"; Upper then Append gives "ABCx".
    assert_eq!(engine.run("abc", &ids(&["Append", "Upper"])), success("ABCX"));
    assert_eq!(engine.run("abc", &ids(&["Upper", "Append"])), success("ABCx"));
    assert_eq!(
        catalog.calls(),
        vec!["Append", "Upper", "Upper", "Append"]
    );
}

#[test]
fn duplicates_are_applied_every_time() {
    let (engine, catalog) = engine();
    assert_eq!(
        engine.run("a", &ids(&["Append", "Append", "Append"])),
        success("axxx")
    );
    assert_eq!(catalog.calls().len(), 3);
}

#[test]
fn passes_after_a_failure_are_never_invoked() {
    let (engine, catalog) = engine();
    let result = engine.run("abc", &ids(&["Append", "Fail", "Upper", "Reverse"]));
    assert_eq!(result.failure().map(|f| f.step), Some(Step::Pass(1)));
    assert_eq!(catalog.calls(), vec!["Append", "Fail"]);
}

#[test]
fn parse_failure_runs_no_pass() {
    let (engine, catalog) = engine();
    let result = engine.run("a#c", &ids(&["Upper"]));
    let failure = result.failure().expect("expected failure");
    assert_eq!(failure.step, Step::Parse);
    assert_eq!(failure.step.index(), -1);
    assert_eq!(failure.pass, None);
    assert_eq!(failure.partial_output, "");
    assert_eq!(failure.position.map(|p| (p.line, p.column)), Some((1, 2)));
    assert!(catalog.calls().is_empty());
}

#[test]
fn empty_pipeline_prints_what_it_parsed() {
    let (engine, _) = engine();
    for input in ["", "abc", "multi\nline\ntext"] {
        let expected = PlainText.print(&PlainText.parse(input).unwrap());
        assert_eq!(engine.run(input, &[]), success(&expected));
    }
}

// ──────────────────────────────────────────────
// Controller
// ──────────────────────────────────────────────

#[test]
fn condensed_projection_leaves_sequence_intact() {
    let mut session = SessionController::new();
    for name in ["Upper", "Upper", "Reverse"] {
        session.append_pass(PassId::new(name));
    }
    let condensed = session.project(DisplayMode::Condensed);
    assert_eq!(condensed.len(), 2);
    assert_eq!(condensed[0].to_string(), "Upper \u{d7}2");

    assert_eq!(session.remove_last_pass(), Some(PassId::new("Reverse")));
    session.append_pass(PassId::new("Append"));
    assert_eq!(session.passes(), ids(&["Upper", "Upper", "Append"]).as_slice());
}

#[test]
fn session_stays_stale_until_a_recompute_completes() {
    let (engine, _) = engine();
    let mut session = SessionController::new();

    session.edit_input("abc");
    assert_eq!(session.state(), SessionState::Stale);
    session.append_pass(PassId::new("Upper"));
    assert_eq!(session.state(), SessionState::Stale);

    assert_eq!(session.recompute_with(&engine), Some(&success("ABC")));
    assert_eq!(session.state(), SessionState::Idle);

    session.clear_passes();
    assert_eq!(session.state(), SessionState::Stale);
    assert_eq!(session.recompute_with(&engine), Some(&success("abc")));
}

#[test]
fn failure_keeps_session_usable() {
    let (engine, _) = engine();
    let mut session = SessionController::new();
    session.edit_input("abc");
    session.append_pass(PassId::new("Fail"));
    let result = session.recompute_with(&engine).cloned().unwrap();
    assert!(!result.is_success());
    assert_eq!(session.state(), SessionState::Idle);

    session.remove_last_pass();
    session.append_pass(PassId::new("Reverse"));
    assert_eq!(session.recompute_with(&engine), Some(&success("cba")));
}

#[test]
fn superseded_run_result_never_becomes_visible() {
    let (engine, _) = engine();
    let mut session = SessionController::new();
    session.edit_input("x");
    session.append_pass(PassId::new("Upper"));
    let first = session.request_recompute().unwrap();

    session.append_pass(PassId::new("Append"));
    let second = session.request_recompute().unwrap();

    let second_outcome = second.execute(&engine);
    session.complete(second.generation, second_outcome);
    // The first run ignores its cancellation here by running anyway;
    // its result still has to be discarded.
    let first_outcome = Ok(engine.run(&first.input, &first.passes));
    session.complete(first.generation, first_outcome);

    assert_eq!(session.result(), Some(&success("Xx")));
    assert_eq!(session.state(), SessionState::Idle);
}
