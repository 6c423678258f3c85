//! Plain-text rendering shared by the one-shot commands and the session REPL.

use irlab_core::{ExecutionResult, Failure, ProjectedPass, Step};

/// Shown in place of output while the input is empty.
pub(crate) const NO_INPUT: &str = "No input";

/// Contents of the output pane for a session.
pub(crate) fn output_pane(input: &str, result: Option<&ExecutionResult>) -> String {
    if input.is_empty() {
        return NO_INPUT.to_owned();
    }
    match result {
        None => "(not computed yet)".to_owned(),
        Some(ExecutionResult::Success { output }) => output.clone(),
        Some(ExecutionResult::Failure(failure)) => failure_report(failure),
    }
}

/// Describe a failed run, followed by the last good output if there is one.
pub(crate) fn failure_report(failure: &Failure) -> String {
    let mut out = match (&failure.step, &failure.pass) {
        (Step::Parse, _) => match &failure.position {
            Some(pos) => format!("parse error at {}: {}", pos, failure.message),
            None => format!("parse error: {}", failure.message),
        },
        (Step::Pass(i), Some(pass)) => {
            format!("pass #{} ({}) failed: {}", i, pass, failure.message)
        }
        (Step::Pass(i), None) => format!("pass #{} failed: {}", i, failure.message),
    };
    if !failure.partial_output.is_empty() {
        out.push_str("\n\nlast good output:\n");
        out.push_str(&failure.partial_output);
    }
    out
}

/// Numbered pass list, one row per line.
pub(crate) fn pass_list(projected: &[ProjectedPass]) -> String {
    if projected.is_empty() {
        return "  (no passes selected)".to_owned();
    }
    projected
        .iter()
        .enumerate()
        .map(|(i, row)| format!("  {}. {}", i + 1, row))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use irlab_core::{PassId, Position};

    #[test]
    fn empty_input_shows_placeholder_even_with_result() {
        let result = ExecutionResult::Success {
            output: String::new(),
        };
        assert_eq!(output_pane("", Some(&result)), "No input");
        assert_eq!(output_pane("", None), "No input");
    }

    #[test]
    fn pass_failure_includes_partial_output() {
        let failure = Failure {
            step: Step::Pass(1),
            pass: Some(PassId::new("verify")),
            message: "function @f does not end with 'return'".to_owned(),
            partial_output: "func @f() {\n}\n".to_owned(),
            position: None,
        };
        assert_eq!(
            failure_report(&failure),
            "pass #1 (verify) failed: function @f does not end with 'return'\n\n\
             last good output:\nfunc @f() {\n}\n"
        );
    }

    #[test]
    fn parse_failure_shows_position() {
        let failure = Failure {
            step: Step::Parse,
            pass: None,
            message: "unknown operation 'frob'".to_owned(),
            partial_output: String::new(),
            position: Some(Position { line: 2, column: 8 }),
        };
        assert_eq!(
            failure_report(&failure),
            "parse error at 2:8: unknown operation 'frob'"
        );
    }

    #[test]
    fn pass_list_numbers_rows() {
        let rows = vec![
            ProjectedPass {
                pass: PassId::new("dce"),
                count: 2,
            },
            ProjectedPass {
                pass: PassId::new("verify"),
                count: 1,
            },
        ];
        assert_eq!(pass_list(&rows), "  1. dce \u{d7}2\n  2. verify");
        assert_eq!(pass_list(&[]), "  (no passes selected)");
    }
}
