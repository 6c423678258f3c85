use std::fmt::Write;

use crate::ir::{Function, Module};

const INDENT: &str = "  ";

/// Render a module in canonical form.
///
/// Every function ends with `}` and a newline; functions are separated by a
/// blank line. An empty module prints as the empty string.
pub fn print(module: &Module) -> String {
    let mut out = String::new();
    for (i, function) in module.functions.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        print_function(&mut out, function);
    }
    out
}

fn print_function(out: &mut String, function: &Function) {
    let params: Vec<String> = function.params.iter().map(|p| format!("%{}", p)).collect();
    // Writing to a String cannot fail.
    let _ = writeln!(out, "func @{}({}) {{", function.name, params.join(", "));
    for inst in &function.body {
        let _ = writeln!(out, "{}{}", INDENT, inst);
    }
    out.push_str("}\n");
}
