use std::collections::HashSet;

use crate::ir::{Function, Module};

pub(super) fn run(module: &Module) -> Module {
    let mut out = module.clone();
    for function in &mut out.functions {
        let before = function.body.len();
        while sweep(function) {}
        let removed = before - function.body.len();
        if removed > 0 {
            tracing::debug!(function = %function.name, removed, "dce");
        }
    }
    out
}

/// Drop unused results once. Returns whether anything was removed.
fn sweep(function: &mut Function) -> bool {
    let used: HashSet<String> = function
        .body
        .iter()
        .flat_map(|inst| inst.uses())
        .map(str::to_owned)
        .collect();
    let before = function.body.len();
    function.body.retain(|inst| match &inst.result {
        Some(result) => used.contains(result),
        None => true,
    });
    function.body.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse, print};

    #[test]
    fn removes_dead_chains_to_fixpoint() {
        let module = parse(
            "func @f(%x) {\n%a = const 1\n%b = add %a, %x\n%c = mul %b, 2\n%d = neg %x\nprint %d\nreturn\n}",
        )
        .unwrap();
        assert_eq!(
            print(&run(&module)),
            "func @f(%x) {\n  %d = neg %x\n  print %d\n  return\n}\n"
        );
    }

    #[test]
    fn keeps_side_effects_and_returned_values() {
        let src = "func @f() {\n  %a = const 1\n  print 2\n  return %a\n}\n";
        assert_eq!(print(&run(&parse(src).unwrap())), src);
    }
}
