use std::collections::HashMap;

use crate::ir::{Function, Module, Operand};

pub(super) fn run(module: &Module) -> Module {
    let mut out = module.clone();
    for function in &mut out.functions {
        renumber(function);
    }
    out
}

fn renumber(function: &mut Function) {
    let mut names: HashMap<String, String> = HashMap::new();
    let mut next = 0usize;

    for inst in &mut function.body {
        for operand in &mut inst.operands {
            if let Operand::Value(name) = operand {
                if let Some(renamed) = names.get(name.as_str()) {
                    *name = renamed.clone();
                }
            }
        }
        if let Some(result) = &mut inst.result {
            // Numbers already taken by parameters are skipped.
            let fresh = loop {
                let candidate = next.to_string();
                next += 1;
                if !function.params.contains(&candidate) {
                    break candidate;
                }
            };
            names.insert(result.clone(), fresh.clone());
            *result = fresh;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse, print};

    #[test]
    fn numbers_results_in_definition_order() {
        let module = parse(
            "func @f(%x) {\n%sum = add %x, 1\n%dbl = mul %sum, 2\nprint %dbl\nreturn %sum\n}",
        )
        .unwrap();
        assert_eq!(
            print(&run(&module)),
            "func @f(%x) {\n  %0 = add %x, 1\n  %1 = mul %0, 2\n  print %1\n  return %0\n}\n"
        );
    }

    #[test]
    fn each_function_starts_from_zero_and_avoids_params() {
        let module = parse(
            "func @a() {\n%t = const 1\nreturn %t\n}\nfunc @b(%0) {\n%t = add %0, 1\nreturn %t\n}",
        )
        .unwrap();
        assert_eq!(
            print(&run(&module)),
            "func @a() {\n  %0 = const 1\n  return %0\n}\n\nfunc @b(%0) {\n  %1 = add %0, 1\n  return %1\n}\n"
        );
    }
}
