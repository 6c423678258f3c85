use std::collections::HashMap;

use irlab_core::PassError;

use crate::ir::{Function, Instruction, Module, Opcode, Operand};

pub(super) fn run(module: &Module) -> Result<Module, PassError> {
    let mut out = module.clone();
    for function in &mut out.functions {
        let folded = fold_function(function)?;
        if folded > 0 {
            tracing::debug!(function = %function.name, folded, "constant-fold");
        }
    }
    Ok(out)
}

fn fold_function(function: &mut Function) -> Result<usize, PassError> {
    let mut known: HashMap<String, i64> = HashMap::new();
    let mut folded = 0;

    for inst in &mut function.body {
        let Some(result) = inst.result.clone() else {
            continue;
        };
        if inst.op == Opcode::Const {
            if let Some(Operand::Int(n)) = inst.operands.first() {
                known.insert(result, *n);
            }
            continue;
        }

        let values: Option<Vec<i64>> = inst
            .operands
            .iter()
            .map(|operand| match operand {
                Operand::Int(n) => Some(*n),
                Operand::Value(name) => known.get(name).copied(),
            })
            .collect();

        match values {
            Some(values) => {
                let value = evaluate(inst.op, &values)
                    .map_err(|what| PassError::new(format!("{} in @{}: {}", what, function.name, inst)))?;
                *inst = Instruction::new(Some(&result), Opcode::Const, vec![Operand::Int(value)]);
                known.insert(result, value);
                folded += 1;
            }
            None => {
                known.remove(&result);
            }
        }
    }
    Ok(folded)
}

fn evaluate(op: Opcode, values: &[i64]) -> Result<i64, &'static str> {
    let overflow = "integer overflow";
    match (op, values) {
        (Opcode::Add, [a, b]) => a.checked_add(*b).ok_or(overflow),
        (Opcode::Sub, [a, b]) => a.checked_sub(*b).ok_or(overflow),
        (Opcode::Mul, [a, b]) => a.checked_mul(*b).ok_or(overflow),
        (Opcode::Div, [_, 0]) => Err("division by zero"),
        (Opcode::Div, [a, b]) => a.checked_div(*b).ok_or(overflow),
        (Opcode::Shl, [a, b]) => {
            if !(0..64).contains(b) {
                return Err("shift amount out of range");
            }
            let shifted = a << b;
            if shifted >> b != *a {
                return Err(overflow);
            }
            Ok(shifted)
        }
        (Opcode::Neg, [a]) => a.checked_neg().ok_or(overflow),
        _ => unreachable!("'{}' has no foldable form", op),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse, print};

    fn fold(src: &str) -> Result<String, PassError> {
        run(&parse(src).unwrap()).map(|m| print(&m))
    }

    #[test]
    fn folds_through_const_chains() {
        let out = fold(
            "func @f() {\n%a = const 6\n%b = mul %a, 7\n%c = neg %b\n%d = shl %c, 1\nreturn %d\n}",
        )
        .unwrap();
        assert_eq!(
            out,
            "func @f() {\n  %a = const 6\n  %b = const 42\n  %c = const -42\n  %d = const -84\n  return %d\n}\n"
        );
    }

    #[test]
    fn leaves_unknown_operands_alone() {
        let src = "func @f(%x) {\n  %a = const 2\n  %b = add %x, %a\n  return %b\n}\n";
        assert_eq!(fold(src).unwrap(), src);
    }

    #[test]
    fn division_by_zero_is_an_error() {
        let err = fold("func @f() {\n%z = const 0\n%q = div 1, %z\nreturn %q\n}").unwrap_err();
        assert_eq!(err.message, "division by zero in @f: %q = div 1, %z");
    }

    #[test]
    fn overflow_is_an_error() {
        let err = fold("func @f() {\n%q = add 9223372036854775807, 1\nreturn\n}").unwrap_err();
        assert!(err.message.starts_with("integer overflow in @f"));
        let err = fold("func @f() {\n%q = shl 1, 64\nreturn\n}").unwrap_err();
        assert!(err.message.starts_with("shift amount out of range"));
    }

    #[test]
    fn print_and_return_are_untouched() {
        let src = "func @f() {\n  print 3\n  return 4\n}\n";
        assert_eq!(fold(src).unwrap(), src);
    }
}
