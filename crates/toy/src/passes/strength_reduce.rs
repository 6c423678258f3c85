use crate::ir::{Module, Opcode, Operand};

pub(super) fn run(module: &Module) -> Module {
    let mut out = module.clone();
    for inst in out.functions.iter_mut().flat_map(|f| f.body.iter_mut()) {
        if inst.op != Opcode::Mul {
            continue;
        }
        let reduced = match inst.operands.as_slice() {
            [other, Operand::Int(n)] | [Operand::Int(n), other] if is_power_of_two(*n) => {
                Some((other.clone(), n.trailing_zeros()))
            }
            _ => None,
        };
        if let Some((other, shift)) = reduced {
            inst.op = Opcode::Shl;
            inst.operands = vec![other, Operand::Int(i64::from(shift))];
        }
    }
    out
}

fn is_power_of_two(n: i64) -> bool {
    n > 0 && n & (n - 1) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse, print};

    #[test]
    fn rewrites_power_of_two_multiplies() {
        let module = parse(
            "func @f(%x) {\n%a = mul %x, 8\n%b = mul 4, %a\n%c = mul %b, 1\nreturn %c\n}",
        )
        .unwrap();
        assert_eq!(
            print(&run(&module)),
            "func @f(%x) {\n  %a = shl %x, 3\n  %b = shl %a, 2\n  %c = shl %b, 0\n  return %c\n}\n"
        );
    }

    #[test]
    fn other_multipliers_are_kept() {
        let src = "func @f(%x) {\n  %a = mul %x, 6\n  %b = mul %a, -4\n  %c = mul %b, 0\n  return %c\n}\n";
        assert_eq!(print(&run(&parse(src).unwrap())), src);
    }
}
