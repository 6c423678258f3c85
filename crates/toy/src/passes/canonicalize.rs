use crate::ir::{Module, Operand};

/// Commutative operations keep a literal operand on the right.
pub(super) fn run(module: &Module) -> Module {
    let mut out = module.clone();
    for inst in out.functions.iter_mut().flat_map(|f| f.body.iter_mut()) {
        if inst.op.is_commutative()
            && matches!(
                inst.operands.as_slice(),
                [Operand::Int(_), Operand::Value(_)]
            )
        {
            inst.operands.swap(0, 1);
        }
    }
    out
}
