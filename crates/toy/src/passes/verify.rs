use std::collections::HashSet;

use irlab_core::PassError;

use crate::ir::{Function, Module, Opcode};

pub(super) fn run(module: &Module) -> Result<(), PassError> {
    let mut seen = HashSet::new();
    for function in &module.functions {
        if !seen.insert(function.name.as_str()) {
            return Err(PassError::new(format!(
                "duplicate function @{}",
                function.name
            )));
        }
        verify_function(function)?;
    }
    Ok(())
}

fn verify_function(function: &Function) -> Result<(), PassError> {
    let mut defined: HashSet<&str> = HashSet::new();
    for param in &function.params {
        if !defined.insert(param.as_str()) {
            return Err(PassError::new(format!(
                "duplicate parameter %{} in @{}",
                param, function.name
            )));
        }
    }

    for inst in &function.body {
        if let Some(undefined) = inst.uses().find(|name| !defined.contains(name)) {
            return Err(PassError::new(format!(
                "use of undefined value %{} in @{}: {}",
                undefined, function.name, inst
            )));
        }
        if let Some(result) = &inst.result {
            if !defined.insert(result.as_str()) {
                return Err(PassError::new(format!(
                    "redefinition of %{} in @{}: {}",
                    result, function.name, inst
                )));
            }
        }
    }

    match function.body.last() {
        Some(inst) if inst.op == Opcode::Return => Ok(()),
        _ => Err(PassError::new(format!(
            "function @{} does not end with 'return'",
            function.name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;

    fn check(src: &str) -> Result<(), PassError> {
        run(&parse(src).unwrap())
    }

    #[test]
    fn accepts_well_formed_module() {
        check("func @f(%x) {\n%a = add %x, 1\nprint %a\nreturn %a\n}").unwrap();
    }

    #[test]
    fn rejects_use_before_definition() {
        let err = check("func @f() {\n%a = add %b, 1\n%b = const 1\nreturn\n}").unwrap_err();
        assert_eq!(
            err.message,
            "use of undefined value %b in @f: %a = add %b, 1"
        );
    }

    #[test]
    fn rejects_redefinition() {
        let err = check("func @f(%x) {\n%x = const 1\nreturn\n}").unwrap_err();
        assert_eq!(err.message, "redefinition of %x in @f: %x = const 1");
    }

    #[test]
    fn requires_trailing_return() {
        let err = check("func @f() {\nprint 1\n}").unwrap_err();
        assert_eq!(err.message, "function @f does not end with 'return'");
        let err = check("func @g() {\n}").unwrap_err();
        assert_eq!(err.message, "function @g does not end with 'return'");
    }

    #[test]
    fn rejects_duplicate_functions() {
        let err = check("func @f() {\nreturn\n}\nfunc @f() {\nreturn\n}").unwrap_err();
        assert_eq!(err.message, "duplicate function @f");
    }
}
