//! The toy IR pass catalog.
//!
//! Passes form a closed set, [`ToyPass`]; each variant delegates to a
//! module-level `run` that builds a new module from the old one.

mod canonicalize;
mod constant_fold;
mod dce;
mod renumber;
mod strength_reduce;
mod verify;

use irlab_core::{Pass, PassError, PassRegistry};

use crate::ir::Module;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToyPass {
    Canonicalize,
    ConstantFold,
    Dce,
    StrengthReduce,
    Renumber,
    Verify,
}

impl ToyPass {
    pub const ALL: [ToyPass; 6] = [
        ToyPass::Canonicalize,
        ToyPass::ConstantFold,
        ToyPass::Dce,
        ToyPass::StrengthReduce,
        ToyPass::Renumber,
        ToyPass::Verify,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ToyPass::Canonicalize => "canonicalize",
            ToyPass::ConstantFold => "constant-fold",
            ToyPass::Dce => "dce",
            ToyPass::StrengthReduce => "strength-reduce",
            ToyPass::Renumber => "renumber",
            ToyPass::Verify => "verify",
        }
    }

    pub fn from_name(name: &str) -> Option<ToyPass> {
        ToyPass::ALL.iter().copied().find(|p| p.name() == name)
    }

    /// One-line summary shown by `irlab passes`.
    pub fn summary(self) -> &'static str {
        match self {
            ToyPass::Canonicalize => "move literal operands of add/mul to the right",
            ToyPass::ConstantFold => "evaluate operations on known constants",
            ToyPass::Dce => "remove instructions whose results are never used",
            ToyPass::StrengthReduce => "rewrite multiplication by a power of two as a shift",
            ToyPass::Renumber => "rename results to %0, %1, ... in definition order",
            ToyPass::Verify => "check definitions, uses and function terminators",
        }
    }

    pub fn run(self, module: &Module) -> Result<Module, PassError> {
        match self {
            ToyPass::Canonicalize => Ok(canonicalize::run(module)),
            ToyPass::ConstantFold => constant_fold::run(module),
            ToyPass::Dce => Ok(dce::run(module)),
            ToyPass::StrengthReduce => Ok(strength_reduce::run(module)),
            ToyPass::Renumber => Ok(renumber::run(module)),
            ToyPass::Verify => verify::run(module).map(|()| module.clone()),
        }
    }
}

impl Pass<Module> for ToyPass {
    fn name(&self) -> &str {
        ToyPass::name(*self)
    }

    fn apply(&self, ir: &Module) -> Result<Module, PassError> {
        self.run(ir)
    }
}

/// Registry holding every [`ToyPass`].
pub fn toy_catalog() -> PassRegistry<Module> {
    ToyPass::ALL
        .iter()
        .fold(PassRegistry::new(), |registry, pass| registry.with(*pass))
}

#[cfg(test)]
mod tests {
    use super::*;
    use irlab_core::{PassCatalog, PassId};

    #[test]
    fn catalog_lists_every_pass_sorted() {
        let names: Vec<String> = toy_catalog()
            .list_available()
            .iter()
            .map(|p| p.to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "canonicalize",
                "constant-fold",
                "dce",
                "renumber",
                "strength-reduce",
                "verify"
            ]
        );
    }

    #[test]
    fn names_round_trip() {
        for pass in ToyPass::ALL {
            assert_eq!(ToyPass::from_name(pass.name()), Some(pass));
        }
        assert_eq!(ToyPass::from_name("inline"), None);
    }

    #[test]
    fn unknown_pass_is_a_pass_error() {
        let err = toy_catalog()
            .apply(&PassId::new("inline"), &Module::default())
            .unwrap_err();
        assert_eq!(err.message, "unknown pass 'inline'");
    }
}
