//! irlab-toy: a small SSA-style IR with a codec and a pass catalog.
//!
//! ```text
//! func @main(%a, %b) {
//!   %0 = const 4
//!   %1 = add %a, %0
//!   print %1
//!   return %1
//! }
//! ```
//!
//! [`ToyCodec`] plugs the text form into an [`ExecutionEngine`];
//! [`toy_catalog`] supplies the passes.

pub mod ir;
pub mod lexer;
pub mod parser;
pub mod passes;
pub mod printer;

use irlab_core::{Codec, ExecutionEngine, ParseError, PassRegistry};

pub use ir::{Function, Instruction, Module, Opcode, Operand};
pub use parser::parse;
pub use passes::{toy_catalog, ToyPass};
pub use printer::print;

/// Text codec for toy IR modules.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToyCodec;

impl Codec for ToyCodec {
    type Ir = Module;

    fn parse(&self, text: &str) -> Result<Module, ParseError> {
        parser::parse(text)
    }

    fn print(&self, ir: &Module) -> String {
        printer::print(ir)
    }
}

pub type ToyEngine = ExecutionEngine<ToyCodec, PassRegistry<Module>>;

/// Engine wired to [`ToyCodec`] and every [`ToyPass`].
pub fn toy_engine() -> ToyEngine {
    ExecutionEngine::new(ToyCodec, toy_catalog())
}
