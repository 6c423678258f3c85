//! In-memory form of a toy IR module.
//! Value and function names are stored without their `%` / `@` sigils.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Module {
    pub functions: Vec<Function>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    pub name: String,
    pub params: Vec<String>,
    pub body: Vec<Instruction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub result: Option<String>,
    pub op: Opcode,
    pub operands: Vec<Operand>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Value(String),
    Int(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Const,
    Add,
    Sub,
    Mul,
    Div,
    Shl,
    Neg,
    Print,
    Return,
}

impl Opcode {
    pub const ALL: [Opcode; 9] = [
        Opcode::Const,
        Opcode::Add,
        Opcode::Sub,
        Opcode::Mul,
        Opcode::Div,
        Opcode::Shl,
        Opcode::Neg,
        Opcode::Print,
        Opcode::Return,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Opcode::Const => "const",
            Opcode::Add => "add",
            Opcode::Sub => "sub",
            Opcode::Mul => "mul",
            Opcode::Div => "div",
            Opcode::Shl => "shl",
            Opcode::Neg => "neg",
            Opcode::Print => "print",
            Opcode::Return => "return",
        }
    }

    pub fn from_name(name: &str) -> Option<Opcode> {
        Opcode::ALL.iter().copied().find(|op| op.name() == name)
    }

    /// Inclusive operand count bounds.
    pub fn arity(self) -> (usize, usize) {
        match self {
            Opcode::Const | Opcode::Neg | Opcode::Print => (1, 1),
            Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div | Opcode::Shl => (2, 2),
            Opcode::Return => (0, 1),
        }
    }

    pub fn has_result(self) -> bool {
        !matches!(self, Opcode::Print | Opcode::Return)
    }

    pub fn is_commutative(self) -> bool {
        matches!(self, Opcode::Add | Opcode::Mul)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Value(name) => write!(f, "%{}", name),
            Operand::Int(n) => write!(f, "{}", n),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(result) = &self.result {
            write!(f, "%{} = ", result)?;
        }
        write!(f, "{}", self.op)?;
        for (i, operand) in self.operands.iter().enumerate() {
            let sep = if i == 0 { " " } else { ", " };
            write!(f, "{}{}", sep, operand)?;
        }
        Ok(())
    }
}

impl Instruction {
    pub fn new(result: Option<&str>, op: Opcode, operands: Vec<Operand>) -> Self {
        Instruction {
            result: result.map(str::to_owned),
            op,
            operands,
        }
    }

    /// Names of the values this instruction reads.
    pub fn uses(&self) -> impl Iterator<Item = &str> {
        self.operands.iter().filter_map(|o| match o {
            Operand::Value(name) => Some(name.as_str()),
            Operand::Int(_) => None,
        })
    }
}
