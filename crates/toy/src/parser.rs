//! Recursive-descent parser for the toy IR.
//!
//! ```text
//! module      := { function }
//! function    := "func" @name "(" [ %p { "," %p } ] ")" "{" { instruction NL } "}"
//! instruction := [ %r "=" ] opcode [ operand { "," operand } ]
//! operand     := %value | integer
//! ```
//!
//! Operand counts and result presence are checked here; whether values are
//! defined before use is left to the `verify` pass.

use irlab_core::ParseError;

use crate::ir::{Function, Instruction, Module, Opcode, Operand};
use crate::lexer::{self, Spanned, Token};

// ──────────────────────────────────────────────
// Parser
// ──────────────────────────────────────────────

struct Parser<'a> {
    tokens: &'a [Spanned],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Spanned]) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn cur(&self) -> &Spanned {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek(&self) -> &Token {
        &self.cur().token
    }

    fn advance(&mut self) -> &Spanned {
        let t = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        t
    }

    fn err(&self, msg: impl Into<String>) -> ParseError {
        let s = self.cur();
        ParseError::at(s.line, s.column, msg)
    }

    fn err_at(&self, at: &Spanned, msg: impl Into<String>) -> ParseError {
        ParseError::at(at.line, at.column, msg)
    }

    fn expect(&mut self, expected: Token, what: &str) -> Result<(), ParseError> {
        if self.peek() == &expected {
            self.advance();
            Ok(())
        } else {
            Err(self.err(format!("expected {}, got {}", what, describe(self.peek()))))
        }
    }

    fn skip_newlines(&mut self) {
        while self.peek() == &Token::Newline {
            self.advance();
        }
    }

    fn parse_module(&mut self) -> Result<Module, ParseError> {
        let mut functions = Vec::new();
        loop {
            self.skip_newlines();
            match self.peek() {
                Token::Eof => break,
                Token::Word(w) if w == "func" => {}
                other => {
                    return Err(self.err(format!("expected 'func', got {}", describe(other))));
                }
            }
            functions.push(self.parse_function()?);
        }
        Ok(Module { functions })
    }

    fn parse_function(&mut self) -> Result<Function, ParseError> {
        self.advance(); // func
        let name = match self.peek().clone() {
            Token::Symbol(name) => {
                self.advance();
                name
            }
            other => {
                return Err(self.err(format!(
                    "expected function name like '@main', got {}",
                    describe(&other)
                )))
            }
        };

        self.expect(Token::LParen, "'('")?;
        let mut params = Vec::new();
        if self.peek() != &Token::RParen {
            loop {
                match self.peek().clone() {
                    Token::Value(p) => {
                        self.advance();
                        params.push(p);
                    }
                    other => {
                        return Err(self.err(format!(
                            "expected parameter like '%x', got {}",
                            describe(&other)
                        )))
                    }
                }
                if self.peek() == &Token::Comma {
                    self.advance();
                } else {
                    break;
                }
            }
        }
        self.expect(Token::RParen, "')'")?;
        self.expect(Token::LBrace, "'{'")?;

        let mut body = Vec::new();
        loop {
            self.skip_newlines();
            match self.peek() {
                Token::RBrace => {
                    self.advance();
                    break;
                }
                Token::Eof => return Err(self.err(format!("unterminated function '@{}'", name))),
                _ => {
                    body.push(self.parse_instruction()?);
                    match self.peek() {
                        Token::Newline => {
                            self.advance();
                        }
                        Token::RBrace => {}
                        other => {
                            return Err(self.err(format!(
                                "expected end of line, got {}",
                                describe(other)
                            )))
                        }
                    }
                }
            }
        }

        Ok(Function { name, params, body })
    }

    fn parse_instruction(&mut self) -> Result<Instruction, ParseError> {
        let start = self.cur().clone();

        let result = if let Token::Value(r) = self.peek().clone() {
            self.advance();
            self.expect(Token::Eq, "'='")?;
            Some(r)
        } else {
            None
        };

        let op_tok = self.cur().clone();
        let op = match &op_tok.token {
            Token::Word(w) => Opcode::from_name(w)
                .ok_or_else(|| self.err_at(&op_tok, format!("unknown operation '{}'", w)))?,
            other => {
                return Err(self.err_at(
                    &op_tok,
                    format!("expected an operation, got {}", describe(other)),
                ))
            }
        };
        self.advance();

        let mut operands = Vec::new();
        if !matches!(self.peek(), Token::Newline | Token::RBrace | Token::Eof) {
            loop {
                operands.push(self.parse_operand()?);
                if self.peek() == &Token::Comma {
                    self.advance();
                } else {
                    break;
                }
            }
        }

        let (min, max) = op.arity();
        if operands.len() < min || operands.len() > max {
            let expected = if min == max {
                format!("{}", min)
            } else {
                format!("{} to {}", min, max)
            };
            return Err(self.err_at(
                &op_tok,
                format!(
                    "'{}' takes {} operand(s), got {}",
                    op,
                    expected,
                    operands.len()
                ),
            ));
        }
        match (op.has_result(), &result) {
            (true, None) => {
                return Err(self.err_at(&start, format!("'{}' must assign a result", op)));
            }
            (false, Some(_)) => {
                return Err(self.err_at(&start, format!("'{}' does not produce a result", op)));
            }
            _ => {}
        }
        if op == Opcode::Const && !matches!(operands[0], Operand::Int(_)) {
            return Err(self.err_at(&op_tok, "'const' takes an integer literal"));
        }

        Ok(Instruction {
            result,
            op,
            operands,
        })
    }

    fn parse_operand(&mut self) -> Result<Operand, ParseError> {
        match self.peek().clone() {
            Token::Value(v) => {
                self.advance();
                Ok(Operand::Value(v))
            }
            Token::Int(n) => {
                self.advance();
                Ok(Operand::Int(n))
            }
            other => Err(self.err(format!(
                "expected operand ('%value' or integer), got {}",
                describe(&other)
            ))),
        }
    }
}

fn describe(token: &Token) -> String {
    match token {
        Token::Word(w) => format!("'{}'", w),
        Token::Value(v) => format!("'%{}'", v),
        Token::Symbol(s) => format!("'@{}'", s),
        Token::Int(n) => format!("'{}'", n),
        Token::LBrace => "'{'".to_owned(),
        Token::RBrace => "'}'".to_owned(),
        Token::LParen => "'('".to_owned(),
        Token::RParen => "')'".to_owned(),
        Token::Comma => "','".to_owned(),
        Token::Eq => "'='".to_owned(),
        Token::Newline => "end of line".to_owned(),
        Token::Eof => "end of input".to_owned(),
    }
}

/// Parse toy IR source text into a [`Module`].
pub fn parse(src: &str) -> Result<Module, ParseError> {
    let tokens = lexer::lex(src)?;
    Parser::new(&tokens).parse_module()
}
