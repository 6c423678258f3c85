use irlab_core::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Keywords and opcode names -- distinguished in the parser
    Word(String),
    /// `%name` value reference (sigil stripped)
    Value(String),
    /// `@name` function symbol (sigil stripped)
    Symbol(String),
    /// Integer literal
    Int(i64),
    // Punctuation
    LBrace,
    RBrace,
    LParen,
    RParen,
    Comma,
    Eq,
    /// Instructions are newline-terminated
    Newline,
    // End of input
    Eof,
}

#[derive(Debug, Clone)]
pub struct Spanned {
    pub token: Token,
    pub line: u32,
    pub column: u32,
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

pub fn lex(src: &str) -> Result<Vec<Spanned>, ParseError> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = src.chars().collect();
    let mut pos = 0usize;
    let mut line: u32 = 1;
    let mut line_start = 0usize;

    while pos < chars.len() {
        let c = chars[pos];
        let column = (pos - line_start) as u32 + 1;

        // Line comment
        if c == '/' && pos + 1 < chars.len() && chars[pos + 1] == '/' {
            while pos < chars.len() && chars[pos] != '\n' {
                pos += 1;
            }
            continue;
        }

        if c == '\n' {
            // Blank lines collapse into one separator
            if !matches!(tokens.last(), Some(Spanned { token: Token::Newline, .. }) | None) {
                tokens.push(Spanned {
                    token: Token::Newline,
                    line,
                    column,
                });
            }
            pos += 1;
            line += 1;
            line_start = pos;
            continue;
        }

        // Whitespace
        if c.is_whitespace() {
            pos += 1;
            continue;
        }

        // Value reference / function symbol
        if c == '%' || c == '@' {
            pos += 1;
            let start = pos;
            while pos < chars.len() && is_name_char(chars[pos]) {
                pos += 1;
            }
            if start == pos {
                return Err(ParseError::at(
                    line,
                    column,
                    format!("expected a name after '{}'", c),
                ));
            }
            let name: String = chars[start..pos].iter().collect();
            let token = if c == '%' {
                Token::Value(name)
            } else {
                Token::Symbol(name)
            };
            tokens.push(Spanned {
                token,
                line,
                column,
            });
            continue;
        }

        // Number
        if c.is_ascii_digit()
            || (c == '-' && pos + 1 < chars.len() && chars[pos + 1].is_ascii_digit())
        {
            let start = pos;
            if c == '-' {
                pos += 1;
            }
            while pos < chars.len() && chars[pos].is_ascii_digit() {
                pos += 1;
            }
            let s: String = chars[start..pos].iter().collect();
            let n: i64 = s
                .parse()
                .map_err(|_| ParseError::at(line, column, format!("invalid integer '{}'", s)))?;
            tokens.push(Spanned {
                token: Token::Int(n),
                line,
                column,
            });
            continue;
        }

        let punct = match c {
            '{' => Some(Token::LBrace),
            '}' => Some(Token::RBrace),
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            ',' => Some(Token::Comma),
            '=' => Some(Token::Eq),
            _ => None,
        };
        if let Some(token) = punct {
            tokens.push(Spanned {
                token,
                line,
                column,
            });
            pos += 1;
            continue;
        }

        // Keyword / opcode
        if c.is_alphabetic() || c == '_' {
            let start = pos;
            while pos < chars.len() && is_name_char(chars[pos]) {
                pos += 1;
            }
            let word: String = chars[start..pos].iter().collect();
            tokens.push(Spanned {
                token: Token::Word(word),
                line,
                column,
            });
            continue;
        }

        return Err(ParseError::at(
            line,
            column,
            format!("unexpected character '{}'", c),
        ));
    }

    let column = (pos - line_start) as u32 + 1;
    tokens.push(Spanned {
        token: Token::Eof,
        line,
        column,
    });
    Ok(tokens)
}
