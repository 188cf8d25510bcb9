//! Parser for expression strings such as `"(s + 1) / (s^2 + 2*s + 5)"`.
//!
//! Grammar (lowest precedence first):
//!
//! ```text
//! sum     := product (('+' | '-') product)*
//! product := unary (('*' | '/') unary | implicit unary)*
//! unary   := ('-' | '+') unary | power
//! power   := primary (('^' | '**') unary)?
//! primary := number | name | name '(' args ')' | '(' sum ')'
//! ```
//!
//! Decimal literals are read exactly, so `0.1` is the rational `1/10`.

use crate::error::{Result, SymCircuitError};

use super::func::Func;
use super::node::Sym;
use super::number::Number;
use super::symbol::{symbol_or, SymbolFlags};

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Number,
    Name,
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    OpenParen,
    CloseParen,
    Comma,
    Eof,
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    text: String,
    column: usize,
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    column: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.char_indices().peekable(),
            column: 1,
        }
    }

    fn advance(&mut self) -> Option<char> {
        let (_, ch) = self.chars.next()?;
        self.column += 1;
        Some(ch)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, ch)| ch)
    }

    fn tokenize(mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            while matches!(self.peek(), Some(c) if c.is_whitespace()) {
                self.advance();
            }
            let column = self.column;
            let Some(ch) = self.peek() else {
                tokens.push(Token {
                    kind: TokenKind::Eof,
                    text: String::new(),
                    column,
                });
                return Ok(tokens);
            };
            let (kind, text) = match ch {
                '0'..='9' | '.' => (TokenKind::Number, self.read_number()),
                _ if ch.is_alphabetic() || ch == '_' => (TokenKind::Name, self.read_name()),
                '*' => {
                    self.advance();
                    if self.peek() == Some('*') {
                        self.advance();
                        (TokenKind::Caret, "**".to_string())
                    } else {
                        (TokenKind::Star, "*".to_string())
                    }
                }
                _ => {
                    let kind = match ch {
                        '+' => TokenKind::Plus,
                        '-' => TokenKind::Minus,
                        '/' => TokenKind::Slash,
                        '^' => TokenKind::Caret,
                        '(' => TokenKind::OpenParen,
                        ')' => TokenKind::CloseParen,
                        ',' => TokenKind::Comma,
                        _ => {
                            return Err(SymCircuitError::lexer(
                                1,
                                column,
                                format!("unexpected character '{}'", ch),
                            ))
                        }
                    };
                    self.advance();
                    (kind, ch.to_string())
                }
            };
            tokens.push(Token { kind, text, column });
        }
    }

    fn read_number(&mut self) -> String {
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() || ch == '.' {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        // Exponent, only if followed by digits (so `2e` stays `2*e`)
        if matches!(self.peek(), Some('e') | Some('E')) {
            let mut lookahead = self.chars.clone();
            lookahead.next();
            let mut exponent = String::from("e");
            if let Some(&(_, sign @ ('+' | '-'))) = lookahead.peek() {
                exponent.push(sign);
                lookahead.next();
            }
            if matches!(lookahead.peek(), Some((_, d)) if d.is_ascii_digit()) {
                for _ in 0..exponent.len() {
                    self.advance();
                }
                text.push_str(&exponent);
                while let Some(ch) = self.peek() {
                    if ch.is_ascii_digit() {
                        text.push(ch);
                        self.advance();
                    } else {
                        break;
                    }
                }
            }
        }
        text
    }

    fn read_name(&mut self) -> String {
        let mut text = String::new();
        while let Some(ch) = self.peek() {
            if ch.is_alphanumeric() || ch == '_' {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        text
    }
}

/// Recursive-descent parser over a token vector.
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    flags: SymbolFlags,
}

impl Parser {
    fn current(&self) -> &Token {
        // The token vector always ends with Eof.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        if self.current().kind == kind {
            Ok(self.advance())
        } else {
            Err(self.error(format!(
                "expected {:?}, found '{}'",
                kind,
                self.current().text
            )))
        }
    }

    fn error(&self, message: impl Into<String>) -> SymCircuitError {
        let message = message.into();
        SymCircuitError::parse(1, format!("column {}: {}", self.current().column, message))
    }

    fn parse_sum(&mut self) -> Result<Sym> {
        let mut acc = self.parse_product()?;
        loop {
            match self.current().kind {
                TokenKind::Plus => {
                    self.advance();
                    acc = acc + self.parse_product()?;
                }
                TokenKind::Minus => {
                    self.advance();
                    acc = acc - self.parse_product()?;
                }
                _ => return Ok(acc),
            }
        }
    }

    fn parse_product(&mut self) -> Result<Sym> {
        let mut acc = self.parse_unary()?;
        loop {
            match self.current().kind {
                TokenKind::Star => {
                    self.advance();
                    acc = acc * self.parse_unary()?;
                }
                TokenKind::Slash => {
                    self.advance();
                    let rhs = self.parse_unary()?;
                    acc = acc * rhs.recip();
                }
                TokenKind::Number | TokenKind::Name | TokenKind::OpenParen => {
                    acc = acc * self.parse_unary()?;
                }
                _ => return Ok(acc),
            }
        }
    }

    fn parse_unary(&mut self) -> Result<Sym> {
        match self.current().kind {
            TokenKind::Minus => {
                self.advance();
                Ok(-self.parse_unary()?)
            }
            TokenKind::Plus => {
                self.advance();
                self.parse_unary()
            }
            _ => self.parse_power(),
        }
    }

    fn parse_power(&mut self) -> Result<Sym> {
        let base = self.parse_primary()?;
        if self.current().kind == TokenKind::Caret {
            self.advance();
            let exponent = self.parse_unary()?;
            return Ok(Sym::pow(base, exponent));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Sym> {
        let token = self.advance();
        match token.kind {
            TokenKind::Number => Number::from_decimal(&token.text)
                .map(Sym::number)
                .ok_or_else(|| self.error(format!("invalid number '{}'", token.text))),
            TokenKind::OpenParen => {
                let inner = self.parse_sum()?;
                self.expect(TokenKind::CloseParen)?;
                Ok(inner)
            }
            TokenKind::Name => {
                if self.current().kind == TokenKind::OpenParen {
                    self.advance();
                    let args = self.parse_args()?;
                    return self.call(&token.text, args);
                }
                Ok(self.name(&token.text))
            }
            _ => Err(self.error(format!("unexpected '{}'", token.text))),
        }
    }

    fn parse_args(&mut self) -> Result<Vec<Sym>> {
        let mut args = Vec::new();
        if self.current().kind == TokenKind::CloseParen {
            self.advance();
            return Ok(args);
        }
        loop {
            args.push(self.parse_sum()?);
            match self.current().kind {
                TokenKind::Comma => {
                    self.advance();
                }
                TokenKind::CloseParen => {
                    self.advance();
                    return Ok(args);
                }
                _ => return Err(self.error("expected ',' or ')' in argument list")),
            }
        }
    }

    fn name(&self, name: &str) -> Sym {
        match name {
            "j" | "I" => Sym::i(),
            "pi" => Sym::pi(),
            "E" => Sym::e(),
            "oo" | "inf" => Sym::oo(),
            _ => Sym::from(symbol_or(name, self.flags)),
        }
    }

    fn call(&self, name: &str, args: Vec<Sym>) -> Result<Sym> {
        if name == "sqrt" {
            return match args.as_slice() {
                [x] => Ok(x.sqrt()),
                _ => Err(self.error("sqrt takes one argument")),
            };
        }
        match Func::from_name(name) {
            Some(func) => {
                let arity_ok = match func {
                    Func::Atan2 => args.len() == 2,
                    Func::DiracDelta => args.len() == 1 || args.len() == 2,
                    _ => args.len() == 1,
                };
                if !arity_ok {
                    return Err(self.error(format!(
                        "wrong number of arguments ({}) for {}",
                        args.len(),
                        name
                    )));
                }
                Ok(Sym::apply(func, args))
            }
            None => Ok(Sym::undefined(name, args)),
        }
    }
}

/// Parse with default (positive) flags for new user symbols.
pub fn parse(text: &str) -> Result<Sym> {
    parse_with(text, SymbolFlags::POSITIVE)
}

/// Parse, creating previously unseen symbols with `flags`.
pub fn parse_with(text: &str, flags: SymbolFlags) -> Result<Sym> {
    let tokens = Lexer::new(text).tokenize()?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        flags,
    };
    let result = parser.parse_sum()?;
    if parser.current().kind != TokenKind::Eof {
        return Err(parser.error(format!("trailing input '{}'", parser.current().text)));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sym::symbol;

    #[test]
    fn test_precedence() {
        let s = Sym::from(symbol::s());
        let e = parse("1 + 2*s^2").unwrap();
        assert_eq!(e, Sym::one() + Sym::int(2) * s.powi(2));
    }

    #[test]
    fn test_unary_minus_binds_looser_than_power() {
        let s = Sym::from(symbol::s());
        assert_eq!(parse("-s^2").unwrap(), -s.powi(2));
    }

    #[test]
    fn test_power_right_associative() {
        let x = Sym::symbol("x");
        assert_eq!(parse("x^2^3").unwrap(), x.powi(8));
    }

    #[test]
    fn test_exact_decimal() {
        assert_eq!(parse("0.1").unwrap(), Sym::rational(1, 10));
        assert_eq!(parse("1e-3").unwrap(), Sym::rational(1, 1000));
    }

    #[test]
    fn test_implicit_multiplication() {
        let omega = Sym::from(symbol::omega());
        assert_eq!(parse("2j omega").unwrap(), Sym::int(2) * Sym::i() * omega);
    }

    #[test]
    fn test_functions() {
        let t = Sym::from(symbol::t());
        assert_eq!(parse("u(t)").unwrap(), Sym::heaviside(t.clone()));
        assert_eq!(parse("delta(t)").unwrap(), Sym::dirac_delta(t.clone()));
        assert_eq!(parse("v(t)").unwrap(), Sym::undefined("v", vec![t]));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(parse("1 + $"), Err(SymCircuitError::LexerError { .. })));
        assert!(matches!(parse("(s + 1"), Err(SymCircuitError::ParseError { .. })));
        assert!(matches!(parse("s s )"), Err(SymCircuitError::ParseError { .. })));
    }
}
