//! Lexer (tokenizer) for the netlist language.

use num_bigint::BigInt;
use num_rational::BigRational;

use crate::error::{Result, SymCircuitError};
use crate::sym::{Number, Sym};

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The token's text
    pub text: String,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

/// Token types in the netlist language.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// An identifier (component name, node name, symbolic value)
    Identifier,
    /// A number, possibly with an SI suffix
    Number,
    /// A directive (starts with '.')
    Directive,
    /// A braced expression; the text excludes the braces
    Expression,
    /// Newline
    Newline,
    /// End of file
    Eof,
}

/// Lexer for tokenizing netlist input.
pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given input.
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    /// Get the next token.
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace_and_comments();

        let (line, column) = (self.line, self.column);
        let token = |kind: TokenKind, text: String| Token {
            kind,
            text,
            line,
            column,
        };

        let Some(&ch) = self.chars.peek() else {
            return Ok(token(TokenKind::Eof, String::new()));
        };

        match ch {
            '\n' => {
                self.advance();
                Ok(token(TokenKind::Newline, "\n".to_string()))
            }
            '.' => {
                self.advance();
                let text = self.read_identifier();
                Ok(token(TokenKind::Directive, format!(".{}", text)))
            }
            '{' => {
                self.advance();
                let text = self.read_braced(line, column)?;
                Ok(token(TokenKind::Expression, text))
            }
            '-' | '+' | '0'..='9' => {
                let text = self.read_number();
                // Node names such as `1a` start with a digit too
                if self.chars.peek().is_some_and(|c| c.is_alphanumeric() || *c == '_') {
                    let rest = self.read_identifier();
                    return Ok(token(TokenKind::Identifier, text + &rest));
                }
                Ok(token(TokenKind::Number, text))
            }
            _ if ch.is_alphabetic() || ch == '_' => {
                let text = self.read_identifier();
                Ok(token(TokenKind::Identifier, text))
            }
            _ => Err(SymCircuitError::lexer(
                line,
                column,
                format!("unexpected character '{}'", ch),
            )),
        }
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(&ch) = self.chars.peek() {
            if ch == ' ' || ch == '\t' || ch == '\r' {
                self.advance();
            } else if ch == '#' || ch == ';' {
                while let Some(&c) = self.chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.advance();
                }
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut text = String::new();
        while let Some(&ch) = self.chars.peek() {
            if ch.is_alphanumeric() || ch == '_' {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        text
    }

    fn read_braced(&mut self, line: usize, column: usize) -> Result<String> {
        let mut text = String::new();
        loop {
            match self.advance() {
                Some('}') => return Ok(text.trim().to_string()),
                Some('\n') | None => {
                    return Err(SymCircuitError::lexer(line, column, "unterminated '{'"));
                }
                Some(ch) => text.push(ch),
            }
        }
    }

    fn read_digits(&mut self, text: &mut String) {
        while let Some(&ch) = self.chars.peek() {
            if ch.is_ascii_digit() {
                text.push(ch);
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_number(&mut self) -> String {
        let mut text = String::new();

        if let Some(&ch) = self.chars.peek() {
            if ch == '-' || ch == '+' {
                text.push(ch);
                self.advance();
            }
        }

        self.read_digits(&mut text);

        if let Some('.') = self.chars.peek() {
            text.push('.');
            self.advance();
            self.read_digits(&mut text);
        }

        // Exponent, only when a digit or sign follows the `e`
        if let Some(&ch) = self.chars.peek() {
            if ch == 'e' || ch == 'E' {
                let mut lookahead = self.chars.clone();
                lookahead.next();
                if lookahead.next().is_some_and(|c| c.is_ascii_digit() || c == '-' || c == '+') {
                    text.push(ch);
                    self.advance();
                    if let Some(&sign) = self.chars.peek() {
                        if sign == '-' || sign == '+' {
                            text.push(sign);
                            self.advance();
                        }
                    }
                    self.read_digits(&mut text);
                }
            }
        }

        if let Some(&ch) = self.chars.peek() {
            if SI_SUFFIXES.contains(&ch) {
                let mut lookahead = self.chars.clone();
                lookahead.next();
                if !lookahead.next().is_some_and(|c| c.is_alphanumeric() || c == '_') {
                    text.push(ch);
                    self.advance();
                }
            }
        }

        text
    }
}

const SI_SUFFIXES: [char; 9] = ['p', 'n', 'u', 'µ', 'm', 'k', 'K', 'M', 'G'];

/// Parse a number with optional SI suffix into an exact rational.
pub fn parse_value(text: &str) -> Option<Sym> {
    let text = text.trim();
    let last = text.chars().last()?;
    let (digits, exponent): (&str, i32) = match last {
        'p' => (&text[..text.len() - 1], -12),
        'n' => (&text[..text.len() - 1], -9),
        'u' => (&text[..text.len() - 1], -6),
        'µ' => (&text[..text.len() - 'µ'.len_utf8()], -6),
        'm' => (&text[..text.len() - 1], -3),
        'k' | 'K' => (&text[..text.len() - 1], 3),
        'M' => (&text[..text.len() - 1], 6),
        'G' => (&text[..text.len() - 1], 9),
        _ => (text, 0),
    };
    let (negative, digits) = match digits.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, digits.strip_prefix('+').unwrap_or(digits)),
    };
    let Number::Rational(mut value) = Number::from_decimal(digits)? else {
        return None;
    };
    let scale = BigRational::from_integer(num_traits::pow(
        BigInt::from(10),
        exponent.unsigned_abs() as usize,
    ));
    if exponent < 0 {
        value /= scale;
    } else {
        value *= scale;
    }
    if negative {
        value = -value;
    }
    Some(Sym::number(Number::Rational(value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("10k"), Some(Sym::int(10_000)));
        assert_eq!(parse_value("100n"), Some(Sym::rational(1, 10_000_000)));
        assert_eq!(parse_value("4.7u"), Some(Sym::rational(47, 10_000_000)));
        assert_eq!(parse_value("1M"), Some(Sym::int(1_000_000)));
        assert_eq!(parse_value("2.5"), Some(Sym::rational(5, 2)));
        assert_eq!(parse_value("-3"), Some(Sym::int(-3)));
        assert_eq!(parse_value("1e-3"), Some(Sym::rational(1, 1000)));
        assert_eq!(parse_value("abc"), None);
    }

    #[test]
    fn test_parse_value_scales() {
        assert_eq!(parse_value("3p"), Some(Sym::rational(3, 1_000_000_000_000)));
        assert_eq!(parse_value("-2m"), Some(Sym::rational(-1, 500)));
        assert_eq!(parse_value("2.2G"), Some(Sym::int(2_200_000_000)));
        assert_eq!(parse_value("5µ"), Some(Sym::rational(1, 200_000)));
    }

    #[test]
    fn test_lexer_basic() {
        let mut lexer = Lexer::new("R1 in out 10k");

        let tok = lexer.next_token().unwrap();
        assert_eq!(tok.kind, TokenKind::Identifier);
        assert_eq!(tok.text, "R1");

        let tok = lexer.next_token().unwrap();
        assert_eq!(tok.kind, TokenKind::Identifier);
        assert_eq!(tok.text, "in");

        lexer.next_token().unwrap();
        let tok = lexer.next_token().unwrap();
        assert_eq!(tok.kind, TokenKind::Number);
        assert_eq!(tok.text, "10k");
    }

    #[test]
    fn test_lexer_expression() {
        let mut lexer = Lexer::new("V1 1 0 s {10 / (s + 1)}");
        let kinds: Vec<TokenKind> = std::iter::from_fn(|| {
            let tok = lexer.next_token().unwrap();
            (tok.kind != TokenKind::Eof).then_some(tok)
        })
        .map(|tok| tok.kind)
        .collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier,
                TokenKind::Number,
                TokenKind::Number,
                TokenKind::Identifier,
                TokenKind::Expression,
            ]
        );
        assert!(Lexer::new("{1 + s").next_token().is_err());
    }

    #[test]
    fn test_lexer_node_names() {
        let mut lexer = Lexer::new("1a 2meg");
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Identifier);
        assert_eq!(lexer.next_token().unwrap().text, "2meg");
    }

    #[test]
    fn test_lexer_directive() {
        let mut lexer = Lexer::new(".prefix n");
        let tok = lexer.next_token().unwrap();
        assert_eq!(tok.kind, TokenKind::Directive);
        assert_eq!(tok.text, ".prefix");
    }
}
