use crate::error::Error;
use crate::token::{Op, Token, TokenKind};
use log::trace;
use std::iter::{FusedIterator, Peekable};
use std::str::CharIndices;

#[must_use]
/// Check if `ident` is a valid variable or function name
///
/// # Examples
///
/// ```
/// # use mathparse::is_identifier;
///
/// assert_eq!(is_identifier("__abc3"), true);
/// assert_eq!(is_identifier("34zb"), false);
/// ```
pub fn is_identifier(ident: &str) -> bool {
    let mut chars = ident.chars();
    // Check first char
    if !chars.next().map_or(false, is_identifier_start) {
        return false;
    }
    // Check all others
    chars.all(is_identifier_part)
}

/// Split `input` into tokens, ending with a single `EndOfInput` token.
///
/// # Examples
///
/// ```
/// # use mathparse::{tokenize, TokenKind};
/// let tokens = tokenize("sin(x)").unwrap();
/// assert_eq!(tokens.len(), 5);
/// assert_eq!(tokens[4].kind, TokenKind::EndOfInput);
///
/// assert!(tokenize("2 # 3").is_err());
/// ```
pub fn tokenize(input: &str) -> Result<Vec<Token>, Error> {
    Lexer::new(input).collect()
}

/// A lazy, single pass lexer over an input string.
///
/// The lexer yields `Ok(token)` until it reaches the end of the input, where
/// it yields one `EndOfInput` token. After that, or after the first error, it
/// only yields `None`.
pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
    done: bool,
}

impl<'a> Lexer<'a> {
    /// Create a lexer reading `input`
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            chars: input.char_indices().peekable(),
            done: false,
        }
    }

    /// Byte offset of the next unread char
    fn offset(&mut self) -> usize {
        self.chars.peek().map_or(self.input.len(), |&(i, _)| i)
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    /// Consume the next char if it is `expected`
    fn eat(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.chars.next();
            true
        } else {
            false
        }
    }

    fn next_token(&mut self) -> Result<Token, Error> {
        while self.peek_char().map_or(false, is_whitespace) {
            self.chars.next();
        }

        let (start, c) = match self.chars.next() {
            Some(next) => next,
            None => return Ok(Token::new(TokenKind::EndOfInput, "", self.input.len())),
        };

        let kind = match c {
            c if c.is_ascii_digit() || c == '.' => return self.number(start, c),
            c if is_identifier_start(c) => return Ok(self.identifier(start)),
            '\'' | '"' => return self.string(start, c),
            '+' => TokenKind::Operator(Op::Plus),
            '-' => TokenKind::Operator(Op::Minus),
            '*' => TokenKind::Operator(Op::Mul),
            '/' => TokenKind::Operator(Op::Div),
            '%' => TokenKind::Operator(Op::Mod),
            '^' => TokenKind::Operator(Op::Exp),
            '?' => TokenKind::Operator(Op::Question),
            ':' => TokenKind::Operator(Op::Colon),
            '=' if self.eat('=') => TokenKind::Operator(Op::Eq),
            '!' if self.eat('=') => TokenKind::Operator(Op::NotEq),
            '!' => TokenKind::Operator(Op::Not),
            '<' if self.eat('=') => TokenKind::Operator(Op::LessEq),
            '<' => TokenKind::Operator(Op::Less),
            '>' if self.eat('=') => TokenKind::Operator(Op::GreaterEq),
            '>' => TokenKind::Operator(Op::Greater),
            '&' if self.eat('&') => TokenKind::Operator(Op::And),
            '|' if self.eat('|') => TokenKind::Operator(Op::Or),
            '=' | '&' | '|' => {
                return Err(Error::parse(
                    format!("unknown operator '{}', expected '{}{}'", c, c, c),
                    start,
                ));
            }
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            ',' => TokenKind::Comma,
            other => {
                return Err(Error::parse(
                    format!("unexpected character in input: {}", other),
                    start,
                ));
            }
        };
        let end = self.offset();
        Ok(Token::new(kind, &self.input[start..end], start))
    }

    /// Lex a decimal or scientific literal whose first char, `first`, was
    /// already consumed
    fn number(&mut self, start: usize, first: char) -> Result<Token, Error> {
        let mut seen_dot = first == '.';
        let mut digits = first.is_ascii_digit();

        while let Some(c) = self.peek_char() {
            match c {
                c if c.is_ascii_digit() => {
                    self.chars.next();
                    digits = true;
                }
                '.' if seen_dot => {
                    return Err(Error::parse(
                        "malformed number: more than one decimal point",
                        start,
                    ));
                }
                '.' => {
                    self.chars.next();
                    seen_dot = true;
                }
                'e' | 'E' if digits => {
                    self.chars.next();
                    if !self.eat('+') {
                        self.eat('-');
                    }
                    let mut exponent = false;
                    while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
                        self.chars.next();
                        exponent = true;
                    }
                    if !exponent {
                        return Err(Error::parse(
                            "malformed number: missing exponent digits",
                            start,
                        ));
                    }
                    break;
                }
                _ => break,
            }
        }

        if !digits {
            return Err(Error::parse("unexpected character in input: .", start));
        }
        if self
            .peek_char()
            .map_or(false, |c| c == '.' || is_identifier_part(c))
        {
            let end = self.offset();
            return Err(Error::parse(
                format!("malformed number starting with '{}'", &self.input[start..end]),
                start,
            ));
        }

        let end = self.offset();
        let text = &self.input[start..end];
        let value = text
            .parse::<f64>()
            .map_err(|e| Error::parse(format!("invalid number {}: {}", text, e), start))?;
        Ok(Token::new(TokenKind::Number(value), text, start))
    }

    fn identifier(&mut self, start: usize) -> Token {
        while self.peek_char().map_or(false, is_identifier_part) {
            self.chars.next();
        }
        let end = self.offset();
        let text = &self.input[start..end];
        let kind = match text {
            "true" => TokenKind::Boolean(true),
            "false" => TokenKind::Boolean(false),
            _ => TokenKind::Identifier,
        };
        Token::new(kind, text, start)
    }

    /// Lex a string literal delimited by `quote`, which was already consumed
    fn string(&mut self, start: usize, quote: char) -> Result<Token, Error> {
        let mut value = String::new();
        loop {
            let (at, c) = self
                .chars
                .next()
                .ok_or_else(|| Error::parse("unterminated string literal", start))?;
            match c {
                c if c == quote => break,
                '\\' => {
                    let (_, escaped) = self
                        .chars
                        .next()
                        .ok_or_else(|| Error::parse("unterminated string literal", start))?;
                    let resolved = match escaped {
                        '\\' | '\'' | '"' => escaped,
                        'n' => '\n',
                        't' => '\t',
                        other => {
                            return Err(Error::parse(
                                format!("unknown escape sequence '\\{}'", other),
                                at,
                            ));
                        }
                    };
                    value.push(resolved);
                }
                c => value.push(c),
            }
        }
        let end = self.offset();
        Ok(Token::new(
            TokenKind::StringLiteral(value),
            &self.input[start..end],
            start,
        ))
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let token = self.next_token();
        match token {
            Ok(ref token) => {
                trace!("token {:?} at {}", token.kind, token.position);
                self.done = token.kind == TokenKind::EndOfInput;
            }
            Err(_) => self.done = true,
        }
        Some(token)
    }
}

impl FusedIterator for Lexer<'_> {}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// Check if `c` can appear at the first character of an identifier
fn is_identifier_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

/// Check if `c` can appear inside an identifier
fn is_identifier_part(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{Op, TokenKind};
    use test_case::test_case;

    fn kinds(input: &str) -> Result<Vec<TokenKind>, Error> {
        tokenize(input).map(|tokens| tokens.into_iter().map(|t| t.kind).collect())
    }

    #[test_case("2 + 2" => Ok(vec![TokenKind::Number(2.0), TokenKind::Operator(Op::Plus), TokenKind::Number(2.0), TokenKind::EndOfInput]) ; "addition is lexed properly")]
    #[test_case("2+2" => Ok(vec![TokenKind::Number(2.0), TokenKind::Operator(Op::Plus), TokenKind::Number(2.0), TokenKind::EndOfInput]) ; "spaces are optional")]
    #[test_case("a<=b" => Ok(vec![TokenKind::Identifier, TokenKind::Operator(Op::LessEq), TokenKind::Identifier, TokenKind::EndOfInput]) ; "two char operators")]
    #[test_case("!x != y" => Ok(vec![TokenKind::Operator(Op::Not), TokenKind::Identifier, TokenKind::Operator(Op::NotEq), TokenKind::Identifier, TokenKind::EndOfInput]) ; "bang and not equal")]
    #[test_case("true || false" => Ok(vec![TokenKind::Boolean(true), TokenKind::Operator(Op::Or), TokenKind::Boolean(false), TokenKind::EndOfInput]) ; "booleans")]
    #[test_case("pow(x, 2)" => Ok(vec![TokenKind::Identifier, TokenKind::LeftParen, TokenKind::Identifier, TokenKind::Comma, TokenKind::Number(2.0), TokenKind::RightParen, TokenKind::EndOfInput]) ; "function call")]
    #[test_case("'it\\'s'" => Ok(vec![TokenKind::StringLiteral("it's".into()), TokenKind::EndOfInput]) ; "escaped quote")]
    #[test_case("" => Ok(vec![TokenKind::EndOfInput]) ; "empty input")]
    fn lex(input: &str) -> Result<Vec<TokenKind>, Error> {
        kinds(input)
    }

    #[test_case("12" => 12.0 ; "integer")]
    #[test_case("1.5" => 1.5 ; "decimal")]
    #[test_case(".5" => 0.5 ; "leading dot")]
    #[test_case("3." => 3.0 ; "trailing dot")]
    #[test_case("1e3" => 1000.0 ; "exponent")]
    #[test_case("2.5E-3" => 0.0025 ; "negative exponent")]
    #[test_case("4e+2" => 400.0 ; "positive exponent")]
    fn numbers(input: &str) -> f64 {
        match tokenize(input).unwrap()[0].kind {
            TokenKind::Number(value) => value,
            ref other => panic!("expected a number, got {:?}", other),
        }
    }

    #[test_case("1e" => Some(0) ; "missing exponent")]
    #[test_case("1.2.3" => Some(0) ; "two dots")]
    #[test_case("3eff" => Some(0) ; "letters after number")]
    #[test_case("x + 'abc" => Some(4) ; "unterminated string")]
    #[test_case("2 # 3" => Some(2) ; "unknown character")]
    #[test_case("a = b" => Some(2) ; "single equal")]
    #[test_case("a & b" => Some(2) ; "single ampersand")]
    #[test_case("a | b" => Some(2) ; "single pipe")]
    #[test_case(". + 1" => Some(0) ; "lone dot")]
    #[test_case("'\\q'" => Some(1) ; "unknown escape")]
    fn errors(input: &str) -> Option<usize> {
        tokenize(input).unwrap_err().position()
    }

    #[test]
    fn positions() {
        let tokens = tokenize("  ab +\t3.5").unwrap();
        let positions: Vec<usize> = tokens.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![2, 5, 7, 10]);
        assert_eq!(tokens[0].lexeme, "ab");
        assert_eq!(tokens[2].lexeme, "3.5");
    }

    #[test]
    fn lazy_and_fused() {
        let mut lexer = Lexer::new("1 $ 2");
        assert!(matches!(lexer.next(), Some(Ok(_))));
        assert!(matches!(lexer.next(), Some(Err(_))));
        assert!(lexer.next().is_none());

        let mut lexer = Lexer::new("x");
        assert!(matches!(lexer.next(), Some(Ok(_))));
        assert_eq!(lexer.next().unwrap().unwrap().kind, TokenKind::EndOfInput);
        assert!(lexer.next().is_none());
    }

    #[test]
    fn idents() {
        let starts = ['c', 'Z', '_', 'f'];
        for c in &starts {
            assert!(is_identifier_start(*c));
        }

        let non_starts = ['3', 'à', '@', ']', '[', '.'];
        for c in &non_starts {
            assert!(!is_identifier_start(*c));
        }

        let identifiers = ["_______", "abc", "a__45__bc", "log10"];
        for v in &identifiers {
            assert!(is_identifier(v));
        }

        let non_identifiers = ["a-bc", "@bc", "6bc", "ab.c", "", "é"];
        for nv in &non_identifiers {
            assert!(!is_identifier(nv));
        }
    }
}
