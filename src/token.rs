/// Possible kinds of token to find in the input string
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// A numeric literal, already converted
    Number(f64),
    /// A variable or function name
    Identifier,
    /// Any operator, including the `?` and `:` of conditionals
    Operator(Op),
    /// Left parenthesis
    LeftParen,
    /// Right parenthesis
    RightParen,
    /// Argument separator
    Comma,
    /// A quoted string, with escapes resolved
    StringLiteral(String),
    /// `true` or `false`
    Boolean(bool),
    /// Emitted once, after the last real token
    EndOfInput,
}

/// A single lexical token, with its source text and byte offset
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// What was recognized
    pub kind: TokenKind,
    /// The raw text of the token, as it appears in the input
    pub lexeme: String,
    /// Byte offset of the first character of the token
    pub position: usize,
}

impl Token {
    pub(crate) fn new(kind: TokenKind, lexeme: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            position,
        }
    }

    /// Human readable description, used in error messages
    pub(crate) fn describe(&self) -> String {
        match self.kind {
            TokenKind::EndOfInput => "end of input".into(),
            _ => format!("'{}'", self.lexeme),
        }
    }
}

/// Allowed operators in the language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Plus,
    Minus,
    Mul,
    Div,
    Mod,
    Exp,
    Eq,
    NotEq,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    And,
    Or,
    Not,
    Question,
    Colon,
}

impl Op {
    /// Get the infix operator precedence. Operators with higher precedence
    /// should be evaluated first. `None` for operators that never appear in
    /// infix position.
    ///
    /// Prefix `-` and `!` bind tighter than all of these, so `-2 ^ 2` is
    /// `(-2) ^ 2`.
    pub fn precedence(self) -> Option<u8> {
        let precedence = match self {
            Self::Question => 1,
            Self::Or => 2,
            Self::And => 3,
            Self::Eq | Self::NotEq => 4,
            Self::Less | Self::LessEq | Self::Greater | Self::GreaterEq => 5,
            Self::Plus | Self::Minus => 6,
            Self::Mul | Self::Div | Self::Mod => 7,
            Self::Exp => 8,
            Self::Not | Self::Colon => return None,
        };
        Some(precedence)
    }

    /// Check if the operator is left associative
    pub fn is_left_associative(self) -> bool {
        !self.is_right_associative()
    }

    /// Check if the operator is right associative
    pub fn is_right_associative(self) -> bool {
        matches!(self, Self::Exp | Self::Question)
    }

    /// The source text of the operator
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Exp => "^",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Less => "<",
            Self::LessEq => "<=",
            Self::Greater => ">",
            Self::GreaterEq => ">=",
            Self::And => "&&",
            Self::Or => "||",
            Self::Not => "!",
            Self::Question => "?",
            Self::Colon => ":",
        }
    }
}
