use crate::ast::{Ast, BinaryOp, UnaryOp};
use crate::error::Error;
use crate::lexer::Lexer;
use crate::parser::Options;
use crate::token::{Op, Token, TokenKind};
use crate::value::Value;
use log::debug;
use std::mem;

/// An AST together with its depth
type Parsed = (Ast, usize);

/// Compile `input` into an AST, using Pratt parsing.
///
/// Function names are not checked here: a call to an unknown function is a
/// valid expression, and only fails when evaluated.
///
/// # Examples
///
/// ```
/// # use mathparse::{compile, Options};
/// let ast = compile("2 ^ 3 ^ 2", &Options::default()).unwrap();
/// assert_eq!(ast.to_string(), "(2.0 ^ (3.0 ^ 2.0))");
///
/// let error = compile("(1 + 2", &Options::default()).unwrap_err();
/// assert_eq!(error.position(), Some(0));
/// ```
pub fn compile(input: &str, options: &Options) -> Result<Ast, Error> {
    debug!("compiling expression: {}", input);
    let mut compiler = Compiler::new(input, options)?;
    if compiler.current.kind == TokenKind::EndOfInput {
        return Err(Error::parse("empty expression", compiler.current.position));
    }

    let (ast, depth) = compiler.expression(0)?;
    match compiler.current.kind {
        TokenKind::EndOfInput => {}
        TokenKind::RightParen => {
            return Err(Error::parse("unmatched ')'", compiler.current.position));
        }
        _ => {
            return Err(Error::parse(
                format!("unexpected {} after expression", compiler.current.describe()),
                compiler.current.position,
            ));
        }
    }
    debug!("compiled expression of depth {}: {}", depth, ast);
    Ok(ast)
}

struct Compiler<'a> {
    lexer: Lexer<'a>,
    /// The next token to consume
    current: Token,
    end: usize,
    max_depth: usize,
    max_tree_depth: usize,
    /// Current recursion level of `expression`
    nesting: usize,
}

impl<'a> Compiler<'a> {
    fn new(input: &'a str, options: &Options) -> Result<Self, Error> {
        let mut lexer = Lexer::new(input);
        let end = input.len();
        let current = match lexer.next() {
            Some(token) => token?,
            None => Token::new(TokenKind::EndOfInput, "", end),
        };
        Ok(Compiler {
            lexer,
            current,
            end,
            max_depth: options.max_depth,
            max_tree_depth: options.max_tree_depth,
            nesting: 0,
        })
    }

    /// Consume the current token and return it
    fn bump(&mut self) -> Result<Token, Error> {
        let next = match self.lexer.next() {
            Some(token) => token?,
            None => Token::new(TokenKind::EndOfInput, "", self.end),
        };
        Ok(mem::replace(&mut self.current, next))
    }

    fn too_deep(&self, position: usize) -> Error {
        Error::parse(
            format!("expression is nested too deeply (limit is {})", self.max_depth),
            position,
        )
    }

    /// Check the depth of a freshly built node
    fn check_depth(&self, depth: usize, position: usize) -> Result<usize, Error> {
        if depth > self.max_tree_depth {
            Err(Error::parse(
                format!("expression tree is too deep (limit is {})", self.max_tree_depth),
                position,
            ))
        } else {
            Ok(depth)
        }
    }

    /// Parse the operand of a prefix operator. Prefix operators bind tighter
    /// than any infix operator, so the operand is a single primary.
    fn operand(&mut self, position: usize) -> Result<Parsed, Error> {
        self.nesting += 1;
        if self.nesting > self.max_depth {
            return Err(self.too_deep(position));
        }
        let parsed = self.prefix();
        self.nesting -= 1;
        parsed
    }

    /// Parse an expression whose infix operators all have a precedence of
    /// at least `min_precedence`
    fn expression(&mut self, min_precedence: u8) -> Result<Parsed, Error> {
        self.nesting += 1;
        if self.nesting > self.max_depth {
            return Err(self.too_deep(self.current.position));
        }
        let parsed = self.infix(min_precedence);
        self.nesting -= 1;
        parsed
    }

    fn infix(&mut self, min_precedence: u8) -> Result<Parsed, Error> {
        let (mut left, mut depth) = self.prefix()?;

        while let TokenKind::Operator(op) = self.current.kind {
            let precedence = match op.precedence() {
                Some(precedence) if precedence >= min_precedence => precedence,
                _ => break,
            };
            let operator = self.bump()?;
            let next_precedence = if op.is_right_associative() {
                precedence
            } else {
                precedence + 1
            };

            if op == Op::Question {
                let (then, then_depth) = self.expression(0)?;
                if self.current.kind != TokenKind::Operator(Op::Colon) {
                    return Err(Error::parse(
                        format!(
                            "expected ':' for the '?' at position {}, found {}",
                            operator.position,
                            self.current.describe()
                        ),
                        self.current.position,
                    ));
                }
                self.bump()?;
                let (otherwise, otherwise_depth) = self.expression(next_precedence)?;
                depth = self.check_depth(
                    1 + depth.max(then_depth).max(otherwise_depth),
                    operator.position,
                )?;
                left = Ast::Conditional {
                    condition: Box::new(left),
                    then: Box::new(then),
                    otherwise: Box::new(otherwise),
                };
                continue;
            }

            let binary = BinaryOp::from_op(op).ok_or_else(|| {
                Error::parse(
                    format!("unexpected '{}'", operator.lexeme),
                    operator.position,
                )
            })?;
            let (right, right_depth) = self.expression(next_precedence)?;
            depth = self.check_depth(1 + depth.max(right_depth), operator.position)?;
            left = Ast::Binary {
                op: binary,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok((left, depth))
    }

    fn prefix(&mut self) -> Result<Parsed, Error> {
        let token = self.bump()?;
        let literal = match token.kind {
            TokenKind::Number(value) => Value::Number(value),
            TokenKind::Boolean(value) => Value::Bool(value),
            TokenKind::StringLiteral(ref value) => Value::Str(value.clone()),
            TokenKind::Identifier => {
                if self.current.kind == TokenKind::LeftParen {
                    return self.call(token);
                }
                return Ok((Ast::Variable(token.lexeme), 1));
            }
            TokenKind::Operator(Op::Minus) => return self.unary(UnaryOp::Neg, &token),
            TokenKind::Operator(Op::Not) => return self.unary(UnaryOp::Not, &token),
            // unary plus does nothing
            TokenKind::Operator(Op::Plus) => return self.operand(token.position),
            TokenKind::LeftParen => {
                let inner = self.expression(0)?;
                if self.current.kind != TokenKind::RightParen {
                    return Err(self.unclosed(&token));
                }
                self.bump()?;
                return Ok(inner);
            }
            TokenKind::EndOfInput => {
                return Err(Error::parse("unexpected end of input", token.position));
            }
            _ => {
                return Err(Error::parse(
                    format!("unexpected {}", token.describe()),
                    token.position,
                ));
            }
        };
        Ok((Ast::Literal(literal), 1))
    }

    fn unary(&mut self, op: UnaryOp, token: &Token) -> Result<Parsed, Error> {
        let (operand, depth) = self.operand(token.position)?;
        let depth = self.check_depth(depth + 1, token.position)?;
        let ast = Ast::Unary {
            op,
            operand: Box::new(operand),
        };
        Ok((ast, depth))
    }

    /// Error for a `(` without its `)`, reported at the `(`. Any other
    /// unexpected token is reported where it stands.
    fn unclosed(&self, open: &Token) -> Error {
        if self.current.kind == TokenKind::EndOfInput {
            Error::parse("unmatched '('", open.position)
        } else {
            Error::parse(
                format!("expected ')', found {}", self.current.describe()),
                self.current.position,
            )
        }
    }

    /// Parse the arguments of a call to `name`. The current token is the
    /// opening parenthesis.
    fn call(&mut self, name: Token) -> Result<Parsed, Error> {
        let open = self.bump()?;
        let mut args = Vec::new();
        let mut depth = 0;

        if self.current.kind != TokenKind::RightParen {
            loop {
                let (arg, arg_depth) = self.expression(0)?;
                args.push(arg);
                depth = depth.max(arg_depth);
                match self.current.kind {
                    TokenKind::Comma => {
                        let comma = self.bump()?;
                        if self.current.kind == TokenKind::RightParen {
                            return Err(Error::parse(
                                format!("trailing comma in call to '{}'", name.lexeme),
                                comma.position,
                            ));
                        }
                    }
                    TokenKind::RightParen => break,
                    _ => return Err(self.unclosed(&open)),
                }
            }
        }
        self.bump()?;

        let depth = self.check_depth(depth + 1, name.position)?;
        let ast = Ast::Call {
            name: name.lexeme,
            args,
        };
        Ok((ast, depth))
    }
}
