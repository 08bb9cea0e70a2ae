#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(
    clippy::needless_return,
    clippy::missing_docs_in_private_items,
    clippy::non_ascii_literal,
    clippy::module_name_repetitions
)]

//! mathparse, a crate for run-time evaluation of mathematical expressions,
//! with a registry of functions that can grow while expressions are in use.
//!
//! The easiest way to use this crate is with the [`eval`](fn.eval.html)
//! function:
//!
//! ```
//! assert_eq!(mathparse::eval("3 + 5 * 2", &()), Ok(13.0));
//! ```
//!
//! The second argument to `eval` is a [`Context`](trait.Context.html), such
//! as a `HashMap`, that defines variables:
//!
//! ```
//! use std::collections::HashMap;
//!
//! let mut context: HashMap<String, f64> = HashMap::new();
//! context.insert("a".into(), 3.5);
//! assert_eq!(mathparse::eval("2 * a", &context), Ok(7.0));
//! ```
//!
//! Most of the time, expressions are compiled once with a
//! [`Parser`](struct.Parser.html), and the resulting
//! [`Expr`](struct.Expr.html) is evaluated many times:
//!
//! ```
//! use std::collections::HashMap;
//! use mathparse::{Function, Parser};
//!
//! let parser = Parser::new();
//! let expr = parser.parse("pow(c, 2) + double(b)").unwrap();
//!
//! let mut context: HashMap<&str, f64> = HashMap::new();
//! context.insert("c", 3.0);
//! context.insert("b", 5.0);
//! // `double` is not known yet
//! assert!(expr.eval(&context).is_err());
//!
//! // functions are resolved at each evaluation, so adding one makes it
//! // visible to already compiled expressions
//! parser.add_function("double", "double(x)", Function::unary(|x| 2.0 * x));
//! assert_eq!(expr.eval(&context), Ok(19.0));
//!
//! context.insert("b", 10.0);
//! assert_eq!(expr.eval(&context), Ok(29.0));
//! ```
//!
//! # Language definition
//!
//! The language implemented by mathparse can contain the following elements:
//!
//! - float literal values: `12`, `0.45`, `.5`, `4.5e78`, `1E-3`, ...;
//! - boolean literals `true` and `false`, and string literals in single or
//!   double quotes (`'abc'`, `"it's"`), with `\\`, `\'`, `\"`, `\n` and
//!   `\t` escapes;
//! - left and right parenthesis;
//! - arithmetic operators: `+`, `-`, `*`, `/`, `%` (remainder) and `^`
//!   (exponentiation, `f64::powf`). `+` also concatenates strings;
//! - comparison operators: `==`, `!=`, `<`, `<=`, `>`, `>=`;
//! - logical operators: `&&`, `||`, `!`, and the conditional `c ? a : b`;
//! - variables. Variables names are ASCII only, start by a letter or `_`,
//!   and contain letters, digits or `_`.
//! - function call: `sin(a)`, `pow(2, x)`. The following functions are
//!   builtin, with the same meaning as the corresponding `f64` method:
//!   `sin`, `asin`, `sinh`, `asinh`, `cos`, `acos`, `cosh`, `acosh`, `tan`,
//!   `atan`, `tanh`, `atanh`, `exp`, `sqrt`, `log` (`f64::ln`), `log10` and
//!   `pow` (`f64::powf`).
//!
//! Any other symbol is forbidden in the input.
//!
//! From loosest to tightest, the operators bind as: `?:`, `||`, `&&`,
//! equality, comparison, `+ -`, `* / %`, `^`, then prefix `-` and `!`. `^`
//! and `?:` are right associative, all the others are left associative. So
//! `2 ^ 3 ^ 2` is `512`, and `-2 ^ 2` is `(-2) ^ 2`, which is `4`.
//!
//! Numbers keep their floating point properties: `1 / 0` is an infinity,
//! `0 / 0`, `5 % 0` and `asin(2)` are `NaN`. None of these are errors.
//! Errors are reserved for invalid syntax, unknown variables or functions,
//! wrong argument counts, and operands of the wrong type.
//!
//! # Technical details
//!
//! mathparse is based on an AST interpreter, and uses Pratt parsing. It
//! does not optimize the expressions. Function calls keep the name of the
//! function only, and look it up in the registry of the parser at each
//! evaluation.

#[macro_use]
extern crate lazy_static;

mod ast;
mod compiler;
mod error;
mod eval;
mod expr;
mod functions;
mod lexer;
mod parser;
mod token;
mod value;

pub use ast::{Ast, BinaryOp, UnaryOp};
pub use compiler::compile;
pub use error::Error;
pub use eval::evaluate;
pub use expr::Expr;
pub use functions::{Arity, Callable, Function, Registry, BUILTINS};
pub use lexer::{is_identifier, tokenize, Lexer};
pub use parser::{eval, Options, Parser};
pub use token::{Op, Token, TokenKind};
pub use value::{Context, Value};
