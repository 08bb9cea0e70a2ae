use crate::compiler::compile;
use crate::error::Error;
use crate::expr::Expr;
use crate::functions::{Function, Registry};
use crate::value::Context;
use log::debug;

/// Limits applied while compiling expressions
///
/// ```
/// # use mathparse::{Options, Parser};
/// let sum = vec!["x"; 300].join(" + ");
/// assert!(Parser::new().parse(&sum).is_ok());
///
/// let strict = Parser::with_options(Options::default().max_tree_depth(100));
/// assert!(strict.parse(&sum).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    /// Maximal nesting of parenthesis, calls, prefix operators and right
    /// associative operators. This bounds the recursion of the compiler.
    pub max_depth: usize,
    /// Maximal depth of the compiled tree. Left associative chains like
    /// `a + b + c` grow the tree without nesting. Evaluation recurses
    /// through the tree, so this bounds its stack usage.
    pub max_tree_depth: usize,
}

impl Options {
    /// Set the maximal nesting depth
    #[must_use]
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the maximal depth of the compiled tree
    #[must_use]
    pub fn max_tree_depth(mut self, max_tree_depth: usize) -> Self {
        self.max_tree_depth = max_tree_depth;
        self
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            max_depth: 256,
            max_tree_depth: 1024,
        }
    }
}

/// Evaluate a single expression from `input`, with the builtin functions.
///
/// Returns `Ok(result)` if the evaluation is successful, or `Err(cause)` if
/// parsing or evaluating the expression failed.
///
/// # Example
///
/// ```
/// # use std::collections::HashMap;
/// # use mathparse::eval;
///
/// assert_eq!(eval("45 - 2^3", &()), Ok(37.0));
///
/// let mut context: HashMap<String, f64> = HashMap::new();
/// context.insert("a".into(), -5.0);
/// assert_eq!(eval("3 * a", &context), Ok(-15.0));
/// ```
pub fn eval<C: Context + ?Sized>(input: &str, context: &C) -> Result<f64, Error> {
    Parser::new().parse(input)?.eval(context)
}

/// Entry point of the crate: compiles expressions, and owns the functions
/// they can call.
///
/// A `Parser` can be shared between threads. Expressions can be compiled
/// and evaluated concurrently, while other threads add functions.
///
/// # Examples
///
/// ```
/// # use mathparse::{Function, Parser};
/// let parser = Parser::new();
/// assert_eq!(parser.get_function("sin"), "sin(x)");
/// assert_eq!(parser.get_function("cube"), "");
///
/// let expr = parser.parse("cube(3) - 1").unwrap();
/// assert!(expr.eval(&()).is_err());
///
/// parser.add_function("cube", "cube(x)", Function::unary(|x| x * x * x));
/// assert_eq!(parser.get_function("cube"), "cube(x)");
/// assert_eq!(expr.eval(&()), Ok(26.0));
/// ```
#[derive(Debug)]
pub struct Parser {
    functions: Registry,
    options: Options,
}

impl Parser {
    /// Create a new parser, knowing the builtin functions
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    /// Create a new parser, knowing the builtin functions, which will
    /// compile expressions within the limits of `options`
    #[must_use]
    pub fn with_options(options: Options) -> Self {
        Self {
            functions: Registry::with_builtins(),
            options,
        }
    }

    /// Add a function, or replace the function already registered with the
    /// same name. `signature` is only used for documentation.
    pub fn add_function(&self, name: &str, signature: &str, function: Function) {
        self.functions.register(name, signature, function);
    }

    /// Get the signature of the function `name`, or an empty string if
    /// there is no such function.
    #[must_use]
    pub fn get_function(&self, name: &str) -> String {
        self.functions.signature(name).unwrap_or_default()
    }

    /// Compile `expression` into a reusable [`Expr`].
    ///
    /// Calls to functions that are not registered yet are accepted, and
    /// resolved when the expression is evaluated.
    ///
    /// ```
    /// # use mathparse::Parser;
    /// // A valid expression
    /// assert!(Parser::new().parse("3 + 5 * 2").is_ok());
    /// // an invalid expression
    /// assert!(Parser::new().parse("3eff + 5 * 2").is_err());
    /// ```
    pub fn parse(&self, expression: &str) -> Result<Expr, Error> {
        let ast = compile(expression, &self.options)?;
        for name in ast.functions() {
            if !self.functions.contains(name) {
                debug!(
                    "function '{}' is not registered yet, it will be resolved at evaluation",
                    name
                );
            }
        }
        Ok(Expr::new(expression, ast, self.functions.clone()))
    }

    /// Get the function registry of this parser
    pub fn functions(&self) -> &Registry {
        &self.functions
    }

    /// Get the compilation options of this parser
    pub fn options(&self) -> Options {
        self.options
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}
