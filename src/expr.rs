use crate::ast::Ast;
use crate::error::Error;
use crate::eval::evaluate;
use crate::functions::Registry;
use crate::value::{Context, Value};
use std::collections::HashSet;
use std::sync::Arc;

/// A compiled mathematical expression.
///
/// An `Expr` is created by [`Parser::parse`](struct.Parser.html#method.parse)
/// and can be evaluated any number of times, from any number of threads, with
/// different variables. It keeps a handle on the registry of its parser, and
/// looks its functions up again at each evaluation: functions added to the
/// parser after the compilation are visible to the expression.
///
/// # Examples
/// ```
/// # use mathparse::Parser;
/// # use std::collections::HashMap;
/// let parser = Parser::new();
/// let expr = parser.parse("3 + 5 * 2").unwrap();
/// assert_eq!(expr.eval(&HashMap::<String, f64>::new()), Ok(13.0));
///
/// let mut context: HashMap<String, f64> = HashMap::new();
/// context.insert("a".into(), 42.0);
/// let expr = parser.parse("-2 * a").unwrap();
/// assert_eq!(expr.eval(&context), Ok(-84.0));
/// ```
#[derive(Debug, Clone)]
pub struct Expr {
    source: Arc<str>,
    ast: Arc<Ast>,
    functions: Registry,
}

impl Expr {
    pub(crate) fn new(source: &str, ast: Ast, functions: Registry) -> Self {
        Self {
            source: source.into(),
            ast: Arc::new(ast),
            functions,
        }
    }

    /// Evaluate the expression in the given `context`.
    ///
    /// The result must be a number: an expression like `1 < 2` gives a
    /// `TypeError` here, use [`eval_value`](#method.eval_value) to get
    /// booleans or strings.
    ///
    /// # Examples
    ///
    /// ```
    /// # use mathparse::Parser;
    /// # use std::collections::HashMap;
    /// let expr = Parser::new().parse("3 + a").unwrap();
    ///
    /// let mut context: HashMap<String, f64> = HashMap::new();
    /// context.insert("a".into(), -5.0);
    /// assert_eq!(expr.eval(&context), Ok(-2.0));
    /// context.insert("a".into(), 2.0);
    /// assert_eq!(expr.eval(&context), Ok(5.0));
    /// ```
    pub fn eval<C: Context + ?Sized>(&self, context: &C) -> Result<f64, Error> {
        match self.eval_value(context)? {
            Value::Number(value) => Ok(value),
            other => Err(Error::TypeError(format!(
                "expression evaluated to a {} ({}), not a number",
                other.type_name(),
                other
            ))),
        }
    }

    /// Evaluate the expression in the given `context`, and get its value
    /// whatever its type.
    ///
    /// ```
    /// # use mathparse::{Parser, Value};
    /// let expr = Parser::new().parse("sqrt(16) > 3").unwrap();
    /// assert_eq!(expr.eval_value(&()), Ok(Value::Bool(true)));
    /// ```
    pub fn eval_value<C: Context + ?Sized>(&self, context: &C) -> Result<Value, Error> {
        evaluate(&self.ast, context, &self.functions)
    }

    /// Get the names of the variables this expression needs.
    ///
    /// # Examples
    /// ```
    /// # use mathparse::Parser;
    /// # use std::collections::HashSet;
    /// let parser = Parser::new();
    /// let expr = parser.parse("3 + 5 * 2").unwrap();
    /// assert_eq!(expr.variables(), HashSet::new());
    ///
    /// let expr = parser.parse("3 + a").unwrap();
    /// assert_eq!(expr.variables(), HashSet::from(["a"]));
    /// ```
    pub fn variables(&self) -> HashSet<&str> {
        self.ast.variables()
    }

    /// Get the compiled AST
    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    /// Get the text this expression was compiled from
    pub fn source(&self) -> &str {
        &self.source
    }
}
