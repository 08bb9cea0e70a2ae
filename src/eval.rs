use crate::ast::{Ast, BinaryOp, UnaryOp};
use crate::error::Error;
use crate::functions::Registry;
use crate::value::{Context, Value};
use log::trace;
use std::cmp::Ordering;

/// Evaluate `ast`, taking variables from `context` and functions from
/// `functions`.
///
/// Arithmetic follows IEEE-754: dividing by zero gives an infinity or `NaN`,
/// and math functions called outside of their domain return `NaN`, without
/// any error.
///
/// # Examples
///
/// ```
/// # use mathparse::{compile, evaluate, Options, Registry, Value};
/// # use std::collections::HashMap;
/// let ast = compile("x > 1 && sqrt(x) < 2", &Options::default()).unwrap();
/// let mut context: HashMap<&str, f64> = HashMap::new();
/// context.insert("x", 3.0);
/// let result = evaluate(&ast, &context, &Registry::with_builtins());
/// assert_eq!(result, Ok(Value::Bool(true)));
/// ```
pub fn evaluate<C>(ast: &Ast, context: &C, functions: &Registry) -> Result<Value, Error>
where
    C: Context + ?Sized,
{
    Evaluator { context, functions }.eval(ast)
}

struct Evaluator<'a, C: ?Sized> {
    context: &'a C,
    functions: &'a Registry,
}

impl<C: Context + ?Sized> Evaluator<'_, C> {
    fn eval(&self, ast: &Ast) -> Result<Value, Error> {
        match *ast {
            Ast::Literal(ref value) => Ok(value.clone()),
            Ast::Variable(ref name) => self
                .context
                .lookup(name)
                .ok_or_else(|| Error::NameError(name.clone())),
            Ast::Unary { op, ref operand } => unary(op, self.eval(operand)?),
            Ast::Binary {
                op: BinaryOp::And,
                ref left,
                ref right,
            } => {
                if self.boolean(left, "&&")? {
                    self.boolean(right, "&&").map(Value::Bool)
                } else {
                    Ok(Value::Bool(false))
                }
            }
            Ast::Binary {
                op: BinaryOp::Or,
                ref left,
                ref right,
            } => {
                if self.boolean(left, "||")? {
                    Ok(Value::Bool(true))
                } else {
                    self.boolean(right, "||").map(Value::Bool)
                }
            }
            Ast::Binary {
                op,
                ref left,
                ref right,
            } => binary(op, self.eval(left)?, self.eval(right)?),
            Ast::Call { ref name, ref args } => self.call(name, args).map(Value::Number),
            Ast::Conditional {
                ref condition,
                ref then,
                ref otherwise,
            } => {
                if self.boolean(condition, "?")? {
                    self.eval(then)
                } else {
                    self.eval(otherwise)
                }
            }
        }
    }

    /// Evaluate an operand which must be a boolean
    fn boolean(&self, ast: &Ast, operator: &str) -> Result<bool, Error> {
        match self.eval(ast)? {
            Value::Bool(value) => Ok(value),
            other => Err(Error::TypeError(format!(
                "operand of '{}' must be a bool, got {} {}",
                operator,
                other.type_name(),
                other
            ))),
        }
    }

    fn call(&self, name: &str, args: &[Ast]) -> Result<f64, Error> {
        // the registry lock is only held for the lookup, so the function
        // can itself use the registry
        let function = self
            .functions
            .get(name)
            .ok_or_else(|| Error::UnknownFunction(name.to_owned()))?;

        if !function.arity().accepts(args.len()) {
            return Err(Error::ArityError {
                function: name.to_owned(),
                expected: function.arity(),
                found: args.len(),
            });
        }

        let mut values = Vec::with_capacity(args.len());
        for (i, arg) in args.iter().enumerate() {
            match self.eval(arg)? {
                Value::Number(value) => values.push(value),
                other => {
                    return Err(Error::TypeError(format!(
                        "argument {} of {}() must be a number, got {}",
                        i + 1,
                        name,
                        other.type_name()
                    )));
                }
            }
        }

        trace!("calling {}{:?}", name, values);
        function
            .call(&values)
            .map_err(|message| Error::FunctionError {
                function: name.to_owned(),
                message,
            })
    }
}

fn unary(op: UnaryOp, operand: Value) -> Result<Value, Error> {
    match (op, operand) {
        (UnaryOp::Neg, Value::Number(value)) => Ok(Value::Number(-value)),
        (UnaryOp::Not, Value::Bool(value)) => Ok(Value::Bool(!value)),
        (UnaryOp::Neg, other) => Err(Error::TypeError(format!(
            "can not negate a {}",
            other.type_name()
        ))),
        (UnaryOp::Not, other) => Err(Error::TypeError(format!(
            "operand of '!' must be a bool, got {}",
            other.type_name()
        ))),
    }
}

fn binary(op: BinaryOp, left: Value, right: Value) -> Result<Value, Error> {
    let result = match op {
        BinaryOp::Eq => Value::Bool(left == right),
        BinaryOp::NotEq => Value::Bool(left != right),
        BinaryOp::Less | BinaryOp::LessEq | BinaryOp::Greater | BinaryOp::GreaterEq => {
            let ordering = match (&left, &right) {
                (Value::Number(l), Value::Number(r)) => l.partial_cmp(r),
                (Value::Str(l), Value::Str(r)) => Some(l.cmp(r)),
                _ => return Err(mismatch(op, &left, &right)),
            };
            // comparisons with NaN are always false
            let holds = ordering.map_or(false, |ordering| match op {
                BinaryOp::Less => ordering == Ordering::Less,
                BinaryOp::LessEq => ordering != Ordering::Greater,
                BinaryOp::Greater => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            });
            Value::Bool(holds)
        }
        BinaryOp::Add => match (left, right) {
            (Value::Number(l), Value::Number(r)) => Value::Number(l + r),
            (left @ Value::Str(_), right) | (left, right @ Value::Str(_)) => {
                Value::Str(format!("{}{}", left, right))
            }
            (left, right) => return Err(mismatch(op, &left, &right)),
        },
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod | BinaryOp::Exp => {
            let (l, r) = match (&left, &right) {
                (&Value::Number(l), &Value::Number(r)) => (l, r),
                _ => return Err(mismatch(op, &left, &right)),
            };
            Value::Number(match op {
                BinaryOp::Sub => l - r,
                BinaryOp::Mul => l * r,
                BinaryOp::Div => l / r,
                BinaryOp::Mod => l % r,
                _ => l.powf(r),
            })
        }
        // short circuited by the evaluator
        BinaryOp::And | BinaryOp::Or => match (left, right) {
            (Value::Bool(l), Value::Bool(r)) => {
                Value::Bool(if op == BinaryOp::And { l && r } else { l || r })
            }
            (left, right) => return Err(mismatch(op, &left, &right)),
        },
    };
    Ok(result)
}

fn mismatch(op: BinaryOp, left: &Value, right: &Value) -> Error {
    Error::TypeError(format!(
        "unsupported operand types for '{}': {} and {}",
        op.symbol(),
        left.type_name(),
        right.type_name()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::functions::{Arity, Function};
    use crate::parser::Options;
    use std::cell::Cell;
    use std::collections::HashMap;

    fn eval_with<C: Context>(input: &str, context: &C) -> Result<Value, Error> {
        let ast = compile(input, &Options::default()).unwrap();
        evaluate(&ast, context, &Registry::with_builtins())
    }

    fn eval(input: &str) -> Result<Value, Error> {
        eval_with(input, &())
    }

    fn number(input: &str) -> f64 {
        eval(input).unwrap().as_number().unwrap()
    }

    #[test]
    fn arithmetic() {
        let eval_pairs = [
            ("3 + 5", 8.0),
            ("2 - 5", -3.0),
            ("2 * 5", 10.0),
            ("10 / 5", 2.0),
            ("7 % 4", 3.0),
            ("-7 % 4", -3.0),
            ("2 ^ 3", 8.0),
            ("-3", -3.0),
            ("25 - -3", 28.0),
            ("2 + 3 * 4", 14.0),
            ("(2 + 3) * 4", 20.0),
            ("2 ^ 3 ^ 2", 512.0),
            ("-2 ^ 2", 4.0),
            ("-(2 ^ 2)", -4.0),
            ("2 ^ -1", 0.5),
            ("sqrt(9)", 3.0),
            ("pow(2, 10)", 1024.0),
            ("sin(18.0) * 3", 3.0 * f64::sin(18.0)),
            ("true ? 1 : 2", 1.0),
            ("1 > 2 ? 1 : 2", 2.0),
        ];
        for (input, expected) in &eval_pairs {
            assert_eq!(number(input), *expected, "{}", input);
        }
    }

    #[test]
    fn ieee_semantics() {
        assert_eq!(number("1 / 0"), f64::INFINITY);
        assert_eq!(number("-1 / 0"), f64::NEG_INFINITY);
        assert!(number("0 / 0").is_nan());
        assert!(number("5 % 0").is_nan());
        assert!(number("asin(2)").is_nan());
        assert!(number("log(-1)").is_nan());
        assert!(number("sqrt(-1)").is_nan());
        assert_eq!(number("log(0)"), f64::NEG_INFINITY);
    }

    #[test]
    fn comparisons() {
        let eval_pairs = [
            ("1 < 2", true),
            ("2 <= 2", true),
            ("3 > 4", false),
            ("4 >= 4", true),
            ("1 == 1", true),
            ("1 != 1", false),
            ("'abc' < 'abd'", true),
            ("'b' >= 'a'", true),
            ("'a' == 'a'", true),
            ("1 == 'a'", false),
            ("true != 1", true),
            ("0 / 0 == 0 / 0", false),
            ("0 / 0 < 1", false),
            ("0 / 0 >= 1", false),
            ("true && !false", true),
            ("false || 1 < 2", true),
            ("!(1 < 2)", false),
        ];
        for (input, expected) in &eval_pairs {
            assert_eq!(eval(input), Ok(Value::Bool(*expected)), "{}", input);
        }
    }

    #[test]
    fn strings() {
        assert_eq!(eval("'ab' + 'cd'"), Ok(Value::Str("abcd".into())));
        assert_eq!(eval("'n=' + 3"), Ok(Value::Str("n=3".into())));
        assert_eq!(eval("1.5 + 'x'"), Ok(Value::Str("1.5x".into())));
    }

    #[test]
    fn variables() {
        let mut context: HashMap<String, Value> = HashMap::new();
        context.insert("a".into(), Value::Number(1.0));
        context.insert("b".into(), Value::Number(2.0));
        context.insert("name".into(), Value::from("alice"));
        context.insert("flag".into(), Value::Bool(true));

        assert_eq!(eval_with("(a + b)^2", &context), Ok(Value::Number(9.0)));
        assert_eq!(
            eval_with("flag && name == 'alice' ? a : b", &context),
            Ok(Value::Number(1.0))
        );
        assert_eq!(
            eval_with("2 * z", &context),
            Err(Error::NameError("z".into()))
        );
        assert_eq!(
            eval_with("sin(z)", &context),
            Err(Error::NameError("z".into()))
        );
    }

    #[test]
    fn short_circuit() {
        // the right hand side is never looked at, so the missing variable is
        // not an error
        assert_eq!(eval("false && missing"), Ok(Value::Bool(false)));
        assert_eq!(eval("true || missing"), Ok(Value::Bool(true)));
        assert_eq!(eval("true ? 1 : missing"), Ok(Value::Number(1.0)));
        assert_eq!(eval("true && missing"), Err(Error::NameError("missing".into())));
    }

    #[test]
    fn type_errors() {
        let inputs = [
            "-true",
            "!1",
            "1 && true",
            "false || 0",
            "'a' - 1",
            "true * 2",
            "true + 1",
            "'a' < 1",
            "1 ? 2 : 3",
            "sin('x')",
            "pow(2, true)",
        ];
        for input in &inputs {
            match eval(input) {
                Err(Error::TypeError(_)) => {}
                other => panic!("{}: expected a TypeError, got {:?}", input, other),
            }
        }
    }

    #[test]
    fn calls() {
        assert_eq!(eval("foo(1)"), Err(Error::UnknownFunction("foo".into())));
        assert_eq!(
            eval("pow(2)"),
            Err(Error::ArityError {
                function: "pow".into(),
                expected: Arity::Exact(2),
                found: 1,
            })
        );
        assert_eq!(
            eval("sin()"),
            Err(Error::ArityError {
                function: "sin".into(),
                expected: Arity::Exact(1),
                found: 0,
            })
        );
    }

    #[test]
    fn registered_functions() {
        let registry = Registry::empty();
        registry.register(
            "checked_div",
            "checked_div(a, b)",
            Function::binary(|a, b| a / b),
        );
        registry.register(
            "fail",
            "fail(x)",
            Function::new(Arity::Exact(1), |args| Err(format!("bad input {}", args[0]))),
        );
        registry.register(
            "sum",
            "sum(...)",
            Function::variadic(|args| Ok(args.iter().sum())),
        );

        let run = |input: &str| {
            let ast = compile(input, &Options::default()).unwrap();
            evaluate(&ast, &(), &registry)
        };
        assert_eq!(run("checked_div(1, 4)"), Ok(Value::Number(0.25)));
        assert_eq!(run("sum()"), Ok(Value::Number(0.0)));
        assert_eq!(run("sum(1, 2, 3, 4)"), Ok(Value::Number(10.0)));
        assert_eq!(
            run("fail(2)"),
            Err(Error::FunctionError {
                function: "fail".into(),
                message: "bad input 2".into(),
            })
        );
        assert_eq!(run("sin(1)"), Err(Error::UnknownFunction("sin".into())));
    }

    #[test]
    fn arguments_left_to_right() {
        let registry = Registry::empty();
        registry.register("id", "id(x)", Function::unary(|x| x));
        let ast = compile("id(a) + id(b)", &Options::default()).unwrap();

        struct Recording(Cell<u32>);
        impl Context for Recording {
            fn lookup(&self, name: &str) -> Option<Value> {
                let step = self.0.get();
                self.0.set(step + 1);
                let expected = if step == 0 { "a" } else { "b" };
                assert_eq!(name, expected);
                Some(Value::Number(f64::from(step)))
            }
        }

        let context = Recording(Cell::new(0));
        assert_eq!(evaluate(&ast, &context, &registry), Ok(Value::Number(1.0)));
        assert_eq!(context.0.get(), 2);
    }

    #[test]
    fn function_can_use_registry() {
        let registry = Registry::empty();
        let inner = registry.clone();
        registry.register(
            "define",
            "define()",
            Function::new(Arity::Exact(0), move |_| {
                let late = Function::new(Arity::Exact(0), |_| Ok(7.0));
                inner.register("late", "late()", late);
                Ok(0.0)
            }),
        );
        let ast = compile("define() + late()", &Options::default()).unwrap();
        assert_eq!(evaluate(&ast, &(), &registry), Ok(Value::Number(7.0)));
    }
}
