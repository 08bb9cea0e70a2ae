use crate::token::Op;
use crate::value::Value;
use std::collections::HashSet;
use std::fmt::{self, Display, Formatter, Write};

/// Prefix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-<operand>`
    Neg,
    /// `!<operand>`
    Not,
}

/// Infix operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// <left> + <right>
    Add,
    /// <left> - <right>
    Sub,
    /// <left> * <right>
    Mul,
    /// <left> / <right>
    Div,
    /// <left> % <right>
    Mod,
    /// <left> ^ <right>
    Exp,
    /// <left> == <right>
    Eq,
    /// <left> != <right>
    NotEq,
    /// <left> < <right>
    Less,
    /// <left> <= <right>
    LessEq,
    /// <left> > <right>
    Greater,
    /// <left> >= <right>
    GreaterEq,
    /// <left> && <right>
    And,
    /// <left> || <right>
    Or,
}

impl BinaryOp {
    /// Get the binary operator for an infix token, if there is one
    pub(crate) fn from_op(op: Op) -> Option<Self> {
        let binary = match op {
            Op::Plus => Self::Add,
            Op::Minus => Self::Sub,
            Op::Mul => Self::Mul,
            Op::Div => Self::Div,
            Op::Mod => Self::Mod,
            Op::Exp => Self::Exp,
            Op::Eq => Self::Eq,
            Op::NotEq => Self::NotEq,
            Op::Less => Self::Less,
            Op::LessEq => Self::LessEq,
            Op::Greater => Self::Greater,
            Op::GreaterEq => Self::GreaterEq,
            Op::And => Self::And,
            Op::Or => Self::Or,
            Op::Not | Op::Question | Op::Colon => return None,
        };
        Some(binary)
    }

    /// The source text of the operator
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
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
        }
    }
}

/// Ast nodes for the expressions
///
/// Function calls only store the name of the function: the function itself
/// is looked up in the registry each time the expression is evaluated.
#[derive(Debug, Clone, PartialEq)]
pub enum Ast {
    /// A constant value
    Literal(Value),
    /// A variable, to be resolved at evaluation time
    Variable(String),
    /// <op><operand>
    Unary {
        /// The operator
        op: UnaryOp,
        /// The operand
        operand: Box<Ast>,
    },
    /// <left> <op> <right>
    Binary {
        /// The operator
        op: BinaryOp,
        /// Left hand side
        left: Box<Ast>,
        /// Right hand side
        right: Box<Ast>,
    },
    /// name(<args>...)
    Call {
        /// Name of the called function
        name: String,
        /// Arguments, in call order
        args: Vec<Ast>,
    },
    /// <condition> ? <then> : <otherwise>
    Conditional {
        /// Must evaluate to a boolean
        condition: Box<Ast>,
        /// Value if the condition holds
        then: Box<Ast>,
        /// Value if it does not
        otherwise: Box<Ast>,
    },
}

impl Ast {
    /// Get the names of all the variables used in this AST
    pub fn variables(&self) -> HashSet<&str> {
        let mut variables = HashSet::new();
        self.visit(&mut |node| {
            if let Self::Variable(ref name) = *node {
                variables.insert(name.as_str());
            }
        });
        variables
    }

    /// Get the names of all the functions called in this AST
    pub fn functions(&self) -> HashSet<&str> {
        let mut functions = HashSet::new();
        self.visit(&mut |node| {
            if let Self::Call { ref name, .. } = *node {
                functions.insert(name.as_str());
            }
        });
        functions
    }

    /// Call `visitor` on this node and all its descendants, parents first
    fn visit<'a>(&'a self, visitor: &mut dyn FnMut(&'a Self)) {
        visitor(self);
        match *self {
            Self::Literal(_) | Self::Variable(_) => {}
            Self::Unary { ref operand, .. } => operand.visit(visitor),
            Self::Binary {
                ref left,
                ref right,
                ..
            } => {
                left.visit(visitor);
                right.visit(visitor);
            }
            Self::Call { ref args, .. } => {
                for arg in args {
                    arg.visit(visitor);
                }
            }
            Self::Conditional {
                ref condition,
                ref then,
                ref otherwise,
            } => {
                condition.visit(visitor);
                then.visit(visitor);
                otherwise.visit(visitor);
            }
        }
    }
}

/// Fully parenthesized form, which parses back to the same AST
impl Display for Ast {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        match *self {
            Self::Literal(Value::Number(value)) => write_number(fmt, value),
            Self::Literal(Value::Bool(value)) => write!(fmt, "{}", value),
            Self::Literal(Value::Str(ref value)) => write_string(fmt, value),
            Self::Variable(ref name) => write!(fmt, "{}", name),
            Self::Unary { op, ref operand } => {
                let symbol = match op {
                    UnaryOp::Neg => "-",
                    UnaryOp::Not => "!",
                };
                write!(fmt, "({}{})", symbol, operand)
            }
            Self::Binary {
                op,
                ref left,
                ref right,
            } => write!(fmt, "({} {} {})", left, op.symbol(), right),
            Self::Call { ref name, ref args } => {
                write!(fmt, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(fmt, ", ")?;
                    }
                    write!(fmt, "{}", arg)?;
                }
                write!(fmt, ")")
            }
            Self::Conditional {
                ref condition,
                ref then,
                ref otherwise,
            } => write!(fmt, "({} ? {} : {})", condition, then, otherwise),
        }
    }
}

/// Numbers are written so that the lexer reads them back. Literals from the
/// lexer are never negative or NaN, but an infinity comes from overflowing
/// literals like `1e400`.
fn write_number(fmt: &mut Formatter, value: f64) -> fmt::Result {
    if value.is_nan() {
        write!(fmt, "(0.0 / 0.0)")
    } else if value.is_infinite() {
        let sign = if value < 0.0 { "-" } else { "" };
        write!(fmt, "{}1e999", sign)
    } else {
        write!(fmt, "{:?}", value)
    }
}

/// Double quoted, with only the escapes the lexer understands
fn write_string(fmt: &mut Formatter, value: &str) -> fmt::Result {
    fmt.write_char('"')?;
    for c in value.chars() {
        match c {
            '"' => fmt.write_str("\\\"")?,
            '\\' => fmt.write_str("\\\\")?,
            '\n' => fmt.write_str("\\n")?,
            '\t' => fmt.write_str("\\t")?,
            c => fmt.write_char(c)?,
        }
    }
    fmt.write_char('"')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::parser::Options;
    use std::collections::HashSet;

    fn parse(input: &str) -> Ast {
        compile(input, &Options::default()).unwrap()
    }

    #[test]
    fn variables() {
        let ast = parse("(a + b)^2");
        assert_eq!(ast.variables(), HashSet::from(["a", "b"]));

        let ast = parse("a * log(b + c, a) > 2 ? d : -e");
        assert_eq!(ast.variables(), HashSet::from(["a", "b", "c", "d", "e"]));

        assert!(parse("sin(3) + 'x'").variables().is_empty());
    }

    #[test]
    fn functions() {
        let ast = parse("f(g(x), 1) + (a ? h() : -f(2))");
        assert_eq!(ast.functions(), HashSet::from(["f", "g", "h"]));
        assert!(parse("x + 1").functions().is_empty());
    }

    #[test]
    fn display_round_trip() {
        let inputs = [
            "2 + 3 * 4",
            "-x ^ 2",
            "!(a < b) || c == 'it\\'s'",
            "pow(2, 10) % 7",
            "a ? b ? 1 : 2 : 3e-7",
            "f()",
            "1e400 - 2",
            "'tab\there' + \"quote \\\" and \\\\ and \\n\"",
            "'\r\u{1}\u{7f}' == x",
        ];
        for input in &inputs {
            let ast = parse(input);
            let printed = ast.to_string();
            assert_eq!(parse(&printed), ast, "{} printed as {}", input, printed);
        }
        assert_eq!(parse("2 + 3 * 4").to_string(), "(2.0 + (3.0 * 4.0))");
        assert_eq!(parse("1e400").to_string(), "1e999");
        assert_eq!(parse("'a\rb'").to_string(), "\"a\rb\"");
    }

    #[test]
    fn display_special_numbers() {
        assert_eq!(Ast::Literal(Value::Number(f64::NEG_INFINITY)).to_string(), "-1e999");
        assert_eq!(Ast::Literal(Value::Number(f64::NAN)).to_string(), "(0.0 / 0.0)");
        assert_eq!(Ast::Literal(Value::Number(2.5e-8)).to_string(), "2.5e-8");
    }
}
