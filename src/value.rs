use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::fmt::{self, Display, Formatter};
use std::hash::{BuildHasher, Hash};

/// A value produced while evaluating an expression.
///
/// Expressions always end up as numbers, but booleans and strings exist in
/// between: comparisons produce booleans, and string literals can be
/// compared and concatenated.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A floating point number
    Number(f64),
    /// Result of a comparison or logical operator
    Bool(bool),
    /// A string literal, or a string bound to a variable
    Str(String),
}

impl Value {
    /// Name of the value type, for error messages
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match *self {
            Self::Number(_) => "number",
            Self::Bool(_) => "bool",
            Self::Str(_) => "string",
        }
    }

    /// Get `Some(number)` if this value is a number, `None` otherwise
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        if let Self::Number(value) = *self {
            Some(value)
        } else {
            None
        }
    }

    /// Get `Some(bool)` if this value is a boolean, `None` otherwise
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        if let Self::Bool(value) = *self {
            Some(value)
        } else {
            None
        }
    }
}

impl Display for Value {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        match *self {
            Self::Number(value) => write!(fmt, "{}", value),
            Self::Bool(value) => write!(fmt, "{}", value),
            Self::Str(ref value) => write!(fmt, "{}", value),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

/// A binding environment, giving values to the variables of an expression.
///
/// It is implemented for the standard maps, with any key that borrows as a
/// `str` and any value convertible to a [`Value`]:
///
/// ```
/// # use std::collections::HashMap;
/// # use mathparse::{Context, Value};
/// let mut context: HashMap<String, f64> = HashMap::new();
/// context.insert("a".into(), 3.5);
/// assert_eq!(context.lookup("a"), Some(Value::Number(3.5)));
/// assert_eq!(context.lookup("b"), None);
///
/// // `()` is the empty context
/// assert_eq!(().lookup("a"), None);
/// ```
pub trait Context {
    /// Get the value of the variable `name`, if it is defined
    fn lookup(&self, name: &str) -> Option<Value>;
}

impl<C: Context + ?Sized> Context for &C {
    fn lookup(&self, name: &str) -> Option<Value> {
        (**self).lookup(name)
    }
}

impl Context for () {
    fn lookup(&self, _name: &str) -> Option<Value> {
        None
    }
}

impl<K, V, S> Context for HashMap<K, V, S>
where
    K: Borrow<str> + Hash + Eq,
    V: Clone + Into<Value>,
    S: BuildHasher,
{
    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name).cloned().map(Into::into)
    }
}

impl<K, V, S> Context for hashbrown::HashMap<K, V, S>
where
    K: Borrow<str> + Hash + Eq,
    V: Clone + Into<Value>,
    S: BuildHasher,
{
    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name).cloned().map(Into::into)
    }
}

impl<K, V> Context for BTreeMap<K, V>
where
    K: Borrow<str> + Ord,
    V: Clone + Into<Value>,
{
    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name).cloned().map(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contexts() {
        let mut std_map: HashMap<&str, Value> = HashMap::new();
        std_map.insert("s", Value::from("text"));
        std_map.insert("flag", Value::from(true));
        assert_eq!(std_map.lookup("s"), Some(Value::Str("text".into())));
        assert_eq!(std_map.lookup("flag"), Some(Value::Bool(true)));

        let mut fast_map: hashbrown::HashMap<String, f64> = hashbrown::HashMap::new();
        fast_map.insert("x".into(), 2.0);
        assert_eq!(fast_map.lookup("x"), Some(Value::Number(2.0)));
        assert_eq!((&fast_map).lookup("y"), None);

        let mut ordered: BTreeMap<String, i32> = BTreeMap::new();
        ordered.insert("n".into(), 7);
        assert_eq!(ordered.lookup("n"), Some(Value::Number(7.0)));
    }

    #[test]
    fn display() {
        assert_eq!(Value::Number(3.0).to_string(), "3");
        assert_eq!(Value::Number(0.25).to_string(), "0.25");
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(Value::Str("abc".into()).to_string(), "abc");
    }

    #[test]
    fn accessors() {
        assert_eq!(Value::Number(1.5).as_number(), Some(1.5));
        assert_eq!(Value::Bool(true).as_number(), None);
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Str("x".into()).type_name(), "string");
    }
}
