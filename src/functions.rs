use crate::lexer::is_identifier;
use log::{debug, warn};
use std::collections::HashMap;
use std::fmt::{self, Debug, Display, Formatter};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// The callable part of a [`Function`]
pub type Callable = dyn Fn(&[f64]) -> Result<f64, String> + Send + Sync;

/// Number of arguments accepted by a [`Function`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many arguments
    Exact(usize),
    /// This many arguments or more
    AtLeast(usize),
}

impl Arity {
    /// Check if a call with `count` arguments is valid
    #[must_use]
    pub fn accepts(self, count: usize) -> bool {
        match self {
            Self::Exact(n) => count == n,
            Self::AtLeast(n) => count >= n,
        }
    }
}

impl Display for Arity {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        match *self {
            Self::Exact(n) => write!(fmt, "exactly {}", n),
            Self::AtLeast(n) => write!(fmt, "at least {}", n),
        }
    }
}

/// A native function that can be called from expressions.
///
/// Arguments are always numbers, and the arity is checked by the evaluator
/// before the callable runs, so a callable can index into its arguments
/// freely.
///
/// ```
/// # use mathparse::{Arity, Function};
/// let hypot = Function::binary(f64::hypot);
/// assert_eq!(hypot.arity(), Arity::Exact(2));
/// assert_eq!(hypot.call(&[3.0, 4.0]), Ok(5.0));
///
/// let sum = Function::variadic(|args| Ok(args.iter().sum()));
/// assert_eq!(sum.call(&[1.0, 2.0, 3.0]), Ok(6.0));
/// ```
#[derive(Clone)]
pub struct Function {
    arity: Arity,
    call: Arc<Callable>,
}

impl Function {
    /// Wrap a fallible callable with the given arity
    pub fn new<F>(arity: Arity, function: F) -> Self
    where
        F: Fn(&[f64]) -> Result<f64, String> + Send + Sync + 'static,
    {
        Self {
            arity,
            call: Arc::new(function),
        }
    }

    /// A function of one argument
    pub fn unary<F>(function: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self::new(Arity::Exact(1), move |args| match *args {
            [x] => Ok(function(x)),
            _ => Err(wrong_count(1, args.len())),
        })
    }

    /// A function of two arguments
    pub fn binary<F>(function: F) -> Self
    where
        F: Fn(f64, f64) -> f64 + Send + Sync + 'static,
    {
        Self::new(Arity::Exact(2), move |args| match *args {
            [x, y] => Ok(function(x, y)),
            _ => Err(wrong_count(2, args.len())),
        })
    }

    /// A function taking any number of arguments, including none
    pub fn variadic<F>(function: F) -> Self
    where
        F: Fn(&[f64]) -> Result<f64, String> + Send + Sync + 'static,
    {
        Self::new(Arity::AtLeast(0), function)
    }

    /// Get the accepted number of arguments
    #[must_use]
    pub fn arity(&self) -> Arity {
        self.arity
    }

    /// Call the function. The arity is not checked here, but functions built
    /// with [`unary`](Self::unary) or [`binary`](Self::binary) return an
    /// error when given the wrong number of arguments.
    pub fn call(&self, args: &[f64]) -> Result<f64, String> {
        (self.call)(args)
    }
}

fn wrong_count(expected: usize, found: usize) -> String {
    format!("expected {} argument(s), got {}", expected, found)
}

impl Debug for Function {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        fmt.debug_struct("Function")
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

lazy_static! {
    /// The builtin functions, with their signatures. The signature strings
    /// are kept as they were historically published, which is why `pow` is
    /// documented as `pow(x)` even though it takes two arguments.
    pub static ref BUILTINS: HashMap<&'static str, (&'static str, Function)> = {
        let mut map = HashMap::<&'static str, (&'static str, Function)>::new();
        map.insert("sin", ("sin(x)", Function::unary(f64::sin)));
        map.insert("asin", ("asin(x)", Function::unary(f64::asin)));
        map.insert("sinh", ("sinh(x)", Function::unary(f64::sinh)));
        map.insert("asinh", ("asinh(x)", Function::unary(f64::asinh)));
        map.insert("cos", ("cos(x)", Function::unary(f64::cos)));
        map.insert("acos", ("acos(x)", Function::unary(f64::acos)));
        map.insert("cosh", ("cosh(x)", Function::unary(f64::cosh)));
        map.insert("acosh", ("acosh(x)", Function::unary(f64::acosh)));
        map.insert("tan", ("tan(x)", Function::unary(f64::tan)));
        map.insert("atan", ("atan(x)", Function::unary(f64::atan)));
        map.insert("tanh", ("tanh(x)", Function::unary(f64::tanh)));
        map.insert("atanh", ("atanh(x)", Function::unary(f64::atanh)));
        map.insert("exp", ("exp(x)", Function::unary(f64::exp)));
        map.insert("sqrt", ("sqrt(x)", Function::unary(f64::sqrt)));
        map.insert("pow", ("pow(x)", Function::binary(f64::powf)));
        map.insert("log", ("log(x)", Function::unary(f64::ln)));
        map.insert("log10", ("log10(x)", Function::unary(f64::log10)));
        map.shrink_to_fit();
        map
    };
}

#[derive(Clone)]
struct Entry {
    signature: String,
    function: Function,
}

/// A shared, thread safe table of named functions.
///
/// Cloning a `Registry` gives a new handle to the *same* table: a function
/// registered through one handle is visible through all the others. Reads
/// run concurrently, registrations take exclusive access.
///
/// ```
/// # use mathparse::{Function, Registry};
/// let registry = Registry::with_builtins();
/// let handle = registry.clone();
/// registry.register("double", "double(x)", Function::unary(|x| 2.0 * x));
/// assert_eq!(handle.signature("double").as_deref(), Some("double(x)"));
/// assert_eq!(handle.signature("pow").as_deref(), Some("pow(x)"));
/// ```
#[derive(Clone)]
pub struct Registry {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl Registry {
    /// Create a registry without any function
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create a registry containing a copy of the [`BUILTINS`]
    #[must_use]
    pub fn with_builtins() -> Self {
        let entries = BUILTINS
            .iter()
            .map(|(&name, (signature, function))| {
                let entry = Entry {
                    signature: (*signature).to_owned(),
                    function: function.clone(),
                };
                (name.to_owned(), entry)
            })
            .collect();
        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    // No code panics while holding the lock, and each mutation is a single
    // insert, so a poisoned table is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Entry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Entry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `function` under `name`, replacing any previous function
    /// with the same name.
    pub fn register(&self, name: &str, signature: &str, function: Function) {
        if !is_identifier(name) {
            warn!(
                "function '{}' is not a valid identifier and can not be called from expressions",
                name
            );
        }
        let entry = Entry {
            signature: signature.to_owned(),
            function,
        };
        let previous = self.write().insert(name.to_owned(), entry);
        if let Some(previous) = previous {
            debug!(
                "redefined function '{}' (was '{}', now '{}')",
                name, previous.signature, signature
            );
        } else {
            debug!("registered function '{}' as '{}'", name, signature);
        }
    }

    /// Get the signature registered for `name`
    #[must_use]
    pub fn signature(&self, name: &str) -> Option<String> {
        self.read().get(name).map(|entry| entry.signature.clone())
    }

    /// Get a handle on the function registered for `name`. The handle stays
    /// valid even if the function is redefined afterwards.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Function> {
        self.read().get(name).map(|entry| entry.function.clone())
    }

    /// Check if a function is registered under `name`
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.read().contains_key(name)
    }

    /// Get the sorted names of all registered functions
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort_unstable();
        names
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl Debug for Registry {
    fn fmt(&self, fmt: &mut Formatter) -> fmt::Result {
        fmt.debug_struct("Registry")
            .field("functions", &self.names())
            .finish()
    }
}
