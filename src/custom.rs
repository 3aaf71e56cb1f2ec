use crate::error::Error;
use crate::types::Value;

/// Trait for implementing functions callable from expressions
///
/// # Example
/// ```rust
/// use rpncalc::custom::CustomFunction;
/// use rpncalc::{Value, Error};
///
/// struct DoubleFunction;
///
/// impl CustomFunction for DoubleFunction {
///     fn name(&self) -> &str { "double" }
///     fn min_args(&self) -> usize { 1 }
///     fn max_args(&self) -> Option<usize> { Some(1) }
///
///     fn execute(&self, args: Vec<Value>) -> Result<Value, Error> {
///         let num = args[0].as_f64()
///             .ok_or_else(|| Error::type_error("double expects a real number"))?;
///         Ok(Value::Float(num * 2.0))
///     }
/// }
/// ```
pub trait CustomFunction: Send + Sync {
    /// The name the function is bound to inside its namespace
    fn name(&self) -> &str;

    /// Minimum number of arguments required
    fn min_args(&self) -> usize;

    /// Maximum number of arguments allowed (None = unlimited)
    fn max_args(&self) -> Option<usize>;

    /// Execute the function with the given arguments
    fn execute(&self, args: Vec<Value>) -> Result<Value, Error>;

    /// Optional: Description of the function for documentation
    fn description(&self) -> Option<&str> {
        None
    }
}

/// Validate argument count, then execute.
pub fn call(function: &dyn CustomFunction, args: Vec<Value>) -> Result<Value, Error> {
    let arg_count = args.len();
    if arg_count < function.min_args() {
        return Err(Error::type_error(format!(
            "{}() expects at least {} arguments, got {}",
            function.name(),
            function.min_args(),
            arg_count
        )));
    }

    if let Some(max_args) = function.max_args() {
        if arg_count > max_args {
            return Err(Error::type_error(format!(
                "{}() expects at most {} arguments, got {}",
                function.name(),
                max_args,
                arg_count
            )));
        }
    }

    function.execute(args)
}

/// A function backed by a plain Rust function pointer; used by the built-in tables.
pub struct NativeFunction {
    name: &'static str,
    min_args: usize,
    max_args: Option<usize>,
    body: fn(&[Value]) -> Result<Value, Error>,
}

impl NativeFunction {
    pub const fn new(
        name: &'static str,
        min_args: usize,
        max_args: Option<usize>,
        body: fn(&[Value]) -> Result<Value, Error>,
    ) -> Self {
        Self { name, min_args, max_args, body }
    }
}

impl CustomFunction for NativeFunction {
    fn name(&self) -> &str {
        self.name
    }
    fn min_args(&self) -> usize {
        self.min_args
    }
    fn max_args(&self) -> Option<usize> {
        self.max_args
    }
    fn execute(&self, args: Vec<Value>) -> Result<Value, Error> {
        (self.body)(&args)
    }
}

/// Real-valued argument `i`, or a type error naming the function.
pub fn real_arg(name: &str, args: &[Value], i: usize) -> Result<f64, Error> {
    args.get(i)
        .and_then(Value::as_f64)
        .ok_or_else(|| Error::type_error(format!("{}() expects a real number", name)))
}

/// Integer argument `i`; integral floats are rejected like the host language does.
pub fn int_arg(name: &str, args: &[Value], i: usize) -> Result<i64, Error> {
    args.get(i)
        .and_then(Value::as_int)
        .ok_or_else(|| Error::type_error(format!("{}() expects an integer", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestFunction;

    impl CustomFunction for TestFunction {
        fn name(&self) -> &str {
            "test"
        }
        fn min_args(&self) -> usize {
            1
        }
        fn max_args(&self) -> Option<usize> {
            Some(2)
        }

        fn execute(&self, args: Vec<Value>) -> Result<Value, Error> {
            Ok(Value::Int(args.len() as i64))
        }

        fn description(&self) -> Option<&str> {
            Some("A test function")
        }
    }

    #[test]
    fn arity_is_checked_before_execution() {
        assert_eq!(call(&TestFunction, vec![Value::Int(1)]).unwrap(), Value::Int(1));
        assert!(call(&TestFunction, vec![]).is_err()); // Too few args
        assert!(call(&TestFunction, vec![Value::Int(1); 3]).is_err()); // Too many args
        assert_eq!(TestFunction.description(), Some("A test function"));
    }

    #[test]
    fn native_function_dispatch() {
        fn first(args: &[Value]) -> Result<Value, Error> {
            Ok(args.first().copied().unwrap_or(Value::Int(0)))
        }
        let f = NativeFunction::new("first", 0, None, first);
        assert_eq!(call(&f, vec![]).unwrap(), Value::Int(0));
        assert_eq!(call(&f, vec![Value::Float(2.5), Value::Int(1)]).unwrap(), Value::Float(2.5));
    }

    #[test]
    fn argument_helpers() {
        let args = [Value::Int(3), Value::Float(1.5)];
        assert_eq!(real_arg("f", &args, 0).unwrap(), 3.0);
        assert_eq!(int_arg("f", &args, 0).unwrap(), 3);
        assert!(int_arg("f", &args, 1).is_err());
        assert!(real_arg("f", &args, 2).is_err());
    }
}
