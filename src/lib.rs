pub mod custom;
pub mod error;
pub mod grammar;
pub mod lexer;
pub mod parser;
pub mod preprocess;
pub mod registry;
pub mod runtime;
pub mod types;

pub use custom::{CustomFunction, NativeFunction};
pub use error::Error;
pub use grammar::TokenKind;
pub use lexer::Token;
pub use registry::{Namespace, Registry, Resolver};
pub use types::Value;

use serde::Serialize;

/// Intermediate stages of one evaluation, as shown by `--verbose`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub expr: String,
    pub tokens: Vec<Token>,
    pub rpn: Vec<Token>,
    pub result: Value,
}

/// Evaluates expressions against a registry of namespaces.
///
/// The registry is only read during evaluation; each call builds its own
/// resolver, so one `Calculator` can be shared across threads.
#[derive(Clone, Debug)]
pub struct Calculator {
    registry: Registry,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator {
    /// Calculator over the standard namespaces.
    pub fn new() -> Self {
        Self { registry: Registry::standard() }
    }

    pub fn with_registry(registry: Registry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Register extra namespaces here before evaluating.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Evaluate `expr` with `modules` searched before `math` and `builtins`.
    pub fn evaluate<S: AsRef<str>>(&self, expr: &str, modules: &[S]) -> Result<Value, Error> {
        self.trace(expr, modules).map(|t| t.result)
    }

    /// Evaluate and keep every intermediate stage.
    pub fn trace<S: AsRef<str>>(&self, expr: &str, modules: &[S]) -> Result<Trace, Error> {
        let expr = preprocess::preprocess(expr);
        tracing::debug!("EXPR:\t {}", expr);

        let resolver = self.registry.resolver(modules)?;
        let mut tokens = lexer::tokenize(&expr, &resolver)?;
        lexer::rewrite_unary(&mut tokens);
        tracing::debug!("TOKENS:\t {}", lexer::render(&tokens));

        let rpn = parser::to_postfix(&tokens)?;
        tracing::debug!("RPN:\t {}", lexer::render(&rpn));

        let result = runtime::evaluate_rpn(&rpn, &resolver)?;
        Ok(Trace { expr, tokens, rpn, result })
    }
}

/// Evaluate an expression with the standard namespaces.
pub fn evaluate(input: &str) -> Result<Value, Error> {
    Calculator::new().evaluate::<&str>(input, &[])
}

/// Evaluate with extra namespaces (e.g. `cmath`, `statistics`) searched first.
pub fn evaluate_with<S: AsRef<str>>(input: &str, modules: &[S]) -> Result<Value, Error> {
    Calculator::new().evaluate(input, modules)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approxv(v: Value, b: f64) -> bool {
        matches!(v.as_f64(), Some(a) if (a - b).abs() < 1e-9)
    }

    #[test]
    fn test_basic_arithmetic() {
        assert!(approxv(evaluate("2 + 3 * 4").unwrap(), 14.0));
        assert!(approxv(evaluate("(2 + 3) * 4").unwrap(), 20.0));
        assert!(approxv(evaluate("2 ^ 3").unwrap(), 8.0));
        assert!(approxv(evaluate("2 ^ 3 ^ 2").unwrap(), 512.0));
        assert!(approxv(evaluate("-3 ^ 2").unwrap(), -9.0));
        assert!(approxv(evaluate("(-3) ^ 2").unwrap(), 9.0));
    }

    #[test]
    fn trace_exposes_every_stage() {
        let trace = Calculator::new().trace::<&str>("2(3+4)", &[]).unwrap();
        assert_eq!(trace.expr, "2*(3+4)");
        assert_eq!(trace.tokens.len(), 7);
        assert_eq!(lexer::render(&trace.rpn), "2:INTEGER  3:INTEGER  4:INTEGER  +:PLUS  *:TIMES");
        assert_eq!(trace.result, Value::Int(14));
    }
}
