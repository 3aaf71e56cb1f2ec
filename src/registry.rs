//! Closed symbol registry and the per-evaluation resolver built from it.
//!
//! Every name an expression can reach lives in a [`Namespace`] registered up
//! front; there is no reflection over anything else.

use crate::custom::{self, CustomFunction};
use crate::error::Error;
use crate::runtime::{builtin_functions, cmath, math, statistical};
use crate::types::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Always active, after any namespaces the caller asks for.
pub const MATH: &str = "math";
pub const BUILTINS: &str = "builtins";

#[derive(Clone)]
pub enum Binding {
    Constant(Value),
    Function(Arc<dyn CustomFunction>),
}

impl std::fmt::Debug for Binding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Binding::Constant(v) => write!(f, "Constant({})", v),
            Binding::Function(func) => write!(f, "Function({})", func.name()),
        }
    }
}

/// A named table of constants and functions.
#[derive(Clone, Debug)]
pub struct Namespace {
    name: String,
    bindings: HashMap<String, Binding>,
}

impl Namespace {
    pub fn new<N: Into<String>>(name: N) -> Self {
        Self { name: name.into(), bindings: HashMap::new() }
    }

    pub fn with_constant<N: Into<String>>(mut self, name: N, value: Value) -> Self {
        self.bindings.insert(name.into(), Binding::Constant(value));
        self
    }

    /// Bind a function under its own name.
    pub fn with_function<F: CustomFunction + 'static>(mut self, function: F) -> Self {
        self.bindings
            .insert(function.name().to_string(), Binding::Function(Arc::new(function)));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    /// Bound names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.bindings.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

/// Every namespace an evaluation may activate.
#[derive(Clone, Debug, Default)]
pub struct Registry {
    namespaces: HashMap<String, Namespace>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self { namespaces: HashMap::new() }
    }

    /// `math` and `builtins`, plus the opt-in `cmath` and `statistics` tables.
    pub fn standard() -> Self {
        let mut namespaces = HashMap::new();
        for ns in [
            math::namespace(),
            builtin_functions::namespace(),
            cmath::namespace(),
            statistical::namespace(),
        ] {
            namespaces.insert(ns.name().to_string(), ns);
        }
        Self { namespaces }
    }

    /// Register (or replace) a namespace after validating its functions.
    pub fn register(&mut self, namespace: Namespace) -> Result<(), Error> {
        if namespace.name.is_empty() || namespace.name.contains('.') {
            return Err(Error::Registry(format!(
                "invalid namespace name '{}'",
                namespace.name
            )));
        }

        for (name, binding) in &namespace.bindings {
            if name.is_empty() {
                return Err(Error::Registry("binding name cannot be empty".to_string()));
            }
            if let Binding::Function(f) = binding {
                if f.min_args() > f.max_args().unwrap_or(usize::MAX) {
                    return Err(Error::Registry(format!(
                        "{}: min_args cannot be greater than max_args",
                        name
                    )));
                }
            }
        }

        tracing::debug!(namespace = %namespace.name, bindings = namespace.bindings.len(), "registered namespace");
        self.namespaces.insert(namespace.name.clone(), namespace);
        Ok(())
    }

    /// Remove a namespace by name
    pub fn unregister(&mut self, name: &str) -> bool {
        self.namespaces.remove(name).is_some()
    }

    pub fn has_namespace(&self, name: &str) -> bool {
        self.namespaces.contains_key(name)
    }

    /// Registered namespace names, sorted.
    pub fn list_namespaces(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.namespaces.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Activate `extras` followed by `math` and `builtins`.
    ///
    /// Fails with [`Error::Import`] on the first identifier that is not registered.
    pub fn resolver<S: AsRef<str>>(&self, extras: &[S]) -> Result<Resolver<'_>, Error> {
        let mut active: Vec<&Namespace> = Vec::new();
        let requested = extras.iter().map(|s| s.as_ref()).chain([MATH, BUILTINS]);
        for name in requested {
            let ns = self
                .namespaces
                .get(name)
                .ok_or_else(|| Error::Import(name.to_string()))?;
            if !active.iter().any(|a| a.name == ns.name) {
                active.push(ns);
            }
        }
        Ok(Resolver { active })
    }
}

/// Symbol lookup scoped to one evaluation.
pub struct Resolver<'r> {
    active: Vec<&'r Namespace>,
}

impl<'r> Resolver<'r> {
    /// Active namespace names in lookup order.
    pub fn namespaces(&self) -> Vec<&str> {
        self.active.iter().map(|ns| ns.name()).collect()
    }

    /// Find the binding for a bare or dotted name.
    ///
    /// `a.b` only looks inside `a`, which must be active. A bare name is
    /// searched in every active namespace in order.
    pub fn resolve(&self, name: &str) -> Result<&'r Binding, Error> {
        let found = match name.split_once('.') {
            Some((head, rest)) => self
                .active
                .iter()
                .find(|ns| ns.name == head)
                .and_then(|ns| ns.get(rest)),
            None => self.active.iter().find_map(|ns| ns.get(name)),
        };
        tracing::trace!(name, found = found.is_some(), "resolve");
        found.ok_or_else(|| Error::UnknownSymbol(name.to_string()))
    }

    pub fn resolve_constant(&self, name: &str) -> Result<Value, Error> {
        match self.resolve(name)? {
            Binding::Constant(v) => Ok(*v),
            Binding::Function(_) => Err(Error::type_error(format!(
                "'{}' is a function and needs to be called",
                name
            ))),
        }
    }

    pub fn resolve_function(&self, name: &str) -> Result<&'r dyn CustomFunction, Error> {
        match self.resolve(name)? {
            Binding::Function(f) => Ok(f.as_ref()),
            Binding::Constant(_) => Err(Error::type_error(format!(
                "'{}' is a constant and cannot be called",
                name
            ))),
        }
    }

    /// Resolve and invoke `name` with arity checking.
    pub fn call(&self, name: &str, args: Vec<Value>) -> Result<Value, Error> {
        custom::call(self.resolve_function(name)?, args)
    }
}
