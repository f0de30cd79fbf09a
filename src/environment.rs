//! Lexically chained environments (`spec.md` §3/§4.4).
//!
//! An `Environment` is a name→value map with an optional link to an
//! enclosing scope. Environments form a tree: a block or function call
//! creates a child of whatever environment was active at that point, and
//! that child may outlive the stack frame that created it once a function
//! value captures it (`spec.md` §3 Lifecycles). Reference-counted interior
//! mutability, rather than raw back-pointers, is the shape `spec.md` §9
//! recommends for that: `Environment` is a thin `Rc<RefCell<..>>` handle, so
//! cloning it is just a refcount bump and every clone observes the same
//! bindings.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::token::Token;
use crate::value::Value;
use crate::RuntimeError;

#[derive(Debug, Default)]
struct EnvironmentInner {
    values: HashMap<String, Value>,
    enclosing: Option<Environment>,
}

/// A handle to one scope in the environment chain. Cheap to clone; clones
/// share the same underlying bindings.
#[derive(Debug, Clone)]
pub struct Environment(Rc<RefCell<EnvironmentInner>>);

impl Environment {
    /// Creates a fresh environment with no enclosing scope - used once, for
    /// the interpreter's `globals`.
    pub fn new() -> Self {
        Environment(Rc::new(RefCell::new(EnvironmentInner::default())))
    }

    /// Creates a child scope of `enclosing` - used when entering a `Block`
    /// or a function call.
    pub fn with_enclosing(enclosing: Environment) -> Self {
        Environment(Rc::new(RefCell::new(EnvironmentInner {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        })))
    }

    /// Unconditionally installs a binding in this environment. A name may be
    /// defined more than once in the same environment - the second
    /// `define` overwrites the first (`spec.md` §3 invariant i).
    pub fn define(&self, name: &str, value: Value) {
        self.0.borrow_mut().values.insert(name.to_string(), value);
    }

    /// Looks up `token.lexeme`, walking the enclosing chain outward.
    pub fn get(&self, token: &Token) -> Result<Value, RuntimeError> {
        let inner = self.0.borrow();
        if let Some(value) = inner.values.get(&token.lexeme) {
            return Ok(value.clone());
        }
        if let Some(enclosing) = &inner.enclosing {
            return enclosing.get(token);
        }
        Err(RuntimeError::new(
            token.clone(),
            format!("Undefined variable '{}'.", token.lexeme),
        ))
    }

    /// Updates an existing binding in the nearest environment that defines
    /// it. Never creates a new binding (`spec.md` §3 invariant ii). Note the
    /// capitalization of "Undefined Variable" here versus "Undefined
    /// variable" in `get` - a deliberate discrepancy preserved from the
    /// source error catalog (`spec.md` §6), see DESIGN.md.
    pub fn assign(&self, token: &Token, value: Value) -> Result<(), RuntimeError> {
        let mut inner = self.0.borrow_mut();
        if inner.values.contains_key(&token.lexeme) {
            inner.values.insert(token.lexeme.clone(), value);
            return Ok(());
        }
        match &inner.enclosing {
            Some(enclosing) => enclosing.assign(token, value),
            None => Err(RuntimeError::new(
                token.clone(),
                format!("Undefined Variable '{}'.", token.lexeme),
            )),
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new()
    }
}
