//! Variable environment

use rustc_hash::FxHashMap;

use crate::value::{ErrorCode, Value, ValueKind};

/// Kinds that get a script-visible constant
const KIND_CONSTANTS: [ValueKind; 8] = [
    ValueKind::Boolean,
    ValueKind::Character,
    ValueKind::Integer,
    ValueKind::Float,
    ValueKind::String,
    ValueKind::Object,
    ValueKind::List,
    ValueKind::Error,
];

/// Stack of scopes; the bottom one holds the globals
#[derive(Debug, Clone)]
pub struct Environment {
    scopes: Vec<FxHashMap<String, Value>>,
}

impl Environment {
    /// Create an environment whose global scope holds the kind constants
    /// (`INT`, `LIST`, ...) and every `E_*` error code.
    pub fn new() -> Self {
        let mut globals = FxHashMap::default();

        for kind in KIND_CONSTANTS {
            if let Some(name) = kind.constant_name() {
                globals.insert(name.to_string(), Value::Integer(i64::from(kind.tag())));
            }
        }
        for code in ErrorCode::ALL {
            globals.insert(code.name().to_string(), Value::Error(code));
        }

        Environment {
            scopes: vec![globals],
        }
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    /// Pop the innermost scope. The global scope is never popped.
    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Bind `name` in the innermost scope, shadowing outer bindings
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.into(), value);
        }
    }

    /// Look a name up from the innermost scope outward
    pub fn get(&self, name: &str) -> Option<Value> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .cloned()
    }

    /// Number of scopes, globals included
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
