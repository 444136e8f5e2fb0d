//! Builtin function registry
//!
//! Builtins take already-evaluated arguments and report every failure as an
//! error value; they never fault. Arity or kind mismatches are `E_INVARG`.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::store::{Runtime, SharedStore};
use crate::codec;
use crate::value::{Aggregate, ErrorCode, Floatable, MathFn, Ordinal, Value};

/// A builtin function
pub type Builtin = Box<dyn Fn(&[Value]) -> Value>;

const INVARG: Value = Value::Error(ErrorCode::InvArg);

/// Name → builtin table
#[derive(Default)]
pub struct Builtins {
    table: FxHashMap<String, Builtin>,
}

impl Builtins {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, f: impl Fn(&[Value]) -> Value + 'static) {
        self.table.insert(name.into(), Box::new(f));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.table.contains_key(name)
    }

    /// Call `name`, or `None` when it is not registered
    pub fn call(&self, name: &str, args: &[Value]) -> Option<Value> {
        self.table.get(name).map(|f| f(args))
    }

    /// The standard library, bound to an object store and runtime
    pub fn standard(store: SharedStore, runtime: Rc<dyn Runtime>) -> Self {
        let mut builtins = Builtins::new();

        // === Runtime ===
        let rt = runtime.clone();
        builtins.register("typeof", move |args| rt.type_of(args));
        let rt = runtime;
        builtins.register("valid", move |args| rt.valid(args));

        // === Codec ===
        builtins.register("pickle", |args| match args {
            [value] => match codec::encode(value) {
                Ok(bytes) => Value::List(bytes.into_iter().map(|b| Value::Integer(i64::from(b))).collect()),
                Err(_) => INVARG,
            },
            _ => INVARG,
        });
        builtins.register("unpickle", |args| match args {
            [Value::List(xs)] => {
                let bytes: Option<Vec<u8>> = xs
                    .iter()
                    .map(|x| x.as_int().and_then(|n| u8::try_from(n).ok()))
                    .collect();
                bytes
                    .and_then(|bytes| codec::decode(&bytes).ok())
                    .unwrap_or(INVARG)
            }
            _ => INVARG,
        });

        // === Object store ===
        let db = store.clone();
        builtins.register("maxobject", move |args| match args {
            [] => Value::Object(db.borrow().max_object()),
            _ => INVARG,
        });
        let db = store.clone();
        builtins.register("create", move |args| match args {
            [] => db.borrow_mut().create().map(Value::Object).unwrap_or_else(Value::Error),
            _ => INVARG,
        });
        let db = store.clone();
        builtins.register("recycle", move |args| match args {
            [Value::Object(id)] => done(db.borrow_mut().recycle(*id)),
            _ => INVARG,
        });
        let db = store.clone();
        builtins.register("add_property", move |args| match args {
            [Value::Object(id), Value::String(name), value] => {
                done(db.borrow_mut().add_property(*id, name, value.clone()))
            }
            _ => INVARG,
        });
        let db = store.clone();
        builtins.register("delete_property", move |args| match args {
            [Value::Object(id), Value::String(name)] => done(db.borrow_mut().delete_property(*id, name)),
            _ => INVARG,
        });
        let db = store.clone();
        builtins.register("get_property", move |args| match args {
            [Value::Object(id), Value::String(name)] => {
                db.borrow().get_property(*id, name).unwrap_or_else(Value::Error)
            }
            _ => INVARG,
        });
        let db = store;
        builtins.register("properties", move |args| match args {
            [Value::Object(id)] => match db.borrow().properties(*id) {
                Ok(names) => Value::List(names.into_iter().map(Value::String).collect()),
                Err(code) => Value::Error(code),
            },
            _ => INVARG,
        });

        // === Values ===
        builtins.register("length", |args| {
            aggregate(args, |agg| Value::Integer(agg.len() as i64))
        });
        builtins.register("first", |args| {
            aggregate(args, |agg| if agg.is_empty() { INVARG } else { agg.first() })
        });
        builtins.register("rest", |args| {
            aggregate(args, |agg| if agg.is_empty() { INVARG } else { agg.rest() })
        });
        builtins.register("tostr", |args| {
            Value::String(args.iter().map(Value::to_string).collect())
        });
        builtins.register("chr", |args| match args {
            [Value::Integer(_)] => ordinal(args, Ordinal::chr),
            _ => INVARG,
        });
        builtins.register("ord", |args| ordinal(args, Ordinal::ord));
        builtins.register("succ", |args| ordinal(args, Ordinal::succ));
        builtins.register("pred", |args| ordinal(args, Ordinal::pred));
        builtins.register("min", |args| match args {
            [a, b] => invarg_on_type(a.min(b)),
            _ => INVARG,
        });
        builtins.register("max", |args| match args {
            [a, b] => invarg_on_type(a.max(b)),
            _ => INVARG,
        });

        // === Math ===
        for f in MathFn::ALL {
            builtins.register(f.name(), move |args| match args {
                [value] => Floatable::of(value).map(|n| n.apply(f)).unwrap_or(INVARG),
                _ => INVARG,
            });
        }

        tracing::debug!("Registered {} builtins", builtins.table.len());
        builtins
    }
}

/// `0` on success, the error code otherwise
fn done(result: Result<(), ErrorCode>) -> Value {
    match result {
        Ok(()) => Value::Integer(0),
        Err(code) => Value::Error(code),
    }
}

fn invarg_on_type(value: Value) -> Value {
    match value {
        Value::Error(ErrorCode::Type) => INVARG,
        other => other,
    }
}

fn aggregate(args: &[Value], f: impl FnOnce(Aggregate<'_>) -> Value) -> Value {
    match args {
        [value] => Aggregate::of(value).map(f).unwrap_or(INVARG),
        _ => INVARG,
    }
}

fn ordinal(args: &[Value], f: impl FnOnce(&Ordinal) -> Value) -> Value {
    match args {
        [value] => Ordinal::of(value).map(|o| f(&o)).unwrap_or(INVARG),
        _ => INVARG,
    }
}
