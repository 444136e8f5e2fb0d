//! Object store and runtime collaborators
//!
//! The interpreter never touches object storage directly. Property reads,
//! the object builtins and range filtering all go through these traits, so
//! an embedder can put a database behind them.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::value::{ErrorCode, ObjectId, Value};

/// Storage for objects and their properties
pub trait ObjectStore {
    /// Allocate a fresh object and return its id
    fn create(&mut self) -> Result<ObjectId, ErrorCode>;

    /// Destroy an object; its id is never handed out again
    fn recycle(&mut self, id: ObjectId) -> Result<(), ErrorCode>;

    /// Highest id ever allocated, or -1 when nothing has been created
    fn max_object(&self) -> ObjectId;

    fn valid(&self, id: ObjectId) -> bool;

    fn add_property(&mut self, id: ObjectId, name: &str, value: Value) -> Result<(), ErrorCode>;

    fn delete_property(&mut self, id: ObjectId, name: &str) -> Result<(), ErrorCode>;

    fn get_property(&self, id: ObjectId, name: &str) -> Result<Value, ErrorCode>;

    /// Property names of an object, in definition order
    fn properties(&self, id: ObjectId) -> Result<Vec<String>, ErrorCode>;
}

/// Store handle shared between the interpreter, its builtins and the runtime
pub type SharedStore = Rc<RefCell<dyn ObjectStore>>;

/// In-memory object store
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: IndexMap<ObjectId, IndexMap<String, Value>>,
    next_id: ObjectId,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a fresh store in a shareable handle
    pub fn shared() -> SharedStore {
        Rc::new(RefCell::new(Self::new()))
    }

    fn object(&self, id: ObjectId) -> Result<&IndexMap<String, Value>, ErrorCode> {
        self.objects.get(&id).ok_or(ErrorCode::InvInd)
    }

    fn object_mut(&mut self, id: ObjectId) -> Result<&mut IndexMap<String, Value>, ErrorCode> {
        self.objects.get_mut(&id).ok_or(ErrorCode::InvInd)
    }
}

impl ObjectStore for MemoryStore {
    fn create(&mut self) -> Result<ObjectId, ErrorCode> {
        let id = self.next_id;
        self.next_id = id.checked_add(1).ok_or(ErrorCode::Quota)?;
        self.objects.insert(id, IndexMap::new());
        tracing::debug!("Created object #{}", id);
        Ok(id)
    }

    fn recycle(&mut self, id: ObjectId) -> Result<(), ErrorCode> {
        self.objects
            .shift_remove(&id)
            .map(|_| tracing::debug!("Recycled object #{}", id))
            .ok_or(ErrorCode::InvInd)
    }

    fn max_object(&self) -> ObjectId {
        self.next_id - 1
    }

    fn valid(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    fn add_property(&mut self, id: ObjectId, name: &str, value: Value) -> Result<(), ErrorCode> {
        let props = self.object_mut(id)?;
        if props.contains_key(name) {
            return Err(ErrorCode::InvArg);
        }
        props.insert(name.to_string(), value);
        Ok(())
    }

    fn delete_property(&mut self, id: ObjectId, name: &str) -> Result<(), ErrorCode> {
        self.object_mut(id)?
            .shift_remove(name)
            .map(|_| ())
            .ok_or(ErrorCode::PropNf)
    }

    fn get_property(&self, id: ObjectId, name: &str) -> Result<Value, ErrorCode> {
        self.object(id)?
            .get(name)
            .cloned()
            .ok_or(ErrorCode::PropNf)
    }

    fn properties(&self, id: ObjectId) -> Result<Vec<String>, ErrorCode> {
        Ok(self.object(id)?.keys().cloned().collect())
    }
}

/// Type and validity queries backing `typeof` and `valid`
pub trait Runtime {
    /// Kind tag of the single argument, as an Integer
    fn type_of(&self, args: &[Value]) -> Value;

    /// Whether the single Object argument names a live object
    fn valid(&self, args: &[Value]) -> Value;
}

/// Default runtime, answering validity from the object store
pub struct Kernel {
    store: SharedStore,
}

impl Kernel {
    pub fn new(store: SharedStore) -> Self {
        Kernel { store }
    }
}

impl Runtime for Kernel {
    fn type_of(&self, args: &[Value]) -> Value {
        match args {
            [value] => Value::Integer(i64::from(value.kind().tag())),
            _ => Value::Error(ErrorCode::InvArg),
        }
    }

    fn valid(&self, args: &[Value]) -> Value {
        match args {
            [Value::Object(id)] => Value::Boolean(self.store.borrow().valid(*id)),
            _ => Value::Error(ErrorCode::InvArg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_allocates_ascending_ids() {
        let mut store = MemoryStore::new();
        assert_eq!(store.max_object(), -1);
        assert_eq!(store.create(), Ok(0));
        assert_eq!(store.create(), Ok(1));
        assert_eq!(store.max_object(), 1);
    }

    #[test]
    fn test_recycle_invalidates() {
        let mut store = MemoryStore::new();
        let id = store.create().unwrap();
        assert!(store.valid(id));
        store.recycle(id).unwrap();
        assert!(!store.valid(id));
        assert_eq!(store.recycle(id), Err(ErrorCode::InvInd));
        // ids are not reused
        assert_eq!(store.create(), Ok(1));
    }

    #[test]
    fn test_properties_keep_definition_order() {
        let mut store = MemoryStore::new();
        let id = store.create().unwrap();
        store.add_property(id, "name", Value::from("box")).unwrap();
        store.add_property(id, "size", Value::Integer(3)).unwrap();
        assert_eq!(store.properties(id).unwrap(), vec!["name", "size"]);
        assert_eq!(store.get_property(id, "size"), Ok(Value::Integer(3)));
        assert_eq!(
            store.add_property(id, "size", Value::Integer(4)),
            Err(ErrorCode::InvArg)
        );
    }

    #[test]
    fn test_missing_property_and_object() {
        let mut store = MemoryStore::new();
        let id = store.create().unwrap();
        assert_eq!(store.get_property(id, "x"), Err(ErrorCode::PropNf));
        assert_eq!(store.delete_property(id, "x"), Err(ErrorCode::PropNf));
        assert_eq!(store.get_property(99, "x"), Err(ErrorCode::InvInd));
    }

    #[test]
    fn test_kernel_answers_from_store() {
        let store = MemoryStore::shared();
        let id = store.borrow_mut().create().unwrap();
        let kernel = Kernel::new(store.clone());
        assert_eq!(kernel.valid(&[Value::Object(id)]), Value::TRUE);
        assert_eq!(kernel.valid(&[Value::Object(7)]), Value::FALSE);
        assert_eq!(kernel.valid(&[Value::Integer(0)]), Value::Error(ErrorCode::InvArg));
        assert_eq!(kernel.type_of(&[Value::from("s")]), Value::Integer(6));
        assert_eq!(kernel.type_of(&[]), Value::Error(ErrorCode::InvArg));
    }
}
