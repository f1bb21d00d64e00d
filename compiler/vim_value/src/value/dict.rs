//! Shared, mutable Dictionary storage.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashSet};

use super::lock::LockState;
use super::Value;
use crate::errors::value_locked;
use crate::EvalError;

type Entries = IndexMap<String, Value, FxBuildHasher>;

struct DictData {
    entries: RefCell<Entries>,
    lock: LockState,
    /// Keys locked individually, as `:lockvar g:name` does for variables.
    locked_keys: RefCell<FxHashSet<String>>,
}

/// Reference to a Dictionary.
///
/// Keys keep insertion order, which is the order `keys()`, `items()` and
/// `:echo` report. Scope dictionaries (`g:`, `l:`, `s:`...) are plain
/// `DictHandle`s too, so `g:` can be passed around and indexed like any
/// other dictionary.
#[derive(Clone)]
pub struct DictHandle(Rc<DictData>);

impl DictHandle {
    pub fn new() -> Self {
        DictHandle(Rc::new(DictData {
            entries: RefCell::new(Entries::default()),
            lock: LockState::default(),
            locked_keys: RefCell::new(FxHashSet::default()),
        }))
    }

    pub fn from_entries(entries: impl IntoIterator<Item = (String, Value)>) -> Self {
        let dict = DictHandle::new();
        dict.0.entries.borrow_mut().extend(entries);
        dict
    }

    pub fn len(&self) -> usize {
        self.0.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.entries.borrow().is_empty()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.entries.borrow().get(key).cloned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.entries.borrow().contains_key(key)
    }

    pub fn keys(&self) -> Vec<String> {
        self.0.entries.borrow().keys().cloned().collect()
    }

    pub fn values(&self) -> Vec<Value> {
        self.0.entries.borrow().values().cloned().collect()
    }

    /// Snapshot of the entries in insertion order.
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.0
            .entries
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn ptr_eq(&self, other: &DictHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0).cast::<()>() as usize
    }

    pub fn is_locked(&self) -> bool {
        self.0.lock.is_locked()
    }

    pub fn items_locked(&self) -> bool {
        self.0.lock.items_locked()
    }

    pub(crate) fn apply_lock(&self, depth: u32, lock: bool) {
        self.0.lock.apply(depth, lock);
    }

    pub fn is_key_locked(&self, key: &str) -> bool {
        self.0.locked_keys.borrow().contains(key)
    }

    pub fn lock_key(&self, key: &str) {
        self.0.locked_keys.borrow_mut().insert(key.to_string());
    }

    pub fn unlock_key(&self, key: &str) {
        self.0.locked_keys.borrow_mut().remove(key);
    }

    /// Fail with `E741` if `key` cannot be assigned.
    pub fn check_insert(&self, key: &str, what: &str) -> Result<(), EvalError> {
        let exists = self.contains_key(key);
        let blocked = if exists {
            self.items_locked() || self.is_key_locked(key)
        } else {
            self.is_locked()
        };
        if blocked {
            return Err(value_locked(what));
        }
        Ok(())
    }

    /// Assign `key`, respecting container and key locks.
    pub fn insert(&self, key: &str, value: Value, what: &str) -> Result<(), EvalError> {
        self.check_insert(key, what)?;
        self.define(key, value);
        Ok(())
    }

    /// Assign `key` without lock checks, for runtime-owned entries such as
    /// `a:` bindings and `v:` variables.
    pub fn define(&self, key: &str, value: Value) {
        let mut entries = self.0.entries.borrow_mut();
        if let Some(slot) = entries.get_mut(key) {
            *slot = value;
        } else {
            entries.insert(key.to_string(), value);
        }
    }

    /// Remove `key` without lock checks; the counterpart of [`define`].
    ///
    /// [`define`]: DictHandle::define
    pub fn undefine(&self, key: &str) -> Option<Value> {
        self.0.locked_keys.borrow_mut().remove(key);
        self.0.entries.borrow_mut().shift_remove(key)
    }

    /// Remove `key`, returning its value if present.
    pub fn remove(&self, key: &str, what: &str) -> Result<Option<Value>, EvalError> {
        if !self.contains_key(key) {
            return Ok(None);
        }
        if self.is_locked() || self.is_key_locked(key) {
            return Err(value_locked(what));
        }
        self.0.locked_keys.borrow_mut().remove(key);
        Ok(self.0.entries.borrow_mut().shift_remove(key))
    }

    /// Drop every entry and key lock, ignoring locks.
    pub fn clear(&self) {
        self.0.entries.borrow_mut().clear();
        self.0.locked_keys.borrow_mut().clear();
    }
}

impl Default for DictHandle {
    fn default() -> Self {
        DictHandle::new()
    }
}

impl fmt::Debug for DictHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Value::Dict(self.clone()).to_string_repr())
    }
}
