//! Shared, mutable List storage.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::lock::LockState;
use super::Value;
use crate::errors::value_locked;
use crate::EvalError;

struct ListData {
    items: RefCell<Vec<Value>>,
    lock: LockState,
}

/// Reference to a List.
///
/// Cloning the handle shares the list: `let b = a` makes both names see the
/// same items. Every mutation goes through a lock check; `what` names the
/// list in the resulting `E741` message.
#[derive(Clone)]
pub struct ListHandle(Rc<ListData>);

impl ListHandle {
    pub fn new(items: Vec<Value>) -> Self {
        ListHandle(Rc::new(ListData {
            items: RefCell::new(items),
            lock: LockState::default(),
        }))
    }

    pub fn len(&self) -> usize {
        self.0.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.items.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.items.borrow().get(index).cloned()
    }

    /// Snapshot of the items.
    pub fn items(&self) -> Vec<Value> {
        self.0.items.borrow().clone()
    }

    /// Same underlying list.
    pub fn ptr_eq(&self, other: &ListHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Address used to detect cycles while walking nested values.
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0).cast::<()>() as usize
    }

    /// Resolve a possibly negative index against the current length.
    pub fn resolve_index(&self, index: i64) -> Option<usize> {
        resolve_index(index, self.len())
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

    /// Fail with `E741` if items cannot be added or removed.
    pub fn check_structure(&self, what: &str) -> Result<(), EvalError> {
        if self.is_locked() {
            return Err(value_locked(what));
        }
        Ok(())
    }

    /// Fail with `E741` if items cannot be replaced.
    pub fn check_items(&self, what: &str) -> Result<(), EvalError> {
        if self.items_locked() {
            return Err(value_locked(what));
        }
        Ok(())
    }

    pub fn push(&self, value: Value, what: &str) -> Result<(), EvalError> {
        self.check_structure(what)?;
        self.0.items.borrow_mut().push(value);
        Ok(())
    }

    /// Insert before `index`; `index == len()` appends.
    pub fn insert(&self, index: usize, value: Value, what: &str) -> Result<(), EvalError> {
        self.check_structure(what)?;
        let mut items = self.0.items.borrow_mut();
        let index = index.min(items.len());
        items.insert(index, value);
        Ok(())
    }

    /// Replace the item at an in-range `index`.
    pub fn set(&self, index: usize, value: Value, what: &str) -> Result<(), EvalError> {
        self.check_items(what)?;
        if let Some(slot) = self.0.items.borrow_mut().get_mut(index) {
            *slot = value;
        }
        Ok(())
    }

    /// Remove and return the items in `start..=end` (clamped to the list).
    pub fn remove_range(&self, start: usize, end: usize, what: &str) -> Result<Vec<Value>, EvalError> {
        self.check_structure(what)?;
        let mut items = self.0.items.borrow_mut();
        if start >= items.len() || end < start {
            return Ok(Vec::new());
        }
        let end = end.min(items.len() - 1);
        Ok(items.drain(start..=end).collect())
    }

    /// Replace `start..start + count` with `values`.
    pub fn splice(
        &self,
        start: usize,
        count: usize,
        values: Vec<Value>,
        what: &str,
    ) -> Result<(), EvalError> {
        if count == values.len() {
            self.check_items(what)?;
        } else {
            self.check_structure(what)?;
        }
        let mut items = self.0.items.borrow_mut();
        let start = start.min(items.len());
        let end = (start + count).min(items.len());
        items.splice(start..end, values);
        Ok(())
    }

    /// Replace the whole contents (`sort()`, `reverse()`, `filter()`).
    pub fn replace_items(&self, values: Vec<Value>, what: &str) -> Result<(), EvalError> {
        self.check_structure(what)?;
        *self.0.items.borrow_mut() = values;
        Ok(())
    }
}

impl fmt::Debug for ListHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&Value::List(self.clone()).to_string_repr())
    }
}

/// `index` counted from the end when negative; `None` if out of range.
pub fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let resolved = if index < 0 { len + index } else { index };
    if (0..len).contains(&resolved) {
        usize::try_from(resolved).ok()
    } else {
        None
    }
}
