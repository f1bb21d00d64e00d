//! Copying and locking nested values.
//!
//! Both walks remember the containers they have visited, so shared and
//! cyclic structures are handled: a copy of a list that contains itself
//! contains the copy, and locking a cycle terminates.

use rustc_hash::{FxHashMap, FxHashSet};
use vim_stack::ensure_sufficient_stack;

use super::{DictHandle, ListHandle, Value};
use crate::errors::copy_too_deep;
use crate::EvalError;

impl Value {
    /// Copy `level` container layers; deeper items stay shared.
    ///
    /// Level 0 returns the same reference, level 1 is `copy()`, and
    /// `usize::MAX` is a full `deepcopy()`. Copies start out unlocked.
    pub fn deep_copy(&self, level: usize) -> Value {
        let mut copier = Copier::new(usize::MAX);
        copier
            .copy(self, level, 0)
            .unwrap_or_else(|_| self.clone())
    }

    /// [`Value::deep_copy`] that fails with `E698` once containers nest
    /// deeper than `max_depth`.
    pub fn deep_copy_limited(&self, level: usize, max_depth: usize) -> Result<Value, EvalError> {
        Copier::new(max_depth).copy(self, level, 0)
    }

    /// Apply `:lockvar {depth}` to the value itself.
    ///
    /// Depth 1 locks the container, depth 2 also its items, and each further
    /// level recurses into nested containers.
    pub fn lock(&self, depth: u32) {
        set_lock(self, depth, true, &mut FxHashSet::default());
    }

    /// Apply `:unlockvar {depth}`.
    pub fn unlock(&self, depth: u32) {
        set_lock(self, depth, false, &mut FxHashSet::default());
    }
}

struct Copier {
    /// Source container id to its copy.
    copies: FxHashMap<usize, Value>,
    max_depth: usize,
}

impl Copier {
    fn new(max_depth: usize) -> Self {
        Copier {
            copies: FxHashMap::default(),
            max_depth,
        }
    }

    fn copy(&mut self, value: &Value, level: usize, depth: usize) -> Result<Value, EvalError> {
        if level == 0 {
            return Ok(value.clone());
        }
        match value {
            Value::List(list) => {
                if let Some(done) = self.copies.get(&list.id()) {
                    return Ok(done.clone());
                }
                if depth >= self.max_depth {
                    return Err(copy_too_deep());
                }
                let fresh = ListHandle::new(Vec::with_capacity(list.len()));
                self.copies.insert(list.id(), Value::List(fresh.clone()));
                let mut items = Vec::with_capacity(list.len());
                for item in list.items() {
                    items.push(ensure_sufficient_stack(|| {
                        self.copy(&item, level - 1, depth + 1)
                    })?);
                }
                fresh.replace_items(items, "copy")?;
                Ok(Value::List(fresh))
            }
            Value::Dict(dict) => {
                if let Some(done) = self.copies.get(&dict.id()) {
                    return Ok(done.clone());
                }
                if depth >= self.max_depth {
                    return Err(copy_too_deep());
                }
                let fresh = DictHandle::new();
                self.copies.insert(dict.id(), Value::Dict(fresh.clone()));
                for (key, item) in dict.entries() {
                    let copied = ensure_sufficient_stack(|| {
                        self.copy(&item, level - 1, depth + 1)
                    })?;
                    fresh.define(&key, copied);
                }
                Ok(Value::Dict(fresh))
            }
            scalar => Ok(scalar.clone()),
        }
    }
}

fn set_lock(value: &Value, depth: u32, lock: bool, seen: &mut FxHashSet<usize>) {
    if depth == 0 {
        return;
    }
    ensure_sufficient_stack(|| match value {
        Value::List(list) => {
            if !seen.insert(list.id()) {
                return;
            }
            list.apply_lock(depth, lock);
            if depth > 1 {
                for item in list.items() {
                    set_lock(&item, depth - 1, lock, seen);
                }
            }
        }
        Value::Dict(dict) => {
            if !seen.insert(dict.id()) {
                return;
            }
            dict.apply_lock(depth, lock);
            if depth > 1 {
                for item in dict.values() {
                    set_lock(&item, depth - 1, lock, seen);
                }
            }
        }
        _ => {}
    });
}
