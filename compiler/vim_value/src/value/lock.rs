//! Two-level lock flags shared by List and Dictionary.

use std::cell::Cell;

/// `:lockvar` state of a container.
///
/// `locked` forbids adding and removing items; `items_locked` additionally
/// forbids replacing them. Depth 1 sets the first flag, depth 2 and above
/// set both.
#[derive(Debug, Default)]
pub(crate) struct LockState {
    locked: Cell<bool>,
    items_locked: Cell<bool>,
}

impl LockState {
    pub(crate) fn is_locked(&self) -> bool {
        self.locked.get()
    }

    pub(crate) fn items_locked(&self) -> bool {
        self.items_locked.get()
    }

    pub(crate) fn apply(&self, depth: u32, lock: bool) {
        if depth == 0 {
            return;
        }
        self.locked.set(lock);
        if depth > 1 {
            self.items_locked.set(lock);
        }
    }
}
