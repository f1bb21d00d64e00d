//! Stack growth guard for recursive evaluation.
//!
//! Expression evaluation, statement execution, value rendering and deep
//! copies all recurse over user-controlled structure: a script can nest
//! lists a thousand levels deep or call a function recursively until
//! `'maxfuncdepth'` trips. Each of those recursion points is wrapped in
//! [`ensure_sufficient_stack`] so the host thread never overflows before
//! the interpreter gets the chance to raise a proper error.
//!
//! On native targets the `stacker` crate allocates a fresh segment when the
//! remaining stack drops below [`RED_ZONE`]. On wasm the guard is a plain
//! call.

/// Remaining stack below which a new segment is allocated (128KB).
///
/// A single user function frame goes through statement execution, expression
/// evaluation and argument binding before reaching the next guard, so the
/// red zone is sized above one such round trip.
pub const RED_ZONE: usize = 128 * 1024;

/// Size of each freshly allocated stack segment (1MB).
pub const SEGMENT_SIZE: usize = 1024 * 1024;

/// Run `f`, growing the stack first if less than [`RED_ZONE`] remains.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}

/// Run `f` directly; wasm manages its own stack.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// Remaining stack in bytes, if the platform can report it.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn remaining_stack() -> Option<usize> {
    stacker::remaining_stack()
}

/// Remaining stack in bytes; unknown on wasm.
#[inline]
#[cfg(target_arch = "wasm32")]
pub fn remaining_stack() -> Option<usize> {
    None
}

#[cfg(test)]
mod tests;
