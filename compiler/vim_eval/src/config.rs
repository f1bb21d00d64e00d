//! Interpreter settings.
//!
//! The subset of editor options the runtime itself consults. Hosts set them
//! through [`crate::InterpreterBuilder`]; they do not change during a run.

/// Vim's default `'maxfuncdepth'`.
pub const DEFAULT_MAX_FUNCTION_DEPTH: usize = 100;

/// Nesting limit for `deepcopy()`.
pub const DEFAULT_MAX_COPY_DEPTH: usize = 100;

/// Runtime settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InterpreterConfig {
    /// `'maxfuncdepth'`: user function calls nested deeper raise `E132`.
    pub max_function_depth: usize,
    /// Containers nested deeper than this make `deepcopy()` raise `E698`.
    pub max_copy_depth: usize,
    /// `'ignorecase'`: applies to comparisons written without `#` or `?`.
    pub ignore_case: bool,
}

impl InterpreterConfig {
    /// Call depth limit handed to the call stack.
    #[inline]
    pub fn max_recursion_depth(&self) -> Option<usize> {
        Some(self.max_function_depth)
    }
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        InterpreterConfig {
            max_function_depth: DEFAULT_MAX_FUNCTION_DEPTH,
            max_copy_depth: DEFAULT_MAX_COPY_DEPTH,
            ignore_case: false,
        }
    }
}
