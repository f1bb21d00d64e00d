//! The editor the interpreter runs inside.
//!
//! Buffers, windows, options, registers and the environment belong to the
//! host. The interpreter reaches them only through [`EditorContext`], which
//! is threaded through every evaluation call. [`MemoryEditor`] is a complete
//! in-memory implementation for tests and headless use.

use rustc_hash::FxHashMap;
use vim_ir::{OptionScope, VarScope};
use vim_value::errors::unknown_option;
use vim_value::{DictHandle, EvalError, Value};

/// Variable scopes owned by the editor rather than the interpreter.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum HostScope {
    /// `b:`
    Buffer,
    /// `w:`
    Window,
    /// `t:`
    Tab,
}

impl HostScope {
    pub fn from_var_scope(scope: VarScope) -> Option<Self> {
        match scope {
            VarScope::Buffer => Some(HostScope::Buffer),
            VarScope::Window => Some(HostScope::Window),
            VarScope::Tab => Some(HostScope::Tab),
            _ => None,
        }
    }
}

/// Editor capabilities used by the runtime.
///
/// Lines and columns are 1-based, as scripts see them.
pub trait EditorContext {
    /// Line the cursor is on.
    fn current_line(&self) -> usize;

    /// Move the cursor to `line` (clamped by the editor).
    fn set_current_line(&mut self, line: usize);

    /// Number of lines in the current buffer.
    fn line_count(&self) -> usize;

    /// Text of `line`, `None` when out of range.
    fn line_text(&self, line: usize) -> Option<String>;

    /// Byte column of the cursor.
    fn cursor_column(&self) -> usize;

    /// The dictionary behind `b:`, `w:` or `t:` for the current buffer,
    /// window or tab page.
    fn scope_variables(&self, scope: HostScope) -> DictHandle;

    /// Value of `&name`, `None` for unknown options.
    fn option(&self, name: &str, scope: OptionScope) -> Option<Value>;

    /// `:let &name = value`.
    fn set_option(&mut self, name: &str, scope: OptionScope, value: &Value)
        -> Result<(), EvalError>;

    /// Contents of register `@name`, `None` when it was never set.
    fn register(&self, name: char) -> Option<String>;

    fn set_register(&mut self, name: char, text: &str);

    /// `$NAME`, `None` when unset.
    fn env_var(&self, name: &str) -> Option<String>;

    fn set_env_var(&mut self, name: &str, value: &str);
}

/// An editor holding a single buffer in memory.
pub struct MemoryEditor {
    lines: Vec<String>,
    cursor_line: usize,
    cursor_column: usize,
    buffer_vars: DictHandle,
    window_vars: DictHandle,
    tab_vars: DictHandle,
    global_options: FxHashMap<String, Value>,
    local_options: FxHashMap<String, Value>,
    registers: FxHashMap<char, String>,
    env: FxHashMap<String, String>,
}

/// Options a fresh [`MemoryEditor`] knows, with their defaults.
const DEFAULT_OPTIONS: [(&str, i64); 5] = [
    ("ignorecase", 0),
    ("shiftwidth", 8),
    ("tabstop", 8),
    ("textwidth", 0),
    ("expandtab", 0),
];

impl MemoryEditor {
    /// Empty buffer: one empty line.
    pub fn new() -> Self {
        Self::with_lines(std::iter::empty::<&str>())
    }

    /// Buffer holding `lines`, cursor on line 1 column 1.
    pub fn with_lines<S: Into<String>>(lines: impl IntoIterator<Item = S>) -> Self {
        let mut lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        if lines.is_empty() {
            lines.push(String::new());
        }
        let global_options = DEFAULT_OPTIONS
            .iter()
            .map(|(name, value)| ((*name).to_string(), Value::Number(*value)))
            .chain(std::iter::once((
                "filetype".to_string(),
                Value::empty_string(),
            )))
            .collect();
        MemoryEditor {
            lines,
            cursor_line: 1,
            cursor_column: 1,
            buffer_vars: DictHandle::new(),
            window_vars: DictHandle::new(),
            tab_vars: DictHandle::new(),
            global_options,
            local_options: FxHashMap::default(),
            registers: FxHashMap::default(),
            env: FxHashMap::default(),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn set_cursor_column(&mut self, column: usize) {
        self.cursor_column = column.max(1);
    }
}

impl Default for MemoryEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorContext for MemoryEditor {
    fn current_line(&self) -> usize {
        self.cursor_line
    }

    fn set_current_line(&mut self, line: usize) {
        self.cursor_line = line.clamp(1, self.lines.len());
    }

    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line_text(&self, line: usize) -> Option<String> {
        line.checked_sub(1)
            .and_then(|index| self.lines.get(index))
            .cloned()
    }

    fn cursor_column(&self) -> usize {
        self.cursor_column
    }

    fn scope_variables(&self, scope: HostScope) -> DictHandle {
        match scope {
            HostScope::Buffer => self.buffer_vars.clone(),
            HostScope::Window => self.window_vars.clone(),
            HostScope::Tab => self.tab_vars.clone(),
        }
    }

    fn option(&self, name: &str, scope: OptionScope) -> Option<Value> {
        let local = || self.local_options.get(name).cloned();
        let global = || self.global_options.get(name).cloned();
        match scope {
            // Options without a local value read the global one through `&l:`.
            OptionScope::Effective | OptionScope::Local => local().or_else(global),
            OptionScope::Global => global(),
        }
    }

    fn set_option(
        &mut self,
        name: &str,
        scope: OptionScope,
        value: &Value,
    ) -> Result<(), EvalError> {
        let Some(current) = self.global_options.get(name) else {
            return Err(unknown_option(name));
        };
        let converted = match current {
            Value::Number(_) => Value::Number(value.as_number()?),
            _ => Value::string(value.as_string()?),
        };
        match scope {
            OptionScope::Local => {
                self.local_options.insert(name.to_string(), converted);
            }
            OptionScope::Global => {
                self.global_options.insert(name.to_string(), converted);
            }
            OptionScope::Effective => {
                self.local_options.remove(name);
                self.global_options.insert(name.to_string(), converted);
            }
        }
        Ok(())
    }

    fn register(&self, name: char) -> Option<String> {
        self.registers.get(&name).cloned()
    }

    fn set_register(&mut self, name: char, text: &str) {
        self.registers.insert(name, text.to_string());
    }

    fn env_var(&self, name: &str) -> Option<String> {
        self.env.get(name).cloned()
    }

    fn set_env_var(&mut self, name: &str, value: &str) {
        self.env.insert(name.to_string(), value.to_string());
    }
}
