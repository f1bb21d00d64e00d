//! Text renderings of values.
//!
//! `to_output_string` is what `:echo` prints; `to_string_repr` is what
//! `string()` returns and what nested items inside a List or Dictionary
//! look like. Containers that contain themselves print as `[...]` / `{...}`
//! at the point of recursion.

use std::fmt::Write;

use smallvec::SmallVec;
use vim_stack::ensure_sufficient_stack;

use super::{FuncrefValue, Value};
use crate::number::format_float;

/// Containers currently being rendered, innermost last.
type Path = SmallVec<[usize; 8]>;

impl Value {
    /// `:echo` form: Strings unquoted, Funcrefs by name, everything else as
    /// [`Value::to_string_repr`].
    pub fn to_output_string(&self) -> String {
        match self {
            Value::String(s) => s.to_string(),
            Value::Funcref(funcref) => funcref.name().to_string(),
            _ => self.to_string_repr(),
        }
    }

    /// `string()` form: Strings single-quoted, Funcrefs as `function('...')`.
    pub fn to_string_repr(&self) -> String {
        let mut out = String::new();
        write_repr(self, &mut out, &mut Path::new());
        out
    }
}

fn write_repr(value: &Value, out: &mut String, path: &mut Path) {
    ensure_sufficient_stack(|| match value {
        Value::Number(n) => {
            let _ = write!(out, "{n}");
        }
        Value::Float(f) => out.push_str(&format_float(*f)),
        Value::String(s) => write_quoted(s, out),
        Value::List(list) => {
            if path.contains(&list.id()) {
                out.push_str("[...]");
                return;
            }
            path.push(list.id());
            out.push('[');
            for (i, item) in list.items().iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_repr(item, out, path);
            }
            out.push(']');
            path.pop();
        }
        Value::Dict(dict) => {
            if path.contains(&dict.id()) {
                out.push_str("{...}");
                return;
            }
            path.push(dict.id());
            out.push('{');
            for (i, (key, item)) in dict.entries().iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_quoted(key, out);
                out.push_str(": ");
                write_repr(item, out, path);
            }
            out.push('}');
            path.pop();
        }
        Value::Funcref(funcref) => write_funcref(funcref, out, path),
        Value::Blob(bytes) => {
            out.push_str("0z");
            for (i, byte) in bytes.iter().enumerate() {
                if i > 0 && i % 4 == 0 {
                    out.push('.');
                }
                let _ = write!(out, "{byte:02X}");
            }
        }
    });
}

fn write_quoted(text: &str, out: &mut String) {
    out.push('\'');
    for ch in text.chars() {
        if ch == '\'' {
            out.push('\'');
        }
        out.push(ch);
    }
    out.push('\'');
}

fn write_funcref(funcref: &FuncrefValue, out: &mut String, path: &mut Path) {
    out.push_str("function(");
    write_quoted(funcref.name(), out);
    if !funcref.arguments.is_empty() {
        out.push_str(", [");
        for (i, arg) in funcref.arguments.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            write_repr(arg, out, path);
        }
        out.push(']');
    }
    if let Some(dict) = &funcref.dict {
        out.push_str(", ");
        write_repr(&Value::Dict(dict.clone()), out, path);
    }
    out.push(')');
}
