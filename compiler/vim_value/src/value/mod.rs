//! Runtime values.
//!
//! Numbers, Floats, Strings and Blobs are immutable; Lists and Dictionaries
//! are shared handles with interior mutability, so assignment shares the
//! container the way Vim does. Funcrefs are immutable once created.
//!
//! # Coercion
//!
//! | from \ to  | Number      | Float       | String      | Boolean     |
//! |------------|-------------|-------------|-------------|-------------|
//! | Number     | itself      | exact       | decimal     | `!= 0`      |
//! | Float      | E805        | itself      | E806        | `!= 0.0`    |
//! | String     | leading int | leading int | itself      | via Number  |
//! | List       | E745        | E745        | E730        | E745        |
//! | Dictionary | E728        | E728        | E731        | E728        |
//! | Funcref    | E703        | E703        | E729        | E703        |
//! | Blob       | E974        | E974        | E976        | E974        |

mod copy;
mod dict;
mod funcref;
mod list;
mod lock;
mod render;

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

pub use dict::DictHandle;
pub use funcref::{
    ActiveCall, ClosureScope, FuncrefKind, FuncrefValue, FunctionHandle, ScriptId, UserFunction,
};
pub use list::ListHandle;
pub use list::resolve_index;

use crate::errors::EvalErrorKind;
use crate::number::parse_number;
use crate::EvalError;

/// Runtime value.
#[derive(Clone)]
pub enum Value {
    Number(i64),
    Float(f64),
    String(Rc<str>),
    List(ListHandle),
    Dict(DictHandle),
    Funcref(Rc<FuncrefValue>),
    Blob(Rc<[u8]>),
}

/// The kinds reported by `type()`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ValueType {
    Number,
    String,
    Funcref,
    List,
    Dict,
    Float,
    Blob,
}

impl ValueType {
    /// `type()` result, matching `v:t_number` and friends.
    pub const fn code(self) -> i64 {
        match self {
            ValueType::Number => 0,
            ValueType::String => 1,
            ValueType::Funcref => 2,
            ValueType::List => 3,
            ValueType::Dict => 4,
            ValueType::Float => 5,
            ValueType::Blob => 10,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            ValueType::Number => "Number",
            ValueType::String => "String",
            ValueType::Funcref => "Funcref",
            ValueType::List => "List",
            ValueType::Dict => "Dictionary",
            ValueType::Float => "Float",
            ValueType::Blob => "Blob",
        }
    }
}

// Factory methods

impl Value {
    #[inline]
    pub fn number(n: i64) -> Self {
        Value::Number(n)
    }

    /// Vim has no separate boolean in legacy script: true is 1.
    #[inline]
    pub fn bool(b: bool) -> Self {
        Value::Number(i64::from(b))
    }

    #[inline]
    pub fn float(f: f64) -> Self {
        Value::Float(f)
    }

    #[inline]
    pub fn string(s: impl Into<Rc<str>>) -> Self {
        Value::String(s.into())
    }

    #[inline]
    pub fn empty_string() -> Self {
        Value::String(Rc::from(""))
    }

    #[inline]
    pub fn list(items: Vec<Value>) -> Self {
        Value::List(ListHandle::new(items))
    }

    pub fn dict<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Dict(DictHandle::from_entries(
            entries.into_iter().map(|(k, v)| (k.into(), v)),
        ))
    }

    #[inline]
    pub fn funcref(funcref: FuncrefValue) -> Self {
        Value::Funcref(Rc::new(funcref))
    }

    #[inline]
    pub fn blob(bytes: impl Into<Rc<[u8]>>) -> Self {
        Value::Blob(bytes.into())
    }
}

// Inspection

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Number(_) => ValueType::Number,
            Value::Float(_) => ValueType::Float,
            Value::String(_) => ValueType::String,
            Value::List(_) => ValueType::List,
            Value::Dict(_) => ValueType::Dict,
            Value::Funcref(_) => ValueType::Funcref,
            Value::Blob(_) => ValueType::Blob,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.value_type().name()
    }

    pub fn as_list(&self) -> Option<&ListHandle> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&DictHandle> {
        match self {
            Value::Dict(dict) => Some(dict),
            _ => None,
        }
    }

    pub fn as_funcref(&self) -> Option<&Rc<FuncrefValue>> {
        match self {
            Value::Funcref(funcref) => Some(funcref),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Number, Float, String or Blob.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::List(_) | Value::Dict(_) | Value::Funcref(_))
    }

    /// Container lock flag as reported by `islocked()`.
    pub fn is_locked(&self) -> bool {
        match self {
            Value::List(list) => list.is_locked(),
            Value::Dict(dict) => dict.is_locked(),
            _ => false,
        }
    }
}

// Coercion

impl Value {
    /// Numeric view used by arithmetic and comparison.
    pub fn as_double(&self) -> Result<f64, EvalError> {
        match self {
            Value::Number(n) => Ok(*n as f64),
            Value::Float(f) => Ok(*f),
            Value::String(s) => Ok(parse_number(s) as f64),
            other => Err(other.not_a_number()),
        }
    }

    /// Number view (`toIntegerValue`); a Float is an error, not truncated.
    pub fn as_number(&self) -> Result<i64, EvalError> {
        match self {
            Value::Number(n) => Ok(*n),
            Value::String(s) => Ok(parse_number(s)),
            Value::Float(_) => Err(EvalError::from_kind(EvalErrorKind::FloatAsNumber)),
            other => Err(other.not_a_number()),
        }
    }

    /// String view used by concatenation, dictionary keys and `:throw`.
    pub fn as_string(&self) -> Result<Cow<'_, str>, EvalError> {
        let kind = match self {
            Value::String(s) => return Ok(Cow::Borrowed(s)),
            Value::Number(n) => return Ok(Cow::Owned(n.to_string())),
            Value::Float(_) => EvalErrorKind::FloatAsString,
            Value::List(_) => EvalErrorKind::ListAsString,
            Value::Dict(_) => EvalErrorKind::DictAsString,
            Value::Funcref(_) => EvalErrorKind::FuncrefAsString,
            Value::Blob(_) => EvalErrorKind::BlobAsString,
        };
        Err(EvalError::from_kind(kind))
    }

    /// Truth value for `:if`, `:while`, `!`, `&&` and `||`.
    pub fn as_boolean(&self) -> Result<bool, EvalError> {
        Ok(self.as_double()? != 0.0)
    }

    #[cold]
    fn not_a_number(&self) -> EvalError {
        let kind = match self {
            Value::List(_) => EvalErrorKind::ListAsNumber,
            Value::Dict(_) => EvalErrorKind::DictAsNumber,
            Value::Funcref(_) => EvalErrorKind::FuncrefAsNumber,
            Value::Blob(_) => EvalErrorKind::BlobAsNumber,
            Value::Float(_) => EvalErrorKind::FloatAsNumber,
            Value::Number(_) | Value::String(_) => EvalErrorKind::NumberOrFloatRequired,
        };
        EvalError::from_kind(kind)
    }
}

impl PartialEq for Value {
    /// Structural equality, strict about types (`1 != '1'`) except that
    /// Number and Float compare numerically.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Number(a), Value::Float(b)) | (Value::Float(b), Value::Number(a)) => {
                (*a as f64) == *b
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                a.ptr_eq(b) || (a.len() == b.len() && a.items() == b.items())
            }
            (Value::Dict(a), Value::Dict(b)) => {
                a.ptr_eq(b)
                    || (a.len() == b.len()
                        && a.entries()
                            .iter()
                            .all(|(k, v)| b.get(k).is_some_and(|w| *v == w)))
            }
            (Value::Funcref(a), Value::Funcref(b)) => a == b,
            (Value::Blob(a), Value::Blob(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_repr())
    }
}

/// `:echo` rendering.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_output_string())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::list(items)
    }
}
