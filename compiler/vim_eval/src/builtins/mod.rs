//! Builtin functions.
//!
//! Dispatch is a static table sorted by name, searched with a binary search.
//! The set is fixed (scripts cannot add builtins), so each entry is a plain
//! function pointer with its arity bounds. Arity is checked once, before
//! the handler runs, so handlers index their required arguments directly.

mod collections;
mod conversions;
mod editor;
mod functions;
mod strings;

use vim_value::errors::{list_argument_required, not_enough_arguments, too_many_arguments};
use vim_value::{EvalError, EvalResult, ListHandle, Value};

use crate::host::EditorContext;
use crate::interpreter::Interpreter;

pub(crate) type BuiltinHandler =
    fn(&mut Interpreter, &[Value], &mut dyn EditorContext) -> EvalResult;

/// One builtin: name, arity bounds and handler.
pub(crate) struct BuiltinFunction {
    pub name: &'static str,
    pub min_args: usize,
    /// `None` for no upper bound.
    pub max_args: Option<usize>,
    pub handler: BuiltinHandler,
}

impl BuiltinFunction {
    const fn new(
        name: &'static str,
        min_args: usize,
        max_args: usize,
        handler: BuiltinHandler,
    ) -> Self {
        BuiltinFunction {
            name,
            min_args,
            max_args: Some(max_args),
            handler,
        }
    }

    /// `E119` below the minimum, `E118` above the maximum.
    pub fn check_arity(&self, count: usize) -> Result<(), EvalError> {
        if count < self.min_args {
            return Err(not_enough_arguments(self.name));
        }
        if self.max_args.is_some_and(|max| count > max) {
            return Err(too_many_arguments(self.name));
        }
        Ok(())
    }
}

impl std::fmt::Debug for BuiltinFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuiltinFunction")
            .field("name", &self.name)
            .field("min_args", &self.min_args)
            .field("max_args", &self.max_args)
            .finish_non_exhaustive()
    }
}

/// Every builtin, sorted by name.
static BUILTINS: &[BuiltinFunction] = &[
    BuiltinFunction::new("abs", 1, 1, conversions::abs),
    BuiltinFunction::new("add", 2, 2, collections::add),
    BuiltinFunction::new("call", 2, 3, functions::call),
    BuiltinFunction::new("col", 1, 2, editor::col),
    BuiltinFunction::new("copy", 1, 1, collections::copy),
    BuiltinFunction::new("deepcopy", 1, 2, collections::deepcopy),
    BuiltinFunction::new("empty", 1, 1, collections::empty),
    BuiltinFunction::new("eval", 1, 1, functions::eval),
    BuiltinFunction::new("exists", 1, 1, functions::exists),
    BuiltinFunction::new("extend", 2, 3, collections::extend),
    BuiltinFunction::new("filter", 2, 2, collections::filter),
    BuiltinFunction::new("float2nr", 1, 1, conversions::float2nr),
    BuiltinFunction::new("funcref", 1, 3, functions::funcref),
    BuiltinFunction::new("function", 1, 3, functions::function),
    BuiltinFunction::new("get", 2, 3, collections::get),
    BuiltinFunction::new("getline", 1, 2, editor::getline),
    BuiltinFunction::new("has_key", 2, 2, collections::has_key),
    BuiltinFunction::new("index", 2, 4, collections::index),
    BuiltinFunction::new("insert", 2, 3, collections::insert),
    BuiltinFunction::new("islocked", 1, 1, functions::islocked),
    BuiltinFunction::new("items", 1, 1, collections::items),
    BuiltinFunction::new("join", 1, 2, strings::join),
    BuiltinFunction::new("keys", 1, 1, collections::keys),
    BuiltinFunction::new("len", 1, 1, collections::len),
    BuiltinFunction::new("line", 1, 2, editor::line),
    BuiltinFunction::new("map", 2, 2, collections::map),
    BuiltinFunction::new("max", 1, 1, collections::max),
    BuiltinFunction::new("min", 1, 1, collections::min),
    BuiltinFunction::new("range", 1, 3, collections::range),
    BuiltinFunction::new("remove", 2, 3, collections::remove),
    BuiltinFunction::new("repeat", 2, 2, strings::repeat),
    BuiltinFunction::new("reverse", 1, 1, collections::reverse),
    BuiltinFunction::new("sort", 1, 3, collections::sort),
    BuiltinFunction::new("str2float", 1, 2, conversions::str2float),
    BuiltinFunction::new("str2nr", 1, 3, conversions::str2nr),
    BuiltinFunction::new("stridx", 2, 3, strings::stridx),
    BuiltinFunction::new("string", 1, 1, conversions::string),
    BuiltinFunction::new("strlen", 1, 1, strings::strlen),
    BuiltinFunction::new("tolower", 1, 1, strings::tolower),
    BuiltinFunction::new("toupper", 1, 1, strings::toupper),
    BuiltinFunction::new("type", 1, 1, conversions::type_of),
    BuiltinFunction::new("values", 1, 1, collections::values),
];

/// The builtin called `name`.
pub(crate) fn lookup(name: &str) -> Option<&'static BuiltinFunction> {
    BUILTINS
        .binary_search_by(|builtin| builtin.name.cmp(name))
        .ok()
        .and_then(|index| BUILTINS.get(index))
}

/// Names of all builtin functions, sorted.
pub fn builtin_names() -> impl Iterator<Item = &'static str> {
    BUILTINS.iter().map(|builtin| builtin.name)
}

pub fn is_builtin(name: &str) -> bool {
    lookup(name).is_some()
}

// Argument helpers

/// List argument, `E686` naming `function` otherwise.
fn list_arg<'a>(function: &str, value: &'a Value) -> Result<&'a ListHandle, EvalError> {
    value
        .as_list()
        .ok_or_else(|| list_argument_required(function))
}

/// Optional argument `index` as a Number, `default` when absent.
fn number_arg(args: &[Value], index: usize, default: i64) -> Result<i64, EvalError> {
    args.get(index).map_or(Ok(default), Value::as_number)
}

/// Optional boolean flag argument.
fn flag_arg(args: &[Value], index: usize) -> Result<bool, EvalError> {
    args.get(index).map_or(Ok(false), Value::as_boolean)
}

fn number(n: usize) -> Value {
    Value::Number(i64::try_from(n).unwrap_or(i64::MAX))
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
