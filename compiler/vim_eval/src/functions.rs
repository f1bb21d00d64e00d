//! Registry of declared user functions.
//!
//! Functions are keyed by their registered name. Script-local functions
//! (`s:name`) are stored as `<SNR>{script}_name` so two scripts can each
//! have their own `s:helper`. Lambdas are not stored here; they live only in
//! the funcrefs that hold them. Dictionary functions get a numbered name.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use vim_ir::{VarRef, VarScope};
use vim_value::errors::invalid_function_name;
use vim_value::{EvalError, ScriptId, UserFunction};

/// Declared user functions by registered name.
#[derive(Debug, Default)]
pub struct FunctionRegistry {
    functions: FxHashMap<String, Rc<UserFunction>>,
    next_lambda: u32,
    next_anonymous: u32,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Rc<UserFunction>> {
        self.functions.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Store `function` under its name, returning what it replaced.
    pub fn define(&mut self, function: Rc<UserFunction>) -> Option<Rc<UserFunction>> {
        self.functions.insert(function.name.clone(), function)
    }

    pub fn remove(&mut self, name: &str) -> Option<Rc<UserFunction>> {
        self.functions.remove(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.functions.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// `<lambda>1`, `<lambda>2`, ...
    pub fn next_lambda_name(&mut self) -> String {
        self.next_lambda += 1;
        format!("<lambda>{}", self.next_lambda)
    }

    /// `1`, `2`, ... for `function dict.key()`.
    pub fn next_anonymous_name(&mut self) -> String {
        loop {
            self.next_anonymous += 1;
            let name = self.next_anonymous.to_string();
            if !self.functions.contains_key(&name) {
                return name;
            }
        }
    }
}

/// Registry key for a function name as written in a call or declaration.
pub fn registry_key(name: &VarRef, script: ScriptId) -> String {
    match name.scope {
        Some(VarScope::Script) => script_local_name(&name.name, script),
        _ => name.name.clone(),
    }
}

/// `<SNR>{script}_{name}`
pub fn script_local_name(name: &str, script: ScriptId) -> String {
    format!("<SNR>{script}_{name}")
}

/// Check that `name` may be used in `:function`.
///
/// Global functions start with an uppercase letter or carry `g:`; `s:`
/// names may be anything. Autoload style names containing `#` are allowed
/// as written. Other scope prefixes are rejected.
pub fn validate_declared_name(name: &VarRef) -> Result<(), EvalError> {
    let valid_chars = !name.name.is_empty()
        && name
            .name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '#');
    let valid = valid_chars
        && match name.scope {
            Some(VarScope::Script | VarScope::Global) => true,
            Some(_) => false,
            None => {
                name.name.contains('#')
                    || name.name.starts_with(|c: char| c.is_ascii_uppercase())
            }
        };
    if valid {
        Ok(())
    } else {
        Err(invalid_function_name(&name.to_string()))
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vim_ir::FunctionDecl;

    fn function(name: &str) -> Rc<UserFunction> {
        let decl = Rc::new(FunctionDecl::new(name, &[], vec![]));
        Rc::new(UserFunction::new(name, decl, ScriptId(0), None))
    }

    #[test]
    fn define_and_replace() {
        let mut registry = FunctionRegistry::new();
        assert!(registry.define(function("Foo")).is_none());
        assert!(registry.contains("Foo"));
        let old = registry.define(function("Foo")).unwrap();
        assert_eq!(old.name, "Foo");
        assert_eq!(registry.len(), 1);
        assert!(registry.remove("Foo").is_some());
        assert!(registry.is_empty());
    }

    #[test]
    fn script_local_keys() {
        let key = registry_key(&VarRef::parse("s:helper"), ScriptId(4));
        assert_eq!(key, "<SNR>4_helper");
        assert_eq!(registry_key(&VarRef::parse("g:Foo"), ScriptId(4)), "Foo");
        assert_eq!(registry_key(&VarRef::parse("Foo"), ScriptId(4)), "Foo");
    }

    #[test]
    fn generated_names_are_unique() {
        let mut registry = FunctionRegistry::new();
        assert_eq!(registry.next_lambda_name(), "<lambda>1");
        assert_eq!(registry.next_lambda_name(), "<lambda>2");
        registry.define(function("1"));
        assert_eq!(registry.next_anonymous_name(), "2");
    }

    #[test]
    fn declared_names() {
        assert!(validate_declared_name(&VarRef::parse("Foo")).is_ok());
        assert!(validate_declared_name(&VarRef::parse("s:foo")).is_ok());
        assert!(validate_declared_name(&VarRef::parse("g:foo")).is_ok());
        assert!(validate_declared_name(&VarRef::parse("my#auto#fn")).is_ok());
        let err = validate_declared_name(&VarRef::parse("foo")).unwrap_err();
        assert_eq!(err.code(), Some("E128"));
        assert!(validate_declared_name(&VarRef::parse("b:Foo")).is_err());
        assert!(validate_declared_name(&VarRef::parse("Foo-bar")).is_err());
    }

    #[test]
    fn names_are_sorted() {
        let mut registry = FunctionRegistry::new();
        registry.define(function("Zed"));
        registry.define(function("Alpha"));
        assert_eq!(registry.names(), vec!["Alpha", "Zed"]);
    }
}
