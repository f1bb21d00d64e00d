//! `InterpreterBuilder` for creating Interpreter instances with various configurations.

use rustc_hash::FxHashMap;

use super::{Interpreter, COMMAND_LINE};
use crate::collaborators::{ExpressionParser, PatternMatcher, SubstringMatcher};
use crate::config::InterpreterConfig;
use crate::diagnostics::CallStack;
use crate::environment::Environment;
use crate::functions::FunctionRegistry;
use crate::output::{stdout_handler, SharedOutputHandler};

/// Builder for [`Interpreter`].
///
/// Defaults: Vim's `'maxfuncdepth'` of 100, case-sensitive comparisons,
/// output to stdout, [`SubstringMatcher`] for patterns, and no expression
/// parser (so `eval()` and string arguments to `map()`/`filter()` fail).
pub struct InterpreterBuilder {
    config: InterpreterConfig,
    output: Option<SharedOutputHandler>,
    matcher: Option<Box<dyn PatternMatcher>>,
    parser: Option<Box<dyn ExpressionParser>>,
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        Self {
            config: InterpreterConfig::default(),
            output: None,
            matcher: None,
            parser: None,
        }
    }

    /// Replace every setting at once.
    #[must_use]
    pub fn config(mut self, config: InterpreterConfig) -> Self {
        self.config = config;
        self
    }

    /// `'maxfuncdepth'`
    #[must_use]
    pub fn max_function_depth(mut self, depth: usize) -> Self {
        self.config.max_function_depth = depth;
        self
    }

    #[must_use]
    pub fn max_copy_depth(mut self, depth: usize) -> Self {
        self.config.max_copy_depth = depth;
        self
    }

    /// `'ignorecase'`
    #[must_use]
    pub fn ignore_case(mut self, ignore: bool) -> Self {
        self.config.ignore_case = ignore;
        self
    }

    /// Where `:echo`, `:echomsg` and error reports go.
    #[must_use]
    pub fn output(mut self, handler: SharedOutputHandler) -> Self {
        self.output = Some(handler);
        self
    }

    #[must_use]
    pub fn matcher(mut self, matcher: impl PatternMatcher + 'static) -> Self {
        self.matcher = Some(Box::new(matcher));
        self
    }

    #[must_use]
    pub fn parser(mut self, parser: impl ExpressionParser + 'static) -> Self {
        self.parser = Some(Box::new(parser));
        self
    }

    pub fn build(self) -> Interpreter {
        let call_stack = CallStack::new(self.config.max_recursion_depth());
        Interpreter {
            env: Environment::new(),
            functions: FunctionRegistry::new(),
            output: self.output.unwrap_or_else(stdout_handler),
            matcher: self.matcher.unwrap_or_else(|| Box::new(SubstringMatcher)),
            parser: self.parser,
            call_stack,
            config: self.config,
            scripts: FxHashMap::default(),
            script_name: COMMAND_LINE.to_string(),
            script_line: 0,
            error_flag: false,
        }
    }
}
