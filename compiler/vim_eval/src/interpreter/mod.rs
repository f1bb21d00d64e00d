//! Tree-walking interpreter for Vim script.
//!
//! One [`Interpreter`] holds all session state: the variable scopes, the
//! function registry, the call stack and the host-facing collaborators. The
//! editor is not owned; it is passed to every entry point as a
//! `&mut dyn EditorContext`.
//!
//! Statement execution threads a [`Flow`] signal (`:break`, `:continue`,
//! `:return`) separately from the error channel ([`ControlAction`]). The two
//! only meet at function and script boundaries, where a stray `:break` or
//! `:continue` becomes `E587`/`E586`.

mod assign;
mod builder;
mod call;
mod expr;
mod scope_guard;
mod stmt;

use std::rc::Rc;

use rustc_hash::FxHashMap;
use vim_ir::{Expr, FunctionDecl, Script, Span, Stmt};
use vim_value::{
    ControlAction, DictHandle, EvalError, EvalResult, ScriptId, UserFunction, Value,
};

use crate::collaborators::{ExpressionParser, PatternMatcher};
use crate::config::InterpreterConfig;
use crate::diagnostics::CallStack;
use crate::environment::Environment;
use crate::functions::FunctionRegistry;
use crate::host::EditorContext;
use crate::output::SharedOutputHandler;

pub use builder::InterpreterBuilder;
pub use call::CallTarget;
pub(crate) use stmt::is_plain_lookup;

/// Script name used for statements run through [`Interpreter::execute`].
const COMMAND_LINE: &str = "command line";

/// Statement-level control flow other than errors.
#[derive(Clone, Debug)]
pub(crate) enum Flow {
    Normal,
    Break,
    Continue,
    Return(Value),
}

pub(crate) type ExecResult = Result<Flow, ControlAction>;

/// Signal left by a statement list, as seen by the host.
#[derive(Clone, Debug)]
pub enum ExecutionResult {
    Success,
    Break,
    Continue,
    Return(Value),
    Error(ControlAction),
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Success)
    }

    /// The error, if execution stopped on one.
    pub fn error(&self) -> Option<&EvalError> {
        match self {
            ExecutionResult::Error(action) => action.as_error(),
            _ => None,
        }
    }
}

impl From<ExecResult> for ExecutionResult {
    fn from(result: ExecResult) -> Self {
        match result {
            Ok(Flow::Normal) => ExecutionResult::Success,
            Ok(Flow::Break) => ExecutionResult::Break,
            Ok(Flow::Continue) => ExecutionResult::Continue,
            Ok(Flow::Return(value)) => ExecutionResult::Return(value),
            Err(action) => ExecutionResult::Error(action),
        }
    }
}

/// Vim script interpreter.
pub struct Interpreter {
    pub(crate) env: Environment,
    pub(crate) functions: FunctionRegistry,
    pub(crate) config: InterpreterConfig,
    pub(crate) output: SharedOutputHandler,
    pub(crate) matcher: Box<dyn PatternMatcher>,
    pub(crate) parser: Option<Box<dyn ExpressionParser>>,
    pub(crate) call_stack: CallStack,
    /// Script ids by script name.
    scripts: FxHashMap<String, ScriptId>,
    script_name: String,
    /// Line of the top-level statement executing now.
    script_line: u32,
    error_flag: bool,
}

impl Interpreter {
    /// Interpreter with default settings, printing to stdout.
    pub fn new() -> Self {
        InterpreterBuilder::new().build()
    }

    pub fn builder() -> InterpreterBuilder {
        InterpreterBuilder::new()
    }

    /// Run a statement list and return the signal it ends with.
    ///
    /// Execution stops at the first statement that does not complete
    /// normally, including on error. Use [`Interpreter::run_script`] for
    /// the sourcing behaviour that reports errors and keeps going.
    pub fn execute(&mut self, stmts: &[Stmt], ctx: &mut dyn EditorContext) -> ExecutionResult {
        self.exec_block(stmts, ctx).into()
    }

    /// Evaluate one expression.
    pub fn evaluate(&mut self, expr: &Expr, ctx: &mut dyn EditorContext) -> EvalResult {
        self.eval_expr(expr, ctx)
            .map_err(|action| self.annotate(action, Span::DUMMY))
    }

    /// Register a `:function` declaration.
    pub fn declare_function(
        &mut self,
        decl: &Rc<FunctionDecl>,
        ctx: &mut dyn EditorContext,
    ) -> Result<(), ControlAction> {
        self.declare(decl, ctx)
    }

    /// Whether an error was reported since the last call, clearing the flag.
    pub fn take_error_flag(&mut self) -> bool {
        std::mem::take(&mut self.error_flag)
    }

    pub fn global(&self, name: &str) -> Option<Value> {
        self.env.globals().get(name)
    }

    pub fn set_global(&self, name: &str, value: Value) {
        self.env.globals().define(name, value);
    }

    /// `g:`
    pub fn globals(&self) -> &DictHandle {
        self.env.globals()
    }

    /// A `v:` variable.
    pub fn vim_var(&self, name: &str) -> Option<Value> {
        self.env.vim_vars().get(name)
    }

    /// A declared function by registered name (`Foo`, `<SNR>1_bar`).
    pub fn function(&self, name: &str) -> Option<Rc<UserFunction>> {
        self.functions.get(name)
    }

    pub fn function_names(&self) -> Vec<String> {
        self.functions.names()
    }

    pub fn output(&self) -> &SharedOutputHandler {
        &self.output
    }

    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// Id assigned to a script name, allocating one on first use.
    fn script_id(&mut self, name: &str) -> ScriptId {
        let next = ScriptId(u32::try_from(self.scripts.len() + 1).unwrap_or(u32::MAX));
        *self.scripts.entry(name.to_string()).or_insert(next)
    }

    /// `v:throwpoint` text for the statement executing now.
    pub(crate) fn throwpoint(&self) -> String {
        self.call_stack.throwpoint(&self.script_name, self.script_line)
    }

    /// Record the executing statement's line for throwpoints.
    pub(crate) fn set_line(&mut self, span: Span) {
        if span.is_dummy() {
            return;
        }
        if self.call_stack.is_empty() {
            self.script_line = span.line;
        } else {
            self.call_stack.set_line(span);
        }
    }

    /// Attach location details to an error leaving a statement.
    pub(crate) fn annotate(&self, action: ControlAction, span: Span) -> ControlAction {
        match action {
            ControlAction::Error(err) => {
                let mut err = *err;
                if !span.is_dummy() {
                    err = err.with_span(span);
                }
                ControlAction::Error(Box::new(err.with_throwpoint(|| self.throwpoint())))
            }
            ControlAction::FinishScript => ControlAction::FinishScript,
        }
    }

    /// Show an error the script did not handle and keep going.
    pub(crate) fn report_error(&mut self, err: &EvalError) {
        let message = if err.is_thrown() {
            format!("E605: Exception not caught: {}", err.message)
        } else {
            err.message.clone()
        };
        tracing::debug!(
            error = %message,
            throwpoint = err.throwpoint.as_deref().unwrap_or(""),
            "error reported"
        );
        self.output.error(&message);
        self.env.set_vim_var("errmsg", Value::string(message));
        self.error_flag = true;
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Interpreter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interpreter")
            .field("script", &self.script_name)
            .field("depth", &self.call_stack.depth())
            .field("functions", &self.functions.len())
            .finish_non_exhaustive()
    }
}

impl Interpreter {
    /// Source a script: run every top-level statement, reporting errors
    /// instead of stopping, until the end or `:finish`.
    ///
    /// Running a script name again reuses its `s:` variables and
    /// script-local functions.
    #[tracing::instrument(level = "debug", skip_all, fields(script = %script.name))]
    pub fn run_script(&mut self, script: &Script, ctx: &mut dyn EditorContext) {
        let id = self.script_id(&script.name);
        let previous_script = self.env.enter_script(id);
        let previous_name = std::mem::replace(&mut self.script_name, script.name.clone());
        let previous_line = std::mem::take(&mut self.script_line);

        self.run_top_level(&script.body, ctx);

        self.script_line = previous_line;
        self.script_name = previous_name;
        self.env.enter_script(previous_script);
    }

    fn run_top_level(&mut self, body: &[Stmt], ctx: &mut dyn EditorContext) {
        for stmt in body {
            let misplaced = match self.exec_stmt(stmt, ctx) {
                Ok(Flow::Normal) => continue,
                Ok(Flow::Break) => vim_value::errors::break_outside_loop(),
                Ok(Flow::Continue) => vim_value::errors::continue_outside_loop(),
                Ok(Flow::Return(_)) => vim_value::errors::return_outside_function(),
                Err(ControlAction::FinishScript) => {
                    tracing::trace!("script finished early");
                    return;
                }
                Err(ControlAction::Error(err)) => {
                    self.report_error(&err);
                    continue;
                }
            };
            let err = misplaced
                .with_span(stmt.span)
                .with_throwpoint(|| self.throwpoint());
            self.report_error(&err);
        }
    }
}

impl Default for InterpreterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
