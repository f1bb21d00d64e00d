//! Function calls.
//!
//! Every call ends up in [`Interpreter::call_funcref`]: a call by name first
//! resolves the name to a funcref (a variable holding one, then a builtin,
//! then the user function registry). The funcref's bound arguments are
//! prepended, its handle is resolved according to its kind, and the call is
//! dispatched to the builtin table or to a user function body.

use std::rc::Rc;

use smallvec::SmallVec;
use vim_ir::{Callee, Expr, FunctionDecl, FunctionFlags, LineAddress, LineRange, Span, VarRef};
use vim_value::errors::{
    break_outside_loop, continue_outside_loop, dict_function_without_dict, function_deleted,
    not_callable, not_enough_arguments, too_many_arguments, unknown_function,
};
use vim_value::{
    ControlAction, DictHandle, EvalError, EvalResult, FuncrefKind, FuncrefValue, FunctionHandle,
    UserFunction, Value,
};

use super::{Flow, Interpreter};
use crate::builtins;
use crate::environment::Frame;
use crate::functions::registry_key;
use crate::host::EditorContext;

/// Evaluated call arguments; most calls pass only a few.
pub(crate) type Args = SmallVec<[Value; 4]>;

/// What [`Interpreter::call_function`] calls.
#[derive(Clone, Copy, Debug)]
pub enum CallTarget<'a> {
    /// A function name as written in a call: `Foo`, `s:helper`, `len`.
    Name(&'a str),
    Funcref(&'a FuncrefValue),
}

impl<'a> From<&'a str> for CallTarget<'a> {
    fn from(name: &'a str) -> Self {
        CallTarget::Name(name)
    }
}

impl<'a> From<&'a FuncrefValue> for CallTarget<'a> {
    fn from(funcref: &'a FuncrefValue) -> Self {
        CallTarget::Funcref(funcref)
    }
}

impl Interpreter {
    /// Call a function by name or through a funcref.
    pub fn call_function<'a>(
        &mut self,
        target: impl Into<CallTarget<'a>>,
        args: &[Value],
        ctx: &mut dyn EditorContext,
    ) -> EvalResult {
        let result = match target.into() {
            CallTarget::Name(name) => self
                .resolve_named(&VarRef::parse(name), ctx)
                .map_err(ControlAction::from)
                .and_then(|funcref| self.call_funcref(&funcref, args, None, ctx)),
            CallTarget::Funcref(funcref) => self.call_funcref(funcref, args, None, ctx),
        };
        result.map_err(|action| self.annotate(action, Span::DUMMY))
    }

    /// `callee(args)` or `receiver->callee(args)`.
    pub(crate) fn eval_call(
        &mut self,
        callee: &Callee,
        receiver: Option<Value>,
        args: &[Expr],
        ctx: &mut dyn EditorContext,
    ) -> EvalResult {
        let funcref = self.resolve_callee(callee, ctx)?;
        let values = self.eval_args(receiver, args, ctx)?;
        self.call_funcref(&funcref, &values, None, ctx)
    }

    fn eval_args(
        &mut self,
        receiver: Option<Value>,
        args: &[Expr],
        ctx: &mut dyn EditorContext,
    ) -> Result<Args, ControlAction> {
        let mut values = Args::with_capacity(args.len() + 1);
        values.extend(receiver);
        for arg in args {
            values.push(self.eval_expr(arg, ctx)?);
        }
        Ok(values)
    }

    pub(crate) fn resolve_callee(
        &mut self,
        callee: &Callee,
        ctx: &mut dyn EditorContext,
    ) -> Result<Rc<FuncrefValue>, ControlAction> {
        match callee {
            Callee::Named(name) => Ok(self.resolve_named(name, ctx)?),
            Callee::Expr(expr) => match self.eval_expr(expr, ctx)? {
                Value::Funcref(funcref) => Ok(funcref),
                other => Err(not_callable(other.type_name()).into()),
            },
        }
    }

    /// Resolve a function name as written in a call.
    pub(crate) fn resolve_named(
        &mut self,
        name: &VarRef,
        ctx: &mut dyn EditorContext,
    ) -> Result<Rc<FuncrefValue>, EvalError> {
        if let Ok(Some(Value::Funcref(funcref))) = self.lookup_var(name, ctx) {
            return Ok(funcref);
        }
        if name.scope.is_none() {
            if let Some(builtin) = builtins::lookup(&name.name) {
                return Ok(Rc::new(FuncrefValue::new(
                    FunctionHandle::Builtin(builtin.name),
                    FuncrefKind::Function,
                )));
            }
        }
        self.find_function(name)
            .map(|function| {
                Rc::new(FuncrefValue::new(
                    FunctionHandle::User(function),
                    FuncrefKind::Function,
                ))
            })
            .ok_or_else(|| unknown_function(&name.to_string()))
    }

    /// A user function by the name used to call or declare it.
    pub(crate) fn find_function(&self, name: &VarRef) -> Option<Rc<UserFunction>> {
        self.functions
            .get(&registry_key(name, self.env.current_script()))
    }

    /// What a funcref calls right now.
    ///
    /// Deleted functions fail with `E933` whatever the kind. A `function()`
    /// reference looks its name up again, so it sees redefinitions.
    pub(crate) fn resolve_handle(&self, funcref: &FuncrefValue) -> Result<FunctionHandle, EvalError> {
        match &funcref.handle {
            FunctionHandle::User(function) if function.is_deleted() => {
                Err(function_deleted(&function.name))
            }
            FunctionHandle::User(function) if funcref.kind == FuncrefKind::Function => self
                .functions
                .get(&function.name)
                .map(FunctionHandle::User)
                .ok_or_else(|| unknown_function(&function.name)),
            handle => Ok(handle.clone()),
        }
    }

    /// Call a funcref with `args` after its bound arguments.
    ///
    /// `range` is the `:[range]call` line range; `None` binds the cursor
    /// line as `a:firstline` and `a:lastline`.
    pub(crate) fn call_funcref(
        &mut self,
        funcref: &FuncrefValue,
        args: &[Value],
        range: Option<(usize, usize)>,
        ctx: &mut dyn EditorContext,
    ) -> EvalResult {
        let handle = self.resolve_handle(funcref)?;
        let mut all = Args::with_capacity(funcref.arguments.len() + args.len());
        all.extend(funcref.arguments.iter().cloned());
        all.extend(args.iter().cloned());
        match handle {
            FunctionHandle::Builtin(name) => self.call_builtin(name, &all, ctx),
            FunctionHandle::User(function) => {
                self.call_user(&function, &all, funcref.dict.clone(), range, ctx)
            }
        }
    }

    fn call_builtin(
        &mut self,
        name: &'static str,
        args: &[Value],
        ctx: &mut dyn EditorContext,
    ) -> EvalResult {
        let Some(builtin) = builtins::lookup(name) else {
            return Err(unknown_function(name).into());
        };
        builtin.check_arity(args.len())?;
        tracing::trace!(function = name, args = args.len(), "builtin call");
        (builtin.handler)(self, args, ctx)
    }

    #[tracing::instrument(level = "debug", skip_all, fields(function = %function.name))]
    fn call_user(
        &mut self,
        function: &Rc<UserFunction>,
        args: &[Value],
        dict: Option<DictHandle>,
        range: Option<(usize, usize)>,
        ctx: &mut dyn EditorContext,
    ) -> EvalResult {
        let decl = Rc::clone(&function.decl);
        if args.len() < decl.required_params() {
            return Err(not_enough_arguments(&function.name).into());
        }
        if decl.max_params().is_some_and(|max| args.len() > max) {
            return Err(too_many_arguments(&function.name).into());
        }
        let is_dict = decl.flags.contains(FunctionFlags::DICT);
        if is_dict && dict.is_none() {
            return Err(dict_function_without_dict(&function.name).into());
        }

        let frame = Frame::new(Rc::clone(function));
        bind_arguments(&frame, &decl, args);
        if !function.is_lambda() {
            let (first, last) = range.unwrap_or_else(|| {
                let line = ctx.current_line();
                (line, line)
            });
            frame.args.define("firstline", Value::Number(line_number(first)));
            frame.args.define("lastline", Value::Number(line_number(last)));
        }
        if let Some(dict) = dict.filter(|_| is_dict) {
            frame.locals.define("self", Value::Dict(dict));
        }

        let mut scoped = self.enter_call(frame)?;
        scoped.bind_defaults(&decl, args.len(), ctx)?;
        scoped.run_body(&decl.body, decl.is_abort(), ctx)
    }

    /// Evaluate defaults of parameters the caller left out, in the callee.
    fn bind_defaults(
        &mut self,
        decl: &FunctionDecl,
        supplied: usize,
        ctx: &mut dyn EditorContext,
    ) -> Result<(), ControlAction> {
        for param in decl.params.iter().skip(supplied) {
            if let Some(default) = &param.default {
                let value = self.eval_expr(default, ctx)?;
                if let Some(frame) = self.env.frame() {
                    frame.args.define(&param.name, value);
                }
            }
        }
        Ok(())
    }

    /// Run a function body.
    ///
    /// An `abort` function stops at the first error and hands it to the
    /// caller. Otherwise a failing statement is reported and the body goes
    /// on with the next one, whether or not a `:try` is active further up.
    /// `:finish` always unwinds.
    fn run_body(
        &mut self,
        body: &[vim_ir::Stmt],
        abort: bool,
        ctx: &mut dyn EditorContext,
    ) -> EvalResult {
        for stmt in body {
            let misplaced = match self.exec_stmt(stmt, ctx) {
                Ok(Flow::Normal) => continue,
                Ok(Flow::Return(value)) => return Ok(value),
                Ok(Flow::Break) => break_outside_loop(),
                Ok(Flow::Continue) => continue_outside_loop(),
                Err(ControlAction::FinishScript) => return Err(ControlAction::FinishScript),
                Err(ControlAction::Error(err)) => {
                    if abort {
                        return Err(ControlAction::Error(err));
                    }
                    self.report_error(&err);
                    continue;
                }
            };
            let err = misplaced
                .with_span(stmt.span)
                .with_throwpoint(|| self.throwpoint());
            if abort {
                return Err(err.into());
            }
            self.report_error(&err);
        }
        Ok(Value::Number(0))
    }

    /// `:[range]call`: a `range` function is called once for the whole
    /// range, any other function once per line with the cursor on it.
    pub(crate) fn exec_call_stmt(
        &mut self,
        expr: &Expr,
        range: Option<LineRange>,
        ctx: &mut dyn EditorContext,
    ) -> Result<(), ControlAction> {
        let (Some(range), Some((callee, receiver, args))) = (range, call_parts(expr)) else {
            self.eval_expr(expr, ctx)?;
            return Ok(());
        };
        let mut first = line_address(range.start, ctx);
        let mut last = line_address(range.end, ctx);
        if first > last {
            std::mem::swap(&mut first, &mut last);
        }

        let funcref = self.resolve_callee(callee, ctx)?;
        let handles_range = match self.resolve_handle(&funcref)? {
            FunctionHandle::User(function) => function.decl.flags.contains(FunctionFlags::RANGE),
            FunctionHandle::Builtin(_) => false,
        };
        let lines = if handles_range { first..=first } else { first..=last };
        for line in lines {
            if !handles_range {
                ctx.set_current_line(line);
            }
            let receiver = match receiver {
                Some(expr) => Some(self.eval_expr(expr, ctx)?),
                None => None,
            };
            let values = self.eval_args(receiver, args, ctx)?;
            self.call_funcref(&funcref, &values, Some((first, last)), ctx)?;
        }
        Ok(())
    }
}

type CallParts<'e> = (&'e Callee, Option<&'e Expr>, &'e [Expr]);

fn call_parts(expr: &Expr) -> Option<CallParts<'_>> {
    match expr {
        Expr::Call { callee, args } => Some((callee, None, args)),
        Expr::MethodCall {
            receiver,
            callee,
            args,
        } => Some((callee, Some(receiver), args)),
        _ => None,
    }
}

/// Bind positional parameters and, for `...` functions, `a:0`, `a:1`...
/// and `a:000`.
fn bind_arguments(frame: &Frame, decl: &FunctionDecl, args: &[Value]) {
    for (param, value) in decl.params.iter().zip(args) {
        frame.args.define(&param.name, value.clone());
    }
    if !decl.varargs {
        return;
    }
    let extra: Vec<Value> = args.iter().skip(decl.params.len()).cloned().collect();
    frame
        .args
        .define("0", Value::Number(i64::try_from(extra.len()).unwrap_or(i64::MAX)));
    for (i, value) in extra.iter().enumerate() {
        frame.args.define(&(i + 1).to_string(), value.clone());
    }
    let rest = Value::list(extra);
    rest.lock(1);
    frame.args.define("000", rest);
}

fn line_address(address: LineAddress, ctx: &dyn EditorContext) -> usize {
    match address {
        LineAddress::Current => ctx.current_line(),
        LineAddress::Last => ctx.line_count(),
        LineAddress::Number(n) => n,
    }
}

fn line_number(line: usize) -> i64 {
    i64::try_from(line).unwrap_or(i64::MAX)
}
