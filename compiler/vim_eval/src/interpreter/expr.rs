//! Expression evaluation.

use std::rc::Rc;

use vim_ir::{BinaryOp, Expr, LambdaExpr, VarRef, VarScope};
use vim_stack::ensure_sufficient_stack;
use vim_value::errors::{
    dict_required, illegal_variable_name, key_not_present, undefined_variable, unknown_option,
};
use vim_value::{
    DictHandle, EvalError, EvalResult, FuncrefKind, FuncrefValue, FunctionHandle, UserFunction,
    Value,
};

use super::Interpreter;
use crate::environment::ScopeLookup;
use crate::host::{EditorContext, HostScope};
use crate::indexing::{index_value, slice_value};
use crate::operators::evaluate_binary;
use crate::unary_operators::evaluate_unary;

impl Interpreter {
    /// Evaluate an expression.
    pub(crate) fn eval_expr(&mut self, expr: &Expr, ctx: &mut dyn EditorContext) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_expr_inner(expr, ctx))
    }

    fn eval_expr_inner(&mut self, expr: &Expr, ctx: &mut dyn EditorContext) -> EvalResult {
        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Float(f) => Ok(Value::Float(*f)),
            Expr::String(s) => Ok(Value::string(s.as_str())),
            Expr::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval_expr(item, ctx)?);
                }
                Ok(Value::list(values))
            }
            Expr::Dict(entries) => {
                let dict = DictHandle::new();
                for (key, value) in entries {
                    let key = self.eval_expr(key, ctx)?;
                    let key = key.as_string()?.into_owned();
                    let value = self.eval_expr(value, ctx)?;
                    dict.define(&key, value);
                }
                Ok(Value::Dict(dict))
            }
            Expr::Var(var) => Ok(self.read_var(var, ctx)?),
            Expr::ScopeDict(scope) => {
                Ok(Value::Dict(self.scope_dict(*scope, &scope.to_string(), ctx)?))
            }
            Expr::Option { name, scope } => Ok(ctx
                .option(name, *scope)
                .ok_or_else(|| unknown_option(&format!("&{}{name}", scope.prefix())))?),
            Expr::Register(name) => Ok(Value::string(ctx.register(*name).unwrap_or_default())),
            Expr::Env(name) => Ok(Value::string(ctx.env_var(name).unwrap_or_default())),
            Expr::Binary { op, left, right } => self.eval_binary(*op, left, right, ctx),
            Expr::Unary { op, operand } => {
                let value = self.eval_expr(operand, ctx)?;
                Ok(evaluate_unary(&value, *op)?)
            }
            Expr::Ternary {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.eval_expr(condition, ctx)?.as_boolean()? {
                    self.eval_expr(then_branch, ctx)
                } else {
                    self.eval_expr(else_branch, ctx)
                }
            }
            Expr::Falsy { left, right } => {
                let value = self.eval_expr(left, ctx)?;
                if is_falsy(&value)? {
                    self.eval_expr(right, ctx)
                } else {
                    Ok(value)
                }
            }
            Expr::Index { base, index } => {
                let base = self.eval_expr(base, ctx)?;
                let index = self.eval_expr(index, ctx)?;
                let value = index_value(&base, &index)?;
                Ok(match &base {
                    Value::Dict(dict) => bind_self(value, dict),
                    _ => value,
                })
            }
            Expr::Sublist { base, from, to } => {
                let base = self.eval_expr(base, ctx)?;
                let from = self.eval_bound(from.as_deref(), ctx)?;
                let to = self.eval_bound(to.as_deref(), ctx)?;
                Ok(slice_value(&base, from, to)?)
            }
            Expr::DictKey { base, key } => {
                let base = self.eval_expr(base, ctx)?;
                let Value::Dict(dict) = &base else {
                    return Err(dict_required().into());
                };
                let value = dict.get(key).ok_or_else(|| key_not_present(key))?;
                Ok(bind_self(value, dict))
            }
            Expr::Call { callee, args } => self.eval_call(callee, None, args, ctx),
            Expr::MethodCall {
                receiver,
                callee,
                args,
            } => {
                let receiver = self.eval_expr(receiver, ctx)?;
                self.eval_call(callee, Some(receiver), args, ctx)
            }
            Expr::Lambda(lambda) => Ok(self.make_lambda(lambda)),
        }
    }

    fn eval_binary(
        &mut self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        ctx: &mut dyn EditorContext,
    ) -> EvalResult {
        match op {
            BinaryOp::And => {
                if !self.eval_expr(left, ctx)?.as_boolean()? {
                    return Ok(Value::bool(false));
                }
                Ok(Value::bool(self.eval_expr(right, ctx)?.as_boolean()?))
            }
            BinaryOp::Or => {
                if self.eval_expr(left, ctx)?.as_boolean()? {
                    return Ok(Value::bool(true));
                }
                Ok(Value::bool(self.eval_expr(right, ctx)?.as_boolean()?))
            }
            _ => {
                let left = self.eval_expr(left, ctx)?;
                let right = self.eval_expr(right, ctx)?;
                Ok(evaluate_binary(
                    &left,
                    &right,
                    op,
                    self.config.ignore_case,
                    self.matcher.as_ref(),
                )?)
            }
        }
    }

    /// Optional `[from : to]` bound as a Number.
    pub(crate) fn eval_bound(
        &mut self,
        bound: Option<&Expr>,
        ctx: &mut dyn EditorContext,
    ) -> Result<Option<i64>, vim_value::ControlAction> {
        match bound {
            Some(expr) => Ok(Some(self.eval_expr(expr, ctx)?.as_number()?)),
            None => Ok(None),
        }
    }

    /// Create the funcref a lambda literal evaluates to.
    ///
    /// Each evaluation is a new `<lambda>N` capturing the current frame.
    fn make_lambda(&mut self, lambda: &LambdaExpr) -> Value {
        let name = self.functions.next_lambda_name();
        let function = UserFunction::new(
            name,
            Rc::clone(&lambda.decl),
            self.env.current_script(),
            self.env.capture(),
        );
        Value::funcref(FuncrefValue::new(
            FunctionHandle::User(Rc::new(function)),
            FuncrefKind::Lambda,
        ))
    }

    /// Read a variable, failing with `E121` if it does not exist.
    pub(crate) fn read_var(
        &mut self,
        var: &VarRef,
        ctx: &mut dyn EditorContext,
    ) -> Result<Value, EvalError> {
        self.lookup_var(var, ctx)?
            .ok_or_else(|| undefined_variable(&var.to_string()))
    }

    /// Read a variable if it exists.
    pub(crate) fn lookup_var(
        &mut self,
        var: &VarRef,
        ctx: &mut dyn EditorContext,
    ) -> Result<Option<Value>, EvalError> {
        match var.scope {
            None => Ok(self.env.lookup(&var.name)),
            Some(scope) => Ok(self
                .scope_dict(scope, &var.to_string(), ctx)?
                .get(&var.name)),
        }
    }

    /// Dictionary behind an explicit scope; `name` is used in `E461`.
    pub(crate) fn scope_dict(
        &mut self,
        scope: VarScope,
        name: &str,
        ctx: &mut dyn EditorContext,
    ) -> Result<DictHandle, EvalError> {
        match self.env.scope(scope) {
            ScopeLookup::Dict(dict) => Ok(dict),
            ScopeLookup::Host => HostScope::from_var_scope(scope)
                .map(|host| ctx.scope_variables(host))
                .ok_or_else(|| illegal_variable_name(name)),
            ScopeLookup::NoFunction => Err(illegal_variable_name(name)),
        }
    }
}

/// Whether `??` takes its right operand.
///
/// Empty containers are falsy; scalars follow `as_boolean`. A Funcref is
/// never falsy.
fn is_falsy(value: &Value) -> Result<bool, EvalError> {
    match value {
        Value::List(list) => Ok(list.is_empty()),
        Value::Dict(dict) => Ok(dict.is_empty()),
        Value::Blob(bytes) => Ok(bytes.is_empty()),
        Value::Funcref(_) => Ok(false),
        scalar => Ok(!scalar.as_boolean()?),
    }
}

/// Bind `dict` as `self` when a dict function is read out of it.
fn bind_self(value: Value, dict: &DictHandle) -> Value {
    if let Value::Funcref(funcref) = &value {
        if funcref.dict.is_none() && is_dict_function(&funcref.handle) {
            return Value::funcref(funcref.bind_dict(dict.clone()));
        }
    }
    value
}

pub(crate) fn is_dict_function(handle: &FunctionHandle) -> bool {
    match handle {
        FunctionHandle::User(function) => function
            .decl
            .flags
            .contains(vim_ir::FunctionFlags::DICT),
        FunctionHandle::Builtin(_) => false,
    }
}
