//! Statement execution.
//!
//! Statements return a [`Flow`] on success. Loops consume `Break` and
//! `Continue`; `Return` travels up to the function call that runs the body.

use std::rc::Rc;

use vim_ir::{
    CatchClause, EchoKind, Expr, FunctionDecl, FunctionFlags, FunctionTarget, IfBranch,
    LetTarget, Stmt, StmtKind, VarRef, VarScope,
};
use vim_stack::ensure_sufficient_stack;
use vim_value::errors::{
    closure_at_top_level, dict_required, echo_err, for_requires_iterable, function_delete_in_use,
    function_exists, function_in_use, invalid_argument, key_exists, key_not_present,
    list_index_out_of_range, list_required, more_targets, no_such_variable, not_implemented,
    not_indexable, read_only_variable, return_outside_function, thrown, undefined_variable,
    unknown_function_delete, vim_prefix_throw,
};
use vim_value::{
    ControlAction, DictHandle, EvalError, FuncrefKind, FuncrefValue, FunctionHandle,
    UserFunction, Value,
};

use super::{ExecResult, Flow, Interpreter};
use crate::functions::{registry_key, validate_declared_name};
use crate::host::EditorContext;
use crate::indexing::slice_bounds;

/// Binds one loop item to the loop variable(s).
type Binder<'a> =
    dyn FnMut(&mut Interpreter, Value, &mut dyn EditorContext) -> Result<(), ControlAction> + 'a;

impl Interpreter {
    /// Run statements until one does not complete normally.
    pub(crate) fn exec_block(&mut self, stmts: &[Stmt], ctx: &mut dyn EditorContext) -> ExecResult {
        for stmt in stmts {
            match self.exec_stmt(stmt, ctx)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    pub(crate) fn exec_stmt(&mut self, stmt: &Stmt, ctx: &mut dyn EditorContext) -> ExecResult {
        self.set_line(stmt.span);
        ensure_sufficient_stack(|| self.exec_kind(&stmt.kind, ctx))
            .map_err(|action| self.annotate(action, stmt.span))
    }

    fn exec_kind(&mut self, kind: &StmtKind, ctx: &mut dyn EditorContext) -> ExecResult {
        match kind {
            StmtKind::Let {
                target,
                op,
                value,
                is_const,
            } => {
                let value = self.eval_expr(value, ctx)?;
                self.assign(target, *op, value, *is_const, ctx)?;
            }
            StmtKind::Unlet { targets, force } => {
                for target in targets {
                    self.unlet(target, *force, ctx)?;
                }
            }
            StmtKind::LockVar {
                targets,
                depth,
                unlock,
            } => {
                for target in targets {
                    self.lock_target(target, *depth, *unlock, ctx)?;
                }
            }
            StmtKind::Echo { kind, args } => self.exec_echo(*kind, args, ctx)?,
            StmtKind::Call { expr, range } => self.exec_call_stmt(expr, *range, ctx)?,
            StmtKind::If { branches, else_body } => {
                return self.exec_if(branches, else_body.as_deref(), ctx);
            }
            StmtKind::While { condition, body } => {
                while self.eval_expr(condition, ctx)?.as_boolean()? {
                    if let Some(flow) = self.loop_body(body, ctx)? {
                        return Ok(flow);
                    }
                }
            }
            StmtKind::For {
                target,
                iterable,
                body,
            } => {
                let mut bind = |this: &mut Interpreter, item: Value, ctx: &mut dyn EditorContext| {
                    this.bind_loop_var(target, item, ctx)
                };
                return self.exec_for(iterable, body, ctx, &mut bind);
            }
            StmtKind::ForUnpack {
                targets,
                iterable,
                body,
            } => {
                let mut bind = |this: &mut Interpreter, item: Value, ctx: &mut dyn EditorContext| {
                    this.bind_unpacked(targets, &item, ctx)
                };
                return self.exec_for(iterable, body, ctx, &mut bind);
            }
            StmtKind::Try {
                body,
                catches,
                finally,
            } => return self.exec_try(body, catches, finally.as_deref(), ctx),
            StmtKind::Throw(expr) => {
                let value = self.eval_expr(expr, ctx)?;
                let text = value.as_string()?;
                if text.starts_with("Vim") {
                    return Err(vim_prefix_throw().into());
                }
                return Err(thrown(text.into_owned()).into());
            }
            StmtKind::Function(decl) => self.declare(decl, ctx)?,
            StmtKind::DelFunction { target, force } => {
                self.delete_function(target, *force, ctx)?;
            }
            StmtKind::Return(expr) => {
                if !self.env.in_function() {
                    return Err(return_outside_function().into());
                }
                let value = match expr {
                    Some(expr) => self.eval_expr(expr, ctx)?,
                    None => Value::Number(0),
                };
                return Ok(Flow::Return(value));
            }
            StmtKind::Break => return Ok(Flow::Break),
            StmtKind::Continue => return Ok(Flow::Continue),
            StmtKind::Finish => return Err(ControlAction::FinishScript),
        }
        Ok(Flow::Normal)
    }

    fn exec_if(
        &mut self,
        branches: &[IfBranch],
        else_body: Option<&[Stmt]>,
        ctx: &mut dyn EditorContext,
    ) -> ExecResult {
        for branch in branches {
            if self.eval_expr(&branch.condition, ctx)?.as_boolean()? {
                return self.exec_block(&branch.body, ctx);
            }
        }
        match else_body {
            Some(body) => self.exec_block(body, ctx),
            None => Ok(Flow::Normal),
        }
    }

    /// One pass over a loop body. `Some` ends the loop with that flow.
    fn loop_body(
        &mut self,
        body: &[Stmt],
        ctx: &mut dyn EditorContext,
    ) -> Result<Option<Flow>, ControlAction> {
        match self.exec_block(body, ctx)? {
            Flow::Normal | Flow::Continue => Ok(None),
            Flow::Break => Ok(Some(Flow::Normal)),
            flow @ Flow::Return(_) => Ok(Some(flow)),
        }
    }

    /// `:for` over a List or String.
    ///
    /// The iterable is evaluated again before every step after the first
    /// and the next index is read from the List it yields now. Items
    /// appended by the body are visited, a loop whose variable is rebound
    /// continues over the new list, and a list that shrank below the index
    /// ends the loop. A re-read that is no longer a List is `E1098`.
    fn exec_for(
        &mut self,
        iterable: &Expr,
        body: &[Stmt],
        ctx: &mut dyn EditorContext,
        bind: &mut Binder<'_>,
    ) -> ExecResult {
        match self.eval_expr(iterable, ctx)? {
            Value::List(first) => {
                let mut list = first;
                let mut index = 0;
                loop {
                    if index > 0 {
                        match self.eval_expr(iterable, ctx)? {
                            Value::List(current) => list = current,
                            _ => return Err(for_requires_iterable().into()),
                        }
                    }
                    let Some(item) = list.get(index) else {
                        break;
                    };
                    index += 1;
                    bind(self, item, ctx)?;
                    if let Some(flow) = self.loop_body(body, ctx)? {
                        return Ok(flow);
                    }
                }
                Ok(Flow::Normal)
            }
            Value::String(text) => {
                for c in text.chars() {
                    bind(self, Value::string(c.to_string()), ctx)?;
                    if let Some(flow) = self.loop_body(body, ctx)? {
                        return Ok(flow);
                    }
                }
                Ok(Flow::Normal)
            }
            Value::Blob(_) => Err(not_implemented(":for over a Blob").into()),
            _ => Err(for_requires_iterable().into()),
        }
    }

    /// Bind `[a, b]` from one item of a `:for` list.
    fn bind_unpacked(
        &mut self,
        targets: &[VarRef],
        item: &Value,
        ctx: &mut dyn EditorContext,
    ) -> Result<(), ControlAction> {
        let Value::List(list) = item else {
            return Err(list_required().into());
        };
        let items = list.items();
        if targets.len() > items.len() {
            return Err(more_targets().into());
        }
        if targets.len() < items.len() {
            let extra = i64::try_from(targets.len()).unwrap_or(i64::MAX);
            return Err(list_index_out_of_range(extra).into());
        }
        for (target, value) in targets.iter().zip(items) {
            self.bind_loop_var(target, value, ctx)?;
        }
        Ok(())
    }

    fn exec_try(
        &mut self,
        body: &[Stmt],
        catches: &[CatchClause],
        finally: Option<&[Stmt]>,
        ctx: &mut dyn EditorContext,
    ) -> ExecResult {
        let outcome = self.exec_block(body, ctx);

        let outcome = match outcome {
            Err(ControlAction::Error(err)) => self.handle_exception(*err, catches, ctx),
            other => other,
        };

        let Some(finally) = finally else {
            return outcome;
        };
        match self.exec_block(finally, ctx) {
            Ok(Flow::Normal) => outcome,
            overridden => {
                tracing::trace!("finally replaced the pending outcome");
                overridden
            }
        }
    }

    /// Run the first `:catch` whose pattern matches, or pass `err` on.
    fn handle_exception(
        &mut self,
        err: EvalError,
        catches: &[CatchClause],
        ctx: &mut dyn EditorContext,
    ) -> ExecResult {
        for clause in catches {
            let caught = match &clause.pattern {
                None => true,
                Some(pattern) => self.matcher.is_match(pattern, &err.message, false)?,
            };
            if caught {
                tracing::debug!(exception = %err.message, "caught");
                return self.run_catch(clause, &err, ctx);
            }
        }
        Err(ControlAction::Error(Box::new(err)))
    }

    fn run_catch(
        &mut self,
        clause: &CatchClause,
        err: &EvalError,
        ctx: &mut dyn EditorContext,
    ) -> ExecResult {
        let vim_vars = self.env.vim_vars().clone();
        let saved_exception = vim_vars.get("exception");
        let saved_throwpoint = vim_vars.get("throwpoint");
        vim_vars.define("exception", Value::string(err.message.as_str()));
        vim_vars.define(
            "throwpoint",
            Value::string(err.throwpoint.clone().unwrap_or_default()),
        );

        self.set_line(clause.span);
        let result = self.exec_block(&clause.body, ctx);

        vim_vars.define(
            "exception",
            saved_exception.unwrap_or_else(Value::empty_string),
        );
        vim_vars.define(
            "throwpoint",
            saved_throwpoint.unwrap_or_else(Value::empty_string),
        );
        result
    }

    fn exec_echo(
        &mut self,
        kind: EchoKind,
        args: &[Expr],
        ctx: &mut dyn EditorContext,
    ) -> Result<(), ControlAction> {
        let mut parts = Vec::with_capacity(args.len());
        for arg in args {
            parts.push(self.eval_expr(arg, ctx)?.to_output_string());
        }
        match kind {
            EchoKind::Echo => self.output.echo(&parts.join(" ")),
            EchoKind::Echon => self.output.echon(&parts.concat()),
            EchoKind::Msg => self.output.echomsg(&parts.join(" ")),
            EchoKind::Err => return Err(echo_err(parts.join(" ")).into()),
        }
        Ok(())
    }

    /// `:function`
    pub(crate) fn declare(
        &mut self,
        decl: &Rc<FunctionDecl>,
        ctx: &mut dyn EditorContext,
    ) -> Result<(), ControlAction> {
        let closure = if decl.flags.contains(FunctionFlags::CLOSURE) {
            let name = declared_name(&decl.target);
            Some(
                self.env
                    .capture()
                    .ok_or_else(|| closure_at_top_level(&name))?,
            )
        } else {
            None
        };
        let script = self.env.current_script();

        match &decl.target {
            FunctionTarget::Named(name) => {
                validate_declared_name(name)?;
                let key = registry_key(name, script);
                if let Some(existing) = self.functions.get(&key) {
                    if !decl.replace {
                        return Err(function_exists(&name.to_string()).into());
                    }
                    if existing.is_active() {
                        return Err(function_in_use(&name.to_string()).into());
                    }
                }
                tracing::debug!(function = %key, "declare");
                self.functions.define(Rc::new(UserFunction::new(
                    key,
                    Rc::clone(decl),
                    script,
                    closure,
                )));
            }
            FunctionTarget::DictMember { dict, key } => {
                let Value::Dict(target) = self.eval_expr(dict, ctx)? else {
                    return Err(dict_required().into());
                };
                let mut name = None;
                if let Some(existing) = target.get(key) {
                    if !decl.replace {
                        return Err(key_exists(key).into());
                    }
                    if let Some(function) = dict_member_function(&existing) {
                        if function.is_active() {
                            return Err(function_in_use(&function.name).into());
                        }
                        name = Some(function.name.clone());
                    }
                }
                let name = name.unwrap_or_else(|| self.functions.next_anonymous_name());

                let mut member = FunctionDecl::clone(decl);
                member.flags |= FunctionFlags::DICT;
                let function = Rc::new(UserFunction::new(
                    name,
                    Rc::new(member),
                    script,
                    closure,
                ));
                tracing::debug!(function = %function.name, key = %key, "declare dict function");
                self.functions.define(Rc::clone(&function));
                target.insert(
                    key,
                    Value::funcref(FuncrefValue::new(
                        FunctionHandle::User(function),
                        FuncrefKind::Function,
                    )),
                    key,
                )?;
            }
        }
        Ok(())
    }

    /// `:delfunction`
    fn delete_function(
        &mut self,
        target: &FunctionTarget,
        force: bool,
        ctx: &mut dyn EditorContext,
    ) -> Result<(), ControlAction> {
        match target {
            FunctionTarget::Named(name) => {
                let display = name.to_string();
                let key = registry_key(name, self.env.current_script());
                let Some(function) = self.functions.get(&key) else {
                    if force {
                        return Ok(());
                    }
                    return Err(unknown_function_delete(&display).into());
                };
                if function.is_active() {
                    return Err(function_delete_in_use(&display).into());
                }
                self.functions.remove(&key);
                function.mark_deleted();
            }
            FunctionTarget::DictMember { dict, key } => {
                let Value::Dict(container) = self.eval_expr(dict, ctx)? else {
                    return Err(dict_required().into());
                };
                let function = container.get(key).as_ref().and_then(dict_member_function);
                let Some(function) = function else {
                    if force {
                        return Ok(());
                    }
                    return Err(unknown_function_delete(key).into());
                };
                if function.is_active() {
                    return Err(function_delete_in_use(key).into());
                }
                container.remove(key, key)?;
                self.functions.remove(&function.name);
                function.mark_deleted();
            }
        }
        Ok(())
    }

    /// `:unlet` of one target.
    fn unlet(
        &mut self,
        target: &LetTarget,
        force: bool,
        ctx: &mut dyn EditorContext,
    ) -> Result<(), ControlAction> {
        match target {
            LetTarget::Var(var) => {
                let display = var.to_string();
                let dict = self.variable_dict(var, ctx)?;
                if dict.remove(&var.name, &display)?.is_none() && !force {
                    return Err(no_such_variable(&display).into());
                }
            }
            LetTarget::Index { base, index } => {
                let container = self.eval_expr(base, ctx)?;
                let index = self.eval_expr(index, ctx)?;
                match &container {
                    Value::List(list) => {
                        let n = index.as_number()?;
                        match list.resolve_index(n) {
                            Some(i) => {
                                list.remove_range(i, i, &format!("{}[{n}]", target_name(base)))?;
                            }
                            None if force => {}
                            None => return Err(list_index_out_of_range(n).into()),
                        }
                    }
                    Value::Dict(dict) => {
                        let key = index.as_string()?;
                        remove_key(dict, &key, force, &target_name(base))?;
                    }
                    _ => return Err(not_indexable().into()),
                }
            }
            LetTarget::DictKey { base, key } => {
                let Value::Dict(dict) = self.eval_expr(base, ctx)? else {
                    return Err(dict_required().into());
                };
                remove_key(&dict, key, force, &target_name(base))?;
            }
            LetTarget::Sublist { base, from, to } => {
                let container = self.eval_expr(base, ctx)?;
                let from = self.eval_bound(from.as_ref(), ctx)?;
                let to = self.eval_bound(to.as_ref(), ctx)?;
                let Value::List(list) = &container else {
                    return Err(list_required().into());
                };
                if let Some((start, end)) = slice_bounds(list.len(), from, to) {
                    list.remove_range(start, end, &target_name(base))?;
                }
            }
            LetTarget::Option { .. }
            | LetTarget::Register(_)
            | LetTarget::Env(_)
            | LetTarget::Unpack { .. } => {
                return Err(invalid_argument(&describe_target(target)).into());
            }
        }
        Ok(())
    }

    /// `:lockvar` / `:unlockvar` of one target.
    fn lock_target(
        &mut self,
        target: &LetTarget,
        depth: u32,
        unlock: bool,
        ctx: &mut dyn EditorContext,
    ) -> Result<(), ControlAction> {
        match target {
            LetTarget::Var(var) => {
                let dict = self.variable_dict(var, ctx)?;
                let value = dict
                    .get(&var.name)
                    .ok_or_else(|| undefined_variable(&var.to_string()))?;
                set_key_lock(&dict, &var.name, &value, depth, unlock);
            }
            LetTarget::DictKey { base, key } => {
                let Value::Dict(dict) = self.eval_expr(base, ctx)? else {
                    return Err(dict_required().into());
                };
                let value = dict.get(key).ok_or_else(|| key_not_present(key))?;
                set_key_lock(&dict, key, &value, depth, unlock);
            }
            LetTarget::Index { base, index } => {
                let container = self.eval_expr(base, ctx)?;
                let index = self.eval_expr(index, ctx)?;
                match &container {
                    Value::Dict(dict) => {
                        let key = index.as_string()?;
                        let value = dict.get(&key).ok_or_else(|| key_not_present(&key))?;
                        set_key_lock(dict, &key, &value, depth, unlock);
                    }
                    Value::List(list) => {
                        let n = index.as_number()?;
                        let value = list
                            .resolve_index(n)
                            .and_then(|i| list.get(i))
                            .ok_or_else(|| list_index_out_of_range(n))?;
                        set_value_lock(&value, depth, unlock);
                    }
                    _ => return Err(not_indexable().into()),
                }
            }
            LetTarget::Sublist { .. }
            | LetTarget::Option { .. }
            | LetTarget::Register(_)
            | LetTarget::Env(_)
            | LetTarget::Unpack { .. } => {
                return Err(invalid_argument(&describe_target(target)).into());
            }
        }
        Ok(())
    }

    /// Dictionary holding a variable for `:unlet` and `:lockvar`.
    ///
    /// `a:` and `v:` variables cannot be removed or locked.
    fn variable_dict(
        &mut self,
        var: &VarRef,
        ctx: &mut dyn EditorContext,
    ) -> Result<DictHandle, EvalError> {
        match var.scope {
            None => Ok(self.env.assign_target(&var.name)),
            Some(VarScope::Argument | VarScope::Vim) => Err(read_only_variable(&var.to_string())),
            Some(scope) => self.scope_dict(scope, &var.to_string(), ctx),
        }
    }
}

/// The function a dictionary entry created by `:function dict.key()` calls.
fn dict_member_function(value: &Value) -> Option<Rc<UserFunction>> {
    match &value.as_funcref()?.handle {
        FunctionHandle::User(function) => Some(Rc::clone(function)),
        FunctionHandle::Builtin(_) => None,
    }
}

fn remove_key(dict: &DictHandle, key: &str, force: bool, what: &str) -> Result<(), EvalError> {
    if dict.remove(key, what)?.is_none() && !force {
        return Err(key_not_present(key));
    }
    Ok(())
}

fn set_key_lock(dict: &DictHandle, key: &str, value: &Value, depth: u32, unlock: bool) {
    if depth == 0 {
        return;
    }
    if unlock {
        dict.unlock_key(key);
    } else {
        dict.lock_key(key);
    }
    set_value_lock(value, depth, unlock);
}

fn set_value_lock(value: &Value, depth: u32, unlock: bool) {
    if unlock {
        value.unlock(depth);
    } else {
        value.lock(depth);
    }
}

/// A variable or a chain of literal lookups into one; reading it has no
/// side effects.
pub(crate) fn is_plain_lookup(expr: &Expr) -> bool {
    match expr {
        Expr::Var(_) | Expr::ScopeDict(_) => true,
        Expr::DictKey { base, .. } => is_plain_lookup(base),
        Expr::Index { base, index } => {
            matches!(**index, Expr::Number(_) | Expr::String(_)) && is_plain_lookup(base)
        }
        _ => false,
    }
}

/// Name used for `E741` messages about a container expression.
pub(crate) fn target_name(expr: &Expr) -> String {
    match expr {
        Expr::Var(var) => var.to_string(),
        Expr::ScopeDict(scope) => scope.to_string(),
        Expr::DictKey { base, key } => format!("{}.{key}", target_name(base)),
        Expr::Index { base, index } => match &**index {
            Expr::Number(n) => format!("{}[{n}]", target_name(base)),
            Expr::String(key) => format!("{}[\"{key}\"]", target_name(base)),
            _ => format!("{}[]", target_name(base)),
        },
        _ => "value".to_string(),
    }
}

fn describe_target(target: &LetTarget) -> String {
    match target {
        LetTarget::Var(var) => var.to_string(),
        LetTarget::Option { name, scope } => format!("&{}{name}", scope.prefix()),
        LetTarget::Register(name) => format!("@{name}"),
        LetTarget::Env(name) => format!("${name}"),
        LetTarget::Index { base, .. } | LetTarget::Sublist { base, .. } => {
            format!("{}[]", target_name(base))
        }
        LetTarget::DictKey { base, key } => format!("{}.{key}", target_name(base)),
        LetTarget::Unpack { .. } => "[".to_string(),
    }
}

fn declared_name(target: &FunctionTarget) -> String {
    match target {
        FunctionTarget::Named(name) => name.to_string(),
        FunctionTarget::DictMember { dict, key } => format!("{}.{key}", target_name(dict)),
    }
}
