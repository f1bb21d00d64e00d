//! `:let` and `:const`.

use vim_ir::{AssignOp, LetTarget, VarRef, VarScope, LOCK_DEPTH_FULL};
use vim_value::errors::{
    const_existing, dict_required, illegal_variable_name, invalid_blob_operation,
    key_not_present, less_targets, list_index_out_of_range, list_required, more_targets,
    not_indexable, read_only_variable, slice_requires_list, slice_too_few_items,
    slice_too_many_items, undefined_variable, unknown_option, value_locked,
    wrong_type_for_compound,
};
use vim_value::{ControlAction, DictHandle, EvalError, ListHandle, Value};

use super::stmt::target_name;
use super::Interpreter;
use crate::environment::Environment;
use crate::host::EditorContext;
use crate::operators::evaluate_binary;

impl Interpreter {
    /// Store `value` through a `:let` target.
    pub(crate) fn assign(
        &mut self,
        target: &LetTarget,
        op: AssignOp,
        value: Value,
        is_const: bool,
        ctx: &mut dyn EditorContext,
    ) -> Result<(), ControlAction> {
        match target {
            LetTarget::Var(var) => self.assign_var(var, op, value, is_const, ctx)?,
            LetTarget::Option { name, scope } => {
                let value = match op {
                    AssignOp::Assign => value,
                    _ => {
                        let display = format!("&{}{name}", scope.prefix());
                        let old = ctx
                            .option(name, *scope)
                            .ok_or_else(|| unknown_option(&display))?;
                        self.compound(&old, value, op, &display)?
                    }
                };
                ctx.set_option(name, *scope, &value)?;
            }
            LetTarget::Register(name) => {
                let old = ctx.register(*name).unwrap_or_default();
                let text = append_text(old, &value, op)?;
                ctx.set_register(*name, &text);
            }
            LetTarget::Env(name) => {
                let old = ctx.env_var(name).unwrap_or_default();
                let text = append_text(old, &value, op)?;
                ctx.set_env_var(name, &text);
            }
            LetTarget::Index { base, index } => {
                let container = self.eval_expr(base, ctx)?;
                let index = self.eval_expr(index, ctx)?;
                match &container {
                    Value::List(list) => {
                        let n = index.as_number()?;
                        let what = format!("{}[{n}]", target_name(base));
                        let slot = list
                            .resolve_index(n)
                            .ok_or_else(|| list_index_out_of_range(n))?;
                        list.check_items(&what)?;
                        let value = match list.get(slot) {
                            Some(old) if op != AssignOp::Assign => {
                                self.compound(&old, value, op, &what)?
                            }
                            _ => value,
                        };
                        list.set(slot, value, &what)?;
                    }
                    Value::Dict(dict) => {
                        let key = index.as_string()?;
                        let what = format!("{}[\"{key}\"]", target_name(base));
                        self.assign_key(dict, &key, op, value, &what)?;
                    }
                    Value::Blob(_) => return Err(invalid_blob_operation().into()),
                    _ => return Err(not_indexable().into()),
                }
            }
            LetTarget::DictKey { base, key } => {
                let Value::Dict(dict) = self.eval_expr(base, ctx)? else {
                    return Err(dict_required().into());
                };
                let what = format!("{}.{key}", target_name(base));
                self.assign_key(&dict, key, op, value, &what)?;
            }
            LetTarget::Sublist { base, from, to } => {
                if op != AssignOp::Assign {
                    return Err(wrong_type_for_compound(op.as_symbol()).into());
                }
                let container = self.eval_expr(base, ctx)?;
                let from = self.eval_bound(from.as_ref(), ctx)?;
                let to = self.eval_bound(to.as_ref(), ctx)?;
                let (Value::List(list), Value::List(source)) = (&container, &value) else {
                    return Err(slice_requires_list().into());
                };
                assign_sublist(list, from, to, source.items(), &target_name(base))?;
            }
            LetTarget::Unpack { targets, rest } => {
                let Value::List(list) = &value else {
                    return Err(list_required().into());
                };
                let mut items = list.items();
                if items.len() < targets.len() {
                    return Err(more_targets().into());
                }
                if rest.is_none() && items.len() > targets.len() {
                    return Err(less_targets().into());
                }
                let remainder = items.split_off(targets.len());
                for (target, item) in targets.iter().zip(items) {
                    self.assign(target, op, item, is_const, ctx)?;
                }
                if let Some(rest) = rest {
                    self.assign(rest, op, Value::list(remainder), is_const, ctx)?;
                }
            }
        }
        Ok(())
    }

    /// Assign a named variable, honouring scope rules and locks.
    ///
    /// A variable whose current value is a locked List or Dictionary cannot
    /// be overwritten, even through an alias of that value.
    pub(crate) fn assign_var(
        &mut self,
        var: &VarRef,
        op: AssignOp,
        value: Value,
        is_const: bool,
        ctx: &mut dyn EditorContext,
    ) -> Result<(), ControlAction> {
        self.store_var(var, op, value, is_const, true, ctx)
    }

    /// Rebind a `:for` loop variable. The item bound on the previous step
    /// may be locked without blocking the next one.
    pub(crate) fn bind_loop_var(
        &mut self,
        var: &VarRef,
        value: Value,
        ctx: &mut dyn EditorContext,
    ) -> Result<(), ControlAction> {
        self.store_var(var, AssignOp::Assign, value, false, false, ctx)
    }

    fn store_var(
        &mut self,
        var: &VarRef,
        op: AssignOp,
        value: Value,
        is_const: bool,
        check_value_lock: bool,
        ctx: &mut dyn EditorContext,
    ) -> Result<(), ControlAction> {
        let display = var.to_string();
        let dict = match var.scope {
            None => self.env.assign_target(&var.name),
            Some(VarScope::Argument) => {
                return Err(if self.env.in_function() {
                    read_only_variable(&display)
                } else {
                    illegal_variable_name(&display)
                }
                .into());
            }
            Some(VarScope::Vim) if !Environment::is_writable_vim_var(&var.name) => {
                return Err(read_only_variable(&display).into());
            }
            Some(scope) => self.scope_dict(scope, &display, ctx)?,
        };

        if is_const && dict.contains_key(&var.name) {
            return Err(const_existing(&display).into());
        }
        dict.check_insert(&var.name, &display)?;
        if check_value_lock {
            check_value_unlocked(&dict, &var.name, &display)?;
        }
        let value = match op {
            AssignOp::Assign => value,
            _ => {
                let old = dict
                    .get(&var.name)
                    .ok_or_else(|| undefined_variable(&display))?;
                self.compound(&old, value, op, &display)?
            }
        };

        dict.insert(&var.name, value.clone(), &display)?;
        if is_const {
            dict.lock_key(&var.name);
            value.lock(LOCK_DEPTH_FULL);
        }
        Ok(())
    }

    fn assign_key(
        &self,
        dict: &DictHandle,
        key: &str,
        op: AssignOp,
        value: Value,
        what: &str,
    ) -> Result<(), EvalError> {
        dict.check_insert(key, what)?;
        check_value_unlocked(dict, key, what)?;
        let value = match op {
            AssignOp::Assign => value,
            _ => {
                let old = dict.get(key).ok_or_else(|| key_not_present(key))?;
                self.compound(&old, value, op, what)?
            }
        };
        dict.insert(key, value, what)
    }

    /// New value for `old {op}= rhs`.
    ///
    /// `+=` on a List extends it in place and returns the same list.
    fn compound(
        &self,
        old: &Value,
        rhs: Value,
        op: AssignOp,
        what: &str,
    ) -> Result<Value, EvalError> {
        let Some(binary) = op.binary_op() else {
            return Ok(rhs);
        };
        let wrong = || wrong_type_for_compound(op.as_symbol());
        match (old, &rhs) {
            (Value::List(list), Value::List(extra)) if op == AssignOp::Add => {
                list.splice(list.len(), 0, extra.items(), what)?;
                Ok(old.clone())
            }
            (Value::Blob(bytes), Value::Blob(extra)) if op == AssignOp::Add => {
                let joined: Vec<u8> = bytes.iter().chain(extra.iter()).copied().collect();
                Ok(Value::blob(joined))
            }
            (Value::List(_) | Value::Dict(_) | Value::Funcref(_) | Value::Blob(_), _) => {
                Err(wrong())
            }
            (Value::Float(_), _) if matches!(op, AssignOp::Concat | AssignOp::Mod) => {
                Err(wrong())
            }
            _ => evaluate_binary(
                old,
                &rhs,
                binary,
                self.config.ignore_case,
                self.matcher.as_ref(),
            ),
        }
    }
}

/// `E741` when the value stored under `key` is a locked container.
fn check_value_unlocked(dict: &DictHandle, key: &str, what: &str) -> Result<(), EvalError> {
    if dict.get(key).is_some_and(|value| value.is_locked()) {
        return Err(value_locked(what));
    }
    Ok(())
}

/// Text for `:let @r` and `:let $VAR`; only `=` and `.=` apply.
fn append_text(old: String, value: &Value, op: AssignOp) -> Result<String, EvalError> {
    let text = value.as_string()?;
    match op {
        AssignOp::Assign => Ok(text.into_owned()),
        AssignOp::Concat => Ok(old + &text),
        _ => Err(wrong_type_for_compound(op.as_symbol())),
    }
}

/// `:let list[from : to] = items`
///
/// With an end index the item count must match the range exactly; a range
/// reaching past the end appends. Without one, the items replace everything
/// from `from` on and must be at least as many.
fn assign_sublist(
    list: &ListHandle,
    from: Option<i64>,
    to: Option<i64>,
    items: Vec<Value>,
    what: &str,
) -> Result<(), EvalError> {
    let len = i64::try_from(list.len()).unwrap_or(i64::MAX);
    let first = from.unwrap_or(0);
    let start = if first < 0 { first + len } else { first };
    if start < 0 || start > len {
        return Err(list_index_out_of_range(first));
    }
    let existing = usize::try_from(len - start).unwrap_or(0);
    let start = usize::try_from(start).unwrap_or(0);

    let Some(last) = to else {
        if items.len() < existing {
            return Err(slice_too_few_items());
        }
        return list.splice(start, existing, items, what);
    };

    let end = if last < 0 { last + len } else { last };
    let count = usize::try_from(end + 1 - i64::try_from(start).unwrap_or(0)).unwrap_or(0);
    if items.len() > count {
        return Err(slice_too_many_items());
    }
    if items.len() < count {
        return Err(slice_too_few_items());
    }
    list.splice(start, count.min(existing), items, what)
}
