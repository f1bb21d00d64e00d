//! Builtins that read the editor: `line()`, `col()` and `getline()`.
//!
//! Only the cursor and buffer lines are known to [`EditorContext`], so marks
//! and window positions (`'a`, `w0`, `v`) evaluate to 0.

use vim_value::{EvalError, EvalResult, Value};

use super::number;
use crate::host::EditorContext;
use crate::interpreter::Interpreter;

/// `line({expr} [, {winid}])`
pub(super) fn line(_: &mut Interpreter, args: &[Value], ctx: &mut dyn EditorContext) -> EvalResult {
    let line = match &args[0] {
        Value::List(list) => match list.get(0) {
            Some(first) => line_number(&first, ctx)?,
            None => 0,
        },
        other => match other.as_string()?.as_ref() {
            "." => ctx.current_line(),
            "$" => ctx.line_count(),
            _ => 0,
        },
    };
    if line > ctx.line_count() {
        return Ok(Value::Number(0));
    }
    Ok(number(line))
}

/// `col({expr} [, {winid}])`: byte column, or one past the end of the line
/// for `$`.
pub(super) fn col(_: &mut Interpreter, args: &[Value], ctx: &mut dyn EditorContext) -> EvalResult {
    let column = match &args[0] {
        Value::List(list) => {
            let (Some(line), Some(column)) = (list.get(0), list.get(1)) else {
                return Ok(Value::Number(0));
            };
            let line = line_number(&line, ctx)?;
            if line == 0 || line > ctx.line_count() {
                return Ok(Value::Number(0));
            }
            match column.as_str() {
                Some("$") => end_column(ctx, line),
                _ => usize::try_from(column.as_number()?).unwrap_or(0),
            }
        }
        other => match other.as_string()?.as_ref() {
            "." => ctx.cursor_column(),
            "$" => end_column(ctx, ctx.current_line()),
            _ => 0,
        },
    };
    Ok(number(column))
}

fn end_column(ctx: &dyn EditorContext, line: usize) -> usize {
    ctx.line_text(line).map_or(0, |text| text.len() + 1)
}

/// `getline({lnum} [, {end}])`
///
/// One line as a String (empty when out of range), or with `{end}` a List
/// of the lines that exist in the range.
pub(super) fn getline(
    _: &mut Interpreter,
    args: &[Value],
    ctx: &mut dyn EditorContext,
) -> EvalResult {
    let start = line_number(&args[0], ctx)?;
    let Some(end) = args.get(1) else {
        return Ok(Value::string(line_text(ctx, start)));
    };
    let end = line_number(end, ctx)?.min(ctx.line_count());
    let start = start.max(1);
    let lines = (start..=end)
        .filter_map(|line| ctx.line_text(line))
        .map(Value::string)
        .collect();
    Ok(Value::list(lines))
}

fn line_text(ctx: &dyn EditorContext, line: usize) -> String {
    if line == 0 {
        return String::new();
    }
    ctx.line_text(line).unwrap_or_default()
}

/// A line argument: a Number, or a String that is `.`, `$` or a number.
fn line_number(value: &Value, ctx: &dyn EditorContext) -> Result<usize, EvalError> {
    let line = match value {
        Value::String(text) => match text.as_ref() {
            "." => return Ok(ctx.current_line()),
            "$" => return Ok(ctx.line_count()),
            _ => value.as_number()?,
        },
        other => other.as_number()?,
    };
    Ok(usize::try_from(line).unwrap_or(0))
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::host::MemoryEditor;

    fn editor() -> MemoryEditor {
        let mut editor = MemoryEditor::with_lines(["one", "two", "three"]);
        editor.set_current_line(2);
        editor.set_cursor_column(3);
        editor
    }

    fn run(
        handler: super::super::BuiltinHandler,
        args: &[Value],
        ctx: &mut MemoryEditor,
    ) -> Value {
        let mut interp = Interpreter::new();
        handler(&mut interp, args, ctx).unwrap()
    }

    #[test]
    fn line_positions() {
        let mut ctx = editor();
        assert_eq!(run(line, &[Value::string(".")], &mut ctx), Value::Number(2));
        assert_eq!(run(line, &[Value::string("$")], &mut ctx), Value::Number(3));
        assert_eq!(run(line, &[Value::string("'a")], &mut ctx), Value::Number(0));
        let pos = Value::list(vec![Value::Number(9), Value::Number(1)]);
        assert_eq!(run(line, &[pos], &mut ctx), Value::Number(0));
    }

    #[test]
    fn col_positions() {
        let mut ctx = editor();
        assert_eq!(run(col, &[Value::string(".")], &mut ctx), Value::Number(3));
        assert_eq!(run(col, &[Value::string("$")], &mut ctx), Value::Number(4));
        let pos = Value::list(vec![Value::Number(3), Value::string("$")]);
        assert_eq!(run(col, &[pos], &mut ctx), Value::Number(6));
    }

    #[test]
    fn getline_single_and_range() {
        let mut ctx = editor();
        assert_eq!(run(getline, &[Value::string(".")], &mut ctx), Value::string("two"));
        assert_eq!(run(getline, &[Value::Number(7)], &mut ctx), Value::string(""));
        let range = run(getline, &[Value::Number(2), Value::string("$")], &mut ctx);
        assert_eq!(range.to_string_repr(), "['two', 'three']");
        let empty = run(getline, &[Value::Number(3), Value::Number(1)], &mut ctx);
        assert_eq!(empty.to_string_repr(), "[]");
    }
}
