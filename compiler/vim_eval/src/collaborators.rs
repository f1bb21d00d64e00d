//! Pattern matching and expression parsing.
//!
//! The runtime implements neither Vim's regular expressions nor its parser.
//! `:catch /pat/`, `=~` and `!~` ask a [`PatternMatcher`]; `eval()` and the
//! string forms of `map()`/`filter()` ask an [`ExpressionParser`].

use vim_ir::Expr;
use vim_value::EvalError;

/// Answers "does `pattern` match somewhere in `text`".
pub trait PatternMatcher {
    fn is_match(&self, pattern: &str, text: &str, ignore_case: bool) -> Result<bool, EvalError>;
}

/// Turns expression text into a tree.
pub trait ExpressionParser {
    fn parse_expression(&self, text: &str) -> Result<Expr, EvalError>;
}

/// Literal matcher used when the host supplies no regex engine.
///
/// Understands the `^` and `$` anchors and the `\c`/`\C` case flags; every
/// other character matches itself. The empty pattern matches anything.
#[derive(Copy, Clone, Debug, Default)]
pub struct SubstringMatcher;

impl PatternMatcher for SubstringMatcher {
    fn is_match(&self, pattern: &str, text: &str, ignore_case: bool) -> Result<bool, EvalError> {
        let (anchored_start, pattern) = match pattern.strip_prefix('^') {
            Some(rest) => (true, rest),
            None => (false, pattern),
        };
        let (anchored_end, pattern) = match pattern.strip_suffix('$') {
            Some(rest) if !rest.ends_with('\\') => (true, rest),
            _ => (false, pattern),
        };

        let mut ignore_case = ignore_case;
        let mut body = String::with_capacity(pattern.len());
        let mut rest = pattern;
        while let Some(pos) = rest.find('\\') {
            body.push_str(&rest[..pos]);
            let flag = rest[pos + 1..].chars().next();
            match flag {
                Some('c') => ignore_case = true,
                Some('C') => ignore_case = false,
                Some(other) => body.push(other),
                None => body.push('\\'),
            }
            rest = &rest[pos + 1 + flag.map_or(0, char::len_utf8)..];
        }
        body.push_str(rest);

        let (text, body) = if ignore_case {
            (text.to_lowercase(), body.to_lowercase())
        } else {
            (text.to_string(), body)
        };
        Ok(match (anchored_start, anchored_end) {
            (true, true) => text == body,
            (true, false) => text.starts_with(&body),
            (false, true) => text.ends_with(&body),
            (false, false) => text.contains(&body),
        })
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;

    fn matches(pattern: &str, text: &str) -> bool {
        SubstringMatcher.is_match(pattern, text, false).unwrap()
    }

    #[test]
    fn substring_and_anchors() {
        assert!(matches("E121", "E121: Undefined variable: x"));
        assert!(matches("^E121", "E121: Undefined variable: x"));
        assert!(!matches("^Undefined", "E121: Undefined variable: x"));
        assert!(matches("x$", "E121: Undefined variable: x"));
        assert!(matches("^oops$", "oops"));
        assert!(!matches("^oops$", "oops!"));
        assert!(matches("", "anything"));
    }

    #[test]
    fn case_flags() {
        assert!(!matches("error", "ERROR"));
        assert!(matches("\\cerror", "ERROR"));
        assert!(SubstringMatcher.is_match("error", "ERROR", true).unwrap());
        assert!(!SubstringMatcher.is_match("\\Cerror", "ERROR", true).unwrap());
    }

    #[test]
    fn escaped_characters_are_literal() {
        assert!(matches("a\\.b", "a.b"));
        assert!(matches("\\^", "x^y"));
    }
}
