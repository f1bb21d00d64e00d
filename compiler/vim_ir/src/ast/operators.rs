//! Operators.
//!
//! Comparison operators carry a [`CaseMode`] because Vim spells the same
//! comparison three ways: `==` follows `'ignorecase'`, `==#` always matches
//! case and `==?` always ignores it.

/// How string comparisons treat letter case.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum CaseMode {
    /// Plain operator: follows the interpreter's `ignore_case` setting.
    #[default]
    Default,
    /// `#` suffix.
    MatchCase,
    /// `?` suffix.
    IgnoreCase,
}

impl CaseMode {
    pub const fn suffix(self) -> &'static str {
        match self {
            CaseMode::Default => "",
            CaseMode::MatchCase => "#",
            CaseMode::IgnoreCase => "?",
        }
    }

    /// Resolve against the configured default.
    #[inline]
    pub const fn ignores_case(self, default_ignore: bool) -> bool {
        match self {
            CaseMode::Default => default_ignore,
            CaseMode::MatchCase => false,
            CaseMode::IgnoreCase => true,
        }
    }
}

/// Comparison operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CompareOp {
    Eq,
    NotEq,
    Gt,
    GtEq,
    Lt,
    LtEq,
    /// Identity for containers, same-type equality otherwise.
    Is,
    IsNot,
    /// `=~`
    Match,
    /// `!~`
    NoMatch,
}

impl CompareOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::NotEq => "!=",
            CompareOp::Gt => ">",
            CompareOp::GtEq => ">=",
            CompareOp::Lt => "<",
            CompareOp::LtEq => "<=",
            CompareOp::Is => "is",
            CompareOp::IsNot => "isnot",
            CompareOp::Match => "=~",
            CompareOp::NoMatch => "!~",
        }
    }

    /// Equality-style operators, the only ones allowed on List, Dictionary
    /// and Funcref operands.
    pub const fn is_equality(self) -> bool {
        matches!(
            self,
            CompareOp::Eq | CompareOp::NotEq | CompareOp::Is | CompareOp::IsNot
        )
    }
}

/// Binary operators.
///
/// `&&`, `||` short-circuit and are evaluated by the interpreter directly;
/// `??` has its own expression node ([`crate::Expr::Falsy`]).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    /// String concatenation, spelled `.` or `..`.
    Concat,
    And,
    Or,
    Compare(CompareOp, CaseMode),
}

impl BinaryOp {
    /// Shorthand for a comparison that follows `'ignorecase'`.
    pub const fn compare(op: CompareOp) -> Self {
        BinaryOp::Compare(op, CaseMode::Default)
    }

    pub const fn as_symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Concat => "..",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Compare(op, _) => op.as_symbol(),
        }
    }
}

/// Unary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    /// `!`
    Not,
    /// `-`
    Neg,
    /// `+`
    Plus,
}

impl UnaryOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
        }
    }
}

/// Operator of a `:let` statement.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum AssignOp {
    /// `=`
    #[default]
    Assign,
    /// `+=`
    Add,
    /// `-=`
    Sub,
    /// `*=`
    Mul,
    /// `/=`
    Div,
    /// `%=`
    Mod,
    /// `.=` and `..=`
    Concat,
}

impl AssignOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Mod => "%=",
            AssignOp::Concat => ".=",
        }
    }

    /// The binary operator a compound assignment applies, `None` for `=`.
    pub const fn binary_op(self) -> Option<BinaryOp> {
        match self {
            AssignOp::Assign => None,
            AssignOp::Add => Some(BinaryOp::Add),
            AssignOp::Sub => Some(BinaryOp::Sub),
            AssignOp::Mul => Some(BinaryOp::Mul),
            AssignOp::Div => Some(BinaryOp::Div),
            AssignOp::Mod => Some(BinaryOp::Mod),
            AssignOp::Concat => Some(BinaryOp::Concat),
        }
    }
}
