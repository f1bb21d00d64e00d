//! Error types for evaluation.
//!
//! `EvalErrorKind` carries one variant per Vim error message. Each message
//! starts with its `E###:` code so `:catch /E121/` and `v:errmsg` see the
//! same text Vim users expect. Factory functions (e.g. `undefined_variable()`)
//! are the public API; they fill both `kind` and `message`.
//!
//! Evaluation functions return [`EvalResult`], whose error side is a
//! [`ControlAction`]: either an error or the request to stop the current
//! script (`:finish`). Loop and return signals are not errors and travel in
//! the interpreter's own control-flow enum.

use std::fmt;

use vim_ir::Span;

use crate::value::Value;

/// Result of evaluating an expression or calling a function.
pub type EvalResult = Result<Value, ControlAction>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EvalErrorKind {
    // Expressions
    #[error("E15: Invalid expression: \"{expr}\"")]
    InvalidExpression { expr: String },
    #[error("E475: Invalid argument: {arg}")]
    InvalidArgument { arg: String },
    #[error("E1085: Not a callable type: {what}")]
    NotCallable { what: String },

    // Variables
    #[error("E46: Cannot change read-only variable \"{name}\"")]
    ReadOnlyVariable { name: String },
    #[error("E108: No such variable: \"{name}\"")]
    NoSuchVariable { name: String },
    #[error("E113: Unknown option: {name}")]
    UnknownOption { name: String },
    #[error("E121: Undefined variable: {name}")]
    UndefinedVariable { name: String },
    #[error("E461: Illegal variable name: {name}")]
    IllegalVariableName { name: String },
    #[error("E741: Value is locked: {name}")]
    Locked { name: String },
    #[error("E995: Cannot modify existing variable")]
    ConstExisting { name: String },

    // Functions
    #[error("E116: Invalid arguments for function {name}")]
    InvalidArguments { name: String },
    #[error("E117: Unknown function: {name}")]
    UnknownFunction { name: String },
    #[error("E118: Too many arguments for function: {name}")]
    TooManyArguments { name: String },
    #[error("E119: Not enough arguments for function: {name}")]
    NotEnoughArguments { name: String },
    #[error("E122: Function {name} already exists, add ! to replace it")]
    FunctionExists { name: String },
    #[error("E127: Cannot redefine function {name}: It is in use")]
    FunctionInUse { name: String },
    #[error("E128: Function name must start with a capital or \"s:\": {name}")]
    InvalidFunctionName { name: String },
    #[error("E130: Unknown function: {name}")]
    UnknownFunctionDelete { name: String },
    #[error("E131: Cannot delete function {name}: It is in use")]
    FunctionDeleteInUse { name: String },
    #[error("E132: Function call depth is higher than 'maxfuncdepth'")]
    CallDepthExceeded { limit: usize },
    #[error("E700: Unknown function: {name}")]
    UnknownFunctionName { name: String },
    #[error("E718: Funcref required")]
    FuncrefRequired,
    #[error("E725: Calling dict function without Dictionary: {name}")]
    DictFunctionWithoutDict { name: String },
    #[error("E922: Expected a dict")]
    ExpectedDict,
    #[error("E923: Second argument of function() must be a list or a dict")]
    PartialArgumentType,
    #[error("E932: Closure function should not be at top level: {name}")]
    ClosureAtTopLevel { name: String },
    #[error("E933: Function was deleted: {name}")]
    FunctionDeleted { name: String },

    // Statements
    #[error("E133: :return not inside a function")]
    ReturnOutsideFunction,
    #[error("E586: :continue without :while or :for")]
    ContinueOutsideLoop,
    #[error("E587: :break without :while or :for")]
    BreakOutsideLoop,
    #[error("E608: Cannot :throw exceptions with 'Vim' prefix")]
    VimPrefixThrow,
    #[error("E687: Less targets than List items")]
    LessTargets,
    #[error("E688: More targets than List items")]
    MoreTargets,
    #[error("E734: Wrong variable type for {op}")]
    WrongTypeForCompound { op: String },
    #[error("E1098: String, List or Blob required")]
    ForRequiresIterable,

    // Lists, dictionaries, blobs
    #[error("E684: List index out of range: {index}")]
    ListIndexOutOfRange { index: i64 },
    #[error("E686: Argument of {function}() must be a List")]
    ListArgumentRequired { function: String },
    #[error("E689: Can only index a List, Dictionary or Blob")]
    NotIndexable,
    #[error("E695: Cannot index a Funcref")]
    CannotIndexFuncref,
    #[error("E698: Variable nested too deep for making a copy")]
    CopyTooDeep,
    #[error("E701: Invalid type for len()")]
    InvalidLenType,
    #[error("E709: [:] requires a List or Blob value")]
    SliceRequiresList,
    #[error("E710: List value has more items than target")]
    SliceTooManyItems,
    #[error("E711: List value does not have enough items")]
    SliceTooFewItems,
    #[error("E712: Argument of {function}() must be a List or Dictionary")]
    ListOrDictArgumentRequired { function: String },
    #[error("E714: List required")]
    ListRequired,
    #[error("E715: Dictionary required")]
    DictRequired,
    #[error("E716: Key not present in Dictionary: \"{key}\"")]
    KeyNotPresent { key: String },
    #[error("E719: Cannot slice a Dictionary")]
    CannotSliceDict,
    #[error("E726: Stride is zero")]
    StrideZero,
    #[error("E727: Start past end")]
    StartPastEnd,
    #[error("E737: Key already exists: {key}")]
    KeyExists { key: String },
    #[error("E896: Argument of {function}() must be a List, Dictionary or Blob")]
    ListDictOrBlobRequired { function: String },
    #[error("E897: List or Blob required")]
    ListOrBlobRequired,
    #[error("E979: Blob index out of range: {index}")]
    BlobIndexOutOfRange { index: i64 },

    // Coercion and operators
    #[error("E691: Can only compare List with List")]
    CompareListWithNonList,
    #[error("E692: Invalid operation for List")]
    InvalidListOperation,
    #[error("E694: Invalid operation for Funcrefs")]
    InvalidFuncrefOperation,
    #[error("E703: Using a Funcref as a Number")]
    FuncrefAsNumber,
    #[error("E728: Using a Dictionary as a Number")]
    DictAsNumber,
    #[error("E729: Using a Funcref as a String")]
    FuncrefAsString,
    #[error("E730: Using a List as a String")]
    ListAsString,
    #[error("E731: Using a Dictionary as a String")]
    DictAsString,
    #[error("E735: Can only compare Dictionary with Dictionary")]
    CompareDictWithNonDict,
    #[error("E736: Invalid operation for Dictionary")]
    InvalidDictOperation,
    #[error("E745: Using a List as a Number")]
    ListAsNumber,
    #[error("E804: Cannot use '%' with Float")]
    FloatModulo,
    #[error("E805: Using a Float as a Number")]
    FloatAsNumber,
    #[error("E806: Using a Float as a String")]
    FloatAsString,
    #[error("E808: Number or Float required")]
    NumberOrFloatRequired,
    #[error("E974: Using a Blob as a Number")]
    BlobAsNumber,
    #[error("E976: Using a Blob as a String")]
    BlobAsString,
    #[error("E978: Invalid operation for Blob")]
    InvalidBlobOperation,

    // Raised by scripts
    /// `:throw value`; the message is the thrown text.
    #[error("{value}")]
    Thrown { value: String },
    /// `:echoerr text`
    #[error("{message}")]
    EchoErr { message: String },

    #[error("{feature} is not supported")]
    NotImplemented { feature: String },
    #[error("{message}")]
    Custom { message: String },
}

/// Evaluation error.
#[derive(Clone, Debug, thiserror::Error)]
#[error("{message}")]
pub struct EvalError {
    pub kind: EvalErrorKind,
    /// Text seen by `:catch` patterns, `v:exception` and `v:errmsg`.
    pub message: String,
    /// Statement that raised the error.
    pub span: Option<Span>,
    /// `v:throwpoint` text: `function Outer[2]..Inner, line 3`.
    pub throwpoint: Option<String>,
}

impl EvalError {
    /// Error with a free-form message.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        EvalError {
            kind: EvalErrorKind::Custom {
                message: message.clone(),
            },
            message,
            span: None,
            throwpoint: None,
        }
    }

    pub fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        EvalError {
            kind,
            message,
            span: None,
            throwpoint: None,
        }
    }

    /// Attach the raising statement's span unless one is already set.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        if self.span.is_none() {
            self.span = Some(span);
        }
        self
    }

    /// Attach a throwpoint unless one is already set.
    #[must_use]
    pub fn with_throwpoint(mut self, throwpoint: impl FnOnce() -> String) -> Self {
        if self.throwpoint.is_none() {
            self.throwpoint = Some(throwpoint());
        }
        self
    }

    /// The `E###` code, absent for thrown values and `:echoerr` text.
    pub fn code(&self) -> Option<&str> {
        if matches!(
            self.kind,
            EvalErrorKind::Thrown { .. }
                | EvalErrorKind::EchoErr { .. }
                | EvalErrorKind::Custom { .. }
                | EvalErrorKind::NotImplemented { .. }
        ) {
            return None;
        }
        let (code, _) = self.message.split_once(':')?;
        (code.starts_with('E') && code[1..].bytes().all(|b| b.is_ascii_digit())).then_some(code)
    }

    /// Raised by `:throw` rather than by the runtime.
    pub fn is_thrown(&self) -> bool {
        matches!(self.kind, EvalErrorKind::Thrown { .. })
    }
}

/// Non-local exit from evaluation.
#[derive(Clone, Debug)]
pub enum ControlAction {
    /// A runtime error or user exception.
    Error(Box<EvalError>),
    /// `:finish`: stop the current script. Never caught by `:catch`.
    FinishScript,
}

impl ControlAction {
    pub fn as_error(&self) -> Option<&EvalError> {
        match self {
            ControlAction::Error(err) => Some(err),
            ControlAction::FinishScript => None,
        }
    }

    pub fn into_error(self) -> Option<EvalError> {
        match self {
            ControlAction::Error(err) => Some(*err),
            ControlAction::FinishScript => None,
        }
    }
}

impl From<EvalError> for ControlAction {
    fn from(err: EvalError) -> Self {
        ControlAction::Error(Box::new(err))
    }
}

impl fmt::Display for ControlAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlAction::Error(err) => write!(f, "{err}"),
            ControlAction::FinishScript => f.write_str(":finish"),
        }
    }
}

// Expressions

#[cold]
pub fn invalid_expression(expr: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidExpression {
        expr: expr.to_string(),
    })
}

#[cold]
pub fn invalid_argument(arg: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidArgument {
        arg: arg.to_string(),
    })
}

#[cold]
pub fn not_callable(what: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotCallable {
        what: what.to_string(),
    })
}

// Variables

#[cold]
pub fn read_only_variable(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ReadOnlyVariable {
        name: name.to_string(),
    })
}

#[cold]
pub fn no_such_variable(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoSuchVariable {
        name: name.to_string(),
    })
}

#[cold]
pub fn unknown_option(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownOption {
        name: name.to_string(),
    })
}

#[cold]
pub fn undefined_variable(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedVariable {
        name: name.to_string(),
    })
}

#[cold]
pub fn illegal_variable_name(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IllegalVariableName {
        name: name.to_string(),
    })
}

#[cold]
pub fn value_locked(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Locked {
        name: name.to_string(),
    })
}

#[cold]
pub fn const_existing(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ConstExisting {
        name: name.to_string(),
    })
}

// Functions

#[cold]
pub fn invalid_arguments(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidArguments {
        name: name.to_string(),
    })
}

#[cold]
pub fn unknown_function(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownFunction {
        name: name.to_string(),
    })
}

#[cold]
pub fn too_many_arguments(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TooManyArguments {
        name: name.to_string(),
    })
}

#[cold]
pub fn not_enough_arguments(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotEnoughArguments {
        name: name.to_string(),
    })
}

#[cold]
pub fn function_exists(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::FunctionExists {
        name: name.to_string(),
    })
}

#[cold]
pub fn function_in_use(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::FunctionInUse {
        name: name.to_string(),
    })
}

#[cold]
pub fn invalid_function_name(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidFunctionName {
        name: name.to_string(),
    })
}

#[cold]
pub fn unknown_function_delete(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownFunctionDelete {
        name: name.to_string(),
    })
}

#[cold]
pub fn function_delete_in_use(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::FunctionDeleteInUse {
        name: name.to_string(),
    })
}

#[cold]
pub fn call_depth_exceeded(limit: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::CallDepthExceeded { limit })
}

#[cold]
pub fn unknown_function_name(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UnknownFunctionName {
        name: name.to_string(),
    })
}

#[cold]
pub fn funcref_required() -> EvalError {
    EvalError::from_kind(EvalErrorKind::FuncrefRequired)
}

#[cold]
pub fn dict_function_without_dict(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::DictFunctionWithoutDict {
        name: name.to_string(),
    })
}

#[cold]
pub fn expected_dict() -> EvalError {
    EvalError::from_kind(EvalErrorKind::ExpectedDict)
}

#[cold]
pub fn partial_argument_type() -> EvalError {
    EvalError::from_kind(EvalErrorKind::PartialArgumentType)
}

#[cold]
pub fn closure_at_top_level(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ClosureAtTopLevel {
        name: name.to_string(),
    })
}

#[cold]
pub fn function_deleted(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::FunctionDeleted {
        name: name.to_string(),
    })
}

// Statements

#[cold]
pub fn return_outside_function() -> EvalError {
    EvalError::from_kind(EvalErrorKind::ReturnOutsideFunction)
}

#[cold]
pub fn continue_outside_loop() -> EvalError {
    EvalError::from_kind(EvalErrorKind::ContinueOutsideLoop)
}

#[cold]
pub fn break_outside_loop() -> EvalError {
    EvalError::from_kind(EvalErrorKind::BreakOutsideLoop)
}

#[cold]
pub fn vim_prefix_throw() -> EvalError {
    EvalError::from_kind(EvalErrorKind::VimPrefixThrow)
}

#[cold]
pub fn less_targets() -> EvalError {
    EvalError::from_kind(EvalErrorKind::LessTargets)
}

#[cold]
pub fn more_targets() -> EvalError {
    EvalError::from_kind(EvalErrorKind::MoreTargets)
}

#[cold]
pub fn wrong_type_for_compound(op: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::WrongTypeForCompound { op: op.to_string() })
}

#[cold]
pub fn for_requires_iterable() -> EvalError {
    EvalError::from_kind(EvalErrorKind::ForRequiresIterable)
}

// Containers

#[cold]
pub fn list_index_out_of_range(index: i64) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ListIndexOutOfRange { index })
}

#[cold]
pub fn list_argument_required(function: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ListArgumentRequired {
        function: function.to_string(),
    })
}

#[cold]
pub fn not_indexable() -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotIndexable)
}

#[cold]
pub fn cannot_index_funcref() -> EvalError {
    EvalError::from_kind(EvalErrorKind::CannotIndexFuncref)
}

#[cold]
pub fn copy_too_deep() -> EvalError {
    EvalError::from_kind(EvalErrorKind::CopyTooDeep)
}

#[cold]
pub fn invalid_len_type() -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidLenType)
}

#[cold]
pub fn slice_requires_list() -> EvalError {
    EvalError::from_kind(EvalErrorKind::SliceRequiresList)
}

#[cold]
pub fn slice_too_many_items() -> EvalError {
    EvalError::from_kind(EvalErrorKind::SliceTooManyItems)
}

#[cold]
pub fn slice_too_few_items() -> EvalError {
    EvalError::from_kind(EvalErrorKind::SliceTooFewItems)
}

#[cold]
pub fn list_or_dict_argument_required(function: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ListOrDictArgumentRequired {
        function: function.to_string(),
    })
}

#[cold]
pub fn list_required() -> EvalError {
    EvalError::from_kind(EvalErrorKind::ListRequired)
}

#[cold]
pub fn dict_required() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DictRequired)
}

#[cold]
pub fn key_not_present(key: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::KeyNotPresent {
        key: key.to_string(),
    })
}

#[cold]
pub fn cannot_slice_dict() -> EvalError {
    EvalError::from_kind(EvalErrorKind::CannotSliceDict)
}

#[cold]
pub fn stride_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::StrideZero)
}

#[cold]
pub fn start_past_end() -> EvalError {
    EvalError::from_kind(EvalErrorKind::StartPastEnd)
}

#[cold]
pub fn key_exists(key: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::KeyExists {
        key: key.to_string(),
    })
}

#[cold]
pub fn list_dict_or_blob_required(function: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ListDictOrBlobRequired {
        function: function.to_string(),
    })
}

#[cold]
pub fn list_or_blob_required() -> EvalError {
    EvalError::from_kind(EvalErrorKind::ListOrBlobRequired)
}

#[cold]
pub fn blob_index_out_of_range(index: i64) -> EvalError {
    EvalError::from_kind(EvalErrorKind::BlobIndexOutOfRange { index })
}

// Coercion and operators

#[cold]
pub fn compare_list_with_non_list() -> EvalError {
    EvalError::from_kind(EvalErrorKind::CompareListWithNonList)
}

#[cold]
pub fn invalid_list_operation() -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidListOperation)
}

#[cold]
pub fn invalid_funcref_operation() -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidFuncrefOperation)
}

#[cold]
pub fn compare_dict_with_non_dict() -> EvalError {
    EvalError::from_kind(EvalErrorKind::CompareDictWithNonDict)
}

#[cold]
pub fn invalid_dict_operation() -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidDictOperation)
}

#[cold]
pub fn invalid_blob_operation() -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidBlobOperation)
}

#[cold]
pub fn float_modulo() -> EvalError {
    EvalError::from_kind(EvalErrorKind::FloatModulo)
}

#[cold]
pub fn number_or_float_required() -> EvalError {
    EvalError::from_kind(EvalErrorKind::NumberOrFloatRequired)
}

// Raised by scripts

/// Exception raised by `:throw`.
pub fn thrown(value: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Thrown {
        value: value.into(),
    })
}

/// Error raised by `:echoerr`.
pub fn echo_err(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::EchoErr {
        message: message.into(),
    })
}

#[cold]
pub fn not_implemented(feature: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotImplemented {
        feature: feature.to_string(),
    })
}
