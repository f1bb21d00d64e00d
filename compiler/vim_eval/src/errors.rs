//! Error constructors used by the evaluator.
//!
//! One import point for every `E###` message the interpreter raises. The
//! constructors live in `vim_value` next to [`EvalErrorKind`]; this module
//! groups them the way the interpreter uses them.
//!
//! ```ignore
//! use vim_eval::errors::{undefined_variable, list_index_out_of_range};
//! ```

pub use vim_value::{ControlAction, EvalError, EvalErrorKind, EvalResult};

// Expressions

pub use vim_value::errors::{invalid_argument, invalid_expression, not_callable};

// Variables

pub use vim_value::errors::{
    const_existing, illegal_variable_name, no_such_variable, read_only_variable,
    undefined_variable, unknown_option, value_locked,
};

// Functions

pub use vim_value::errors::{
    call_depth_exceeded, closure_at_top_level, dict_function_without_dict, expected_dict,
    funcref_required, function_delete_in_use, function_deleted, function_exists,
    function_in_use, invalid_arguments, invalid_function_name, not_enough_arguments,
    partial_argument_type, too_many_arguments, unknown_function, unknown_function_delete,
    unknown_function_name,
};

// Statements

pub use vim_value::errors::{
    break_outside_loop, continue_outside_loop, for_requires_iterable, less_targets, more_targets,
    return_outside_function, vim_prefix_throw, wrong_type_for_compound,
};

// Lists, dictionaries and blobs

pub use vim_value::errors::{
    blob_index_out_of_range, cannot_index_funcref, cannot_slice_dict, copy_too_deep,
    dict_required, invalid_len_type, key_exists, key_not_present, list_argument_required,
    list_dict_or_blob_required, list_index_out_of_range, list_or_blob_required,
    list_or_dict_argument_required, list_required, not_indexable, slice_requires_list,
    slice_too_few_items, slice_too_many_items, start_past_end, stride_zero,
};

// Operators

pub use vim_value::errors::{
    compare_dict_with_non_dict, compare_list_with_non_list, float_modulo, invalid_blob_operation,
    invalid_dict_operation, invalid_funcref_operation, invalid_list_operation,
    number_or_float_required,
};

// Raised by scripts

pub use vim_value::errors::{echo_err, not_implemented, thrown};
