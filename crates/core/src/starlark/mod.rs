//! Starlark literal formatting

pub mod fmt;

pub use fmt::{
    escape_string, indentation, print_bool, print_compact_list, print_dict, print_list,
    print_string_dict, quote,
};
