//! Rule-string compilation.
//!
//! `parser` decodes individual tokens into a typed AST, `compiler` turns a
//! field's tokens into a `FieldValidator`, and `checks` holds the executable
//! steps those validators are made of.

pub mod checks;
pub mod compiler;
pub mod parser;
