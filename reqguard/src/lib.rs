// reqguard/src/lib.rs
//! # reqguard CLI
//!
//! Command-line front end for `reqguard-core`: validates JSON records against
//! rule files and sanitizes JSON documents. The binary in `main.rs` only
//! parses arguments and dispatches into `commands`.

pub mod cli;
pub mod commands;
pub mod logger;
