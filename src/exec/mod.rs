// src/exec/mod.rs

//! Recipes that tasks run.
//!
//! The engine only sees [`crate::dag::Action`]; this module provides the
//! concrete shell-command recipe used for task files.

pub mod shell;

pub use shell::ShellAction;
