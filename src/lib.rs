//! Core library for the Ravun programming language: lexing, parsing,
//! semantic analysis, and a tree-walking interpreter, plus REPL support.

pub mod analyzer;
pub mod ast;
pub mod diagnostics;
pub mod environment;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod runtime;
pub mod stdlib;
pub mod symbols;
pub mod types;
pub mod value;

pub use diagnostics::{Diagnostic, DiagnosticKind, RavunError, Severity, SourceSpan};
pub use repl::Repl;
pub use runtime::Interpreter;
