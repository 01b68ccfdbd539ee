pub mod ast;
pub mod check;
pub mod dump;
pub mod input;
pub mod ir;
pub mod lex;
pub mod run_common;

#[cfg(test)]
mod input_tests;
