//! This crate contains code for an interpreter of the untyped lambda calculus
//! extended with integer literals, two integer builtins and top-level `let`.

pub mod box_tree_impl;
pub mod end_to_end;
pub mod lexical_analysis;
pub mod repl;
