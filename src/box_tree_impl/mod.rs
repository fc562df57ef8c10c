//! Parser and evaluator code that represents expressions as a tree where
//! each node references other nodes via `Box` smart pointers.

pub mod box_tree_ast;
pub mod box_tree_builtins;
pub mod box_tree_environment;
pub mod box_tree_execution;
pub mod box_tree_recursive_descent_parsing;
