/// Data structures to represent lambda calculus expressions, and some utility
/// functions to display and manipulate them.
use std::collections::HashSet;

use crate::box_tree_impl::box_tree_builtins::Builtin;

/// Represents one parsed input line: a top-level `let` binding or a plain
/// expression to evaluate.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Statement {
    Let {
        def_name: String,
        def_body: Box<ExprNode>,
    },
    Eval {
        eval_body: Box<ExprNode>,
    },
}

/// Represents a lambda-calculus expression.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ExprNode {
    FnDef {
        formal_param: String,
        fn_body: Box<ExprNode>,
    },
    /// Left-associative application of `terms[0]` to the rest. Always holds at
    /// least two terms; build it with `ExprNode::application`.
    FnApp {
        terms: Vec<ExprNode>,
    },
    Var {
        var_name: String,
    },
    Literal {
        value: i64,
    },
    Builtin {
        builtin: Builtin,
    },
}

impl ExprNode {
    pub fn var(var_name: &str) -> ExprNode {
        return ExprNode::Var {
            var_name: String::from(var_name),
        };
    }

    pub fn fn_def(formal_param: &str, fn_body: ExprNode) -> ExprNode {
        return ExprNode::FnDef {
            formal_param: String::from(formal_param),
            fn_body: Box::new(fn_body),
        };
    }

    /// Builds the application of `head` to `args`. With no arguments this is
    /// just `head`.
    pub fn application(head: ExprNode, args: Vec<ExprNode>) -> ExprNode {
        if args.is_empty() {
            return head;
        }

        let mut terms = Vec::with_capacity(args.len() + 1);
        terms.push(head);
        terms.extend(args);
        return ExprNode::FnApp { terms: terms };
    }

    /// True for nodes that need parentheses when they appear inside an
    /// application.
    pub fn is_compound(&self) -> bool {
        matches!(self, ExprNode::FnDef { .. } | ExprNode::FnApp { .. })
    }
}

// Helper function to produce a string representation of an ExprNode.
fn expr_node_to_string_helper(expr_node: &ExprNode, string_so_far: &mut String) {
    match expr_node {
        ExprNode::Var { var_name } => {
            string_so_far.push_str(var_name.as_str());
        }
        ExprNode::Literal { value } => {
            string_so_far.push_str(value.to_string().as_str());
        }
        ExprNode::Builtin { builtin } => {
            string_so_far.push_str(builtin.name());
        }
        ExprNode::FnApp { terms } => {
            for (idx, term) in terms.iter().enumerate() {
                if idx > 0 {
                    string_so_far.push(' ');
                }

                // Nested definitions and applications are parenthesized so the
                // output parses back to the same tree.
                if term.is_compound() {
                    string_so_far.push('(');
                    expr_node_to_string_helper(term, string_so_far);
                    string_so_far.push(')');
                } else {
                    expr_node_to_string_helper(term, string_so_far);
                }
            }
        }
        ExprNode::FnDef {
            formal_param,
            fn_body,
        } => {
            string_so_far.push('λ');
            string_so_far.push_str(formal_param.as_str());
            string_so_far.push('.');
            expr_node_to_string_helper(fn_body, string_so_far);
        }
    };
}

/// Converts an expr node to concrete syntax.
pub fn expr_node_to_string(expr_node: &ExprNode) -> String {
    let mut out_string = String::new();
    expr_node_to_string_helper(expr_node, &mut out_string);
    return out_string;
}

// Display trait implementation for ExprNode using expr_node_to_string function.
impl std::fmt::Display for ExprNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(f, "{}", expr_node_to_string(self).as_str());
    }
}

impl std::fmt::Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Statement::Let { def_name, def_body } => {
                return write!(f, "let {} = {}", def_name, def_body);
            }
            Statement::Eval { eval_body } => {
                return write!(f, "{}", eval_body);
            }
        }
    }
}

/// Computes the free variables in the given lambda calculus expression.
pub fn get_all_free_variables(expr_body: &ExprNode) -> HashSet<&str> {
    match expr_body {
        ExprNode::Var { var_name } => {
            return HashSet::from([var_name.as_ref()]);
        }
        ExprNode::Literal { .. } | ExprNode::Builtin { .. } => {
            return HashSet::new();
        }
        ExprNode::FnApp { terms } => {
            return terms.iter().flat_map(get_all_free_variables).collect();
        }
        ExprNode::FnDef {
            formal_param,
            fn_body,
        } => {
            let mut fn_body_free_vars = get_all_free_variables(fn_body);
            fn_body_free_vars.remove(formal_param.as_str());
            return fn_body_free_vars;
        }
    };
}

/// Finds all variables used in the given lambda calculus expression, bound
/// parameters included.
pub fn get_all_variables(expr_body: &ExprNode) -> HashSet<&str> {
    match expr_body {
        ExprNode::Var { var_name } => {
            return HashSet::from([var_name.as_ref()]);
        }
        ExprNode::Literal { .. } | ExprNode::Builtin { .. } => {
            return HashSet::new();
        }
        ExprNode::FnApp { terms } => {
            return terms.iter().flat_map(get_all_variables).collect();
        }
        ExprNode::FnDef {
            formal_param,
            fn_body,
        } => {
            let mut fn_body_vars = get_all_variables(fn_body);
            fn_body_vars.insert(formal_param.as_str());
            return fn_body_vars;
        }
    };
}

/// Returns a copy of `expr` where every free occurrence of `old_var_name` is
/// replaced by `new_var_name`. Occurrences under a parameter that shadows
/// `old_var_name` are left alone. The caller must make sure `new_var_name`
/// is not bound anywhere inside `expr`.
pub fn rename_free_variable(old_var_name: &str, new_var_name: &str, expr: &ExprNode) -> ExprNode {
    match expr {
        ExprNode::Var { var_name } => match var_name.as_str() == old_var_name {
            true => return ExprNode::var(new_var_name),
            false => return expr.clone(),
        },
        ExprNode::Literal { .. } | ExprNode::Builtin { .. } => {
            return expr.clone();
        }
        ExprNode::FnApp { terms } => {
            return ExprNode::FnApp {
                terms: terms
                    .iter()
                    .map(|term| rename_free_variable(old_var_name, new_var_name, term))
                    .collect(),
            };
        }
        ExprNode::FnDef {
            formal_param,
            fn_body,
        } => {
            if formal_param.as_str() == old_var_name {
                return expr.clone();
            }
            return ExprNode::FnDef {
                formal_param: formal_param.clone(),
                fn_body: Box::new(rename_free_variable(old_var_name, new_var_name, fn_body)),
            };
        }
    }
}

// Compares two expressions, tracking the binders in scope on each side so
// bound variables are compared by position instead of by name.
fn alpha_equivalent_helper<'a>(
    left: &'a ExprNode,
    right: &'a ExprNode,
    left_binders: &mut Vec<&'a str>,
    right_binders: &mut Vec<&'a str>,
) -> bool {
    match (left, right) {
        (ExprNode::Var { var_name: left_name }, ExprNode::Var { var_name: right_name }) => {
            let left_pos = left_binders.iter().rposition(|name| *name == left_name.as_str());
            let right_pos = right_binders.iter().rposition(|name| *name == right_name.as_str());

            match (left_pos, right_pos) {
                (None, None) => return left_name == right_name,
                (Some(left_pos), Some(right_pos)) => return left_pos == right_pos,
                _ => return false,
            }
        }
        (ExprNode::Literal { value: left_value }, ExprNode::Literal { value: right_value }) => {
            return left_value == right_value;
        }
        (ExprNode::Builtin { builtin: left_fn }, ExprNode::Builtin { builtin: right_fn }) => {
            return left_fn == right_fn;
        }
        (ExprNode::FnApp { terms: left_terms }, ExprNode::FnApp { terms: right_terms }) => {
            return left_terms.len() == right_terms.len()
                && left_terms.iter().zip(right_terms.iter()).all(|(l, r)| {
                    alpha_equivalent_helper(l, r, left_binders, right_binders)
                });
        }
        (
            ExprNode::FnDef {
                formal_param: left_param,
                fn_body: left_body,
            },
            ExprNode::FnDef {
                formal_param: right_param,
                fn_body: right_body,
            },
        ) => {
            left_binders.push(left_param.as_str());
            right_binders.push(right_param.as_str());

            let result = alpha_equivalent_helper(left_body, right_body, left_binders, right_binders);

            left_binders.pop();
            right_binders.pop();
            return result;
        }
        _ => return false,
    }
}

/// Checks whether two expressions are equal up to renaming of bound
/// variables. Reduction picks primed names depending on what is already
/// bound, so callers comparing results should use this rather than `==`.
pub fn alpha_equivalent(left: &ExprNode, right: &ExprNode) -> bool {
    return alpha_equivalent_helper(left, right, &mut Vec::new(), &mut Vec::new());
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn church_succ() -> ExprNode {
        ExprNode::fn_def(
            "n",
            ExprNode::fn_def(
                "f",
                ExprNode::fn_def(
                    "x",
                    ExprNode::application(
                        ExprNode::var("f"),
                        vec![ExprNode::application(
                            ExprNode::var("n"),
                            vec![ExprNode::var("f"), ExprNode::var("x")],
                        )],
                    ),
                ),
            ),
        )
    }

    #[test]
    fn test_expr_node_to_string_1() {
        assert_eq!(expr_node_to_string(&church_succ()), "λn.λf.λx.f (n f x)");
    }

    // Abstractions inside an application get parenthesized.
    #[test]
    fn test_expr_node_to_string_application_parens() {
        let expr = ExprNode::application(
            ExprNode::fn_def("x", ExprNode::var("x")),
            vec![
                ExprNode::Literal { value: 42 },
                ExprNode::Builtin {
                    builtin: Builtin::Increment,
                },
            ],
        );

        assert_eq!(expr.to_string(), "(λx.x) 42 1+");
    }

    #[test]
    fn test_statement_display() {
        let statement = Statement::Let {
            def_name: String::from("id"),
            def_body: Box::new(ExprNode::fn_def("x", ExprNode::var("x"))),
        };

        assert_eq!(statement.to_string(), "let id = λx.x");
    }

    #[test]
    fn test_application_without_args_is_head() {
        assert_eq!(
            ExprNode::application(ExprNode::var("x"), Vec::new()),
            ExprNode::var("x")
        );
        assert_eq!(
            ExprNode::application(ExprNode::var("f"), vec![ExprNode::var("x")]),
            ExprNode::FnApp {
                terms: vec![ExprNode::var("f"), ExprNode::var("x")]
            }
        );
    }

    #[test]
    fn test_free_variables() {
        let expr = ExprNode::fn_def(
            "x",
            ExprNode::application(ExprNode::var("x"), vec![ExprNode::var("y")]),
        );

        assert_eq!(get_all_free_variables(&expr), HashSet::from(["y"]));
        assert_eq!(get_all_variables(&expr), HashSet::from(["x", "y"]));
        assert!(get_all_free_variables(&church_succ()).is_empty());
    }

    // Renaming must stop at a parameter that shadows the old name.
    #[test]
    fn test_rename_free_variable_respects_shadowing() {
        let expr = ExprNode::application(
            ExprNode::var("x"),
            vec![ExprNode::fn_def("x", ExprNode::var("x"))],
        );

        let renamed = rename_free_variable("x", "x'", &expr);

        assert_eq!(renamed.to_string(), "x' (λx.x)");
    }

    #[test]
    fn test_alpha_equivalent() {
        let left = ExprNode::fn_def("y", ExprNode::fn_def("x", ExprNode::var("x")));
        let right = ExprNode::fn_def("y", ExprNode::fn_def("x'", ExprNode::var("x'")));
        let wrong = ExprNode::fn_def("y", ExprNode::fn_def("x", ExprNode::var("y")));

        assert!(alpha_equivalent(&left, &right));
        assert!(!alpha_equivalent(&left, &wrong));
        assert!(!alpha_equivalent(&ExprNode::var("a"), &ExprNode::var("b")));
    }
}
