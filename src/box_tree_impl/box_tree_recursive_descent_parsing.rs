//! Recursive descent parser that constructs lambda-calculus statements in the
//! box-tree representation from a vector of tokens.
//!
//! The parser works on the output of `group_tokens`, so parenthesized
//! sub-expressions arrive as nested groups and never need to be matched here.

use log::debug;

use crate::box_tree_impl::box_tree_ast::{ExprNode, Statement};
use crate::box_tree_impl::box_tree_builtins::Builtin;
use crate::lexical_analysis::{group_tokens, SyntaxError, Token, TokenClass, TokenTree};

// Builds the "Expected ..." error, naming what was found if anything.
fn expected_error(expected: String, found: Option<&TokenTree>) -> SyntaxError {
    return SyntaxError::ExpectedToken {
        expected: expected,
        found_token_text: found.map(|tree| String::from(tree.diagnostic_text())),
    };
}

// Checks that the tree at `tree` has the requested class.
fn try_token_class(
    tree: Option<&TokenTree>,
    token_class: TokenClass,
    expected: &str,
) -> Result<(), SyntaxError> {
    match tree.and_then(TokenTree::token_class) == Some(token_class) {
        true => return Ok(()),
        false => return Err(expected_error(String::from(expected), tree)),
    };
}

/// Tries to read a name that may be bound by `let` or `\`. Keywords, numbers,
/// punctuation and builtin names are all refused.
fn try_binding_name_rule(tree: Option<&TokenTree>, expected: &str) -> Result<String, SyntaxError> {
    match tree {
        Some(TokenTree::Leaf(Token {
            token_class: TokenClass::Name,
            token_text,
        })) if Builtin::from_name(token_text).is_none() => {
            return Ok(token_text.clone());
        }
        _ => return Err(expected_error(String::from(expected), tree)),
    }
}

/// Tries to parse the part of `\[IDENTIFIER].[EXPR]` after the backslash.
fn try_lambda_rule(rest: &[TokenTree]) -> Result<ExprNode, SyntaxError> {
    let formal_param = try_binding_name_rule(rest.first(), "variable after λ")?;
    try_token_class(rest.get(1), TokenClass::Dot, "dot")?;

    let body = rest.get(2..).unwrap_or_default();
    if body.is_empty() {
        return Err(expected_error(format!("body for λ{}", formal_param), None));
    }

    let fn_body = try_expr_rule(body)?;

    return Ok(ExprNode::FnDef {
        formal_param: formal_param,
        fn_body: Box::new(fn_body),
    });
}

/// Tries to parse according to the production `atom -> (e) | v | n`.
fn try_atom_rule(tree: &TokenTree) -> Result<ExprNode, SyntaxError> {
    match tree {
        TokenTree::Group(inner) => {
            return try_expr_rule(inner);
        }

        TokenTree::Leaf(token) => match token.token_class {
            TokenClass::Name => match Builtin::from_name(&token.token_text) {
                Some(builtin) => return Ok(ExprNode::Builtin { builtin: builtin }),
                None => return Ok(ExprNode::var(&token.token_text)),
            },

            TokenClass::Number => match token.token_text.parse::<i64>() {
                Ok(value) => return Ok(ExprNode::Literal { value: value }),
                Err(_) => {
                    return Err(SyntaxError::InvalidIntegerLiteral {
                        literal_text: token.token_text.clone(),
                    })
                }
            },

            _ => {
                return Err(SyntaxError::UnexpectedToken {
                    found_token_text: token.token_text.clone(),
                })
            }
        },
    }
}

/// Tries to parse a chain of atoms as one left-associative application. A
/// lambda may only appear as an argument when parenthesized.
fn try_application_rule(
    head_tree: &TokenTree,
    arg_trees: &[TokenTree],
) -> Result<ExprNode, SyntaxError> {
    let head = try_atom_rule(head_tree)?;
    let args = arg_trees
        .iter()
        .map(try_atom_rule)
        .collect::<Result<Vec<ExprNode>, SyntaxError>>()?;

    return Ok(ExprNode::application(head, args));
}

/// Tries to parse according to the production `e -> lambda | atom+`.
fn try_expr_rule(trees: &[TokenTree]) -> Result<ExprNode, SyntaxError> {
    match trees.split_first() {
        None => return Err(expected_error(String::from("expression"), None)),
        Some((first, rest)) if first.token_class() == Some(TokenClass::Lambda) => {
            return try_lambda_rule(rest);
        }
        Some((first, rest)) => return try_application_rule(first, rest),
    }
}

/// Tries to parse the part of a `let` statement after the keyword.
fn try_let_statement_rule(rest: &[TokenTree]) -> Result<Statement, SyntaxError> {
    let def_name = try_binding_name_rule(rest.first(), "variable after let")?;
    try_token_class(
        rest.get(1),
        TokenClass::Equals,
        format!("equal sign after `{}'", def_name).as_str(),
    )?;

    let definition = rest.get(2..).unwrap_or_default();
    if definition.is_empty() {
        return Err(expected_error(
            format!("definition for variable `{}'", def_name),
            None,
        ));
    }

    let def_body = try_expr_rule(definition)?;

    return Ok(Statement::Let {
        def_name: def_name,
        def_body: Box::new(def_body),
    });
}

/// Uses recursive descent to parse the tokens of one input line into a
/// `Statement`. Reports the first syntax violation encountered.
pub fn parse_recursive_descent(tokens: &[Token]) -> Result<Statement, SyntaxError> {
    let grouped = group_tokens(tokens)?;

    let statement = match grouped.first().and_then(TokenTree::token_class) {
        Some(TokenClass::Let) => try_let_statement_rule(&grouped[1..])?,
        _ => Statement::Eval {
            eval_body: Box::new(try_expr_rule(&grouped)?),
        },
    };

    debug!("Parsed statement: {}", statement);

    return Ok(statement);
}
