//! Evaluates lambda-calculus statements given in the box-tree program
//! representation, by capture-avoiding substitution down to a normal form.

use std::borrow::Cow;
use std::collections::{HashSet, VecDeque};
use std::fmt::Display;

use log::{debug, trace};

use crate::box_tree_impl::box_tree_ast::{
    get_all_free_variables, get_all_variables, rename_free_variable, ExprNode, Statement,
};
use crate::box_tree_impl::box_tree_builtins::Builtin;
use crate::box_tree_impl::box_tree_environment::Environment;

/// Bound names already introduced along the current reduction path. Only
/// consulted to decide when a parameter has to be renamed.
pub type UsedNames = HashSet<String>;

/// Substitution depth allowed when no other limit is configured.
pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// Errors produced while evaluating a parsed statement.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum RuntimeError {
    UndefinedVariable { var_name: String },
    ApplyAtom,
    BuiltinMisuse { builtin: Builtin },
    IntegerOverflow { builtin: Builtin },
    RecursionLimit,
}

/// Display trait implementation for RuntimeError.
impl Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UndefinedVariable { var_name } => {
                return write!(f, "undefined variable {}", var_name);
            }

            Self::ApplyAtom => {
                return write!(f, "can't apply an atom");
            }

            Self::BuiltinMisuse { builtin } => match builtin {
                Builtin::Plus => return write!(f, "+ takes two or more integers"),
                Builtin::Increment => return write!(f, "1+ takes only one integer"),
            },

            Self::IntegerOverflow { builtin } => {
                return write!(f, "integer overflow in {}", builtin.name());
            }

            Self::RecursionLimit => {
                return write!(f, "maximum recursion depth exceeded");
            }
        }
    }
}

impl std::error::Error for RuntimeError {}

/// Picks a name for `formal_param` that clashes with nothing in `used` and
/// with no variable of `fn_body`, by appending primes.
fn fresh_name(formal_param: &str, fn_body: &ExprNode, used: &UsedNames) -> String {
    let fn_body_vars = get_all_variables(fn_body);
    let mut new_formal_param = String::from(formal_param);

    while used.contains(&new_formal_param) || fn_body_vars.contains(new_formal_param.as_str()) {
        new_formal_param.push('\'');
    }

    return new_formal_param;
}

/// Renames `formal_param` inside `fn_body` if the name is already in use on
/// this reduction path, so that substituting into the body can never capture
/// a variable of the same name.
fn perform_alpha_conversion<'a>(
    formal_param: &str,
    fn_body: &'a ExprNode,
    used: &UsedNames,
) -> (String, Cow<'a, ExprNode>) {
    if !used.contains(formal_param) {
        return (String::from(formal_param), Cow::Borrowed(fn_body));
    }

    let new_formal_param = fresh_name(formal_param, fn_body, used);
    trace!("Alpha converting {} to {}", formal_param, new_formal_param);

    let renamed_body = rename_free_variable(formal_param, new_formal_param.as_str(), fn_body);
    return (new_formal_param, Cow::Owned(renamed_body));
}

/// Applies `\formal_param.fn_body` to `actual_arg`: binds the (possibly
/// renamed) parameter to the argument in a new frame and substitutes into
/// the body.
fn perform_beta_reduction(
    formal_param: &str,
    fn_body: &ExprNode,
    actual_arg: ExprNode,
    env: &Environment,
    used: &UsedNames,
    depth_budget: usize,
) -> Result<ExprNode, RuntimeError> {
    let (formal_param, fn_body) = perform_alpha_conversion(formal_param, fn_body, used);
    trace!("Beta reducing λ{}.{} with {}", formal_param, fn_body, actual_arg);

    let mut frame = env.new_child();
    frame.set(formal_param.as_str(), actual_arg);

    return substitute(&fn_body, &frame, used, depth_budget);
}

/// Applies `head` to `args`, left to right. Every term must already be
/// reduced.
///
/// Abstractions are folded over the arguments one at a time. A builtin fires
/// once none of its arguments contains a free variable. A literal applied to
/// anything is an error at any point of the fold. A bound variable at the
/// head leaves the application as is.
fn apply_terms(
    head: ExprNode,
    args: Vec<ExprNode>,
    env: &Environment,
    used: &UsedNames,
    depth_budget: usize,
) -> Result<ExprNode, RuntimeError> {
    let mut head = head;
    let mut args: VecDeque<ExprNode> = args.into();

    while let Some(actual_arg) = args.pop_front() {
        match head {
            ExprNode::FnDef {
                formal_param,
                fn_body,
            } => {
                head = perform_beta_reduction(
                    formal_param.as_str(),
                    &fn_body,
                    actual_arg,
                    env,
                    used,
                    depth_budget,
                )?;
            }

            ExprNode::Builtin { builtin } => {
                args.push_front(actual_arg);
                let args: Vec<ExprNode> = args.into();

                if args.iter().any(|arg| !get_all_free_variables(arg).is_empty()) {
                    return Ok(ExprNode::application(ExprNode::Builtin { builtin: builtin }, args));
                }

                return builtin.apply(&args);
            }

            ExprNode::Literal { .. } => {
                return Err(RuntimeError::ApplyAtom);
            }

            // A reduced application is already stuck, and application is
            // left-associative, so further arguments just extend it.
            ExprNode::FnApp { mut terms } => {
                terms.push(actual_arg);
                terms.extend(args);
                return Ok(ExprNode::FnApp { terms: terms });
            }

            stuck_head @ ExprNode::Var { .. } => {
                args.push_front(actual_arg);
                return Ok(ExprNode::application(stuck_head, args.into()));
            }
        }
    }

    return Ok(head);
}

/// Reduces `expr` to normal form against `env`.
///
/// `used` holds the parameters bound on the path from the root of the
/// reduction down to `expr`; a variable found there is left as is, any other
/// variable is looked up in `env`. `depth_budget` bounds the recursion so
/// that divergent terms fail instead of exhausting the stack.
pub fn substitute(
    expr: &ExprNode,
    env: &Environment,
    used: &UsedNames,
    depth_budget: usize,
) -> Result<ExprNode, RuntimeError> {
    if depth_budget == 0 {
        return Err(RuntimeError::RecursionLimit);
    }
    let depth_budget = depth_budget - 1;

    match expr {
        ExprNode::FnDef {
            formal_param,
            fn_body,
        } => {
            let (formal_param, fn_body) = perform_alpha_conversion(formal_param, fn_body, used);

            // The parameter stands for itself until the abstraction is applied.
            let mut frame = env.new_child();
            frame.set(formal_param.as_str(), ExprNode::var(formal_param.as_str()));

            let mut inner_used = used.clone();
            inner_used.insert(formal_param.clone());

            let reduced_body = substitute(&fn_body, &frame, &inner_used, depth_budget)?;

            return Ok(ExprNode::FnDef {
                formal_param: formal_param,
                fn_body: Box::new(reduced_body),
            });
        }

        ExprNode::FnApp { terms } => match terms.split_first() {
            Some((head, args)) => {
                let reduced_head = substitute(head, env, used, depth_budget)?;
                let reduced_args = args
                    .iter()
                    .map(|term| substitute(term, env, used, depth_budget))
                    .collect::<Result<Vec<ExprNode>, RuntimeError>>()?;

                return apply_terms(reduced_head, reduced_args, env, used, depth_budget);
            }
            None => return Ok(expr.clone()),
        },

        ExprNode::Var { var_name } => {
            if used.contains(var_name) {
                return Ok(expr.clone());
            }

            match env.find(var_name) {
                // Values are substituted again so their parameters get renamed
                // away from the names bound at this point.
                Some(value) => return substitute(value, env, used, depth_budget),
                None => {
                    return Err(RuntimeError::UndefinedVariable {
                        var_name: var_name.clone(),
                    })
                }
            }
        }

        ExprNode::Literal { .. } | ExprNode::Builtin { .. } => {
            return Ok(expr.clone());
        }
    }
}

/// Evaluates one statement against the global frame. A `let` stores its
/// reduced definition in `global_env` only once the definition has reduced
/// without error; nothing else ever writes to the global frame.
pub fn evaluate_statement(
    statement: &Statement,
    global_env: &mut Environment,
    max_depth: usize,
) -> Result<ExprNode, RuntimeError> {
    match statement {
        Statement::Let { def_name, def_body } => {
            let value = substitute(def_body, global_env, &UsedNames::new(), max_depth)?;
            debug!("Binding {} to {}", def_name, value);

            global_env.set(def_name.as_str(), value.clone());
            return Ok(value);
        }

        Statement::Eval { eval_body } => {
            let value = substitute(eval_body, global_env, &UsedNames::new(), max_depth)?;
            debug!("Evaluated {} to {}", eval_body, value);
            return Ok(value);
        }
    }
}
