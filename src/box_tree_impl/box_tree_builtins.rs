//! The fixed table of builtin integer functions. Builtin names are reserved:
//! the parser refuses them as `let` names and as lambda parameters.

use crate::box_tree_impl::box_tree_ast::ExprNode;
use crate::box_tree_impl::box_tree_execution::RuntimeError;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Builtin {
    /// `+`: sum of two or more integers.
    Plus,
    /// `1+`: increment of exactly one integer.
    Increment,
}

/// Every builtin, in registry order.
pub const ALL_BUILTINS: [Builtin; 2] = [Builtin::Plus, Builtin::Increment];

impl Builtin {
    /// Looks up a builtin by its reserved name.
    pub fn from_name(name: &str) -> Option<Builtin> {
        return ALL_BUILTINS
            .iter()
            .copied()
            .find(|builtin| builtin.name() == name);
    }

    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Plus => "+",
            Builtin::Increment => "1+",
        }
    }

    /// Applies the builtin to already reduced arguments. Every argument has
    /// to be an integer literal and the arity has to match.
    pub fn apply(&self, args: &[ExprNode]) -> Result<ExprNode, RuntimeError> {
        let arity_ok = match self {
            Builtin::Plus => args.len() >= 2,
            Builtin::Increment => args.len() == 1,
        };

        let int_args: Option<Vec<i64>> = args
            .iter()
            .map(|arg| match arg {
                ExprNode::Literal { value } => Some(*value),
                _ => None,
            })
            .collect();

        let int_args = match (arity_ok, int_args) {
            (true, Some(int_args)) => int_args,
            _ => {
                return Err(RuntimeError::BuiltinMisuse { builtin: *self });
            }
        };

        let result = match self {
            Builtin::Plus => int_args
                .iter()
                .try_fold(0i64, |sum, value| sum.checked_add(*value)),
            Builtin::Increment => int_args[0].checked_add(1),
        };

        match result {
            Some(value) => return Ok(ExprNode::Literal { value: value }),
            None => return Err(RuntimeError::IntegerOverflow { builtin: *self }),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn literals(values: &[i64]) -> Vec<ExprNode> {
        values
            .iter()
            .map(|value| ExprNode::Literal { value: *value })
            .collect()
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Builtin::from_name("+"), Some(Builtin::Plus));
        assert_eq!(Builtin::from_name("1+"), Some(Builtin::Increment));
        assert_eq!(Builtin::from_name("plus"), None);
        for builtin in ALL_BUILTINS {
            assert_eq!(Builtin::from_name(builtin.name()), Some(builtin));
        }
    }

    #[test]
    fn test_plus() {
        assert_eq!(
            Builtin::Plus.apply(&literals(&[2, 3])),
            Ok(ExprNode::Literal { value: 5 })
        );
        assert_eq!(
            Builtin::Plus.apply(&literals(&[1, 2, 3, 4])),
            Ok(ExprNode::Literal { value: 10 })
        );
    }

    #[test]
    fn test_increment() {
        assert_eq!(
            Builtin::Increment.apply(&literals(&[0])),
            Ok(ExprNode::Literal { value: 1 })
        );
    }

    // Wrong arity and non-integer arguments are runtime errors.
    #[test]
    fn test_misuse() {
        let misuse_cases = vec![
            (Builtin::Plus, literals(&[1])),
            (Builtin::Plus, vec![]),
            (Builtin::Increment, literals(&[1, 2])),
            (Builtin::Increment, vec![]),
            (
                Builtin::Plus,
                vec![
                    ExprNode::Literal { value: 1 },
                    ExprNode::fn_def("x", ExprNode::var("x")),
                ],
            ),
            (Builtin::Increment, vec![ExprNode::var("x")]),
        ];

        for (builtin, args) in misuse_cases {
            assert_eq!(
                builtin.apply(&args),
                Err(RuntimeError::BuiltinMisuse { builtin: builtin })
            );
        }

        assert_eq!(
            RuntimeError::BuiltinMisuse {
                builtin: Builtin::Plus
            }
            .to_string(),
            "+ takes two or more integers"
        );
        assert_eq!(
            RuntimeError::BuiltinMisuse {
                builtin: Builtin::Increment
            }
            .to_string(),
            "1+ takes only one integer"
        );
    }

    #[test]
    fn test_overflow() {
        assert_eq!(
            Builtin::Plus.apply(&literals(&[i64::MAX, 1])),
            Err(RuntimeError::IntegerOverflow {
                builtin: Builtin::Plus
            })
        );
        assert_eq!(
            Builtin::Increment.apply(&literals(&[i64::MAX])),
            Err(RuntimeError::IntegerOverflow {
                builtin: Builtin::Increment
            })
        );
    }
}
