//! Turns a line of source text into tokens, and groups those tokens by
//! parentheses so the parser can work on a nested structure.

use std::fmt::Display;

use lazy_static::lazy_static;
use regex::Regex;

/// The different classes of tokens that compose the language.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum TokenClass {
    Let,
    Number,
    Lambda,
    Dot,
    LeftParen,
    RightParen,
    Equals,
    Name,
}

/// Represents a single token of the language.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Token {
    pub token_class: TokenClass,
    pub token_text: String,
}

impl Token {
    pub fn new(token_class: TokenClass, token_text: &str) -> Token {
        return Token {
            token_class: token_class,
            token_text: String::from(token_text),
        };
    }
}

/// A token, or a parenthesized group of tokens.
#[derive(PartialEq, Eq, Debug, Clone)]
pub enum TokenTree {
    Leaf(Token),
    Group(Vec<TokenTree>),
}

impl TokenTree {
    /// The text used to refer to this tree in diagnostics. Groups are named
    /// after the parenthesis that opens them.
    pub fn diagnostic_text(&self) -> &str {
        match self {
            TokenTree::Leaf(token) => token.token_text.as_str(),
            TokenTree::Group(_) => "(",
        }
    }

    pub fn token_class(&self) -> Option<TokenClass> {
        match self {
            TokenTree::Leaf(token) => Some(token.token_class),
            TokenTree::Group(_) => None,
        }
    }
}

/// Errors produced while lexing, grouping or parsing a line.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum SyntaxError {
    UnexpectedClosingParen,
    MissingClosingParen,
    EmptyParenGroup,
    UnexpectedToken {
        found_token_text: String,
    },
    ExpectedToken {
        expected: String,
        found_token_text: Option<String>,
    },
    InvalidIntegerLiteral {
        literal_text: String,
    },
}

/// Display trait implementation for SyntaxError.
impl Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnexpectedClosingParen => {
                return write!(f, "Unexpected )");
            }

            Self::MissingClosingParen => {
                return write!(f, "Missing )");
            }

            Self::EmptyParenGroup => {
                return write!(f, "Parenthesis group nothing");
            }

            Self::UnexpectedToken { found_token_text } => {
                return write!(f, "Unexpected token {}", found_token_text);
            }

            Self::ExpectedToken {
                expected,
                found_token_text,
            } => {
                write!(f, "Expected {}.", expected)?;
                if let Some(found_token_text) = found_token_text {
                    write!(f, " Instead got {}", found_token_text)?;
                }
                return Ok(());
            }

            Self::InvalidIntegerLiteral { literal_text } => {
                return write!(f, "Invalid integer literal {}", literal_text);
            }
        }
    }
}

impl std::error::Error for SyntaxError {}

// Represents how to recognize a token class from one whitespace-separated
// fragment of the input.
#[derive(Debug)]
struct TokenRule {
    token_class: TokenClass,
    regex: Regex,
}

// Rules are tried in order, so `Name` has to stay last.
lazy_static! {
    static ref token_rules: Vec<TokenRule> = vec![
        TokenRule {
            token_class: TokenClass::Let,
            regex: Regex::new(r"^let$").expect("Unable to compile Let rule regex."),
        },
        TokenRule {
            token_class: TokenClass::Number,
            regex: Regex::new(r"^[0-9]+$").expect("Unable to compile Number rule regex."),
        },
        TokenRule {
            token_class: TokenClass::Lambda,
            regex: Regex::new(r"^\\$").expect("Unable to compile Lambda rule regex."),
        },
        TokenRule {
            token_class: TokenClass::Dot,
            regex: Regex::new(r"^\.$").expect("Unable to compile Dot rule regex."),
        },
        TokenRule {
            token_class: TokenClass::LeftParen,
            regex: Regex::new(r"^\($").expect("Unable to compile LeftParen rule regex."),
        },
        TokenRule {
            token_class: TokenClass::RightParen,
            regex: Regex::new(r"^\)$").expect("Unable to compile RightParen rule regex."),
        },
        TokenRule {
            token_class: TokenClass::Equals,
            regex: Regex::new(r"^=$").expect("Unable to compile Equals rule regex."),
        },
        TokenRule {
            token_class: TokenClass::Name,
            regex: Regex::new(r"^[^\\.()=\s]+$").expect("Unable to compile Name rule regex."),
        },
    ];
    static ref special_char_regex: Regex =
        Regex::new(r"[\\.()=]").expect("Unable to compile special character regex.");
}

// Finds the class of a single fragment. Fragments never contain whitespace
// and special characters always arrive on their own, so the `Name` rule
// always matches as a last resort.
fn classify_fragment(fragment: &str) -> TokenClass {
    return token_rules
        .iter()
        .find(|token_rule| token_rule.regex.is_match(fragment))
        .map(|token_rule| token_rule.token_class)
        .unwrap_or(TokenClass::Name);
}

/// Given a line of text, returns the tokens that make it up. The `λ` glyph is
/// accepted as a synonym for `\`. Never fails; meaningless input simply
/// produces tokens the parser will reject.
pub fn run_lexical_analysis(program_str: &str) -> Vec<Token> {
    let program_str = program_str.replace('λ', "\\");
    let spaced = special_char_regex.replace_all(program_str.as_str(), " $0 ");

    return spaced
        .split_whitespace()
        .map(|fragment| Token::new(classify_fragment(fragment), fragment))
        .collect();
}

// Collects tokens starting at `start_idx` until the end of input or, when
// `nested` is set, until the `)` closing the current group. Returns the trees
// and the index just past what was consumed.
fn group_tokens_helper(
    tokens: &[Token],
    mut start_idx: usize,
    nested: bool,
) -> Result<(Vec<TokenTree>, usize), SyntaxError> {
    let mut out = Vec::new();

    while start_idx < tokens.len() {
        let token = &tokens[start_idx];

        match token.token_class {
            TokenClass::LeftParen => {
                let (inner, next_idx) = group_tokens_helper(tokens, start_idx + 1, true)?;
                if inner.is_empty() {
                    return Err(SyntaxError::EmptyParenGroup);
                }
                out.push(TokenTree::Group(inner));
                start_idx = next_idx;
            }

            TokenClass::RightParen => match nested {
                true => return Ok((out, start_idx + 1)),
                false => return Err(SyntaxError::UnexpectedClosingParen),
            },

            _ => {
                out.push(TokenTree::Leaf(token.clone()));
                start_idx += 1;
            }
        }
    }

    match nested {
        true => return Err(SyntaxError::MissingClosingParen),
        false => return Ok((out, start_idx)),
    };
}

/// Nests the flat token sequence according to its parentheses. Purely
/// structural: `let`, `\` and `.` are left for the parser to interpret.
pub fn group_tokens(tokens: &[Token]) -> Result<Vec<TokenTree>, SyntaxError> {
    let (grouped, _) = group_tokens_helper(tokens, 0, false)?;
    return Ok(grouped);
}
