//! Code to configure the interpreter and run it over input lines, either from
//! a source file or from the interactive shell.

use std::fs;
use std::thread;

use clap::Parser;
use log::warn;

use crate::box_tree_impl::box_tree_ast::{ExprNode, Statement};
use crate::box_tree_impl::box_tree_environment::Environment;
use crate::box_tree_impl::box_tree_execution::{evaluate_statement, RuntimeError, DEFAULT_MAX_DEPTH};
use crate::box_tree_impl::box_tree_recursive_descent_parsing::parse_recursive_descent;
use crate::lexical_analysis::{run_lexical_analysis, SyntaxError};

/// Config for the interpreter. Instantiate via `InterpreterConfig::parse()`.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct InterpreterConfig {
    /// Evaluate every line of this file instead of starting the shell.
    #[arg(short, long)]
    pub src_filepath: Option<String>,

    /// How deep substitution may recurse before giving up on a term.
    #[arg(short, long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Log parsing and reduction steps.
    #[arg(short, long)]
    pub verbose: bool,
}

/// The outcome of a failed line: either it did not parse, or it did not
/// evaluate. The two never mix.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum EvalError {
    Syntax(SyntaxError),
    Runtime(RuntimeError),
}

/// Display trait implementation for EvalError.
impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Syntax(syntax_error) => {
                return write!(f, "SyntaxError: {}", syntax_error);
            }

            Self::Runtime(runtime_error) => {
                return write!(f, "RuntimeError: {}", runtime_error);
            }
        }
    }
}

impl std::error::Error for EvalError {}

/// Type conversions for errors.
impl From<SyntaxError> for EvalError {
    fn from(value: SyntaxError) -> Self {
        return Self::Syntax(value);
    }
}

impl From<RuntimeError> for EvalError {
    fn from(value: RuntimeError) -> Self {
        return Self::Runtime(value);
    }
}

/// Errors that may be thrown when running the interpreter as a whole.
#[derive(Debug)]
pub enum RunError {
    InputFileError(std::io::Error),
    ShellError(rustyline::error::ReadlineError),
}

/// Display trait implementation for RunError.
impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InputFileError(io_err) => {
                return write!(f, "Input file error: {}", io_err);
            }

            Self::ShellError(readline_err) => {
                return write!(f, "Shell error: {}", readline_err);
            }
        }
    }
}

impl std::error::Error for RunError {}

impl From<std::io::Error> for RunError {
    fn from(value: std::io::Error) -> Self {
        return Self::InputFileError(value);
    }
}

impl From<rustyline::error::ReadlineError> for RunError {
    fn from(value: rustyline::error::ReadlineError) -> Self {
        return Self::ShellError(value);
    }
}

/// Stack reserved per level of substitution depth. A level spans several
/// frames (`substitute`, `apply_terms`, `perform_beta_reduction` and the
/// iterator adapters between them), and those are large in debug builds.
const STACK_BYTES_PER_LEVEL: usize = 32 * 1024;

/// Stack reserved on top of the per-level cost.
const BASE_STACK_BYTES: usize = 1024 * 1024;

/// Stack size of the thread that evaluates a statement with `max_depth`.
pub fn evaluation_stack_size(max_depth: usize) -> usize {
    return max_depth
        .saturating_mul(STACK_BYTES_PER_LEVEL)
        .saturating_add(BASE_STACK_BYTES);
}

/// One interpreter session. Owns the global frame, so `let` bindings made by
/// one line are visible to every later line of the same session.
#[derive(Debug)]
pub struct Interpreter {
    global_env: Environment<'static>,
    max_depth: usize,
}

impl Default for Interpreter {
    fn default() -> Self {
        return Interpreter::new();
    }
}

impl Interpreter {
    pub fn new() -> Interpreter {
        return Interpreter::with_max_depth(DEFAULT_MAX_DEPTH);
    }

    pub fn with_max_depth(max_depth: usize) -> Interpreter {
        return Interpreter {
            global_env: Environment::new(),
            max_depth: max_depth,
        };
    }

    /// Lexes, parses and evaluates one line, returning the reduced term (or
    /// the value just bound, for `let`).
    pub fn run_line(&mut self, line: &str) -> Result<ExprNode, EvalError> {
        let tokens = run_lexical_analysis(line);
        let statement = parse_recursive_descent(&tokens)?;
        let value = self.evaluate_on_sized_stack(&statement)?;

        return Ok(value);
    }

    // Runs the evaluation on a thread with room for `max_depth` levels, so a
    // divergent term ends in `RecursionLimit` whatever thread the caller is
    // on. Falls back to the current thread if that stack can't be had.
    fn evaluate_on_sized_stack(&mut self, statement: &Statement) -> Result<ExprNode, RuntimeError> {
        let max_depth = self.max_depth;
        let global_env = &mut self.global_env;

        let outcome = thread::scope(|scope| {
            let spawned = thread::Builder::new()
                .name(String::from("evaluator"))
                .stack_size(evaluation_stack_size(max_depth))
                .spawn_scoped(scope, || evaluate_statement(statement, global_env, max_depth));

            match spawned {
                Ok(handle) => return Some(handle.join()),
                Err(spawn_err) => {
                    warn!("Unable to start evaluator thread: {}", spawn_err);
                    return None;
                }
            }
        });

        match outcome {
            Some(Ok(result)) => return result,
            Some(Err(panic_payload)) => std::panic::resume_unwind(panic_payload),
            None => return evaluate_statement(statement, &mut self.global_env, self.max_depth),
        }
    }

    /// The current global bindings, sorted by name.
    pub fn global_bindings(&self) -> Vec<(&str, &ExprNode)> {
        return self
            .global_env
            .local_names()
            .into_iter()
            .filter_map(|name| self.global_env.find(name).map(|value| (name, value)))
            .collect();
    }
}

/// Formats the result of one line the way the shell prints it.
pub fn format_line_result(line_result: &Result<ExprNode, EvalError>) -> String {
    match line_result {
        Ok(value) => return format!("=> {}", value),
        Err(eval_error) => return format!("*** {}", eval_error),
    }
}

/// Runs every non-empty line of `program_string` in one session.
pub fn run_program(interpreter: &mut Interpreter, program_string: &str) -> Vec<String> {
    return program_string
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| format_line_result(&interpreter.run_line(line)))
        .collect();
}

/// Runs the interpreter over the source file named in the config and returns
/// everything it would print.
pub fn run_interpreter(config: &InterpreterConfig, src_filepath: &str) -> Result<String, RunError> {
    // Read the input file into a string.
    let program_string = fs::read_to_string(src_filepath)?;

    let mut interpreter = Interpreter::with_max_depth(config.max_depth);
    let outputs = run_program(&mut interpreter, program_string.as_str());

    return Ok(outputs.join("\n"));
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_run_line_results() {
        let mut interpreter = Interpreter::new();

        assert_eq!(
            interpreter.run_line(r"(\x.x) 42"),
            Ok(ExprNode::Literal { value: 42 })
        );
        assert_eq!(
            interpreter.run_line(r"\x"),
            Err(EvalError::Syntax(SyntaxError::ExpectedToken {
                expected: String::from("dot"),
                found_token_text: None,
            }))
        );
        assert_eq!(
            interpreter.run_line("nope"),
            Err(EvalError::Runtime(RuntimeError::UndefinedVariable {
                var_name: String::from("nope")
            }))
        );
    }

    #[test]
    fn test_run_program_output() {
        let mut interpreter = Interpreter::new();
        let program_string = r"
            let id = λx.x
            id (+ 2 3)

            let broken = undefinedVar
            broken
            (a
            1 2
        ";

        assert_eq!(
            run_program(&mut interpreter, program_string),
            vec![
                "=> λx.x",
                "=> 5",
                "*** RuntimeError: undefined variable undefinedVar",
                "*** RuntimeError: undefined variable broken",
                "*** SyntaxError: Missing )",
                "*** RuntimeError: can't apply an atom",
            ]
        );
    }

    // The bundled demo runs top to bottom in a single session.
    #[test]
    fn test_church_numerals_demo() {
        let mut interpreter = Interpreter::new();
        let program_string = include_str!("../demos/church_numerals.lc");

        assert_eq!(
            run_program(&mut interpreter, program_string),
            vec![
                "=> λf.λx.x",
                "=> λn.λf.λx.f (n f x)",
                "=> λm.λn.λf.λx.m f (n f x)",
                "=> λf.λx.f (f x)",
                "=> λn.n 1+ 0",
                "=> 5",
                "=> λx.λy.x",
                "=> λy.λy'.y",
                "=> 42",
            ]
        );
    }

    #[test]
    fn test_global_bindings_sorted() {
        let mut interpreter = Interpreter::new();
        interpreter.run_line("let b = 2").expect("let failed");
        interpreter.run_line(r"let a = \x.x").expect("let failed");
        let _ = interpreter.run_line("let c = missing");

        let bindings: Vec<(&str, String)> = interpreter
            .global_bindings()
            .into_iter()
            .map(|(name, value)| (name, value.to_string()))
            .collect();

        assert_eq!(
            bindings,
            vec![("a", String::from("λx.x")), ("b", String::from("2"))]
        );
    }

    // The default depth has to fit in the evaluator's stack even when the
    // caller runs on a small thread, such as a test thread.
    #[test]
    fn test_divergent_line_at_default_depth() {
        let mut interpreter = Interpreter::new();

        assert_eq!(
            interpreter.run_line(r"(\x.x x) (\x.x x)"),
            Err(EvalError::Runtime(RuntimeError::RecursionLimit))
        );
        assert_eq!(
            interpreter.run_line(r"let id = \x.x"),
            Ok(ExprNode::fn_def("x", ExprNode::var("x")))
        );
        assert_eq!(interpreter.global_bindings().len(), 1);
    }

    #[test]
    fn test_evaluation_stack_size() {
        assert_eq!(evaluation_stack_size(0), BASE_STACK_BYTES);
        assert!(evaluation_stack_size(DEFAULT_MAX_DEPTH) > DEFAULT_MAX_DEPTH * 2 * 1024);
        assert_eq!(evaluation_stack_size(usize::MAX), usize::MAX);
    }

    #[test]
    fn test_divergent_line_fails_cleanly() {
        let mut interpreter = Interpreter::with_max_depth(100);

        assert_eq!(
            interpreter.run_line(r"(\x.x x) (\x.x x)"),
            Err(EvalError::Runtime(RuntimeError::RecursionLimit))
        );
        assert_eq!(
            interpreter.run_line("1+ 1"),
            Ok(ExprNode::Literal { value: 2 })
        );
    }
}
