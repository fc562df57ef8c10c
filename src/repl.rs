//! The interactive shell: reads one expression per line and prints its
//! normal form.

use log::debug;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::end_to_end::{format_line_result, Interpreter, InterpreterConfig, RunError};

pub const PROMPT: &str = " λ > ";

/// Lines starting with `:` are shell commands rather than expressions.
#[derive(Debug, PartialEq, Eq)]
pub enum ShellCommand {
    Quit,
    ShowEnv,
    Unknown(String),
}

/// Recognizes a shell command, or returns `None` for an ordinary line.
pub fn parse_shell_command(line: &str) -> Option<ShellCommand> {
    if !line.starts_with(':') {
        return None;
    }

    match line {
        ":q" | ":quit" => return Some(ShellCommand::Quit),
        ":env" => return Some(ShellCommand::ShowEnv),
        _ => return Some(ShellCommand::Unknown(String::from(line))),
    }
}

fn print_env(interpreter: &Interpreter) {
    let bindings = interpreter.global_bindings();
    if bindings.is_empty() {
        println!("(no bindings)");
    }
    for (name, value) in bindings {
        println!("{} = {}", name, value);
    }
}

/// Runs the shell until end of input or interrupt.
pub fn run_repl(config: &InterpreterConfig) -> Result<(), RunError> {
    let mut editor = DefaultEditor::new()?;
    let mut interpreter = Interpreter::with_max_depth(config.max_depth);

    loop {
        let line = match editor.readline(PROMPT) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(readline_err) => return Err(readline_err.into()),
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Err(history_err) = editor.add_history_entry(line) {
            debug!("Unable to record history entry: {}", history_err);
        }

        match parse_shell_command(line) {
            Some(ShellCommand::Quit) => break,
            Some(ShellCommand::ShowEnv) => print_env(&interpreter),
            Some(ShellCommand::Unknown(command)) => println!("Unknown command {}", command),
            None => println!("{}", format_line_result(&interpreter.run_line(line))),
        }
        println!();
    }

    println!("\n\nSee you soon!");
    return Ok(());
}
