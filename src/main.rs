//! Start the interactive lambda calculus shell, or run a file of lines and
//! print each result to standard output.
//!
//! Example usage:
//!
//!     cargo run -- \
//!         --src-filepath demos/church_numerals.lc

use clap::Parser;
use lambda_calc_repl::end_to_end::{run_interpreter, InterpreterConfig};
use lambda_calc_repl::repl::run_repl;

fn main() {
    let interpreter_config = InterpreterConfig::parse();

    let default_filter = match interpreter_config.verbose {
        true => "debug",
        false => "warn",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match &interpreter_config.src_filepath {
        Some(src_filepath) => match run_interpreter(&interpreter_config, src_filepath) {
            Ok(execution_result) => {
                println!("{}", execution_result);
            }

            Err(run_error) => {
                println!("{}", run_error);
                std::process::exit(1);
            }
        },

        None => {
            if let Err(run_error) = run_repl(&interpreter_config) {
                println!("{}", run_error);
                std::process::exit(1);
            }
        }
    }
}
