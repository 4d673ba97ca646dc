//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use carpool_cli::CliError;

fn main() {
    match carpool_cli::run() {
        Ok(()) => {}
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("carpool: {err}");
            std::process::exit(1);
        }
    }
}
