//! docsync - Syntax documentation sync for scripting addons

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = docsync::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
