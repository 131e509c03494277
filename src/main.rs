//! Forum CLI - course discussion topics with answers

use std::process::ExitCode;

fn main() -> ExitCode {
    match forum_cli::cli::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
