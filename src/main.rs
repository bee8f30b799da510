//! Risk knowledge base maintenance commands (`riskkb`).
//!
//! The binary is a thin shell over the library entrypoint so the CLI surface
//! stays testable as ordinary functions.

use std::process::ExitCode;

fn main() -> ExitCode {
    riskkb::exit_code(riskkb::execute_from_env())
}
