//! Risk knowledge base maintenance commands (`riskkb`).
//!
//! The crate is organized as a small CLI layer over a shared validation
//! runtime. Command modules own user-facing policy while [`runtime`] owns
//! root resolution, configuration, and the error type, and [`knowledge`]
//! owns the document model and the checks themselves.

pub mod cli;
pub mod commands;
pub mod knowledge;
pub mod runtime;

use crate::cli::TopLevelCommand;
use crate::commands::add_domain::AddDomainCommand;
use crate::commands::links::CheckLinksCommand;
use crate::commands::report::ReportCommand;
use crate::commands::validate::ValidateCommand;
use crate::runtime::context::CommandContext;
use crate::runtime::error::KbResult;
use std::path::PathBuf;

/// Shared command contract for top-level riskkb command families.
///
/// Each command owns its typed option parsing while sharing the same root
/// resolution through [`CommandContext`]. Implementations should treat
/// [`KbCommand::parse`] as a pure translation step from raw CLI arguments
/// into a typed options value and keep side effects in [`KbCommand::run`].
pub trait KbCommand {
    /// Typed options produced by CLI parsing for the command family.
    type Options;

    /// Parse command-line arguments into typed options.
    ///
    /// Implementations should return
    /// [`KbError::validation`](crate::runtime::error::KbError::validation)
    /// for invalid user-facing argument shapes.
    fn parse(args: &[String]) -> KbResult<Self::Options>;

    /// Explicit knowledge-base root from the parsed options, if any.
    fn root(options: &Self::Options) -> Option<PathBuf>;

    /// Whether the parsed options ask for the command's usage text.
    fn wants_help(options: &Self::Options) -> bool;

    /// Print the command's usage text.
    fn print_usage();

    /// Execute the command against a resolved knowledge-base root.
    fn run(ctx: &CommandContext, options: Self::Options) -> KbResult<()>;
}

/// Executes the `riskkb` binary using the current process arguments.
///
/// Parses the top-level command selection, resolves the knowledge-base root
/// from the command's own options, and delegates to the owning command
/// family. Root resolution happens after parsing so that `--help` works
/// without a valid root.
pub fn execute_from_env() -> KbResult<()> {
    match cli::parse(std::env::args().skip(1).collect())? {
        TopLevelCommand::Validate(args) => dispatch::<ValidateCommand>(&args),
        TopLevelCommand::CheckLinks(args) => dispatch::<CheckLinksCommand>(&args),
        TopLevelCommand::Report(args) => dispatch::<ReportCommand>(&args),
        TopLevelCommand::AddDomain(args) => dispatch::<AddDomainCommand>(&args),
        TopLevelCommand::Help => {
            cli::print_usage();
            Ok(())
        }
    }
}

fn dispatch<C: KbCommand>(args: &[String]) -> KbResult<()> {
    let options = C::parse(args)?;
    if C::wants_help(&options) {
        C::print_usage();
        return Ok(());
    }
    let ctx = CommandContext::resolve(C::root(&options))?;
    C::run(&ctx, options)
}

/// Converts a riskkb result into a stable process exit code.
///
/// All command failures currently map to exit code `1` after printing the
/// formatted [`KbError`](crate::runtime::error::KbError) to stderr.
pub fn exit_code(result: KbResult<()>) -> std::process::ExitCode {
    match result {
        Ok(()) => std::process::ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            std::process::ExitCode::from(1)
        }
    }
}
