//! Top-level CLI parsing and help output.

use crate::runtime::error::{KbError, KbResult};

/// Top-level `riskkb` command families.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TopLevelCommand {
    Validate(Vec<String>),
    CheckLinks(Vec<String>),
    Report(Vec<String>),
    AddDomain(Vec<String>),
    Help,
}

/// Parse raw command-line arguments into a top-level command selection.
pub fn parse(args: Vec<String>) -> KbResult<TopLevelCommand> {
    let Some(cmd) = args.first().cloned() else {
        return Ok(TopLevelCommand::Help);
    };

    let rest = args[1..].to_vec();
    match cmd.as_str() {
        "validate" => Ok(TopLevelCommand::Validate(rest)),
        "check-links" => Ok(TopLevelCommand::CheckLinks(rest)),
        "report" => Ok(TopLevelCommand::Report(rest)),
        "add-domain" => Ok(TopLevelCommand::AddDomain(rest)),
        "help" | "--help" | "-h" => Ok(TopLevelCommand::Help),
        other => Err(KbError::validation(format!(
            "unknown riskkb command: {other}"
        ))),
    }
}

/// Print the canonical top-level usage text.
pub fn print_usage() {
    eprintln!(
        "Usage: riskkb <command> [args]\n\
         \n\
         Commands:\n\
           validate [root]           Validate index entries, domain docs, incidents, and backlinks\n\
           check-links [root]        Strict link integrity check (broken links are errors)\n\
           report --output <path> [root]\n\
                                     Run validation and write a JSON findings report\n\
           add-domain <name> --description <text> --keywords <a,b,...>\n\
                      [--common-risk <file.md>]... [root]\n\
                                     Scaffold a new domain and register it in the index\n\
         \n\
         The knowledge-base root comes from the positional [root] argument,\n\
         the RISKKB_ROOT environment variable, or the current directory.\n"
    );
}
