//! `riskkb validate`

use crate::knowledge::checks::run_validation;
use crate::knowledge::report::Report;
use crate::runtime::context::CommandContext;
use crate::runtime::error::{KbError, KbResult};
use crate::KbCommand;
use std::path::PathBuf;

/// `riskkb validate [root]`
pub struct ValidateCommand;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ValidateOptions {
    pub root: Option<PathBuf>,
    pub show_help: bool,
}

impl KbCommand for ValidateCommand {
    type Options = ValidateOptions;

    fn parse(args: &[String]) -> KbResult<Self::Options> {
        parse_validate_options(args)
    }

    fn root(options: &Self::Options) -> Option<PathBuf> {
        options.root.clone()
    }

    fn wants_help(options: &Self::Options) -> bool {
        options.show_help
    }

    fn print_usage() {
        print_validate_usage();
    }

    fn run(ctx: &CommandContext, _options: Self::Options) -> KbResult<()> {
        println!("Validating knowledge base at: {}", ctx.root().display());
        let report = Report::from_findings(run_validation(ctx.layout()));
        report.print();
        report.outcome()
    }
}

fn parse_validate_options(args: &[String]) -> KbResult<ValidateOptions> {
    let mut options = ValidateOptions::default();
    for arg in args {
        match arg.as_str() {
            "help" | "--help" | "-h" => options.show_help = true,
            other if other.starts_with('-') => {
                return Err(KbError::validation(format!(
                    "unsupported `riskkb validate` argument `{other}`"
                )));
            }
            path => {
                if options.root.is_some() {
                    return Err(KbError::validation(
                        "`riskkb validate` accepts at most one root path",
                    ));
                }
                options.root = Some(PathBuf::from(path));
            }
        }
    }
    Ok(options)
}

fn print_validate_usage() {
    eprintln!(
        "Usage: riskkb validate [root]\n\
         \n\
         Runs every structural check: knowledge index entries, domain spec and\n\
         risk documents, incident reports, and backlink mirroring. Exits\n\
         non-zero only when errors were found; warnings alone pass.\n"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_options_default_to_ambient_root() {
        let options = parse_validate_options(&[]).expect("parse");
        assert_eq!(options, ValidateOptions::default());
    }

    #[test]
    fn validate_options_accept_a_positional_root() {
        let options = parse_validate_options(&["/tmp/kb".into()]).expect("parse");
        assert_eq!(options.root, Some(PathBuf::from("/tmp/kb")));
    }

    #[test]
    fn validate_options_reject_a_second_root() {
        let err =
            parse_validate_options(&["/a".into(), "/b".into()]).expect_err("must reject");
        assert!(err.to_string().contains("at most one root path"));
    }

    #[test]
    fn validate_options_reject_unknown_flags() {
        let err = parse_validate_options(&["--strict".into()]).expect_err("must reject");
        assert!(err.to_string().contains("--strict"));
    }
}
