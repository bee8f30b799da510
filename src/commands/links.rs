//! `riskkb check-links`

use crate::knowledge::checks::run_link_check;
use crate::knowledge::report::Report;
use crate::runtime::context::CommandContext;
use crate::runtime::error::{KbError, KbResult};
use crate::KbCommand;
use std::path::PathBuf;

/// `riskkb check-links [root]`
pub struct CheckLinksCommand;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct CheckLinksOptions {
    pub root: Option<PathBuf>,
    pub show_help: bool,
}

impl KbCommand for CheckLinksCommand {
    type Options = CheckLinksOptions;

    fn parse(args: &[String]) -> KbResult<Self::Options> {
        parse_check_links_options(args)
    }

    fn root(options: &Self::Options) -> Option<PathBuf> {
        options.root.clone()
    }

    fn wants_help(options: &Self::Options) -> bool {
        options.show_help
    }

    fn print_usage() {
        print_check_links_usage();
    }

    fn run(ctx: &CommandContext, _options: Self::Options) -> KbResult<()> {
        println!("Checking links in: {}", ctx.root().display());
        let report = Report::from_findings(run_link_check(ctx.layout()));
        report.print();
        report.outcome()
    }
}

fn parse_check_links_options(args: &[String]) -> KbResult<CheckLinksOptions> {
    let mut options = CheckLinksOptions::default();
    for arg in args {
        match arg.as_str() {
            "help" | "--help" | "-h" => options.show_help = true,
            other if other.starts_with('-') => {
                return Err(KbError::validation(format!(
                    "unsupported `riskkb check-links` argument `{other}`"
                )));
            }
            path => {
                if options.root.is_some() {
                    return Err(KbError::validation(
                        "`riskkb check-links` accepts at most one root path",
                    ));
                }
                options.root = Some(PathBuf::from(path));
            }
        }
    }
    Ok(options)
}

fn print_check_links_usage() {
    eprintln!(
        "Usage: riskkb check-links [root]\n\
         \n\
         Strict link integrity pass: every path declared in the knowledge index\n\
         and every markdown link between incidents and risk documents must\n\
         resolve to an existing file. Broken links are errors; unacknowledged\n\
         backlinks are warnings.\n"
    );
}
