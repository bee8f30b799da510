//! `riskkb report`

use crate::knowledge::checks::run_validation;
use crate::knowledge::report::Report;
use crate::runtime::context::CommandContext;
use crate::runtime::error::{KbError, KbResult};
use crate::KbCommand;
use std::fs;
use std::path::PathBuf;

/// `riskkb report --output <path> [root]`
pub struct ReportCommand;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ReportOptions {
    pub root: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub show_help: bool,
}

impl KbCommand for ReportCommand {
    type Options = ReportOptions;

    fn parse(args: &[String]) -> KbResult<Self::Options> {
        parse_report_options(args)
    }

    fn root(options: &Self::Options) -> Option<PathBuf> {
        options.root.clone()
    }

    fn wants_help(options: &Self::Options) -> bool {
        options.show_help
    }

    fn print_usage() {
        print_report_usage();
    }

    fn run(ctx: &CommandContext, options: Self::Options) -> KbResult<()> {
        let Some(output) = options.output else {
            return Err(KbError::validation(
                "`riskkb report` requires `--output <path>`",
            ));
        };

        println!("Validating knowledge base at: {}", ctx.root().display());
        let report = Report::from_findings(run_validation(ctx.layout()));
        report.print();
        write_report_json(&report, &output)?;
        println!("Report written to: {}", output.display());
        report.outcome()
    }
}

fn write_report_json(report: &Report, output: &PathBuf) -> KbResult<()> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|err| {
                KbError::io(format!("failed to create report directory: {err}"))
                    .with_operation("report")
                    .with_path(parent)
            })?;
        }
    }
    let json = serde_json::to_string_pretty(&report.to_json()).map_err(|err| {
        KbError::io(format!("failed to serialize report: {err}")).with_operation("report")
    })?;
    fs::write(output, format!("{json}\n")).map_err(|err| {
        KbError::io(format!("failed to write report: {err}"))
            .with_operation("report")
            .with_path(output)
    })
}

fn parse_report_options(args: &[String]) -> KbResult<ReportOptions> {
    let mut options = ReportOptions::default();
    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--output" | "-o" => {
                let Some(path) = args.get(i + 1) else {
                    return Err(KbError::validation("missing value for `--output`"));
                };
                options.output = Some(PathBuf::from(path));
                i += 2;
            }
            "help" | "--help" | "-h" => {
                options.show_help = true;
                i += 1;
            }
            other if other.starts_with('-') => {
                return Err(KbError::validation(format!(
                    "unsupported `riskkb report` argument `{other}`"
                )));
            }
            path => {
                if options.root.is_some() {
                    return Err(KbError::validation(
                        "`riskkb report` accepts at most one root path",
                    ));
                }
                options.root = Some(PathBuf::from(path));
                i += 1;
            }
        }
    }
    if options.output.is_none() && !options.show_help {
        return Err(KbError::validation(
            "`riskkb report` requires `--output <path>`",
        ));
    }
    Ok(options)
}

fn print_report_usage() {
    eprintln!(
        "Usage: riskkb report --output <path> [root]\n\
         \n\
         Runs the full validation pass and writes the findings as a JSON report\n\
         alongside the usual console output. Parent directories of the output\n\
         path are created as needed.\n"
    );
}
