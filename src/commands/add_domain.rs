//! `riskkb add-domain`

use crate::knowledge::index::{
    entry_str, load_index, write_index, IndexEntry, IndexLoadError, IndexShape, LoadedIndex,
    RelatedFiles, INDEX_FILE_CANDIDATES,
};
use crate::knowledge::{markdown_files_in, RepoLayout, RISKS_FILE_NAME, SPEC_FILE_NAME};
use crate::runtime::context::CommandContext;
use crate::runtime::error::{KbError, KbResult};
use crate::KbCommand;
use std::fs;
use std::path::PathBuf;

/// `riskkb add-domain <name> --description <text> --keywords <a,b,...>`
pub struct AddDomainCommand;

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AddDomainOptions {
    pub root: Option<PathBuf>,
    pub display_name: String,
    pub description: Option<String>,
    pub keywords: Vec<String>,
    pub common_risks: Vec<String>,
    pub show_help: bool,
}

impl KbCommand for AddDomainCommand {
    type Options = AddDomainOptions;

    fn parse(args: &[String]) -> KbResult<Self::Options> {
        parse_add_domain_options(args)
    }

    fn root(options: &Self::Options) -> Option<PathBuf> {
        options.root.clone()
    }

    fn wants_help(options: &Self::Options) -> bool {
        options.show_help
    }

    fn print_usage() {
        print_add_domain_usage();
    }

    fn run(ctx: &CommandContext, options: Self::Options) -> KbResult<()> {
        add_domain(ctx.layout(), options)
    }
}

fn add_domain(layout: &RepoLayout, options: AddDomainOptions) -> KbResult<()> {
    let display_name = options.display_name;
    let folder_name = kebab_case(&display_name);
    if folder_name.is_empty() {
        return Err(KbError::validation(format!(
            "domain name '{display_name}' has no usable characters"
        )));
    }

    if domain_exists(layout, &folder_name)? {
        return Err(KbError::validation(format!(
            "domain '{folder_name}' already exists"
        ))
        .with_hint("pick a different name or edit the existing domain"));
    }

    let description = options
        .description
        .unwrap_or_else(|| format!("Risk assessment for {display_name}"));
    let keywords = if options.keywords.is_empty() {
        vec![folder_name.replace('-', " ")]
    } else {
        options.keywords
    };
    let common_risks = resolve_common_risks(layout, &options.common_risks)?;

    let domain_dir = layout.domains_root().join(&folder_name);
    fs::create_dir_all(&domain_dir).map_err(|err| {
        KbError::io(format!("failed to create domain directory: {err}"))
            .with_operation("add-domain")
            .with_path(&domain_dir)
    })?;
    println!("Created directory: {}", layout.rel(&domain_dir));

    let spec_path = domain_dir.join(SPEC_FILE_NAME);
    write_doc(&spec_path, &spec_template(&folder_name, &description))?;
    println!("Created: {}", layout.rel(&spec_path));

    let risks_path = domain_dir.join(RISKS_FILE_NAME);
    write_doc(&risks_path, &risks_template(&folder_name))?;
    println!("Created: {}", layout.rel(&risks_path));

    let mut index = load_or_seed_index(layout)?;
    let entry = IndexEntry {
        domain_name: display_name,
        description,
        keywords,
        related_files: RelatedFiles {
            common_risks,
            domain_knowledge: vec![layout.rel(&spec_path), layout.rel(&risks_path)],
        },
    };
    let entry = serde_yaml::to_value(&entry)
        .map_err(|err| KbError::io(format!("failed to serialize index entry: {err}")))?;
    index.entries.push(entry);
    write_index(&index)?;
    println!("Updated: {}", layout.rel(&index.path));

    println!("\nDomain added. Next steps:");
    println!("1. Edit domains/{folder_name}/{SPEC_FILE_NAME} with the actual specification");
    println!("2. Edit domains/{folder_name}/{RISKS_FILE_NAME} with identified risks");
    println!("3. Run `riskkb validate` to check consistency");
    Ok(())
}

/// Lowercase, hyphen-separated folder name derived from a display name.
fn kebab_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_whitespace() || ch == '_' || ch == '-' {
            if !out.ends_with('-') {
                out.push('-');
            }
        } else if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        }
    }
    out.trim_matches('-').to_string()
}

/// A domain exists if its folder is present or the index already names it
/// (case-insensitively, against the kebab form of each entry).
fn domain_exists(layout: &RepoLayout, folder_name: &str) -> KbResult<bool> {
    if layout.domains_root().join(folder_name).exists() {
        return Ok(true);
    }
    match load_index(layout) {
        Ok(index) => Ok(index.entries.iter().any(|entry| {
            entry_str(entry, "domain_name")
                .is_some_and(|name| kebab_case(name) == folder_name)
        })),
        Err(IndexLoadError::Missing { .. }) => Ok(false),
        Err(IndexLoadError::Malformed { path, message }) => Err(KbError::validation(format!(
            "knowledge index is malformed: {message}"
        ))
        .with_path(&path)
        .with_hint("fix the index before adding domains")),
    }
}

/// Map requested common risks to `common-risks/<stem>.md` paths, refusing
/// names with no matching file.
fn resolve_common_risks(layout: &RepoLayout, requested: &[String]) -> KbResult<Vec<String>> {
    if requested.is_empty() {
        return Ok(Vec::new());
    }
    let available: Vec<(String, String)> = markdown_files_in(&layout.common_risks_root())
        .iter()
        .filter_map(|path| {
            let stem = path.file_stem().and_then(|s| s.to_str())?;
            Some((stem.to_string(), layout.rel(path)))
        })
        .collect();

    let mut resolved = Vec::new();
    for name in requested {
        let stem = name.strip_suffix(".md").unwrap_or(name);
        let Some((_, rel)) = available.iter().find(|(a, _)| a == stem) else {
            let stems: Vec<&str> = available.iter().map(|(a, _)| a.as_str()).collect();
            return Err(KbError::validation(format!(
                "unknown common risk '{name}'"
            ))
            .with_hint(if stems.is_empty() {
                "no common-risks/*.md files exist in this knowledge base".to_string()
            } else {
                format!("available: {}", stems.join(", "))
            }));
        };
        resolved.push(rel.clone());
    }
    Ok(resolved)
}

/// Existing index in its source shape, or a fresh empty bare-list YAML index.
fn load_or_seed_index(layout: &RepoLayout) -> KbResult<LoadedIndex> {
    match load_index(layout) {
        Ok(index) => Ok(index),
        Err(IndexLoadError::Missing { .. }) => Ok(LoadedIndex {
            path: layout.indexes_root().join(INDEX_FILE_CANDIDATES[0]),
            shape: IndexShape::BareList,
            entries: Vec::new(),
        }),
        Err(IndexLoadError::Malformed { path, message }) => Err(KbError::validation(format!(
            "knowledge index is malformed: {message}"
        ))
        .with_path(&path)
        .with_hint("fix the index before adding domains")),
    }
}

fn write_doc(path: &std::path::Path, content: &str) -> KbResult<()> {
    fs::write(path, content).map_err(|err| {
        KbError::io(format!("failed to write {}: {err}", path.display()))
            .with_operation("add-domain")
    })
}

/// Display form of a folder name ("user-auth" -> "User Auth").
fn title_case(folder_name: &str) -> String {
    folder_name
        .split('-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn spec_template(folder_name: &str, description: &str) -> String {
    format!(
        "# {title} - Feature Specification\n\
         \n\
         ## Overview\n\
         \n\
         {description}\n\
         \n\
         ## Core Components\n\
         \n\
         ### Component 1\n\
         \n\
         Brief description of the component.\n\
         \n\
         **Responsibilities:**\n\
         - Responsibility 1\n\
         - Responsibility 2\n\
         \n\
         **Technologies:**\n\
         - Technology stack used\n\
         \n\
         ## Data Flow\n\
         \n\
         Describe how data flows through the system.\n\
         \n\
         ## External Dependencies\n\
         \n\
         - Dependency 1: Purpose\n\
         \n\
         ## Related Documents\n\
         \n\
         - Link to API docs\n",
        title = title_case(folder_name),
    )
}

fn risks_template(folder_name: &str) -> String {
    format!(
        "# {title} - Risk Assessment\n\
         \n\
         ## Risk 1: Brief Description\n\
         \n\
         **Details**:\n\
         Detailed explanation of what can go wrong and under what conditions.\n\
         \n\
         **Countermeasures**:\n\
         - Mitigation 1: Description\n\
         \n\
         **Severity**: Medium\n\
         \n\
         **Related Incident**: None\n",
        title = title_case(folder_name),
    )
}

fn parse_add_domain_options(args: &[String]) -> KbResult<AddDomainOptions> {
    let mut options = AddDomainOptions::default();
    let mut positionals: Vec<String> = Vec::new();
    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--description" => {
                let Some(value) = args.get(i + 1) else {
                    return Err(KbError::validation("missing value for `--description`"));
                };
                options.description = Some(value.clone());
                i += 2;
            }
            "--keywords" => {
                let Some(value) = args.get(i + 1) else {
                    return Err(KbError::validation("missing value for `--keywords`"));
                };
                options.keywords = value
                    .split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(str::to_string)
                    .collect();
                i += 2;
            }
            "--common-risk" => {
                let Some(value) = args.get(i + 1) else {
                    return Err(KbError::validation("missing value for `--common-risk`"));
                };
                options.common_risks.push(value.clone());
                i += 2;
            }
            "help" | "--help" | "-h" => {
                options.show_help = true;
                i += 1;
            }
            other if other.starts_with('-') => {
                return Err(KbError::validation(format!(
                    "unsupported `riskkb add-domain` argument `{other}`"
                )));
            }
            value => {
                positionals.push(value.to_string());
                i += 1;
            }
        }
    }

    if options.show_help {
        return Ok(options);
    }
    let mut positionals = positionals.into_iter();
    let Some(name) = positionals.next() else {
        return Err(KbError::validation("`riskkb add-domain` requires a domain name"));
    };
    options.display_name = name;
    options.root = positionals.next().map(PathBuf::from);
    if positionals.next().is_some() {
        return Err(KbError::validation(
            "`riskkb add-domain` accepts at most a name and a root path",
        ));
    }
    Ok(options)
}

fn print_add_domain_usage() {
    eprintln!(
        "Usage: riskkb add-domain <name> --description <text> --keywords <a,b,...>\n\
         \x20                        [--common-risk <file>]... [root]\n\
         \n\
         Scaffolds domains/<kebab-name>/spec.md and risks.md from templates and\n\
         appends the domain to the knowledge index, preserving the index's\n\
         existing shape. Refuses names that already exist on disk or in the\n\
         index, and common risks with no matching common-risks/*.md file.\n"
    );
}
