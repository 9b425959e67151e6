mod config;
mod fixture_runner;
mod logging;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use serde::Serialize;
use tracing::debug;

use notedoc::{StructuredDocument, structure_document};
use terminology::{Annotation, Code, CodeShape, CodeValidation, Recognizer, TermIndex};

use crate::config::{CliError, Config, load_index};

#[derive(Parser)]
#[command(name = "notedoc", version, about = "Clinical note term recognition and structuring")]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Configuration file (default: ./notedoc.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Recognize dictionary terms in a note
    Terms(TermsArgs),

    /// Print the section outline of a note
    Outline(OutlineArgs),

    /// Check codes against the dictionary
    Code(CodeArgs),

    /// Run .note.md fixture files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct TermsArgs {
    /// Note file
    file: PathBuf,

    /// Print annotations as JSON
    #[arg(long, conflicts_with = "annotate")]
    json: bool,

    /// Show annotations inline on the source
    #[arg(long)]
    annotate: bool,

    /// Dictionary TOML file (overrides the config file)
    #[arg(long)]
    dictionary: Option<PathBuf>,
}

#[derive(clap::Args)]
struct OutlineArgs {
    /// Note file
    file: PathBuf,

    /// Print the structured document as JSON
    #[arg(long)]
    json: bool,

    /// Count recognized terms in each section
    #[arg(long)]
    terms: bool,

    /// Dictionary TOML file used with --terms
    #[arg(long)]
    dictionary: Option<PathBuf>,
}

#[derive(clap::Args)]
struct CodeArgs {
    /// Codes to validate, e.g. I10 or 7980
    #[arg(required = true)]
    codes: Vec<String>,

    /// Dictionary TOML file (overrides the config file)
    #[arg(long)]
    dictionary: Option<PathBuf>,
}

#[derive(clap::Args)]
struct TestArgs {
    /// A .note.md file or a directory containing them
    path: PathBuf,

    /// Run only fixtures in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,

    /// Dictionary TOML file (overrides the config file)
    #[arg(long)]
    dictionary: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose, cli.no_color);

    let color_choice = if cli.no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    match run(cli, color_choice) {
        Ok(code) => process::exit(code),
        Err(error) => {
            report(&error, color_choice);
            process::exit(2);
        }
    }
}

fn run(cli: Cli, color_choice: ColorChoice) -> Result<i32, CliError> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let config = Config::discover(cli.config.as_deref(), &cwd)?;
    debug!(?config, "loaded configuration");

    match cli.command {
        Command::Terms(args) => {
            let index = load_index(config.dictionary_path(args.dictionary.as_deref()))?;
            let source = read_source(&args.file)?;
            let recognizer = Recognizer::new(&index).with_config(config.resolver.clone());
            let annotations = recognizer.recognize(&source);

            if args.json {
                let views: Vec<AnnotationView<'_>> =
                    annotations.iter().map(AnnotationView::from).collect();
                println!("{}", serde_json::to_string_pretty(&views)?);
            } else if args.annotate {
                annotate(&args.file, &source, &annotations, color_choice);
            } else {
                for annotation in &annotations {
                    println!(
                        "{}..{}  {:?}  -> {} [{}]",
                        annotation.start,
                        annotation.end,
                        annotation.matched_text,
                        annotation.term.canonical_term,
                        code_list(annotation.codes())
                    );
                }
            }
            Ok(0)
        }
        Command::Outline(args) => {
            let source = read_source(&args.file)?;
            let doc = structure_document(&source);
            let index = if args.terms {
                Some(load_index(
                    config.dictionary_path(args.dictionary.as_deref()),
                )?)
            } else {
                None
            };
            let recognizer = index
                .as_ref()
                .map(|index| Recognizer::new(index).with_config(config.resolver.clone()));

            if args.json {
                println!("{}", serde_json::to_string_pretty(&doc)?);
            } else {
                print_outline(&doc, recognizer.as_ref());
            }
            Ok(0)
        }
        Command::Code(args) => {
            let index = load_index(config.dictionary_path(args.dictionary.as_deref()))?;
            Ok(check_codes(&index, &args.codes))
        }
        Command::Test(args) => {
            if args.list_categories {
                fixture_runner::list_categories(&args.path);
                return Ok(0);
            }
            let index = load_index(config.dictionary_path(args.dictionary.as_deref()))?;
            let recognizer = Recognizer::new(&index).with_config(config.resolver.clone());
            Ok(fixture_runner::run_fixtures(
                &args.path,
                &recognizer,
                cli.no_color,
                &args.category,
            ))
        }
    }
}

fn read_source(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn report(failure: &CliError, color_choice: ColorChoice) {
    match failure {
        CliError::Dictionary {
            name,
            source_text,
            error,
        } => {
            let mut files = SimpleFiles::new();
            let file_id = files.add(name.clone(), source_text.clone());
            let writer = StandardStream::stderr(color_choice);
            let config = term::Config::default();
            let diagnostic = error.to_diagnostic(file_id);
            if term::emit_to_write_style(&mut writer.lock(), &config, &files, &diagnostic).is_err() {
                eprintln!("error: {error}");
            }
        }
        other => eprintln!("error: {other}"),
    }
}

fn code_list(codes: &[Code]) -> String {
    codes
        .iter()
        .map(Code::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Serialize)]
struct AnnotationView<'a> {
    term: &'a str,
    matched_text: &'a str,
    start: usize,
    end: usize,
    codes: &'a [Code],
}

impl<'a> From<&'a Annotation<'_>> for AnnotationView<'a> {
    fn from(annotation: &'a Annotation<'_>) -> Self {
        AnnotationView {
            term: &annotation.term.canonical_term,
            matched_text: &annotation.matched_text,
            start: annotation.start,
            end: annotation.end,
            codes: annotation.codes(),
        }
    }
}

/// Render annotations as labels on the note. Labels take byte ranges, so
/// character offsets are converted first.
fn annotate(path: &Path, source: &str, annotations: &[Annotation<'_>], color_choice: ColorChoice) {
    if annotations.is_empty() {
        eprintln!("no terms recognized in {}", path.display());
        return;
    }

    let mut byte_at: Vec<usize> = source.char_indices().map(|(b, _)| b).collect();
    byte_at.push(source.len());

    let mut files = SimpleFiles::new();
    let file_id = files.add(path.display().to_string(), source.to_string());
    let labels = annotations
        .iter()
        .map(|a| {
            Label::primary(file_id, byte_at[a.start]..byte_at[a.end])
                .with_message(format!("{} [{}]", a.term.canonical_term, code_list(a.codes())))
        })
        .collect();
    let diagnostic = Diagnostic::note()
        .with_message(format!("{} term(s) recognized", annotations.len()))
        .with_labels(labels);

    let writer = StandardStream::stdout(color_choice);
    let config = term::Config::default();
    let _ = term::emit_to_write_style(&mut writer.lock(), &config, &files, &diagnostic);
}

fn print_outline(doc: &StructuredDocument, recognizer: Option<&Recognizer<'_>>) {
    fn print_node(
        doc: &StructuredDocument,
        id: notedoc::NodeId,
        indent: usize,
        recognizer: Option<&Recognizer<'_>>,
    ) {
        let Some(block) = doc.section(id) else {
            return;
        };
        let marker = "#".repeat(block.level.unwrap_or(1) as usize);
        let title = block.title.as_deref().unwrap_or_default();
        let mut line = format!("{}{} {}", "  ".repeat(indent), marker, title);
        if let Some(section_type) = block.section_type() {
            line.push_str(&format!("  ({section_type})"));
        }
        if let Some(recognizer) = recognizer {
            let count = recognizer.recognize(&block.content).len();
            line.push_str(&format!("  [{count} terms]"));
        }
        println!("{line}");
        for &child in doc.tree().children(id) {
            print_node(doc, child, indent + 1, recognizer);
        }
    }

    for &root in doc.roots() {
        print_node(doc, root, 0, recognizer);
    }
}

/// Print one line per code; exit code 1 when any is invalid.
fn check_codes(index: &TermIndex, codes: &[String]) -> i32 {
    let mut invalid = 0;
    for code in codes {
        match index.validate_code(code) {
            CodeValidation::Valid { term } => {
                println!("{code}\tvalid\t{}", term.canonical_term);
            }
            CodeValidation::Invalid { reason } => {
                invalid += 1;
                let hint = match reason {
                    CodeShape::Unrecognized => "not a recognized code shape".to_string(),
                    shape => match shape.expected_vocabulary() {
                        Some(vocabulary) => {
                            format!("looks like {vocabulary} but is not in the dictionary")
                        }
                        None => "not in the dictionary".to_string(),
                    },
                };
                println!("{code}\tinvalid\t{hint}");
            }
        }
    }
    if invalid > 0 { 1 } else { 0 }
}
