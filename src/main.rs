//! CLI for paperlist-tools - Turn a Markdown reading list into bibliography entries.

use std::fmt;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use paperlist_tools::{
    builtin_venues, clean_title, load_venues, parse_document, parse_document_all,
    record_from_metadata, refresh_record, render_bbl, render_bibliography, render_document,
    render_record, split_document, AtomDirectory, FetchError, MetadataProvider, MetadataStore,
    PaperRecord,
};
use paperlist_tools::output::{format_failures, generate_output, wrap_thebibliography};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// Turn a Markdown reading list into BibTeX and bibliography entries
#[derive(Parser)]
#[command(name = "paperlist-tools")]
#[command(version)]
#[command(after_help = "\
Examples:
  paperlist-tools bib papers.md -o papers.bib
  paperlist-tools bbl papers.md --environment
  paperlist-tools update papers.md --metadata arxiv.jsonl -o papers_updated.md
  paperlist-tools notes 2103.11536 --atom-dir responses/
  paperlist-tools clean-title 'a survey of gans'")]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn", env = "RUST_LOG")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a Markdown reading list to BibTeX
    Bib {
        /// Input Markdown file (use '-' for stdin)
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert a Markdown reading list to a \bibitem list
    Bbl {
        /// Input Markdown file (use '-' for stdin)
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Wrap the items in a thebibliography environment
        #[arg(long)]
        environment: bool,
    },

    /// Refresh titles, authors and venues from paper metadata
    #[command(after_help = "\
Only arXiv preprints are refreshed unless --all is given. Their venue is
resolved from the metadata comment using the venue list.")]
    Update {
        /// Input Markdown file (use '-' for stdin)
        input: PathBuf,

        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        venues: VenueArgs,

        /// Refresh every record, not only preprints
        #[arg(long)]
        all: bool,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write new reading-list records for the given paper ids
    Notes {
        /// Paper ids (e.g., 2103.11536)
        #[arg(required = true)]
        ids: Vec<String>,

        #[command(flatten)]
        source: SourceArgs,

        #[command(flatten)]
        venues: VenueArgs,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print a cleaned, capitalized title
    CleanTitle {
        /// The title to clean
        title: String,
    },

    /// List the venue names used for publication resolution
    Venues {
        #[command(flatten)]
        venues: VenueArgs,
    },

    /// Validate every record and report all failures
    Check {
        /// Input Markdown file (use '-' for stdin)
        input: PathBuf,
    },
}

/// Where paper metadata comes from.
#[derive(Args)]
#[group(required = true, multiple = false)]
struct SourceArgs {
    /// Metadata file (JSON array or JSONL of {id, title, authors, comment, year})
    #[arg(long)]
    metadata: Option<PathBuf>,

    /// Directory of saved arXiv API responses named <id>.xml
    #[arg(long)]
    atom_dir: Option<PathBuf>,
}

#[derive(Args)]
struct VenueArgs {
    /// Venue list file, one name per line (default: builtin list)
    #[arg(long = "venues", env = "PAPERLIST_VENUES")]
    path: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// AppError — semantic exit codes
// ---------------------------------------------------------------------------

enum AppError {
    /// Exit 10 — input file not found / unreadable
    InputFile(String),
    /// Exit 11 — reading list does not parse
    Parse(String),
    /// Exit 12 — venue list not found / unreadable
    Venues(String),
    /// Exit 13 — metadata missing or invalid
    Metadata(String),
    /// Exit 15 — cannot write output file
    OutputFile(String),
}

impl AppError {
    fn exit_code(&self) -> i32 {
        match self {
            AppError::InputFile(_) => 10,
            AppError::Parse(_) => 11,
            AppError::Venues(_) => 12,
            AppError::Metadata(_) => 13,
            AppError::OutputFile(_) => 15,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::InputFile(msg) => {
                write!(f, "{}\n  hint: verify the file path is correct", msg)
            }
            AppError::Parse(msg) => {
                write!(
                    f,
                    "{}\n  hint: each record needs a **Title.**<br> line, an *Authors.*<br> line and a 'Venue Year. links' line, separated from the next record by a blank line",
                    msg
                )
            }
            AppError::Venues(msg) => {
                write!(
                    f,
                    "{}\n  hint: the venue list is a text file with one name per line; omit --venues to use the builtin list",
                    msg
                )
            }
            AppError::Metadata(msg) => {
                write!(f, "{}", msg)
            }
            AppError::OutputFile(msg) => {
                write!(
                    f,
                    "{}\n  hint: check that the output directory exists and is writable",
                    msg
                )
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn init_tracing(log_level: &str) {
    // clap already falls back to RUST_LOG when --log-level is absent
    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(io::stderr),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    }
}

fn run(command: Commands) -> Result<(), AppError> {
    match command {
        Commands::Bib { input, output } => bib_command(&input, output.as_deref()),
        Commands::Bbl {
            input,
            output,
            environment,
        } => bbl_command(&input, output.as_deref(), environment),
        Commands::Update {
            input,
            source,
            venues,
            all,
            output,
        } => update_command(&input, &source, &venues, all, output.as_deref()),
        Commands::Notes {
            ids,
            source,
            venues,
            output,
        } => notes_command(&ids, &source, &venues, output.as_deref()),
        Commands::CleanTitle { title } => {
            println!("{}", clean_title(&title));
            Ok(())
        }
        Commands::Venues { venues } => {
            for name in resolve_venues(&venues)? {
                println!("{}", name);
            }
            Ok(())
        }
        Commands::Check { input } => check_command(&input),
    }
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// Convert a reading list to BibTeX.
fn bib_command(input: &Path, output: Option<&Path>) -> Result<(), AppError> {
    let records = read_records(input)?;
    let result = generate_output(&render_bibliography(&records));
    write_output(output, &result, records.len())
}

/// Convert a reading list to a \bibitem list.
fn bbl_command(input: &Path, output: Option<&Path>, environment: bool) -> Result<(), AppError> {
    let records = read_records(input)?;
    let mut items = render_bbl(&records);
    if environment {
        items = wrap_thebibliography(&items, records.len());
    }
    let result = generate_output(&items);
    write_output(output, &result, records.len())
}

/// Refresh records from metadata and write the updated reading list.
fn update_command(
    input: &Path,
    source: &SourceArgs,
    venues: &VenueArgs,
    all: bool,
    output: Option<&Path>,
) -> Result<(), AppError> {
    let markdown = read_input(input)?;
    let records = parse_document(&markdown).map_err(|e| AppError::Parse(e.to_string()))?;
    let venue_list = resolve_venues(venues)?;
    let provider = open_provider(source)?;

    // Records that are not refreshed are written back exactly as read.
    let mut blocks = Vec::with_capacity(records.len());
    for (block, record) in split_document(&markdown).into_iter().zip(&records) {
        if !all && !record.is_preprint() {
            blocks.push(block.to_string());
            continue;
        }

        match refresh_record(record, &*provider, &venue_list) {
            Ok(fresh) => blocks.push(render_record(&fresh)),
            Err(FetchError::NotFound(id)) => {
                tracing::warn!(id = %id, "no metadata available, keeping record as is");
                blocks.push(block.to_string());
            }
            Err(e) => {
                return Err(AppError::Metadata(format!("'{}': {}", record.identifier, e)));
            }
        }
    }

    let result = generate_output(&blocks.join("\n\n"));
    write_output(output, &result, records.len())
}

/// Build new reading-list records from metadata.
fn notes_command(
    ids: &[String],
    source: &SourceArgs,
    venues: &VenueArgs,
    output: Option<&Path>,
) -> Result<(), AppError> {
    let venue_list = resolve_venues(venues)?;
    let provider = open_provider(source)?;

    let records = ids
        .iter()
        .map(|id| {
            provider
                .fetch(id)
                .and_then(|metadata| record_from_metadata(&metadata, &venue_list))
                .map_err(|e| AppError::Metadata(e.to_string()))
        })
        .collect::<Result<Vec<PaperRecord>, _>>()?;

    write_output(output, &render_document(&records), records.len())
}

/// Parse every record and report all failures at once.
fn check_command(input: &Path) -> Result<(), AppError> {
    let markdown = read_input(input)?;
    let results = parse_document_all(&markdown);
    let failures: Vec<_> = results.iter().filter_map(|r| r.as_ref().err()).collect();

    if failures.is_empty() {
        println!("{} record(s) OK", results.len());
        Ok(())
    } else {
        Err(AppError::Parse(format!(
            "{} of {} record(s) failed:\n{}",
            failures.len(),
            results.len(),
            format_failures(&failures)
        )))
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Read the input file, supporting '-' for stdin.
fn read_input(input: &Path) -> Result<String, AppError> {
    if input == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| AppError::InputFile(format!("failed to read from stdin: {}", e)))?;
        Ok(buf)
    } else {
        fs::read_to_string(input)
            .map_err(|e| AppError::InputFile(format!("'{}': {}", input.display(), e)))
    }
}

fn read_records(input: &Path) -> Result<Vec<PaperRecord>, AppError> {
    let markdown = read_input(input)?;
    parse_document(&markdown).map_err(|e| AppError::Parse(e.to_string()))
}

fn resolve_venues(args: &VenueArgs) -> Result<Vec<String>, AppError> {
    match &args.path {
        Some(path) => load_venues(path)
            .map_err(|e| AppError::Venues(format!("'{}': {}", path.display(), e))),
        None => Ok(builtin_venues()),
    }
}

fn open_provider(source: &SourceArgs) -> Result<Box<dyn MetadataProvider>, AppError> {
    match (&source.metadata, &source.atom_dir) {
        (Some(path), _) => {
            let store = MetadataStore::load(path)
                .map_err(|e| AppError::Metadata(format!("'{}': {}", path.display(), e)))?;
            Ok(Box::new(store))
        }
        (None, Some(dir)) => {
            if !dir.is_dir() {
                return Err(AppError::Metadata(format!(
                    "'{}' is not a directory",
                    dir.display()
                )));
            }
            Ok(Box::new(AtomDirectory::new(dir)))
        }
        (None, None) => Err(AppError::Metadata(
            "either --metadata or --atom-dir is required".to_string(),
        )),
    }
}

/// Write to the output file, or stdout when none is given.
fn write_output(output: Option<&Path>, content: &str, count: usize) -> Result<(), AppError> {
    if let Some(output_path) = output {
        fs::write(output_path, content).map_err(|e| {
            AppError::OutputFile(format!("'{}': {}", output_path.display(), e))
        })?;
        eprintln!("wrote {} record(s) to {}", count, output_path.display());
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        write!(handle, "{}", content)
            .map_err(|e| AppError::OutputFile(format!("stdout: {}", e)))?;
    }

    Ok(())
}
