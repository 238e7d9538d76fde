//! PDF Chapter Splitter CLI tool
//!
//! A command-line tool for splitting PDFs into chapters and serving the
//! upload page.

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use glob::glob;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

use pdf_chapter_splitter::chapters::ChapterPatterns;
use pdf_chapter_splitter::pdf::extract_metadata;
use pdf_chapter_splitter::server::config::{hours, megabytes, minutes};
use pdf_chapter_splitter::server::{self, ServerConfig};
use pdf_chapter_splitter::split::{SplitOptions, SplitReport, Splitter, DEFAULT_PAGES_PER_SECTION};

/// PDF Chapter Splitter - Split PDF books into per-chapter files
#[derive(Parser)]
#[command(name = "pdf-chapter-splitter")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Split a book into chapters next to the input (book_chapters/)
    pdf-chapter-splitter split book.pdf

    # Choose the output directory
    pdf-chapter-splitter split book.pdf -o chapters

    # Use 15-page sections when no chapters are found
    pdf-chapter-splitter split book.pdf -p 15

    # Add a custom heading pattern and only show what would be split
    pdf-chapter-splitter split book.pdf --pattern \"^Appendix\" --dry-run

    # Run the web page on port 8080
    pdf-chapter-splitter serve --port 8080")]
struct Cli {
    /// Show debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Split PDF files into chapters
    Split {
        /// Input PDF files. Supports glob patterns like "*.pdf"
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output directory (default: <name>_chapters next to the PDF; single input only)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pages per section when no chapters are found
        #[arg(short, long, default_value_t = DEFAULT_PAGES_PER_SECTION)]
        pages: usize,

        /// Extra chapter heading pattern (regular expression); repeatable
        #[arg(long = "pattern")]
        patterns: Vec<String>,

        /// Only list the chapters that would be created
        #[arg(long)]
        dry_run: bool,
    },

    /// Show information about a PDF file
    Info {
        /// PDF file to inspect
        input: PathBuf,
    },

    /// Run the upload/download web service
    Serve(ServeArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "SPLITTER_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(long, env = "SPLITTER_PORT", default_value_t = 5000)]
    port: u16,

    /// Directory for raw uploads
    #[arg(long, env = "SPLITTER_UPLOAD_DIR")]
    upload_dir: Option<PathBuf>,

    /// Directory for split results
    #[arg(long, env = "SPLITTER_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Maximum upload size in megabytes
    #[arg(long, env = "SPLITTER_MAX_UPLOAD_MB", default_value_t = 50)]
    max_upload_mb: usize,

    /// Delete tasks older than this many hours
    #[arg(long, env = "SPLITTER_RETENTION_HOURS", default_value_t = 2)]
    retention_hours: u64,

    /// Minutes between cleanup sweeps
    #[arg(long, env = "SPLITTER_CLEANUP_MINUTES", default_value_t = 60)]
    cleanup_minutes: u64,

    /// Pages per section when no chapters are found
    #[arg(long, env = "SPLITTER_PAGES", default_value_t = DEFAULT_PAGES_PER_SECTION)]
    pages: usize,

    /// Serverless layout: scratch dirs under /tmp and no cleanup sweeper
    #[arg(long, env = "SPLITTER_SERVERLESS")]
    serverless: bool,

    /// Disable the cleanup sweeper
    #[arg(long)]
    no_cleanup: bool,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Split { inputs, output, pages, patterns, dry_run } => {
            cmd_split(inputs, output, pages, patterns, dry_run)
        }
        Commands::Info { input } => cmd_info(&input),
        Commands::Serve(args) => cmd_serve(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Expand glob patterns in input paths
fn expand_globs(patterns: Vec<String>) -> anyhow::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();

    for pattern in patterns {
        // Check if pattern contains glob characters
        if pattern.contains('*') || pattern.contains('?') || pattern.contains('[') {
            let mut matched = false;
            for entry in glob(&pattern).with_context(|| format!("Invalid glob pattern: {pattern}"))? {
                match entry {
                    Ok(path) => {
                        paths.push(path);
                        matched = true;
                    }
                    Err(e) => eprintln!("Warning: glob error for {}: {}", pattern, e),
                }
            }
            if !matched {
                bail!("No files matched pattern: {}", pattern);
            }
        } else {
            // No glob characters, treat as literal path
            paths.push(PathBuf::from(pattern));
        }
    }

    // Sort paths for consistent ordering
    paths.sort();
    paths.dedup();

    Ok(paths)
}

fn build_patterns(extra: &[String]) -> ChapterPatterns {
    let mut patterns = ChapterPatterns::new();
    if extra.is_empty() {
        return patterns;
    }

    let mut added = 0;
    for pattern in extra {
        match patterns.add_custom(pattern) {
            Ok(()) => added += 1,
            Err(e) => eprintln!("Warning: {}", e),
        }
    }
    if added == 0 {
        eprintln!("Warning: no valid custom patterns were added");
    }

    patterns
}

/// Split one or more PDFs
fn cmd_split(
    inputs: Vec<String>,
    output: Option<PathBuf>,
    pages: usize,
    patterns: Vec<String>,
    dry_run: bool,
) -> anyhow::Result<()> {
    if pages == 0 {
        bail!("Pages per section must be greater than 0");
    }

    let inputs = expand_globs(inputs)?;

    if output.is_some() && inputs.len() > 1 {
        bail!("--output can only be used with a single input file");
    }

    // Validate inputs exist
    for path in &inputs {
        if !path.exists() {
            bail!("Input file not found: {}", path.display());
        }
        if !path.is_file() {
            bail!("Not a file: {}", path.display());
        }
    }

    let patterns = build_patterns(&patterns);
    let mut failed = 0;

    for input in &inputs {
        let options = SplitOptions {
            output_dir: output.clone(),
            pages_per_section: pages,
            patterns: patterns.clone(),
        };
        let splitter = Splitter::new(input, options)?;

        let outcome = if dry_run {
            dry_run_one(&splitter)
        } else {
            split_one(&splitter)
        };

        if let Err(e) = outcome {
            eprintln!("Error: {}: {:#}", input.display(), e);
            failed += 1;
        }
    }

    if failed > 0 {
        bail!("{} of {} files failed", failed, inputs.len());
    }

    Ok(())
}

fn dry_run_one(splitter: &Splitter) -> anyhow::Result<()> {
    splitter
        .validate()
        .with_context(|| format!("PDF validation failed: {}", splitter.pdf_path().display()))?;

    let breaks = splitter.find_chapter_breaks()?;

    println!("File: {}", splitter.pdf_path().display());
    if breaks.is_empty() {
        println!("No chapter markers found");
    } else {
        println!("Found {} chapters:", breaks.len());
        for (i, brk) in breaks.iter().enumerate() {
            println!("  {}. Page {}: {}", i + 1, brk.page + 1, brk.title);
        }
    }

    Ok(())
}

fn split_one(splitter: &Splitter) -> anyhow::Result<()> {
    eprintln!("Splitting {}...", splitter.pdf_path().display());

    let mut report = splitter.split_by_chapters()?;

    if !report.is_complete() {
        eprintln!("Chapter split failed, splitting by page count instead...");
        report = splitter.split_evenly()?;
    }

    if !report.is_complete() {
        bail!("Split failed: {}", report.failures.join("; "));
    }

    print_report(&report);
    Ok(())
}

fn print_report(report: &SplitReport) {
    for file in &report.outputs {
        println!(
            "  {} (pages {}-{}, {} pages)",
            file.filename,
            file.start_page + 1,
            file.end_page + 1,
            file.page_count
        );
    }
    eprintln!("Done! Output directory: {}", report.output_dir.display());
}

/// Show information about a PDF
fn cmd_info(input: &Path) -> anyhow::Result<()> {
    if !input.exists() {
        bail!("Input file not found: {}", input.display());
    }

    let metadata = extract_metadata(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    println!("File: {}", input.display());
    println!("Pages: {}", metadata.page_count);

    if let Some(title) = metadata.title {
        println!("Title: {}", title);
    }
    if let Some(author) = metadata.author {
        println!("Author: {}", author);
    }
    if let Some(subject) = metadata.subject {
        println!("Subject: {}", subject);
    }
    if let Some(creator) = metadata.creator {
        println!("Creator: {}", creator);
    }

    Ok(())
}

fn server_config(args: ServeArgs) -> anyhow::Result<ServerConfig> {
    if args.pages == 0 {
        bail!("Pages per section must be greater than 0");
    }

    let base = if args.serverless {
        ServerConfig::serverless()
    } else {
        ServerConfig::default()
    };

    let bind: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", args.host, args.port))?;

    let max_upload_bytes = megabytes(args.max_upload_mb)
        .with_context(|| format!("Upload limit of {} MB is too large", args.max_upload_mb))?;
    let retention = hours(args.retention_hours)
        .with_context(|| format!("Retention of {} hours is too large", args.retention_hours))?;
    let cleanup_interval = minutes(args.cleanup_minutes.max(1))
        .with_context(|| format!("Cleanup interval of {} minutes is too large", args.cleanup_minutes))?;

    Ok(ServerConfig {
        bind,
        upload_dir: args.upload_dir.unwrap_or(base.upload_dir),
        output_dir: args.output_dir.unwrap_or(base.output_dir),
        max_upload_bytes,
        retention,
        cleanup_interval,
        cleanup: base.cleanup && !args.no_cleanup,
        pages_per_section: args.pages,
    })
}

/// Run the web service
fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = server_config(args)?;

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime
        .block_on(server::serve(config))
        .context("Server error")?;

    Ok(())
}
