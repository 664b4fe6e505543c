use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use folio_parse::{Diagnostic, Post, Severity, toc};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

mod build;
mod config;
mod init;

#[derive(Parser)]
#[command(name = "folio", version, about = "Preview, validate and build folio blog posts")]
struct Cli {
    /// Suppress non-essential output
    #[arg(long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Show debug logging
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum RenderFormat {
    Terminal,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a post's blocks
    Render {
        /// Path to the .md file
        file: String,

        /// Output format
        #[arg(long, value_enum, default_value = "terminal")]
        format: RenderFormat,
    },

    /// Print a post's table of contents
    Toc {
        /// Path to the .md file
        file: String,

        /// Group subsections under their section
        #[arg(long)]
        grouped: bool,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Validate post file(s)
    Validate {
        /// Path to the .md file(s)
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// Build the site bundle (index.json + posts/*.json)
    Build {
        /// Path to the site config
        #[arg(long, default_value = config::CONFIG_FILE)]
        config: PathBuf,

        /// Output directory (overrides outDir in the config)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Rebuild when a post changes
        #[arg(long)]
        watch: bool,
    },

    /// Scaffold a new folio site
    Init {
        /// Directory to initialize (default: current directory)
        path: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    match cli.command {
        Commands::Render { file, format } => {
            handle_render(&file, format)?;
        }
        Commands::Toc {
            file,
            grouped,
            json,
        } => {
            handle_toc(&file, grouped, json)?;
        }
        Commands::Validate { files } => {
            handle_validate(&files)?;
        }
        Commands::Build { config, out, watch } => {
            build::handle_build(&config, out.as_deref(), cli.quiet)?;
            if watch {
                build::watch_and_rebuild(&config, out.as_deref(), cli.quiet)?;
            }
        }
        Commands::Init { path } => {
            init::init_site(path.as_deref(), cli.quiet)?;
        }
    }

    Ok(())
}

fn init_tracing(quiet: bool, verbose: bool) -> Result<()> {
    let level = if verbose {
        Level::DEBUG
    } else if quiet {
        Level::WARN
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Read and load a post; its id is the file stem.
fn load_file(file: &str) -> Result<(Post, Vec<Diagnostic>)> {
    let content =
        std::fs::read_to_string(file).with_context(|| format!("Failed to read '{file}'"))?;
    let id = Path::new(file)
        .file_stem()
        .map_or_else(|| file.to_string(), |s| s.to_string_lossy().to_string());
    let loaded = Post::load(&id, &content);
    Ok((loaded.post, loaded.diagnostics))
}

fn handle_render(file: &str, format: RenderFormat) -> Result<()> {
    let (post, diagnostics) = load_file(file)?;

    // Print load diagnostics to stderr
    for diag in &diagnostics {
        eprintln!("{}: {}", line_info(file, diag), diag.message);
    }

    let output = match format {
        RenderFormat::Terminal => post.to_terminal(),
        RenderFormat::Json => serde_json::to_string_pretty(&post)?,
    };

    println!("{output}");
    Ok(())
}

fn handle_toc(file: &str, grouped: bool, json: bool) -> Result<()> {
    let (post, _) = load_file(file)?;
    let headings = post.headings();

    let output = match (grouped, json) {
        (false, false) => folio_parse::render_term::toc_to_terminal(&headings),
        (true, false) => {
            folio_parse::render_term::groups_to_terminal(&toc::group_headings(&headings))
        }
        (false, true) => serde_json::to_string_pretty(&headings)?,
        (true, true) => serde_json::to_string_pretty(&toc::group_headings(&headings))?,
    };

    if output.is_empty() {
        tracing::info!("{file} has no headings");
    } else {
        println!("{output}");
    }
    Ok(())
}

fn handle_validate(files: &[String]) -> Result<()> {
    let mut has_errors = false;

    for file in files {
        let (post, mut all_diagnostics) = load_file(file)?;

        // Combine load diagnostics with validation diagnostics
        all_diagnostics.extend(post.validate());

        if all_diagnostics.is_empty() {
            println!("{}: {}", file, "OK".green());
            continue;
        }

        for diag in &all_diagnostics {
            let severity_str = match diag.severity {
                Severity::Error => {
                    has_errors = true;
                    format!("{}", "error".red().bold())
                }
                Severity::Warning => format!("{}", "warning".yellow().bold()),
                Severity::Info => format!("{}", "info".cyan().bold()),
            };

            let code_str = match &diag.code {
                Some(c) => format!("[{c}] "),
                None => String::new(),
            };

            println!(
                "{}: {severity_str}: {code_str}{}",
                line_info(file, diag),
                diag.message
            );
        }
    }

    if has_errors {
        std::process::exit(1);
    }

    Ok(())
}

fn line_info(file: &str, diag: &Diagnostic) -> String {
    match diag.line {
        Some(line) => format!("{file}:{line}"),
        None => file.to_string(),
    }
}
