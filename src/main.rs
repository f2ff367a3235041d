use std::io::IsTerminal;
use std::io::Read;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use miette::{Context, IntoDiagnostic, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use stackpulse_core::{Author, CommitStats, Fact, OutputFormat, Repo, StackpulseConfig};
use stackpulse_difflens::filter::DiffFilter;
use stackpulse_extractors::{ClassifierSet, ExtractorRegistry, LibraryCatalog};
use stackpulse_identity::IdentityResolver;
use stackpulse_report::{HttpFactsApi, MetaHasher};

#[derive(Parser)]
#[command(
    name = "stackpulse",
    version,
    about = "Commit-history analytics: library and keyword usage, team size",
    long_about = "Stackpulse turns commit history into technology statistics.\n\n\
                   It attributes changed lines to the third-party libraries they use,\n\
                   counts language keywords, and estimates team size by merging\n\
                   author identities that differ only in spelling.\n\n\
                   Examples:\n  \
                     git show HEAD | stackpulse stats        Library and keyword stats for a commit\n  \
                     stackpulse stats --file change.patch    Stats for a saved diff\n  \
                     stackpulse team --repo .                Team size from git history\n  \
                     stackpulse team --authors a.json --post Post the team size fact"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Path to configuration file (default: .stackpulse.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(
        long,
        global = true,
        default_value = "text",
        long_help = "Output format for command results.\n\n\
                       Formats:\n  \
                         text  Human-readable tables and summaries (default)\n  \
                         json  Machine-readable JSON with camelCase keys"
    )]
    format: OutputFormat,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// When to use colors
    #[arg(long, global = true, default_value = "auto")]
    color: ColorChoice,
}

#[derive(Subcommand)]
enum Command {
    /// Library and keyword usage for a diff
    #[command(long_about = "Library and keyword usage for a diff.\n\n\
        Parses a unified diff (git diff / git show output), routes each file to the\n\
        extractor for its language by extension, and reports per-technology\n\
        added/deleted line counts. Files in unsupported languages are skipped.\n\n\
        Examples:\n  git show HEAD | stackpulse stats\n  stackpulse stats --file change.patch --format json")]
    Stats {
        /// Read diff from file instead of stdin
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Estimate team size from commit authors
    #[command(long_about = "Estimate team size from commit authors.\n\n\
        Authors whose names or email local parts are close spellings of each other\n\
        count as one person. Authors come from a JSON list ([{\"name\", \"email\"}])\n\
        or from the history of a git repository. With --post, the TEAM_SIZE fact is\n\
        sent to the reporting service configured under [api].\n\n\
        Examples:\n  stackpulse team --repo .\n  stackpulse team --authors authors.json --post --repo-id my-repo")]
    Team {
        /// JSON file with a list of authors
        #[arg(long, conflicts_with = "repo", required_unless_present = "repo")]
        authors: Option<PathBuf>,

        /// Collect authors from this git repository
        #[arg(long)]
        repo: Option<PathBuf>,

        /// Post the fact to the reporting service
        #[arg(long)]
        post: bool,

        /// Repository identifier for the fact (default: repository directory name)
        #[arg(long)]
        repo_id: Option<String>,
    },
    /// Create a default .stackpulse.toml configuration file
    #[command(long_about = "Create a default .stackpulse.toml configuration file.\n\n\
        Generates a commented-out template with all available options.\n\
        Fails if .stackpulse.toml already exists.")]
    Init,
    /// Generate shell completion scripts
    #[command(hide = true)]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Clone, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    /// Auto-detect based on terminal
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

fn print_welcome(use_color: bool) {
    let version = env!("CARGO_PKG_VERSION");

    if use_color {
        println!("\x1b[1mstackpulse\x1b[0m v{version}: what your commits are made of\n");

        println!("Quick start:");
        println!("  \x1b[36mstackpulse init\x1b[0m                  Create a .stackpulse.toml config file");
        println!("  \x1b[36mgit show | stackpulse stats\x1b[0m      Stats for the latest commit");
        println!("  \x1b[36mstackpulse team --repo .\x1b[0m         Team size from git history\n");

        println!("All commands:");
        println!("  \x1b[32mstats\x1b[0m   Library and keyword usage for a diff");
        println!("  \x1b[32mteam\x1b[0m    Team size from fuzzy author resolution");
        println!("  \x1b[32minit\x1b[0m    Create default configuration\n");
    } else {
        println!("stackpulse v{version}: what your commits are made of\n");

        println!("Quick start:");
        println!("  stackpulse init                  Create a .stackpulse.toml config file");
        println!("  git show | stackpulse stats      Stats for the latest commit");
        println!("  stackpulse team --repo .         Team size from git history\n");

        println!("All commands:");
        println!("  stats   Library and keyword usage for a diff");
        println!("  team    Team size from fuzzy author resolution");
        println!("  init    Create default configuration\n");
    }

    println!("Run 'stackpulse <command> --help' for details.");
}

fn read_diff_input(file: &Option<PathBuf>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err(format!("reading {}", path.display())),
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .into_diagnostic()
                .wrap_err("reading stdin")?;
            Ok(input)
        }
    }
}

fn read_authors(path: &Path) -> Result<Vec<Author>> {
    let content = std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err(format!("reading {}", path.display()))?;
    serde_json::from_str(&content)
        .into_diagnostic()
        .wrap_err(format!("parsing author list {}", path.display()))
}

fn load_catalog(config: &StackpulseConfig) -> Result<LibraryCatalog> {
    let catalog = LibraryCatalog::builtin();
    match &config.extract.libraries_file {
        Some(path) => Ok(catalog.merge(LibraryCatalog::from_file(path)?)),
        None => Ok(catalog),
    }
}

fn default_repo_id(repo: Option<&Path>) -> String {
    repo.and_then(|p| p.canonicalize().ok())
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "local".to_string())
}

fn print_stats(stats: &[CommitStats], skipped: usize) {
    if stats.is_empty() {
        println!("No library or keyword usage found.");
    } else {
        let width = stats.iter().map(|s| s.tech.len()).max().unwrap_or(4).max(4);
        println!("{:<8}  {:<width$}  {:>6}  {:>7}", "TYPE", "TECH", "ADDED", "DELETED");
        for s in stats {
            println!(
                "{:<8}  {:<width$}  {:>6}  {:>7}",
                s.stat_type.to_string(),
                s.tech,
                s.num_lines_added,
                s.num_lines_deleted
            );
        }
    }
    if skipped > 0 {
        println!("\n{skipped} file(s) skipped by filters");
    }
}

fn print_facts(facts: &[Fact], authors: usize, posted: bool) {
    for fact in facts {
        println!("{} for {}: {}", fact.code, fact.repo.id, fact.value);
    }
    println!("({authors} author identities considered)");
    if posted {
        println!("Facts sent to reporting service");
    }
}

const DEFAULT_CONFIG: &str = r#"# Stackpulse Configuration

[api]
# Reporting service receiving facts (POST {base_url}/facts)
# base_url = "https://stats.example.com/api"
# token = "..."
# timeout_secs = 30

[identity]
# ngram_size = 3
# similarity_threshold = 0.30

[extract]
# skip_patterns = ["*.min.js", "vendor/**", "generated/**"]
# JSON map of language -> library ids, replacing the built-in vocabulary per language
# libraries_file = "libraries.json"
# Directory of trained classifier models named <language>.json
# models_dir = "models"
"#;

#[tokio::main]
async fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .build(),
        )
    }))
    .expect("miette handler");
    human_panic::setup_panic!();

    let cli = Cli::parse();

    let use_color = match cli.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => std::io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    };

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_ansi(use_color))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let config = match &cli.config {
        Some(path) => StackpulseConfig::from_file(path)?,
        None => {
            let default_path = Path::new(".stackpulse.toml");
            if default_path.exists() {
                StackpulseConfig::from_file(default_path)?
            } else {
                StackpulseConfig::default()
            }
        }
    };
    tracing::debug!(format = %cli.format, "configuration loaded");

    match cli.command {
        None => {
            print_welcome(use_color);
            return Ok(());
        }
        Some(Command::Stats { ref file }) => {
            let input = read_diff_input(file)?;
            let files = stackpulse_difflens::parser::parse_unified_diff(&input)?;
            let filtered = DiffFilter::from_config(&config.extract).filter(files);

            let catalog = load_catalog(&config)?;
            let classifiers = ClassifierSet::load(&catalog, config.extract.models_dir.as_deref())?;
            let registry = ExtractorRegistry::with_defaults(&catalog, &classifiers)?;
            let extraction = registry.extract_all(filtered.kept);
            tracing::info!(
                files = extraction.files.len(),
                stats = extraction.stats.len(),
                "extraction complete"
            );

            match cli.format {
                OutputFormat::Json => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&extraction.stats).into_diagnostic()?
                    );
                }
                OutputFormat::Text => print_stats(&extraction.stats, filtered.skipped.len()),
            }
        }
        Some(Command::Team {
            ref authors,
            ref repo,
            post,
            ref repo_id,
        }) => {
            let author_list = match (authors, repo) {
                (Some(path), _) => read_authors(path)?,
                (None, Some(path)) => stackpulse_identity::collect_authors(path)?,
                (None, None) => miette::bail!("either --authors or --repo is required"),
            };

            let repo_ref = Repo::new(
                repo_id
                    .clone()
                    .unwrap_or_else(|| default_repo_id(repo.as_deref())),
            );
            let resolver = IdentityResolver::new(&config.identity);

            let facts = if post {
                let api = HttpFactsApi::new(&config.api)?;
                MetaHasher::new(repo_ref, api, resolver)
                    .calculate_and_send_facts(&author_list)
                    .await?
            } else {
                stackpulse_report::hasher::team_size_facts(&repo_ref, &resolver, &author_list)
            };

            match cli.format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&facts).into_diagnostic()?);
                }
                OutputFormat::Text => {
                    print_facts(&facts, author_list.len(), post && !author_list.is_empty());
                }
            }
        }
        Some(Command::Init) => {
            let path = Path::new(".stackpulse.toml");
            if path.exists() {
                miette::bail!(".stackpulse.toml already exists");
            }
            std::fs::write(path, DEFAULT_CONFIG).into_diagnostic()?;
            println!("Created .stackpulse.toml with default configuration");
        }
        Some(Command::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "stackpulse", &mut std::io::stdout());
        }
    }

    Ok(())
}
