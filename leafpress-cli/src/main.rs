//! # leafpress CLI
//!
//! Command-line interface for the leafpress blog build pipeline.

mod commands;
mod schema;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "leafpress")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(long, env = "LEAFPRESS_CONFIG", default_value = "leafpress.yml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new leafpress site
    Init {
        /// Target directory (defaults to current directory)
        path: Option<PathBuf>,
    },

    /// Build the static site
    Build,

    /// List published posts, newest first
    List {
        /// Only posts carrying this tag (case-sensitive)
        #[arg(long)]
        tag: Option<String>,

        /// Maximum posts to print
        #[arg(long)]
        limit: Option<usize>,

        /// Return JSON for machine consumption
        #[arg(long)]
        json: bool,
    },

    /// Show a single post
    Show {
        /// Post slug (file name without extension)
        slug: String,

        /// Output format
        #[arg(long, value_enum, default_value_t = ShowFormat::Json)]
        format: ShowFormat,
    },

    /// Load and render every post without writing output, then report diagnostics
    Verify {
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print a configuration value by dotted key (e.g. site.title)
    Config {
        key: String,
    },
}

#[derive(Copy, Clone, ValueEnum)]
pub enum ShowFormat {
    Json,
    Markdown,
    Html,
    Frontmatter,
    Raw,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output stays clean
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(if cli.verbose {
                tracing::Level::DEBUG.into()
            } else {
                tracing::Level::INFO.into()
            }),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Init { path } => commands::init_site(path.as_deref()),
        Commands::Build => commands::build_site(&cli.config),
        Commands::List { tag, limit, json } => {
            let opts = commands::ListOptions { tag, limit, json };
            commands::list_posts(&cli.config, opts)
        }
        Commands::Show { slug, format } => commands::show_post(&cli.config, &slug, format),
        Commands::Verify { json } => commands::verify_site(&cli.config, json),
        Commands::Config { key } => commands::print_config_value(&cli.config, &key),
    }
}
