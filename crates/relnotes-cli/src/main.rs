mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    approval::ApprovalSubcommand, config::ConfigSubcommand, document::DocumentSubcommand,
    ReleaseArgs,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "relnotes",
    about = "Lay out daily release notes into a styled document",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .relnotes/ or .git/)
    #[arg(long, global = true, env = "RELNOTES_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize .relnotes/ in the current project
    Init,

    /// Show or validate the configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Compute the insert and style batches for a release without applying them
    Render {
        #[command(flatten)]
        release: ReleaseArgs,

        /// Offset the release is laid out at
        #[arg(long, default_value_t = 1)]
        origin: usize,
    },

    /// Print the release as plain text
    Preview {
        #[command(flatten)]
        release: ReleaseArgs,
    },

    /// Write a release into the local document
    Publish {
        #[command(flatten)]
        release: ReleaseArgs,

        /// Publish even if a release with the same title is already there
        #[arg(long)]
        force: bool,

        /// Clear the document first (refused once it holds a release)
        #[arg(long, conflicts_with = "origin")]
        replace: bool,

        /// Insert at this offset instead of the top of the document
        #[arg(long)]
        origin: Option<usize>,

        /// Print the review message after publishing
        #[arg(long)]
        notify: bool,
    },

    /// Parse consolidated body text into sections
    ParseBody {
        /// Body text file ("-" for stdin)
        file: PathBuf,

        /// JSON object of epic name to URL
        #[arg(long)]
        epic_urls: Option<PathBuf>,

        /// Product line whose header lines are skipped
        #[arg(long)]
        product_line: Option<String>,

        /// Release version of that product line
        #[arg(long, requires = "product_line")]
        release_version: Option<String>,
    },

    /// Track per-product-line sign-off
    Approval {
        #[command(subcommand)]
        subcommand: ApprovalSubcommand,
    },

    /// Inspect the local document
    Document {
        #[command(subcommand)]
        subcommand: DocumentSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Init => cmd::init::run(&root),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
        Commands::Render { release, origin } => cmd::render::run(&root, &release, origin, cli.json),
        Commands::Preview { release } => cmd::preview::run(&root, &release, cli.json),
        Commands::Publish {
            release,
            force,
            replace,
            origin,
            notify,
        } => cmd::publish::run(
            &root,
            &release,
            cmd::publish::PublishArgs {
                force,
                replace,
                origin,
                notify,
            },
            cli.json,
        ),
        Commands::ParseBody {
            file,
            epic_urls,
            product_line,
            release_version,
        } => cmd::parse_body::run(
            &file,
            epic_urls.as_deref(),
            product_line.as_deref(),
            release_version.as_deref(),
            cli.json,
        ),
        Commands::Approval { subcommand } => cmd::approval::run(&root, subcommand, cli.json),
        Commands::Document { subcommand } => cmd::document::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
