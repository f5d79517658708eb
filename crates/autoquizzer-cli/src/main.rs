//! autoquizzer CLI: generate a quiz from a web page, then see how well you
//! and an LLM do on it.

use std::path::PathBuf;
use std::process;

use autoquizzer_core::report::AnswerMode;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(
    name = "autoquizzer",
    version,
    about = "Generate a multiple-choice quiz from a web page and let an LLM play it"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a quiz from a URL
    Generate {
        /// Page to build the quiz from (http(s):// or file://)
        #[arg(long)]
        url: String,

        /// Save the quiz as JSON
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Take a quiz yourself, one answer per line on stdin
    Play {
        /// Quiz JSON file
        #[arg(long)]
        quiz: PathBuf,
    },

    /// Let the LLM answer a quiz from its own knowledge
    ClosedBook(AnswerArgs),

    /// Let the LLM answer a quiz with web search snippets
    WebRag(AnswerArgs),

    /// Generate and play quizzes for one or more URLs, writing session reports
    Run {
        /// Pages to build quizzes from
        #[arg(long = "url", required = true)]
        urls: Vec<String>,

        /// Output directory (defaults to `output_dir` from the config)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format: json, html, md, all (comma-separated)
        #[arg(long, default_value = "json")]
        format: String,

        /// Seed for the random fallback answers
        #[arg(long)]
        seed: Option<u64>,

        /// Only run the closed-book pass
        #[arg(long)]
        skip_web_rag: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Check a quiz file for shape problems
    Validate {
        /// Quiz JSON file
        #[arg(long)]
        quiz: PathBuf,
    },

    /// List models advertised by the configured providers
    ListModels {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config file
    Init,
}

#[derive(Args)]
struct AnswerArgs {
    /// Quiz JSON file
    #[arg(long)]
    quiz: PathBuf,

    /// Seed for the random fallback answers
    #[arg(long)]
    seed: Option<u64>,

    /// Config file path
    #[arg(long)]
    config: Option<PathBuf>,
}

impl AnswerArgs {
    async fn run(self, mode: AnswerMode) -> anyhow::Result<()> {
        commands::answer::execute(self.quiz, self.seed, self.config, mode).await
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("autoquizzer=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            url,
            output,
            config,
        } => commands::generate::execute(url, output, config).await,
        Commands::Play { quiz } => commands::play::execute(quiz),
        Commands::ClosedBook(args) => args.run(AnswerMode::ClosedBook).await,
        Commands::WebRag(args) => args.run(AnswerMode::WebRag).await,
        Commands::Run {
            urls,
            output,
            format,
            seed,
            skip_web_rag,
            config,
        } => commands::run::execute(urls, output, format, seed, skip_web_rag, config).await,
        Commands::Validate { quiz } => commands::validate::execute(quiz),
        Commands::ListModels { config } => commands::list_models::execute(config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
