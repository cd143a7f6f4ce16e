//! Content Agent - retrieval-augmented, quality-gated content generation.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use content_agent::batch::{passed_count, REFERENCE_END, REFERENCE_OUTPUT, REFERENCE_START};
use content_agent::commands::{rebuild_index, CommandError, Pipeline};
use content_agent::config::{AppConfig, ConfigError, ConfigLoader};
use content_agent::content::{CalendarStore, ContentKind, GenerationRequest, Lens, Objective};
use content_agent::display;

#[derive(Parser)]
#[command(
    name = "content-agent",
    about = "Retrieval-augmented content generation with quality gating",
    version
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file to use instead of the default search paths.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Model alias or literal model id.
    #[arg(long, global = true)]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one piece of content.
    Generate {
        /// Content kind (short, medium, long).
        #[arg(short, long, default_value_t = ContentKind::Short)]
        kind: ContentKind,
        #[arg(long)]
        topic: String,
        #[arg(long)]
        lens: Lens,
        #[arg(long)]
        objective: Objective,
        /// Skip knowledge retrieval.
        #[arg(long)]
        no_rag: bool,
        /// Score the result after generating it.
        #[arg(long)]
        validate: bool,
    },
    /// Score the contents of a file.
    Validate {
        #[arg(short, long, default_value_t = ContentKind::Short)]
        kind: ContentKind,
        file: PathBuf,
    },
    /// Generate and validate a range of calendar posts.
    Batch {
        #[arg(long, default_value_t = REFERENCE_START)]
        start: u32,
        #[arg(long, default_value_t = REFERENCE_END)]
        end: u32,
        #[arg(short, long, default_value = REFERENCE_OUTPUT)]
        output: PathBuf,
        /// Generation attempts per post.
        #[arg(long)]
        max_retries: Option<u32>,
        #[arg(short, long, default_value_t = ContentKind::Short)]
        kind: ContentKind,
    },
    /// Rebuild the knowledge index.
    Index {
        /// Only index this subdirectory of the knowledge directory.
        #[arg(long)]
        subdir: Option<String>,
    },
    /// List the content calendar.
    Calendar,
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

fn load_config(path: Option<PathBuf>, model: Option<String>) -> Result<AppConfig, ConfigError> {
    let loader = path.map_or_else(ConfigLoader::new, ConfigLoader::with_path);
    let mut config = loader.load()?;
    if let Some(model) = model {
        config.ai.model = model;
    }
    Ok(config)
}

async fn run(command: Commands, mut config: AppConfig) -> Result<bool, CommandError> {
    match command {
        Commands::Calendar => {
            display::print_calendar(CalendarStore::reference().entries());
            Ok(true)
        }
        Commands::Index { subdir } => {
            let chunks = rebuild_index(&config.knowledge, subdir.as_deref()).await?;
            display::print_info(&format!(
                "Indexed {chunks} chunks into {}",
                config.knowledge.index_path().display()
            ));
            Ok(true)
        }
        Commands::Generate {
            kind,
            topic,
            lens,
            objective,
            no_rag,
            validate,
        } => {
            let pipeline = Pipeline::from_config(config)?;
            let mut request =
                GenerationRequest::new(kind, topic, lens.as_str(), objective.as_str());
            if no_rag {
                request = request.without_rag();
            }
            let report = pipeline.generate(&request, validate).await?;
            display::print_text(&report.content);
            display::print_info(&format!("Words: {}", report.word_count));
            match report.validation {
                Some(outcome) => {
                    display::print_score(outcome.score, outcome.word_count);
                    display::print_verdict(
                        outcome.passed,
                        outcome.score,
                        pipeline.config().pipeline.min_score,
                    );
                    Ok(outcome.passed)
                }
                None => Ok(true),
            }
        }
        Commands::Validate { kind, file } => {
            let pipeline = Pipeline::from_config(config)?;
            let result = pipeline.validate_file(kind, &file).await?;
            let passed = pipeline.validator().is_passing(result.score);
            display::print_text(&result.feedback);
            display::print_score(result.score, result.word_count);
            display::print_verdict(passed, result.score, pipeline.config().pipeline.min_score);
            Ok(passed)
        }
        Commands::Batch {
            start,
            end,
            output,
            max_retries,
            kind,
        } => {
            if let Some(max_retries) = max_retries {
                config.pipeline.max_retries = max_retries;
            }
            let pipeline = Pipeline::from_config(config)?;
            let results = pipeline.batch(kind, start, end, &output).await?;
            display::print_results(&results);
            display::print_info(&format!("Results exported to {}", output.display()));
            Ok(passed_count(&results) == results.len())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match load_config(cli.config, cli.model) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to load configuration");
            display::print_error(&e.to_string());
            return ExitCode::from(2);
        }
    };

    match run(cli.command, config).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            display::print_error(&e.to_string());
            ExitCode::from(2)
        }
    }
}
