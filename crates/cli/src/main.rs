//! Weather Predictor CLI
//!
//! Interactive menu and one-shot commands for the weather summary,
//! precipitation type and temperature predictors.

mod commands;
mod config;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{encode, menu, predict};
use predictor_lib::predictor::{PredictorKind, PredictorRegistry};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Weather Predictor CLI
#[derive(Parser)]
#[command(name = "wxp")]
#[command(author, version, about = "CLI for the Weather Predictor", long_about = None)]
pub struct Cli {
    /// Directory holding the model artifacts (can also be set via WEATHER_MODEL_DIR env var)
    #[arg(long, env = "WEATHER_MODEL_DIR", global = true)]
    pub model_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, short, global = true)]
    pub format: Option<output::OutputFormat>,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive menu (default)
    Menu,

    /// Run a single prediction
    #[command(subcommand)]
    Predict(PredictCommands),

    /// Show the cyclical features for an hour and month
    Encode {
        /// Hour (0-23)
        #[arg(long, allow_hyphen_values = true)]
        hour: i64,

        /// Month (1-12)
        #[arg(long, allow_hyphen_values = true)]
        month: i64,
    },
}

#[derive(Subcommand)]
pub enum PredictCommands {
    /// Predict the weather summary
    Summary {
        #[command(flatten)]
        observation: predict::ObservationArgs,

        /// Precip Type (e.g., rain, snow)
        #[arg(long)]
        precip_type: String,
    },

    /// Predict the precipitation type
    Precip {
        #[command(flatten)]
        observation: predict::ObservationArgs,
    },

    /// Predict next hour's temperature
    Temp {
        #[command(flatten)]
        observation: predict::ObservationArgs,

        /// Summary (e.g., Overcast, Clear)
        #[arg(long)]
        summary: String,

        /// Precip Type (e.g., rain, snow)
        #[arg(long)]
        precip_type: String,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run_menu(model_dir: &std::path::Path) -> Result<()> {
    let predictors = PredictorRegistry::load(model_dir);
    if predictors.loaded_count() < PredictorKind::ALL.len() {
        output::print_info(&format!(
            "{} of {} predictors loaded from {}",
            predictors.loaded_count(),
            PredictorKind::ALL.len(),
            model_dir.display()
        ));
    }

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    if stdin.is_terminal() {
        menu::ConsoleSession::new(&predictors, menu::TerminalPrompter, stdout.lock()).run()
    } else {
        let prompter = menu::LinePrompter::new(stdin.lock());
        menu::ConsoleSession::new(&predictors, prompter, stdout.lock()).run()
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = config::Config::load()?;
    let model_dir = config.resolve_model_dir(cli.model_dir);
    let format = cli
        .format
        .or_else(|| {
            config
                .default_format
                .as_deref()
                .and_then(output::OutputFormat::from_config)
        })
        .unwrap_or_default();

    match cli.command.unwrap_or(Commands::Menu) {
        Commands::Menu => run_menu(&model_dir)?,
        Commands::Predict(predict_cmd) => match predict_cmd {
            PredictCommands::Summary {
                observation,
                precip_type,
            } => {
                let record = predict::summary_record(&observation, &precip_type);
                predict::predict(&model_dir, PredictorKind::Summary, &record, format)?;
            }
            PredictCommands::Precip { observation } => {
                let record = predict::precip_record(&observation);
                predict::predict(&model_dir, PredictorKind::PrecipType, &record, format)?;
            }
            PredictCommands::Temp {
                observation,
                summary,
                precip_type,
            } => {
                let record = predict::temperature_record(&observation, &summary, &precip_type);
                predict::predict(&model_dir, PredictorKind::Temperature, &record, format)?;
            }
        },
        Commands::Encode { hour, month } => {
            encode::encode(hour, month, format)?;
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
