use crate::commands::{
    run_batch, run_health, run_model_info, run_predict, run_watch, BatchArgs, PredictArgs,
    WatchArgs,
};
use crate::infra::Preset;
use attrition_ai::config::AppConfig;
use attrition_ai::error::AppError;
use attrition_ai::telemetry;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "Attrition Risk Console",
    about = "Score employees against the attrition prediction service from the command line",
    version
)]
struct Cli {
    /// Override the configured prediction service base URL
    #[arg(long, global = true)]
    base_url: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Probe the prediction service once (default command)
    Health,
    /// Submit one employee profile and render the risk assessment
    Predict(PredictArgs),
    /// Score every row of a CSV export, one prediction per row
    Batch(BatchArgs),
    /// Keep probing the prediction service and print status changes
    Watch(WatchArgs),
    /// Print the metadata of the model behind the service
    ModelInfo,
    /// Score the built-in high-risk demo employee
    Demo,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let mut config = AppConfig::load()?;
    if let Some(base_url) = cli.base_url.as_deref() {
        config.service.set_base_url(base_url)?;
    }

    telemetry::init(&config.telemetry)?;

    match cli.command.unwrap_or(Command::Health) {
        Command::Health => run_health(&config).await,
        Command::Predict(args) => run_predict(&config, args).await,
        Command::Batch(args) => run_batch(&config, args).await,
        Command::Watch(args) => run_watch(&config, args).await,
        Command::ModelInfo => run_model_info(&config).await,
        Command::Demo => {
            let args = PredictArgs {
                preset: Preset::HighRisk,
                ..PredictArgs::default()
            };
            run_predict(&config, args).await
        }
    }
}
