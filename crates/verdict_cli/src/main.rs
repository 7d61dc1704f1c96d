use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use verdict_cli::client::{DEFAULT_ENDPOINT, PredictionClient};
use verdict_cli::{report, settings, upload};
use verdict_core::Interpreter;

#[derive(Parser)]
#[command(author, version, about = "Ask a model server for a verdict on an image", long_about = None)]
struct Cli {
    /// Interpreter config (TOML); defaults to the platform config dir
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload an image and show the verdict
    Predict {
        /// JPEG or PNG image, at most 10 MB
        image: PathBuf,
        #[arg(long, env = "VERDICT_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
        endpoint: String,
        /// Print the interpreted result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Interpret a saved JSON response (stdin when FILE is omitted or "-")
    Interpret {
        file: Option<PathBuf>,
        /// Print the interpreted result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check that the server is up
    Health {
        #[arg(long, env = "VERDICT_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
        endpoint: String,
    },
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("verdict: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Predict {
            image,
            endpoint,
            json,
        } => {
            let interpreter = interpreter(cli.config)?;
            let upload = upload::validate_image(&image)?;
            let client = PredictionClient::new(endpoint)?;
            let prediction = client
                .predict(upload)
                .with_context(|| format!("prediction failed for {}", image.display()))?;
            let out = report::render(
                &interpreter,
                &prediction.payload,
                Some(prediction.round_trip),
                json,
            )?;
            println!("{out}");
        }
        Commands::Interpret { file, json } => {
            let interpreter = interpreter(cli.config)?;
            let payload = report::read_saved_response(file.as_deref())?;
            println!("{}", report::render(&interpreter, &payload, None, json)?);
        }
        Commands::Health { endpoint } => {
            let client = PredictionClient::new(endpoint.clone())?;
            client
                .health()
                .with_context(|| format!("{endpoint} is not healthy"))?;
            println!("{endpoint}: ok");
        }
    }
    Ok(())
}

fn interpreter(explicit: Option<PathBuf>) -> Result<Interpreter> {
    let fallback = settings::default_config_path();
    let config = settings::load_interpreter_config(explicit.as_deref(), fallback.as_deref())?;
    Ok(Interpreter::new(config)?)
}
