use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use thrive::api::{self, AppState};
use thrive::config::{Config, Usage};
use thrive::core::{IncomeViabilityInput, IncomeViabilityOutput, calculate_viability};
use thrive::flows::viability;
use thrive::narrative;

#[derive(Parser, Debug)]
#[command(
    name = "thrive",
    about = "Income viability estimates and AI-assisted personal finance advice"
)]
struct Cli {
    /// TOML config file. THRIVE_* environment variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP API.
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Estimate income viability for one income and zip code.
    Estimate {
        #[arg(long)]
        gross_income: f64,
        #[arg(long)]
        postal_code: String,
        /// Ask the configured model for the assessment sentence.
        #[arg(long)]
        narrate: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("thrive=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let usage = match cli.command {
        Command::Estimate { narrate: false, .. } => Usage::Offline,
        _ => Usage::Model,
    };
    let mut config = match Config::resolve(cli.config.as_deref(), usage) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    match cli.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            let state = AppState::from_config(&config);
            if let Err(e) = api::run_http_server(&config.server, state).await {
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
        }
        Command::Estimate {
            gross_income,
            postal_code,
            narrate,
        } => {
            let input = match IncomeViabilityInput::new(gross_income, &postal_code) {
                Ok(input) => input,
                Err(err) => {
                    for (field, messages) in &err.field_errors {
                        for message in messages {
                            eprintln!("{field}: {message}");
                        }
                    }
                    std::process::exit(2);
                }
            };

            let output = if narrate {
                let narrator = narrative::build_narrator(&config.llm);
                match viability::assess(narrator.as_ref(), config.llm.timeout(), &input).await {
                    Ok(report) => report.output,
                    Err(e) => {
                        eprintln!("Estimate error: {e}");
                        std::process::exit(1);
                    }
                }
            } else {
                IncomeViabilityOutput::from_figures(&calculate_viability(&input))
            };

            match serde_json::to_string_pretty(&output) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("Output error: {e}");
                    std::process::exit(1);
                }
            }
        }
    }
}
