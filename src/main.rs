use clap::{Parser, Subcommand};
use serde_json::json;
use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use drought_monitor::analysis::derived;
use drought_monitor::classify::{self, DayClassification};
use drought_monitor::config::{ClassifierConfig, Location};
use drought_monitor::inference;
use drought_monitor::ingest::{power, weatherbit};
use drought_monitor::logging::{self, LogLevel, Source};
use drought_monitor::model::{DroughtError, Series};
use drought_monitor::report::Summary;
use drought_monitor::verify;

#[derive(Parser)]
#[command(name = "drought-monitor", author, version, about = "Classify daily drought severity from NASA POWER data", long_about = None)]
struct Cli {
    /// TOML configuration file (defaults to $DROUGHT_CONFIG, then drought.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Turn debugging information on
    #[arg(short, long, action = clap::ArgAction::Count)]
    debug: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify every configured location (or one, with --location)
    Classify {
        /// Read a saved POWER response instead of fetching
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short, long)]
        location: Option<String>,
        /// Print per-day classifications as JSON instead of the summary
        #[arg(long)]
        json: bool,
        /// Append the Weatherbit forecast (needs WEATHERBIT_API_KEY)
        #[arg(long)]
        forecast: bool,
    },
    /// Report per-parameter coverage of a POWER response
    Verify {
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short, long)]
        location: Option<String>,
    },
    /// Print the zero-filled feature vector of the last day, for an external model
    Features {
        #[arg(short, long)]
        input: PathBuf,
        /// Comma-separated feature names, in model order
        #[arg(short, long, value_delimiter = ',', required = true)]
        features: Vec<String>,
    },
}

fn selected_locations(config: &ClassifierConfig, name: Option<&str>) -> Result<Vec<Location>, DroughtError> {
    match name {
        Some(n) => config
            .find_location(n)
            .cloned()
            .map(|l| vec![l])
            .ok_or_else(|| DroughtError::Config(format!("no location named '{}'", n))),
        None => Ok(config.locations.clone()),
    }
}

fn http_client(config: &ClassifierConfig) -> Result<reqwest::blocking::Client, DroughtError> {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(config.provider.timeout_secs))
        .build()
        .map_err(|e| DroughtError::Transport(e.to_string()))
}

fn read_input(path: &PathBuf) -> Result<String, DroughtError> {
    std::fs::read_to_string(path)
        .map_err(|e| DroughtError::ParseError(format!("{}: {}", path.display(), e)))
}

/// Step of a per-location run that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Ingest,
    Classify,
}

impl Stage {
    fn source(self) -> Source {
        match self {
            Stage::Ingest => Source::Power,
            Stage::Classify => Source::Classifier,
        }
    }

    fn operation(self) -> &'static str {
        match self {
            Stage::Ingest => "ingest",
            Stage::Classify => "classification",
        }
    }
}

struct LocationRun {
    location: Location,
    days: Vec<DayClassification>,
    summary: Summary,
}

fn classify_location(
    client: &reqwest::blocking::Client,
    config: &ClassifierConfig,
    location: &Location,
    input: Option<&PathBuf>,
    forecast: bool,
) -> Result<LocationRun, (Stage, DroughtError)> {
    let mut series: Series = match input {
        Some(path) => read_input(path).and_then(|body| power::parse_daily_response(&body)),
        None => power::fetch_series(client, config, location),
    }
    .map_err(|e| (Stage::Ingest, e))?;

    if forecast {
        match weatherbit::fetch_forecast(client, location) {
            Ok(days) => {
                let appended = series.extend_forecast(days);
                logging::info(
                    Source::Weatherbit,
                    Some(&location.name),
                    &format!("appended {} forecast days", appended),
                );
            }
            Err(e) => logging::log_fetch_failure(Source::Weatherbit, &location.name, "forecast", &e),
        }
    }

    let days = classify::run(&mut series).map_err(|e| (Stage::Classify, e))?;
    let summary = Summary::from_classifications(location, &series, &days);
    logging::log_run_summary(&location.name, days.len(), summary.worst());

    Ok(LocationRun {
        location: location.clone(),
        days,
        summary,
    })
}

/// All successful runs as one JSON array.
fn runs_to_json(runs: &[LocationRun]) -> serde_json::Value {
    serde_json::Value::Array(
        runs.iter()
            .map(|r| json!({ "location": r.location, "days": r.days }))
            .collect(),
    )
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let config = ClassifierConfig::load_from_env(cli.config.as_deref())?;
    let level = if cli.debug > 0 { LogLevel::Debug } else { config.logging.level };
    logging::init_logger(level, config.logging.file.as_deref(), config.logging.console_timestamps);

    let client = http_client(&config)?;

    match cli.command {
        Commands::Classify { input, location, json, forecast } => {
            let mut locations = selected_locations(&config, location.as_deref())?;
            // A saved response belongs to a single point.
            if input.is_some() {
                locations.truncate(1);
            }

            let mut runs = Vec::new();
            for loc in &locations {
                match classify_location(&client, &config, loc, input.as_ref(), forecast) {
                    Ok(run) => runs.push(run),
                    Err((stage, e)) => {
                        logging::log_fetch_failure(stage.source(), &loc.name, stage.operation(), &e)
                    }
                }
            }
            if runs.is_empty() {
                return Err(DroughtError::NoInputData.into());
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&runs_to_json(&runs))?);
            } else {
                for run in &runs {
                    println!("{}\n", run.summary);
                }
            }
        }
        Commands::Verify { input, location } => {
            let locations = selected_locations(&config, location.as_deref())?;
            let loc = locations.first().ok_or(DroughtError::NoInputData)?;
            let body = match &input {
                Some(path) => read_input(path)?,
                None => power::fetch_body(&client, &config, loc)?,
            };
            let report = verify::verify_payload(&body, &config.provider.parameters)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Features { input, features } => {
            let mut series = power::parse_daily_response(&read_input(&input)?)?;
            derived::augment(&mut series);
            let last = series.records().last().ok_or(DroughtError::NoInputData)?;
            let vector = inference::feature_vector(&last.to_flat_map(), &features);
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "date": last.date,
                    "features": features,
                    "values": vector,
                }))?
            );
        }
    }

    Ok(())
}
