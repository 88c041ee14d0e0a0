use anyhow::{Context, Result};
use chrono::{Days, Local, Timelike};
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::io;
use std::path::PathBuf;

use clothing_weather::constants::{
    DEFAULT_DATABASE, DEFAULT_EXCLUDED_FEATURES, DEFAULT_TIMEOUT_SECS, GEOCODING_API_BASE,
    OPEN_METEO_API_BASE, USER_AGENT,
};
use clothing_weather::dataset::read_csv;
use clothing_weather::forest::ForestParams;
use clothing_weather::formatters::{
    format_feature_summary, format_training_outcome, format_weather_summary,
};
use clothing_weather::prompt::{Prompter, TimeInput};
use clothing_weather::vocab::{Sport, Vocabulary};
use clothing_weather::{
    logging, train, ClothingSelection, Config, Hour, LogRow, ServiceConfig, SportsSuitability,
    Store, TrainOptions, WeatherService,
};

/// Log the weather with what you wore, and learn from it
#[derive(Debug, Parser)]
#[command(name = "clothing-weather", version)]
struct Cli {
    /// SQLite file holding the log
    #[arg(long, global = true, env = "CLOTHING_WEATHER_DB", default_value = DEFAULT_DATABASE)]
    database: PathBuf,

    /// Open-Meteo forecast API base URL
    #[arg(long, global = true, env = "CLOTHING_WEATHER_FORECAST_URL", default_value = OPEN_METEO_API_BASE)]
    forecast_url: String,

    /// Open-Meteo geocoding API base URL
    #[arg(long, global = true, env = "CLOTHING_WEATHER_GEOCODING_URL", default_value = GEOCODING_API_BASE)]
    geocoding_url: String,

    /// HTTP request timeout
    #[arg(long, global = true, env = "CLOTHING_WEATHER_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Defaults to `collect`
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Record the weather for an hour and what you wore
    Collect,
    /// Delete the most recently recorded entry
    Undo,
    /// Write every entry to CSV
    Export {
        /// Output file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Train and evaluate the clothing classifier
    Train(TrainArgs),
}

#[derive(Debug, Args)]
struct TrainArgs {
    /// Read entries from an exported CSV instead of the database
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Share of entries held out for evaluation
    #[arg(long, default_value_t = 0.2)]
    test_ratio: f64,

    #[arg(long, default_value_t = 8)]
    seed: u64,

    /// Trees per target
    #[arg(long, default_value_t = 100)]
    trees: usize,

    #[arg(long)]
    max_depth: Option<usize>,

    /// Weight of a worn item relative to an unworn one
    #[arg(long, default_value_t = 2.0)]
    positive_weight: f64,

    /// Feature column to leave out (repeatable)
    #[arg(
        long = "exclude-feature",
        default_values_t = DEFAULT_EXCLUDED_FEATURES.iter().map(|name| name.to_string())
    )]
    excluded_features: Vec<String>,

    /// Use every feature column, ignoring --exclude-feature
    #[arg(long)]
    all_features: bool,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            database: self.database.clone(),
            service: ServiceConfig {
                forecast_base: self.forecast_url.clone(),
                geocoding_base: self.geocoding_url.clone(),
                user_agent: USER_AGENT.to_string(),
                timeout_secs: self.timeout_secs,
            },
        }
    }
}

impl TrainArgs {
    fn options(&self) -> TrainOptions {
        TrainOptions {
            test_ratio: self.test_ratio,
            excluded_features: if self.all_features {
                Vec::new()
            } else {
                self.excluded_features.clone()
            },
            forest: ForestParams {
                n_trees: self.trees,
                max_depth: self.max_depth,
                positive_weight: self.positive_weight,
                seed: self.seed,
                ..ForestParams::default()
            },
        }
    }
}

fn undo(store: &Store) -> Result<()> {
    let rowid = store.delete_last().context("Failed to delete the last entry")?;
    println!("Deleted the last entry (row {}).", rowid);
    Ok(())
}

async fn collect(config: &Config) -> Result<()> {
    let store = config.open_store().context("Failed to open the log")?;

    let mut prompter = Prompter::new(io::stdin().lock(), io::stdout());
    let now = Local::now();
    let current = Hour::new(now.hour() as u8).context("Clock hour out of range")?;

    let (hour, past_days) = match prompter.time(current)? {
        TimeInput::Delete => return undo(&store),
        TimeInput::At { hour, past_days } => (hour, past_days),
    };
    let date = now
        .date_naive()
        .checked_sub_days(Days::new(u64::from(past_days)))
        .context("Date out of range")?;
    let location = prompter.location()?;

    prompter.say("Fetching weather data...")?;
    let service = WeatherService::new(&config.service)?;
    let coordinates = match service.geocode(&location).await {
        Ok(coordinates) => coordinates,
        Err(err) if err.is_not_found() => {
            anyhow::bail!("{}. Try \"City, Country\" or a nearby larger city.", err)
        }
        Err(err) => return Err(err).with_context(|| format!("Failed to geocode '{}'", location)),
    };
    let weather = service
        .fetch_reading(coordinates, hour.get(), past_days)
        .await
        .context("Failed to fetch weather")?;
    prompter.say(&format_weather_summary(date, hour, &location, &weather))?;

    prompter.say("Select your clothing items (comma separated if multiple) or leave blank for the default.")?;
    let clothing = ClothingSelection {
        outerwear: prompter.selection()?,
        bottoms: prompter.selection()?,
        footwear: prompter.selection()?,
        accessories: prompter.selection()?,
    };

    prompter.say("What activity were you doing?")?;
    let activity = prompter.selection()?;

    prompter.say("What sports would you play in this weather?")?;
    let mut sports = SportsSuitability::new();
    for sport in Sport::ALL {
        sports.set(*sport, prompter.sport(*sport)?);
    }

    let other = prompter.note()?;

    let row = LogRow {
        date,
        time: hour,
        location,
        weather,
        clothing,
        sports,
        activity,
        other,
    };
    store.append(&row).context("Failed to save the entry")?;
    prompter.say("Saved.")?;
    Ok(())
}

fn export(config: &Config, output: Option<PathBuf>) -> Result<()> {
    let store = config.open_store().context("Failed to open the log")?;

    let written = match output {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            store.export_csv(file)?
        }
        None => store.export_csv(io::stdout().lock())?,
    };
    tracing::info!("Exported {} entries", written);
    Ok(())
}

fn train_model(config: &Config, args: &TrainArgs) -> Result<()> {
    let rows = match &args.csv {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
            read_csv(file).with_context(|| format!("Failed to read {}", path.display()))?
        }
        None => config
            .open_store()
            .context("Failed to open the log")?
            .load_all()
            .context("Failed to load entries from the log")?,
    };
    tracing::info!("Loaded {} entries", rows.len());

    let outcome = train(&rows, &args.options())?;
    println!("{}", format_feature_summary(&outcome.feature_summary));
    println!("{}", format_training_outcome(&outcome));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = cli.config();
    tracing::debug!("Using database {}", config.database.display());

    match cli.command {
        None | Some(Command::Collect) => collect(&config).await,
        Some(Command::Undo) => undo(&config.open_store().context("Failed to open the log")?),
        Some(Command::Export { output }) => export(&config, output),
        Some(Command::Train(args)) => train_model(&config, &args),
    }
}
