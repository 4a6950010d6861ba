use std::{
    io::{self, Stdout},
    path::PathBuf,
};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};
use weather_core::{
    Config, OpenWeatherClient, WeatherSession, WeatherStore, check_api_key, provider_from_config,
};

use crate::menu;

pub type Session = WeatherSession<OpenWeatherClient, Stdout>;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Weather lookup and logging CLI")]
pub struct Cli {
    /// OpenWeatherMap API key for this run, overriding the config file.
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// SQLite weather log to use, overriding the config file.
    #[arg(long, global = true)]
    pub database: Option<PathBuf>,

    /// Runs the interactive menu when omitted.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactive numbered menu.
    Menu,

    /// Look up and log the weather for one city.
    Lookup {
        /// City name, e.g. "London" or "Paris,FR".
        city: String,
    },

    /// Look up and log several cities.
    Multi {
        /// Comma separated city names.
        cities: String,
    },

    /// Show the most recent log entries.
    Logs,

    /// Show statistics over the log.
    Stats,

    /// Delete every log entry.
    Clear {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },

    /// Save an OpenWeatherMap API key to the config file.
    Configure,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;

        match self.command.unwrap_or(Command::Menu) {
            Command::Configure => configure(config).await,
            command => {
                if let Some(key) = self.api_key {
                    config.set_api_key(&key);
                }
                if let Some(path) = self.database {
                    config.database_path = Some(path);
                }

                let mut session = open_session(&config)?;
                dispatch(&mut session, command).await
            }
        }
    }
}

async fn dispatch(session: &mut Session, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Menu => menu::run(session).await?,
        Command::Lookup { city } => {
            session.process_city(&city).await?;
        }
        Command::Multi { cities } => {
            session.process_multiple(&cities).await?;
        }
        Command::Logs => {
            session.view_recent()?;
        }
        Command::Stats => {
            session.show_statistics()?;
        }
        Command::Clear { yes } => {
            let answer = if yes { Some("yes".to_string()) } else { menu::confirm_clear()? };
            session.clear_all(answer.as_deref().unwrap_or_default())?;
        }
        Command::Configure => bail!("`configure` cannot run inside a weather session"),
    }

    Ok(())
}

/// Initialize the log and the client. Any failure here ends the process.
fn open_session(config: &Config) -> anyhow::Result<Session> {
    let path = config.database_path()?;
    let store = WeatherStore::new(path.clone());
    store
        .initialize()
        .with_context(|| format!("Failed to initialize weather log at {}", path.display()))?;

    let provider = provider_from_config(config)?;

    tracing::info!(database = %path.display(), custom_key = config.has_api_key(), "session ready");
    Ok(WeatherSession::new(provider, store, io::stdout()))
}

/// Prompt for a key, check it with one lookup and save it only if it works.
async fn configure(mut config: Config) -> anyhow::Result<()> {
    let key = Password::new("OpenWeatherMap API key (leave empty for the default key):")
        .without_confirmation()
        .with_display_mode(PasswordDisplayMode::Masked)
        .prompt()?;

    let key = key.trim();
    if !key.is_empty() {
        println!("Testing your API key...");
        let client = OpenWeatherClient::new(key.to_string())?;

        if let Err(err) = check_api_key(&client).await {
            println!("API key test failed: {err}");
            if let Some(hint) = err.hint() {
                println!("Suggestion: {hint}");
            }
            println!("The key was not saved; {} will be used.", describe_key(&config));
            return Ok(());
        }

        println!("API key is valid and working!");
    }

    config.set_api_key(key);
    config.save()?;

    if config.has_api_key() {
        println!("API key saved to {}", Config::config_file_path()?.display());
    } else {
        println!("No key entered; the default API key will be used.");
    }
    Ok(())
}

fn describe_key(config: &Config) -> &'static str {
    if config.has_api_key() { "the previously saved key" } else { "the default API key" }
}
