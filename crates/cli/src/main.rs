mod app;
mod console;
mod games;

use std::fs::{self, OpenOptions};
use std::io::{self, Write};

use anyhow::{bail, Context, Result};
use quarry_core::{
    config::{self, AppConfig},
    EngineError, Profile, ProfileStore, Session,
};
use tracing_subscriber::{prelude::*, EnvFilter};

fn main() -> Result<()> {
    init_logging()?;

    config::ensure_default_config()?;
    let config = AppConfig::load()?;
    tracing::info!("quarry starting, profile at {}", config.profile_path().display());

    let session = open_session(&config)?;
    let app = app::App::new(&session);
    app.run()
}

/// Open the profile, offering a fresh start when the file is damaged.
fn open_session(config: &AppConfig) -> Result<Session> {
    let store =
        ProfileStore::with_starting_balance(config.profile_path(), config.starting_balance);
    match Session::open(store) {
        Ok(session) => Ok(session),
        Err(EngineError::CorruptState(reason)) => {
            tracing::warn!("profile rejected: {reason}");
            println!("Your save file is damaged: {reason}");
            println!("Starting fresh will erase the old balance and statistics.");
            if !ask_yes_no("Start with a fresh profile? (y/n)")? {
                bail!(
                    "save file left untouched; fix or remove {}",
                    config.profile_path().display()
                );
            }
            let store = ProfileStore::with_starting_balance(
                config.profile_path(),
                config.starting_balance,
            );
            Ok(Session::from_profile(
                store,
                Profile::fresh(config.starting_balance),
            ))
        }
        Err(err) => Err(err).context("failed to open the player profile"),
    }
}

fn ask_yes_no(question: &str) -> Result<bool> {
    loop {
        print!("{question}: ");
        io::stdout().flush().context("failed to flush stdout")?;
        let mut buf = String::new();
        let read = io::stdin()
            .read_line(&mut buf)
            .context("failed to read input")?;
        if read == 0 {
            return Ok(false);
        }
        match buf.trim().to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => println!("Please answer y or n."),
        }
    }
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("quarry.log");

    let env_filter = EnvFilter::from_default_env();

    // No stdout layer; log lines would interleave with gameplay text.
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .compact()
        .with_writer(move || {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .expect("failed to open log file")
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
