use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use partial_pair_core::{GameMode, ScoreConfig, SettingsSource};
use std::path::PathBuf;

mod bot;
mod config;
mod observer;
mod play;
mod store;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Settings file
    #[arg(short, long, default_value = "partial-pair.toml")]
    config: PathBuf,

    /// Where finished sessions are stored
    #[arg(short, long, default_value = "partial-pair-records.json")]
    records: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Let the bot play a session
    Play(play::PlayArgs),
    /// List or prune stored sessions
    Records(RecordsArgs),
    /// Show or change settings
    Settings(SettingsArgs),
}

#[derive(clap::Args, Debug)]
struct RecordsArgs {
    /// Only show the best N sessions, ranked by score
    #[arg(long)]
    top: Option<usize>,

    /// Delete the Nth most recent session, counting from 1
    #[arg(long, conflicts_with_all = ["clear", "top"])]
    delete: Option<usize>,

    /// Delete every stored session
    #[arg(long, conflicts_with = "top")]
    clear: bool,
}

#[derive(clap::Args, Debug)]
struct SettingsArgs {
    /// Tiles dealt per round, clamped to 10..=25
    #[arg(long)]
    tiles_per_game: Option<usize>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ModeArg {
    Classic,
    Challenge,
}

impl From<ModeArg> for GameMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Classic => GameMode::Classic,
            ModeArg::Challenge => GameMode::Challenge,
        }
    }
}

fn parse_scoring(name: &str) -> Result<ScoreConfig, String> {
    ScoreConfig::by_name(name)
        .ok_or_else(|| format!("unknown scoring profile {name:?}, expected standard, competitive or casual"))
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();
    log::debug!("config: {}", args.config.display());

    match args.command {
        Command::Play(play_args) => {
            let settings = config::load_settings(&args.config)?;
            let store = store::JsonRecordStore::new(&args.records);
            play::run(&play_args, &settings, store)
        }
        Command::Records(records_args) => show_records(&records_args, &args.records),
        Command::Settings(settings_args) => update_settings(&settings_args, &args.config),
    }
}

fn show_records(args: &RecordsArgs, path: &std::path::Path) -> Result<()> {
    let store = store::JsonRecordStore::new(path);

    if args.clear {
        let removed = store.clear()?;
        println!("Deleted {removed} sessions");
        return Ok(());
    }
    if let Some(position) = args.delete {
        match position.checked_sub(1).map(|index| store.delete(index)).transpose()? {
            Some(Some(record)) => println!("Deleted {}", record),
            _ => println!("No session #{position}"),
        }
        return Ok(());
    }

    let records = match args.top {
        Some(count) => store.top_scores(count)?,
        None => store.newest_first()?,
    };
    if records.is_empty() {
        println!("No sessions stored yet");
    }
    for (position, record) in records.iter().enumerate() {
        println!("{:>3}. {}", position + 1, record);
    }
    Ok(())
}

fn update_settings(args: &SettingsArgs, path: &std::path::Path) -> Result<()> {
    let mut settings = config::load_settings(path)?;
    if let Some(tiles) = args.tiles_per_game {
        settings.set_tiles_per_game(tiles);
        config::save_settings(path, &settings)?;
        log::info!("saved settings to {}", path.display());
    }
    println!("tiles_per_game = {}", settings.tiles_per_round());
    Ok(())
}
