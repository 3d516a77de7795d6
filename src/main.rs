//! # Sonic - Mood-Based Music Recommendations
//!
//! Tell Sonic how you feel and it recommends Bollywood, Punjabi and world
//! music for your mood. Without a subcommand the interactive chat starts;
//! the other subcommands expose the queue, history and settings directly.
//!
//! ## Usage
//!
//! ```bash
//! # Chat
//! sonic
//!
//! # One-shot recommendation
//! sonic ask "long drive with friends tonight"
//!
//! # Queue and history
//! sonic queue list
//! sonic history list --mood happy
//! ```

use anyhow::{bail, Result};
use clap::{CommandFactory, Parser};
use log::{debug, info};
use serde::Serialize;
use sonic::cli::{self, Command, HistoryAction, QueueAction, SettingsAction};
use sonic::config::{self, RuntimeConfig};
use sonic::gemini::GeminiClient;
use sonic::history::{self, HistoryFilter};
use sonic::languages::{self, LANGUAGE_OPTIONS};
use sonic::links::{self, Platform};
use sonic::session::{ChatSession, Sender, TurnOutcome};
use sonic::song::Song;
use sonic::{completion, db, queue, repl, settings};

/// Main entry point for the Sonic application.
///
/// # Logging
///
/// Initializes environment logger which can be controlled via `RUST_LOG`:
/// - `RUST_LOG=debug sonic ask "..."` - Enable debug logging
/// - `RUST_LOG=sonic::gemini=debug sonic` - Request details only
fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();
    let config = runtime_config(&args)?;
    debug!("Runtime configuration: {config:?}");

    match args.command.unwrap_or(Command::Chat) {
        Command::Chat => {
            let mut conn = db::open(&config.db_path)?;
            let stored = settings::load(&conn)?;
            let api_key = config.resolve_api_key(stored.api_key.as_deref());
            let client = GeminiClient::new(&config)?;
            repl::run(&mut conn, client, api_key)?;
        }
        Command::Ask { text, json } => {
            let line = text.join(" ");
            one_turn(&config, json, |session| session.send(&line))?;
        }
        Command::Discover { mood, json } => {
            one_turn(&config, json, |session| {
                session.resume_mood(&mood);
                session.discover_more()
            })?;
        }
        Command::Queue { action } => queue_command(&config, action)?,
        Command::History { action } => history_command(&config, action)?,
        Command::Settings { action } => {
            settings_command(&config, action.unwrap_or(SettingsAction::Show))?;
        }
        Command::Languages => {
            for (index, option) in LANGUAGE_OPTIONS.iter().enumerate() {
                println!("{:>2}. {option}", index + 1);
            }
        }
        Command::Links {
            title,
            artist,
            platform,
            open,
            share,
        } => {
            let song = Song::new(title, artist);
            match platform {
                Some(platform) => {
                    let url = platform.search_url(&song);
                    println!("{url}");
                    if open {
                        links::open_url(&url)?;
                    }
                }
                None => {
                    for platform in Platform::ALL {
                        println!("{:<14} {}", platform.name(), platform.search_url(&song));
                    }
                }
            }
            if let Some(mood) = share {
                println!("{}", links::share_text(&song, &mood));
            }
        }
        Command::Completion { shell } => {
            let mut cmd = cli::Args::command();
            completion::generate_completions(completion::shell_to_completion_shell(shell), &mut cmd);
        }
        Command::CompleteMoods => {
            // Used by shell completion scripts for mood arguments
            completion::print_mood_completions(&config.db_path)?;
        }
    }

    Ok(())
}

/// Merge command-line and environment overrides over the defaults.
fn runtime_config(args: &cli::Args) -> Result<RuntimeConfig> {
    let mut config = match &args.db {
        Some(path) => RuntimeConfig::with_db_path(path.clone()),
        None => RuntimeConfig::with_db_path(config::get_db_path()?),
    };
    if let Some(model) = &args.model {
        config.model.clone_from(model);
    }
    if let Some(endpoint) = &args.endpoint {
        config.endpoint.clone_from(endpoint);
    }
    if let Some(timeout) = args.timeout {
        config.timeout_secs = timeout;
    }
    config.api_key_override.clone_from(&args.api_key);
    Ok(config)
}

/// Non-interactive reply, as printed by `ask --json` / `discover --json`.
#[derive(Serialize)]
struct Reply<'a> {
    mood: &'a str,
    text: Vec<&'a str>,
    songs: &'a [Song],
}

/// Run one chat turn outside the REPL and print the result.
fn one_turn<F>(config: &RuntimeConfig, json: bool, action: F) -> Result<()>
where
    F: FnOnce(&mut ChatSession<GeminiClient>) -> TurnOutcome,
{
    let mut conn = db::open(&config.db_path)?;
    let stored = settings::load(&conn)?;
    let api_key = config.resolve_api_key(stored.api_key.as_deref());
    let mut session = ChatSession::new(GeminiClient::new(config)?, api_key, stored.languages);

    let before = session.transcript().len();
    let outcome = action(&mut session);

    let songs: &[Song] = match &outcome {
        TurnOutcome::Recommended { mood, songs } => {
            history::append_all(&mut conn, songs, mood, history::now_millis())?;
            songs
        }
        TurnOutcome::NeedsCredential => bail!(
            "No valid Gemini API key. Store one with `sonic settings api-key <KEY>` or set GEMINI_API_KEY."
        ),
        _ => &[],
    };

    let text: Vec<&str> = session.transcript()[before..]
        .iter()
        .filter(|m| m.sender == Sender::Ai && !m.text.is_empty())
        .map(|m| m.text.as_str())
        .collect();

    if json {
        let reply = Reply {
            mood: session.current_mood(),
            text,
            songs,
        };
        println!("{}", serde_json::to_string_pretty(&reply)?);
    } else {
        for line in &text {
            println!("{line}");
        }
        for line in repl::song_lines(songs) {
            println!("  {line}");
        }
    }

    match outcome {
        TurnOutcome::Failed(kind) => bail!("Recommendation failed: {kind}"),
        TurnOutcome::ChooseLanguages => {
            println!("Pick your music languages with `sonic settings languages <names>`.");
            Ok(())
        }
        _ => Ok(()),
    }
}

fn queue_command(config: &RuntimeConfig, action: QueueAction) -> Result<()> {
    let mut conn = db::open(&config.db_path)?;
    match action {
        QueueAction::List => {
            let songs = queue::list(&conn)?;
            if songs.is_empty() {
                println!("Your queue is empty.");
            }
            for line in repl::song_lines(&songs) {
                println!("{line}");
            }
        }
        QueueAction::Add { title, artist } => {
            let song = Song::new(title, artist);
            if queue::add(&conn, &song)? {
                println!("Added {song} to your queue.");
            } else {
                println!("{song} is already in your queue.");
            }
        }
        QueueAction::Remove { position } => {
            let song = queue::remove_at(&mut conn, position)?;
            println!("Removed {song}.");
        }
        QueueAction::Move { from, to } => {
            queue::move_song(&mut conn, from, to)?;
            info!("Moved queue entry {from} to {to}");
        }
        QueueAction::Clear => {
            let removed = queue::clear(&conn)?;
            println!("Removed {removed} songs.");
        }
        QueueAction::Open { position, platform } => {
            let songs = queue::list(&conn)?;
            let Some(song) = position.checked_sub(1).and_then(|i| songs.get(i)) else {
                bail!("Queue position {position} is out of range (queue has {} songs)", songs.len());
            };
            let url = platform.search_url(song);
            println!("{url}");
            links::open_url(&url)?;
        }
    }
    Ok(())
}

fn history_command(config: &RuntimeConfig, action: HistoryAction) -> Result<()> {
    let conn = db::open(&config.db_path)?;
    match action {
        HistoryAction::List {
            mood,
            from,
            to,
            json,
        } => {
            let filter = HistoryFilter {
                start: from,
                end: to,
                ..HistoryFilter::default()
            }
            .with_mood(mood.as_deref());
            let entries = history::list(&conn, &filter)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                for entry in &entries {
                    println!(
                        "{}  {:<10} {}",
                        repl::format_timestamp(entry.timestamp),
                        entry.mood,
                        entry.song
                    );
                }
            }
        }
        HistoryAction::Moods => {
            for mood in history::distinct_moods(&conn)? {
                println!("{mood}");
            }
        }
        HistoryAction::Clear => {
            let removed = history::clear(&conn)?;
            println!("Removed {removed} history entries.");
        }
        HistoryAction::Queue { position } => {
            let entries = history::list(&conn, &HistoryFilter::default())?;
            let Some(entry) = position.checked_sub(1).and_then(|i| entries.get(i)) else {
                bail!("History position {position} is out of range ({} entries)", entries.len());
            };
            if queue::add(&conn, &entry.song)? {
                println!("Added {} to your queue.", entry.song);
            } else {
                println!("{} is already in your queue.", entry.song);
            }
        }
    }
    Ok(())
}

fn settings_command(config: &RuntimeConfig, action: SettingsAction) -> Result<()> {
    let conn = db::open(&config.db_path)?;
    match action {
        SettingsAction::Show => {
            let stored = settings::load(&conn)?;
            let chosen: Vec<&str> = stored
                .languages
                .iter()
                .map(|l| languages::display_name(l))
                .collect();
            println!("Database:    {}", config.db_path.display());
            println!("Model:       {}", config.model);
            println!("Theme:       {}", stored.theme);
            println!(
                "API key:     {}",
                stored.masked_api_key().unwrap_or_else(|| "not stored".to_string())
            );
            println!(
                "Languages:   {}",
                if chosen.is_empty() { "any".to_string() } else { chosen.join(", ") }
            );
            println!("Onboarding:  {}", if stored.onboarding_complete { "done" } else { "pending" });
        }
        SettingsAction::ApiKey { key } => {
            settings::save_api_key(&conn, &key)?;
            println!("API key saved.");
        }
        SettingsAction::ClearApiKey => {
            if settings::clear_api_key(&conn)? {
                println!("API key removed.");
            } else {
                println!("No API key was stored.");
            }
        }
        SettingsAction::Theme { theme } => {
            settings::save_theme(&conn, theme)?;
            println!("Theme set to {theme}.");
        }
        SettingsAction::Languages { languages: picks } => {
            let selected = languages::resolve_selection(&picks)?;
            settings::save_languages(&conn, &selected)?;
            if selected.is_empty() {
                println!("Music languages: any");
            } else {
                println!("Music languages: {}", selected.join(", "));
            }
        }
        SettingsAction::Tour => {
            settings::set_onboarding_complete(&conn, false)?;
            println!("The walkthrough will show the next time you start the chat.");
        }
    }
    Ok(())
}
