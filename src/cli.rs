//! # Command-Line Interface Module
//!
//! This module defines the command-line interface for Sonic using Clap derive macros.
//! Running `sonic` without a subcommand opens the interactive chat; every other
//! subcommand performs one operation and exits, which makes the queue, history and
//! settings scriptable.
//!
//! ## Commands
//!
//! - `chat`: Interactive mood chat (default)
//! - `ask`: One-shot recommendation for a sentence
//! - `discover`: Another set of songs for a known mood
//! - `queue`: Manage the song queue
//! - `history`: Browse and filter past recommendations
//! - `settings`: API key, theme, languages and onboarding
//! - `languages`: List the selectable music languages
//! - `links`: Platform search links and share text for a song
//!
//! ## Examples
//!
//! ```bash
//! sonic
//! sonic ask "I aced my exam today!"
//! sonic history list --mood sad --from 2024-05-01
//! sonic queue move 3 1
//! ```

use crate::links::Platform;
use crate::settings::Theme;
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shell types supported for completion generation
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

/// Main application arguments structure.
///
/// Global options apply to every subcommand and can also be set through the
/// environment, so a key exported as `GEMINI_API_KEY` never has to be stored.
#[derive(Parser, Debug)]
#[command(name = "sonic")]
#[command(about = "Sonic.AI: Feel the magic in every beat - mood-based music recommendations")]
#[command(version)]
pub struct Args {
    /// Path to the SQLite database
    ///
    /// Defaults to `sonic.db` in the platform data directory.
    #[arg(long, global = true, env = "SONIC_DB", value_hint = clap::ValueHint::FilePath)]
    pub db: Option<PathBuf>,

    /// Gemini API key, used instead of the stored one
    #[arg(long, global = true, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Generative model name
    #[arg(long, global = true, env = "SONIC_MODEL")]
    pub model: Option<String>,

    /// Base URL of the generative language API
    #[arg(long, global = true, env = "SONIC_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "SONIC_TIMEOUT")]
    pub timeout: Option<u64>,

    /// The subcommand to execute (chat when omitted)
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Enumeration of all available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the interactive chat
    ///
    /// Tell Sonic how you feel and get up to six songs for your mood. Type
    /// /help inside the chat for the list of commands.
    Chat,

    /// Ask for songs once and print the reply
    ///
    /// Small talk (greetings, thanks, questions about Sonic) is answered
    /// locally; everything else goes to the recommender. Recommended songs
    /// are added to the history.
    Ask {
        /// What you want to tell Sonic
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,

        /// Print the reply as JSON
        #[arg(long)]
        json: bool,
    },

    /// Discover more songs for a mood
    Discover {
        /// Mood to find more songs for
        #[arg(value_hint = clap::ValueHint::Other)]
        mood: String,

        /// Print the reply as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage the song queue
    Queue {
        #[command(subcommand)]
        action: QueueAction,
    },

    /// Browse past recommendations
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },

    /// Show or change settings
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },

    /// List the selectable music languages
    Languages,

    /// Print platform search links for a song
    Links {
        /// Song title
        title: String,

        /// Song artist
        artist: String,

        /// Only this platform
        #[arg(short, long)]
        platform: Option<Platform>,

        /// Open the link in the browser (requires --platform)
        #[arg(long, requires = "platform")]
        open: bool,

        /// Also print the share text for this mood
        #[arg(long)]
        share: Option<String>,
    },

    /// Generate shell completions
    ///
    /// Usage: sonic completion bash > ~/.local/share/bash-completion/completions/sonic
    Completion {
        /// Shell to generate completions for
        shell: Shell,
    },

    /// List known moods for completion (hidden command)
    #[command(hide = true)]
    CompleteMoods,
}

/// Queue management actions
#[derive(Subcommand, Debug)]
pub enum QueueAction {
    /// Show the queue in order
    List,

    /// Append a song (ignored when already queued)
    Add {
        title: String,
        artist: String,
    },

    /// Remove the song at a position (1-based)
    Remove {
        position: usize,
    },

    /// Move a song from one position to another (1-based)
    Move {
        from: usize,
        to: usize,
    },

    /// Remove every song
    Clear,

    /// Open the song at a position on a platform
    Open {
        position: usize,

        #[arg(short, long, default_value = "youtube")]
        platform: Platform,
    },
}

/// History actions
#[derive(Subcommand, Debug)]
pub enum HistoryAction {
    /// Show recommendations, newest first
    List {
        /// Only this mood ("all" for every mood)
        #[arg(short, long)]
        mood: Option<String>,

        /// First day to include (YYYY-MM-DD, local time)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Last day to include (YYYY-MM-DD, local time)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Print entries as JSON
        #[arg(long)]
        json: bool,
    },

    /// List every mood found in the history
    Moods,

    /// Delete all history
    Clear,

    /// Queue the history entry at a position of the unfiltered list (1-based)
    Queue {
        position: usize,
    },
}

/// Settings actions
#[derive(Subcommand, Debug)]
pub enum SettingsAction {
    /// Show all settings (default)
    Show,

    /// Store the Gemini API key
    ApiKey {
        key: String,
    },

    /// Forget the stored API key
    ClearApiKey,

    /// Set the colour theme
    Theme {
        theme: Theme,
    },

    /// Set the preferred music languages (numbers or names, none for any)
    Languages {
        languages: Vec<String>,
    },

    /// Show the walkthrough again on the next chat start
    Tour,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_means_chat() {
        let args = Args::try_parse_from(["sonic"]).unwrap();
        assert!(args.command.is_none());
    }

    #[test]
    fn test_parse_history_filters() {
        let args = Args::try_parse_from([
            "sonic", "history", "list", "--mood", "sad", "--from", "2024-05-01", "--to", "2024-05-31",
        ])
        .unwrap();
        let Some(Command::History { action: HistoryAction::List { mood, from, to, .. } }) = args.command else {
            panic!("expected history list");
        };
        assert_eq!(mood.as_deref(), Some("sad"));
        assert_eq!(from, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(to, NaiveDate::from_ymd_opt(2024, 5, 31));
    }

    #[test]
    fn test_global_db_after_subcommand() {
        let args = Args::try_parse_from(["sonic", "queue", "list", "--db", "/tmp/x.db"]).unwrap();
        assert_eq!(args.db, Some(PathBuf::from("/tmp/x.db")));
    }

    #[test]
    fn test_open_requires_platform() {
        assert!(Args::try_parse_from(["sonic", "links", "Ilahi", "Arijit Singh", "--open"]).is_err());
        assert!(Args::try_parse_from([
            "sonic", "links", "Ilahi", "Arijit Singh", "--open", "--platform", "spotify"
        ])
        .is_ok());
    }
}
