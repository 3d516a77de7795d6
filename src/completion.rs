//! # Shell Completion Module
//!
//! Completion script generation through `clap_complete`, plus the hidden
//! `complete-moods` helper that lists mood names (the quick moods followed by
//! every mood found in the history) for `discover` and `history list --mood`.
//!
//! ## Usage
//!
//! ```bash
//! # Generate bash completions
//! sonic completion bash > ~/.local/share/bash-completion/completions/sonic
//!
//! # Generate zsh completions
//! sonic completion zsh > ~/.config/zsh/completions/_sonic
//! ```

use crate::cli::Shell;
use crate::db;
use crate::history;
use crate::session::QUICK_MOODS;
use anyhow::Result;
use clap::Command;
use clap_complete::{generate, Generator, Shell as CompletionShell};
use log::debug;
use std::io;
use std::path::Path;

/// Generate shell completions for the given shell
pub fn generate_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

pub fn shell_to_completion_shell(shell: Shell) -> CompletionShell {
    match shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    }
}

/// Mood names for completion. Never fails: a missing or unreadable database
/// just yields the quick moods.
pub fn get_mood_completions(db_path: &Path) -> Vec<String> {
    let mut moods: Vec<String> = QUICK_MOODS.iter().map(ToString::to_string).collect();

    if !db_path.exists() {
        return moods;
    }

    let stored = db::open(db_path).and_then(|conn| history::distinct_moods(&conn));
    match stored {
        Ok(stored) => {
            for mood in stored {
                if !moods.contains(&mood) {
                    moods.push(mood);
                }
            }
        }
        Err(err) => debug!("No moods from history: {err:#}"),
    }
    moods
}

/// Print one mood per line for shell completion scripts.
pub fn print_mood_completions(db_path: &Path) -> Result<()> {
    for mood in get_mood_completions(db_path) {
        println!("{mood}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::song::Song;
    use tempfile::TempDir;

    #[test]
    fn test_shell_conversion() {
        assert_eq!(shell_to_completion_shell(Shell::Bash), CompletionShell::Bash);
        assert_eq!(shell_to_completion_shell(Shell::Zsh), CompletionShell::Zsh);
        assert_eq!(shell_to_completion_shell(Shell::Fish), CompletionShell::Fish);
        assert_eq!(shell_to_completion_shell(Shell::PowerShell), CompletionShell::PowerShell);
        assert_eq!(shell_to_completion_shell(Shell::Elvish), CompletionShell::Elvish);
    }

    #[test]
    fn test_mood_completions_without_db() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let moods = get_mood_completions(&temp_dir.path().join("missing.db"));
        assert_eq!(moods, QUICK_MOODS);
    }

    #[test]
    fn test_mood_completions_include_history() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join("sonic.db");
        {
            let conn = db::open(&path).expect("open db");
            history::append(&conn, &Song::new("Kabira", "Tochi Raina"), "nostalgic", 1).unwrap();
            history::append(&conn, &Song::new("Ilahi", "Arijit Singh"), "happy", 2).unwrap();
        }

        let moods = get_mood_completions(&path);
        assert_eq!(moods.len(), QUICK_MOODS.len() + 1);
        assert_eq!(moods.last().map(String::as_str), Some("nostalgic"));
    }
}
