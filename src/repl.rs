//! # Interactive Chat
//!
//! The terminal front-end: a `rustyline` prompt in front of a
//! [`ChatSession`]. Plain text goes to the session; `/commands` manage the
//! queue, history, settings and links. Songs recommended during the chat are
//! written to the history log as soon as they arrive.

use crate::history::{self, HistoryFilter};
use crate::languages::{self, LANGUAGE_OPTIONS};
use crate::links::{self, Platform};
use crate::onboarding::Tour;
use crate::queue;
use crate::recommend::Recommender;
use crate::router::{route, Command, Route};
use crate::session::{ChatSession, MessageKind, Sender, TurnOutcome, QUICK_MOODS};
use crate::settings::{self, Theme};
use crate::song::Song;
use anyhow::Result;
use chrono::{Local, TimeZone};
use log::{debug, info, warn};
use owo_colors::{OwoColorize, Style};
use rusqlite::Connection;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::ops::ControlFlow;

const HELP: &str = "\
Just type how you feel and I'll find songs for it.

  /more                    more songs for the current mood
  /add <n>                 queue song n of the last recommendation
  /remove <n>              take song n of the last recommendation off the queue
  /open <n> [platform]     open song n (youtube, youtube-music, spotify,
                           gaana, jiosaavn, wynk-music) or list all links
  /queue                   show the queue
  /history [mood]          show past recommendations
  /languages               choose music languages
  /key                     enter a new Gemini API key
  /theme <light|dark|system>
  /settings                show current settings
  /tour                    replay the walkthrough
  /reset                   clear the conversation
  /quit                    leave";

/// Output colours for one theme.
#[derive(Debug, Clone, Copy)]
struct Palette {
    ai: Style,
    accent: Style,
    error: Style,
    muted: Style,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Light => Self {
                ai: Style::new().magenta(),
                accent: Style::new().blue().bold(),
                error: Style::new().red(),
                muted: Style::new().dimmed(),
            },
            Theme::Dark => Self {
                ai: Style::new().bright_magenta(),
                accent: Style::new().bright_cyan().bold(),
                error: Style::new().bright_red(),
                muted: Style::new().bright_black(),
            },
            Theme::System => Self {
                ai: Style::new().bold(),
                accent: Style::new().cyan(),
                error: Style::new().red(),
                muted: Style::new().dimmed(),
            },
        }
    }
}

struct Repl<'a, R: Recommender> {
    conn: &'a mut Connection,
    editor: DefaultEditor,
    session: ChatSession<R>,
    palette: Palette,
}

/// Run the chat until `/quit`, Ctrl-C or Ctrl-D.
///
/// `api_key` is the already resolved key (flag, environment or stored).
pub fn run<R: Recommender>(conn: &mut Connection, recommender: R, api_key: Option<String>) -> Result<()> {
    let stored = settings::load(conn)?;
    let session = ChatSession::new(recommender, api_key, stored.languages.clone());
    let mut repl = Repl::new(conn, session, stored.theme)?;

    if !stored.onboarding_complete {
        repl.tour()?;
        if stored.languages.is_empty() {
            repl.choose_languages()?;
        }
    }

    repl.print_welcome();
    repl.event_loop()
}

impl<'a, R: Recommender> Repl<'a, R> {
    fn new(conn: &'a mut Connection, session: ChatSession<R>, theme: Theme) -> Result<Self> {
        Ok(Self {
            conn,
            editor: DefaultEditor::new()?,
            session,
            palette: Palette::for_theme(theme),
        })
    }

    fn event_loop(&mut self) -> Result<()> {
        loop {
            let line = match self.editor.readline("you › ") {
                Ok(line) => line,
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
                Err(err) => return Err(err.into()),
            };
            if !line.trim().is_empty() {
                // History recall is a convenience.
                let _ = self.editor.add_history_entry(line.as_str());
            }
            if self.handle_line(&line).is_break() {
                break;
            }
        }

        println!("{}", "Goodbye! Feel the magic in every beat. 🎵".style(self.palette.ai));
        Ok(())
    }

    /// Dispatch one input line. Failures are printed and the chat goes on;
    /// only `/quit` breaks.
    fn handle_line(&mut self, line: &str) -> ControlFlow<()> {
        let result = match route(line) {
            Route::Empty => Ok(()),
            Route::Invalid(reason) => {
                self.error(&reason);
                Ok(())
            }
            Route::Command(Command::Quit) => return ControlFlow::Break(()),
            Route::Command(command) => self.command(command),
            Route::Recommend(_) => {
                self.typing();
                self.turn(|session| session.send(line))
            }
            Route::Canned(_) => self.turn(|session| session.send(line)),
        };
        if let Err(err) = result {
            self.error(&format!("{err:#}"));
        }
        ControlFlow::Continue(())
    }

    fn command(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Help => println!("{HELP}"),
            Command::Queue => self.show_queue()?,
            Command::History(mood) => self.show_history(mood.as_deref())?,
            Command::Settings => self.show_settings()?,
            Command::Languages => self.choose_languages()?,
            Command::Key => {
                self.ask_credential()?;
            }
            Command::Theme(theme) => {
                settings::save_theme(self.conn, theme)?;
                self.palette = Palette::for_theme(theme);
                println!("Theme set to {}.", theme.style(self.palette.accent));
            }
            Command::Tour => self.tour()?,
            Command::Reset => {
                if self.confirm("Clear the whole conversation?")? {
                    self.session.reset();
                    self.print_welcome();
                }
            }
            Command::More => {
                self.typing();
                self.turn(ChatSession::discover_more)?;
            }
            Command::Add(number) => {
                let song = self.recommended(number)?;
                if queue::add(self.conn, &song)? {
                    println!(
                        "Added {} to your queue ({} songs).",
                        song.style(self.palette.accent),
                        queue::len(self.conn)?
                    );
                } else {
                    println!("{song} is already in your queue.");
                }
            }
            Command::Remove(number) => {
                let song = self.recommended(number)?;
                if queue::remove(self.conn, &song.id)? {
                    println!("Removed {song} from your queue.");
                } else {
                    println!("{song} is not in your queue.");
                }
            }
            Command::Open(number, platform) => {
                let song = self.recommended(number)?;
                self.open(&song, platform);
            }
            Command::Quit => {}
        }
        Ok(())
    }

    /// Run one session turn and render everything it appended.
    fn turn<F>(&mut self, action: F) -> Result<()>
    where
        F: FnOnce(&mut ChatSession<R>) -> TurnOutcome,
    {
        let before = self.session.transcript().len();
        let mut outcome = action(&mut self.session);
        let mut rendered = before;

        loop {
            self.render_from(rendered);
            rendered = self.session.transcript().len();

            match outcome {
                TurnOutcome::Recommended { mood, songs } => {
                    history::append_all(self.conn, &songs, &mood, history::now_millis())?;
                    break;
                }
                TurnOutcome::ChooseLanguages => {
                    self.choose_languages()?;
                    break;
                }
                TurnOutcome::NeedsCredential => {
                    println!(
                        "{}",
                        "I need a valid Gemini API key to find songs for you.".style(self.palette.error)
                    );
                    if !self.ask_credential()? {
                        println!("{}", "Okay, ask me again once you have a key.".style(self.palette.muted));
                        break;
                    }
                    self.typing();
                    outcome = self.session.retry_pending();
                }
                TurnOutcome::Failed(kind) => {
                    debug!("Turn failed with {kind}");
                    break;
                }
                TurnOutcome::Replied | TurnOutcome::Ignored => break,
            }
        }
        Ok(())
    }

    fn render_from(&self, start: usize) {
        let palette = self.palette;
        for message in self.session.transcript().iter().skip(start) {
            if message.sender == Sender::User {
                continue;
            }
            if !message.text.is_empty() {
                println!("{} {}", "sonic ›".style(palette.accent), message.text.style(palette.ai));
            }
            for (line, song) in song_lines(&message.songs).iter().zip(&message.songs) {
                if self.is_queued(song) {
                    println!("  {line} {}", "(queued)".style(palette.muted));
                } else {
                    println!("  {line}");
                }
            }
            match &message.kind {
                MessageKind::DiscoverMore(mood) => println!(
                    "{}",
                    format!("/more for more {mood} songs · /add <n> to queue · /open <n> [platform] to listen")
                        .style(palette.muted)
                ),
                MessageKind::QuickMoods => println!(
                    "{} {}",
                    "Quick moods:".style(palette.muted),
                    QUICK_MOODS.join(" · ")
                ),
                MessageKind::LanguageSelection | MessageKind::Text => {}
            }
        }
    }

    fn print_welcome(&self) {
        self.render_from(0);
        println!("{}", "Type /help for commands.".style(self.palette.muted));
    }

    fn is_queued(&self, song: &Song) -> bool {
        queue::contains(self.conn, &song.id).unwrap_or_else(|err| {
            debug!("{err:#}");
            false
        })
    }

    fn typing(&self) {
        println!("{}", "sonic is typing…".style(self.palette.muted));
    }

    fn error(&self, message: &str) {
        println!("{}", message.style(self.palette.error));
    }

    fn recommended(&self, number: usize) -> Result<Song> {
        self.session
            .last_songs()
            .get(number.saturating_sub(1))
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("There is no song {number} in the last recommendation."))
    }

    fn open(&self, song: &Song, platform: Option<Platform>) {
        let Some(platform) = platform else {
            for platform in Platform::ALL {
                println!("  {:<14} {}", platform.name(), platform.search_url(song));
            }
            println!(
                "{} {}",
                "Share:".style(self.palette.muted),
                links::share_text(song, self.session.current_mood())
            );
            return;
        };

        let url = platform.search_url(song);
        if let Err(err) = links::open_url(&url) {
            warn!("{err:#}");
            println!("Open this link to listen on {platform}: {url}");
        }
    }

    fn show_queue(&self) -> Result<()> {
        let songs = queue::list(self.conn)?;
        if songs.is_empty() {
            println!("Your queue is empty. Use /add <n> after a recommendation.");
            return Ok(());
        }
        println!("{}", format!("Queue ({} songs)", songs.len()).style(self.palette.accent));
        for line in song_lines(&songs) {
            println!("  {line}");
        }
        Ok(())
    }

    fn show_history(&self, mood: Option<&str>) -> Result<()> {
        let filter = HistoryFilter::default().with_mood(mood);
        let entries = history::list(self.conn, &filter)?;
        if entries.is_empty() {
            println!("No history yet.");
            return Ok(());
        }
        for entry in entries {
            println!(
                "  {}  {:<10} {}",
                format_timestamp(entry.timestamp).style(self.palette.muted),
                entry.mood,
                entry.song
            );
        }
        let moods = history::distinct_moods(self.conn)?;
        println!("{} all, {}", "Filter by:".style(self.palette.muted), moods.join(", "));
        Ok(())
    }

    fn show_settings(&self) -> Result<()> {
        let stored = settings::load(self.conn)?;
        let languages: Vec<&str> = self
            .session
            .languages()
            .iter()
            .map(|l| languages::display_name(l))
            .collect();
        println!("  Theme:      {}", stored.theme);
        println!(
            "  API key:    {}",
            stored.masked_api_key().unwrap_or_else(|| "not stored".to_string())
        );
        println!(
            "  Languages:  {}",
            if languages.is_empty() { "any".to_string() } else { languages.join(", ") }
        );
        println!("  Mood:       {}", self.session.current_mood());
        Ok(())
    }

    /// Prompt for a key, store it and hand it to the session.
    /// Returns `false` when the user gave up.
    fn ask_credential(&mut self) -> Result<bool> {
        println!(
            "{}",
            "Get a free key at https://aistudio.google.com/app/apikey (leave empty to cancel)."
                .style(self.palette.muted)
        );
        let key = match self.editor.readline("Gemini API key: ") {
            Ok(key) => key,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => return Ok(false),
            Err(err) => return Err(err.into()),
        };
        if key.trim().is_empty() {
            return Ok(false);
        }
        settings::save_api_key(self.conn, &key)?;
        self.session.set_credential(&key)?;
        println!("{}", "API key saved.".style(self.palette.accent));
        Ok(true)
    }

    fn choose_languages(&mut self) -> Result<()> {
        let mut selected = self.session.languages().to_vec();
        println!("{}", "Choose your music languages".style(self.palette.accent));
        for (index, option) in LANGUAGE_OPTIONS.iter().enumerate() {
            let mark = if selected.contains(option) { "✓" } else { " " };
            println!("  {mark} {:>2}. {}", index + 1, languages::display_name(option));
        }

        let line = match self
            .editor
            .readline("Numbers or names to toggle, comma separated (empty keeps current): ")
        {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => return Ok(()),
            Err(err) => return Err(err.into()),
        };
        let picks: Vec<&str> = line.split(',').collect();
        let toggled = match languages::resolve_selection(&picks) {
            Ok(toggled) => toggled,
            Err(err) => {
                self.error(&err.to_string());
                return Ok(());
            }
        };
        for option in toggled {
            languages::toggle(&mut selected, &option);
        }

        settings::save_languages(self.conn, &selected)?;
        info!("Music languages: {selected:?}");
        let shown: Vec<&str> = selected.iter().map(|l| languages::display_name(l)).collect();
        println!(
            "Music languages: {}",
            if shown.is_empty() { "any".to_string() } else { shown.join(", ") }
        );
        self.session.set_languages(selected);
        Ok(())
    }

    fn tour(&mut self) -> Result<()> {
        let mut tour = Tour::new();
        loop {
            let step = tour.current();
            println!(
                "{} {}",
                format!("[{}/{}]", tour.position(), tour.len()).style(self.palette.muted),
                step.title.style(self.palette.accent)
            );
            println!("  {}", step.content);

            let hint = if tour.is_last() { "(Enter to finish, b back) " } else { "(Enter next, b back, s skip) " };
            let answer = match self.editor.readline(hint) {
                Ok(answer) => answer.trim().to_lowercase(),
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
                Err(err) => return Err(err.into()),
            };
            match answer.as_str() {
                "b" | "back" => tour.back(),
                "s" | "skip" => break,
                _ => {
                    if !tour.advance() {
                        break;
                    }
                }
            }
        }
        settings::set_onboarding_complete(self.conn, true)
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        match self.editor.readline(&format!("{question} [y/N] ")) {
            Ok(answer) => Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")),
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

/// Numbered `"n. title by artist"` lines.
#[must_use]
pub fn song_lines(songs: &[Song]) -> Vec<String> {
    songs
        .iter()
        .enumerate()
        .map(|(index, song)| format!("{}. {song}", index + 1))
        .collect()
}

/// Local `YYYY-MM-DD HH:MM` for an epoch-millisecond timestamp.
#[must_use]
pub fn format_timestamp(millis: i64) -> String {
    Local
        .timestamp_millis_opt(millis)
        .single()
        .map_or_else(|| "unknown time".to_string(), |dt| dt.format("%Y-%m-%d %H:%M").to_string())
}
