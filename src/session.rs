//! # Chat Session
//!
//! In-memory conversation state for one chat: the transcript, the mood
//! detected most recently, the preferred music languages and the API key.
//! Each call to [`ChatSession::send`] is one complete turn; the recommender
//! round trip is blocking, so a second message cannot be sent while one is
//! in flight.
//!
//! Persistence is left to the caller: a [`TurnOutcome::Recommended`] carries
//! the mood and songs that belong in the history log.

use crate::error::ErrorKind;
use crate::recommend::{anchor_to_query, Query, Recommender};
use crate::response::{normalize_mood, Intent, Recommendation, NEUTRAL_MOOD};
use crate::router::canned_reply;
use crate::song::Song;
use anyhow::{bail, Result};
use log::{debug, info, warn};

pub const WELCOME_TEXT: &str =
    "🎵 Welcome to Sonic.AI! I can understand your emotions. Just tell me how you're feeling!";

pub const APOLOGY_TEXT: &str =
    "I'm sorry, I had trouble finding songs. Please try a different mood or check your connection.";

pub const DESCRIBE_MOOD_TEXT: &str =
    "Tell me how you're feeling first, and I'll keep the songs coming for that mood!";

/// Shortcuts offered under the welcome message.
pub const QUICK_MOODS: [&str; 5] = ["happy", "sad", "romantic", "energetic", "calm"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Ai,
}

/// What a transcript entry shows besides its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    Text,
    /// Prompt the user to pick music languages.
    LanguageSelection,
    /// Offer [`QUICK_MOODS`].
    QuickMoods,
    /// Offer another round of songs for this mood.
    DiscoverMore(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: u64,
    pub sender: Sender,
    pub text: String,
    pub songs: Vec<Song>,
    pub kind: MessageKind,
}

/// Result of one turn, for the front-end to act on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// A text-only reply was appended.
    Replied,
    /// Songs were recommended for `mood`.
    Recommended { mood: String, songs: Vec<Song> },
    /// The reply asks the user to pick music languages.
    ChooseLanguages,
    /// The API key is missing or was rejected. The request is kept and can be
    /// replayed with [`ChatSession::retry_pending`].
    NeedsCredential,
    /// The request failed; an apology was appended.
    Failed(ErrorKind),
    /// Blank input, nothing happened.
    Ignored,
}

pub struct ChatSession<R: Recommender> {
    recommender: R,
    transcript: Vec<Message>,
    current_mood: String,
    languages: Vec<String>,
    api_key: Option<String>,
    pending: Option<Query>,
    next_id: u64,
}

impl<R: Recommender> ChatSession<R> {
    pub fn new(recommender: R, api_key: Option<String>, languages: Vec<String>) -> Self {
        let mut session = Self {
            recommender,
            transcript: Vec::new(),
            current_mood: NEUTRAL_MOOD.to_string(),
            languages,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            pending: None,
            next_id: 0,
        };
        session.seed_welcome();
        session
    }

    #[must_use]
    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    #[must_use]
    pub fn current_mood(&self) -> &str {
        &self.current_mood
    }

    #[must_use]
    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    #[must_use]
    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The most recent message that recommended songs.
    #[must_use]
    pub fn last_songs(&self) -> &[Song] {
        self.transcript
            .iter()
            .rev()
            .find(|m| !m.songs.is_empty())
            .map(|m| m.songs.as_slice())
            .unwrap_or(&[])
    }

    /// Continue from a mood detected in an earlier session.
    pub fn resume_mood(&mut self, mood: &str) {
        self.current_mood = normalize_mood(mood);
    }

    pub fn set_languages(&mut self, languages: Vec<String>) {
        self.languages = languages;
    }

    /// Replace the API key. Blank keys are rejected.
    pub fn set_credential(&mut self, key: &str) -> Result<()> {
        let key = key.trim();
        if key.is_empty() {
            bail!("API Key cannot be empty.");
        }
        self.api_key = Some(key.to_string());
        Ok(())
    }

    /// Back to the welcome message and a neutral mood.
    pub fn reset(&mut self) {
        self.transcript.clear();
        self.current_mood = NEUTRAL_MOOD.to_string();
        self.pending = None;
        self.seed_welcome();
        info!("Chat reset");
    }

    /// Handle one line of user text.
    pub fn send(&mut self, text: &str) -> TurnOutcome {
        let text = text.trim();
        if text.is_empty() {
            return TurnOutcome::Ignored;
        }
        self.push(Sender::User, text, Vec::new(), MessageKind::Text);

        if let Some(reply) = canned_reply(&text.to_lowercase()) {
            debug!("Answering locally with {reply:?}");
            self.push(Sender::Ai, reply.text(), Vec::new(), MessageKind::Text);
            return TurnOutcome::Replied;
        }

        self.request(Query::Utterance(text.to_string()))
    }

    /// Ask for another set of songs for the current mood.
    pub fn discover_more(&mut self) -> TurnOutcome {
        if self.current_mood == NEUTRAL_MOOD {
            self.push(Sender::Ai, DESCRIBE_MOOD_TEXT, Vec::new(), MessageKind::Text);
            return TurnOutcome::Replied;
        }
        let mood = self.current_mood.clone();
        self.push(
            Sender::User,
            &format!("Discover more {mood} music"),
            Vec::new(),
            MessageKind::Text,
        );
        self.request(Query::DiscoverMore(mood))
    }

    /// Replay the request that last stopped on a missing or rejected key.
    pub fn retry_pending(&mut self) -> TurnOutcome {
        match self.pending.take() {
            Some(query) => self.request(query),
            None => TurnOutcome::Ignored,
        }
    }

    fn request(&mut self, query: Query) -> TurnOutcome {
        let Some(api_key) = self.api_key.clone() else {
            debug!("No API key, holding request");
            self.pending = Some(query);
            return TurnOutcome::NeedsCredential;
        };

        match self.recommender.recommend(&query, &self.languages, &api_key) {
            Ok(rec) => self.apply(anchor_to_query(rec, &query)),
            Err(err) if err.needs_credential() => {
                warn!("{err}");
                self.api_key = None;
                self.pending = Some(query);
                TurnOutcome::NeedsCredential
            }
            Err(err) => {
                warn!("Recommendation failed ({}): {err}", err.kind());
                self.push(Sender::Ai, APOLOGY_TEXT, Vec::new(), MessageKind::Text);
                TurnOutcome::Failed(err.kind())
            }
        }
    }

    fn apply(&mut self, rec: Recommendation) -> TurnOutcome {
        let Recommendation {
            intent,
            mood,
            response_text,
            songs,
        } = rec;

        match intent {
            Intent::MoodQuery if !songs.is_empty() => {
                info!("Recommended {} songs for mood '{mood}'", songs.len());
                self.current_mood = mood.clone();
                self.push(Sender::Ai, &response_text, songs.clone(), MessageKind::Text);
                self.push(Sender::Ai, "", Vec::new(), MessageKind::DiscoverMore(mood.clone()));
                TurnOutcome::Recommended { mood, songs }
            }
            Intent::ChangeLanguage => {
                self.push(Sender::Ai, &response_text, Vec::new(), MessageKind::LanguageSelection);
                TurnOutcome::ChooseLanguages
            }
            Intent::MoodQuery | Intent::Greeting | Intent::Question => {
                self.push(Sender::Ai, &response_text, Vec::new(), MessageKind::Text);
                TurnOutcome::Replied
            }
        }
    }

    fn seed_welcome(&mut self) {
        self.push(Sender::Ai, WELCOME_TEXT, Vec::new(), MessageKind::QuickMoods);
    }

    fn push(&mut self, sender: Sender, text: &str, songs: Vec<Song>, kind: MessageKind) {
        self.transcript.push(Message {
            id: self.next_id,
            sender,
            text: text.to_string(),
            songs,
            kind,
        });
        self.next_id += 1;
    }
}
