//! # Structured Reply Parsing
//!
//! The recommendation service is asked for JSON constrained by a response
//! schema, but the reply is still parsed and validated here before anything
//! else sees it. A payload that does not satisfy every invariant below is
//! rejected as `empty_response` instead of being passed on:
//!
//! - `intent` is one of `mood_query`, `change_language`, `greeting`, `question`
//! - `songs` holds at most [`MAX_SONGS`] entries
//! - `songs` is empty unless `intent == mood_query`
//! - every song has a non-blank `title` and `artist`
//! - `responseText` is not blank
//!
//! The mood is normalized to a single lowercase word, `neutral` when absent.

use crate::error::RecommendError;
use crate::song::Song;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upper bound on songs per reply.
pub const MAX_SONGS: usize = 6;

/// Mood used whenever no clear emotion was detected.
pub const NEUTRAL_MOOD: &str = "neutral";

/// What the user wanted from their message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    MoodQuery,
    ChangeLanguage,
    Greeting,
    Question,
}

impl Intent {
    pub const ALL: [Intent; 4] = [
        Intent::MoodQuery,
        Intent::ChangeLanguage,
        Intent::Greeting,
        Intent::Question,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MoodQuery => "mood_query",
            Self::ChangeLanguage => "change_language",
            Self::Greeting => "greeting",
            Self::Question => "question",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|intent| intent.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown intent '{wanted}'"))
    }
}

/// A validated reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub intent: Intent,
    pub mood: String,
    pub response_text: String,
    pub songs: Vec<Song>,
}

impl Recommendation {
    #[must_use]
    pub fn has_songs(&self) -> bool {
        !self.songs.is_empty()
    }
}

/// Reply exactly as the service sends it. All four fields are required.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecommendation {
    intent: String,
    mood: String,
    response_text: String,
    songs: Vec<RawSong>,
}

#[derive(Debug, Deserialize)]
struct RawSong {
    #[serde(default)]
    title: String,
    #[serde(default)]
    artist: String,
}

/// Parse and validate the model's JSON text.
///
/// # Errors
///
/// Returns [`RecommendError::EmptyResponse`] when the text is blank, is not
/// JSON of the expected shape, or violates one of the module invariants.
pub fn parse_recommendation(text: &str) -> Result<Recommendation, RecommendError> {
    let body = strip_code_fence(text.trim());
    if body.is_empty() {
        return Err(RecommendError::EmptyResponse(
            "Received an empty response from the AI.".to_string(),
        ));
    }

    let raw: RawRecommendation = serde_json::from_str(body)
        .map_err(|e| RecommendError::EmptyResponse(format!("malformed JSON: {e}")))?;

    validate(raw)
}

fn validate(raw: RawRecommendation) -> Result<Recommendation, RecommendError> {
    let intent: Intent = raw.intent.parse().map_err(RecommendError::EmptyResponse)?;

    let response_text = raw.response_text.trim().to_string();
    if response_text.is_empty() {
        return Err(RecommendError::EmptyResponse("blank responseText".to_string()));
    }

    if raw.songs.len() > MAX_SONGS {
        return Err(RecommendError::EmptyResponse(format!(
            "{} songs returned, at most {MAX_SONGS} allowed",
            raw.songs.len()
        )));
    }

    if intent != Intent::MoodQuery && !raw.songs.is_empty() {
        return Err(RecommendError::EmptyResponse(format!(
            "songs returned for non-mood intent '{intent}'"
        )));
    }

    let songs = raw
        .songs
        .into_iter()
        .enumerate()
        .map(|(index, song)| {
            if song.title.trim().is_empty() || song.artist.trim().is_empty() {
                Err(RecommendError::EmptyResponse(format!(
                    "song #{} is missing a title or artist",
                    index + 1
                )))
            } else {
                Ok(Song::new(song.title, song.artist))
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Recommendation {
        intent,
        mood: normalize_mood(&raw.mood),
        response_text,
        songs,
    })
}

/// Trim and lowercase a mood, `neutral` when blank.
#[must_use]
pub fn normalize_mood(mood: &str) -> String {
    let mood = mood.trim();
    if mood.is_empty() {
        NEUTRAL_MOOD.to_string()
    } else {
        mood.to_lowercase()
    }
}

/// Accept replies wrapped in a markdown code fence.
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
