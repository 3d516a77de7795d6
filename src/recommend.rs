//! Recommendation requests and the seam between the chat session and the
//! service that answers them.

use crate::error::RecommendError;
use crate::response::{Intent, Recommendation};

/// What is being asked of the recommender on one turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Free text typed by the user.
    Utterance(String),
    /// Another set of songs for a mood detected earlier.
    DiscoverMore(String),
}

impl Query {
    /// The mood this query is pinned to, if any.
    #[must_use]
    pub fn pinned_mood(&self) -> Option<&str> {
        match self {
            Self::Utterance(_) => None,
            Self::DiscoverMore(mood) => Some(mood),
        }
    }
}

/// Something that turns a query into a validated recommendation.
///
/// Implementations perform exactly one round trip per call: no retries, no
/// streaming.
pub trait Recommender {
    /// # Errors
    ///
    /// Returns a classified [`RecommendError`] on any failure.
    fn recommend(
        &self,
        query: &Query,
        languages: &[String],
        api_key: &str,
    ) -> Result<Recommendation, RecommendError>;
}

impl<T: Recommender + ?Sized> Recommender for &T {
    fn recommend(
        &self,
        query: &Query,
        languages: &[String],
        api_key: &str,
    ) -> Result<Recommendation, RecommendError> {
        (**self).recommend(query, languages, api_key)
    }
}

/// Pin a "discover more" reply to the mood that was asked for.
///
/// The service is told the mood, but its reply is not trusted to repeat it:
/// the requested mood always wins and the intent is forced to `mood_query`.
#[must_use]
pub fn anchor_to_query(mut rec: Recommendation, query: &Query) -> Recommendation {
    if let Some(mood) = query.pinned_mood() {
        if rec.mood != mood || rec.intent != Intent::MoodQuery {
            log::debug!(
                "Pinning discover-more reply to mood '{mood}' (service said '{}' / {})",
                rec.mood,
                rec.intent
            );
        }
        rec.mood = mood.to_string();
        rec.intent = Intent::MoodQuery;
    }
    rec
}
