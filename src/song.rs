use serde::{Deserialize, Serialize};
use std::fmt;

/// A recommended song.
///
/// Songs are identified by their normalized title and artist rather than by a
/// database row, so the same recommendation always maps to the same queue and
/// history identity no matter which turn produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Song {
    pub id: String,
    pub title: String,
    pub artist: String,
}

impl Song {
    /// Build a song, trimming both fields and deriving its id.
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        let title = title.into().trim().to_string();
        let artist = artist.into().trim().to_string();
        Self {
            id: song_id(&title, &artist),
            title,
            artist,
        }
    }

    /// Free-text search query for streaming platforms: "title artist".
    #[must_use]
    pub fn search_query(&self) -> String {
        format!("{} {}", self.title, self.artist)
    }
}

impl fmt::Display for Song {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} by {}", self.title, self.artist)
    }
}

/// Deterministic song identity: lower-cased, trimmed `title::artist`.
#[must_use]
pub fn song_id(title: &str, artist: &str) -> String {
    format!(
        "{}::{}",
        title.trim().to_lowercase(),
        artist.trim().to_lowercase()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_ignores_case_and_padding() {
        let a = Song::new("Tum Hi Ho", "Arijit Singh");
        let b = Song::new("  tum hi ho ", "ARIJIT SINGH");
        assert_eq!(a.id, b.id);
        assert_eq!(b.title, "tum hi ho");
    }

    #[test]
    fn test_search_query_and_display() {
        let song = Song::new("Kesariya", "Arijit Singh");
        assert_eq!(song.search_query(), "Kesariya Arijit Singh");
        assert_eq!(song.to_string(), "Kesariya by Arijit Singh");
    }
}
