//! # Recommendation History
//!
//! Append-only log of every recommended song together with the mood it was
//! recommended for and a millisecond timestamp. Listing supports the same
//! filters as the history screen of the chat: one mood (or all), and an
//! inclusive local-date range. Results come back newest first.

use crate::song::Song;
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, TimeZone, Utc};
use log::info;
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

/// One recommended song.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub song: Song,
    pub mood: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}

/// Listing filter. Empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryFilter {
    pub mood: Option<String>,
    /// Inclusive, from local midnight.
    pub start: Option<NaiveDate>,
    /// Inclusive, through 23:59:59.999 local time.
    pub end: Option<NaiveDate>,
}

impl HistoryFilter {
    /// Set the mood filter; `all` (any case) clears it.
    #[must_use]
    pub fn with_mood(mut self, mood: Option<&str>) -> Self {
        self.mood = mood
            .map(|m| m.trim().to_lowercase())
            .filter(|m| !m.is_empty() && m != "all");
        self
    }

    fn start_millis(&self) -> Option<i64> {
        self.start
            .and_then(|date| date.and_hms_milli_opt(0, 0, 0, 0))
            .and_then(|dt| Local.from_local_datetime(&dt).earliest())
            .map(|dt| dt.timestamp_millis())
    }

    fn end_millis(&self) -> Option<i64> {
        self.end
            .and_then(|date| date.and_hms_milli_opt(23, 59, 59, 999))
            .and_then(|dt| Local.from_local_datetime(&dt).latest())
            .map(|dt| dt.timestamp_millis())
    }

    /// Whether an entry passes every active filter.
    #[must_use]
    pub fn matches(&self, entry: &HistoryEntry) -> bool {
        if self.mood.as_deref().is_some_and(|mood| entry.mood != mood) {
            return false;
        }
        if self.start_millis().is_some_and(|start| entry.timestamp < start) {
            return false;
        }
        if self.end_millis().is_some_and(|end| entry.timestamp > end) {
            return false;
        }
        true
    }
}

/// Current time in epoch milliseconds.
#[must_use]
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Record one recommended song.
pub fn append(conn: &Connection, song: &Song, mood: &str, timestamp: i64) -> Result<()> {
    conn.execute(
        "INSERT INTO history (song_id, title, artist, mood, timestamp) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![song.id, song.title, song.artist, mood, timestamp],
    )
    .with_context(|| format!("Failed to record {song} in history"))?;
    Ok(())
}

/// Record every song of one recommendation in a single transaction.
pub fn append_all(conn: &mut Connection, songs: &[Song], mood: &str, timestamp: i64) -> Result<()> {
    let tx = conn.transaction()?;
    for song in songs {
        append(&tx, song, mood, timestamp)?;
    }
    tx.commit().context("Committing history transaction failed.")?;
    Ok(())
}

/// Matching entries, newest first.
pub fn list(conn: &Connection, filter: &HistoryFilter) -> Result<Vec<HistoryEntry>> {
    let mut stmt = conn
        .prepare("SELECT song_id, title, artist, mood, timestamp FROM history ORDER BY id DESC")
        .context("Invalid SQL statement when SELECTing history")?;

    let rows = stmt
        .query_map([], |row| {
            Ok(HistoryEntry {
                song: Song {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    artist: row.get(2)?,
                },
                mood: row.get(3)?,
                timestamp: row.get(4)?,
            })
        })
        .context("Cannot query history.")?;

    let mut entries = Vec::new();
    for entry in rows {
        let entry = entry.context("History row could not be read")?;
        if filter.matches(&entry) {
            entries.push(entry);
        }
    }
    Ok(entries)
}

/// Every mood that appears in the history, in first-seen order.
pub fn distinct_moods(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare("SELECT mood FROM history GROUP BY mood ORDER BY MIN(id)")
        .context("Invalid SQL statement when SELECTing history moods")?;

    let moods = stmt
        .query_map([], |row| row.get(0))
        .context("Cannot query history moods.")?
        .collect::<rusqlite::Result<Vec<String>>>()?;
    Ok(moods)
}

/// Delete all history. Returns the number of removed entries.
pub fn clear(conn: &Connection) -> Result<usize> {
    let removed = conn
        .execute("DELETE FROM history", [])
        .context("Failed to clear history")?;
    info!("Cleared {removed} history entries");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn local_millis(y: i32, m: u32, d: u32, h: u32) -> i64 {
        Local
            .with_ymd_and_hms(y, m, d, h, 0, 0)
            .earliest()
            .expect("valid local time")
            .timestamp_millis()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn seeded() -> Connection {
        let mut conn = db::open_in_memory().expect("db");
        append_all(
            &mut conn,
            &[Song::new("Kal Ho Naa Ho", "Sonu Nigam"), Song::new("Agar Tum Saath Ho", "Alka Yagnik")],
            "sad",
            local_millis(2024, 5, 1, 12),
        )
        .unwrap();
        append(&conn, &Song::new("Gallan Goodiyaan", "Shankar Mahadevan"), "happy", local_millis(2024, 5, 3, 9)).unwrap();
        append(&conn, &Song::new("Kabira", "Tochi Raina"), "sad", local_millis(2024, 5, 5, 22)).unwrap();
        conn
    }

    #[test]
    fn test_list_is_newest_first() {
        let conn = seeded();
        let entries = list(&conn, &HistoryFilter::default()).unwrap();
        let titles: Vec<_> = entries.iter().map(|e| e.song.title.as_str()).collect();
        assert_eq!(titles, ["Kabira", "Gallan Goodiyaan", "Agar Tum Saath Ho", "Kal Ho Naa Ho"]);
    }

    #[test]
    fn test_mood_filter() {
        let conn = seeded();
        let filter = HistoryFilter::default().with_mood(Some("Sad"));
        let entries = list(&conn, &filter).unwrap();
        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| e.mood == "sad"));

        let filter = HistoryFilter::default().with_mood(Some("all"));
        assert_eq!(filter.mood, None);
        assert_eq!(list(&conn, &filter).unwrap().len(), 4);
    }

    #[test]
    fn test_date_bounds_are_inclusive() {
        let conn = seeded();

        let filter = HistoryFilter { start: Some(date(2024, 5, 3)), ..Default::default() };
        assert_eq!(list(&conn, &filter).unwrap().len(), 2);

        let filter = HistoryFilter { end: Some(date(2024, 5, 1)), ..Default::default() };
        assert_eq!(list(&conn, &filter).unwrap().len(), 2);

        let filter = HistoryFilter {
            start: Some(date(2024, 5, 3)),
            end: Some(date(2024, 5, 3)),
            ..Default::default()
        };
        let entries = list(&conn, &filter).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].mood, "happy");

        let filter = HistoryFilter { start: Some(date(2024, 5, 6)), ..Default::default() };
        assert!(list(&conn, &filter).unwrap().is_empty());
    }

    #[test]
    fn test_distinct_moods_first_seen_order() {
        let conn = seeded();
        assert_eq!(distinct_moods(&conn).unwrap(), ["sad", "happy"]);
    }

    #[test]
    fn test_clear() {
        let conn = seeded();
        assert_eq!(clear(&conn).unwrap(), 4);
        assert!(distinct_moods(&conn).unwrap().is_empty());
    }
}
