//! # Song Queue
//!
//! User-curated, ordered list of songs waiting to be played on an external
//! platform. Positions are 1-based at the API surface and contiguous in the
//! table; a song appears at most once (identity is [`Song::id`]).
//!
//! ```no_run
//! use sonic::{db, queue, song::Song};
//!
//! let mut conn = db::open_in_memory()?;
//! queue::add(&conn, &Song::new("Kun Faya Kun", "A. R. Rahman"))?;
//! queue::add(&conn, &Song::new("Channa Mereya", "Arijit Singh"))?;
//! queue::move_song(&mut conn, 2, 1)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use crate::song::Song;
use anyhow::{bail, Context, Result};
use log::{debug, info};
use rusqlite::{params, Connection};

/// All queued songs in order.
pub fn list(conn: &Connection) -> Result<Vec<Song>> {
    let mut stmt = conn
        .prepare("SELECT song_id, title, artist FROM queue ORDER BY position")
        .context("Invalid SQL statement when SELECTing queue")?;

    let rows = stmt
        .query_map([], |row| {
            Ok(Song {
                id: row.get(0)?,
                title: row.get(1)?,
                artist: row.get(2)?,
            })
        })
        .context("Cannot query queue.")?;

    let mut songs = Vec::new();
    for song in rows {
        songs.push(song.context("Queued song row could not be read")?);
    }
    Ok(songs)
}

/// Number of queued songs.
pub fn len(conn: &Connection) -> Result<usize> {
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM queue", [], |row| row.get(0))
        .context("Could not count queue entries")?;
    Ok(usize::try_from(count).unwrap_or_default())
}

/// Whether a song with this id is queued.
pub fn contains(conn: &Connection, song_id: &str) -> Result<bool> {
    let found: i64 = conn
        .query_row(
            "SELECT EXISTS(SELECT 1 FROM queue WHERE song_id = ?1)",
            [song_id],
            |row| row.get(0),
        )
        .context("Could not look up queued song")?;
    Ok(found == 1)
}

/// Append a song. Returns `false` when it was already queued.
pub fn add(conn: &Connection, song: &Song) -> Result<bool> {
    let inserted = conn
        .execute(
            "INSERT OR IGNORE INTO queue (song_id, position, title, artist)
             VALUES (?1, (SELECT COALESCE(MAX(position), 0) + 1 FROM queue), ?2, ?3)",
            params![song.id, song.title, song.artist],
        )
        .with_context(|| format!("Failed to add {song} to the queue"))?;

    if inserted > 0 {
        info!("Queued {song}");
    } else {
        debug!("{song} already queued");
    }
    Ok(inserted > 0)
}

/// Remove a song by id. Returns whether it was queued.
pub fn remove(conn: &mut Connection, song_id: &str) -> Result<bool> {
    let mut songs = list(conn)?;
    let before = songs.len();
    songs.retain(|song| song.id != song_id);
    if songs.len() == before {
        return Ok(false);
    }
    rewrite(conn, &songs)?;
    Ok(true)
}

/// Remove the song at a 1-based position and return it.
pub fn remove_at(conn: &mut Connection, position: usize) -> Result<Song> {
    let mut songs = list(conn)?;
    let index = to_index(position, songs.len())?;
    let removed = songs.remove(index);
    rewrite(conn, &songs)?;
    info!("Removed {removed} from the queue");
    Ok(removed)
}

/// Move the song at `from` so it ends up at `to` (both 1-based).
pub fn move_song(conn: &mut Connection, from: usize, to: usize) -> Result<()> {
    let mut songs = list(conn)?;
    let source = to_index(from, songs.len())?;
    let target = to_index(to, songs.len())?;
    if source == target {
        return Ok(());
    }
    reorder(&mut songs, source, target);
    rewrite(conn, &songs)
}

/// Empty the queue. Returns the number of removed songs.
pub fn clear(conn: &Connection) -> Result<usize> {
    let removed = conn
        .execute("DELETE FROM queue", [])
        .context("Failed to clear the queue")?;
    info!("Cleared {removed} songs from the queue");
    Ok(removed)
}

/// Splice `songs[from]` out and back in at `to` (0-based).
pub fn reorder<T>(songs: &mut Vec<T>, from: usize, to: usize) {
    if from >= songs.len() || to >= songs.len() || from == to {
        return;
    }
    let item = songs.remove(from);
    songs.insert(to, item);
}

fn to_index(position: usize, len: usize) -> Result<usize> {
    if position == 0 || position > len {
        bail!("Queue position {position} is out of range (queue has {len} songs)");
    }
    Ok(position - 1)
}

/// Replace the table contents with `songs`, renumbering positions.
fn rewrite(conn: &mut Connection, songs: &[Song]) -> Result<()> {
    let tx = conn.transaction()?;

    {
        tx.execute("DELETE FROM queue", [])?;
        let mut stmt = tx.prepare(
            "INSERT INTO queue (song_id, position, title, artist) VALUES (?1, ?2, ?3, ?4)",
        )?;
        for (index, song) in songs.iter().enumerate() {
            stmt.execute(params![song.id, (index + 1) as i64, song.title, song.artist])
                .with_context(|| format!("Invalid SQL statement when INSERTing {song} INTO queue"))?;
        }
    }

    tx.commit().context("Committing queue transaction failed.")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn titles(conn: &Connection) -> Vec<String> {
        list(conn).unwrap().into_iter().map(|s| s.title).collect()
    }

    fn seeded() -> Connection {
        let conn = db::open_in_memory().expect("db");
        for (title, artist) in [("A", "x"), ("B", "y"), ("C", "z"), ("D", "w")] {
            add(&conn, &Song::new(title, artist)).unwrap();
        }
        conn
    }

    #[test]
    fn test_add_keeps_order_and_rejects_duplicates() {
        let conn = seeded();
        assert_eq!(titles(&conn), ["A", "B", "C", "D"]);

        assert!(!add(&conn, &Song::new("a", "X")).unwrap());
        assert_eq!(len(&conn).unwrap(), 4);
        assert!(contains(&conn, &Song::new("B", "y").id).unwrap());
    }

    #[test]
    fn test_move_is_a_splice() {
        let mut conn = seeded();
        move_song(&mut conn, 1, 3).unwrap();
        assert_eq!(titles(&conn), ["B", "C", "A", "D"]);

        move_song(&mut conn, 4, 1).unwrap();
        assert_eq!(titles(&conn), ["D", "B", "C", "A"]);

        move_song(&mut conn, 2, 2).unwrap();
        assert_eq!(titles(&conn), ["D", "B", "C", "A"]);
    }

    #[test]
    fn test_move_out_of_range() {
        let mut conn = seeded();
        assert!(move_song(&mut conn, 0, 1).is_err());
        assert!(move_song(&mut conn, 1, 5).is_err());
        assert_eq!(titles(&conn), ["A", "B", "C", "D"]);
    }

    #[test]
    fn test_remove_renumbers() {
        let mut conn = seeded();
        let removed = remove_at(&mut conn, 2).unwrap();
        assert_eq!(removed.title, "B");
        assert!(remove(&mut conn, &Song::new("C", "z").id).unwrap());
        assert!(!remove(&mut conn, "missing").unwrap());
        assert_eq!(titles(&conn), ["A", "D"]);

        // Appending after removals continues from the last position.
        add(&conn, &Song::new("E", "v")).unwrap();
        assert_eq!(titles(&conn), ["A", "D", "E"]);
    }

    #[test]
    fn test_clear() {
        let conn = seeded();
        assert_eq!(clear(&conn).unwrap(), 4);
        assert!(list(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_reorder_ignores_bad_indices() {
        let mut items = vec![1, 2, 3];
        reorder(&mut items, 5, 0);
        assert_eq!(items, [1, 2, 3]);
        reorder(&mut items, 2, 0);
        assert_eq!(items, [3, 1, 2]);
    }
}
