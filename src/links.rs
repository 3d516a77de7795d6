//! # Platform Links
//!
//! Search URLs for the streaming platforms a recommended song can be opened
//! on, the share text, and launching the system browser.

use crate::song::Song;
use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use log::{debug, info};
use std::fmt;
use std::process::Command;

/// Platforms offered for every song.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Platform {
    Youtube,
    YoutubeMusic,
    Spotify,
    Gaana,
    Jiosaavn,
    WynkMusic,
}

impl Platform {
    pub const ALL: [Platform; 6] = [
        Self::Youtube,
        Self::YoutubeMusic,
        Self::Spotify,
        Self::Gaana,
        Self::Jiosaavn,
        Self::WynkMusic,
    ];

    /// Human-readable platform name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Youtube => "YouTube",
            Self::YoutubeMusic => "YouTube Music",
            Self::Spotify => "Spotify",
            Self::Gaana => "Gaana",
            Self::Jiosaavn => "JioSaavn",
            Self::WynkMusic => "Wynk Music",
        }
    }

    const fn search_base(&self) -> &'static str {
        match self {
            Self::Youtube => "https://www.youtube.com/results?search_query=",
            Self::YoutubeMusic => "https://music.youtube.com/search?q=",
            Self::Spotify => "https://open.spotify.com/search/",
            Self::Gaana => "https://gaana.com/search/",
            Self::Jiosaavn => "https://www.jiosaavn.com/search/",
            Self::WynkMusic => "https://wynk.in/music/search?q=",
        }
    }

    /// Search page for `song` on this platform.
    #[must_use]
    pub fn search_url(&self, song: &Song) -> String {
        format!("{}{}", self.search_base(), search_query(song))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// URL-encoded `"<title> <artist>"`.
#[must_use]
pub fn search_query(song: &Song) -> String {
    urlencoding::encode(&song.search_query()).into_owned()
}

/// Text offered when sharing a recommendation.
#[must_use]
pub fn share_text(song: &Song, mood: &str) -> String {
    format!(
        "Sonic.ai recommended '{}' by {} for my {mood} mood! 🎶 #SonicAI #{mood}",
        song.title, song.artist
    )
}

/// Open `url` in the default browser.
pub fn open_url(url: &str) -> Result<()> {
    debug!("Opening {url}");

    #[cfg(target_os = "macos")]
    let status = Command::new("open").arg(url).status();
    #[cfg(target_os = "windows")]
    let status = Command::new("cmd").args(["/C", "start", "", url]).status();
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let status = Command::new("xdg-open").arg(url).status();

    let status = status.context("Failed to launch the system browser")?;
    if !status.success() {
        bail!("Browser launcher exited with {status}");
    }
    info!("Opened {url}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_urls() {
        let song = Song::new("Tum Hi Ho", "Arijit Singh");
        assert_eq!(
            Platform::Youtube.search_url(&song),
            "https://www.youtube.com/results?search_query=Tum%20Hi%20Ho%20Arijit%20Singh"
        );
        assert_eq!(
            Platform::Spotify.search_url(&song),
            "https://open.spotify.com/search/Tum%20Hi%20Ho%20Arijit%20Singh"
        );
        assert_eq!(
            Platform::WynkMusic.search_url(&song),
            "https://wynk.in/music/search?q=Tum%20Hi%20Ho%20Arijit%20Singh"
        );
    }

    #[test]
    fn test_query_escapes_reserved_characters() {
        let song = Song::new("Rock & Roll?", "A/B");
        assert_eq!(search_query(&song), "Rock%20%26%20Roll%3F%20A%2FB");
    }

    #[test]
    fn test_every_platform_has_a_url() {
        let song = Song::new("Kesariya", "Arijit Singh");
        for platform in Platform::ALL {
            assert!(platform.search_url(&song).starts_with("https://"));
        }
    }

    #[test]
    fn test_share_text() {
        let song = Song::new("Tum Hi Ho", "Arijit Singh");
        assert_eq!(
            share_text(&song, "romantic"),
            "Sonic.ai recommended 'Tum Hi Ho' by Arijit Singh for my romantic mood! 🎶 #SonicAI #romantic"
        );
    }
}
