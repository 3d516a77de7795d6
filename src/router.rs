//! # Conversation Router
//!
//! Decides what one line of chat input is: a REPL command, a small-talk
//! message answered locally, or a request for the recommender. Canned
//! replies are checked in a fixed order and never reach the network.

use crate::links::Platform;
use crate::settings::Theme;
use clap::ValueEnum;

/// REPL slash commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Queue,
    History(Option<String>),
    Settings,
    Languages,
    Key,
    Theme(Theme),
    Tour,
    Reset,
    More,
    Add(usize),
    Remove(usize),
    Open(usize, Option<Platform>),
    Quit,
}

/// Locally answered small talk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CannedReply {
    Creator,
    WhoAreYou,
    Purpose,
    Thanks,
    Greeting,
    HowAreYou,
    Farewell,
}

impl CannedReply {
    #[must_use]
    pub const fn text(&self) -> &'static str {
        match self {
            Self::Creator => "🌟 I was built and developed by Mr. Prabjot Singh! He created Sonic.AI to understand human emotions through AI and recommend music that touches your heart. His vision was to combine advanced AI with music therapy for emotional well-being. 🎵",
            Self::WhoAreYou => "🎵 Hi! I'm SONIC.AI - your AI-powered music companion! I'm designed to understand your emotions and recommend the perfect Punjabi & Bollywood songs to match or improve your mood. I was created by Mr. Prabjot Singh to help you 'Feel the Magic in Every Beat'! Just tell me how you're feeling, and I'll find the perfect song for you! ✨",
            Self::Purpose => "🎯 My purpose is to:\n\n🤖 Analyze your emotions using advanced AI\n🎵 Recommend Punjabi & Bollywood songs that match or improve your mood\n💚 Promote emotional well-being through music therapy\n🌐 Provide instant access to your favorite music platforms\n\nI was created by Mr. Prabjot Singh to make music discovery emotional and intelligent! Feel the Magic in Every Beat! ✨",
            Self::Thanks => "😊 You're welcome! I'm happy to help brighten your day with music! Keep feeling the magic in every beat! 🎵💫",
            Self::Greeting => "Hello there! It's wonderful to see you. How are you feeling today? Tell me, and I'll find the perfect soundtrack for your moment.",
            Self::HowAreYou => "I'm doing wonderfully, thank you for asking! I'm here and ready to find the perfect music for you. How are you feeling right now?",
            Self::Farewell => "Goodbye for now! I hope the music brought you some joy. Feel free to return whenever you need a song for your mood. Take care! 🎵",
        }
    }
}

enum Match {
    Contains,
    StartsWith,
}

const CANNED_RULES: [(CannedReply, Match, &[&str]); 7] = [
    (
        CannedReply::Creator,
        Match::Contains,
        &["who built", "who created", "who developed", "who made", "your creator", "your developer", "prabjot singh", "prabjot"],
    ),
    (
        CannedReply::WhoAreYou,
        Match::Contains,
        &["who are you", "what are you", "who r u", "introduce yourself"],
    ),
    (
        CannedReply::Purpose,
        Match::Contains,
        &["what is your purpose", "your purpose", "what do you do", "what can you do", "app purpose", "why were you created"],
    ),
    (CannedReply::Thanks, Match::Contains, &["thank", "thanks", "appreciate"]),
    (
        CannedReply::Greeting,
        Match::StartsWith,
        &["hello", "hi", "hey", "good morning", "good afternoon", "good evening"],
    ),
    (
        CannedReply::HowAreYou,
        Match::Contains,
        &["how are you", "how's it going", "what's up", "hw r u"],
    ),
    (
        CannedReply::Farewell,
        Match::Contains,
        &["bye", "goodbye", "see you", "cya", "take care"],
    ),
];

/// Where one line of input goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Command(Command),
    Canned(CannedReply),
    /// Trimmed text to send to the recommender.
    Recommend(String),
    Empty,
    /// A slash command that could not be understood, with the reason.
    Invalid(String),
}

/// Classify one line of input.
#[must_use]
pub fn route(line: &str) -> Route {
    let text = line.trim();
    if text.is_empty() {
        return Route::Empty;
    }
    if let Some(command) = text.strip_prefix('/') {
        return match parse_command(command) {
            Ok(command) => Route::Command(command),
            Err(reason) => Route::Invalid(reason),
        };
    }
    match canned_reply(&text.to_lowercase()) {
        Some(reply) => Route::Canned(reply),
        None => Route::Recommend(text.to_string()),
    }
}

/// The canned reply for already lower-cased input, if any rule matches.
///
/// Matching is plain substring / prefix matching, so "hi" also catches
/// "hindi songs please" and "thank" catches "thankless".
#[must_use]
pub fn canned_reply(lower: &str) -> Option<CannedReply> {
    let lower = lower.trim();
    CANNED_RULES
        .iter()
        .find(|(_, rule, keywords)| {
            keywords.iter().any(|keyword| match rule {
                Match::Contains => lower.contains(keyword),
                Match::StartsWith => lower.starts_with(keyword),
            })
        })
        .map(|(reply, _, _)| *reply)
}

fn parse_command(command: &str) -> Result<Command, String> {
    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default().to_lowercase();
    let args: Vec<&str> = parts.collect();

    let command = match name.as_str() {
        "help" | "?" => Command::Help,
        "queue" | "q" => Command::Queue,
        "history" => Command::History(Some(args.join(" ").to_lowercase()).filter(|m| !m.is_empty())),
        "settings" => Command::Settings,
        "languages" | "lang" => Command::Languages,
        "key" => Command::Key,
        "theme" => {
            let theme = args.first().ok_or("Usage: /theme <light|dark|system>")?;
            Command::Theme(theme.parse::<Theme>().map_err(|e| e.to_string())?)
        }
        "tour" => Command::Tour,
        "reset" => Command::Reset,
        "more" => Command::More,
        "add" => Command::Add(song_number(args.first(), "Usage: /add <song number>")?),
        "remove" | "rm" => Command::Remove(song_number(args.first(), "Usage: /remove <song number>")?),
        "open" => {
            let number = song_number(args.first(), "Usage: /open <song number> [platform]")?;
            let platform = match args.get(1) {
                Some(name) => Some(
                    Platform::from_str(name, true)
                        .map_err(|_| format!("Unknown platform '{name}'"))?,
                ),
                None => None,
            };
            Command::Open(number, platform)
        }
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("Unknown command '/{other}'. Type /help for the list.")),
    };
    Ok(command)
}

fn song_number(arg: Option<&&str>, usage: &str) -> Result<usize, String> {
    arg.and_then(|n| n.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .ok_or_else(|| usage.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canned_replies_in_order() {
        assert_eq!(canned_reply("who made you?"), Some(CannedReply::Creator));
        // creator is checked before who-are-you
        assert_eq!(canned_reply("who are you, prabjot?"), Some(CannedReply::Creator));
        assert_eq!(canned_reply("introduce yourself"), Some(CannedReply::WhoAreYou));
        assert_eq!(canned_reply("what can you do"), Some(CannedReply::Purpose));
        assert_eq!(canned_reply("thanks a lot"), Some(CannedReply::Thanks));
        assert_eq!(canned_reply("good morning!"), Some(CannedReply::Greeting));
        assert_eq!(canned_reply("so how are you"), Some(CannedReply::HowAreYou));
        assert_eq!(canned_reply("ok bye"), Some(CannedReply::Farewell));
        assert_eq!(canned_reply("i feel heartbroken"), None);
    }

    #[test]
    fn test_greeting_is_prefix_only() {
        assert_eq!(canned_reply("hey there"), Some(CannedReply::Greeting));
        assert_eq!(canned_reply("oh hello"), None);
    }

    #[test]
    fn test_route_lowercases_for_matching() {
        assert_eq!(route("  THANK YOU "), Route::Canned(CannedReply::Thanks));
        assert_eq!(
            route("  I am Feeling Low  "),
            Route::Recommend("I am Feeling Low".to_string())
        );
        assert_eq!(route("   "), Route::Empty);
    }

    #[test]
    fn test_commands() {
        assert_eq!(route("/more"), Route::Command(Command::More));
        assert_eq!(route("/add 2"), Route::Command(Command::Add(2)));
        assert_eq!(route("/rm 4"), Route::Command(Command::Remove(4)));
        assert_eq!(route("/theme Dark"), Route::Command(Command::Theme(Theme::Dark)));
        assert_eq!(
            route("/open 1 spotify"),
            Route::Command(Command::Open(1, Some(Platform::Spotify)))
        );
        assert_eq!(
            route("/open 3 youtube-music"),
            Route::Command(Command::Open(3, Some(Platform::YoutubeMusic)))
        );
        assert_eq!(
            route("/history Sad"),
            Route::Command(Command::History(Some("sad".to_string())))
        );
        assert_eq!(
            route("/history Not  Good"),
            Route::Command(Command::History(Some("not good".to_string())))
        );
        assert_eq!(route("/history"), Route::Command(Command::History(None)));
    }

    #[test]
    fn test_invalid_commands() {
        assert!(matches!(route("/add"), Route::Invalid(_)));
        assert!(matches!(route("/add 0"), Route::Invalid(_)));
        assert!(matches!(route("/remove"), Route::Invalid(_)));
        assert!(matches!(route("/open 1 napster"), Route::Invalid(_)));
        assert!(matches!(route("/theme neon"), Route::Invalid(_)));
        assert!(matches!(route("/dance"), Route::Invalid(_)));
    }
}
