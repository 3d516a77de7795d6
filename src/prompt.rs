//! # Prompt Construction
//!
//! Builds the text sent to the generative-language service for one turn: the
//! static Sonic AI persona, the intent rules, and the dynamic context (the
//! pinned mood of a "discover more" request and the preferred music
//! languages). Also owns the JSON response schema the reply is constrained to.

use crate::recommend::Query;
use crate::response::MAX_SONGS;
use serde_json::{json, Value};

/// Sent as `systemInstruction` alongside every prompt.
pub const SYSTEM_INSTRUCTION: &str = "You are Sonic AI. First, determine the user's intent \
('mood_query', 'change_language', 'greeting', 'question'). Then, detect the user's language. \
Your 'responseText' must be a single, VERY short, friendly sentence (under 15 words) in the \
user's language. For 'mood_query', also determine the mood as a single lowercase word (or \
'neutral'). Always adhere to the JSON format.";

const PERSONA: &str = "You are Sonic AI, an empathetic and sophisticated music sommelier.
Your task is to analyze the user's input to determine their intent and mood, then suggest songs or respond appropriately.
You must generate a response in a specific JSON format.

Context about Sonic AI for answering questions:
- Creator: Sonic AI was created by Mr. Prabjot Singh. In Hindi, his name is श्री प्रभजोत सिंह.
- Purpose: Its mission is to connect users with music that matches their emotional state.";

/// How the songs should be picked, given the preferred languages.
#[must_use]
pub fn language_instruction(languages: &[String]) -> String {
    if languages.is_empty() {
        format!(
            "Based on the mood, find up to {MAX_SONGS} relevant songs. If possible, infer a \
             suitable genre or language from the user's input language and context."
        )
    } else {
        format!(
            "Based on the mood, find up to {MAX_SONGS} relevant songs from the following \
             languages/music industries: {}. Prioritize these selections.",
            languages.join(", ")
        )
    }
}

/// First instruction step: either read the input or continue a mood.
#[must_use]
pub fn opening_instruction(query: &Query) -> String {
    match query {
        Query::Utterance(text) => format!("1. Read the user's input: \"{text}\"."),
        Query::DiscoverMore(mood) => format!(
            "The user wants to discover more music for the mood: '{mood}'. Find another set of \
             up to {MAX_SONGS} songs matching this mood. The responseText should be something \
             like \"Here are some more songs for you.\""
        ),
    }
}

/// The input line quoted at the end of the prompt.
fn user_input(query: &Query) -> String {
    match query {
        Query::Utterance(text) => text.clone(),
        Query::DiscoverMore(mood) => format!("Discover more {mood} music"),
    }
}

/// Full prompt for one turn.
#[must_use]
pub fn build_prompt(query: &Query, languages: &[String]) -> String {
    let pinned_mood = query.pinned_mood().unwrap_or_default();

    format!(
        "{PERSONA}

Instructions:
{opening}
2. **Determine the user's intent**. If the user is asking to discover more, the intent is 'mood_query'. Otherwise, it must be one of:
   - 'change_language': If the user wants to change their music language/industry preferences (e.g., \"change language\", \"quiero música en español\").
   - 'mood_query': If the user is describing a mood, feeling, or asking for music. This is the most common intent.
   - 'greeting': For simple greetings like 'hello', 'hi', 'how are you?'.
   - 'question': For questions about you (who you are, your purpose, who made you, etc.).
3. **Detect the user's language**. All text you generate for 'responseText' MUST be in this language.
4. **Handle based on intent**:
   - If intent is 'change_language': Set 'mood' to 'neutral', 'songs' to an empty array `[]`, and 'responseText' to a confirmation message like \"Of course! Please select your new preferences below.\" in the user's language.
   - If intent is 'greeting' or 'question': Respond conversationally in 'responseText' using the context provided above. Set 'mood' to 'neutral' and 'songs' to `[]`. If the user asks about your creator, mention Mr. Prabjot Singh. If responding in Hindi, you MUST use the spelling 'प्रभजोत सिंह'.
   - If intent is 'mood_query':
     a. Analyze for a clear mood. If discovering more, use the provided mood '{pinned_mood}'. If none, set 'mood' to 'neutral', 'songs' to `[]`, and 'responseText' to a message asking the user to describe their feeling.
     b. If a mood is detected, identify a single lowercase word for it.
     c. {languages}
     d. Craft a VERY concise 'responseText' (under 15 words) in the user's language. Example: \"Feeling happy? Here are some tunes.\"

User Input: \"{input}\"",
        opening = opening_instruction(query),
        languages = language_instruction(languages),
        input = user_input(query),
    )
}

/// JSON schema the reply must follow (Gemini `responseSchema` dialect).
#[must_use]
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "intent": {
                "type": "STRING",
                "description": "Categorize the user's intent. Must be one of: 'mood_query', 'change_language', 'greeting', 'question'. Default to 'mood_query' if unsure.",
                "enum": ["mood_query", "change_language", "greeting", "question"]
            },
            "mood": {
                "type": "STRING",
                "description": "A single, lowercase word that best describes the user's primary emotion (e.g., happy, reflective, nostalgic, adventurous). If no clear mood is detected, or intent is not 'mood_query', this should be 'neutral'."
            },
            "responseText": {
                "type": "STRING",
                "description": "A very short, friendly response (one sentence, max 15 words) in the same language as the user's input. It should introduce songs, answer a question, or clarify the bot's purpose."
            },
            "songs": {
                "type": "ARRAY",
                "description": format!("A list of up to {MAX_SONGS} songs. Should be an empty array if the intent is not 'mood_query' or if no mood was detected."),
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING", "description": "The title of the song." },
                        "artist": { "type": "STRING", "description": "The artist of the song." }
                    },
                    "required": ["title", "artist"]
                }
            }
        },
        "required": ["intent", "mood", "responseText", "songs"]
    })
}
