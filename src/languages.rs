//! Music language / film-industry catalogue offered in the language picker.
//!
//! Options are stored and sent to the recommender in their full
//! `"<industry> - <language>"` form; the picker shows only the language part.

use anyhow::{bail, Result};
use lazy_static::lazy_static;

const CATALOGUE: &str = "(Bollywood - Hindi), (Tollywood - Telugu), (Kollywood - Tamil), \
(Mollywood - Malayalam), (Sandalwood - Kannada), (Pollywood - Punjabi), (Dhollywood - Gujarati), \
(Ollywood - Odia), (Hollywood - American English), (Nollywood - Nigerian English/Yoruba/Hausa/Igbo), \
(Shaw Brothers - Mandarin/Cantonese), (Gallywood - Ghanaian English/Akan), (Cinecittà - Italian), \
(Babelsberg - German), (Pinewood - British English), (Studio Ghibli - Japanese), (Pathé - French), \
(Mosfilm - Russian), (Daemyung Culture - Korean)";

lazy_static! {
    /// Every selectable option, in display order.
    pub static ref LANGUAGE_OPTIONS: Vec<String> = CATALOGUE
        .split(", ")
        .map(|entry| entry.trim().trim_start_matches('(').trim_end_matches(')').to_string())
        .collect();
}

/// The part shown in the picker: the language after `" - "`.
#[must_use]
pub fn display_name(option: &str) -> &str {
    option.split_once(" - ").map_or(option, |(_, language)| language)
}

/// Find the option a user typed: a 1-based index, the full option, the
/// industry, or the displayed language (case-insensitive).
#[must_use]
pub fn lookup(input: &str) -> Option<&'static str> {
    let wanted = input.trim();
    if let Ok(index) = wanted.parse::<usize>() {
        return index
            .checked_sub(1)
            .and_then(|i| LANGUAGE_OPTIONS.get(i))
            .map(String::as_str);
    }

    LANGUAGE_OPTIONS
        .iter()
        .find(|option| {
            let option = option.as_str();
            let (industry, language) = option.split_once(" - ").unwrap_or((option, option));
            [option, industry, language]
                .iter()
                .any(|candidate| candidate.eq_ignore_ascii_case(wanted))
        })
        .map(String::as_str)
}

/// Resolve a whole selection, dropping duplicates but keeping order.
///
/// # Errors
///
/// Returns an error naming the first input that matches no option.
pub fn resolve_selection<S: AsRef<str>>(inputs: &[S]) -> Result<Vec<String>> {
    let mut selected: Vec<String> = Vec::new();
    for input in inputs {
        let input = input.as_ref();
        if input.trim().is_empty() {
            continue;
        }
        let Some(option) = lookup(input) else {
            bail!("Unknown music language '{input}'. Run `sonic languages` to see the options.");
        };
        if !selected.iter().any(|s| s == option) {
            selected.push(option.to_string());
        }
    }
    Ok(selected)
}

/// Add the option if missing, remove it if present.
pub fn toggle(selected: &mut Vec<String>, option: &str) {
    if let Some(index) = selected.iter().position(|s| s == option) {
        selected.remove(index);
    } else {
        selected.push(option.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_parsed() {
        assert_eq!(LANGUAGE_OPTIONS.len(), 19);
        assert_eq!(LANGUAGE_OPTIONS[0], "Bollywood - Hindi");
        assert_eq!(LANGUAGE_OPTIONS[18], "Daemyung Culture - Korean");
        assert!(LANGUAGE_OPTIONS.iter().all(|o| !o.contains('(') && !o.contains(')')));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("Pollywood - Punjabi"), "Punjabi");
        assert_eq!(display_name("Plain"), "Plain");
    }

    #[test]
    fn test_lookup_variants() {
        assert_eq!(lookup("1"), Some("Bollywood - Hindi"));
        assert_eq!(lookup("punjabi"), Some("Pollywood - Punjabi"));
        assert_eq!(lookup("KOLLYWOOD"), Some("Kollywood - Tamil"));
        assert_eq!(lookup("Studio Ghibli - Japanese"), Some("Studio Ghibli - Japanese"));
        assert_eq!(lookup("0"), None);
        assert_eq!(lookup("20"), None);
        assert_eq!(lookup("klingon"), None);
    }

    #[test]
    fn test_resolve_selection_dedups() {
        let selected = resolve_selection(&["hindi", "6", "Bollywood", " "]).unwrap();
        assert_eq!(selected, ["Bollywood - Hindi", "Pollywood - Punjabi"]);
        assert!(resolve_selection(&["elvish"]).is_err());
    }

    #[test]
    fn test_toggle() {
        let mut selected = vec!["Bollywood - Hindi".to_string()];
        toggle(&mut selected, "Mosfilm - Russian");
        toggle(&mut selected, "Bollywood - Hindi");
        assert_eq!(selected, ["Mosfilm - Russian"]);
    }
}
