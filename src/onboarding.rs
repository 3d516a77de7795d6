//! First-run walkthrough of the chat commands.

/// One walkthrough page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TourStep {
    pub title: &'static str,
    pub content: &'static str,
}

pub static TOUR_STEPS: [TourStep; 6] = [
    TourStep {
        title: "Welcome to Sonic.AI",
        content: "Tell me how you feel in your own words and I'll pick songs that match or lift your mood.",
    },
    TourStep {
        title: "Music languages",
        content: "Pick the film industries and languages you like. Change them any time with /languages.",
    },
    TourStep {
        title: "Discover more",
        content: "Liked the vibe? Type /more for another set of songs for the same mood.",
    },
    TourStep {
        title: "Your queue",
        content: "Use /add <n> to queue a recommended song and /queue to see what's lined up.",
    },
    TourStep {
        title: "Listen anywhere",
        content: "Use /open <n> [platform] to search a song on YouTube, Spotify, JioSaavn and more.",
    },
    TourStep {
        title: "History and settings",
        content: "/history shows past recommendations by mood, /settings shows your theme and API key. Replay this tour with /tour.",
    },
];

/// Cursor over [`TOUR_STEPS`].
#[derive(Debug, Clone, Default)]
pub struct Tour {
    index: usize,
}

impl Tour {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current(&self) -> &'static TourStep {
        &TOUR_STEPS[self.index]
    }

    /// 1-based position, for "step n of m".
    #[must_use]
    pub const fn position(&self) -> usize {
        self.index + 1
    }

    #[must_use]
    pub fn len(&self) -> usize {
        TOUR_STEPS.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        TOUR_STEPS.is_empty()
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.index + 1 == TOUR_STEPS.len()
    }

    /// Advance. Returns `false` once the last step has been passed.
    pub fn advance(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.index += 1;
        true
    }

    pub fn back(&mut self) {
        self.index = self.index.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_walks_forward_and_back() {
        let mut tour = Tour::new();
        assert_eq!(tour.position(), 1);
        tour.back();
        assert_eq!(tour.position(), 1);

        while tour.advance() {}
        assert!(tour.is_last());
        assert_eq!(tour.position(), tour.len());
        assert_eq!(tour.current().title, "History and settings");

        tour.back();
        assert!(!tour.is_last());
    }
}
