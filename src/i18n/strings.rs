/// All localized user-facing strings for a language
#[derive(Debug, Clone)]
pub struct LanguageStrings {
    // ==================== Flashcards ====================
    /// Page title of the flashcard practice
    pub flashcards_title: &'static str,

    /// Shown while the word list is being fetched
    pub loading_words: &'static str,

    /// Shown when a filter field is missing
    pub missing_filters: &'static str,

    /// Label in front of the pronunciation transcript
    /// Placeholders: {text}
    pub heard: &'static str,

    /// Pronunciation verdicts
    pub correct: &'static str,
    pub incorrect: &'static str,

    /// Shown while an image is being generated
    pub image_loading: &'static str,

    /// Card position indicator
    /// Placeholders: {current}, {total}
    pub card_position: &'static str,

    // ==================== Travel Game ====================
    pub travel_title: &'static str,

    /// Placeholders: {max}
    pub select_activities: &'static str,
    pub custom_activity: &'static str,
    pub enter_activity: &'static str,
    pub destinations: &'static str,
    pub searching: &'static str,
    pub no_destinations_yet: &'static str,

    /// Activity catalogue, in display order
    pub activities: [&'static str; 7],
}

// ==================== English Strings ====================

pub const ENGLISH_STRINGS: LanguageStrings = LanguageStrings {
    // Flashcards
    flashcards_title: "Flashcards",
    loading_words: "Loading words...",
    missing_filters: "Please choose a level, a part of speech and a card count between 1 and 50.",
    heard: "Heard: {text}",
    correct: "Correct!",
    incorrect: "Not quite, try again.",
    image_loading: "Generating image...",
    card_position: "Card {current} of {total}",

    // Travel game
    travel_title: "Travel Game",
    select_activities: "Select up to {max} activities:",
    custom_activity: "Custom Activity",
    enter_activity: "Please enter an activity",
    destinations: "Destinations:",
    searching: "Searching...",
    no_destinations_yet: "Select activities and click \"Submit\"",
    activities: [
        "Outdoor activities",
        "Site seeing",
        "Historical landmarks",
        "Archaeological landmarks",
        "Museums",
        "Local culture",
        "Nature sites",
    ],
};

// ==================== German Strings ====================

pub const GERMAN_STRINGS: LanguageStrings = LanguageStrings {
    // Flashcards
    flashcards_title: "Karteikarten",
    loading_words: "Wörter werden geladen...",
    missing_filters: "Bitte wählen Sie ein Niveau, eine Wortart und eine Kartenanzahl zwischen 1 und 50.",
    heard: "Gehört: {text}",
    correct: "Richtig!",
    incorrect: "Nicht ganz, versuchen Sie es noch einmal.",
    image_loading: "Bild wird erstellt...",
    card_position: "Karte {current} von {total}",

    // Travel game
    travel_title: "Reisenspiel",
    select_activities: "Wählen Sie bis zu {max} Aktivitäten aus:",
    custom_activity: "Eigene Aktivität",
    enter_activity: "Bitte geben Sie eine Aktivität ein",
    destinations: "Reiseziele:",
    searching: "Suche läuft...",
    no_destinations_yet: "Wählen Sie Aktivitäten aus und klicken Sie auf \"Absenden\"",
    activities: [
        "Outdoor-Aktivitäten",
        "Besichtigungen",
        "Historische Wahrzeichen",
        "Archäologische Wahrzeichen",
        "Museen",
        "Lokale Kultur",
        "Naturstätten",
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_titles_not_empty() {
        assert!(!ENGLISH_STRINGS.flashcards_title.is_empty());
        assert_eq!(GERMAN_STRINGS.flashcards_title, "Karteikarten");
    }

    #[test]
    fn test_card_position_placeholders() {
        for strings in [&ENGLISH_STRINGS, &GERMAN_STRINGS] {
            assert!(strings.card_position.contains("{current}"));
            assert!(strings.card_position.contains("{total}"));
        }
    }

    #[test]
    fn test_heard_placeholder() {
        assert!(ENGLISH_STRINGS.heard.contains("{text}"));
        assert!(GERMAN_STRINGS.heard.contains("{text}"));
    }

    #[test]
    fn test_activity_catalogues_line_up() {
        assert_eq!(ENGLISH_STRINGS.activities.len(), GERMAN_STRINGS.activities.len());
        assert_eq!(ENGLISH_STRINGS.activities[4], "Museums");
        assert_eq!(GERMAN_STRINGS.activities[4], "Museen");
    }
}
