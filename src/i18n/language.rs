//! Prompt/UI language selection.

use crate::i18n::{LanguageStrings, ENGLISH_STRINGS, GERMAN_STRINGS};
use anyhow::{bail, Result};

/// Language used for prompts, labels and activity names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    English,
    German,
}

impl Language {
    /// Create a Language from an ISO 639-1 code ("en", "de").
    ///
    /// # Returns
    /// * `Ok(Language)` for a supported code (case-insensitive)
    /// * `Err` for anything else
    pub fn from_code(code: &str) -> Result<Language> {
        match code.trim().to_lowercase().as_str() {
            "en" => Ok(Language::English),
            "de" => Ok(Language::German),
            other => bail!("Unknown language code: '{}'", other),
        }
    }

    /// ISO 639-1 code
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::German => "de",
        }
    }

    /// Name of the language in English
    pub fn name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::German => "German",
        }
    }

    /// Name of the language in itself (shown on the language switch)
    pub fn native_name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::German => "Deutsch",
        }
    }

    pub fn strings(&self) -> &'static LanguageStrings {
        match self {
            Language::English => &ENGLISH_STRINGS,
            Language::German => &GERMAN_STRINGS,
        }
    }

    /// The other language of the pair (the UI switch toggles between two)
    pub fn toggled(&self) -> Language {
        match self {
            Language::English => Language::German,
            Language::German => Language::English,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code_english() {
        let language = Language::from_code("en").expect("Should succeed");
        assert_eq!(language, Language::English);
        assert_eq!(language.name(), "English");
    }

    #[test]
    fn test_from_code_german_case_insensitive() {
        let language = Language::from_code(" DE ").expect("Should succeed");
        assert_eq!(language, Language::German);
        assert_eq!(language.native_name(), "Deutsch");
    }

    #[test]
    fn test_from_code_invalid() {
        let result = Language::from_code("fr");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Unknown"));
    }

    #[test]
    fn test_from_code_empty() {
        assert!(Language::from_code("").is_err());
    }

    #[test]
    fn test_toggled_round_trip() {
        assert_eq!(Language::English.toggled(), Language::German);
        assert_eq!(Language::English.toggled().toggled(), Language::English);
    }

    #[test]
    fn test_strings_follow_language() {
        assert_eq!(Language::English.strings().travel_title, "Travel Game");
        assert_eq!(Language::German.strings().travel_title, "Reisenspiel");
    }
}
