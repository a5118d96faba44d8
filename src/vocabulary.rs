use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown CEFR level '{0}' (expected A1, A2, B1, B2, C1 or C2)")]
    CefrLevel(String),
    #[error("unknown part of speech '{0}' (expected noun, verb or adjective)")]
    PartOfSpeech(String),
    #[error("unknown kana type '{0}' (expected hiragana or katakana)")]
    KanaType(String),
    #[error("unknown practice mode '{0}' (expected identification or pronunciation)")]
    PracticeMode(String),
}

/// Common European Framework reference level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CefrLevel {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl CefrLevel {
    pub const ALL: [CefrLevel; 6] = [
        CefrLevel::A1,
        CefrLevel::A2,
        CefrLevel::B1,
        CefrLevel::B2,
        CefrLevel::C1,
        CefrLevel::C2,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CefrLevel::A1 => "A1",
            CefrLevel::A2 => "A2",
            CefrLevel::B1 => "B1",
            CefrLevel::B2 => "B2",
            CefrLevel::C1 => "C1",
            CefrLevel::C2 => "C2",
        }
    }
}

impl fmt::Display for CefrLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CefrLevel {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        CefrLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == upper)
            .ok_or_else(|| ParseError::CefrLevel(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
}

impl PartOfSpeech {
    pub fn as_str(&self) -> &'static str {
        match self {
            PartOfSpeech::Noun => "noun",
            PartOfSpeech::Verb => "verb",
            PartOfSpeech::Adjective => "adjective",
        }
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartOfSpeech {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "noun" => Ok(PartOfSpeech::Noun),
            "verb" => Ok(PartOfSpeech::Verb),
            "adjective" | "adj" => Ok(PartOfSpeech::Adjective),
            _ => Err(ParseError::PartOfSpeech(s.to_string())),
        }
    }
}

/// Grammatical gender of a noun. Anything the backend sends that is not a
/// recognisable gender becomes `Unknown` rather than a decode failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Gender {
    Masculine,
    Feminine,
    Neuter,
    #[default]
    Unknown,
}

impl Gender {
    /// Capitalised nominative definite article, empty for unknown gender
    pub fn article(&self) -> &'static str {
        match self {
            Gender::Masculine => "Der",
            Gender::Feminine => "Die",
            Gender::Neuter => "Das",
            Gender::Unknown => "",
        }
    }
}

impl From<String> for Gender {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "m" | "masc" | "masculine" | "der" => Gender::Masculine,
            "f" | "fem" | "feminine" | "die" => Gender::Feminine,
            "n" | "neut" | "neuter" | "das" => Gender::Neuter,
            _ => Gender::Unknown,
        }
    }
}

impl From<Gender> for String {
    fn from(value: Gender) -> Self {
        match value {
            Gender::Masculine => "m",
            Gender::Feminine => "f",
            Gender::Neuter => "n",
            Gender::Unknown => "unknown",
        }
        .to_string()
    }
}

/// Subject pronouns the formatter conjugates for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pronoun {
    Ich,
    Du,
    Er,
    Wir,
    Ihr,
    Sie,
}

impl Pronoun {
    pub const ALL: [Pronoun; 6] = [
        Pronoun::Ich,
        Pronoun::Du,
        Pronoun::Er,
        Pronoun::Wir,
        Pronoun::Ihr,
        Pronoun::Sie,
    ];

    pub fn german(&self) -> &'static str {
        match self {
            Pronoun::Ich => "ich",
            Pronoun::Du => "du",
            Pronoun::Er => "er",
            Pronoun::Wir => "wir",
            Pronoun::Ihr => "ihr",
            Pronoun::Sie => "sie",
        }
    }

    /// English subject pronoun; `sie` here is the plural "they"
    pub fn english(&self) -> &'static str {
        match self {
            Pronoun::Ich => "I",
            Pronoun::Du => "you",
            Pronoun::Er => "he",
            Pronoun::Wir => "we",
            Pronoun::Ihr => "you all",
            Pronoun::Sie => "they",
        }
    }

    pub fn is_third_person_singular(&self) -> bool {
        matches!(self, Pronoun::Er)
    }
}

/// Present-tense conjugation table as sent by the vocabulary backend.
/// Keys outside the six pronouns are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentTense {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ich: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub du: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub er: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ihr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sie: Option<String>,
}

impl PresentTense {
    pub fn form(&self, pronoun: Pronoun) -> Option<&str> {
        let form = match pronoun {
            Pronoun::Ich => &self.ich,
            Pronoun::Du => &self.du,
            Pronoun::Er => &self.er,
            Pronoun::Wir => &self.wir,
            Pronoun::Ihr => &self.ihr,
            Pronoun::Sie => &self.sie,
        };
        form.as_deref().map(str::trim).filter(|f| !f.is_empty())
    }
}

/// Nominative forms of a noun
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NounForms {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub singular: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plural: Option<String>,
}

/// One vocabulary entry as returned by `GET /vocabulary/words`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordEntry {
    pub german_word: String,
    pub english_word: String,
    pub part_of_speech: PartOfSpeech,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub present: Option<PresentTense>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nominative: Option<NounForms>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cefr_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<f64>,

    // Verb extras
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub separable: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub perfect: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gerund: Option<String>,

    // Adjective extras
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparative: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superlative: Option<String>,
}

impl WordEntry {
    /// Minimal entry; the optional grammar fields start empty
    pub fn new(german_word: &str, english_word: &str, part_of_speech: PartOfSpeech) -> Self {
        Self {
            german_word: german_word.to_string(),
            english_word: english_word.to_string(),
            part_of_speech,
            gender: None,
            present: None,
            nominative: None,
            cefr_level: None,
            frequency: None,
            separable: None,
            perfect: None,
            gerund: None,
            comparative: None,
            superlative: None,
        }
    }

    pub fn gender(&self) -> Gender {
        self.gender.unwrap_or_default()
    }

    /// Nominative singular, falling back to the dictionary form
    pub fn singular(&self) -> &str {
        self.nominative
            .as_ref()
            .and_then(|n| n.singular.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(self.german_word.trim())
    }

    pub fn plural(&self) -> Option<&str> {
        self.nominative
            .as_ref()
            .and_then(|n| n.plural.as_deref())
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    /// Conjugated present-tense form, falling back to the dictionary form
    pub fn conjugate(&self, pronoun: Pronoun) -> &str {
        self.present
            .as_ref()
            .and_then(|p| p.form(pronoun))
            .unwrap_or(self.german_word.trim())
    }
}

/// Response body of `GET /vocabulary/words`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyResponse {
    #[serde(default)]
    pub vocabulary_words: Vec<WordEntry>,
}
