//! Turns a `WordEntry` into the phrase shown on a flashcard.
//!
//! Nouns get their definite article, verbs a subject pronoun with the matching
//! present-tense form, adjectives an auxiliary noun they agree with. Random
//! choices (pronoun, singular/plural) come from the caller's `Rng` so a seeded
//! generator reproduces the same card.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::vocabulary::{PartOfSpeech, Pronoun, WordEntry};

const MASK_CHAR: char = '_';

/// Grammatical number used for adjective agreement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Number {
    Singular,
    Plural,
}

impl Number {
    /// Fair coin flip
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Number {
        if rng.gen_bool(0.5) {
            Number::Plural
        } else {
            Number::Singular
        }
    }
}

/// Draw one of the six subject pronouns uniformly
pub fn random_pronoun<R: Rng + ?Sized>(rng: &mut R) -> Pronoun {
    *Pronoun::ALL.choose(rng).unwrap_or(&Pronoun::Ich)
}

/// A word hidden behind underscores, recoverable on reveal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Concealed {
    original: String,
}

impl Concealed {
    pub fn new(word: &str) -> Self {
        Self {
            original: word.to_string(),
        }
    }

    /// One underscore per character of the original
    pub fn masked(&self) -> String {
        mask(&self.original)
    }

    pub fn reveal(&self) -> &str {
        &self.original
    }
}

/// Replace every character of `word` with an underscore
pub fn mask(word: &str) -> String {
    std::iter::repeat(MASK_CHAR)
        .take(word.chars().count())
        .collect()
}

/// A formatted flashcard phrase
///
/// `lead` is the article or pronoun, `target` the practised word, `trail` the
/// auxiliary noun of an adjective phrase. Only `target` is ever masked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phrase {
    pub lead: String,
    pub target: String,
    pub trail: String,
    pub english: String,
}

impl Phrase {
    /// Single spaces between the non-empty parts; spacing inside a part is
    /// left alone
    fn join(lead: &str, target: &str, trail: &str) -> String {
        [lead, target, trail]
            .iter()
            .map(|part| part.trim())
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Full German phrase
    pub fn text(&self) -> String {
        Self::join(&self.lead, &self.target, &self.trail)
    }

    /// German phrase with the target word masked
    pub fn masked(&self) -> String {
        Self::join(&self.lead, &mask(&self.target), &self.trail)
    }

    pub fn display(&self, conceal: bool) -> String {
        if conceal {
            self.masked()
        } else {
            self.text()
        }
    }
}

/// Article + noun, e.g. "Der Hund"
pub fn format_noun(word: &WordEntry) -> Phrase {
    let article = word.gender().article();
    Phrase {
        lead: article.to_string(),
        target: word.singular().to_string(),
        trail: String::new(),
        english: with_definite_article(&word.english_word),
    }
}

/// Pronoun + conjugated form, e.g. "wir gehen"
pub fn format_verb(word: &WordEntry, pronoun: Pronoun) -> Phrase {
    let base = english_base_verb(&word.english_word);
    let english_verb = if pronoun.is_third_person_singular() {
        english_s_form(base)
    } else {
        base.to_string()
    };

    Phrase {
        lead: pronoun.german().to_string(),
        target: word.conjugate(pronoun).to_string(),
        trail: String::new(),
        english: format!("{} {}", pronoun.english(), english_verb)
            .trim()
            .to_string(),
    }
}

/// Article + inflected adjective + noun, e.g. "Die guten Hunde".
///
/// Without an auxiliary noun the bare adjective is returned. A plural draw on
/// a noun without a known plural form falls back to singular agreement.
pub fn format_adjective(word: &WordEntry, noun: Option<&WordEntry>, number: Number) -> Phrase {
    let adjective = word.german_word.trim();
    let Some(noun) = noun else {
        return Phrase {
            lead: String::new(),
            target: adjective.to_string(),
            trail: String::new(),
            english: word.english_word.trim().to_string(),
        };
    };

    let english_noun = strip_english_article(&noun.english_word);
    let english_adjective = word.english_word.trim();

    match (number, noun.plural()) {
        (Number::Plural, Some(plural)) => Phrase {
            lead: "Die".to_string(),
            target: weak_ending(adjective, Number::Plural),
            trail: plural.to_string(),
            english: format!("the {} {}", english_adjective, english_plural(english_noun)),
        },
        _ => Phrase {
            lead: noun.gender().article().to_string(),
            target: weak_ending(adjective, Number::Singular),
            trail: noun.singular().to_string(),
            english: format!("the {} {}", english_adjective, english_noun),
        },
    }
}

/// Format `word` for display, drawing any random choice from `rng`.
///
/// `noun` is only consulted for adjectives.
pub fn format_word<R: Rng + ?Sized>(
    word: &WordEntry,
    noun: Option<&WordEntry>,
    rng: &mut R,
) -> Phrase {
    match word.part_of_speech {
        PartOfSpeech::Noun => format_noun(word),
        PartOfSpeech::Verb => format_verb(word, random_pronoun(rng)),
        PartOfSpeech::Adjective => format_adjective(word, noun, Number::random(rng)),
    }
}

/// Weak nominative ending after a definite article
fn weak_ending(adjective: &str, number: Number) -> String {
    let suffix = match number {
        Number::Singular => "e",
        Number::Plural => "en",
    };

    if adjective.is_empty() {
        return String::new();
    }
    if adjective == "hoch" {
        return format!("hoh{}", suffix);
    }
    if adjective.ends_with('e') {
        return format!("{}{}", adjective, &suffix[1..]);
    }
    // dunkel -> dunkle, teuer -> teure; viel keeps its stem
    if unstressed_el(adjective) || adjective.ends_with("euer") || adjective.ends_with("auer") {
        let cut = adjective.len() - 2;
        return format!("{}{}{}", &adjective[..cut], &adjective[cut + 1..], suffix);
    }
    format!("{}{}", adjective, suffix)
}

/// `-el` after a consonant, where the `e` drops before an ending
fn unstressed_el(adjective: &str) -> bool {
    let Some(stem) = adjective.strip_suffix("el") else {
        return false;
    };
    stem.chars()
        .last()
        .is_some_and(|c| c.is_alphabetic() && !"aeiouäöüy".contains(c.to_ascii_lowercase()))
}

fn strip_english_article(english: &str) -> &str {
    let trimmed = english.trim();
    trimmed
        .strip_prefix("the ")
        .or_else(|| trimmed.strip_prefix("a "))
        .or_else(|| trimmed.strip_prefix("an "))
        .unwrap_or(trimmed)
}

fn with_definite_article(english: &str) -> String {
    let noun = strip_english_article(english);
    if noun.is_empty() {
        String::new()
    } else {
        format!("the {}", noun)
    }
}

fn english_base_verb(english: &str) -> &str {
    let trimmed = english.trim();
    trimmed.strip_prefix("to ").unwrap_or(trimmed)
}

/// Add the regular -s/-es/-ies suffix to the first word ("go out" -> "goes out")
fn english_s_form(verb: &str) -> String {
    let (head, rest) = match verb.split_once(' ') {
        Some((head, rest)) => (head, Some(rest)),
        None => (verb, None),
    };

    let inflected = match head {
        "be" => "is".to_string(),
        "have" => "has".to_string(),
        _ => add_s(head),
    };

    match rest {
        Some(rest) => format!("{} {}", inflected, rest),
        None => inflected,
    }
}

/// Regular English plural of the last word ("ice cream" -> "ice creams")
fn english_plural(noun: &str) -> String {
    match noun.rsplit_once(' ') {
        Some((head, last)) => format!("{} {}", head, add_s(last)),
        None => add_s(noun),
    }
}

fn add_s(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }
    let ends_with_any = |suffixes: &[&str]| suffixes.iter().any(|s| word.ends_with(s));

    if ends_with_any(&["s", "sh", "ch", "x", "z", "o"]) {
        return format!("{}es", word);
    }
    let mut chars = word.chars().rev();
    if let (Some('y'), Some(prev)) = (chars.next(), chars.next()) {
        if !"aeiou".contains(prev) {
            return format!("{}ies", &word[..word.len() - 1]);
        }
    }
    format!("{}s", word)
}
