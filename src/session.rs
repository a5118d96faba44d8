//! Flashcard practice session.
//!
//! Owns the filter config, the loaded word list and the derived per-card
//! display. Async work is split into `begin_*` / `finish_*` pairs so that a
//! completion arriving after the user moved on can be recognised and dropped:
//! word loads carry a `RequestToken`, per-card fetches carry the card epoch.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, GeneratedImage, ImageRequest};
use crate::config::{Config, MAX_CARD_COUNT, MIN_CARD_COUNT};
use crate::error::{ApiError, SessionError};
use crate::formatter::{format_word, Phrase};
use crate::i18n::Language;
use crate::recorder::PronunciationVerdict;
use crate::vocabulary::{CefrLevel, ParseError, PartOfSpeech, WordEntry};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PracticeMode {
    /// Masked phrase plus an illustrative image
    #[default]
    Identification,
    /// Spoken answer scored against the phrase
    Pronunciation,
}

impl PracticeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PracticeMode::Identification => "identification",
            PracticeMode::Pronunciation => "pronunciation",
        }
    }
}

impl fmt::Display for PracticeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PracticeMode {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "identification" | "identify" | "id" => Ok(PracticeMode::Identification),
            "pronunciation" | "speak" => Ok(PracticeMode::Pronunciation),
            other => Err(ParseError::PracticeMode(other.to_string())),
        }
    }
}

/// User-chosen filters and modes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub prompt_language: Language,
    pub card_count: u32,
    pub level: Option<CefrLevel>,
    pub part_of_speech: Option<PartOfSpeech>,
    pub practice_mode: PracticeMode,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            prompt_language: Language::English,
            card_count: 10,
            level: None,
            part_of_speech: None,
            practice_mode: PracticeMode::Identification,
        }
    }
}

impl SessionConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            prompt_language: config.prompt_language,
            card_count: config.default_card_count,
            level: config.default_level,
            ..Self::default()
        }
    }

    /// All three filters must be set and the count within bounds
    pub fn validate(&self) -> Result<(CefrLevel, PartOfSpeech, u32), SessionError> {
        let level = self.level.ok_or(SessionError::MissingLevel)?;
        let part_of_speech = self.part_of_speech.ok_or(SessionError::MissingPartOfSpeech)?;
        if !(MIN_CARD_COUNT..=MAX_CARD_COUNT).contains(&self.card_count) {
            return Err(SessionError::CardCountOutOfRange(self.card_count));
        }
        Ok((level, part_of_speech, self.card_count))
    }
}

/// Monotonic id of one word-list request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    Loading { token: RequestToken },
    Loaded { words: Vec<WordEntry>, index: usize },
    Failed { error: String },
}

/// An issued word-list request: what to fetch and the token to finish it with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub token: RequestToken,
    pub level: CefrLevel,
    pub part_of_speech: PartOfSpeech,
    pub limit: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(usize),
    /// A newer request superseded this one; the response was dropped
    Stale,
}

/// Identifies the card a per-card fetch was issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardTicket(u64);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ImageState {
    #[default]
    Empty,
    Pending,
    Ready { path: String },
    Failed { message: String },
}

/// A pending image request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTicket {
    pub card: CardTicket,
    pub request: ImageRequest,
}

/// A pending auxiliary-noun request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NounTicket {
    pub card: CardTicket,
    pub level: CefrLevel,
    pub pool: u32,
}

/// One scored pronunciation attempt
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    pub expected: String,
    pub verdict: PronunciationVerdict,
    pub checked_at: DateTime<Utc>,
}

/// What the front end renders for the current card
#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    pub position: usize,
    pub total: usize,
    pub part_of_speech: PartOfSpeech,
    pub phrase: String,
    pub revealed: bool,
    pub translation: Option<String>,
    pub auxiliary_noun: Option<String>,
    pub pronunciation: Option<PronunciationVerdict>,
    pub image: ImageState,
    pub mode: PracticeMode,
}

#[derive(Hash, PartialEq, Eq)]
struct ImageKey {
    phrase: String,
    level: CefrLevel,
    part_of_speech: PartOfSpeech,
}

/// Per-card data, rebuilt on every card change
#[derive(Debug, Clone)]
struct CardDisplay {
    phrase: Phrase,
    noun: Option<WordEntry>,
    pronunciation: Option<PronunciationVerdict>,
    image: ImageState,
    revealed: bool,
    translation_visible: bool,
}

pub struct Session<R = StdRng> {
    defaults: SessionConfig,
    config: SessionConfig,
    state: SessionState,
    display: Option<CardDisplay>,
    last_token: u64,
    epoch: u64,
    noun_pool: u32,
    image_cache: HashMap<ImageKey, String>,
    history: Vec<Attempt>,
    rng: R,
}

impl Session<StdRng> {
    pub fn new(config: SessionConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }
}

impl<R: Rng> Session<R> {
    /// Session drawing its pronoun and number choices from `rng`
    pub fn with_rng(config: SessionConfig, rng: R) -> Self {
        Self {
            defaults: config.clone(),
            config,
            state: SessionState::Idle,
            display: None,
            last_token: 0,
            epoch: 0,
            noun_pool: 20,
            image_cache: HashMap::new(),
            history: Vec::new(),
            rng,
        }
    }

    /// How many nouns to fetch when picking an auxiliary noun
    pub fn with_noun_pool(mut self, pool: u32) -> Self {
        self.noun_pool = pool.clamp(MIN_CARD_COUNT, MAX_CARD_COUNT);
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn history(&self) -> &[Attempt] {
        &self.history
    }

    // ==================== Config ====================

    pub fn set_card_count(&mut self, count: u32) {
        self.config.card_count = count;
    }

    pub fn set_part_of_speech(&mut self, part_of_speech: PartOfSpeech) {
        self.config.part_of_speech = Some(part_of_speech);
    }

    pub fn set_prompt_language(&mut self, language: Language) {
        self.config.prompt_language = language;
    }

    /// Switching mode starts the current card over
    pub fn set_practice_mode(&mut self, mode: PracticeMode) {
        if self.config.practice_mode != mode {
            self.config.practice_mode = mode;
            self.rebuild_display();
        }
    }

    /// The auxiliary noun depends on the level, so the card is re-derived
    pub fn set_level(&mut self, level: CefrLevel) {
        if self.config.level != Some(level) {
            self.config.level = Some(level);
            self.rebuild_display();
        }
    }

    /// Back to the startup config with nothing loaded
    pub fn reset(&mut self) {
        self.config = self.defaults.clone();
        self.state = SessionState::Idle;
        self.display = None;
        self.epoch += 1;
        info!("Session reset");
    }

    // ==================== Loading ====================

    /// Validate the filters and issue a new request token. Any load still in
    /// flight becomes stale.
    pub fn begin_load(&mut self) -> Result<LoadTicket, SessionError> {
        let (level, part_of_speech, limit) = self.config.validate()?;

        self.last_token += 1;
        let token = RequestToken(self.last_token);
        self.state = SessionState::Loading { token };
        self.display = None;
        self.epoch += 1;

        debug!("Load {:?}: {} {} x{}", token, level, part_of_speech, limit);
        Ok(LoadTicket {
            token,
            level,
            part_of_speech,
            limit,
        })
    }

    pub fn finish_load(
        &mut self,
        token: RequestToken,
        result: Result<Vec<WordEntry>, ApiError>,
    ) -> Result<LoadOutcome, SessionError> {
        if self.state != (SessionState::Loading { token }) {
            debug!("Dropping response for superseded load {:?}", token);
            return Ok(LoadOutcome::Stale);
        }

        match result {
            Ok(mut words) => {
                words.truncate(self.config.card_count as usize);
                let count = words.len();
                info!("Loaded {} cards", count);
                self.state = SessionState::Loaded { words, index: 0 };
                self.rebuild_display();
                Ok(LoadOutcome::Loaded(count))
            }
            Err(e) => {
                warn!("Loading words failed: {}", e);
                self.state = SessionState::Failed {
                    error: e.user_message(),
                };
                Err(e.into())
            }
        }
    }

    /// Validate, fetch and install a new word list. The request is sent
    /// exactly once; a failure leaves the session `Failed`.
    pub async fn load_words(&mut self, client: &ApiClient) -> Result<LoadOutcome, SessionError> {
        let ticket = self.begin_load()?;
        let result = client
            .fetch_words(ticket.level, ticket.part_of_speech, ticket.limit)
            .await;
        self.finish_load(ticket.token, result)
    }

    // ==================== Navigation ====================

    pub fn current_word(&self) -> Option<&WordEntry> {
        match &self.state {
            SessionState::Loaded { words, index } => words.get(*index),
            _ => None,
        }
    }

    pub fn index(&self) -> Option<usize> {
        match self.state {
            SessionState::Loaded { index, .. } => Some(index),
            _ => None,
        }
    }

    /// Returns false at the last card
    pub fn next(&mut self) -> bool {
        self.move_by(1)
    }

    /// Returns false at the first card
    pub fn previous(&mut self) -> bool {
        self.move_by(-1)
    }

    fn move_by(&mut self, step: isize) -> bool {
        let SessionState::Loaded { words, index } = &mut self.state else {
            return false;
        };

        let Some(target) = index.checked_add_signed(step).filter(|t| *t < words.len()) else {
            return false;
        };

        *index = target;
        self.rebuild_display();
        true
    }

    fn rebuild_display(&mut self) {
        self.epoch += 1;
        let Some(word) = self.current_word().cloned() else {
            self.display = None;
            return;
        };

        let phrase = format_word(&word, None, &mut self.rng);
        self.display = Some(CardDisplay {
            phrase,
            noun: None,
            pronunciation: None,
            image: ImageState::Empty,
            revealed: false,
            translation_visible: false,
        });
    }

    // ==================== Display ====================

    /// Ticket for whatever per-card work is issued now
    pub fn card_ticket(&self) -> CardTicket {
        CardTicket(self.epoch)
    }

    fn is_current(&self, ticket: CardTicket) -> bool {
        ticket.0 == self.epoch && self.display.is_some()
    }

    pub fn toggle_reveal(&mut self) -> bool {
        self.display.as_mut().map_or(false, |d| {
            d.revealed = !d.revealed;
            d.revealed
        })
    }

    pub fn toggle_translation(&mut self) -> bool {
        self.display.as_mut().map_or(false, |d| {
            d.translation_visible = !d.translation_visible;
            d.translation_visible
        })
    }

    /// Unmasked German phrase of the current card, the text to pronounce
    pub fn expected_text(&self) -> Option<String> {
        self.display.as_ref().map(|d| d.phrase.text())
    }

    pub fn card(&self) -> Option<CardView> {
        let SessionState::Loaded { words, index } = &self.state else {
            return None;
        };
        let display = self.display.as_ref()?;
        let word = words.get(*index)?;

        let conceal =
            self.config.practice_mode == PracticeMode::Identification && !display.revealed;

        Some(CardView {
            position: index + 1,
            total: words.len(),
            part_of_speech: word.part_of_speech,
            phrase: display.phrase.display(conceal),
            revealed: display.revealed,
            translation: display
                .translation_visible
                .then(|| display.phrase.english.clone()),
            auxiliary_noun: display.noun.as_ref().map(|n| n.singular().to_string()),
            pronunciation: display.pronunciation.clone(),
            image: display.image.clone(),
            mode: self.config.practice_mode,
        })
    }

    /// Store a verdict for the card it was recorded on. Returns false if the
    /// user has since moved to another card.
    pub fn record_pronunciation(&mut self, ticket: CardTicket, verdict: PronunciationVerdict) -> bool {
        if !self.is_current(ticket) {
            debug!("Dropping pronunciation result for a previous card");
            return false;
        }
        let Some(display) = self.display.as_mut() else {
            return false;
        };

        self.history.push(Attempt {
            expected: display.phrase.text(),
            verdict: verdict.clone(),
            checked_at: Utc::now(),
        });
        display.pronunciation = Some(verdict);
        true
    }

    /// (correct, attempted)
    pub fn pronunciation_score(&self) -> (usize, usize) {
        let correct = self.history.iter().filter(|a| a.verdict.is_correct).count();
        (correct, self.history.len())
    }

    // ==================== Auxiliary Noun ====================

    /// `None` unless the current card is an adjective and a level is set
    pub fn begin_auxiliary_noun(&self) -> Option<NounTicket> {
        let word = self.current_word()?;
        if word.part_of_speech != PartOfSpeech::Adjective {
            return None;
        }
        Some(NounTicket {
            card: self.card_ticket(),
            level: self.config.level?,
            pool: self.noun_pool,
        })
    }

    /// Pick a noun from the fetched pool and re-format the card. Failures and
    /// empty pools leave the bare adjective.
    pub fn finish_auxiliary_noun(
        &mut self,
        ticket: NounTicket,
        result: Result<Vec<WordEntry>, ApiError>,
    ) -> bool {
        if !self.is_current(ticket.card) {
            debug!("Dropping auxiliary noun for a previous card");
            return false;
        }

        let noun = match result {
            Ok(nouns) => nouns.choose(&mut self.rng).cloned(),
            Err(e) => {
                warn!("Auxiliary noun lookup failed, showing bare adjective: {}", e);
                None
            }
        };

        let Some(word) = self.current_word().cloned() else {
            return false;
        };
        let phrase = format_word(&word, noun.as_ref(), &mut self.rng);
        if let Some(display) = self.display.as_mut() {
            display.phrase = phrase;
            display.noun = noun;
        }
        true
    }

    pub async fn refresh_auxiliary_noun(&mut self, client: &ApiClient) -> bool {
        let Some(ticket) = self.begin_auxiliary_noun() else {
            return false;
        };
        let result = client.fetch_noun_pool(ticket.level, ticket.pool).await;
        self.finish_auxiliary_noun(ticket, result)
    }

    // ==================== Images ====================

    /// Start an image request for the current card.
    ///
    /// Returns `None` outside identification mode, without a level, or when
    /// the cache already answered (unless `force`).
    pub fn begin_image(&mut self, force: bool) -> Option<ImageTicket> {
        if self.config.practice_mode != PracticeMode::Identification {
            return None;
        }
        let level = self.config.level?;
        let part_of_speech = self.current_word()?.part_of_speech;
        let card = self.card_ticket();
        let display = self.display.as_mut()?;

        let key = ImageKey {
            phrase: display.phrase.english.clone(),
            level,
            part_of_speech,
        };
        if !force {
            if let Some(path) = self.image_cache.get(&key) {
                debug!("Image cache hit for '{}'", key.phrase);
                display.image = ImageState::Ready { path: path.clone() };
                return None;
            }
        }

        display.image = ImageState::Pending;
        Some(ImageTicket {
            card,
            request: ImageRequest {
                phrase: key.phrase,
                cefr_level: level,
                part_of_speech,
                force_regenerate: force,
            },
        })
    }

    /// Successful images are cached even if the card has changed meanwhile
    pub fn finish_image(
        &mut self,
        ticket: ImageTicket,
        result: Result<GeneratedImage, ApiError>,
    ) -> bool {
        if let Ok(image) = &result {
            self.image_cache.insert(
                ImageKey {
                    phrase: ticket.request.phrase.clone(),
                    level: ticket.request.cefr_level,
                    part_of_speech: ticket.request.part_of_speech,
                },
                image.image_path.clone(),
            );
        }

        if !self.is_current(ticket.card) {
            debug!("Dropping image for a previous card");
            return false;
        }
        let Some(display) = self.display.as_mut() else {
            return false;
        };

        display.image = match result {
            Ok(image) => ImageState::Ready {
                path: image.image_path,
            },
            Err(e) => {
                warn!("Image generation for '{}' failed: {}", ticket.request.phrase, e);
                ImageState::Failed {
                    message: e.user_message(),
                }
            }
        };
        true
    }

    pub async fn refresh_image(&mut self, client: &ApiClient, force: bool) -> bool {
        let Some(ticket) = self.begin_image(force) else {
            return false;
        };
        let result = client.generate_image(&ticket.request).await;
        self.finish_image(ticket, result)
    }

    /// Card side effects after a transition: the auxiliary noun first, since
    /// the image prompt includes it, then the image.
    pub async fn prepare_card(&mut self, client: &ApiClient) {
        self.refresh_auxiliary_noun(client).await;
        self.refresh_image(client, false).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocabulary::{Gender, NounForms, PresentTense};
    use proptest::prelude::*;

    fn seeded(config: SessionConfig) -> Session<StdRng> {
        Session::with_rng(config, StdRng::seed_from_u64(7))
    }

    fn verb_config() -> SessionConfig {
        SessionConfig {
            level: Some(CefrLevel::B1),
            part_of_speech: Some(PartOfSpeech::Verb),
            card_count: 5,
            ..SessionConfig::default()
        }
    }

    fn nouns(n: usize) -> Vec<WordEntry> {
        (0..n)
            .map(|i| {
                let mut w = WordEntry::new(&format!("Wort{}", i), &format!("word {}", i), PartOfSpeech::Noun);
                w.gender = Some(Gender::Neuter);
                w
            })
            .collect()
    }

    fn loaded(words: Vec<WordEntry>, config: SessionConfig) -> Session<StdRng> {
        let mut session = seeded(config);
        let ticket = session.begin_load().expect("valid config");
        session.finish_load(ticket.token, Ok(words)).expect("loaded");
        session
    }

    fn api_failure() -> ApiError {
        ApiError::InvalidResponse {
            endpoint: "test",
            reason: "offline".to_string(),
        }
    }

    // ==================== Config ====================

    #[test]
    fn test_validate_requires_all_filters() {
        let mut config = SessionConfig::default();
        assert!(matches!(config.validate(), Err(SessionError::MissingLevel)));

        config.level = Some(CefrLevel::A1);
        assert!(matches!(config.validate(), Err(SessionError::MissingPartOfSpeech)));

        config.part_of_speech = Some(PartOfSpeech::Noun);
        config.card_count = 0;
        assert!(matches!(config.validate(), Err(SessionError::CardCountOutOfRange(0))));

        config.card_count = 51;
        assert!(matches!(config.validate(), Err(SessionError::CardCountOutOfRange(51))));

        config.card_count = 50;
        assert_eq!(
            config.validate().unwrap(),
            (CefrLevel::A1, PartOfSpeech::Noun, 50)
        );
    }

    #[test]
    fn test_invalid_config_issues_no_token() {
        let mut session = seeded(SessionConfig::default());
        assert!(session.begin_load().is_err());
        assert_eq!(session.state(), &SessionState::Idle);
    }

    #[test]
    fn test_reset_restores_defaults() {
        let mut session = loaded(nouns(3), verb_config());
        session.set_card_count(40);
        session.set_level(CefrLevel::C1);

        session.reset();
        assert_eq!(session.config(), &verb_config());
        assert_eq!(session.state(), &SessionState::Idle);
        assert!(session.card().is_none());
    }

    #[test]
    fn test_practice_mode_parse() {
        assert_eq!("Speak".parse::<PracticeMode>().unwrap(), PracticeMode::Pronunciation);
        assert_eq!("identification".parse::<PracticeMode>().unwrap(), PracticeMode::Identification);
        assert!("quiz".parse::<PracticeMode>().is_err());
    }

    // ==================== Loading ====================

    #[test]
    fn test_load_truncates_and_starts_at_zero() {
        let session = loaded(nouns(8), verb_config());
        match session.state() {
            SessionState::Loaded { words, index } => {
                assert_eq!(words.len(), 5);
                assert_eq!(*index, 0);
            }
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[test]
    fn test_stale_load_is_dropped() {
        let mut session = seeded(verb_config());
        let first = session.begin_load().unwrap();
        let second = session.begin_load().unwrap();
        assert!(second.token > first.token);

        let outcome = session.finish_load(second.token, Ok(nouns(2))).unwrap();
        assert_eq!(outcome, LoadOutcome::Loaded(2));

        let outcome = session.finish_load(first.token, Ok(nouns(5))).unwrap();
        assert_eq!(outcome, LoadOutcome::Stale);
        assert_eq!(session.card().unwrap().total, 2);
    }

    #[test]
    fn test_stale_failure_does_not_clobber_newer_load() {
        let mut session = seeded(verb_config());
        let first = session.begin_load().unwrap();
        let second = session.begin_load().unwrap();

        let outcome = session.finish_load(first.token, Err(api_failure())).unwrap();
        assert_eq!(outcome, LoadOutcome::Stale);
        assert_eq!(session.state(), &SessionState::Loading { token: second.token });
    }

    #[test]
    fn test_failed_load_leaves_no_words() {
        let mut session = seeded(verb_config());
        let ticket = session.begin_load().unwrap();

        assert!(session.finish_load(ticket.token, Err(api_failure())).is_err());
        assert!(matches!(session.state(), SessionState::Failed { .. }));
        assert!(session.current_word().is_none());
        assert!(!session.next());
    }

    // ==================== Navigation ====================

    #[test]
    fn test_navigation_clears_per_card_state() {
        let mut session = loaded(nouns(3), verb_config());
        let ticket = session.card_ticket();

        session.toggle_reveal();
        session.toggle_translation();
        assert!(session.record_pronunciation(
            ticket,
            PronunciationVerdict {
                is_correct: true,
                transcribed_text: "das wort0".to_string(),
                confidence: 0.9,
            },
        ));

        assert!(session.next());
        let card = session.card().unwrap();
        assert_eq!(card.position, 2);
        assert!(!card.revealed);
        assert!(card.translation.is_none());
        assert!(card.pronunciation.is_none());
        assert_eq!(card.image, ImageState::Empty);
        assert_eq!(session.pronunciation_score(), (1, 1));
    }

    #[test]
    fn test_boundaries_are_no_ops() {
        let mut session = loaded(nouns(2), verb_config());
        assert!(!session.previous());
        assert!(session.next());
        assert!(!session.next());
        assert_eq!(session.index(), Some(1));
    }

    proptest! {
        #[test]
        fn test_index_stays_in_bounds(len in 1usize..12, moves in prop::collection::vec(any::<bool>(), 0..60)) {
            let mut config = verb_config();
            config.card_count = 50;
            let mut session = loaded(nouns(len), config);

            for forward in moves {
                let before = session.index().unwrap();
                let moved = if forward { session.next() } else { session.previous() };
                let after = session.index().unwrap();

                prop_assert!(after < len);
                if !moved {
                    prop_assert_eq!(before, after);
                }
            }
        }
    }

    // ==================== Display ====================

    #[test]
    fn test_identification_masks_until_revealed() {
        let mut dog = WordEntry::new("Hund", "dog", PartOfSpeech::Noun);
        dog.gender = Some(Gender::Masculine);
        let mut session = loaded(vec![dog], verb_config());

        assert_eq!(session.card().unwrap().phrase, "Der ____");
        assert!(session.toggle_reveal());
        assert_eq!(session.card().unwrap().phrase, "Der Hund");

        assert!(session.toggle_translation());
        assert_eq!(session.card().unwrap().translation.as_deref(), Some("the dog"));
    }

    #[test]
    fn test_pronunciation_mode_shows_full_phrase() {
        let mut go = WordEntry::new("gehen", "to go", PartOfSpeech::Verb);
        go.present = Some(PresentTense {
            wir: Some("gehen".to_string()),
            ..PresentTense::default()
        });
        let mut config = verb_config();
        config.practice_mode = PracticeMode::Pronunciation;
        let session = loaded(vec![go], config);

        let card = session.card().unwrap();
        assert!(!card.phrase.contains('_'));
        assert_eq!(Some(card.phrase), session.expected_text());
    }

    #[test]
    fn test_pronunciation_for_previous_card_is_dropped() {
        let mut session = loaded(nouns(2), verb_config());
        let ticket = session.card_ticket();
        session.next();

        let kept = session.record_pronunciation(
            ticket,
            PronunciationVerdict {
                is_correct: false,
                transcribed_text: String::new(),
                confidence: 0.0,
            },
        );
        assert!(!kept);
        assert!(session.history().is_empty());
    }

    // ==================== Auxiliary Noun ====================

    fn adjective_session() -> Session<StdRng> {
        let mut config = verb_config();
        config.part_of_speech = Some(PartOfSpeech::Adjective);
        loaded(vec![WordEntry::new("gut", "good", PartOfSpeech::Adjective)], config)
    }

    #[test]
    fn test_noun_only_for_adjectives() {
        let session = loaded(nouns(1), verb_config());
        assert!(session.begin_auxiliary_noun().is_none());
        assert!(adjective_session().begin_auxiliary_noun().is_some());
    }

    #[test]
    fn test_noun_failure_falls_back_to_bare_adjective() {
        let mut session = adjective_session();
        let ticket = session.begin_auxiliary_noun().unwrap();

        assert!(session.finish_auxiliary_noun(ticket, Err(api_failure())));
        let card = session.card().unwrap();
        assert!(card.auxiliary_noun.is_none());
        assert_eq!(session.expected_text().as_deref(), Some("gut"));
    }

    #[test]
    fn test_noun_is_applied() {
        let mut session = adjective_session();
        let ticket = session.begin_auxiliary_noun().unwrap();

        let mut house = WordEntry::new("Haus", "house", PartOfSpeech::Noun);
        house.gender = Some(Gender::Neuter);
        house.nominative = Some(NounForms {
            singular: Some("Haus".to_string()),
            plural: Some("Häuser".to_string()),
        });

        assert!(session.finish_auxiliary_noun(ticket, Ok(vec![house])));
        let text = session.expected_text().unwrap();
        assert!(text == "Das gute Haus" || text == "Die guten Häuser", "got {}", text);
        assert_eq!(session.card().unwrap().auxiliary_noun.as_deref(), Some("Haus"));
    }

    #[test]
    fn test_noun_for_previous_level_is_dropped() {
        let mut session = adjective_session();
        let ticket = session.begin_auxiliary_noun().unwrap();
        session.set_level(CefrLevel::C1);

        assert!(!session.finish_auxiliary_noun(ticket, Ok(nouns(1))));
        assert!(session.card().unwrap().auxiliary_noun.is_none());
    }

    // ==================== Images ====================

    fn image(path: &str) -> GeneratedImage {
        GeneratedImage {
            image_path: path.to_string(),
            is_new: true,
        }
    }

    #[test]
    fn test_image_pending_then_ready() {
        let mut session = loaded(nouns(2), verb_config());
        let ticket = session.begin_image(false).unwrap();
        assert_eq!(session.card().unwrap().image, ImageState::Pending);
        assert_eq!(ticket.request.phrase, "the word 0");
        assert!(!ticket.request.force_regenerate);

        assert!(session.finish_image(ticket, Ok(image("pictures/a.jpg"))));
        assert_eq!(
            session.card().unwrap().image,
            ImageState::Ready {
                path: "pictures/a.jpg".to_string()
            }
        );
    }

    #[test]
    fn test_image_cache_and_force() {
        let mut session = loaded(nouns(2), verb_config());
        let ticket = session.begin_image(false).unwrap();
        session.finish_image(ticket, Ok(image("pictures/a.jpg")));

        session.next();
        session.previous();
        assert!(session.begin_image(false).is_none(), "cache should answer");
        assert!(matches!(session.card().unwrap().image, ImageState::Ready { .. }));

        let forced = session.begin_image(true).unwrap();
        assert!(forced.request.force_regenerate);
        assert_eq!(session.card().unwrap().image, ImageState::Pending);
    }

    #[test]
    fn test_image_for_previous_card_is_dropped_but_cached() {
        let mut session = loaded(nouns(2), verb_config());
        let ticket = session.begin_image(false).unwrap();
        session.next();

        assert!(!session.finish_image(ticket, Ok(image("pictures/a.jpg"))));
        assert_eq!(session.card().unwrap().image, ImageState::Empty);

        session.previous();
        assert!(session.begin_image(false).is_none());
    }

    #[test]
    fn test_image_failure_is_shown() {
        let mut session = loaded(nouns(1), verb_config());
        let ticket = session.begin_image(false).unwrap();

        session.finish_image(ticket, Err(api_failure()));
        assert!(matches!(session.card().unwrap().image, ImageState::Failed { .. }));
    }

    #[test]
    fn test_no_images_in_pronunciation_mode() {
        let mut session = loaded(nouns(1), verb_config());
        session.set_practice_mode(PracticeMode::Pronunciation);
        assert!(session.begin_image(false).is_none());
        assert!(session.begin_image(true).is_none());
    }
}
