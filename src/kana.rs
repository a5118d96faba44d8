//! Kana writing practice: reading drills and drawing verification.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

use crate::api::ApiClient;
use crate::error::KanaError;
use crate::vocabulary::ParseError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KanaType {
    #[default]
    Hiragana,
    Katakana,
}

impl KanaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KanaType::Hiragana => "hiragana",
            KanaType::Katakana => "katakana",
        }
    }

    pub fn toggled(&self) -> KanaType {
        match self {
            KanaType::Hiragana => KanaType::Katakana,
            KanaType::Katakana => KanaType::Hiragana,
        }
    }
}

impl fmt::Display for KanaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KanaType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hiragana" => Ok(KanaType::Hiragana),
            "katakana" => Ok(KanaType::Katakana),
            other => Err(ParseError::KanaType(other.to_string())),
        }
    }
}

/// A kana character and its romaji reading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KanaPrompt {
    pub kana: String,
    pub romaji: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct KanaVerdict {
    pub success: bool,
    /// Character the recogniser read from the drawing
    #[serde(default)]
    pub recognized: String,
}

/// Body of `POST /api/writing-practice/verify-kana`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyKanaRequest {
    pub image: String,
    pub expected_kana: String,
    pub expected_romaji: String,
    pub kana_type: KanaType,
}

impl VerifyKanaRequest {
    pub fn new(png: &[u8], prompt: &KanaPrompt, kana_type: KanaType) -> Result<Self, KanaError> {
        if png.is_empty() {
            return Err(KanaError::EmptyDrawing);
        }

        Ok(Self {
            image: png_data_url(png),
            expected_kana: prompt.kana.clone(),
            expected_romaji: prompt.romaji.clone(),
            kana_type,
        })
    }
}

/// `data:image/png;base64,...`
pub fn png_data_url(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

/// Compare a typed romaji answer, ignoring case and surrounding whitespace
pub fn check_romaji_answer(prompt: &KanaPrompt, answer: &str) -> Result<bool, KanaError> {
    let answer = answer.trim();
    if answer.is_empty() {
        return Err(KanaError::EmptyAnswer);
    }
    Ok(answer.eq_ignore_ascii_case(prompt.romaji.trim()))
}

/// One practice run over random kana of a single script
#[derive(Debug, Clone, Default)]
pub struct KanaDrill {
    kana_type: KanaType,
    current: Option<KanaPrompt>,
    correct: u32,
    attempts: u32,
}

impl KanaDrill {
    pub fn new(kana_type: KanaType) -> Self {
        Self {
            kana_type,
            ..Self::default()
        }
    }

    pub fn kana_type(&self) -> KanaType {
        self.kana_type
    }

    /// Switch script; the current prompt belongs to the old one and is dropped
    pub fn set_kana_type(&mut self, kana_type: KanaType) {
        if self.kana_type != kana_type {
            self.kana_type = kana_type;
            self.current = None;
        }
    }

    pub fn current(&self) -> Option<&KanaPrompt> {
        self.current.as_ref()
    }

    /// (correct, attempts)
    pub fn score(&self) -> (u32, u32) {
        (self.correct, self.attempts)
    }

    pub async fn next_prompt(&mut self, client: &ApiClient) -> Result<&KanaPrompt, KanaError> {
        let prompt = client.random_kana(self.kana_type).await?;
        debug!("New {} prompt: {}", self.kana_type, prompt.kana);
        Ok(self.current.insert(prompt))
    }

    /// Reading drill: kana shown, romaji typed
    pub fn answer_romaji(&mut self, answer: &str) -> Result<bool, KanaError> {
        let Some(prompt) = self.current.as_ref() else {
            return Err(KanaError::NoPrompt);
        };

        let correct = check_romaji_answer(prompt, answer)?;
        self.record(correct);
        Ok(correct)
    }

    /// Writing drill: romaji shown, kana drawn and sent for recognition
    pub async fn submit_drawing(
        &mut self,
        client: &ApiClient,
        png: &[u8],
    ) -> Result<KanaVerdict, KanaError> {
        let Some(prompt) = self.current.as_ref() else {
            return Err(KanaError::NoPrompt);
        };

        let request = VerifyKanaRequest::new(png, prompt, self.kana_type)?;
        let verdict = client.verify_kana(&request).await?;
        info!(
            "Drawing for '{}' recognised as '{}' (success: {})",
            prompt.romaji, verdict.recognized, verdict.success
        );
        self.record(verdict.success);
        Ok(verdict)
    }

    fn record(&mut self, correct: bool) {
        self.attempts += 1;
        if correct {
            self.correct += 1;
        }
    }
}
