//! HTTP client for the two practice backends.
//!
//! The reiseabenteuer backend serves vocabulary, pronunciation scoring, image
//! generation and destinations; the lang-portal backend serves kana practice
//! and vocabulary import. Background lookups and image generation are retried
//! on transient failures. Word loads the learner asked for, scoring, drawing
//! checks and imports are sent exactly once.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::ApiError;
use crate::importer::{ImportReceipt, ImportedWord};
use crate::kana::{KanaPrompt, KanaType, KanaVerdict, VerifyKanaRequest};
use crate::recorder::PronunciationVerdict;
use crate::retry::{with_retry_if, RetryConfig};
use crate::travel::Destination;
use crate::vocabulary::{CefrLevel, PartOfSpeech, VocabularyResponse, WordEntry};

const VOCABULARY_ENDPOINT: &str = "vocabulary/words";
const CHECK_RECORDING_ENDPOINT: &str = "check_recording";
const GENERATE_IMAGE_ENDPOINT: &str = "images/generate_image";
const DESTINATIONS_ENDPOINT: &str = "destinations";
const RANDOM_KANA_ENDPOINT: &str = "writing-practice/random-kana";
const VERIFY_KANA_ENDPOINT: &str = "writing-practice/verify-kana";
const NEW_WORDS_ENDPOINT: &str = "get_new_words";
const IMPORT_WORDS_ENDPOINT: &str = "import_words";

/// Body of `POST /images/generate_image`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageRequest {
    pub phrase: String,
    pub cefr_level: CefrLevel,
    pub part_of_speech: PartOfSpeech,
    pub force_regenerate: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GeneratedImage {
    pub image_path: String,
    #[serde(default)]
    pub is_new: bool,
}

#[derive(Debug, Serialize)]
struct PronunciationRequest<'a> {
    audio_data: &'a str,
    expected_text: &'a str,
}

#[derive(Debug, Serialize)]
struct DestinationsRequest<'a> {
    activities: &'a [String],
}

#[derive(Debug, Deserialize)]
struct RawKana {
    kana: Option<String>,
    romaji: Option<String>,
}

#[derive(Debug, Serialize)]
struct NewWordsRequest<'a> {
    word_category: &'a str,
}

#[derive(Debug, Serialize)]
struct ImportWordsRequest<'a> {
    words: &'a [ImportedWord],
}

/// Error payloads: FastAPI sends `{"detail": ...}`, Flask sends `{"error": ...}`
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
    error: Option<String>,
}

/// Client for both practice backends
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    reise_url: String,
    portal_url: String,
    lookup_retry: RetryConfig,
    image_retry: RetryConfig,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(config.request_timeout).build()?;

        Ok(Self {
            http,
            reise_url: config.reise_api_url.clone(),
            portal_url: config.portal_api_url.clone(),
            lookup_retry: RetryConfig::lookup(),
            image_retry: RetryConfig::image_generation(),
        })
    }

    /// Override the retry policies (lookups, image generation)
    pub fn with_retry(mut self, lookup: RetryConfig, image: RetryConfig) -> Self {
        self.lookup_retry = lookup;
        self.image_retry = image;
        self
    }

    fn reise(&self, endpoint: &str) -> String {
        format!("{}/{}", self.reise_url, endpoint)
    }

    fn portal(&self, endpoint: &str) -> String {
        format!("{}/api/{}", self.portal_url, endpoint)
    }

    /// `GET /vocabulary/words?cefr_level&part_of_speech&limit`, sent once
    pub async fn fetch_words(
        &self,
        level: CefrLevel,
        part_of_speech: PartOfSpeech,
        limit: u32,
    ) -> Result<Vec<WordEntry>, ApiError> {
        self.fetch_words_with(&RetryConfig::once(), level, part_of_speech, limit)
            .await
    }

    /// Nouns for adjective agreement. Retried like the other lookups, since
    /// the card falls back to a bare adjective anyway.
    pub async fn fetch_noun_pool(
        &self,
        level: CefrLevel,
        limit: u32,
    ) -> Result<Vec<WordEntry>, ApiError> {
        self.fetch_words_with(&self.lookup_retry, level, PartOfSpeech::Noun, limit)
            .await
    }

    async fn fetch_words_with(
        &self,
        retry: &RetryConfig,
        level: CefrLevel,
        part_of_speech: PartOfSpeech,
        limit: u32,
    ) -> Result<Vec<WordEntry>, ApiError> {
        let url = self.reise(VOCABULARY_ENDPOINT);
        let limit = limit.to_string();
        let query = [
            ("cefr_level", level.as_str()),
            ("part_of_speech", part_of_speech.as_str()),
            ("limit", limit.as_str()),
        ];

        let response: VocabularyResponse = with_retry_if(
            retry,
            "Vocabulary lookup",
            || async {
                let response = self.http.get(&url).query(&query).send().await?;
                decode(VOCABULARY_ENDPOINT, response).await
            },
            ApiError::is_retryable,
        )
        .await?;

        info!(
            "Fetched {} {} words at level {}",
            response.vocabulary_words.len(),
            part_of_speech,
            level
        );
        Ok(response.vocabulary_words)
    }

    /// `POST /check_recording` with base64 audio. Never retried.
    pub async fn check_recording(
        &self,
        audio_data: &str,
        expected_text: &str,
    ) -> Result<PronunciationVerdict, ApiError> {
        debug!(
            "Submitting {} bytes of encoded audio for '{}'",
            audio_data.len(),
            expected_text
        );

        let url = self.reise(CHECK_RECORDING_ENDPOINT);
        with_retry_if(
            &RetryConfig::once(),
            "Pronunciation check",
            || async {
                let response = self
                    .http
                    .post(&url)
                    .json(&PronunciationRequest {
                        audio_data,
                        expected_text,
                    })
                    .send()
                    .await?;
                decode(CHECK_RECORDING_ENDPOINT, response).await
            },
            ApiError::is_retryable,
        )
        .await
    }

    /// `POST /images/generate_image`
    pub async fn generate_image(&self, request: &ImageRequest) -> Result<GeneratedImage, ApiError> {
        let url = self.reise(GENERATE_IMAGE_ENDPOINT);

        let image: GeneratedImage = with_retry_if(
            &self.image_retry,
            "Image generation",
            || async {
                let response = self.http.post(&url).json(request).send().await?;
                decode(GENERATE_IMAGE_ENDPOINT, response).await
            },
            ApiError::is_retryable,
        )
        .await?;

        debug!(
            "Image for '{}' at {} (new: {})",
            request.phrase, image.image_path, image.is_new
        );
        Ok(image)
    }

    /// `POST /destinations`
    pub async fn find_destinations(&self, activities: &[String]) -> Result<Vec<Destination>, ApiError> {
        let url = self.reise(DESTINATIONS_ENDPOINT);

        with_retry_if(
            &self.lookup_retry,
            "Destination search",
            || async {
                let response = self
                    .http
                    .post(&url)
                    .json(&DestinationsRequest { activities })
                    .send()
                    .await?;
                decode(DESTINATIONS_ENDPOINT, response).await
            },
            ApiError::is_retryable,
        )
        .await
    }

    /// `GET /api/writing-practice/random-kana?type=`
    pub async fn random_kana(&self, kana_type: KanaType) -> Result<KanaPrompt, ApiError> {
        let url = self.portal(RANDOM_KANA_ENDPOINT);

        let raw: RawKana = with_retry_if(
            &self.lookup_retry,
            "Random kana",
            || async {
                let response = self
                    .http
                    .get(&url)
                    .query(&[("type", kana_type.as_str())])
                    .send()
                    .await?;
                decode(RANDOM_KANA_ENDPOINT, response).await
            },
            ApiError::is_retryable,
        )
        .await?;

        match (raw.kana, raw.romaji) {
            (Some(kana), Some(romaji)) if !kana.is_empty() && !romaji.is_empty() => {
                Ok(KanaPrompt { kana, romaji })
            }
            _ => Err(ApiError::InvalidResponse {
                endpoint: RANDOM_KANA_ENDPOINT,
                reason: "missing kana or romaji".to_string(),
            }),
        }
    }

    /// `POST /api/writing-practice/verify-kana`. Never retried.
    pub async fn verify_kana(&self, request: &VerifyKanaRequest) -> Result<KanaVerdict, ApiError> {
        let url = self.portal(VERIFY_KANA_ENDPOINT);
        with_retry_if(
            &RetryConfig::once(),
            "Kana verification",
            || async {
                let response = self.http.post(&url).json(request).send().await?;
                decode(VERIFY_KANA_ENDPOINT, response).await
            },
            ApiError::is_retryable,
        )
        .await
    }

    /// `POST /api/get_new_words`. Never retried: each call runs the generator.
    pub async fn get_new_words(&self, word_category: &str) -> Result<Vec<ImportedWord>, ApiError> {
        let url = self.portal(NEW_WORDS_ENDPOINT);
        with_retry_if(
            &RetryConfig::once(),
            "Word generation",
            || async {
                let response = self
                    .http
                    .post(&url)
                    .json(&NewWordsRequest { word_category })
                    .send()
                    .await?;
                decode(NEW_WORDS_ENDPOINT, response).await
            },
            ApiError::is_retryable,
        )
        .await
    }

    /// `POST /api/import_words`. Never retried, to avoid double imports.
    pub async fn import_words(&self, words: &[ImportedWord]) -> Result<ImportReceipt, ApiError> {
        let url = self.portal(IMPORT_WORDS_ENDPOINT);
        with_retry_if(
            &RetryConfig::once(),
            "Word import",
            || async {
                let response = self
                    .http
                    .post(&url)
                    .json(&ImportWordsRequest { words })
                    .send()
                    .await?;
                decode(IMPORT_WORDS_ENDPOINT, response).await
            },
            ApiError::is_retryable,
        )
        .await
    }
}

async fn decode<T: DeserializeOwned>(
    endpoint: &'static str,
    response: reqwest::Response,
) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
        return Err(ApiError::Status {
            endpoint,
            status,
            message: error_message(&body),
        });
    }

    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| ApiError::InvalidResponse {
        endpoint,
        reason: e.to_string(),
    })
}

fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody { error: Some(error), .. }) => error,
        Ok(ErrorBody {
            detail: Some(serde_json::Value::String(detail)),
            ..
        }) => detail,
        Ok(ErrorBody {
            detail: Some(detail),
            ..
        }) => detail.to_string(),
        _ => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::{
        matchers::{body_json, method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    fn client_for(server: &MockServer) -> ApiClient {
        let fast = RetryConfig::new(3, Duration::from_millis(5));
        ApiClient::new(&Config::with_base_url(&server.uri()))
            .expect("client")
            .with_retry(fast.clone(), fast)
    }

    // ==================== Vocabulary ====================

    #[tokio::test]
    async fn test_fetch_words_sends_filters() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/vocabulary/words"))
            .and(query_param("cefr_level", "B1"))
            .and(query_param("part_of_speech", "verb"))
            .and(query_param("limit", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "vocabulary_words": [
                    {"german_word": "gehen", "english_word": "to go", "part_of_speech": "verb"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let words = client_for(&server)
            .fetch_words(CefrLevel::B1, PartOfSpeech::Verb, 5)
            .await
            .expect("should fetch");

        assert_eq!(words.len(), 1);
        assert_eq!(words[0].german_word, "gehen");
    }

    #[tokio::test]
    async fn test_fetch_words_sends_once_on_server_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/vocabulary/words"))
            .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({
                "detail": "Vocabulary database is not available"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_words(CefrLevel::A1, PartOfSpeech::Verb, 10)
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(reqwest::StatusCode::SERVICE_UNAVAILABLE));
        assert_eq!(err.user_message(), "Vocabulary database is not available");
    }

    #[tokio::test]
    async fn test_noun_pool_retries_server_errors() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/vocabulary/words"))
            .and(query_param("part_of_speech", "noun"))
            .and(query_param("limit", "20"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let result = client_for(&server).fetch_noun_pool(CefrLevel::A1, 20).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_fetch_words_does_not_retry_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/vocabulary/words"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "detail": "No vocabulary words found for nouns at c2 level"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_words(CefrLevel::C2, PartOfSpeech::Noun, 10)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("No vocabulary words found"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_invalid_response() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/vocabulary/words"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch_words(CefrLevel::A2, PartOfSpeech::Adjective, 10)
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::InvalidResponse { .. }));
    }

    // ==================== Pronunciation ====================

    #[tokio::test]
    async fn test_check_recording_posts_payload_once() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/check_recording"))
            .and(body_json(serde_json::json!({
                "audio_data": "AAEC",
                "expected_text": "wir gehen"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "is_correct": true,
                "transcribed_text": "wir gehen",
                "confidence": 0.87
            })))
            .expect(1)
            .mount(&server)
            .await;

        let verdict = client_for(&server)
            .check_recording("AAEC", "wir gehen")
            .await
            .expect("should score");

        assert!(verdict.is_correct);
        assert_eq!(verdict.transcribed_text, "wir gehen");
        assert!((verdict.confidence - 0.87).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_check_recording_is_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/check_recording"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let result = client_for(&server).check_recording("AA==", "ich").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_import_words_is_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/import_words"))
            .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({
                "error": "Database is busy"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server).import_words(&[]).await.unwrap_err();
        assert_eq!(err.user_message(), "Database is busy");
    }

    // ==================== Images ====================

    #[tokio::test]
    async fn test_generate_image_serializes_request() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/images/generate_image"))
            .and(body_json(serde_json::json!({
                "phrase": "the dog",
                "cefr_level": "A1",
                "part_of_speech": "noun",
                "force_regenerate": true
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "image_path": "pictures/A1/noun/the_dog_1234abcd.jpg",
                "is_new": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let image = client_for(&server)
            .generate_image(&ImageRequest {
                phrase: "the dog".to_string(),
                cefr_level: CefrLevel::A1,
                part_of_speech: PartOfSpeech::Noun,
                force_regenerate: true,
            })
            .await
            .expect("should generate");

        assert_eq!(image.image_path, "pictures/A1/noun/the_dog_1234abcd.jpg");
        assert!(image.is_new);
    }

    // ==================== Kana ====================

    #[tokio::test]
    async fn test_random_kana_rejects_incomplete_payload() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/writing-practice/random-kana"))
            .and(query_param("type", "katakana"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "kana": "カ"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .random_kana(KanaType::Katakana)
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::InvalidResponse { .. }));
    }

    // ==================== Error Bodies ====================

    #[test]
    fn test_error_message_variants() {
        assert_eq!(error_message(r#"{"error": "Word category is required"}"#), "Word category is required");
        assert_eq!(error_message(r#"{"detail": "Invalid CEFR level"}"#), "Invalid CEFR level");
        assert!(error_message(r#"{"detail": [{"loc": ["body"]}]}"#).contains("loc"));
        assert_eq!(error_message("  plain text \n"), "plain text");
    }
}
