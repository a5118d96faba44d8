//! Generate-review-import workflow for new Japanese vocabulary groups.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::error::ImportError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordPart {
    pub kanji: String,
    pub romaji: String,
}

/// A generated word awaiting review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedWord {
    pub kanji: String,
    pub romaji: String,
    pub english: String,
    #[serde(default)]
    pub parts: Vec<WordPart>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImportReceipt {
    pub message: String,
}

#[derive(Debug, Default)]
enum Stage {
    #[default]
    Empty,
    Generated {
        category: String,
        words: Vec<ImportedWord>,
    },
}

/// `Empty -> Generated -> (import | cancel) -> Empty`
#[derive(Debug, Default)]
pub struct ImportWorkflow {
    stage: Stage,
    last_error: Option<String>,
}

impl ImportWorkflow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Words waiting for review, if any
    pub fn words(&self) -> Option<&[ImportedWord]> {
        match &self.stage {
            Stage::Empty => None,
            Stage::Generated { words, .. } => Some(words),
        }
    }

    pub fn category(&self) -> Option<&str> {
        match &self.stage {
            Stage::Empty => None,
            Stage::Generated { category, .. } => Some(category),
        }
    }

    /// Message from the last failed call, cleared by the next attempt
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub async fn generate(
        &mut self,
        client: &ApiClient,
        category: &str,
    ) -> Result<&[ImportedWord], ImportError> {
        if matches!(self.stage, Stage::Generated { .. }) {
            return Err(ImportError::AlreadyGenerated);
        }
        let category = category.trim();
        if category.is_empty() {
            return Err(ImportError::EmptyCategory);
        }

        self.last_error = None;
        let words = match client.get_new_words(category).await {
            Ok(words) => words,
            Err(e) => {
                warn!("Word generation for '{}' failed: {}", category, e);
                self.last_error = Some(e.user_message());
                return Err(e.into());
            }
        };

        info!("Generated {} words for '{}'", words.len(), category);
        self.stage = Stage::Generated {
            category: category.to_string(),
            words,
        };
        Ok(self.words().unwrap_or_default())
    }

    /// Send the reviewed words. Failure keeps them for another try.
    pub async fn import(&mut self, client: &ApiClient) -> Result<ImportReceipt, ImportError> {
        let Stage::Generated { words, .. } = &self.stage else {
            return Err(ImportError::NothingToImport);
        };

        self.last_error = None;
        match client.import_words(words).await {
            Ok(receipt) => {
                info!("{}", receipt.message);
                self.stage = Stage::Empty;
                Ok(receipt)
            }
            Err(e) => {
                warn!("Import failed: {}", e);
                self.last_error = Some(e.user_message());
                Err(e.into())
            }
        }
    }

    pub fn cancel(&mut self) {
        self.stage = Stage::Empty;
        self.last_error = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use wiremock::{
        matchers::{body_json, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn mountain() -> serde_json::Value {
        serde_json::json!({
            "kanji": "山",
            "romaji": "yama",
            "english": "mountain",
            "parts": [{"kanji": "山", "romaji": "yama"}]
        })
    }

    fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::new(&Config::with_base_url(&server.uri())).expect("client")
    }

    #[tokio::test]
    async fn test_blank_category_issues_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut workflow = ImportWorkflow::new();
        let err = workflow
            .generate(&client_for(&server), "   ")
            .await
            .unwrap_err();

        assert!(matches!(err, ImportError::EmptyCategory));
        assert!(workflow.words().is_none());
    }

    #[tokio::test]
    async fn test_generate_then_import() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/get_new_words"))
            .and(body_json(serde_json::json!({"word_category": "nature"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([mountain()])))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/import_words"))
            .and(body_json(serde_json::json!({"words": [mountain()]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "Successfully imported 1 words"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut workflow = ImportWorkflow::new();

        let words = workflow.generate(&client, " nature ").await.expect("words");
        assert_eq!(words[0].parts[0].romaji, "yama");
        assert_eq!(workflow.category(), Some("nature"));

        let receipt = workflow.import(&client).await.expect("receipt");
        assert_eq!(receipt.message, "Successfully imported 1 words");
        assert!(workflow.words().is_none());
    }

    #[tokio::test]
    async fn test_failed_import_keeps_words() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/get_new_words"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([mountain()])))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/api/import_words"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "error": "database is locked"
            })))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut workflow = ImportWorkflow::new();
        workflow.generate(&client, "nature").await.expect("words");

        assert!(workflow.import(&client).await.is_err());
        assert_eq!(workflow.words().map(|w| w.len()), Some(1));
        assert_eq!(workflow.last_error(), Some("database is locked"));

        workflow.cancel();
        assert!(workflow.words().is_none());
        assert!(workflow.last_error().is_none());
    }

    #[tokio::test]
    async fn test_import_requires_generated_words() {
        let server = MockServer::start().await;
        let mut workflow = ImportWorkflow::new();

        let err = workflow.import(&client_for(&server)).await.unwrap_err();
        assert!(matches!(err, ImportError::NothingToImport));
    }

    #[tokio::test]
    async fn test_second_generate_rejected_until_resolved() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/get_new_words"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([mountain()])))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let mut workflow = ImportWorkflow::new();
        workflow.generate(&client, "nature").await.expect("words");

        let err = workflow.generate(&client, "food").await.unwrap_err();
        assert!(matches!(err, ImportError::AlreadyGenerated));
    }
}
