//! Error types shared across the practice workflows.

use reqwest::StatusCode;
use thiserror::Error;

use crate::recorder::RecordingPhase;

/// Failures talking to a practice backend
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{endpoint} returned {status}: {message}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
        message: String,
    },
    #[error("invalid response from {endpoint}: {reason}")]
    InvalidResponse {
        endpoint: &'static str,
        reason: String,
    },
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Http(e) => e.status(),
            ApiError::InvalidResponse { .. } => None,
        }
    }

    /// Transport failures, 429 and 5xx are worth another attempt; other 4xx
    /// and undecodable bodies are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            ApiError::Status { status, .. } => {
                *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
            }
            ApiError::InvalidResponse { .. } => false,
        }
    }

    /// Text suitable for showing next to the control that triggered the call
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Http(_) => "Could not reach the server. Please try again.".to_string(),
            ApiError::Status { message, .. } if !message.is_empty() => message.clone(),
            ApiError::Status { status, .. } => format!("Server error ({})", status),
            ApiError::InvalidResponse { .. } => "The server sent an unexpected response.".to_string(),
        }
    }
}

/// Errors emitted by the flashcard session controller
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no CEFR level selected")]
    MissingLevel,
    #[error("no part of speech selected")]
    MissingPartOfSpeech,
    #[error("card count {0} is outside 1-50")]
    CardCountOutOfRange(u32),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl SessionError {
    /// Validation errors are caught before any request is issued
    pub fn is_validation(&self) -> bool {
        !matches!(self, SessionError::Api(_))
    }
}

/// Errors emitted by the recording state machine
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RecorderError {
    #[error("recorder is busy ({0:?})")]
    Busy(RecordingPhase),
    #[error("microphone access denied: {0}")]
    PermissionDenied(String),
    #[error("audio device error: {0}")]
    Device(String),
    #[error("nothing was recorded")]
    EmptyRecording,
    #[error("pronunciation check failed: {0}")]
    Scoring(#[from] ApiError),
}

/// Errors emitted by kana practice
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KanaError {
    #[error("answer is empty")]
    EmptyAnswer,
    #[error("drawing is empty")]
    EmptyDrawing,
    #[error("no kana prompt yet")]
    NoPrompt,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted by the vocabulary import workflow
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ImportError {
    #[error("word category is required")]
    EmptyCategory,
    #[error("no generated words to import")]
    NothingToImport,
    #[error("words are already generated; import or cancel first")]
    AlreadyGenerated,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted by the travel game
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TravelError {
    #[error("at least one activity must be selected")]
    NoActivities,
    #[error("custom activity is selected but empty")]
    EmptyCustomActivity,
    #[error(transparent)]
    Api(#[from] ApiError),
}
