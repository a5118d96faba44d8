//! Audio capture and pronunciation scoring.
//!
//! The recorder moves through `Idle -> Recording -> Checking -> Idle`. Only
//! one input stream is held at a time and it is released on every way out of
//! `Recording`, including errors and drop.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep, sleep_until, Instant};
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::error::{ApiError, RecorderError};

/// Chunk size used when replaying audio files
const FILE_CHUNK_BYTES: usize = 16 * 1024;

const PLACEHOLDERS: [&str; 5] = [
    "Microphone access denied",
    "No audio was recorded",
    "A recording is already in progress",
    "Recording failed",
    "Error checking pronunciation",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingPhase {
    Idle,
    Recording,
    Checking,
}

/// Response of `POST /check_recording`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PronunciationVerdict {
    pub is_correct: bool,
    #[serde(default)]
    pub transcribed_text: String,
    #[serde(default)]
    pub confidence: f64,
}

impl PronunciationVerdict {
    /// Verdict shown when the cycle failed before a score came back
    pub fn failed(error: &RecorderError) -> Self {
        let placeholder = match error {
            RecorderError::PermissionDenied(_) => PLACEHOLDERS[0],
            RecorderError::EmptyRecording => PLACEHOLDERS[1],
            RecorderError::Busy(_) => PLACEHOLDERS[2],
            RecorderError::Device(_) => PLACEHOLDERS[3],
            _ => PLACEHOLDERS[4],
        };

        Self {
            is_correct: false,
            transcribed_text: placeholder.to_string(),
            confidence: 0.0,
        }
    }

    /// True when the transcript is one of the `failed` messages rather than
    /// something the scoring service heard
    pub fn is_placeholder(&self) -> bool {
        !self.is_correct && PLACEHOLDERS.contains(&self.transcribed_text.as_str())
    }

    /// Transcript for display: heard text is normalised, placeholders are
    /// shown as written
    pub fn display_transcript(&self) -> String {
        if self.is_placeholder() {
            self.transcribed_text.clone()
        } else {
            normalize_transcript(&self.transcribed_text)
        }
    }
}

/// Source of audio, e.g. a microphone
#[async_trait]
pub trait AudioInput: Send + Sync {
    /// Acquire the input stream. Denied access maps to `PermissionDenied`.
    async fn acquire(&self) -> Result<Box<dyn AudioStream>, RecorderError>;
}

/// An acquired input stream
#[async_trait]
pub trait AudioStream: Send {
    /// Next chunk of audio; `None` once the source is exhausted
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, RecorderError>;

    /// Give the device back
    fn release(&mut self);
}

/// Scores a recording against the phrase the learner was asked to say
#[async_trait]
pub trait PronunciationScorer: Send + Sync {
    async fn score(
        &self,
        audio_data: &str,
        expected_text: &str,
    ) -> Result<PronunciationVerdict, ApiError>;
}

#[async_trait]
impl PronunciationScorer for ApiClient {
    async fn score(
        &self,
        audio_data: &str,
        expected_text: &str,
    ) -> Result<PronunciationVerdict, ApiError> {
        self.check_recording(audio_data, expected_text).await
    }
}

/// Ends the current recording early
#[derive(Debug, Clone)]
pub struct StopHandle(mpsc::UnboundedSender<()>);

impl StopHandle {
    pub fn stop(&self) {
        // The recorder owns the receiver, so this only fails after it is gone.
        let _ = self.0.send(());
    }
}

/// Owns an acquired stream and releases it exactly once when dropped, so a
/// recording abandoned mid-await still gives the device back.
struct StreamGuard(Box<dyn AudioStream>);

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.0.release();
    }
}

/// Puts the recorder back to `Idle` when scoring finishes or is abandoned
struct IdleOnDrop<'a>(&'a mut State);

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        *self.0 = State::Idle;
    }
}

enum State {
    Idle,
    Recording {
        stream: StreamGuard,
        started: Instant,
        buffer: Vec<u8>,
    },
    Checking,
}

pub struct Recorder {
    state: State,
    max_duration: Duration,
    stop_tx: mpsc::UnboundedSender<()>,
    stop_rx: mpsc::UnboundedReceiver<()>,
}

impl Recorder {
    pub fn new(max_duration: Duration) -> Self {
        let (stop_tx, stop_rx) = mpsc::unbounded_channel();
        Self {
            state: State::Idle,
            max_duration,
            stop_tx,
            stop_rx,
        }
    }

    pub fn phase(&self) -> RecordingPhase {
        match self.state {
            State::Idle => RecordingPhase::Idle,
            State::Recording { .. } => RecordingPhase::Recording,
            State::Checking => RecordingPhase::Checking,
        }
    }

    pub fn max_duration(&self) -> Duration {
        self.max_duration
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(self.stop_tx.clone())
    }

    /// `Idle -> Recording`. On failure the recorder stays `Idle`.
    pub async fn start(&mut self, input: &dyn AudioInput) -> Result<(), RecorderError> {
        let phase = self.phase();
        if phase != RecordingPhase::Idle {
            return Err(RecorderError::Busy(phase));
        }

        // Stops requested before this recording began do not apply to it
        while self.stop_rx.try_recv().is_ok() {}

        let stream = input.acquire().await?;
        self.state = State::Recording {
            stream: StreamGuard(stream),
            started: Instant::now(),
            buffer: Vec::new(),
        };
        info!("Recording started (max {:?})", self.max_duration);
        Ok(())
    }

    /// `Recording -> Checking`: buffer audio until stop, ceiling or end of
    /// stream, then release the input and hand back the assembled audio.
    pub async fn capture(&mut self) -> Result<Vec<u8>, RecorderError> {
        let phase = self.phase();
        if phase != RecordingPhase::Recording {
            return Err(RecorderError::Busy(phase));
        }
        let State::Recording {
            mut stream,
            started,
            mut buffer,
        } = std::mem::replace(&mut self.state, State::Idle)
        else {
            return Err(RecorderError::Busy(phase));
        };

        let deadline = started + self.max_duration;
        let outcome = loop {
            tokio::select! {
                _ = sleep_until(deadline) => {
                    debug!("Recording ceiling reached");
                    break Ok(());
                }
                _ = self.stop_rx.recv() => {
                    debug!("Recording stopped manually");
                    break Ok(());
                }
                chunk = stream.0.next_chunk() => match chunk {
                    Ok(Some(bytes)) => buffer.extend_from_slice(&bytes),
                    Ok(None) => break Ok(()),
                    Err(e) => break Err(e),
                },
            }
        };

        drop(stream);
        outcome?;

        if buffer.is_empty() {
            return Err(RecorderError::EmptyRecording);
        }

        info!(
            "Recorded {} bytes in {:?}",
            buffer.len(),
            started.elapsed().min(self.max_duration)
        );
        self.state = State::Checking;
        Ok(buffer)
    }

    /// `Checking -> Idle`: encode and submit the audio for scoring
    pub async fn check(
        &mut self,
        scorer: &dyn PronunciationScorer,
        audio: &[u8],
        expected_text: &str,
    ) -> Result<PronunciationVerdict, RecorderError> {
        let phase = self.phase();
        if phase != RecordingPhase::Checking {
            return Err(RecorderError::Busy(phase));
        }

        let encoded = encode_audio(audio);
        let result = {
            let _idle = IdleOnDrop(&mut self.state);
            scorer.score(&encoded, expected_text).await
        };

        let verdict = result?;
        info!(
            "Pronunciation check: correct={} heard='{}' confidence={:.2}",
            verdict.is_correct, verdict.transcribed_text, verdict.confidence
        );
        Ok(verdict)
    }

    /// Full cycle. Never fails: errors become a negative verdict with a
    /// placeholder transcript, and the recorder always ends `Idle`.
    pub async fn record_and_check(
        &mut self,
        input: &dyn AudioInput,
        scorer: &dyn PronunciationScorer,
        expected_text: &str,
    ) -> PronunciationVerdict {
        match self.run_cycle(input, scorer, expected_text).await {
            Ok(verdict) => verdict,
            Err(RecorderError::Busy(phase)) => {
                warn!("Recording request ignored while {:?}", phase);
                PronunciationVerdict::failed(&RecorderError::Busy(phase))
            }
            Err(e) => {
                warn!("Pronunciation cycle failed: {}", e);
                self.reset();
                PronunciationVerdict::failed(&e)
            }
        }
    }

    async fn run_cycle(
        &mut self,
        input: &dyn AudioInput,
        scorer: &dyn PronunciationScorer,
        expected_text: &str,
    ) -> Result<PronunciationVerdict, RecorderError> {
        self.start(input).await?;
        let audio = self.capture().await?;
        self.check(scorer, &audio, expected_text).await
    }

    /// Abandon whatever is in progress and return to `Idle`. A held
    /// stream is released by its guard.
    pub fn reset(&mut self) {
        self.state = State::Idle;
    }
}

/// Base64 text encoding used on the wire
pub fn encode_audio(audio: &[u8]) -> String {
    STANDARD.encode(audio)
}

/// Lowercase, strip punctuation (keeping umlauts, ß and hyphens) and
/// collapse whitespace, the same way the scoring service compares text.
pub fn normalize_transcript(text: &str) -> String {
    static PUNCTUATION: OnceLock<Regex> = OnceLock::new();
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();

    let punctuation =
        PUNCTUATION.get_or_init(|| Regex::new(r"[^\w\s\-äöüß]").expect("valid regex"));
    let whitespace = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"));

    let lowered = text.to_lowercase();
    let stripped = punctuation.replace_all(&lowered, "");
    whitespace.replace_all(&stripped, " ").trim().to_string()
}

/// Replays a pre-recorded audio file as if it came from a microphone
#[derive(Debug, Clone)]
pub struct FileAudioInput {
    path: PathBuf,
    pace: Option<Duration>,
}

impl FileAudioInput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pace: None,
        }
    }

    /// Delay between chunks, to mimic a live device
    pub fn with_pace(mut self, pace: Duration) -> Self {
        self.pace = Some(pace);
        self
    }
}

#[async_trait]
impl AudioInput for FileAudioInput {
    async fn acquire(&self) -> Result<Box<dyn AudioStream>, RecorderError> {
        let data = tokio::fs::read(&self.path).await.map_err(|e| match e.kind() {
            ErrorKind::PermissionDenied => {
                RecorderError::PermissionDenied(format!("{}: {}", self.path.display(), e))
            }
            _ => RecorderError::Device(format!("{}: {}", self.path.display(), e)),
        })?;

        debug!("Opened {} ({} bytes)", self.path.display(), data.len());
        Ok(Box::new(FileAudioStream {
            data,
            offset: 0,
            pace: self.pace,
            released: false,
        }))
    }
}

struct FileAudioStream {
    data: Vec<u8>,
    offset: usize,
    pace: Option<Duration>,
    released: bool,
}

#[async_trait]
impl AudioStream for FileAudioStream {
    async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, RecorderError> {
        if self.released {
            return Err(RecorderError::Device("stream already released".to_string()));
        }
        if self.offset >= self.data.len() {
            return Ok(None);
        }
        if let Some(pace) = self.pace {
            sleep(pace).await;
        }

        let end = (self.offset + FILE_CHUNK_BYTES).min(self.data.len());
        let chunk = self.data[self.offset..end].to_vec();
        self.offset = end;
        Ok(Some(chunk))
    }

    fn release(&mut self) {
        self.released = true;
        self.data.clear();
    }
}
