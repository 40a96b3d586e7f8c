use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TranscribeError {
    #[error("transcription backend is not configured")]
    Disabled,
    #[error("transcription produced no results")]
    NoResults,
    #[error("transcription backend error: {0}")]
    Backend(String),
}

/// External speech-to-text collaborator: takes a raw audio buffer and
/// returns the transcribed text. Backends are injected at startup.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: &[u8]) -> Result<String, TranscribeError>;
}

/// Default collaborator when no backend is configured
pub struct DisabledTranscriber;

#[async_trait]
impl Transcriber for DisabledTranscriber {
    async fn transcribe(&self, _audio: &[u8]) -> Result<String, TranscribeError> {
        Err(TranscribeError::Disabled)
    }
}

/// Average byte amplitude above this counts as voice activity
const VOICE_THRESHOLD: u64 = 50;

/// Cheap voice-activity gate: skip transcription for windows that are
/// mostly silence.
pub fn contains_voice(audio: &[u8]) -> bool {
    if audio.is_empty() {
        return false;
    }
    let sum: u64 = audio.iter().map(|&b| u64::from(b)).sum();
    sum / audio.len() as u64 > VOICE_THRESHOLD
}
