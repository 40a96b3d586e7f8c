// Public API
pub use exchange::AudioExchange;
pub use handler::{audio_handler, run_audio_session, run_speech_session, speech_handler};
pub use transcribe::{contains_voice, DisabledTranscriber, TranscribeError, Transcriber};

// Internal modules
pub mod exchange;
pub mod handler;
pub mod transcribe;
