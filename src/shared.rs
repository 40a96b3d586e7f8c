use std::sync::Arc;

use crate::audio::exchange::AudioExchange;
use crate::audio::transcribe::Transcriber;
use crate::config::Config;
use crate::room::directory::RoomDirectory;

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub directory: Arc<RoomDirectory>,
    pub audio: Arc<AudioExchange>,
    pub transcriber: Arc<dyn Transcriber>,
}

impl AppState {
    pub fn new(config: Config, transcriber: Arc<dyn Transcriber>) -> Self {
        Self {
            config: Arc::new(config),
            directory: Arc::new(RoomDirectory::new()),
            audio: Arc::new(AudioExchange::new()),
            transcriber,
        }
    }
}
