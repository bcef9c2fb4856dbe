use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Runtime error: {0}")]
    Runtime(#[from] core_runtime::Error),

    #[error("Playback error: {0}")]
    Playback(#[from] core_playback::PlaybackError),
}

impl CoreError {
    /// `true` if the error came from a stopped controller.
    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            CoreError::Playback(core_playback::PlaybackError::ControllerClosed)
        )
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
