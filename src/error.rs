use thiserror::Error;

/// Errors surfaced by the sonification engine.
///
/// Triggers (`play_*`) never return these to the caller; they are logged and
/// the event is dropped. Setup and payload parsing return them directly.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("audio context not initialized")]
    NotInitialized,

    #[error("audio context has been closed")]
    Closed,

    #[error("engine is muted")]
    Muted,

    #[error("invalid sample rate {0} Hz")]
    InvalidSampleRate(f64),

    #[error("voice limit of {limit} reached")]
    VoiceLimit { limit: usize },

    #[error("invalid payload: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_readable() {
        assert_eq!(
            EngineError::VoiceLimit { limit: 8 }.to_string(),
            "voice limit of 8 reached"
        );
        assert_eq!(
            EngineError::InvalidSampleRate(0.0).to_string(),
            "invalid sample rate 0 Hz"
        );
    }

    #[test]
    fn json_errors_convert() {
        let err: EngineError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, EngineError::InvalidPayload(_)));
    }
}
