use thiserror::Error;

// ---------------------------------------------------------------------------
// EmitterError
// ---------------------------------------------------------------------------

/// Errors raised while configuring an emitter.
///
/// Registration, removal and dispatch never fail; a panicking listener
/// unwinds through [`EventEmitter::emit`](crate::EventEmitter::emit) instead
/// of being reported here.
#[derive(Debug, Error)]
pub enum EmitterError {
    #[error("Invalid emitter options: {0}")]
    Config(#[from] serde_json::Error),
}

/// Convenience alias — the default error type is `EmitterError`.
pub type Result<T, E = EmitterError> = std::result::Result<T, E>;

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
