/// Result alias that carries the custom [`NeoZoneError`] type.
pub type Result<T> = std::result::Result<T, NeoZoneError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum NeoZoneError {
    /// Malformed or truncated binary payload.
    #[error("decode error: {0}")]
    Decode(String),
    /// An index or window that falls outside the strip or the registry.
    #[error("index {index} out of range (limit {limit})")]
    Range { index: usize, limit: usize },
    /// The animation scheduler cannot take another animation.
    #[error("animation capacity of {0} exceeded")]
    Capacity(usize),
    /// Text transport could not be decoded.
    #[error("base64 transport error: {0}")]
    Transport(#[from] base64::DecodeError),
    /// Free-form error message.
    #[error("{0}")]
    Message(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    Json(#[from] serde_json::Error),
}

impl NeoZoneError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    pub fn decode<T: Into<String>>(msg: T) -> Self {
        Self::Decode(msg.into())
    }

    pub fn range(index: usize, limit: usize) -> Self {
        Self::Range { index, limit }
    }
}
