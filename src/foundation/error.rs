/// Convenience result type used across argand.
pub type ArgandResult<T> = Result<T, ArgandError>;

/// Top-level error taxonomy used by render and encode APIs.
///
/// "Not ready yet" and "end of stream" are not errors: encoders report them through
/// [`Received`](crate::encode::codec::Received).
#[derive(thiserror::Error, Debug)]
pub enum ArgandError {
    /// Invalid configuration or API misuse.
    #[error("validation error: {0}")]
    Validation(String),

    /// Allocation failure for frame buffers, job descriptors or worker threads.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// Terminal encoder failure (rejected submission, failed receive, crashed encoder process).
    #[error("encoder error: {0}")]
    Encoder(String),

    /// Container writer failure or violation of the header/packet/trailer ordering contract.
    #[error("mux error: {0}")]
    Mux(String),

    /// Errors when serializing or deserializing configuration.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ArgandError {
    /// Build an [`ArgandError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build an [`ArgandError::ResourceExhausted`] value.
    pub fn resource_exhausted(msg: impl Into<String>) -> Self {
        Self::ResourceExhausted(msg.into())
    }

    /// Build an [`ArgandError::Encoder`] value.
    pub fn encoder(msg: impl Into<String>) -> Self {
        Self::Encoder(msg.into())
    }

    /// Build an [`ArgandError::Mux`] value.
    pub fn mux(msg: impl Into<String>) -> Self {
        Self::Mux(msg.into())
    }

    /// Build an [`ArgandError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for failures that originate in the encoder.
    pub fn is_encoder(&self) -> bool {
        matches!(self, Self::Encoder(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
