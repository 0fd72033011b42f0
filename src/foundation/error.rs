/// Convenience result type used across layergen.
pub type LayergenResult<T> = Result<T, LayergenError>;

/// Top-level error taxonomy. Each variant names the pipeline stage that failed.
#[derive(thiserror::Error, Debug)]
pub enum LayergenError {
    /// Invalid canvas configuration or other caller-provided settings.
    #[error("validation error: {0}")]
    Validation(String),

    /// The request document could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),

    /// An image source could not be fetched or decoded.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// The rendered canvas could not be encoded.
    #[error("encode error: {0}")]
    Encode(String),

    /// The encoded image could not be written to its destination.
    #[error("write error: {0}")]
    Write(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl LayergenError {
    /// Build a [`LayergenError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`LayergenError::Parse`] value.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Build a [`LayergenError::Fetch`] value.
    pub fn fetch(msg: impl Into<String>) -> Self {
        Self::Fetch(msg.into())
    }

    /// Build a [`LayergenError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`LayergenError::Write`] value.
    pub fn write(msg: impl Into<String>) -> Self {
        Self::Write(msg.into())
    }

    /// Short stage name for logs and structured error reporting.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validate",
            Self::Parse(_) => "parse",
            Self::Fetch(_) => "fetch",
            Self::Encode(_) => "encode",
            Self::Write(_) => "write",
            Self::Other(_) => "other",
        }
    }
}

impl From<serde_json::Error> for LayergenError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
