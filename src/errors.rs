//! Error taxonomy shared by the containers, accessors, out-of-bounds wrappers and algorithms.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImgError {
    /// A non-positive extent, or a dimensionality mismatch between objects which must agree (a
    /// kernel and an image, two intervals in a binary operation, a position and its accessor).
    #[error("invalid dimension: {0}")]
    InvalidDimension(String),

    /// Advancing a cursor past its last element, or reading a raw accessor outside the interval
    /// of its backing storage.
    #[error("out of range: {0}")]
    OutOfRange(String),

    /// A storage strategy was asked to hold an element type it has no specialization for.
    #[error("incompatible type: {0}")]
    IncompatibleType(String),

    /// An algorithm failed while running, usually inside one of its worker chunks.
    #[error("computation failed: {0}")]
    ComputationFailure(String),

    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ImgError {
    pub(crate) fn dimension_mismatch(what: &str, expected: usize, actual: usize) -> Self {
        ImgError::InvalidDimension(format!(
            "{what} has {actual} dimensions, expected {expected}"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_category() {
        let e = ImgError::dimension_mismatch("kernel", 2, 3);
        assert_eq!(
            e.to_string(),
            "invalid dimension: kernel has 3 dimensions, expected 2"
        );
    }

    #[test]
    fn json_errors_convert() {
        let parsed: std::result::Result<u32, _> = serde_json::from_str("not json");
        let e: ImgError = parsed.unwrap_err().into();
        assert!(matches!(e, ImgError::Config(_)));
    }
}
