//! Error types for the cache layer
//!
//! Cache reads and writes never fail. The only fallible operation is turning
//! a stage input into key material.

/// Errors during cache-key derivation
#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    /// Category was empty or contained the key separator
    #[error("invalid key category: '{0}'")]
    InvalidCategory(String),

    /// Input could not be serialized into canonical form
    #[error("failed to serialize key input: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_category_display() {
        let err = KeyError::InvalidCategory("a:b".to_string());
        assert_eq!(err.to_string(), "invalid key category: 'a:b'");
    }

    #[test]
    fn serialization_error_conversion() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: KeyError = json_err.into();
        assert!(matches!(err, KeyError::Serialization(_)));
    }
}
