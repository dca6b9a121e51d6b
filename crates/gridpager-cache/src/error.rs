use std::fmt;

/// Error returned when cache or pager configuration is invalid.
///
/// Produced by fallible constructors (capacity fractions out of range, page
/// layouts without a usable grid). Configuration errors are fatal to the
/// component and surface synchronously at construction; nothing else in the
/// pipeline reports through this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError(String);

impl ConfigError {
    /// Creates a new `ConfigError` with the given description.
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_shows_message() {
        let err = ConfigError::new("fraction out of range");
        assert_eq!(err.to_string(), "fraction out of range");
        assert_eq!(err.message(), "fraction out of range");
    }
}
