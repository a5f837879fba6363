use crate::error::Result;
use crate::validation::validate_short_code;
use std::fmt::Display;

/// Identifier of a shortened URL.
///
/// The variant records where the code came from: the generator, or the
/// caller as a custom alias. Both variants share the `[A-Za-z0-9_-]` alphabet.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShortCode {
    /// A code produced by the random generator.
    Generated(String),
    /// A caller-supplied alias.
    Custom(String),
}

impl ShortCode {
    /// Wraps a generator output.
    ///
    /// Generated codes are exempt from the alias length limit.
    pub fn generated(code: impl Into<String>) -> Self {
        Self::Generated(code.into())
    }

    /// Creates a custom alias after validating it.
    pub fn new(code: impl Into<String>) -> Result<Self> {
        let code = code.into();
        validate_short_code(&code)?;
        Ok(Self::Custom(code))
    }

    /// Creates a `ShortCode` without validation.
    ///
    /// Used for codes that are only looked up, never stored.
    pub fn new_unchecked(code: impl Into<String>) -> Self {
        Self::Custom(code.into())
    }

    /// Returns the short code as a string slice.
    pub fn as_str(&self) -> &str {
        match self {
            ShortCode::Generated(s) | ShortCode::Custom(s) => s.as_str(),
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, ShortCode::Custom(_))
    }

    /// Builds the public link, `{base_url}/s/{code}`.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}/s/{}", base_url.trim_end_matches('/'), self)
    }
}

impl Display for ShortCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
