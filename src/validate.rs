//! Organization and user name validation.
//!
//! GitHub logins are 1-39 characters of ASCII letters, digits and hyphens,
//! starting with a letter or digit and not ending with a hyphen. A handful
//! of names are reserved by the site itself.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// Names GitHub reserves for its own pages.
pub const RESERVED_NAMES: [&str; 3] = ["help", "about", "pricing"];

/// Longest login GitHub accepts.
pub const MAX_IDENTIFIER_LEN: usize = 39;

// One leading alphanumeric, then up to 38 alphanumerics or hyphens, never ending in a hyphen.
static IDENTIFIER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9-]{0,37}[A-Za-z0-9])?$")
        .expect("identifier pattern is a valid regex")
});

/// Rejected organization or user name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidIdentifier {
    #[error("'{0}' is a protected GitHub name, please try a different name")]
    Reserved(String),

    #[error(
        "'{0}' is invalid, names may contain only alphanumeric characters and hyphens, \
         cannot start or end with a hyphen and cannot be over 39 characters long"
    )]
    Malformed(String),
}

impl InvalidIdentifier {
    /// The rejected input.
    #[must_use]
    pub fn input(&self) -> &str {
        match self {
            Self::Reserved(input) | Self::Malformed(input) => input,
        }
    }
}

/// Check a name without keeping it.
pub fn validate(input: &str) -> Result<(), InvalidIdentifier> {
    if RESERVED_NAMES.contains(&input) {
        return Err(InvalidIdentifier::Reserved(input.to_string()));
    }
    if !IDENTIFIER_PATTERN.is_match(input) {
        return Err(InvalidIdentifier::Malformed(input.to_string()));
    }
    Ok(())
}

/// A validated organization or user name, safe to interpolate into a request path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    /// Validate `input` and wrap it.
    pub fn parse(input: &str) -> Result<Self, InvalidIdentifier> {
        validate(input)?;
        Ok(Self(input.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
