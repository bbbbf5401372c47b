//! The user's data request.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Rejected before any collaborator is called.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid request: request text is empty")]
pub struct InvalidRequest;

/// Accepted request text. Trimmed, non-empty, and capped in length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Request(String);

impl Request {
    /// Accept `text`, truncating it to at most `max_chars` characters.
    /// A cap of zero keeps one character.
    pub fn parse(text: &str, max_chars: usize) -> Result<Self, InvalidRequest> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(InvalidRequest);
        }

        let accepted = match trimmed.char_indices().nth(max_chars.max(1)) {
            Some((cut, _)) => trimmed[..cut].trim_end().to_string(),
            None => trimmed.to_string(),
        };
        Ok(Self(accepted))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for Request {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
