//! The validated word type.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::instrument;

/// Number of letters in every word of the vocabulary.
pub const WORD_LENGTH: usize = 5;

/// Reason a string was rejected as a word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum WordError {
    /// Not exactly [`WORD_LENGTH`] characters.
    #[display("Word must be exactly 5 characters long")]
    WrongLength,
    /// Contains something other than `A`-`Z`.
    #[display("Word must contain only uppercase letters")]
    InvalidCharacters,
}

/// Checks that `candidate` is exactly five uppercase ASCII letters.
///
/// Length is counted in characters, so `"ÄPFEL"` fails on its charset rather
/// than on its byte length.
///
/// # Errors
///
/// Returns the [`WordError`] describing the first rule that failed.
#[instrument(level = "trace")]
pub fn validate_word_format(candidate: &str) -> Result<(), WordError> {
    if candidate.chars().count() != WORD_LENGTH {
        return Err(WordError::WrongLength);
    }
    if !candidate.chars().all(|c| c.is_ascii_uppercase()) {
        return Err(WordError::InvalidCharacters);
    }
    Ok(())
}

/// A 5-letter uppercase word.
///
/// The only way to obtain one is through the validator, so holding a `Word`
/// means the format rules already passed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Word(String);

impl Word {
    /// Validates and wraps a word.
    ///
    /// # Errors
    ///
    /// Returns [`WordError`] if the input is not five uppercase letters.
    pub fn parse(candidate: impl Into<String>) -> Result<Self, WordError> {
        let candidate = candidate.into();
        validate_word_format(&candidate)?;
        Ok(Self(candidate))
    }

    /// Returns the word as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Word {
    type Err = WordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Word {
    type Error = WordError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Word> for String {
    fn from(word: Word) -> Self {
        word.0
    }
}

impl AsRef<str> for Word {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
