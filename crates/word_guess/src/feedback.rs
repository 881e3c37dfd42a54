//! Letter-by-letter feedback for a guess.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use tracing::instrument;

/// Verdict for one position of a guess.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LetterFeedback {
    /// Right letter in the right position.
    Correct,
    /// Letter occurs in the target at another, still unmatched, position.
    WrongPosition,
    /// Letter has no unmatched occurrence left in the target.
    NotInWord,
}

/// Scores `guess` against `target`, one [`LetterFeedback`] per guess position.
///
/// Exact matches are taken first. Every remaining guess letter then claims the
/// leftmost unclaimed occurrence of the same letter in the target, so a
/// repeated letter is never credited more often than the target contains it.
///
/// The function is total: inputs are not validated, and strings of different
/// lengths are compared position by position where both have a character.
#[instrument(level = "trace")]
pub fn score(guess: &str, target: &str) -> Vec<LetterFeedback> {
    let guess: Vec<char> = guess.chars().collect();
    let mut unclaimed: Vec<Option<char>> = target.chars().map(Some).collect();
    let mut feedback = vec![LetterFeedback::NotInWord; guess.len()];

    for (i, &letter) in guess.iter().enumerate() {
        if unclaimed.get(i).copied().flatten() == Some(letter) {
            feedback[i] = LetterFeedback::Correct;
            unclaimed[i] = None;
        }
    }

    for (i, &letter) in guess.iter().enumerate() {
        if feedback[i] == LetterFeedback::Correct {
            continue;
        }
        if let Some(slot) = unclaimed.iter_mut().find(|slot| **slot == Some(letter)) {
            *slot = None;
            feedback[i] = LetterFeedback::WrongPosition;
        }
    }

    feedback
}

/// Returns `true` when every position is [`LetterFeedback::Correct`].
pub fn is_solved(feedback: &[LetterFeedback]) -> bool {
    !feedback.is_empty() && feedback.iter().all(|f| *f == LetterFeedback::Correct)
}
