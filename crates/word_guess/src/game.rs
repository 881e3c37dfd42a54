//! Bounded-attempt state machine for a single game.
//!
//! A game starts `Open` and accepts guesses until one of them equals the
//! target (`Won`) or the guess limit is used up (`Lost`). Both end states are
//! terminal: `completed` and `won` only ever flip from `false` to `true`.

use chrono::{DateTime, Utc};
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_new::new;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::feedback::{LetterFeedback, score};
use crate::word::Word;

/// Default number of guesses a player gets per game.
pub const MAX_GUESSES_PER_GAME: usize = 5;

/// Default number of games a player may start per calendar day.
pub const MAX_GAMES_PER_DAY: u32 = 3;

/// Limits applied to games and players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
#[serde(default)]
pub struct Rules {
    /// Guesses allowed in one game.
    #[getter(copy)]
    max_guesses_per_game: usize,
    /// Games a player may start per day.
    #[getter(copy)]
    max_games_per_day: u32,
}

impl Default for Rules {
    fn default() -> Self {
        Self::new(MAX_GUESSES_PER_GAME, MAX_GAMES_PER_DAY)
    }
}

/// One submitted attempt and the feedback it earned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct Guess {
    word: Word,
    feedback: Vec<LetterFeedback>,
    guessed_at: DateTime<Utc>,
}

/// Where a game stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GameStatus {
    /// Still accepting guesses.
    Open,
    /// Target guessed.
    Won,
    /// Guesses exhausted without hitting the target.
    Lost,
}

impl GameStatus {
    /// Returns `true` for `Won` and `Lost`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Open)
    }
}

/// Why a guess was refused by the game itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum GuessError {
    /// The game has already been won or lost.
    #[display("Game already completed")]
    AlreadyCompleted,
    /// The game holds as many guesses as the rules allow.
    #[display("Maximum guesses reached")]
    GuessLimitReached,
}

/// Result of an accepted guess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters)]
pub struct GuessOutcome {
    word: Word,
    feedback: Vec<LetterFeedback>,
    won: bool,
    completed: bool,
    guesses_remaining: usize,
    /// Present only when this guess ended the game without winning it.
    revealed_target: Option<Word>,
    status: GameStatus,
}

/// One play session against a hidden target word.
///
/// [`Game::new`] opens a game with no guesses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, new)]
pub struct Game {
    /// The hidden target.
    target: Word,
    /// Guesses in submission order.
    #[new(default)]
    guesses: Vec<Guess>,
    /// Whether the target was guessed.
    #[getter(copy)]
    #[new(default)]
    won: bool,
    /// Whether the game accepts no more guesses.
    #[getter(copy)]
    #[new(default)]
    completed: bool,
    /// When the game was created.
    #[getter(copy)]
    started_at: DateTime<Utc>,
    /// When the game ended, if it has.
    #[getter(copy)]
    #[new(default)]
    completed_at: Option<DateTime<Utc>>,
}

impl Game {
    /// Rebuilds a game from previously stored parts.
    ///
    /// The stored flags are taken as they are; the caller is trusted to hand
    /// back what an earlier [`Game::submit`] produced.
    pub fn restore(
        target: Word,
        guesses: Vec<Guess>,
        won: bool,
        completed: bool,
        started_at: DateTime<Utc>,
        completed_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            target,
            guesses,
            won,
            completed,
            started_at,
            completed_at,
        }
    }

    /// Current state-machine position.
    pub fn status(&self) -> GameStatus {
        match (self.won, self.completed) {
            (true, _) => GameStatus::Won,
            (false, true) => GameStatus::Lost,
            (false, false) => GameStatus::Open,
        }
    }

    /// Guesses left under `rules`, never negative.
    pub fn guesses_remaining(&self, rules: &Rules) -> usize {
        rules.max_guesses_per_game().saturating_sub(self.guesses.len())
    }

    /// Scores `word`, appends it and advances the state machine.
    ///
    /// # Errors
    ///
    /// - [`GuessError::AlreadyCompleted`] if the game is won or lost
    /// - [`GuessError::GuessLimitReached`] if the guess list is full
    ///
    /// A refused guess leaves the game unchanged.
    #[instrument(skip_all, fields(word = %word, guesses = self.guesses.len()))]
    pub fn submit(
        &mut self,
        word: Word,
        rules: &Rules,
        now: DateTime<Utc>,
    ) -> Result<GuessOutcome, GuessError> {
        if self.completed {
            warn!("Guess submitted to completed game");
            return Err(GuessError::AlreadyCompleted);
        }
        if self.guesses.len() >= rules.max_guesses_per_game() {
            warn!(limit = rules.max_guesses_per_game(), "Guess limit reached");
            return Err(GuessError::GuessLimitReached);
        }

        let feedback = score(word.as_str(), self.target.as_str());
        let won = word == self.target;
        self.guesses
            .push(Guess::new(word.clone(), feedback.clone(), now));

        let completed = won || self.guesses.len() >= rules.max_guesses_per_game();
        self.won = won;
        if completed {
            self.completed = true;
            self.completed_at = Some(now);
        }

        let status = self.status();
        let revealed_target = (status == GameStatus::Lost).then(|| self.target.clone());
        info!(%status, guesses = self.guesses.len(), "Guess applied");

        Ok(GuessOutcome {
            word,
            feedback,
            won,
            completed,
            guesses_remaining: self.guesses_remaining(rules),
            revealed_target,
            status,
        })
    }
}
