//! Database models and domain types.

use chrono::NaiveDateTime;
use derive_getters::Getters;
use derive_new::new;
use diesel::prelude::*;
use tracing::instrument;
use word_guess::{Game, Guess, LetterFeedback, Word};

use crate::db::{DbError, DbErrorKind, schema};

/// Registered account.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::users)]
pub struct User {
    id: i32,
    username: String,
    password_hash: String,
    is_admin: bool,
    created_at: NaiveDateTime,
}

/// Insertable user model for creating new accounts.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::users)]
pub struct NewUser {
    username: String,
    password_hash: String,
    is_admin: bool,
}

/// Entry of the managed vocabulary.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::words)]
pub struct WordRecord {
    id: i32,
    word: String,
    created_at: NaiveDateTime,
}

/// Insertable vocabulary entry.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::words)]
pub struct NewWord {
    word: String,
}

/// Stored game row.
#[derive(Debug, Clone, Queryable, Identifiable, Selectable, Getters)]
#[diesel(table_name = schema::games)]
pub struct GameRecord {
    id: i32,
    username: String,
    target_word: String,
    guess_count: i32,
    won: bool,
    completed: bool,
    started_at: NaiveDateTime,
    completed_at: Option<NaiveDateTime>,
}

/// Insertable game row; every new game starts open with no guesses.
#[derive(Debug, Clone, Insertable, new, Getters)]
#[diesel(table_name = schema::games)]
pub struct NewGame {
    username: String,
    target_word: String,
    started_at: NaiveDateTime,
}

/// Stored guess row.
#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable, Getters)]
#[diesel(table_name = schema::guesses)]
#[diesel(belongs_to(GameRecord, foreign_key = game_id))]
pub struct GuessRecord {
    id: i32,
    game_id: i32,
    position: i32,
    word: String,
    feedback: String,
    guessed_at: NaiveDateTime,
}

impl GuessRecord {
    /// Decodes the stored feedback column.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the column is not a JSON feedback array.
    #[instrument(skip(self), fields(guess_id = self.id))]
    pub fn parse_feedback(&self) -> Result<Vec<LetterFeedback>, DbError> {
        decode_feedback(&self.feedback)
    }
}

/// Insertable guess row.
#[derive(Debug, Clone, Insertable, new)]
#[diesel(table_name = schema::guesses)]
pub struct NewGuess {
    game_id: i32,
    position: i32,
    word: String,
    feedback: String,
    guessed_at: NaiveDateTime,
}

/// Values written together with a new guess.
#[derive(Debug, Clone, new, Getters)]
pub struct GuessUpdate {
    word: String,
    feedback: String,
    guessed_at: NaiveDateTime,
    won: bool,
    completed: bool,
    completed_at: Option<NaiveDateTime>,
}

/// Result of a guess-count compare-and-swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The game still had the expected guess count and was updated.
    Applied,
    /// Another writer got there first; nothing was written.
    Conflict,
}

/// Result of inserting a game under a daily quota.
#[derive(Debug, Clone)]
pub enum QuotaInsert {
    /// The game was created.
    Inserted(GameRecord),
    /// The owner already has `played` games in the window.
    QuotaExceeded {
        /// Games found in the window.
        played: i64,
    },
}

/// A game row together with its guesses in submission order.
#[derive(Debug, Clone, new, Getters)]
pub struct StoredGame {
    record: GameRecord,
    guesses: Vec<GuessRecord>,
}

impl StoredGame {
    /// Rebuilds the in-memory game state machine from the stored rows.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a stored word or feedback column is malformed.
    #[instrument(skip(self), fields(game_id = self.record.id))]
    pub fn to_game(&self) -> Result<Game, DbError> {
        let target = parse_stored_word(&self.record.target_word)?;
        let guesses = self
            .guesses
            .iter()
            .map(|g| {
                Ok(Guess::new(
                    parse_stored_word(g.word())?,
                    g.parse_feedback()?,
                    g.guessed_at().and_utc(),
                ))
            })
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(Game::restore(
            target,
            guesses,
            self.record.won,
            self.record.completed,
            self.record.started_at.and_utc(),
            self.record.completed_at.map(|t| t.and_utc()),
        ))
    }
}

/// Stored access token.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, new, Getters)]
#[diesel(table_name = schema::auth_tokens)]
pub struct AuthToken {
    token: String,
    username: String,
    created_at: NaiveDateTime,
    expires_at: NaiveDateTime,
}

/// Aggregated win statistics over a set of games.
#[derive(Debug, Clone, Copy, PartialEq, Getters)]
pub struct AggregatedStats {
    total_games: i64,
    wins: i64,
}

impl AggregatedStats {
    /// Tallies games and wins over stored game rows.
    #[instrument(skip(games), fields(count = games.len()))]
    pub fn from_games(games: &[GameRecord]) -> Self {
        let wins = games.iter().filter(|g| g.won).count() as i64;
        Self {
            total_games: games.len() as i64,
            wins,
        }
    }

    /// Win rate as a percentage (0.0–100.0), rounded to two decimals.
    pub fn win_rate(&self) -> f64 {
        if self.total_games == 0 {
            0.0
        } else {
            let rate = (self.wins as f64 / self.total_games as f64) * 100.0;
            (rate * 100.0).round() / 100.0
        }
    }
}

/// Encodes feedback for the `guesses.feedback` column.
///
/// # Errors
///
/// Returns [`DbError`] if serialization fails.
pub fn encode_feedback(feedback: &[LetterFeedback]) -> Result<String, DbError> {
    serde_json::to_string(feedback)
        .map_err(|e| DbError::with_kind(DbErrorKind::Corrupt, format!("Encoding feedback: {}", e)))
}

fn decode_feedback(raw: &str) -> Result<Vec<LetterFeedback>, DbError> {
    serde_json::from_str(raw).map_err(|e| {
        DbError::with_kind(DbErrorKind::Corrupt, format!("Invalid feedback '{}': {}", raw, e))
    })
}

fn parse_stored_word(raw: &str) -> Result<Word, DbError> {
    Word::parse(raw).map_err(|e| {
        DbError::with_kind(DbErrorKind::Corrupt, format!("Invalid stored word '{}': {}", raw, e))
    })
}
