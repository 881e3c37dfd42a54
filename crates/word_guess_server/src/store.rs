//! Persistence capability consumed by the game session manager.

use chrono::NaiveDateTime;

use crate::db::{
    DbError, GameRepository, GuessUpdate, NewGame, QuotaInsert, StoredGame, UpdateOutcome,
};

/// Storage operations the session manager needs.
///
/// Implementations must make [`GameStore::append_guess`] an atomic
/// compare-and-swap on the guess count, and [`GameStore::insert_game_within_quota`]
/// atomic with respect to other starts by the same owner.
pub trait GameStore: Send + Sync {
    /// Every word of the vocabulary.
    fn list_words(&self) -> Result<Vec<String>, DbError>;

    /// Games `username` started at or after `since`.
    fn count_games_since(&self, username: &str, since: NaiveDateTime) -> Result<i64, DbError>;

    /// Inserts `game` unless its owner already has `limit` games since `since`.
    fn insert_game_within_quota(
        &self,
        game: NewGame,
        since: NaiveDateTime,
        limit: i64,
    ) -> Result<QuotaInsert, DbError>;

    /// A game with its guesses, or `None` if the id is unknown.
    fn find_game(&self, game_id: i32) -> Result<Option<StoredGame>, DbError>;

    /// Appends a guess only if the game still has `expected_guess_count` guesses.
    fn append_guess(
        &self,
        game_id: i32,
        expected_guess_count: i32,
        update: GuessUpdate,
    ) -> Result<UpdateOutcome, DbError>;
}

impl GameStore for GameRepository {
    fn list_words(&self) -> Result<Vec<String>, DbError> {
        GameRepository::list_words(self)
    }

    fn count_games_since(&self, username: &str, since: NaiveDateTime) -> Result<i64, DbError> {
        GameRepository::count_games_since(self, username, since)
    }

    fn insert_game_within_quota(
        &self,
        game: NewGame,
        since: NaiveDateTime,
        limit: i64,
    ) -> Result<QuotaInsert, DbError> {
        GameRepository::insert_game_within_quota(self, game, since, limit)
    }

    fn find_game(&self, game_id: i32) -> Result<Option<StoredGame>, DbError> {
        GameRepository::find_game(self, game_id)
    }

    fn append_guess(
        &self,
        game_id: i32,
        expected_guess_count: i32,
        update: GuessUpdate,
    ) -> Result<UpdateOutcome, DbError> {
        GameRepository::append_guess(self, game_id, expected_guess_count, update)
    }
}
