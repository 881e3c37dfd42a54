//! Database repository for accounts, vocabulary and games.

use chrono::NaiveDateTime;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel_migrations::MigrationHarness;
use tracing::{debug, info, instrument, warn};

use crate::db::{
    AuthToken, DbError, DbErrorKind, GameRecord, GuessRecord, GuessUpdate, MIGRATIONS, NewGame,
    NewGuess, NewUser, NewWord, QuotaInsert, StoredGame, UpdateOutcome, User, WordRecord, schema,
};

/// Milliseconds a connection waits on a locked database before failing.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Database repository for user, word and game operations.
#[derive(Debug, Clone)]
pub struct GameRepository {
    db_path: String,
}

impl GameRepository {
    /// Creates a new repository for the database at the given path.
    ///
    /// Every operation opens its own connection, so the path must name a file;
    /// `":memory:"` would give each call an empty database.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if the path is empty.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn new(db_path: String) -> Result<Self, DbError> {
        if db_path.trim().is_empty() {
            return Err(DbError::with_kind(
                DbErrorKind::Connection,
                "Database path must not be empty",
            ));
        }
        info!(path = %db_path, "Creating GameRepository");
        Ok(Self { db_path })
    }

    /// Path of the underlying database file.
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, DbError> {
        debug!(path = %self.db_path, "Establishing connection");
        let mut conn = SqliteConnection::establish(&self.db_path).map_err(|e| {
            DbError::with_kind(
                DbErrorKind::Connection,
                format!("Failed to connect to '{}': {}", self.db_path, e),
            )
        })?;
        conn.batch_execute(&format!(
            "PRAGMA busy_timeout = {}; PRAGMA foreign_keys = ON;",
            BUSY_TIMEOUT_MS
        ))?;
        Ok(conn)
    }

    /// Applies any pending schema migrations.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a migration fails.
    #[instrument(skip(self))]
    pub fn run_migrations(&self) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        let applied = conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            DbError::with_kind(DbErrorKind::Migration, format!("Migration failed: {}", e))
        })?;
        info!(count = applied.len(), "Migrations applied");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────
    //  Users and tokens
    // ─────────────────────────────────────────────────────────────

    /// Creates a new account.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] with kind [`DbErrorKind::UniqueViolation`] if the
    /// username is taken.
    #[instrument(skip(self, user))]
    pub fn create_user(&self, user: NewUser) -> Result<User, DbError> {
        let mut conn = self.connection()?;

        let user = diesel::insert_into(schema::users::table)
            .values(&user)
            .returning(User::as_returning())
            .get_result(&mut conn)?;

        info!(user_id = user.id(), username = %user.username(), "User created");
        Ok(user)
    }

    /// Gets a user by username. Returns `None` if not found.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn get_user_by_name(&self, username: &str) -> Result<Option<User>, DbError> {
        let mut conn = self.connection()?;

        let user = schema::users::table
            .filter(schema::users::username.eq(username))
            .select(User::as_select())
            .first(&mut conn)
            .optional()?;

        debug!(found = user.is_some(), "User lookup finished");
        Ok(user)
    }

    /// Stores an access token.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, token), fields(username = %token.username()))]
    pub fn insert_token(&self, token: &AuthToken) -> Result<(), DbError> {
        let mut conn = self.connection()?;
        diesel::insert_into(schema::auth_tokens::table)
            .values(token)
            .execute(&mut conn)?;
        debug!("Token stored");
        Ok(())
    }

    /// Looks up an access token. Returns `None` if unknown.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip_all)]
    pub fn find_token(&self, token: &str) -> Result<Option<AuthToken>, DbError> {
        let mut conn = self.connection()?;
        let found = schema::auth_tokens::table
            .find(token)
            .select(AuthToken::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(found)
    }

    /// Deletes tokens that expired at or before `now`, returning how many went.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn purge_expired_tokens(&self, now: NaiveDateTime) -> Result<usize, DbError> {
        let mut conn = self.connection()?;
        let removed = diesel::delete(
            schema::auth_tokens::table.filter(schema::auth_tokens::expires_at.le(now)),
        )
        .execute(&mut conn)?;
        if removed > 0 {
            info!(removed, "Expired tokens purged");
        }
        Ok(removed)
    }

    // ─────────────────────────────────────────────────────────────
    //  Vocabulary
    // ─────────────────────────────────────────────────────────────

    /// Adds a word to the vocabulary. The word must already be validated.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] with kind [`DbErrorKind::UniqueViolation`] if the
    /// word is already present.
    #[instrument(skip(self))]
    pub fn insert_word(&self, word: &str) -> Result<WordRecord, DbError> {
        let mut conn = self.connection()?;
        let record = diesel::insert_into(schema::words::table)
            .values(&NewWord::new(word.to_string()))
            .returning(WordRecord::as_returning())
            .get_result(&mut conn)?;
        info!(word_id = record.id(), "Word added");
        Ok(record)
    }

    /// Finds a vocabulary entry by its text.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn find_word(&self, word: &str) -> Result<Option<WordRecord>, DbError> {
        let mut conn = self.connection()?;
        let record = schema::words::table
            .filter(schema::words::word.eq(word))
            .select(WordRecord::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(record)
    }

    /// Lists every word in the vocabulary, alphabetically.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn list_words(&self) -> Result<Vec<String>, DbError> {
        let mut conn = self.connection()?;
        let words = schema::words::table
            .select(schema::words::word)
            .order(schema::words::word.asc())
            .load::<String>(&mut conn)?;
        debug!(count = words.len(), "Words loaded");
        Ok(words)
    }

    // ─────────────────────────────────────────────────────────────
    //  Games
    // ─────────────────────────────────────────────────────────────

    /// Counts games `username` started at or after `since`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn count_games_since(&self, username: &str, since: NaiveDateTime) -> Result<i64, DbError> {
        let mut conn = self.connection()?;
        let count = schema::games::table
            .filter(schema::games::username.eq(username))
            .filter(schema::games::started_at.ge(since))
            .count()
            .get_result::<i64>(&mut conn)?;
        debug!(count, "Games counted");
        Ok(count)
    }

    /// Inserts a game unless its owner already started `limit` games since
    /// `since`. Count and insert share one write transaction, so concurrent
    /// starts cannot overshoot the quota.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, game), fields(username = %game.username()))]
    pub fn insert_game_within_quota(
        &self,
        game: NewGame,
        since: NaiveDateTime,
        limit: i64,
    ) -> Result<QuotaInsert, DbError> {
        let mut conn = self.connection()?;

        let outcome = conn.immediate_transaction::<_, DbError, _>(|conn| {
            let played = schema::games::table
                .filter(schema::games::username.eq(game.username().as_str()))
                .filter(schema::games::started_at.ge(since))
                .count()
                .get_result::<i64>(conn)?;

            if played >= limit {
                return Ok(QuotaInsert::QuotaExceeded { played });
            }

            let record = diesel::insert_into(schema::games::table)
                .values(&game)
                .returning(GameRecord::as_returning())
                .get_result(conn)?;
            Ok(QuotaInsert::Inserted(record))
        })?;

        match &outcome {
            QuotaInsert::Inserted(record) => info!(game_id = record.id(), "Game inserted"),
            QuotaInsert::QuotaExceeded { played } => warn!(played, limit, "Quota exceeded"),
        }
        Ok(outcome)
    }

    /// Loads a game and its guesses. Returns `None` if the id is unknown.
    ///
    /// Both reads share one transaction, so the guess list always matches the
    /// game row's `guess_count`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn find_game(&self, game_id: i32) -> Result<Option<StoredGame>, DbError> {
        let mut conn = self.connection()?;

        let stored = conn.transaction::<_, DbError, _>(|conn| {
            let Some(record) = schema::games::table
                .find(game_id)
                .select(GameRecord::as_select())
                .first(conn)
                .optional()?
            else {
                return Ok(None);
            };

            let guesses = GuessRecord::belonging_to(&record)
                .order(schema::guesses::position.asc())
                .select(GuessRecord::as_select())
                .load(conn)?;
            Ok(Some(StoredGame::new(record, guesses)))
        })?;

        match &stored {
            Some(game) => debug!(guesses = game.guesses().len(), "Game loaded"),
            None => debug!("Game not found"),
        }
        Ok(stored)
    }

    /// Appends a guess if the game still has `expected_guess_count` guesses and
    /// is not completed; otherwise writes nothing and reports a conflict.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self, update), fields(word = %update.word()))]
    pub fn append_guess(
        &self,
        game_id: i32,
        expected_guess_count: i32,
        update: GuessUpdate,
    ) -> Result<UpdateOutcome, DbError> {
        let mut conn = self.connection()?;

        let outcome = conn.immediate_transaction::<_, DbError, _>(|conn| {
            let updated = diesel::update(
                schema::games::table
                    .filter(schema::games::id.eq(game_id))
                    .filter(schema::games::guess_count.eq(expected_guess_count))
                    .filter(schema::games::completed.eq(false)),
            )
            .set((
                schema::games::guess_count.eq(expected_guess_count + 1),
                schema::games::won.eq(*update.won()),
                schema::games::completed.eq(*update.completed()),
                schema::games::completed_at.eq(*update.completed_at()),
            ))
            .execute(conn)?;

            if updated == 0 {
                return Ok(UpdateOutcome::Conflict);
            }

            let guess = NewGuess::new(
                game_id,
                expected_guess_count,
                update.word().clone(),
                update.feedback().clone(),
                *update.guessed_at(),
            );
            diesel::insert_into(schema::guesses::table)
                .values(&guess)
                .execute(conn)?;
            Ok(UpdateOutcome::Applied)
        })?;

        match outcome {
            UpdateOutcome::Applied => info!("Guess appended"),
            UpdateOutcome::Conflict => warn!("Guess count changed underneath, nothing written"),
        }
        Ok(outcome)
    }

    /// Lists games started in `[from, until)`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn games_started_between(
        &self,
        from: NaiveDateTime,
        until: NaiveDateTime,
    ) -> Result<Vec<GameRecord>, DbError> {
        let mut conn = self.connection()?;
        let games = schema::games::table
            .filter(schema::games::started_at.ge(from))
            .filter(schema::games::started_at.lt(until))
            .order(schema::games::started_at.asc())
            .select(GameRecord::as_select())
            .load(&mut conn)?;
        info!(count = games.len(), "Games in range loaded");
        Ok(games)
    }

    /// Lists all games of `username`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`DbError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn games_for_user(&self, username: &str) -> Result<Vec<GameRecord>, DbError> {
        let mut conn = self.connection()?;
        let games = schema::games::table
            .filter(schema::games::username.eq(username))
            .order((schema::games::started_at.asc(), schema::games::id.asc()))
            .select(GameRecord::as_select())
            .load(&mut conn)?;
        info!(count = games.len(), "User games loaded");
        Ok(games)
    }
}
