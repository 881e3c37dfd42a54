//! Game session management: daily quota, guess submission and status.

use derive_getters::Getters;
use derive_more::{Display, Error};
use rand::seq::SliceRandom;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use word_guess::{GuessError, GuessOutcome, Rules, Word};

use crate::clock::{Clock, SystemClock, day_start};
use crate::db::{DbError, GuessUpdate, NewGame, QuotaInsert, UpdateOutcome, encode_feedback};
use crate::identity::Principal;
use crate::store::GameStore;

/// Unique identifier for a game.
pub type GameId = i32;

/// How often a guess is re-read and retried after losing a concurrent update.
const MAX_UPDATE_ATTEMPTS: usize = 3;

/// Domain failure of a session operation.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum GameErrorKind {
    /// The guessed word is malformed.
    #[display("{_0}")]
    Validation(String),
    /// No game has the given id.
    #[display("Game not found")]
    NotFound,
    /// The game belongs to someone else.
    #[display("Game belongs to another player")]
    Forbidden,
    /// The game is already won or lost.
    #[display("Game already completed")]
    AlreadyCompleted,
    /// The game holds the maximum number of guesses.
    #[display("Maximum guesses reached")]
    GuessLimitReached,
    /// The daily start limit is used up.
    #[display("Daily limit reached. You can play maximum {_0} games per day.")]
    QuotaExceeded(u32),
    /// The vocabulary is empty.
    #[display("No words available")]
    NoWordsAvailable,
    /// Storage failed; the detail is for logs only.
    #[display("Internal error: {_0}")]
    Infrastructure(String),
}

/// Session error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Game error: {} at {}:{}", kind, file, line)]
pub struct GameError {
    /// What failed.
    pub kind: GameErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl GameError {
    /// Creates a new session error with caller location tracking.
    #[track_caller]
    pub fn new(kind: GameErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<DbError> for GameError {
    #[track_caller]
    fn from(err: DbError) -> Self {
        error!(error = %err, "Game storage failure");
        Self::new(GameErrorKind::Infrastructure(err.to_string()))
    }
}

impl From<GuessError> for GameError {
    #[track_caller]
    fn from(err: GuessError) -> Self {
        Self::new(match err {
            GuessError::AlreadyCompleted => GameErrorKind::AlreadyCompleted,
            GuessError::GuessLimitReached => GameErrorKind::GuessLimitReached,
        })
    }
}

/// A newly started game.
#[derive(Debug, Clone, Serialize, Getters)]
pub struct StartedGame {
    game_id: GameId,
    guesses_remaining: usize,
}

/// Games played and left for the current UTC day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Getters)]
pub struct DailyStatus {
    games_played_today: u32,
    remaining_games: u32,
}

/// Runs game sessions against an injected store.
///
/// Holds no mutable state of its own; every call reads and writes through the
/// store, so any number of managers may share one database.
#[derive(Debug, Clone)]
pub struct GameSessionManager<S> {
    store: S,
    rules: Rules,
    clock: Arc<dyn Clock>,
}

impl<S: GameStore> GameSessionManager<S> {
    /// Creates a manager using the system clock.
    #[instrument(skip(store))]
    pub fn new(store: S, rules: Rules) -> Self {
        Self::with_clock(store, rules, Arc::new(SystemClock))
    }

    /// Creates a manager reading time from `clock`.
    #[instrument(skip(store, clock))]
    pub fn with_clock(store: S, rules: Rules, clock: Arc<dyn Clock>) -> Self {
        info!("Creating GameSessionManager");
        Self {
            store,
            rules,
            clock,
        }
    }

    /// The limits this manager enforces.
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Starts a game for `owner` with a random target from the vocabulary.
    ///
    /// # Errors
    ///
    /// - [`GameErrorKind::QuotaExceeded`] once the owner started
    ///   `max_games_per_day` games today (UTC)
    /// - [`GameErrorKind::NoWordsAvailable`] if the vocabulary is empty
    #[instrument(skip(self, owner), fields(username = %owner.username()))]
    pub fn start_session(&self, owner: &Principal) -> Result<StartedGame, GameError> {
        let now = self.clock.now();
        let since = day_start(now);
        let limit = self.rules.max_games_per_day();

        let played = self.store.count_games_since(owner.username(), since)?;
        if played >= i64::from(limit) {
            warn!(played, limit, "Daily quota exhausted");
            return Err(GameError::new(GameErrorKind::QuotaExceeded(limit)));
        }

        let words = self.store.list_words()?;
        let Some(target) = words.choose(&mut rand::thread_rng()) else {
            error!("Vocabulary is empty");
            return Err(GameError::new(GameErrorKind::NoWordsAvailable));
        };

        let game = NewGame::new(owner.username().clone(), target.clone(), now.naive_utc());
        match self
            .store
            .insert_game_within_quota(game, since, i64::from(limit))?
        {
            QuotaInsert::Inserted(record) => {
                info!(game_id = record.id(), "Game started");
                Ok(StartedGame {
                    game_id: *record.id(),
                    guesses_remaining: self.rules.max_guesses_per_game(),
                })
            }
            QuotaInsert::QuotaExceeded { played } => {
                warn!(played, limit, "Daily quota exhausted by a concurrent start");
                Err(GameError::new(GameErrorKind::QuotaExceeded(limit)))
            }
        }
    }

    /// Scores `word` against the target of `game_id` and records the guess.
    ///
    /// Preconditions are checked in order: word format, game exists, caller
    /// owns it, game not completed, guess limit not reached. A rejected guess
    /// writes nothing.
    ///
    /// # Errors
    ///
    /// One of `Validation`, `NotFound`, `Forbidden`, `AlreadyCompleted`,
    /// `GuessLimitReached`, or `Infrastructure` if concurrent writers keep
    /// winning the race.
    #[instrument(skip(self, owner), fields(username = %owner.username()))]
    pub fn submit_guess(
        &self,
        owner: &Principal,
        game_id: GameId,
        word: &str,
    ) -> Result<GuessOutcome, GameError> {
        let word = Word::parse(word)
            .map_err(|e| GameError::new(GameErrorKind::Validation(e.to_string())))?;

        for attempt in 1..=MAX_UPDATE_ATTEMPTS {
            let Some(stored) = self.store.find_game(game_id)? else {
                debug!("Game not found");
                return Err(GameError::new(GameErrorKind::NotFound));
            };
            if stored.record().username() != owner.username() {
                warn!(owner = %stored.record().username(), "Guess on another player's game");
                return Err(GameError::new(GameErrorKind::Forbidden));
            }

            let mut game = stored.to_game()?;
            let now = self.clock.now();
            let outcome = game.submit(word.clone(), &self.rules, now)?;

            let update = GuessUpdate::new(
                word.to_string(),
                encode_feedback(outcome.feedback())?,
                now.naive_utc(),
                *outcome.won(),
                *outcome.completed(),
                game.completed_at().map(|t| t.naive_utc()),
            );

            match self
                .store
                .append_guess(game_id, *stored.record().guess_count(), update)?
            {
                UpdateOutcome::Applied => {
                    info!(
                        status = %outcome.status(),
                        guesses_remaining = outcome.guesses_remaining(),
                        "Guess recorded"
                    );
                    return Ok(outcome);
                }
                UpdateOutcome::Conflict => {
                    warn!(attempt, "Game changed concurrently, re-reading");
                }
            }
        }

        Err(GameError::new(GameErrorKind::Infrastructure(format!(
            "Game {} kept changing during guess submission",
            game_id
        ))))
    }

    /// Counts games `owner` started today (UTC) and how many remain.
    ///
    /// # Errors
    ///
    /// Only [`GameErrorKind::Infrastructure`].
    #[instrument(skip(self, owner), fields(username = %owner.username()))]
    pub fn get_status(&self, owner: &Principal) -> Result<DailyStatus, GameError> {
        let since = day_start(self.clock.now());
        let played = self.store.count_games_since(owner.username(), since)?;
        let played = u32::try_from(played).unwrap_or(u32::MAX);
        let status = DailyStatus {
            games_played_today: played,
            remaining_games: self.rules.max_games_per_day().saturating_sub(played),
        };
        debug!(?status, "Daily status computed");
        Ok(status)
    }
}
