//! Admin reporting and vocabulary management.

use chrono::{NaiveDate, NaiveDateTime};
use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use word_guess::Word;

use crate::clock::{Clock, SystemClock, day_bounds};
use crate::db::{AggregatedStats, DbError, GameRecord, GameRepository};
use crate::identity::Principal;
use crate::validators::parse_report_date;

/// What went wrong in an admin operation.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum AdminErrorKind {
    /// Caller is not an admin.
    #[display("Admin access required")]
    Forbidden,
    /// Malformed input.
    #[display("{_0}")]
    Validation(String),
    /// Referenced user does not exist.
    #[display("User not found")]
    UserNotFound,
    /// Word is already in the vocabulary.
    #[display("Word already exists in database")]
    DuplicateWord,
    /// Storage failure.
    #[display("Internal error: {_0}")]
    Infrastructure(String),
}

/// Admin error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Admin error: {} at {}:{}", kind, file, line)]
pub struct AdminError {
    /// What failed.
    pub kind: AdminErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl AdminError {
    /// Creates a new admin error with caller location tracking.
    #[track_caller]
    pub fn new(kind: AdminErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<DbError> for AdminError {
    #[track_caller]
    fn from(err: DbError) -> Self {
        error!(error = %err, "Admin storage failure");
        Self::new(AdminErrorKind::Infrastructure(err.to_string()))
    }
}

/// Play statistics for one UTC day.
#[derive(Debug, Clone, PartialEq, Serialize, Getters)]
pub struct DailyReport {
    date: NaiveDate,
    total_users: usize,
    total_games: i64,
    correct_guesses: i64,
    success_rate: f64,
}

/// One game as shown in a user report.
#[derive(Debug, Clone, PartialEq, Serialize, Getters)]
pub struct GameSummary {
    game_id: i32,
    target_word: String,
    won: bool,
    guesses_count: i32,
    started_at: NaiveDateTime,
    completed_at: Option<NaiveDateTime>,
}

impl From<&GameRecord> for GameSummary {
    fn from(game: &GameRecord) -> Self {
        Self {
            game_id: *game.id(),
            target_word: game.target_word().clone(),
            won: *game.won(),
            guesses_count: *game.guess_count(),
            started_at: *game.started_at(),
            completed_at: *game.completed_at(),
        }
    }
}

/// A user's games on one UTC day.
#[derive(Debug, Clone, PartialEq, Serialize, Getters)]
pub struct UserDayReport {
    date: NaiveDate,
    games_played: usize,
    games_won: usize,
    games: Vec<GameSummary>,
}

/// A user's complete play history.
#[derive(Debug, Clone, PartialEq, Serialize, Getters)]
pub struct UserReport {
    username: String,
    total_games: i64,
    total_wins: i64,
    win_rate: f64,
    daily_reports: Vec<UserDayReport>,
}

/// Admin-only operations over completed and running games and the vocabulary.
#[derive(Debug, Clone)]
pub struct AdminService {
    repository: GameRepository,
    clock: Arc<dyn Clock>,
}

impl AdminService {
    /// Creates an admin service backed by the given repository.
    pub fn new(repository: GameRepository) -> Self {
        Self::with_clock(repository, Arc::new(SystemClock))
    }

    /// Creates an admin service reading "today" from `clock`.
    #[instrument(skip(repository, clock))]
    pub fn with_clock(repository: GameRepository, clock: Arc<dyn Clock>) -> Self {
        info!("Creating AdminService");
        Self { repository, clock }
    }

    #[instrument(skip_all, fields(username = %principal.username()))]
    fn require_admin(principal: &Principal) -> Result<(), AdminError> {
        if *principal.is_admin() {
            Ok(())
        } else {
            warn!("Admin operation refused");
            Err(AdminError::new(AdminErrorKind::Forbidden))
        }
    }

    /// Aggregates every game started on `date` (`YYYY-MM-DD`, UTC), or on
    /// today when no date is given.
    ///
    /// # Errors
    ///
    /// Returns [`AdminErrorKind::Forbidden`] for non-admins, checked before the
    /// date is read, and [`AdminErrorKind::Validation`] for a malformed date.
    #[instrument(skip(self, principal))]
    pub fn daily_report(
        &self,
        principal: &Principal,
        date: Option<&str>,
    ) -> Result<DailyReport, AdminError> {
        Self::require_admin(principal)?;

        let date = match date {
            Some(raw) => parse_report_date(raw)
                .map_err(|message| AdminError::new(AdminErrorKind::Validation(message)))?,
            None => self.clock.now().date_naive(),
        };

        let (from, until) = day_bounds(date);
        let games = self.repository.games_started_between(from, until)?;
        let stats = AggregatedStats::from_games(&games);
        let total_users = games
            .iter()
            .map(|g| g.username().as_str())
            .collect::<HashSet<_>>()
            .len();

        let report = DailyReport {
            date,
            total_users,
            total_games: *stats.total_games(),
            correct_guesses: *stats.wins(),
            success_rate: stats.win_rate(),
        };
        info!(?report, "Daily report built");
        Ok(report)
    }

    /// Builds the full history of `username`, grouped by start day.
    ///
    /// # Errors
    ///
    /// Returns [`AdminErrorKind::Forbidden`] for non-admins and
    /// [`AdminErrorKind::UserNotFound`] for unknown users.
    #[instrument(skip(self, principal))]
    pub fn user_report(
        &self,
        principal: &Principal,
        username: &str,
    ) -> Result<UserReport, AdminError> {
        Self::require_admin(principal)?;

        if username.is_empty() {
            return Err(AdminError::new(AdminErrorKind::Validation(
                "Username parameter is required".to_string(),
            )));
        }
        if self.repository.get_user_by_name(username)?.is_none() {
            return Err(AdminError::new(AdminErrorKind::UserNotFound));
        }

        let games = self.repository.games_for_user(username)?;
        let stats = AggregatedStats::from_games(&games);

        let mut days: BTreeMap<NaiveDate, UserDayReport> = BTreeMap::new();
        for game in &games {
            let date = game.started_at().date();
            let day = days.entry(date).or_insert_with(|| UserDayReport {
                date,
                games_played: 0,
                games_won: 0,
                games: Vec::new(),
            });
            day.games_played += 1;
            if *game.won() {
                day.games_won += 1;
            }
            day.games.push(GameSummary::from(game));
        }

        let report = UserReport {
            username: username.to_string(),
            total_games: *stats.total_games(),
            total_wins: *stats.wins(),
            win_rate: stats.win_rate(),
            daily_reports: days.into_values().collect(),
        };
        info!(total_games = report.total_games, days = report.daily_reports.len(), "User report built");
        Ok(report)
    }

    /// Adds a word to the vocabulary.
    ///
    /// # Errors
    ///
    /// Returns [`AdminErrorKind::Validation`] for malformed words and
    /// [`AdminErrorKind::DuplicateWord`] if the word is already present.
    #[instrument(skip(self, principal))]
    pub fn add_word(&self, principal: &Principal, word: &str) -> Result<Word, AdminError> {
        Self::require_admin(principal)?;
        self.insert_word(word)
    }

    /// Adds a word without an admin principal; for operator tooling.
    ///
    /// # Errors
    ///
    /// Same as [`AdminService::add_word`] minus the admin check.
    #[instrument(skip(self))]
    pub fn insert_word(&self, word: &str) -> Result<Word, AdminError> {
        let word = Word::parse(word)
            .map_err(|e| AdminError::new(AdminErrorKind::Validation(e.to_string())))?;

        if self.repository.find_word(word.as_str())?.is_some() {
            warn!("Duplicate word");
            return Err(AdminError::new(AdminErrorKind::DuplicateWord));
        }
        self.repository.insert_word(word.as_str()).map_err(|e| {
            if e.is_unique_violation() {
                AdminError::new(AdminErrorKind::DuplicateWord)
            } else {
                AdminError::from(e)
            }
        })?;

        info!(%word, "Word added to vocabulary");
        Ok(word)
    }

    /// Lists the vocabulary alphabetically.
    ///
    /// # Errors
    ///
    /// Returns [`AdminErrorKind::Forbidden`] for non-admins.
    #[instrument(skip(self, principal))]
    pub fn list_words(&self, principal: &Principal) -> Result<Vec<String>, AdminError> {
        Self::require_admin(principal)?;
        Ok(self.repository.list_words()?)
    }

    /// Lists the vocabulary without an admin principal; for operator tooling.
    ///
    /// # Errors
    ///
    /// Returns [`AdminErrorKind::Infrastructure`] on storage failure.
    #[instrument(skip(self))]
    pub fn all_words(&self) -> Result<Vec<String>, AdminError> {
        Ok(self.repository.list_words()?)
    }
}
