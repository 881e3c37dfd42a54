//! Word Guess server library - accounts, sessions and reporting over SQLite
//!
//! Wraps the scoring rules of the `word_guess` crate in a persistent,
//! multi-user service.
//!
//! # Architecture
//!
//! - **Session**: start games under a daily quota, submit guesses, report status
//! - **Identity**: registration, password checks and bearer tokens
//! - **Admin**: daily and per-user reports, vocabulary management
//! - **Db**: diesel repository with atomic quota and guess updates
//! - **Http**: axum router exposing all of the above under `/api`
//!
//! # Example
//!
//! ```no_run
//! use word_guess::Rules;
//! use word_guess_server::{GameRepository, GameSessionManager, Principal};
//!
//! # fn example() -> anyhow::Result<()> {
//! let repository = GameRepository::new("word_guess.db".to_string())?;
//! repository.run_migrations()?;
//!
//! let sessions = GameSessionManager::new(repository, Rules::default());
//! let alice = Principal::new("alice".to_string(), false);
//! let started = sessions.start_session(&alice)?;
//! let outcome = sessions.submit_guess(&alice, *started.game_id(), "CRANE")?;
//! println!("{:?}", outcome.feedback());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod admin;
mod clock;
mod config;
mod db;
mod http;
mod identity;
mod session;
mod store;
mod validators;

// Crate-level exports - Admin
pub use admin::{
    AdminError, AdminErrorKind, AdminService, DailyReport, GameSummary, UserDayReport, UserReport,
};

// Crate-level exports - Time
pub use clock::{Clock, ManualClock, SystemClock, day_bounds, day_start};

// Crate-level exports - Configuration
pub use config::{ConfigError, ServerConfig};

// Crate-level exports - Persistence
pub use db::{
    AggregatedStats, AuthToken, DbError, DbErrorKind, GameRecord, GameRepository, GuessRecord,
    GuessUpdate, MIGRATIONS, NewGame, NewUser, QuotaInsert, StoredGame, UpdateOutcome, User,
    WordRecord, encode_feedback,
};

// Crate-level exports - HTTP
pub use http::{ApiError, AppState, router};

// Crate-level exports - Identity
pub use identity::{AuthError, AuthErrorKind, AuthService, IssuedToken, Principal};

// Crate-level exports - Sessions
pub use session::{DailyStatus, GameError, GameErrorKind, GameId, GameSessionManager, StartedGame};

// Crate-level exports - Storage seam
pub use store::GameStore;

// Crate-level exports - Input rules
pub use validators::{parse_report_date, validate_password, validate_username};
