//! Database persistence layer for accounts, vocabulary and games.

mod error;
mod models;
mod repository;
mod schema; // Diesel generated schema - internal use only

use diesel_migrations::{EmbeddedMigrations, embed_migrations};

pub use error::{DbError, DbErrorKind};
pub use models::{
    AggregatedStats, AuthToken, GameRecord, GuessRecord, GuessUpdate, NewGame, NewUser, QuotaInsert,
    StoredGame, UpdateOutcome, User, WordRecord, encode_feedback,
};
pub use repository::GameRepository;

pub(crate) use models::{NewGuess, NewWord};

/// Schema migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");
