//! Identity provider: accounts, password checks and bearer tokens.
//!
//! Game and admin operations never look at credentials. They receive a
//! [`Principal`] that this module produced from a token, and trust it.

use chrono::{DateTime, Duration, Utc};
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_new::new;
use rand::Rng;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::clock::{Clock, SystemClock};
use crate::db::{AuthToken, DbError, GameRepository, NewUser};
use crate::validators::{validate_password, validate_username};

const TOKEN_BYTES: usize = 32;

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Getters, new)]
pub struct Principal {
    username: String,
    is_admin: bool,
}

/// A freshly issued bearer token.
#[derive(Debug, Clone, Serialize, Getters)]
pub struct IssuedToken {
    token: String,
    principal: Principal,
    expires_at: DateTime<Utc>,
}

/// What went wrong while registering, logging in or authenticating.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum AuthErrorKind {
    /// Username or password broke a format rule.
    #[display("{_0}")]
    Validation(String),
    /// Registration with a name that already exists.
    #[display("Username already exists")]
    UsernameTaken,
    /// Unknown user or wrong password.
    #[display("Invalid credentials")]
    InvalidCredentials,
    /// Request carried no bearer token.
    #[display("No token provided")]
    MissingToken,
    /// Token unknown or its user is gone.
    #[display("Invalid token")]
    InvalidToken,
    /// Token past its expiry.
    #[display("Token expired")]
    TokenExpired,
    /// Storage failure.
    #[display("Internal error: {_0}")]
    Infrastructure(String),
}

/// Identity error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Auth error: {} at {}:{}", kind, file, line)]
pub struct AuthError {
    /// What failed.
    pub kind: AuthErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl AuthError {
    /// Creates a new identity error with caller location tracking.
    #[track_caller]
    pub fn new(kind: AuthErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<bcrypt::BcryptError> for AuthError {
    #[track_caller]
    fn from(err: bcrypt::BcryptError) -> Self {
        error!(error = %err, "Password hashing failure");
        Self::new(AuthErrorKind::Infrastructure(err.to_string()))
    }
}

impl From<DbError> for AuthError {
    #[track_caller]
    fn from(err: DbError) -> Self {
        error!(error = %err, "Identity storage failure");
        Self::new(AuthErrorKind::Infrastructure(err.to_string()))
    }
}

/// Registers accounts, checks passwords and resolves tokens to principals.
#[derive(Debug, Clone)]
pub struct AuthService {
    repository: GameRepository,
    token_ttl: Duration,
    hash_cost: u32,
    clock: Arc<dyn Clock>,
}

impl AuthService {
    /// Creates an identity service using the system clock.
    #[instrument(skip(repository))]
    pub fn new(repository: GameRepository, token_ttl: Duration) -> Self {
        Self::with_clock(repository, token_ttl, Arc::new(SystemClock))
    }

    /// Creates an identity service reading time from `clock`.
    #[instrument(skip(repository, clock))]
    pub fn with_clock(repository: GameRepository, token_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        info!("Creating AuthService");
        Self {
            repository,
            token_ttl,
            hash_cost: bcrypt::DEFAULT_COST,
            clock,
        }
    }

    /// Sets the bcrypt cost used for new password hashes.
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    /// Self-service registration. Never grants admin rights.
    ///
    /// # Errors
    ///
    /// Returns [`AuthErrorKind::Validation`] for malformed credentials and
    /// [`AuthErrorKind::UsernameTaken`] for duplicates.
    #[instrument(skip(self, password))]
    pub fn register(&self, username: &str, password: &str) -> Result<Principal, AuthError> {
        self.create_user(username, password, false)
    }

    /// Creates an account with the given admin flag.
    ///
    /// # Errors
    ///
    /// Same as [`AuthService::register`].
    #[instrument(skip(self, password))]
    pub fn create_user(
        &self,
        username: &str,
        password: &str,
        is_admin: bool,
    ) -> Result<Principal, AuthError> {
        validate_username(username).map_err(|m| AuthError::new(AuthErrorKind::Validation(m)))?;
        validate_password(password).map_err(|m| AuthError::new(AuthErrorKind::Validation(m)))?;

        if self.repository.get_user_by_name(username)?.is_some() {
            warn!("Username already registered");
            return Err(AuthError::new(AuthErrorKind::UsernameTaken));
        }

        let password_hash = bcrypt::hash(password, self.hash_cost)?;
        let new_user = NewUser::new(username.to_string(), password_hash, is_admin);
        let user = self.repository.create_user(new_user).map_err(|e| {
            if e.is_unique_violation() {
                AuthError::new(AuthErrorKind::UsernameTaken)
            } else {
                AuthError::from(e)
            }
        })?;

        info!(user_id = user.id(), is_admin, "Account created");
        Ok(Principal::new(user.username().clone(), *user.is_admin()))
    }

    /// Checks credentials and issues a bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`AuthErrorKind::InvalidCredentials`] for an unknown user or a
    /// wrong password.
    #[instrument(skip(self, password))]
    pub fn login(&self, username: &str, password: &str) -> Result<IssuedToken, AuthError> {
        if username.is_empty() || password.is_empty() {
            return Err(AuthError::new(AuthErrorKind::Validation(
                "Username and password are required".to_string(),
            )));
        }

        let Some(user) = self.repository.get_user_by_name(username)? else {
            warn!("Login for unknown user");
            return Err(AuthError::new(AuthErrorKind::InvalidCredentials));
        };
        if !bcrypt::verify(password, user.password_hash())? {
            warn!("Login with wrong password");
            return Err(AuthError::new(AuthErrorKind::InvalidCredentials));
        }

        let now = self.clock.now();
        if let Err(e) = self.repository.purge_expired_tokens(now.naive_utc()) {
            warn!(error = %e, "Could not purge expired tokens");
        }

        let expires_at = now + self.token_ttl;
        let token = generate_token();
        self.repository.insert_token(&AuthToken::new(
            token.clone(),
            user.username().clone(),
            now.naive_utc(),
            expires_at.naive_utc(),
        ))?;

        info!(%expires_at, "Token issued");
        Ok(IssuedToken {
            token,
            principal: Principal::new(user.username().clone(), *user.is_admin()),
            expires_at,
        })
    }

    /// Resolves a bearer token to the principal it was issued to.
    ///
    /// The admin flag is read from the account on every call, so revoking it
    /// takes effect for tokens already handed out.
    ///
    /// # Errors
    ///
    /// Returns [`AuthErrorKind::InvalidToken`] or [`AuthErrorKind::TokenExpired`].
    #[instrument(skip_all)]
    pub fn authenticate(&self, token: &str) -> Result<Principal, AuthError> {
        let Some(stored) = self.repository.find_token(token)? else {
            debug!("Unknown token");
            return Err(AuthError::new(AuthErrorKind::InvalidToken));
        };

        if self.clock.now().naive_utc() >= *stored.expires_at() {
            debug!(username = %stored.username(), "Expired token");
            return Err(AuthError::new(AuthErrorKind::TokenExpired));
        }

        let Some(user) = self.repository.get_user_by_name(stored.username())? else {
            warn!(username = %stored.username(), "Token for missing user");
            return Err(AuthError::new(AuthErrorKind::InvalidToken));
        };

        debug!(username = %user.username(), "Token accepted");
        Ok(Principal::new(user.username().clone(), *user.is_admin()))
    }
}

fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokens_are_long_and_distinct() {
        let a = generate_token();
        assert_eq!(a.len(), TOKEN_BYTES * 2);
        assert_ne!(a, generate_token());
    }
}
