//! REST API over the session manager, identity provider and admin service.

mod error;
mod extract;
mod handlers;

use axum::Router;
use axum::extract::Request;
use axum::routing::{get, post};
use std::sync::Arc;
use tower::ServiceBuilder;
use tracing::{debug, info, instrument};

pub use error::ApiError;

use crate::admin::AdminService;
use crate::db::GameRepository;
use crate::identity::AuthService;
use crate::session::GameSessionManager;

/// Services shared by every request.
#[derive(Debug, Clone)]
pub struct AppState {
    sessions: Arc<GameSessionManager<GameRepository>>,
    auth: Arc<AuthService>,
    admin: Arc<AdminService>,
}

impl AppState {
    /// Bundles the services the handlers call into.
    #[instrument(skip_all)]
    pub fn new(
        sessions: GameSessionManager<GameRepository>,
        auth: AuthService,
        admin: AdminService,
    ) -> Self {
        debug!("Creating AppState");
        Self {
            sessions: Arc::new(sessions),
            auth: Arc::new(auth),
            admin: Arc::new(admin),
        }
    }
}

/// Builds the `/api` router.
#[instrument(skip(state))]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(handlers::health))
        // Accounts
        .route("/api/auth/register", post(handlers::register))
        .route("/api/auth/login", post(handlers::login))
        // Game
        .route("/api/game/start", post(handlers::start_game))
        .route("/api/game/guess", post(handlers::submit_guess))
        .route("/api/game/status", get(handlers::game_status))
        // Admin
        .route("/api/admin/daily-report", get(handlers::daily_report))
        .route("/api/admin/user-report", get(handlers::user_report))
        .route("/api/admin/add-word", post(handlers::add_word))
        .route("/api/admin/words", get(handlers::list_words))
        .fallback(handlers::not_found)
        .layer(ServiceBuilder::new().map_request(|req: Request| {
            info!(method = %req.method(), uri = %req.uri(), "Incoming HTTP request");
            req
        }))
        .with_state(state)
}
