//! Word Guess server - unified CLI
//!
//! Serves the REST API and offers operator commands for the database.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use tracing::{info, instrument};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use word_guess_server::{
    AdminService, AppState, AuthService, GameRepository, GameSessionManager, ServerConfig, router,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,word_guess_server=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = ServerConfig::load(cli.config.as_deref())?;
    if let Some(url) = cli.database_url {
        config = config.with_database_url(url);
    }

    match cli.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config = config.with_host(host);
            }
            if let Some(port) = port {
                config = config.with_port(port);
            }
            run_server(config).await
        }
        Command::Migrate => {
            open_repository(&config)?;
            info!("Database is up to date");
            Ok(())
        }
        Command::AddWord { word } => {
            let admin = AdminService::new(open_repository(&config)?);
            let word = admin.insert_word(&word.trim().to_uppercase())?;
            println!("Added {}", word);
            Ok(())
        }
        Command::ListWords => {
            let admin = AdminService::new(open_repository(&config)?);
            let words = admin.all_words()?;
            for word in &words {
                println!("{}", word);
            }
            println!("{} word(s)", words.len());
            Ok(())
        }
        Command::CreateUser {
            username,
            password,
            admin,
        } => {
            let auth = AuthService::new(open_repository(&config)?, config.token_ttl())
                .with_hash_cost(*config.password_hash_cost());
            let principal = auth.create_user(&username, &password, admin)?;
            println!(
                "Created {}{}",
                principal.username(),
                if *principal.is_admin() { " (admin)" } else { "" }
            );
            Ok(())
        }
    }
}

/// Opens the configured database and brings its schema up to date.
#[instrument(skip_all, fields(database = %config.database_url()))]
fn open_repository(config: &ServerConfig) -> Result<GameRepository> {
    let repository = GameRepository::new(config.database_url().clone())?;
    repository
        .run_migrations()
        .context("Failed to migrate database")?;
    Ok(repository)
}

/// Run the HTTP API server until Ctrl-C.
#[instrument(skip_all, fields(host = %config.host(), port = config.port()))]
async fn run_server(config: ServerConfig) -> Result<()> {
    info!("Starting Word Guess API server");

    let repository = open_repository(&config)?;
    let sessions = GameSessionManager::new(repository.clone(), *config.rules());
    let auth = AuthService::new(repository.clone(), config.token_ttl())
        .with_hash_cost(*config.password_hash_cost());
    let admin = AdminService::new(repository);
    let app = router(AppState::new(sessions, auth, admin));

    let listener = tokio::net::TcpListener::bind((config.host().as_str(), *config.port()))
        .await
        .with_context(|| format!("Failed to bind {}:{}", config.host(), config.port()))?;
    info!("Server ready at http://{}:{}/api", config.host(), config.port());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Could not listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
