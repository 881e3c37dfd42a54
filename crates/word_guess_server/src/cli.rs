//! Command-line interface for word_guess_server.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Word Guess - five-letter word game server with daily quotas
#[derive(Parser, Debug)]
#[command(name = "word_guess_server")]
#[command(about = "Word-guessing game server with accounts and admin reports", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Database file, overriding config and DATABASE_URL
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Apply pending database migrations and exit
    Migrate,

    /// Add a word to the vocabulary
    AddWord {
        /// Five uppercase letters
        word: String,
    },

    /// Print the vocabulary
    ListWords,

    /// Create an account, optionally with admin rights
    CreateUser {
        /// Account name
        username: String,

        /// Account password
        password: String,

        /// Grant admin rights
        #[arg(long)]
        admin: bool,
    },
}
