//! Word Guess - pure game logic.
//!
//! This crate holds everything about a single word-guessing game that does not
//! touch storage, the network or the wall clock:
//!
//! - **Word**: the validated 5-letter uppercase word type
//! - **Feedback**: the two-pass letter scoring of a guess against a target
//! - **Game**: the bounded-attempt state machine for one session
//!
//! # Example
//!
//! ```
//! use chrono::Utc;
//! use word_guess::{Game, GameStatus, Rules, Word};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let rules = Rules::default();
//! let mut game = Game::new(Word::parse("TIGER")?, Utc::now());
//!
//! let outcome = game.submit(Word::parse("TIGER")?, &rules, Utc::now())?;
//! assert!(*outcome.won());
//! assert_eq!(game.status(), GameStatus::Won);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod feedback;
mod game;
mod word;

pub use feedback::{LetterFeedback, is_solved, score};
pub use game::{
    Game, GameStatus, Guess, GuessError, GuessOutcome, MAX_GAMES_PER_DAY, MAX_GUESSES_PER_GAME,
    Rules,
};
pub use word::{WORD_LENGTH, Word, WordError, validate_word_format};
