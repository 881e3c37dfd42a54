//! Tests for the single-game state machine.

use chrono::{DateTime, Duration, TimeZone, Utc};
use word_guess::{
    Game, GameStatus, GuessError, LetterFeedback, MAX_GUESSES_PER_GAME, Rules, Word, WordError,
    validate_word_format,
};

fn word(s: &str) -> Word {
    Word::parse(s).expect("Invalid test word")
}

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()
}

#[test]
fn test_new_game_is_open() {
    let rules = Rules::default();
    let game = Game::new(word("TIGER"), start());
    assert_eq!(game.status(), GameStatus::Open);
    assert!(!game.won());
    assert!(!game.completed());
    assert!(game.completed_at().is_none());
    assert_eq!(game.guesses_remaining(&rules), MAX_GUESSES_PER_GAME);
}

#[test]
fn test_new_game_keeps_target_and_start_time() {
    let game = Game::new(word("TIGER"), start());
    assert_eq!(game.target().as_str(), "TIGER");
    assert_eq!(game.started_at(), start());
    assert!(game.guesses().is_empty());

    let rules = Rules::new(4, 2);
    assert_eq!(rules.max_guesses_per_game(), 4);
    assert_eq!(rules.max_games_per_day(), 2);
}

#[test]
fn test_tiger_scenario() {
    let rules = Rules::default();
    let mut game = Game::new(word("TIGER"), start());

    let first = game
        .submit(word("STORM"), &rules, start() + Duration::seconds(10))
        .expect("Guess rejected");
    assert!(!*first.won());
    assert!(!*first.completed());
    assert_eq!(*first.guesses_remaining(), 4);
    assert!(first.revealed_target().is_none());

    let second = game
        .submit(word("RIVER"), &rules, start() + Duration::seconds(20))
        .expect("Guess rejected");
    assert_eq!(*second.status(), GameStatus::Open);

    let finish = start() + Duration::seconds(30);
    let third = game
        .submit(word("TIGER"), &rules, finish)
        .expect("Guess rejected");
    assert_eq!(third.feedback(), &vec![LetterFeedback::Correct; 5]);
    assert!(*third.won());
    assert!(*third.completed());
    assert_eq!(*third.guesses_remaining(), 2);
    assert!(third.revealed_target().is_none());

    assert_eq!(game.status(), GameStatus::Won);
    assert_eq!(game.completed_at(), Some(finish));
    let words: Vec<&str> = game.guesses().iter().map(|g| g.word().as_str()).collect();
    assert_eq!(words, vec!["STORM", "RIVER", "TIGER"]);
}

#[test]
fn test_exhausting_guesses_loses_and_reveals_target() {
    let rules = Rules::default();
    let mut game = Game::new(word("TIGER"), start());
    let misses = ["APPLE", "BREAD", "CHAIR", "DANCE"];

    for miss in misses {
        let outcome = game
            .submit(word(miss), &rules, start())
            .expect("Guess rejected");
        assert!(!*outcome.completed());
        assert!(outcome.revealed_target().is_none());
    }

    let last = game
        .submit(word("EAGLE"), &rules, start())
        .expect("Guess rejected");
    assert!(*last.completed());
    assert!(!*last.won());
    assert_eq!(*last.guesses_remaining(), 0);
    assert_eq!(last.revealed_target().as_ref(), Some(&word("TIGER")));
    assert_eq!(game.status(), GameStatus::Lost);
}

#[test]
fn test_win_on_last_allowed_guess_does_not_reveal() {
    let rules = Rules::new(2, 3);
    let mut game = Game::new(word("OCEAN"), start());
    game.submit(word("PIANO"), &rules, start())
        .expect("Guess rejected");
    let last = game
        .submit(word("OCEAN"), &rules, start())
        .expect("Guess rejected");
    assert!(*last.won());
    assert!(*last.completed());
    assert!(last.revealed_target().is_none());
}

#[test]
fn test_completed_game_rejects_guess_unchanged() {
    let rules = Rules::default();
    let mut game = Game::new(word("LEMON"), start());
    game.submit(word("LEMON"), &rules, start())
        .expect("Guess rejected");
    let before = game.clone();

    let result = game.submit(word("MOUSE"), &rules, start());
    assert_eq!(result, Err(GuessError::AlreadyCompleted));
    assert_eq!(game, before);
}

#[test]
fn test_full_but_open_game_hits_guess_limit() {
    // A stored game whose limit was lowered after it filled up.
    let rules = Rules::new(1, 3);
    let guesses = vec![];
    let mut game = Game::restore(word("KNIFE"), guesses, false, false, start(), None);
    game.submit(word("QUEEN"), &Rules::new(2, 3), start())
        .expect("Guess rejected");

    let result = game.submit(word("NIGHT"), &rules, start());
    assert_eq!(result, Err(GuessError::GuessLimitReached));
    assert_eq!(game.guesses().len(), 1);
}

#[test]
fn test_guess_count_and_flags_are_monotonic() {
    let rules = Rules::default();
    let mut game = Game::new(word("HOUSE"), start());
    let attempts = ["MOUSE", "HOUSE", "HOUSE", "GRAPE", "IMAGE", "FLAME", "JOKER"];
    let mut last_len = 0;
    let mut seen_won = false;
    let mut seen_completed = false;

    for attempt in attempts {
        let _ = game.submit(word(attempt), &rules, start());
        assert!(game.guesses().len() >= last_len);
        assert!(game.guesses().len() <= MAX_GUESSES_PER_GAME);
        assert!(!seen_won || game.won());
        assert!(!seen_completed || game.completed());
        last_len = game.guesses().len();
        seen_won = game.won();
        seen_completed = game.completed();
    }
    assert_eq!(game.guesses().len(), 2);
}

#[test]
fn test_status_terminal_states() {
    assert!(!GameStatus::Open.is_terminal());
    assert!(GameStatus::Won.is_terminal());
    assert!(GameStatus::Lost.is_terminal());
}

#[test]
fn test_word_validation_reasons() {
    assert_eq!(validate_word_format("APPLE"), Ok(()));
    assert_eq!(validate_word_format("APPL"), Err(WordError::WrongLength));
    assert_eq!(validate_word_format("APPLES"), Err(WordError::WrongLength));
    assert_eq!(validate_word_format(""), Err(WordError::WrongLength));
    assert_eq!(validate_word_format("apple"), Err(WordError::InvalidCharacters));
    assert_eq!(validate_word_format("APP1E"), Err(WordError::InvalidCharacters));
    assert_eq!(validate_word_format("ÄPFEL"), Err(WordError::InvalidCharacters));
    assert_eq!(
        WordError::WrongLength.to_string(),
        "Word must be exactly 5 characters long"
    );
}

#[test]
fn test_word_parse_and_serde() {
    let parsed: Word = "GRAPE".parse().expect("Parse failed");
    assert_eq!(parsed.as_str(), "GRAPE");
    assert_eq!(parsed.to_string(), "GRAPE");

    let json = serde_json::to_string(&parsed).expect("Serialize failed");
    assert_eq!(json, "\"GRAPE\"");
    let bad: Result<Word, _> = serde_json::from_str("\"grape\"");
    assert!(bad.is_err());
}

#[test]
fn test_rules_deserialize_with_defaults() {
    let rules: Rules = serde_json::from_str(r#"{"max_games_per_day": 10}"#).expect("Parse failed");
    assert_eq!(rules.max_games_per_day(), 10);
    assert_eq!(rules.max_guesses_per_game(), MAX_GUESSES_PER_GAME);
}
