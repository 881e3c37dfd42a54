//! Tests for guess scoring.

use word_guess::{LetterFeedback, is_solved, score};

use LetterFeedback::{Correct as C, NotInWord as N, WrongPosition as W};

#[test]
fn test_identical_words_all_correct() {
    let feedback = score("APPLE", "APPLE");
    assert_eq!(feedback, vec![C, C, C, C, C]);
    assert!(is_solved(&feedback));
}

#[test]
fn test_partial_overlap() {
    // R and A occur in CHAIR, just not where BREAD has them.
    assert_eq!(score("BREAD", "CHAIR"), vec![N, W, N, W, N]);
}

#[test]
fn test_disjoint_letters() {
    assert_eq!(score("JOKER", "PLANT"), vec![N, N, N, N, N]);
}

#[test]
fn test_exact_match_takes_priority_over_earlier_displaced_match() {
    // The first L would claim ALARM's only L if exact matches were not taken first.
    assert_eq!(score("LLAMA", "ALARM"), vec![N, C, C, W, W]);
}

#[test]
fn test_tiger_scenario_guesses() {
    assert_eq!(score("STORM", "TIGER"), vec![N, W, N, W, N]);
    assert_eq!(score("RIVER", "TIGER"), vec![N, C, N, C, C]);
    assert_eq!(score("TIGER", "TIGER"), vec![C, C, C, C, C]);
}

#[test]
fn test_repeated_guess_letter_with_single_target_occurrence() {
    // Only the leftmost unmatched E gets credit.
    assert_eq!(score("EERIE", "THEME"), vec![W, N, N, N, C]);
}

#[test]
fn test_repeated_target_letter_claimed_left_to_right() {
    assert_eq!(score("OTTER", "TOAST"), vec![W, W, W, N, N]);
}

#[test]
fn test_scoring_is_pure() {
    let first = score("LLAMA", "ALARM");
    for _ in 0..10 {
        assert_eq!(score("LLAMA", "ALARM"), first);
    }
}

#[test]
fn test_non_letter_inputs_are_scored() {
    assert_eq!(score("12345", "54321"), vec![W, W, C, W, W]);
    assert_eq!(score("a b c", "a b c"), vec![C, C, C, C, C]);
}

#[test]
fn test_unequal_lengths_follow_guess_length() {
    assert_eq!(score("AB", "BAC"), vec![W, W]);
    assert_eq!(score("ABC", "A"), vec![C, N, N]);
    assert!(score("", "APPLE").is_empty());
}

#[test]
fn test_is_solved_rejects_partial_and_empty() {
    assert!(!is_solved(&[C, C, W, C, C]));
    assert!(!is_solved(&[]));
}

#[test]
fn test_letter_credit_never_exceeds_target_occurrences() {
    // Every pair of 5-letter words over a three-letter alphabet.
    let alphabet = ['A', 'B', 'C'];
    let words: Vec<String> = (0..3usize.pow(5))
        .map(|mut n| {
            (0..5)
                .map(|_| {
                    let c = alphabet[n % 3];
                    n /= 3;
                    c
                })
                .collect()
        })
        .collect();

    for guess in &words {
        for target in &words {
            let feedback = score(guess, target);
            assert_eq!(feedback.len(), 5);
            for letter in alphabet {
                let credited = guess
                    .chars()
                    .zip(&feedback)
                    .filter(|(g, f)| *g == letter && **f != N)
                    .count();
                let available = target.chars().filter(|t| *t == letter).count();
                assert!(
                    credited <= available,
                    "{guess} vs {target}: {letter} credited {credited} times, target has {available}"
                );
            }
            for (i, (g, t)) in guess.chars().zip(target.chars()).enumerate() {
                assert_eq!(feedback[i] == C, g == t, "{guess} vs {target} at {i}");
            }
        }
    }
}

#[test]
fn test_feedback_serializes_snake_case() {
    let json = serde_json::to_string(&vec![C, W, N]).expect("Serialize failed");
    assert_eq!(json, r#"["correct","wrong_position","not_in_word"]"#);
    assert_eq!(W.to_string(), "wrong_position");
    assert_eq!("not_in_word".parse::<LetterFeedback>().expect("Parse failed"), N);
}
