#![cfg(test)]

use super::deck::ChallengeDeck;
use super::DareGame;
use crate::data::{self, ChallengeKind, Difficulty};
use crate::error::GameError;
use crate::game::Participant;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn roster(count: usize) -> Vec<Participant> {
    (0..count)
        .map(|i| Participant {
            name: format!("PLAYER{}", i),
            emoji: "🎲".to_string(),
        })
        .collect()
}

#[test]
fn needs_at_least_one_player() {
    assert!(matches!(
        DareGame::new(&[], Difficulty::Easy, 0),
        Err(GameError::TooFewPlayers)
    ));
}

#[test]
fn turns_rotate_around_the_table() {
    let data = data::sample();
    let mut game = DareGame::new(&roster(3), Difficulty::Easy, 5).unwrap();

    for expected in ["PLAYER0", "PLAYER1", "PLAYER2", "PLAYER0"] {
        assert_eq!(game.current_player().name, expected);
        game.draw_challenge(ChallengeKind::Action, &data).unwrap();
        game.next_player().unwrap();
    }
    assert_eq!(game.challenges_played(), 4);
}

#[test]
fn challenge_must_be_resolved_before_the_next_draw() {
    let data = data::sample();
    let mut game = DareGame::new(&roster(2), Difficulty::Easy, 5).unwrap();

    // No challenge on display yet, so there is nothing to resolve.
    assert!(matches!(game.next_player(), Err(GameError::InvalidAction)));

    game.draw_challenge(ChallengeKind::Truth, &data).unwrap();
    assert!(matches!(
        game.draw_challenge(ChallengeKind::Truth, &data),
        Err(GameError::InvalidAction)
    ));

    game.next_player().unwrap();
    game.draw_challenge(ChallengeKind::Action, &data).unwrap();
}

#[test]
fn difficulty_changes_only_between_challenges() {
    let data = data::sample();
    let mut game = DareGame::new(&roster(2), Difficulty::Easy, 5).unwrap();

    game.set_difficulty(Difficulty::Hard).unwrap();
    assert_eq!(game.difficulty(), Difficulty::Hard);

    game.draw_challenge(ChallengeKind::Action, &data).unwrap();
    assert!(matches!(
        game.set_difficulty(Difficulty::Easy),
        Err(GameError::InvalidAction)
    ));

    game.next_player().unwrap();
    game.set_difficulty(Difficulty::Easy).unwrap();
}

#[test]
fn deck_never_repeats_until_the_bucket_is_exhausted() {
    let data = data::sample();
    let pool = data.challenges(Difficulty::Easy, ChallengeKind::Action);
    let mut deck = ChallengeDeck::new();
    let mut rng = ChaCha8Rng::seed_from_u64(9);

    let mut drawn = vec![];
    for _ in 0..pool.len() {
        let challenge = deck.draw(&data, Difficulty::Easy, ChallengeKind::Action, &mut rng);
        assert!(!drawn.contains(&challenge.id));
        drawn.push(challenge.id);
    }

    // The whole bucket has been seen once.
    assert_eq!(deck.num_used(Difficulty::Easy, ChallengeKind::Action), pool.len());
    for challenge in pool {
        assert!(deck.is_used(Difficulty::Easy, ChallengeKind::Action, challenge.id));
    }

    // The next draw resets the bucket and starts over without erroring.
    let challenge = deck.draw(&data, Difficulty::Easy, ChallengeKind::Action, &mut rng);
    assert_eq!(deck.num_used(Difficulty::Easy, ChallengeKind::Action), 1);
    assert!(deck.is_used(Difficulty::Easy, ChallengeKind::Action, challenge.id));
}

#[test]
fn buckets_are_tracked_independently() {
    let data = data::sample();
    let mut deck = ChallengeDeck::new();
    let mut rng = ChaCha8Rng::seed_from_u64(2);

    deck.draw(&data, Difficulty::Easy, ChallengeKind::Action, &mut rng);
    deck.draw(&data, Difficulty::Hard, ChallengeKind::Truth, &mut rng);

    assert_eq!(deck.num_used(Difficulty::Easy, ChallengeKind::Action), 1);
    assert_eq!(deck.num_used(Difficulty::Easy, ChallengeKind::Truth), 0);
    assert_eq!(deck.num_used(Difficulty::Hard, ChallengeKind::Truth), 1);
}

#[test]
fn drawing_well_past_the_pool_size_never_errors() {
    let data = data::sample();
    let pool_len = data.challenges(Difficulty::Medium, ChallengeKind::Action).len();
    let mut deck = ChallengeDeck::new();
    let mut rng = ChaCha8Rng::seed_from_u64(4);

    for _ in 0..pool_len * 5 {
        deck.draw(&data, Difficulty::Medium, ChallengeKind::Action, &mut rng);
    }
    assert!(deck.num_used(Difficulty::Medium, ChallengeKind::Action) <= pool_len);
}
