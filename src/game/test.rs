#![cfg(test)]

use super::player::{assign_roles, Participant, Player, Role, RoleConfig, UNKNOWN_WORD};
use super::votes::VoteTally;
use super::winner;
use super::{Game, GameState, WinCondition};
use crate::data::{self, Difficulty, WordPair};
use crate::error::GameError;
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

fn player(name: &str, role: Role, alive: bool) -> Player {
    Player {
        name: name.to_string(),
        emoji: "🎲".to_string(),
        role,
        word: String::new(),
        alive,
    }
}

fn test_pair() -> WordPair {
    WordPair {
        id: 1,
        civilian: "Chat".to_string(),
        undercover: "Chien".to_string(),
        difficulty: Difficulty::Easy,
    }
}

fn game_with(players: Vec<Player>, state: GameState) -> Game {
    Game {
        config: RoleConfig::suggest(players.len()),
        difficulty: Difficulty::Easy,
        pair: test_pair(),
        players,
        state,
        round: 1,
    }
}

#[test]
fn can_create_game() {
    let data = data::sample();
    let config = RoleConfig { civilians: 3, undercover: 1, blanks: 1 };
    let game = Game::new(&roster(5), config, Difficulty::Easy, &data, 0).unwrap();

    assert!(matches!(game.state, GameState::Describing { cursor: 0 }));
    assert_eq!(game.round(), 1);
    assert_eq!(game.num_players(), 5);
    assert_eq!(game.num_players_alive(), 5);
}

#[test]
fn suggested_config_follows_roster_size() {
    let config = RoleConfig::suggest(4);
    assert_eq!((config.civilians, config.undercover, config.blanks), (3, 1, 0));

    let config = RoleConfig::suggest(5);
    assert_eq!((config.civilians, config.undercover, config.blanks), (3, 1, 1));

    let config = RoleConfig::suggest(7);
    assert_eq!((config.civilians, config.undercover, config.blanks), (4, 2, 1));
}

#[test]
fn assignment_matches_configured_counts() {
    for seed in 0..20 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let config = RoleConfig { civilians: 4, undercover: 2, blanks: 1 };
        let roles = assign_roles(&config, 7, &mut rng).unwrap();

        assert_eq!(roles.len(), 7);
        assert_eq!(roles.iter().filter(|r| **r == Role::Civilian).count(), 4);
        assert_eq!(roles.iter().filter(|r| **r == Role::Undercover).count(), 2);
        assert_eq!(roles.iter().filter(|r| **r == Role::Blank).count(), 1);
    }
}

#[test]
fn assignment_deals_words_by_role() {
    let data = data::sample();
    let config = RoleConfig { civilians: 3, undercover: 1, blanks: 1 };
    let game = Game::new(&roster(5), config, Difficulty::Easy, &data, 17).unwrap();

    for player in &game.players {
        match player.role {
            Role::Civilian => assert_eq!(player.word, game.pair.civilian),
            Role::Undercover => assert_eq!(player.word, game.pair.undercover),
            Role::Blank => assert_eq!(player.word, UNKNOWN_WORD),
        }
        assert!(player.alive);
    }
    assert_ne!(game.pair.civilian, game.pair.undercover);

    // Every roster entry appears exactly once, in seating order.
    let names: Vec<_> = game.player_names().collect();
    assert_eq!(names, ["PLAYER0", "PLAYER1", "PLAYER2", "PLAYER3", "PLAYER4"]);
}

#[test]
fn invalid_configs_are_rejected() {
    let mut rng = ChaCha8Rng::seed_from_u64(0);

    // Counts must sum to the roster size.
    let config = RoleConfig { civilians: 3, undercover: 1, blanks: 0 };
    assert!(matches!(
        assign_roles(&config, 5, &mut rng),
        Err(GameError::InvalidRoleConfig)
    ));

    // At least one undercover agent.
    let config = RoleConfig { civilians: 5, undercover: 0, blanks: 0 };
    assert!(matches!(
        assign_roles(&config, 5, &mut rng),
        Err(GameError::InvalidRoleConfig)
    ));

    // At least one civilian.
    let config = RoleConfig { civilians: 0, undercover: 4, blanks: 1 };
    assert!(matches!(
        assign_roles(&config, 5, &mut rng),
        Err(GameError::InvalidRoleConfig)
    ));
}

#[test]
fn no_word_pair_for_difficulty() {
    // The sample dataset has no medium-tier word pairs.
    let data = data::sample();
    let config = RoleConfig { civilians: 3, undercover: 1, blanks: 1 };
    let result = Game::new(&roster(5), config, Difficulty::Medium, &data, 0);
    assert!(matches!(result, Err(GameError::NoWordPair)));
}

#[test]
fn civilians_win_once_all_infiltrators_are_out() {
    let players = vec![
        player("A", Role::Civilian, true),
        player("B", Role::Civilian, true),
        player("C", Role::Civilian, true),
        player("D", Role::Undercover, false),
        player("E", Role::Blank, false),
    ];
    assert_eq!(winner::evaluate(&players), Some(WinCondition::Civilians));
}

#[test]
fn undercover_wins_at_parity() {
    let players = vec![
        player("A", Role::Civilian, true),
        player("B", Role::Civilian, false),
        player("C", Role::Undercover, true),
    ];
    assert_eq!(winner::evaluate(&players), Some(WinCondition::Undercover));
}

#[test]
fn undercover_beats_blank_in_two_player_endgame() {
    // One undercover and one blank left: parity with the zero civilians is
    // checked first, so the undercover agent wins, never the blank.
    let players = vec![
        player("A", Role::Civilian, false),
        player("B", Role::Undercover, true),
        player("C", Role::Blank, true),
    ];
    assert_eq!(winner::evaluate(&players), Some(WinCondition::Undercover));
}

#[test]
fn blank_wins_final_two() {
    let players = vec![
        player("A", Role::Civilian, true),
        player("B", Role::Undercover, false),
        player("C", Role::Blank, true),
    ];
    assert_eq!(winner::evaluate(&players), Some(WinCondition::Blank));
}

#[test]
fn game_continues_while_civilians_hold_majority() {
    let players = vec![
        player("A", Role::Civilian, true),
        player("B", Role::Civilian, true),
        player("C", Role::Undercover, true),
        player("D", Role::Blank, true),
    ];
    assert_eq!(winner::evaluate(&players), None);
}

#[test]
fn describers_walk_the_alive_list_then_voting_opens() {
    let data = data::sample();
    let config = RoleConfig { civilians: 3, undercover: 1, blanks: 1 };
    let mut game = Game::new(&roster(5), config, Difficulty::Easy, &data, 3).unwrap();

    for turn in 0..4 {
        assert_eq!(game.current_describer(), Some(turn));
        game.advance_describer().unwrap();
        assert!(matches!(game.state, GameState::Describing { .. }));
    }
    // The fifth and final describer tips the game into voting.
    game.advance_describer().unwrap();
    assert!(matches!(game.state, GameState::Voting { .. }));
    assert!(matches!(
        game.advance_describer(),
        Err(GameError::InvalidAction)
    ));
}

#[test]
fn votes_are_rejected_outside_the_voting_phase() {
    let data = data::sample();
    let config = RoleConfig { civilians: 3, undercover: 1, blanks: 1 };
    let mut game = Game::new(&roster(5), config, Difficulty::Easy, &data, 3).unwrap();

    assert!(matches!(game.cast_vote(0), Err(GameError::InvalidAction)));
    assert!(matches!(game.end_voting(), Err(GameError::InvalidAction)));
    assert!(matches!(game.next_round(), Err(GameError::InvalidAction)));
}

#[test]
fn top_voted_player_is_eliminated() {
    let players = vec![
        player("A", Role::Civilian, true),
        player("B", Role::Civilian, true),
        player("C", Role::Civilian, true),
        player("D", Role::Undercover, true),
    ];
    let mut votes = VoteTally::new(4);
    votes.vote(3);
    votes.vote(3);
    votes.vote(1);
    let mut game = game_with(players, GameState::Voting { votes });

    game.end_voting().unwrap();

    assert!(!game.players[3].alive);
    assert_eq!(game.num_players_alive(), 3);
    assert!(matches!(game.state, GameState::Elimination { eliminated: 3 }));
}

#[test]
fn vote_ties_break_towards_the_first_seat() {
    let players = vec![
        player("A", Role::Civilian, true),
        player("B", Role::Civilian, true),
        player("C", Role::Undercover, true),
    ];
    let mut votes = VoteTally::new(3);
    votes.vote(1);
    votes.vote(2);
    let mut game = game_with(players, GameState::Voting { votes });

    game.end_voting().unwrap();

    assert!(!game.players[1].alive);
    assert!(game.players[2].alive);
}

#[test]
fn eliminated_players_cannot_be_voted_or_re_eliminated() {
    let mut players = vec![
        player("A", Role::Civilian, true),
        player("B", Role::Civilian, true),
        player("C", Role::Civilian, true),
        player("D", Role::Undercover, true),
    ];
    players[0].alive = false;
    let votes = VoteTally::new(4);
    let mut game = game_with(players, GameState::Voting { votes });

    assert!(matches!(
        game.cast_vote(0),
        Err(GameError::InvalidPlayerChoice)
    ));

    // With no votes cast at all, exactly one player still goes: the first
    // alive seat, never the already-eliminated one.
    game.end_voting().unwrap();
    assert!(!game.players[1].alive);
    assert_eq!(game.num_players_alive(), 2);
}

#[test]
fn five_player_game_plays_out_to_a_civilian_win() {
    let data = data::sample();
    let config = RoleConfig { civilians: 3, undercover: 1, blanks: 1 };
    let mut game = Game::new(&roster(5), config, Difficulty::Easy, &data, 11).unwrap();

    let blank = game.players.iter().position(|p| p.role == Role::Blank).unwrap();
    let undercover = game
        .players
        .iter()
        .position(|p| p.role == Role::Undercover)
        .unwrap();

    // Round one: everyone describes, then the blank is voted out.
    for _ in 0..5 {
        game.advance_describer().unwrap();
    }
    game.cast_vote(blank).unwrap();
    game.cast_vote(blank).unwrap();
    game.end_voting().unwrap();
    game.next_round().unwrap();

    // Three civilians and one undercover left: no verdict yet.
    assert!(!game.game_over());
    assert_eq!(game.round(), 2);
    assert_eq!(game.num_players_alive(), 4);

    // Round two: the undercover agent is found out.
    for _ in 0..4 {
        game.advance_describer().unwrap();
    }
    game.cast_vote(undercover).unwrap();
    game.cast_vote(undercover).unwrap();
    game.cast_vote(undercover).unwrap();
    game.end_voting().unwrap();
    game.next_round().unwrap();

    assert!(game.game_over());
    assert_eq!(game.winner(), Some(WinCondition::Civilians));
    for idx in 0..5 {
        assert_eq!(game.player_has_won(idx), game.players[idx].role == Role::Civilian);
    }

    // The reveal is terminal.
    assert!(matches!(
        game.advance_describer(),
        Err(GameError::InvalidAction)
    ));
    assert!(matches!(game.next_round(), Err(GameError::InvalidAction)));
}
