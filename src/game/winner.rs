use serde::{Deserialize, Serialize};

use super::player::{Player, Role};

/// The possible winners of a game of Undercover.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
pub enum WinCondition {
    /// Every undercover agent and blank has been voted out.
    Civilians,
    /// The undercover agents reached parity with the civilians.
    Undercover,
    /// A blank survived into the final two.
    Blank,
}

impl ToString for WinCondition {
    fn to_string(&self) -> String {
        match self {
            WinCondition::Civilians => "Civilians",
            WinCondition::Undercover => "Undercover",
            WinCondition::Blank => "Blank",
        }
        .to_string()
    }
}

/// Decides whether the game has ended, from the alive role composition alone.
///
/// The checks run in a fixed order, and the order matters: a two-player
/// endgame of one undercover agent and one blank resolves in favour of the
/// undercover agent, because parity with the (zero) civilians is checked
/// before the blank's survival.
pub fn evaluate(players: &[Player]) -> Option<WinCondition> {
    let alive = |role| {
        players
            .iter()
            .filter(|p| p.alive && p.role == role)
            .count()
    };
    let civilians = alive(Role::Civilian);
    let undercover = alive(Role::Undercover);
    let blanks = alive(Role::Blank);

    if undercover == 0 && blanks == 0 {
        return Some(WinCondition::Civilians);
    }
    if undercover >= civilians {
        return Some(WinCondition::Undercover);
    }
    if blanks > 0 && civilians + undercover + blanks == 2 {
        return Some(WinCondition::Blank);
    }
    None
}
