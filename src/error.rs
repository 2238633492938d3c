use thiserror::Error;

/// The result of attempting to perform an invalid operation on a [Game] or [Session].
#[derive(Error, Debug)]
pub enum GameError {
    #[error("role counts are invalid for the number of players")]
    InvalidRoleConfig,
    #[error("no word pair exists for the requested difficulty")]
    NoWordPair,
    #[error("game does not exist")]
    GameNotFound,
    #[error("too few players in the game")]
    TooFewPlayers,
    #[error("too many players in the game")]
    TooManyPlayers,
    #[error("no player exists with the given name")]
    PlayerNotFound,
    #[error("this player cannot be chosen for this action")]
    InvalidPlayerChoice,
    #[error("invalid player index")]
    InvalidPlayerIndex,
    #[error("this action cannot be performed during this phase of the game")]
    InvalidAction,
}
