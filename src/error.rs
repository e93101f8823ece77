use thiserror::Error;

use crate::player::PlayerId;

#[derive(Error, Debug)]
pub enum HoldemError {
    #[error("Invalid rank: {0}")]
    InvalidRank(char),

    #[error("Invalid suit: {0}")]
    InvalidSuit(char),

    #[error("Unknown card: {0}")]
    UnknownCard(String),

    #[error("Duplicate card: {0}")]
    DuplicateCard(String),

    #[error("Cannot draw from an empty deck")]
    EmptyDeck,

    #[error("Hand must contain {expected} cards, got {got}")]
    InvalidHandSize { expected: &'static str, got: usize },

    #[error("Board must contain {expected} cards, got {got}")]
    InvalidBoardSize { expected: &'static str, got: usize },

    #[error("No table entry for encoding {0}")]
    UnrecognizedEncoding(String),

    #[error("Invalid hand table: {0}")]
    InvalidTable(String),

    #[error("Hand tables were already installed")]
    TablesAlreadyInstalled,

    #[error("Need {needed} unseen cards, only {available} available")]
    InsufficientUnseenCards { needed: usize, available: usize },

    #[error("It is not {actual}'s turn (expected {expected})")]
    OutOfTurn { expected: PlayerId, actual: PlayerId },

    #[error("No player is waiting to act")]
    NoPendingAction,

    #[error("Betting is closed at the showdown")]
    BettingClosed,

    #[error("Cannot check, {owed} chips are required to call")]
    CallRequired { owed: u32 },

    #[error("Nothing to call")]
    NothingToCall,

    #[error("Raise to {amount} is too small, minimum is {minimum}")]
    RaiseTooSmall { amount: u32, minimum: u32 },

    #[error("Player {player} needs {needed} chips but only has {balance}")]
    InsufficientBalance {
        player: PlayerId,
        needed: u32,
        balance: u32,
    },

    #[error("Hands can only be shown at the showdown")]
    NotShowdown,

    #[error("Unknown player: {0}")]
    UnknownPlayer(PlayerId),

    #[error("Need at least 2 funded players, got {0}")]
    NotEnoughPlayers(usize),

    #[error("A hand is already in progress")]
    HandInProgress,

    #[error("Table is full ({0} seats)")]
    TableFull(usize),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Worker pool error: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type HoldemResult<T> = Result<T, HoldemError>;
