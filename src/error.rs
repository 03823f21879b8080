use thiserror::Error;

use crate::piece::PieceKind;


#[macro_export]
macro_rules! internal_error_message {
    () => {
        format!("Internal error at {}:{}.", file!(), line!())
    };
    ($($arg:tt)+) => {
        format!("Internal error at {}:{}: {}.", file!(), line!(), format!($($arg)*))
    };
}


#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum ChessError {
    #[error("coordinate ({file}, {rank}) is outside the board")]
    OutOfRange { file: i8, rank: i8 },
    #[error("invalid square name {0:?}")]
    InvalidName(String),
    // Selecting an empty square or an opponent piece. Recovered locally: the selection
    // is simply ignored.
    #[error("no piece of the active side on this square")]
    IllegalSelection,
    #[error("illegal move")]
    IllegalMove,
    // Fatal for the current operation. The game is left exactly as it was before.
    #[error("{0}")]
    InvariantViolation(String),
    #[error("cannot parse move notation {0:?}")]
    InvalidNotation(String),
    #[error("move notation {0:?} matches several moves")]
    AmbiguousNotation(String),
    #[error("cannot promote to {0:?}")]
    BadPromotion(PieceKind),
    #[error("invalid board diagram: {0}")]
    InvalidDiagram(String),
    #[error("the game is over")]
    GameOver,
}
