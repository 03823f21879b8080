#![forbid(unsafe_code)]
#![cfg_attr(feature = "strict", deny(warnings))]

pub mod algebraic;
pub mod board;
pub mod controlled;
pub mod coord;
pub mod error;
pub mod force;
pub mod game;
pub mod grid;
pub mod history;
pub mod movegen;
pub mod movement;
pub mod piece;
pub mod rules;
pub mod test_util;

pub use board::{Board, Square};
pub use coord::{Col, Coord, Row};
pub use error::ChessError;
pub use force::Force;
pub use game::{ChessGame, GameStatus, MoveRecord, MovedPiece};
pub use history::{HistoryRow, MoveHistory};
pub use piece::{Piece, PieceId, PieceKind};
pub use rules::{ChessRules, StartingPosition};
