// Rust-upgrade (https://github.com/rust-lang/rust/issues/46379):
//   remove `#[allow(dead_code)]` before public functions.

use chess_board::{ChessGame, ChessRules, Force, Piece, PieceKind};


#[allow(dead_code)]
#[derive(Clone, Copy, Debug)]
pub struct PieceMatcher {
    pub kind: PieceKind,
    pub force: Force,
}

#[allow(dead_code)]
pub trait PieceIs {
    fn is(self, matcher: PieceMatcher) -> bool;
}

impl PieceIs for Option<&Piece> {
    fn is(self, matcher: PieceMatcher) -> bool {
        self.is_some_and(|piece| piece.kind == matcher.kind && piece.force == matcher.force)
    }
}

#[macro_export]
macro_rules! piece {
    ($force:ident $kind:ident) => {
        common::PieceMatcher {
            force: chess_board::Force::$force,
            kind: chess_board::PieceKind::$kind,
        }
    };
}

#[allow(dead_code)]
pub fn classic() -> ChessGame {
    ChessGame::new(ChessRules::classic()).unwrap()
}

#[allow(dead_code)]
pub fn from_diagram(diagram: &str, first_to_move: Force) -> ChessGame {
    ChessGame::new(ChessRules::from_diagram(diagram, first_to_move)).unwrap()
}

#[allow(dead_code)]
pub fn replay_log_from_start(log: &str) -> ChessGame {
    let mut game = classic();
    game.try_replay_log(log).unwrap();
    game
}

// Selects `from` and moves to `to`, both given by name.
#[allow(dead_code)]
pub fn click_move(game: &mut ChessGame, from: &str, to: &str) -> String {
    let destinations = game.select_square(from).unwrap();
    assert!(destinations.iter().any(|d| d == to), "{from}-{to} not in {destinations:?}");
    game.move_to_square(to).unwrap();
    last_notation(game)
}

#[allow(dead_code)]
pub fn last_notation(game: &ChessGame) -> String {
    let row = game.history().last().unwrap();
    row.black.clone().or_else(|| row.white.clone()).unwrap()
}
