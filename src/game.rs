use itertools::Itertools;
use lazy_static::lazy_static;
use log::{debug, info, warn};
use regex_lite::Regex;

use crate::algebraic::{self, AlgebraicTurn};
use crate::board::Board;
use crate::controlled::ControlledSquares;
use crate::coord::Coord;
use crate::error::ChessError;
use crate::force::Force;
use crate::history::{HistoryRow, MoveHistory};
use crate::internal_error_message;
use crate::movegen::{self, CandidateMove, Position, castling_squares};
use crate::movement::LastMove;
use crate::piece::{PieceId, PieceKind};
use crate::rules::ChessRules;


#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameStatus {
    Active,
    Checkmate { winner: Force },
    Stalemate,
}

#[derive(Clone, Debug)]
enum Selection {
    AwaitingSelection,
    // Legal moves are computed at selection time and are the only moves `move_to` accepts.
    SquareSelected { from: Coord, moves: Vec<CandidateMove> },
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MoveRecord {
    pub moved_from: Coord,
    pub moved_to: Coord,
    pub notation: String,
    pub captured: Option<PieceKind>,
    // Whether the move put the opponent in check (including mate).
    pub check: bool,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MovedPiece {
    pub moved_from: String,
    pub moved_to: String,
}

#[derive(Clone, Debug)]
pub struct ChessGame {
    rules: ChessRules,
    board: Board,
    controlled: ControlledSquares,
    active_force: Force,
    selection: Selection,
    last_move: Option<LastMove>,
    history: MoveHistory,
    status: GameStatus,
}

impl ChessGame {
    pub fn new(rules: ChessRules) -> Result<Self, ChessError> {
        rules.verify()?;
        let board = rules.starting_board()?;
        Ok(Self::new_with_board(rules, board))
    }

    pub fn new_with_board(rules: ChessRules, mut board: Board) -> Self {
        let controlled = ControlledSquares::build(&mut board);
        let active_force = rules.first_to_move;
        let mut game = ChessGame {
            rules,
            board,
            controlled,
            active_force,
            selection: Selection::AwaitingSelection,
            last_move: None,
            history: MoveHistory::new(),
            status: GameStatus::Active,
        };
        game.update_status();
        game
    }

    pub fn rules(&self) -> &ChessRules { &self.rules }
    pub fn board(&self) -> &Board { &self.board }
    pub fn controlled_squares(&self) -> &ControlledSquares { &self.controlled }
    pub fn active_force(&self) -> Force { self.active_force }
    pub fn status(&self) -> GameStatus { self.status }
    pub fn is_active(&self) -> bool { self.status == GameStatus::Active }
    pub fn last_move(&self) -> Option<LastMove> { self.last_move }
    pub fn move_history(&self) -> &MoveHistory { &self.history }
    pub fn history(&self) -> &[HistoryRow] { self.history.rows() }

    pub fn position(&self) -> Position<'_> {
        Position {
            board: &self.board,
            controlled: &self.controlled,
            active_force: self.active_force,
            last_move: self.last_move,
        }
    }

    pub fn selected(&self) -> Option<Coord> {
        match &self.selection {
            Selection::AwaitingSelection => None,
            Selection::SquareSelected { from, .. } => Some(*from),
        }
    }

    pub fn legal_destinations(&self) -> Vec<Coord> {
        match &self.selection {
            Selection::AwaitingSelection => Vec::new(),
            Selection::SquareSelected { moves, .. } => moves.iter().map(|mv| mv.to).collect(),
        }
    }

    pub fn all_legal_moves(&self) -> Vec<CandidateMove> {
        if !self.is_active() {
            return Vec::new();
        }
        movegen::all_legal_moves(&self.position())
    }

    pub fn is_in_check(&self, force: Force) -> bool {
        self.board
            .find_king(force)
            .is_some_and(|king_pos| self.controlled.is_controlled_by(force.opponent(), king_pos))
    }

    // Selects a square and returns where the piece on it can go. Selecting a square that
    // does not hold a piece of the active force is ignored and yields nothing. Selecting the
    // selected square again clears the selection.
    pub fn select(&mut self, pos: Coord) -> Vec<Coord> {
        match self.try_select(pos) {
            Ok(destinations) => destinations,
            Err(err) => {
                debug!("Ignoring selection of {pos}: {err}");
                Vec::new()
            }
        }
    }

    pub fn try_select(&mut self, pos: Coord) -> Result<Vec<Coord>, ChessError> {
        if !self.is_active() {
            return Err(ChessError::GameOver);
        }
        if self.selected() == Some(pos) {
            self.deselect();
            return Ok(Vec::new());
        }
        let owned = self.board.piece_at(pos).is_some_and(|piece| piece.force == self.active_force);
        if !owned {
            return Err(ChessError::IllegalSelection);
        }
        let moves = movegen::legal_moves(&self.position(), pos);
        let destinations = moves.iter().map(|mv| mv.to).collect();
        self.selection = Selection::SquareSelected { from: pos, moves };
        Ok(destinations)
    }

    pub fn deselect(&mut self) { self.selection = Selection::AwaitingSelection; }

    pub fn select_square(&mut self, name: &str) -> Result<Vec<String>, ChessError> {
        let pos = Coord::from_algebraic(name)?;
        Ok(self.select(pos).into_iter().map(|to| to.to_algebraic()).collect())
    }

    pub fn move_to(&mut self, to: Coord) -> Result<MoveRecord, ChessError> {
        self.move_to_promoting(to, None)
    }

    // Moves the selected piece. `promote_to` must be set only for promotions; when it is
    // missing the default from the rules is used.
    pub fn move_to_promoting(
        &mut self, to: Coord, promote_to: Option<PieceKind>,
    ) -> Result<MoveRecord, ChessError> {
        if !self.is_active() {
            return Err(ChessError::GameOver);
        }
        let Selection::SquareSelected { moves, .. } = &self.selection else {
            return Err(ChessError::IllegalMove);
        };
        let mv = moves.iter().find(|mv| mv.to == to).copied().ok_or(ChessError::IllegalMove)?;
        self.apply_move(mv, promote_to)
    }

    pub fn move_to_square(&mut self, name: &str) -> Result<MovedPiece, ChessError> {
        let to = Coord::from_algebraic(name)?;
        let record = self.move_to(to)?;
        Ok(MovedPiece {
            moved_from: record.moved_from.to_algebraic(),
            moved_to: record.moved_to.to_algebraic(),
        })
    }

    pub fn try_turn_algebraic(&mut self, notation: &str) -> Result<MoveRecord, ChessError> {
        if !self.is_active() {
            return Err(ChessError::GameOver);
        }
        let turn = AlgebraicTurn::parse(notation)
            .ok_or_else(|| ChessError::InvalidNotation(notation.to_owned()))?;
        let (mv, promote_to) = match turn {
            AlgebraicTurn::Castle(direction) => {
                let king_from = castling_squares(self.active_force, direction).king_from;
                let mv = movegen::legal_moves(&self.position(), king_from)
                    .into_iter()
                    .find(|mv| mv.castling == Some(direction))
                    .ok_or(ChessError::IllegalMove)?;
                (mv, None)
            }
            AlgebraicTurn::Move(turn) => {
                let matching = movegen::all_legal_moves(&self.position())
                    .into_iter()
                    .filter(|mv| {
                        mv.castling.is_none()
                            && mv.piece_kind == turn.piece_kind
                            && mv.to == turn.to
                            && turn.from_col.is_none_or(|col| col == mv.from.col)
                            && turn.from_row.is_none_or(|row| row == mv.from.row)
                    })
                    .collect_vec();
                let mv = match matching.as_slice() {
                    [] => return Err(ChessError::IllegalMove),
                    [mv] => *mv,
                    _ => return Err(ChessError::AmbiguousNotation(notation.to_owned())),
                };
                if turn.capturing && mv.capture.is_none() {
                    return Err(ChessError::IllegalMove);
                }
                (mv, turn.promote_to)
            }
        };
        self.deselect();
        self.apply_move(mv, promote_to)
    }

    // Accepts logs like "1.e4 e5 2.Nf3 Nc6". Stops at the first move that fails.
    pub fn try_replay_log(&mut self, log: &str) -> Result<(), ChessError> {
        lazy_static! {
            static ref TURN_NUMBER_RE: Regex = Regex::new(r"^(?:[0-9]+\.(?:\.\.)?)?(.*)$").unwrap();
        }
        for word in log.split_whitespace() {
            let notation = TURN_NUMBER_RE
                .captures(word)
                .and_then(|cap| cap.get(1))
                .map_or(word, |m| m.as_str());
            if notation.is_empty() {
                continue;
            }
            self.try_turn_algebraic(notation)?;
        }
        Ok(())
    }

    fn apply_move(
        &mut self, mv: CandidateMove, promote_to: Option<PieceKind>,
    ) -> Result<MoveRecord, ChessError> {
        self.try_apply_move(mv, promote_to).inspect_err(|err| {
            if matches!(err, ChessError::InvariantViolation(_)) {
                warn!("Move {} -> {} aborted: {err}", mv.from, mv.to);
            }
        })
    }

    // Board and tracker are updated on copies and only committed once the result has been
    // verified, so a failure leaves the game untouched.
    fn try_apply_move(
        &mut self, mv: CandidateMove, promote_to: Option<PieceKind>,
    ) -> Result<MoveRecord, ChessError> {
        let promote_to = match (mv.is_promotion(), promote_to) {
            (true, None) => Some(self.rules.default_promotion),
            (true, Some(kind)) if kind.can_promote_to() => Some(kind),
            (_, Some(kind)) => return Err(ChessError::BadPromotion(kind)),
            (false, None) => None,
        };
        let notation = algebraic::describe_move(&self.position(), &mv, promote_to).format();

        let mut board = self.board.clone();
        let mut controlled = self.controlled.clone();
        let piece_id = piece_id_at(&board, mv.from)?;
        let mut touched = vec![mv.from, mv.to];
        let mut moved = vec![piece_id];
        let mut removed = Vec::new();
        if let Some(capture_pos) = mv.capture {
            let captured_id = piece_id_at(&board, capture_pos)?;
            removed.push(board.remove_piece(captured_id)?);
            touched.push(capture_pos);
        }
        board.place_piece(piece_id, mv.to)?;
        board.mark_moved(piece_id)?;
        if let Some(direction) = mv.castling {
            let squares = castling_squares(mv.force, direction);
            let rook_id = piece_id_at(&board, squares.rook_from)?;
            board.place_piece(rook_id, squares.rook_to)?;
            board.mark_moved(rook_id)?;
            touched.extend([squares.rook_from, squares.rook_to]);
            moved.push(rook_id);
        }
        if let Some(kind) = promote_to {
            board.promote(piece_id, kind)?;
        }
        controlled.update_after_move(&mut board, &touched, &moved, &removed);

        board.verify_invariants()?;
        if let Some(king_pos) = board.find_king(mv.force) {
            if controlled.is_controlled_by(mv.force.opponent(), king_pos) {
                return Err(ChessError::InvariantViolation(internal_error_message!(
                    "{} king is attacked after {notation}",
                    mv.force.name()
                )));
            }
        }

        self.board = board;
        self.controlled = controlled;
        self.last_move = Some(LastMove { from: mv.from, to: mv.to, piece_kind: mv.piece_kind });
        self.history.push(mv.force, notation.clone());
        self.active_force = mv.force.opponent();
        self.deselect();
        self.update_status();
        debug!("{} played {notation}", mv.force.name());
        Ok(MoveRecord {
            moved_from: mv.from,
            moved_to: mv.to,
            notation,
            captured: removed.first().map(|piece| piece.kind),
            check: self.is_in_check(self.active_force),
        })
    }

    fn update_status(&mut self) {
        if movegen::has_legal_moves(&self.position()) {
            return;
        }
        self.status = if self.is_in_check(self.active_force) {
            GameStatus::Checkmate { winner: self.active_force.opponent() }
        } else {
            GameStatus::Stalemate
        };
        info!("Game over: {:?}", self.status);
    }
}

fn piece_id_at(board: &Board, pos: Coord) -> Result<PieceId, ChessError> {
    board.piece_at(pos).map(|piece| piece.id).ok_or_else(|| {
        ChessError::InvariantViolation(internal_error_message!("no piece on {pos}"))
    })
}
