use itertools::Itertools;
use lazy_static::lazy_static;
use regex_lite::Regex;

use crate::coord::{Col, Coord, Row};
use crate::movegen::{self, CandidateMove, Position};
use crate::piece::{CastleDirection, PieceKind};


#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AlgebraicMove {
    pub piece_kind: PieceKind,
    pub from_col: Option<Col>,
    pub from_row: Option<Row>,
    pub capturing: bool,
    pub to: Coord,
    pub promote_to: Option<PieceKind>,
}

// Conversion between `AlgebraicTurn` and string can be done without a board. Conversion
// between `AlgebraicTurn` and an actual move requires a position.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum AlgebraicTurn {
    Move(AlgebraicMove),
    Castle(CastleDirection),
}

impl AlgebraicTurn {
    // Check and mate marks are accepted and ignored.
    pub fn parse(notation: &str) -> Option<Self> {
        lazy_static! {
            static ref MOVE_RE: Regex = Regex::new(
                r"^([PNBRQK])?([a-h])?([1-8])?([x:])?([a-h][1-8])(?:=?([NBRQ]))?[+#]?$"
            )
            .unwrap();
            static ref A_CASTLING_RE: Regex = Regex::new(r"^(?:0-0-0|O-O-O)[+#]?$").unwrap();
            static ref H_CASTLING_RE: Regex = Regex::new(r"^(?:0-0|O-O)[+#]?$").unwrap();
        }
        let notation = notation.trim();
        if let Some(cap) = MOVE_RE.captures(notation) {
            let piece_kind = match cap.get(1) {
                None => PieceKind::Pawn,
                Some(m) => PieceKind::from_algebraic_char(single_char(m.as_str())?)?,
            };
            let from_col = match cap.get(2) {
                None => None,
                Some(m) => Some(Col::from_algebraic(single_char(m.as_str())?)?),
            };
            let from_row = match cap.get(3) {
                None => None,
                Some(m) => Some(Row::from_algebraic(single_char(m.as_str())?)?),
            };
            let capturing = cap.get(4).is_some();
            let to = Coord::from_algebraic(cap.get(5)?.as_str()).ok()?;
            let promote_to = match cap.get(6) {
                None => None,
                Some(m) => Some(PieceKind::from_algebraic_char(single_char(m.as_str())?)?),
            };
            Some(AlgebraicTurn::Move(AlgebraicMove {
                piece_kind,
                from_col,
                from_row,
                capturing,
                to,
                promote_to,
            }))
        } else if A_CASTLING_RE.is_match(notation) {
            Some(AlgebraicTurn::Castle(CastleDirection::ASide))
        } else if H_CASTLING_RE.is_match(notation) {
            Some(AlgebraicTurn::Castle(CastleDirection::HSide))
        } else {
            None
        }
    }

    pub fn format(&self) -> String {
        match self {
            AlgebraicTurn::Move(mv) => {
                let mut from = String::new();
                if let Some(col) = mv.from_col {
                    from.push(col.to_algebraic())
                };
                if let Some(row) = mv.from_row {
                    from.push(row.to_algebraic())
                };
                let promotion = match mv.promote_to {
                    Some(piece_kind) => format!("={}", piece_kind.to_full_algebraic()),
                    None => String::new(),
                };
                format!(
                    "{}{}{}{}{}",
                    mv.piece_kind.to_algebraic_for_move(),
                    from,
                    if mv.capturing { "x" } else { "" },
                    mv.to.to_algebraic(),
                    promotion,
                )
            }
            AlgebraicTurn::Castle(dir) => match dir {
                CastleDirection::ASide => "O-O-O".to_owned(),
                CastleDirection::HSide => "O-O".to_owned(),
            },
        }
    }
}

// Short algebraic notation for a legal move. Must be called before the move is applied.
pub fn describe_move(
    position: &Position, mv: &CandidateMove, promote_to: Option<PieceKind>,
) -> AlgebraicTurn {
    if let Some(direction) = mv.castling {
        return AlgebraicTurn::Castle(direction);
    }
    let (from_col, from_row) = disambiguation(position, mv);
    AlgebraicTurn::Move(AlgebraicMove {
        piece_kind: mv.piece_kind,
        from_col,
        from_row,
        capturing: mv.capture.is_some(),
        to: mv.to,
        promote_to,
    })
}

// Pawn captures always name the origin file. Other pieces name as little of the origin as
// needed to tell them apart from same-kind pieces that can also legally reach the
// destination: file if that is enough, else rank, else both.
fn disambiguation(position: &Position, mv: &CandidateMove) -> (Option<Col>, Option<Row>) {
    if mv.piece_kind == PieceKind::Pawn {
        let from_col = mv.capture.is_some().then_some(mv.from.col);
        return (from_col, None);
    }
    let rivals = position
        .board
        .pieces_of(mv.force)
        .filter(|piece| piece.kind == mv.piece_kind && piece.position != mv.from)
        .filter(|piece| {
            movegen::legal_moves(position, piece.position)
                .iter()
                .any(|other| other.to == mv.to && other.castling.is_none())
        })
        .map(|piece| piece.position)
        .collect_vec();
    if rivals.is_empty() {
        (None, None)
    } else if rivals.iter().all(|pos| pos.col != mv.from.col) {
        (Some(mv.from.col), None)
    } else if rivals.iter().all(|pos| pos.row != mv.from.row) {
        (None, Some(mv.from.row))
    } else {
        (Some(mv.from.col), Some(mv.from.row))
    }
}

fn single_char(s: &str) -> Option<char> { s.chars().exactly_one().ok() }
