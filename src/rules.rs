use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::board::Board;
use crate::error::ChessError;
use crate::force::Force;
use crate::movement;
use crate::piece::PieceKind;


#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum StartingPosition {
    Classic,
    // Board diagram as accepted by `Board::from_diagram`.
    Diagram(String),
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct ChessRules {
    pub starting_position: StartingPosition,
    #[serde(default = "default_first_to_move")]
    pub first_to_move: Force,
    // Used when a pawn reaches the last row and no piece was chosen explicitly.
    #[serde(default = "default_promotion")]
    pub default_promotion: PieceKind,
}

fn default_first_to_move() -> Force { Force::White }
fn default_promotion() -> PieceKind { PieceKind::Queen }

impl ChessRules {
    pub fn classic() -> Self {
        Self {
            starting_position: StartingPosition::Classic,
            first_to_move: default_first_to_move(),
            default_promotion: default_promotion(),
        }
    }

    pub fn from_diagram(diagram: &str, first_to_move: Force) -> Self {
        Self {
            starting_position: StartingPosition::Diagram(diagram.to_owned()),
            first_to_move,
            default_promotion: default_promotion(),
        }
    }

    pub fn starting_board(&self) -> Result<Board, ChessError> {
        match &self.starting_position {
            StartingPosition::Classic => Ok(Board::classic()),
            StartingPosition::Diagram(diagram) => Board::from_diagram(diagram),
        }
    }

    pub fn verify(&self) -> Result<(), ChessError> {
        if !self.default_promotion.can_promote_to() {
            return Err(ChessError::BadPromotion(self.default_promotion));
        }
        let board = self.starting_board()?;
        for force in Force::iter() {
            let num_kings =
                board.pieces_of(force).filter(|piece| piece.kind == PieceKind::King).count();
            if num_kings != 1 {
                return Err(ChessError::InvalidDiagram(format!(
                    "{} has {num_kings} kings, expected exactly one",
                    force.name()
                )));
            }
        }
        let waiting = self.first_to_move.opponent();
        let grid = board.occupancy();
        if let Some(king_pos) = movement::find_king(&grid, waiting) {
            if movement::is_check_to(&grid, king_pos, waiting) {
                return Err(ChessError::InvalidDiagram(format!(
                    "{} is in check but it is not their move",
                    waiting.name()
                )));
            }
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::game::ChessGame;

    #[test]
    fn yaml_defaults() {
        let rules: ChessRules = serde_yaml::from_str("starting_position: Classic").unwrap();
        assert_eq!(rules, ChessRules::classic());
        rules.verify().unwrap();
    }

    #[test]
    fn yaml_diagram() {
        let yaml = "
starting_position: !Diagram |
  . . . . k . . .
  . . . . . . . .
  . . . . . . . .
  . . . . . . . .
  . . . . . . . .
  . . . . . . . .
  . . . . . . . .
  R . . . K . . .
first_to_move: Black
default_promotion: Knight
";
        let rules: ChessRules = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(rules.first_to_move, Force::Black);
        assert_eq!(rules.default_promotion, PieceKind::Knight);
        assert_eq!(rules.starting_board().unwrap().num_pieces(), 3);
    }

    #[test]
    fn bad_promotion_rejected() {
        let rules = ChessRules { default_promotion: PieceKind::King, ..ChessRules::classic() };
        assert_eq!(rules.verify(), Err(ChessError::BadPromotion(PieceKind::King)));
    }

    #[test]
    fn diagram_needs_one_king_per_side() {
        let no_black_king = "
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            R . . . K . . .
            ";
        let rules = ChessRules::from_diagram(no_black_king, Force::White);
        assert!(matches!(rules.verify(), Err(ChessError::InvalidDiagram(_))));

        let two_white_kings = "
            . . . . k . . .
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            K . . . K . . .
            ";
        let rules = ChessRules::from_diagram(two_white_kings, Force::White);
        assert!(matches!(rules.verify(), Err(ChessError::InvalidDiagram(_))));
    }

    #[test]
    fn side_not_to_move_cannot_start_in_check() {
        let diagram = "
            . . . . k . . .
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            . . . . R . K .
            ";
        let rules = ChessRules::from_diagram(diagram, Force::White);
        assert!(matches!(rules.verify(), Err(ChessError::InvalidDiagram(_))));
        // Same position with Black to move is a plain check.
        ChessRules::from_diagram(diagram, Force::Black).verify().unwrap();
        assert!(matches!(
            ChessGame::new(ChessRules::from_diagram(diagram, Force::White)),
            Err(ChessError::InvalidDiagram(_))
        ));
    }
}
