// Test utilities that cannot be moved to the "tests" folder, because stress_test uses them.

use rand::{Rng, SeedableRng};

use crate::controlled::ControlledSquares;
use crate::error::ChessError;
use crate::force::Force;
use crate::game::ChessGame;
use crate::movement;


// In theory random tests verify statistical properties that should always hold, but let's fix
// the seed to avoid sporadic failures.
pub fn deterministic_rng() -> impl Rng { rand::rngs::StdRng::from_seed([0; 32]) }

// Plays a random legal move through the selection interface. Returns false if the game has
// no legal moves left.
pub fn play_random_move(game: &mut ChessGame, rng: &mut impl Rng) -> Result<bool, ChessError> {
    let moves = game.all_legal_moves();
    if moves.is_empty() {
        return Ok(false);
    }
    let mv = moves[rng.random_range(0..moves.len())];
    game.deselect();
    game.select(mv.from);
    game.move_to(mv.to)?;
    Ok(true)
}

// Describes the first discrepancy between the incrementally maintained state of the game and
// the state computed from scratch, if any.
pub fn find_inconsistency(game: &ChessGame) -> Option<String> {
    let board = game.board();
    if let Err(err) = board.verify_invariants() {
        return Some(err.to_string());
    }
    let mut rebuilt_board = board.clone();
    let rebuilt = ControlledSquares::build(&mut rebuilt_board);
    if &rebuilt != game.controlled_squares() {
        return Some(format!(
            "controlled squares diverged from a full rebuild after {}",
            game.move_history().format_log()
        ));
    }
    if &rebuilt_board != board {
        return Some("square attackers diverged from a full rebuild".to_owned());
    }
    let grid = board.occupancy();
    for force in [Force::White, Force::Black] {
        if let Some(king_pos) = board.find_king(force) {
            if game.is_in_check(force) != movement::is_check_to(&grid, king_pos, force) {
                return Some(format!("{} check status is wrong", force.name()));
            }
        }
    }
    let mover = game.active_force().opponent();
    if game.move_history().num_moves() > 0 && game.is_in_check(mover) {
        return Some(format!("{} left its king in check", mover.name()));
    }
    None
}
