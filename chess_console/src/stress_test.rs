use std::time::Instant;

use anyhow::bail;
use chess_board::test_util::*;
use chess_board::{ChessGame, ChessRules, GameStatus};
use log::{error, info};


const MAX_MOVES_PER_GAME: usize = 500;

pub struct StressTestConfig {
    pub num_games: usize,
}

pub fn run(config: StressTestConfig) -> anyhow::Result<()> {
    let rng = &mut rand::rng();
    let t0 = Instant::now();
    let mut total_moves = 0;
    let mut checkmates = 0;
    let mut stalemates = 0;
    for game_idx in 0..config.num_games {
        let mut game = ChessGame::new(ChessRules::classic())?;
        for _ in 0..MAX_MOVES_PER_GAME {
            if !play_random_move(&mut game, rng)? {
                break;
            }
            total_moves += 1;
            if let Some(problem) = find_inconsistency(&game) {
                error!("Game {game_idx}: {problem}");
                bail!("Inconsistent state after {}", game.move_history().format_log());
            }
        }
        match game.status() {
            GameStatus::Active => {}
            GameStatus::Checkmate { .. } => checkmates += 1,
            GameStatus::Stalemate => stalemates += 1,
        }
    }
    info!(
        "Ran: {} games ({} checkmates, {} stalemates), {} moves in {:.2}s",
        config.num_games,
        checkmates,
        stalemates,
        total_moves,
        t0.elapsed().as_secs_f64(),
    );
    Ok(())
}
