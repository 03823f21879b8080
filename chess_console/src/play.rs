use std::io::{self, BufRead, Write};

use anyhow::Context;
use chess_board::{ChessError, ChessGame, ChessRules, Coord};
use log::info;

use crate::tui;


const HELP: &str = "\
Commands:
  <square>   select a piece (e.g. e2), or move the selected piece there
  <move>     play a move in algebraic notation (e.g. Nf3, exd5, O-O, e8=Q)
  history    show the moves played so far
  quit       leave the game";

pub fn run(rules: ChessRules) -> anyhow::Result<()> {
    let mut game = ChessGame::new(rules).context("Creating game")?;
    println!("{HELP}\n");
    print!("{}", tui::render_game(&game));
    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        match line.trim() {
            "" => continue,
            "quit" | "exit" => break,
            "help" => println!("{HELP}"),
            "history" => println!("{}", tui::render_history(&game)),
            input => {
                if let Err(err) = process_input(&mut game, input) {
                    println!("{err}");
                    continue;
                }
                print!("{}", tui::render_game(&game));
            }
        }
    }
    info!("Final log: {}", game.move_history().format_log());
    Ok(())
}

// A square name moves the selected piece there when it can go there and selects the piece on
// it otherwise. Anything else, including a square with nothing to select, is treated as
// algebraic notation, so "e4" plays a pawn move.
fn process_input(game: &mut ChessGame, input: &str) -> Result<(), ChessError> {
    let pos = Coord::from_algebraic(input).ok();
    if let Some(pos) = pos.filter(|pos| game.legal_destinations().contains(pos)) {
        let record = game.move_to(pos)?;
        println!("{}", record.notation);
        return Ok(());
    }
    let own_piece = |pos: &Coord| {
        game.board().piece_at(*pos).is_some_and(|piece| piece.force == game.active_force())
    };
    match pos.filter(own_piece) {
        Some(pos) => {
            if game.try_select(pos)?.is_empty() && game.selected().is_some() {
                println!("{pos} has no legal moves");
            }
        }
        None => {
            let record = game.try_turn_algebraic(input)?;
            println!("{}", record.notation);
        }
    }
    Ok(())
}
