use console::Style;
use itertools::Itertools;

use chess_board::{ChessGame, Col, Coord, Force, GameStatus, PieceKind, Row};


pub fn render_game(game: &ChessGame) -> String {
    let status = match game.status() {
        GameStatus::Active => {
            let check = if game.is_in_check(game.active_force()) { ", check" } else { "" };
            format!("{} to move{check}", game.active_force().name())
        }
        GameStatus::Checkmate { winner } => format!("Checkmate, {} wins", winner.name()),
        GameStatus::Stalemate => "Stalemate".to_owned(),
    };
    format!("{}\n{}\n", render_board(game), status)
}

pub fn render_board(game: &ChessGame) -> String {
    let colors = [
        Style::new().color256(233).on_color256(222),
        Style::new().color256(233).on_color256(230),
    ];
    let selected_style = Style::new().color256(233).on_color256(117);
    let destination_style = Style::new().color256(233).on_color256(151);
    let check_style = Style::new().color256(233).on_red();

    let board = game.board();
    let selected = game.selected();
    let destinations = game.legal_destinations();
    let king_in_check =
        board.find_king(game.active_force()).filter(|_| game.is_in_check(game.active_force()));

    let col_names = format!(
        "{}{}{}\n",
        format_square(' '),
        Col::all().map(|col| format_square(col.to_algebraic())).join(""),
        format_square(' '),
    );
    let mut ret = String::new();
    ret.push_str(&col_names);
    for row in Row::all().collect_vec().into_iter().rev() {
        ret.push_str(&format_square(row.to_algebraic()));
        for col in Col::all() {
            let coord = Coord::new(row, col);
            let style = if selected == Some(coord) {
                &selected_style
            } else if destinations.contains(&coord) {
                &destination_style
            } else if king_in_check == Some(coord) {
                &check_style
            } else {
                &colors[usize::from((row.to_zero_based() + col.to_zero_based()) % 2)]
            };
            let ch = match board.piece_at(coord) {
                Some(piece) => to_unicode_char(piece.kind, piece.force),
                None => ' ',
            };
            ret.push_str(&style.apply_to(format_square(ch)).to_string());
        }
        ret.push_str(&format_square(row.to_algebraic()));
        ret.push('\n');
    }
    ret.push_str(&col_names);
    ret
}

pub fn render_history(game: &ChessGame) -> String {
    game.history()
        .iter()
        .map(|row| {
            format!(
                "{:>3}. {:<8} {}",
                row.turn_number,
                row.white.as_deref().unwrap_or("..."),
                row.black.as_deref().unwrap_or(""),
            )
        })
        .join("\n")
}

fn format_square(ch: char) -> String { format!(" {} ", ch) }

fn to_unicode_char(piece_kind: PieceKind, force: Force) -> char {
    use Force::*;
    use PieceKind::*;
    match (force, piece_kind) {
        (White, Pawn) => '♙',
        (White, Knight) => '♘',
        (White, Bishop) => '♗',
        (White, Rook) => '♖',
        (White, Queen) => '♕',
        (White, King) => '♔',
        (Black, Pawn) => '♟',
        (Black, Knight) => '♞',
        (Black, Bishop) => '♝',
        (Black, Rook) => '♜',
        (Black, Queen) => '♛',
        (Black, King) => '♚',
    }
}
