use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::force::Force;


#[derive(Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct HistoryRow {
    pub turn_number: u32,
    pub white: Option<String>,
    pub black: Option<String>,
}

// Notation of played moves grouped into numbered rows, one White and one Black move each.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct MoveHistory {
    rows: Vec<HistoryRow>,
}

impl MoveHistory {
    pub fn new() -> Self { Self::default() }

    pub fn rows(&self) -> &[HistoryRow] { &self.rows }
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }
    pub fn num_moves(&self) -> usize {
        self.rows.iter().map(|row| row.white.iter().count() + row.black.iter().count()).sum()
    }

    pub fn push(&mut self, force: Force, notation: String) {
        let next_turn_number = self.rows.last().map_or(1, |row| row.turn_number + 1);
        match force {
            Force::White => self.rows.push(HistoryRow {
                turn_number: next_turn_number,
                white: Some(notation),
                black: None,
            }),
            Force::Black => match self.rows.last_mut() {
                Some(row) if row.black.is_none() => row.black = Some(notation),
                _ => self.rows.push(HistoryRow {
                    turn_number: next_turn_number,
                    white: None,
                    black: Some(notation),
                }),
            },
        }
    }

    // Log in the form "1.e4 e5 2.Nf3". A row without a White move is written as "1...e5".
    pub fn format_log(&self) -> String {
        self.rows
            .iter()
            .map(|row| match (&row.white, &row.black) {
                (Some(white), Some(black)) => format!("{}.{} {}", row.turn_number, white, black),
                (Some(white), None) => format!("{}.{}", row.turn_number, white),
                (None, Some(black)) => format!("{}...{}", row.turn_number, black),
                (None, None) => String::new(),
            })
            .join(" ")
    }
}
