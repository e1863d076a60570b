use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::board::{Board, Cell};

/// How boards are drawn in chat
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GlyphSet {
    /// Emoji shortcodes
    #[default]
    Discord,
    Plain,
}

impl GlyphSet {
    fn hidden(self) -> &'static str {
        match self {
            GlyphSet::Discord => ":white_large_square:",
            GlyphSet::Plain => "_",
        }
    }

    fn space(self) -> &'static str {
        match self {
            GlyphSet::Discord => ":black_large_square:",
            GlyphSet::Plain => "#",
        }
    }

    fn letter(self, letter: char) -> String {
        match self {
            GlyphSet::Discord => format!(":regional_indicator_{}:", letter.to_ascii_lowercase()),
            GlyphSet::Plain => letter.to_ascii_uppercase().to_string(),
        }
    }

    fn cell(self, cell: Cell) -> String {
        match cell {
            Cell::Hidden => self.hidden().to_string(),
            Cell::Blank('\n') => "\n".to_string(),
            Cell::Blank(_) => self.space().to_string(),
            Cell::Revealed(letter) => self.letter(letter),
        }
    }
}

pub fn render_board(board: &Board, glyphs: GlyphSet) -> String {
    board.state().iter().map(|&cell| glyphs.cell(cell)).collect()
}

/// The letters nobody has called yet, in alphabetical order
pub fn render_letters(board: &Board, glyphs: GlyphSet) -> String {
    board
        .available_letters()
        .map(|letter| glyphs.letter(letter))
        .join(" ")
}
