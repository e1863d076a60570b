use std::collections::BTreeSet;

use game_core::catalog::Answer;
use thiserror::Error;

/// Columns of one board row
pub const BOARD_WIDTH: usize = 14;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Cell {
    Hidden,
    /// Space or line break, never hidden
    Blank(char),
    Revealed(char),
}

#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum BoardError {
    #[error("The letter {} was already guessed", .0.to_ascii_uppercase())]
    AlreadyGuessed(char),
}

#[derive(Clone, Debug, getset::CopyGetters, getset::Getters)]
pub struct Board {
    #[getset(get = "pub")]
    answer: String,
    formatted: Vec<char>,
    #[getset(get = "pub")]
    category: String,
    #[getset(get_copy = "pub")]
    number_of_words: usize,
    #[getset(get_copy = "pub")]
    number_of_letters: usize,
    #[getset(get = "pub")]
    state: Vec<Cell>,
    #[getset(get = "pub")]
    guessed: BTreeSet<char>,
}

impl Board {
    pub fn new(answer: &Answer) -> Self {
        let formatted: Vec<char> = format_board_string(answer.answer()).chars().collect();
        let state = formatted
            .iter()
            .map(|&c| match c {
                ' ' | '\n' => Cell::Blank(c),
                _ => Cell::Hidden,
            })
            .collect();
        log::debug!("WOD: {}: {}", answer.category(), answer.answer());
        Board {
            answer: answer.answer().clone(),
            formatted,
            category: answer.category().clone(),
            number_of_words: answer.number_of_words(),
            number_of_letters: answer.number_of_letters(),
            state,
            guessed: BTreeSet::new(),
        }
    }

    pub fn is_solved(&self) -> bool {
        !self.state.contains(&Cell::Hidden)
    }

    pub fn is_guessed(&self, letter: char) -> bool {
        self.guessed.contains(&fold(letter))
    }

    /// Reveals every hidden cell holding `letter`, returning how many were revealed.
    /// Guessing the same letter twice is an error and changes nothing.
    pub fn verify(&mut self, letter: char) -> Result<usize, BoardError> {
        let letter = fold(letter);
        if !self.guessed.insert(letter) {
            return Err(BoardError::AlreadyGuessed(letter));
        }
        let mut amount = 0;
        for (cell, &c) in self.state.iter_mut().zip(self.formatted.iter()) {
            if *cell == Cell::Hidden && c == letter {
                *cell = Cell::Revealed(letter);
                amount += 1;
            }
        }
        Ok(amount)
    }

    /// Letters of the alphabet nobody has guessed yet
    pub fn available_letters(&self) -> impl Iterator<Item = char> + '_ {
        ('a'..='z').filter(|c| !self.guessed.contains(c))
    }

    /// True for a guess matching the answer, ignoring case and surrounding whitespace
    pub fn matches(&self, phrase: &str) -> bool {
        phrase.trim().to_lowercase() == self.answer.to_lowercase()
    }
}

fn fold(letter: char) -> char {
    letter.to_lowercase().next().unwrap_or(letter)
}

/// Lays a phrase out in rows of [`BOARD_WIDTH`] columns. Words are packed
/// greedily and never split; every row is padded with spaces and ends with a
/// line break.
pub fn format_board_string(phrase: &str) -> String {
    let lower = phrase.to_lowercase();
    let words: Vec<&str> = lower.split(' ').collect();
    let mut result = String::with_capacity(lower.len() + BOARD_WIDTH);
    let mut space_on_row = BOARD_WIDTH;
    for (i, word) in words.iter().enumerate() {
        result.push_str(word);
        space_on_row = space_on_row.saturating_sub(word.chars().count());
        match words.get(i + 1) {
            Some(next_word) if space_on_row > next_word.chars().count() => {
                result.push(' ');
                space_on_row -= 1;
            },
            Some(_) => {
                end_row(&mut result, space_on_row);
                space_on_row = BOARD_WIDTH;
            },
            None => end_row(&mut result, space_on_row),
        }
    }
    result
}

fn end_row(result: &mut String, padding: usize) {
    result.extend(std::iter::repeat(' ').take(padding));
    result.push('\n');
}

#[cfg(test)]
mod test {
    use test_log::test;

    use super::*;

    fn board(phrase: &str) -> Board {
        Board::new(&Answer::new(phrase, "Test"))
    }

    #[test]
    fn rows_are_fourteen_columns() {
        let formatted = format_board_string("The Quick Brown Fox Jumps Over The Lazy Dog");
        assert_eq!(
            formatted.lines().map(str::trim_end).collect::<Vec<_>>(),
            ["the quick", "brown fox", "jumps over the", "lazy dog"]
        );
        assert!(formatted.ends_with('\n'));
        assert!(formatted.lines().all(|row| row.chars().count() == BOARD_WIDTH));
    }

    #[test]
    fn full_last_row_still_ends_with_a_newline() {
        assert_eq!(format_board_string("abcdefghijklmn"), "abcdefghijklmn\n");
        assert_eq!(format_board_string("abcdefg abcdef"), "abcdefg abcdef\n");
    }

    #[test]
    fn words_survive_formatting_in_order() {
        for phrase in [
            "Cat Dog",
            "A Penny Saved Is A Penny Earned",
            "Supercalifragilistic Expialidocious",
            "Once In A Blue Moon",
        ] {
            let formatted = format_board_string(phrase);
            let lower = phrase.to_lowercase();
            assert_eq!(
                formatted.split_whitespace().collect::<Vec<_>>(),
                lower.split(' ').collect::<Vec<_>>()
            );
        }
    }

    #[test]
    fn verify_reveals_counts_and_rejects_repeats() {
        let mut board = board("CAT DOG");
        assert_eq!(board.verify('c'), Ok(1));
        assert_eq!(board.state()[0], Cell::Revealed('c'));
        assert_eq!(board.verify('z'), Ok(0));
        let before = board.state().clone();
        assert_eq!(board.verify('c'), Err(BoardError::AlreadyGuessed('c')));
        assert_eq!(board.verify('C'), Err(BoardError::AlreadyGuessed('c')));
        assert_eq!(&before, board.state());
    }

    #[test]
    fn verify_is_case_insensitive_and_counts_every_cell() {
        let mut board = board("Banana Bread");
        assert_eq!(board.verify('A'), Ok(4));
        assert_eq!(board.verify('b'), Ok(2));
        assert!(board.is_guessed('B'));
        assert_eq!(board.available_letters().count(), 24);
    }

    #[test]
    fn solved_exactly_when_every_letter_is_revealed() {
        let mut board = board("CAT DOG");
        assert!(!board.is_solved());
        for letter in ['c', 'a', 't', 'd', 'o'] {
            board.verify(letter).unwrap();
            assert!(!board.is_solved());
        }
        board.verify('g').unwrap();
        assert!(board.is_solved());
        let _ = board.verify('x');
        let _ = board.verify('g');
        assert!(board.is_solved());
    }

    #[test]
    fn matches_ignores_case_and_surrounding_space() {
        let board = board("Cat Dog");
        assert!(board.matches("  cat DOG \n"));
        assert!(!board.matches("cat dogs"));
        assert_eq!(board.number_of_words(), 2);
        assert_eq!(board.number_of_letters(), 6);
    }
}
