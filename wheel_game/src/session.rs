//! The game session state machine.
//!
//! A [`Game`] lives in one channel. It starts in the lobby where participants
//! join, plays a fixed number of rounds, then ends. Inside a round the turn
//! pointer moves only through [`Game::advance_turn`], and each turn goes from
//! spinning the wheel to guessing letters (or solving) until a miss, a bad
//! spin or a solve ends it.

use std::sync::Arc;
use std::time::Instant;

use game_core::catalog::Answer;
use game_core::prelude::*;
use rand::rngs::StdRng;
use rand::seq::IteratorRandom;
use rand::SeedableRng;
use thiserror::Error;

use crate::board::{Board, BoardError};
use crate::configuration::WheelConfiguration;
use crate::player::Player;
use crate::wheel::{RewardWheel, Spin};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GamePhase {
    Lobby,
    Playing(usize),
    Ended,
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum GameError {
    #[error("The game can't be joined right now")]
    NotJoinable,
    #[error("You are already in this game")]
    AlreadyJoined,
    #[error("You are not in this game")]
    NotFound,
    #[error("No round is being played")]
    NoCurrentTurn,
    #[error("You need at least ${price} to buy a vowel, you have ${balance}")]
    InsufficientFunds { balance: u32, price: u32 },
    #[error(transparent)]
    Board(#[from] BoardError),
    #[error("Spin the wheel before guessing a consonant")]
    NoActiveSpin,
    #[error("Only {answers} answers are installed, not enough for {rounds} rounds")]
    AnswersExhausted { answers: usize, rounds: usize },
}

impl From<GameError> for CommandError {
    fn from(value: GameError) -> Self {
        match value {
            GameError::AnswersExhausted { .. } => CommandError::Exhausted(value.to_string()),
            GameError::NoCurrentTurn | GameError::NoActiveSpin => {
                CommandError::Critical(anyhow::Error::from(value))
            },
            _ => CommandError::Rejected(value.to_string()),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SolveOutcome {
    Correct { winnings: u32 },
    Incorrect,
}

#[derive(Debug, getset::CopyGetters, getset::Getters)]
pub struct Game {
    answers: Arc<[Answer]>,
    #[getset(get_copy = "pub")]
    max_players: usize,
    time_to_start: u64,
    #[getset(get_copy = "pub")]
    number_of_rounds: usize,
    #[getset(get_copy = "pub")]
    vowel_price: u32,
    #[getset(get_copy = "pub")]
    minimum_solve: u32,
    #[getset(get = "pub")]
    wheel: RewardWheel,
    countdown_started: Option<Instant>,
    #[getset(get = "pub")]
    board: Option<Board>,
    #[getset(get_copy = "pub")]
    phase: GamePhase,
    #[getset(get = "pub")]
    seen: Vec<usize>,
    #[getset(get = "pub")]
    players: Vec<Player>,
    turn: Option<ParticipantId>,
    #[getset(get_copy = "pub")]
    spin: Option<Spin>,
    rng: StdRng,
}

impl Game {
    pub fn new(answers: Arc<[Answer]>, config: &WheelConfiguration) -> Self {
        Self::with_rng(answers, config, StdRng::from_entropy())
    }

    pub fn with_rng(answers: Arc<[Answer]>, config: &WheelConfiguration, rng: StdRng) -> Self {
        if answers.len() < config.number_of_rounds() {
            log::warn!(
                "Only {} answers for {} rounds, the game will end early",
                answers.len(),
                config.number_of_rounds()
            );
        }
        Game {
            answers,
            max_players: config.max_players(),
            time_to_start: config.time_to_start(),
            number_of_rounds: config.number_of_rounds(),
            vowel_price: config.vowel_price(),
            minimum_solve: config.minimum_solve(),
            wheel: config.wheel(),
            countdown_started: None,
            board: None,
            phase: GamePhase::Lobby,
            seen: Vec::new(),
            players: Vec::new(),
            turn: None,
            spin: None,
            rng,
        }
    }

    /// The number of the round being played, or 0 when no round is. That
    /// covers both the lobby and an ended game, so use [`Game::phase`] to
    /// tell those apart.
    pub fn round(&self) -> usize {
        match self.phase {
            GamePhase::Lobby | GamePhase::Ended => 0,
            GamePhase::Playing(round) => round,
        }
    }

    pub fn joinable(&self) -> bool {
        self.players.len() < self.max_players && self.phase == GamePhase::Lobby
    }

    pub fn is_ended(&self) -> bool {
        self.phase == GamePhase::Ended
    }

    pub fn player(&self, id: &ParticipantId) -> Option<&Player> {
        self.players.iter().find(|player| player.id() == id)
    }

    /// The player whose turn it is
    pub fn turn(&self) -> Option<&Player> {
        self.turn.as_ref().and_then(|id| self.player(id))
    }

    pub fn is_turn_of(&self, id: &ParticipantId) -> bool {
        self.turn.as_ref() == Some(id)
    }

    fn index_of_player(&self, id: &ParticipantId) -> Option<usize> {
        self.players.iter().position(|player| player.id() == id)
    }

    pub fn add_player(&mut self, participant: Participant) -> Result<&Player, GameError> {
        if !self.joinable() {
            return Err(GameError::NotJoinable);
        }
        if self.index_of_player(participant.id()).is_some() {
            return Err(GameError::AlreadyJoined);
        }
        self.players.push(Player::new(participant));
        Ok(&self.players[self.players.len() - 1])
    }

    /// Removes a player, passing the turn on first if it was theirs.
    /// The game ends when nobody is left.
    pub fn remove_player(&mut self, id: &ParticipantId) -> Result<Player, GameError> {
        let index = self.index_of_player(id).ok_or(GameError::NotFound)?;
        if self.is_turn_of(id) {
            self.advance_turn();
        }
        let removed = self.players.remove(index);
        if self.is_turn_of(id) {
            // They were the only player left
            self.turn = None;
        }
        if self.players.is_empty() {
            self.end_game();
        }
        Ok(removed)
    }

    pub fn end_game(&mut self) {
        self.phase = GamePhase::Ended;
        self.spin = None;
    }

    pub fn start_countdown(&mut self) {
        self.countdown_started = Some(Instant::now());
    }

    /// Whole seconds left before the first round
    pub fn time_until_start(&self) -> u64 {
        self.time_until_start_at(Instant::now())
    }

    pub fn time_until_start_at(&self, now: Instant) -> u64 {
        let Some(started) = self.countdown_started else {
            return self.time_to_start;
        };
        let elapsed_millis = now.saturating_duration_since(started).as_millis();
        let elapsed_secs = u64::try_from(elapsed_millis.div_ceil(1000)).unwrap_or(u64::MAX);
        self.time_to_start.saturating_sub(elapsed_secs)
    }

    /// Starts the next round with a fresh board. Returns `None` once every
    /// round was played, which also ends the game.
    pub fn next_round(&mut self) -> Result<Option<&Board>, GameError> {
        let round = match self.phase {
            GamePhase::Ended => return Ok(None),
            GamePhase::Playing(round) if round >= self.number_of_rounds => {
                self.end_game();
                return Ok(None);
            },
            GamePhase::Playing(round) => round,
            GamePhase::Lobby => 0,
        };
        let Some(index) = (0..self.answers.len())
            .filter(|i| !self.seen.contains(i))
            .choose(&mut self.rng)
        else {
            self.end_game();
            return Err(GameError::AnswersExhausted {
                answers: self.answers.len(),
                rounds: self.number_of_rounds,
            });
        };
        self.phase = GamePhase::Playing(round + 1);
        self.advance_turn();
        self.seen.push(index);
        self.board = Some(Board::new(&self.answers[index]));
        Ok(self.board.as_ref())
    }

    /// Passes the turn to the next player in join order
    pub fn advance_turn(&mut self) {
        self.spin = None;
        let next = match self.turn.as_ref().and_then(|id| self.index_of_player(id)) {
            Some(index) => self.players.get((index + 1) % self.players.len()),
            None => self.players.first(),
        };
        self.turn = next.map(|player| player.id().clone());
    }

    fn current_index(&self) -> Result<usize, GameError> {
        if !matches!(self.phase, GamePhase::Playing(_)) || self.board.is_none() {
            return Err(GameError::NoCurrentTurn);
        }
        self.turn
            .as_ref()
            .and_then(|id| self.index_of_player(id))
            .ok_or(GameError::NoCurrentTurn)
    }

    fn board_mut(&mut self) -> Result<&mut Board, GameError> {
        self.board.as_mut().ok_or(GameError::NoCurrentTurn)
    }

    pub fn spin_wheel(&mut self) -> Result<Spin, GameError> {
        self.current_index()?;
        let spin = self.wheel.sample(&mut self.rng);
        self.land_on(spin)
    }

    /// Applies a wheel result to the current turn
    pub fn land_on(&mut self, spin: Spin) -> Result<Spin, GameError> {
        let current = self.current_index()?;
        let round = self.round();
        self.spin = Some(spin);
        match spin {
            Spin::Lose => self.advance_turn(),
            Spin::Bankrupt => {
                *self.players[current].money_mut(round) = 0;
                self.advance_turn();
            },
            Spin::Reward(_) => {},
        }
        Ok(spin)
    }

    /// Pays for a vowel and reveals it. The turn ends unless the vowel was found.
    pub fn buy_vowel(&mut self, vowel: char) -> Result<usize, GameError> {
        let current = self.current_index()?;
        let round = self.round();
        let price = self.vowel_price;
        let balance = self.players[current].money(round);
        let result = if balance >= price {
            *self.players[current].money_mut(round) -= price;
            self.board_mut()?.verify(vowel).map_err(GameError::from)
        } else {
            Err(GameError::InsufficientFunds { balance, price })
        };
        if !matches!(result, Ok(amount) if amount > 0) {
            self.advance_turn();
        }
        result
    }

    /// Guesses a consonant on the active spin. Each revealed letter pays the
    /// spin value, after which the player has to spin again.
    pub fn guess_consonant(&mut self, consonant: char) -> Result<usize, GameError> {
        let current = self.current_index()?;
        let reward = self
            .spin
            .and_then(|spin| spin.reward())
            .ok_or(GameError::NoActiveSpin)?;
        let round = self.round();
        match self.board_mut()?.verify(consonant) {
            Ok(amount) if amount > 0 => {
                let earned = reward * amount as u32;
                *self.players[current].money_mut(round) += earned;
                self.spin = None;
                Ok(amount)
            },
            result => {
                self.advance_turn();
                result.map_err(GameError::from)
            },
        }
    }

    /// A correct solve wins the round: the solver keeps at least the minimum
    /// and everybody else loses what they earned this round.
    pub fn solve(&mut self, phrase: &str) -> Result<SolveOutcome, GameError> {
        let current = self.current_index()?;
        let correct = self.board.as_ref().is_some_and(|board| board.matches(phrase));
        if !correct {
            self.advance_turn();
            return Ok(SolveOutcome::Incorrect);
        }
        let round = self.round();
        let minimum = self.minimum_solve;
        for (i, player) in self.players.iter_mut().enumerate() {
            let money = player.money_mut(round);
            *money = if i == current { minimum.max(*money) } else { 0 };
        }
        self.spin = None;
        Ok(SolveOutcome::Correct {
            winnings: self.players[current].money(round),
        })
    }

    /// Players ordered by total winnings, best first
    pub fn standings(&self) -> Vec<&Player> {
        let mut standings: Vec<_> = self.players.iter().collect();
        standings.sort_by_key(|player| std::cmp::Reverse(player.total()));
        standings
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use test_log::test;

    use super::*;

    fn participant(id: &str) -> Participant {
        Participant::new(id, format!("player-{id}"))
    }

    fn game_with(phrases: &[&str], wheel: Vec<Spin>) -> Game {
        let answers: Vec<_> = phrases.iter().map(|p| Answer::new(*p, "Test")).collect();
        let config = WheelConfiguration::default().with_wheel(wheel);
        Game::with_rng(answers.into(), &config, StdRng::seed_from_u64(42))
    }

    /// A game in round 1 on "CAT DOG" with the given players seated
    fn playing(ids: &[&str], wheel: Vec<Spin>) -> Game {
        let mut game = game_with(&["CAT DOG"], wheel);
        for id in ids {
            game.add_player(participant(id)).unwrap();
        }
        game.next_round().unwrap().expect("first round has a board");
        game
    }

    fn turn_id(game: &Game) -> Option<&str> {
        game.turn().map(|player| player.id().as_str())
    }

    #[test]
    fn round_is_zero_outside_of_play() {
        let mut game = game_with(&["CAT DOG"], vec![Spin::Reward(500)]);
        assert_eq!((game.phase(), game.round()), (GamePhase::Lobby, 0));
        game.add_player(participant("a")).unwrap();
        game.next_round().unwrap();
        assert_eq!((game.phase(), game.round()), (GamePhase::Playing(1), 1));
        game.end_game();
        assert_eq!((game.phase(), game.round()), (GamePhase::Ended, 0));
    }

    #[test]
    fn roster_is_capped_and_unique() {
        let mut game = game_with(&["CAT DOG"], vec![Spin::Reward(500)]);
        assert!(game.add_player(participant("a")).is_ok());
        assert_eq!(game.add_player(participant("a")).unwrap_err(), GameError::AlreadyJoined);
        assert!(game.add_player(participant("b")).is_ok());
        assert!(game.add_player(participant("c")).is_ok());
        assert!(!game.joinable());
        assert_eq!(game.add_player(participant("d")).unwrap_err(), GameError::NotJoinable);
        assert_eq!(game.players().len(), 3);
    }

    #[test]
    fn nobody_joins_once_playing() {
        let mut game = playing(&["a"], vec![Spin::Reward(500)]);
        assert_eq!(game.add_player(participant("b")).unwrap_err(), GameError::NotJoinable);
    }

    #[test]
    fn turn_rotates_in_join_order() {
        let mut game = playing(&["a", "b", "c"], vec![Spin::Reward(500)]);
        assert_eq!(turn_id(&game), Some("a"));
        let mut seen = Vec::new();
        for _ in 0..3 {
            game.advance_turn();
            seen.push(turn_id(&game).unwrap().to_string());
        }
        assert_eq!(seen, ["b", "c", "a"]);
    }

    #[test]
    fn removing_the_current_player_passes_the_turn() {
        let mut game = playing(&["a", "b", "c"], vec![Spin::Reward(500)]);
        game.advance_turn();
        let removed = game.remove_player(&ParticipantId::from("b")).unwrap();
        assert_eq!(removed.id().as_str(), "b");
        assert_eq!(turn_id(&game), Some("c"));

        game.remove_player(&ParticipantId::from("c")).unwrap();
        assert_eq!(turn_id(&game), Some("a"));
        game.remove_player(&ParticipantId::from("a")).unwrap();
        assert_eq!(turn_id(&game), None);
        assert!(game.is_ended());
        assert_eq!(
            game.remove_player(&ParticipantId::from("a")).unwrap_err(),
            GameError::NotFound
        );
    }

    #[test]
    fn countdown_reports_whole_seconds_left() {
        let mut game = game_with(&["CAT DOG"], vec![]);
        assert_eq!(game.time_until_start(), 20);
        game.start_countdown();
        let started = game.countdown_started.unwrap();
        assert_eq!(game.time_until_start_at(started), 20);
        assert_eq!(game.time_until_start_at(started + Duration::from_millis(1500)), 18);
        assert_eq!(game.time_until_start_at(started + Duration::from_secs(60)), 0);
    }

    #[test]
    fn rounds_never_repeat_an_answer() {
        let phrases = ["ONE", "TWO", "THREE", "FOUR", "FIVE"];
        let mut game = game_with(&phrases, vec![Spin::Reward(500)]);
        game.add_player(participant("a")).unwrap();
        let mut answers = Vec::new();
        while let Some(board) = game.next_round().unwrap() {
            answers.push(board.answer().clone());
        }
        answers.sort();
        let mut expected: Vec<_> = phrases.iter().map(|p| p.to_string()).collect();
        expected.sort();
        assert_eq!(answers, expected);
        assert!(game.is_ended());
        assert_eq!(game.seen().len(), 5);
    }

    #[test]
    fn running_out_of_answers_ends_the_game() {
        let mut game = game_with(&["ONE", "TWO"], vec![Spin::Reward(500)]);
        game.add_player(participant("a")).unwrap();
        assert!(game.next_round().unwrap().is_some());
        assert!(game.next_round().unwrap().is_some());
        assert_eq!(
            game.next_round().unwrap_err(),
            GameError::AnswersExhausted {
                answers: 2,
                rounds: 5
            }
        );
        assert!(game.is_ended());
    }

    #[test]
    fn consonant_hit_pays_and_keeps_the_turn() {
        let mut game = game_with(&["BOB ATE"], vec![Spin::Reward(500)]);
        game.add_player(participant("a")).unwrap();
        game.add_player(participant("b")).unwrap();
        game.next_round().unwrap();

        assert_eq!(game.spin_wheel(), Ok(Spin::Reward(500)));
        assert_eq!(game.guess_consonant('b'), Ok(2));
        assert_eq!(game.players()[0].money(1), 1000);
        assert_eq!(game.spin(), None);
        assert_eq!(turn_id(&game), Some("a"));
    }

    #[test]
    fn consonant_miss_or_repeat_passes_the_turn() {
        let mut game = playing(&["a", "b"], vec![Spin::Reward(500)]);
        game.spin_wheel().unwrap();
        assert_eq!(game.guess_consonant('z'), Ok(0));
        assert_eq!(turn_id(&game), Some("b"));

        game.spin_wheel().unwrap();
        game.guess_consonant('c').unwrap();
        game.spin_wheel().unwrap();
        assert_eq!(
            game.guess_consonant('c'),
            Err(GameError::Board(BoardError::AlreadyGuessed('c')))
        );
        assert_eq!(turn_id(&game), Some("a"));
        assert_eq!(game.players()[1].money(1), 500);
    }

    #[test]
    fn consonant_needs_a_reward_spin() {
        let mut game = playing(&["a", "b"], vec![Spin::Reward(500)]);
        assert_eq!(game.guess_consonant('c'), Err(GameError::NoActiveSpin));
        assert_eq!(turn_id(&game), Some("a"));
        assert!(!game.board().as_ref().unwrap().is_guessed('c'));
    }

    #[test]
    fn lose_and_bankrupt_end_the_turn() {
        let mut game = playing(&["a", "b"], vec![Spin::Lose]);
        assert_eq!(game.spin_wheel(), Ok(Spin::Lose));
        assert_eq!(turn_id(&game), Some("b"));
        assert_eq!(game.spin(), None);

        *game.players[1].money_mut(1) = 1200;
        *game.players[1].money_mut(0) = 300;
        assert_eq!(game.land_on(Spin::Bankrupt), Ok(Spin::Bankrupt));
        assert_eq!(game.players()[1].money(1), 0);
        assert_eq!(game.players()[1].total(), 300);
        assert_eq!(turn_id(&game), Some("a"));
    }

    #[test]
    fn vowels_cost_money_up_front() {
        let mut game = playing(&["a", "b"], vec![Spin::Reward(500)]);
        assert_eq!(
            game.buy_vowel('a'),
            Err(GameError::InsufficientFunds {
                balance: 0,
                price: 250
            })
        );
        assert_eq!(game.players()[0].money(1), 0);
        assert_eq!(turn_id(&game), Some("b"));
        assert!(!game.board().as_ref().unwrap().is_guessed('a'));

        *game.players[1].money_mut(1) = 600;
        assert_eq!(game.buy_vowel('a'), Ok(1));
        assert_eq!(game.players()[1].money(1), 350);
        assert_eq!(turn_id(&game), Some("b"));

        assert_eq!(game.buy_vowel('e'), Ok(0));
        assert_eq!(game.players()[1].money(1), 100);
        assert_eq!(turn_id(&game), Some("a"));
    }

    #[test]
    fn buying_a_guessed_vowel_still_costs_and_ends_the_turn() {
        let mut game = playing(&["a", "b"], vec![Spin::Reward(500)]);
        *game.players[0].money_mut(1) = 1000;
        game.buy_vowel('o').unwrap();
        assert_eq!(
            game.buy_vowel('o'),
            Err(GameError::Board(BoardError::AlreadyGuessed('o')))
        );
        assert_eq!(game.players()[0].money(1), 500);
        assert_eq!(turn_id(&game), Some("b"));
    }

    #[test]
    fn solving_takes_the_round() {
        let mut game = playing(&["a", "b", "c"], vec![Spin::Reward(500)]);
        *game.players[1].money_mut(1) = 2000;
        *game.players[2].money_mut(1) = 300;
        *game.players[2].money_mut(0) = 40;
        assert_eq!(game.solve("  cat dog "), Ok(SolveOutcome::Correct { winnings: 1000 }));
        assert_eq!(game.players()[0].money(1), 1000);
        assert_eq!(game.players()[1].money(1), 0);
        assert_eq!(game.players()[2].money(1), 0);
        assert_eq!(game.players()[2].total(), 40);
        assert_eq!(turn_id(&game), Some("a"));
    }

    #[test]
    fn solver_keeps_winnings_above_the_minimum() {
        let mut game = playing(&["a", "b"], vec![Spin::Reward(500)]);
        *game.players[0].money_mut(1) = 2500;
        assert_eq!(game.solve("CAT DOG"), Ok(SolveOutcome::Correct { winnings: 2500 }));
    }

    #[test]
    fn wrong_solution_passes_the_turn() {
        let mut game = playing(&["a", "b"], vec![Spin::Reward(500)]);
        *game.players[0].money_mut(1) = 700;
        assert_eq!(game.solve("cat dig"), Ok(SolveOutcome::Incorrect));
        assert_eq!(game.players()[0].money(1), 700);
        assert_eq!(turn_id(&game), Some("b"));
    }

    #[test]
    fn next_round_starts_after_the_last_turn_holder() {
        let mut game = game_with(&["ONE", "TWO", "THREE"], vec![Spin::Reward(500)]);
        for id in ["a", "b", "c"] {
            game.add_player(participant(id)).unwrap();
        }
        game.next_round().unwrap();
        game.advance_turn();
        assert_eq!(turn_id(&game), Some("b"));
        game.next_round().unwrap();
        assert_eq!(game.round(), 2);
        assert_eq!(turn_id(&game), Some("c"));
    }

    #[test]
    fn standings_rank_by_total() {
        let mut game = game_with(&["ONE", "TWO"], vec![Spin::Reward(500)]);
        for id in ["a", "b"] {
            game.add_player(participant(id)).unwrap();
        }
        game.next_round().unwrap();
        *game.players[1].money_mut(1) = 900;
        let standings: Vec<_> = game.standings().iter().map(|p| p.id().as_str()).collect();
        assert_eq!(standings, ["b", "a"]);
    }

    #[test]
    fn actions_outside_a_round_are_refused() {
        let mut game = game_with(&["CAT DOG"], vec![Spin::Reward(500)]);
        game.add_player(participant("a")).unwrap();
        assert_eq!(game.spin_wheel(), Err(GameError::NoCurrentTurn));
        assert_eq!(game.solve("cat dog"), Err(GameError::NoCurrentTurn));
    }

    #[test]
    fn errors_become_command_errors() {
        assert!(CommandError::from(GameError::NotJoinable).is_rejection());
        assert!(CommandError::from(GameError::Board(BoardError::AlreadyGuessed('e'))).is_rejection());
        assert!(matches!(
            CommandError::from(GameError::AnswersExhausted { answers: 0, rounds: 5 }),
            CommandError::Exhausted(_)
        ));
        assert!(matches!(
            CommandError::from(GameError::NoActiveSpin),
            CommandError::Critical(_)
        ));
    }
}
