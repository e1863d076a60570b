//! The Wheel of Discord chat module.
//!
//! Lobby commands are whole messages behind the bot prefix (`gs!wod-start`).
//! Once a game is running the channel belongs to this module, and the player
//! whose turn it is plays with bare words: `spin`, `buy e`, `solve ...` or a
//! single consonant.

use game_core::catalog::Catalog;
use game_core::prelude::*;
use itertools::Itertools;

use crate::configuration::WheelConfiguration;
use crate::render::{render_board, render_letters};
use crate::session::{Game, GameError, GamePhase, SolveOutcome};
use crate::wheel::Spin;

pub const MODULE_NAME: &str = "wheel-of-discord";

const LOBBY_TIMER: &str = "lobby";
const TURN_TIMER: &str = "turn";
const VOWELS: [char; 5] = ['a', 'e', 'i', 'o', 'u'];

#[derive(Debug)]
pub struct WheelOfDiscord {
    config: WheelConfiguration,
    catalog: Catalog,
    prefix: String,
    games: HashMap<ChannelId, Game>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
enum Action {
    Spin,
    Buy(String),
    Solve(String),
    Letter(char),
}

impl WheelOfDiscord {
    pub fn new(config: WheelConfiguration, catalog: Catalog, prefix: String) -> Self {
        WheelOfDiscord {
            config,
            catalog,
            prefix,
            games: HashMap::default(),
        }
    }

    pub fn game(&self, channel: &ChannelId) -> Option<&Game> {
        self.games.get(channel)
    }

    fn command(&self, name: &str) -> String {
        format!("{}wod-{name}", self.prefix)
    }

    fn lobby_command<'c>(&self, content: &'c str) -> Option<&'c str> {
        content.strip_prefix(self.prefix.as_str())?.strip_prefix("wod-")
    }

    /// Forgets the game of a channel and releases everything it held
    fn close(&mut self, channel: &ChannelId, ctx: &mut ModuleContext) {
        if self.games.remove(channel).is_some() {
            log::info!("Wheel of Discord ended in #{channel}");
        }
        ctx.cancel_timer(channel);
        ctx.stop_session(channel);
    }

    fn start(&mut self, message: &ChatMessage, ctx: &mut ModuleContext) -> CommandResult {
        let channel = message.channel();
        if self.games.contains_key(channel) {
            return "A game of Wheel of Discord is already running here!".rejected();
        }
        let mut game = Game::new(self.catalog.answers(), &self.config);
        game.add_player(message.author().clone())?;
        game.start_countdown();
        ctx.arm_timer(channel, LOBBY_TIMER, self.config.lobby_delay());
        ctx.send(
            channel,
            format!(
                "{} is starting a game of Wheel of Discord! Type **{}** to join!\nThe game will begin in {} seconds.",
                message.author().mention(),
                self.command("join"),
                self.config.time_to_start()
            ),
        );
        log::info!("Wheel of Discord lobby opened in #{channel} by {}", message.author().handle());
        self.games.insert(channel.clone(), game);
        Ok(())
    }

    fn join(&mut self, message: &ChatMessage, ctx: &mut ModuleContext) -> CommandResult {
        let join = self.command("join");
        let start = self.command("start");
        let Some(game) = self.games.get_mut(message.channel()) else {
            return format!("There is no game to join here. Type **{start}** to start one!").rejected();
        };
        game.add_player(message.author().clone())?;
        let spots = if game.joinable() {
            format!("Type **{join}** to join!")
        } else {
            "There are no more spots!".to_string()
        };
        ctx.send(
            message.channel(),
            format!(
                "{} joined! {spots}\nThe game will begin in {} seconds.",
                message.author().mention(),
                game.time_until_start()
            ),
        );
        Ok(())
    }

    fn leave(&mut self, message: &ChatMessage, ctx: &mut ModuleContext) -> CommandResult {
        let channel = message.channel();
        let join = self.command("join");
        let turn_duration = self.config.turn_duration();
        let Some(game) = self.games.get_mut(channel) else {
            return "There is no game to leave here.".rejected();
        };
        let had_turn = game.is_turn_of(message.author().id());
        let in_lobby = game.phase() == GamePhase::Lobby;
        let leaving = game.remove_player(message.author().id())?;
        let mut lines = vec![if in_lobby {
            format!("{} left the game! Type **{join}** to join!", leaving.mention())
        } else {
            format!("{} left the game and forfeited ${}.", leaving.mention(), leaving.total())
        }];
        if game.is_ended() {
            lines.push("Everybody left, so the game is over.".to_string());
            ctx.send(channel, lines.join("\n"));
            self.close(channel, ctx);
            return Ok(());
        }
        if had_turn {
            if let Some(player) = game.turn() {
                lines.push(turn_prompt(player.mention()));
            }
            ctx.arm_timer(channel, TURN_TIMER, turn_duration);
        }
        ctx.send(channel, lines.join("\n"));
        Ok(())
    }

    fn stop(&mut self, message: &ChatMessage, ctx: &mut ModuleContext) -> CommandResult {
        let channel = message.channel();
        let Some(game) = self.games.get_mut(channel) else {
            return "There is no game to stop here.".rejected();
        };
        if game.player(message.author().id()).is_none() {
            return "Only players can stop the game.".rejected();
        }
        game.end_game();
        let summary = format!(
            "{} stopped the game.\n{}",
            message.author().mention(),
            standings(game)
        );
        ctx.send(channel, summary);
        self.close(channel, ctx);
        Ok(())
    }

    fn play(&mut self, message: &ChatMessage, ctx: &mut ModuleContext) -> CommandResult {
        let channel = message.channel();
        let Some(game) = self.games.get_mut(channel) else {
            return Ok(());
        };
        if !matches!(game.phase(), GamePhase::Playing(_)) {
            return Ok(());
        }
        let Some(action) = parse_action(message.content()) else {
            return Ok(());
        };
        let author = message.author().id();
        if game.player(author).is_none() {
            return Ok(());
        }
        if !game.is_turn_of(author) {
            let current = game.turn().map(|player| player.mention()).unwrap_or_default();
            return format!("It's not your turn, {current} is playing.").rejected();
        }
        let result = take_turn(game, &self.config, channel, action, ctx);
        if game.is_ended() {
            self.close(channel, ctx);
        }
        result
    }

    fn lobby_expired(&mut self, channel: &ChannelId, ctx: &mut ModuleContext) -> CommandResult {
        let Some(game) = self.games.get_mut(channel) else {
            return Ok(());
        };
        if game.phase() != GamePhase::Lobby {
            return Ok(());
        }
        if game.players().is_empty() {
            self.close(channel, ctx);
            return Ok(());
        }
        if let Err(err) = ctx.start_session(channel) {
            self.close(channel, ctx);
            return Err::<(), _>(err).rejected();
        }
        let mentions = game.players().iter().map(|player| player.mention()).join(" ");
        log::info!("Wheel of Discord started in #{channel} with {} players", game.players().len());
        let mut lines = vec![format!("{mentions}, let's get started! Welcome to Wheel of Discord!")];
        let result = next_round(game, &self.config, channel, &mut lines, ctx);
        if game.is_ended() {
            self.close(channel, ctx);
        }
        result
    }

    fn turn_expired(&mut self, channel: &ChannelId, ctx: &mut ModuleContext) -> CommandResult {
        let Some(game) = self.games.get_mut(channel) else {
            return Ok(());
        };
        let Some(player) = game.turn() else {
            return Ok(());
        };
        let mut lines = vec![format!("Time's up, {}!", player.mention())];
        game.advance_turn();
        if let Some(player) = game.turn() {
            lines.push(turn_prompt(player.mention()));
        }
        ctx.arm_timer(channel, TURN_TIMER, self.config.turn_duration());
        ctx.send(channel, lines.join("\n"));
        Ok(())
    }
}

impl GameModule for WheelOfDiscord {
    fn name(&self) -> &'static str {
        MODULE_NAME
    }

    fn describe_commands(&self) -> Vec<CommandHelp> {
        vec![
            CommandHelp::new(self.command("start"), "Start a game of Wheel of Discord in this channel."),
            CommandHelp::new(self.command("join"), "Join the game that is about to start."),
            CommandHelp::new(self.command("leave"), "Leave the game, forfeiting your winnings."),
            CommandHelp::new(self.command("stop"), "End the game right away."),
            CommandHelp::new(
                self.command("categories"),
                "Display a list of the installed categories for Wheel of Discord.",
            ),
            CommandHelp::new(
                self.command("answers"),
                "Display the number of installed answers for Wheel of Discord.",
            ),
            CommandHelp::new("spin", "Spin the wheel on your turn."),
            CommandHelp::new("<consonant>", "Guess a consonant after spinning."),
            CommandHelp::new("buy <vowel>", "Buy a vowel from your winnings this round."),
            CommandHelp::new("solve <answer>", "Solve the puzzle."),
        ]
    }

    fn handle_message(&mut self, message: &ChatMessage, ctx: &mut ModuleContext) -> CommandResult {
        match self.lobby_command(message.content()) {
            Some("start") => self.start(message, ctx),
            Some("join") => self.join(message, ctx),
            Some("leave") => self.leave(message, ctx),
            Some("stop") => self.stop(message, ctx),
            Some("categories") => {
                ctx.send(message.channel(), format!("{}.", self.catalog.categories().join(", ")));
                Ok(())
            },
            Some("answers") => {
                ctx.send(
                    message.channel(),
                    format!(
                        "I have {} answers installed for Wheel of Discord!",
                        self.catalog.answer_count()
                    ),
                );
                Ok(())
            },
            _ => self.play(message, ctx),
        }
    }

    fn handle_timer(&mut self, fired: &TimerFired, ctx: &mut ModuleContext) -> CommandResult {
        match fired.tag() {
            LOBBY_TIMER => self.lobby_expired(fired.channel(), ctx),
            TURN_TIMER => self.turn_expired(fired.channel(), ctx),
            tag => format!("unknown timer [{tag}]").critical(),
        }
    }
}

fn parse_action(content: &str) -> Option<Action> {
    let lower = content.trim().to_lowercase();
    if lower == "spin" {
        return Some(Action::Spin);
    }
    if let Some(vowel) = lower.strip_prefix("buy ") {
        return Some(Action::Buy(vowel.trim().to_string()));
    }
    if let Some(phrase) = lower.strip_prefix("solve ") {
        return Some(Action::Solve(phrase.trim().to_string()));
    }
    let mut chars = lower.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None) if letter.is_ascii_alphabetic() => Some(Action::Letter(letter)),
        _ => None,
    }
}

fn turn_prompt(mention: String) -> String {
    format!("It's {mention}'s turn! Type **spin**, **buy <vowel>** or **solve <answer>**.")
}

fn reveal_line(letter: char, amount: usize) -> String {
    let letter = letter.to_ascii_uppercase();
    match amount {
        0 => format!("There is no {letter}."),
        1 => format!("There is 1 {letter}!"),
        n => format!("There are {n} {letter}'s!"),
    }
}

fn board_lines(game: &Game, config: &WheelConfiguration) -> Vec<String> {
    let Some(board) = game.board() else {
        return Vec::new();
    };
    vec![
        render_board(board, config.glyphs()).trim_end().to_string(),
        format!("Letters left: {}", render_letters(board, config.glyphs())),
    ]
}

fn standings(game: &Game) -> String {
    let mut text = String::from("Final standings:");
    for (place, player) in game.standings().into_iter().enumerate() {
        text.push_str(&format!("\n{}. {} ${}", place + 1, player.mention(), player.total()));
    }
    text
}

/// Starts the next round, or wraps the game up after the last one. Whatever
/// was said so far goes out with the announcement.
fn next_round(
    game: &mut Game,
    config: &WheelConfiguration,
    channel: &ChannelId,
    lines: &mut Vec<String>,
    ctx: &mut ModuleContext,
) -> CommandResult {
    match game.next_round() {
        Ok(Some(board)) => {
            let category = board.category().clone();
            lines.push(format!(
                "**Round {} of {}**\nCategory: **{category}**",
                game.round(),
                game.number_of_rounds()
            ));
            lines.extend(board_lines(game, config));
            if let Some(player) = game.turn() {
                lines.push(turn_prompt(player.mention()));
            }
            ctx.arm_timer(channel, TURN_TIMER, config.turn_duration());
            ctx.send(channel, lines.join("\n"));
            Ok(())
        },
        Ok(None) => {
            lines.push(format!("That was the last round!\n{}", standings(game)));
            ctx.send(channel, lines.join("\n"));
            Ok(())
        },
        Err(err) => {
            if !lines.is_empty() {
                ctx.send(channel, lines.join("\n"));
            }
            Err(err.into())
        },
    }
}

/// Plays one action of the current player and reports it to the channel
fn take_turn(
    game: &mut Game,
    config: &WheelConfiguration,
    channel: &ChannelId,
    action: Action,
    ctx: &mut ModuleContext,
) -> CommandResult {
    let (player, mention) = match game.turn() {
        Some(player) => (player.id().clone(), player.mention()),
        None => return "No round is being played".critical(),
    };
    let mut lines = Vec::new();
    let mut revealed = false;
    let mut solved = None;
    match action {
        Action::Spin => {
            if let Some(Spin::Reward(amount)) = game.spin() {
                return format!("You already spun ${amount}, guess a consonant!").rejected();
            }
            let spin = game.spin_wheel()?;
            lines.push(match spin {
                Spin::Reward(_) => format!("{mention} spun **{spin}**! Guess a consonant."),
                Spin::Lose => format!("{mention} spun **{spin}**!"),
                Spin::Bankrupt => format!("{mention} went **{spin}** and lost this round's winnings!"),
            });
        },
        Action::Letter(letter) if VOWELS.contains(&letter) => {
            return format!(
                "Vowels cost ${}, type **buy {letter}** to buy one.",
                game.vowel_price()
            )
            .rejected();
        },
        Action::Letter(_) if game.spin().and_then(|spin| spin.reward()).is_none() => {
            return "Spin the wheel before guessing a consonant".rejected();
        },
        Action::Letter(letter) => match game.guess_consonant(letter) {
            Ok(amount) => {
                lines.push(reveal_line(letter, amount));
                revealed = amount > 0;
            },
            Err(err @ GameError::Board(_)) => lines.push(err.to_string()),
            Err(err) => return Err(err.into()),
        },
        Action::Buy(vowel) => {
            let letter = match vowel.chars().exactly_one() {
                Ok(letter) if VOWELS.contains(&letter) => letter,
                _ => return "Type **buy** followed by a vowel, like **buy e**.".rejected(),
            };
            match game.buy_vowel(letter) {
                Ok(amount) => {
                    lines.push(reveal_line(letter, amount));
                    revealed = amount > 0;
                },
                Err(err @ (GameError::Board(_) | GameError::InsufficientFunds { .. })) => {
                    lines.push(err.to_string())
                },
                Err(err) => return Err(err.into()),
            }
        },
        Action::Solve(phrase) => match game.solve(&phrase)? {
            SolveOutcome::Correct { winnings } => solved = Some(winnings),
            SolveOutcome::Incorrect => lines.push(format!("Sorry {mention}, that's not it!")),
        },
    }

    let completed = game.board().as_ref().is_some_and(|board| board.is_solved());
    if revealed && completed && solved.is_none() {
        let answer = game.board().as_ref().map(|board| board.answer().clone()).unwrap_or_default();
        if let SolveOutcome::Correct { winnings } = game.solve(&answer)? {
            solved = Some(winnings);
        }
    }

    if let Some(winnings) = solved {
        let answer = game.board().as_ref().map(|board| board.answer().clone()).unwrap_or_default();
        log::debug!("{mention} solved round {} in #{channel}", game.round());
        lines.push(format!(
            "{mention} solved it! The answer was **{answer}**. They won ${winnings} this round."
        ));
        return next_round(game, config, channel, &mut lines, ctx);
    }

    if revealed {
        lines.extend(board_lines(game, config));
        if let Some(current) = game.player(&player) {
            lines.push(format!(
                "{mention} has ${} this round.",
                current.money(game.round())
            ));
        }
    }
    if !game.is_turn_of(&player) {
        if let Some(next) = game.turn() {
            lines.push(turn_prompt(next.mention()));
        }
    }
    ctx.arm_timer(channel, TURN_TIMER, config.turn_duration());
    ctx.send(channel, lines.join("\n"));
    Ok(())
}
