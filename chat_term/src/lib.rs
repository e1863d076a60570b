//! A console stand-in for the chat platform.
//!
//! Every stdin line is one chat message written as `author@channel: text`.
//! Replies are printed to stdout, prefixed with their channel.

use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Mutex;

use bevy::app::AppExit;
use crossterm::style::{style, Stylize};
use game_core::prelude::*;
use game_core::GameshowCoreSet;
use thiserror::Error;

const QUIT_COMMAND: &str = "/quit";

#[derive(Debug, Default)]
pub struct ChatTermPlugin {
    exit_on_eof: bool,
}

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum LineError {
    #[error("expected `author@channel: text`")]
    MissingSeparator,
    #[error("author and channel cannot be empty")]
    EmptyName,
}

#[derive(Debug, Resource, getset::CopyGetters)]
pub struct ChatTermConfig {
    /// Stop the app once stdin is closed
    #[getset(get_copy = "pub")]
    exit_on_eof: bool,
}

#[derive(Debug)]
enum TermInput {
    Line(String),
    Closed,
}

#[derive(Deref, Resource)]
struct TermChatListener {
    rx: Mutex<Receiver<TermInput>>,
}

impl ChatTermPlugin {
    pub fn new(exit_on_eof: bool) -> Self {
        ChatTermPlugin { exit_on_eof }
    }
}

impl Plugin for ChatTermPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ChatTermConfig {
            exit_on_eof: self.exit_on_eof,
        })
        .init_resource::<TermChatListener>()
        .add_systems(First, sys_read_chat_lines.in_set(GameshowCoreSet::RawInputs))
        .add_systems(Last, sys_print_replies.in_set(GameshowCoreSet::Outbound));
    }
}

impl Default for TermChatListener {
    fn default() -> Self {
        let (tx, rx) = mpsc::channel();
        std::thread::spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(TermInput::Line(line)).is_err() {
                            // Other end is dead, close this thread
                            return;
                        }
                    },
                    Err(e) => {
                        log::error!("Error occurred reading stdin: {:?}", e);
                        break;
                    },
                }
            }
            let _ = tx.send(TermInput::Closed);
        });
        TermChatListener { rx: Mutex::new(rx) }
    }
}

/// Parses `author@channel: text`. The author name doubles as participant id.
pub fn parse_line(line: &str) -> Result<ChatMessage, LineError> {
    let (header, content) = line.split_once(':').ok_or(LineError::MissingSeparator)?;
    let (author, channel) = header.split_once('@').ok_or(LineError::MissingSeparator)?;
    let (author, channel) = (author.trim(), channel.trim().trim_start_matches('#'));
    if author.is_empty() || channel.is_empty() {
        return Err(LineError::EmptyName);
    }
    Ok(ChatMessage::new(
        Participant::new(author, author),
        ChannelId::from(channel),
        content.trim(),
    ))
}

fn sys_read_chat_lines(
    listener: Res<TermChatListener>,
    config: Res<ChatTermConfig>,
    mut evw_inbound: EventWriter<Inbound>,
    mut evw_exit: EventWriter<AppExit>,
) {
    let rx = match listener.try_lock() {
        Ok(rx) => rx,
        Err(e) => {
            log::error!("Error with mutex in chat listener system: {:?}", e);
            return;
        },
    };
    loop {
        match rx.try_recv() {
            Ok(TermInput::Line(line)) if line.trim() == QUIT_COMMAND => {
                log::info!("Quit requested from the console");
                evw_exit.send(AppExit::Success);
            },
            Ok(TermInput::Line(line)) if line.trim().is_empty() => {},
            Ok(TermInput::Line(line)) => match parse_line(&line) {
                Ok(message) => {
                    log::debug!("#{} <{}> {}", message.channel(), message.author().handle(), message.content());
                    evw_inbound.send(Inbound::Message(message));
                },
                Err(e) => log::warn!("Ignoring console line [{line}]: {e}"),
            },
            Ok(TermInput::Closed) | Err(TryRecvError::Disconnected) => {
                if config.exit_on_eof() {
                    evw_exit.send(AppExit::Success);
                }
                break;
            },
            Err(TryRecvError::Empty) => break,
        }
    }
}

fn sys_print_replies(mut evr_reply: EventReader<ChatReply>) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for reply in evr_reply.read() {
        let header = style(format!("#{}", reply.channel())).cyan().bold();
        if let Err(e) = writeln!(out, "{header} {}", reply.content()) {
            log::error!("Could not print reply: {e}");
        }
    }
}
