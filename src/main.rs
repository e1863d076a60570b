mod configuration;

use std::fs::File;
use std::path::PathBuf;
use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::prelude::{App, MinimalPlugins, PluginGroup};
use chat_term::ChatTermPlugin;
use clap::Parser;
use game_core::GameshowCorePlugin;
use simplelog::{ColorChoice, LevelFilter, TermLogger, TerminalMode, WriteLogger};
use wheel_game::WheelOfDiscordPlugin;

use self::configuration::GameshowConfig;

const DEBUG_LOG_FILE: &str = "gameshow.debug.log";

/// Hosts chat party games. Type `author@channel: text` lines to chat.
#[derive(Debug, Parser)]
#[command(name = "gameshow", version, about)]
struct Args {
    /// Configuration file, instead of the one in the user config directory
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write debug logs to gameshow.debug.log
    #[arg(long)]
    debug: bool,
    /// Stop once stdin is closed
    #[arg(long)]
    exit_on_eof: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    setup_logging(args.debug)?;
    let (bot, wheel) = GameshowConfig::load(args.config.as_deref())?.into_parts();
    let tick = Duration::from_millis(bot.tick_millis());

    App::new()
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(tick)))
        .insert_resource(bot)
        .add_plugins((
            GameshowCorePlugin,
            WheelOfDiscordPlugin::new(wheel),
            ChatTermPlugin::new(args.exit_on_eof),
        ))
        .run();
    Ok(())
}

fn setup_logging(debug: bool) -> anyhow::Result<()> {
    let config = simplelog::ConfigBuilder::new()
        .set_target_level(LevelFilter::Error)
        .add_filter_ignore_str("bevy")
        .build();
    if debug {
        WriteLogger::init(LevelFilter::Debug, config, File::create(DEBUG_LOG_FILE)?)?;
    } else {
        TermLogger::init(LevelFilter::Info, config, TerminalMode::Stderr, ColorChoice::Auto)?;
    }
    Ok(())
}
