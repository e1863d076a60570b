use std::fmt::Write;

use thiserror::Error;

use crate::prelude::*;

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum RouterError {
    #[error("channel [{channel}] already has a session of [{owner}]")]
    ChannelBusy {
        channel: ChannelId,
        owner: &'static str,
    },
}

/// Which module, if any, owns the live session of each channel.
#[derive(Debug, Default, Resource)]
pub struct SessionRouter {
    sessions: HashMap<ChannelId, &'static str>,
}

impl SessionRouter {
    pub fn start_session(
        &mut self,
        channel: &ChannelId,
        module: &'static str,
    ) -> Result<(), RouterError> {
        match self.sessions.get(channel) {
            Some(owner) if *owner != module => Err(RouterError::ChannelBusy {
                channel: channel.clone(),
                owner,
            }),
            _ => {
                log::info!("Session started in #{channel} by {module}");
                self.sessions.insert(channel.clone(), module);
                Ok(())
            },
        }
    }

    pub fn stop_session(&mut self, channel: &ChannelId) {
        if let Some(module) = self.sessions.remove(channel) {
            log::info!("Session of {module} ended in #{channel}");
        }
    }

    pub fn owner(&self, channel: &ChannelId) -> Option<&'static str> {
        self.sessions.get(channel).copied()
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }
}

/// Consumes every inbound event in arrival order. This is the only system that
/// mutates game state, which keeps messages and timer expirations serialized.
pub(crate) fn sys_dispatch_inbound(
    config: Res<BotConfiguration>,
    mut evr_inbound: EventReader<Inbound>,
    mut modules: ResMut<ModuleRegistry>,
    mut router: ResMut<SessionRouter>,
    mut timers: ResMut<TurnTimers>,
    mut evw_reply: EventWriter<ChatReply>,
) {
    for inbound in evr_inbound.read() {
        let replies = match inbound {
            Inbound::Message(message) => {
                dispatch_message(&config, message, &mut modules, &mut router, &mut timers)
            },
            Inbound::Timer(fired) => dispatch_timer(fired, &mut modules, &mut router, &mut timers),
        };
        evw_reply.send_batch(replies);
    }
}

fn dispatch_message(
    config: &BotConfiguration,
    message: &ChatMessage,
    modules: &mut ModuleRegistry,
    router: &mut SessionRouter,
    timers: &mut TurnTimers,
) -> Vec<ChatReply> {
    let content = message.content().as_str();
    if content == config.games_command() {
        let names: Vec<_> = modules.names().collect();
        return vec![ChatReply::new(
            message.channel().clone(),
            format!(
                "{} I have these games installed:\n{}.",
                message.author().mention(),
                names.join(", ")
            ),
        )];
    }
    if content == config.help_command() {
        return vec![ChatReply::new(
            message.channel().clone(),
            help_text(modules),
        )];
    }

    let mut replies = Vec::new();
    match router.owner(message.channel()) {
        Some(owner) => match modules.get_mut(owner) {
            Some(module) => {
                replies.extend(run_handler(module, router, timers, message.channel(), |m, ctx| {
                    m.handle_message(message, ctx)
                }))
            },
            None => {
                log::warn!("Channel #{} is owned by unknown module [{owner}], releasing it", message.channel());
                router.stop_session(message.channel());
            },
        },
        None => {
            for module in modules.iter_mut() {
                replies.extend(run_handler(
                    module.as_mut(),
                    router,
                    timers,
                    message.channel(),
                    |m, ctx| m.handle_message(message, ctx),
                ));
            }
        },
    }
    replies
}

fn dispatch_timer(
    fired: &TimerFired,
    modules: &mut ModuleRegistry,
    router: &mut SessionRouter,
    timers: &mut TurnTimers,
) -> Vec<ChatReply> {
    if !timers.is_current(fired) {
        log::debug!("Ignoring stale [{}] timer for {}#{}", fired.tag(), fired.module(), fired.channel());
        return Vec::new();
    }
    let replies = match modules.get_mut(fired.module()) {
        Some(module) => run_handler(module, router, timers, fired.channel(), |m, ctx| {
            m.handle_timer(fired, ctx)
        }),
        None => {
            log::warn!("Timer fired for unknown module [{}]", fired.module());
            Vec::new()
        },
    };
    timers.settle(fired);
    replies
}

/// Runs one handler call, turning whatever error it returns into a reply so
/// that a failure never leaks past a single dispatch.
fn run_handler<F>(
    module: &mut dyn GameModule,
    router: &mut SessionRouter,
    timers: &mut TurnTimers,
    channel: &ChannelId,
    handler: F,
) -> Vec<ChatReply>
where
    F: FnOnce(&mut dyn GameModule, &mut ModuleContext) -> CommandResult,
{
    let name = module.name();
    let mut ctx = ModuleContext::new(name, router, timers);
    match handler(module, &mut ctx) {
        Ok(()) => {},
        Err(CommandError::Rejected(reason)) => {
            log::debug!("{name} rejected action in #{channel}: {reason}");
            ctx.send(channel, reason);
        },
        Err(err @ CommandError::Exhausted(_)) => {
            log::warn!("{name} in #{channel}: {err}");
            ctx.send(channel, err.to_string());
        },
        Err(err @ CommandError::Critical(_)) => {
            log::error!("{name} failed in #{channel}: {err:?}");
            ctx.send(channel, "Something went wrong with the game, sorry!");
        },
    }
    ctx.into_replies()
}

fn help_text(modules: &ModuleRegistry) -> String {
    let mut help = String::from("Here is what I can do:");
    for module in modules.iter() {
        let _ = write!(help, "\n**{}**", module.name());
        for command in module.describe_commands() {
            let _ = write!(help, "\n  `{}` {}", command.usage(), command.description());
        }
    }
    help
}
