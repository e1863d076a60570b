//! Game modules and the context handed to them.
//!
//! A module is a game implementation the bot can host. Modules are registered
//! once while the app is built; the dispatcher then calls into them with a
//! [`ModuleContext`], which is the only way a module touches anything outside
//! its own state: sending replies, claiming a channel through the
//! [`SessionRouter`] and arming its per-channel timer.

use std::time::Duration;

use crate::prelude::*;
use crate::router::RouterError;

#[derive(Clone, Debug, Eq, PartialEq, getset::Getters)]
pub struct CommandHelp {
    #[getset(get = "pub")]
    usage: String,
    #[getset(get = "pub")]
    description: String,
}

pub trait GameModule: Send + Sync + 'static {
    /// Unique name, also used as the owner recorded by the session router
    fn name(&self) -> &'static str;

    fn describe_commands(&self) -> Vec<CommandHelp>;

    fn handle_message(&mut self, message: &ChatMessage, ctx: &mut ModuleContext) -> CommandResult;

    /// Called for timers this module armed, unless they were re-armed or
    /// cancelled since they expired.
    fn handle_timer(&mut self, fired: &TimerFired, ctx: &mut ModuleContext) -> CommandResult;
}

#[derive(Default, Resource)]
pub struct ModuleRegistry {
    modules: Vec<Box<dyn GameModule>>,
}

pub struct ModuleContext<'a> {
    module: &'static str,
    router: &'a mut SessionRouter,
    timers: &'a mut TurnTimers,
    replies: Vec<ChatReply>,
}

pub trait GameModuleAppExt {
    fn register_game_module<M: GameModule>(&mut self, module: M) -> &mut Self;
}

impl CommandHelp {
    pub fn new<U: Into<String>, D: Into<String>>(usage: U, description: D) -> Self {
        CommandHelp {
            usage: usage.into(),
            description: description.into(),
        }
    }
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl ModuleRegistry {
    pub fn register<M: GameModule>(&mut self, module: M) {
        let name = module.name();
        if self.get(name).is_some() {
            log::warn!("Game module [{name}] is already registered, ignoring duplicate");
            return;
        }
        self.modules.push(Box::new(module));
        log::info!("LOADED: {name}");
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.modules.iter().map(|module| module.name())
    }

    pub fn get(&self, name: &str) -> Option<&dyn GameModule> {
        self.modules
            .iter()
            .find(|module| module.name() == name)
            .map(|module| module.as_ref())
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut (dyn GameModule + 'static)> {
        self.modules
            .iter_mut()
            .find(|module| module.name() == name)
            .map(|module| module.as_mut())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn GameModule>> {
        self.modules.iter_mut()
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn GameModule> {
        self.modules.iter().map(|module| module.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl GameModuleAppExt for App {
    fn register_game_module<M: GameModule>(&mut self, module: M) -> &mut Self {
        self.world_mut()
            .get_resource_or_insert_with(ModuleRegistry::default)
            .register(module);
        self
    }
}

impl std::fmt::Debug for ModuleContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleContext")
            .field("module", &self.module)
            .field("replies", &self.replies)
            .finish_non_exhaustive()
    }
}

impl<'a> ModuleContext<'a> {
    pub fn new(
        module: &'static str,
        router: &'a mut SessionRouter,
        timers: &'a mut TurnTimers,
    ) -> Self {
        ModuleContext {
            module,
            router,
            timers,
            replies: Vec::new(),
        }
    }

    pub fn send<S: Into<String>>(&mut self, channel: &ChannelId, content: S) {
        self.replies.push(ChatReply::new(channel.clone(), content));
    }

    /// Claims the channel so only this module sees its messages
    pub fn start_session(&mut self, channel: &ChannelId) -> Result<(), RouterError> {
        self.router.start_session(channel, self.module)
    }

    pub fn stop_session(&mut self, channel: &ChannelId) {
        if self.router.owner(channel) == Some(self.module) {
            self.router.stop_session(channel);
        }
    }

    pub fn arm_timer(&mut self, channel: &ChannelId, tag: &'static str, duration: Duration) -> u64 {
        self.timers.arm(self.module, channel, tag, duration)
    }

    pub fn cancel_timer(&mut self, channel: &ChannelId) {
        self.timers.cancel(self.module, channel)
    }

    pub fn into_replies(self) -> Vec<ChatReply> {
        self.replies
    }
}
