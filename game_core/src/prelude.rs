pub use bevy::prelude::{
    App, Deref, Event, EventReader, EventWriter, First, IntoSystemConfigs, IntoSystemSetConfigs,
    Last, Plugin, PreUpdate, Res, ResMut, Resource, SystemSet, Update,
};
pub use bevy::utils::HashMap;

pub use crate::chat::{ChannelId, ChatMessage, ChatReply, Inbound, Participant, ParticipantId};
pub use crate::configuration::BotConfiguration;
pub use crate::error::{CommandError, CommandErrorUtils, CommandResult};
pub use crate::module::{CommandHelp, GameModule, GameModuleAppExt, ModuleContext, ModuleRegistry};
pub use crate::router::SessionRouter;
pub use crate::turn_timer::{TimerFired, TurnTimers};
