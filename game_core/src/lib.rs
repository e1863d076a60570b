pub mod catalog;
pub mod chat;
pub mod configuration;
pub mod error;
pub mod module;
pub mod prelude;
pub mod router;
pub mod turn_timer;

use self::prelude::*;

#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub enum GameshowCoreSet {
    /// Transports turn raw platform input into `Inbound` events
    RawInputs,
    /// Timers and other internal sources add their `Inbound` events
    ProcessInputs,
    /// The single dispatcher consumes every `Inbound` event in order
    ProcessCommands,
    /// Transports deliver `ChatReply` events
    Outbound,
}

#[derive(Debug, Default)]
pub struct GameshowCorePlugin;

impl Plugin for GameshowCorePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<Inbound>()
            .add_event::<ChatReply>()
            .init_resource::<BotConfiguration>()
            .init_resource::<ModuleRegistry>()
            .init_resource::<SessionRouter>()
            .init_resource::<TurnTimers>()
            .configure_sets(First, GameshowCoreSet::RawInputs)
            .configure_sets(PreUpdate, GameshowCoreSet::ProcessInputs)
            .configure_sets(Update, GameshowCoreSet::ProcessCommands)
            .configure_sets(Last, GameshowCoreSet::Outbound)
            .add_systems(
                PreUpdate,
                turn_timer::sys_tick_turn_timers.in_set(GameshowCoreSet::ProcessInputs),
            )
            .add_systems(
                Update,
                router::sys_dispatch_inbound.in_set(GameshowCoreSet::ProcessCommands),
            );
    }
}
