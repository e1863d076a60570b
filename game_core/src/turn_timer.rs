use std::time::Duration;

use bevy::prelude::{Time, Timer, TimerMode};

use crate::prelude::*;

/// Each module gets at most one pending timer per channel.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
struct TimerSlot {
    module: &'static str,
    channel: ChannelId,
}

#[derive(Debug)]
struct ArmedTimer {
    timer: Timer,
    tag: &'static str,
    generation: u64,
}

/// An expired timer, fed back to the dispatcher as an [`Inbound::Timer`].
#[derive(Clone, Debug, Eq, PartialEq, getset::CopyGetters, getset::Getters)]
pub struct TimerFired {
    #[getset(get_copy = "pub")]
    module: &'static str,
    #[getset(get = "pub")]
    channel: ChannelId,
    /// Module-defined purpose of the timer, such as a lobby countdown
    #[getset(get_copy = "pub")]
    tag: &'static str,
    #[getset(get_copy = "pub")]
    generation: u64,
}

#[derive(Debug, Default, Resource)]
pub struct TurnTimers {
    next_generation: u64,
    armed: HashMap<TimerSlot, ArmedTimer>,
    /// Generation of the last arm of every slot still in use. Expirations
    /// that do not match are stale.
    latest: HashMap<TimerSlot, u64>,
}

impl TurnTimers {
    /// Schedules a timer, replacing whatever was pending for this slot
    pub fn arm(
        &mut self,
        module: &'static str,
        channel: &ChannelId,
        tag: &'static str,
        duration: Duration,
    ) -> u64 {
        let generation = self.bump();
        let slot = TimerSlot {
            module,
            channel: channel.clone(),
        };
        log::debug!("Arming [{tag}] timer for {module}#{channel} ({duration:?}), generation {generation}");
        self.latest.insert(slot.clone(), generation);
        self.armed.insert(
            slot,
            ArmedTimer {
                timer: Timer::new(duration, TimerMode::Once),
                tag,
                generation,
            },
        );
        generation
    }

    pub fn cancel(&mut self, module: &'static str, channel: &ChannelId) {
        let slot = TimerSlot {
            module,
            channel: channel.clone(),
        };
        if self.armed.remove(&slot).is_some() {
            log::debug!("Cancelled timer for {module}#{channel}");
        }
        self.latest.remove(&slot);
    }

    /// Forgets a slot once its expiration was handled, unless the handler armed it again
    pub fn settle(&mut self, fired: &TimerFired) {
        let slot = TimerSlot {
            module: fired.module,
            channel: fired.channel.clone(),
        };
        if self.latest.get(&slot) == Some(&fired.generation) {
            self.latest.remove(&slot);
        }
    }

    pub fn is_pending(&self, module: &'static str, channel: &ChannelId) -> bool {
        self.armed.contains_key(&TimerSlot {
            module,
            channel: channel.clone(),
        })
    }

    pub fn remaining(&self, module: &'static str, channel: &ChannelId) -> Option<Duration> {
        self.armed
            .get(&TimerSlot {
                module,
                channel: channel.clone(),
            })
            .map(|armed| armed.timer.remaining())
    }

    /// True if nothing armed or cancelled this slot since the timer fired
    pub fn is_current(&self, fired: &TimerFired) -> bool {
        let slot = TimerSlot {
            module: fired.module,
            channel: fired.channel.clone(),
        };
        self.latest.get(&slot) == Some(&fired.generation)
    }

    /// Advances every pending timer, removing and returning the ones that finished
    pub fn tick(&mut self, delta: Duration) -> Vec<TimerFired> {
        let mut fired = Vec::new();
        self.armed.retain(|slot, armed| {
            armed.timer.tick(delta);
            if armed.timer.finished() {
                fired.push(TimerFired {
                    module: slot.module,
                    channel: slot.channel.clone(),
                    tag: armed.tag,
                    generation: armed.generation,
                });
                false
            } else {
                true
            }
        });
        fired.sort_by_key(|timer| timer.generation);
        fired
    }

    fn bump(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }
}

pub(crate) fn sys_tick_turn_timers(
    time: Res<Time>,
    mut timers: ResMut<TurnTimers>,
    mut evw_inbound: EventWriter<Inbound>,
) {
    for fired in timers.tick(time.delta()) {
        log::trace!("Timer [{}] fired for {}#{}", fired.tag, fired.module, fired.channel);
        evw_inbound.send(Inbound::Timer(fired));
    }
}

#[cfg(test)]
mod test {
    use test_log::test;

    use super::*;

    const MODULE: &str = "test-module";

    fn channel() -> ChannelId {
        ChannelId::from("general")
    }

    #[test]
    fn timer_fires_once_after_its_duration() {
        let mut timers = TurnTimers::default();
        let generation = timers.arm(MODULE, &channel(), "turn", Duration::from_secs(3));
        assert!(timers.tick(Duration::from_secs(2)).is_empty());
        assert_eq!(timers.remaining(MODULE, &channel()), Some(Duration::from_secs(1)));

        let fired = timers.tick(Duration::from_secs(1));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].tag(), "turn");
        assert_eq!(fired[0].generation(), generation);
        assert!(timers.is_current(&fired[0]));
        assert!(!timers.is_pending(MODULE, &channel()));
        assert!(timers.tick(Duration::from_secs(10)).is_empty());
    }

    #[test]
    fn rearming_replaces_the_pending_timer() {
        let mut timers = TurnTimers::default();
        timers.arm(MODULE, &channel(), "turn", Duration::from_secs(3));
        timers.tick(Duration::from_secs(2));
        timers.arm(MODULE, &channel(), "turn", Duration::from_secs(3));
        assert!(timers.tick(Duration::from_secs(2)).is_empty());
        assert_eq!(timers.tick(Duration::from_secs(1)).len(), 1);
    }

    #[test]
    fn expiration_is_stale_after_rearm_or_cancel() {
        let mut timers = TurnTimers::default();
        timers.arm(MODULE, &channel(), "turn", Duration::from_secs(1));
        let fired = timers.tick(Duration::from_secs(1)).remove(0);
        assert!(timers.is_current(&fired));

        timers.arm(MODULE, &channel(), "turn", Duration::from_secs(1));
        assert!(!timers.is_current(&fired));

        let fired = timers.tick(Duration::from_secs(1)).remove(0);
        timers.cancel(MODULE, &channel());
        assert!(!timers.is_current(&fired));
    }

    #[test]
    fn finished_slots_are_forgotten() {
        let mut timers = TurnTimers::default();
        let other = ChannelId::from("other");
        timers.arm(MODULE, &channel(), "turn", Duration::from_secs(1));
        timers.arm(MODULE, &other, "turn", Duration::from_secs(1));
        timers.cancel(MODULE, &channel());
        assert_eq!(timers.latest.len(), 1);

        let fired = timers.tick(Duration::from_secs(1)).remove(0);
        timers.arm(MODULE, &other, "turn", Duration::from_secs(1));
        timers.settle(&fired);
        assert_eq!(timers.latest.len(), 1);

        let fired = timers.tick(Duration::from_secs(1)).remove(0);
        assert!(timers.is_current(&fired));
        timers.settle(&fired);
        assert!(timers.latest.is_empty());
        assert!(!timers.is_current(&fired));
    }

    #[test]
    fn slots_are_independent_per_channel_and_module() {
        let mut timers = TurnTimers::default();
        let other = ChannelId::from("other");
        timers.arm(MODULE, &channel(), "turn", Duration::from_secs(1));
        timers.arm(MODULE, &other, "turn", Duration::from_secs(2));
        timers.arm("another-module", &channel(), "lobby", Duration::from_secs(1));
        timers.cancel(MODULE, &channel());

        let fired = timers.tick(Duration::from_secs(1));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].module(), "another-module");
        assert!(timers.is_pending(MODULE, &other));
    }
}
