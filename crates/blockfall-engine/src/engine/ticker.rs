use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{config::SessionConfig, input::InputKey};

/// One entry of the per-frame event queue consumed by
/// [`GameSession::process_frame`](super::GameSession::process_frame).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum SessionEvent {
    KeyDown(InputKey),
    KeyUp(InputKey),
    GravityTick,
    RepeatTick,
}

/// Turns elapsed time into gravity and repeat ticks.
///
/// The scheduler is driven by the caller's clock: it never sleeps and never reads
/// the wall clock. Repeat ticks are only produced while the caller reports a held
/// direction, and the repeat timer restarts from zero whenever it is disarmed.
///
/// ```
/// use std::time::Duration;
///
/// use blockfall_engine::{SessionConfig, SessionEvent, TickScheduler};
///
/// let mut scheduler = TickScheduler::new(&SessionConfig::default());
/// let mut events = Vec::new();
/// scheduler.advance(Duration::from_millis(2500), false, &mut events);
/// assert_eq!(events, [SessionEvent::GravityTick, SessionEvent::GravityTick]);
/// ```
#[derive(Debug, Clone)]
pub struct TickScheduler {
    gravity_interval: Duration,
    repeat_interval: Duration,
    gravity_elapsed: Duration,
    repeat_elapsed: Duration,
}

impl TickScheduler {
    #[must_use]
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            gravity_interval: config.gravity_interval,
            repeat_interval: config.repeat_interval,
            gravity_elapsed: Duration::ZERO,
            repeat_elapsed: Duration::ZERO,
        }
    }

    /// Restarts both timers.
    pub fn reset(&mut self) {
        self.gravity_elapsed = Duration::ZERO;
        self.repeat_elapsed = Duration::ZERO;
    }

    /// Advances the clock by `elapsed` and appends the ticks that fell due, in
    /// chronological order. A gravity tick due at the same instant as a repeat
    /// tick comes first.
    ///
    /// # Panics
    ///
    /// Panics if an interval is zero; [`SessionConfig::validate`] rejects those.
    pub fn advance(
        &mut self,
        elapsed: Duration,
        repeat_armed: bool,
        events: &mut Vec<SessionEvent>,
    ) {
        assert!(!self.gravity_interval.is_zero() && !self.repeat_interval.is_zero());
        if !repeat_armed {
            self.repeat_elapsed = Duration::ZERO;
        }

        let mut remaining = elapsed;
        loop {
            let until_gravity = self.gravity_interval - self.gravity_elapsed;
            let until_repeat = repeat_armed.then(|| self.repeat_interval - self.repeat_elapsed);
            let (step, event) = match until_repeat {
                Some(until_repeat) if until_repeat < until_gravity => {
                    (until_repeat, SessionEvent::RepeatTick)
                }
                _ => (until_gravity, SessionEvent::GravityTick),
            };
            if step > remaining {
                break;
            }
            remaining -= step;
            self.gravity_elapsed += step;
            if repeat_armed {
                self.repeat_elapsed += step;
            }
            match event {
                SessionEvent::GravityTick => self.gravity_elapsed = Duration::ZERO,
                _ => self.repeat_elapsed = Duration::ZERO,
            }
            events.push(event);
        }

        self.gravity_elapsed += remaining;
        if repeat_armed {
            self.repeat_elapsed += remaining;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler(gravity_ms: u64, repeat_ms: u64) -> TickScheduler {
        TickScheduler::new(&SessionConfig {
            gravity_interval: Duration::from_millis(gravity_ms),
            repeat_interval: Duration::from_millis(repeat_ms),
            seed: None,
        })
    }

    fn advance(scheduler: &mut TickScheduler, ms: u64, armed: bool) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        scheduler.advance(Duration::from_millis(ms), armed, &mut events);
        events
    }

    #[test]
    fn test_gravity_accumulates_across_frames() {
        let mut s = scheduler(1000, 100);
        assert!(advance(&mut s, 600, false).is_empty());
        assert_eq!(advance(&mut s, 600, false), [SessionEvent::GravityTick]);
        assert!(advance(&mut s, 700, false).is_empty());
        assert_eq!(advance(&mut s, 100, false), [SessionEvent::GravityTick]);
    }

    #[test]
    fn test_repeat_only_while_armed() {
        let mut s = scheduler(1000, 100);
        assert!(advance(&mut s, 250, false).is_empty());
        let events = advance(&mut s, 250, true);
        assert_eq!(events, [SessionEvent::RepeatTick, SessionEvent::RepeatTick]);
    }

    #[test]
    fn test_disarm_restarts_repeat_timer() {
        let mut s = scheduler(1000, 100);
        assert!(advance(&mut s, 90, true).is_empty());
        assert!(advance(&mut s, 0, false).is_empty());
        assert!(advance(&mut s, 90, true).is_empty());
        assert_eq!(advance(&mut s, 10, true), [SessionEvent::RepeatTick]);
    }

    #[test]
    fn test_ticks_are_chronological() {
        let mut s = scheduler(250, 100);
        let events = advance(&mut s, 500, true);
        assert_eq!(
            events,
            [
                SessionEvent::RepeatTick,  // 100
                SessionEvent::RepeatTick,  // 200
                SessionEvent::GravityTick, // 250
                SessionEvent::RepeatTick,  // 300
                SessionEvent::RepeatTick,  // 400
                SessionEvent::GravityTick, // 500
                SessionEvent::RepeatTick,  // 500
            ]
        );
    }

    #[test]
    fn test_reset() {
        let mut s = scheduler(1000, 100);
        advance(&mut s, 999, false);
        s.reset();
        assert!(advance(&mut s, 999, false).is_empty());
    }
}
