use std::time::Duration;

use bevy::prelude::{Reflect, Timer, TimerMode};

/// A re-armable, cancellable one-shot delay driven by the caller's frame clock.
///
/// At most one instance is pending; arming again replaces it.
#[derive(Reflect, Clone, Debug, Default)]
pub struct OneShot {
    timer: Option<Timer>,
}

impl OneShot {
    /// Start (or restart) the delay, dropping whatever was pending.
    pub fn arm(&mut self, seconds: f32) {
        self.timer = Some(Timer::from_seconds(seconds.max(0.0), TimerMode::Once));
    }

    pub fn cancel(&mut self) {
        self.timer = None;
    }

    pub fn is_pending(&self) -> bool {
        self.timer.is_some()
    }

    /// Seconds left before firing, if pending.
    pub fn remaining_secs(&self) -> Option<f32> {
        self.timer.as_ref().map(Timer::remaining_secs)
    }

    /// Advance by `delta`. Returns true on the tick the delay elapses, exactly once.
    pub fn tick(&mut self, delta: Duration) -> bool {
        let Some(timer) = self.timer.as_mut() else {
            return false;
        };

        timer.tick(delta);
        if timer.is_finished() {
            self.timer = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: f32) -> Duration {
        Duration::from_secs_f32(s)
    }

    #[test]
    fn test_unarmed_never_fires() {
        let mut shot = OneShot::default();
        assert!(!shot.is_pending());
        assert!(!shot.tick(secs(10.0)));
    }

    #[test]
    fn test_fires_once_after_delay() {
        let mut shot = OneShot::default();
        shot.arm(0.4);

        assert!(!shot.tick(secs(0.2)));
        assert!(shot.is_pending());
        assert!(shot.tick(secs(0.25)));
        assert!(!shot.is_pending());
        assert!(!shot.tick(secs(1.0)), "one-shot must not fire twice");
    }

    #[test]
    fn test_rearm_replaces_pending_instance() {
        let mut shot = OneShot::default();
        shot.arm(0.1);
        assert!(!shot.tick(secs(0.08)));

        shot.arm(0.1);
        assert!(!shot.tick(secs(0.08)), "re-arming restarts the delay");
        assert!(shot.tick(secs(0.03)));
    }

    #[test]
    fn test_cancel_prevents_firing() {
        let mut shot = OneShot::default();
        shot.arm(0.1);
        shot.cancel();
        assert!(!shot.tick(secs(1.0)));
        assert_eq!(shot.remaining_secs(), None);
    }
}
