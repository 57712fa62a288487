use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Cancellation token for a scheduled repeating timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerToken(pub u64);

/// Injected timer/clock capability for the caret's blink machinery.
///
/// Timers are cooperative: the scheduler never calls back on its own, it
/// only tracks due times. The owning event loop polls its scheduler and
/// routes a due blink token to [`Caret::on_blink_tick`](crate::Caret::on_blink_tick).
///
/// `cancel` must be idempotent; cancelling a token that no longer exists is
/// a no-op.
pub trait Scheduler {
    /// Schedules a repeating timer with the given period, first due one
    /// period from now.
    fn schedule_repeating(&mut self, period: Duration) -> TimerToken;

    fn cancel(&mut self, token: TimerToken);

    /// Monotonic clock, also used for multi-click interval measurement.
    fn now(&self) -> Duration;
}

struct Timer {
    period: Duration,
    due: Duration,
}

/// A cooperative scheduler for hosts driving a frame loop.
///
/// Call [`poll`](Self::poll) once per frame; it returns every token whose
/// timer came due and advances their due times by one period.
pub struct FrameScheduler {
    epoch: Instant,
    next_token: u64,
    timers: HashMap<TimerToken, Timer, fxhash::FxBuildHasher>,
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            next_token: 0,
            timers: HashMap::default(),
        }
    }

    /// Returns the tokens of all timers due at the current time, oldest
    /// due first.
    pub fn poll(&mut self) -> Vec<TimerToken> {
        let now = self.now();
        let mut due: Vec<(Duration, TimerToken)> = self
            .timers
            .iter_mut()
            .filter(|(_, timer)| timer.due <= now)
            .map(|(token, timer)| {
                let was_due = timer.due;
                timer.due += timer.period;
                (was_due, *token)
            })
            .collect();
        due.sort_by_key(|(was_due, _)| *was_due);
        due.into_iter().map(|(_, token)| token).collect()
    }
}

impl Scheduler for FrameScheduler {
    fn schedule_repeating(&mut self, period: Duration) -> TimerToken {
        let token = TimerToken(self.next_token);
        self.next_token += 1;
        let due = self.now() + period;
        self.timers.insert(token, Timer { period, due });
        token
    }

    fn cancel(&mut self, token: TimerToken) {
        if self.timers.remove(&token).is_none() {
            log::warn!("cancel called for unknown timer {:?}", token);
        }
    }

    fn now(&self) -> Duration {
        self.epoch.elapsed()
    }
}
