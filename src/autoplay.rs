//! Cancellable periodic auto-advance.
//!
//! The scheduler runs on a virtual clock: the owner feeds elapsed time via
//! [`Autoplay::advance`] and calls [`Navigator::next`](crate::navigator::Navigator::next)
//! once per returned tick (modulo whole laps), so automatic advances take the
//! same bounds-checked path as manual navigation. There is at most one interval at a time;
//! starting always cancels the previous one first.

use crate::config::SliderOptions;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Interval {
    period: Duration,
    elapsed: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Autoplay {
    enabled: bool,
    delay: Duration,
    interval: Option<Interval>,
}

impl Autoplay {
    pub fn new(enabled: bool, delay: Duration) -> Self {
        Self {
            enabled,
            delay,
            interval: None,
        }
    }

    pub fn from_options(options: &SliderOptions) -> Self {
        Self::new(options.auto_play, Duration::from_millis(options.auto_play_delay))
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule a fresh interval for `item_count` positions.
    ///
    /// Cancels any running interval first. Nothing is scheduled when autoplay
    /// is disabled or there is at most one position. Returns whether an
    /// interval is now running.
    pub fn start(&mut self, item_count: usize) -> bool {
        self.interval = None;
        if !self.enabled || item_count <= 1 || self.delay.is_zero() {
            return false;
        }
        self.interval = Some(Interval {
            period: self.delay,
            elapsed: Duration::ZERO,
        });
        log::debug!("autoplay started ({} ms)", self.delay.as_millis());
        true
    }

    /// Cancel the interval. Idempotent.
    pub fn pause(&mut self) {
        if self.interval.take().is_some() {
            log::debug!("autoplay paused");
        }
    }

    /// Pause if running, otherwise start.
    pub fn toggle(&mut self, item_count: usize) -> bool {
        if self.is_running() {
            self.pause();
            false
        } else {
            self.start(item_count)
        }
    }

    pub fn is_running(&self) -> bool {
        self.interval.is_some()
    }

    /// Let `elapsed` pass and return how many ticks fell due.
    ///
    /// Leftover time carries over, so feeding 1500 ms twice with a 1000 ms
    /// period yields one tick and then two. Elapsed time saturates and the
    /// tick count caps at `u32::MAX`.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        let Some(interval) = self.interval.as_mut() else {
            return 0;
        };
        interval.elapsed = interval.elapsed.saturating_add(elapsed);
        let period = interval.period.as_nanos();
        let due = interval.elapsed.as_nanos() / period;
        let remainder = interval.elapsed.as_nanos() % period;
        interval.elapsed = Duration::from_nanos(u64::try_from(remainder).unwrap_or(u64::MAX));
        u32::try_from(due).unwrap_or(u32::MAX)
    }

    /// Time until the next tick, `None` when not running.
    pub fn time_until_next(&self) -> Option<Duration> {
        self.interval.map(|i| i.period.saturating_sub(i.elapsed))
    }
}
