//! Pausable game clock with a delayed/repeating event queue.
//!
//! Events are plain values delivered back to the caller when they come due,
//! so whoever owns the clock decides how to dispatch them.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ClockError {
    #[error("scheduled delay must be positive, got {0:?} seconds")]
    NonPositiveDelay(f64),
    #[error("scheduled delay of {0:?} seconds is out of range")]
    DelayOutOfRange(f64),
}

/// Identity of a queued event, returned by [`Clock::schedule`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EventId(u64);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScheduleOptions {
    /// Drop any queued event equal to the new one before scheduling it.
    pub unique: bool,
    /// Re-enqueue the event every `delay` after it fires.
    pub repeating: bool,
}

impl ScheduleOptions {
    pub fn unique() -> Self {
        Self {
            unique: true,
            repeating: false,
        }
    }

    pub fn repeating() -> Self {
        Self {
            unique: false,
            repeating: true,
        }
    }
}

/// What [`Clock::reset`] does with events that are still pending.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetAction {
    ClearEvents,
    /// Move every pending timestamp back by the elapsed time, keeping the remaining delay.
    ShiftEvents,
    KeepEvents,
}

#[derive(Debug)]
struct Scheduled<E> {
    id: EventId,
    fire_at: Duration,
    interval: Option<Duration>,
    event: E,
}

impl<E> PartialEq for Scheduled<E> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl<E> Eq for Scheduled<E> {}

impl<E> PartialOrd for Scheduled<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for Scheduled<E> {
    // BinaryHeap is a max-heap; reverse so the earliest timestamp pops first.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .fire_at
            .cmp(&self.fire_at)
            .then_with(|| other.id.0.cmp(&self.id.0))
    }
}

/// Tracks logical elapsed time and delivers scheduled events when they come due.
pub struct Clock<E> {
    elapsed: Duration,
    paused: bool,
    last_tick: Instant,
    queue: BinaryHeap<Scheduled<E>>,
    next_id: u64,
}

impl<E: PartialEq> Clock<E> {
    pub fn new() -> Self {
        Self {
            elapsed: Duration::ZERO,
            paused: false,
            last_tick: Instant::now(),
            queue: BinaryHeap::new(),
            next_id: 0,
        }
    }

    /// Logical time since creation or the last reset.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// While paused, advancing drops the time delta so logical time stands still.
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Number of queued events.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_scheduled(&self, event: &E) -> bool {
        self.queue.iter().any(|s| s.event == *event)
    }

    /// Advances by the wall-clock time since the previous tick and returns due events.
    pub fn tick(&mut self) -> Vec<E>
    where
        E: Clone,
    {
        let now = Instant::now();
        let delta = now - self.last_tick;
        self.last_tick = now;
        self.advance(delta)
    }

    /// Advances logical time by `delta` (ignored while paused) and returns every
    /// event that is now due, earliest first.
    pub fn advance(&mut self, delta: Duration) -> Vec<E>
    where
        E: Clone,
    {
        if !self.paused {
            self.elapsed = self.elapsed.saturating_add(delta);
        }

        let mut fired = Vec::new();
        while self
            .queue
            .peek()
            .is_some_and(|next| next.fire_at <= self.elapsed)
        {
            let Some(mut due) = self.queue.pop() else {
                break;
            };
            match due.interval {
                Some(interval) => {
                    fired.push(due.event.clone());
                    // Reschedule from the slot it was due in, not from now.
                    // An interval that overflows the timeline can never come due again.
                    if let Some(next) = due.fire_at.checked_add(interval) {
                        due.fire_at = next;
                        self.queue.push(due);
                    }
                }
                None => fired.push(due.event),
            }
        }
        fired
    }

    /// Queues `event` to be delivered after `delay` seconds.
    ///
    /// Zero and negative delays are rejected; callers should act immediately
    /// instead of scheduling.
    pub fn schedule(
        &mut self,
        event: E,
        delay: f64,
        options: ScheduleOptions,
    ) -> Result<EventId, ClockError> {
        if !(delay > 0.0) || !delay.is_finite() {
            return Err(ClockError::NonPositiveDelay(delay));
        }
        let interval =
            Duration::try_from_secs_f64(delay).map_err(|_| ClockError::DelayOutOfRange(delay))?;
        let fire_at = self
            .elapsed
            .checked_add(interval)
            .ok_or(ClockError::DelayOutOfRange(delay))?;
        if options.unique {
            self.unschedule(&event, None);
        }

        let id = EventId(self.next_id);
        self.next_id += 1;
        self.queue.push(Scheduled {
            id,
            fire_at,
            interval: options.repeating.then_some(interval),
            event,
        });
        Ok(id)
    }

    /// Removes queued events equal to `event`, earliest first, up to `max_removals`.
    /// Returns how many were removed.
    pub fn unschedule(&mut self, event: &E, max_removals: Option<usize>) -> usize {
        let limit = max_removals.unwrap_or(usize::MAX);
        let mut entries = std::mem::take(&mut self.queue).into_sorted_vec();
        // into_sorted_vec is ascending by Ord, which is latest-first here.
        entries.reverse();

        let mut removed = 0;
        entries.retain(|s| {
            if removed < limit && s.event == *event {
                removed += 1;
                false
            } else {
                true
            }
        });
        self.queue = entries.into();
        removed
    }

    /// Removes a single queued event by identity.
    pub fn cancel(&mut self, id: EventId) -> bool {
        let before = self.queue.len();
        self.queue.retain(|s| s.id != id);
        self.queue.len() != before
    }

    /// Zeroes the elapsed time and applies `action` to pending events.
    pub fn reset(&mut self, action: ResetAction) {
        let elapsed = std::mem::take(&mut self.elapsed);
        self.last_tick = Instant::now();
        match action {
            ResetAction::ClearEvents => self.queue.clear(),
            ResetAction::ShiftEvents => {
                let entries: Vec<_> = std::mem::take(&mut self.queue)
                    .into_iter()
                    .map(|mut s| {
                        s.fire_at = s.fire_at.saturating_sub(elapsed);
                        s
                    })
                    .collect();
                self.queue = entries.into();
            }
            ResetAction::KeepEvents => {}
        }
    }
}

impl<E: PartialEq> Default for Clock<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    enum Ev {
        A,
        B,
        Tagged(u32),
    }

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn one_shot_fires_exactly_once() {
        let mut clock = Clock::new();
        clock.schedule(Ev::A, 0.5, ScheduleOptions::default()).unwrap();

        let mut fired = 0;
        for _ in 0..100 {
            fired += clock.advance(ms(16)).len();
        }
        assert_eq!(fired, 1);
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn repeating_event_has_no_drift() {
        let mut clock = Clock::new();
        clock.schedule(Ev::A, 0.1, ScheduleOptions::repeating()).unwrap();

        // 0.35s in awkward steps: due at 0.1, 0.2, 0.3.
        let mut fired = 0;
        for step in [ms(70), ms(70), ms(70), ms(70), ms(70)] {
            fired += clock.advance(step).len();
        }
        assert_eq!(fired, 3);

        // One big jump fires every missed slot.
        fired = clock.advance(ms(1000)).len();
        assert_eq!(fired, 10);
        assert_eq!(clock.pending(), 1);
    }

    #[test]
    fn events_fire_in_timestamp_order() {
        let mut clock = Clock::new();
        clock.schedule(Ev::B, 0.2, ScheduleOptions::default()).unwrap();
        clock.schedule(Ev::A, 0.1, ScheduleOptions::default()).unwrap();
        assert_eq!(clock.advance(ms(500)), vec![Ev::A, Ev::B]);
    }

    #[test]
    fn non_positive_delay_is_rejected() {
        let mut clock: Clock<Ev> = Clock::new();
        assert_eq!(
            clock.schedule(Ev::A, 0.0, ScheduleOptions::default()),
            Err(ClockError::NonPositiveDelay(0.0))
        );
        assert!(clock
            .schedule(Ev::A, -1.0, ScheduleOptions::default())
            .is_err());
        assert!(clock
            .schedule(Ev::A, f64::NAN, ScheduleOptions::default())
            .is_err());
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn oversized_delay_is_an_error_not_a_panic() {
        let mut clock: Clock<Ev> = Clock::new();
        assert_eq!(
            clock.schedule(Ev::A, 1e20, ScheduleOptions::default()),
            Err(ClockError::DelayOutOfRange(1e20))
        );

        // Fits as a duration on its own but not once added to the elapsed time.
        clock.advance(Duration::from_secs(10));
        let near_max = Duration::MAX.as_secs_f64();
        assert!(clock
            .schedule(Ev::B, near_max, ScheduleOptions::repeating())
            .is_err());
        assert_eq!(clock.pending(), 0);
    }

    #[test]
    fn paused_tick_keeps_elapsed_time() {
        let mut clock = Clock::new();
        clock.schedule(Ev::A, 0.001, ScheduleOptions::default()).unwrap();
        clock.set_paused(true);
        std::thread::sleep(ms(5));
        assert!(clock.tick().is_empty());
        assert_eq!(clock.elapsed(), Duration::ZERO);

        clock.set_paused(false);
        std::thread::sleep(ms(5));
        assert_eq!(clock.tick(), vec![Ev::A]);
        assert!(clock.elapsed() >= ms(5));
    }

    #[test]
    fn unschedule_prevents_firing() {
        let mut clock = Clock::new();
        clock.schedule(Ev::A, 0.1, ScheduleOptions::default()).unwrap();
        clock.schedule(Ev::B, 0.1, ScheduleOptions::default()).unwrap();

        assert_eq!(clock.unschedule(&Ev::A, None), 1);
        assert_eq!(clock.advance(ms(200)), vec![Ev::B]);
        assert_eq!(clock.unschedule(&Ev::A, None), 0);
    }

    #[test]
    fn unschedule_respects_max_removals_earliest_first() {
        let mut clock = Clock::new();
        for delay in [0.3, 0.1, 0.2] {
            clock.schedule(Ev::A, delay, ScheduleOptions::default()).unwrap();
        }
        assert_eq!(clock.unschedule(&Ev::A, Some(2)), 2);
        // Only the 0.3s one is left.
        assert!(clock.advance(ms(250)).is_empty());
        assert_eq!(clock.advance(ms(100)), vec![Ev::A]);
    }

    #[test]
    fn unique_replaces_previous_instance() {
        let mut clock = Clock::new();
        clock.schedule(Ev::Tagged(1), 0.1, ScheduleOptions::default()).unwrap();
        clock.schedule(Ev::Tagged(1), 0.5, ScheduleOptions::unique()).unwrap();
        clock.schedule(Ev::Tagged(2), 0.1, ScheduleOptions::unique()).unwrap();
        assert_eq!(clock.pending(), 2);
        assert_eq!(clock.advance(ms(200)), vec![Ev::Tagged(2)]);
        assert_eq!(clock.advance(ms(400)), vec![Ev::Tagged(1)]);
    }

    #[test]
    fn cancel_removes_by_identity() {
        let mut clock = Clock::new();
        let first = clock.schedule(Ev::A, 0.1, ScheduleOptions::default()).unwrap();
        clock.schedule(Ev::A, 0.2, ScheduleOptions::default()).unwrap();
        assert!(clock.cancel(first));
        assert!(!clock.cancel(first));
        assert_eq!(clock.advance(ms(150)), Vec::<Ev>::new());
        assert_eq!(clock.advance(ms(100)), vec![Ev::A]);
    }

    #[test]
    fn paused_clock_keeps_logical_time() {
        let mut clock = Clock::new();
        clock.schedule(Ev::A, 0.1, ScheduleOptions::default()).unwrap();
        clock.set_paused(true);
        assert!(clock.advance(ms(500)).is_empty());
        assert_eq!(clock.elapsed(), Duration::ZERO);
        clock.set_paused(false);
        assert_eq!(clock.advance(ms(100)), vec![Ev::A]);
    }

    #[test]
    fn reset_actions() {
        let mut clock = Clock::new();
        clock.schedule(Ev::A, 1.0, ScheduleOptions::default()).unwrap();
        clock.advance(ms(600));
        clock.reset(ResetAction::ShiftEvents);
        assert_eq!(clock.elapsed(), Duration::ZERO);
        assert!(clock.advance(ms(300)).is_empty());
        assert_eq!(clock.advance(ms(100)), vec![Ev::A]);

        clock.schedule(Ev::B, 1.0, ScheduleOptions::default()).unwrap();
        clock.advance(ms(600));
        clock.reset(ResetAction::KeepEvents);
        // Still due at the old absolute timestamp (1.4s).
        assert!(clock.advance(ms(1000)).is_empty());
        assert_eq!(clock.advance(ms(400)), vec![Ev::B]);

        clock.schedule(Ev::A, 0.1, ScheduleOptions::default()).unwrap();
        clock.reset(ResetAction::ClearEvents);
        assert_eq!(clock.pending(), 0);
    }
}
