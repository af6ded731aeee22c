#![forbid(unsafe_code)]

//! Deferred steps keyed by deadline.
//!
//! A [`TimerQueue`] holds pending deadlines tagged with a caller-defined
//! kind. Nothing runs on its own: the owner asks for due timers with
//! [`TimerQueue::pop_due`] whenever its clock ticks, and handles each one
//! before asking for the next, so a handler may cancel or schedule other
//! timers in between.
//!
//! # Invariants
//!
//! - Timer ids are unique for the lifetime of a queue and never reused.
//! - Due timers are returned in deadline order; equal deadlines fire in
//!   scheduling order.
//! - A timer scheduled after a [`TimerQueue::watermark`] was taken is never
//!   returned by `pop_due` for that watermark, even with a zero delay. This
//!   is what gives zero-delay timers "next tick" semantics.
//! - A cancelled timer never fires. A fired timer cannot be cancelled.

use std::time::Duration;

/// Identifier of a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

impl TimerId {
    /// Raw numeric id.
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone)]
struct Pending<K> {
    id: TimerId,
    deadline: Duration,
    kind: K,
}

/// Pending deadlines tagged with a kind `K`.
#[derive(Debug, Clone)]
pub struct TimerQueue<K> {
    next_id: u64,
    pending: Vec<Pending<K>>,
}

impl<K> Default for TimerQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> TimerQueue<K> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            next_id: 1,
            pending: Vec::new(),
        }
    }

    /// Schedule `kind` to fire at the absolute `deadline`.
    pub fn schedule(&mut self, deadline: Duration, kind: K) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending { id, deadline, kind });
        id
    }

    /// Cancel a pending timer. Returns `false` if it already fired or was
    /// cancelled before.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        self.pending.len() != before
    }

    /// Cancel every pending timer whose kind matches `pred`.
    ///
    /// Returns how many were cancelled.
    pub fn cancel_where(&mut self, mut pred: impl FnMut(&K) -> bool) -> usize {
        let before = self.pending.len();
        self.pending.retain(|p| !pred(&p.kind));
        before - self.pending.len()
    }

    /// Whether `id` is still waiting to fire.
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|p| p.id == id)
    }

    /// The id the next scheduled timer will receive.
    ///
    /// Pass it to [`pop_due`](Self::pop_due) to exclude timers scheduled
    /// while the current batch is being handled.
    pub fn watermark(&self) -> TimerId {
        TimerId(self.next_id)
    }

    /// Remove and return the earliest timer that is due at `now` and was
    /// scheduled before `watermark`.
    pub fn pop_due(&mut self, now: Duration, watermark: TimerId) -> Option<(TimerId, K)> {
        let index = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.deadline <= now && p.id < watermark)
            .min_by_key(|(_, p)| (p.deadline, p.id))
            .map(|(index, _)| index)?;
        let Pending { id, kind, .. } = self.pending.swap_remove(index);

        #[cfg(feature = "tracing")]
        tracing::trace!(timer = id.get(), now_ms = now.as_millis() as u64, "timer due");

        Some((id, kind))
    }

    /// Earliest pending deadline, if any.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.iter().map(|p| p.deadline).min()
    }

    /// Iterate pending timers in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (TimerId, &K)> + '_ {
        self.pending.iter().map(|p| (p.id, &p.kind))
    }

    /// Number of pending timers.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop every pending timer.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

/// Handle to a deferred step created by [`after_transition`].
///
/// Dropping the token does **not** cancel the step; call
/// [`cancel`](Self::cancel) explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CancelToken(TimerId);

impl CancelToken {
    /// The underlying timer.
    #[inline]
    pub const fn id(self) -> TimerId {
        self.0
    }

    /// Cancel the deferred step. Returns `false` if it already ran.
    pub fn cancel<K>(self, timers: &mut TimerQueue<K>) -> bool {
        timers.cancel(self.0)
    }

    /// Whether the deferred step is still waiting.
    pub fn is_pending<K>(self, timers: &TimerQueue<K>) -> bool {
        timers.is_pending(self.0)
    }
}

/// Run `kind` once `duration` has elapsed after `now`.
///
/// This is the single way animation windows, teardown delays, hover intent
/// and auto-close are deferred. A zero duration still waits for the next
/// tick.
pub fn after_transition<K>(
    timers: &mut TimerQueue<K>,
    now: Duration,
    duration: Duration,
    kind: K,
) -> CancelToken {
    CancelToken(timers.schedule(now.saturating_add(duration), kind))
}

#[cfg(test)]
mod tests {
    use super::*;

    const fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn drain(queue: &mut TimerQueue<&'static str>, now: Duration) -> Vec<&'static str> {
        let mark = queue.watermark();
        let mut fired = Vec::new();
        while let Some((_, kind)) = queue.pop_due(now, mark) {
            fired.push(kind);
        }
        fired
    }

    #[test]
    fn fires_in_deadline_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(ms(300), "late");
        queue.schedule(ms(100), "early");
        queue.schedule(ms(200), "middle");
        assert_eq!(drain(&mut queue, ms(250)), vec!["early", "middle"]);
        assert_eq!(queue.len(), 1);
        assert_eq!(drain(&mut queue, ms(300)), vec!["late"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn equal_deadlines_fire_in_schedule_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(ms(100), "first");
        queue.schedule(ms(100), "second");
        queue.schedule(ms(100), "third");
        assert_eq!(drain(&mut queue, ms(100)), vec!["first", "second", "third"]);
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut queue = TimerQueue::new();
        let id = queue.schedule(ms(10), "cancelled");
        queue.schedule(ms(20), "kept");
        assert!(queue.cancel(id));
        assert!(!queue.cancel(id));
        assert_eq!(drain(&mut queue, ms(50)), vec!["kept"]);
    }

    #[test]
    fn watermark_defers_timers_scheduled_during_a_batch() {
        let mut queue = TimerQueue::new();
        queue.schedule(ms(0), "existing");
        let mark = queue.watermark();
        let (_, kind) = queue.pop_due(ms(0), mark).expect("existing timer is due");
        assert_eq!(kind, "existing");

        queue.schedule(ms(0), "scheduled during batch");
        assert!(queue.pop_due(ms(0), mark).is_none());
        assert_eq!(drain(&mut queue, ms(0)), vec!["scheduled during batch"]);
    }

    #[test]
    fn cancel_where_filters_by_kind() {
        let mut queue = TimerQueue::new();
        queue.schedule(ms(1), 1u32);
        queue.schedule(ms(2), 2);
        queue.schedule(ms(3), 3);
        assert_eq!(queue.cancel_where(|k| *k >= 2), 2);
        assert_eq!(queue.iter().map(|(_, k)| *k).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn after_transition_offsets_from_now() {
        let mut queue = TimerQueue::new();
        let token = after_transition(&mut queue, ms(1000), ms(300), "settle");
        assert!(token.is_pending(&queue));
        assert_eq!(queue.next_deadline(), Some(ms(1300)));
        assert!(drain(&mut queue, ms(1299)).is_empty());
        assert_eq!(drain(&mut queue, ms(1300)), vec!["settle"]);
        assert!(!token.is_pending(&queue));
        assert!(!token.cancel(&mut queue));
    }

    #[test]
    fn ids_are_never_reused() {
        let mut queue = TimerQueue::new();
        let a = queue.schedule(ms(1), ());
        queue.clear();
        let b = queue.schedule(ms(1), ());
        assert_ne!(a, b);
        assert!(b > a);
    }
}
