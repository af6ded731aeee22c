//! Property tests for [`TimerQueue`].
//!
//! 1. Due timers pop in `(deadline, id)` order.
//! 2. Cancelled timers never fire.
//! 3. Timers scheduled after a watermark are excluded for that watermark.
//! 4. Draining to the latest deadline empties the queue.

use std::collections::BTreeSet;
use std::time::Duration;

use cascade_core::timer::{TimerId, TimerQueue};
use proptest::prelude::*;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

proptest! {
    #[test]
    fn due_timers_pop_in_deadline_then_schedule_order(
        deadlines in prop::collection::vec(0u64..500, 1..40),
        now in 0u64..600,
    ) {
        let mut queue = TimerQueue::new();
        for (i, d) in deadlines.iter().enumerate() {
            queue.schedule(ms(*d), i);
        }
        let mark = queue.watermark();
        let mut fired: Vec<(u64, TimerId)> = Vec::new();
        while let Some((id, index)) = queue.pop_due(ms(now), mark) {
            fired.push((deadlines[index], id));
        }

        let mut sorted = fired.clone();
        sorted.sort();
        prop_assert_eq!(&fired, &sorted);
        let expected = deadlines.iter().filter(|d| **d <= now).count();
        prop_assert_eq!(fired.len(), expected);
        prop_assert_eq!(queue.len(), deadlines.len() - expected);
    }

    #[test]
    fn cancelled_timers_never_fire(
        deadlines in prop::collection::vec(0u64..200, 1..30),
        cancel_mask in prop::collection::vec(any::<bool>(), 30),
    ) {
        let mut queue = TimerQueue::new();
        let ids: Vec<TimerId> = deadlines
            .iter()
            .enumerate()
            .map(|(i, d)| queue.schedule(ms(*d), i))
            .collect();

        let mut cancelled = BTreeSet::new();
        for (i, id) in ids.iter().enumerate() {
            if cancel_mask[i] {
                prop_assert!(queue.cancel(*id));
                prop_assert!(!queue.cancel(*id));
                cancelled.insert(i);
            }
        }

        let mark = queue.watermark();
        while let Some((_, index)) = queue.pop_due(ms(1_000), mark) {
            prop_assert!(!cancelled.contains(&index), "cancelled timer {} fired", index);
        }
        prop_assert!(queue.is_empty());
        prop_assert_eq!(queue.next_deadline(), None);
    }

    #[test]
    fn timers_after_watermark_wait_for_next_batch(
        before in 1usize..10,
        after in 1usize..10,
    ) {
        let mut queue = TimerQueue::new();
        for i in 0..before {
            queue.schedule(Duration::ZERO, i);
        }
        let mark = queue.watermark();
        for i in 0..after {
            queue.schedule(Duration::ZERO, before + i);
        }

        let mut first_batch = 0;
        while let Some((_, index)) = queue.pop_due(Duration::ZERO, mark) {
            prop_assert!(index < before);
            first_batch += 1;
        }
        prop_assert_eq!(first_batch, before);

        let mark = queue.watermark();
        let mut second_batch = 0;
        while queue.pop_due(Duration::ZERO, mark).is_some() {
            second_batch += 1;
        }
        prop_assert_eq!(second_batch, after);
    }
}
