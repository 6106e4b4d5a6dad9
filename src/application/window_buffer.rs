// Sliding window buffer - Merges the history batch and live samples into one bounded view
use crate::domain::sample::Sample;
use std::collections::VecDeque;

/// Ordered, size-bounded window of recent samples, oldest first.
///
/// A push keeps at most `history_limit` earlier samples plus the new one, so
/// a full window holds `history_limit + 1` entries. Samples stay in the order
/// they were inserted; timestamps are never used for ordering.
///
/// The buffer does no locking of its own. Callers serialize access, which the
/// session does by mutating it from a single event loop.
#[derive(Debug, Clone)]
pub struct WindowBuffer {
    samples: VecDeque<Sample>,
    // Number of leading entries that came from `seed` rather than `push`.
    seeded: usize,
    history_limit: usize,
}

impl WindowBuffer {
    pub fn new(history_limit: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(history_limit + 1),
            seeded: 0,
            history_limit,
        }
    }

    /// Install a history batch delivered newest-first.
    ///
    /// The batch replaces whatever an earlier seed put at the front of the
    /// window. Samples already pushed live stay behind it in arrival order.
    pub fn seed(&mut self, batch: Vec<Sample>) {
        let live: Vec<Sample> = self.samples.drain(self.seeded..).collect();
        self.samples.clear();
        self.samples.extend(batch.into_iter().rev());
        self.seeded = self.samples.len();
        self.samples.extend(live);
        self.evict();
    }

    /// Append a live sample, evicting from the front past the bound.
    pub fn push(&mut self, sample: Sample) {
        self.samples.push_back(sample);
        self.evict();
    }

    /// Copy of the current contents, oldest first.
    pub fn snapshot(&self) -> Vec<Sample> {
        self.samples.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Largest length the window can reach.
    pub fn capacity(&self) -> usize {
        self.history_limit + 1
    }

    fn evict(&mut self) {
        while self.samples.len() > self.capacity() {
            self.samples.pop_front();
            self.seeded = self.seeded.saturating_sub(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(ms).unwrap()
    }

    fn sample(tag: f64) -> Sample {
        Sample::new(at(1_700_000_000_000 + tag as i64), Some(tag), None, None)
    }

    fn speeds(window: &WindowBuffer) -> Vec<f64> {
        window.snapshot().iter().map(|s| s.speed.unwrap()).collect()
    }

    #[test]
    fn test_empty_window() {
        let window = WindowBuffer::new(10);
        assert!(window.is_empty());
        assert!(window.snapshot().is_empty());
        assert_eq!(window.capacity(), 11);
    }

    #[test]
    fn test_bound_is_limit_plus_one() {
        let limit = 4;
        let mut window = WindowBuffer::new(limit);

        for i in 0..20 {
            window.push(sample(i as f64));
            assert!(window.len() <= limit + 1);
            if i + 1 >= limit {
                assert!(window.len() >= limit);
            }
        }

        assert_eq!(window.len(), limit + 1);
        assert_eq!(speeds(&window), vec![15.0, 16.0, 17.0, 18.0, 19.0]);
    }

    #[test]
    fn test_full_width_reached_on_push_after_limit() {
        // Each push keeps `limit` earlier samples, so `limit` pushes leave
        // `limit` entries and the next one reaches `limit + 1`.
        let mut window = WindowBuffer::new(3);
        for i in 0..3 {
            window.push(sample(i as f64));
        }
        assert_eq!(window.len(), 3);

        window.push(sample(3.0));
        assert_eq!(window.len(), 4);

        window.push(sample(4.0));
        assert_eq!(window.len(), 4);
        assert_eq!(speeds(&window), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_zero_limit_keeps_only_newest() {
        let mut window = WindowBuffer::new(0);
        window.push(sample(1.0));
        window.push(sample(2.0));
        assert_eq!(speeds(&window), vec![2.0]);
    }

    #[test]
    fn test_push_order_ignores_timestamps() {
        let mut window = WindowBuffer::new(10);
        let late = Sample::new(at(5_000), Some(1.0), None, None);
        let early = Sample::new(at(1_000), Some(2.0), None, None);

        window.push(late.clone());
        window.push(early.clone());

        assert_eq!(window.snapshot(), vec![late, early]);
    }

    #[test]
    fn test_seed_reverses_newest_first_batch() {
        let mut window = WindowBuffer::new(10);
        window.seed(vec![sample(3.0), sample(2.0), sample(1.0)]);
        assert_eq!(speeds(&window), vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_push_before_seed_keeps_live_sample_last() {
        let mut window = WindowBuffer::new(10);
        window.push(sample(100.0));
        window.seed(vec![sample(3.0), sample(2.0), sample(1.0)]);

        assert_eq!(speeds(&window), vec![1.0, 2.0, 3.0, 100.0]);
    }

    #[test]
    fn test_reseed_replaces_only_history_prefix() {
        let mut window = WindowBuffer::new(10);
        window.seed(vec![sample(2.0), sample(1.0)]);
        window.push(sample(100.0));
        window.push(sample(101.0));

        window.seed(vec![sample(9.0), sample(8.0), sample(7.0)]);

        assert_eq!(speeds(&window), vec![7.0, 8.0, 9.0, 100.0, 101.0]);
    }

    #[test]
    fn test_reseed_after_history_evicted() {
        let mut window = WindowBuffer::new(2);
        window.seed(vec![sample(2.0), sample(1.0)]);
        window.push(sample(100.0));
        window.push(sample(101.0));
        window.push(sample(102.0));
        assert_eq!(speeds(&window), vec![100.0, 101.0, 102.0]);

        window.seed(vec![sample(5.0)]);

        assert_eq!(speeds(&window), vec![100.0, 101.0, 102.0]);
    }

    #[test]
    fn test_oversized_seed_is_trimmed() {
        let mut window = WindowBuffer::new(2);
        window.seed((1..=6).rev().map(|i| sample(i as f64)).collect());
        assert_eq!(speeds(&window), vec![4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut window = WindowBuffer::new(2);
        window.push(sample(1.0));
        let before = window.snapshot();

        window.push(sample(2.0));
        window.push(sample(3.0));
        window.push(sample(4.0));

        assert_eq!(before.len(), 1);
        assert_eq!(before[0].speed, Some(1.0));
    }
}
