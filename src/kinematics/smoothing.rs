//! Moving average over the last few samples
//!
//! Suppresses single-frame jitter in joint angles before they are compared
//! against thresholds.

use std::collections::VecDeque;

/// Largest window a detector may smooth over
pub const MAX_SMOOTHING_WINDOW: usize = 5;

/// Ring buffer of recent samples, oldest evicted first
#[derive(Clone, Debug, PartialEq)]
pub struct MovingAverage {
    history: VecDeque<f32>,
    window: usize,
}

impl MovingAverage {
    /// `window` is clamped to 1..=MAX_SMOOTHING_WINDOW
    pub fn new(window: usize) -> Self {
        let window = window.clamp(1, MAX_SMOOTHING_WINDOW);
        Self {
            history: VecDeque::with_capacity(window + 1),
            window,
        }
    }

    /// Push a sample, returns the mean of the retained samples
    pub fn push(&mut self, sample: f32) -> f32 {
        self.history.push_back(sample);

        if self.history.len() > self.window {
            self.history.pop_front();
        }

        self.history.iter().sum::<f32>() / self.history.len() as f32
    }

    /// Mean of the retained samples, None before the first push
    pub fn mean(&self) -> Option<f32> {
        if self.history.is_empty() {
            return None;
        }
        Some(self.history.iter().sum::<f32>() / self.history.len() as f32)
    }

    /// Retained samples, oldest first
    pub fn samples(&self) -> impl Iterator<Item = f32> + '_ {
        self.history.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn clear(&mut self) {
        self.history.clear();
    }
}

impl Default for MovingAverage {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_window_of_one_is_passthrough() {
        let mut avg = MovingAverage::new(1);
        assert_eq!(avg.push(170.0), 170.0);
        assert_eq!(avg.push(95.0), 95.0);
        assert_eq!(avg.len(), 1);
    }

    #[test]
    fn test_oldest_sample_is_evicted() {
        let mut avg = MovingAverage::new(3);
        avg.push(10.0);
        avg.push(20.0);
        avg.push(30.0);
        let mean = avg.push(40.0);

        assert_abs_diff_eq!(mean, 30.0, epsilon = 1e-5);
        assert_eq!(avg.samples().collect::<Vec<_>>(), vec![20.0, 30.0, 40.0]);
    }

    #[test]
    fn test_partial_window_uses_available_samples() {
        let mut avg = MovingAverage::new(5);
        avg.push(100.0);
        assert_abs_diff_eq!(avg.push(50.0), 75.0, epsilon = 1e-5);
    }

    #[test]
    fn test_window_is_clamped() {
        assert_eq!(MovingAverage::new(0).window(), 1);
        assert_eq!(MovingAverage::new(12).window(), MAX_SMOOTHING_WINDOW);
    }

    #[test]
    fn test_clear() {
        let mut avg = MovingAverage::new(5);
        avg.push(1.0);
        avg.clear();
        assert!(avg.is_empty());
        assert_eq!(avg.mean(), None);
    }
}
