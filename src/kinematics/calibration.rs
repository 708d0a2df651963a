//! Ground baseline calibration
//!
//! Collects a fixed number of valid samples while the subject stands still,
//! then fixes their mean as the baseline. The baseline is never revised;
//! floor drift later in the session is not corrected.

/// Default calibration window, about two seconds at 30 fps
pub const DEFAULT_CALIBRATION_FRAMES: usize = 60;

/// Calibrator that settles once on the mean of its first `capacity` samples
#[derive(Clone, Debug, PartialEq)]
pub struct BaselineCalibrator {
    samples: Vec<f32>,
    capacity: usize,
    baseline: Option<f32>,
}

impl BaselineCalibrator {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: Vec::with_capacity(capacity),
            capacity,
            baseline: None,
        }
    }

    /// Check if calibration has completed
    pub fn is_calibrated(&self) -> bool {
        self.baseline.is_some()
    }

    pub fn baseline(&self) -> Option<f32> {
        self.baseline
    }

    /// Feed one sample while calibrating.
    ///
    /// Returns the baseline on the sample that completes calibration and
    /// None otherwise. Samples after completion are ignored.
    pub fn push(&mut self, sample: f32) -> Option<f32> {
        if self.baseline.is_some() {
            return None;
        }

        self.samples.push(sample);
        if self.samples.len() < self.capacity {
            return None;
        }

        let mean = self.samples.iter().sum::<f32>() / self.samples.len() as f32;
        self.baseline = Some(mean);
        self.samples.clear();
        Some(mean)
    }

    /// Samples collected so far
    pub fn progress(&self) -> (usize, usize) {
        if self.is_calibrated() {
            (self.capacity, self.capacity)
        } else {
            (self.samples.len(), self.capacity)
        }
    }

    /// Discard the baseline and start collecting again
    pub fn reset(&mut self) {
        self.samples.clear();
        self.baseline = None;
    }
}

impl Default for BaselineCalibrator {
    fn default() -> Self {
        Self::new(DEFAULT_CALIBRATION_FRAMES)
    }
}
