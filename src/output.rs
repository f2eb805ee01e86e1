use chrono::{DateTime, Utc};
use ndarray::{Array1, Array2, ArrayViewMut2};

use crate::activity::{Sample, AXES};
use crate::record::Summary;
use crate::timecode;

/// Number of decimal digits values are rounded to after scaling.
pub const SIGNIFICANT_DIGITS: i32 = 3;

/// Column names for [Activity::samples].
pub const COLUMNS: [&str; AXES] = ["X", "Y", "Z"];

/// Decoded activity from a single log.
#[derive(Debug, Clone)]
pub struct Activity {
    /// Scaled samples with shape `(n, 3)`, columns in [COLUMNS] order.
    pub samples: Array2<f64>,
    /// Per-sample timestamps, hundredths of a second relative to `start_time`, or to the
    /// Unix epoch when there is none.
    pub timestamps: Array1<i64>,
    /// Device start time, seconds since the Unix epoch, if the log contained one.
    pub start_time: Option<u32>,
    pub sample_rate: u32,
    pub summary: Summary,
}

impl Activity {
    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    #[must_use]
    pub fn start_datetime(&self) -> Option<DateTime<Utc>> {
        timecode::to_datetime(self.start_time?, 0)
    }

    /// Absolute time of the sample at `row`, or `None` if there is no such row.
    ///
    /// Without a start time the timestamps are already relative to the Unix epoch.
    #[must_use]
    pub fn datetime(&self, row: usize) -> Option<DateTime<Utc>> {
        let ticks = *self.timestamps.get(row)?;
        timecode::to_datetime(self.start_time.unwrap_or(0), ticks)
    }
}

/// Accumulates decoded samples up to a fixed number of rows.
#[derive(Debug)]
pub(crate) struct Rows {
    capacity: usize,
    samples: Vec<Sample>,
    timestamps: Vec<i64>,
}

impl Rows {
    pub fn new(capacity: usize) -> Self {
        Rows {
            capacity,
            samples: Vec::new(),
            timestamps: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn remaining(&self) -> usize {
        self.capacity - self.samples.len()
    }

    /// Add a row. Callers must check [Rows::remaining] first.
    pub fn push(&mut self, sample: Sample, timestamp: i64) {
        debug_assert!(self.remaining() > 0, "row capacity exceeded");
        self.samples.push(sample);
        self.timestamps.push(timestamp);
    }

    /// Scale and round the accumulated rows into an [Activity].
    pub fn finish(
        self,
        scale_factor: f64,
        start_time: Option<u32>,
        sample_rate: u32,
        summary: Summary,
    ) -> Activity {
        let mut samples = Array2::<f64>::zeros((self.samples.len(), AXES));
        for (mut row, sample) in samples.rows_mut().into_iter().zip(&self.samples) {
            for (cell, value) in row.iter_mut().zip(sample) {
                *cell = f64::from(*value);
            }
        }
        scale_and_round(samples.view_mut(), scale_factor, SIGNIFICANT_DIGITS);

        Activity {
            samples,
            timestamps: Array1::from(self.timestamps),
            start_time,
            sample_rate,
            summary,
        }
    }
}

/// Divide every value by `scale` and round to `digits` decimal places, half away from
/// zero.
pub fn scale_and_round(mut values: ArrayViewMut2<f64>, scale: f64, digits: i32) {
    let multiplier = 10f64.powi(digits);
    values.mapv_inplace(|v| ((v / scale) * multiplier).round() / multiplier);
}
