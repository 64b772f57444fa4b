//! Linear histogram for lid angle telemetry.
//!
//! Bucket layout follows the usual linear-histogram convention: bucket 0 is
//! the underflow bucket `[0, minimum)`, the last bucket is the overflow bucket
//! `[maximum, ∞)`, and the buckets in between split `[minimum, maximum)`
//! evenly with boundaries rounded to integers.

use serde::Serialize;

use crate::error::{Error, Result};

/// Smallest non-underflow lid angle sample (degrees).
pub const LID_ANGLE_MINIMUM: u32 = 1;
/// Start of the overflow bucket (degrees).
pub const LID_ANGLE_MAXIMUM: u32 = 360;
pub const LID_ANGLE_BUCKETS: usize = 50;

/// Integer-sample histogram with evenly spaced buckets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearHistogram {
    minimum: u32,
    maximum: u32,
    /// `bucket_count + 1` boundaries; bucket `i` is `[ranges[i], ranges[i + 1])`.
    ranges: Vec<u32>,
    counts: Vec<u64>,
    sum: u64,
}

impl LinearHistogram {
    /// Create a histogram, validating the layout.
    ///
    /// Needs at least three buckets (underflow, one regular, overflow) and
    /// `1 <= minimum < maximum`.
    pub fn new(minimum: u32, maximum: u32, bucket_count: usize) -> Result<Self> {
        if bucket_count < 3 {
            return Err(Error::InvalidParameter(format!(
                "histogram needs at least 3 buckets, got {}",
                bucket_count
            )));
        }
        if minimum == 0 || minimum >= maximum {
            return Err(Error::InvalidParameter(format!(
                "histogram range [{}, {}] is empty",
                minimum, maximum
            )));
        }
        Ok(Self::build(minimum, maximum, bucket_count))
    }

    /// The 1..=360 degree, 50 bucket layout used for lid angle samples.
    pub fn lid_angle() -> Self {
        Self::build(LID_ANGLE_MINIMUM, LID_ANGLE_MAXIMUM, LID_ANGLE_BUCKETS)
    }

    fn build(minimum: u32, maximum: u32, bucket_count: usize) -> Self {
        let mut ranges = Vec::with_capacity(bucket_count + 1);
        ranges.push(0);
        let spans = (bucket_count - 2) as f64;
        for i in 1..bucket_count {
            let lower = minimum as f64 * (bucket_count - 1 - i) as f64;
            let upper = maximum as f64 * (i - 1) as f64;
            ranges.push(((lower + upper) / spans).round() as u32);
        }
        ranges.push(u32::MAX);

        Self {
            minimum,
            maximum,
            ranges,
            counts: vec![0; bucket_count],
            sum: 0,
        }
    }

    pub fn minimum(&self) -> u32 {
        self.minimum
    }

    pub fn maximum(&self) -> u32 {
        self.maximum
    }

    pub fn bucket_count(&self) -> usize {
        self.counts.len()
    }

    /// Index of the bucket holding `sample`.
    pub fn bucket_index(&self, sample: u32) -> usize {
        // ranges[0] == 0, so the partition point is always >= 1
        let index = self.ranges.partition_point(|&boundary| boundary <= sample) - 1;
        index.min(self.counts.len() - 1)
    }

    /// `[lower, upper)` bounds of bucket `index`.
    pub fn bucket_range(&self, index: usize) -> Option<(u32, u32)> {
        if index >= self.counts.len() {
            return None;
        }
        Some((self.ranges[index], self.ranges[index + 1]))
    }

    pub fn record(&mut self, sample: u32) {
        let index = self.bucket_index(sample);
        self.counts[index] += 1;
        self.sum += sample as u64;
    }

    pub fn count(&self, index: usize) -> u64 {
        self.counts.get(index).copied().unwrap_or(0)
    }

    /// Count in the bucket that `sample` would land in.
    pub fn count_for(&self, sample: u32) -> u64 {
        self.count(self.bucket_index(sample))
    }

    pub fn total_count(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn sum(&self) -> u64 {
        self.sum
    }

    /// Non-empty buckets as `(lower, upper, count)`.
    pub fn nonempty_buckets(&self) -> Vec<(u32, u32, u64)> {
        self.counts
            .iter()
            .enumerate()
            .filter(|(_, &count)| count > 0)
            .map(|(i, &count)| (self.ranges[i], self.ranges[i + 1], count))
            .collect()
    }
}

impl Default for LinearHistogram {
    fn default() -> Self {
        Self::lid_angle()
    }
}
