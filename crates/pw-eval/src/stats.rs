//! Reduction of trial totals into summary statistics.

/// Running sums over trial totals.
///
/// `merge` adds sums and takes min/max, so partial accumulators may be
/// combined in any grouping.  Floating-point addition is not associative;
/// callers that need bit-stable output fold in a fixed order (the evaluator
/// folds by trial index).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StatsAccumulator {
    count:  u32,
    sum:    f64,
    sum_sq: f64,
    min:    f64,
    max:    f64,
}

impl Default for StatsAccumulator {
    fn default() -> Self {
        Self { count: 0, sum: 0.0, sum_sq: 0.0, min: f64::INFINITY, max: f64::NEG_INFINITY }
    }
}

impl StatsAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.sum_sq += value * value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn merge(&mut self, other: &StatsAccumulator) {
        self.count += other.count;
        self.sum += other.sum;
        self.sum_sq += other.sum_sq;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    #[inline]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Summarise.  An empty accumulator yields zeros with `trials == 0`.
    pub fn finish(&self, partial: bool) -> StrategyStatistics {
        if self.count == 0 {
            return StrategyStatistics { trials: 0, mean: 0.0, min: 0.0, max: 0.0, stdev: 0.0, partial };
        }
        let n = self.count as f64;
        let mean = self.sum / n;
        let stdev = if self.count < 2 {
            0.0
        } else {
            // Sample variance; clamp the rounding residue of near-equal totals.
            ((self.sum_sq - self.sum * mean) / (n - 1.0)).max(0.0).sqrt()
        };
        StrategyStatistics { trials: self.count, mean, min: self.min, max: self.max, stdev, partial }
    }
}

/// Summary of one strategy's total race times.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StrategyStatistics {
    /// Completed trials counted.
    pub trials:  u32,
    pub mean:    f64,
    pub min:     f64,
    pub max:     f64,
    /// Sample standard deviation; 0 for fewer than two trials.
    pub stdev:   f64,
    /// Some requested trials were stopped and left out.
    pub partial: bool,
}

impl StrategyStatistics {
    /// Ranking order: lower mean first, then lower spread.
    pub fn rank_cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.mean.total_cmp(&other.mean).then(self.stdev.total_cmp(&other.stdev))
    }
}
