// SPDX-License-Identifier: MIT

use std::fmt;
use std::time::Duration;

const RULE: &str = "|-------------------|-------------------|-------------------|--------------------------------|------------------------------------|";
const HEADER: &str = "|        SUM        |        MIN        |        MAX        |        AVG Time for Sum        |        AVG Time for Min/Max        |";

/// Final values of a run, as printed by both binaries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BenchmarkReport {
    pub sum: i64,
    /// `None` when the input held no samples.
    pub extrema: Option<(i64, i64)>,
    pub avg_sum_time: Duration,
    pub avg_minmax_time: Duration,
}

impl BenchmarkReport {
    pub fn min(&self) -> Option<i64> {
        self.extrema.map(|(min, _)| min)
    }

    pub fn max(&self) -> Option<i64> {
        self.extrema.map(|(_, max)| max)
    }
}

fn cell(value: Option<i64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| v.to_string())
}

impl fmt::Display for BenchmarkReport {
    /// Renders the fixed-width result table, one row of values.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{RULE}")?;
        writeln!(f, "{HEADER}")?;
        writeln!(f, "{RULE}")?;
        writeln!(
            f,
            "| {:>17} | {:>17} | {:>17} | {:>30.6} | {:>34.6} |",
            self.sum,
            cell(self.min()),
            cell(self.max()),
            self.avg_sum_time.as_secs_f64(),
            self.avg_minmax_time.as_secs_f64(),
        )?;
        writeln!(f, "{RULE}")
    }
}
