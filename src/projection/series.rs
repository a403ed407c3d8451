//! Projected population time series and summary output

use serde::{Deserialize, Serialize};

use crate::population::PopulationSnapshot;

/// Complete projection output: one snapshot per simulated year, plus the
/// parallel total-population series. Append-only during simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationTimeSeries {
    /// Snapshots in year order; never empty (seeded with the initial year)
    snapshots: Vec<PopulationSnapshot>,
    totals: Vec<f64>,
}

impl PopulationTimeSeries {
    /// Start a series from the initial snapshot.
    pub fn new(initial: PopulationSnapshot) -> Self {
        let totals = vec![initial.total()];
        Self {
            snapshots: vec![initial],
            totals,
        }
    }

    /// Append the next year's snapshot and record its total.
    pub fn push(&mut self, snapshot: PopulationSnapshot) {
        self.totals.push(snapshot.total());
        self.snapshots.push(snapshot);
    }

    pub fn start_year(&self) -> u32 {
        self.snapshots[0].year()
    }

    pub fn end_year(&self) -> u32 {
        self.latest().year()
    }

    /// Number of snapshots (simulated years + 1 for the initial year).
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Most recently appended snapshot.
    pub fn latest(&self) -> &PopulationSnapshot {
        &self.snapshots[self.snapshots.len() - 1]
    }

    /// Snapshot for a calendar year, if simulated.
    pub fn get(&self, year: u32) -> Option<&PopulationSnapshot> {
        if year < self.start_year() {
            return None;
        }
        self.snapshots.get((year - self.start_year()) as usize)
    }

    pub fn snapshots(&self) -> &[PopulationSnapshot] {
        &self.snapshots
    }

    /// Total population per year, parallel to `snapshots`.
    pub fn totals(&self) -> &[f64] {
        &self.totals
    }

    /// Summary statistics over the whole series.
    pub fn summary(&self) -> ProjectionSummary {
        let start = self.start_year();
        let mut peak_total = f64::NEG_INFINITY;
        let mut peak_year = start;
        for (offset, &total) in self.totals.iter().enumerate() {
            if total > peak_total {
                peak_total = total;
                peak_year = start + offset as u32;
            }
        }

        ProjectionSummary {
            simulated_years: (self.snapshots.len() - 1) as u32,
            initial_total: self.totals[0],
            final_total: self.totals[self.totals.len() - 1],
            peak_total,
            peak_year,
        }
    }
}

/// Summary statistics for a projection run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub simulated_years: u32,
    pub initial_total: f64,
    pub final_total: f64,
    pub peak_total: f64,
    pub peak_year: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(year: u32, count: f64) -> PopulationSnapshot {
        PopulationSnapshot::new(year, vec![count], vec![count]).unwrap()
    }

    #[test]
    fn test_append_and_lookup() {
        let mut series = PopulationTimeSeries::new(snapshot(1991, 10.0));
        series.push(snapshot(1992, 12.0));
        series.push(snapshot(1993, 11.0));

        assert_eq!(series.start_year(), 1991);
        assert_eq!(series.end_year(), 1993);
        assert_eq!(series.len(), 3);
        assert_eq!(series.totals(), &[20.0, 24.0, 22.0]);
        assert_eq!(series.get(1992).map(PopulationSnapshot::year), Some(1992));
        assert!(series.get(1990).is_none());
        assert!(series.get(1994).is_none());
    }

    #[test]
    fn test_summary_tracks_peak() {
        let mut series = PopulationTimeSeries::new(snapshot(2000, 10.0));
        series.push(snapshot(2001, 15.0));
        series.push(snapshot(2002, 13.0));

        let summary = series.summary();
        assert_eq!(summary.simulated_years, 2);
        assert_eq!(summary.initial_total, 20.0);
        assert_eq!(summary.final_total, 26.0);
        assert_eq!(summary.peak_total, 30.0);
        assert_eq!(summary.peak_year, 2001);
    }
}
