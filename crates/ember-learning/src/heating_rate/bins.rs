//! Binned heating-rate observation store.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use ember_core::constants::{DELTA_BAND_COUNT, HEATING_RATE_BIN_CAPACITY, OUTDOOR_BAND_COUNT};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObservationSource {
    Cycle,
    Session,
}

/// One measured heating rate. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatingRateObservation {
    /// °C per hour.
    pub rate: f64,
    pub duration_minutes: f64,
    pub source: ObservationSource,
    #[serde(default)]
    pub stalled: bool,
    pub timestamp: DateTime<Utc>,
}

impl HeatingRateObservation {
    pub fn is_valid(&self) -> bool {
        self.rate.is_finite() && self.rate > 0.0 && self.duration_minutes.is_finite()
    }
}

/// Setpoint-delta band: `[0,2) [2,4) [4,6) [6,inf)` °C.
pub fn delta_band(delta: f64) -> usize {
    if !(delta > 0.0) {
        return 0;
    }
    ((delta / 2.0) as usize).min(DELTA_BAND_COUNT - 1)
}

/// Outdoor band: cold `< 5`, mild `[5,12)`, warm `>= 12` °C. Unknown outdoor
/// temperature is filed as mild.
pub fn outdoor_band(outdoor: Option<f64>) -> usize {
    match outdoor {
        Some(t) if t < 5.0 => 0,
        Some(t) if t >= 12.0 => 2,
        _ => 1,
    }
}

/// Ring buffer of observations for one (delta, outdoor) band pair.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateBin {
    observations: VecDeque<HeatingRateObservation>,
}

impl RateBin {
    pub fn push(&mut self, observation: HeatingRateObservation) {
        if self.observations.len() >= HEATING_RATE_BIN_CAPACITY {
            self.observations.pop_front();
        }
        self.observations.push_back(observation);
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeatingRateObservation> {
        self.observations.iter()
    }

    pub fn rates_from(&self, source: ObservationSource) -> Vec<f64> {
        self.observations
            .iter()
            .filter(|o| o.source == source)
            .map(|o| o.rate)
            .collect()
    }

    pub fn mean_rate(&self) -> Option<f64> {
        if self.observations.is_empty() {
            return None;
        }
        let sum: f64 = self.observations.iter().map(|o| o.rate).sum();
        Some(sum / self.observations.len() as f64)
    }
}

/// Serialized form of one non-empty bin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinRecord {
    pub delta_band: usize,
    pub outdoor_band: usize,
    #[serde(default)]
    pub observations: Vec<HeatingRateObservation>,
}

/// All 12 bins, indexed by `(delta_band, outdoor_band)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RateBins {
    bins: Vec<RateBin>,
}

impl Default for RateBins {
    fn default() -> Self {
        Self {
            bins: vec![RateBin::default(); DELTA_BAND_COUNT * OUTDOOR_BAND_COUNT],
        }
    }
}

impl RateBins {
    fn index(delta_band: usize, outdoor_band: usize) -> usize {
        delta_band * OUTDOOR_BAND_COUNT + outdoor_band
    }

    pub fn get(&self, delta_band: usize, outdoor_band: usize) -> Option<&RateBin> {
        if delta_band >= DELTA_BAND_COUNT || outdoor_band >= OUTDOOR_BAND_COUNT {
            return None;
        }
        self.bins.get(Self::index(delta_band, outdoor_band))
    }

    pub fn insert(&mut self, delta: f64, outdoor: Option<f64>, observation: HeatingRateObservation) {
        let idx = Self::index(delta_band(delta), outdoor_band(outdoor));
        self.bins[idx].push(observation);
    }

    /// Orthogonally adjacent bins (up to four).
    pub fn neighbors(&self, delta_band: usize, outdoor_band: usize) -> Vec<&RateBin> {
        let mut out = Vec::with_capacity(4);
        let candidates = [
            (delta_band.checked_sub(1), Some(outdoor_band)),
            (Some(delta_band + 1), Some(outdoor_band)),
            (Some(delta_band), outdoor_band.checked_sub(1)),
            (Some(delta_band), Some(outdoor_band + 1)),
        ];
        for (d, o) in candidates {
            if let (Some(d), Some(o)) = (d, o) {
                if let Some(bin) = self.get(d, o) {
                    out.push(bin);
                }
            }
        }
        out
    }

    pub fn all(&self) -> impl Iterator<Item = &HeatingRateObservation> {
        self.bins.iter().flat_map(RateBin::iter)
    }

    pub fn total(&self) -> usize {
        self.bins.iter().map(RateBin::len).sum()
    }

    pub fn to_records(&self) -> Vec<BinRecord> {
        let mut records = Vec::new();
        for d in 0..DELTA_BAND_COUNT {
            for o in 0..OUTDOOR_BAND_COUNT {
                let bin = &self.bins[Self::index(d, o)];
                if !bin.is_empty() {
                    records.push(BinRecord {
                        delta_band: d,
                        outdoor_band: o,
                        observations: bin.iter().cloned().collect(),
                    });
                }
            }
        }
        records
    }

    /// Rebuild from persisted records. Out-of-range keys and invalid
    /// observations are skipped; capacity is re-applied.
    pub fn from_records(records: &[BinRecord]) -> Self {
        let mut bins = Self::default();
        for record in records {
            if record.delta_band >= DELTA_BAND_COUNT || record.outdoor_band >= OUTDOOR_BAND_COUNT {
                tracing::warn!(
                    delta_band = record.delta_band,
                    outdoor_band = record.outdoor_band,
                    "skipping heating-rate bin with out-of-range key"
                );
                continue;
            }
            let idx = Self::index(record.delta_band, record.outdoor_band);
            for obs in record.observations.iter().filter(|o| o.is_valid()) {
                bins.bins[idx].push(obs.clone());
            }
        }
        bins
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(rate: f64) -> HeatingRateObservation {
        HeatingRateObservation {
            rate,
            duration_minutes: 30.0,
            source: ObservationSource::Cycle,
            stalled: false,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn band_edges() {
        assert_eq!(delta_band(-1.0), 0);
        assert_eq!(delta_band(1.99), 0);
        assert_eq!(delta_band(2.0), 1);
        assert_eq!(delta_band(5.9), 2);
        assert_eq!(delta_band(25.0), 3);
        assert_eq!(outdoor_band(Some(-10.0)), 0);
        assert_eq!(outdoor_band(Some(5.0)), 1);
        assert_eq!(outdoor_band(Some(12.0)), 2);
        assert_eq!(outdoor_band(None), 1);
    }

    #[test]
    fn bin_evicts_oldest() {
        let mut bin = RateBin::default();
        for i in 0..(HEATING_RATE_BIN_CAPACITY + 5) {
            bin.push(obs(i as f64 + 1.0));
        }
        assert_eq!(bin.len(), HEATING_RATE_BIN_CAPACITY);
        assert_eq!(bin.iter().next().map(|o| o.rate), Some(6.0));
    }

    #[test]
    fn corner_bin_has_two_neighbors() {
        let bins = RateBins::default();
        assert_eq!(bins.neighbors(0, 0).len(), 2);
        assert_eq!(bins.neighbors(1, 1).len(), 4);
        assert_eq!(bins.neighbors(3, 2).len(), 2);
    }

    #[test]
    fn records_skip_bad_keys_and_rates() {
        let records = vec![
            BinRecord {
                delta_band: 9,
                outdoor_band: 0,
                observations: vec![obs(1.0)],
            },
            BinRecord {
                delta_band: 1,
                outdoor_band: 2,
                observations: vec![obs(1.0), obs(-2.0), obs(f64::NAN)],
            },
        ];
        let bins = RateBins::from_records(&records);
        assert_eq!(bins.total(), 1);
        assert_eq!(bins.get(1, 2).map(RateBin::len), Some(1));
    }
}
