// Threshold bands and per-reading status classification
use super::reading::Reading;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BandError {
    #[error("threshold bounds must be finite (min={min}, max={max})")]
    NotFinite { min: f64, max: f64 },
    #[error("threshold min {min} is greater than max {max}")]
    Inverted { min: f64, max: f64 },
}

/// Acceptable `[min, max]` range for one sensor type.
///
/// Construction rejects inverted or non-finite bounds, so every band in
/// circulation satisfies `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdBand {
    min: f64,
    max: f64,
}

impl ThresholdBand {
    pub fn new(min: f64, max: f64) -> Result<Self, BandError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(BandError::NotFinite { min, max });
        }
        if min > max {
            return Err(BandError::Inverted { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

impl<'de> Deserialize<'de> for ThresholdBand {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            min: f64,
            max: f64,
        }

        let raw = Raw::deserialize(deserializer)?;
        Self::new(raw.min, raw.max).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Low,
    Optimal,
    High,
}

impl Status {
    /// Classify `value` against `band`. No band means everything is optimal.
    pub fn classify(value: f64, band: Option<&ThresholdBand>) -> Self {
        match band {
            Some(band) if value < band.min => Status::Low,
            Some(band) if value > band.max => Status::High,
            _ => Status::Optimal,
        }
    }

    /// Display color for points and series chrome.
    pub fn color(&self) -> &'static str {
        match self {
            Status::Low => "#3b82f6",
            Status::Optimal => "#22c55e",
            Status::High => "#ef4444",
        }
    }
}

/// A reading with its status and resolved display color.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifiedPoint {
    pub time: DateTime<Utc>,
    pub value: f64,
    pub status: Status,
    pub color: &'static str,
}

impl ClassifiedPoint {
    pub fn new(reading: &Reading, band: Option<&ThresholdBand>) -> Self {
        let status = Status::classify(reading.value, band);
        Self {
            time: reading.time,
            value: reading.value,
            status,
            color: status.color(),
        }
    }
}

pub fn classify_series(readings: &[Reading], band: Option<&ThresholdBand>) -> Vec<ClassifiedPoint> {
    readings
        .iter()
        .map(|r| ClassifiedPoint::new(r, band))
        .collect()
}

/// Most frequent status among `points`.
///
/// Ties resolve to optimal, then low, then high. An empty series is optimal.
pub fn dominant_status(points: &[ClassifiedPoint]) -> Status {
    let (mut low, mut optimal, mut high) = (0usize, 0usize, 0usize);
    for point in points {
        match point.status {
            Status::Low => low += 1,
            Status::Optimal => optimal += 1,
            Status::High => high += 1,
        }
    }

    if optimal >= low && optimal >= high {
        Status::Optimal
    } else if low >= high {
        Status::Low
    } else {
        Status::High
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn band(min: f64, max: f64) -> ThresholdBand {
        ThresholdBand::new(min, max).unwrap()
    }

    fn points(statuses: &[Status]) -> Vec<ClassifiedPoint> {
        let time = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        statuses
            .iter()
            .map(|s| ClassifiedPoint {
                time,
                value: 0.0,
                status: *s,
                color: s.color(),
            })
            .collect()
    }

    #[test]
    fn test_classify_against_band() {
        let temperature = band(20.0, 28.0);
        assert_eq!(Status::classify(19.9, Some(&temperature)), Status::Low);
        assert_eq!(Status::classify(28.1, Some(&temperature)), Status::High);
        assert_eq!(Status::classify(24.0, Some(&temperature)), Status::Optimal);

        // Bounds themselves are optimal
        assert_eq!(Status::classify(20.0, Some(&temperature)), Status::Optimal);
        assert_eq!(Status::classify(28.0, Some(&temperature)), Status::Optimal);
    }

    #[test]
    fn test_no_band_is_always_optimal() {
        for value in [-1e9, -3.5, 0.0, 24.0, 1e9] {
            assert_eq!(Status::classify(value, None), Status::Optimal);
        }
    }

    #[test]
    fn test_degenerate_band() {
        let exact = band(7.0, 7.0);
        assert_eq!(Status::classify(6.99, Some(&exact)), Status::Low);
        assert_eq!(Status::classify(7.0, Some(&exact)), Status::Optimal);
        assert_eq!(Status::classify(7.01, Some(&exact)), Status::High);
    }

    #[test]
    fn test_band_validation() {
        assert!(matches!(
            ThresholdBand::new(28.0, 20.0),
            Err(BandError::Inverted { .. })
        ));
        assert!(matches!(
            ThresholdBand::new(f64::NAN, 20.0),
            Err(BandError::NotFinite { .. })
        ));
        assert!(matches!(
            ThresholdBand::new(0.0, f64::INFINITY),
            Err(BandError::NotFinite { .. })
        ));
    }

    #[test]
    fn test_band_deserialize_validates() {
        let ok: ThresholdBand = serde_json::from_str(r#"{"min": 6.8, "max": 7.4}"#).unwrap();
        assert_eq!(ok.min(), 6.8);
        assert_eq!(ok.max(), 7.4);

        let inverted = serde_json::from_str::<ThresholdBand>(r#"{"min": 9.0, "max": 1.0}"#);
        assert!(inverted.is_err());
    }

    #[test]
    fn test_point_carries_status_color() {
        let reading = Reading::new(Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap(), 30.0);
        let point = ClassifiedPoint::new(&reading, Some(&band(20.0, 28.0)));
        assert_eq!(point.status, Status::High);
        assert_eq!(point.color, Status::High.color());
        assert_eq!(point.time, reading.time);
    }

    #[test]
    fn test_dominant_status_counts() {
        use Status::*;
        assert_eq!(dominant_status(&points(&[Low, Low, High])), Low);
        assert_eq!(dominant_status(&points(&[High, High, Optimal])), High);
        assert_eq!(dominant_status(&points(&[Optimal, Low, Optimal])), Optimal);
    }

    #[test]
    fn test_dominant_status_ties() {
        use Status::*;
        assert_eq!(dominant_status(&points(&[])), Optimal);
        assert_eq!(dominant_status(&points(&[Low, Optimal])), Optimal);
        assert_eq!(dominant_status(&points(&[High, Optimal])), Optimal);
        assert_eq!(dominant_status(&points(&[High, Low])), Low);
        assert_eq!(dominant_status(&points(&[Low, High, Optimal])), Optimal);
    }
}
