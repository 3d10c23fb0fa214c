// Envtrend Testdata - Signal patterns
// Copyright (c) 2025 Envtrend Contributors
//
// Dual-licensed under MIT or Apache-2.0, at your option.

//! Signal shapes for synthetic station attributes.

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

/// Shape of one attribute over time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SignalPattern {
    /// Constant value.
    Constant { value: f64 },

    /// 24-hour cycle peaking at `peak_hour` local time.
    ///
    /// `value = min + (max - min) * exp(-d² / 2·spread²)` where `d` is the
    /// circular distance in hours from the peak.
    Diurnal {
        min: f64,
        max: f64,
        peak_hour: f64,
        spread: f64,
    },

    /// Linear drift, per hour since the first sample.
    Linear { start: f64, slope_per_hour: f64 },

    /// Brownian motion from `start`.
    RandomWalk { start: f64, step_std: f64 },

    /// Mirrors another attribute: the source range maps onto the target
    /// range reversed (e.g. humidity falling as temperature rises).
    InverseOf {
        source_id: String,
        source_range: (f64, f64),
        target_range: (f64, f64),
    },
}

impl SignalPattern {
    /// Id of the attribute this pattern depends on, if any.
    pub fn source(&self) -> Option<&str> {
        match self {
            SignalPattern::InverseOf { source_id, .. } => Some(source_id),
            _ => None,
        }
    }
}

/// Circular distance-weighted bump around `peak_hour`.
pub fn diurnal_factor(hour_of_day: f64, peak_hour: f64, spread: f64) -> f64 {
    let diff = (hour_of_day - peak_hour).abs();
    let diff = if diff > 12.0 { 24.0 - diff } else { diff };
    (-diff * diff / (2.0 * spread * spread)).exp()
}

/// Per-attribute generator state.
#[derive(Debug, Clone, Default)]
pub struct PatternState {
    random_walk_value: f64,
}

impl PatternState {
    pub fn for_pattern(pattern: &SignalPattern) -> Self {
        match pattern {
            SignalPattern::RandomWalk { start, .. } => Self {
                random_walk_value: *start,
            },
            _ => Self::default(),
        }
    }

    /// Evaluate an independent pattern.
    ///
    /// `hours_elapsed` counts from the first sample, `hour_of_day` is local
    /// wall-clock time. `InverseOf` has no value on its own and yields `None`.
    pub fn evaluate(
        &mut self,
        pattern: &SignalPattern,
        hours_elapsed: f64,
        hour_of_day: f64,
        rng: &mut (impl Rng + ?Sized),
    ) -> Option<f64> {
        match pattern {
            SignalPattern::Constant { value } => Some(*value),
            SignalPattern::Diurnal {
                min,
                max,
                peak_hour,
                spread,
            } => Some(min + (max - min) * diurnal_factor(hour_of_day, *peak_hour, *spread)),
            SignalPattern::Linear {
                start,
                slope_per_hour,
            } => Some(start + slope_per_hour * hours_elapsed),
            SignalPattern::RandomWalk { step_std, .. } => {
                if let Ok(step) = Normal::new(0.0, *step_std) {
                    self.random_walk_value += step.sample(rng);
                }
                Some(self.random_walk_value)
            }
            SignalPattern::InverseOf { .. } => None,
        }
    }
}

/// Map `source` from `source_range` onto `target_range`, reversed.
pub fn inverse_map(source: f64, source_range: (f64, f64), target_range: (f64, f64)) -> f64 {
    let (s_lo, s_hi) = source_range;
    let (t_lo, t_hi) = target_range;
    let span = s_hi - s_lo;
    if span == 0.0 {
        return (t_lo + t_hi) / 2.0;
    }
    let fraction = ((source - s_lo) / span).clamp(0.0, 1.0);
    t_hi - (t_hi - t_lo) * fraction
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_diurnal_peaks_at_peak_hour() {
        let mut rng = StdRng::seed_from_u64(1);
        let pattern = SignalPattern::Diurnal {
            min: 10.0,
            max: 30.0,
            peak_hour: 14.0,
            spread: 4.0,
        };
        let mut state = PatternState::for_pattern(&pattern);
        let peak = state.evaluate(&pattern, 0.0, 14.0, &mut rng).unwrap();
        let night = state.evaluate(&pattern, 0.0, 2.0, &mut rng).unwrap();
        assert!((peak - 30.0).abs() < 1e-9);
        assert!(night < 11.0);
    }

    #[test]
    fn test_diurnal_wraps_midnight() {
        assert!((diurnal_factor(23.0, 1.0, 2.0) - diurnal_factor(3.0, 1.0, 2.0)).abs() < 1e-12);
    }

    #[test]
    fn test_random_walk_starts_near_start() {
        let mut rng = StdRng::seed_from_u64(9);
        let pattern = SignalPattern::RandomWalk {
            start: 1013.0,
            step_std: 0.1,
        };
        let mut state = PatternState::for_pattern(&pattern);
        let v = state.evaluate(&pattern, 0.0, 0.0, &mut rng).unwrap();
        assert!((v - 1013.0).abs() < 1.0);
    }

    #[test]
    fn test_inverse_map() {
        assert_eq!(inverse_map(10.0, (10.0, 30.0), (40.0, 80.0)), 80.0);
        assert_eq!(inverse_map(30.0, (10.0, 30.0), (40.0, 80.0)), 40.0);
        assert_eq!(inverse_map(20.0, (10.0, 30.0), (40.0, 80.0)), 60.0);
        assert_eq!(inverse_map(50.0, (10.0, 30.0), (40.0, 80.0)), 40.0);
    }

    #[test]
    fn test_inverse_has_no_standalone_value() {
        let mut rng = StdRng::seed_from_u64(1);
        let pattern = SignalPattern::InverseOf {
            source_id: "temperature".to_string(),
            source_range: (0.0, 1.0),
            target_range: (0.0, 1.0),
        };
        assert_eq!(pattern.source(), Some("temperature"));
        assert!(PatternState::default()
            .evaluate(&pattern, 0.0, 0.0, &mut rng)
            .is_none());
    }
}
