//! Synthetic records for keywords the source could not answer for.
//!
//! Values are drawn from fixed ranges so downstream scoring stays plausible;
//! the reliability tag is what tells callers the numbers are made up.

use rand::Rng;

use crate::types::{Reliability, TrendDirection, TrendRecord};

/// Weekly points in a year, the nominal length of a synthetic series.
const SYNTHETIC_POINTS: u32 = 52;

const ESTIMATED_DIRECTIONS: [TrendDirection; 2] = [TrendDirection::Stable, TrendDirection::Rising];

const DEMO_DIRECTIONS: [TrendDirection; 3] = [
    TrendDirection::Rising,
    TrendDirection::Stable,
    TrendDirection::Declining,
];

/// Stand-in for a keyword whose batch request failed.
pub(crate) fn estimated_record<R: Rng + ?Sized>(keyword: &str, rng: &mut R) -> TrendRecord {
    TrendRecord {
        keyword: keyword.to_owned(),
        interest: f64::from(rng.random_range(15u8..=60)),
        peak_interest: f64::from(rng.random_range(40u8..=80)),
        trend_direction: ESTIMATED_DIRECTIONS[rng.random_range(0..ESTIMATED_DIRECTIONS.len())],
        data_points: SYNTHETIC_POINTS,
        reliability: Reliability::Estimated,
    }
}

/// Stand-in for a keyword requested while the source was unreachable.
pub(crate) fn demo_record<R: Rng + ?Sized>(keyword: &str, rng: &mut R) -> TrendRecord {
    TrendRecord {
        keyword: keyword.to_owned(),
        interest: f64::from(rng.random_range(20u8..=70)),
        peak_interest: f64::from(rng.random_range(50u8..=90)),
        trend_direction: DEMO_DIRECTIONS[rng.random_range(0..DEMO_DIRECTIONS.len())],
        data_points: SYNTHETIC_POINTS,
        reliability: Reliability::Demo,
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    #[test]
    fn estimated_records_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let record = estimated_record("kaffe", &mut rng);
            assert!((15.0..=60.0).contains(&record.interest));
            assert!((40.0..=80.0).contains(&record.peak_interest));
            assert!(ESTIMATED_DIRECTIONS.contains(&record.trend_direction));
            assert_eq!(record.data_points, 52);
            assert_eq!(record.reliability, Reliability::Estimated);
        }
    }

    #[test]
    fn demo_records_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let record = demo_record("kaffe", &mut rng);
            assert!((20.0..=70.0).contains(&record.interest));
            assert!((50.0..=90.0).contains(&record.peak_interest));
            assert!(DEMO_DIRECTIONS.contains(&record.trend_direction));
            assert_eq!(record.reliability, Reliability::Demo);
        }
    }

    #[test]
    fn same_seed_same_records() {
        let mut a = StdRng::seed_from_u64(42);
        let mut b = StdRng::seed_from_u64(42);
        assert_eq!(demo_record("x", &mut a), demo_record("x", &mut b));
        assert_eq!(estimated_record("y", &mut a), estimated_record("y", &mut b));
    }
}
