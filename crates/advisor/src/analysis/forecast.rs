//! Cost extrapolation over the analysis window.

use serde::{Deserialize, Serialize};

/// Average days in a month (365.25 / 12).
const AVG_DAYS_PER_MONTH: f64 = 30.4375;

/// Monthly and annual cost projections derived from the billed period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostForecast {
    pub monthly: f64,
    pub annually: f64,
}

/// Extrapolate the billed cost of a window to monthly/annual figures,
/// rounded to cents. A zero-length window forecasts zero.
pub fn extrapolate(billed_cost: f64, duration_days: u32) -> CostForecast {
    if duration_days == 0 {
        return CostForecast::default();
    }

    let avg_daily_cost = billed_cost / f64::from(duration_days);
    CostForecast {
        monthly: round_cents(avg_daily_cost * AVG_DAYS_PER_MONTH),
        annually: round_cents(avg_daily_cost * 365.0),
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extrapolate_thirty_days() {
        let forecast = extrapolate(300.0, 30);
        // 10/day * 30.4375 = 304.375, rounded to cents
        assert!((forecast.monthly - 304.38).abs() < f64::EPSILON);
        assert!((forecast.annually - 3650.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_extrapolate_zero_duration() {
        let forecast = extrapolate(500.0, 0);
        assert!((forecast.monthly).abs() < f64::EPSILON);
        assert!((forecast.annually).abs() < f64::EPSILON);
    }

    #[test]
    fn test_extrapolate_rounds_to_cents() {
        let forecast = extrapolate(100.0, 7);
        // 14.2857.../day * 365 = 5214.2857... -> 5214.29
        assert!((forecast.annually - 5214.29).abs() < f64::EPSILON);
    }
}
